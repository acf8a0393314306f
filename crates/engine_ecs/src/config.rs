//! System configuration.
//!
//! A [`SystemConfig`] is everything needed to create a system: the
//! declarative [`MatchSpec`] (which entities it tracks, which events it hears,
//! which group it runs in) and the optional callbacks in [`Hooks`].
//!
//! Every field is optional. An absent `components` list means every entity
//! satisfies the requirement; an absent `not` list excludes nothing.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::Entity;
use crate::system::{Bindings, System};

/// Per-entity callback: `every`, `on_enter`, `on_leave` and [`System::iterate`].
pub type EntityHook = Rc<dyn Fn(&Entity, &Bindings<'_>)>;

/// Called once per run before any entity, with the run's global value.
pub type PreHook = Rc<dyn Fn(&System, Option<&Value>)>;

/// Called once when the system is created.
pub type InitHook = Rc<dyn Fn(&System)>;

/// Called with the event arguments when a subscribed event is emitted.
pub type EventHook = Rc<dyn Fn(&System, &[Value])>;

/// The serialisable half of a system configuration.
///
/// ```json
/// { "name": "movement", "components": ["position", "velocity"],
///   "not": ["frozen"], "group": "physics" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchSpec {
    /// Diagnostic label used in logs.
    pub name: Option<String>,
    /// Required component names; callbacks receive instances in this order.
    pub components: Option<Vec<String>>,
    /// Excluded component names.
    pub not: Option<Vec<String>>,
    /// Subscribed event names.
    pub on: Option<Vec<String>>,
    /// Batching key for [`Registry::run_group`](crate::Registry::run_group).
    pub group: Option<String>,
}

/// Optional callbacks. Absent hooks are simply skipped.
#[derive(Clone, Default)]
pub struct Hooks {
    /// Called for each tracked entity on every run.
    pub every: Option<EntityHook>,
    /// Called when an entity starts matching.
    pub on_enter: Option<EntityHook>,
    /// Called when an entity stops matching.
    pub on_leave: Option<EntityHook>,
    /// Called for each emitted event the system subscribes to.
    pub on_event: Option<EventHook>,
    /// Called once at the start of each run.
    pub pre: Option<PreHook>,
    /// Called once when the system is created.
    pub init: Option<InitHook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("every", &self.every.is_some())
            .field("on_enter", &self.on_enter.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .field("on_event", &self.on_event.is_some())
            .field("pre", &self.pre.is_some())
            .field("init", &self.init.is_some())
            .finish()
    }
}

/// Builder for a system.
#[derive(Debug, Clone, Default)]
pub struct SystemConfig {
    pub spec: MatchSpec,
    pub hooks: Hooks,
}

fn owned<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

impl SystemConfig {
    /// Create an empty configuration: no requirements, no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a deserialised [`MatchSpec`] and attach callbacks afterwards.
    #[must_use]
    pub fn from_spec(spec: MatchSpec) -> Self {
        Self {
            spec,
            hooks: Hooks::default(),
        }
    }

    /// Diagnostic label. Defaults to `system#<n>`.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.spec.name = Some(name.into());
        self
    }

    /// Required components, in the order callbacks receive them.
    #[must_use]
    pub fn components<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.components = Some(owned(names));
        self
    }

    /// Excluded components.
    #[must_use]
    pub fn not<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.not = Some(owned(names));
        self
    }

    /// Subscribed events.
    #[must_use]
    pub fn on<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.on = Some(owned(events));
        self
    }

    /// Group key for [`Registry::run_group`](crate::Registry::run_group).
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.spec.group = Some(group.into());
        self
    }

    /// Per-entity hook for [`Registry::run`](crate::Registry::run).
    #[must_use]
    pub fn every(mut self, f: impl Fn(&Entity, &Bindings<'_>) + 'static) -> Self {
        self.hooks.every = Some(Rc::new(f));
        self
    }

    /// Hook fired when an entity starts matching.
    #[must_use]
    pub fn on_enter(mut self, f: impl Fn(&Entity, &Bindings<'_>) + 'static) -> Self {
        self.hooks.on_enter = Some(Rc::new(f));
        self
    }

    /// Hook fired when an entity stops matching. Slots for detached
    /// required components are empty.
    #[must_use]
    pub fn on_leave(mut self, f: impl Fn(&Entity, &Bindings<'_>) + 'static) -> Self {
        self.hooks.on_leave = Some(Rc::new(f));
        self
    }

    /// Hook fired with the arguments of each subscribed event.
    #[must_use]
    pub fn on_event(mut self, f: impl Fn(&System, &[Value]) + 'static) -> Self {
        self.hooks.on_event = Some(Rc::new(f));
        self
    }

    /// Hook run once per pass, before any `every`.
    #[must_use]
    pub fn pre(mut self, f: impl Fn(&System, Option<&Value>) + 'static) -> Self {
        self.hooks.pre = Some(Rc::new(f));
        self
    }

    /// Hook run once while the system is being created.
    #[must_use]
    pub fn init(mut self, f: impl Fn(&System) + 'static) -> Self {
        self.hooks.init = Some(Rc::new(f));
        self
    }
}
