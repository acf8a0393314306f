//! Systems: a match specification, a tracked entity list and callbacks.
//!
//! A system never scans the world itself. The membership engine appends
//! entities to the tracked list when they start matching and removes them
//! when they stop, firing `on_enter`/`on_leave` as it goes. [`System::run`]
//! then walks that list.
//!
//! ## Calling convention
//!
//! Per-entity callbacks receive the entity and a [`Bindings`] holding the
//! entity's instances of the required components, in the order the system
//! listed them. `every` additionally sees the global value passed to the run.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use engine_component::Component;
use serde_json::{Map, Value};
use tracing::trace;

use crate::config::{Hooks, MatchSpec, SystemConfig};
use crate::entity::Entity;
use crate::events;
use crate::registry::{Registry, RegistryInner};

/// Arguments bound for one per-entity callback.
#[derive(Debug)]
pub struct Bindings<'a> {
    components: Vec<Option<Component>>,
    global: Option<&'a Value>,
}

impl<'a> Bindings<'a> {
    /// The instance in slot `index` of the required list.
    ///
    /// A slot is empty when the entity no longer has that component, which
    /// happens in `on_leave` after a required component was detached.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Component> {
        self.components.get(index).and_then(Option::as_ref)
    }

    /// The bound instance of component `name`.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components
            .iter()
            .flatten()
            .find(|c| c.name() == name)
    }

    /// Number of slots, one per required component.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if the system requires no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Slots in required-component order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&Component>> {
        self.components.iter().map(Option::as_ref)
    }

    /// The global value passed to `run`, only ever set for `every`.
    #[must_use]
    pub fn global(&self) -> Option<&'a Value> {
        self.global
    }
}

struct SystemInner {
    name: String,
    spec: MatchSpec,
    hooks: Hooks,
    entities: RefCell<Vec<Entity>>,
    state: RefCell<Map<String, Value>>,
    registry: Weak<RegistryInner>,
}

/// A registered system. Cloning yields another handle to the same system.
#[derive(Clone)]
pub struct System(Rc<SystemInner>);

impl System {
    pub(crate) fn new(
        config: SystemConfig,
        fallback_name: String,
        registry: Weak<RegistryInner>,
    ) -> Self {
        let SystemConfig { spec, hooks } = config;
        Self(Rc::new(SystemInner {
            name: spec.name.clone().unwrap_or(fallback_name),
            spec,
            hooks,
            entities: RefCell::new(Vec::new()),
            state: RefCell::new(Map::new()),
            registry,
        }))
    }

    /// The configured name, or `system#<n>`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The group this system joined, if any.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.0.spec.group.as_deref()
    }

    /// The match specification the system was created from.
    #[must_use]
    pub fn spec(&self) -> &MatchSpec {
        &self.0.spec
    }

    /// The registry this system belongs to, if it is still alive.
    #[must_use]
    pub fn registry(&self) -> Option<Registry> {
        self.0.registry.upgrade().map(Registry::from_inner)
    }

    /// Free-form state owned by the system, for `init`, `pre` and
    /// `on_event` to share between calls.
    ///
    /// # Panics
    ///
    /// Panics if the state is currently borrowed mutably.
    #[must_use]
    pub fn state(&self) -> Ref<'_, Map<String, Value>> {
        self.0.state.borrow()
    }

    /// Mutably borrow the system's state.
    ///
    /// # Panics
    ///
    /// Panics if the state is currently borrowed.
    #[must_use]
    pub fn state_mut(&self) -> RefMut<'_, Map<String, Value>> {
        self.0.state.borrow_mut()
    }

    // -- Predicate --

    /// `true` iff the entity has every required component and none of the
    /// excluded ones.
    #[must_use]
    pub fn matches(&self, entity: &Entity) -> bool {
        self.has_required(entity) && !self.has_excluded(entity)
    }

    pub(crate) fn has_required(&self, entity: &Entity) -> bool {
        match &self.0.spec.components {
            Some(names) => names.iter().all(|n| entity.has(n)),
            None => true,
        }
    }

    pub(crate) fn has_excluded(&self, entity: &Entity) -> bool {
        match &self.0.spec.not {
            Some(names) => names.iter().any(|n| entity.has(n)),
            None => false,
        }
    }

    pub(crate) fn subscribes_to(&self, event: &str) -> bool {
        self.0
            .spec
            .on
            .as_ref()
            .is_some_and(|events| events.iter().any(|e| e == event))
    }

    // -- Tracked entities --

    /// `true` if the entity is currently tracked.
    #[must_use]
    pub fn tracks(&self, entity: &Entity) -> bool {
        self.0.entities.borrow().iter().any(|e| e.id() == entity.id())
    }

    /// Snapshot of the tracked entities, in the order they entered.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        self.0.entities.borrow().clone()
    }

    /// Number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.entities.borrow().len()
    }

    /// Returns `true` if no entity is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.entities.borrow().is_empty()
    }

    /// Start tracking `entity` and fire `on_enter`.
    ///
    /// The list is updated before the hook runs, so notifications nested
    /// inside the hook already see the entity as tracked.
    pub(crate) fn enter(&self, entity: &Entity) {
        self.0.entities.borrow_mut().push(entity.clone());
        trace!(system = self.name(), entity = entity.id().raw(), "entity entered");
        if let Some(hook) = &self.0.hooks.on_enter {
            hook(entity, &self.bindings(entity, None));
        }
    }

    /// Stop tracking `entity` and fire `on_leave`.
    pub(crate) fn leave(&self, entity: &Entity) {
        {
            let mut entities = self.0.entities.borrow_mut();
            if let Some(pos) = entities.iter().position(|e| e.id() == entity.id()) {
                entities.remove(pos);
            }
        }
        trace!(system = self.name(), entity = entity.id().raw(), "entity left");
        if let Some(hook) = &self.0.hooks.on_leave {
            hook(entity, &self.bindings(entity, None));
        }
    }

    fn bindings<'a>(&self, entity: &Entity, global: Option<&'a Value>) -> Bindings<'a> {
        let components: Vec<Option<Component>> = self
            .0
            .spec
            .components
            .as_ref()
            .map(|names| names.iter().map(|n| entity.get(n)).collect())
            .unwrap_or_default();
        Bindings { components, global }
    }

    // -- Execution --

    pub(crate) fn run_init(&self) {
        if let Some(hook) = &self.0.hooks.init {
            hook(self);
        }
    }

    /// Run `pre` once, then `every` for each tracked entity.
    ///
    /// The pass walks the tracked list in the order it had when the pass
    /// started. Entities that leave mid-pass are skipped; entities that enter
    /// mid-pass are first visited on the next run.
    pub fn run(&self, global: Option<&Value>) {
        if let Some(pre) = &self.0.hooks.pre {
            pre(self, global);
        }
        let Some(every) = &self.0.hooks.every else {
            return;
        };
        let entities = self.entities();
        trace!(system = self.name(), entities = entities.len(), "running system");
        for entity in &entities {
            if !self.tracks(entity) {
                continue;
            }
            every(entity, &self.bindings(entity, global));
        }
    }

    /// Walk the tracked entities with the same bindings `every` receives,
    /// minus the global value. Skips entities that leave during the walk.
    pub fn iterate(&self, mut f: impl FnMut(&Entity, &Bindings<'_>)) {
        for entity in &self.entities() {
            if !self.tracks(entity) {
                continue;
            }
            f(entity, &self.bindings(entity, None));
        }
    }

    /// Broadcast `event` to every subscribed system of this registry,
    /// including this one. Returns how many systems were notified.
    pub fn emit(&self, event: &str, args: &[Value]) -> usize {
        match self.registry() {
            Some(registry) => events::broadcast(&registry.systems(), event, args),
            None => 0,
        }
    }

    /// Fire `on_event` if present. Returns whether a hook ran.
    pub(crate) fn deliver(&self, args: &[Value]) -> bool {
        match &self.0.hooks.on_event {
            Some(hook) => {
                hook(self, args);
                true
            }
            None => false,
        }
    }
}

impl PartialEq for System {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("System")
            .field("name", &self.0.name)
            .field("spec", &self.0.spec)
            .field("hooks", &self.0.hooks)
            .field("tracked", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;

    fn registry_with(names: &[&str]) -> Registry {
        let registry = Registry::new();
        for name in names {
            registry.define_component(name, None).unwrap();
        }
        registry
    }

    #[test]
    fn test_matches_required_and_excluded() {
        let registry = registry_with(&["a", "b", "x"]);
        let system = registry.create_system(SystemConfig::new().components(["a", "b"]).not(["x"]));
        let e = registry.create_entity();

        assert!(!system.matches(&e));
        e.attach("a", &[]).unwrap();
        assert!(!system.matches(&e));
        e.attach("b", &[]).unwrap();
        assert!(system.matches(&e));
        e.attach("x", &[]).unwrap();
        assert!(!system.matches(&e));
    }

    #[test]
    fn test_absent_requirements_match_everything() {
        let registry = registry_with(&[]);
        let system = registry.create_system(SystemConfig::new());
        let e = registry.create_entity();
        assert!(system.matches(&e));
        assert!(system.tracks(&e));
    }

    #[test]
    fn test_bindings_follow_required_order() {
        let registry = registry_with(&["a", "b"]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let system = registry.create_system(SystemConfig::new().components(["b", "a"]).every(
            move |_, args| {
                let names: Vec<String> =
                    args.iter().flatten().map(|c| c.name().to_string()).collect();
                sink.borrow_mut().push((names, args.global().cloned()));
            },
        ));
        let e = registry.create_entity();
        e.attach("a", &[json!(1)]).unwrap().attach("b", &[json!(2)]).unwrap();

        system.run(Some(&json!({ "dt": 0.5 })));
        system.run(None);

        let seen = seen.borrow();
        assert_eq!(seen[0].0, vec!["b".to_string(), "a".to_string()]);
        assert_eq!(seen[0].1, Some(json!({ "dt": 0.5 })));
        assert_eq!(seen[1].1, None);
    }

    #[test]
    fn test_bindings_lookup_by_name() {
        let registry = registry_with(&["pos"]);
        let system = registry.create_system(SystemConfig::new().components(["pos"]));
        let e = registry.create_entity();
        e.attach("pos", &[json!(3)]).unwrap();

        let mut visited = 0;
        system.iterate(|entity, args| {
            assert_eq!(entity.id(), e.id());
            assert_eq!(args.len(), 1);
            assert!(args.get(0).unwrap().ptr_eq(&e.get("pos").unwrap()));
            assert_eq!(args.component("pos").unwrap().value(), Some(json!(3)));
            assert!(args.global().is_none());
            visited += 1;
        });
        assert_eq!(visited, 1);
    }

    #[test]
    fn test_no_required_components_binds_nothing() {
        let registry = registry_with(&[]);
        let system = registry.create_system(SystemConfig::new());
        registry.create_entity();
        system.iterate(|_, args| assert!(args.is_empty()));
    }

    #[test]
    fn test_pre_runs_without_every() {
        let registry = registry_with(&[]);
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let system = registry.create_system(
            SystemConfig::new().pre(move |_, global| sink.borrow_mut().push(global.cloned())),
        );
        registry.create_entity();
        system.run(Some(&json!(7)));
        assert_eq!(*calls.borrow(), vec![Some(json!(7))]);
    }

    #[test]
    fn test_state_is_shared_between_hooks() {
        let registry = registry_with(&[]);
        let system = registry.create_system(
            SystemConfig::new()
                .init(|sys| {
                    sys.state_mut().insert("runs".into(), json!(0));
                })
                .pre(|sys, _| {
                    let runs = sys.state().get("runs").and_then(Value::as_u64).unwrap_or(0);
                    sys.state_mut().insert("runs".into(), json!(runs + 1));
                }),
        );
        system.run(None);
        system.run(None);
        assert_eq!(system.state().get("runs"), Some(&json!(2)));
    }

    #[test]
    fn test_default_name_and_group() {
        let registry = registry_with(&[]);
        let first = registry.create_system(SystemConfig::new().group("render"));
        let named = registry.create_system(SystemConfig::new().name("ai"));
        assert_eq!(first.name(), "system#0");
        assert_eq!(first.group(), Some("render"));
        assert_eq!(named.name(), "ai");
        assert_eq!(named.group(), None);
        assert_ne!(first, named);
    }
}
