//! The registry: one independent ECS world.
//!
//! A [`Registry`] owns the component definitions, every entity ever created,
//! the systems in registration order and the group index. It is a cheap,
//! clonable handle; callbacks reach it through [`Entity::registry`] and
//! [`System::registry`] and may call back into it freely.
//!
//! ## Re-entrancy
//!
//! Every operation releases its internal borrows before invoking a callback,
//! so hooks may attach, detach, emit, create entities or create systems. Such
//! nested calls complete before the outer call resumes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use engine_component::{Component, ComponentRegistry, Constructor, EntityAllocator};
use serde_json::Value;
use tracing::debug;

use crate::config::SystemConfig;
use crate::entity::Entity;
use crate::error::EcsError;
use crate::system::System;
use crate::{events, membership, scheduler};

#[derive(Default)]
pub(crate) struct RegistryInner {
    components: RefCell<ComponentRegistry>,
    allocator: RefCell<EntityAllocator>,
    entities: RefCell<Vec<Entity>>,
    systems: RefCell<Vec<System>>,
    groups: RefCell<scheduler::Groups>,
    next_system: Cell<usize>,
}

/// A handle to one ECS registry.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Rc<RegistryInner>,
}

/// Create a fresh, empty registry.
#[must_use]
pub fn create_registry() -> Registry {
    Registry::new()
}

impl Registry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_inner(inner: Rc<RegistryInner>) -> Self {
        Self { inner }
    }

    // -- Components --

    /// Define a component kind. `None` uses the default constructor, which
    /// stores its first argument under `"value"`.
    ///
    /// # Errors
    ///
    /// [`EcsError::DuplicateComponent`] if `name` is already defined; the
    /// original constructor is kept.
    pub fn define_component(
        &self,
        name: &str,
        constructor: Option<Constructor>,
    ) -> Result<(), EcsError> {
        self.inner
            .components
            .borrow_mut()
            .define(name, constructor)
            .map_err(EcsError::from)
    }

    /// Returns `true` if `name` has been defined.
    #[must_use]
    pub fn has_component(&self, name: &str) -> bool {
        self.inner.components.borrow().contains(name)
    }

    /// All defined component names, sorted.
    #[must_use]
    pub fn component_names(&self) -> Vec<String> {
        self.inner.components.borrow().names()
    }

    /// Build an instance of `name`. The constructor runs with no registry
    /// borrow held, so it may itself use the registry.
    pub(crate) fn instantiate(&self, name: &str, args: &[Value]) -> Result<Component, EcsError> {
        let constructor = self.inner.components.borrow().constructor(name)?;
        Ok(constructor.build(name, args)?)
    }

    // -- Entities --

    /// Create an entity with no components.
    ///
    /// Systems without required components start tracking it immediately.
    pub fn create_entity(&self) -> Entity {
        let id = self.inner.allocator.borrow_mut().allocate();
        let entity = Entity::new(id, Rc::downgrade(&self.inner));
        self.inner.entities.borrow_mut().push(entity.clone());
        debug!(entity = id.raw(), "entity created");
        membership::on_component_added(&self.systems(), &entity);
        entity
    }

    /// Every entity created by this registry, in creation order.
    #[must_use]
    pub fn list_entities(&self) -> Vec<Entity> {
        self.inner.entities.borrow().clone()
    }

    /// Number of entities created so far.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.inner.entities.borrow().len()
    }

    // -- Systems --

    /// Register a system.
    ///
    /// The system joins its group, runs `init`, is appended to the system
    /// list, and finally enrolls every existing entity it matches.
    pub fn create_system(&self, config: SystemConfig) -> System {
        let index = self.inner.next_system.get();
        self.inner.next_system.set(index + 1);
        let fallback = format!("system#{index}");
        let system = System::new(config, fallback, Rc::downgrade(&self.inner));

        if let Some(group) = system.group() {
            self.inner.groups.borrow_mut().insert(group, system.clone());
        }
        system.run_init();
        self.inner.systems.borrow_mut().push(system.clone());
        debug!(system = system.name(), group = system.group(), "system registered");

        membership::enroll_existing(&system, &self.list_entities());
        system
    }

    /// Snapshot of all systems in registration order.
    #[must_use]
    pub fn systems(&self) -> Vec<System> {
        self.inner.systems.borrow().clone()
    }

    /// Number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.inner.systems.borrow().len()
    }

    /// Names of all groups, sorted.
    #[must_use]
    pub fn groups(&self) -> Vec<String> {
        self.inner.groups.borrow().names()
    }

    // -- Scheduling and events --

    /// Run every system once, in registration order.
    pub fn run(&self, global: Option<&Value>) {
        scheduler::run_all(&self.systems(), global);
    }

    /// Run the systems of `group` once, in creation order. Returns `false`
    /// (and does nothing) if no system ever joined that group.
    pub fn run_group(&self, group: &str, global: Option<&Value>) -> bool {
        let Some(systems) = self.inner.groups.borrow().get(group) else {
            return false;
        };
        scheduler::run_all(&systems, global);
        true
    }

    /// Broadcast `event` to all subscribed systems. Returns how many
    /// `on_event` hooks ran.
    pub fn emit(&self, event: &str, args: &[Value]) -> usize {
        events::broadcast(&self.systems(), event, args)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("components", &self.inner.components.borrow().len())
            .field("entities", &self.entity_count())
            .field("systems", &self.system_count())
            .finish()
    }
}
