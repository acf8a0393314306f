//! Entity handles.
//!
//! An [`Entity`] is a shared handle: the registry's entity list, every system
//! tracking it and the host all hold clones of the same `Rc`. Attaching or
//! detaching a component goes through the handle and immediately runs the
//! membership engine for that entity.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use engine_component::{Component, EntityId};
use serde_json::Value;
use tracing::trace;

use crate::error::EcsError;
use crate::membership;
use crate::registry::{Registry, RegistryInner};

struct EntityInner {
    id: EntityId,
    components: RefCell<HashMap<String, Component>>,
    registry: Weak<RegistryInner>,
}

/// A registry-owned entity: an id plus its attached components.
#[derive(Clone)]
pub struct Entity(Rc<EntityInner>);

impl Entity {
    pub(crate) fn new(id: EntityId, registry: Weak<RegistryInner>) -> Self {
        Self(Rc::new(EntityInner {
            id,
            components: RefCell::new(HashMap::new()),
            registry,
        }))
    }

    /// The id assigned by the owning registry.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.0.id
    }

    /// The registry that created this entity, if it is still alive.
    #[must_use]
    pub fn registry(&self) -> Option<Registry> {
        self.0.registry.upgrade().map(Registry::from_inner)
    }

    /// Attach a fresh instance of component `name`, built from `args`.
    ///
    /// An instance already present under `name` is replaced without any
    /// removal notification. Returns the entity so calls can be chained.
    ///
    /// Attach is not transactional past a failure: if the constructor fails,
    /// nothing is stored and no system is notified.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownComponent`] if `name` was never defined,
    /// [`EcsError::Constructor`] if its constructor fails, and
    /// [`EcsError::RegistryDropped`] if the owning registry is gone.
    pub fn attach(&self, name: &str, args: &[Value]) -> Result<Entity, EcsError> {
        let registry = self.registry().ok_or(EcsError::RegistryDropped(self.0.id))?;
        let component = registry.instantiate(name, args)?;

        let previous = self
            .0
            .components
            .borrow_mut()
            .insert(name.to_string(), component);
        if previous.is_some() {
            trace!(entity = self.0.id.raw(), component = name, "component replaced");
        }

        membership::on_component_added(&registry.systems(), self);
        Ok(self.clone())
    }

    /// Detach component `name`, returning the removed instance.
    ///
    /// Detaching an absent component is not an error; systems are notified
    /// either way.
    pub fn detach(&self, name: &str) -> Option<Component> {
        let removed = self.0.components.borrow_mut().remove(name);
        if let Some(registry) = self.registry() {
            membership::on_component_removed(&registry.systems(), self);
        }
        removed
    }

    /// Returns `true` if component `name` is attached.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.0.components.borrow().contains_key(name)
    }

    /// The instance attached under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Component> {
        self.0.components.borrow().get(name).cloned()
    }

    /// Names of all attached components, sorted.
    #[must_use]
    pub fn component_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.components.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of attached components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.0.components.borrow().len()
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Entity {}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.0.id.raw())
            .field("components", &self.component_names())
            .finish()
    }
}
