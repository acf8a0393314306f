//! The component registry: component name to constructor.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::component::Constructor;
use crate::error::ComponentError;

/// Maps component names to the constructors that build their instances.
///
/// A name may be defined once. Re-defining it fails and leaves the original
/// constructor in place.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    constructors: HashMap<String, Constructor>,
}

impl ComponentRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register a component kind. `None` selects
    /// [`Constructor::default_value`].
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Duplicate`] if `name` is already defined.
    pub fn define(
        &mut self,
        name: &str,
        constructor: Option<Constructor>,
    ) -> Result<(), ComponentError> {
        if self.constructors.contains_key(name) {
            warn!(component = name, "rejected duplicate component definition");
            return Err(ComponentError::Duplicate(name.to_string()));
        }
        self.constructors
            .insert(name.to_string(), constructor.unwrap_or_default());
        debug!(component = name, "component defined");
        Ok(())
    }

    /// Look up the constructor for `name`.
    ///
    /// Returns a clone so the caller can run it after releasing any borrow
    /// of this registry.
    ///
    /// # Errors
    ///
    /// [`ComponentError::Unknown`] if `name` was never defined.
    pub fn constructor(&self, name: &str) -> Result<Constructor, ComponentError> {
        self.constructors
            .get(name)
            .cloned()
            .ok_or_else(|| ComponentError::Unknown(name.to_string()))
    }

    /// Returns `true` if `name` has been defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Number of defined components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns `true` if no component has been defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// All defined component names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::component::Component;

    fn instantiate(
        registry: &ComponentRegistry,
        name: &str,
        args: &[Value],
    ) -> Result<Component, ComponentError> {
        registry.constructor(name)?.build(name, args)
    }

    #[test]
    fn test_define_and_instantiate_default() {
        let mut registry = ComponentRegistry::new();
        registry.define("health", None).unwrap();
        let c = instantiate(&registry, "health", &[json!(100)]).unwrap();
        assert_eq!(c.value(), Some(json!(100)));
        assert_eq!(c.name(), "health");
    }

    #[test]
    fn test_duplicate_definition_keeps_original() {
        let mut registry = ComponentRegistry::new();
        registry
            .define(
                "pos",
                Some(Constructor::new(|f, _| {
                    f.insert("x".into(), json!(1));
                    Ok(())
                })),
            )
            .unwrap();

        let err = registry.define("pos", None).unwrap_err();
        assert!(matches!(err, ComponentError::Duplicate(ref n) if n == "pos"));

        let c = instantiate(&registry, "pos", &[json!(9)]).unwrap();
        assert_eq!(c.get("x"), Some(json!(1)));
        assert_eq!(c.value(), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_instantiate_unknown() {
        let registry = ComponentRegistry::new();
        let err = instantiate(&registry, "ghost", &[]).unwrap_err();
        assert!(matches!(err, ComponentError::Unknown(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_constructor_failure_is_wrapped() {
        let mut registry = ComponentRegistry::new();
        registry
            .define(
                "broken",
                Some(Constructor::new(|_, _| anyhow::bail!("boom"))),
            )
            .unwrap();
        let err = instantiate(&registry, "broken", &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "constructor for component 'broken' failed: boom"
        );
    }

    #[test]
    fn test_instances_are_fresh() {
        let mut registry = ComponentRegistry::new();
        registry.define("tag", None).unwrap();
        let a = instantiate(&registry, "tag", &[]).unwrap();
        let b = instantiate(&registry, "tag", &[]).unwrap();
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = ComponentRegistry::new();
        registry.define("b", None).unwrap();
        registry.define("a", None).unwrap();
        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
        assert!(registry.contains("a"));
        assert!(registry.constructor("c").is_err());
    }
}
