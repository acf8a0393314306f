//! Component instances and constructors.
//!
//! Components are not Rust types here: a component kind is a *name* plus a
//! [`Constructor`] that fills a fresh field map in place. The resulting
//! instance is a [`Component`], a shared handle to that map.
//!
//! ## Sharing
//!
//! The instance stored on an entity is the very same object handed to system
//! callbacks, so a write made through one handle is visible through every
//! other. Handles are `Rc`-based; the engine is single-threaded.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::error::ComponentError;

/// The field map backing a component instance.
pub type Fields = Map<String, Value>;

/// Name of the field written by [`Constructor::default_value`].
pub const VALUE_FIELD: &str = "value";

type ConstructorFn = dyn Fn(&mut Fields, &[Value]) -> anyhow::Result<()>;

/// Initialises a fresh component instance from the arguments passed to
/// `attach`.
///
/// The first parameter is the new instance; the constructor sets whatever
/// fields it needs on it. Returning an error aborts the attach.
#[derive(Clone)]
pub struct Constructor(Rc<ConstructorFn>);

impl Constructor {
    /// Wrap a closure as a constructor.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Fields, &[Value]) -> anyhow::Result<()> + 'static,
    {
        Self(Rc::new(f))
    }

    /// The constructor used when a component is defined without one: it
    /// stores the first argument (or `null`) under `"value"`.
    #[must_use]
    pub fn default_value() -> Self {
        Self::new(|fields, args| {
            let value = args.first().cloned().unwrap_or(Value::Null);
            fields.insert(VALUE_FIELD.to_string(), value);
            Ok(())
        })
    }

    /// Run the constructor against `fields`.
    ///
    /// # Errors
    ///
    /// Propagates whatever the host-supplied closure returns.
    pub fn apply(&self, fields: &mut Fields, args: &[Value]) -> anyhow::Result<()> {
        (self.0)(fields, args)
    }

    /// Build a complete instance of component `name` from `args`.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Constructor`] wrapping the closure's error.
    pub fn build(&self, name: &str, args: &[Value]) -> Result<Component, ComponentError> {
        let mut fields = Fields::new();
        self.apply(&mut fields, args)
            .map_err(|source| ComponentError::Constructor {
                component: name.to_string(),
                source,
            })?;
        Ok(Component::from_fields(name, fields))
    }
}

impl Default for Constructor {
    fn default() -> Self {
        Self::default_value()
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Constructor(..)")
    }
}

/// A live component instance attached to an entity.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    fields: Rc<RefCell<Fields>>,
}

impl Component {
    /// Wrap an already-built field map.
    #[must_use]
    pub fn from_fields(name: &str, fields: Fields) -> Self {
        Self {
            name: Rc::from(name),
            fields: Rc::new(RefCell::new(fields)),
        }
    }

    /// The component kind this instance was created from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a copy of one field, if set.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<Value> {
        self.fields.borrow().get(field).cloned()
    }

    /// Overwrite (or create) one field.
    pub fn set(&self, field: &str, value: impl Into<Value>) {
        self.fields
            .borrow_mut()
            .insert(field.to_string(), value.into());
    }

    /// Shorthand for the `"value"` field written by the default constructor.
    #[must_use]
    pub fn value(&self) -> Option<Value> {
        self.get(VALUE_FIELD)
    }

    /// Borrow the whole field map.
    ///
    /// # Panics
    ///
    /// Panics if the map is currently borrowed mutably.
    #[must_use]
    pub fn fields(&self) -> Ref<'_, Fields> {
        self.fields.borrow()
    }

    /// Mutably borrow the whole field map.
    ///
    /// # Panics
    ///
    /// Panics if the map is currently borrowed.
    #[must_use]
    pub fn fields_mut(&self) -> RefMut<'_, Fields> {
        self.fields.borrow_mut()
    }

    /// Returns `true` if both handles point at the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.fields, &other.fields)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("fields", &*self.fields.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_constructor_stores_first_argument() {
        let mut fields = Fields::new();
        Constructor::default_value()
            .apply(&mut fields, &[json!(5), json!(6)])
            .unwrap();
        assert_eq!(fields.get("value"), Some(&json!(5)));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_default_constructor_without_arguments() {
        let mut fields = Fields::new();
        Constructor::default().apply(&mut fields, &[]).unwrap();
        assert_eq!(fields.get("value"), Some(&Value::Null));
    }

    #[test]
    fn test_custom_constructor_sets_fields() {
        let ctor = Constructor::new(|fields, args| {
            fields.insert("x".into(), args.first().cloned().unwrap_or(json!(0)));
            fields.insert("y".into(), args.get(1).cloned().unwrap_or(json!(0)));
            Ok(())
        });
        let mut fields = Fields::new();
        ctor.apply(&mut fields, &[json!(1.5)]).unwrap();
        assert_eq!(fields.get("x"), Some(&json!(1.5)));
        assert_eq!(fields.get("y"), Some(&json!(0)));
    }

    #[test]
    fn test_constructor_error_propagates() {
        let ctor = Constructor::new(|_, args| {
            if args.is_empty() {
                anyhow::bail!("need an argument");
            }
            Ok(())
        });
        let err = ctor.apply(&mut Fields::new(), &[]).unwrap_err();
        assert_eq!(err.to_string(), "need an argument");
    }

    #[test]
    fn test_component_handles_share_state() {
        let a = Component::from_fields("position", Fields::new());
        let b = a.clone();
        a.set("x", 3);
        assert_eq!(b.get("x"), Some(json!(3)));
        assert!(a.ptr_eq(&b));
        assert_eq!(b.name(), "position");

        let other = Component::from_fields("position", Fields::new());
        assert!(!a.ptr_eq(&other));
    }

    #[test]
    fn test_fields_mut() {
        let c = Component::from_fields("health", Fields::new());
        c.fields_mut().insert("hp".into(), json!(10));
        assert_eq!(c.fields().len(), 1);
        assert_eq!(c.value(), None);
    }
}
