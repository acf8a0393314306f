//! Registry-level error types.

use engine_component::{ComponentError, EntityId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EcsError {
    /// Defining a component name that already exists. The registry is left
    /// unchanged and the original constructor stays in force.
    #[error("component '{0}' is already defined")]
    DuplicateComponent(String),

    /// Attaching a component name that was never defined.
    #[error("unknown component '{0}'")]
    UnknownComponent(String),

    /// A host-supplied constructor failed. The component was not attached and
    /// no membership notification fired.
    #[error("constructor for component '{component}' failed: {source}")]
    Constructor {
        component: String,
        #[source]
        source: anyhow::Error,
    },

    /// The entity outlived its registry.
    #[error("{0} belongs to a registry that has been dropped")]
    RegistryDropped(EntityId),
}

impl From<ComponentError> for EcsError {
    fn from(err: ComponentError) -> Self {
        match err {
            ComponentError::Duplicate(name) => Self::DuplicateComponent(name),
            ComponentError::Unknown(name) => Self::UnknownComponent(name),
            ComponentError::Constructor { component, source } => {
                Self::Constructor { component, source }
            }
        }
    }
}
