//! Component registry error types.

/// Errors raised while defining or instantiating components.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// A component with this name was already defined.
    #[error("component '{0}' is already defined")]
    Duplicate(String),

    /// No component with this name has been defined.
    #[error("unknown component '{0}'")]
    Unknown(String),

    /// The component's constructor failed.
    #[error("constructor for component '{component}' failed: {source}")]
    Constructor {
        component: String,
        #[source]
        source: anyhow::Error,
    },
}
