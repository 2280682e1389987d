use thiserror::Error;

/// Error type for container configuration and resolution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// A constructor parameter has no synthesis strategy and nothing was provided for it
    #[error("Cannot resolve {capability} for {target}: no fake can be synthesized and no instance was provided")]
    UnresolvableCapability {
        capability: &'static str,
        target: &'static str,
    },

    /// `stub` was called for a capability already fixed to a concrete instance
    #[error("Cannot stub {capability}: a concrete instance was provided for it")]
    ConfigurationConflict { capability: &'static str },

    /// `provide` was called for a capability already handed out to a consumer
    #[error("Cannot provide {capability}: it has already been resolved")]
    AlreadyResolved { capability: &'static str },

    /// A stub was addressed to a handle of a different capability
    #[error("Operation {owner}::{operation} cannot be stubbed on a fake of {capability}")]
    ForeignOperation {
        operation: &'static str,
        owner: &'static str,
        capability: &'static str,
    },

    /// The stored instance does not have the type its key names
    #[error("Stored instance for {capability} has an unexpected type")]
    TypeMismatch { capability: &'static str },

    /// Concrete dependencies form a cycle
    #[error("Circular dependency detected: {}", chain.join(" -> "))]
    CircularDependency { chain: Vec<&'static str> },

    /// A constructor asked for a parameter that was not declared at that position
    #[error("{target} requested {expected} as parameter {position}, which does not match its declared parameters")]
    ParameterMismatch {
        target: &'static str,
        position: usize,
        expected: &'static str,
    },

    /// The target's constructor reported a failure
    #[error("Failed to construct {target}: {reason}")]
    ConstructionFailed {
        target: &'static str,
        reason: String,
    },

    /// The container has been torn down
    #[error("Container has been disposed")]
    Disposed,

    /// Options could not be deserialized
    #[error("Invalid container options: {0}")]
    InvalidOptions(String),
}

impl ContainerError {
    /// Create an unresolvable capability error for parameter `C` of target `T`
    pub fn unresolvable<C: ?Sized + 'static, T: ?Sized + 'static>() -> Self {
        ContainerError::UnresolvableCapability {
            capability: std::any::type_name::<C>(),
            target: std::any::type_name::<T>(),
        }
    }

    /// Create a configuration conflict error
    pub fn conflict<C: ?Sized + 'static>() -> Self {
        ContainerError::ConfigurationConflict {
            capability: std::any::type_name::<C>(),
        }
    }

    /// Create an already resolved error
    pub fn already_resolved<C: ?Sized + 'static>() -> Self {
        ContainerError::AlreadyResolved {
            capability: std::any::type_name::<C>(),
        }
    }

    /// Create a construction failed error
    pub fn construction<T: ?Sized + 'static>(reason: impl Into<String>) -> Self {
        ContainerError::ConstructionFailed {
            target: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }
}
