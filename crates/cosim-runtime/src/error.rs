//! Component error types.

use cosim_core::RegistryError;

use crate::instance::Phase;

/// Errors surfaced by a component instance.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// The operation is not legal in the current phase, or targets a
    /// variable the host may not write.
    #[error("invalid call to {operation} in phase {phase}: {detail}")]
    InvalidCall {
        operation: &'static str,
        phase: Phase,
        detail: String,
    },

    /// Registration or variable access error.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Configuration document failed validation.
    #[error("invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ComponentError {
    /// Whether this error rejected an illegal call sequence or write.
    pub fn is_invalid_call(&self) -> bool {
        matches!(self, Self::InvalidCall { .. })
    }

    /// Whether this error is a name or handle conflict at registration.
    pub fn is_duplicate_variable(&self) -> bool {
        matches!(self, Self::Registry(e) if e.is_duplicate())
    }
}

/// Result type alias for component operations.
pub type Result<T> = std::result::Result<T, ComponentError>;
