//! Registry error types.

use crate::types::{ValueReference, VariableType};

/// Errors that can occur while registering or accessing variables.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    /// A variable with this name is already registered.
    #[error("duplicate variable name '{name}'")]
    DuplicateName { name: String },

    /// A variable of this type already uses the value reference.
    #[error("duplicate {value_type} value reference {value_reference} (variable '{name}')")]
    DuplicateValueReference {
        name: String,
        value_type: VariableType,
        value_reference: ValueReference,
    },

    /// No variable of this type is registered at the value reference.
    #[error("no {value_type} variable with value reference {value_reference}")]
    UnknownVariable {
        value_type: VariableType,
        value_reference: ValueReference,
    },

    /// The attribute combination is not allowed.
    #[error("invalid attributes for variable '{name}': {detail}")]
    InvalidAttributes { name: String, detail: String },
}

impl RegistryError {
    /// Whether this is a name or handle conflict raised at registration.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            Self::DuplicateName { .. } | Self::DuplicateValueReference { .. }
        )
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
