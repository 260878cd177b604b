//! Variable registry for co-simulation components.
//!
//! A component registers typed variables (real, integer, boolean, string)
//! with causality, variability and initial metadata. Each variable is keyed
//! by a stable per-type value reference and by a unique name, and reads and
//! writes go straight through to storage owned by the model.
//!
//! ## Modules
//!
//! - [`types`] — Value types, causality, variability, initial, value references
//! - [`variable`] — Field lenses, variable specs and descriptors
//! - [`registry`] — The name/handle indexed registry
//! - [`error`] — Registration and access errors

pub mod error;
pub mod registry;
pub mod types;
pub mod variable;

// Re-export key types for convenience
pub use error::{RegistryError, Result};
pub use registry::VariableRegistry;
pub use types::{Causality, Initial, ValueReference, Variability, VariableType};
pub use variable::{Lens, ScalarValue, Storage, Variable, VariableDescriptor, VariableSpec};
