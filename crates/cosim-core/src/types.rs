//! Variable metadata enums and value-reference handles.
//!
//! These mirror the attribute vocabulary of the co-simulation standard:
//! every variable has a value type, a causality, a variability and an
//! initial policy. Value references are per-type handles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The primitive value type of a variable.
///
/// Each type owns its own value-reference namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    /// 64-bit floating point (`f64`).
    Real,
    /// 32-bit signed integer (`i32`).
    Integer,
    /// Boolean (`bool`).
    Boolean,
    /// UTF-8 string (`String`).
    String,
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real => write!(f, "real"),
            Self::Integer => write!(f, "integer"),
            Self::Boolean => write!(f, "boolean"),
            Self::String => write!(f, "string"),
        }
    }
}

/// The role of a variable relative to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Causality {
    /// Independent parameter, set by the host before simulation.
    Parameter,
    /// Parameter computed by the model from other parameters.
    CalculatedParameter,
    /// Value provided by the host.
    Input,
    /// Value computed by the model and read by the host.
    Output,
    /// Internal model state, visible but not part of the interface.
    #[default]
    Local,
    /// The independent variable (usually time).
    Independent,
}

impl Causality {
    /// Whether the host may ever write a variable with this causality.
    ///
    /// Outputs are permanently write-protected; every other causality is
    /// gated by the lifecycle phase only.
    pub fn is_host_writable(&self) -> bool {
        !matches!(self, Self::Output)
    }
}

impl fmt::Display for Causality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter => write!(f, "parameter"),
            Self::CalculatedParameter => write!(f, "calculated-parameter"),
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
            Self::Local => write!(f, "local"),
            Self::Independent => write!(f, "independent"),
        }
    }
}

/// How often a variable's value may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variability {
    /// Never changes.
    Constant,
    /// Fixed after initialization.
    Fixed,
    /// Changes only at explicit host events.
    Tunable,
    /// Changes only at discrete time instants.
    Discrete,
    /// May change continuously in time. Reals only.
    Continuous,
}

impl Variability {
    /// Default variability for a value type: continuous for reals,
    /// discrete for everything else.
    pub fn default_for(value_type: VariableType) -> Self {
        match value_type {
            VariableType::Real => Self::Continuous,
            _ => Self::Discrete,
        }
    }
}

impl fmt::Display for Variability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant => write!(f, "constant"),
            Self::Fixed => write!(f, "fixed"),
            Self::Tunable => write!(f, "tunable"),
            Self::Discrete => write!(f, "discrete"),
            Self::Continuous => write!(f, "continuous"),
        }
    }
}

/// How a variable's starting value is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Initial {
    /// Initialized with the start value.
    Exact,
    /// Start value is an iteration guess.
    Approx,
    /// Computed by the model during initialization.
    Calculated,
    /// Not specified.
    #[default]
    None,
}

impl Initial {
    /// Whether an initial policy was given explicitly.
    pub fn is_specified(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Initial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Approx => write!(f, "approx"),
            Self::Calculated => write!(f, "calculated"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Stable numeric handle for a variable within its type's namespace.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ValueReference(pub u32);

impl ValueReference {
    /// The handle immediately after this one.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl From<u32> for ValueReference {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ValueReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vr{}", self.0)
    }
}
