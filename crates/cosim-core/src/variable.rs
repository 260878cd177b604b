//! Variable descriptors and the typed storage they point into.
//!
//! A model owns the memory behind every variable it registers. The registry
//! only keeps a [`Lens`] per variable: a pair of field projections that is
//! applied to a borrowed model whenever a value is read or written. A lens
//! holds no pointer of its own, so it can never outlive or dangle from the
//! model it projects into.
//!
//! # Example
//!
//! ```rust
//! use cosim_core::field;
//! use cosim_core::types::Causality;
//! use cosim_core::variable::VariableSpec;
//!
//! struct Model {
//!     speed: f64,
//! }
//!
//! let spec = VariableSpec::real("speed", field!(Model, speed))
//!     .causality(Causality::Output);
//! assert_eq!(spec.name(), "speed");
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Causality, Initial, ValueReference, Variability, VariableType};

/// Read and write projections from a model onto one of its fields.
pub struct Lens<M, T> {
    get: fn(&M) -> &T,
    get_mut: fn(&mut M) -> &mut T,
}

impl<M, T> Lens<M, T> {
    /// Create a lens from a shared and a mutable projection.
    pub fn new(get: fn(&M) -> &T, get_mut: fn(&mut M) -> &mut T) -> Self {
        Self { get, get_mut }
    }

    /// Borrow the projected value.
    pub fn get<'m>(&self, model: &'m M) -> &'m T {
        (self.get)(model)
    }

    /// Mutably borrow the projected value.
    pub fn get_mut<'m>(&self, model: &'m mut M) -> &'m mut T {
        (self.get_mut)(model)
    }
}

impl<M, T> Clone for Lens<M, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, T> Copy for Lens<M, T> {}

impl<M, T> fmt::Debug for Lens<M, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Lens")
    }
}

/// Build a [`Lens`] onto a named field of a model type.
///
/// ```rust
/// # use cosim_core::field;
/// struct Tank { level: f64 }
/// let lens = field!(Tank, level);
/// let mut tank = Tank { level: 1.5 };
/// *lens.get_mut(&mut tank) += 1.0;
/// assert_eq!(*lens.get(&tank), 2.5);
/// ```
#[macro_export]
macro_rules! field {
    ($model:ty, $($field:tt).+) => {
        $crate::variable::Lens::new(
            |m: &$model| &m.$($field).+,
            |m: &mut $model| &mut m.$($field).+,
        )
    };
}

/// Where a variable's value lives, tagged by value type.
pub enum Storage<M> {
    Real(Lens<M, f64>),
    Integer(Lens<M, i32>),
    Boolean(Lens<M, bool>),
    String(Lens<M, String>),
}

impl<M> Storage<M> {
    /// The value type stored behind this lens.
    pub fn value_type(&self) -> VariableType {
        match self {
            Self::Real(_) => VariableType::Real,
            Self::Integer(_) => VariableType::Integer,
            Self::Boolean(_) => VariableType::Boolean,
            Self::String(_) => VariableType::String,
        }
    }
}

impl<M> Clone for Storage<M> {
    fn clone(&self) -> Self {
        match self {
            Self::Real(l) => Self::Real(*l),
            Self::Integer(l) => Self::Integer(*l),
            Self::Boolean(l) => Self::Boolean(*l),
            Self::String(l) => Self::String(*l),
        }
    }
}

impl<M> fmt::Debug for Storage<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Storage({})", self.value_type())
    }
}

/// A Rust type that can back a variable.
///
/// Implemented for `f64`, `i32`, `bool` and `String`, one per
/// [`VariableType`].
pub trait ScalarValue: Clone + PartialEq + fmt::Debug + Sized + 'static {
    /// The variable type this Rust type represents.
    const TYPE: VariableType;

    /// Extract the lens if the storage holds this type.
    fn lens<M>(storage: &Storage<M>) -> Option<Lens<M, Self>>;
}

macro_rules! impl_scalar_value {
    ($ty:ty, $variant:ident) => {
        impl ScalarValue for $ty {
            const TYPE: VariableType = VariableType::$variant;

            fn lens<M>(storage: &Storage<M>) -> Option<Lens<M, Self>> {
                match storage {
                    Storage::$variant(lens) => Some(*lens),
                    _ => None,
                }
            }
        }
    };
}

impl_scalar_value!(f64, Real);
impl_scalar_value!(i32, Integer);
impl_scalar_value!(bool, Boolean);
impl_scalar_value!(String, String);

/// Metadata describing a registered variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    /// Unique name within the component instance.
    pub name: String,
    /// Handle within the value type's namespace.
    pub value_reference: ValueReference,
    /// Value type, fixed at registration.
    pub value_type: VariableType,
    pub causality: Causality,
    pub variability: Variability,
    pub initial: Initial,
    /// Names of the variables this one depends on. Declarative only.
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VariableDescriptor {
    /// Whether the two descriptors agree on type, causality and variability.
    pub fn same_kind(&self, other: &VariableDescriptor) -> bool {
        self.value_type == other.value_type
            && self.causality == other.causality
            && self.variability == other.variability
    }

    /// Check the attribute combination for consistency.
    ///
    /// Returns a description of the first violated rule.
    pub fn check_attributes(&self) -> Option<String> {
        if self.variability == Variability::Continuous && self.value_type != VariableType::Real {
            return Some(format!(
                "continuous variability requires a real, found {}",
                self.value_type
            ));
        }
        match self.causality {
            Causality::Independent => {
                if self.value_type != VariableType::Real
                    || self.variability != Variability::Continuous
                {
                    return Some("independent variable must be a continuous real".to_string());
                }
                if self.initial.is_specified() {
                    return Some("independent variable cannot declare an initial".to_string());
                }
            }
            Causality::Parameter => {
                if !matches!(self.variability, Variability::Fixed | Variability::Tunable) {
                    return Some(format!(
                        "parameter must be fixed or tunable, found {}",
                        self.variability
                    ));
                }
            }
            Causality::Input => {
                if self.initial.is_specified() {
                    return Some("input cannot declare an initial".to_string());
                }
            }
            Causality::CalculatedParameter | Causality::Output | Causality::Local => {
                if self.variability == Variability::Constant
                    && self.initial.is_specified()
                    && self.initial != Initial::Exact
                {
                    return Some(format!(
                        "constant {} must have exact initial, found {}",
                        self.causality, self.initial
                    ));
                }
            }
        }
        None
    }
}

/// A registered variable: its descriptor plus the storage it reads through.
pub struct Variable<M> {
    descriptor: VariableDescriptor,
    storage: Storage<M>,
}

impl<M> Clone for Variable<M> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            storage: self.storage.clone(),
        }
    }
}

impl<M> fmt::Debug for Variable<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl<M> Variable<M> {
    pub(crate) fn new(descriptor: VariableDescriptor, storage: Storage<M>) -> Self {
        Self {
            descriptor,
            storage,
        }
    }

    pub fn descriptor(&self) -> &VariableDescriptor {
        &self.descriptor
    }

    pub fn storage(&self) -> &Storage<M> {
        &self.storage
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn value_reference(&self) -> ValueReference {
        self.descriptor.value_reference
    }

    pub fn value_type(&self) -> VariableType {
        self.descriptor.value_type
    }

    pub fn causality(&self) -> Causality {
        self.descriptor.causality
    }

    /// The typed lens, if this variable holds values of type `T`.
    pub fn lens<T: ScalarValue>(&self) -> Option<Lens<M, T>> {
        T::lens(&self.storage)
    }
}

/// Builder for a variable prior to registration.
///
/// The value reference is assigned by the registry unless set explicitly.
pub struct VariableSpec<M> {
    name: String,
    value_reference: Option<ValueReference>,
    causality: Causality,
    variability: Option<Variability>,
    initial: Initial,
    dependencies: BTreeSet<String>,
    description: Option<String>,
    storage: Storage<M>,
}

impl<M> fmt::Debug for VariableSpec<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableSpec")
            .field("name", &self.name)
            .field("value_type", &self.storage.value_type())
            .field("value_reference", &self.value_reference)
            .field("causality", &self.causality)
            .finish_non_exhaustive()
    }
}

impl<M> VariableSpec<M> {
    fn with_storage(name: impl Into<String>, storage: Storage<M>) -> Self {
        Self {
            name: name.into(),
            value_reference: None,
            causality: Causality::default(),
            variability: None,
            initial: Initial::default(),
            dependencies: BTreeSet::new(),
            description: None,
            storage,
        }
    }

    /// A real (`f64`) variable.
    pub fn real(name: impl Into<String>, lens: Lens<M, f64>) -> Self {
        Self::with_storage(name, Storage::Real(lens))
    }

    /// An integer (`i32`) variable.
    pub fn integer(name: impl Into<String>, lens: Lens<M, i32>) -> Self {
        Self::with_storage(name, Storage::Integer(lens))
    }

    /// A boolean variable.
    pub fn boolean(name: impl Into<String>, lens: Lens<M, bool>) -> Self {
        Self::with_storage(name, Storage::Boolean(lens))
    }

    /// A string variable.
    pub fn string(name: impl Into<String>, lens: Lens<M, String>) -> Self {
        Self::with_storage(name, Storage::String(lens))
    }

    pub fn causality(mut self, causality: Causality) -> Self {
        self.causality = causality;
        self
    }

    pub fn variability(mut self, variability: Variability) -> Self {
        self.variability = Some(variability);
        self
    }

    pub fn initial(mut self, initial: Initial) -> Self {
        self.initial = initial;
        self
    }

    /// Declare the variables this one depends on.
    pub fn depends_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Request a specific value reference instead of an assigned one.
    pub fn value_reference(mut self, vr: impl Into<ValueReference>) -> Self {
        self.value_reference = Some(vr.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> VariableType {
        self.storage.value_type()
    }

    pub(crate) fn requested_value_reference(&self) -> Option<ValueReference> {
        self.value_reference
    }

    /// Finish the spec with the given handle.
    pub(crate) fn into_variable(self, value_reference: ValueReference) -> Variable<M> {
        let value_type = self.storage.value_type();
        let descriptor = VariableDescriptor {
            name: self.name,
            value_reference,
            value_type,
            causality: self.causality,
            variability: self
                .variability
                .unwrap_or_else(|| Variability::default_for(value_type)),
            initial: self.initial,
            dependencies: self.dependencies,
            description: self.description,
        };
        Variable::new(descriptor, self.storage)
    }
}
