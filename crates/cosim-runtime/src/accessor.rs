//! Typed accessors returned by name lookups.

use std::fmt;

use cosim_core::{Lens, ScalarValue, ValueReference};

use crate::error::Result;
use crate::instance::ComponentInstance;
use crate::model::Model;

/// A typed handle onto one variable of a component instance.
///
/// An accessor stays valid for the whole life of the instance it was
/// obtained from. It is not a snapshot: every [`get`](Self::get) reads the
/// live value out of the model.
pub struct Accessor<M, T> {
    name: String,
    value_reference: ValueReference,
    lens: Lens<M, T>,
}

pub type RealVariable<M> = Accessor<M, f64>;
pub type IntVariable<M> = Accessor<M, i32>;
pub type BoolVariable<M> = Accessor<M, bool>;
pub type StringVariable<M> = Accessor<M, String>;

impl<M: Model, T: ScalarValue> Accessor<M, T> {
    pub(crate) fn new(
        name: impl Into<String>,
        value_reference: ValueReference,
        lens: Lens<M, T>,
    ) -> Self {
        Self {
            name: name.into(),
            value_reference,
            lens,
        }
    }

    /// Read the current value from the instance.
    ///
    /// Fails once the instance is terminated.
    pub fn get(&self, instance: &ComponentInstance<M>) -> Result<T> {
        instance.expect_live("accessor get")?;
        Ok(self.lens.get(instance.model()).clone())
    }

    pub fn value_reference(&self) -> ValueReference {
        self.value_reference
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<M, T> Clone for Accessor<M, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            value_reference: self.value_reference,
            lens: self.lens,
        }
    }
}

impl<M, T> fmt::Debug for Accessor<M, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("name", &self.name)
            .field("value_reference", &self.value_reference)
            .finish()
    }
}
