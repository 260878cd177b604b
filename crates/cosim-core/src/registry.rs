//! The variable registry: typed name/handle lookup and value transfer.
//!
//! Variables are stored once and indexed twice: by name and by
//! `(type, value reference)`. The registry never holds values itself; it
//! reads and writes through each variable's lens on a model borrowed for
//! the duration of the call.
//!
//! The registry does not know about causality rules or lifecycle phases.
//! Deciding whether a write is currently legal is the caller's job.

use std::collections::HashMap;
use std::fmt;

use crate::error::{RegistryError, Result};
use crate::types::{ValueReference, VariableType};
use crate::variable::{Lens, ScalarValue, Variable, VariableSpec};

/// Variables of one component, indexed by name and by typed handle.
pub struct VariableRegistry<M> {
    variables: Vec<Variable<M>>,
    /// Index: name -> position in `variables`
    by_name: HashMap<String, usize>,
    /// Index: (type, value reference) -> position in `variables`
    by_handle: HashMap<(VariableType, ValueReference), usize>,
    /// Next auto-assigned handle per type.
    next_handle: HashMap<VariableType, ValueReference>,
}

impl<M> VariableRegistry<M> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            by_name: HashMap::new(),
            by_handle: HashMap::new(),
            next_handle: HashMap::new(),
        }
    }

    /// Register a variable, returning its value reference.
    ///
    /// Fails without side effects if the name or the `(type, handle)` pair
    /// is taken, or if the attribute combination is invalid.
    pub fn register(&mut self, spec: VariableSpec<M>) -> Result<ValueReference> {
        if self.by_name.contains_key(spec.name()) {
            return Err(RegistryError::DuplicateName {
                name: spec.name().to_string(),
            });
        }

        let value_type = spec.value_type();
        let vr = spec
            .requested_value_reference()
            .unwrap_or_else(|| self.next_handle(value_type));
        if self.by_handle.contains_key(&(value_type, vr)) {
            return Err(RegistryError::DuplicateValueReference {
                name: spec.name().to_string(),
                value_type,
                value_reference: vr,
            });
        }

        let variable = spec.into_variable(vr);
        if let Some(detail) = variable.descriptor().check_attributes() {
            return Err(RegistryError::InvalidAttributes {
                name: variable.name().to_string(),
                detail,
            });
        }

        let index = self.variables.len();
        self.by_name.insert(variable.name().to_string(), index);
        self.by_handle.insert((value_type, vr), index);
        let next = self.next_handle.entry(value_type).or_default();
        if vr >= *next {
            *next = vr.next();
        }
        self.variables.push(variable);
        Ok(vr)
    }

    fn next_handle(&self, value_type: VariableType) -> ValueReference {
        self.next_handle
            .get(&value_type)
            .copied()
            .unwrap_or_default()
    }

    /// Look up a variable by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<&Variable<M>> {
        self.by_name.get(name).map(|&i| &self.variables[i])
    }

    /// Look up a variable by type and value reference.
    pub fn lookup_by_handle(
        &self,
        value_type: VariableType,
        vr: ValueReference,
    ) -> Option<&Variable<M>> {
        self.by_handle
            .get(&(value_type, vr))
            .map(|&i| &self.variables[i])
    }

    /// Look up a variable, failing with `UnknownVariable` on a miss.
    pub fn require(&self, value_type: VariableType, vr: ValueReference) -> Result<&Variable<M>> {
        self.lookup_by_handle(value_type, vr)
            .ok_or(RegistryError::UnknownVariable {
                value_type,
                value_reference: vr,
            })
    }

    /// Read the current value of a `T` variable from the model.
    pub fn get_value<T: ScalarValue>(&self, model: &M, vr: ValueReference) -> Result<T> {
        let lens = self.typed_lens::<T>(vr)?;
        Ok(lens.get(model).clone())
    }

    /// Write a value into a `T` variable's storage in the model.
    pub fn set_value<T: ScalarValue>(
        &self,
        model: &mut M,
        vr: ValueReference,
        value: T,
    ) -> Result<()> {
        let lens = self.typed_lens::<T>(vr)?;
        *lens.get_mut(model) = value;
        Ok(())
    }

    fn typed_lens<T: ScalarValue>(&self, vr: ValueReference) -> Result<Lens<M, T>> {
        self.require(T::TYPE, vr)?
            .lens::<T>()
            .ok_or(RegistryError::UnknownVariable {
                value_type: T::TYPE,
                value_reference: vr,
            })
    }

    /// All variables in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable<M>> {
        self.variables.iter()
    }

    /// Variables of one type, ordered by value reference.
    pub fn variables_of(&self, value_type: VariableType) -> Vec<&Variable<M>> {
        let mut vars: Vec<&Variable<M>> = self
            .variables
            .iter()
            .filter(|v| v.value_type() == value_type)
            .collect();
        vars.sort_by_key(|v| v.value_reference());
        vars
    }

    /// Declared dependencies that name no registered variable, as
    /// `(variable, missing dependency)` pairs.
    pub fn unresolved_dependencies(&self) -> Vec<(&str, &str)> {
        self.variables
            .iter()
            .flat_map(|v| {
                v.descriptor()
                    .dependencies
                    .iter()
                    .filter(move |dep| !self.by_name.contains_key(dep.as_str()))
                    .map(move |dep| (v.name(), dep.as_str()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl<M> Default for VariableRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for VariableRegistry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableRegistry")
            .field("variables", &self.variables)
            .finish()
    }
}
