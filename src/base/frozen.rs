//! A per-object attribute table with a one-way freeze.
//!
//! Before `freeze()` any name may be assigned. After it, only names already
//! present or declared internal at construction can be written; everything
//! else is rejected with an `AttributeError`. There is no unfreeze.

use crate::error::{Result, TabulaError};
use crate::scalar::Scalar;
use hashbrown::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct AttributeStore {
    values: HashMap<String, Scalar>,
    internal: HashSet<String>,
    frozen: bool,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `internal` names stay assignable after the freeze.
    pub fn with_internal_names<I, S>(internal: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            internal: internal.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<Scalar>) -> Result<()> {
        if self.frozen && !self.values.contains_key(name) && !self.internal.contains(name) {
            return Err(TabulaError::AttributeError(format!(
                "You cannot add any new attribute '{}'",
                name
            )));
        }
        self.values.insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn get_attr(&self, name: &str) -> Result<&Scalar> {
        self.values.get(name).ok_or_else(|| {
            TabulaError::AttributeError(format!("object has no attribute '{}'", name))
        })
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Forbids new attribute names from now on. Calling it again is a no-op.
    pub fn freeze(&mut self) {
        if !self.frozen {
            log::debug!("freezing attribute store with {} names", self.values.len());
        }
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
