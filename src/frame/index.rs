use crate::base::IndexOpsMixin;
use crate::error::{Result, TabulaError};
use crate::scalar::Scalar;
use crate::values::{ArrayValues, RangeValues};

/// An immutable, named sequence of row labels.
#[derive(Debug, Clone)]
pub struct Index {
    values: ArrayValues,
    name: Option<String>,
}

impl Index {
    pub fn new(values: ArrayValues) -> Self {
        Self { values, name: None }
    }

    /// A lazily evaluated integer index.
    pub fn range(start: i64, stop: i64, step: i64) -> Result<Self> {
        Ok(Self::new(ArrayValues::Range(RangeValues::new(start, stop, step)?)))
    }

    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        Self::new(ArrayValues::from_strs(labels))
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.renamed(Some(name.into()))
    }

    pub fn renamed(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// `RangeIndex` when range-backed, `Index` otherwise.
    pub fn type_name(&self) -> &'static str {
        if self.values.is_range() {
            "RangeIndex"
        } else {
            "Index"
        }
    }

    pub fn labels(&self) -> Vec<Scalar> {
        self.values.to_scalars()
    }

    /// Position of the first occurrence of `label`.
    pub fn get_loc(&self, label: &Scalar) -> Result<usize> {
        (0..self.values.len())
            .find(|&i| self.values.get(i) == *label)
            .ok_or_else(|| TabulaError::KeyError(label.repr()))
    }

    pub fn equals(&self, other: &Index) -> bool {
        self.values.equals(&other.values)
    }
}

impl IndexOpsMixin for Index {
    fn values(&self) -> &ArrayValues {
        &self.values
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn construct_result(&self, result: ArrayValues, name: Option<String>) -> Result<Self> {
        Ok(Index::new(result).renamed(name))
    }

    fn is_index_like(&self) -> bool {
        true
    }
}

impl Index {
    arith_methods!();
}

impl From<&Index> for crate::ops::Operand {
    fn from(index: &Index) -> Self {
        index.to_operand()
    }
}
