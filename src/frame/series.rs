use super::Index;
use crate::base::{AttributeStore, IndexOpsMixin};
use crate::config::TabulaConfig;
use crate::error::{Result, TabulaError};
use crate::ops::Operand;
use crate::scalar::Scalar;
use crate::values::ArrayValues;
use bitvec::slice::BitSlice;
use std::fmt;

/// Names a `Series` manages itself; they stay assignable after a freeze.
const INTERNAL_NAMES: [&str; 2] = ["name", "index"];

/// A named one-dimensional container with optional row labels.
#[derive(Debug, Clone)]
pub struct Series {
    values: ArrayValues,
    name: Option<String>,
    index: Option<Index>,
    attrs: AttributeStore,
}

impl Series {
    pub fn new(values: ArrayValues) -> Self {
        Self {
            values,
            name: None,
            index: None,
            attrs: AttributeStore::with_internal_names(INTERNAL_NAMES),
        }
    }

    pub fn from_i64(values: Vec<i64>) -> Self {
        Self::new(ArrayValues::from_i64(values))
    }

    pub fn from_f64(values: Vec<f64>) -> Self {
        Self::new(ArrayValues::from_f64(values))
    }

    pub fn from_strs<S: AsRef<str>>(values: &[S]) -> Self {
        Self::new(ArrayValues::from_strs(values))
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.renamed(Some(name.into()))
    }

    pub fn renamed(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Attaches row labels. The index must be as long as the values.
    pub fn with_index(mut self, index: Index) -> Result<Self> {
        if index.len() != self.values.len() {
            return Err(TabulaError::ValueError(format!(
                "Length of values ({}) does not match length of index ({})",
                self.values.len(),
                index.len()
            )));
        }
        self.index = Some(index);
        Ok(self)
    }

    pub fn index(&self) -> Option<&Index> {
        self.index.as_ref()
    }

    /// Row labels: the index's labels, or positions when there is no index.
    pub fn index_labels(&self) -> Vec<Scalar> {
        match &self.index {
            Some(index) => index.labels(),
            None => (0..self.values.len() as i64).map(Scalar::Int).collect(),
        }
    }

    /// The value at row label `label`.
    pub fn get(&self, label: &Scalar) -> Result<Scalar> {
        let pos = match &self.index {
            Some(index) => index.get_loc(label)?,
            None => label
                .as_i64()
                .filter(|&i| i >= 0 && (i as usize) < self.values.len())
                .map(|i| i as usize)
                .ok_or_else(|| TabulaError::KeyError(label.repr()))?,
        };
        Ok(self.values.get(pos))
    }

    pub fn attrs(&self) -> &AttributeStore {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut AttributeStore {
        &mut self.attrs
    }
}

impl IndexOpsMixin for Series {
    fn values(&self) -> &ArrayValues {
        &self.values
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Results keep this series' index and attributes.
    fn construct_result(&self, result: ArrayValues, name: Option<String>) -> Result<Self> {
        if result.len() != self.values.len() {
            return Err(TabulaError::ValueError(format!(
                "Result of length {} does not align with {} rows",
                result.len(),
                self.values.len()
            )));
        }
        Ok(Self {
            values: result,
            name,
            index: self.index.clone(),
            attrs: self.attrs.clone(),
        })
    }

    fn filter_rows(&self, mask: &BitSlice) -> Result<Self> {
        let index = match &self.index {
            Some(index) => Some(Index::new(index.values().filter(mask)?).renamed(
                index.name().map(str::to_string),
            )),
            None => {
                let kept: Vec<i64> = mask.iter_ones().map(|i| i as i64).collect();
                Some(Index::new(ArrayValues::from_i64(kept)))
            }
        };
        Ok(Self {
            values: self.values.filter(mask)?,
            name: self.name.clone(),
            index,
            attrs: self.attrs.clone(),
        })
    }
}

impl Series {
    arith_methods!();
}

impl From<&Series> for Operand {
    fn from(series: &Series) -> Self {
        series.to_operand()
    }
}

impl fmt::Display for Series {
    /// One `label    value` line per row, truncated to the configured number
    /// of items, followed by the name and dtype.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let max_items = TabulaConfig::current().display_max_items;
        let labels = self.index_labels();
        let len = self.values.len();
        let rows: Vec<usize> = if len > max_items {
            let head = max_items / 2;
            (0..head).chain(len - (max_items - head)..len).collect()
        } else {
            (0..len).collect()
        };

        for (n, &i) in rows.iter().enumerate() {
            if len > max_items && n == max_items / 2 {
                writeln!(f, "...")?;
            }
            writeln!(f, "{:<8}{}", labels[i].to_string(), self.values.get(i))?;
        }
        match &self.name {
            Some(name) => write!(f, "Name: {}, dtype: {}", name, self.values.dtype()),
            None => write!(f, "dtype: {}", self.values.dtype()),
        }
    }
}
