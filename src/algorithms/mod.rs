//! This module contains the array-level algorithms the containers delegate to.
//!
//! Every function here operates on raw `ArrayValues` and knows nothing about
//! names, indexes or selections. The containers in `frame` and the mixins in
//! `base` wrap the results back into named objects.

use crate::base::IndexOpsMixin;
use crate::error::{Result, TabulaError};
use crate::frame::Series;
use crate::scalar::Scalar;
use hashbrown::HashMap;
use std::fmt;
use std::str::FromStr;

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod factorize;
pub mod map;
pub mod reduce;
pub mod search;

pub use factorize::{duplicated, factorize_array, unique1d, value_counts};
pub use map::map_array;
pub use reduce::reduce;
pub use search::{is_monotonic_decreasing, is_monotonic_increasing, searchsorted};

//==================================================================================
// 2. Shared Argument Types
//==================================================================================

/// Which insertion point `searchsorted` reports for values equal to an
/// existing element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl FromStr for Side {
    type Err = TabulaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            other => Err(TabulaError::ValueError(format!(
                "side must be 'left' or 'right' (got '{}')",
                other
            ))),
        }
    }
}

/// Which occurrence of a repeated value is *not* marked as a duplicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Keep {
    #[default]
    First,
    Last,
    /// Every occurrence of a repeated value is a duplicate.
    Neither,
}

/// How missing values are treated by `map`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaAction {
    /// Missing values are propagated without being passed to the mapper.
    Ignore,
}

/// The correspondence applied by `map_values`.
pub enum Mapper<'a> {
    Func(Box<dyn Fn(&Scalar) -> Scalar + 'a>),
    /// Values missing from the table map to NA.
    Dict(HashMap<Scalar, Scalar>),
    /// A series used as a lookup table: index labels to values.
    Series(HashMap<Scalar, Scalar>),
}

impl<'a> Mapper<'a> {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Scalar) -> Scalar + 'a,
    {
        Mapper::Func(Box::new(f))
    }

    pub fn dict<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Scalar>,
        V: Into<Scalar>,
    {
        Mapper::Dict(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a lookup table from a series' index labels (or positions, when
    /// the series has no index) to its values.
    ///
    /// The labels must be unique.
    pub fn series(series: &Series) -> Result<Self> {
        let labels = series.index_labels();
        let mut table = HashMap::with_capacity(labels.len());
        for (label, value) in labels.into_iter().zip(series.values().to_scalars()) {
            if table.insert(label, value).is_some() {
                return Err(TabulaError::ValueError(
                    "Reindexing only valid with uniquely valued Index objects".to_string(),
                ));
            }
        }
        Ok(Mapper::Series(table))
    }

    pub fn apply(&self, value: &Scalar) -> Scalar {
        match self {
            Mapper::Func(f) => f(value),
            Mapper::Dict(table) | Mapper::Series(table) => {
                table.get(value).cloned().unwrap_or(Scalar::Null)
            }
        }
    }
}

impl fmt::Debug for Mapper<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mapper::Func(_) => write!(f, "Mapper::Func(..)"),
            Mapper::Dict(table) => write!(f, "Mapper::Dict({} entries)", table.len()),
            Mapper::Series(table) => write!(f, "Mapper::Series({} entries)", table.len()),
        }
    }
}

/// All missing values collapse onto one hash key, so `None` and `NaN` count as
/// the same unique.
pub(crate) fn hash_key(value: &Scalar) -> Scalar {
    if value.is_na() {
        Scalar::Null
    } else {
        value.clone()
    }
}
