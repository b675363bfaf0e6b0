// In: src/base/index_ops.rs

//! Element-wise operation dispatch shared by one-dimensional containers.
//!
//! An `IndexOpsMixin` implementor exposes its backing values, its name and a
//! way to wrap raw values back into its own type. Everything else
//! (arithmetic dispatch, factorize, searchsorted, memory accounting, mapping
//! and the unique/duplicate family) is provided on top of those hooks.

use crate::algorithms::{self, Keep, Mapper, NaAction, Side};
use crate::error::{Result, TabulaError};
use crate::frame::{DataFrame, Index, Series};
use crate::ops::{
    arithmetic_op, errstate, extract_array, get_op_result_name, ArithOp, ContainerKind, ErrAction,
    ErrState, Extracted, Operand,
};
use crate::scalar::Scalar;
use crate::types::DType;
use crate::values::ArrayValues;
use bitvec::prelude::*;
use ndarray::Array1;
use std::cmp::Ordering;

//==================================================================================
// 1. Argument and Result Types
//==================================================================================

/// The uniques returned by `factorize`: an `Index` for index-like callers,
/// the index's backing values for everything else.
#[derive(Debug, Clone)]
pub enum FactorizedUniques {
    Index(Index),
    Values(ArrayValues),
}

impl FactorizedUniques {
    pub fn values(&self) -> &ArrayValues {
        match self {
            FactorizedUniques::Index(index) => index.values(),
            FactorizedUniques::Values(values) => values,
        }
    }
}

/// What `searchsorted` looks for.
#[derive(Debug, Clone, Copy)]
pub enum SearchValue<'a> {
    Scalar(&'a Scalar),
    Array(&'a ArrayValues),
    /// Rejected: a whole index is not a search target.
    Index(&'a Index),
    /// Rejected: a frame is not a search target.
    Frame(&'a DataFrame),
}

impl<'a> From<&'a Scalar> for SearchValue<'a> {
    fn from(s: &'a Scalar) -> Self {
        SearchValue::Scalar(s)
    }
}

impl<'a> From<&'a ArrayValues> for SearchValue<'a> {
    fn from(values: &'a ArrayValues) -> Self {
        SearchValue::Array(values)
    }
}

impl<'a> From<&'a Index> for SearchValue<'a> {
    fn from(index: &'a Index) -> Self {
        SearchValue::Index(index)
    }
}

impl<'a> From<&'a DataFrame> for SearchValue<'a> {
    fn from(frame: &'a DataFrame) -> Self {
        SearchValue::Frame(frame)
    }
}

/// Insertion points: one for a scalar target, one per element otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Positions {
    Single(usize),
    Many(Vec<usize>),
}

//==================================================================================
// 2. The Mixin
//==================================================================================

pub trait IndexOpsMixin: Sized + Clone {
    fn values(&self) -> &ArrayValues;

    fn name(&self) -> Option<&str>;

    /// Wraps a raw result into this container type under `name`.
    fn construct_result(&self, result: ArrayValues, name: Option<String>) -> Result<Self>;

    fn is_index_like(&self) -> bool {
        false
    }

    /// Keeps the rows where `mask` is set. Containers that carry row labels
    /// override this to filter them too.
    fn filter_rows(&self, mask: &BitSlice) -> Result<Self> {
        let kept = self.values().filter(mask)?;
        self.construct_result(kept, self.name().map(str::to_string))
    }

    /// This container as the right-hand side of another container's operation.
    fn to_operand(&self) -> Operand {
        Operand::Container {
            values: self.values().clone(),
            name: self.name().map(str::to_string),
            kind: if self.is_index_like() {
                ContainerKind::Index
            } else {
                ContainerKind::Series
            },
        }
    }

    // ---------------------------------------------------------------------------
    // Arithmetic dispatch
    // ---------------------------------------------------------------------------

    /// Evaluates `self <op> other` and wraps the result.
    ///
    /// Operands are normalized before the numeric policy is relaxed; only the
    /// primitive itself runs with every floating-point event ignored.
    fn arith_method(&self, other: &Operand, op: ArithOp) -> Result<Self> {
        let res_name = get_op_result_name(self.name(), other);
        let lvalues = self.values();
        let rvalues = match extract_array(other, true, true) {
            Extracted::Array(values) if values.is_range() => Extracted::Array(values.materialize()),
            extracted => extracted,
        };

        let result = {
            let _guard = errstate(ErrState::all(ErrAction::Ignore));
            arithmetic_op(lvalues, &rvalues, op)?
        };

        log::debug!(
            "arith_method: {} -> {} (name {:?})",
            op,
            result.dtype(),
            res_name
        );
        self.construct_result(result, res_name)
    }

    // ---------------------------------------------------------------------------
    // Encoding and search
    // ---------------------------------------------------------------------------

    /// Encodes the values as `(codes, uniques)`; see `factorize_array`.
    fn factorize(
        &self,
        sort: bool,
        use_na_sentinel: bool,
    ) -> Result<(Vec<i64>, FactorizedUniques)> {
        let (codes, mut uniques) =
            algorithms::factorize_array(self.values(), sort, use_na_sentinel)?;
        if uniques.dtype() != self.dtype() {
            uniques = uniques.astype(self.dtype())?;
        }

        let index = Index::new(uniques);
        if self.is_index_like() {
            Ok((codes, FactorizedUniques::Index(index)))
        } else {
            Ok((codes, FactorizedUniques::Values(index.values().clone())))
        }
    }

    /// Insertion points of `value` that keep the (sorted) values ordered.
    fn searchsorted<'a, V>(
        &self,
        value: V,
        side: Side,
        sorter: Option<&[usize]>,
    ) -> Result<Positions>
    where
        V: Into<SearchValue<'a>>,
    {
        let (targets, single) = match value.into() {
            SearchValue::Index(index) => return Err(not_searchable(index.type_name())),
            SearchValue::Frame(_) => return Err(not_searchable("DataFrame")),
            SearchValue::Scalar(s) => (vec![s.clone()], true),
            SearchValue::Array(values) => (values.to_scalars(), false),
        };

        let positions = match (self.values(), sorter) {
            (ArrayValues::Range(r), None) => {
                let closed: Option<Vec<usize>> =
                    targets.iter().map(|t| r.searchsorted(t, side)).collect();
                match closed {
                    Some(p) => p,
                    None => algorithms::searchsorted(self.values(), &targets, side, None)?,
                }
            }
            (values, sorter) => algorithms::searchsorted(values, &targets, side, sorter)?,
        };

        if single {
            Ok(Positions::Single(positions.first().copied().unwrap_or(0)))
        } else {
            Ok(Positions::Many(positions))
        }
    }

    // ---------------------------------------------------------------------------
    // Memory and mapping
    // ---------------------------------------------------------------------------

    /// Bytes used by the values. `deep` adds the per-object estimate for
    /// object storage.
    fn memory_usage(&self, deep: bool) -> usize {
        match self.values() {
            ArrayValues::Masked(m) => m.memory_usage(deep),
            ArrayValues::Range(r) => r.memory_usage(deep),
            values => {
                let mut bytes = values.nbytes();
                if deep && values.dtype() == DType::Object {
                    bytes += values.object_memory_usage();
                }
                bytes
            }
        }
    }

    fn map_values(
        &self,
        mapper: &Mapper<'_>,
        na_action: Option<NaAction>,
        convert: bool,
    ) -> Result<ArrayValues> {
        match self.values() {
            ArrayValues::Masked(m) => m.map(mapper, na_action),
            values => algorithms::map_array(values, mapper, na_action, convert),
        }
    }

    // ---------------------------------------------------------------------------
    // Algorithmic delegations
    // ---------------------------------------------------------------------------

    /// Counts of each distinct value as a `Series` indexed by the values.
    fn value_counts(
        &self,
        normalize: bool,
        sort: bool,
        ascending: bool,
        dropna: bool,
    ) -> Result<Series> {
        let (keys, counts) = algorithms::value_counts(self.values(), sort, ascending, dropna)?;
        let index = Index::new(keys).renamed(self.name().map(str::to_string));
        let series = if normalize {
            let total: i64 = counts.iter().sum();
            let proportions = counts
                .iter()
                .map(|&c| if total == 0 { f64::NAN } else { c as f64 / total as f64 })
                .collect();
            Series::new(ArrayValues::from_f64(proportions)).with_name("proportion")
        } else {
            Series::new(ArrayValues::from_i64(counts)).with_name("count")
        };
        series.with_index(index)
    }

    fn unique(&self) -> Result<ArrayValues> {
        algorithms::unique1d(self.values())
    }

    fn nunique(&self, dropna: bool) -> Result<usize> {
        let uniques = self.unique()?;
        if dropna {
            Ok(uniques.len() - uniques.na_count())
        } else {
            Ok(uniques.len())
        }
    }

    fn is_unique(&self) -> Result<bool> {
        Ok(self.nunique(false)? == self.len())
    }

    fn is_monotonic_increasing(&self) -> bool {
        algorithms::is_monotonic_increasing(self.values())
    }

    fn is_monotonic_decreasing(&self) -> bool {
        algorithms::is_monotonic_decreasing(self.values())
    }

    fn duplicated(&self, keep: Keep) -> BitVec {
        algorithms::duplicated(self.values(), keep)
    }

    fn drop_duplicates(&self, keep: Keep) -> Result<Self> {
        let keep_mask = !self.duplicated(keep);
        self.filter_rows(&keep_mask)
    }

    // ---------------------------------------------------------------------------
    // Introspection
    // ---------------------------------------------------------------------------

    fn len(&self) -> usize {
        self.values().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn shape(&self) -> (usize,) {
        (self.len(),)
    }

    fn ndim(&self) -> usize {
        1
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn nbytes(&self) -> usize {
        self.values().nbytes()
    }

    fn dtype(&self) -> DType {
        self.values().dtype()
    }

    fn hasnans(&self) -> bool {
        self.values().na_count() > 0
    }

    fn transpose(&self) -> Self {
        self.clone()
    }

    /// The single element of a length-one container.
    fn item(&self) -> Result<Scalar> {
        if self.len() != 1 {
            return Err(TabulaError::ValueError(
                "can only convert an array of size 1 to a Rust scalar".to_string(),
            ));
        }
        Ok(self.values().get(0))
    }

    fn to_list(&self) -> Vec<Scalar> {
        self.values().to_scalars()
    }

    /// Numeric values as a float array; missing values become `na_value`
    /// (`NaN` by default).
    fn to_numpy(&self, na_value: Option<f64>) -> Result<Array1<f64>> {
        let dtype = self.dtype();
        let view = if dtype.is_numeric() || dtype.is_bool() {
            self.values().float_view()
        } else {
            None
        };
        let view = view.ok_or_else(|| {
            TabulaError::TypeError(format!("cannot convert {} values to a float array", dtype))
        })?;
        let fill = na_value.unwrap_or(f64::NAN);
        Ok(view
            .into_iter()
            .map(|v| match v {
                Some(x) if !x.is_nan() => x,
                _ => fill,
            })
            .collect())
    }

    fn argmax(&self, skipna: bool) -> Result<usize> {
        arg_extreme(self.values(), skipna, Ordering::Greater, "argmax")
    }

    fn argmin(&self, skipna: bool) -> Result<usize> {
        arg_extreme(self.values(), skipna, Ordering::Less, "argmin")
    }
}

fn not_searchable(type_name: &str) -> TabulaError {
    TabulaError::ValueError(format!(
        "Value must be 1-D array-like or scalar, {} is not supported",
        type_name
    ))
}

/// Position of the first extreme element.
fn arg_extreme(values: &ArrayValues, skipna: bool, wanted: Ordering, op: &str) -> Result<usize> {
    if values.is_empty() {
        return Err(TabulaError::ValueError(format!(
            "attempt to get {} of an empty sequence",
            op
        )));
    }
    let mut best: Option<(usize, Scalar)> = None;
    for (i, value) in values.to_scalars().into_iter().enumerate() {
        if value.is_na() {
            if skipna {
                continue;
            }
            return Err(TabulaError::ValueError(format!(
                "Encountered an NA value with skipna=False in {}",
                op
            )));
        }
        let better = match &best {
            None => true,
            Some((_, current)) => value.total_cmp(current) == wanted,
        };
        if better {
            best = Some((i, value));
        }
    }
    best.map(|(i, _)| i)
        .ok_or_else(|| TabulaError::ValueError(format!("Encountered all NA values in {}", op)))
}
