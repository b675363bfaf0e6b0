// In: src/values/mod.rs

//! Backing values: the raw storage every container delegates to.
//!
//! `ArrayValues` is a closed tagged enum over the representations the base
//! layer supports. Operand normalization, factorization, searching and
//! mapping all dispatch on the variant instead of probing the runtime type of
//! the storage.
//!
//! | Variant  | Storage                                                  |
//! |----------|----------------------------------------------------------|
//! | `Native` | mask-free Arrow array (`Int64`, `Float64`, `Boolean`)    |
//! | `Masked` | Arrow array whose validity bitmap is the NA mask         |
//! | `Object` | shared `Vec<Scalar>` (strings, heterogeneous values)     |
//! | `Range`  | lazy `start/stop/step` integer range                     |

use crate::error::{Result, TabulaError};
use crate::scalar::Scalar;
use crate::types::DType;
use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, StringArray, UInt64Array,
};
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use bitvec::prelude::*;
use std::sync::Arc;

pub mod masked;
pub mod range;

pub use masked::MaskedArray;
pub use range::RangeValues;

/// Per-element size estimates for object storage, used by deep memory usage.
const OBJECT_HEADER_BYTES: usize = 49;
const BOXED_INT_BYTES: usize = 28;
const BOXED_FLOAT_BYTES: usize = 24;
const BOXED_NONE_BYTES: usize = 16;

#[derive(Debug, Clone)]
pub enum ArrayValues {
    Native(ArrayRef),
    Masked(MaskedArray),
    Object(Arc<Vec<Scalar>>),
    Range(RangeValues),
}

//==================================================================================
// 1. Construction
//==================================================================================

impl ArrayValues {
    /// Wraps a mask-free Arrow array as native values.
    pub fn native(array: ArrayRef) -> Result<Self> {
        match array.data_type() {
            DataType::Int64 | DataType::Float64 | DataType::Boolean => {}
            dt => {
                return Err(TabulaError::TypeError(format!(
                    "{:?} cannot back a native array",
                    dt
                )))
            }
        }
        if array.null_count() > 0 {
            return Err(TabulaError::ValueError(
                "Native arrays cannot carry a validity mask; use a masked array".to_string(),
            ));
        }
        Ok(ArrayValues::Native(array))
    }

    /// Wraps any supported Arrow array, choosing masked storage when the array
    /// has nulls or is a string array.
    pub fn from_arrow(array: ArrayRef) -> Result<Self> {
        if array.null_count() > 0 || matches!(array.data_type(), DataType::Utf8) {
            Ok(ArrayValues::Masked(MaskedArray::try_new(array)?))
        } else {
            ArrayValues::native(array)
        }
    }

    pub fn from_i64(values: Vec<i64>) -> Self {
        ArrayValues::Native(Arc::new(Int64Array::from(values)))
    }

    pub fn from_f64(values: Vec<f64>) -> Self {
        ArrayValues::Native(Arc::new(Float64Array::from(values)))
    }

    pub fn from_bool(values: Vec<bool>) -> Self {
        ArrayValues::Native(Arc::new(BooleanArray::from(values)))
    }

    /// Object-dtype strings.
    pub fn from_strs<S: AsRef<str>>(values: &[S]) -> Self {
        ArrayValues::Object(Arc::new(
            values.iter().map(|s| Scalar::Str(s.as_ref().to_string())).collect(),
        ))
    }

    pub fn masked_i64(values: Vec<Option<i64>>) -> Self {
        ArrayValues::Masked(MaskedArray::from_i64_options(values))
    }

    pub fn masked_f64(values: Vec<Option<f64>>) -> Self {
        ArrayValues::Masked(MaskedArray::from_f64_options(values))
    }

    pub fn masked_bool(values: Vec<Option<bool>>) -> Self {
        ArrayValues::Masked(MaskedArray::from_bool_options(values))
    }

    pub fn masked_str<S: AsRef<str>>(values: &[Option<S>]) -> Self {
        ArrayValues::Masked(MaskedArray::from_str_options(values))
    }

    pub fn range(start: i64, stop: i64, step: i64) -> Result<Self> {
        Ok(ArrayValues::Range(RangeValues::new(start, stop, step)?))
    }

    /// Builds values from scalars, casting each element into `dtype`, or into
    /// the inferred dtype when none is given.
    pub fn from_scalars(scalars: Vec<Scalar>, dtype: Option<DType>) -> Result<Self> {
        let dtype = dtype.unwrap_or_else(|| infer_dtype(&scalars));
        let normalized = scalars
            .iter()
            .map(|s| s.cast(dtype))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_normalized(dtype, normalized))
    }

    /// Builds values from scalars already normalized for `dtype`.
    fn from_normalized(dtype: DType, scalars: Vec<Scalar>) -> Self {
        match dtype {
            DType::Int64 => {
                Self::from_i64(scalars.iter().map(|s| s.as_i64().unwrap_or(0)).collect())
            }
            DType::Float64 => {
                Self::from_f64(scalars.iter().map(|s| s.as_f64().unwrap_or(f64::NAN)).collect())
            }
            DType::Bool => Self::from_bool(
                scalars
                    .iter()
                    .map(|s| matches!(s, Scalar::Bool(true)))
                    .collect(),
            ),
            DType::Object => ArrayValues::Object(Arc::new(scalars)),
            DType::MaskedInt64 => {
                Self::masked_i64(scalars.iter().map(Scalar::as_i64).collect())
            }
            DType::MaskedFloat64 => Self::masked_f64(
                scalars
                    .iter()
                    .map(|s| if s.is_na() { None } else { s.as_f64() })
                    .collect(),
            ),
            DType::MaskedBool => Self::masked_bool(
                scalars
                    .iter()
                    .map(|s| match s {
                        Scalar::Bool(b) => Some(*b),
                        _ => None,
                    })
                    .collect(),
            ),
            DType::MaskedString => {
                let strings: Vec<Option<&str>> = scalars.iter().map(Scalar::as_str).collect();
                Self::masked_str(&strings)
            }
        }
    }
}

/// Infers the dtype that holds every scalar without loss.
///
/// Integers mixed with missing values become `Float64`, booleans mixed with
/// anything else become `Object`, and an all-missing or empty input is
/// `Object`.
pub fn infer_dtype(scalars: &[Scalar]) -> DType {
    let (mut saw_int, mut saw_float, mut saw_bool, mut saw_other, mut saw_null) =
        (false, false, false, false, false);
    for s in scalars {
        match s {
            Scalar::Null => saw_null = true,
            Scalar::Int(_) => saw_int = true,
            Scalar::Float(_) => saw_float = true,
            Scalar::Bool(_) => saw_bool = true,
            Scalar::Str(_) => saw_other = true,
        }
    }

    if saw_other || (saw_bool && (saw_int || saw_float || saw_null)) {
        DType::Object
    } else if saw_bool {
        DType::Bool
    } else if saw_float || (saw_int && saw_null) {
        DType::Float64
    } else if saw_int {
        DType::Int64
    } else {
        DType::Object
    }
}

//==================================================================================
// 2. Introspection
//==================================================================================

impl ArrayValues {
    pub fn dtype(&self) -> DType {
        match self {
            ArrayValues::Native(a) => match a.data_type() {
                DataType::Int64 => DType::Int64,
                DataType::Float64 => DType::Float64,
                _ => DType::Bool,
            },
            ArrayValues::Masked(m) => m.dtype(),
            ArrayValues::Object(_) => DType::Object,
            ArrayValues::Range(_) => DType::Int64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ArrayValues::Native(a) => a.len(),
            ArrayValues::Masked(m) => m.len(),
            ArrayValues::Object(v) => v.len(),
            ArrayValues::Range(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` for the index-like representation that answers positional
    /// queries without materializing its elements.
    pub fn is_range(&self) -> bool {
        matches!(self, ArrayValues::Range(_))
    }

    /// The element at position `i`. Panics when `i` is out of bounds, like
    /// slice indexing.
    pub fn get(&self, i: usize) -> Scalar {
        match self {
            ArrayValues::Native(a) => {
                let array = a.as_ref();
                match array.data_type() {
                    DataType::Int64 => Scalar::Int(array.as_primitive::<Int64Type>().value(i)),
                    DataType::Float64 => {
                        Scalar::Float(array.as_primitive::<Float64Type>().value(i))
                    }
                    _ => Scalar::Bool(array.as_boolean().value(i)),
                }
            }
            ArrayValues::Masked(m) => m.get(i),
            ArrayValues::Object(v) => v[i].clone(),
            ArrayValues::Range(r) => {
                assert!(i < r.len(), "index {} out of bounds for range", i);
                Scalar::Int(r.get(i))
            }
        }
    }

    pub fn to_scalars(&self) -> Vec<Scalar> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    /// Per-element NA mask.
    pub fn isna(&self) -> BitVec {
        match self {
            ArrayValues::Range(r) => bitvec![0; r.len()],
            ArrayValues::Masked(m) => (0..m.len()).map(|i| m.is_na(i)).collect(),
            other => (0..other.len()).map(|i| other.get(i).is_na()).collect(),
        }
    }

    pub fn na_count(&self) -> usize {
        match self {
            ArrayValues::Masked(m) => m.na_count(),
            ArrayValues::Range(_) => 0,
            other => other.isna().count_ones(),
        }
    }

    /// Bytes consumed by the storage itself, without per-object estimates.
    pub fn nbytes(&self) -> usize {
        match self {
            ArrayValues::Native(a) => a.len() * self.dtype().itemsize(),
            ArrayValues::Masked(m) => m.nbytes(),
            ArrayValues::Object(v) => v.len() * DType::Object.itemsize(),
            ArrayValues::Range(r) => r.nbytes(),
        }
    }

    /// Estimated bytes of the boxed objects behind object storage. Zero for
    /// every other representation.
    pub fn object_memory_usage(&self) -> usize {
        match self {
            ArrayValues::Object(v) => v
                .iter()
                .map(|s| match s {
                    Scalar::Str(s) => OBJECT_HEADER_BYTES + s.len(),
                    Scalar::Int(_) | Scalar::Bool(_) => BOXED_INT_BYTES,
                    Scalar::Float(_) => BOXED_FLOAT_BYTES,
                    Scalar::Null => BOXED_NONE_BYTES,
                })
                .sum(),
            _ => 0,
        }
    }

    /// Element-wise equality including dtype; `NaN` matches `NaN`.
    pub fn equals(&self, other: &ArrayValues) -> bool {
        self.dtype() == other.dtype()
            && self.len() == other.len()
            && (0..self.len()).all(|i| self.get(i) == other.get(i))
    }
}

impl PartialEq for ArrayValues {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

//==================================================================================
// 3. Views and Conversions
//==================================================================================

impl ArrayValues {
    /// Range values become a native `Int64` array; everything else is returned
    /// unchanged.
    pub fn materialize(&self) -> ArrayValues {
        match self {
            ArrayValues::Range(r) => r.materialize(),
            other => other.clone(),
        }
    }

    pub fn astype(&self, dtype: DType) -> Result<ArrayValues> {
        if self.dtype() == dtype && !self.is_range() {
            return Ok(self.clone());
        }
        Self::from_scalars(self.to_scalars(), Some(dtype))
    }

    /// Arrow form of the values. Object storage converts only when every
    /// element is a string or missing.
    pub fn to_arrow(&self) -> Result<ArrayRef> {
        match self {
            ArrayValues::Native(a) => Ok(a.clone()),
            ArrayValues::Masked(m) => Ok(m.data().clone()),
            ArrayValues::Range(r) => Ok(Arc::new(Int64Array::from(r.to_vec()))),
            ArrayValues::Object(v) => {
                if v.iter().all(|s| s.is_na() || s.as_str().is_some()) {
                    let strings: StringArray = v.iter().map(Scalar::as_str).collect();
                    Ok(Arc::new(strings))
                } else {
                    Err(TabulaError::TypeError(
                        "object values with non-string elements have no Arrow form".to_string(),
                    ))
                }
            }
        }
    }

    /// Integer view of integer and boolean storage; `None` for other dtypes.
    pub(crate) fn int_view(&self) -> Option<Vec<Option<i64>>> {
        match self {
            ArrayValues::Range(r) => Some(r.to_vec().into_iter().map(Some).collect()),
            ArrayValues::Object(_) => None,
            ArrayValues::Native(a) => int_view_of(a),
            ArrayValues::Masked(m) => int_view_of(m.data()),
        }
    }

    /// Float view of numeric and boolean storage; `None` for other dtypes.
    /// Masked NA positions are `None`; native `NaN` stays `Some(NaN)`.
    pub(crate) fn float_view(&self) -> Option<Vec<Option<f64>>> {
        match self {
            ArrayValues::Native(a) => float_view_of(a),
            ArrayValues::Masked(m) => float_view_of(m.data()),
            other => other
                .int_view()
                .map(|ints| ints.into_iter().map(|v| v.map(|i| i as f64)).collect()),
        }
    }

    pub fn take(&self, indices: &[usize]) -> Result<ArrayValues> {
        let len = self.len();
        if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
            return Err(TabulaError::IndexError(format!(
                "index {} is out of bounds for axis 0 with size {}",
                bad, len
            )));
        }
        match self {
            ArrayValues::Native(a) => Ok(ArrayValues::Native(take_arrow(a, indices)?)),
            ArrayValues::Masked(m) => Ok(ArrayValues::Masked(MaskedArray::try_new(take_arrow(
                m.data(),
                indices,
            )?)?)),
            ArrayValues::Object(v) => Ok(ArrayValues::Object(Arc::new(
                indices.iter().map(|&i| v[i].clone()).collect(),
            ))),
            ArrayValues::Range(r) => r.materialize().take(indices),
        }
    }

    /// Keeps the positions where `mask` is set.
    pub fn filter(&self, mask: &BitSlice) -> Result<ArrayValues> {
        if mask.len() != self.len() {
            return Err(TabulaError::ValueError(format!(
                "Boolean mask of length {} does not match values of length {}",
                mask.len(),
                self.len()
            )));
        }
        match self {
            ArrayValues::Native(a) => Ok(ArrayValues::Native(filter_arrow(a, mask)?)),
            ArrayValues::Masked(m) => Ok(ArrayValues::Masked(MaskedArray::try_new(filter_arrow(
                m.data(),
                mask,
            )?)?)),
            ArrayValues::Object(v) => Ok(ArrayValues::Object(Arc::new(
                v.iter()
                    .zip(mask.iter().by_vals())
                    .filter(|(_, keep)| *keep)
                    .map(|(s, _)| s.clone())
                    .collect(),
            ))),
            ArrayValues::Range(r) => r.materialize().filter(mask),
        }
    }
}

fn int_view_of(array: &ArrayRef) -> Option<Vec<Option<i64>>> {
    let array = array.as_ref();
    match array.data_type() {
        DataType::Int64 => Some(array.as_primitive::<Int64Type>().iter().collect()),
        DataType::Boolean => Some(
            array
                .as_boolean()
                .iter()
                .map(|b| b.map(i64::from))
                .collect(),
        ),
        _ => None,
    }
}

fn float_view_of(array: &ArrayRef) -> Option<Vec<Option<f64>>> {
    match array.as_ref().data_type() {
        DataType::Float64 => Some(array.as_ref().as_primitive::<Float64Type>().iter().collect()),
        _ => int_view_of(array).map(|ints| ints.into_iter().map(|v| v.map(|i| i as f64)).collect()),
    }
}

fn take_arrow(array: &ArrayRef, indices: &[usize]) -> Result<ArrayRef> {
    let idx = UInt64Array::from(indices.iter().map(|&i| i as u64).collect::<Vec<u64>>());
    Ok(arrow::compute::take(array.as_ref(), &idx, None)?)
}

fn filter_arrow(array: &ArrayRef, mask: &BitSlice) -> Result<ArrayRef> {
    let predicate = BooleanArray::from(mask.iter().by_vals().collect::<Vec<bool>>());
    Ok(arrow::compute::filter(array.as_ref(), &predicate)?)
}

impl From<RangeValues> for ArrayValues {
    fn from(r: RangeValues) -> Self {
        ArrayValues::Range(r)
    }
}
