//! Extension ("masked") arrays: physical Arrow data whose validity bitmap
//! doubles as the NA mask.
//!
//! A masked array keeps integers and booleans exact in the presence of
//! missing values, where the native representation would have to promote to
//! `Float64` and use `NaN`.

use super::ArrayValues;
use crate::algorithms::{Mapper, NaAction};
use crate::error::Result;
use crate::scalar::Scalar;
use crate::types::DType;
use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MaskedArray {
    data: ArrayRef,
    dtype: DType,
}

impl MaskedArray {
    /// Wraps an Arrow array. The array's validity bitmap becomes the NA mask.
    pub fn try_new(data: ArrayRef) -> Result<Self> {
        let dtype = DType::from_arrow_type(data.data_type(), true)?;
        Ok(Self { data, dtype })
    }

    pub fn from_i64_options(values: Vec<Option<i64>>) -> Self {
        Self {
            data: Arc::new(Int64Array::from(values)),
            dtype: DType::MaskedInt64,
        }
    }

    pub fn from_f64_options(values: Vec<Option<f64>>) -> Self {
        Self {
            data: Arc::new(Float64Array::from(values)),
            dtype: DType::MaskedFloat64,
        }
    }

    pub fn from_bool_options(values: Vec<Option<bool>>) -> Self {
        Self {
            data: Arc::new(BooleanArray::from(values)),
            dtype: DType::MaskedBool,
        }
    }

    pub fn from_str_options<S: AsRef<str>>(values: &[Option<S>]) -> Self {
        let array: StringArray = values
            .iter()
            .map(|v| v.as_ref().map(AsRef::<str>::as_ref))
            .collect();
        Self {
            data: Arc::new(array),
            dtype: DType::MaskedString,
        }
    }

    pub fn data(&self) -> &ArrayRef {
        &self.data
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_na(&self, i: usize) -> bool {
        self.data.is_null(i)
    }

    pub fn na_count(&self) -> usize {
        self.data.null_count()
    }

    pub fn get(&self, i: usize) -> Scalar {
        if self.data.is_null(i) {
            return Scalar::Null;
        }
        let array = self.data.as_ref();
        match array.data_type() {
            DataType::Int64 => Scalar::Int(array.as_primitive::<Int64Type>().value(i)),
            DataType::Float64 => Scalar::Float(array.as_primitive::<Float64Type>().value(i)),
            DataType::Boolean => Scalar::Bool(array.as_boolean().value(i)),
            DataType::Utf8 => Scalar::Str(array.as_string::<i32>().value(i).to_string()),
            _ => Scalar::Null,
        }
    }

    /// Value buffer plus one byte per element for the mask.
    pub fn nbytes(&self) -> usize {
        let len = self.len();
        let values = match self.dtype {
            DType::MaskedString => {
                let strings = self.data.as_ref().as_string::<i32>();
                let offsets = (len + 1) * std::mem::size_of::<i32>();
                offsets + strings.value_data().len()
            }
            dtype => len * dtype.itemsize(),
        };
        values + len
    }

    /// Masked storage is contiguous, so the deep estimate equals `nbytes`.
    pub fn memory_usage(&self, _deep: bool) -> usize {
        self.nbytes()
    }

    /// Applies `mapper` element-wise and keeps the result masked.
    ///
    /// With `NaAction::Ignore`, NA positions are propagated without calling
    /// the mapper. The result dtype is the masked dtype matching the mapped
    /// values, or `Object` when they are heterogeneous.
    pub fn map(&self, mapper: &Mapper<'_>, na_action: Option<NaAction>) -> Result<ArrayValues> {
        let mut mapped = Vec::with_capacity(self.len());
        for i in 0..self.len() {
            let value = self.get(i);
            if value.is_na() && na_action == Some(NaAction::Ignore) {
                mapped.push(Scalar::Null);
            } else {
                mapped.push(mapper.apply(&value));
            }
        }

        let inferred = super::infer_dtype(&mapped);
        let target = match inferred {
            DType::Object if mapped.iter().all(|s| s.is_na() || s.as_str().is_some()) => {
                if mapped.iter().any(|s| s.as_str().is_some()) {
                    DType::MaskedString
                } else {
                    self.dtype
                }
            }
            DType::Object if mapped.iter().all(|s| s.is_na() || matches!(s, Scalar::Bool(_))) => {
                DType::MaskedBool
            }
            // Ints mixed with NA are inferred as floats; a masked source keeps them exact.
            DType::Float64 if mapped.iter().all(|s| s.is_na() || matches!(s, Scalar::Int(_))) => {
                DType::MaskedInt64
            }
            DType::Object => {
                return ArrayValues::from_scalars(mapped, Some(DType::Object));
            }
            other => other.to_masked(),
        };
        ArrayValues::from_scalars(mapped, Some(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_mask() {
        let m = MaskedArray::from_i64_options(vec![Some(1), None, Some(3)]);
        assert_eq!(m.dtype(), DType::MaskedInt64);
        assert_eq!(m.get(0), Scalar::Int(1));
        assert_eq!(m.get(1), Scalar::Null);
        assert!(m.is_na(1));
        assert_eq!(m.na_count(), 1);
    }

    #[test]
    fn test_nbytes_counts_mask() {
        let m = MaskedArray::from_i64_options(vec![Some(1), None, Some(3)]);
        assert_eq!(m.nbytes(), 3 * 8 + 3);
        let s = MaskedArray::from_str_options(&[Some("ab"), None, Some("c")]);
        // 4 offsets * 4 bytes + 3 bytes of string data + 3 mask bytes
        assert_eq!(s.nbytes(), 16 + 3 + 3);
    }

    #[test]
    fn test_map_keeps_mask() {
        let m = MaskedArray::from_i64_options(vec![Some(1), None, Some(3)]);
        let doubler = |s: &Scalar| match s {
            Scalar::Int(i) => Scalar::Int(i * 2),
            _ => Scalar::Null,
        };
        let mapper = Mapper::func(doubler);
        let out = m.map(&mapper, Some(NaAction::Ignore)).unwrap();
        assert_eq!(out.dtype(), DType::MaskedInt64);
        assert_eq!(out.to_scalars(), vec![Scalar::Int(2), Scalar::Null, Scalar::Int(6)]);
    }

    #[test]
    fn test_map_to_strings() {
        let m = MaskedArray::from_bool_options(vec![Some(true), None]);
        let mapper = Mapper::func(|s: &Scalar| Scalar::Str(s.to_string()));
        let out = m.map(&mapper, Some(NaAction::Ignore)).unwrap();
        assert_eq!(out.dtype(), DType::MaskedString);
        assert_eq!(out.get(0), Scalar::Str("True".into()));
        assert!(out.get(1).is_na());
    }
}
