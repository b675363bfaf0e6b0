//! This module defines the canonical, type-safe representation of the dtypes
//! a container's backing values can carry.

use crate::error::TabulaError;
use arrow::datatypes::DataType as ArrowDataType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The dtype of a container's backing values.
///
/// The lowercase family (`Int64`, `Float64`, `Bool`, `Object`) are the
/// canonical "native" dtypes whose storage has no validity mask. The
/// `Masked*` family are extension dtypes: the same physical data plus an NA
/// mask, so integers and booleans can hold missing values without being
/// promoted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DType {
    Int64,
    Float64,
    Bool,
    Object,
    MaskedInt64,
    MaskedFloat64,
    MaskedBool,
    MaskedString,
}

impl DType {
    /// Converts an Arrow `DataType` into a `DType`.
    ///
    /// `masked` selects between the native and the masked family; Arrow
    /// strings only exist in masked form, so `Utf8` always maps to
    /// `MaskedString`.
    pub fn from_arrow_type(arrow_type: &ArrowDataType, masked: bool) -> Result<Self, TabulaError> {
        match (arrow_type, masked) {
            (ArrowDataType::Int64, false) => Ok(Self::Int64),
            (ArrowDataType::Int64, true) => Ok(Self::MaskedInt64),
            (ArrowDataType::Float64, false) => Ok(Self::Float64),
            (ArrowDataType::Float64, true) => Ok(Self::MaskedFloat64),
            (ArrowDataType::Boolean, false) => Ok(Self::Bool),
            (ArrowDataType::Boolean, true) => Ok(Self::MaskedBool),
            (ArrowDataType::Utf8, _) => Ok(Self::MaskedString),
            (dt, _) => Err(TabulaError::TypeError(format!(
                "Cannot convert Arrow type {:?} to a tabula dtype",
                dt
            ))),
        }
    }

    /// Converts a `DType` back into an Arrow `DataType`.
    ///
    /// `Object` has no Arrow counterpart and returns `None`.
    pub fn to_arrow_type(&self) -> Option<ArrowDataType> {
        match self {
            Self::Int64 | Self::MaskedInt64 => Some(ArrowDataType::Int64),
            Self::Float64 | Self::MaskedFloat64 => Some(ArrowDataType::Float64),
            Self::Bool | Self::MaskedBool => Some(ArrowDataType::Boolean),
            Self::MaskedString => Some(ArrowDataType::Utf8),
            Self::Object => None,
        }
    }

    /// Returns `true` for the extension dtypes that carry an NA mask.
    pub fn is_masked(&self) -> bool {
        matches!(
            self,
            Self::MaskedInt64 | Self::MaskedFloat64 | Self::MaskedBool | Self::MaskedString
        )
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Int64 | Self::MaskedInt64)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float64 | Self::MaskedFloat64)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool | Self::MaskedBool)
    }

    /// Integers and floats, native or masked.
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Object and string dtypes: the ones whose elements are not fixed-width.
    pub fn is_string_like(&self) -> bool {
        matches!(self, Self::Object | Self::MaskedString)
    }

    /// The canonical native dtype backing this one.
    pub fn numpy_dtype(&self) -> DType {
        match self {
            Self::MaskedInt64 => Self::Int64,
            Self::MaskedFloat64 => Self::Float64,
            Self::MaskedBool => Self::Bool,
            Self::MaskedString => Self::Object,
            native => *native,
        }
    }

    /// The masked counterpart of a native dtype. `Object` has none and maps
    /// to itself.
    pub fn to_masked(&self) -> DType {
        match self {
            Self::Int64 => Self::MaskedInt64,
            Self::Float64 => Self::MaskedFloat64,
            Self::Bool => Self::MaskedBool,
            other => *other,
        }
    }

    /// Bytes per element of the value buffer. Object and string elements are
    /// counted as one pointer each.
    pub fn itemsize(&self) -> usize {
        match self {
            Self::Bool | Self::MaskedBool => 1,
            _ => 8,
        }
    }

    /// The canonical dtype name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::Object => "object",
            Self::MaskedInt64 => "Int64",
            Self::MaskedFloat64 => "Float64",
            Self::MaskedBool => "boolean",
            Self::MaskedString => "string",
        }
    }
}

/// Provides the canonical string representation for a `DType`.
impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_type_mapping() {
        assert_eq!(
            DType::from_arrow_type(&ArrowDataType::Int64, false).unwrap(),
            DType::Int64
        );
        assert_eq!(
            DType::from_arrow_type(&ArrowDataType::Int64, true).unwrap(),
            DType::MaskedInt64
        );
        assert_eq!(
            DType::from_arrow_type(&ArrowDataType::Utf8, false).unwrap(),
            DType::MaskedString
        );
        assert!(DType::from_arrow_type(&ArrowDataType::Int8, false).is_err());
        assert_eq!(DType::MaskedBool.to_arrow_type(), Some(ArrowDataType::Boolean));
        assert_eq!(DType::Object.to_arrow_type(), None);
    }

    #[test]
    fn test_masked_counterparts() {
        assert_eq!(DType::MaskedInt64.numpy_dtype(), DType::Int64);
        assert_eq!(DType::Float64.to_masked(), DType::MaskedFloat64);
        assert!(DType::MaskedString.is_masked());
        assert!(!DType::Object.is_masked());
        assert_eq!(DType::MaskedBool.to_string(), "boolean");
    }
}
