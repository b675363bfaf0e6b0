//! The dynamically-typed element value used at the boundaries of the base layer.
//!
//! Containers store their data in Arrow arrays (see `values`), but labels,
//! search targets, mapper inputs/outputs and reductions all need a single
//! element type that can hold any supported value. `Scalar` is that type.
//!
//! Equality and hashing follow the conventions the algorithms need:
//! every `NaN` equals every other `NaN`, and an integral float equals the
//! integer with the same value, so `Int(1)` and `Float(1.0)` land in the same
//! hash bucket.

use crate::error::{Result, TabulaError};
use crate::types::DType;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// `true` for the missing-value markers: `Null` and a `NaN` float.
    pub fn is_na(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Int(_) | Scalar::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Bool(b) => Some(i64::from(*b)),
            Scalar::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The element's type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "NoneType",
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "int",
            Scalar::Float(_) => "float",
            Scalar::Str(_) => "str",
        }
    }

    /// Quoted representation: strings get single quotes, everything else
    /// prints as with `Display`.
    pub fn repr(&self) -> String {
        match self {
            Scalar::Str(s) => format!("'{}'", s),
            other => other.to_string(),
        }
    }

    /// Casts the value into the element domain of `dtype`.
    ///
    /// The output is normalized for that dtype: masked and object dtypes keep
    /// `Null` for missing values, `Float64` turns them into `NaN`, and the
    /// non-nullable `Int64`/`Bool` dtypes reject them.
    pub fn cast(&self, dtype: DType) -> Result<Scalar> {
        if self.is_na() {
            return match dtype {
                DType::Float64 => Ok(Scalar::Float(f64::NAN)),
                DType::Int64 => Err(TabulaError::ValueError(
                    "Cannot convert non-finite values (NA or inf) to integer".to_string(),
                )),
                DType::Bool => Err(TabulaError::ValueError(
                    "Cannot convert NA to a non-nullable boolean".to_string(),
                )),
                _ => Ok(Scalar::Null),
            };
        }

        match dtype {
            DType::Int64 | DType::MaskedInt64 => match self {
                Scalar::Bool(b) => Ok(Scalar::Int(i64::from(*b))),
                Scalar::Int(i) => Ok(Scalar::Int(*i)),
                Scalar::Float(f) if f.is_finite() => Ok(Scalar::Int(f.trunc() as i64)),
                Scalar::Float(_) => Err(TabulaError::ValueError(
                    "Cannot convert non-finite values (NA or inf) to integer".to_string(),
                )),
                Scalar::Str(s) => s.trim().parse::<i64>().map(Scalar::Int).map_err(|_| {
                    TabulaError::ValueError(format!(
                        "invalid literal for int() with base 10: '{}'",
                        s
                    ))
                }),
                Scalar::Null => Ok(Scalar::Null),
            },
            DType::Float64 | DType::MaskedFloat64 => match self {
                Scalar::Str(s) => s.trim().parse::<f64>().map(Scalar::Float).map_err(|_| {
                    TabulaError::ValueError(format!(
                        "could not convert string to float: '{}'",
                        s
                    ))
                }),
                other => Ok(Scalar::Float(other.as_f64().unwrap_or(f64::NAN))),
            },
            DType::Bool | DType::MaskedBool => match self {
                Scalar::Bool(b) => Ok(Scalar::Bool(*b)),
                Scalar::Int(i) => Ok(Scalar::Bool(*i != 0)),
                Scalar::Float(f) => Ok(Scalar::Bool(*f != 0.0)),
                Scalar::Str(s) => Ok(Scalar::Bool(!s.is_empty())),
                Scalar::Null => Ok(Scalar::Null),
            },
            DType::MaskedString => match self {
                Scalar::Str(s) => Ok(Scalar::Str(s.clone())),
                other => Ok(Scalar::Str(other.to_string())),
            },
            DType::Object => Ok(self.clone()),
        }
    }

    /// A total order over all scalars.
    ///
    /// Booleans and numbers compare by numeric value, strings come after all
    /// numbers, and missing values sort last (`NaN` before `Null`).
    pub fn total_cmp(&self, other: &Scalar) -> Ordering {
        fn rank(s: &Scalar) -> u8 {
            match s {
                Scalar::Float(f) if f.is_nan() => 2,
                Scalar::Bool(_) | Scalar::Int(_) | Scalar::Float(_) => 0,
                Scalar::Str(_) => 1,
                Scalar::Null => 3,
            }
        }

        match rank(self).cmp(&rank(other)) {
            Ordering::Equal => {}
            unequal => return unequal,
        }

        match (self, other) {
            (Scalar::Str(a), Scalar::Str(b)) => a.cmp(b),
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
        }
    }
}

/// The integer `f` denotes exactly, if any. `i64::MAX as f64` is 2^63 and
/// lies outside the `i64` range.
fn exact_i64(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => (a.is_nan() && b.is_nan()) || a == b,
            (Scalar::Int(i), Scalar::Float(f)) | (Scalar::Float(f), Scalar::Int(i)) => {
                exact_i64(*f) == Some(*i)
            }
            _ => false,
        }
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Scalar::Null => 0u8.hash(state),
            Scalar::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Scalar::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Scalar::Float(f) => {
                if f.is_nan() {
                    3u8.hash(state);
                } else if let Some(i) = exact_i64(*f) {
                    // Integral floats share the integer's bucket.
                    2u8.hash(state);
                    i.hash(state);
                } else {
                    4u8.hash(state);
                    // +0.0 and -0.0 are equal and must hash alike.
                    let bits = if *f == 0.0 { 0u64 } else { f.to_bits() };
                    bits.hash(state);
                }
            }
            Scalar::Str(s) => {
                5u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "<NA>"),
            Scalar::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) if x.is_nan() => write!(f, "NaN"),
            Scalar::Float(x) => write!(f, "{:?}", x),
            Scalar::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(i64::from(v))
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map_or(Scalar::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(s: &Scalar) -> u64 {
        let mut h = DefaultHasher::new();
        s.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_int_float_equality_is_exact() {
        let two_63 = Scalar::Float(9_223_372_036_854_775_808.0);
        assert_ne!(Scalar::Int(i64::MAX), two_63);
        assert_eq!(Scalar::Int(i64::MIN), Scalar::Float(i64::MIN as f64));
        assert_eq!(hash_of(&Scalar::Int(i64::MIN)), hash_of(&Scalar::Float(i64::MIN as f64)));

        // 2^53 + 1 has no f64 representation; it must not equal 2^53.
        let big = 1i64 << 53;
        assert_eq!(Scalar::Int(big), Scalar::Float(big as f64));
        assert_ne!(Scalar::Int(big + 1), Scalar::Float(big as f64));
        assert_ne!(Scalar::Int(big + 1), Scalar::Int(big));
        assert_eq!(Scalar::Int(3), Scalar::Float(3.0));
        assert_ne!(Scalar::Int(3), Scalar::Float(3.5));
    }

    #[test]
    fn test_nan_equals_nan_and_hashes_alike() {
        let a = Scalar::Float(f64::NAN);
        let b = Scalar::Float(-f64::NAN);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert!(a.is_na());
        assert!(Scalar::Null.is_na());
        assert!(!Scalar::Int(0).is_na());
    }

    #[test]
    fn test_integral_float_matches_int() {
        assert_eq!(Scalar::Int(3), Scalar::Float(3.0));
        assert_eq!(hash_of(&Scalar::Int(3)), hash_of(&Scalar::Float(3.0)));
        assert_ne!(Scalar::Int(3), Scalar::Float(3.5));
    }

    #[test]
    fn test_total_cmp_puts_na_last() {
        let mut values = vec![
            Scalar::Null,
            Scalar::Str("b".into()),
            Scalar::Float(f64::NAN),
            Scalar::Int(2),
            Scalar::Float(1.5),
            Scalar::Str("a".into()),
        ];
        values.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(values[0], Scalar::Float(1.5));
        assert_eq!(values[1], Scalar::Int(2));
        assert_eq!(values[2], Scalar::Str("a".into()));
        assert_eq!(values[3], Scalar::Str("b".into()));
        assert!(matches!(values[4], Scalar::Float(f) if f.is_nan()));
        assert_eq!(values[5], Scalar::Null);
    }

    #[test]
    fn test_cast_rules() {
        assert_eq!(Scalar::Float(2.9).cast(DType::Int64).unwrap(), Scalar::Int(2));
        assert!(Scalar::Null.cast(DType::Int64).is_err());
        assert_eq!(Scalar::Null.cast(DType::MaskedInt64).unwrap(), Scalar::Null);
        assert!(Scalar::Null.cast(DType::Float64).unwrap().is_na());
        assert_eq!(
            Scalar::Int(7).cast(DType::MaskedString).unwrap(),
            Scalar::Str("7".into())
        );
        assert!(Scalar::Str("x".into()).cast(DType::Float64).is_err());
    }
}
