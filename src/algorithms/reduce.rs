//! Column reductions used by `aggregate`.
//!
//! Every reduction skips missing values. Empty (or all-NA) input reduces to
//! the neutral result of the function: `0` for `sum`, `NaN` for `mean`, `min`
//! and `max`, NA for `first`/`last`.

use crate::base::AggFunc;
use crate::error::{Result, TabulaError};
use crate::scalar::Scalar;
use crate::values::ArrayValues;
use num_traits::{ToPrimitive, Zero};
use std::cmp::Ordering;

pub fn reduce(values: &ArrayValues, func: AggFunc) -> Result<Scalar> {
    let present: Vec<Scalar> = values.to_scalars().into_iter().filter(|s| !s.is_na()).collect();
    let dtype = values.dtype();

    match func {
        AggFunc::Count => Ok(Scalar::Int(present.len() as i64)),
        AggFunc::Nunique => {
            let distinct: hashbrown::HashSet<&Scalar> = present.iter().collect();
            Ok(Scalar::Int(distinct.len() as i64))
        }
        AggFunc::First => Ok(present.first().cloned().unwrap_or(Scalar::Null)),
        AggFunc::Last => Ok(present.last().cloned().unwrap_or(Scalar::Null)),
        AggFunc::Min => Ok(extreme(&present, Ordering::Less)?),
        AggFunc::Max => Ok(extreme(&present, Ordering::Greater)?),
        AggFunc::Sum => {
            if !present.is_empty() && present.iter().all(|s| s.as_str().is_some()) {
                return Ok(Scalar::Str(
                    present.iter().filter_map(Scalar::as_str).collect(),
                ));
            }
            if let Some(bad) = present.iter().find(|s| s.as_str().is_some()) {
                return Err(unsupported(func, bad));
            }
            if dtype.is_float() || present.iter().any(|s| matches!(s, Scalar::Float(_))) {
                Ok(Scalar::Float(sum(present.iter().filter_map(Scalar::as_f64))))
            } else {
                Ok(Scalar::Int(
                    present
                        .iter()
                        .filter_map(Scalar::as_i64)
                        .fold(0i64, i64::wrapping_add),
                ))
            }
        }
        AggFunc::Mean => {
            if let Some(bad) = present.iter().find(|s| s.as_str().is_some()) {
                return Err(unsupported(func, bad));
            }
            let numbers: Vec<f64> = present.iter().filter_map(Scalar::as_f64).collect();
            Ok(Scalar::Float(mean(&numbers).unwrap_or(f64::NAN)))
        }
    }
}

fn sum<T: Zero>(items: impl Iterator<Item = T>) -> T {
    items.fold(T::zero(), |acc, x| acc + x)
}

fn mean<T: ToPrimitive + Copy>(items: &[T]) -> Option<f64> {
    if items.is_empty() {
        return None;
    }
    let total: f64 = sum(items.iter().filter_map(|x| x.to_f64()));
    Some(total / items.len() as f64)
}

fn extreme(present: &[Scalar], wanted: Ordering) -> Result<Scalar> {
    let mut best: Option<&Scalar> = None;
    for value in present {
        if let Some(current) = best {
            let comparable = current.as_str().is_some() == value.as_str().is_some();
            if !comparable {
                return Err(TabulaError::TypeError(format!(
                    "'{}' not supported between instances of '{}' and '{}'",
                    if wanted == Ordering::Less { "<" } else { ">" },
                    value.type_name(),
                    current.type_name()
                )));
            }
            if value.total_cmp(current) == wanted {
                best = Some(value);
            }
        } else {
            best = Some(value);
        }
    }
    Ok(best.cloned().unwrap_or(Scalar::Float(f64::NAN)))
}

fn unsupported(func: AggFunc, value: &Scalar) -> TabulaError {
    TabulaError::TypeError(format!(
        "Could not {} values of type '{}'",
        func,
        value.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_reductions_skip_na() {
        let values = ArrayValues::masked_i64(vec![Some(4), None, Some(2)]);
        assert_eq!(reduce(&values, AggFunc::Sum).unwrap(), Scalar::Int(6));
        assert_eq!(reduce(&values, AggFunc::Mean).unwrap(), Scalar::Float(3.0));
        assert_eq!(reduce(&values, AggFunc::Min).unwrap(), Scalar::Int(2));
        assert_eq!(reduce(&values, AggFunc::Max).unwrap(), Scalar::Int(4));
        assert_eq!(reduce(&values, AggFunc::Count).unwrap(), Scalar::Int(2));
        assert_eq!(reduce(&values, AggFunc::First).unwrap(), Scalar::Int(4));
        assert_eq!(reduce(&values, AggFunc::Last).unwrap(), Scalar::Int(2));
    }

    #[test]
    fn test_empty_reductions() {
        let values = ArrayValues::from_f64(vec![f64::NAN]);
        assert_eq!(reduce(&values, AggFunc::Sum).unwrap(), Scalar::Float(0.0));
        assert!(reduce(&values, AggFunc::Mean).unwrap().is_na());
        assert!(reduce(&values, AggFunc::Max).unwrap().is_na());
        assert_eq!(reduce(&values, AggFunc::Nunique).unwrap(), Scalar::Int(0));
    }

    #[test]
    fn test_string_reductions() {
        let values = ArrayValues::from_strs(&["b", "a", "b"]);
        assert_eq!(reduce(&values, AggFunc::Sum).unwrap(), Scalar::Str("bab".into()));
        assert_eq!(reduce(&values, AggFunc::Min).unwrap(), Scalar::Str("a".into()));
        assert_eq!(reduce(&values, AggFunc::Nunique).unwrap(), Scalar::Int(2));
        assert!(matches!(
            reduce(&values, AggFunc::Mean),
            Err(TabulaError::TypeError(_))
        ));
    }
}
