use super::{Mapper, NaAction};
use crate::error::Result;
use crate::scalar::Scalar;
use crate::types::DType;
use crate::values::ArrayValues;

/// Applies `mapper` to every element of non-masked values.
///
/// With `NaAction::Ignore`, missing values are carried over without calling
/// the mapper. With `convert`, the result dtype is inferred from the mapped
/// values; otherwise the result is kept as object storage.
pub fn map_array(
    values: &ArrayValues,
    mapper: &Mapper<'_>,
    na_action: Option<NaAction>,
    convert: bool,
) -> Result<ArrayValues> {
    let mapped: Vec<Scalar> = (0..values.len())
        .map(|i| {
            let value = values.get(i);
            if value.is_na() && na_action == Some(NaAction::Ignore) {
                value
            } else {
                mapper.apply(&value)
            }
        })
        .collect();

    if convert {
        ArrayValues::from_scalars(mapped, None)
    } else {
        ArrayValues::from_scalars(mapped, Some(DType::Object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_array_infers_dtype() {
        let values = ArrayValues::from_i64(vec![1, 2, 3]);
        let mapper = Mapper::func(|s: &Scalar| Scalar::Float(s.as_f64().unwrap_or(0.0) / 2.0));
        let out = map_array(&values, &mapper, None, true).unwrap();
        assert_eq!(out, ArrayValues::from_f64(vec![0.5, 1.0, 1.5]));

        let out = map_array(&values, &mapper, None, false).unwrap();
        assert_eq!(out.dtype(), DType::Object);
    }

    #[test]
    fn test_map_array_na_action() {
        let values = ArrayValues::from_f64(vec![1.0, f64::NAN]);
        let mapper = Mapper::func(|s: &Scalar| Scalar::Str(s.to_string()));
        let out = map_array(&values, &mapper, Some(NaAction::Ignore), true).unwrap();
        assert_eq!(out.get(0), Scalar::Str("1.0".into()));
        assert!(out.get(1).is_na());

        let out = map_array(&values, &mapper, None, true).unwrap();
        assert_eq!(out.get(1), Scalar::Str("NaN".into()));
    }

    #[test]
    fn test_map_array_with_dict() {
        let values = ArrayValues::from_strs(&["a", "b", "z"]);
        let mapper = Mapper::dict(vec![("a", 1i64), ("b", 2i64)]);
        let out = map_array(&values, &mapper, None, true).unwrap();
        assert_eq!(out.dtype(), DType::Float64);
        assert_eq!(out.get(1), Scalar::Float(2.0));
        assert!(out.get(2).is_na());
    }
}
