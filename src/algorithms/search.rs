//! Binary search and monotonicity checks over sorted values.

use super::Side;
use crate::error::{Result, TabulaError};
use crate::scalar::Scalar;
use crate::values::ArrayValues;
use std::cmp::Ordering;

/// Finds the insertion points that keep `values` sorted.
///
/// `values` must be ascending under `Scalar::total_cmp`, or `sorter` must hold
/// the permutation that sorts them. `Side::Left` reports the first suitable
/// position, `Side::Right` the last.
pub fn searchsorted(
    values: &ArrayValues,
    targets: &[Scalar],
    side: Side,
    sorter: Option<&[usize]>,
) -> Result<Vec<usize>> {
    let len = values.len();
    let sorted: Vec<Scalar> = match sorter {
        Some(perm) => {
            if perm.len() != len {
                return Err(TabulaError::ValueError(format!(
                    "sorter.size must equal a.size ({} != {})",
                    perm.len(),
                    len
                )));
            }
            if perm.iter().any(|&i| i >= len) {
                return Err(TabulaError::ValueError(
                    "Sorter index out of range.".to_string(),
                ));
            }
            perm.iter().map(|&i| values.get(i)).collect()
        }
        None => values.to_scalars(),
    };

    log::debug!(
        "searchsorted: {} targets over {} values ({:?})",
        targets.len(),
        len,
        side
    );

    Ok(targets
        .iter()
        .map(|target| match side {
            Side::Left => sorted.partition_point(|v| v.total_cmp(target) == Ordering::Less),
            Side::Right => sorted.partition_point(|v| v.total_cmp(target) != Ordering::Greater),
        })
        .collect())
}

/// `true` when every element is `>=` its predecessor. Any NA makes the values
/// non-monotonic.
pub fn is_monotonic_increasing(values: &ArrayValues) -> bool {
    if let ArrayValues::Range(r) = values {
        return r.is_monotonic_increasing();
    }
    is_monotonic_by(values, |ord| ord != Ordering::Greater)
}

/// `true` when every element is `<=` its predecessor. Any NA makes the values
/// non-monotonic.
pub fn is_monotonic_decreasing(values: &ArrayValues) -> bool {
    if let ArrayValues::Range(r) = values {
        return r.is_monotonic_decreasing();
    }
    is_monotonic_by(values, |ord| ord != Ordering::Less)
}

fn is_monotonic_by(values: &ArrayValues, accept: impl Fn(Ordering) -> bool) -> bool {
    let scalars = values.to_scalars();
    if scalars.iter().any(Scalar::is_na) {
        return false;
    }
    // Strings never compare with numbers in a meaningful order.
    let textual = scalars.iter().filter(|s| s.as_str().is_some()).count();
    if textual != 0 && textual != scalars.len() {
        return false;
    }
    scalars
        .windows(2)
        .all(|pair| accept(pair[0].total_cmp(&pair[1])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_searchsorted_sides() {
        let values = ArrayValues::from_i64(vec![1, 2, 2, 3]);
        let targets = [Scalar::Int(2), Scalar::Int(0), Scalar::Int(9)];
        assert_eq!(searchsorted(&values, &targets, Side::Left, None).unwrap(), vec![1, 0, 4]);
        assert_eq!(searchsorted(&values, &targets, Side::Right, None).unwrap(), vec![3, 0, 4]);
    }

    #[test]
    fn test_searchsorted_with_sorter() {
        let values = ArrayValues::from_strs(&["c", "a", "b"]);
        let sorter = [1, 2, 0];
        let target = [Scalar::Str("bb".into())];
        let pos = searchsorted(&values, &target, Side::Left, Some(&sorter)).unwrap();
        assert_eq!(pos, vec![2]);
        assert!(searchsorted(&values, &[], Side::Left, Some(&[0, 1])).is_err());
        assert!(searchsorted(&values, &[], Side::Left, Some(&[0, 1, 7])).is_err());
    }

    #[test]
    fn test_monotonic_checks() {
        assert!(is_monotonic_increasing(&ArrayValues::from_i64(vec![1, 1, 2])));
        assert!(!is_monotonic_decreasing(&ArrayValues::from_i64(vec![1, 1, 2])));
        assert!(!is_monotonic_increasing(&ArrayValues::from_f64(vec![1.0, f64::NAN])));
        assert!(is_monotonic_decreasing(&ArrayValues::range(5, 0, -1).unwrap()));
        assert!(is_monotonic_increasing(&ArrayValues::from_strs(&["a", "b"])));
    }
}
