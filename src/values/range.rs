//! A lazily evaluated integer range used as backing values.
//!
//! Range-backed containers never allocate their elements until an operation
//! needs them; `materialize` produces the equivalent native `Int64` array.

use super::ArrayValues;
use crate::algorithms::Side;
use crate::error::{Result, TabulaError};
use crate::scalar::Scalar;
use arrow::array::Int64Array;
use std::sync::Arc;

/// Bytes attributed to a range regardless of its length: start, stop, step.
const RANGE_NBYTES: usize = 3 * std::mem::size_of::<i64>();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeValues {
    start: i64,
    stop: i64,
    step: i64,
}

impl RangeValues {
    pub fn new(start: i64, stop: i64, step: i64) -> Result<Self> {
        if step == 0 {
            return Err(TabulaError::ValueError("Step must not be zero".to_string()));
        }
        Ok(Self { start, stop, step })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn stop(&self) -> i64 {
        self.stop
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn len(&self) -> usize {
        let (start, stop, step) = (
            i128::from(self.start),
            i128::from(self.stop),
            i128::from(self.step),
        );
        let n = if step > 0 && start < stop {
            (stop - start - 1) / step + 1
        } else if step < 0 && start > stop {
            (start - stop - 1) / (-step) + 1
        } else {
            0
        };
        n as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element at position `i`. The caller guarantees `i < len()`.
    pub fn get(&self, i: usize) -> i64 {
        self.start.wrapping_add(self.step.wrapping_mul(i as i64))
    }

    pub fn to_vec(&self) -> Vec<i64> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    /// Produces the equivalent native `Int64` array.
    pub fn materialize(&self) -> ArrayValues {
        ArrayValues::Native(Arc::new(Int64Array::from(self.to_vec())))
    }

    pub fn nbytes(&self) -> usize {
        RANGE_NBYTES
    }

    pub fn memory_usage(&self, _deep: bool) -> usize {
        self.nbytes()
    }

    pub fn is_monotonic_increasing(&self) -> bool {
        self.step > 0 || self.len() <= 1
    }

    pub fn is_monotonic_decreasing(&self) -> bool {
        self.step < 0 || self.len() <= 1
    }

    /// Closed-form insertion point for an ascending range.
    ///
    /// Returns `None` for descending ranges; the caller then searches the
    /// materialized values instead.
    pub fn searchsorted(&self, value: &Scalar, side: Side) -> Option<usize> {
        if self.step < 0 && self.len() > 1 {
            return None;
        }
        let len = self.len();
        let v = match value {
            // Strings and missing values sort after every number.
            Scalar::Str(_) | Scalar::Null => return Some(len),
            Scalar::Float(f) if f.is_nan() => return Some(len),
            Scalar::Float(f) => return Some(self.float_position(*f, side)),
            Scalar::Int(i) => i128::from(*i),
            Scalar::Bool(b) => i128::from(*b),
        };
        let step = i128::from(self.step.max(1));
        let offset = v - i128::from(self.start);
        let floor = offset.div_euclid(step);
        let raw = match side {
            Side::Left if offset.rem_euclid(step) == 0 => floor,
            _ => floor + 1,
        };
        Some(raw.clamp(0, len as i128) as usize)
    }

    fn float_position(&self, v: f64, side: Side) -> usize {
        let step = self.step.max(1) as f64;
        let offset = (v - self.start as f64) / step;
        let raw = match side {
            Side::Left => offset.ceil(),
            Side::Right => offset.floor() + 1.0,
        };
        raw.clamp(0.0, self.len() as f64) as usize
    }
}

impl TryFrom<std::ops::Range<i64>> for RangeValues {
    type Error = TabulaError;

    fn try_from(r: std::ops::Range<i64>) -> Result<Self> {
        RangeValues::new(r.start, r.end, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_matches_python_range() {
        assert_eq!(RangeValues::new(0, 5, 1).unwrap().len(), 5);
        assert_eq!(RangeValues::new(0, 10, 3).unwrap().len(), 4);
        assert_eq!(RangeValues::new(10, 0, -3).unwrap().len(), 4);
        assert_eq!(RangeValues::new(5, 0, 1).unwrap().len(), 0);
        assert!(RangeValues::new(0, 5, 0).is_err());
    }

    #[test]
    fn test_materialize_descending() {
        let r = RangeValues::new(10, 0, -3).unwrap();
        assert_eq!(r.to_vec(), vec![10, 7, 4, 1]);
        assert_eq!(r.materialize().len(), 4);
        assert!(r.is_monotonic_decreasing());
        assert!(!r.is_monotonic_increasing());
    }

    #[test]
    fn test_closed_form_searchsorted() {
        // [0, 2, 4, 6, 8]
        let r = RangeValues::new(0, 10, 2).unwrap();
        assert_eq!(r.searchsorted(&Scalar::Int(4), Side::Left), Some(2));
        assert_eq!(r.searchsorted(&Scalar::Int(4), Side::Right), Some(3));
        assert_eq!(r.searchsorted(&Scalar::Int(5), Side::Left), Some(3));
        assert_eq!(r.searchsorted(&Scalar::Int(-1), Side::Right), Some(0));
        assert_eq!(r.searchsorted(&Scalar::Int(100), Side::Left), Some(5));
        assert_eq!(r.searchsorted(&Scalar::Null, Side::Left), Some(5));
        assert_eq!(
            RangeValues::new(5, 0, -1).unwrap().searchsorted(&Scalar::Int(1), Side::Left),
            None
        );
    }

    #[test]
    fn test_searchsorted_exact_beyond_f64_precision() {
        // [MAX - 10, MAX - 9, ..., MAX - 1]
        let r = RangeValues::new(i64::MAX - 10, i64::MAX, 1).unwrap();
        assert_eq!(r.searchsorted(&Scalar::Int(i64::MAX - 5), Side::Left), Some(5));
        assert_eq!(r.searchsorted(&Scalar::Int(i64::MAX - 5), Side::Right), Some(6));
        assert_eq!(r.searchsorted(&Scalar::Int(i64::MAX), Side::Left), Some(10));
        assert_eq!(r.searchsorted(&Scalar::Int(i64::MIN), Side::Right), Some(0));

        let wide = RangeValues::new(i64::MIN, i64::MAX, 3).unwrap();
        assert_eq!(wide.searchsorted(&Scalar::Int(i64::MIN + 4), Side::Left), Some(2));
        assert_eq!(wide.searchsorted(&Scalar::Int(i64::MIN + 3), Side::Right), Some(2));
        assert_eq!(r.searchsorted(&Scalar::Float(0.5), Side::Left), Some(0));
    }
}
