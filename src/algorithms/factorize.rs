//! This module contains the hash-based encoding kernels: `factorize_array`,
//! `unique1d`, `value_counts` and `duplicated`.
//!
//! All of them walk the values once, assigning each distinct value the next
//! dense id in order of first appearance. Missing values share a single hash
//! key, so a column holding both `None` and `NaN` has one NA unique.

use super::{hash_key, Keep};
use crate::error::Result;
use crate::scalar::Scalar;
use crate::values::{ArrayValues, RangeValues};
use bitvec::prelude::*;
use hashbrown::HashMap;

/// Code assigned to missing values when the NA sentinel is in use.
pub const NA_SENTINEL: i64 = -1;

/// Encodes `values` as `(codes, uniques)` such that `uniques[codes[i]]`
/// reproduces `values[i]`.
///
/// With `use_na_sentinel`, missing values get code `-1` and are left out of
/// the uniques; otherwise NA is one more unique. With `sort`, the uniques are
/// ordered (NA last) and the codes remapped accordingly. The uniques keep the
/// dtype of the input.
pub fn factorize_array(
    values: &ArrayValues,
    sort: bool,
    use_na_sentinel: bool,
) -> Result<(Vec<i64>, ArrayValues)> {
    if let ArrayValues::Range(r) = values {
        return Ok(factorize_range(r, sort));
    }

    let len = values.len();
    let mut table = HashMap::<Scalar, i64>::new();
    let mut uniques: Vec<Scalar> = Vec::new();
    let mut codes = Vec::with_capacity(len);

    for i in 0..len {
        let value = values.get(i);
        if use_na_sentinel && value.is_na() {
            codes.push(NA_SENTINEL);
            continue;
        }
        let code = *table.entry(hash_key(&value)).or_insert_with(|| {
            uniques.push(value.clone());
            (uniques.len() - 1) as i64
        });
        codes.push(code);
    }

    if sort {
        let mut order: Vec<usize> = (0..uniques.len()).collect();
        order.sort_by(|&a, &b| uniques[a].total_cmp(&uniques[b]));
        let mut rank = vec![0i64; uniques.len()];
        for (new, &old) in order.iter().enumerate() {
            rank[old] = new as i64;
        }
        for code in codes.iter_mut().filter(|c| **c != NA_SENTINEL) {
            *code = rank[*code as usize];
        }
        uniques = order.into_iter().map(|i| uniques[i].clone()).collect();
    }

    log_metric!("event"="factorize", "len"=&len, "uniques"=&uniques.len());
    let uniques = ArrayValues::from_scalars(uniques, Some(values.dtype()))?;
    Ok((codes, uniques))
}

/// A range never repeats, so every element is its own unique.
fn factorize_range(r: &RangeValues, sort: bool) -> (Vec<i64>, ArrayValues) {
    let len = r.len() as i64;
    if sort && r.step() < 0 && len > 1 {
        let last = r.get(r.len() - 1);
        // The ascending range ends at the original start; `start + 1` is an
        // exclusive stop for any positive step.
        let reversed = match (r.start().checked_add(1), r.step().checked_neg()) {
            (Some(stop), Some(step)) => RangeValues::new(last, stop, step).ok(),
            _ => None,
        };
        let uniques = match reversed {
            Some(asc) => ArrayValues::Range(asc),
            None => ArrayValues::from_i64(r.to_vec().into_iter().rev().collect()),
        };
        let codes = (0..len).rev().collect();
        (codes, uniques)
    } else {
        ((0..len).collect(), ArrayValues::Range(r.clone()))
    }
}

/// Distinct values in order of first appearance, NA included once.
pub fn unique1d(values: &ArrayValues) -> Result<ArrayValues> {
    if values.is_range() {
        return Ok(values.clone());
    }
    let (_, uniques) = factorize_array(values, false, false)?;
    Ok(uniques)
}

/// Counts occurrences of each distinct value.
///
/// Returns the distinct values and their counts. With `sort`, entries are
/// ordered by count (descending unless `ascending`), ties keeping their order
/// of first appearance. With `dropna`, missing values are not counted.
pub fn value_counts(
    values: &ArrayValues,
    sort: bool,
    ascending: bool,
    dropna: bool,
) -> Result<(ArrayValues, Vec<i64>)> {
    let (codes, uniques) = factorize_array(values, false, dropna)?;
    let mut counts = vec![0i64; uniques.len()];
    for code in codes.into_iter().filter(|c| *c >= 0) {
        counts[code as usize] += 1;
    }

    let mut order: Vec<usize> = (0..counts.len()).collect();
    if sort {
        if ascending {
            order.sort_by_key(|&i| counts[i]);
        } else {
            order.sort_by_key(|&i| std::cmp::Reverse(counts[i]));
        }
    }
    let keys = uniques.take(&order)?;
    let counts = order.into_iter().map(|i| counts[i]).collect();
    Ok((keys, counts))
}

/// Marks repeated values. Which occurrence stays unmarked is chosen by `keep`.
pub fn duplicated(values: &ArrayValues, keep: Keep) -> BitVec {
    let len = values.len();
    let mut marks = bitvec![0; len];
    if values.is_range() {
        return marks;
    }

    let keys: Vec<Scalar> = (0..len).map(|i| hash_key(&values.get(i))).collect();
    match keep {
        Keep::First => {
            let mut seen = hashbrown::HashSet::with_capacity(len);
            for (i, key) in keys.iter().enumerate() {
                if !seen.insert(key) {
                    marks.set(i, true);
                }
            }
        }
        Keep::Last => {
            let mut seen = hashbrown::HashSet::with_capacity(len);
            for (i, key) in keys.iter().enumerate().rev() {
                if !seen.insert(key) {
                    marks.set(i, true);
                }
            }
        }
        Keep::Neither => {
            let mut counts = HashMap::<&Scalar, usize>::with_capacity(len);
            for key in &keys {
                *counts.entry(key).or_insert(0) += 1;
            }
            for (i, key) in keys.iter().enumerate() {
                if counts.get(key).copied().unwrap_or(0) > 1 {
                    marks.set(i, true);
                }
            }
        }
    }
    marks
}
