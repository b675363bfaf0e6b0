// In: src/base/selection.rs

//! The selection-resolution protocol.
//!
//! A `SelectionMixin` implementor represents either a whole collection (its
//! `obj`) or a sub-selection of its labels. Selecting never mutates: every
//! successful `get_item` returns a new view built by the implementor's
//! `gotitem` hook, carrying the key as its selection.
//!
//! Validation happens up front. A list key with any label outside the
//! collection's label space fails with a `KeyError` naming exactly the
//! missing labels, and selecting on a view that already carries a selection
//! fails with an `IndexError`.

use crate::error::{Result, TabulaError};
use crate::frame::{FrameObject, Series};
use crate::scalar::Scalar;
use std::fmt;
use std::str::FromStr;

//==================================================================================
// 1. Keys
//==================================================================================

/// An active selection: one label or an ordered list of labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Label(String),
    List(Vec<String>),
}

impl Selection {
    /// The selection as a sequence of labels.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Selection::Label(label) => vec![label.clone()],
            Selection::List(labels) => labels.clone(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Selection::List(_))
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Label(label) => write!(f, "{}", label),
            Selection::List(labels) => write!(f, "[{}]", quoted_list(labels)),
        }
    }
}

impl From<&str> for Selection {
    fn from(label: &str) -> Self {
        Selection::Label(label.to_string())
    }
}

impl From<String> for Selection {
    fn from(label: String) -> Self {
        Selection::Label(label)
    }
}

impl From<Vec<String>> for Selection {
    fn from(labels: Vec<String>) -> Self {
        Selection::List(labels)
    }
}

impl From<Vec<&str>> for Selection {
    fn from(labels: Vec<&str>) -> Self {
        Selection::List(labels.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Selection {
    fn from(labels: &[&str]) -> Self {
        Selection::List(labels.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Selection {
    fn from(labels: [&str; N]) -> Self {
        Selection::List(labels.iter().map(|s| s.to_string()).collect())
    }
}

/// `'a', 'b'`
pub(crate) fn quoted_list(labels: &[String]) -> String {
    labels
        .iter()
        .map(|l| format!("'{}'", l))
        .collect::<Vec<_>>()
        .join(", ")
}

//==================================================================================
// 2. Aggregation Contract
//==================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggFunc {
    Sum,
    Mean,
    Min,
    Max,
    Count,
    Nunique,
    First,
    Last,
}

impl AggFunc {
    pub fn name(&self) -> &'static str {
        match self {
            AggFunc::Sum => "sum",
            AggFunc::Mean => "mean",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
            AggFunc::Count => "count",
            AggFunc::Nunique => "nunique",
            AggFunc::First => "first",
            AggFunc::Last => "last",
        }
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AggFunc {
    type Err = TabulaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sum" => Ok(AggFunc::Sum),
            "mean" => Ok(AggFunc::Mean),
            "min" => Ok(AggFunc::Min),
            "max" => Ok(AggFunc::Max),
            "count" => Ok(AggFunc::Count),
            "nunique" => Ok(AggFunc::Nunique),
            "first" => Ok(AggFunc::First),
            "last" => Ok(AggFunc::Last),
            other => Err(TabulaError::NotImplemented(format!(
                "'{}' is not a supported aggregation",
                other
            ))),
        }
    }
}

/// What `aggregate` produces: one value for a 1-D selection, one value per
/// selected label otherwise.
#[derive(Debug, Clone)]
pub enum AggResult {
    Scalar(Scalar),
    Series(Series),
}

//==================================================================================
// 3. The Mixin
//==================================================================================

pub trait SelectionMixin: Sized {
    /// The full collection this view selects from.
    fn obj(&self) -> &FrameObject;

    fn selection(&self) -> Option<&Selection>;

    /// Builds a view of matching `ndim` carrying `key` as its selection.
    /// `subset` replaces `obj` in the new view when given.
    fn gotitem(&self, key: Selection, ndim: usize, subset: Option<&FrameObject>) -> Result<Self>;

    fn aggregate(&self, func: AggFunc) -> Result<AggResult>;

    /// Labels left out of `obj_with_exclusions`.
    fn exclusions(&self) -> &[String] {
        &[]
    }

    fn ndim(&self) -> usize {
        match self.selection() {
            None => self.obj().ndim(),
            Some(Selection::Label(_)) => 1,
            Some(Selection::List(_)) => 2,
        }
    }

    /// The active selection as a list; empty when nothing is selected.
    fn selection_list(&self) -> Vec<String> {
        self.selection().map(Selection::to_list).unwrap_or_default()
    }

    /// The selected label when exactly one label is selected.
    fn selection_name(&self) -> Option<&str> {
        match self.selection() {
            Some(Selection::Label(label)) => Some(label.as_str()),
            _ => None,
        }
    }

    /// The object the selection denotes: `obj` itself when nothing is
    /// selected or `obj` is one-dimensional, the projection otherwise.
    fn selected_obj(&self) -> Result<FrameObject> {
        let obj = self.obj();
        match self.selection() {
            None => Ok(obj.clone()),
            Some(_) if obj.ndim() == 1 => Ok(obj.clone()),
            Some(Selection::Label(label)) => obj.get(label),
            Some(Selection::List(labels)) => obj.select(labels),
        }
    }

    /// The columns an operation over this view works on.
    ///
    /// An explicit selection on a frame wins over the exclusions: the result
    /// is the frame restricted to `selection_list()`. Without a selection the
    /// excluded labels are dropped from `obj`.
    fn obj_with_exclusions(&self) -> Result<FrameObject> {
        let obj = self.obj();
        if self.selection().is_some() && obj.ndim() == 2 {
            return obj.select(&self.selection_list());
        }
        if self.exclusions().is_empty() {
            return Ok(obj.clone());
        }
        obj.drop_columns(self.exclusions())
    }

    /// Narrows the view to `key`.
    ///
    /// Fails with `IndexError` when a selection is already active, and with
    /// `KeyError` when any requested label is missing from `obj`.
    fn get_item<K: Into<Selection>>(&self, key: K) -> Result<Self> {
        if let Some(active) = self.selection() {
            return Err(TabulaError::IndexError(format!(
                "Column(s) {} already selected",
                active
            )));
        }

        let obj = self.obj();
        let columns = obj.columns();
        match key.into() {
            Selection::List(keys) => {
                let mut distinct: Vec<&String> = Vec::with_capacity(keys.len());
                for k in &keys {
                    if !distinct.contains(&k) {
                        distinct.push(k);
                    }
                }
                let matched = distinct.iter().filter(|k| columns.contains(**k)).count();
                if matched != distinct.len() {
                    let bad: Vec<String> = distinct
                        .into_iter()
                        .filter(|k| !columns.contains(*k))
                        .cloned()
                        .collect();
                    return Err(TabulaError::KeyError(format!(
                        "Columns not found: {}",
                        quoted_list(&bad)
                    )));
                }
                let ndim = if keys.len() == 1 { 1 } else { 2 };
                log::debug!("get_item: list selection {:?} (ndim {})", keys, ndim);
                self.gotitem(Selection::List(keys), ndim, None)
            }
            Selection::Label(label) => {
                if !columns.contains(&label) {
                    return Err(TabulaError::KeyError(format!(
                        "Column not found: {}",
                        label
                    )));
                }
                let ndim = obj.get(&label)?.ndim();
                log::debug!("get_item: label selection '{}' (ndim {})", label, ndim);
                self.gotitem(Selection::Label(label), ndim, None)
            }
        }
    }

    /// The key a result derived from `subset` should expose, or `None`.
    ///
    /// A 1-D subset keeps the key when it is absent or names the subset. A 2-D
    /// subset keeps a single label it contains, or a list equal to its
    /// columns in the same order.
    fn infer_selection(&self, key: Option<&Selection>, subset: &FrameObject) -> Option<Selection> {
        match (subset.ndim(), key) {
            (1, None) => None,
            (1, Some(Selection::Label(label))) if subset.name() == Some(label.as_str()) => {
                key.cloned()
            }
            (2, Some(Selection::Label(label))) if subset.columns().contains(label) => {
                key.cloned()
            }
            (2, Some(Selection::List(labels))) if subset.columns() == *labels => key.cloned(),
            _ => None,
        }
    }

    fn agg(&self, func: AggFunc) -> Result<AggResult> {
        self.aggregate(func)
    }
}
