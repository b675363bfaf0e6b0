//! This module contains the concrete containers built on the base mixins:
//! `Series` and `Index` (one-dimensional, `IndexOpsMixin`), `DataFrame`
//! (labelled columns) and `ColumnSelector` (`SelectionMixin` views over a
//! frame or series).

use crate::error::{Result, TabulaError};
use std::sync::Arc;

/// Named arithmetic wrappers over `IndexOpsMixin::arith_method`, one per
/// operator.
macro_rules! arith_methods {
    () => {
        arith_methods!(
            add => Add, sub => Sub, mul => Mul, truediv => TrueDiv, floordiv => FloorDiv,
            rem => Mod, pow => Pow, radd => RAdd, rsub => RSub, rmul => RMul,
            rtruediv => RTrueDiv, rfloordiv => RFloorDiv, rmod => RMod, rpow => RPow
        );
    };
    ($($method:ident => $op:ident),+ $(,)?) => {
        $(
            pub fn $method<O>(&self, other: O) -> $crate::error::Result<Self>
            where
                O: Into<$crate::ops::Operand>,
            {
                let op = $crate::ops::ArithOp::$op;
                $crate::base::IndexOpsMixin::arith_method(self, &other.into(), op)
            }
        )+
    };
}

pub mod dataframe;
pub mod index;
pub mod selector;
pub mod series;

pub use dataframe::DataFrame;
pub use index::Index;
pub use selector::ColumnSelector;
pub use series::Series;

/// The full object behind a selection: a frame or a single series.
#[derive(Debug, Clone)]
pub enum FrameObject {
    Frame(Arc<DataFrame>),
    Series(Arc<Series>),
}

impl FrameObject {
    pub fn ndim(&self) -> usize {
        match self {
            FrameObject::Frame(_) => 2,
            FrameObject::Series(_) => 1,
        }
    }

    /// The label space selections are validated against. A series has none.
    pub fn columns(&self) -> Vec<String> {
        match self {
            FrameObject::Frame(frame) => frame.columns().to_vec(),
            FrameObject::Series(_) => Vec::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            FrameObject::Frame(_) => None,
            FrameObject::Series(series) => crate::base::IndexOpsMixin::name(series.as_ref()),
        }
    }

    /// The column `label` as a series.
    pub fn get(&self, label: &str) -> Result<FrameObject> {
        match self {
            FrameObject::Frame(frame) => Ok(FrameObject::Series(Arc::new(frame.column(label)?))),
            FrameObject::Series(_) => Err(TabulaError::KeyError(format!("'{}'", label))),
        }
    }

    pub fn select(&self, labels: &[String]) -> Result<FrameObject> {
        match self {
            FrameObject::Frame(frame) => Ok(FrameObject::Frame(Arc::new(frame.select(labels)?))),
            FrameObject::Series(_) => Err(TabulaError::KeyError(format!(
                "Columns not found: {}",
                crate::base::selection::quoted_list(labels)
            ))),
        }
    }

    pub fn drop_columns(&self, labels: &[String]) -> Result<FrameObject> {
        match self {
            FrameObject::Frame(frame) => {
                Ok(FrameObject::Frame(Arc::new(frame.drop_columns(labels)?)))
            }
            FrameObject::Series(series) => Ok(FrameObject::Series(series.clone())),
        }
    }
}

impl From<DataFrame> for FrameObject {
    fn from(frame: DataFrame) -> Self {
        FrameObject::Frame(Arc::new(frame))
    }
}

impl From<Series> for FrameObject {
    fn from(series: Series) -> Self {
        FrameObject::Series(Arc::new(series))
    }
}

impl From<Arc<DataFrame>> for FrameObject {
    fn from(frame: Arc<DataFrame>) -> Self {
        FrameObject::Frame(frame)
    }
}

#[cfg(test)]
mod tests;
