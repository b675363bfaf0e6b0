use super::{FrameObject, Index, Series};
use crate::algorithms::reduce;
use crate::base::{AggFunc, AggResult, IndexOpsMixin, Selection, SelectionMixin};
use crate::error::Result;
use crate::values::ArrayValues;

/// A selection-bearing view over a frame or series.
///
/// A fresh selector covers the whole object; `get_item` narrows it to one
/// column (1-D) or a list of columns (2-D) without copying any data.
#[derive(Debug, Clone)]
pub struct ColumnSelector {
    obj: FrameObject,
    selection: Option<Selection>,
    ndim: usize,
    exclusions: Vec<String>,
}

impl ColumnSelector {
    pub fn new(obj: impl Into<FrameObject>) -> Self {
        let obj = obj.into();
        let ndim = obj.ndim();
        Self {
            obj,
            selection: None,
            ndim,
            exclusions: Vec::new(),
        }
    }

    /// Labels to leave out of `obj_with_exclusions`, such as grouping keys.
    pub fn with_exclusions<S: Into<String>>(mut self, labels: Vec<S>) -> Self {
        self.exclusions = labels.into_iter().map(Into::into).collect();
        self
    }
}

impl SelectionMixin for ColumnSelector {
    fn obj(&self) -> &FrameObject {
        &self.obj
    }

    fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    fn gotitem(&self, key: Selection, ndim: usize, subset: Option<&FrameObject>) -> Result<Self> {
        Ok(Self {
            obj: subset.cloned().unwrap_or_else(|| self.obj.clone()),
            selection: Some(key),
            ndim,
            exclusions: self.exclusions.clone(),
        })
    }

    fn exclusions(&self) -> &[String] {
        &self.exclusions
    }

    fn ndim(&self) -> usize {
        self.ndim
    }

    /// Reduces the selection: one scalar for a 1-D view, a series of one
    /// value per column otherwise.
    fn aggregate(&self, func: AggFunc) -> Result<AggResult> {
        let target = self.obj_with_exclusions()?;
        log::debug!("aggregate: {} over ndim {} selection {:?}", func, self.ndim, self.selection);

        match target {
            FrameObject::Series(series) => Ok(AggResult::Scalar(reduce(series.values(), func)?)),
            FrameObject::Frame(frame) if self.ndim == 1 && frame.ncols() == 1 => {
                let column = frame.column(&frame.columns()[0])?;
                Ok(AggResult::Scalar(reduce(column.values(), func)?))
            }
            FrameObject::Frame(frame) => {
                let mut results = Vec::with_capacity(frame.ncols());
                for label in frame.columns() {
                    results.push(reduce(frame.column(label)?.values(), func)?);
                }
                let values = ArrayValues::from_scalars(results, None)?;
                let series = Series::new(values).with_index(Index::from_labels(frame.columns()))?;
                Ok(AggResult::Series(series))
            }
        }
    }
}
