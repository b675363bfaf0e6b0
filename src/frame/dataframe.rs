// In: src/frame/dataframe.rs

//! A two-dimensional container: ordered, uniquely labelled columns of equal
//! length. Columns convert to and from Arrow `RecordBatch`es.

use super::{Index, Series};
use crate::base::IndexOpsMixin;
use crate::config::TabulaConfig;
use crate::error::{Result, TabulaError};
use crate::values::ArrayValues;
use arrow::record_batch::RecordBatch;
use arrow_schema::{Field, Schema};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct DataFrame {
    columns: Vec<String>,
    data: Vec<ArrayValues>,
    nrows: usize,
}

impl DataFrame {
    /// Builds a frame from `(label, values)` pairs.
    ///
    /// Labels must be unique and every column must have the same length.
    pub fn new<S: Into<String>>(columns: Vec<(S, ArrayValues)>) -> Result<Self> {
        let mut labels: Vec<String> = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());
        for (label, values) in columns {
            let label = label.into();
            if labels.contains(&label) {
                return Err(TabulaError::ValueError(format!(
                    "Duplicate column label '{}'",
                    label
                )));
            }
            labels.push(label);
            data.push(values);
        }

        let nrows = data.first().map(ArrayValues::len).unwrap_or(0);
        if data.iter().any(|c| c.len() != nrows) {
            return Err(TabulaError::ValueError(
                "All arrays must be of the same length".to_string(),
            ));
        }
        Ok(Self {
            columns: labels,
            data,
            nrows,
        })
    }

    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        let columns = schema
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(field, array)| {
                Ok((field.name().clone(), ArrayValues::from_arrow(array.clone())?))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(columns)
    }

    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let arrays = self
            .data
            .iter()
            .map(ArrayValues::to_arrow)
            .collect::<Result<Vec<_>>>()?;
        Ok(RecordBatch::try_new(Arc::new(self.schema()?), arrays)?)
    }

    /// The Arrow schema of the frame. Masked and object columns are nullable.
    pub fn schema(&self) -> Result<Schema> {
        let fields = self
            .columns
            .iter()
            .zip(&self.data)
            .map(|(label, values)| {
                let dtype = values.dtype();
                let arrow_type = match dtype.to_arrow_type() {
                    Some(t) => t,
                    None => values.to_arrow()?.data_type().clone(),
                };
                let nullable = dtype.is_masked() || (!dtype.is_numeric() && !dtype.is_bool());
                Ok(Field::new(label.as_str(), arrow_type, nullable))
            })
            .collect::<Result<Vec<Field>>>()?;
        Ok(Schema::new(fields))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.columns.len())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.columns.iter().any(|c| c == label)
    }

    fn position(&self, label: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == label)
            .ok_or_else(|| TabulaError::KeyError(format!("'{}'", label)))
    }

    /// The column `label` as a series named after it.
    pub fn column(&self, label: &str) -> Result<Series> {
        let pos = self.position(label)?;
        Ok(Series::new(self.data[pos].clone()).with_name(label))
    }

    /// The columns `labels`, in the requested order.
    pub fn select<S: AsRef<str>>(&self, labels: &[S]) -> Result<DataFrame> {
        let columns = labels
            .iter()
            .map(|l| {
                let pos = self.position(l.as_ref())?;
                Ok((self.columns[pos].clone(), self.data[pos].clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        DataFrame::new(columns)
    }

    /// Every column except `labels`. Unknown labels are a `KeyError`.
    pub fn drop_columns<S: AsRef<str>>(&self, labels: &[S]) -> Result<DataFrame> {
        for label in labels {
            self.position(label.as_ref())?;
        }
        let kept: Vec<&String> = self
            .columns
            .iter()
            .filter(|c| !labels.iter().any(|l| l.as_ref() == c.as_str()))
            .collect();
        self.select(&kept)
    }

    /// Bytes per column, as a series indexed by the column labels. `deep`
    /// falls back to the configured default when not given.
    pub fn memory_usage(&self, deep: Option<bool>) -> Result<Series> {
        let deep = deep.unwrap_or_else(|| TabulaConfig::current().memory_usage_deep);
        let mut usage = Vec::with_capacity(self.ncols());
        for label in &self.columns {
            usage.push(self.column(label)?.memory_usage(deep) as i64);
        }
        Series::from_i64(usage).with_index(Index::from_labels(&self.columns))
    }
}
