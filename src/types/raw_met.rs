use crate::error::{GlmMetError, Result};
use polars::prelude::{Column, DataFrame, DataType};
use serde_json::{Map, Value};

/// Provider-native data exactly as fetched, paired with its provenance.
///
/// `metadata` holds whatever the provider reported besides the series itself
/// (units, elevation, echoed request parameters). Its shape differs per
/// provider. A `RawMet` is never modified once an adapter has stored it.
#[derive(Debug, Clone)]
pub struct RawMet {
    metadata: Map<String, Value>,
    data: DataFrame,
}

impl RawMet {
    pub fn new(metadata: Map<String, Value>, data: DataFrame) -> Self {
        Self { metadata, data }
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn row_count(&self) -> usize {
        self.data.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.column(name).is_ok()
    }

    pub(crate) fn column(&self, provider: &'static str, name: &str) -> Result<&Column> {
        self.data
            .column(name)
            .map_err(|_| GlmMetError::missing_column(provider, name))
    }

    /// Reads a column as nullable floats, casting integer columns on the way.
    pub(crate) fn f64_values(&self, provider: &'static str, name: &str) -> Result<Vec<Option<f64>>> {
        let cast = self.column(provider, name)?.cast(&DataType::Float64)?;
        Ok(cast.f64()?.into_iter().collect())
    }

    pub(crate) fn str_values(&self, provider: &'static str, name: &str) -> Result<Vec<Option<String>>> {
        let cast = self.column(provider, name)?.cast(&DataType::String)?;
        Ok(cast
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect())
    }
}
