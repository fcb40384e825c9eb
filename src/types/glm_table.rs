//! The canonical General Lake Model meteorological table.

use crate::error::{GlmMetError, Result};
use log::warn;
use polars::prelude::{Column, DataFrame};

/// Column names of a GLM met file, in the order GLM reads them.
///
/// | column | unit |
/// |---|---|
/// | `time` | `YYYY-MM-DD[ hh:mm:ss]` |
/// | `ShortWave` | W/m² |
/// | `Cloud` | fraction, 0 to 1 |
/// | `AirTemp` | °C |
/// | `RelHum` | % |
/// | `WindSpeed` | m/s |
/// | `Rain` | m/day |
pub const GLM_COLUMNS: [&str; 7] = [
    "time",
    "ShortWave",
    "Cloud",
    "AirTemp",
    "RelHum",
    "WindSpeed",
    "Rain",
];

/// Already converted column vectors; the only way to build a [`GlmTable`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlmColumns {
    pub time: Vec<String>,
    pub short_wave: Vec<Option<f64>>,
    pub cloud: Vec<Option<f64>>,
    pub air_temp: Vec<Option<f64>>,
    pub rel_hum: Vec<Option<f64>>,
    pub wind_speed: Vec<Option<f64>>,
    pub rain: Vec<Option<f64>>,
}

/// A GLM met table. Column names and order always equal [`GLM_COLUMNS`].
#[derive(Debug, Clone)]
pub struct GlmTable {
    frame: DataFrame,
}

impl GlmTable {
    pub fn from_columns(columns: GlmColumns) -> Result<Self> {
        let out_of_range = columns
            .cloud
            .iter()
            .flatten()
            .filter(|c| !(0.0..=1.0).contains(*c))
            .count();
        if out_of_range > 0 {
            warn!("{out_of_range} Cloud values fall outside [0, 1]");
        }

        let [time, short_wave, cloud, air_temp, rel_hum, wind_speed, rain] = GLM_COLUMNS;
        let frame = DataFrame::new(vec![
            Column::new(time.into(), columns.time),
            Column::new(short_wave.into(), columns.short_wave),
            Column::new(cloud.into(), columns.cloud),
            Column::new(air_temp.into(), columns.air_temp),
            Column::new(rel_hum.into(), columns.rel_hum),
            Column::new(wind_speed.into(), columns.wind_speed),
            Column::new(rain.into(), columns.rain),
        ])?;
        Ok(Self { frame })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn times(&self) -> Result<Vec<String>> {
        Ok(self
            .frame
            .column(GLM_COLUMNS[0])?
            .str()?
            .into_iter()
            .map(|t| t.unwrap_or_default().to_string())
            .collect())
    }

    /// Values of one of the physical columns, e.g. `"Rain"`.
    pub fn values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        if name == GLM_COLUMNS[0] || !GLM_COLUMNS.contains(&name) {
            return Err(GlmMetError::missing_column("GLM", name));
        }
        Ok(self.frame.column(name)?.f64()?.into_iter().collect())
    }
}

/// One GLM table per climate model, in the configured model order.
#[derive(Debug, Clone, Default)]
pub struct ModelTables {
    tables: Vec<(String, GlmTable)>,
}

impl ModelTables {
    pub(crate) fn push(&mut self, model: impl Into<String>, table: GlmTable) {
        self.tables.push((model.into(), table));
    }

    pub fn get(&self, model: &str) -> Option<&GlmTable> {
        self.tables
            .iter()
            .find(|(id, _)| id == model)
            .map(|(_, table)| table)
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GlmTable)> {
        self.tables.iter().map(|(id, table)| (id.as_str(), table))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
