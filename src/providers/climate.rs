//! Open-Meteo Climate API: daily CMIP6 HighResMIP projections, one series per
//! model.
//!
//! The response holds every requested variable once per model, with the model
//! name appended (`temperature_2m_mean_NICAM16_8S`). Conversion splits them
//! back into one GLM table per model.

use crate::error::{GlmMetError, Result};
use crate::export::{self, ArchiveCompression, GlmOutput};
use crate::http::{MetHttpClient, MetRequest, QueryParams};
use crate::providers::{glm_times, open_meteo, MetAdapter};
use crate::settings;
use crate::types::date_range::DateRange;
use crate::types::glm_table::{GlmColumns, GlmTable, ModelTables};
use crate::types::lifecycle::{Lifecycle, Stage};
use crate::types::location::LonLat;
use crate::types::raw_met::RawMet;
use crate::types::variables::VariableSelection;
use crate::units::{self, mm_to_m, percent_to_fraction};
use bon::bon;
use log::{info, warn};
use std::path::{Path, PathBuf};

const PROVIDER: &str = "Open-Meteo Climate";

/// Adapter for the Open-Meteo climate projection API.
#[derive(Debug, Clone)]
pub struct ClimateProjection {
    location: LonLat,
    date_range: DateRange,
    variables: VariableSelection,
    models: Vec<String>,
    api_url: String,
    compression: ArchiveCompression,
    stage: Stage<ModelTables>,
}

#[bon]
impl ClimateProjection {
    /// Configures a request. Nothing is fetched yet.
    ///
    /// * `.models(Vec<String>)`: defaults to all of [`settings::CLIMATE_MODELS`].
    /// * `.variables(VariableSelection)`: defaults to [`settings::CLIMATE_DEFAULT`].
    #[builder]
    pub fn new(
        location: LonLat,
        date_range: DateRange,
        variables: Option<VariableSelection>,
        models: Option<Vec<String>>,
        #[builder(into)] api_url: Option<String>,
        compression: Option<ArchiveCompression>,
    ) -> Self {
        Self {
            location,
            date_range,
            variables: variables.unwrap_or_default(),
            models: models.unwrap_or_else(|| {
                settings::CLIMATE_MODELS
                    .iter()
                    .map(|m| m.to_string())
                    .collect()
            }),
            api_url: api_url.unwrap_or_else(|| settings::CLIMATE_API_URL.to_string()),
            compression: compression.unwrap_or_default(),
            stage: Stage::default(),
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn request(&self, extras: Option<&QueryParams>) -> Result<MetRequest> {
        let variables = self.variables.resolve(settings::CLIMATE_DEFAULT, "daily")?;
        if self.models.is_empty() {
            return Err(GlmMetError::EmptyVariables("models"));
        }
        let mut query = QueryParams::new()
            .with("longitude", self.location.longitude())
            .with("latitude", self.location.latitude())
            .with("start_date", self.date_range.start_iso())
            .with("end_date", self.date_range.end_iso())
            .with("models", self.models.join(","))
            .with("daily", variables.join(","))
            .with("windspeed_unit", "ms");
        if let Some(extras) = extras {
            query.merge(extras);
        }
        Ok(MetRequest::new(self.api_url.as_str(), query))
    }
}

impl MetAdapter for ClimateProjection {
    type Glm = ModelTables;

    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn lifecycle(&self) -> Lifecycle {
        self.stage.lifecycle()
    }

    fn raw(&self) -> Option<&RawMet> {
        self.stage.raw()
    }

    fn glm(&self) -> Option<&ModelTables> {
        self.stage.glm()
    }

    fn fetch<C: MetHttpClient + ?Sized>(
        &mut self,
        client: &C,
        extras: Option<&QueryParams>,
    ) -> Result<&RawMet> {
        let request = self.request(extras)?;
        let body = client.get_json(&request)?;
        let (metadata, data) = open_meteo::split_response(body, "daily", request.url())?;
        info!(
            "Fetched {} daily rows for {} models from {}",
            data.height(),
            self.models.len(),
            PROVIDER
        );
        self.stage.fetched(RawMet::new(metadata, data));
        self.stage.require_raw("fetch")
    }

    fn convert(&mut self) -> Result<&ModelTables> {
        let raw = self.stage.require_raw("convert")?;
        let mut tables = ModelTables::default();
        for model in &self.models {
            tables.push(model.as_str(), model_to_glm(raw, model, self.models.len() == 1)?);
        }
        info!("Converted {} model series to GLM", tables.len());
        self.stage.converted(tables);
        self.stage.require_glm("convert")
    }

    fn export_raw(&mut self, dir: &Path) -> Result<PathBuf> {
        let raw = self.stage.require_raw("export raw data")?;
        let path = export::write_raw(dir, raw, self.compression)?;
        self.stage.exported();
        Ok(path)
    }

    /// Only the archive layout exists here: one `met_<model>.csv` per model,
    /// without a metadata entry.
    fn export_canonical(&mut self, dir: &Path, output: &GlmOutput) -> Result<PathBuf> {
        let tables = self.stage.require_glm("export GLM data")?;
        if let GlmOutput::Csv(_) = output {
            return Err(GlmMetError::UnsupportedOutput {
                provider: PROVIDER,
                output: output.to_string(),
            });
        }
        let path = export::write_model_tables(dir, tables, self.compression)?;
        self.stage.exported();
        Ok(path)
    }
}

/// Looks up `<base>_<model>`. A lone model may come back unsuffixed. A
/// variable the response lacks becomes an all-missing column.
fn model_column(raw: &RawMet, base: &str, model: &str, single: bool) -> Result<Vec<Option<f64>>> {
    let suffixed = format!("{base}_{model}");
    if raw.has_column(&suffixed) {
        return raw.f64_values(PROVIDER, &suffixed);
    }
    if single && raw.has_column(base) {
        return raw.f64_values(PROVIDER, base);
    }
    warn!("{PROVIDER} response has no '{suffixed}'; {model} gets an empty column");
    Ok(vec![None; raw.row_count()])
}

/// | source | GLM | rule |
/// |---|---|---|
/// | `time` | `time` | as is (`YYYY-MM-DD`) |
/// | `shortwave_radiation_sum_<m>` | `ShortWave` | as is |
/// | `cloudcover_mean_<m>` | `Cloud` | % to fraction |
/// | `temperature_2m_mean_<m>` | `AirTemp` | as is |
/// | `relative_humidity_2m_mean_<m>` | `RelHum` | as is |
/// | `windspeed_10m_mean_<m>` | `WindSpeed` | as is |
/// | `precipitation_sum_<m>` | `Rain` | mm/day to m/day |
fn model_to_glm(raw: &RawMet, model: &str, single: bool) -> Result<GlmTable> {
    let values = |base: &str| model_column(raw, base, model, single);
    GlmTable::from_columns(GlmColumns {
        time: glm_times(raw, PROVIDER, "time", |t| Ok(t.to_string()))?,
        short_wave: values("shortwave_radiation_sum")?,
        cloud: units::map_present(values("cloudcover_mean")?, percent_to_fraction),
        air_temp: values("temperature_2m_mean")?,
        rel_hum: values("relative_humidity_2m_mean")?,
        wind_speed: values("windspeed_10m_mean")?,
        rain: units::map_present(values("precipitation_sum")?, mm_to_m),
    })
}
