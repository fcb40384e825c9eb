//! NASA POWER hourly point data (solar and meteorological, MERRA-2/CERES).

use crate::error::{GlmMetError, Result};
use crate::export::{self, ArchiveCompression, GlmOutput};
use crate::http::error::UpstreamError;
use crate::http::{MetHttpClient, MetRequest, QueryParams};
use crate::providers::{glm_times, MetAdapter};
use crate::settings;
use crate::types::date_range::DateRange;
use crate::types::glm_table::{GlmColumns, GlmTable};
use crate::types::lifecycle::{Lifecycle, Stage};
use crate::types::location::LonLat;
use crate::types::raw_met::RawMet;
use crate::types::variables::VariableSelection;
use crate::units::{self, hourly_mm_to_daily_m, percent_to_fraction};
use bon::bon;
use log::{debug, info};
use polars::prelude::{Column, DataFrame};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const PROVIDER: &str = "NASA POWER";
const METADATA_KEYS: [&str; 2] = ["header", "parameters"];

/// Clock the hourly keys are expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeStandard {
    /// Local solar time.
    #[default]
    Lst,
    Utc,
}

impl TimeStandard {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeStandard::Lst => "LST",
            TimeStandard::Utc => "UTC",
        }
    }
}

/// POWER user community; selects the unit conventions of some parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Community {
    /// Agroclimatology.
    Ag,
    /// Sustainable buildings.
    #[default]
    Sb,
    /// Renewable energy.
    Re,
}

impl Community {
    pub fn as_str(self) -> &'static str {
        match self {
            Community::Ag => "AG",
            Community::Sb => "SB",
            Community::Re => "RE",
        }
    }
}

/// Adapter for the POWER hourly point API.
#[derive(Debug, Clone)]
pub struct NasaPower {
    location: LonLat,
    date_range: DateRange,
    parameters: VariableSelection,
    time_standard: TimeStandard,
    community: Community,
    api_url: String,
    compression: ArchiveCompression,
    stage: Stage<GlmTable>,
}

#[bon]
impl NasaPower {
    #[builder]
    pub fn new(
        location: LonLat,
        date_range: DateRange,
        parameters: Option<VariableSelection>,
        time_standard: Option<TimeStandard>,
        community: Option<Community>,
        #[builder(into)] api_url: Option<String>,
        compression: Option<ArchiveCompression>,
    ) -> Self {
        Self {
            location,
            date_range,
            parameters: parameters.unwrap_or_default(),
            time_standard: time_standard.unwrap_or_default(),
            community: community.unwrap_or_default(),
            api_url: api_url.unwrap_or_else(|| settings::NASA_POWER_API_URL.to_string()),
            compression: compression.unwrap_or_default(),
            stage: Stage::default(),
        }
    }

    pub fn request(&self, extras: Option<&QueryParams>) -> Result<MetRequest> {
        let parameters = self
            .parameters
            .resolve(settings::NASA_POWER_HOURLY_DEFAULT, "parameters")?;
        let mut query = QueryParams::new()
            .with("longitude", self.location.longitude())
            .with("latitude", self.location.latitude())
            .with("start", self.date_range.start_compact())
            .with("end", self.date_range.end_compact())
            .with("parameters", parameters.join(","))
            .with("time-standard", self.time_standard.as_str())
            .with("community", self.community.as_str())
            .with("format", "JSON");
        if let Some(extras) = extras {
            query.merge(extras);
        }
        Ok(MetRequest::new(self.api_url.as_str(), query))
    }

    /// `header.fill_value` when present, else the documented default.
    fn fill_value(raw: &RawMet) -> f64 {
        raw.metadata()
            .get("header")
            .and_then(|header| header.get("fill_value"))
            .and_then(Value::as_f64)
            .unwrap_or(settings::NASA_POWER_FILL_VALUE)
    }
}

impl MetAdapter for NasaPower {
    type Glm = GlmTable;

    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn lifecycle(&self) -> Lifecycle {
        self.stage.lifecycle()
    }

    fn raw(&self) -> Option<&RawMet> {
        self.stage.raw()
    }

    fn glm(&self) -> Option<&GlmTable> {
        self.stage.glm()
    }

    fn fetch<C: MetHttpClient + ?Sized>(
        &mut self,
        client: &C,
        extras: Option<&QueryParams>,
    ) -> Result<&RawMet> {
        let request = self.request(extras)?;
        let body = client.get_json(&request)?;
        let (metadata, data) =
            split_response(&body).map_err(|e| GlmMetError::upstream(request.url(), e))?;
        info!("Fetched {} hourly rows from {PROVIDER}", data.height());
        self.stage.fetched(RawMet::new(metadata, data));
        self.stage.require_raw("fetch")
    }

    fn convert(&mut self) -> Result<&GlmTable> {
        let raw = self.stage.require_raw("convert")?;
        let fill_value = Self::fill_value(raw);
        debug!("Masking {PROVIDER} fill value {fill_value}");
        let values = |name: &str| -> Result<Vec<Option<f64>>> {
            Ok(units::mask_fill_value(raw.f64_values(PROVIDER, name)?, fill_value))
        };
        let table = GlmTable::from_columns(GlmColumns {
            time: glm_times(raw, PROVIDER, "time", units::compact_hour_to_glm)?,
            short_wave: values("ALLSKY_SFC_SW_DWN")?,
            cloud: units::map_present(values("CLOUD_AMT")?, percent_to_fraction),
            air_temp: values("T2M")?,
            rel_hum: values("RH2M")?,
            wind_speed: values("WS2M")?,
            rain: units::map_present(values("PRECTOTCORR")?, hourly_mm_to_daily_m),
        })?;
        self.stage.converted(table);
        self.stage.require_glm("convert")
    }

    fn export_raw(&mut self, dir: &Path) -> Result<PathBuf> {
        let raw = self.stage.require_raw("export raw data")?;
        let path = export::write_raw(dir, raw, self.compression)?;
        self.stage.exported();
        Ok(path)
    }

    fn export_canonical(&mut self, dir: &Path, output: &GlmOutput) -> Result<PathBuf> {
        let table = self.stage.require_glm("export GLM data")?;
        let metadata = self.stage.raw().map(RawMet::metadata);
        let path = export::write_glm_table(dir, table, &metadata, output, self.compression)?;
        self.stage.exported();
        Ok(path)
    }
}

/// `properties.parameter` holds `{parameter: {YYYYMMDDHH: value}}`. The frame
/// gets a leading `time` column with the union of all keys, ascending.
fn split_response(
    body: &Value,
) -> std::result::Result<(Map<String, Value>, DataFrame), UpstreamError> {
    let parameter = body
        .pointer("/properties/parameter")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            let messages = body.get("messages").map(Value::to_string).unwrap_or_default();
            UpstreamError::MalformedBody(format!(
                "response has no properties.parameter object {messages}"
            ))
        })?;

    let mut series = Vec::with_capacity(parameter.len());
    for (name, values) in parameter {
        let values = values.as_object().ok_or_else(|| {
            UpstreamError::MalformedBody(format!("parameter '{name}' is not an object"))
        })?;
        series.push((name, values));
    }

    let times: BTreeSet<&str> = series
        .iter()
        .flat_map(|(_, values)| values.keys().map(String::as_str))
        .collect();

    let mut columns = vec![Column::new(
        "time".into(),
        times.iter().copied().collect::<Vec<&str>>(),
    )];
    for (name, values) in series {
        let column: Vec<Option<f64>> = times
            .iter()
            .map(|t| values.get(*t).and_then(Value::as_f64))
            .collect();
        columns.push(Column::new(name.as_str().into(), column));
    }
    let frame = DataFrame::new(columns).map_err(|e| UpstreamError::MalformedBody(e.to_string()))?;

    let metadata = METADATA_KEYS
        .iter()
        .filter_map(|key| body.get(*key).map(|v| (key.to_string(), v.clone())))
        .collect();
    Ok((metadata, frame))
}
