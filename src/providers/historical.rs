//! Open-Meteo Historical Weather (ERA5 reanalysis archive).
//!
//! Hourly data converts to a single GLM table. Daily data can be fetched and
//! exported raw, but has no GLM mapping: the daily list carries no cloud cover
//! or humidity.

use crate::error::{GlmMetError, Result};
use crate::export::{self, ArchiveCompression, GlmOutput};
use crate::http::{MetHttpClient, MetRequest, QueryParams};
use crate::providers::{glm_times, open_meteo, MetAdapter};
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
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

const PROVIDER: &str = "Open-Meteo Historical";

/// Time step of the requested archive series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Granularity {
    #[default]
    Hourly,
    Daily,
}

impl Granularity {
    /// Query key, response section and units section prefix.
    pub fn key(self) -> &'static str {
        match self {
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
        }
    }

    pub fn default_variables(self) -> &'static [&'static str] {
        match self {
            Granularity::Hourly => settings::HOURLY_HISTORICAL_DEFAULT,
            Granularity::Daily => settings::DAILY_HISTORICAL_DEFAULT,
        }
    }

    fn units_key(self) -> String {
        format!("{}_units", self.key())
    }
}

/// Adapter for the Open-Meteo archive API.
///
/// # Examples
///
/// ```no_run
/// use glm_met::{BlockingHttpClient, DateRange, GlmOutput, Historical, LonLat, MetAdapter};
/// use std::path::Path;
///
/// # fn main() -> Result<(), glm_met::GlmMetError> {
/// let mut adapter = Historical::builder()
///     .location(LonLat::new(116.75, -34.25)?)
///     .date_range(DateRange::parse("2020-01-01", "2020-01-31")?)
///     .build();
///
/// let client = BlockingHttpClient::builder().build()?;
/// adapter.fetch(&client, None)?;
/// let table = adapter.convert()?;
/// println!("{}", table.frame());
/// adapter.export_canonical(Path::new("out"), &GlmOutput::Archive)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Historical {
    location: LonLat,
    date_range: DateRange,
    variables: VariableSelection,
    timezone: String,
    granularity: Granularity,
    api_url: String,
    compression: ArchiveCompression,
    stage: Stage<GlmTable>,
}

#[bon]
impl Historical {
    /// Configures a request. Nothing is fetched yet.
    ///
    /// * `.location(LonLat)` and `.date_range(DateRange)` are required.
    /// * `.variables(VariableSelection)`: defaults to the list for the
    ///   granularity, see [`Granularity::default_variables`].
    /// * `.timezone(String)`: defaults to `"auto"`, local time at the location.
    /// * `.granularity(Granularity)`: defaults to hourly. Fixed for the
    ///   lifetime of the adapter.
    /// * `.api_url(String)`: overrides [`settings::HISTORICAL_API_URL`].
    /// * `.compression(ArchiveCompression)`: for exported archives.
    #[builder]
    pub fn new(
        location: LonLat,
        date_range: DateRange,
        variables: Option<VariableSelection>,
        #[builder(into)] timezone: Option<String>,
        granularity: Option<Granularity>,
        #[builder(into)] api_url: Option<String>,
        compression: Option<ArchiveCompression>,
    ) -> Self {
        Self {
            location,
            date_range,
            variables: variables.unwrap_or_default(),
            timezone: timezone.unwrap_or_else(|| "auto".to_string()),
            granularity: granularity.unwrap_or_default(),
            api_url: api_url.unwrap_or_else(|| settings::HISTORICAL_API_URL.to_string()),
            compression: compression.unwrap_or_default(),
            stage: Stage::default(),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// The request `fetch` would send.
    pub fn request(&self, extras: Option<&QueryParams>) -> Result<MetRequest> {
        let variables = self
            .variables
            .resolve(self.granularity.default_variables(), self.granularity.key())?;
        let mut query = QueryParams::new()
            .with("longitude", self.location.longitude())
            .with("latitude", self.location.latitude())
            .with("start_date", self.date_range.start_iso())
            .with("end_date", self.date_range.end_iso())
            .with(self.granularity.key(), variables.join(","))
            .with("timezone", &self.timezone)
            .with("windspeed_unit", "ms");
        if let Some(extras) = extras {
            query.merge(extras);
        }
        Ok(MetRequest::new(self.api_url.as_str(), query))
    }
}

impl MetAdapter for Historical {
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
            open_meteo::split_response(body, self.granularity.key(), request.url())?;
        info!(
            "Fetched {} {} rows from {}",
            data.height(),
            self.granularity.key(),
            PROVIDER
        );
        self.stage.fetched(RawMet::new(metadata, data));
        self.stage.require_raw("fetch")
    }

    fn convert(&mut self) -> Result<&GlmTable> {
        let raw = self.stage.require_raw("convert")?;
        if self.granularity == Granularity::Daily {
            return Err(GlmMetError::UnsupportedConversion {
                provider: PROVIDER,
                reason: "daily archive data has no cloud cover or humidity; fetch hourly data",
            });
        }
        let table = hourly_to_glm(raw)?;
        debug!("Converted {} hourly rows to GLM", table.height());
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
        let metadata = self
            .stage
            .raw()
            .and_then(|raw| raw.metadata().get(&self.granularity.units_key()))
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let path = export::write_glm_table(dir, table, &metadata, output, self.compression)?;
        self.stage.exported();
        Ok(path)
    }
}

/// Maps the hourly default variables onto GLM columns.
///
/// | source | GLM | rule |
/// |---|---|---|
/// | `time` | `time` | `T` to space, seconds appended |
/// | `shortwave_radiation` | `ShortWave` | as is |
/// | `cloudcover` | `Cloud` | % to fraction |
/// | `temperature_2m` | `AirTemp` | as is |
/// | `relativehumidity_2m` | `RelHum` | as is |
/// | `windspeed_10m` | `WindSpeed` | as is (requested in m/s) |
/// | `precipitation` | `Rain` | mm/hour to m/day |
pub(crate) fn hourly_to_glm(raw: &RawMet) -> Result<GlmTable> {
    let values = |name: &str| raw.f64_values(PROVIDER, name);
    GlmTable::from_columns(GlmColumns {
        time: glm_times(raw, PROVIDER, "time", |t| Ok(units::iso_minute_to_glm(t)))?,
        short_wave: values("shortwave_radiation")?,
        cloud: units::map_present(values("cloudcover")?, percent_to_fraction),
        air_temp: values("temperature_2m")?,
        rel_hum: values("relativehumidity_2m")?,
        wind_speed: values("windspeed_10m")?,
        rain: units::map_present(values("precipitation")?, hourly_mm_to_daily_m),
    })
}
