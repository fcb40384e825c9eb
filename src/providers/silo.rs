//! SILO (Queensland Government) daily climate data.
//!
//! Two endpoints share one adapter: Data Drill interpolates the 0.05° grid at
//! a coordinate, Patched Point serves a station record. Both answer with CSV
//! whose last column, `metadata`, carries `key=value` lines one per row. The
//! meaning of each line is positional.
//!
//! SILO data has no GLM mapping, so only raw export is available.

use crate::error::{GlmMetError, Result};
use crate::export::{self, ArchiveCompression, GlmOutput};
use crate::http::error::UpstreamError;
use crate::http::{MetHttpClient, MetRequest, QueryParams};
use crate::providers::MetAdapter;
use crate::settings;
use crate::types::date_range::DateRange;
use crate::types::glm_table::GlmTable;
use crate::types::lifecycle::{Lifecycle, Stage};
use crate::types::location::{LonLat, Location};
use crate::types::raw_met::RawMet;
use bon::bon;
use log::{debug, info, warn};
use polars::prelude::{CsvReadOptions, DataFrame, SerReader};
use serde_json::{Map, Value};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const PROVIDER: &str = "SILO";
const METADATA_COLUMN: &str = "metadata";

/// Which SILO endpoint to query. Each expects its own kind of [`Location`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiloApi {
    /// Gridded data at a coordinate.
    DataDrill,
    /// Station data by station number.
    PatchPoint,
}

impl SiloApi {
    pub fn as_str(self) -> &'static str {
        match self {
            SiloApi::DataDrill => "data_drill",
            SiloApi::PatchPoint => "patch_point",
        }
    }

    fn expected_location(self) -> &'static str {
        match self {
            SiloApi::DataDrill => "longitude/latitude",
            SiloApi::PatchPoint => "station number",
        }
    }

    fn default_url(self) -> &'static str {
        match self {
            SiloApi::DataDrill => settings::SILO_DATA_DRILL_URL,
            SiloApi::PatchPoint => settings::SILO_PATCH_POINT_URL,
        }
    }
}

impl fmt::Display for SiloApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter for both SILO endpoints.
///
/// # Examples
///
/// ```no_run
/// use glm_met::{BlockingHttpClient, DateRange, Location, MetAdapter, Silo, SiloApi};
///
/// # fn main() -> Result<(), glm_met::GlmMetError> {
/// let mut adapter = Silo::builder()
///     .location(Location::Station(9518))
///     .date_range(DateRange::parse("20220101", "20220131")?)
///     .api(SiloApi::PatchPoint)
///     .username("someone@example.com")
///     .comment("RXN")
///     .build()?;
///
/// adapter.fetch(&BlockingHttpClient::builder().build()?, None)?;
/// println!("{:?}", adapter.raw().map(|raw| raw.metadata()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Silo {
    location: Location,
    date_range: DateRange,
    api: SiloApi,
    username: String,
    comment: Option<String>,
    api_url: String,
    compression: ArchiveCompression,
    stage: Stage<GlmTable>,
}

#[bon]
impl Silo {
    /// Configures a request. Nothing is fetched yet.
    ///
    /// * `.username(String)`: the email address SILO asks for.
    /// * `.comment(String)`: SILO variable codes, e.g. `"RXN"` for rainfall,
    ///   maximum and minimum temperature. Left out of the query when unset.
    /// * `.api_url(String)`: overrides the endpoint implied by `api`.
    ///
    /// # Errors
    ///
    /// [`GlmMetError::InvalidLocationMode`] when the location does not suit the
    /// endpoint: Data Drill needs coordinates, Patched Point a station number.
    #[builder]
    pub fn new(
        location: Location,
        date_range: DateRange,
        api: SiloApi,
        #[builder(into)] username: String,
        #[builder(into)] comment: Option<String>,
        #[builder(into)] api_url: Option<String>,
        compression: Option<ArchiveCompression>,
    ) -> Result<Self> {
        let matches = match (api, &location) {
            (SiloApi::DataDrill, Location::Coordinates(_)) => true,
            (SiloApi::PatchPoint, Location::Station(_)) => true,
            _ => false,
        };
        if !matches {
            return Err(GlmMetError::InvalidLocationMode {
                provider: PROVIDER,
                api: api.as_str(),
                expected: api.expected_location(),
            });
        }
        Ok(Self {
            location,
            date_range,
            api,
            username,
            comment,
            api_url: api_url.unwrap_or_else(|| api.default_url().to_string()),
            compression: compression.unwrap_or_default(),
            stage: Stage::default(),
        })
    }

    pub fn api(&self) -> SiloApi {
        self.api
    }

    pub fn request(&self, extras: Option<&QueryParams>) -> MetRequest {
        let mut query = QueryParams::new();
        match self.location {
            Location::Coordinates(lon_lat) => {
                query
                    .set("lon", lon_lat.longitude())
                    .set("lat", lon_lat.latitude());
            }
            Location::Station(station) => {
                query.set("station", station);
            }
        }
        query
            .set("start", self.date_range.start_compact())
            .set("finish", self.date_range.end_compact())
            .set("format", "csv");
        if let Some(comment) = &self.comment {
            query.set("comment", comment);
        }
        query
            .set("username", &self.username)
            .set("password", settings::SILO_PASSWORD);
        if let Some(extras) = extras {
            query.merge(extras);
        }
        MetRequest::new(self.api_url.as_str(), query)
    }

    /// Request echo merged with what the `metadata` column says about the site.
    fn build_metadata(&self, lines: &[Option<String>]) -> Result<Map<String, Value>> {
        let mut metadata = Map::new();
        let elevation = match self.location {
            Location::Coordinates(lon_lat) => {
                let site = GridSite::parse(lines)?;
                metadata.insert("longitude".into(), lon_lat.longitude().into());
                metadata.insert("latitude".into(), lon_lat.latitude().into());
                site.elevation
            }
            Location::Station(station) => {
                let site = StationSite::parse(lines)?;
                metadata.insert("station".into(), station.into());
                metadata.insert("station_name".into(), site.name.into());
                metadata.insert("longitude".into(), site.location.longitude().into());
                metadata.insert("latitude".into(), site.location.latitude().into());
                site.elevation
            }
        };
        metadata.insert("start".into(), self.date_range.start_compact().into());
        metadata.insert("finish".into(), self.date_range.end_compact().into());
        metadata.insert("api".into(), self.api.as_str().into());
        metadata.insert("format".into(), "csv".into());
        metadata.insert(
            "comment".into(),
            self.comment.clone().map(Value::from).unwrap_or(Value::Null),
        );
        metadata.insert("elevation".into(), elevation.into());
        Ok(metadata)
    }
}

impl MetAdapter for Silo {
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
        let request = self.request(extras);
        let body = client.get_text(&request)?;
        let frame = parse_csv(&body).map_err(|e| GlmMetError::upstream(request.url(), e))?;

        if frame.column(METADATA_COLUMN).is_err() {
            warn!(
                "{PROVIDER} answered without a metadata column: {}",
                body.chars().take(200).collect::<String>()
            );
            return Err(GlmMetError::missing_column(PROVIDER, METADATA_COLUMN));
        }
        let interim = RawMet::new(Map::new(), frame);
        let lines = interim.str_values(PROVIDER, METADATA_COLUMN)?;
        let metadata = self.build_metadata(&lines)?;
        let data = interim.data().drop(METADATA_COLUMN)?;

        info!(
            "Fetched {} daily rows from {PROVIDER} {}",
            data.height(),
            self.api
        );
        self.stage.fetched(RawMet::new(metadata, data));
        self.stage.require_raw("fetch")
    }

    fn convert(&mut self) -> Result<&GlmTable> {
        Err(GlmMetError::UnsupportedConversion {
            provider: PROVIDER,
            reason: "no mapping from SILO variables to GLM columns exists yet",
        })
    }

    fn export_raw(&mut self, dir: &Path) -> Result<PathBuf> {
        let raw = self.stage.require_raw("export raw data")?;
        let path = export::write_raw(dir, raw, self.compression)?;
        self.stage.exported();
        Ok(path)
    }

    fn export_canonical(&mut self, _dir: &Path, _output: &GlmOutput) -> Result<PathBuf> {
        Err(GlmMetError::UnsupportedConversion {
            provider: PROVIDER,
            reason: "SILO data cannot be written in GLM format",
        })
    }
}

/// Polars reads CSV from a path, so the body goes through a temporary file.
fn parse_csv(body: &str) -> std::result::Result<DataFrame, UpstreamError> {
    let mut temp_file = NamedTempFile::new().map_err(UpstreamError::Buffer)?;
    temp_file
        .write_all(body.as_bytes())
        .map_err(UpstreamError::Buffer)?;
    temp_file.flush().map_err(UpstreamError::Buffer)?;

    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(temp_file.path().to_path_buf()))
        .map_err(UpstreamError::Csv)?
        .finish()
        .map_err(UpstreamError::Csv)?;
    debug!("Parsed {} x {} CSV", frame.height(), frame.width());
    Ok(frame)
}

/// What a Data Drill metadata block tells us about the grid cell.
#[derive(Debug, Clone, PartialEq)]
struct GridSite {
    elevation: f64,
}

impl GridSite {
    /// Row 0 of the metadata column: elevation.
    fn parse(lines: &[Option<String>]) -> Result<Self> {
        Ok(Self {
            elevation: parse_elevation(metadata_line(lines, 0)?)?,
        })
    }
}

/// What a Patched Point metadata block tells us about the station.
#[derive(Debug, Clone, PartialEq)]
struct StationSite {
    name: String,
    location: LonLat,
    elevation: f64,
}

impl StationSite {
    /// Rows 0 to 3 of the metadata column: name, latitude, longitude, elevation.
    fn parse(lines: &[Option<String>]) -> Result<Self> {
        let name = metadata_value(metadata_line(lines, 0)?)?.to_string();
        let latitude = parse_number(metadata_value(metadata_line(lines, 1)?)?)?;
        let longitude = parse_number(metadata_value(metadata_line(lines, 2)?)?)?;
        let elevation = parse_elevation(metadata_line(lines, 3)?)?;
        Ok(Self {
            name,
            location: LonLat::new(longitude, latitude)?,
            elevation,
        })
    }
}

fn metadata_line(lines: &[Option<String>], index: usize) -> Result<&str> {
    lines
        .get(index)
        .and_then(|line| line.as_deref())
        .ok_or_else(|| GlmMetError::MetadataParse {
            provider: PROVIDER,
            message: format!("metadata line {index} is missing"),
        })
}

/// `key=value` to `value`, trimmed.
fn metadata_value(line: &str) -> Result<&str> {
    line.split_once('=')
        .map(|(_, value)| value.trim())
        .ok_or_else(|| GlmMetError::MetadataParse {
            provider: PROVIDER,
            message: format!("expected key=value, got '{line}'"),
        })
}

fn parse_number(value: &str) -> Result<f64> {
    value.parse().map_err(|_| GlmMetError::MetadataParse {
        provider: PROVIDER,
        message: format!("'{value}' is not a number"),
    })
}

/// `elevation=  301.2 m` to `301.2`.
fn parse_elevation(line: &str) -> Result<f64> {
    let value = metadata_value(line)?;
    parse_number(value.strip_suffix('m').unwrap_or(value).trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{RAW_CSV, RAW_METADATA};
    use crate::testing::{silo_grid_csv, silo_station_csv, StubClient};
    use std::fs::File;
    use std::io::Read;
    use zip::ZipArchive;

    fn grid() -> Result<Silo> {
        Silo::builder()
            .location(Location::Coordinates(LonLat::new(116.6, -32.15)?))
            .date_range(DateRange::parse("20220101", "20220103")?)
            .api(SiloApi::DataDrill)
            .username("test@example.com")
            .comment("RXN")
            .build()
    }

    fn station() -> Result<Silo> {
        Silo::builder()
            .location(Location::Station(9518))
            .date_range(DateRange::parse("20220101", "20220105")?)
            .api(SiloApi::PatchPoint)
            .username("test@example.com")
            .build()
    }

    #[test]
    fn test_location_must_match_api() -> Result<()> {
        let result = Silo::builder()
            .location(Location::Coordinates(LonLat::new(116.6, -32.17)?))
            .date_range(DateRange::parse("20220101", "20220131")?)
            .api(SiloApi::PatchPoint)
            .username("test@example.com")
            .build();
        assert!(matches!(
            result,
            Err(GlmMetError::InvalidLocationMode {
                api: "patch_point",
                ..
            })
        ));

        let result = Silo::builder()
            .location(Location::Station(9518))
            .date_range(DateRange::parse("20220101", "20220131")?)
            .api(SiloApi::DataDrill)
            .username("test@example.com")
            .build();
        assert!(matches!(
            result,
            Err(GlmMetError::InvalidLocationMode { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_grid_request_shape() -> Result<()> {
        let request = grid()?.request(None);
        let query = request.query();
        assert_eq!(request.url(), settings::SILO_DATA_DRILL_URL);
        assert_eq!(query.get("lon"), Some("116.6"));
        assert_eq!(query.get("lat"), Some("-32.15"));
        assert_eq!(query.get("start"), Some("20220101"));
        assert_eq!(query.get("finish"), Some("20220103"));
        assert_eq!(query.get("format"), Some("csv"));
        assert_eq!(query.get("comment"), Some("RXN"));
        assert_eq!(query.get("password"), Some("apirequest"));
        assert_eq!(query.get("station"), None);
        Ok(())
    }

    #[test]
    fn test_station_request_omits_unset_comment() -> Result<()> {
        let extras = QueryParams::new().with("format", "alldata");
        let request = station()?.request(Some(&extras));
        assert_eq!(request.url(), settings::SILO_PATCH_POINT_URL);
        assert_eq!(request.query().get("station"), Some("9518"));
        assert_eq!(request.query().get("comment"), None);
        assert_eq!(request.query().get("format"), Some("alldata"));
        Ok(())
    }

    #[test]
    fn test_grid_fetch_extracts_elevation() -> Result<()> {
        let mut adapter = grid()?;
        let client = StubClient::text(silo_grid_csv());
        let raw = adapter.fetch(&client, None)?;

        assert_eq!(client.last_query("lon").as_deref(), Some("116.6"));
        assert_eq!(raw.row_count(), 3);
        assert!(!raw.has_column("metadata"));
        assert!(raw.has_column("daily_rain"));
        assert_eq!(raw.metadata()["elevation"], 301.2);
        assert_eq!(raw.metadata()["api"], "data_drill");
        assert_eq!(raw.metadata()["comment"], "RXN");
        assert_eq!(raw.metadata()["longitude"], 116.6);
        Ok(())
    }

    #[test]
    fn test_station_fetch_extracts_site() -> Result<()> {
        let mut adapter = station()?;
        let raw = adapter.fetch(&StubClient::text(silo_station_csv()), None)?;

        assert_eq!(raw.row_count(), 5);
        let metadata = raw.metadata();
        assert_eq!(metadata["station"], 9518);
        assert_eq!(metadata["station_name"], "ALBANY AIRPORT");
        assert_eq!(metadata["latitude"], -34.9414);
        assert_eq!(metadata["longitude"], 117.8022);
        assert_eq!(metadata["elevation"], 68.0);
        assert_eq!(metadata["comment"], Value::Null);
        Ok(())
    }

    #[test]
    fn test_short_station_metadata_rejected() -> Result<()> {
        let truncated: String = silo_station_csv().lines().take(3).collect::<Vec<_>>().join("\n");
        let mut adapter = station()?;
        assert!(matches!(
            adapter.fetch(&StubClient::text(truncated), None),
            Err(GlmMetError::MetadataParse { .. })
        ));
        assert_eq!(adapter.lifecycle(), Lifecycle::Uninitialized);
        Ok(())
    }

    #[test]
    fn test_malformed_grid_metadata_rejected() -> Result<()> {
        let body = silo_grid_csv().replace("elevation=  301.2 m", "elevation unknown");
        let mut adapter = grid()?;
        assert!(matches!(
            adapter.fetch(&StubClient::text(body), None),
            Err(GlmMetError::MetadataParse { .. })
        ));
        assert_eq!(adapter.lifecycle(), Lifecycle::Uninitialized);
        Ok(())
    }

    fn lines(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn test_grid_site_parsing() -> Result<()> {
        let site = GridSite::parse(&lines(&["elevation=  301.2 m", "reference=XXXXXXXX"]))?;
        assert_eq!(site.elevation, 301.2);

        assert!(matches!(
            GridSite::parse(&[]),
            Err(GlmMetError::MetadataParse { .. })
        ));
        assert!(matches!(
            GridSite::parse(&[None]),
            Err(GlmMetError::MetadataParse { .. })
        ));
        assert!(matches!(
            GridSite::parse(&lines(&["elevation=high"])),
            Err(GlmMetError::MetadataParse { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_station_site_parsing() -> Result<()> {
        let block = [
            "name=ALBANY AIRPORT",
            "latitude=-34.9414",
            "longitude=117.8022",
            "elevation=  68.0 m",
        ];
        let site = StationSite::parse(&lines(&block))?;
        assert_eq!(site.name, "ALBANY AIRPORT");
        assert_eq!(site.location, LonLat::new(117.8022, -34.9414)?);
        assert_eq!(site.elevation, 68.0);

        assert!(matches!(
            StationSite::parse(&lines(&block[..3])),
            Err(GlmMetError::MetadataParse { .. })
        ));
        assert!(matches!(
            StationSite::parse(&lines(&["name=X", "latitude=north", "longitude=1", "elevation=1"])),
            Err(GlmMetError::MetadataParse { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_missing_metadata_column() -> Result<()> {
        let mut adapter = grid()?;
        let body = "Sorry, your request was rejected\n";
        assert!(matches!(
            adapter.fetch(&StubClient::text(body), None),
            Err(GlmMetError::SchemaMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_no_glm_support() -> Result<()> {
        let mut adapter = grid()?;
        adapter.fetch(&StubClient::text(silo_grid_csv()), None)?;
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            adapter.convert(),
            Err(GlmMetError::UnsupportedConversion { .. })
        ));
        assert!(matches!(
            adapter.export_canonical(dir.path(), &GlmOutput::Archive),
            Err(GlmMetError::UnsupportedConversion { .. })
        ));
        assert_eq!(adapter.lifecycle(), Lifecycle::Fetched);
        Ok(())
    }

    #[test]
    fn test_export_raw_archive() -> Result<()> {
        let mut adapter = station()?;
        adapter.fetch(&StubClient::text(silo_station_csv()), None)?;
        let dir = tempfile::tempdir().unwrap();
        let path = adapter.export_raw(dir.path())?;

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let mut csv = String::new();
        archive
            .by_name(RAW_CSV)
            .unwrap()
            .read_to_string(&mut csv)
            .unwrap();
        assert!(csv.starts_with("station,YYYY-MM-DD,daily_rain"));
        assert!(!csv.contains("metadata"));

        let mut json = String::new();
        archive
            .by_name(RAW_METADATA)
            .unwrap()
            .read_to_string(&mut json)
            .unwrap();
        let metadata: Value = serde_json::from_str(&json)?;
        assert_eq!(metadata["station_name"], "ALBANY AIRPORT");
        assert_eq!(adapter.lifecycle(), Lifecycle::Exported);
        Ok(())
    }

    #[test]
    fn test_elevation_parsing() -> Result<()> {
        assert_eq!(parse_elevation("elevation=  301.2 m")?, 301.2);
        assert_eq!(parse_elevation("elevation = 12m")?, 12.0);
        assert!(parse_elevation("elevation 12 m").is_err());
        Ok(())
    }
}
