//! Canned provider responses and a recording HTTP client for unit tests.

use crate::error::{GlmMetError, Result};
use crate::http::error::UpstreamError;
use crate::http::{MetHttpClient, MetRequest};
use chrono::{Duration, NaiveDate};
use serde_json::{json, Map, Value};
use std::cell::RefCell;

/// Answers every request with the same body and remembers what was asked.
pub struct StubClient {
    response: Option<String>,
    requests: RefCell<Vec<MetRequest>>,
}

impl StubClient {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            response: Some(body.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn json(body: Value) -> Self {
        Self::text(body.to_string())
    }

    /// Fails every request the way a provider outage would.
    pub fn failing() -> Self {
        Self {
            response: None,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<MetRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_query(&self, key: &str) -> Option<String> {
        self.requests
            .borrow()
            .last()
            .and_then(|r| r.query().get(key).map(str::to_string))
    }
}

impl MetHttpClient for StubClient {
    fn get_text(&self, request: &MetRequest) -> Result<String> {
        self.requests.borrow_mut().push(request.clone());
        self.response.clone().ok_or_else(|| {
            GlmMetError::upstream(
                request.url(),
                UpstreamError::Provider("service unavailable".to_string()),
            )
        })
    }
}

fn hours_from(start: &str, rows: usize) -> Vec<chrono::NaiveDateTime> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..rows)
        .map(|i| start + Duration::hours(i as i64))
        .collect()
}

fn days_from(start: &str, rows: usize) -> Vec<String> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    (0..rows)
        .map(|i| (start + Duration::days(i as i64)).format("%Y-%m-%d").to_string())
        .collect()
}

/// Synthetic hourly precipitation in mm, shared with assertions.
pub fn hourly_precipitation(i: usize) -> f64 {
    (i % 7) as f64 * 0.1
}

/// Open-Meteo archive response with `rows` hours from 2020-01-01.
pub fn historical_hourly_json(rows: usize) -> Value {
    let times: Vec<String> = hours_from("2020-01-01", rows)
        .iter()
        .map(|t| t.format("%Y-%m-%dT%H:%M").to_string())
        .collect();
    json!({
        "latitude": -34.25,
        "longitude": 116.75,
        "generationtime_ms": 0.41,
        "utc_offset_seconds": 28800,
        "timezone": "Australia/Perth",
        "timezone_abbreviation": "AWST",
        "elevation": 215.0,
        "hourly_units": {
            "time": "iso8601",
            "shortwave_radiation": "W/m²",
            "cloudcover": "%",
            "temperature_2m": "°C",
            "relativehumidity_2m": "%",
            "windspeed_10m": "m/s",
            "precipitation": "mm"
        },
        "hourly": {
            "time": times,
            "shortwave_radiation": (0..rows).map(|i| ((i % 24) * 40) as f64).collect::<Vec<_>>(),
            "cloudcover": (0..rows).map(|i| (i * 13) % 101).collect::<Vec<_>>(),
            "temperature_2m": (0..rows).map(|i| 15.0 + (i % 24) as f64 * 0.5).collect::<Vec<_>>(),
            "relativehumidity_2m": (0..rows).map(|i| (40 + i % 50) as f64).collect::<Vec<_>>(),
            "windspeed_10m": (0..rows).map(|i| (i % 10) as f64 * 0.7).collect::<Vec<_>>(),
            "precipitation": (0..rows).map(hourly_precipitation).collect::<Vec<_>>()
        }
    })
}

/// Open-Meteo archive response with `rows` days of the daily default list.
pub fn historical_daily_json(rows: usize) -> Value {
    json!({
        "latitude": -34.25,
        "longitude": 116.75,
        "elevation": 215.0,
        "daily_units": {"time": "iso8601", "precipitation_sum": "mm"},
        "daily": {
            "time": days_from("2020-01-01", rows),
            "shortwave_radiation_sum": vec![20.1; rows],
            "temperature_2m_mean": vec![18.0; rows],
            "temperature_2m_max": vec![24.0; rows],
            "temperature_2m_min": vec![12.0; rows],
            "windspeed_10m_max": vec![6.5; rows],
            "precipitation_sum": vec![1.2; rows],
            "et0_fao_evapotranspiration": vec![4.4; rows]
        }
    })
}

/// Open-Meteo climate response with every GLM source column suffixed per model.
/// Columns named in `omit` are left out.
pub fn climate_json(models: &[&str], rows: usize, omit: &[&str]) -> Value {
    let mut daily = Map::new();
    daily.insert("time".to_string(), json!(days_from("2050-01-01", rows)));
    for (m, model) in models.iter().enumerate() {
        let columns = [
            ("shortwave_radiation_sum", 200.0 + m as f64),
            ("cloudcover_mean", 50.0 + m as f64),
            ("temperature_2m_mean", 20.0 + m as f64),
            ("relative_humidity_2m_mean", 60.0 + m as f64),
            ("windspeed_10m_mean", 3.0 + m as f64),
            ("precipitation_sum", 2.0 + m as f64),
        ];
        for (base, value) in columns {
            let name = format!("{base}_{model}");
            if !omit.contains(&name.as_str()) {
                daily.insert(name, json!(vec![value; rows]));
            }
        }
    }
    json!({
        "latitude": -34.25,
        "longitude": 116.75,
        "elevation": 215.0,
        "daily_units": {"time": "iso8601"},
        "daily": daily
    })
}

/// SILO Data Drill CSV: elevation on the first metadata line.
pub fn silo_grid_csv() -> String {
    [
        "latitude,longitude,YYYY-MM-DD,daily_rain,daily_rain_source,max_temp,max_temp_source,min_temp,min_temp_source,metadata",
        "-32.15,116.60,2022-01-01,0.0,25,33.1,25,16.2,25,elevation=  301.2 m",
        "-32.15,116.60,2022-01-02,0.4,25,30.0,25,15.0,25,reference=XXXXXXXX",
        "-32.15,116.60,2022-01-03,0.0,25,29.4,25,14.1,25,extracted=20220105",
    ]
    .join("\n")
        + "\n"
}

/// SILO Patched Point CSV: name, latitude, longitude, elevation lines.
pub fn silo_station_csv() -> String {
    [
        "station,YYYY-MM-DD,daily_rain,daily_rain_source,max_temp,max_temp_source,metadata",
        "9518,2022-01-01,0.0,0,31.5,0,name=ALBANY AIRPORT",
        "9518,2022-01-02,1.2,0,27.0,0,latitude=-34.9414",
        "9518,2022-01-03,0.0,0,25.5,0,longitude=117.8022",
        "9518,2022-01-04,0.0,0,26.1,0,elevation=  68.0 m",
        "9518,2022-01-05,3.4,0,22.0,0,reference=XXXXXXXX",
    ]
    .join("\n")
        + "\n"
}

/// NASA POWER hourly response; the third hour of every series is missing.
pub fn power_json(rows: usize) -> Value {
    let keys: Vec<String> = hours_from("2022-01-01", rows)
        .iter()
        .map(|t| t.format("%Y%m%d%H").to_string())
        .collect();
    let series = |base: f64| {
        let mut values = Map::new();
        for (i, key) in keys.iter().enumerate() {
            let value = if i == 2 { -999.0 } else { base + i as f64 };
            values.insert(key.clone(), json!(value));
        }
        Value::Object(values)
    };
    json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [116.6, -32.15, 301.2]},
        "properties": {
            "parameter": {
                "ALLSKY_SFC_SW_DWN": series(100.0),
                "CLOUD_AMT": series(10.0),
                "T2M": series(20.0),
                "RH2M": series(50.0),
                "WS2M": series(1.0),
                "PRECTOTCORR": series(0.0)
            }
        },
        "header": {
            "title": "NASA/POWER CERES/MERRA2 Native Resolution Hourly Data",
            "fill_value": -999.0,
            "time_standard": "LST",
            "start": "20220101",
            "end": "20220101"
        },
        "messages": [],
        "parameters": {
            "T2M": {"units": "C", "longname": "Temperature at 2 Meters"},
            "PRECTOTCORR": {"units": "mm/hour", "longname": "Precipitation Corrected"}
        },
        "times": {"data": 0.9, "process": 0.1}
    })
}
