//! Response handling shared by the two Open-Meteo adapters.
//!
//! Open-Meteo answers with one JSON object: the requested series live in a
//! column-oriented sub-object (`hourly` or `daily`) and everything else is
//! provenance (coordinates actually used, elevation, units, timezone).

use crate::error::{GlmMetError, Result};
use crate::http::error::UpstreamError;
use polars::prelude::{Column, DataFrame};
use serde_json::{Map, Value};

/// Splits a response into its metadata and the `section` series as a frame.
pub(crate) fn split_response(
    body: Value,
    section: &str,
    url: &str,
) -> Result<(Map<String, Value>, DataFrame)> {
    let mut object = match body {
        Value::Object(object) => object,
        other => {
            return Err(GlmMetError::upstream(
                url,
                UpstreamError::MalformedBody(format!("expected a JSON object, got {other}")),
            ))
        }
    };

    if object.get("error").and_then(Value::as_bool) == Some(true) {
        let reason = object
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("unspecified error")
            .to_string();
        return Err(GlmMetError::upstream(url, UpstreamError::Provider(reason)));
    }

    let series = match object.shift_remove(section) {
        Some(Value::Object(series)) => series,
        _ => {
            return Err(GlmMetError::upstream(
                url,
                UpstreamError::MalformedBody(format!("response has no '{section}' object")),
            ))
        }
    };

    let frame = frame_from_columns(&series).map_err(|e| GlmMetError::upstream(url, e))?;
    Ok((object, frame))
}

/// Builds a frame from `{"column": [values...]}`, keeping response order.
pub(crate) fn frame_from_columns(
    series: &Map<String, Value>,
) -> std::result::Result<DataFrame, UpstreamError> {
    let columns = series
        .iter()
        .map(|(name, values)| match values {
            Value::Array(values) => json_column(name, values),
            _ => Err(UpstreamError::MalformedBody(format!(
                "column '{name}' is not an array"
            ))),
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    DataFrame::new(columns).map_err(|e| UpstreamError::MalformedBody(e.to_string()))
}

/// Numbers (and nulls) become `Float64`, strings become `String`.
fn json_column(name: &str, values: &[Value]) -> std::result::Result<Column, UpstreamError> {
    if values.iter().all(|v| v.is_null() || v.is_number()) {
        let floats: Vec<Option<f64>> = values.iter().map(Value::as_f64).collect();
        return Ok(Column::new(name.into(), floats));
    }
    if values.iter().all(|v| v.is_null() || v.is_string()) {
        let strings: Vec<Option<&str>> = values.iter().map(Value::as_str).collect();
        return Ok(Column::new(name.into(), strings));
    }
    Err(UpstreamError::MalformedBody(format!(
        "column '{name}' mixes value types"
    )))
}
