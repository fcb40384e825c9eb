//! Provider adapters.
//!
//! Each adapter owns one request configuration and walks the same lifecycle:
//! [`MetAdapter::fetch`] stores provider-native [`RawMet`],
//! [`MetAdapter::convert`] derives GLM tables from it and the two export
//! operations write either form to disk. Operations called out of order fail
//! with [`GlmMetError::PreconditionNotMet`](crate::GlmMetError::PreconditionNotMet)
//! and leave the adapter untouched.

pub mod climate;
pub mod historical;
mod open_meteo;
pub mod power;
pub mod silo;

use crate::error::{GlmMetError, Result};
use crate::export::GlmOutput;
use crate::http::{MetHttpClient, QueryParams};
use crate::types::glm_table::{GlmTable, ModelTables};
use crate::types::lifecycle::Lifecycle;
use crate::types::raw_met::RawMet;
use climate::ClimateProjection;
use historical::Historical;
use power::NasaPower;
use silo::Silo;
use std::path::{Path, PathBuf};

/// The operations every provider adapter offers.
pub trait MetAdapter {
    /// What [`MetAdapter::convert`] produces.
    type Glm;

    /// Short provider name used in errors and logs.
    fn provider(&self) -> &'static str;

    fn lifecycle(&self) -> Lifecycle;

    /// The raw data from the last successful fetch.
    fn raw(&self) -> Option<&RawMet>;

    /// The GLM output from the last successful conversion, if it still applies
    /// to the current raw data.
    fn glm(&self) -> Option<&Self::Glm>;

    /// Requests data from the provider and stores it as raw data.
    ///
    /// `extras` is merged over the adapter's own query parameters, replacing
    /// keys it shares with them. A successful fetch discards any earlier raw
    /// and GLM data; a failed one changes nothing.
    fn fetch<C: MetHttpClient + ?Sized>(
        &mut self,
        client: &C,
        extras: Option<&QueryParams>,
    ) -> Result<&RawMet>;

    /// Converts the fetched raw data to GLM form. Repeatable; each call
    /// replaces the previous output.
    fn convert(&mut self) -> Result<&Self::Glm>;

    /// Writes the raw data and its metadata to `dir`.
    fn export_raw(&mut self, dir: &Path) -> Result<PathBuf>;

    /// Writes the GLM output to `dir` in the requested layout.
    fn export_canonical(&mut self, dir: &Path, output: &GlmOutput) -> Result<PathBuf>;
}

/// Converted output of any adapter.
#[derive(Debug, Clone, Copy)]
pub enum GlmView<'a> {
    Single(&'a GlmTable),
    PerModel(&'a ModelTables),
}

impl<'a> GlmView<'a> {
    pub fn single(self) -> Option<&'a GlmTable> {
        match self {
            GlmView::Single(table) => Some(table),
            GlmView::PerModel(_) => None,
        }
    }

    pub fn per_model(self) -> Option<&'a ModelTables> {
        match self {
            GlmView::PerModel(tables) => Some(tables),
            GlmView::Single(_) => None,
        }
    }
}

/// Any of the provider adapters, for callers that pick the provider at runtime.
#[derive(Debug, Clone)]
pub enum Adapter {
    Historical(Historical),
    Climate(ClimateProjection),
    Silo(Silo),
    Power(NasaPower),
}

macro_rules! dispatch {
    ($self:expr, $adapter:ident => $body:expr) => {
        match $self {
            Adapter::Historical($adapter) => $body,
            Adapter::Climate($adapter) => $body,
            Adapter::Silo($adapter) => $body,
            Adapter::Power($adapter) => $body,
        }
    };
}

impl Adapter {
    pub fn provider(&self) -> &'static str {
        dispatch!(self, a => a.provider())
    }

    pub fn lifecycle(&self) -> Lifecycle {
        dispatch!(self, a => a.lifecycle())
    }

    pub fn raw(&self) -> Option<&RawMet> {
        dispatch!(self, a => a.raw())
    }

    pub fn glm(&self) -> Option<GlmView<'_>> {
        match self {
            Adapter::Historical(a) => a.glm().map(GlmView::Single),
            Adapter::Climate(a) => a.glm().map(GlmView::PerModel),
            Adapter::Silo(a) => a.glm().map(GlmView::Single),
            Adapter::Power(a) => a.glm().map(GlmView::Single),
        }
    }

    pub fn fetch<C: MetHttpClient + ?Sized>(
        &mut self,
        client: &C,
        extras: Option<&QueryParams>,
    ) -> Result<&RawMet> {
        dispatch!(self, a => a.fetch(client, extras))
    }

    pub fn convert(&mut self) -> Result<GlmView<'_>> {
        match self {
            Adapter::Historical(a) => a.convert().map(GlmView::Single),
            Adapter::Climate(a) => a.convert().map(GlmView::PerModel),
            Adapter::Silo(a) => a.convert().map(GlmView::Single),
            Adapter::Power(a) => a.convert().map(GlmView::Single),
        }
    }

    pub fn export_raw(&mut self, dir: &Path) -> Result<PathBuf> {
        dispatch!(self, a => a.export_raw(dir))
    }

    pub fn export_canonical(&mut self, dir: &Path, output: &GlmOutput) -> Result<PathBuf> {
        dispatch!(self, a => a.export_canonical(dir, output))
    }
}

impl From<Historical> for Adapter {
    fn from(value: Historical) -> Self {
        Adapter::Historical(value)
    }
}

impl From<ClimateProjection> for Adapter {
    fn from(value: ClimateProjection) -> Self {
        Adapter::Climate(value)
    }
}

impl From<Silo> for Adapter {
    fn from(value: Silo) -> Self {
        Adapter::Silo(value)
    }
}

impl From<NasaPower> for Adapter {
    fn from(value: NasaPower) -> Self {
        Adapter::Power(value)
    }
}

/// Reads a timestamp column and rewrites every entry with `rule`. A missing
/// timestamp cannot be placed in a GLM file, so it is an error.
pub(crate) fn glm_times(
    raw: &RawMet,
    provider: &'static str,
    column: &str,
    rule: impl Fn(&str) -> Result<String>,
) -> Result<Vec<String>> {
    raw.str_values(provider, column)?
        .into_iter()
        .map(|value| match value {
            Some(value) => rule(&value),
            None => Err(GlmMetError::InvalidTimestamp("null".to_string())),
        })
        .collect()
}
