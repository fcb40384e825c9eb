//! The adapter lifecycle: `Uninitialized -> Fetched -> Converted -> Exported`.
//!
//! [`Stage`] carries the data each state owns, so "converted output without
//! raw data" cannot be represented at all.

use crate::error::{GlmMetError, Result};
use crate::types::raw_met::RawMet;
use std::fmt;

/// The externally visible lifecycle state of an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Uninitialized,
    Fetched,
    Converted,
    Exported,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lifecycle::Uninitialized => "uninitialized",
            Lifecycle::Fetched => "fetched",
            Lifecycle::Converted => "converted",
            Lifecycle::Exported => "exported",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Stage<G> {
    Uninitialized,
    Fetched(RawMet),
    Converted { raw: RawMet, glm: G },
    Exported { raw: RawMet, glm: Option<G> },
}

impl<G> Default for Stage<G> {
    fn default() -> Self {
        Stage::Uninitialized
    }
}

impl<G> Stage<G> {
    pub fn lifecycle(&self) -> Lifecycle {
        match self {
            Stage::Uninitialized => Lifecycle::Uninitialized,
            Stage::Fetched(_) => Lifecycle::Fetched,
            Stage::Converted { .. } => Lifecycle::Converted,
            Stage::Exported { .. } => Lifecycle::Exported,
        }
    }

    pub fn raw(&self) -> Option<&RawMet> {
        match self {
            Stage::Uninitialized => None,
            Stage::Fetched(raw) | Stage::Converted { raw, .. } | Stage::Exported { raw, .. } => {
                Some(raw)
            }
        }
    }

    pub fn glm(&self) -> Option<&G> {
        match self {
            Stage::Converted { glm, .. } => Some(glm),
            Stage::Exported { glm, .. } => glm.as_ref(),
            Stage::Uninitialized | Stage::Fetched(_) => None,
        }
    }

    pub fn require_raw(&self, operation: &'static str) -> Result<&RawMet> {
        self.raw().ok_or(GlmMetError::PreconditionNotMet {
            operation,
            stage: self.lifecycle(),
        })
    }

    pub fn require_glm(&self, operation: &'static str) -> Result<&G> {
        self.glm().ok_or(GlmMetError::PreconditionNotMet {
            operation,
            stage: self.lifecycle(),
        })
    }

    /// A new fetch replaces everything held before it.
    pub fn fetched(&mut self, raw: RawMet) {
        *self = Stage::Fetched(raw);
    }

    /// Stores converted output. No-op when there is no raw data to pair it with;
    /// callers check [`Stage::require_raw`] first.
    pub fn converted(&mut self, glm: G) {
        *self = match std::mem::take(self) {
            Stage::Fetched(raw) | Stage::Converted { raw, .. } | Stage::Exported { raw, .. } => {
                Stage::Converted { raw, glm }
            }
            Stage::Uninitialized => Stage::Uninitialized,
        };
    }

    pub fn exported(&mut self) {
        *self = match std::mem::take(self) {
            Stage::Fetched(raw) => Stage::Exported { raw, glm: None },
            Stage::Converted { raw, glm } => Stage::Exported {
                raw,
                glm: Some(glm),
            },
            other => other,
        };
    }
}
