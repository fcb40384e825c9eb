mod error;
pub mod export;
mod http;
mod providers;
pub mod settings;
#[cfg(test)]
mod testing;
mod types;
pub mod units;

pub use error::{GlmMetError, Result};
pub use export::{ArchiveCompression, GlmOutput, NamedBuffer};

pub use http::error::UpstreamError;
pub use http::{BlockingHttpClient, MetHttpClient, MetRequest, QueryParams};

pub use providers::climate::ClimateProjection;
pub use providers::historical::{Granularity, Historical};
pub use providers::power::{Community, NasaPower, TimeStandard};
pub use providers::silo::{Silo, SiloApi};
pub use providers::{Adapter, GlmView, MetAdapter};

pub use types::date_range::DateRange;
pub use types::glm_table::{GlmColumns, GlmTable, ModelTables, GLM_COLUMNS};
pub use types::lifecycle::Lifecycle;
pub use types::location::{LonLat, Location};
pub use types::raw_met::RawMet;
pub use types::variables::VariableSelection;
