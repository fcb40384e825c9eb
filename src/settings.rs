//! Provider endpoints and default variable lists.

pub const HISTORICAL_API_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
pub const CLIMATE_API_URL: &str = "https://climate-api.open-meteo.com/v1/climate";
pub const SILO_DATA_DRILL_URL: &str =
    "https://www.longpaddock.qld.gov.au/cgi-bin/silo/DataDrillDataset.php";
pub const SILO_PATCH_POINT_URL: &str =
    "https://www.longpaddock.qld.gov.au/cgi-bin/silo/PatchedPointDataset.php";
pub const NASA_POWER_API_URL: &str = "https://power.larc.nasa.gov/api/temporal/hourly/point";

/// SILO accepts any username (an email address) with this fixed password.
pub const SILO_PASSWORD: &str = "apirequest";

pub const HOURLY_HISTORICAL_DEFAULT: &[&str] = &[
    "shortwave_radiation",
    "cloudcover",
    "temperature_2m",
    "relativehumidity_2m",
    "windspeed_10m",
    "precipitation",
];

pub const DAILY_HISTORICAL_DEFAULT: &[&str] = &[
    "shortwave_radiation_sum",
    "temperature_2m_mean",
    "temperature_2m_max",
    "temperature_2m_min",
    "windspeed_10m_max",
    "precipitation_sum",
    "et0_fao_evapotranspiration",
];

pub const CLIMATE_MODELS: &[&str] = &[
    "CMCC_CM2_VHR4",
    "FGOALS_f3_H",
    "HiRAM_SIT_HR",
    "MRI_AGCM3_2_S",
    "EC_Earth3P_HR",
    "MPI_ESM1_2_XR",
    "NICAM16_8S",
];

pub const CLIMATE_DEFAULT: &[&str] = &[
    "shortwave_radiation_sum",
    "cloudcover_mean",
    "temperature_2m_mean",
    "temperature_2m_max",
    "temperature_2m_min",
    "relative_humidity_2m_mean",
    "windspeed_10m_mean",
    "precipitation_sum",
    "et0_fao_evapotranspiration_sum",
];

// https://power.larc.nasa.gov/#documentation
pub const NASA_POWER_HOURLY_DEFAULT: &[&str] = &[
    "ALLSKY_SFC_SW_DWN", // W/m^2
    "CLOUD_AMT",         // %
    "T2M",               // degC
    "RH2M",              // %
    "WS2M",              // m/s
    "PRECTOTCORR",       // mm/hour
];

/// NASA POWER's marker for missing values when the header omits one.
pub const NASA_POWER_FILL_VALUE: f64 = -999.0;
