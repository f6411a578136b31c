//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is honoured) and can be
//! overridden by command-line flags.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::{ScoreBands, EXCELLENT_THRESHOLD, GOOD_THRESHOLD};

const DEFAULT_BASE_URL: &str = "http://localhost:8085";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
    #[error("score bands must satisfy 0 <= good <= excellent <= 100 (good={good}, excellent={excellent})")]
    InvalidBands { good: f64, excellent: f64 },
    #[error("a user id is required (set MANTRA_USER_ID or pass --user-id)")]
    MissingUserId,
}

#[derive(Debug, Clone)]
pub struct Settings {
    api: ApiSettings,
    user_id: Option<u64>,
    telemetry: TelemetrySettings,
    bands: ScoreBands,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub token: Option<String>,
    /// `None` leaves the transport default in place.
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Settings {
    /// Loads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Loads settings from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api = ApiSettings {
            base_url: get("MANTRA_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            token: get("MANTRA_API_TOKEN"),
            timeout_seconds: get("MANTRA_HTTP_TIMEOUT_SECONDS")
                .map(|value| parse_u64("MANTRA_HTTP_TIMEOUT_SECONDS", value))
                .transpose()?,
        };

        let user_id = get("MANTRA_USER_ID")
            .map(|value| parse_u64("MANTRA_USER_ID", value))
            .transpose()?;

        let telemetry = TelemetrySettings {
            log_level: get("MANTRA_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_dir: PathBuf::from(
                get("MANTRA_LOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()),
            ),
        };

        let bands = ScoreBands {
            excellent: get("MANTRA_SCORE_EXCELLENT")
                .map(|value| parse_f64("MANTRA_SCORE_EXCELLENT", value))
                .transpose()?
                .unwrap_or(EXCELLENT_THRESHOLD),
            good: get("MANTRA_SCORE_GOOD")
                .map(|value| parse_f64("MANTRA_SCORE_GOOD", value))
                .transpose()?
                .unwrap_or(GOOD_THRESHOLD),
        };
        validate_bands(bands)?;

        Ok(Self {
            api,
            user_id,
            telemetry,
            bands,
        })
    }

    pub fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub fn bands(&self) -> ScoreBands {
        self.bands
    }

    pub fn user_id(&self) -> Result<u64, ConfigError> {
        self.user_id.ok_or(ConfigError::MissingUserId)
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(base_url) = base_url {
            self.api.base_url = base_url;
        }
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        if token.is_some() {
            self.api.token = token;
        }
        self
    }

    pub fn with_user_id(mut self, user_id: Option<u64>) -> Self {
        if user_id.is_some() {
            self.user_id = user_id;
        }
        self
    }
}

fn parse_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_f64(field: &'static str, value: String) -> Result<f64, ConfigError> {
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(ConfigError::InvalidValue { field, value }),
    }
}

fn validate_bands(bands: ScoreBands) -> Result<(), ConfigError> {
    if bands.good < 0.0 || bands.excellent > 100.0 || bands.good > bands.excellent {
        return Err(ConfigError::InvalidBands {
            good: bands.good,
            excellent: bands.excellent,
        });
    }
    Ok(())
}
