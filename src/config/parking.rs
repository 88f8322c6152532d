//! Coordinator and store configuration.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, CoordinatorSettings, FeeSchedule, StorePolicy};

/// Store backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendConfig {
    /// In-memory store for development/testing.
    InMemory,
    /// JSON snapshot file under `dir`, named after `stream`.
    File {
        /// Directory holding the snapshot.
        dir: String,
        /// Snapshot name.
        stream: String,
    },
}

/// Fee policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Amount charged per started period.
    pub rate_per_period: u64,
    /// Billing period in seconds.
    pub period_secs: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            rate_per_period: 10,
            period_secs: 3600,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParkingConfig {
    /// Deadline for one store call, in milliseconds.
    pub store_timeout_ms: u64,
    /// Lots per page when the caller does not ask for a size.
    pub default_page_size: usize,
    /// Lost claims on an already contested space before a park gives up.
    pub max_claim_attempts: u32,
    /// Extra attempts for read-only store calls failing transiently.
    pub max_transient_retries: u32,
    /// Fee policy.
    pub fee: FeeConfig,
    /// Store backend selection.
    pub store: StoreBackendConfig,
}

impl Default for ParkingConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: 3000,
            default_page_size: 10,
            max_claim_attempts: 8,
            max_transient_retries: 2,
            fee: FeeConfig::default(),
            store: StoreBackendConfig::InMemory,
        }
    }
}

impl ParkingConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// A message naming the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.store_timeout_ms == 0 {
            return Err("store_timeout_ms must be greater than 0".into());
        }
        if self.default_page_size == 0 {
            return Err("default_page_size must be greater than 0".into());
        }
        if self.max_claim_attempts == 0 {
            return Err("max_claim_attempts must be greater than 0".into());
        }
        if self.fee.period_secs == 0 {
            return Err("fee.period_secs must be greater than 0".into());
        }
        if let StoreBackendConfig::File { dir, stream } = &self.store {
            if dir.trim().is_empty() || stream.trim().is_empty() {
                return Err("file store needs a non-empty dir and stream".into());
            }
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from `PARKING_*` environment variables, reading `.env` first if present.
    ///
    /// # Errors
    ///
    /// Unparseable values or a failed validation.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a variable lookup; unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Unparseable values or a failed validation.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        fn parse<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
            target: &mut T,
        ) -> AppResult<()>
        where
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            if let Some(raw) = lookup(key) {
                *target = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid value for {key}: {raw:?}"))?;
            }
            Ok(())
        }

        let mut cfg = Self::default();
        parse(&lookup, "PARKING_STORE_TIMEOUT_MS", &mut cfg.store_timeout_ms)?;
        parse(&lookup, "PARKING_PAGE_SIZE", &mut cfg.default_page_size)?;
        parse(&lookup, "PARKING_MAX_CLAIM_ATTEMPTS", &mut cfg.max_claim_attempts)?;
        parse(&lookup, "PARKING_MAX_TRANSIENT_RETRIES", &mut cfg.max_transient_retries)?;
        parse(&lookup, "PARKING_FEE_RATE", &mut cfg.fee.rate_per_period)?;
        parse(&lookup, "PARKING_FEE_PERIOD_SECS", &mut cfg.fee.period_secs)?;

        match lookup("PARKING_STORE").as_deref().map(str::trim) {
            None | Some("in_memory") => {}
            Some("file") => {
                let dir = lookup("PARKING_STORE_DIR")
                    .context("PARKING_STORE=file requires PARKING_STORE_DIR")?;
                let stream = lookup("PARKING_STORE_STREAM").unwrap_or_else(|| "parking".into());
                cfg.store = StoreBackendConfig::File { dir, stream };
            }
            Some(other) => anyhow::bail!("unknown PARKING_STORE backend `{other}`"),
        }

        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }

    /// Coordinator settings derived from this configuration.
    #[must_use]
    pub const fn settings(&self) -> CoordinatorSettings {
        CoordinatorSettings {
            store: StorePolicy {
                timeout: Duration::from_millis(self.store_timeout_ms),
                transient_retries: self.max_transient_retries,
            },
            max_claim_attempts: self.max_claim_attempts,
            default_page_size: self.default_page_size,
            fees: FeeSchedule {
                rate_per_period: self.fee.rate_per_period,
                period: Duration::from_secs(self.fee.period_secs),
            },
        }
    }
}
