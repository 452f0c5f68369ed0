//! Configuration from the environment
//!
//! `.env` (or an explicit env file) is loaded when present. Every variable is
//! optional and falls back to the published fee schedule and rate snapshot; a
//! variable that is set but is not a decimal between 0 and `MAX_MONEY` is a
//! startup error.

use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AppError, Result};
use crate::pricing::calculators::MAX_MONEY;
use crate::pricing::models::{ExchangeRateTable, FeeSchedule};

pub const AUCTION_FEES_MIN: &str = "WESTWHEELS_AUCTION_FEES_MIN";
pub const AUCTION_FEES_MAX: &str = "WESTWHEELS_AUCTION_FEES_MAX";
pub const TRUCKING_TO_PORT: &str = "WESTWHEELS_TRUCKING_TO_PORT";
pub const BROKER_FEE: &str = "WESTWHEELS_BROKER_FEE";
pub const CUSTOMS_AGENCY_FLAT: &str = "WESTWHEELS_CUSTOMS_AGENCY_FLAT";
pub const USD_EUR: &str = "WESTWHEELS_USD_EUR";
pub const USD_PLN: &str = "WESTWHEELS_USD_PLN";
pub const CACHE_CAPACITY: &str = "WESTWHEELS_CACHE_CAPACITY";
pub const LOG: &str = "WESTWHEELS_LOG";

const DEFAULT_CACHE_CAPACITY: u64 = 1_000;
const DEFAULT_LOG_FILTER: &str = "warn";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub fees: FeeSchedule,
    pub rates: ExchangeRateTable,
    /// Maximum number of memoized estimates
    pub cache_capacity: u64,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Env file the variables were loaded from, if any
    pub env_file: Option<PathBuf>,
}

impl Config {
    /// Load `env_file` (or `.env` if present) and read the configuration from
    /// the environment.
    ///
    /// Runs before tracing is installed, so nothing is logged here; the loaded
    /// file is reported through `env_file`.
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        let env_file = match env_file {
            Some(path) => {
                dotenvy::from_path(path)
                    .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
                Some(path.to_path_buf())
            }
            None => dotenvy::dotenv().ok(),
        };

        let mut config = Self::from_lookup(|name| std::env::var(name).ok())?;
        config.env_file = env_file;
        Ok(config)
    }

    /// Build the configuration from any variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = FeeSchedule::default();
        let fees = FeeSchedule {
            auction_fees_min: decimal_var(&lookup, AUCTION_FEES_MIN, defaults.auction_fees_min)?,
            auction_fees_max: decimal_var(&lookup, AUCTION_FEES_MAX, defaults.auction_fees_max)?,
            trucking_to_port: decimal_var(&lookup, TRUCKING_TO_PORT, defaults.trucking_to_port)?,
            broker_fee: decimal_var(&lookup, BROKER_FEE, defaults.broker_fee)?,
            customs_agency_flat: decimal_var(&lookup, CUSTOMS_AGENCY_FLAT, defaults.customs_agency_flat)?,
        };
        if fees.auction_fees_max < fees.auction_fees_min {
            return Err(AppError::Config(format!(
                "{} ({}) is below {} ({})",
                AUCTION_FEES_MAX, fees.auction_fees_max, AUCTION_FEES_MIN, fees.auction_fees_min
            )));
        }

        let cache_capacity = match lookup(CACHE_CAPACITY) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                AppError::Config(format!("{}: invalid capacity '{}': {}", CACHE_CAPACITY, raw, e))
            })?,
            None => DEFAULT_CACHE_CAPACITY,
        };

        Ok(Self {
            fees,
            rates: rates_from_lookup(&lookup)?,
            cache_capacity,
            log_filter: lookup(LOG).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            env_file: None,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            rates: ExchangeRateTable::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            env_file: None,
        }
    }
}

/// Read the current rate snapshot from the process environment
pub fn rates_from_env() -> Result<ExchangeRateTable> {
    rates_from_lookup(&|name: &str| std::env::var(name).ok())
}

fn rates_from_lookup<F>(lookup: &F) -> Result<ExchangeRateTable>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = ExchangeRateTable::default();
    Ok(ExchangeRateTable::new(
        decimal_var(lookup, USD_EUR, defaults.usd_to_eur)?,
        decimal_var(lookup, USD_PLN, defaults.usd_to_pln)?,
    ))
}

fn decimal_var<F>(lookup: &F, name: &str, default: Decimal) -> Result<Decimal>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    let value = Decimal::from_str(raw.trim())
        .map_err(|e| AppError::Config(format!("{}: invalid decimal '{}': {}", name, raw, e)))?;
    if value.is_sign_negative() {
        return Err(AppError::Config(format!("{}: must not be negative, got {}", name, value)));
    }
    if value > MAX_MONEY {
        return Err(AppError::Config(format!(
            "{}: must not exceed {}, got {}",
            name, MAX_MONEY, value
        )));
    }
    Ok(value)
}
