//! Exchange rate snapshots
//!
//! Readers always get a whole `ExchangeRateTable`; a refresh swaps the
//! snapshot atomically instead of updating individual rates.

use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::info;

use crate::config;
use crate::error::Result;
use crate::pricing::models::ExchangeRateTable;

/// Supplies exchange rate snapshots
pub trait RateSource: Send + Sync {
    fn fetch(&self) -> Result<ExchangeRateTable>;
}

/// Always returns the same snapshot
#[derive(Debug, Clone)]
pub struct FixedRateSource(pub ExchangeRateTable);

impl RateSource for FixedRateSource {
    fn fetch(&self) -> Result<ExchangeRateTable> {
        Ok(self.0)
    }
}

/// Re-reads the rate variables from the environment on every fetch
#[derive(Debug, Clone, Default)]
pub struct EnvRateSource;

impl RateSource for EnvRateSource {
    fn fetch(&self) -> Result<ExchangeRateTable> {
        config::rates_from_env()
    }
}

/// Holder of the current rate snapshot
#[derive(Debug)]
pub struct RateStore {
    current: ArcSwap<ExchangeRateTable>,
}

impl RateStore {
    pub fn new(rates: ExchangeRateTable) -> Self {
        Self {
            current: ArcSwap::from_pointee(rates),
        }
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<ExchangeRateTable> {
        self.current.load_full()
    }

    /// Replace the snapshot wholesale
    pub fn replace(&self, rates: ExchangeRateTable) {
        info!(
            "Exchange rates replaced: USD/EUR {}, USD/PLN {}",
            rates.usd_to_eur, rates.usd_to_pln
        );
        self.current.store(Arc::new(rates));
    }

    /// Fetch from `source` and replace; keeps the old snapshot on failure
    pub fn refresh(&self, source: &dyn RateSource) -> Result<Arc<ExchangeRateTable>> {
        let rates = source.fetch()?;
        self.replace(rates);
        Ok(self.snapshot())
    }
}

impl Default for RateStore {
    fn default() -> Self {
        Self::new(ExchangeRateTable::default())
    }
}
