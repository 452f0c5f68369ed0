//! Estimator service.
//!
//! Ties the pure pipeline to its collaborators: the vehicle catalog, the fee
//! schedule, the exchange rate snapshot and the estimate memo.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, EstimateCache, EstimateKey};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::rates::{RateSource, RateStore};

use super::calculators::run_estimate;
use super::models::{DestinationPort, EstimateInput, EstimateSelection, ExchangeRateTable, FeeSchedule};
use super::requests::EstimateRequest;
use super::responses::EstimateResponse;

/// Estimator error types
#[derive(Debug, Clone, PartialEq)]
pub enum PricingError {
    VehicleNotFound { vehicle_id: String },
    RateSource { message: String },
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingError::VehicleNotFound { vehicle_id } => {
                write!(f, "No vehicle found with id {}", vehicle_id)
            }
            PricingError::RateSource { message } => {
                write!(f, "Exchange rate refresh failed: {}", message)
            }
        }
    }
}

impl std::error::Error for PricingError {}

/// Estimates listings against the current fee schedule and rate snapshot
pub struct Estimator {
    catalog: Catalog,
    fees: FeeSchedule,
    rates: RateStore,
    cache: EstimateCache,
}

impl Estimator {
    pub fn new(catalog: Catalog, fees: FeeSchedule, rates: ExchangeRateTable, cache: EstimateCache) -> Self {
        Self {
            catalog,
            fees,
            rates: RateStore::new(rates),
            cache,
        }
    }

    pub fn from_config(catalog: Catalog, config: &Config) -> Self {
        Self::new(
            catalog,
            config.fees,
            config.rates,
            EstimateCache::new(config.cache_capacity),
        )
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current exchange rate snapshot
    pub fn rates(&self) -> Arc<ExchangeRateTable> {
        self.rates.snapshot()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Estimate a listing from raw lot prices.
    ///
    /// Never fails: bad money values degrade to zero and missing values take
    /// their defaults before the pipeline runs.
    pub fn estimate(&self, request: &EstimateRequest) -> EstimateResponse {
        self.estimate_keyed(None, request)
    }

    /// Estimate a catalog vehicle with the given selection
    pub fn estimate_vehicle(
        &self,
        vehicle_id: &str,
        selection: EstimateSelection,
    ) -> Result<EstimateResponse, PricingError> {
        let vehicle = self.catalog.find(vehicle_id).ok_or_else(|| {
            warn!("Estimate requested for unknown vehicle {}", vehicle_id);
            PricingError::VehicleNotFound {
                vehicle_id: vehicle_id.to_string(),
            }
        })?;
        let request = EstimateRequest::new(vehicle.price, vehicle.buy_now_price, selection);
        Ok(self.estimate_keyed(Some(vehicle_id), &request))
    }

    /// One estimate per destination port, in port order
    pub fn compare_ports(&self, request: &EstimateRequest) -> Vec<EstimateResponse> {
        DestinationPort::ALL
            .iter()
            .map(|&port| {
                let request = EstimateRequest {
                    port,
                    ..request.clone()
                };
                self.estimate(&request)
            })
            .collect()
    }

    /// Replace the rate snapshot from `source` and drop memoized estimates.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn refresh_rates(&self, source: &dyn RateSource) -> Result<Arc<ExchangeRateTable>, PricingError> {
        let rates = self.rates.refresh(source).map_err(|e| {
            warn!("Keeping previous exchange rates: {}", e);
            PricingError::RateSource {
                message: e.to_string(),
            }
        })?;
        self.cache.invalidate_all();
        Ok(rates)
    }

    fn estimate_keyed(&self, vehicle_id: Option<&str>, request: &EstimateRequest) -> EstimateResponse {
        // the snapshot is part of the key, so entries priced at replaced rates are never served
        let rates = self.rates.snapshot();
        let key = EstimateKey::new(vehicle_id, request, &rates);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Cache HIT for estimate: {:?}", key);
            return (*cached).clone();
        }
        debug!("Cache MISS for estimate: {:?}", key);

        let input = EstimateInput {
            lot_price_min: key.request.lot_price_min,
            lot_price_max: key.request.lot_price_max,
            fees: self.fees,
            selection: key.request.selection(),
            rates: key.rates,
        };
        let result = run_estimate(&input);
        let response = EstimateResponse::build(&result, &key.rates, key.vehicle_id.clone());

        self.cache.insert(key, Arc::new(response.clone()));
        info!(
            "Estimated {} at {} via {}",
            vehicle_id.unwrap_or("listing"),
            response.final_total.formatted,
            result.port.label()
        );
        response
    }
}
