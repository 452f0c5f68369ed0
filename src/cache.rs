//! In-memory caching using moka
//!
//! Memoizes itemized estimates. The pipeline is pure and keys carry the rate
//! snapshot, so a lookup never returns an estimate priced at replaced rates.
//! Refreshing rates also clears the cache to release old entries.

use moka::sync::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::pricing::models::ExchangeRateTable;
use crate::pricing::requests::EstimateRequest;
use crate::pricing::responses::EstimateResponse;

/// Cache key: optional vehicle id, the normalized request and the rate
/// snapshot it is priced against
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EstimateKey {
    pub vehicle_id: Option<String>,
    pub request: EstimateRequest,
    pub rates: ExchangeRateTable,
}

impl EstimateKey {
    pub fn new(vehicle_id: Option<&str>, request: &EstimateRequest, rates: &ExchangeRateTable) -> Self {
        Self {
            vehicle_id: vehicle_id.map(str::to_string),
            request: request.normalized(),
            rates: *rates,
        }
    }
}

/// Estimate memo
#[derive(Clone)]
pub struct EstimateCache {
    estimates: Cache<EstimateKey, Arc<EstimateResponse>>,
}

impl EstimateCache {
    /// Create a cache holding up to `capacity` estimates, 30 min TTL
    pub fn new(capacity: u64) -> Self {
        Self {
            estimates: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(Duration::from_secs(30 * 60))
                .time_to_idle(Duration::from_secs(10 * 60))
                .build(),
        }
    }

    pub fn get(&self, key: &EstimateKey) -> Option<Arc<EstimateResponse>> {
        self.estimates.get(key)
    }

    pub fn insert(&self, key: EstimateKey, response: Arc<EstimateResponse>) {
        self.estimates.insert(key, response);
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        self.estimates.run_pending_tasks();
        CacheStats {
            estimates_size: self.estimates.entry_count(),
        }
    }

    /// Drop every memoized estimate
    pub fn invalidate_all(&self) {
        self.estimates.invalidate_all();
        info!("Estimate cache invalidated");
    }
}

impl Default for EstimateCache {
    fn default() -> Self {
        Self::new(1_000)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub estimates_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::calculators::run_estimate;
    use crate::pricing::models::{EstimateInput, EstimateSelection, FeeSchedule};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn response() -> Arc<EstimateResponse> {
        let rates = ExchangeRateTable::default();
        let result = run_estimate(&EstimateInput {
            lot_price_min: dec!(10000),
            lot_price_max: None,
            fees: FeeSchedule::default(),
            selection: EstimateSelection::default(),
            rates,
        });
        Arc::new(EstimateResponse::build(&result, &rates, None))
    }

    #[test]
    fn test_key_normalizes_request() {
        let rates = ExchangeRateTable::default();
        let mut request = EstimateRequest::new(dec!(10000.00), None, EstimateSelection::default());
        let a = EstimateKey::new(Some("1"), &request, &rates);
        request.lot_price_max = Some(Decimal::ZERO);
        let b = EstimateKey::new(Some("1"), &request, &rates);
        assert_eq!(a, b);
        assert_ne!(a, EstimateKey::new(None, &request, &rates));
    }

    #[test]
    fn test_key_depends_on_rate_snapshot() {
        let request = EstimateRequest::default();
        let old = ExchangeRateTable::new(dec!(0.8593), dec!(3.6153));
        let new = ExchangeRateTable::new(dec!(0.92), dec!(3.98));
        assert_ne!(
            EstimateKey::new(None, &request, &old),
            EstimateKey::new(None, &request, &new)
        );
    }

    #[test]
    fn test_insert_get_invalidate() {
        let cache = EstimateCache::new(10);
        let key = EstimateKey::new(None, &EstimateRequest::default(), &ExchangeRateTable::default());
        assert!(cache.get(&key).is_none());

        cache.insert(key.clone(), response());
        assert!(cache.get(&key).is_some());
        assert_eq!(cache.stats().estimates_size, 1);

        cache.invalidate_all();
        assert!(cache.get(&key).is_none());
    }
}
