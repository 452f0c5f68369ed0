//! Price and customs estimation engine.
//!
//! The pipeline in `calculators` is pure and synchronous; `services` wraps it
//! with the catalog, the rate snapshot and the estimate memo.

pub mod calculators;
pub mod format;
pub mod models;
pub mod requests;
pub mod responses;
pub mod services;

// Re-export commonly used items
pub use calculators::{calculate_import_cost, round_money, run_estimate};
pub use models::{
    DestinationPort, DisplayCurrency, DutyCategory, EstimateInput, EstimateSelection,
    EstimationResult, ExchangeRateTable, FeeSchedule, ImportRegion, PriceRange, VatCategory,
};
pub use requests::{EstimateRequest, ImportCostRequest};
pub use responses::{EstimateResponse, ImportCostResponse};
pub use services::{Estimator, PricingError};
