//! WestWheels price and customs estimation.
//!
//! Turns an auction listing's lot price into an itemized landed-cost estimate
//! for a European buyer: fees, ocean freight, duty, VAT and the final total in
//! the buyer's display currency.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod pricing;
pub mod rates;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
