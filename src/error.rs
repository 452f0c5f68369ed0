//! Error handling for the application

use crate::pricing::PricingError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog parse error: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::Config("WESTWHEELS_USD_EUR: invalid decimal 'abc'".to_string());
        assert!(err.to_string().starts_with("Configuration error"));

        let err = AppError::from(PricingError::VehicleNotFound {
            vehicle_id: "42".to_string(),
        });
        assert!(err.to_string().contains("42"));
    }
}
