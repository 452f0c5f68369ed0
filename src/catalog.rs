//! In-memory vehicle catalog
//!
//! The built-in listings are embedded at compile time and parsed once at
//! startup. There is no persistence; the catalog is read-only after loading.

use std::collections::HashSet;

use crate::error::{AppError, Result};
use crate::models::Vehicle;

const BUILTIN_LISTINGS: &str = include_str!("../data/vehicles.json");

/// Read-only set of vehicle listings, in publication order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    vehicles: Vec<Vehicle>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate listing ids
    pub fn new(vehicles: Vec<Vehicle>) -> Result<Self> {
        let mut seen = HashSet::new();
        for vehicle in &vehicles {
            if !seen.insert(vehicle.id.as_str()) {
                return Err(AppError::InvalidCatalog(format!(
                    "duplicate vehicle id '{}'",
                    vehicle.id
                )));
            }
        }
        Ok(Self { vehicles })
    }

    /// Parse a JSON array of listings
    pub fn from_json(json: &str) -> Result<Self> {
        let vehicles: Vec<Vehicle> = serde_json::from_str(json)?;
        Self::new(vehicles)
    }

    /// The listings shipped with the site
    pub fn builtin() -> Result<Self> {
        let catalog = Self::from_json(BUILTIN_LISTINGS)?;
        tracing::debug!("Loaded {} built-in listings", catalog.len());
        Ok(catalog)
    }

    pub fn find(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.id == id)
    }

    pub fn all(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.all()[0].title, "2022 BMW M4 Competition");
    }

    #[test]
    fn test_find_vehicle() {
        let catalog = Catalog::builtin().unwrap();

        let m4 = catalog.find("1").unwrap();
        assert_eq!(m4.price, dec!(42500));
        assert_eq!(m4.buy_now_price, Some(dec!(55000)));

        let amg = catalog.find("2").unwrap();
        assert_eq!(amg.buy_now_price, None);
        assert_eq!(amg.lot_price().max, dec!(96460));

        assert!(catalog.find("99").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let catalog = Catalog::builtin().unwrap();
        let mut vehicles = catalog.all().to_vec();
        vehicles.push(vehicles[0].clone());

        let err = Catalog::new(vehicles).unwrap_err();
        assert!(err.to_string().contains("duplicate vehicle id '1'"));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            Catalog::from_json("[{\"id\": 1}]"),
            Err(AppError::Catalog(_))
        ));
    }
}
