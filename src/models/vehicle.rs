//! Vehicle listing model

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::pricing::calculators::{resolve_lot_price, round_money};
use crate::pricing::models::PriceRange;

const KM_PER_MILE: Decimal = dec!(1.60934);

/// Auction listing as published in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub title: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    /// Current bid in USD
    pub price: Decimal,
    /// Buy-now ceiling in USD
    #[serde(default)]
    pub buy_now_price: Option<Decimal>,
    pub damage: String,
    pub engine: String,
    /// Odometer in miles
    pub mileage: u32,
    pub location: String,
    pub vin: String,
    pub end_date: DateTime<Utc>,
    pub bids: u32,
}

impl Vehicle {
    /// Lot price bounds with the buy-now default applied
    pub fn lot_price(&self) -> PriceRange {
        resolve_lot_price(self.price, self.buy_now_price)
    }

    pub fn odometer_km(&self) -> u32 {
        round_money(Decimal::from(self.mileage) * KM_PER_MILE, 0)
            .to_u32()
            .unwrap_or(0)
    }

    /// Whether bidding is still open at `now`
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.end_date > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn listing(buy_now_price: Option<Decimal>) -> Vehicle {
        Vehicle {
            id: "1".to_string(),
            title: "2022 BMW M4 Competition".to_string(),
            make: "BMW".to_string(),
            model: "M4".to_string(),
            year: 2022,
            price: dec!(42500),
            buy_now_price,
            damage: "Front End".to_string(),
            engine: "3.0L Twin-Turbo I6".to_string(),
            mileage: 12500,
            location: "Los Angeles, CA".to_string(),
            vin: "WBS43AZ02NCK12345".to_string(),
            end_date: Utc.with_ymd_and_hms(2024, 2, 15, 18, 0, 0).unwrap(),
            bids: 23,
        }
    }

    #[test]
    fn test_lot_price_uses_buy_now() {
        let lot = listing(Some(dec!(55000))).lot_price();
        assert_eq!(lot, PriceRange::new(dec!(42500), dec!(55000)));
    }

    #[test]
    fn test_lot_price_without_buy_now() {
        let lot = listing(None).lot_price();
        assert_eq!(lot.max, dec!(59500));
    }

    #[test]
    fn test_odometer_km() {
        // 12500 mi = 20116.75 km
        assert_eq!(listing(None).odometer_km(), 20117);
    }

    #[test]
    fn test_is_open_at() {
        let vehicle = listing(None);
        assert!(vehicle.is_open_at(Utc.with_ymd_and_hms(2024, 2, 15, 17, 59, 59).unwrap()));
        assert!(!vehicle.is_open_at(Utc.with_ymd_and_hms(2024, 2, 15, 18, 0, 0).unwrap()));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let vehicle: Vehicle = serde_json::from_str(
            r#"{
                "id": "7", "title": "2021 Ford Mustang GT500", "make": "Ford",
                "model": "Mustang", "year": 2021, "price": 48000,
                "damage": "Front End", "engine": "5.2L Supercharged V8",
                "mileage": 18900, "location": "Detroit, MI",
                "vin": "1FA6P8SJ5M5901234", "endDate": "2024-02-14T17:00:00Z", "bids": 34
            }"#,
        )
        .unwrap();
        assert_eq!(vehicle.buy_now_price, None);
        assert_eq!(vehicle.lot_price().max, dec!(67200));
    }
}
