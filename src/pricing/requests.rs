//! Request DTOs for the estimator.
//!
//! Money fields mirror form controls: numbers, numeric strings, `null` and
//! garbage are all accepted, and anything that is not a usable non-negative
//! amount becomes zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use super::calculators::{money_from_f64, parse_money, sanitize_money, ImportCostInput};
use super::models::{
    DestinationPort, DisplayCurrency, DutyCategory, EstimateSelection, ImportRegion, VatCategory,
};

/// Request to estimate a listing from raw lot prices
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize)]
pub struct EstimateRequest {
    #[serde(default, deserialize_with = "lenient_money")]
    pub lot_price_min: Decimal,
    #[serde(default, deserialize_with = "lenient_money_option")]
    pub lot_price_max: Option<Decimal>,
    #[serde(default)]
    pub port: DestinationPort,
    #[serde(default)]
    pub duty: DutyCategory,
    #[serde(default)]
    pub vat: VatCategory,
    #[serde(default)]
    pub currency: DisplayCurrency,
    #[serde(default, deserialize_with = "lenient_money_option")]
    pub customs_value: Option<Decimal>,
}

impl EstimateRequest {
    pub fn new(lot_price_min: Decimal, lot_price_max: Option<Decimal>, selection: EstimateSelection) -> Self {
        Self {
            lot_price_min,
            lot_price_max,
            port: selection.port,
            duty: selection.duty,
            vat: selection.vat,
            currency: selection.currency,
            customs_value: selection.customs_value,
        }
    }

    pub fn selection(&self) -> EstimateSelection {
        EstimateSelection {
            port: self.port,
            duty: self.duty,
            vat: self.vat,
            currency: self.currency,
            customs_value: self.customs_value,
        }
    }

    /// Same request with every money field run through the sanitizer.
    ///
    /// Two requests that differ only in how they spell "nothing" (negative,
    /// zero, absent) normalize to the same value, which keeps memo keys stable.
    pub fn normalized(&self) -> Self {
        let positive = |value: Option<Decimal>| value.map(sanitize_money).filter(|v| !v.is_zero());
        Self {
            lot_price_min: sanitize_money(self.lot_price_min).normalize(),
            lot_price_max: positive(self.lot_price_max).map(|v| v.normalize()),
            customs_value: positive(self.customs_value).map(|v| v.normalize()),
            ..self.clone()
        }
    }
}

/// Request for the quick import calculator
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportCostRequest {
    #[serde(default, deserialize_with = "lenient_money")]
    pub vehicle_price: Decimal,
    #[serde(default = "default_import_auction_fees", deserialize_with = "lenient_money")]
    pub auction_fees: Decimal,
    #[serde(default)]
    pub region: Option<ImportRegion>,
    /// Overrides the region preset when present
    #[serde(default, deserialize_with = "lenient_money_option")]
    pub shipping_cost: Option<Decimal>,
    #[serde(default = "default_import_tax_rate", deserialize_with = "lenient_money")]
    pub tax_rate_percent: Decimal,
}

impl ImportCostRequest {
    /// Calculator input; an explicit shipping cost wins over the region preset.
    pub fn to_input(&self) -> ImportCostInput {
        let shipping_cost = self
            .shipping_cost
            .or_else(|| self.region.map(ImportRegion::shipping_cost))
            .unwrap_or(Decimal::ZERO);
        ImportCostInput {
            vehicle_price: self.vehicle_price,
            auction_fees: self.auction_fees,
            shipping_cost,
            tax_rate_percent: self.tax_rate_percent,
        }
    }
}

fn default_import_auction_fees() -> Decimal {
    super::calculators::DEFAULT_IMPORT_AUCTION_FEES
}

fn default_import_tax_rate() -> Decimal {
    super::calculators::DEFAULT_IMPORT_TAX_RATE
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMoney {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawMoney {
    fn into_money(self) -> Decimal {
        match self {
            RawMoney::Number(value) => money_from_f64(value),
            RawMoney::Text(text) => parse_money(&text),
            RawMoney::Other(value) => {
                tracing::debug!("Non-numeric money field {} coerced to 0", value);
                Decimal::ZERO
            }
        }
    }
}

fn lenient_money<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(RawMoney::deserialize(deserializer)?.into_money())
}

fn lenient_money_option<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawMoney>::deserialize(deserializer)?.map(RawMoney::into_money))
}
