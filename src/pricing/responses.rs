//! Response DTOs handed to the host application.
//!
//! Amounts serialize as strings so no precision is lost on the way to JSON.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::{project_currency, uncertainty_band, ImportCostInput, ImportCostResult};
use super::format::{format_money, format_range};
use super::models::{
    DestinationPort, DisplayCurrency, EstimationResult, ExchangeRateTable, PriceRange,
};

/// Money value for JSON responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
    pub formatted: String,
}

impl MoneyResponse {
    pub fn new(amount: Decimal, currency: DisplayCurrency) -> Self {
        Self {
            amount,
            currency: currency.code().to_string(),
            formatted: format_money(amount, currency),
        }
    }

    pub fn usd(amount: Decimal) -> Self {
        Self::new(amount, DisplayCurrency::Usd)
    }
}

/// Min/max pair for JSON responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub min: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub max: Decimal,
    pub currency: String,
    pub formatted: String,
}

impl RangeResponse {
    pub fn new(range: PriceRange, currency: DisplayCurrency) -> Self {
        Self {
            min: range.min,
            max: range.max,
            currency: currency.code().to_string(),
            formatted: format_range(range, currency),
        }
    }

    pub fn usd(range: PriceRange) -> Self {
        Self::new(range, DisplayCurrency::Usd)
    }

    /// `amount` paired with its uncertainty band, e.g. `€2,930 – €3,223`
    pub fn banded(amount: Decimal, currency: DisplayCurrency) -> Self {
        Self::new(PriceRange::new(amount, uncertainty_band(amount)), currency)
    }
}

/// Ocean freight line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingLine {
    pub port: DestinationPort,
    pub port_label: String,
    pub cost: MoneyResponse,
}

/// Duty or VAT line: rate, USD amount, and the banded figure in the display currency
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomsLine {
    pub category: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub rate_percent: Decimal,
    pub amount: MoneyResponse,
    pub display: RangeResponse,
}

/// Customs clearance total with its banded display figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomsTotalLine {
    pub amount: MoneyResponse,
    pub display: RangeResponse,
}

/// Rate snapshot the estimate was projected with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeRatesResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub usd_to_eur: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub usd_to_pln: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub eur_to_pln: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ExchangeRateTable> for ExchangeRatesResponse {
    fn from(rates: &ExchangeRateTable) -> Self {
        Self {
            usd_to_eur: rates.usd_to_eur,
            usd_to_pln: rates.usd_to_pln,
            eur_to_pln: rates.eur_to_pln(),
            updated_at: rates.updated_at,
        }
    }
}

/// Itemized estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    pub lot_price: RangeResponse,
    pub auction_fees: RangeResponse,
    pub trucking_to_port: MoneyResponse,
    pub shipping: ShippingLine,
    pub broker_fee: MoneyResponse,
    pub subtotal: RangeResponse,
    pub customs_value: MoneyResponse,
    pub duty: CustomsLine,
    pub vat: CustomsLine,
    pub customs_agency_flat: MoneyResponse,
    pub customs_total: CustomsTotalLine,
    /// Authoritative total in USD
    pub final_total: RangeResponse,
    /// Final total projected into the selected currency
    pub final_total_display: RangeResponse,
    pub exchange_rates: ExchangeRatesResponse,
}

impl EstimateResponse {
    /// Build the response for a pipeline result projected with `rates`.
    pub fn build(result: &EstimationResult, rates: &ExchangeRateTable, vehicle_id: Option<String>) -> Self {
        let currency = result.display_currency;
        let rate = rates.rate_for(currency);
        let banded = |amount: Decimal| RangeResponse::banded(project_currency(amount, rate), currency);

        Self {
            vehicle_id,
            lot_price: RangeResponse::usd(result.lot_price),
            auction_fees: RangeResponse::usd(PriceRange::new(
                result.fees.auction_fees_min,
                result.fees.auction_fees_max,
            )),
            trucking_to_port: MoneyResponse::usd(result.fees.trucking_to_port),
            shipping: ShippingLine {
                port: result.port,
                port_label: result.port.label().to_string(),
                cost: MoneyResponse::usd(result.shipping_cost),
            },
            broker_fee: MoneyResponse::usd(result.fees.broker_fee),
            subtotal: RangeResponse::usd(result.subtotal),
            customs_value: MoneyResponse::usd(result.customs_value),
            duty: CustomsLine {
                category: result.duty.label().to_string(),
                rate_percent: result.duty.rate_percent(),
                amount: MoneyResponse::usd(result.duty_amount),
                display: banded(result.duty_amount),
            },
            vat: CustomsLine {
                category: result.vat.label().to_string(),
                rate_percent: result.vat.rate_percent(),
                amount: MoneyResponse::usd(result.vat_amount),
                display: banded(result.vat_amount),
            },
            customs_agency_flat: MoneyResponse::usd(result.customs_agency_flat),
            customs_total: CustomsTotalLine {
                amount: MoneyResponse::usd(result.customs_total),
                display: banded(result.customs_total),
            },
            final_total: RangeResponse::usd(result.final_total),
            final_total_display: RangeResponse::new(result.display_total, currency),
            exchange_rates: ExchangeRatesResponse::from(rates),
        }
    }
}

/// Response for the quick import calculator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportCostResponse {
    pub vehicle_price: MoneyResponse,
    pub auction_fees: MoneyResponse,
    pub shipping_cost: MoneyResponse,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_rate_percent: Decimal,
    pub subtotal: MoneyResponse,
    pub tax_amount: MoneyResponse,
    pub total: MoneyResponse,
}

impl ImportCostResponse {
    pub fn build(input: &ImportCostInput, result: &ImportCostResult) -> Self {
        Self {
            vehicle_price: MoneyResponse::usd(input.vehicle_price),
            auction_fees: MoneyResponse::usd(input.auction_fees),
            shipping_cost: MoneyResponse::usd(input.shipping_cost),
            tax_rate_percent: input.tax_rate_percent,
            subtotal: MoneyResponse::usd(result.subtotal),
            tax_amount: MoneyResponse::usd(result.tax_amount),
            total: MoneyResponse::usd(result.total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::calculators::run_estimate;
    use crate::pricing::models::{EstimateInput, EstimateSelection, FeeSchedule};
    use rust_decimal_macros::dec;

    fn eur_estimate() -> (EstimationResult, ExchangeRateTable) {
        let rates = ExchangeRateTable::default();
        let input = EstimateInput {
            lot_price_min: dec!(42500),
            lot_price_max: Some(dec!(55000)),
            fees: FeeSchedule::default(),
            selection: EstimateSelection::default(),
            rates,
        };
        (run_estimate(&input), rates)
    }

    #[test]
    fn test_build_final_total_display() {
        let (result, rates) = eur_estimate();
        let response = EstimateResponse::build(&result, &rates, Some("1".to_string()));

        assert_eq!(response.final_total_display.currency, "EUR");
        assert_eq!(response.final_total_display.formatted, "€52,077 – €62,882");
        assert_eq!(response.final_total.formatted, "$60,604 – $73,179");
        assert_eq!(response.subtotal.formatted, "$44,246 – $56,821");
    }

    #[test]
    fn test_banded_range() {
        let range = RangeResponse::banded(dec!(3000), DisplayCurrency::Usd);
        assert_eq!(range.min, dec!(3000));
        assert_eq!(range.max, dec!(3300));
        assert_eq!(range.formatted, "$3,000 – $3,300");
    }

    #[test]
    fn test_band_is_display_only() {
        let (result, rates) = eur_estimate();
        let response = EstimateResponse::build(&result, &rates, None);

        // band is 10% above the projected duty
        let projected = result.duty_amount * dec!(0.8593);
        assert_eq!(response.duty.display.min, projected);
        assert_eq!(response.duty.display.max, projected * dec!(1.1));
        // ...and never reaches the final total
        assert_eq!(response.final_total.max, result.subtotal.max + result.customs_total);
    }

    #[test]
    fn test_response_serializes_amounts_as_strings() {
        let (result, rates) = eur_estimate();
        let response = EstimateResponse::build(&result, &rates, None);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["subtotal"]["min"], "44246");
        assert_eq!(json["duty"]["amount"]["amount"], "3409.26");
        assert_eq!(json["shipping"]["port"], "rotterdam");
        assert_eq!(json["exchange_rates"]["eur_to_pln"], "4.2073");
        assert!(json.get("vehicle_id").is_none());
    }
}
