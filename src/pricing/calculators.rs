//! Core pricing calculation functions.
//!
//! Pure functions for the price and customs estimate - no catalog, cache or
//! rate store access. Every function accepts whatever it is given and degrades
//! malformed money toward zero instead of failing.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::models::{
    DestinationPort, EstimateInput, EstimationResult, FeeSchedule, ImportRegion, PriceRange,
    DEFAULT_BUY_NOW_MULTIPLIER,
};

/// Multiplier for the displayed upper estimate beside duty, VAT and customs lines
pub const UNCERTAINTY_MARGIN: Decimal = dec!(1.1);

/// Amounts above this are treated as garbage input, like NaN.
pub const MAX_MONEY: Decimal = dec!(1000000000000);

/// Step used by the customs value +/- buttons
pub const CUSTOMS_STEP: Decimal = dec!(100);

/// Default auction fees in the quick import calculator
pub const DEFAULT_IMPORT_AUCTION_FEES: Decimal = dec!(800);

/// Default tax rate percent in the quick import calculator
pub const DEFAULT_IMPORT_TAX_RATE: Decimal = dec!(19);

/// Clamp a money amount into the range the pipeline accepts.
///
/// Negative and absurdly large amounts become zero.
pub fn sanitize_money(amount: Decimal) -> Decimal {
    if amount.is_sign_negative() || amount > MAX_MONEY {
        Decimal::ZERO
    } else {
        amount
    }
}

/// Convert a float coming from a form control into money.
///
/// NaN, infinities, negatives and values `Decimal` cannot hold become zero.
pub fn money_from_f64(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value)
        .map(sanitize_money)
        .unwrap_or(Decimal::ZERO)
}

/// Parse the text of a currency field.
///
/// Accepts plain decimals (`"42500"`, `" 1234.50 "`) and anything `f64` can
/// parse (`"1e4"`). Empty or non-numeric text is zero.
pub fn parse_money(text: &str) -> Decimal {
    let text = text.trim();
    if text.is_empty() {
        return Decimal::ZERO;
    }
    match Decimal::from_str(text) {
        Ok(amount) => sanitize_money(amount),
        Err(_) => text.parse::<f64>().map(money_from_f64).unwrap_or(Decimal::ZERO),
    }
}

/// Sanitize every amount of a fee schedule and keep `auction_fees_max >= auction_fees_min`.
pub fn sanitize_fees(fees: &FeeSchedule) -> FeeSchedule {
    let auction_fees_min = sanitize_money(fees.auction_fees_min);
    FeeSchedule {
        auction_fees_min,
        auction_fees_max: sanitize_money(fees.auction_fees_max).max(auction_fees_min),
        trucking_to_port: sanitize_money(fees.trucking_to_port),
        broker_fee: sanitize_money(fees.broker_fee),
        customs_agency_flat: sanitize_money(fees.customs_agency_flat),
    }
}

/// Resolve the lot price bounds.
///
/// A missing or zero buy-now price defaults to `min × 1.4`; a buy-now price
/// below the current bid is raised to it.
pub fn resolve_lot_price(lot_price_min: Decimal, lot_price_max: Option<Decimal>) -> PriceRange {
    let min = sanitize_money(lot_price_min);
    let max = match lot_price_max.map(sanitize_money) {
        Some(max) if !max.is_zero() => max.max(min),
        _ => min * DEFAULT_BUY_NOW_MULTIPLIER,
    };
    PriceRange::new(min, max)
}

/// Lot price plus auction fees, trucking, shipping and broker fee, per bound.
///
/// The min bound uses `auction_fees_min` and the max bound `auction_fees_max`.
pub fn compute_subtotal(lot_price: PriceRange, fees: &FeeSchedule, shipping_cost: Decimal) -> PriceRange {
    let shared = fees.trucking_to_port + shipping_cost + fees.broker_fee;
    PriceRange::new(
        lot_price.min + fees.auction_fees_min + shared,
        lot_price.max + fees.auction_fees_max + shared,
    )
}

/// Declared customs value: the override when it is above zero, else `subtotal_max`.
pub fn compute_customs_value(customs_override: Option<Decimal>, subtotal_max: Decimal) -> Decimal {
    match customs_override {
        Some(value) if value > Decimal::ZERO => value,
        _ => subtotal_max,
    }
}

/// Import duty on the customs value.
pub fn compute_duty(customs_value: Decimal, duty_rate_percent: Decimal) -> Decimal {
    customs_value * duty_rate_percent / Decimal::ONE_HUNDRED
}

/// VAT on the duty-inclusive customs value.
pub fn compute_vat(customs_value: Decimal, duty_amount: Decimal, vat_rate_percent: Decimal) -> Decimal {
    (customs_value + duty_amount) * vat_rate_percent / Decimal::ONE_HUNDRED
}

pub fn compute_customs_total(duty_amount: Decimal, vat_amount: Decimal, customs_agency_flat: Decimal) -> Decimal {
    duty_amount + vat_amount + customs_agency_flat
}

/// Add the customs total to both subtotal bounds.
pub fn compute_final_total(subtotal: PriceRange, customs_total: Decimal) -> PriceRange {
    PriceRange::new(subtotal.min + customs_total, subtotal.max + customs_total)
}

/// Convert a USD amount with a USD-to-target multiplier. No rounding.
pub fn project_currency(amount_usd: Decimal, rate: Decimal) -> Decimal {
    amount_usd * sanitize_money(rate)
}

/// Round to `places` decimals, halves away from zero.
///
/// This is the rounding of the whole-unit price display, not an accounting rule.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use westwheels_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(52076.69), 0), dec!(52077));
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Upper figure shown next to a duty, VAT or customs total line.
///
/// Display only; never part of a total.
pub fn uncertainty_band(amount: Decimal) -> Decimal {
    amount * UNCERTAINTY_MARGIN
}

/// Step the declared customs value by `delta`.
///
/// Starts from the value currently in effect and never goes below zero. The
/// result is the new override.
pub fn adjust_customs_value(customs_override: Option<Decimal>, subtotal_max: Decimal, delta: Decimal) -> Decimal {
    let current = compute_customs_value(customs_override.map(sanitize_money), subtotal_max);
    (current + delta).max(Decimal::ZERO)
}

/// Step a bid by `delta`, never going below the current lot price.
pub fn next_bid(current_bid: Option<Decimal>, lot_price_min: Decimal, delta: Decimal) -> Decimal {
    let floor = sanitize_money(lot_price_min);
    let current = match current_bid.map(sanitize_money) {
        Some(bid) if !bid.is_zero() => bid,
        _ => floor,
    };
    (current + delta).max(floor)
}

/// Run the whole estimate: defaults, subtotal, customs, final total, projection.
pub fn run_estimate(input: &EstimateInput) -> EstimationResult {
    let fees = sanitize_fees(&input.fees);
    let selection = input.selection;

    let lot_price = resolve_lot_price(input.lot_price_min, input.lot_price_max);
    let shipping_cost = selection.port.shipping_cost();
    let subtotal = compute_subtotal(lot_price, &fees, shipping_cost);

    let customs_value = compute_customs_value(selection.customs_value.map(sanitize_money), subtotal.max);
    let duty_amount = compute_duty(customs_value, selection.duty.rate_percent());
    let vat_amount = compute_vat(customs_value, duty_amount, selection.vat.rate_percent());
    let customs_total = compute_customs_total(duty_amount, vat_amount, fees.customs_agency_flat);

    let final_total = compute_final_total(subtotal, customs_total);
    let rate = input.rates.rate_for(selection.currency);
    let display_total = PriceRange::new(
        project_currency(final_total.min, rate),
        project_currency(final_total.max, rate),
    );

    EstimationResult {
        lot_price,
        fees,
        port: selection.port,
        shipping_cost,
        subtotal,
        customs_value,
        duty: selection.duty,
        duty_amount,
        vat: selection.vat,
        vat_amount,
        customs_agency_flat: fees.customs_agency_flat,
        customs_total,
        final_total,
        display_currency: selection.currency,
        display_total,
    }
}

/// Input for the quick import calculator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportCostInput {
    pub vehicle_price: Decimal,
    pub auction_fees: Decimal,
    pub shipping_cost: Decimal,
    pub tax_rate_percent: Decimal,
}

impl ImportCostInput {
    /// Default fees and tax, shipping preset from `region`
    pub fn for_region(vehicle_price: Decimal, region: ImportRegion) -> Self {
        Self {
            vehicle_price,
            auction_fees: DEFAULT_IMPORT_AUCTION_FEES,
            shipping_cost: region.shipping_cost(),
            tax_rate_percent: DEFAULT_IMPORT_TAX_RATE,
        }
    }
}

/// Result of the quick import calculator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportCostResult {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Price plus auction fees plus shipping, taxed as a whole.
pub fn calculate_import_cost(input: &ImportCostInput) -> ImportCostResult {
    let subtotal = sanitize_money(input.vehicle_price)
        + sanitize_money(input.auction_fees)
        + sanitize_money(input.shipping_cost);
    let tax_amount = subtotal * sanitize_money(input.tax_rate_percent) / Decimal::ONE_HUNDRED;

    ImportCostResult {
        subtotal,
        tax_amount,
        total: subtotal + tax_amount,
    }
}

/// Shipping cost for every destination port, in port order
pub fn shipping_table() -> Vec<(DestinationPort, Decimal)> {
    DestinationPort::ALL
        .into_iter()
        .map(|port| (port, port.shipping_cost()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::{
        DisplayCurrency, DutyCategory, EstimateSelection, ExchangeRateTable, VatCategory,
    };

    fn scenario_input() -> EstimateInput {
        EstimateInput {
            lot_price_min: dec!(42500),
            lot_price_max: Some(dec!(55000)),
            fees: FeeSchedule::default(),
            selection: EstimateSelection {
                port: DestinationPort::Rotterdam,
                duty: DutyCategory::Motorcycle,
                vat: VatCategory::Rotterdam,
                currency: DisplayCurrency::Usd,
                customs_value: None,
            },
            rates: ExchangeRateTable::default(),
        }
    }

    // ==================== sanitizing tests ====================

    #[test]
    fn test_sanitize_money() {
        assert_eq!(sanitize_money(dec!(12.5)), dec!(12.5));
        assert_eq!(sanitize_money(dec!(0)), dec!(0));
        assert_eq!(sanitize_money(dec!(-1)), dec!(0));
        assert_eq!(sanitize_money(dec!(1000000000001)), dec!(0));
    }

    #[test]
    fn test_money_from_f64_non_finite() {
        assert_eq!(money_from_f64(f64::NAN), Decimal::ZERO);
        assert_eq!(money_from_f64(f64::INFINITY), Decimal::ZERO);
        assert_eq!(money_from_f64(f64::NEG_INFINITY), Decimal::ZERO);
        assert_eq!(money_from_f64(-250.0), Decimal::ZERO);
        assert_eq!(money_from_f64(1e300), Decimal::ZERO);
        assert_eq!(money_from_f64(495.0), dec!(495));
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("42500"), dec!(42500));
        assert_eq!(parse_money("  1234.50 "), dec!(1234.50));
        assert_eq!(parse_money("1e4"), dec!(10000));
        assert_eq!(parse_money(""), Decimal::ZERO);
        assert_eq!(parse_money("abc"), Decimal::ZERO);
        assert_eq!(parse_money("NaN"), Decimal::ZERO);
        assert_eq!(parse_money("-300"), Decimal::ZERO);
    }

    #[test]
    fn test_sanitize_fees_keeps_max_above_min() {
        let fees = FeeSchedule {
            auction_fees_min: dec!(600),
            auction_fees_max: dec!(500),
            trucking_to_port: dec!(-1),
            ..FeeSchedule::default()
        };
        let fees = sanitize_fees(&fees);
        assert_eq!(fees.auction_fees_max, dec!(600));
        assert_eq!(fees.trucking_to_port, Decimal::ZERO);
    }

    // ==================== lot price tests ====================

    #[test]
    fn test_lot_price_default_buy_now() {
        let lot = resolve_lot_price(dec!(10000), None);
        assert_eq!(lot.min, dec!(10000));
        assert_eq!(lot.max, dec!(14000));
    }

    #[test]
    fn test_lot_price_zero_buy_now_means_absent() {
        assert_eq!(resolve_lot_price(dec!(10000), Some(dec!(0))).max, dec!(14000));
        assert_eq!(resolve_lot_price(dec!(10000), Some(dec!(-5))).max, dec!(14000));
    }

    #[test]
    fn test_lot_price_buy_now_below_bid_is_raised() {
        let lot = resolve_lot_price(dec!(10000), Some(dec!(9000)));
        assert_eq!(lot.max, dec!(10000));
    }

    // ==================== pipeline step tests ====================

    #[test]
    fn test_compute_subtotal() {
        let lot = PriceRange::new(dec!(42500), dec!(55000));
        let subtotal = compute_subtotal(lot, &FeeSchedule::default(), dec!(495));
        assert_eq!(subtotal.min, dec!(44246));
        assert_eq!(subtotal.max, dec!(56821));
    }

    #[test]
    fn test_customs_value_selection() {
        assert_eq!(compute_customs_value(Some(dec!(50000)), dec!(56821)), dec!(50000));
        assert_eq!(compute_customs_value(None, dec!(56821)), dec!(56821));
        assert_eq!(compute_customs_value(Some(dec!(0)), dec!(56821)), dec!(56821));
        assert_eq!(compute_customs_value(Some(dec!(-10)), dec!(56821)), dec!(56821));
    }

    #[test]
    fn test_compute_duty() {
        assert_eq!(compute_duty(dec!(56821), dec!(6)), dec!(3409.26));
        assert_eq!(compute_duty(dec!(10000), dec!(1.7)), dec!(170));
        assert_eq!(compute_duty(dec!(10000), dec!(0)), dec!(0));
    }

    #[test]
    fn test_vat_charged_on_duty_inclusive_value() {
        let customs_value = dec!(10000);
        let duty = compute_duty(customs_value, dec!(10));
        let vat = compute_vat(customs_value, duty, dec!(20));
        // 20% of (10000 + 1000), not of 10000
        assert_eq!(vat, dec!(2200));
        assert_ne!(vat, compute_vat(customs_value, Decimal::ZERO, dec!(20)));
        // The difference is exactly VAT on the duty
        assert_eq!(vat - compute_vat(customs_value, Decimal::ZERO, dec!(20)), duty * dec!(0.20));
    }

    #[test]
    fn test_compute_final_total_adds_same_customs_to_both_bounds() {
        let subtotal = PriceRange::new(dec!(44246), dec!(56821));
        let total = compute_final_total(subtotal, dec!(16357.6146));
        assert_eq!(total.min, dec!(60603.6146));
        assert_eq!(total.max, dec!(73178.6146));
        assert_eq!(total.max - total.min, subtotal.max - subtotal.min);
    }

    #[test]
    fn test_project_currency() {
        assert_eq!(project_currency(dec!(60603.62), dec!(0.8593)), dec!(52076.690666));
        assert_eq!(project_currency(dec!(60603.62), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(project_currency(dec!(60603.62), dec!(-1)), Decimal::ZERO);
    }

    #[test]
    fn test_projection_is_linear() {
        let rate = dec!(3.6153);
        let (a, b) = (dec!(44246.17), dec!(16357.6146));
        assert_eq!(
            project_currency(a + b, rate),
            project_currency(a, rate) + project_currency(b, rate)
        );
    }

    // ==================== display helpers ====================

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(3));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(-2.5), 0), dec!(-3));
        assert_eq!(round_money(dec!(1.2349), 2), dec!(1.23));
        assert_eq!(round_money(dec!(52076.68602578), 0), dec!(52077));
    }

    #[test]
    fn test_uncertainty_band() {
        assert_eq!(uncertainty_band(dec!(3409.26)), dec!(3750.186));
        assert_eq!(uncertainty_band(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_adjust_customs_value_starts_from_effective_value() {
        assert_eq!(adjust_customs_value(None, dec!(56821), CUSTOMS_STEP), dec!(56921));
        assert_eq!(adjust_customs_value(Some(dec!(50000)), dec!(56821), -CUSTOMS_STEP), dec!(49900));
        assert_eq!(adjust_customs_value(Some(dec!(50)), dec!(0), -CUSTOMS_STEP), dec!(0));
    }

    #[test]
    fn test_next_bid_never_below_lot_price() {
        assert_eq!(next_bid(None, dec!(42500), dec!(100)), dec!(42600));
        assert_eq!(next_bid(Some(dec!(43000)), dec!(42500), dec!(-100)), dec!(42900));
        assert_eq!(next_bid(Some(dec!(42550)), dec!(42500), dec!(-100)), dec!(42500));
    }

    // ==================== run_estimate tests ====================

    #[test]
    fn test_run_estimate_default_listing() {
        let result = run_estimate(&scenario_input());

        assert_eq!(result.subtotal.min, dec!(44246));
        assert_eq!(result.subtotal.max, dec!(56821));
        assert_eq!(result.customs_value, dec!(56821));
        assert_eq!(result.duty_amount, dec!(3409.26));
        assert_eq!(result.vat_amount, dec!(12648.3546));
        assert_eq!(result.customs_total, dec!(16357.6146));
        assert_eq!(result.final_total.min, dec!(60603.6146));
        assert_eq!(result.final_total.max, dec!(73178.6146));
        // USD projects with rate 1
        assert_eq!(result.display_total, result.final_total);
    }

    #[test]
    fn test_run_estimate_with_customs_override() {
        let mut input = scenario_input();
        input.selection.customs_value = Some(dec!(50000));
        let result = run_estimate(&input);

        assert_eq!(result.customs_value, dec!(50000));
        assert_eq!(result.duty_amount, dec!(3000));
        assert_eq!(result.vat_amount, dec!(11130));
        assert_eq!(result.customs_total, dec!(14430));
        assert_eq!(result.subtotal.min, dec!(44246));
        assert_eq!(result.final_total.min, dec!(58676));
        assert_eq!(result.final_total.max, dec!(71251));
    }

    #[test]
    fn test_run_estimate_gdynia_shipping() {
        let mut input = scenario_input();
        input.selection.port = DestinationPort::Gdynia;
        let result = run_estimate(&input);
        assert_eq!(result.shipping_cost, dec!(745));
        assert_eq!(result.subtotal.min, dec!(44496));
    }

    #[test]
    fn test_run_estimate_projects_into_eur() {
        let mut input = scenario_input();
        input.selection.currency = DisplayCurrency::Eur;
        let result = run_estimate(&input);
        assert_eq!(result.display_total.min, dec!(52076.68602578));
        assert_eq!(result.display_total.max, dec!(62882.38352578));
        // projection does not touch the USD totals
        assert_eq!(result.final_total.min, dec!(60603.6146));
    }

    #[test]
    fn test_run_estimate_all_zero() {
        let input = EstimateInput {
            lot_price_min: Decimal::ZERO,
            lot_price_max: Some(Decimal::ZERO),
            fees: FeeSchedule {
                auction_fees_min: Decimal::ZERO,
                auction_fees_max: Decimal::ZERO,
                trucking_to_port: Decimal::ZERO,
                broker_fee: Decimal::ZERO,
                customs_agency_flat: Decimal::ZERO,
            },
            selection: EstimateSelection {
                duty: DutyCategory::ClassicCar,
                ..EstimateSelection::default()
            },
            rates: ExchangeRateTable::new(Decimal::ZERO, Decimal::ZERO),
        };
        let result = run_estimate(&input);

        assert_eq!(result.lot_price, PriceRange::default());
        assert_eq!(result.duty_amount, Decimal::ZERO);
        // shipping is fixed per port, so the only non-zero term is freight
        assert_eq!(result.subtotal.min, dec!(495));
        assert_eq!(result.display_total, PriceRange::default());
    }

    #[test]
    fn test_run_estimate_negative_inputs_match_zero() {
        let mut zeroed = scenario_input();
        zeroed.fees.trucking_to_port = Decimal::ZERO;
        zeroed.selection.customs_value = Some(Decimal::ZERO);

        let mut negative = scenario_input();
        negative.fees.trucking_to_port = dec!(-246);
        negative.selection.customs_value = Some(dec!(-5000));

        assert_eq!(run_estimate(&zeroed), run_estimate(&negative));
    }

    #[test]
    fn test_run_estimate_is_idempotent() {
        let input = scenario_input();
        assert_eq!(run_estimate(&input), run_estimate(&input));
    }

    #[test]
    fn test_run_estimate_monotonic_across_selections() {
        for port in DestinationPort::ALL {
            for duty in DutyCategory::ALL {
                for vat in VatCategory::ALL {
                    let mut input = scenario_input();
                    input.selection.port = port;
                    input.selection.duty = duty;
                    input.selection.vat = vat;
                    let result = run_estimate(&input);
                    assert!(result.subtotal.max >= result.subtotal.min);
                    assert!(result.final_total.max >= result.final_total.min);
                }
            }
        }
    }

    // ==================== import calculator tests ====================

    #[test]
    fn test_calculate_import_cost() {
        let input = ImportCostInput::for_region(dec!(20000), ImportRegion::Europe);
        let result = calculate_import_cost(&input);
        assert_eq!(result.subtotal, dec!(23300));
        assert_eq!(result.tax_amount, dec!(4427));
        assert_eq!(result.total, dec!(27727));
    }

    #[test]
    fn test_calculate_import_cost_empty_form() {
        let input = ImportCostInput {
            vehicle_price: Decimal::ZERO,
            auction_fees: dec!(-800),
            shipping_cost: Decimal::ZERO,
            tax_rate_percent: dec!(19),
        };
        let result = calculate_import_cost(&input);
        assert_eq!(result.total, Decimal::ZERO);
    }

    #[test]
    fn test_shipping_table_order() {
        let table = shipping_table();
        assert_eq!(table.len(), 4);
        assert_eq!(table[0], (DestinationPort::Rotterdam, dec!(495)));
        assert_eq!(table[1], (DestinationPort::Gdynia, dec!(745)));
    }
}
