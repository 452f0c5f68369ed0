//! Domain types for the estimation pipeline.
//!
//! Every user-adjustable selection (destination port, duty category, VAT
//! category, display currency) is a closed enum, so an unknown port or tax
//! class never reaches the calculators.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Buy-now ceiling multiplier for listings without a buy-now price
pub const DEFAULT_BUY_NOW_MULTIPLIER: Decimal = dec!(1.4);

/// Error returned when a selection key does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownSelection {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

impl UnknownSelection {
    fn new(kind: &'static str, value: &str, keys: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: keys.join(", "),
        }
    }
}

/// Destination port for ocean freight. Each port carries a fixed shipping cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DestinationPort {
    #[default]
    Rotterdam,
    Gdynia,
    Bremerhaven,
    Klaipeda,
}

impl DestinationPort {
    pub const ALL: [DestinationPort; 4] = [
        DestinationPort::Rotterdam,
        DestinationPort::Gdynia,
        DestinationPort::Bremerhaven,
        DestinationPort::Klaipeda,
    ];

    pub fn key(self) -> &'static str {
        match self {
            DestinationPort::Rotterdam => "rotterdam",
            DestinationPort::Gdynia => "gdynia",
            DestinationPort::Bremerhaven => "bremerhaven",
            DestinationPort::Klaipeda => "klaipeda",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DestinationPort::Rotterdam => "Rotterdam, NL",
            DestinationPort::Gdynia => "Gdynia, PL",
            DestinationPort::Bremerhaven => "Bremerhaven, DE",
            DestinationPort::Klaipeda => "Klaipeda, LT",
        }
    }

    /// Ocean freight cost in USD
    pub fn shipping_cost(self) -> Decimal {
        match self {
            DestinationPort::Gdynia => dec!(745),
            DestinationPort::Rotterdam
            | DestinationPort::Bremerhaven
            | DestinationPort::Klaipeda => dec!(495),
        }
    }
}

impl FromStr for DestinationPort {
    type Err = UnknownSelection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|port| port.key().eq_ignore_ascii_case(s) || port.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let keys: Vec<&str> = Self::ALL.iter().map(|p| p.key()).collect();
                UnknownSelection::new("destination port", s, &keys)
            })
    }
}

/// Import duty category, keyed by vehicle type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DutyCategory {
    Car,
    Truck,
    #[default]
    Motorcycle,
    JetSkiBoat,
    ClassicCar,
}

impl DutyCategory {
    pub const ALL: [DutyCategory; 5] = [
        DutyCategory::Car,
        DutyCategory::Truck,
        DutyCategory::Motorcycle,
        DutyCategory::JetSkiBoat,
        DutyCategory::ClassicCar,
    ];

    pub fn key(self) -> &'static str {
        match self {
            DutyCategory::Car => "car",
            DutyCategory::Truck => "truck",
            DutyCategory::Motorcycle => "motorcycle",
            DutyCategory::JetSkiBoat => "jet-ski-boat",
            DutyCategory::ClassicCar => "classic-car",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DutyCategory::Car => "Car",
            DutyCategory::Truck => "Truck",
            DutyCategory::Motorcycle => "Motorcycle",
            DutyCategory::JetSkiBoat => "Jet Ski/Boat",
            DutyCategory::ClassicCar => "Classic Car",
        }
    }

    /// Duty rate as a percentage (6 means 6%)
    pub fn rate_percent(self) -> Decimal {
        match self {
            DutyCategory::Car => dec!(10),
            DutyCategory::Truck => dec!(22),
            DutyCategory::Motorcycle => dec!(6),
            DutyCategory::JetSkiBoat => dec!(1.7),
            DutyCategory::ClassicCar => dec!(0),
        }
    }
}

impl FromStr for DutyCategory {
    type Err = UnknownSelection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let keys: Vec<&str> = Self::ALL.iter().map(|c| c.key()).collect();
                UnknownSelection::new("duty category", s, &keys)
            })
    }
}

/// VAT category, keyed by clearance port (or the reduced classic-car rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VatCategory {
    Bremerhaven,
    #[default]
    Rotterdam,
    Gdynia,
    ClassicCar,
}

impl VatCategory {
    pub const ALL: [VatCategory; 4] = [
        VatCategory::Bremerhaven,
        VatCategory::Rotterdam,
        VatCategory::Gdynia,
        VatCategory::ClassicCar,
    ];

    pub fn key(self) -> &'static str {
        match self {
            VatCategory::Bremerhaven => "bremerhaven",
            VatCategory::Rotterdam => "rotterdam",
            VatCategory::Gdynia => "gdynia",
            VatCategory::ClassicCar => "classic-car",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VatCategory::Bremerhaven => "Bremerhaven",
            VatCategory::Rotterdam => "Rotterdam",
            VatCategory::Gdynia => "Gdynia",
            VatCategory::ClassicCar => "Classic Car",
        }
    }

    /// VAT rate as a percentage
    pub fn rate_percent(self) -> Decimal {
        match self {
            VatCategory::Bremerhaven => dec!(19),
            VatCategory::Rotterdam => dec!(21),
            VatCategory::Gdynia => dec!(23),
            VatCategory::ClassicCar => dec!(9),
        }
    }
}

impl FromStr for VatCategory {
    type Err = UnknownSelection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let keys: Vec<&str> = Self::ALL.iter().map(|c| c.key()).collect();
                UnknownSelection::new("VAT category", s, &keys)
            })
    }
}

/// Currency the final total is projected into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DisplayCurrency {
    Usd,
    #[default]
    Eur,
    Pln,
}

impl DisplayCurrency {
    pub const ALL: [DisplayCurrency; 3] = [
        DisplayCurrency::Usd,
        DisplayCurrency::Eur,
        DisplayCurrency::Pln,
    ];

    /// ISO 4217 code
    pub fn code(self) -> &'static str {
        match self {
            DisplayCurrency::Usd => "USD",
            DisplayCurrency::Eur => "EUR",
            DisplayCurrency::Pln => "PLN",
        }
    }
}

impl FromStr for DisplayCurrency {
    type Err = UnknownSelection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let keys: Vec<&str> = Self::ALL.iter().map(|c| c.code()).collect();
                UnknownSelection::new("currency", s, &keys)
            })
    }
}

/// Destination region presets for the quick import calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportRegion {
    #[serde(rename = "eu")]
    Europe,
    #[serde(rename = "uk")]
    UnitedKingdom,
    #[serde(rename = "asia")]
    Asia,
    #[serde(rename = "africa")]
    Africa,
    #[serde(rename = "south-america")]
    SouthAmerica,
    #[serde(rename = "australia")]
    Australia,
}

impl ImportRegion {
    pub const ALL: [ImportRegion; 6] = [
        ImportRegion::Europe,
        ImportRegion::UnitedKingdom,
        ImportRegion::Asia,
        ImportRegion::Africa,
        ImportRegion::SouthAmerica,
        ImportRegion::Australia,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ImportRegion::Europe => "eu",
            ImportRegion::UnitedKingdom => "uk",
            ImportRegion::Asia => "asia",
            ImportRegion::Africa => "africa",
            ImportRegion::SouthAmerica => "south-america",
            ImportRegion::Australia => "australia",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ImportRegion::Europe => "Europe",
            ImportRegion::UnitedKingdom => "United Kingdom",
            ImportRegion::Asia => "Asia",
            ImportRegion::Africa => "Africa",
            ImportRegion::SouthAmerica => "South America",
            ImportRegion::Australia => "Australia",
        }
    }

    /// Preset shipping cost in USD
    pub fn shipping_cost(self) -> Decimal {
        match self {
            ImportRegion::Europe => dec!(2500),
            ImportRegion::UnitedKingdom => dec!(2200),
            ImportRegion::Asia => dec!(3500),
            ImportRegion::Africa => dec!(3000),
            ImportRegion::SouthAmerica => dec!(2800),
            ImportRegion::Australia => dec!(4000),
        }
    }
}

impl FromStr for ImportRegion {
    type Err = UnknownSelection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|region| region.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let keys: Vec<&str> = Self::ALL.iter().map(|r| r.key()).collect();
                UnknownSelection::new("import region", s, &keys)
            })
    }
}

/// Fixed fees charged on every purchase, in USD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Buyer fee, internet bid fee, service, environmental and title handling fees
    pub auction_fees_min: Decimal,
    pub auction_fees_max: Decimal,
    /// Inland haulage to the export port
    pub trucking_to_port: Decimal,
    /// Brokerage service fee
    pub broker_fee: Decimal,
    /// Flat "all in" customs agency handling cost
    pub customs_agency_flat: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            auction_fees_min: dec!(555),
            auction_fees_max: dec!(630),
            trucking_to_port: dec!(246),
            broker_fee: dec!(450),
            customs_agency_flat: dec!(300),
        }
    }
}

/// Snapshot of USD conversion factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExchangeRateTable {
    pub usd_to_eur: Decimal,
    pub usd_to_pln: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl ExchangeRateTable {
    pub fn new(usd_to_eur: Decimal, usd_to_pln: Decimal) -> Self {
        Self {
            usd_to_eur,
            usd_to_pln,
            updated_at: Utc::now(),
        }
    }

    /// Multiplier taking a USD amount into `currency`
    pub fn rate_for(&self, currency: DisplayCurrency) -> Decimal {
        match currency {
            DisplayCurrency::Usd => Decimal::ONE,
            DisplayCurrency::Eur => self.usd_to_eur,
            DisplayCurrency::Pln => self.usd_to_pln,
        }
    }

    /// EUR/PLN cross rate for display, rounded to 4 places.
    ///
    /// `None` when the EUR rate is zero.
    pub fn eur_to_pln(&self) -> Option<Decimal> {
        if self.usd_to_eur.is_zero() {
            return None;
        }
        self.usd_to_pln
            .checked_div(self.usd_to_eur)
            .map(|rate| rate.round_dp(4))
    }
}

impl Default for ExchangeRateTable {
    fn default() -> Self {
        Self::new(dec!(0.8593), dec!(3.6153))
    }
}

/// A min/max pair of USD (or projected) amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }
}

/// The user-adjustable parameters of an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EstimateSelection {
    pub port: DestinationPort,
    pub duty: DutyCategory,
    pub vat: VatCategory,
    pub currency: DisplayCurrency,
    /// Declared customs value; only takes effect when greater than zero
    pub customs_value: Option<Decimal>,
}

/// Everything the pipeline needs for one calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateInput {
    pub lot_price_min: Decimal,
    /// Buy-now ceiling; absent (or zero) means `lot_price_min × 1.4`
    pub lot_price_max: Option<Decimal>,
    pub fees: FeeSchedule,
    pub selection: EstimateSelection,
    pub rates: ExchangeRateTable,
}

/// Fully itemized estimate, all amounts in USD unless noted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimationResult {
    pub lot_price: PriceRange,
    pub fees: FeeSchedule,
    pub port: DestinationPort,
    pub shipping_cost: Decimal,
    pub subtotal: PriceRange,
    pub customs_value: Decimal,
    pub duty: DutyCategory,
    pub duty_amount: Decimal,
    pub vat: VatCategory,
    pub vat_amount: Decimal,
    pub customs_agency_flat: Decimal,
    pub customs_total: Decimal,
    pub final_total: PriceRange,
    pub display_currency: DisplayCurrency,
    /// `final_total` projected into `display_currency`, unrounded
    pub display_total: PriceRange,
}
