use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use westwheels_pricing::pricing::calculators::parse_money;
use westwheels_pricing::pricing::{
    DestinationPort, DisplayCurrency, DutyCategory, EstimateSelection, ImportRegion, VatCategory,
};

#[derive(Parser, Debug)]
#[command(
    name = "westwheels-pricing",
    version,
    about = "Landed-cost estimates for US auction vehicles shipped to Europe"
)]
pub struct Cli {
    /// Env file to load instead of `.env`
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Estimate a catalog vehicle
    Quote {
        /// Listing id
        vehicle_id: String,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Print the estimate as JSON
        #[arg(long)]
        json: bool,
    },

    /// Estimate raw lot prices
    Estimate {
        /// Current bid in USD
        #[arg(long)]
        lot_min: String,

        /// Buy-now price in USD (defaults to 1.4x the current bid)
        #[arg(long)]
        lot_max: Option<String>,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Print the estimate as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare the final total across destination ports
    Compare {
        /// Listing id
        vehicle_id: String,

        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Quick import cost calculator
    Import {
        /// Vehicle price in USD
        #[arg(long)]
        price: String,

        /// Auction fees in USD
        #[arg(long, default_value = "800")]
        auction_fees: String,

        /// Shipping preset by origin region
        #[arg(long, conflicts_with = "shipping")]
        region: Option<ImportRegion>,

        /// Explicit shipping cost in USD
        #[arg(long)]
        shipping: Option<String>,

        /// Import tax rate in percent
        #[arg(long, default_value = "19")]
        tax_rate: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List catalog vehicles
    Vehicles,

    /// Show the exchange rates and shipping table
    Rates {
        /// Re-read WESTWHEELS_USD_EUR and WESTWHEELS_USD_PLN before printing
        #[arg(long)]
        refresh: bool,
    },
}

/// Port, customs category and currency selection
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Destination port: rotterdam, gdynia, bremerhaven, klaipeda
    #[arg(long)]
    pub port: Option<DestinationPort>,

    /// Duty category: car, truck, motorcycle, jet-ski-boat, classic-car
    #[arg(long)]
    pub duty: Option<DutyCategory>,

    /// VAT category: bremerhaven, rotterdam, gdynia, classic-car
    #[arg(long)]
    pub vat: Option<VatCategory>,

    /// Display currency: USD, EUR, PLN
    #[arg(long)]
    pub currency: Option<DisplayCurrency>,

    /// Declared customs value in USD (defaults to the subtotal max)
    #[arg(long)]
    pub customs_value: Option<String>,
}

impl SelectionArgs {
    pub fn to_selection(&self) -> EstimateSelection {
        EstimateSelection {
            port: self.port.unwrap_or_default(),
            duty: self.duty.unwrap_or_default(),
            vat: self.vat.unwrap_or_default(),
            currency: self.currency.unwrap_or_default(),
            customs_value: self.customs_value.as_deref().map(parse_money),
        }
    }
}
