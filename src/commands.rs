//! Command handlers

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use westwheels_pricing::pricing::calculators::{calculate_import_cost, parse_money, shipping_table};
use westwheels_pricing::pricing::format::{format_money, format_percent};
use westwheels_pricing::pricing::{
    DisplayCurrency, EstimateRequest, EstimateResponse, Estimator, ImportCostRequest,
    ImportCostResponse,
};
use westwheels_pricing::rates::EnvRateSource;

use crate::cli::{Commands, SelectionArgs};

/// Execute CLI command
pub fn execute(command: Commands, estimator: &Estimator) -> Result<()> {
    match command {
        Commands::Quote {
            vehicle_id,
            selection,
            json,
        } => {
            let response = estimator.estimate_vehicle(&vehicle_id, selection.to_selection())?;
            print_estimate(&response, json)
        }

        Commands::Estimate {
            lot_min,
            lot_max,
            selection,
            json,
        } => {
            let request = EstimateRequest::new(
                parse_money(&lot_min),
                lot_max.as_deref().map(parse_money),
                selection.to_selection(),
            );
            print_estimate(&estimator.estimate(&request), json)
        }

        Commands::Compare {
            vehicle_id,
            selection,
        } => cmd_compare(estimator, &vehicle_id, &selection),

        Commands::Import {
            price,
            auction_fees,
            region,
            shipping,
            tax_rate,
            json,
        } => {
            let request = ImportCostRequest {
                vehicle_price: parse_money(&price),
                auction_fees: parse_money(&auction_fees),
                region,
                shipping_cost: shipping.as_deref().map(parse_money),
                tax_rate_percent: parse_money(&tax_rate),
            };
            cmd_import(&request, json)
        }

        Commands::Vehicles => {
            cmd_vehicles(estimator);
            Ok(())
        }

        Commands::Rates { refresh } => {
            if refresh {
                estimator.refresh_rates(&EnvRateSource)?;
            }
            cmd_rates(estimator);
            Ok(())
        }
    }
}

fn print_estimate(response: &EstimateResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    if let Some(id) = &response.vehicle_id {
        println!("Vehicle #{}", id);
    }
    let line = |label: &str, value: &str| println!("  {:<28} {}", label, value);

    line("Lot price", &response.lot_price.formatted);
    line("Auction fees", &response.auction_fees.formatted);
    line("Trucking to port", &response.trucking_to_port.formatted);
    line(
        &format!("Shipping to {}", response.shipping.port_label),
        &response.shipping.cost.formatted,
    );
    line("Broker fee", &response.broker_fee.formatted);
    line("Subtotal", &response.subtotal.formatted);
    println!();
    line("Customs value", &response.customs_value.formatted);
    line(
        &format!(
            "Duty ({}, {})",
            response.duty.category,
            format_percent(response.duty.rate_percent)
        ),
        &response.duty.display.formatted,
    );
    line(
        &format!(
            "VAT ({}, {})",
            response.vat.category,
            format_percent(response.vat.rate_percent)
        ),
        &response.vat.display.formatted,
    );
    line("Customs agency", &response.customs_agency_flat.formatted);
    line("Customs total", &response.customs_total.display.formatted);
    println!();
    line("Final total (USD)", &response.final_total.formatted);
    if response.final_total_display.currency != DisplayCurrency::Usd.code() {
        line(
            &format!("Final total ({})", response.final_total_display.currency),
            &response.final_total_display.formatted,
        );
    }
    Ok(())
}

fn cmd_compare(estimator: &Estimator, vehicle_id: &str, selection: &SelectionArgs) -> Result<()> {
    let vehicle = estimator.estimate_vehicle(vehicle_id, selection.to_selection())?;
    let request = EstimateRequest::new(
        vehicle.lot_price.min,
        Some(vehicle.lot_price.max),
        selection.to_selection(),
    );

    println!("Vehicle #{}, lot price {}", vehicle_id, vehicle.lot_price.formatted);
    for response in estimator.compare_ports(&request) {
        println!(
            "  {:<14} shipping {:<8} total {}",
            response.shipping.port_label,
            response.shipping.cost.formatted,
            response.final_total_display.formatted
        );
    }
    Ok(())
}

fn cmd_import(request: &ImportCostRequest, json: bool) -> Result<()> {
    let input = request.to_input();
    let result = calculate_import_cost(&input);
    let response = ImportCostResponse::build(&input, &result);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("  {:<16} {}", "Vehicle price", response.vehicle_price.formatted);
    println!("  {:<16} {}", "Auction fees", response.auction_fees.formatted);
    println!("  {:<16} {}", "Shipping", response.shipping_cost.formatted);
    println!("  {:<16} {}", "Subtotal", response.subtotal.formatted);
    println!(
        "  {:<16} {}",
        format!("Tax ({})", format_percent(response.tax_rate_percent)),
        response.tax_amount.formatted
    );
    println!("  {:<16} {}", "Total", response.total.formatted);
    Ok(())
}

fn cmd_vehicles(estimator: &Estimator) {
    let now = Utc::now();
    for vehicle in estimator.catalog().all() {
        let lot = vehicle.lot_price();
        println!(
            "#{:<3} {:<32} {:>9} / {:<9} {:>8} km  {}{}",
            vehicle.id,
            vehicle.title,
            format_money(lot.min, DisplayCurrency::Usd),
            format_money(lot.max, DisplayCurrency::Usd),
            vehicle.odometer_km(),
            vehicle.location,
            if vehicle.is_open_at(now) { "" } else { " (closed)" }
        );
    }
    info!("Listed {} vehicles", estimator.catalog().len());
}

fn cmd_rates(estimator: &Estimator) {
    let rates = estimator.rates();
    println!("Exchange rates (updated {})", rates.updated_at.format("%Y-%m-%d %H:%M UTC"));
    println!("  USD/EUR  {}", rates.usd_to_eur);
    println!("  USD/PLN  {}", rates.usd_to_pln);
    if let Some(eur_to_pln) = rates.eur_to_pln() {
        println!("  EUR/PLN  {}", eur_to_pln);
    }
    println!();
    println!("Shipping");
    for (port, cost) in shipping_table() {
        println!("  {:<14} {}", port.label(), format_money(cost, DisplayCurrency::Usd));
    }
}
