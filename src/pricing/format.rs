//! Locale formatting for amounts shown to the user.
//!
//! Whole units, en-US digit grouping. Rounding happens here and only here.

use rust_decimal::Decimal;

use super::calculators::round_money;
use super::models::{DisplayCurrency, PriceRange};

/// Format an amount as a currency string, e.g. `$44,246`, `€52,077`, `219,100 PLN`.
pub fn format_money(amount: Decimal, currency: DisplayCurrency) -> String {
    let rounded = round_money(amount, 0);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let digits = group_thousands(&rounded.abs().trunc().to_string());

    match currency {
        DisplayCurrency::Usd => format!("{}${}", sign, digits),
        DisplayCurrency::Eur => format!("{}€{}", sign, digits),
        DisplayCurrency::Pln => format!("{}{} PLN", sign, digits),
    }
}

/// Format a min/max pair as `X – Y`.
pub fn format_range(range: PriceRange, currency: DisplayCurrency) -> String {
    format!(
        "{} – {}",
        format_money(range.min, currency),
        format_money(range.max, currency)
    )
}

/// Format a percentage without trailing zeros, e.g. `6%`, `1.7%`.
pub fn format_percent(rate_percent: Decimal) -> String {
    format!("{}%", rate_percent.normalize())
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_money_per_currency() {
        assert_eq!(format_money(dec!(44246), DisplayCurrency::Usd), "$44,246");
        assert_eq!(format_money(dec!(52076.68602578), DisplayCurrency::Eur), "€52,077");
        assert_eq!(format_money(dec!(219100.24786338), DisplayCurrency::Pln), "219,100 PLN");
    }

    #[test]
    fn test_format_money_small_and_zero() {
        assert_eq!(format_money(Decimal::ZERO, DisplayCurrency::Usd), "$0");
        assert_eq!(format_money(dec!(999.5), DisplayCurrency::Usd), "$1,000");
        assert_eq!(format_money(dec!(-0.4), DisplayCurrency::Eur), "€0");
        assert_eq!(format_money(dec!(-1234), DisplayCurrency::Usd), "-$1,234");
    }

    #[test]
    fn test_format_money_large() {
        assert_eq!(format_money(dec!(1234567890), DisplayCurrency::Pln), "1,234,567,890 PLN");
    }

    #[test]
    fn test_format_range() {
        let range = PriceRange::new(dec!(52076.68602578), dec!(62882.38352578));
        assert_eq!(format_range(range, DisplayCurrency::Eur), "€52,077 – €62,882");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(6)), "6%");
        assert_eq!(format_percent(dec!(1.7)), "1.7%");
        assert_eq!(format_percent(dec!(21.00)), "21%");
    }
}
