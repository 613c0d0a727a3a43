//! Display rounding shared by the spreadsheet and the reports.
//!
//! Prices and percentages are shown with 2 decimals, market cap and volume
//! as whole numbers.

pub const PRICE_DECIMALS: usize = 2;
pub const PERCENT_DECIMALS: usize = 2;
pub const AGGREGATE_DECIMALS: usize = 0;
/// Prices below one unit, where 2 decimals would round to zero
pub const SMALL_PRICE_DECIMALS: usize = 6;

/// Decimals for a unit price: 2, or 6 for non-zero prices under 1
pub fn price_decimals(value: f64) -> usize {
    if value != 0.0 && value.abs() < 1.0 {
        SMALL_PRICE_DECIMALS
    } else {
        PRICE_DECIMALS
    }
}

/// Format with a fixed number of decimals and `,` as thousands separator
pub fn group_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rounded.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = rounded.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// "$1,234.50"
pub fn price(value: f64) -> String {
    format!("${}", group_thousands(value, PRICE_DECIMALS))
}

/// "$1,234,568"
pub fn aggregate(value: f64) -> String {
    format!("${}", group_thousands(value, AGGREGATE_DECIMALS))
}

/// "-3.25%"
pub fn percent(value: f64) -> String {
    format!("{:.*}%", PERCENT_DECIMALS, value)
}

/// "+3.25%" / "-3.25%"
pub fn signed_percent(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", percent(value))
    } else {
        percent(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0, 2), "0.00");
        assert_eq!(group_thousands(999.994, 2), "999.99");
        assert_eq!(group_thousands(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(group_thousands(1_500_000.0, 0), "1,500,000");
        assert_eq!(group_thousands(-12_345.5, 1), "-12,345.5");
        assert_eq!(group_thousands(-0.001, 2), "0.00");
    }

    #[test]
    fn test_display_helpers() {
        assert_eq!(price(64_000.126), "$64,000.13");
        assert_eq!(aggregate(1_260_000_000_000.4), "$1,260,000,000,000");
        assert_eq!(percent(-3.0), "-3.00%");
        assert_eq!(signed_percent(5.0), "+5.00%");
        assert_eq!(signed_percent(-0.5), "-0.50%");
    }

    #[test]
    fn test_price_decimals() {
        assert_eq!(price_decimals(64_000.0), 2);
        assert_eq!(price_decimals(1.0), 2);
        assert_eq!(price_decimals(0.0), 2);
        assert_eq!(price_decimals(0.0042), 6);
        assert_eq!(group_thousands(0.0042, price_decimals(0.0042)), "0.004200");
    }
}
