use super::workbook::TIMESTAMP_FORMAT;
use common::format::{group_thousands, percent, AGGREGATE_DECIMALS, PRICE_DECIMALS};
use common::{AssetRecord, AssetTable, SummaryStats};
use std::fmt::Write;

/// Amount with the table's currency: "$1,234.50" for USD, "1,234.50 EUR" otherwise
pub(crate) fn money(value: f64, decimals: usize, currency: &str) -> String {
    let digits = group_thousands(value, decimals);
    if currency.eq_ignore_ascii_case("usd") {
        if let Some(unsigned) = digits.strip_prefix('-') {
            format!("-${}", unsigned)
        } else {
            format!("${}", digits)
        }
    } else {
        format!("{} {}", digits, currency.to_uppercase())
    }
}

fn extreme_line(label: &str, record: Option<&AssetRecord>) -> String {
    match record {
        Some(r) => format!("{}: {} ({}): {}", label, r.name, r.symbol, percent(r.price_change_24h)),
        None => format!("{}: No data", label),
    }
}

/// Plain-text analysis report, stamped with the table's fetch time
pub fn render_text_report(table: &AssetTable, stats: &SummaryStats) -> String {
    let currency = table.currency.as_str();
    let n = table.len();
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "CRYPTOCURRENCY MARKET ANALYSIS REPORT");
    let _ = writeln!(out, "====================================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Generated on: {}", table.fetched_at.format(TIMESTAMP_FORMAT));
    let _ = writeln!(out);

    let _ = writeln!(out, "MARKET OVERVIEW");
    let _ = writeln!(out, "--------------");
    let _ = writeln!(
        out,
        "Total Market Cap of Top {}: {}",
        n,
        money(stats.total_market_cap, AGGREGATE_DECIMALS, currency)
    );
    let _ = writeln!(
        out,
        "Total 24h Trading Volume: {}",
        money(stats.total_volume, AGGREGATE_DECIMALS, currency)
    );
    let average = stats
        .average_price
        .map(|avg| money(avg, PRICE_DECIMALS, currency))
        .unwrap_or_else(|| "No data".to_string());
    let _ = writeln!(out, "Average Price of Top {}: {}", n, average);
    let _ = writeln!(out);

    let _ = writeln!(out, "TOP 5 CRYPTOCURRENCIES BY MARKET CAP");
    let _ = writeln!(out, "-----------------------------------");
    if !stats.has_data() {
        let _ = writeln!(out, "No data");
    }
    for (i, coin) in stats.top_by_market_cap.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} ({}): {}",
            i + 1,
            coin.name,
            coin.symbol,
            money(coin.market_cap, AGGREGATE_DECIMALS, currency)
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "24-HOUR PRICE CHANGE EXTREMES");
    let _ = writeln!(out, "----------------------------");
    let _ = writeln!(out, "{}", extreme_line("Highest", stats.max_change.as_ref()));
    let _ = writeln!(out, "{}", extreme_line("Lowest", stats.min_change.as_ref()));
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "NOTE: For more detailed information and live updates, please refer to the Excel file."
    );

    out
}
