use super::chart::{market_cap_pie, market_cap_slices, price_change_bars};
use super::report::money;
use super::workbook::TIMESTAMP_FORMAT;
use common::format::{percent, price_decimals, signed_percent, AGGREGATE_DECIMALS};
use common::{AssetRecord, AssetTable, MarketBreakdown, SummaryStats};
use std::fmt::Write;

const STYLE: &str = r#"
    body { font-family: 'Calibri', Arial, sans-serif; margin: 20px; }
    h1, h2, h3 { color: #2F5597; }
    table { border-collapse: collapse; width: 100%; margin-top: 10px; margin-bottom: 20px; }
    th, td { border: 1px solid #DDDDDD; text-align: left; padding: 8px; }
    th { background-color: #2F5597; color: white; }
    tr:nth-child(even) { background-color: #F2F2F2; }
    .container { margin-bottom: 30px; }
    .positive { color: green; }
    .negative { color: red; }
    .timestamp { font-style: italic; color: #666666; text-align: right; }
    .chart { text-align: center; margin: 20px 0; }
"#;

pub(super) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn change_table(out: &mut String, title: &str, records: &[AssetRecord]) {
    let _ = writeln!(out, "<div class=\"container\">\n<h2>{}</h2>", title);
    let _ = writeln!(
        out,
        "<table>\n<tr><th>Rank</th><th>Name</th><th>Symbol</th><th>24h Price Change (%)</th></tr>"
    );
    for (i, r) in records.iter().enumerate() {
        let class = if r.price_change_24h >= 0.0 { "positive" } else { "negative" };
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>",
            i + 1,
            escape(&r.name),
            escape(&r.symbol),
            class,
            signed_percent(r.price_change_24h)
        );
    }
    let _ = writeln!(out, "</table>\n</div>");
}

/// Standalone HTML market report (overview, leaders, gainers and losers)
pub fn render_html_report(table: &AssetTable, stats: &SummaryStats, breakdown: &MarketBreakdown) -> String {
    let currency = table.currency.as_str();
    let label = table.currency_label();
    let n = table.len();
    let no_data = || "No data".to_string();
    let mut out = String::new();

    let _ = writeln!(out, "<!DOCTYPE html>\n<html>\n<head>");
    let _ = writeln!(out, "<meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>Cryptocurrency Market Analysis Report</title>");
    let _ = writeln!(out, "<style>{}</style>\n</head>\n<body>", STYLE);
    let _ = writeln!(out, "<h1>Cryptocurrency Market Analysis Report</h1>");
    let _ = writeln!(
        out,
        "<p class=\"timestamp\">Generated on: {}</p>",
        table.fetched_at.format(TIMESTAMP_FORMAT)
    );

    let overview = [
        (
            format!("Total Market Cap of Top {}", n),
            money(stats.total_market_cap, AGGREGATE_DECIMALS, currency),
        ),
        (
            "Total 24h Trading Volume".to_string(),
            money(stats.total_volume, AGGREGATE_DECIMALS, currency),
        ),
        (
            format!("Average Price of Top {}", n),
            stats
                .average_price
                .map(|v| money(v, price_decimals(v), currency))
                .unwrap_or_else(no_data),
        ),
        (
            format!("Median Price of Top {}", n),
            breakdown
                .median_price
                .map(|v| money(v, price_decimals(v), currency))
                .unwrap_or_else(no_data),
        ),
        ("Bitcoin Dominance".to_string(), percent(breakdown.bitcoin_dominance)),
    ];

    let _ = writeln!(out, "<div class=\"container\">\n<h2>Market Overview</h2>");
    let _ = writeln!(out, "<table>\n<tr><th>Metric</th><th>Value</th></tr>");
    for (metric, value) in &overview {
        let _ = writeln!(out, "<tr><td>{}</td><td>{}</td></tr>", metric, value);
    }
    let _ = writeln!(out, "</table>\n</div>");

    let _ = writeln!(out, "<div class=\"container\">\n<h2>Top 5 Cryptocurrencies by Market Cap</h2>");
    let _ = writeln!(
        out,
        "<table>\n<tr><th>Rank</th><th>Name</th><th>Symbol</th><th>Market Cap ({0})</th><th>Current Price ({0})</th></tr>",
        label
    );
    for (i, r) in stats.top_by_market_cap.iter().enumerate() {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            i + 1,
            escape(&r.name),
            escape(&r.symbol),
            money(r.market_cap, AGGREGATE_DECIMALS, currency),
            money(r.current_price, price_decimals(r.current_price), currency)
        );
    }
    let _ = writeln!(out, "</table>\n</div>");

    let _ = writeln!(
        out,
        "<div class=\"container chart\">\n{}</div>",
        market_cap_pie(&market_cap_slices(table, stats))
    );

    let _ = writeln!(out, "<div class=\"container\">\n<h2>Top 5 by 24h Trading Volume</h2>");
    let _ = writeln!(
        out,
        "<table>\n<tr><th>Rank</th><th>Name</th><th>Symbol</th><th>24h Trading Volume ({})</th></tr>",
        label
    );
    for (i, r) in breakdown.top_by_volume.iter().enumerate() {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            i + 1,
            escape(&r.name),
            escape(&r.symbol),
            money(r.volume_24h, AGGREGATE_DECIMALS, currency)
        );
    }
    let _ = writeln!(out, "</table>\n</div>");

    change_table(&mut out, "Top 5 Gainers (24h)", &breakdown.top_gainers);
    change_table(&mut out, "Top 5 Losers (24h)", &breakdown.top_losers);

    let _ = writeln!(out, "<div class=\"container chart\">\n{}</div>", price_change_bars(breakdown));

    let _ = writeln!(
        out,
        "<p class=\"timestamp\">Data sourced from the CoinGecko API. This is a point-in-time snapshot; \
         see the live spreadsheet for periodic updates.</p>"
    );
    let _ = writeln!(out, "</body>\n</html>");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_sub_cent_price_keeps_precision() {
        let table = AssetTable::new(
            "usd",
            Utc::now(),
            vec![AssetRecord {
                rank: 1,
                symbol: "SHIB".to_string(),
                name: "Shiba Inu".to_string(),
                current_price: 0.00001234,
                market_cap: 7.2e9,
                volume_24h: 1.5e8,
                price_change_24h: 0.4,
            }],
        );
        let html = render_html_report(&table, &common::analyze(&table), &MarketBreakdown::from_table(&table));

        assert!(html.contains("<td>$0.000012</td>"));
        assert!(!html.contains("<td>$0.00</td>"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("A&B <x>"), "A&amp;B &lt;x&gt;");
    }

    #[test]
    fn test_html_report_sections() {
        let table = AssetTable::new(
            "usd",
            Utc::now(),
            vec![
                AssetRecord {
                    rank: 1,
                    symbol: "BTC".to_string(),
                    name: "Bitcoin".to_string(),
                    current_price: 60000.0,
                    market_cap: 750.0,
                    volume_24h: 10.0,
                    price_change_24h: 2.5,
                },
                AssetRecord {
                    rank: 2,
                    symbol: "ETH".to_string(),
                    name: "Ethereum".to_string(),
                    current_price: 3000.0,
                    market_cap: 250.0,
                    volume_24h: 5.0,
                    price_change_24h: -1.25,
                },
            ],
        );
        let stats = common::analyze(&table);
        let breakdown = MarketBreakdown::from_table(&table);

        let html = render_html_report(&table, &stats, &breakdown);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<tr><td>Bitcoin Dominance</td><td>75.00%</td></tr>"));
        assert!(html.contains("<tr><td>Median Price of Top 2</td><td>$31,500.00</td></tr>"));
        assert!(html.contains("Top 5 Gainers (24h)"));
        assert!(html.contains("<td class=\"positive\">+2.50%</td>"));
        assert!(html.contains("<td class=\"negative\">-1.25%</td>"));
        assert!(html.contains("<svg class=\"market-cap-chart\""));
        assert!(html.contains("<svg class=\"price-change-chart\""));
        assert!(html.contains("<h2>Top 5 by 24h Trading Volume</h2>"));
        assert!(html.contains("<tr><td>1</td><td>Bitcoin</td><td>BTC</td><td>$10</td></tr>"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
