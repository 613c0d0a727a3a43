//! Inline SVG charts for the HTML report.

use super::html::escape;
use common::format::{group_thousands, percent};
use common::{AssetTable, MarketBreakdown, SummaryStats};
use std::f64::consts::PI;
use std::fmt::Write;

const PALETTE: [&str; 6] = ["#2F5597", "#ED7D31", "#A5A5A5", "#FFC000", "#5B9BD5", "#70AD47"];
const POSITIVE: &str = "#2E8B57";
const NEGATIVE: &str = "#C0392B";

const PIE_WIDTH: f64 = 640.0;
const PIE_HEIGHT: f64 = 360.0;
const PIE_RADIUS: f64 = 140.0;

const BAR_WIDTH: f64 = 640.0;
const BAR_HEIGHT: f64 = 360.0;
const BAR_TOP: f64 = 50.0;
const BAR_BOTTOM: f64 = 300.0;
const BAR_LEFT: f64 = 50.0;

/// One pie slice: legend label and absolute size
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Slice {
    pub label: String,
    pub value: f64,
}

/// Top 5 by market cap plus an "Others" slice for the rest of the table
pub(crate) fn market_cap_slices(table: &AssetTable, stats: &SummaryStats) -> Vec<Slice> {
    let label = table.currency_label();
    let billions = |value: f64| {
        let amount = group_thousands(value / 1e9, 2);
        if table.currency == "usd" {
            format!("${}B", amount)
        } else {
            format!("{}B {}", amount, label)
        }
    };

    let mut slices: Vec<Slice> = stats
        .top_by_market_cap
        .iter()
        .map(|r| Slice {
            label: format!("{} ({})", r.symbol, billions(r.market_cap)),
            value: r.market_cap,
        })
        .collect();

    let top_sum: f64 = slices.iter().map(|s| s.value).sum();
    let others = stats.total_market_cap - top_sum;
    if others > 0.0 {
        slices.push(Slice {
            label: format!("Others ({})", billions(others)),
            value: others,
        });
    }
    slices
}

fn point_on_circle(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    // Angle 0 at 12 o'clock, clockwise
    (cx + radius * angle.sin(), cy - radius * angle.cos())
}

/// Pie chart of market cap distribution
pub(crate) fn market_cap_pie(slices: &[Slice]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg class=\"market-cap-chart\" xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = PIE_WIDTH,
        h = PIE_HEIGHT
    );
    let _ = writeln!(
        out,
        "<text x=\"{}\" y=\"20\" text-anchor=\"middle\" font-weight=\"bold\">Market Cap Distribution (in Billions)</text>",
        PIE_WIDTH / 2.0
    );

    let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
    if total <= 0.0 {
        let _ = writeln!(out, "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\">No data</text>", PIE_WIDTH / 2.0, PIE_HEIGHT / 2.0);
        let _ = writeln!(out, "</svg>");
        return out;
    }

    let (cx, cy) = (PIE_RADIUS + 30.0, PIE_HEIGHT / 2.0 + 10.0);
    let mut start = 0.0_f64;
    for (idx, slice) in slices.iter().enumerate().filter(|(_, s)| s.value > 0.0) {
        let fraction = slice.value / total;
        let color = PALETTE[idx % PALETTE.len()];

        if fraction >= 1.0 {
            let _ = writeln!(out, "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{}\" fill=\"{}\"/>", cx, cy, PIE_RADIUS, color);
        } else {
            let end = start + fraction * 2.0 * PI;
            let (x0, y0) = point_on_circle(cx, cy, PIE_RADIUS, start);
            let (x1, y1) = point_on_circle(cx, cy, PIE_RADIUS, end);
            let large_arc = u8::from(fraction > 0.5);
            let _ = writeln!(
                out,
                "<path d=\"M {cx:.2} {cy:.2} L {x0:.2} {y0:.2} A {r} {r} 0 {large_arc} 1 {x1:.2} {y1:.2} Z\" fill=\"{color}\" stroke=\"white\"/>",
                r = PIE_RADIUS
            );
            start = end;
        }

        let legend_y = 60.0 + idx as f64 * 24.0;
        let legend_x = cx + PIE_RADIUS + 40.0;
        let _ = writeln!(
            out,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"14\" height=\"14\" fill=\"{}\"/>",
            legend_x,
            legend_y - 12.0,
            color
        );
        let _ = writeln!(
            out,
            "<text x=\"{:.2}\" y=\"{:.2}\">{} {:.1}%</text>",
            legend_x + 20.0,
            legend_y,
            escape(&slice.label),
            fraction * 100.0
        );
    }

    let _ = writeln!(out, "</svg>");
    out
}

/// Bar chart of the top gainers followed by the top losers
pub(crate) fn price_change_bars(breakdown: &MarketBreakdown) -> String {
    let bars: Vec<(&str, f64)> = breakdown
        .top_gainers
        .iter()
        .chain(&breakdown.top_losers)
        .map(|r| (r.symbol.as_str(), r.price_change_24h))
        .collect();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg class=\"price-change-chart\" xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = BAR_WIDTH,
        h = BAR_HEIGHT
    );
    let _ = writeln!(
        out,
        "<text x=\"{}\" y=\"20\" text-anchor=\"middle\" font-weight=\"bold\">Top 5 Gainers and Losers (24h Price Change %)</text>",
        BAR_WIDTH / 2.0
    );

    if bars.is_empty() {
        let _ = writeln!(out, "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\">No data</text>", BAR_WIDTH / 2.0, BAR_HEIGHT / 2.0);
        let _ = writeln!(out, "</svg>");
        return out;
    }

    let low = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::min);
    let mut high = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    if high - low <= f64::EPSILON {
        high = low + 1.0;
    }
    let scale = (BAR_BOTTOM - BAR_TOP) / (high - low);
    let y_of = |v: f64| BAR_TOP + (high - v) * scale;

    let slot = (BAR_WIDTH - BAR_LEFT - 20.0) / bars.len() as f64;
    let zero_y = y_of(0.0);

    for (idx, (symbol, value)) in bars.iter().enumerate() {
        let x = BAR_LEFT + idx as f64 * slot + slot * 0.15;
        let width = slot * 0.7;
        let top = y_of(value.max(0.0));
        let height = (y_of(value.min(0.0)) - top).max(1.0);
        let color = if *value >= 0.0 { POSITIVE } else { NEGATIVE };
        let label_y = if *value >= 0.0 { top - 4.0 } else { top + height + 12.0 };

        let _ = writeln!(
            out,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
            x, top, width, height, color
        );
        let _ = writeln!(
            out,
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"11\">{}</text>",
            x + width / 2.0,
            label_y,
            percent(*value)
        );
        let _ = writeln!(
            out,
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"12\">{}</text>",
            x + width / 2.0,
            BAR_BOTTOM + 30.0,
            escape(symbol)
        );
    }

    let _ = writeln!(
        out,
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"black\" stroke-opacity=\"0.3\"/>",
        BAR_LEFT,
        zero_y,
        BAR_WIDTH - 20.0,
        zero_y
    );
    let _ = writeln!(out, "</svg>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AssetRecord;

    fn record(rank: u32, symbol: &str, cap: f64, change: f64) -> AssetRecord {
        AssetRecord {
            rank,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            current_price: 1.0,
            market_cap: cap,
            volume_24h: 0.0,
            price_change_24h: change,
        }
    }

    fn table(records: Vec<AssetRecord>) -> AssetTable {
        AssetTable::new("usd", chrono::Utc::now(), records)
    }

    #[test]
    fn test_others_slice_holds_remaining_cap() {
        let table = table(
            (1..=7)
                .map(|rank| record(rank, &format!("C{}", rank), (8 - rank) as f64 * 1e9, 0.0))
                .collect(),
        );
        let stats = common::analyze(&table);

        let slices = market_cap_slices(&table, &stats);

        assert_eq!(slices.len(), 6);
        assert_eq!(slices[0].label, "C1 ($7.00B)");
        assert_eq!(slices[5].value, 3e9);
        assert_eq!(slices[5].label, "Others ($3.00B)");
    }

    #[test]
    fn test_no_others_slice_when_top_covers_all() {
        let table = table(vec![record(1, "BTC", 2e9, 1.0), record(2, "ETH", 1e9, -1.0)]);
        let slices = market_cap_slices(&table, &common::analyze(&table));

        assert_eq!(slices.len(), 2);
        let pie = market_cap_pie(&slices);
        assert_eq!(pie.matches("<path").count(), 2);
        assert!(pie.contains("66.7%"));
        assert!(pie.contains("33.3%"));
    }

    #[test]
    fn test_single_slice_draws_full_circle() {
        let pie = market_cap_pie(&[Slice {
            label: "BTC".to_string(),
            value: 5.0,
        }]);

        assert!(pie.contains("<circle"));
        assert!(pie.contains("100.0%"));
    }

    #[test]
    fn test_bars_colored_by_sign() {
        let table = table(vec![record(1, "BTC", 2e9, 4.5), record(2, "ETH", 1e9, -2.0)]);
        let breakdown = MarketBreakdown::from_table(&table);

        let chart = price_change_bars(&breakdown);

        assert!(chart.starts_with("<svg class=\"price-change-chart\""));
        assert_eq!(chart.matches(POSITIVE).count(), 2);
        assert_eq!(chart.matches(NEGATIVE).count(), 2);
        assert!(chart.contains(">4.50%<"));
        assert!(chart.contains(">-2.00%<"));
    }

    #[test]
    fn test_empty_charts_show_no_data() {
        let table = table(Vec::new());
        let stats = common::analyze(&table);

        assert!(market_cap_pie(&market_cap_slices(&table, &stats)).contains(">No data<"));
        assert!(price_change_bars(&MarketBreakdown::from_table(&table)).contains(">No data<"));
    }
}
