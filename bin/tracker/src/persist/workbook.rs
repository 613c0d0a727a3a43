use common::{AssetRecord, AssetTable, SummaryStats};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

pub const DATA_SHEET: &str = "Live Crypto Data";
pub const ANALYSIS_SHEET: &str = "Analysis";

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

const COLUMN_WIDTH: f64 = 20.0;
const NO_DATA: &str = "No data";

// Analysis sheet layout (0-based rows)
const TITLE_ROW: u32 = 0;
const METRICS_ROW: u32 = 2;
const TOP_ROW: u32 = 8;
const EXTREMES_ROW: u32 = 16;

struct Formats {
    title: Format,
    bold: Format,
    price: Format,
    whole: Format,
    percent: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            title: Format::new().set_bold().set_font_size(14),
            bold: Format::new().set_bold(),
            price: Format::new().set_num_format("#,##0.00"),
            whole: Format::new().set_num_format("#,##0"),
            percent: Format::new().set_num_format("0.00"),
        }
    }
}

/// Header labels of the data sheet, in column order
pub fn data_headers(currency_label: &str) -> [String; 7] {
    [
        "Rank".to_string(),
        "Name".to_string(),
        "Symbol".to_string(),
        format!("Current Price ({})", currency_label),
        format!("Market Cap ({})", currency_label),
        format!("24h Trading Volume ({})", currency_label),
        "24h Price Change (%)".to_string(),
    ]
}

/// Render both sheets into an in-memory .xlsx file
pub fn render_workbook(table: &AssetTable, stats: &SummaryStats) -> Result<Vec<u8>, XlsxError> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    let data = workbook.add_worksheet();
    data.set_name(DATA_SHEET)?;
    write_data_sheet(data, table, &formats)?;

    let analysis = workbook.add_worksheet();
    analysis.set_name(ANALYSIS_SHEET)?;
    write_analysis_sheet(analysis, table, stats, &formats)?;

    workbook.save_to_buffer()
}

fn write_data_sheet(sheet: &mut Worksheet, table: &AssetTable, formats: &Formats) -> Result<(), XlsxError> {
    let headers = data_headers(&table.currency_label());
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header.as_str(), &formats.bold)?;
        sheet.set_column_width(col as u16, COLUMN_WIDTH)?;
    }

    sheet.write_string_with_format(0, 7, "Last Updated:", &formats.bold)?;
    sheet.write_string(0, 8, table.fetched_at.format(TIMESTAMP_FORMAT).to_string())?;
    sheet.set_column_width(8, COLUMN_WIDTH + 4.0)?;

    for (idx, record) in table.records.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_number(row, 0, record.rank as f64)?;
        sheet.write_string(row, 1, record.name.as_str())?;
        sheet.write_string(row, 2, record.symbol.as_str())?;
        sheet.write_number_with_format(row, 3, record.current_price, &formats.price)?;
        sheet.write_number_with_format(row, 4, record.market_cap, &formats.whole)?;
        sheet.write_number_with_format(row, 5, record.volume_24h, &formats.whole)?;
        sheet.write_number_with_format(row, 6, record.price_change_24h, &formats.percent)?;
    }

    Ok(())
}

fn write_analysis_sheet(
    sheet: &mut Worksheet,
    table: &AssetTable,
    stats: &SummaryStats,
    formats: &Formats,
) -> Result<(), XlsxError> {
    let currency = table.currency_label();

    sheet.merge_range(TITLE_ROW, 0, TITLE_ROW, 3, "Cryptocurrency Market Analysis", &formats.title)?;

    // Summary metrics
    sheet.merge_range(METRICS_ROW, 0, METRICS_ROW, 1, "Summary Metrics", &formats.bold)?;
    sheet.write_string(METRICS_ROW + 1, 0, format!("Average Price ({})", currency))?;
    match stats.average_price {
        Some(avg) => sheet.write_number_with_format(METRICS_ROW + 1, 1, avg, &formats.price)?,
        None => sheet.write_string(METRICS_ROW + 1, 1, NO_DATA)?,
    };
    sheet.write_string(METRICS_ROW + 2, 0, format!("Total Market Cap ({})", currency))?;
    sheet.write_number_with_format(METRICS_ROW + 2, 1, stats.total_market_cap, &formats.whole)?;
    sheet.write_string(METRICS_ROW + 3, 0, format!("Total 24h Trading Volume ({})", currency))?;
    sheet.write_number_with_format(METRICS_ROW + 3, 1, stats.total_volume, &formats.whole)?;
    sheet.write_string(METRICS_ROW + 4, 0, "Last Updated")?;
    sheet.write_string(METRICS_ROW + 4, 1, table.fetched_at.format(TIMESTAMP_FORMAT).to_string())?;

    // Top 5 by market cap
    sheet.merge_range(TOP_ROW, 0, TOP_ROW, 3, "Top 5 Cryptocurrencies by Market Cap", &formats.bold)?;
    let top_headers = ["Rank", "Name", "Symbol"];
    for (col, header) in top_headers.iter().enumerate() {
        sheet.write_string_with_format(TOP_ROW + 1, col as u16, *header, &formats.bold)?;
    }
    sheet.write_string_with_format(TOP_ROW + 1, 3, format!("Market Cap ({})", currency), &formats.bold)?;
    if !stats.has_data() {
        sheet.write_string(TOP_ROW + 2, 1, NO_DATA)?;
    }
    for (idx, record) in stats.top_by_market_cap.iter().enumerate() {
        let row = TOP_ROW + 2 + idx as u32;
        sheet.write_number(row, 0, (idx + 1) as f64)?;
        sheet.write_string(row, 1, record.name.as_str())?;
        sheet.write_string(row, 2, record.symbol.as_str())?;
        sheet.write_number_with_format(row, 3, record.market_cap, &formats.whole)?;
    }

    // 24h change extremes
    sheet.merge_range(EXTREMES_ROW, 0, EXTREMES_ROW, 3, "24-Hour Price Change Extremes", &formats.bold)?;
    for (col, header) in ["Type", "Name", "Symbol", "Price Change (%)"].iter().enumerate() {
        sheet.write_string_with_format(EXTREMES_ROW + 1, col as u16, *header, &formats.bold)?;
    }
    write_extreme(sheet, EXTREMES_ROW + 2, "Highest", stats.max_change.as_ref(), formats)?;
    write_extreme(sheet, EXTREMES_ROW + 3, "Lowest", stats.min_change.as_ref(), formats)?;

    for col in 0..4u16 {
        sheet.set_column_width(col, if col == 0 { 32.0 } else { COLUMN_WIDTH })?;
    }

    Ok(())
}

fn write_extreme(
    sheet: &mut Worksheet,
    row: u32,
    label: &str,
    record: Option<&AssetRecord>,
    formats: &Formats,
) -> Result<(), XlsxError> {
    sheet.write_string(row, 0, label)?;
    match record {
        Some(r) => {
            sheet.write_string(row, 1, r.name.as_str())?;
            sheet.write_string(row, 2, r.symbol.as_str())?;
            sheet.write_number_with_format(row, 3, r.price_change_24h, &formats.percent)?;
        }
        None => {
            sheet.write_string(row, 1, NO_DATA)?;
        }
    }
    Ok(())
}
