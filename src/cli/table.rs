//! Table formatting utilities for CLI list commands
//!
//! Every list command builds [`TableRow`]s of typed [`CellValue`]s and hands
//! them to a [`TableFormatter`], which renders them as an aligned terminal
//! table, TSV, CSV, a Markdown table or bare ids.
//!
//! Column widths are measured in terminal cells, so product names in
//! full-width scripts line up.

use chrono::NaiveDate;
use console::{measure_text_width, pad_str, style, Alignment};
use tabled::{builder::Builder, settings::Style};

use crate::cli::OutputFormat;
use crate::core::money::{format_amount, group_thousands};

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Record id (cyan in the terminal)
    Id(String),
    /// Plain text
    Text(String),
    /// Amount with currency code, shown with the configured precision
    Money(f64, String),
    /// Emphasized amount (totals)
    Total(f64, String),
    /// Plain number, formatted with the given fraction digits
    Number(f64, usize),
    /// Percentage value, `-` when unknown
    Percent(Option<f64>),
    /// Calendar date
    Date(NaiveDate),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Value without styling, as used for TSV, CSV and Markdown
    pub fn raw(&self, precision: usize) -> String {
        match self {
            CellValue::Id(id) => id.clone(),
            CellValue::Text(s) => s.clone(),
            CellValue::Money(v, currency) | CellValue::Total(v, currency) => {
                format_amount(*v, currency, precision)
            }
            CellValue::Number(n, digits) => format!("{:.*}", digits, n),
            CellValue::Percent(Some(p)) => format!("{}%", trim_float(*p)),
            CellValue::Percent(None) => "-".to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Empty => "-".to_string(),
        }
    }

    /// Value for CSV: amounts stay numeric so spreadsheets can sum them
    pub fn csv(&self, precision: usize) -> String {
        match self {
            CellValue::Money(v, _) | CellValue::Total(v, _) => format!("{:.*}", precision, v),
            CellValue::Percent(Some(p)) => trim_float(*p),
            CellValue::Percent(None) | CellValue::Empty => String::new(),
            other => other.raw(precision),
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(
            self,
            CellValue::Money(..) | CellValue::Total(..) | CellValue::Number(..) | CellValue::Percent(_)
        )
    }

    /// Padded and styled for the terminal
    fn format_terminal(&self, width: usize, precision: usize) -> String {
        let raw = self.raw(precision);
        let align = if self.is_numeric() {
            Alignment::Right
        } else {
            Alignment::Left
        };
        let padded = pad_str(&raw, width, align, Some("…")).to_string();
        match self {
            CellValue::Id(_) => style(padded).cyan().to_string(),
            CellValue::Total(..) => style(padded).bold().to_string(),
            CellValue::Empty | CellValue::Percent(None) => style(padded).dim().to_string(),
            _ => padded,
        }
    }
}

/// Format a float without trailing zeros ("80", "12.5")
pub fn trim_float(value: f64) -> String {
    let text = format!("{:.4}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Plain grouped number, e.g. quantities
pub fn quantity(value: f64) -> CellValue {
    if value.fract() == 0.0 {
        CellValue::Text(group_thousands(value, 0))
    } else {
        CellValue::Text(trim_float(value))
    }
}

/// Column definition with key, header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
#[derive(Debug, Clone)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    precision: usize,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            precision: 0,
            show_summary: true,
        }
    }

    /// Fraction digits for money cells
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Whether to print the "N item(s)" line after the table
    pub fn with_summary(mut self, show: bool) -> Self {
        self.show_summary = show;
        self
    }

    /// Render rows in the requested format
    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> String {
        match format {
            OutputFormat::Tsv => self.render_tsv(rows),
            OutputFormat::Csv => self.render_csv(rows),
            OutputFormat::Md => self.render_md(rows),
            OutputFormat::Id => rows.iter().map(|r| format!("{}\n", r.id)).collect(),
            _ => self.render_table(rows),
        }
    }

    /// Print rows in the requested format
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) {
        print!("{}", self.render(rows, format));
    }

    fn cell_text(&self, row: &TableRow, key: &str) -> String {
        row.get(key)
            .map(|v| v.raw(self.precision))
            .unwrap_or_else(|| "-".to_string())
    }

    /// Calculate column widths from content, capped at each column's width
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let content = rows
                    .iter()
                    .map(|r| measure_text_width(&self.cell_text(r, col.key)))
                    .max()
                    .unwrap_or(0);
                measure_text_width(col.header).max(content).min(col.width)
            })
            .collect()
    }

    fn render_table(&self, rows: &[TableRow]) -> String {
        let widths = self.calculate_widths(rows);
        let mut out = String::new();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| style(pad_str(col.header, *w, Alignment::Left, None)).bold().to_string())
            .collect();
        out.push_str(header.join("  ").trim_end());
        out.push('\n');

        let total_width: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total_width));
        out.push('\n');

        for row in rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, w)| match row.get(col.key) {
                    Some(value) => value.format_terminal(*w, self.precision),
                    None => CellValue::Empty.format_terminal(*w, self.precision),
                })
                .collect();
            out.push_str(cells.join("  ").trim_end());
            out.push('\n');
        }

        if self.show_summary {
            out.push('\n');
            out.push_str(&format!("{} {}(s)\n", style(rows.len()).cyan(), self.entity_name));
        }
        out
    }

    fn render_tsv(&self, rows: &[TableRow]) -> String {
        let mut out = String::new();
        let headers: Vec<&str> = self.columns.iter().map(|c| c.key).collect();
        out.push_str(&headers.join("\t"));
        out.push('\n');
        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|c| self.cell_text(row, c.key).replace(['\t', '\n'], " "))
                .collect();
            out.push_str(&values.join("\t"));
            out.push('\n');
        }
        out
    }

    fn render_csv(&self, rows: &[TableRow]) -> String {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let headers: Vec<&str> = self.columns.iter().map(|c| c.key).collect();
        let _ = writer.write_record(&headers);
        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|c| {
                    row.get(c.key)
                        .map(|v| v.csv(self.precision))
                        .unwrap_or_default()
                })
                .collect();
            let _ = writer.write_record(&values);
        }
        writer
            .into_inner()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }

    fn render_md(&self, rows: &[TableRow]) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().map(|c| c.header.to_string()));
        for row in rows {
            builder.push_record(
                self.columns
                    .iter()
                    .map(|c| self.cell_text(row, c.key).replace('|', "\\|")),
            );
        }
        let mut out = builder.build().with(Style::markdown()).to_string();
        out.push('\n');
        out
    }
}
