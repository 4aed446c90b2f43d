//! `costbook cost` command - unit cost breakdowns and usage views

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{format_short_id, print_structured, rule, truncate_str, Workspace};
use crate::cli::table::{trim_float, CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::dataset::{self, Dataset};
use crate::costing::{
    compute_all, compute_unit_cost, cost_lines, equipment_usage_groups, material_usage_groups,
    CostBreakdown, CostCategory, CostLine,
};
use crate::entities::Product;

#[derive(Subcommand, Debug)]
pub enum CostCommands {
    /// Breakdown table for every product
    Summary(SummaryArgs),

    /// Breakdown of one product with its cost lines
    Show(ShowArgs),

    /// Per-entry cost lines
    Lines(LinesArgs),

    /// Material usage across products
    Materials,

    /// Equipment allocation across products
    Equipment,
}

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    /// Sort by total, most expensive first
    #[arg(long)]
    pub by_total: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Product id or name
    pub product: String,
}

#[derive(clap::Args, Debug)]
pub struct LinesArgs {
    /// Only lines of this product (id or name)
    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// Only lines of this category
    #[arg(long, short = 'c')]
    pub category: Option<CostCategory>,
}

pub fn run(cmd: CostCommands, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let data = ws.load();
    match cmd {
        CostCommands::Summary(args) => run_summary(args, &ws, &data, global),
        CostCommands::Show(args) => run_show(args, &ws, &data, global),
        CostCommands::Lines(args) => run_lines(args, &ws, &data, global),
        CostCommands::Materials => run_materials(&ws, &data, global),
        CostCommands::Equipment => run_equipment(&ws, &data, global),
    }
}

/// Look up a product by id, then by name
pub(crate) fn find_product<'a>(data: &'a Dataset, query: &str) -> Result<&'a Product> {
    dataset::resolve(&data.products, query)
        .ok_or_else(|| miette::miette!("No product found matching '{}'", query))
}

const SUMMARY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 16),
    ColumnDef::new("name", "PRODUCT", 24),
    ColumnDef::new("material", "MATERIAL", 12),
    ColumnDef::new("packaging", "PACKAGING", 12),
    ColumnDef::new("labor", "LABOR", 12),
    ColumnDef::new("outsourcing", "OUTSOURCING", 12),
    ColumnDef::new("development", "DEVELOPMENT", 12),
    ColumnDef::new("equipment", "EQUIPMENT", 12),
    ColumnDef::new("logistics", "LOGISTICS", 12),
    ColumnDef::new("electricity", "ELECTRICITY", 12),
    ColumnDef::new("total", "TOTAL", 14),
];

fn breakdown_row(id: String, name: &str, costs: &CostBreakdown, currency: &str) -> TableRow {
    let mut row = TableRow::new(id.clone())
        .cell("id", CellValue::Id(id))
        .cell("name", CellValue::Text(name.to_string()));
    for (category, value) in costs.components() {
        row = row.cell(category.as_str(), CellValue::Money(value, currency.to_string()));
    }
    row.cell("total", CellValue::Total(costs.total, currency.to_string()))
}

fn run_summary(args: SummaryArgs, ws: &Workspace, data: &Dataset, global: &GlobalOpts) -> Result<()> {
    let mut costs = compute_all(data);
    if args.by_total {
        costs.sort_by(|a, b| b.costs.total.total_cmp(&a.costs.total));
    }

    let format = ws.format(global);
    if print_structured(&costs, format)? {
        return Ok(());
    }

    if costs.is_empty() {
        if !global.quiet {
            println!("No products registered.");
        }
        return Ok(());
    }

    let currency = ws.config.currency();
    let rows: Vec<TableRow> = costs
        .iter()
        .map(|pc| {
            let id = match format {
                OutputFormat::Auto => format_short_id(&pc.product_id),
                _ => pc.product_id.to_string(),
            };
            breakdown_row(id, &pc.product_name, &pc.costs, &currency)
        })
        .collect();

    TableFormatter::new(SUMMARY_COLUMNS, "product")
        .with_precision(ws.config.precision())
        .with_summary(!global.quiet)
        .output(&rows, format);
    Ok(())
}

#[derive(serde::Serialize)]
struct ProductCostView<'a> {
    product_id: &'a str,
    product_name: &'a str,
    currency: String,
    costs: CostBreakdown,
    lines: Vec<CostLine>,
}

fn run_show(args: ShowArgs, ws: &Workspace, data: &Dataset, global: &GlobalOpts) -> Result<()> {
    let product = find_product(data, &args.product)?;
    let costs = compute_unit_cost(product.id.as_str(), data);
    let lines = cost_lines(data, Some(product.id.as_str()));
    let currency = ws.config.currency();

    let format = ws.format(global);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let view = ProductCostView {
                product_id: product.id.as_str(),
                product_name: &product.name,
                currency: currency.clone(),
                costs,
                lines,
            };
            print_structured(&view, format)?;
        }
        OutputFormat::Id => println!("{}", product.id),
        OutputFormat::Tsv | OutputFormat::Csv | OutputFormat::Md => {
            let row = breakdown_row(product.id.to_string(), &product.name, &costs, &currency);
            TableFormatter::new(SUMMARY_COLUMNS, "product")
                .with_precision(ws.config.precision())
                .output(&[row], format);
        }
        OutputFormat::Auto => {
            println!("{}", rule());
            println!("{}: {}", style("ID").bold(), style(&product.id).cyan());
            println!("{}: {}", style("Product").bold(), style(&product.name).yellow());
            if let Some(path) = data.category_path(product) {
                println!("{}: {}", style("Category").bold(), path);
            }
            println!(
                "{}: {} units over {} year(s)",
                style("Expected production").bold(),
                trim_float(product.expected_production.quantity),
                trim_float(product.expected_production.period_years)
            );
            println!("{}", rule());

            for (category, value) in costs.components() {
                let amount = ws.money(value, &currency);
                let line = format!("  {:<14}{:>14}", category.as_str(), amount);
                if value == 0.0 {
                    println!("{}", style(line).dim());
                } else {
                    println!("{}", line);
                }
            }
            println!(
                "  {:<14}{:>14}",
                style("total").bold(),
                style(ws.money(costs.total, &currency)).bold()
            );

            if !lines.is_empty() {
                println!();
                println!("{}", style("Cost lines").bold());
                for line in &lines {
                    println!(
                        "  {:<12} {:<40} {:>12}",
                        style(line.category.as_str()).dim(),
                        truncate_str(&line.detail, 40),
                        ws.money(line.amount, &line.currency)
                    );
                }
            }
            println!("{}", rule());
        }
    }
    Ok(())
}

const LINE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 16),
    ColumnDef::new("category", "CATEGORY", 12),
    ColumnDef::new("product", "PRODUCT", 24),
    ColumnDef::new("detail", "DETAIL", 40),
    ColumnDef::new("amount", "AMOUNT", 14),
];

fn run_lines(args: LinesArgs, ws: &Workspace, data: &Dataset, global: &GlobalOpts) -> Result<()> {
    let product_id = match &args.product {
        Some(query) => Some(find_product(data, query)?.id.to_string()),
        None => None,
    };

    let lines: Vec<CostLine> = cost_lines(data, product_id.as_deref())
        .into_iter()
        .filter(|l| args.category.map_or(true, |c| l.category == c))
        .collect();

    let format = ws.format(global);
    if print_structured(&lines, format)? {
        return Ok(());
    }

    let rows: Vec<TableRow> = lines
        .iter()
        .map(|line| {
            let id = match format {
                OutputFormat::Auto => format_short_id(&line.entry_id),
                _ => line.entry_id.to_string(),
            };
            TableRow::new(line.entry_id.to_string())
                .cell("id", CellValue::Id(id))
                .cell("category", CellValue::Text(line.category.to_string()))
                .cell("product", CellValue::Text(line.product_name.clone()))
                .cell("detail", CellValue::Text(line.detail.clone()))
                .cell("amount", CellValue::Money(line.amount, line.currency.clone()))
        })
        .collect();

    TableFormatter::new(LINE_COLUMNS, "cost line")
        .with_precision(ws.config.precision())
        .output(&rows, format);
    Ok(())
}

const MATERIAL_USAGE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("material", "MATERIAL", 24),
    ColumnDef::new("product", "PRODUCT", 24),
    ColumnDef::new("usage_ratio", "USAGE", 8),
    ColumnDef::new("cost", "COST/UNIT", 12),
    ColumnDef::new("lot_size", "LOT", 8),
];

fn run_materials(ws: &Workspace, data: &Dataset, global: &GlobalOpts) -> Result<()> {
    let groups = material_usage_groups(data);
    let format = ws.format(global);
    if print_structured(&groups, format)? {
        return Ok(());
    }

    if format == OutputFormat::Auto {
        if groups.is_empty() {
            if !global.quiet {
                println!("No material usage recorded.");
            }
            return Ok(());
        }
        for group in &groups {
            let total = group
                .total_usage_ratio
                .map(|r| format!("{}%", trim_float(r)))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{} {} {}",
                style(&group.material_name).bold(),
                style(format!(
                    "({} per {})",
                    ws.money(group.base_unit_cost, &group.currency),
                    if group.unit.is_empty() { "unit" } else { group.unit.as_str() }
                ))
                .dim(),
                group
                    .supplier
                    .as_deref()
                    .map(|s| style(format!("from {}", s)).dim().to_string())
                    .unwrap_or_default()
            );
            for line in &group.entries {
                let ratio = line
                    .usage_ratio
                    .map(|r| format!("{}%", trim_float(r)))
                    .unwrap_or_else(|| "-".to_string());
                let lot = line
                    .lot_size
                    .map(trim_float)
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {:<24} {:>8} {:>12}  lot {}",
                    truncate_str(&line.product_name, 24),
                    ratio,
                    ws.money(line.cost_share, &group.currency),
                    lot
                );
            }
            println!("  {} {}", style("total usage").dim(), total);
            println!();
        }
        return Ok(());
    }

    let rows: Vec<TableRow> = groups
        .iter()
        .flat_map(|group| {
            group.entries.iter().map(move |line| {
                TableRow::new(group.material_id.to_string())
                    .cell("material", CellValue::Text(group.material_name.clone()))
                    .cell("product", CellValue::Text(line.product_name.clone()))
                    .cell("usage_ratio", CellValue::Percent(line.usage_ratio))
                    .cell("cost", CellValue::Money(line.cost_share, group.currency.clone()))
                    .cell(
                        "lot_size",
                        line.lot_size
                            .map(|l| CellValue::Number(l, 0))
                            .unwrap_or(CellValue::Empty),
                    )
            })
        })
        .collect();

    TableFormatter::new(MATERIAL_USAGE_COLUMNS, "material usage")
        .with_precision(ws.config.precision())
        .output(&rows, format);
    Ok(())
}

const EQUIPMENT_USAGE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("equipment", "EQUIPMENT", 24),
    ColumnDef::new("product", "PRODUCT", 24),
    ColumnDef::new("share", "SHARE", 8),
    ColumnDef::new("usage_hours", "HOURS", 8),
    ColumnDef::new("annual_quantity", "ANNUAL QTY", 10),
    ColumnDef::new("cost", "COST/UNIT", 12),
];

fn run_equipment(ws: &Workspace, data: &Dataset, global: &GlobalOpts) -> Result<()> {
    let groups = equipment_usage_groups(data);
    let format = ws.format(global);
    if print_structured(&groups, format)? {
        return Ok(());
    }

    if format == OutputFormat::Auto {
        if groups.is_empty() {
            if !global.quiet {
                println!("No equipment allocations recorded.");
            }
            return Ok(());
        }
        for group in &groups {
            let equipment = &group.equipment;
            println!(
                "{} {}",
                style(&equipment.name).bold(),
                style(format!(
                    "({} over {} year(s), {} per year)",
                    ws.money(equipment.acquisition_cost, &equipment.currency),
                    trim_float(equipment.amortization_years),
                    ws.money(equipment.annual_cost(), &equipment.currency)
                ))
                .dim()
            );
            for line in &group.entries {
                let hours = line
                    .usage_hours
                    .map(|h| format!("{}h", trim_float(h)))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {:<24} {:>7} {:>8} {:>10} {:>12}",
                    truncate_str(&line.product_name, 24),
                    format!("{}%", trim_float(line.share * 100.0)),
                    hours,
                    trim_float(line.annual_quantity),
                    ws.money(line.unit_cost, &equipment.currency)
                );
            }
            if let Some(total) = group.total_usage_hours {
                println!("  {} {}h", style("total hours").dim(), trim_float(total));
            }
            println!();
        }
        return Ok(());
    }

    let rows: Vec<TableRow> = groups
        .iter()
        .flat_map(|group| {
            group.entries.iter().map(move |line| {
                TableRow::new(group.equipment.id.to_string())
                    .cell("equipment", CellValue::Text(group.equipment.name.clone()))
                    .cell("product", CellValue::Text(line.product_name.clone()))
                    .cell("share", CellValue::Percent(Some(line.share * 100.0)))
                    .cell(
                        "usage_hours",
                        line.usage_hours
                            .map(|h| CellValue::Number(h, 2))
                            .unwrap_or(CellValue::Empty),
                    )
                    .cell("annual_quantity", CellValue::Number(line.annual_quantity, 0))
                    .cell(
                        "cost",
                        CellValue::Money(line.unit_cost, group.equipment.currency.clone()),
                    )
            })
        })
        .collect();

    TableFormatter::new(EQUIPMENT_USAGE_COLUMNS, "equipment allocation")
        .with_precision(ws.config.precision())
        .output(&rows, format);
    Ok(())
}
