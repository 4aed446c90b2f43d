//! `costbook product` command - Product management
//!
//! Products are registered and edited through YAML product sheets: print a
//! sheet with `template` or `sheet`, edit it, then `apply` it.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::io::Read;
use std::path::PathBuf;

use crate::cli::commands::cost::find_product;
use crate::cli::helpers::{format_short_id, print_structured, print_success, rule, Workspace};
use crate::cli::table::{quantity, CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Dataset, ProductSheet};
use crate::costing::compute_unit_cost;
use crate::entities::{CostBatch, Product};

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// List products with their unit cost
    List(ListArgs),

    /// Show a product's details
    Show(ShowArgs),

    /// Print a starter product sheet
    Template(OutputArgs),

    /// Print the editable sheet of an existing product
    Sheet(SheetArgs),

    /// Register or update a product from a sheet
    Apply(ApplyArgs),

    /// Remove a product and all of its cost lines
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name and notes (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,

    /// Only products in this category (id or name, any level)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Product id or name
    pub product: String,
}

#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    /// Write to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct SheetArgs {
    /// Product id or name
    pub product: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(clap::Args, Debug)]
pub struct ApplyArgs {
    /// Product sheet (YAML), or "-" for stdin
    pub file: PathBuf,

    /// Show the resulting unit cost without saving
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Product id or name
    pub product: String,
}

pub fn run(cmd: ProductCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProductCommands::List(args) => run_list(args, global),
        ProductCommands::Show(args) => run_show(args, global),
        ProductCommands::Template(args) => run_template(args, global),
        ProductCommands::Sheet(args) => run_sheet(args, global),
        ProductCommands::Apply(args) => run_apply(args, global),
        ProductCommands::Remove(args) => run_remove(args, global),
    }
}

const LIST_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 16),
    ColumnDef::new("name", "NAME", 28),
    ColumnDef::new("category", "CATEGORY", 32),
    ColumnDef::new("quantity", "QTY", 10),
    ColumnDef::new("unit_cost", "UNIT COST", 14),
    ColumnDef::new("registered", "REGISTERED", 10),
];

fn in_category(product: &Product, data: &Dataset, query: &str) -> bool {
    let query = query.to_lowercase();
    let cats = &data.categories;
    let matches = |id: Option<&str>, name: Option<&str>| {
        id.map_or(false, |id| id.to_lowercase() == query)
            || name.map_or(false, |name| name.to_lowercase() == query)
    };
    let large = product.category_large_id.as_ref().map(|id| id.as_str());
    let medium = product.category_medium_id.as_ref().map(|id| id.as_str());
    let small = product.category_small_id.as_ref().map(|id| id.as_str());
    matches(large, large.and_then(|id| cats.large(id)).map(|c| c.name.as_str()))
        || matches(medium, medium.and_then(|id| cats.medium(id)).map(|c| c.name.as_str()))
        || matches(small, small.and_then(|id| cats.small(id)).map(|c| c.name.as_str()))
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let data = ws.load();

    let products: Vec<&Product> = data
        .products
        .iter()
        .filter(|p| {
            args.search.as_ref().map_or(true, |needle| {
                let needle = needle.to_lowercase();
                p.name.to_lowercase().contains(&needle)
                    || p.notes
                        .as_deref()
                        .map_or(false, |n| n.to_lowercase().contains(&needle))
            })
        })
        .filter(|p| {
            args.category
                .as_deref()
                .map_or(true, |query| in_category(p, &data, query))
        })
        .collect();

    if args.count {
        println!("{}", products.len());
        return Ok(());
    }

    let format = ws.format(global);
    if print_structured(&products, format)? {
        return Ok(());
    }

    let currency = ws.config.currency();
    let rows: Vec<TableRow> = products
        .iter()
        .map(|p| {
            let id = match format {
                OutputFormat::Auto => format_short_id(&p.id),
                _ => p.id.to_string(),
            };
            let total = compute_unit_cost(p.id.as_str(), &data).total;
            TableRow::new(p.id.to_string())
                .cell("id", CellValue::Id(id))
                .cell("name", CellValue::Text(p.name.clone()))
                .cell(
                    "category",
                    data.category_path(p)
                        .map(CellValue::Text)
                        .unwrap_or(CellValue::Empty),
                )
                .cell("quantity", quantity(p.expected_production.quantity))
                .cell("unit_cost", CellValue::Money(total, currency.clone()))
                .cell("registered", CellValue::Date(p.registered_at))
        })
        .collect();

    TableFormatter::new(LIST_COLUMNS, "product")
        .with_precision(ws.config.precision())
        .with_summary(!global.quiet)
        .output(&rows, format);
    Ok(())
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductView<'a> {
    #[serde(flatten)]
    product: &'a Product,
    cost_entries: CostBatch,
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let data = ws.load();
    let product = find_product(&data, &args.product)?;

    let format = ws.format(global);
    if matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
        let view = ProductView {
            product,
            cost_entries: data.cost_entries.batch_for(product.id.as_str()),
        };
        print_structured(&view, format)?;
        return Ok(());
    }
    if format == OutputFormat::Id {
        println!("{}", product.id);
        return Ok(());
    }

    let costs = compute_unit_cost(product.id.as_str(), &data);
    let entries = data.entries_for(product.id.as_str());

    println!("{}", rule());
    println!("{}: {}", style("ID").bold(), style(&product.id).cyan());
    println!("{}: {}", style("Name").bold(), style(&product.name).yellow());
    if let Some(path) = data.category_path(product) {
        println!("{}: {}", style("Category").bold(), path);
    }
    if let Some(variants) = product.variant_summary() {
        println!("{}: {}", style("Size variants").bold(), variants);
    }
    println!(
        "{}: {}",
        style("Registered").bold(),
        product.registered_at.format("%Y-%m-%d")
    );
    println!(
        "{}: {} / {} year(s)",
        style("Expected production").bold(),
        quantity(product.expected_production.quantity).raw(0),
        product.expected_production.period_years
    );
    println!(
        "{}: {}",
        style("Lot size").bold(),
        quantity(product.production_lot_size).raw(0)
    );
    if product.base_man_hours > 0.0 {
        println!("{}: {}h", style("Base man-hours").bold(), product.base_man_hours);
    }
    if !product.equipment_ids.is_empty() {
        let names: Vec<String> = product
            .equipment_ids
            .iter()
            .map(|id| {
                data.find_equipment(id.as_str())
                    .map(|e| e.name.clone())
                    .unwrap_or_else(|| id.to_string())
            })
            .collect();
        println!("{}: {}", style("Equipment").bold(), names.join(", "));
    }
    println!("{}", rule());
    println!(
        "{}: {} ({} cost line(s))",
        style("Unit cost").bold(),
        style(ws.display_money(costs.total)).green(),
        entries.len()
    );
    if let Some(notes) = &product.notes {
        println!();
        println!("{}", notes);
    }
    println!("{}", rule());
    Ok(())
}

fn write_sheet(sheet: &ProductSheet, args: &OutputArgs, global: &GlobalOpts) -> Result<()> {
    let yaml = sheet.to_yaml().into_diagnostic()?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, yaml).into_diagnostic()?;
            print_success(
                global,
                format!("Wrote product sheet to {}", style(path.display()).cyan()),
            );
        }
        None => print!("{}", yaml),
    }
    Ok(())
}

fn run_template(args: OutputArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let data = ws.load();
    write_sheet(&ProductSheet::template(&data), &args, global)
}

fn run_sheet(args: SheetArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let data = ws.load();
    let product = find_product(&data, &args.product)?;
    write_sheet(&ProductSheet::from_product(product, &data), &args.output, global)
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut contents = String::new();
        std::io::stdin()
            .read_to_string(&mut contents)
            .into_diagnostic()?;
        Ok(contents)
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| miette::miette!("Cannot read {}: {}", path.display(), e))
    }
}

fn run_apply(args: ApplyArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut data = ws.load();

    let contents = read_input(&args.file)?;
    let sheet = ProductSheet::from_yaml(&contents).into_diagnostic()?;
    let (product, batch) = sheet.submit(&data).into_diagnostic()?;

    let existed = data.find_product(product.id.as_str()).is_some();
    let name = product.name.clone();
    let id = data.upsert_product(product, batch);
    let costs = compute_unit_cost(id.as_str(), &data);

    if args.dry_run {
        println!(
            "{} {} would cost {} per unit (not saved)",
            style("~").yellow(),
            style(&name).yellow(),
            style(ws.display_money(costs.total)).green()
        );
        return Ok(());
    }

    ws.save(&data)?;

    if global.format == OutputFormat::Id {
        println!("{}", id);
        return Ok(());
    }
    print_success(
        global,
        format!(
            "{} product {} {} ({} per unit)",
            if existed { "Updated" } else { "Registered" },
            style(&id).cyan(),
            style(&name).yellow(),
            style(ws.display_money(costs.total)).green()
        ),
    );
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut data = ws.load();

    // Ids of products that no longer exist still clear their orphaned entries
    let (id, name) = match find_product(&data, &args.product) {
        Ok(product) => (product.id.to_string(), product.name.clone()),
        Err(_) => (args.product.clone(), args.product.clone()),
    };

    let removed = data
        .remove_product(&id)
        .ok_or_else(|| miette::miette!("No product found matching '{}'", args.product))?;
    ws.save(&data)?;

    print_success(
        global,
        format!(
            "Removed {} and {} cost line(s)",
            style(&name).yellow(),
            removed
        ),
    );
    Ok(())
}
