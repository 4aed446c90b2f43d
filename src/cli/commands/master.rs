//! `costbook master` command - Master data management
//!
//! Materials, packaging items, labor roles, equipment and shipping methods.
//! Material, packaging and shipping costs are copied into cost lines when a
//! product sheet is applied; labor rates and equipment costs are looked up
//! every time a unit cost is computed.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{format_short_id, print_structured, print_success, Workspace};
use crate::cli::table::{trim_float, CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::dataset::{self, Dataset};
use crate::core::Record;
use crate::entities::{Equipment, LaborRole, Material, PackagingItem, ShippingMethod};

#[derive(Subcommand, Debug)]
pub enum MasterCommands {
    /// Raw materials bought in lots
    #[command(subcommand)]
    Material(MaterialCommands),

    /// Boxes, bags and cushioning
    #[command(subcommand)]
    Packaging(PackagingCommands),

    /// Kinds of work with an hourly rate
    #[command(subcommand)]
    Labor(LaborCommands),

    /// Machines amortized over years
    #[command(subcommand)]
    Equipment(EquipmentCommands),

    /// Delivery options with a per-unit cost
    #[command(subcommand)]
    Shipping(ShippingCommands),
}

/// Parse a non-negative, finite amount
fn parse_amount(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("'{}' must be a finite, non-negative amount", s));
    }
    Ok(value)
}

/// Fields shared by every master kind
#[derive(clap::Args, Debug, Default)]
pub struct CommonFields {
    /// Currency code (default: configured currency)
    #[arg(long)]
    pub currency: Option<String>,

    /// Free-form note
    #[arg(long)]
    pub note: Option<String>,
}

impl CommonFields {
    fn apply(&self, currency: &mut String, note: &mut Option<String>) {
        if let Some(c) = &self.currency {
            *currency = c.trim().to_uppercase();
        }
        if let Some(n) = &self.note {
            *note = Some(n.clone()).filter(|n| !n.trim().is_empty());
        }
    }
}

// ----- material -----

#[derive(Subcommand, Debug)]
pub enum MaterialCommands {
    /// List materials
    List,
    /// Add a material
    Add {
        name: String,
        #[command(flatten)]
        fields: MaterialFields,
    },
    /// Update a material (id or name)
    Update {
        material: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: MaterialFields,
    },
}

#[derive(clap::Args, Debug)]
pub struct MaterialFields {
    /// Cost of one purchase unit
    #[arg(long, value_parser = parse_amount)]
    pub unit_cost: Option<f64>,
    /// Purchase unit ("m", "kg", "sheet")
    #[arg(long)]
    pub unit: Option<String>,
    /// Lot or size description
    #[arg(long)]
    pub size: Option<String>,
    #[arg(long)]
    pub supplier: Option<String>,
    #[command(flatten)]
    pub common: CommonFields,
}

impl MaterialFields {
    fn apply(&self, m: &mut Material) {
        if let Some(v) = self.unit_cost {
            m.unit_cost = v;
        }
        if let Some(v) = &self.unit {
            m.unit = v.clone();
        }
        if let Some(v) = &self.size {
            m.size_description = v.clone();
        }
        if let Some(v) = &self.supplier {
            m.supplier = Some(v.clone()).filter(|s| !s.trim().is_empty());
        }
        self.common.apply(&mut m.currency, &mut m.note);
    }
}

// ----- packaging -----

#[derive(Subcommand, Debug)]
pub enum PackagingCommands {
    /// List packaging items
    List,
    /// Add a packaging item
    Add {
        name: String,
        #[command(flatten)]
        fields: PackagingFields,
    },
    /// Update a packaging item (id or name)
    Update {
        item: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: PackagingFields,
    },
}

#[derive(clap::Args, Debug)]
pub struct PackagingFields {
    /// Cost of one item
    #[arg(long, value_parser = parse_amount)]
    pub unit_cost: Option<f64>,
    /// Unit ("pcs", "set")
    #[arg(long)]
    pub unit: Option<String>,
    /// Size description
    #[arg(long)]
    pub size: Option<String>,
    #[command(flatten)]
    pub common: CommonFields,
}

impl PackagingFields {
    fn apply(&self, p: &mut PackagingItem) {
        if let Some(v) = self.unit_cost {
            p.unit_cost = v;
        }
        if let Some(v) = &self.unit {
            p.unit = v.clone();
        }
        if let Some(v) = &self.size {
            p.size_description = v.clone();
        }
        self.common.apply(&mut p.currency, &mut p.note);
    }
}

// ----- labor -----

#[derive(Subcommand, Debug)]
pub enum LaborCommands {
    /// List labor roles
    List,
    /// Add a labor role
    Add {
        name: String,
        #[command(flatten)]
        fields: LaborFields,
    },
    /// Update a labor role (id or name)
    Update {
        role: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: LaborFields,
    },
}

#[derive(clap::Args, Debug)]
pub struct LaborFields {
    /// Hourly rate
    #[arg(long, value_parser = parse_amount)]
    pub rate: Option<f64>,
    #[command(flatten)]
    pub common: CommonFields,
}

impl LaborFields {
    fn apply(&self, r: &mut LaborRole) {
        if let Some(v) = self.rate {
            r.hourly_rate = v;
        }
        self.common.apply(&mut r.currency, &mut r.note);
    }
}

// ----- equipment -----

#[derive(Subcommand, Debug)]
pub enum EquipmentCommands {
    /// List equipment
    List,
    /// Add equipment
    Add {
        name: String,
        #[command(flatten)]
        fields: EquipmentFields,
    },
    /// Update equipment (id or name)
    Update {
        equipment: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: EquipmentFields,
    },
}

#[derive(clap::Args, Debug)]
pub struct EquipmentFields {
    /// Acquisition cost
    #[arg(long, value_parser = parse_amount)]
    pub acquisition_cost: Option<f64>,
    /// Amortization period in years
    #[arg(long, value_parser = parse_amount)]
    pub years: Option<f64>,
    #[command(flatten)]
    pub common: CommonFields,
}

impl EquipmentFields {
    fn apply(&self, e: &mut Equipment) {
        if let Some(v) = self.acquisition_cost {
            e.acquisition_cost = v;
        }
        if let Some(v) = self.years {
            e.amortization_years = v;
        }
        self.common.apply(&mut e.currency, &mut e.note);
    }
}

// ----- shipping -----

#[derive(Subcommand, Debug)]
pub enum ShippingCommands {
    /// List shipping methods
    List,
    /// Add a shipping method
    Add {
        name: String,
        #[command(flatten)]
        fields: ShippingFields,
    },
    /// Update a shipping method (id or name)
    Update {
        method: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: ShippingFields,
    },
}

#[derive(clap::Args, Debug)]
pub struct ShippingFields {
    /// Cost of shipping one unit
    #[arg(long, value_parser = parse_amount)]
    pub unit_cost: Option<f64>,
    #[arg(long)]
    pub description: Option<String>,
    #[command(flatten)]
    pub common: CommonFields,
}

impl ShippingFields {
    fn apply(&self, s: &mut ShippingMethod) {
        if let Some(v) = self.unit_cost {
            s.unit_cost = v;
        }
        if let Some(v) = &self.description {
            s.description = Some(v.clone()).filter(|d| !d.trim().is_empty());
        }
        self.common.apply(&mut s.currency, &mut s.note);
    }
}

pub fn run(cmd: MasterCommands, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut data = ws.load();
    let currency = ws.config.currency();

    match cmd {
        MasterCommands::Material(cmd) => match cmd {
            MaterialCommands::List => list_materials(&ws, &data, global),
            MaterialCommands::Add { name, fields } => {
                let mut m = Material::new(name, "", 0.0);
                m.currency = currency;
                fields.apply(&mut m);
                add(&ws, &mut data, |d| &mut d.materials, m, global)
            }
            MaterialCommands::Update {
                material,
                name,
                fields,
            } => update(&ws, &mut data, |d| &mut d.materials, &material, global, |m: &mut Material| {
                rename(&mut m.name, name);
                fields.apply(m);
            }),
        },
        MasterCommands::Packaging(cmd) => match cmd {
            PackagingCommands::List => list_packaging(&ws, &data, global),
            PackagingCommands::Add { name, fields } => {
                let mut p = PackagingItem::new(name, "pcs", 0.0);
                p.currency = currency;
                fields.apply(&mut p);
                add(&ws, &mut data, |d| &mut d.packaging_items, p, global)
            }
            PackagingCommands::Update { item, name, fields } => {
                update(&ws, &mut data, |d| &mut d.packaging_items, &item, global, |p: &mut PackagingItem| {
                    rename(&mut p.name, name);
                    fields.apply(p);
                })
            }
        },
        MasterCommands::Labor(cmd) => match cmd {
            LaborCommands::List => list_labor(&ws, &data, global),
            LaborCommands::Add { name, fields } => {
                let mut r = LaborRole::new(name, 0.0);
                r.currency = currency;
                fields.apply(&mut r);
                add(&ws, &mut data, |d| &mut d.labor_roles, r, global)
            }
            LaborCommands::Update { role, name, fields } => {
                update(&ws, &mut data, |d| &mut d.labor_roles, &role, global, |r: &mut LaborRole| {
                    rename(&mut r.name, name);
                    fields.apply(r);
                })
            }
        },
        MasterCommands::Equipment(cmd) => match cmd {
            EquipmentCommands::List => list_equipment(&ws, &data, global),
            EquipmentCommands::Add { name, fields } => {
                let mut e = Equipment::new(name, 0.0, 1.0);
                e.currency = currency;
                fields.apply(&mut e);
                add(&ws, &mut data, |d| &mut d.equipments, e, global)
            }
            EquipmentCommands::Update {
                equipment,
                name,
                fields,
            } => update(&ws, &mut data, |d| &mut d.equipments, &equipment, global, |e: &mut Equipment| {
                rename(&mut e.name, name);
                fields.apply(e);
            }),
        },
        MasterCommands::Shipping(cmd) => match cmd {
            ShippingCommands::List => list_shipping(&ws, &data, global),
            ShippingCommands::Add { name, fields } => {
                let mut s = ShippingMethod::new(name, 0.0);
                s.currency = currency;
                fields.apply(&mut s);
                add(&ws, &mut data, |d| &mut d.shipping_methods, s, global)
            }
            ShippingCommands::Update {
                method,
                name,
                fields,
            } => update(&ws, &mut data, |d| &mut d.shipping_methods, &method, global, |s: &mut ShippingMethod| {
                rename(&mut s.name, name);
                fields.apply(s);
            }),
        },
    }
}

fn rename(current: &mut String, name: Option<String>) {
    if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
        *current = name.trim().to_string();
    }
}

fn add<T: Record>(
    ws: &Workspace,
    data: &mut Dataset,
    list: impl FnOnce(&mut Dataset) -> &mut Vec<T>,
    record: T,
    global: &GlobalOpts,
) -> Result<()> {
    if record.name().trim().is_empty() {
        return Err(miette::miette!("A {} needs a name", T::KIND));
    }
    let name = record.name().to_string();
    let id = dataset::insert(list(data), record).into_diagnostic()?;
    ws.save(data)?;

    if global.format == OutputFormat::Id {
        println!("{}", id);
    } else {
        print_success(
            global,
            format!("Added {} {} {}", T::KIND, style(&id).cyan(), style(&name).yellow()),
        );
    }
    Ok(())
}

fn update<T: Record + Clone>(
    ws: &Workspace,
    data: &mut Dataset,
    list: impl Fn(&mut Dataset) -> &mut Vec<T>,
    query: &str,
    global: &GlobalOpts,
    edit: impl FnOnce(&mut T),
) -> Result<()> {
    let mut record = dataset::resolve(list(data), query)
        .cloned()
        .ok_or_else(|| miette::miette!("No {} found matching '{}'", T::KIND, query))?;
    edit(&mut record);
    let id = record.id().clone();
    let name = record.name().to_string();
    dataset::replace(list(data), record).into_diagnostic()?;
    ws.save(data)?;

    print_success(
        global,
        format!("Updated {} {} {}", T::KIND, style(&id).cyan(), style(&name).yellow()),
    );
    if matches!(T::PREFIX.as_str(), "MAT" | "PKG" | "SHP") && !global.quiet {
        println!(
            "  {} existing cost lines keep their amounts; re-apply product sheets to refresh them",
            style("note:").dim()
        );
    }
    Ok(())
}

fn short_id(id: &crate::core::RecordId, format: OutputFormat) -> CellValue {
    match format {
        OutputFormat::Auto => CellValue::Id(format_short_id(id)),
        _ => CellValue::Id(id.to_string()),
    }
}

fn text(value: &str) -> CellValue {
    if value.trim().is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(value.to_string())
    }
}

fn opt_text(value: &Option<String>) -> CellValue {
    value.as_deref().map(text).unwrap_or(CellValue::Empty)
}

fn output(ws: &Workspace, columns: &[ColumnDef], entity: &'static str, rows: &[TableRow], format: OutputFormat) {
    TableFormatter::new(columns, entity)
        .with_precision(ws.config.precision())
        .output(rows, format);
}

fn list_materials(ws: &Workspace, data: &Dataset, global: &GlobalOpts) -> Result<()> {
    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("id", "ID", 16),
        ColumnDef::new("name", "NAME", 28),
        ColumnDef::new("unit", "UNIT", 8),
        ColumnDef::new("size", "SIZE", 16),
        ColumnDef::new("unit_cost", "UNIT COST", 12),
        ColumnDef::new("supplier", "SUPPLIER", 20),
    ];
    let format = ws.format(global);
    if print_structured(&data.materials, format)? {
        return Ok(());
    }
    let rows: Vec<TableRow> = data
        .materials
        .iter()
        .map(|m| {
            TableRow::new(m.id.to_string())
                .cell("id", short_id(&m.id, format))
                .cell("name", CellValue::Text(m.name.clone()))
                .cell("unit", text(&m.unit))
                .cell("size", text(&m.size_description))
                .cell("unit_cost", CellValue::Money(m.unit_cost, m.currency.clone()))
                .cell("supplier", opt_text(&m.supplier))
        })
        .collect();
    output(ws, COLUMNS, "material", &rows, format);
    Ok(())
}

fn list_packaging(ws: &Workspace, data: &Dataset, global: &GlobalOpts) -> Result<()> {
    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("id", "ID", 16),
        ColumnDef::new("name", "NAME", 28),
        ColumnDef::new("unit", "UNIT", 8),
        ColumnDef::new("size", "SIZE", 16),
        ColumnDef::new("unit_cost", "UNIT COST", 12),
    ];
    let format = ws.format(global);
    if print_structured(&data.packaging_items, format)? {
        return Ok(());
    }
    let rows: Vec<TableRow> = data
        .packaging_items
        .iter()
        .map(|p| {
            TableRow::new(p.id.to_string())
                .cell("id", short_id(&p.id, format))
                .cell("name", CellValue::Text(p.name.clone()))
                .cell("unit", text(&p.unit))
                .cell("size", text(&p.size_description))
                .cell("unit_cost", CellValue::Money(p.unit_cost, p.currency.clone()))
        })
        .collect();
    output(ws, COLUMNS, "packaging item", &rows, format);
    Ok(())
}

fn list_labor(ws: &Workspace, data: &Dataset, global: &GlobalOpts) -> Result<()> {
    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("id", "ID", 16),
        ColumnDef::new("name", "NAME", 28),
        ColumnDef::new("hourly_rate", "RATE/H", 12),
        ColumnDef::new("note", "NOTE", 32),
    ];
    let format = ws.format(global);
    if print_structured(&data.labor_roles, format)? {
        return Ok(());
    }
    let rows: Vec<TableRow> = data
        .labor_roles
        .iter()
        .map(|r| {
            TableRow::new(r.id.to_string())
                .cell("id", short_id(&r.id, format))
                .cell("name", CellValue::Text(r.name.clone()))
                .cell("hourly_rate", CellValue::Money(r.hourly_rate, r.currency.clone()))
                .cell("note", opt_text(&r.note))
        })
        .collect();
    output(ws, COLUMNS, "labor role", &rows, format);
    Ok(())
}

fn list_equipment(ws: &Workspace, data: &Dataset, global: &GlobalOpts) -> Result<()> {
    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("id", "ID", 16),
        ColumnDef::new("name", "NAME", 28),
        ColumnDef::new("acquisition_cost", "ACQUISITION", 14),
        ColumnDef::new("years", "YEARS", 6),
        ColumnDef::new("annual_cost", "PER YEAR", 12),
    ];
    let format = ws.format(global);
    if print_structured(&data.equipments, format)? {
        return Ok(());
    }
    let rows: Vec<TableRow> = data
        .equipments
        .iter()
        .map(|e| {
            TableRow::new(e.id.to_string())
                .cell("id", short_id(&e.id, format))
                .cell("name", CellValue::Text(e.name.clone()))
                .cell(
                    "acquisition_cost",
                    CellValue::Money(e.acquisition_cost, e.currency.clone()),
                )
                .cell("years", CellValue::Text(trim_float(e.amortization_years)))
                .cell("annual_cost", CellValue::Money(e.annual_cost(), e.currency.clone()))
        })
        .collect();
    output(ws, COLUMNS, "equipment", &rows, format);
    Ok(())
}

fn list_shipping(ws: &Workspace, data: &Dataset, global: &GlobalOpts) -> Result<()> {
    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("id", "ID", 16),
        ColumnDef::new("name", "NAME", 24),
        ColumnDef::new("description", "DESCRIPTION", 32),
        ColumnDef::new("unit_cost", "UNIT COST", 12),
    ];
    let format = ws.format(global);
    if print_structured(&data.shipping_methods, format)? {
        return Ok(());
    }
    let rows: Vec<TableRow> = data
        .shipping_methods
        .iter()
        .map(|s| {
            TableRow::new(s.id.to_string())
                .cell("id", short_id(&s.id, format))
                .cell("name", CellValue::Text(s.name.clone()))
                .cell("description", opt_text(&s.description))
                .cell("unit_cost", CellValue::Money(s.unit_cost, s.currency.clone()))
        })
        .collect();
    output(ws, COLUMNS, "shipping method", &rows, format);
    Ok(())
}
