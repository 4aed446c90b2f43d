//! `costbook category` command - Product category tree

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{print_structured, print_success, Workspace};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::dataset::{self, Dataset};
use crate::core::RecordId;
use crate::entities::{Categories, CategoryLarge, CategoryLevel, CategoryMedium, CategorySmall};

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Show the category tree
    List,

    /// Add a category
    Add(AddArgs),

    /// Rename, re-describe or move a category
    Update(UpdateArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Category name
    pub name: String,

    /// Level: large, medium or small
    #[arg(long, short = 'l', default_value = "large")]
    pub level: CategoryLevel,

    /// Parent category (id or name); required for medium and small
    #[arg(long, short = 'p')]
    pub parent: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Category id or name
    pub category: String,

    #[arg(long)]
    pub name: Option<String>,

    /// New description; an empty value clears it
    #[arg(long)]
    pub description: Option<String>,

    /// Move under another parent (id or name); medium and small only
    #[arg(long, short = 'p')]
    pub parent: Option<String>,
}

pub fn run(cmd: CategoryCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CategoryCommands::List => run_list(global),
        CategoryCommands::Add(args) => run_add(args, global),
        CategoryCommands::Update(args) => run_update(args, global),
    }
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 34),
    ColumnDef::new("level", "LEVEL", 6),
    ColumnDef::new("name", "NAME", 28),
    ColumnDef::new("parent", "PARENT", 28),
    ColumnDef::new("products", "PRODUCTS", 8),
];

/// Products tagged with category `id` at any level
fn product_count(data: &Dataset, id: &RecordId) -> usize {
    data.products
        .iter()
        .filter(|p| {
            [
                &p.category_large_id,
                &p.category_medium_id,
                &p.category_small_id,
            ]
            .into_iter()
            .any(|c| c.as_ref() == Some(id))
        })
        .count()
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let data = ws.load();
    let cats = &data.categories;

    let format = ws.format(global);
    if print_structured(cats, format)? {
        return Ok(());
    }

    if format == OutputFormat::Auto {
        if cats.is_empty() {
            if !global.quiet {
                println!("No categories defined.");
            }
            return Ok(());
        }
        for large in &cats.large {
            println!(
                "{} {}",
                style(&large.name).bold(),
                style(format!("({})", product_count(&data, &large.id))).dim()
            );
            for medium in cats.children_of_large(large.id.as_str()) {
                println!(
                    "  {} {}",
                    medium.name,
                    style(format!("({})", product_count(&data, &medium.id))).dim()
                );
                for small in cats.children_of_medium(medium.id.as_str()) {
                    println!(
                        "    {} {}",
                        small.name,
                        style(format!("({})", product_count(&data, &small.id))).dim()
                    );
                }
            }
        }
        return Ok(());
    }

    let mut rows = Vec::with_capacity(cats.len());
    let row = |id: &RecordId, level: CategoryLevel, name: &str, parent: Option<&str>| {
        TableRow::new(id.to_string())
            .cell("id", CellValue::Id(id.to_string()))
            .cell("level", CellValue::Text(level.to_string()))
            .cell("name", CellValue::Text(name.to_string()))
            .cell(
                "parent",
                parent
                    .map(|p| CellValue::Text(p.to_string()))
                    .unwrap_or(CellValue::Empty),
            )
            .cell("products", CellValue::Number(product_count(&data, id) as f64, 0))
    };
    for c in &cats.large {
        rows.push(row(&c.id, CategoryLevel::Large, &c.name, None));
    }
    for c in &cats.medium {
        let parent = cats.large(c.large_id.as_str()).map(|p| p.name.as_str());
        rows.push(row(&c.id, CategoryLevel::Medium, &c.name, parent));
    }
    for c in &cats.small {
        let parent = cats.medium(c.medium_id.as_str()).map(|p| p.name.as_str());
        rows.push(row(&c.id, CategoryLevel::Small, &c.name, parent));
    }

    TableFormatter::new(COLUMNS, "category").output(&rows, format);
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut data = ws.load();

    let name = args.name.trim().to_string();
    if name.is_empty() {
        return Err(miette::miette!("A category needs a name"));
    }
    let description = args.description.filter(|d| !d.trim().is_empty());

    let parent_query = || {
        args.parent
            .as_deref()
            .ok_or_else(|| miette::miette!("A {} category needs --parent", args.level))
    };

    let id = match args.level {
        CategoryLevel::Large => data
            .add_large_category(CategoryLarge {
                id: RecordId::default(),
                name: name.clone(),
                description,
            })
            .into_diagnostic()?,
        CategoryLevel::Medium => {
            let query = parent_query()?;
            let large_id = dataset::resolve(&data.categories.large, query)
                .map(|c| c.id.clone())
                .ok_or_else(|| miette::miette!("No large category found matching '{}'", query))?;
            data.add_medium_category(CategoryMedium {
                id: RecordId::default(),
                large_id,
                name: name.clone(),
                description,
            })
            .into_diagnostic()?
        }
        CategoryLevel::Small => {
            let query = parent_query()?;
            let medium_id = dataset::resolve(&data.categories.medium, query)
                .map(|c| c.id.clone())
                .ok_or_else(|| miette::miette!("No medium category found matching '{}'", query))?;
            data.add_small_category(CategorySmall {
                id: RecordId::default(),
                medium_id,
                name: name.clone(),
                description,
            })
            .into_diagnostic()?
        }
    };
    ws.save(&data)?;

    if global.format == OutputFormat::Id {
        println!("{}", id);
    } else {
        print_success(
            global,
            format!(
                "Added {} category {} {}",
                args.level,
                style(&id).cyan(),
                style(&name).yellow()
            ),
        );
    }
    Ok(())
}

/// Level and id of the category matching `query`; ids win over names
fn locate(cats: &Categories, query: &str) -> Option<(CategoryLevel, RecordId)> {
    let query = query.trim();
    dataset::find(&cats.large, query)
        .map(|c| (CategoryLevel::Large, c.id.clone()))
        .or_else(|| dataset::find(&cats.medium, query).map(|c| (CategoryLevel::Medium, c.id.clone())))
        .or_else(|| dataset::find(&cats.small, query).map(|c| (CategoryLevel::Small, c.id.clone())))
        .or_else(|| dataset::resolve(&cats.large, query).map(|c| (CategoryLevel::Large, c.id.clone())))
        .or_else(|| dataset::resolve(&cats.medium, query).map(|c| (CategoryLevel::Medium, c.id.clone())))
        .or_else(|| dataset::resolve(&cats.small, query).map(|c| (CategoryLevel::Small, c.id.clone())))
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut data = ws.load();

    let (level, id) = locate(&data.categories, &args.category)
        .ok_or_else(|| miette::miette!("No category found matching '{}'", args.category))?;

    let name = match args.name.as_deref().map(str::trim) {
        Some("") => return Err(miette::miette!("A category needs a name")),
        other => other.map(str::to_string),
    };
    let description = args
        .description
        .map(|d| Some(d.trim().to_string()).filter(|d| !d.is_empty()));

    let final_name = match level {
        CategoryLevel::Large => {
            if args.parent.is_some() {
                return Err(miette::miette!("A large category has no parent"));
            }
            let mut category = data
                .categories
                .large(id.as_str())
                .cloned()
                .ok_or_else(|| miette::miette!("No category found matching '{}'", id))?;
            if let Some(name) = name {
                category.name = name;
            }
            if let Some(description) = description {
                category.description = description;
            }
            let final_name = category.name.clone();
            data.update_large_category(category).into_diagnostic()?;
            final_name
        }
        CategoryLevel::Medium => {
            let mut category = data
                .categories
                .medium(id.as_str())
                .cloned()
                .ok_or_else(|| miette::miette!("No category found matching '{}'", id))?;
            if let Some(query) = args.parent.as_deref() {
                category.large_id = dataset::resolve(&data.categories.large, query)
                    .map(|c| c.id.clone())
                    .ok_or_else(|| miette::miette!("No large category found matching '{}'", query))?;
            }
            if let Some(name) = name {
                category.name = name;
            }
            if let Some(description) = description {
                category.description = description;
            }
            let final_name = category.name.clone();
            data.update_medium_category(category).into_diagnostic()?;
            final_name
        }
        CategoryLevel::Small => {
            let mut category = data
                .categories
                .small(id.as_str())
                .cloned()
                .ok_or_else(|| miette::miette!("No category found matching '{}'", id))?;
            if let Some(query) = args.parent.as_deref() {
                category.medium_id = dataset::resolve(&data.categories.medium, query)
                    .map(|c| c.id.clone())
                    .ok_or_else(|| miette::miette!("No medium category found matching '{}'", query))?;
            }
            if let Some(name) = name {
                category.name = name;
            }
            if let Some(description) = description {
                category.description = description;
            }
            let final_name = category.name.clone();
            data.update_small_category(category).into_diagnostic()?;
            final_name
        }
    };
    ws.save(&data)?;

    print_success(
        global,
        format!(
            "Updated {} category {} {}",
            level,
            style(&id).cyan(),
            style(&final_name).yellow()
        ),
    );
    Ok(())
}
