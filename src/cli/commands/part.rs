//! `invman part` command - Part management

use clap::Subcommand;
use console::style;
use miette::{bail, Result};

use crate::cli::helpers::{
    check_company, check_item, check_machine_id, confirm, format_price, Context,
};
use crate::cli::output::{print_list, print_record};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::store::{PartRow, Variant};
use crate::core::StoreError;
use crate::entities::{Part, PartId, PartSource};

#[derive(Subcommand, Debug)]
pub enum PartCommands {
    /// Create a new part
    New(NewArgs),

    /// List parts
    List(ListArgs),

    /// Show a part's details
    Show(ShowArgs),

    /// Search parts by id or name
    Search(SearchArgs),

    /// Change a part's fields or source
    Edit(EditArgs),

    /// Delete a part that no product uses
    Delete(DeleteArgs),

    /// List the products that use a part
    WhereUsed(WhereUsedArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Part name
    #[arg(long)]
    pub name: String,

    /// Unit price
    #[arg(long)]
    pub price: f64,

    /// Units in stock
    #[arg(long, alias = "inventory")]
    pub stock: u32,

    /// Minimum stock level
    #[arg(long, default_value_t = 0)]
    pub min: u32,

    /// Maximum stock level
    #[arg(long)]
    pub max: u32,

    /// Machine that makes the part (in-house)
    #[arg(long, conflicts_with = "company", required_unless_present = "company")]
    pub machine_id: Option<i64>,

    /// Company that supplies the part (outsourced)
    #[arg(long)]
    pub company: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only parts from this source (in-house, outsourced)
    #[arg(long, short = 's')]
    pub source: Option<PartSource>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Part ID
    pub id: PartId,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Part id, or text contained in the name
    pub text: String,

    /// Match name text exactly as typed
    #[arg(long)]
    pub case_sensitive: bool,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Part ID
    pub id: PartId,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New unit price
    #[arg(long)]
    pub price: Option<f64>,

    /// New stock count
    #[arg(long, alias = "inventory")]
    pub stock: Option<u32>,

    /// New minimum stock level
    #[arg(long)]
    pub min: Option<u32>,

    /// New maximum stock level
    #[arg(long)]
    pub max: Option<u32>,

    /// Make the part in-house on this machine
    #[arg(long, conflicts_with = "company")]
    pub machine_id: Option<i64>,

    /// Make the part outsourced from this company
    #[arg(long)]
    pub company: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Part ID
    pub id: PartId,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct WhereUsedArgs {
    /// Part ID
    pub id: PartId,
}

/// Run a part subcommand
pub fn run(cmd: PartCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PartCommands::New(args) => run_new(args, global),
        PartCommands::List(args) => run_list(args, global),
        PartCommands::Show(args) => run_show(args, global),
        PartCommands::Search(args) => run_search(args, global),
        PartCommands::Edit(args) => run_edit(args, global),
        PartCommands::Delete(args) => run_delete(args, global),
        PartCommands::WhereUsed(args) => run_where_used(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;

    let name = args.name.trim().to_string();
    check_item(&name, args.price, args.stock, args.min, args.max)?;

    let part = match (args.machine_id, args.company) {
        (Some(machine_id), _) => Part::in_house(
            name,
            args.price,
            args.stock,
            args.min,
            args.max,
            check_machine_id(machine_id)?,
        ),
        (None, Some(company)) => Part::outsourced(
            name,
            args.price,
            args.stock,
            args.min,
            args.max,
            check_company(&company)?,
        ),
        (None, None) => bail!("Either --machine-id or --company is required"),
    };

    let part = ctx.store.parts().add(&part, &ctx.session)?;

    match ctx.format(global) {
        OutputFormat::Id => println!("{}", part.id()),
        OutputFormat::Json | OutputFormat::Yaml => print_record(&part, ctx.format(global))?,
        _ => {
            if !global.quiet {
                println!(
                    "{} Created {} part {} {}",
                    style("✓").green(),
                    part.source(),
                    style(part.id()).cyan(),
                    style(part.name()).yellow()
                );
            }
        }
    }

    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;

    let mut parts = ctx.store.parts().list_all()?;
    if let Some(source) = args.source {
        parts.retain(|p| p.source() == source);
    }

    print_list(&parts, ctx.format(global), "part", global.quiet)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let parts = ctx.store.parts();

    let part = parts.resolve(args.id)?;

    match ctx.format(global) {
        OutputFormat::Id => {
            println!("{}", part.id());
            return Ok(());
        }
        OutputFormat::Json => return print_record(&part, OutputFormat::Json),
        OutputFormat::Yaml => return print_record(&part, OutputFormat::Yaml),
        _ => {}
    }

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("Part").bold(), style(part.id()).cyan());
    println!("{}: {}", style("Name").bold(), style(part.name()).yellow());
    println!("{}: {}", style("Source").bold(), part.source());
    match &part {
        Part::InHouse(p) => println!("{}: {}", style("Machine ID").bold(), p.machine_id),
        Part::Outsourced(p) => println!("{}: {}", style("Company").bold(), p.company_name),
    }
    println!("{}: {}", style("Price").bold(), format_price(part.price()));
    println!(
        "{}: {} (min {}, max {})",
        style("Stock").bold(),
        part.stock(),
        part.min(),
        part.max()
    );

    let used_by = parts.referenced_by(part.id())?;
    if !used_by.is_empty() {
        let ids: Vec<String> = used_by.iter().map(|id| id.to_string()).collect();
        println!("{}: {}", style("Used by").bold(), ids.join(", "));
    }

    if let Some(audit) = parts.audit(part.id())? {
        println!("{}", style("─".repeat(60)).dim());
        println!(
            "{}: {} by user {}",
            style("Created").dim(),
            audit.created.format("%Y-%m-%d %H:%M:%S"),
            audit.created_by
        );
        println!(
            "{}: {} by user {}",
            style("Updated").dim(),
            audit.last_updated.format("%Y-%m-%d %H:%M:%S"),
            audit.last_updated_by
        );
    }

    Ok(())
}

fn run_search(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;

    let parts = if args.case_sensitive {
        ctx.store
            .parts()
            .find_by_name_contains(args.text.trim(), false)?
    } else {
        ctx.store.parts().lookup(&args.text)?
    };

    print_list(&parts, ctx.format(global), "part", global.quiet)
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;

    // Work from the raw row so a part with no usable variant can be repaired
    let row = ctx
        .store
        .parts()
        .row(args.id)?
        .ok_or(StoreError::NotFound {
            kind: "part",
            id: args.id,
        })?;

    let part = apply_edits(row, args)?;
    ctx.store.parts().update(&part, &ctx.session)?;

    if !global.quiet {
        println!(
            "{} Updated part {} {}",
            style("✓").green(),
            style(part.id()).cyan(),
            style(part.name()).yellow()
        );
    }

    Ok(())
}

/// Build the edited part from the stored row and the given flags
fn apply_edits(row: PartRow, args: EditArgs) -> Result<Part> {
    let variant = row.variant();
    let name = args.name.unwrap_or(row.name).trim().to_string();
    let price = args.price.unwrap_or(row.price);
    let stock = args.stock.unwrap_or(row.stock);
    let min = args.min.unwrap_or(row.min);
    let max = args.max.unwrap_or(row.max);
    check_item(&name, price, stock, min, max)?;

    let part = match (args.machine_id, args.company, variant) {
        (Some(machine_id), _, _) => {
            Part::in_house(name, price, stock, min, max, check_machine_id(machine_id)?)
        }
        (None, Some(company), _) => {
            Part::outsourced(name, price, stock, min, max, check_company(&company)?)
        }
        (None, None, Variant::InHouse) => Part::in_house(
            name,
            price,
            stock,
            min,
            max,
            row.machine_id.unwrap_or_default(),
        ),
        (None, None, Variant::Outsourced) => Part::outsourced(
            name,
            price,
            stock,
            min,
            max,
            row.company_name.unwrap_or_default(),
        ),
        (None, None, Variant::Indeterminate) => bail!(
            "Part {} has neither a machine id nor a company. Pass --machine-id or --company.",
            row.id
        ),
    };

    Ok(part.with_id(row.id))
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;

    let row = ctx
        .store
        .parts()
        .row(args.id)?
        .ok_or(StoreError::NotFound {
            kind: "part",
            id: args.id,
        })?;

    let prompt = format!("Delete part {} ({})?", row.id, row.name);
    if !confirm(&prompt, args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    if ctx.store.parts().delete(args.id)? && !global.quiet {
        println!(
            "{} Deleted part {} {}",
            style("✓").green(),
            style(row.id).cyan(),
            style(&row.name).yellow()
        );
    }

    Ok(())
}

fn run_where_used(args: WhereUsedArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;

    let part = ctx.store.parts().resolve(args.id)?;
    let products = ctx.store.products().using_part(part.id())?;

    let format = ctx.format(global);
    if format == OutputFormat::Auto && !global.quiet {
        println!(
            "{} {} {}",
            style("Products using part").bold(),
            style(part.id()).cyan(),
            style(part.name()).yellow()
        );
    }

    print_list(&products, format, "product", global.quiet)
}
