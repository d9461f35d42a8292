//! `invman product` command - Product management

use clap::Subcommand;
use console::style;
use miette::{bail, Result};
use tracing::warn;

use crate::cli::helpers::{check_item, confirm, format_price, Context};
use crate::cli::output::{print_list, print_record, render_table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::store::PartRepository;
use crate::entities::{Part, PartId, PartRef, Product, ProductId};

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// Create a new product
    New(NewArgs),

    /// List products
    List,

    /// Show a product and its parts
    Show(ShowArgs),

    /// Search products by id or name
    Search(SearchArgs),

    /// Change a product's fields or associated parts
    Edit(EditArgs),

    /// Delete a product that has no associated parts
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Product name
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

    /// Associated part ID (repeat to add a part more than once)
    #[arg(long = "part", value_name = "PART_ID")]
    pub parts: Vec<PartId>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Product ID
    pub id: ProductId,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Product id, or text contained in the name
    pub text: String,

    /// Match name text exactly as typed
    #[arg(long)]
    pub case_sensitive: bool,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Product ID
    pub id: ProductId,

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

    /// Replace the associated parts with these (repeatable)
    #[arg(long = "part", value_name = "PART_ID", conflicts_with_all = ["clear_parts", "add_parts", "remove_parts"])]
    pub parts: Vec<PartId>,

    /// Add one occurrence of a part (repeatable)
    #[arg(long = "add-part", value_name = "PART_ID")]
    pub add_parts: Vec<PartId>,

    /// Remove one occurrence of a part (repeatable)
    #[arg(long = "remove-part", value_name = "PART_ID")]
    pub remove_parts: Vec<PartId>,

    /// Remove every associated part
    #[arg(long)]
    pub clear_parts: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Product ID
    pub id: ProductId,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run a product subcommand
pub fn run(cmd: ProductCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProductCommands::New(args) => run_new(args, global),
        ProductCommands::List => run_list(global),
        ProductCommands::Show(args) => run_show(args, global),
        ProductCommands::Search(args) => run_search(args, global),
        ProductCommands::Edit(args) => run_edit(args, global),
        ProductCommands::Delete(args) => run_delete(args, global),
    }
}

/// Load each referenced part, failing on the first that cannot be used
fn resolve_parts(parts: &PartRepository<'_>, ids: &[PartId]) -> Result<Vec<Part>> {
    let mut resolved = Vec::with_capacity(ids.len());
    for id in ids {
        resolved.push(parts.resolve(*id)?);
    }
    Ok(resolved)
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;

    let name = args.name.trim().to_string();
    check_item(&name, args.price, args.stock, args.min, args.max)?;

    let parts = resolve_parts(&ctx.store.parts(), &args.parts)?;
    let product = Product::new(name, args.price, args.stock, args.min, args.max).with_parts(parts);
    let product = ctx.store.products().add(&product, &ctx.session)?;

    match ctx.format(global) {
        OutputFormat::Id => println!("{}", product.id),
        OutputFormat::Json => print_record(&product, OutputFormat::Json)?,
        OutputFormat::Yaml => print_record(&product, OutputFormat::Yaml)?,
        _ => {
            if !global.quiet {
                println!(
                    "{} Created product {} {} with {} part(s)",
                    style("✓").green(),
                    style(product.id).cyan(),
                    style(&product.name).yellow(),
                    product.associated_parts.len()
                );
            }
        }
    }

    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let products = ctx.store.products().list_all()?;
    print_list(&products, ctx.format(global), "product", global.quiet)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let products = ctx.store.products();

    let product = products.resolve(args.id)?;

    let format = ctx.format(global);
    match format {
        OutputFormat::Id => {
            println!("{}", product.id);
            return Ok(());
        }
        OutputFormat::Json | OutputFormat::Yaml => return print_record(&product, format),
        _ => {}
    }

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("Product").bold(), style(product.id).cyan());
    println!("{}: {}", style("Name").bold(), style(&product.name).yellow());
    println!("{}: {}", style("Price").bold(), format_price(product.price));
    println!(
        "{}: {} (min {}, max {})",
        style("Stock").bold(),
        product.stock,
        product.min,
        product.max
    );

    println!();
    if product.associated_parts.is_empty() {
        println!("{}", style("No associated parts").dim());
    } else {
        println!(
            "{} ({}):",
            style("Associated parts").bold(),
            product.associated_parts.len()
        );
        println!("{}", render_table(&product.associated_parts, format));
    }

    if let Some(audit) = products.audit(product.id)? {
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

    let products = if args.case_sensitive {
        ctx.store
            .products()
            .find_by_name_contains(args.text.trim(), false)?
    } else {
        ctx.store.products().lookup(&args.text)?
    };

    print_list(&products, ctx.format(global), "product", global.quiet)
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let parts = ctx.store.parts();
    let products = ctx.store.products();

    let mut product = products.resolve(args.id)?;

    let hidden = products
        .linked_parts(product.id)?
        .len()
        .saturating_sub(product.associated_parts.len());
    if hidden > 0 {
        warn!(
            product_id = product.id,
            hidden, "links to unresolvable parts will be removed by this edit"
        );
    }

    if let Some(name) = args.name {
        product.name = name.trim().to_string();
    }
    product.price = args.price.unwrap_or(product.price);
    product.stock = args.stock.unwrap_or(product.stock);
    product.min = args.min.unwrap_or(product.min);
    product.max = args.max.unwrap_or(product.max);
    check_item(
        &product.name,
        product.price,
        product.stock,
        product.min,
        product.max,
    )?;

    if args.clear_parts {
        product.associated_parts.clear();
    }
    if !args.parts.is_empty() {
        product.associated_parts = resolve_parts(&parts, &args.parts)?;
    }
    for part in resolve_parts(&parts, &args.add_parts)? {
        product.add_associated_part(part);
    }
    for id in args.remove_parts {
        if !product.remove_associated_part(PartRef(id)) {
            bail!(
                "Part {} is not associated with product {}",
                id,
                product.id
            );
        }
    }

    let edits = products.update(&product, &ctx.session)?;

    match ctx.format(global) {
        OutputFormat::Json | OutputFormat::Yaml => print_record(&edits, ctx.format(global))?,
        _ => {
            if !global.quiet {
                println!(
                    "{} Updated product {} {}",
                    style("✓").green(),
                    style(product.id).cyan(),
                    style(&product.name).yellow()
                );
                if !edits.is_empty() {
                    println!(
                        "  {} removed {} link(s), added {} link(s)",
                        style("→").dim(),
                        edits.to_remove.len(),
                        edits.to_add.len()
                    );
                }
            }
        }
    }

    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let products = ctx.store.products();

    let product = products.resolve(args.id)?;

    let prompt = format!("Delete product {} ({})?", product.id, product.name);
    if !confirm(&prompt, args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    if products.delete(product.id)? && !global.quiet {
        println!(
            "{} Deleted product {} {}",
            style("✓").green(),
            style(product.id).cyan(),
            style(&product.name).yellow()
        );
    }

    Ok(())
}
