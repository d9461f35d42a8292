//! `invman report` command - Inventory reports

use chrono::Duration;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::Context;
use crate::cli::output::print_list;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Parts and products changed recently
    Recent(RecentArgs),

    /// Stock levels of every part and product
    Stock(StockArgs),
}

#[derive(clap::Args, Debug)]
pub struct RecentArgs {
    /// How many days back to look
    #[arg(long, short = 'd', default_value_t = 7)]
    pub days: u32,
}

#[derive(clap::Args, Debug)]
pub struct StockArgs {
    /// Only rows at or below their minimum
    #[arg(long)]
    pub low: bool,
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Recent(args) => run_recent(args, global),
        ReportCommands::Stock(args) => run_stock(args, global),
    }
}

fn run_recent(args: RecentArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;

    let since = ctx.session.now - Duration::days(i64::from(args.days));
    let items = ctx.store.updated_since(since)?;

    let format = ctx.format(global);
    if format == OutputFormat::Auto && !global.quiet {
        println!(
            "{} since {}",
            style("Updated").bold(),
            style(since.format("%Y-%m-%d %H:%M:%S")).cyan()
        );
    }

    print_list(&items, format, "item", global.quiet)
}

fn run_stock(args: StockArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;

    let mut lines = ctx.store.stock_levels()?;
    if args.low {
        lines.retain(|line| line.needs_reorder());
    }

    let format = ctx.format(global);
    print_list(&lines, format, "item", global.quiet)?;

    let low = lines.iter().filter(|line| line.needs_reorder()).count();
    if format == OutputFormat::Auto && !global.quiet && low > 0 {
        println!(
            "{} {} item(s) at or below minimum stock (as of {})",
            style("!").yellow(),
            low,
            ctx.session.now.format("%Y-%m-%d")
        );
    }

    Ok(())
}
