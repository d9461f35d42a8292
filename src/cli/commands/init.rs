//! `invman init` command - Initialize a new inventory project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::core::project::{Project, ProjectError};
use crate::core::{Config, Store};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .invman/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    // Create directory if it doesn't exist
    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            let db_path = Config::load(Some(&project)).database_path(&project);
            create_database(&db_path)?;

            println!(
                "{} Initialized inventory project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!(
                "  {} {}",
                style("database:").dim(),
                style(db_path.display()).dim()
            );
            println!();
            println!("Next steps:");
            println!(
                "  {} Add an in-house part",
                style("invman part new --name Bolt --price 0.25 --stock 10 --max 100 --machine-id 1").yellow()
            );
            println!(
                "  {} Add a product",
                style("invman product new --name Kit --price 9.99 --stock 1 --max 5 --part 1").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Inventory project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("invman init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

/// Open the store once so the schema exists before the first command
fn create_database(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    Store::open(path)?;
    Ok(())
}
