//! Shared helper functions for CLI commands
//!
//! Opening the project store, input checks, and small formatting utilities
//! used by more than one command module.

use dialoguer::Confirm;
use miette::{bail, IntoDiagnostic, Result};
use tracing::debug;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Project, Session, Store, UserId};

/// Everything a command needs to talk to the store
pub struct Context {
    pub project: Project,
    pub config: Config,
    pub store: Store,
    pub session: Session,
}

impl Context {
    /// Discover the project, load config, and open its store
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = match &global.project {
            Some(path) => Project::discover_from(path),
            None => Project::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;

        let config = Config::load(Some(&project));
        let db_path = config.database_path(&project);
        debug!(path = %db_path.display(), "opening store");
        let store = Store::open(&db_path)?;

        let user_id = global.user.map(UserId).unwrap_or_else(|| config.user_id());
        let session = Session::new(user_id);

        Ok(Self {
            project,
            config,
            store,
            session,
        })
    }

    /// Output format: `--format`, else the configured default, else `auto`
    pub fn format(&self, global: &GlobalOpts) -> OutputFormat {
        if global.format != OutputFormat::Auto {
            return global.format;
        }
        self.config
            .default_format
            .as_deref()
            .and_then(|f| <OutputFormat as clap::ValueEnum>::from_str(f, true).ok())
            .unwrap_or(OutputFormat::Auto)
    }
}

/// Check the fields shared by parts and products
///
/// The name must not be blank and `min <= stock <= max`.
pub fn check_item(name: &str, price: f64, stock: u32, min: u32, max: u32) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Name cannot be blank");
    }
    if !price.is_finite() || price < 0.0 {
        bail!("Price must be a non-negative number (got {})", price);
    }
    if min > max {
        bail!("Min ({}) must not be greater than max ({})", min, max);
    }
    if stock < min || stock > max {
        bail!(
            "Inventory ({}) must be between min ({}) and max ({})",
            stock,
            min,
            max
        );
    }
    Ok(())
}

/// Check a machine id given for an in-house part
pub fn check_machine_id(machine_id: i64) -> Result<i64> {
    if machine_id == 0 {
        bail!("Machine ID must be non-zero");
    }
    Ok(machine_id)
}

/// Check a company name given for an outsourced part
pub fn check_company(company: &str) -> Result<String> {
    let company = company.trim();
    if company.is_empty() {
        bail!("Company name cannot be blank");
    }
    Ok(company.to_string())
}

/// Ask before a destructive action unless `--yes` was given
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a price with two decimals
pub fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}
