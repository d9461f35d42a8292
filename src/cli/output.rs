//! Rendering of list output in every supported format

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{format_price, truncate_str};
use crate::cli::OutputFormat;
use crate::core::store::{ReportItem, StockLine};
use crate::entities::{Part, Product};

/// Width at which names are truncated in tables
const NAME_WIDTH: usize = 32;

/// A record that can be shown as one table row
pub trait Tabular {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
    fn row_id(&self) -> i64;
}

impl Tabular for Part {
    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Source", "Price", "Stock", "Min", "Max", "Machine/Company"]
    }

    fn row(&self) -> Vec<String> {
        let origin = match (self.machine_id(), self.company_name()) {
            (Some(machine), _) => machine.to_string(),
            (None, Some(company)) => company.to_string(),
            (None, None) => String::new(),
        };
        vec![
            self.id().to_string(),
            self.name().to_string(),
            self.source().to_string(),
            format_price(self.price()),
            self.stock().to_string(),
            self.min().to_string(),
            self.max().to_string(),
            origin,
        ]
    }

    fn row_id(&self) -> i64 {
        self.id()
    }
}

impl Tabular for Product {
    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Price", "Stock", "Min", "Max", "Parts"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            format_price(self.price),
            self.stock.to_string(),
            self.min.to_string(),
            self.max.to_string(),
            self.associated_parts.len().to_string(),
        ]
    }

    fn row_id(&self) -> i64 {
        self.id
    }
}

impl Tabular for ReportItem {
    fn headers() -> &'static [&'static str] {
        &["Type", "ID", "Name", "Stock", "Last Updated"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.kind.to_string(),
            self.id.to_string(),
            self.name.clone(),
            self.stock.to_string(),
            self.last_updated.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]
    }

    fn row_id(&self) -> i64 {
        self.id
    }
}

impl Tabular for StockLine {
    fn headers() -> &'static [&'static str] {
        &["Type", "ID", "Name", "Stock", "Min", "Max", "Reorder"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.kind.to_string(),
            self.id.to_string(),
            self.name.clone(),
            self.stock.to_string(),
            self.min.to_string(),
            self.max.to_string(),
            (if self.needs_reorder() { "yes" } else { "" }).to_string(),
        ]
    }

    fn row_id(&self) -> i64 {
        self.id
    }
}

/// Print a list of records in the requested format
///
/// `noun` is used in the summary line of table output.
pub fn print_list<T: Tabular + Serialize>(
    items: &[T],
    format: OutputFormat,
    noun: &str,
    quiet: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(items).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(T::headers()).into_diagnostic()?;
            for item in items {
                writer.write_record(item.row()).into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        OutputFormat::Id => {
            for item in items {
                println!("{}", item.row_id());
            }
        }
        OutputFormat::Md | OutputFormat::Auto => {
            if items.is_empty() {
                if !quiet {
                    println!("No {}s found.", noun);
                }
                return Ok(());
            }

            println!("{}", render_table(items, format));

            if !quiet && format == OutputFormat::Auto {
                println!();
                println!("{} {}(s) found.", style(items.len()).cyan(), noun);
            }
        }
    }
    Ok(())
}

/// Build a table; markdown style for `md`, a plain grid otherwise
pub fn render_table<T: Tabular>(items: &[T], format: OutputFormat) -> String {
    let mut builder = Builder::default();
    builder.push_record(T::headers().iter().copied());

    for item in items {
        let mut row = item.row();
        if let Some(name) = T::headers()
            .iter()
            .position(|h| *h == "Name")
            .and_then(|i| row.get_mut(i))
        {
            *name = truncate_str(name, NAME_WIDTH);
        }
        builder.push_record(row);
    }

    let mut table = builder.build();
    if format == OutputFormat::Md {
        table.with(Style::markdown());
    } else {
        table.with(Style::sharp());
    }
    table.to_string()
}

/// Print one record as YAML or JSON
pub fn print_record<T: Serialize>(item: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).into_diagnostic()?;
            println!("{}", json);
        }
        _ => {
            let yaml = serde_yml::to_string(item).into_diagnostic()?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_row_shows_variant_field() {
        let in_house = Part::in_house("Bolt", 0.25, 5, 1, 10, 42).with_id(3);
        let row = in_house.row();
        assert_eq!(row[0], "3");
        assert_eq!(row[2], "in-house");
        assert_eq!(row[3], "0.25");
        assert_eq!(row[7], "42");

        let outsourced = Part::outsourced("Nut", 0.1, 5, 1, 10, "Acme");
        assert_eq!(outsourced.row()[7], "Acme");
    }

    #[test]
    fn test_markdown_table_has_header_row() {
        let parts = vec![Part::in_house("Bolt", 0.25, 5, 1, 10, 42).with_id(1)];
        let table = render_table(&parts, OutputFormat::Md);

        assert!(table.contains("| ID"));
        assert!(table.contains("Bolt"));
        assert!(table.contains("|--"));
    }

    #[test]
    fn test_long_names_are_truncated() {
        let name = "A very long product name that will not fit in the column";
        let products = vec![Product::new(name, 1.0, 1, 0, 2)];
        let table = render_table(&products, OutputFormat::Auto);

        assert!(!table.contains(name));
        assert!(table.contains("..."));
    }
}
