//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use pricing_lib::FieldValue;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print rows as a rounded table, or as a JSON array
pub fn print_table<T: Tabled + Serialize>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table if items.is_empty() => println!("{}", "Nothing to show".yellow()),
        OutputFormat::Table => println!("{}", Table::new(items).with(Style::rounded())),
        OutputFormat::Json => print_json(items),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("Failed to render JSON: {}", e)),
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Errors go to stderr so JSON output stays parseable
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a price with its currency symbol when one is known
pub fn format_currency(amount: f64, currency: &str) -> String {
    match currency {
        "USD" => format!("${:.2}", amount),
        "EUR" => format!("€{:.2}", amount),
        "GBP" => format!("£{:.2}", amount),
        _ => format!("{:.2} {}", amount, currency),
    }
}

/// Format a capacity given in GB; whole terabytes read as TB
pub fn format_capacity(gb: f64) -> String {
    if gb == 0.0 {
        "none".to_string()
    } else if gb >= 1000.0 && gb % 1024.0 == 0.0 {
        format!("{} TB", gb / 1024.0)
    } else {
        format!("{} GB", gb)
    }
}

/// Render one normalized field with its unit
pub fn format_spec_value(field: &str, value: &FieldValue) -> String {
    match value {
        FieldValue::Category(label) => label.clone(),
        FieldValue::Number(n) => match field {
            "Inches" => format!("{}\"", n),
            "Weight" => format!("{} kg", n),
            "Ram" => format!("{} GB", n),
            "SSD" | "HDD" | "Hybrid" | "Flash_Storage" => format_capacity(*n),
            _ => n.to_string(),
        },
    }
}

/// Green for a plausible price, yellow otherwise
pub fn color_price(formatted: &str, plausible: bool) -> String {
    if plausible {
        formatted.green().bold().to_string()
    } else {
        formatted.yellow().bold().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.5, "EUR"), "€1234.50");
        assert_eq!(format_currency(99.999, "USD"), "$100.00");
        assert_eq!(format_currency(10.0, "CHF"), "10.00 CHF");
    }

    #[test]
    fn test_format_capacity() {
        assert_eq!(format_capacity(0.0), "none");
        assert_eq!(format_capacity(256.0), "256 GB");
        assert_eq!(format_capacity(1024.0), "1 TB");
        assert_eq!(format_capacity(2048.0), "2 TB");
        assert_eq!(format_capacity(1000.0), "1000 GB");
    }

    #[test]
    fn test_format_spec_value_units() {
        assert_eq!(format_spec_value("Inches", &FieldValue::Number(15.6)), "15.6\"");
        assert_eq!(format_spec_value("Weight", &FieldValue::Number(2.1)), "2.1 kg");
        assert_eq!(format_spec_value("Ram", &FieldValue::Number(16.0)), "16 GB");
        assert_eq!(format_spec_value("SSD", &FieldValue::Number(1024.0)), "1 TB");
        assert_eq!(
            format_spec_value("Company", &FieldValue::Category("Dell".to_string())),
            "Dell"
        );
    }

    #[test]
    fn test_color_price_keeps_text() {
        colored::control::set_override(false);
        assert_eq!(color_price("€50.00", false), "€50.00");
        assert_eq!(color_price("€950.00", true), "€950.00");
    }
}
