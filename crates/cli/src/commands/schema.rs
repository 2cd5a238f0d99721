//! Feature schema listing

use anyhow::{bail, Result};
use serde::Serialize;
use tabled::Tabled;

use super::local_pipeline;
use crate::client::{ApiClient, SchemaResponse};
use crate::config::Settings;
use crate::output::{print_table, OutputFormat};

/// Row for the schema table
#[derive(Tabled, Serialize)]
struct ColumnRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Column")]
    column: String,
}

pub async fn run(settings: &Settings) -> Result<()> {
    let columns = match &settings.api_url {
        Some(url) => {
            let client = ApiClient::new(url)?;
            let schema: SchemaResponse = client.get("api/v1/schema").await?;
            schema.columns
        }
        None => match local_pipeline(settings).schema() {
            Some(schema) => schema.columns().to_vec(),
            None => bail!(
                "Feature schema could not be loaded from {}",
                settings.pipeline.schema_path.display()
            ),
        },
    };

    print_columns(&columns, settings.format);
    Ok(())
}

fn print_columns(columns: &[String], format: OutputFormat) {
    match format {
        OutputFormat::Json => crate::output::print_json(columns),
        OutputFormat::Table => {
            let rows: Vec<ColumnRow> = columns
                .iter()
                .enumerate()
                .map(|(index, column)| ColumnRow {
                    index,
                    column: column.clone(),
                })
                .collect();
            print_table(&rows, format);
            println!("\nTotal: {} columns", columns.len());
        }
    }
}
