//! Single-value normalization preview

use anyhow::{anyhow, Result};
use pricing_lib::normalize::vocabulary;
use pricing_lib::{EventLogger, Rejection, SpecField, SpecificationValidator};
use serde::Serialize;
use tabled::Tabled;

use crate::config::Settings;
use crate::output::{print_info, print_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Outcome {
    Unchanged,
    Corrected,
    Default,
    Rejected,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Outcome::Unchanged => "unchanged",
            Outcome::Corrected => "corrected",
            Outcome::Default => "default",
            Outcome::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Row for the normalization table
#[derive(Debug, Tabled, Serialize)]
struct NormalizeRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Input")]
    input: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Status")]
    outcome: Outcome,
}

/// Preview without touching the event log
fn preview(field: SpecField, value: &str) -> (NormalizeRow, Option<Rejection>) {
    let events = EventLogger::disabled();
    let validator = SpecificationValidator::new(events.clone());

    let result = match field {
        SpecField::Category(field) => validator.category(field, value).map(str::to_string),
        SpecField::Numeric(field) => validator.numeric(field, value).map(|v| v.to_string()),
    };

    let (result, outcome, rejection) = match result {
        Ok(result) if value.trim().is_empty() => (result, Outcome::Default, None),
        Ok(result) if events.stats().warnings > 0 => (result, Outcome::Corrected, None),
        Ok(result) => (result, Outcome::Unchanged, None),
        Err(rejection) => (rejection.to_string(), Outcome::Rejected, Some(rejection)),
    };

    let row = NormalizeRow {
        field: field.name().to_string(),
        input: value.to_string(),
        result,
        outcome,
    };
    (row, rejection)
}

pub fn run(settings: &Settings, field: &str, value: &str) -> Result<()> {
    let field: SpecField = field.parse().map_err(|e: String| anyhow!(e))?;
    let (row, rejection) = preview(field, value);

    print_table(&[row], settings.format);

    if let (Some(Rejection::NotFound), SpecField::Category(field)) = (rejection, field) {
        print_info(&format!(
            "Accepted values: {}",
            vocabulary(field).canonical.join(", ")
        ));
    }
    Ok(())
}
