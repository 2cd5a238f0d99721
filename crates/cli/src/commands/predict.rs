//! Price prediction command

use anyhow::{bail, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;
use pricing_lib::{
    EventLogger, NormalizedSpecification, PlausibilityBounds, PredictionResult,
    RawSpecification, SpecificationValidator,
};
use serde::Serialize;
use tabled::Tabled;

use super::local_pipeline;
use crate::client::{ApiClient, PredictError, PredictResponse};
use crate::config::Settings;
use crate::output::{
    color_price, format_currency, format_spec_value, print_error, print_info, print_json,
    print_success, print_table, print_warning, OutputFormat,
};
use crate::prompt::Prompter;

/// Specification flags; anything left out takes the field default
#[derive(Args, Debug, Default)]
pub struct PredictArgs {
    /// Prompt for every field not given as a flag
    #[arg(long, short)]
    pub interactive: bool,

    /// Manufacturer (e.g. Dell, HP, Apple)
    #[arg(long)]
    pub company: Option<String>,

    /// Laptop type (e.g. Notebook, Ultrabook, Gaming)
    #[arg(long)]
    pub type_name: Option<String>,

    /// Screen size in inches
    #[arg(long)]
    pub inches: Option<String>,

    /// RAM in GB (e.g. 16, "16GB", "sixteen")
    #[arg(long)]
    pub ram: Option<String>,

    /// Weight in kg
    #[arg(long)]
    pub weight: Option<String>,

    /// Operating system
    #[arg(long)]
    pub opsys: Option<String>,

    /// SSD size in GB ("1TB" is understood)
    #[arg(long)]
    pub ssd: Option<String>,

    /// HDD size in GB
    #[arg(long)]
    pub hdd: Option<String>,

    /// Hybrid storage in GB
    #[arg(long)]
    pub hybrid: Option<String>,

    /// Flash storage in GB
    #[arg(long)]
    pub flash_storage: Option<String>,

    /// CPU brand
    #[arg(long)]
    pub cpu: Option<String>,

    /// GPU brand
    #[arg(long)]
    pub gpu: Option<String>,
}

impl PredictArgs {
    /// Raw specification holding only the flags that were given
    pub fn to_raw(&self) -> RawSpecification {
        let fields = [
            ("Company", &self.company),
            ("TypeName", &self.type_name),
            ("Inches", &self.inches),
            ("Ram", &self.ram),
            ("Weight", &self.weight),
            ("OpSys", &self.opsys),
            ("SSD", &self.ssd),
            ("HDD", &self.hdd),
            ("Hybrid", &self.hybrid),
            ("Flash_Storage", &self.flash_storage),
            ("Cpu", &self.cpu),
            ("Gpu", &self.gpu),
        ];

        let mut raw = RawSpecification::new();
        for (name, value) in fields {
            if let Some(value) = value {
                raw.insert(name, value.as_str());
            }
        }
        raw
    }
}

/// Prediction as shown to the user
#[derive(Debug, Serialize)]
struct PriceReport<'a> {
    price: f64,
    plausible: bool,
    currency: String,
    model_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
    predicted_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    specification: Option<&'a NormalizedSpecification>,
}

/// Row for the specification table
#[derive(Tabled, Serialize)]
struct SpecRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn implausible_warning(bounds: PlausibilityBounds, currency: &str) -> String {
    format!(
        "Predicted price is outside the historical range of {} to {} {}",
        bounds.min, bounds.max, currency
    )
}

pub async fn run(settings: &Settings, args: PredictArgs) -> Result<()> {
    let preset = args.to_raw();

    let raw = if args.interactive {
        let validator =
            SpecificationValidator::new(EventLogger::new(&settings.pipeline.log_file));
        print_info("Enter the laptop specification (press Enter to accept the default)");
        let stdin = std::io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());
        prompter.collect(&validator, &preset)?
    } else {
        preset
    };

    match &settings.api_url {
        Some(url) => predict_remote(url, &raw, settings.format).await,
        None => predict_local(settings, &raw),
    }
}

fn predict_local(settings: &Settings, raw: &RawSpecification) -> Result<()> {
    let pipeline = local_pipeline(settings);

    let spec = match pipeline.validate(raw) {
        Ok(spec) => spec,
        Err(rejections) => {
            return report_rejections(
                rejections
                    .iter()
                    .map(|r| (r.field.clone(), r.reason.to_string())),
            )
        }
    };

    let result: PredictionResult = pipeline.predict(&spec)?;
    let currency = pipeline.currency().to_string();
    let report = PriceReport {
        warning: (!result.plausible).then(|| implausible_warning(pipeline.bounds(), &currency)),
        price: result.price,
        plausible: result.plausible,
        currency,
        model_version: result.model_version,
        predicted_at: Local::now().to_rfc3339(),
        specification: Some(&spec),
    };

    print_report(&report, settings.format);
    Ok(())
}

async fn predict_remote(url: &str, raw: &RawSpecification, format: OutputFormat) -> Result<()> {
    let client = ApiClient::new(url)?;

    let response: PredictResponse = match client.predict(raw).await {
        Ok(response) => response,
        Err(PredictError::Rejected { rejections, .. }) => {
            return report_rejections(rejections.into_iter().map(|r| (r.field, r.reason)))
        }
        Err(e) => return Err(e.into()),
    };

    let report = PriceReport {
        price: response.price,
        plausible: response.plausible,
        currency: response.currency,
        model_version: response.model_version,
        warning: response.warning,
        predicted_at: Local::now().to_rfc3339(),
        specification: None,
    };

    print_report(&report, format);
    Ok(())
}

fn report_rejections(rejections: impl Iterator<Item = (String, String)>) -> Result<()> {
    let mut count = 0;
    for (field, reason) in rejections {
        print_error(&format!("{}: {}", field, reason));
        count += 1;
    }
    bail!("{} field(s) rejected, please correct them and try again", count)
}

fn print_report(report: &PriceReport<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            if let Some(spec) = report.specification {
                let rows: Vec<SpecRow> = spec
                    .to_record()
                    .into_iter()
                    .map(|(field, value)| SpecRow {
                        value: format_spec_value(&field, &value),
                        field,
                    })
                    .collect();
                print_table(&rows, OutputFormat::Table);
                println!();
            }

            let price = format_currency(report.price, &report.currency);
            let line = format!(
                "{} {}",
                "Estimated price:".bold(),
                color_price(&price, report.plausible)
            );
            if report.plausible {
                print_success(&line);
            } else {
                println!("{}", line);
            }
            if let Some(warning) = &report.warning {
                print_warning(warning);
            }
            println!("Model: {}", report.model_version.cyan());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_raw_keeps_given_flags() {
        let args = PredictArgs {
            company: Some("HP".to_string()),
            ram: Some("8GB".to_string()),
            gpu: Some("nvidia".to_string()),
            ..Default::default()
        };

        let raw = args.to_raw();

        assert_eq!(raw.len(), 3);
        assert_eq!(raw.get("Company").unwrap().to_text(), "HP");
        assert_eq!(raw.get("Ram").unwrap().to_text(), "8GB");
        assert_eq!(raw.get("Gpu").unwrap().to_text(), "nvidia");
        assert!(raw.get("SSD").is_none());
    }

    #[test]
    fn test_implausible_warning_text() {
        let warning = implausible_warning(PlausibilityBounds::default(), "EUR");
        assert_eq!(
            warning,
            "Predicted price is outside the historical range of 100 to 6999 EUR"
        );
    }

    #[test]
    fn test_report_rejections_fails() {
        let err = report_rejections(
            vec![("Ram".to_string(), "Too high (max 128)".to_string())].into_iter(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("1 field(s) rejected"));
    }
}
