//! Interactive prompt loop
//!
//! Asks for each specification field in turn and re-prompts until the
//! answer is accepted. An empty answer takes the field default. Accepted
//! answers are stored in canonical form so validating the collected
//! specification again is silent.

use anyhow::{bail, Context, Result};
use pricing_lib::normalize::vocabulary;
use pricing_lib::{
    CategoryField, NumericField, NumericValue, RawSpecification, RawValue, SpecField,
    SpecificationValidator,
};
use std::io::{BufRead, Write};

/// Fields in the order they are asked
const PROMPT_ORDER: [SpecField; 12] = [
    SpecField::Category(CategoryField::Company),
    SpecField::Category(CategoryField::TypeName),
    SpecField::Numeric(NumericField::Inches),
    SpecField::Numeric(NumericField::Ram),
    SpecField::Numeric(NumericField::Weight),
    SpecField::Category(CategoryField::OpSys),
    SpecField::Numeric(NumericField::Ssd),
    SpecField::Numeric(NumericField::Hdd),
    SpecField::Numeric(NumericField::Hybrid),
    SpecField::Numeric(NumericField::FlashStorage),
    SpecField::Category(CategoryField::CpuBrand),
    SpecField::Category(CategoryField::GpuBrand),
];

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_answer(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read answer")?;
        if read == 0 {
            bail!("Input closed before all fields were answered");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    pub fn ask_category(
        &mut self,
        validator: &SpecificationValidator,
        field: CategoryField,
    ) -> Result<&'static str> {
        let vocab = vocabulary(field);
        let question = format!(
            "{} [{}] ({}): ",
            field.label(),
            vocab.default,
            vocab.canonical.join(", ")
        );

        loop {
            let answer = self.read_answer(&question)?;
            match validator.category(field, &answer) {
                Ok(value) => {
                    let typed = answer.trim();
                    if !typed.is_empty() && typed != value {
                        writeln!(self.output, "  using {}", value)?;
                    }
                    return Ok(value);
                }
                Err(rejection) => writeln!(self.output, "  {}. Please try again.", rejection)?,
            }
        }
    }

    pub fn ask_numeric(
        &mut self,
        validator: &SpecificationValidator,
        field: NumericField,
    ) -> Result<NumericValue> {
        let domain = field.domain();
        let default = domain
            .default
            .map(|d| d.to_string())
            .unwrap_or_else(|| "required".to_string());
        let range = match (domain.bounds.min, domain.bounds.max) {
            (Some(min), Some(max)) => format!(" ({} to {})", min, max),
            (Some(min), None) => format!(" (at least {})", min),
            (None, Some(max)) => format!(" (at most {})", max),
            (None, None) => String::new(),
        };
        let question = format!("{} [{}]{}: ", field.label(), default, range);

        loop {
            let answer = self.read_answer(&question)?;
            match validator.numeric(field, &answer) {
                Ok(value) => {
                    let typed = answer.trim();
                    if !typed.is_empty() && typed != value.to_string() {
                        writeln!(self.output, "  using {}", value)?;
                    }
                    return Ok(value);
                }
                Err(rejection) => writeln!(self.output, "  {}. Please try again.", rejection)?,
            }
        }
    }

    /// Ask for every field `preset` does not already answer
    pub fn collect(
        &mut self,
        validator: &SpecificationValidator,
        preset: &RawSpecification,
    ) -> Result<RawSpecification> {
        let mut spec = preset.clone();

        for field in PROMPT_ORDER {
            match field {
                SpecField::Category(field) => {
                    if preset.get_any(field.raw_names()).is_some() {
                        continue;
                    }
                    let value = self.ask_category(validator, field)?;
                    spec.insert(field.name(), value);
                }
                SpecField::Numeric(field) => {
                    if preset.get(field.name()).is_some() {
                        continue;
                    }
                    let value = self.ask_numeric(validator, field)?;
                    spec.insert(field.name(), RawValue::Number(value.as_f64()));
                }
            }
        }

        Ok(spec)
    }
}
