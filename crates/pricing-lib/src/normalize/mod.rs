//! Input normalization: categorical aliasing and numeric validation
//!
//! The [`SpecificationValidator`] is the boundary between untrusted input and
//! the encoder. Everything it returns is a legal [`NormalizedSpecification`].

pub mod category;
pub mod numeric;

pub use category::{resolve, vocabulary, Vocabulary};
pub use numeric::{coerce, validate_numeric};

use crate::error::{FieldRejection, Rejection};
use crate::events::EventLogger;
use crate::models::{
    CategoryField, NormalizedSpecification, NumericField, NumericValue, RawSpecification,
};
use tracing::debug;

/// Validates single fields or whole raw specifications
#[derive(Debug, Clone)]
pub struct SpecificationValidator {
    events: EventLogger,
}

impl SpecificationValidator {
    pub fn new(events: EventLogger) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &EventLogger {
        &self.events
    }

    /// Normalize one categorical answer; an empty answer takes the field default
    pub fn category(&self, field: CategoryField, raw: &str) -> Result<&'static str, Rejection> {
        if raw.trim().is_empty() {
            return Ok(vocabulary(field).default);
        }
        category::normalize(field, raw, &self.events).map_err(|rejection| {
            self.events.error(field.name(), raw, "Invalid choice");
            rejection
        })
    }

    /// Validate one numeric answer against the field's declared domain
    pub fn numeric(&self, field: NumericField, raw: &str) -> Result<NumericValue, Rejection> {
        let domain = field.domain();
        validate_numeric(
            raw,
            domain.kind,
            domain.bounds,
            domain.default,
            field.name(),
            &self.events,
        )
    }

    /// Validate every field, collecting all rejections.
    ///
    /// Missing fields behave like empty answers. Unknown keys are ignored.
    pub fn validate(
        &self,
        raw: &RawSpecification,
    ) -> Result<NormalizedSpecification, Vec<FieldRejection>> {
        let mut rejections = Vec::new();

        let known = |name: &str| {
            CategoryField::ALL
                .iter()
                .any(|f| f.raw_names().contains(&name))
                || NumericField::ALL.iter().any(|f| f.name() == name)
        };
        for (name, _) in raw.iter().filter(|(name, _)| !known(name)) {
            debug!(field = %name, "Ignoring unknown specification field");
        }

        let mut category = |field: CategoryField| -> &'static str {
            let text = raw
                .get_any(field.raw_names())
                .map(|v| v.to_text())
                .unwrap_or_default();
            match self.category(field, &text) {
                Ok(value) => value,
                Err(reason) => {
                    rejections.push(FieldRejection::new(field.name(), reason));
                    vocabulary(field).default
                }
            }
        };
        let company = category(CategoryField::Company);
        let type_name = category(CategoryField::TypeName);
        let opsys = category(CategoryField::OpSys);
        let cpu_brand = category(CategoryField::CpuBrand);
        let gpu_brand = category(CategoryField::GpuBrand);

        let mut number = |field: NumericField| -> NumericValue {
            let text = raw.get(field.name()).map(|v| v.to_text()).unwrap_or_default();
            match self.numeric(field, &text) {
                Ok(value) => value,
                Err(reason) => {
                    rejections.push(FieldRejection::new(field.name(), reason));
                    NumericValue::Int(0)
                }
            }
        };
        let inches = number(NumericField::Inches).as_f64();
        let ram = number(NumericField::Ram);
        let weight = number(NumericField::Weight).as_f64();
        let ssd = number(NumericField::Ssd);
        let hdd = number(NumericField::Hdd);
        let hybrid = number(NumericField::Hybrid);
        let flash_storage = number(NumericField::FlashStorage);

        if !rejections.is_empty() {
            return Err(rejections);
        }

        Ok(NormalizedSpecification {
            company,
            type_name,
            inches,
            ram: as_int(ram),
            weight,
            opsys,
            ssd: as_int(ssd),
            hdd: as_int(hdd),
            hybrid: as_int(hybrid),
            flash_storage: as_int(flash_storage),
            cpu_brand,
            gpu_brand,
        })
    }
}

fn as_int(value: NumericValue) -> i64 {
    match value {
        NumericValue::Int(v) => v,
        NumericValue::Float(v) => v as i64,
    }
}

impl Default for NormalizedSpecification {
    /// Specification built from every field default
    fn default() -> Self {
        let number = |field: NumericField| {
            field
                .domain()
                .default
                .map(NumericValue::as_f64)
                .unwrap_or_default()
        };
        Self {
            company: vocabulary(CategoryField::Company).default,
            type_name: vocabulary(CategoryField::TypeName).default,
            inches: number(NumericField::Inches),
            ram: number(NumericField::Ram) as i64,
            weight: number(NumericField::Weight),
            opsys: vocabulary(CategoryField::OpSys).default,
            ssd: number(NumericField::Ssd) as i64,
            hdd: number(NumericField::Hdd) as i64,
            hybrid: number(NumericField::Hybrid) as i64,
            flash_storage: number(NumericField::FlashStorage) as i64,
            cpu_brand: vocabulary(CategoryField::CpuBrand).default,
            gpu_brand: vocabulary(CategoryField::GpuBrand).default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawValue;
    use tempfile::TempDir;

    fn scenario_a() -> RawSpecification {
        RawSpecification::new()
            .with("Company", "HP")
            .with("TypeName", "Notebook")
            .with("Inches", 15.6)
            .with("Ram", 8i64)
            .with("Weight", 2.0)
            .with("OpSys", "Windows 11")
            .with("SSD", 512i64)
            .with("HDD", 0i64)
            .with("Hybrid", 0i64)
            .with("Flash_Storage", 0i64)
            .with("Cpu", "Intel")
            .with("Gpu", "Intel")
    }

    #[test]
    fn test_scenario_a_normalizes() {
        let dir = TempDir::new().unwrap();
        let validator = SpecificationValidator::new(EventLogger::new(dir.path().join("e.log")));

        let spec = validator.validate(&scenario_a()).unwrap();
        assert_eq!(spec.category(CategoryField::Company), "Hp");
        assert_eq!(spec.category(CategoryField::OpSys), "Windows 10");
        assert_eq!(spec.category(CategoryField::CpuBrand), "Intel");
        assert_eq!(spec.numeric(NumericField::Ssd), NumericValue::Int(512));
        assert_eq!(spec.numeric(NumericField::Inches), NumericValue::Float(15.6));

        let log = std::fs::read_to_string(dir.path().join("e.log")).unwrap();
        assert_eq!(log.lines().count(), 2, "only Company and OpSys were corrected");
    }

    #[test]
    fn test_all_rejections_are_collected() {
        let validator = SpecificationValidator::new(EventLogger::disabled());
        let raw = scenario_a()
            .with("Company", "Alienware")
            .with("Ram", "9999")
            .with("Weight", "heavy");

        let rejections = validator.validate(&raw).unwrap_err();
        assert_eq!(
            rejections,
            vec![
                FieldRejection::new("Company", Rejection::NotFound),
                FieldRejection::new("Ram", Rejection::TooHigh { max: 128.0 }),
                FieldRejection::new("Weight", Rejection::Unparseable),
            ]
        );
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let validator = SpecificationValidator::new(EventLogger::disabled());
        let spec = validator.validate(&RawSpecification::new()).unwrap();
        assert_eq!(spec, NormalizedSpecification::default());
        assert_eq!(spec.category(CategoryField::Company), "Dell");
        assert_eq!(spec.numeric(NumericField::Ram), NumericValue::Int(8));
    }

    #[test]
    fn test_training_field_names_are_accepted() {
        let validator = SpecificationValidator::new(EventLogger::disabled());
        let raw = RawSpecification::new()
            .with("Cpu_brand", "AMD Ryzen 5")
            .with("Gpu_brand", RawValue::Text("GeForce RTX 3060".to_string()));
        let spec = validator.validate(&raw).unwrap();
        assert_eq!(spec.category(CategoryField::CpuBrand), "AMD");
        assert_eq!(spec.category(CategoryField::GpuBrand), "Nvidia");
    }

    #[test]
    fn test_not_found_is_logged_by_validator() {
        let dir = TempDir::new().unwrap();
        let validator = SpecificationValidator::new(EventLogger::new(dir.path().join("e.log")));

        assert_eq!(
            validator.category(CategoryField::Company, "Alienware"),
            Err(Rejection::NotFound)
        );
        let log = std::fs::read_to_string(dir.path().join("e.log")).unwrap();
        assert!(log.contains("ERROR | Field: Company | Value: 'Alienware' | Invalid choice"));
    }
}
