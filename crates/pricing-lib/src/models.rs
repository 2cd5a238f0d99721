//! Core data models for the pricing pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Categorical specification fields, named by their training-time column prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CategoryField {
    Company,
    TypeName,
    OpSys,
    CpuBrand,
    GpuBrand,
}

impl CategoryField {
    pub const ALL: [CategoryField; 5] = [
        CategoryField::Company,
        CategoryField::TypeName,
        CategoryField::OpSys,
        CategoryField::CpuBrand,
        CategoryField::GpuBrand,
    ];

    /// Column name used by the trained model
    pub fn name(self) -> &'static str {
        match self {
            CategoryField::Company => "Company",
            CategoryField::TypeName => "TypeName",
            CategoryField::OpSys => "OpSys",
            CategoryField::CpuBrand => "Cpu_brand",
            CategoryField::GpuBrand => "Gpu_brand",
        }
    }

    /// Keys this field may arrive under in a raw specification, training name first
    pub fn raw_names(self) -> &'static [&'static str] {
        match self {
            CategoryField::Company => &["Company"],
            CategoryField::TypeName => &["TypeName"],
            CategoryField::OpSys => &["OpSys"],
            CategoryField::CpuBrand => &["Cpu_brand", "Cpu"],
            CategoryField::GpuBrand => &["Gpu_brand", "Gpu"],
        }
    }

    /// Human readable label for prompts and tables
    pub fn label(self) -> &'static str {
        match self {
            CategoryField::Company => "Company",
            CategoryField::TypeName => "Type",
            CategoryField::OpSys => "Operating System",
            CategoryField::CpuBrand => "CPU",
            CategoryField::GpuBrand => "GPU",
        }
    }
}

impl fmt::Display for CategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric specification fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumericField {
    Inches,
    Ram,
    Weight,
    Ssd,
    Hdd,
    Hybrid,
    FlashStorage,
}

impl NumericField {
    pub const ALL: [NumericField; 7] = [
        NumericField::Inches,
        NumericField::Ram,
        NumericField::Weight,
        NumericField::Ssd,
        NumericField::Hdd,
        NumericField::Hybrid,
        NumericField::FlashStorage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericField::Inches => "Inches",
            NumericField::Ram => "Ram",
            NumericField::Weight => "Weight",
            NumericField::Ssd => "SSD",
            NumericField::Hdd => "HDD",
            NumericField::Hybrid => "Hybrid",
            NumericField::FlashStorage => "Flash_Storage",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NumericField::Inches => "Screen Size (inches)",
            NumericField::Ram => "RAM (GB)",
            NumericField::Weight => "Weight (kg)",
            NumericField::Ssd => "SSD size (GB, 0 if none)",
            NumericField::Hdd => "HDD size (GB, 0 if none)",
            NumericField::Hybrid => "Hybrid storage (GB, 0 if none)",
            NumericField::FlashStorage => "Flash storage (GB, 0 if none)",
        }
    }

    /// Kind, bounds and default accepted for this field
    pub fn domain(self) -> NumericDomain {
        use NumericKind::{Float, Integer};
        match self {
            NumericField::Inches => NumericDomain::new(Float, 10.0, 20.0, NumericValue::Float(15.6)),
            NumericField::Ram => NumericDomain::new(Integer, 2.0, 128.0, NumericValue::Int(8)),
            NumericField::Weight => NumericDomain::new(Float, 0.5, 5.0, NumericValue::Float(2.0)),
            NumericField::Ssd => NumericDomain::new(Integer, 0.0, 4000.0, NumericValue::Int(0)),
            NumericField::Hdd => NumericDomain::new(Integer, 0.0, 6000.0, NumericValue::Int(0)),
            NumericField::Hybrid => NumericDomain::new(Integer, 0.0, 2000.0, NumericValue::Int(0)),
            NumericField::FlashStorage => {
                NumericDomain::new(Integer, 0.0, 1000.0, NumericValue::Int(0))
            }
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any specification field, parsed from a user-supplied name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecField {
    Category(CategoryField),
    Numeric(NumericField),
}

impl SpecField {
    pub fn name(self) -> &'static str {
        match self {
            SpecField::Category(field) => field.name(),
            SpecField::Numeric(field) => field.name(),
        }
    }
}

impl FromStr for SpecField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        for field in CategoryField::ALL {
            if field.raw_names().iter().any(|n| n.to_lowercase() == wanted) {
                return Ok(SpecField::Category(field));
            }
        }
        for field in NumericField::ALL {
            if field.name().to_lowercase() == wanted {
                return Ok(SpecField::Numeric(field));
            }
        }
        match wanted.as_str() {
            "type" => Ok(SpecField::Category(CategoryField::TypeName)),
            "os" => Ok(SpecField::Category(CategoryField::OpSys)),
            "flash" => Ok(SpecField::Numeric(NumericField::FlashStorage)),
            _ => Err(format!("unknown field '{}'", s)),
        }
    }
}

/// Target numeric representation of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Integer,
    Float,
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericKind::Integer => f.write_str("int"),
            NumericKind::Float => f.write_str("float"),
        }
    }
}

/// A coerced numeric value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Int(i64),
    Float(f64),
}

impl NumericValue {
    pub fn as_f64(self) -> f64 {
        match self {
            NumericValue::Int(v) => v as f64,
            NumericValue::Float(v) => v,
        }
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::Int(v) => write!(f, "{}", v),
            NumericValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Optional inclusive bounds for a numeric field
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }
}

/// Declared domain of a numeric field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericDomain {
    pub kind: NumericKind,
    pub bounds: Bounds,
    pub default: Option<NumericValue>,
}

impl NumericDomain {
    fn new(kind: NumericKind, min: f64, max: f64, default: NumericValue) -> Self {
        Self {
            kind,
            bounds: Bounds::new(min, max),
            default: Some(default),
        }
    }
}

/// Untrusted field value from a form or prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn to_text(&self) -> String {
        match self {
            RawValue::Number(n) => n.to_string(),
            RawValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

/// Raw specification record keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSpecification {
    fields: BTreeMap<String, RawValue>,
}

impl RawSpecification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&RawValue> {
        self.fields.get(field)
    }

    /// First value present under any of the given names
    pub fn get_any(&self, names: &[&str]) -> Option<&RawValue> {
        names.iter().find_map(|name| self.fields.get(*name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for RawSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                RawValue::Number(n) => write!(f, "{}: {}", name, n)?,
                RawValue::Text(s) => write!(f, "{}: '{}'", name, s)?,
            }
        }
        write!(f, "}}")
    }
}

/// A value handed to the feature encoder
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Category(String),
    Number(f64),
}

/// Validated specification; every value is a legal encoder input.
///
/// Only the validator in [`crate::normalize`] constructs one from raw input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSpecification {
    #[serde(rename = "Company")]
    pub(crate) company: &'static str,
    #[serde(rename = "TypeName")]
    pub(crate) type_name: &'static str,
    #[serde(rename = "Inches")]
    pub(crate) inches: f64,
    #[serde(rename = "Ram")]
    pub(crate) ram: i64,
    #[serde(rename = "Weight")]
    pub(crate) weight: f64,
    #[serde(rename = "OpSys")]
    pub(crate) opsys: &'static str,
    #[serde(rename = "SSD")]
    pub(crate) ssd: i64,
    #[serde(rename = "HDD")]
    pub(crate) hdd: i64,
    #[serde(rename = "Hybrid")]
    pub(crate) hybrid: i64,
    #[serde(rename = "Flash_Storage")]
    pub(crate) flash_storage: i64,
    #[serde(rename = "Cpu_brand")]
    pub(crate) cpu_brand: &'static str,
    #[serde(rename = "Gpu_brand")]
    pub(crate) gpu_brand: &'static str,
}

impl NormalizedSpecification {
    pub fn category(&self, field: CategoryField) -> &'static str {
        match field {
            CategoryField::Company => self.company,
            CategoryField::TypeName => self.type_name,
            CategoryField::OpSys => self.opsys,
            CategoryField::CpuBrand => self.cpu_brand,
            CategoryField::GpuBrand => self.gpu_brand,
        }
    }

    pub fn numeric(&self, field: NumericField) -> NumericValue {
        match field {
            NumericField::Inches => NumericValue::Float(self.inches),
            NumericField::Ram => NumericValue::Int(self.ram),
            NumericField::Weight => NumericValue::Float(self.weight),
            NumericField::Ssd => NumericValue::Int(self.ssd),
            NumericField::Hdd => NumericValue::Int(self.hdd),
            NumericField::Hybrid => NumericValue::Int(self.hybrid),
            NumericField::FlashStorage => NumericValue::Int(self.flash_storage),
        }
    }

    /// Record in collection order, with CPU and GPU under their form names
    pub fn to_record(&self) -> Vec<(String, FieldValue)> {
        let category = |v: &str| FieldValue::Category(v.to_string());
        vec![
            ("Company".to_string(), category(self.company)),
            ("TypeName".to_string(), category(self.type_name)),
            ("Inches".to_string(), FieldValue::Number(self.inches)),
            ("Ram".to_string(), FieldValue::Number(self.ram as f64)),
            ("Weight".to_string(), FieldValue::Number(self.weight)),
            ("OpSys".to_string(), category(self.opsys)),
            ("SSD".to_string(), FieldValue::Number(self.ssd as f64)),
            ("HDD".to_string(), FieldValue::Number(self.hdd as f64)),
            ("Hybrid".to_string(), FieldValue::Number(self.hybrid as f64)),
            ("Flash_Storage".to_string(), FieldValue::Number(self.flash_storage as f64)),
            ("Cpu".to_string(), category(self.cpu_brand)),
            ("Gpu".to_string(), category(self.gpu_brand)),
        ]
    }
}

impl fmt::Display for NormalizedSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Company: '{}', TypeName: '{}', Inches: {}, Ram: {}, Weight: {}, OpSys: '{}', \
             SSD: {}, HDD: {}, Hybrid: {}, Flash_Storage: {}, Cpu_brand: '{}', Gpu_brand: '{}'}}",
            self.company,
            self.type_name,
            self.inches,
            self.ram,
            self.weight,
            self.opsys,
            self.ssd,
            self.hdd,
            self.hybrid,
            self.flash_storage,
            self.cpu_brand,
            self.gpu_brand
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_specification_accepts_numbers_and_text() {
        let raw: RawSpecification =
            serde_json::from_str(r#"{"Company": "HP", "Ram": 8, "Weight": "2kg"}"#).unwrap();
        assert_eq!(raw.get("Company"), Some(&RawValue::Text("HP".to_string())));
        assert_eq!(raw.get("Ram"), Some(&RawValue::Number(8.0)));
        assert_eq!(raw.get("Ram").unwrap().to_text(), "8");
        assert_eq!(raw.get("Weight").unwrap().to_text(), "2kg");
    }

    #[test]
    fn test_get_any_prefers_first_name() {
        let raw = RawSpecification::new().with("Cpu", "AMD").with("Cpu_brand", "Intel");
        let value = raw.get_any(CategoryField::CpuBrand.raw_names()).unwrap();
        assert_eq!(value.to_text(), "Intel");
    }

    #[test]
    fn test_spec_field_parsing() {
        assert_eq!(
            "cpu".parse::<SpecField>().unwrap(),
            SpecField::Category(CategoryField::CpuBrand)
        );
        assert_eq!(
            "flash-storage".parse::<SpecField>().unwrap(),
            SpecField::Numeric(NumericField::FlashStorage)
        );
        assert_eq!(
            "type".parse::<SpecField>().unwrap(),
            SpecField::Category(CategoryField::TypeName)
        );
        assert!("battery".parse::<SpecField>().is_err());
    }

    #[test]
    fn test_domain_table() {
        let ram = NumericField::Ram.domain();
        assert_eq!(ram.kind, NumericKind::Integer);
        assert_eq!(ram.bounds, Bounds::new(2.0, 128.0));
        assert_eq!(ram.default, Some(NumericValue::Int(8)));
        assert_eq!(NumericField::Inches.domain().kind, NumericKind::Float);
    }

    #[test]
    fn test_raw_specification_display() {
        let raw = RawSpecification::new().with("Company", "HP").with("Ram", 8i64);
        assert_eq!(raw.to_string(), "{Company: 'HP', Ram: 8}");
    }
}
