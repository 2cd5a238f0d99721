//! Categorical value normalization
//!
//! Maps free-form labels onto the vocabulary the model was trained on,
//! including its casing ("Hp", "Msi", "Macos").

use crate::error::Rejection;
use crate::events::EventLogger;
use crate::models::CategoryField;

/// Canonical labels and ordered alias table for one categorical field
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    pub canonical: &'static [&'static str],
    /// `(alias, canonical)` pairs, matched in declaration order
    pub aliases: &'static [(&'static str, &'static str)],
    pub default: &'static str,
}

const COMPANIES: &[&str] = &[
    "Dell", "Apple", "Hp", "Lenovo", "Acer", "Asus", "Msi", "Samsung", "Toshiba", "Huawei",
    "Microsoft",
];

const COMPANY_ALIASES: &[(&str, &str)] = &[
    ("hewlett packard", "Hp"),
    ("micro star", "Msi"),
    ("macbook", "Apple"),
    ("thinkpad", "Lenovo"),
    ("ideapad", "Lenovo"),
    ("surface", "Microsoft"),
    ("matebook", "Huawei"),
];

const TYPES: &[&str] = &[
    "Notebook",
    "Ultrabook",
    "Gaming",
    "2 In 1 Convertible",
    "Workstation",
    "Netbook",
];

const TYPE_ALIASES: &[(&str, &str)] = &[
    ("2 in 1", "2 In 1 Convertible"),
    ("2in1", "2 In 1 Convertible"),
    ("convertible", "2 In 1 Convertible"),
    ("gaming", "Gaming"),
    ("gamer", "Gaming"),
    ("ultrabook", "Ultrabook"),
    ("workstation", "Workstation"),
    ("work station", "Workstation"),
    ("netbook", "Netbook"),
    ("notebook", "Notebook"),
    ("laptop", "Notebook"),
];

const OPERATING_SYSTEMS: &[&str] = &["Windows 10", "Windows 7", "Macos", "Linux", "No Os"];

/// Vendor names come first: version numbers also appear in macOS and Linux labels
const OPSYS_ALIASES: &[(&str, &str)] = &[
    ("macos", "Macos"),
    ("mac os", "Macos"),
    ("osx", "Macos"),
    ("os x", "Macos"),
    ("linux", "Linux"),
    ("ubuntu", "Linux"),
    ("debian", "Linux"),
    ("fedora", "Linux"),
    ("mint", "Linux"),
    ("none", "No Os"),
    ("no operating system", "No Os"),
    ("without os", "No Os"),
    ("freedos", "No Os"),
    ("dos", "No Os"),
    ("windows 11", "Windows 10"),
    ("win 11", "Windows 10"),
    ("win11", "Windows 10"),
    ("windows11", "Windows 10"),
    ("windows 10", "Windows 10"),
    ("win 10", "Windows 10"),
    ("win10", "Windows 10"),
    ("windows10", "Windows 10"),
    ("windows 7", "Windows 7"),
    ("win 7", "Windows 7"),
    ("win7", "Windows 7"),
    ("windows7", "Windows 7"),
    ("10", "Windows 10"),
    ("7", "Windows 7"),
];

const CPU_BRANDS: &[&str] = &["Intel", "AMD", "Other"];

const CPU_ALIASES: &[(&str, &str)] = &[
    ("intel", "Intel"),
    ("core i", "Intel"),
    ("pentium", "Intel"),
    ("celeron", "Intel"),
    ("xeon", "Intel"),
    ("atom", "Intel"),
    ("amd", "AMD"),
    ("ryzen", "AMD"),
    ("athlon", "AMD"),
    ("apple m", "Other"),
    ("samsung", "Other"),
    ("snapdragon", "Other"),
];

const GPU_BRANDS: &[&str] = &["Intel", "Nvidia", "AMD", "Other"];

const GPU_ALIASES: &[(&str, &str)] = &[
    ("nvidia", "Nvidia"),
    ("geforce", "Nvidia"),
    ("gtx", "Nvidia"),
    ("rtx", "Nvidia"),
    ("quadro", "Nvidia"),
    ("intel", "Intel"),
    ("iris", "Intel"),
    ("uhd graphics", "Intel"),
    ("hd graphics", "Intel"),
    ("amd", "AMD"),
    ("radeon", "AMD"),
    ("apple", "Other"),
    ("arm mali", "Other"),
];

/// Vocabulary for a categorical field
pub fn vocabulary(field: CategoryField) -> Vocabulary {
    match field {
        CategoryField::Company => Vocabulary {
            canonical: COMPANIES,
            aliases: COMPANY_ALIASES,
            default: "Dell",
        },
        CategoryField::TypeName => Vocabulary {
            canonical: TYPES,
            aliases: TYPE_ALIASES,
            default: "Notebook",
        },
        CategoryField::OpSys => Vocabulary {
            canonical: OPERATING_SYSTEMS,
            aliases: OPSYS_ALIASES,
            default: "Windows 10",
        },
        CategoryField::CpuBrand => Vocabulary {
            canonical: CPU_BRANDS,
            aliases: CPU_ALIASES,
            default: "Other",
        },
        CategoryField::GpuBrand => Vocabulary {
            canonical: GPU_BRANDS,
            aliases: GPU_ALIASES,
            default: "Other",
        },
    }
}

/// Case-fold, trim, and collapse separators to single spaces
fn fold(raw: &str) -> String {
    raw.to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bare numbers such as "10" only ever match exactly
fn is_word(alias: &str) -> bool {
    alias.chars().any(char::is_alphabetic)
}

/// Resolve a label without side effects
pub fn resolve(field: CategoryField, raw: &str) -> Option<&'static str> {
    let vocab = vocabulary(field);
    let folded = fold(raw);
    if folded.is_empty() {
        return None;
    }

    if let Some(exact) = vocab.canonical.iter().find(|c| fold(c) == folded) {
        return Some(*exact);
    }

    vocab
        .aliases
        .iter()
        .find(|(alias, _)| folded == *alias || (is_word(alias) && folded.contains(alias)))
        .map(|(_, canonical)| *canonical)
}

/// Normalize a raw categorical value.
///
/// Emits a warn entry when the result differs from the trimmed input.
/// `NotFound` is left for the caller to log and act on.
pub fn normalize(
    field: CategoryField,
    raw: &str,
    events: &EventLogger,
) -> Result<&'static str, Rejection> {
    let canonical = resolve(field, raw).ok_or(Rejection::NotFound)?;
    if canonical != raw.trim() {
        events.warn(field.name(), raw, format!("Normalized to {}", canonical));
    }
    Ok(canonical)
}
