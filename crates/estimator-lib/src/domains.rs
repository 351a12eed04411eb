//! Option domains for the enumerated input fields
//!
//! The categorical sets come from the reference dataset the pipeline was
//! trained on. They are loaded once at startup and shared read-only between
//! the UI (to populate selections) and the feature encoder (to validate).

use crate::error::StartupError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Selectable RAM sizes in GB
pub const DEFAULT_RAM_GB: [u32; 9] = [2, 4, 6, 8, 12, 16, 24, 32, 64];

/// Selectable HDD sizes in GB
pub const DEFAULT_HDD_GB: [u32; 6] = [0, 128, 256, 512, 1024, 2048];

/// Selectable SSD sizes in GB
pub const DEFAULT_SSD_GB: [u32; 6] = [0, 8, 128, 256, 512, 1024];

/// Resolutions offered by the front end
pub const DEFAULT_RESOLUTIONS: [&str; 9] = [
    "1920x1080",
    "1366x768",
    "1600x900",
    "3840x2160",
    "3200x1800",
    "2880x1800",
    "2560x1600",
    "2560x1440",
    "2304x1440",
];

/// Closed numeric interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// True for finite values inside the interval
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

fn default_ram_gb() -> Vec<u32> {
    DEFAULT_RAM_GB.to_vec()
}

fn default_hdd_gb() -> Vec<u32> {
    DEFAULT_HDD_GB.to_vec()
}

fn default_ssd_gb() -> Vec<u32> {
    DEFAULT_SSD_GB.to_vec()
}

fn default_resolutions() -> Vec<String> {
    DEFAULT_RESOLUTIONS.iter().map(|r| r.to_string()).collect()
}

fn default_weight_kg() -> NumericRange {
    NumericRange::new(0.1, 10.0)
}

fn default_screen_size_inches() -> NumericRange {
    NumericRange::new(10.0, 18.0)
}

/// Allowed values for every validated input field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDomains {
    pub companies: Vec<String>,
    pub type_names: Vec<String>,
    pub cpu_brands: Vec<String>,
    pub gpu_brands: Vec<String>,
    pub operating_systems: Vec<String>,
    #[serde(default = "default_ram_gb")]
    pub ram_gb: Vec<u32>,
    #[serde(default = "default_hdd_gb")]
    pub hdd_gb: Vec<u32>,
    #[serde(default = "default_ssd_gb")]
    pub ssd_gb: Vec<u32>,
    #[serde(default = "default_resolutions")]
    pub resolutions: Vec<String>,
    #[serde(default = "default_weight_kg")]
    pub weight_kg: NumericRange,
    #[serde(default = "default_screen_size_inches")]
    pub screen_size_inches: NumericRange,
}

/// One row of the reference dataset, keyed by training column names
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetRow {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "TypeName")]
    pub type_name: String,
    #[serde(rename = "Cpu brand")]
    pub cpu_brand: String,
    #[serde(rename = "Gpu brand")]
    pub gpu_brand: String,
    #[serde(rename = "os")]
    pub os: String,
}

/// Accepted shapes of the option-domain file
#[derive(Deserialize)]
#[serde(untagged)]
enum DomainSource {
    Explicit(OptionDomains),
    Dataset(Vec<DatasetRow>),
}

impl OptionDomains {
    /// Build domains from explicit categorical sets with the default
    /// numeric sets and ranges
    pub fn new(
        companies: Vec<String>,
        type_names: Vec<String>,
        cpu_brands: Vec<String>,
        gpu_brands: Vec<String>,
        operating_systems: Vec<String>,
    ) -> Result<Self, StartupError> {
        let domains = Self {
            companies: distinct(companies),
            type_names: distinct(type_names),
            cpu_brands: distinct(cpu_brands),
            gpu_brands: distinct(gpu_brands),
            operating_systems: distinct(operating_systems),
            ram_gb: default_ram_gb(),
            hdd_gb: default_hdd_gb(),
            ssd_gb: default_ssd_gb(),
            resolutions: default_resolutions(),
            weight_kg: default_weight_kg(),
            screen_size_inches: default_screen_size_inches(),
        };
        domains.validate()?;
        Ok(domains)
    }

    /// Derive the categorical sets from dataset rows, keeping the order in
    /// which values first appear
    pub fn from_rows(rows: &[DatasetRow]) -> Result<Self, StartupError> {
        Self::new(
            rows.iter().map(|r| r.company.clone()).collect(),
            rows.iter().map(|r| r.type_name.clone()).collect(),
            rows.iter().map(|r| r.cpu_brand.clone()).collect(),
            rows.iter().map(|r| r.gpu_brand.clone()).collect(),
            rows.iter().map(|r| r.os.clone()).collect(),
        )
    }

    /// Parse either an explicit domain document or an array of dataset rows
    pub fn from_json_str(json: &str) -> Result<Self, StartupError> {
        let source: DomainSource = serde_json::from_str(json)
            .map_err(|e| StartupError::Domains(format!("unrecognised document: {}", e)))?;

        match source {
            DomainSource::Explicit(mut domains) => {
                domains.companies = distinct(domains.companies);
                domains.type_names = distinct(domains.type_names);
                domains.cpu_brands = distinct(domains.cpu_brands);
                domains.gpu_brands = distinct(domains.gpu_brands);
                domains.operating_systems = distinct(domains.operating_systems);
                domains.validate()?;
                Ok(domains)
            }
            DomainSource::Dataset(rows) => Self::from_rows(&rows),
        }
    }

    /// Load the option-domain file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| StartupError::Io {
            what: "option domains",
            path: path.to_path_buf(),
            source,
        })?;
        let domains = Self::from_json_str(&content)?;

        info!(
            path = %path.display(),
            companies = domains.companies.len(),
            type_names = domains.type_names.len(),
            cpu_brands = domains.cpu_brands.len(),
            gpu_brands = domains.gpu_brands.len(),
            operating_systems = domains.operating_systems.len(),
            "Loaded option domains"
        );
        Ok(domains)
    }

    fn validate(&self) -> Result<(), StartupError> {
        let categorical: [(&str, usize); 5] = [
            ("companies", self.companies.len()),
            ("type_names", self.type_names.len()),
            ("cpu_brands", self.cpu_brands.len()),
            ("gpu_brands", self.gpu_brands.len()),
            ("operating_systems", self.operating_systems.len()),
        ];
        let numeric: [(&str, usize); 3] = [
            ("ram_gb", self.ram_gb.len()),
            ("hdd_gb", self.hdd_gb.len()),
            ("ssd_gb", self.ssd_gb.len()),
        ];
        for (name, len) in categorical.iter().chain(numeric.iter()) {
            if *len == 0 {
                return Err(StartupError::Domains(format!("{} is empty", name)));
            }
        }

        for (name, range) in [
            ("weight_kg", self.weight_kg),
            ("screen_size_inches", self.screen_size_inches),
        ] {
            if !(range.min.is_finite() && range.max.is_finite()) || range.min > range.max {
                return Err(StartupError::Domains(format!(
                    "{} range [{}, {}] is invalid",
                    name, range.min, range.max
                )));
            }
        }
        Ok(())
    }
}

/// Drop repeated values, keeping first occurrences in order
fn distinct(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
