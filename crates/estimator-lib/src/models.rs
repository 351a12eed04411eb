//! Core data models for the price estimator

use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};

/// Training-time column names, in the order the pipeline consumes them
pub const FEATURE_COLUMNS: [&str; 12] = [
    "Company",
    "TypeName",
    "Ram",
    "Weight",
    "Touchscreen",
    "Ips",
    "ppi",
    "Cpu brand",
    "HDD",
    "SSD",
    "Gpu brand",
    "os",
];

/// A yes/no selection, either a JSON boolean or the "Yes"/"No" form strings.
///
/// Any other JSON value is kept as-is so the encoder can reject it as a
/// domain error for its field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagInput {
    Bool(bool),
    Text(String),
    Other(serde_json::Value),
}

impl From<bool> for FlagInput {
    fn from(value: bool) -> Self {
        FlagInput::Bool(value)
    }
}

impl From<&str> for FlagInput {
    fn from(value: &str) -> Self {
        FlagInput::Text(value.to_string())
    }
}

/// Laptop specification as chosen by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSpecInput {
    pub company: String,
    pub type_name: String,
    #[serde(rename = "ramGB")]
    pub ram_gb: u32,
    pub weight_kg: f64,
    pub touchscreen: FlagInput,
    pub ips_display: FlagInput,
    pub screen_size_inches: f64,
    pub resolution: String,
    pub cpu_brand: String,
    #[serde(rename = "hddGB")]
    pub hdd_gb: u32,
    #[serde(rename = "ssdGB")]
    pub ssd_gb: u32,
    pub gpu_brand: String,
    pub operating_system: String,
}

/// Feature record in the exact schema the pipeline was trained on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalFeatureRecord {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "TypeName")]
    pub type_name: String,
    #[serde(rename = "Ram")]
    pub ram: u32,
    #[serde(rename = "Weight")]
    pub weight: f64,
    #[serde(rename = "Touchscreen")]
    pub touchscreen: u8,
    #[serde(rename = "Ips")]
    pub ips: u8,
    pub ppi: f64,
    #[serde(rename = "Cpu brand")]
    pub cpu_brand: String,
    #[serde(rename = "HDD")]
    pub hdd: u32,
    #[serde(rename = "SSD")]
    pub ssd: u32,
    #[serde(rename = "Gpu brand")]
    pub gpu_brand: String,
    #[serde(rename = "os")]
    pub os: String,
}

/// A single cell of the record as handed to the pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<'a> {
    Categorical(&'a str),
    Numeric(f64),
}

impl CanonicalFeatureRecord {
    /// Cells paired with their column names, in `FEATURE_COLUMNS` order
    pub fn columns(&self) -> [(&'static str, FeatureValue<'_>); 12] {
        use FeatureValue::{Categorical, Numeric};
        [
            (FEATURE_COLUMNS[0], Categorical(&self.company)),
            (FEATURE_COLUMNS[1], Categorical(&self.type_name)),
            (FEATURE_COLUMNS[2], Numeric(self.ram as f64)),
            (FEATURE_COLUMNS[3], Numeric(self.weight)),
            (FEATURE_COLUMNS[4], Numeric(self.touchscreen as f64)),
            (FEATURE_COLUMNS[5], Numeric(self.ips as f64)),
            (FEATURE_COLUMNS[6], Numeric(self.ppi)),
            (FEATURE_COLUMNS[7], Categorical(&self.cpu_brand)),
            (FEATURE_COLUMNS[8], Numeric(self.hdd as f64)),
            (FEATURE_COLUMNS[9], Numeric(self.ssd as f64)),
            (FEATURE_COLUMNS[10], Categorical(&self.gpu_brand)),
            (FEATURE_COLUMNS[11], Categorical(&self.os)),
        ]
    }
}

/// Decoded price in currency units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub value: f64,
}

/// Result of the caller-facing estimate function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ppi_was_defaulted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl EstimateResponse {
    pub fn success(price_value: f64, ppi_was_defaulted: bool) -> Self {
        Self {
            ok: true,
            price_value: Some(price_value),
            ppi_was_defaulted: Some(ppi_was_defaulted),
            error_kind: None,
            message: None,
        }
    }

    pub fn failure(error_kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            price_value: None,
            ppi_was_defaulted: None,
            error_kind: Some(error_kind),
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> CanonicalFeatureRecord {
        CanonicalFeatureRecord {
            company: "Dell".to_string(),
            type_name: "Notebook".to_string(),
            ram: 8,
            weight: 2.1,
            touchscreen: 0,
            ips: 1,
            ppi: 141.2,
            cpu_brand: "Intel Core i5".to_string(),
            hdd: 0,
            ssd: 256,
            gpu_brand: "Intel".to_string(),
            os: "Windows".to_string(),
        }
    }

    #[test]
    fn test_record_serializes_with_training_column_names() {
        let value = serde_json::to_value(sample_record()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), FEATURE_COLUMNS.len());
        for column in FEATURE_COLUMNS {
            assert!(object.contains_key(column), "missing column {}", column);
        }
        assert_eq!(value["Cpu brand"], "Intel Core i5");
        assert_eq!(value["os"], "Windows");
    }

    #[test]
    fn test_columns_follow_pipeline_order() {
        let record = sample_record();
        let names: Vec<&str> = record.columns().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, FEATURE_COLUMNS.to_vec());
        assert_eq!(record.columns()[5].1, FeatureValue::Numeric(1.0));
        assert_eq!(record.columns()[7].1, FeatureValue::Categorical("Intel Core i5"));
    }

    #[test]
    fn test_raw_input_accepts_booleans_and_form_strings() {
        let json = r#"{
            "company": "Dell", "typeName": "Notebook", "ramGB": 8, "weightKg": 2.1,
            "touchscreen": false, "ipsDisplay": "Yes", "screenSizeInches": 15.6,
            "resolution": "1920x1080", "cpuBrand": "Intel Core i5", "hddGB": 0,
            "ssdGB": 256, "gpuBrand": "Intel", "operatingSystem": "Windows"
        }"#;
        let raw: RawSpecInput = serde_json::from_str(json).unwrap();
        assert_eq!(raw.touchscreen, FlagInput::Bool(false));
        assert_eq!(raw.ips_display, FlagInput::Text("Yes".to_string()));
        assert_eq!(raw.ram_gb, 8);
        assert_eq!(raw.ssd_gb, 256);
    }

    #[test]
    fn test_raw_input_keeps_unexpected_flag_values() {
        let raw: FlagInput = serde_json::from_str("1").unwrap();
        assert_eq!(raw, FlagInput::Other(serde_json::json!(1)));
        let raw: FlagInput = serde_json::from_str("null").unwrap();
        assert_eq!(raw, FlagInput::Other(serde_json::Value::Null));
    }

    #[test]
    fn test_response_shapes() {
        let ok = serde_json::to_value(EstimateResponse::success(1234.5, true)).unwrap();
        assert_eq!(ok["ok"], true);
        assert_eq!(ok["priceValue"], 1234.5);
        assert_eq!(ok["ppiWasDefaulted"], true);
        assert!(ok.get("errorKind").is_none());

        let failed = serde_json::to_value(EstimateResponse::failure(
            ErrorKind::DomainError,
            "Company: rejected",
        ))
        .unwrap();
        assert_eq!(failed["ok"], false);
        assert_eq!(failed["errorKind"], "DomainError");
        assert_eq!(failed["message"], "Company: rejected");
        assert!(failed.get("priceValue").is_none());
    }
}
