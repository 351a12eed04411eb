//! Feature encoding for pipeline inference
//!
//! Maps the raw specification chosen by the user onto the record the
//! pipeline was trained on: enumerated fields are validated against the
//! option domains, yes/no flags become 0/1 and the display density (PPI) is
//! derived from resolution and screen diagonal.

use crate::domains::OptionDomains;
use crate::error::EstimateError;
use crate::models::{CanonicalFeatureRecord, FlagInput, RawSpecInput};
use std::fmt::Display;
use std::sync::Arc;
use tracing::debug;

/// PPI used when it cannot be derived from the input
pub const PPI_SENTINEL: f64 = 0.0;

/// Derived PPI and whether the sentinel was substituted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PpiOutcome {
    pub value: f64,
    pub defaulted: bool,
}

impl PpiOutcome {
    fn computed(value: f64) -> Self {
        Self {
            value,
            defaulted: false,
        }
    }

    fn sentinel() -> Self {
        Self {
            value: PPI_SENTINEL,
            defaulted: true,
        }
    }
}

/// Output of a successful encode
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatures {
    pub record: CanonicalFeatureRecord,
    pub ppi_defaulted: bool,
}

/// Encodes raw specifications against a fixed set of option domains
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    domains: Arc<OptionDomains>,
}

impl FeatureEncoder {
    pub fn new(domains: Arc<OptionDomains>) -> Self {
        Self { domains }
    }

    pub fn domains(&self) -> &OptionDomains {
        &self.domains
    }

    /// Validate every field and build the canonical record.
    ///
    /// Fields are checked in pipeline column order and the first failure is
    /// returned; nothing is produced for a partially valid input.
    pub fn encode(&self, raw: &RawSpecInput) -> Result<EncodedFeatures, EstimateError> {
        let d = &self.domains;

        validate_domain("Company", raw.company.as_str(), &d.companies)?;
        validate_domain("TypeName", raw.type_name.as_str(), &d.type_names)?;
        validate_domain("Ram", &raw.ram_gb, &d.ram_gb)?;
        if !d.weight_kg.contains(raw.weight_kg) {
            return Err(EstimateError::domain(
                "Weight",
                format!(
                    "{} kg is outside [{}, {}]",
                    raw.weight_kg, d.weight_kg.min, d.weight_kg.max
                ),
            ));
        }
        let touchscreen = encode_boolean("Touchscreen", &raw.touchscreen)?;
        let ips = encode_boolean("Ips", &raw.ips_display)?;
        if !d.screen_size_inches.contains(raw.screen_size_inches) {
            return Err(EstimateError::domain(
                "ScreenSize",
                format!(
                    "{} inches is outside [{}, {}]",
                    raw.screen_size_inches, d.screen_size_inches.min, d.screen_size_inches.max
                ),
            ));
        }
        validate_domain("Cpu brand", raw.cpu_brand.as_str(), &d.cpu_brands)?;
        validate_domain("HDD", &raw.hdd_gb, &d.hdd_gb)?;
        validate_domain("SSD", &raw.ssd_gb, &d.ssd_gb)?;
        validate_domain("Gpu brand", raw.gpu_brand.as_str(), &d.gpu_brands)?;
        validate_domain("os", raw.operating_system.as_str(), &d.operating_systems)?;

        let ppi = compute_ppi(&raw.resolution, raw.screen_size_inches);
        if ppi.defaulted {
            debug!(
                resolution = %raw.resolution,
                screen_size_inches = raw.screen_size_inches,
                "PPI could not be derived, using sentinel"
            );
        }

        Ok(EncodedFeatures {
            record: CanonicalFeatureRecord {
                company: raw.company.clone(),
                type_name: raw.type_name.clone(),
                ram: raw.ram_gb,
                weight: raw.weight_kg,
                touchscreen,
                ips,
                ppi: ppi.value,
                cpu_brand: raw.cpu_brand.clone(),
                hdd: raw.hdd_gb,
                ssd: raw.ssd_gb,
                gpu_brand: raw.gpu_brand.clone(),
                os: raw.operating_system.clone(),
            },
            ppi_defaulted: ppi.defaulted,
        })
    }
}

/// Fail with a domain error unless `value` is one of `allowed`
pub fn validate_domain<T, U>(
    field: &'static str,
    value: &T,
    allowed: &[U],
) -> Result<(), EstimateError>
where
    T: Display + ?Sized,
    U: PartialEq<T>,
{
    if allowed.iter().any(|candidate| candidate == value) {
        Ok(())
    } else {
        Err(EstimateError::domain(
            field,
            format!("'{}' is not one of the {} known values", value, allowed.len()),
        ))
    }
}

/// Encode a yes/no flag as 0/1
pub fn encode_boolean(field: &'static str, flag: &FlagInput) -> Result<u8, EstimateError> {
    match flag {
        FlagInput::Bool(true) => Ok(1),
        FlagInput::Bool(false) => Ok(0),
        FlagInput::Text(text) if text == "Yes" => Ok(1),
        FlagInput::Text(text) if text == "No" => Ok(0),
        FlagInput::Text(text) => Err(EstimateError::domain(
            field,
            format!("'{}' is not one of Yes/No", text),
        )),
        FlagInput::Other(value) => Err(EstimateError::domain(
            field,
            format!("{} is not a boolean or one of Yes/No", value),
        )),
    }
}

/// Split a "WxH" resolution into positive width and height
pub fn parse_resolution(resolution: &str) -> Option<(u32, u32)> {
    let mut parts = resolution.split('x');
    let width = parts.next()?.trim().parse::<u32>().ok()?;
    let height = parts.next()?.trim().parse::<u32>().ok()?;
    if parts.next().is_some() || width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

/// Pixels per inch along the diagonal.
///
/// Never fails: an unparseable resolution or a non-positive screen size
/// yields `PPI_SENTINEL` with `defaulted` set. `FeatureEncoder::encode`
/// range-checks the size first, so only the resolution can trigger the
/// sentinel there; the size branch applies to direct calls.
pub fn compute_ppi(resolution: &str, screen_size_inches: f64) -> PpiOutcome {
    if !(screen_size_inches.is_finite() && screen_size_inches > 0.0) {
        return PpiOutcome::sentinel();
    }
    match parse_resolution(resolution) {
        Some((width, height)) => {
            let diagonal = (width as f64).hypot(height as f64);
            PpiOutcome::computed(diagonal / screen_size_inches)
        }
        None => PpiOutcome::sentinel(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FEATURE_COLUMNS;

    fn test_domains() -> Arc<OptionDomains> {
        Arc::new(
            OptionDomains::new(
                vec!["Dell".into(), "Apple".into(), "HP".into()],
                vec!["Notebook".into(), "Ultrabook".into()],
                vec!["Intel Core i5".into(), "AMD Processor".into()],
                vec!["Intel".into(), "Nvidia".into()],
                vec!["Windows".into(), "Mac".into()],
            )
            .unwrap(),
        )
    }

    fn dell_notebook() -> RawSpecInput {
        RawSpecInput {
            company: "Dell".to_string(),
            type_name: "Notebook".to_string(),
            ram_gb: 8,
            weight_kg: 2.1,
            touchscreen: FlagInput::Bool(false),
            ips_display: FlagInput::Bool(false),
            screen_size_inches: 15.6,
            resolution: "1920x1080".to_string(),
            cpu_brand: "Intel Core i5".to_string(),
            hdd_gb: 0,
            ssd_gb: 256,
            gpu_brand: "Intel".to_string(),
            operating_system: "Windows".to_string(),
        }
    }

    #[test]
    fn test_ppi_full_hd_13_inch() {
        let ppi = compute_ppi("1920x1080", 13.0);
        assert!(!ppi.defaulted);
        let expected = (1920f64.powi(2) + 1080f64.powi(2)).sqrt() / 13.0;
        assert!((ppi.value - expected).abs() < 1e-9);
        assert!((ppi.value - 169.5).abs() < 0.1, "ppi was {}", ppi.value);
    }

    #[test]
    fn test_ppi_sentinel_on_bad_input() {
        for (resolution, size) in [
            ("bad", 13.0),
            ("1920x1080", 0.0),
            ("1920x1080", -15.6),
            ("1920x1080", f64::NAN),
            ("1920*1080", 13.0),
            ("1920x1080x2", 13.0),
            ("0x1080", 13.0),
            ("axb", 13.0),
            ("", 13.0),
        ] {
            let ppi = compute_ppi(resolution, size);
            assert!(ppi.defaulted, "{} @ {} should default", resolution, size);
            assert_eq!(ppi.value, PPI_SENTINEL);
        }
    }

    #[test]
    fn test_parse_resolution_tolerates_whitespace() {
        assert_eq!(parse_resolution(" 1366 x 768 "), Some((1366, 768)));
        assert_eq!(parse_resolution("1366X768"), None);
    }

    #[test]
    fn test_encode_boolean() {
        assert_eq!(encode_boolean("Touchscreen", &"Yes".into()).unwrap(), 1);
        assert_eq!(encode_boolean("Touchscreen", &"No".into()).unwrap(), 0);
        assert_eq!(encode_boolean("Ips", &true.into()).unwrap(), 1);
        assert_eq!(encode_boolean("Ips", &false.into()).unwrap(), 0);

        for bad in ["yes", "Y", "1", "true", ""] {
            let err = encode_boolean("Ips", &bad.into()).unwrap_err();
            assert_eq!(err.field(), Some("Ips"), "{:?} should be rejected", bad);
        }

        for bad in [serde_json::json!(1), serde_json::Value::Null, serde_json::json!([true])] {
            let err = encode_boolean("Touchscreen", &FlagInput::Other(bad)).unwrap_err();
            assert_eq!(err.field(), Some("Touchscreen"));
        }
    }

    #[test]
    fn test_validate_domain() {
        let allowed = vec!["Intel".to_string(), "AMD".to_string()];
        assert!(validate_domain("Gpu brand", "AMD", &allowed).is_ok());
        let err = validate_domain("Gpu brand", "Matrox", &allowed).unwrap_err();
        assert_eq!(err.field(), Some("Gpu brand"));
        assert!(err.to_string().contains("'Matrox'"));

        assert!(validate_domain("Ram", &16u32, &[8u32, 16]).is_ok());
        assert!(validate_domain("Ram", &3u32, &[8u32, 16]).is_err());
    }

    #[test]
    fn test_encode_end_to_end_record() {
        let encoder = FeatureEncoder::new(test_domains());
        let encoded = encoder.encode(&dell_notebook()).unwrap();
        let record = &encoded.record;

        assert!(!encoded.ppi_defaulted);
        assert!((record.ppi - 141.21).abs() < 0.01, "ppi was {}", record.ppi);
        assert_eq!(record.company, "Dell");
        assert_eq!(record.type_name, "Notebook");
        assert_eq!(record.ram, 8);
        assert_eq!(record.weight, 2.1);
        assert_eq!(record.touchscreen, 0);
        assert_eq!(record.ips, 0);
        assert_eq!(record.cpu_brand, "Intel Core i5");
        assert_eq!(record.hdd, 0);
        assert_eq!(record.ssd, 256);
        assert_eq!(record.gpu_brand, "Intel");
        assert_eq!(record.os, "Windows");
    }

    #[test]
    fn test_encode_flags_from_form_strings() {
        let encoder = FeatureEncoder::new(test_domains());
        let mut raw = dell_notebook();
        raw.touchscreen = "Yes".into();
        raw.ips_display = "No".into();
        let record = encoder.encode(&raw).unwrap().record;
        assert_eq!(record.touchscreen, 1);
        assert_eq!(record.ips, 0);
    }

    #[test]
    fn test_encode_keeps_going_with_defaulted_ppi() {
        let encoder = FeatureEncoder::new(test_domains());
        let mut raw = dell_notebook();
        raw.resolution = "full-hd".to_string();
        let encoded = encoder.encode(&raw).unwrap();
        assert!(encoded.ppi_defaulted);
        assert_eq!(encoded.record.ppi, PPI_SENTINEL);
    }

    #[test]
    fn test_encode_rejects_each_field_out_of_domain() {
        let encoder = FeatureEncoder::new(test_domains());
        let cases: Vec<(&str, Box<dyn Fn(&mut RawSpecInput)>)> = vec![
            ("Company", Box::new(|r: &mut RawSpecInput| r.company = "UnknownBrand".into())),
            ("TypeName", Box::new(|r: &mut RawSpecInput| r.type_name = "Tablet".into())),
            ("Ram", Box::new(|r: &mut RawSpecInput| r.ram_gb = 3)),
            ("Weight", Box::new(|r: &mut RawSpecInput| r.weight_kg = 12.5)),
            ("Touchscreen", Box::new(|r: &mut RawSpecInput| r.touchscreen = "Maybe".into())),
            ("Ips", Box::new(|r: &mut RawSpecInput| r.ips_display = "yes".into())),
            ("ScreenSize", Box::new(|r: &mut RawSpecInput| r.screen_size_inches = 21.0)),
            ("Cpu brand", Box::new(|r: &mut RawSpecInput| r.cpu_brand = "Intel Core i9".into())),
            ("HDD", Box::new(|r: &mut RawSpecInput| r.hdd_gb = 300)),
            ("SSD", Box::new(|r: &mut RawSpecInput| r.ssd_gb = 2048)),
            ("Gpu brand", Box::new(|r: &mut RawSpecInput| r.gpu_brand = "Matrox".into())),
            ("os", Box::new(|r: &mut RawSpecInput| r.operating_system = "BeOS".into())),
        ];

        for (field, mutate) in cases {
            let mut raw = dell_notebook();
            mutate(&mut raw);
            let err = encoder.encode(&raw).unwrap_err();
            assert_eq!(err.field(), Some(field));
            assert!(err.to_string().starts_with(field));
        }
    }

    #[test]
    fn test_encode_accepts_every_domain_value() {
        let domains = test_domains();
        let encoder = FeatureEncoder::new(domains.clone());

        for company in &domains.companies {
            let mut raw = dell_notebook();
            raw.company = company.clone();
            assert!(encoder.encode(&raw).is_ok());
        }
        for ram in &domains.ram_gb {
            let mut raw = dell_notebook();
            raw.ram_gb = *ram;
            assert!(encoder.encode(&raw).is_ok());
        }
        for hdd in &domains.hdd_gb {
            let mut raw = dell_notebook();
            raw.hdd_gb = *hdd;
            assert!(encoder.encode(&raw).is_ok());
        }
        for ssd in &domains.ssd_gb {
            let mut raw = dell_notebook();
            raw.ssd_gb = *ssd;
            assert!(encoder.encode(&raw).is_ok());
        }
        for os in &domains.operating_systems {
            let mut raw = dell_notebook();
            raw.operating_system = os.clone();
            assert!(encoder.encode(&raw).is_ok());
        }
    }

    #[test]
    fn test_first_invalid_field_wins() {
        let encoder = FeatureEncoder::new(test_domains());
        let mut raw = dell_notebook();
        raw.gpu_brand = "Matrox".into();
        raw.company = "UnknownBrand".into();
        let err = encoder.encode(&raw).unwrap_err();
        assert_eq!(err.field(), Some(FEATURE_COLUMNS[0]));
    }
}
