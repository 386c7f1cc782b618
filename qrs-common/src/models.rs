//! Persisted data model
//!
//! Field names on disk follow the existing data files (`productName`,
//! `productValue`, `qrcode`, `date`), so stores written by earlier station
//! software stay readable.

use serde::{Deserialize, Serialize};

/// One observed barcode event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Display label of the scan target at capture time
    #[serde(rename = "productName")]
    pub target_name: String,
    /// Stable identifier of the scan target
    #[serde(rename = "productValue")]
    pub target_id: String,
    /// Scanned barcode
    #[serde(rename = "qrcode")]
    pub code: String,
    /// Capture instant, epoch milliseconds
    #[serde(rename = "date")]
    pub timestamp: i64,
}

impl ScanRecord {
    pub fn new(
        target_name: impl Into<String>,
        target_id: impl Into<String>,
        code: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            target_name: target_name.into(),
            target_id: target_id.into(),
            code: code.into(),
            timestamp,
        }
    }
}

/// Item or station being scanned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "productName")]
    pub product_name: String,
    #[serde(rename = "productValue")]
    pub product_value: String,
    /// Pattern scanned codes must match, if any
    #[serde(rename = "scanRule", default, skip_serializing_if = "Option::is_none")]
    pub scan_rule: Option<String>,
}

/// Named code pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "ruleName")]
    pub rule_name: String,
    #[serde(rename = "ruleValue")]
    pub rule_value: String,
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_record_uses_legacy_field_names() {
        let record = ScanRecord::new("Valve", "valve", "1234567W1234567890", 1_710_000_000_000);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["productName"], "Valve");
        assert_eq!(json["productValue"], "valve");
        assert_eq!(json["qrcode"], "1234567W1234567890");
        assert_eq!(json["date"], 1_710_000_000_000i64);
    }

    #[test]
    fn test_product_without_rule_parses() {
        let product: Product =
            serde_json::from_str(r#"{"productName":"Valve","productValue":"valve"}"#).unwrap();
        assert_eq!(product.scan_rule, None);
        let json = serde_json::to_string(&product).unwrap();
        assert!(!json.contains("scanRule"));
    }

    #[test]
    fn test_rule_default_flag_is_optional() {
        let rule: Rule =
            serde_json::from_str(r#"{"ruleName":"Any","ruleValue":".*"}"#).unwrap();
        assert!(!rule.is_default);
    }
}
