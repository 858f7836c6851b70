/// Fix-up table: field names whose XSD-derived validation is replaced by a
/// fixed pattern.
///
/// The table is plain data. It ships with the corrections needed for the
/// NCTS/AES message schemas and can be replaced by a JSON file of the form
/// `{"n1:Field": {"pattern": "..."}, "n1:Other": {"anyOf": ["...", "..."]}}`.
use crate::error::RewriteError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

const LATITUDE: &str = r"^[+-]?([0-8]?[0-9]\.[0-9]{5,7}|90.000000?0?)$";
const LONGITUDE: &str = r"^[+-]?((0?[0-9]?|1[0-7])[0-9]\.[0-9]{5,7}|180.000000?0?)$";
const GRN: &str = r"^([0-9]{2,2}[A-Z]{2,2}[0-9A-Z]{12,12}[0-9]([A-Z][0-9]{6,6})?)";
const MRN_LEGACY: &str = r"^([0-1][0-9]|[2][0-4])[A-Z]{2}[A-Z0-9]{13}[0-9]$";
const MRN_AES: &str = r"^([2][4-9]|[3-9][0-9])[A-Z]{2}[A-Z0-9]{12}[A-E][0-9]$";
const MRN_NCTS: &str = r"^([2][4-9]|[3-9][0-9])[A-Z]{2}[A-Z0-9]{12}[J-M][0-9]$";

/// Replacement content for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Correction {
    /// `{"pattern": re}`
    Pattern(String),
    /// `{"anyOf": [{"pattern": re1}, {"pattern": re2}, ...]}`
    AnyOf(Vec<String>),
}

impl Correction {
    /// The schema node that replaces the field's previous content.
    pub fn to_value(&self) -> Value {
        match self {
            Correction::Pattern(re) => json!({ "pattern": re }),
            Correction::AnyOf(res) => {
                let alternatives: Vec<Value> =
                    res.iter().map(|re| json!({ "pattern": re })).collect();
                json!({ "anyOf": alternatives })
            }
        }
    }

    fn patterns(&self) -> &[String] {
        match self {
            Correction::Pattern(re) => std::slice::from_ref(re),
            Correction::AnyOf(res) => res,
        }
    }
}

/// Field name -> correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixupTable {
    entries: BTreeMap<String, Correction>,
}

impl FixupTable {
    /// A table with no corrections.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The corrections used for the NCTS/AES schema set.
    pub fn builtin() -> Self {
        let lat = || Correction::Pattern(LATITUDE.into());
        let lon = || Correction::Pattern(LONGITUDE.into());
        let aes_mrn = || Correction::AnyOf(vec![MRN_LEGACY.into(), MRN_AES.into()]);
        let mrn = || Correction::AnyOf(vec![MRN_LEGACY.into(), MRN_NCTS.into()]);

        Self::empty()
            .with("n1:GNSSLatitude", lat())
            .with("n1:GNSSLongitude", lon())
            .with("n1:LatitudeContentType", lat())
            .with("n1:LongitudeContentType", lon())
            .with("n1:GRNType", Correction::AnyOf(vec![GRN.into()]))
            .with("n1:MRNContentType03", aes_mrn())
            .with("n1:AES-P1_MRNType", aes_mrn())
            .with("n1:MRNContentType04", mrn())
            .with("n1:MrnContentType05", mrn())
            .with("n1:MRNType", mrn())
            .with("n1:NCTS-P5_MRNType", mrn())
    }

    /// Add or replace one entry.
    pub fn with(mut self, field: impl Into<String>, correction: Correction) -> Self {
        self.entries.insert(field.into(), correction);
        self
    }

    /// Parse a table from JSON text and check every pattern compiles.
    pub fn from_json_str(text: &str) -> Result<Self, RewriteError> {
        let table: FixupTable = serde_json::from_str(text).map_err(RewriteError::FixupTable)?;
        table.validate()?;
        Ok(table)
    }

    /// Load a table from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, RewriteError> {
        let text = std::fs::read_to_string(path).map_err(|source| RewriteError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Reject entries whose patterns are not valid regular expressions.
    pub fn validate(&self) -> Result<(), RewriteError> {
        for (field, correction) in &self.entries {
            for re in correction.patterns() {
                Regex::new(re).map_err(|source| RewriteError::FixupPattern {
                    field: field.clone(),
                    source,
                })?;
            }
        }
        Ok(())
    }

    pub fn get(&self, field: &str) -> Option<&Correction> {
        self.entries.get(field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overwrite every recognised field of `node` with its correction.
    /// Returns the names of the fields that were replaced.
    pub fn apply(&self, node: &mut Map<String, Value>) -> Vec<String> {
        let mut fixed = Vec::new();
        for (field, value) in node.iter_mut() {
            if let Some(correction) = self.entries.get(field) {
                *value = correction.to_value();
                fixed.push(field.clone());
            }
        }
        fixed
    }
}

impl Default for FixupTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_table_is_valid() {
        let table = FixupTable::builtin();
        assert_eq!(table.len(), 11);
        table.validate().unwrap();
    }

    #[test]
    fn test_pattern_to_value() {
        let c = Correction::Pattern("^a$".into());
        assert_eq!(c.to_value(), json!({"pattern": "^a$"}));
    }

    #[test]
    fn test_any_of_to_value() {
        let c = Correction::AnyOf(vec!["^a$".into(), "^b$".into()]);
        assert_eq!(
            c.to_value(),
            json!({"anyOf": [{"pattern": "^a$"}, {"pattern": "^b$"}]})
        );
    }

    #[test]
    fn test_apply_replaces_whole_value() {
        let table = FixupTable::builtin();
        let mut node = json!({
            "n1:GNSSLatitude": {"type": "string", "pattern": "old", "maxLength": 17},
            "n1:Other": {"type": "string"}
        });
        let fixed = table.apply(node.as_object_mut().unwrap());
        assert_eq!(fixed, vec!["n1:GNSSLatitude".to_string()]);
        assert_eq!(node["n1:GNSSLatitude"], json!({"pattern": LATITUDE}));
        assert_eq!(node["n1:Other"], json!({"type": "string"}));
    }

    #[test]
    fn test_apply_overwrites_non_object_value() {
        let table = FixupTable::builtin();
        let mut node = json!({"n1:MRNType": "not a schema"});
        table.apply(node.as_object_mut().unwrap());
        assert_eq!(
            node["n1:MRNType"],
            json!({"anyOf": [{"pattern": MRN_LEGACY}, {"pattern": MRN_NCTS}]})
        );
    }

    #[test]
    fn test_aes_and_ncts_variants_differ() {
        let table = FixupTable::builtin();
        assert_ne!(
            table.get("n1:AES-P1_MRNType"),
            table.get("n1:NCTS-P5_MRNType")
        );
    }

    #[test]
    fn test_from_json_str() {
        let table = FixupTable::from_json_str(
            r#"{"n1:Code": {"pattern": "^[0-9]{4}$"}, "n1:Ref": {"anyOf": ["^A", "^B"]}}"#,
        )
        .unwrap();
        assert_eq!(
            table.get("n1:Code"),
            Some(&Correction::Pattern("^[0-9]{4}$".into()))
        );
        assert_eq!(
            table.get("n1:Ref"),
            Some(&Correction::AnyOf(vec!["^A".into(), "^B".into()]))
        );
    }

    #[test]
    fn test_reject_unknown_correction_kind() {
        let err = FixupTable::from_json_str(r#"{"n1:Code": {"format": "date"}}"#);
        assert!(matches!(err, Err(RewriteError::FixupTable(_))));
    }

    #[test]
    fn test_reject_non_object_table() {
        let err = FixupTable::from_json_str(r#"["n1:Code"]"#);
        assert!(matches!(err, Err(RewriteError::FixupTable(_))));
    }

    #[test]
    fn test_reject_bad_pattern() {
        let err = FixupTable::from_json_str(r#"{"n1:Code": {"anyOf": ["^ok$", "(unclosed"]}}"#);
        match err {
            Err(RewriteError::FixupPattern { field, .. }) => assert_eq!(field, "n1:Code"),
            other => panic!("expected FixupPattern, got {other:?}"),
        }
    }

    #[test]
    fn test_shipped_config_matches_builtin() {
        let shipped = include_str!("../../config/fixups.default.json");
        assert_eq!(
            FixupTable::from_json_str(shipped).unwrap(),
            FixupTable::builtin()
        );
    }
}
