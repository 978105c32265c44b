// 🔎 Lookup - read-side queries the enrollment form runs against the document

use crate::builder::{is_area_code, AreaCodeSet};
use crate::document::{kind_of, PersistedDocument, AREA_CODES_KEY, GEOGRAPHY_KEY};
use crate::errors::{PipelineError, PipelineResult};
use crate::normalizer::pad_zip;
use serde_json::Value;

// Current field name first, then the names older documents used
const ZIP_KEYS: [&str; 3] = ["ZipCode", "Zip Code", "zip"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneCheck {
    /// Fewer than 10 digits, not judged yet
    Incomplete,
    Valid { area_code: String },
    UnknownAreaCode { area_code: String },
}

/// In-memory view of a persisted document for lookups
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    geography: Vec<Value>,
    area_codes: AreaCodeSet,
}

impl DocumentIndex {
    pub fn from_document(document: PersistedDocument) -> PipelineResult<Self> {
        let (geography, codes) = match document {
            PersistedDocument::Empty => (Vec::new(), Vec::new()),
            PersistedDocument::LegacyList(list) => (list, Vec::new()),
            PersistedDocument::Structured(mut map) => {
                let geography = match map.remove(GEOGRAPHY_KEY) {
                    Some(Value::Array(list)) => list,
                    _ => Vec::new(),
                };
                let codes = match map.remove(AREA_CODES_KEY) {
                    Some(Value::Array(list)) => list,
                    _ => Vec::new(),
                };
                (geography, codes)
            }
            PersistedDocument::Unrecognized(value) => {
                return Err(PipelineError::UnrecognizedDocument {
                    found: kind_of(&value),
                })
            }
        };

        let mut area_codes = AreaCodeSet::new();
        for code in codes.iter().filter_map(Value::as_str) {
            area_codes.insert(code);
        }

        Ok(DocumentIndex { geography, area_codes })
    }

    pub fn geography_len(&self) -> usize {
        self.geography.len()
    }

    pub fn area_codes(&self) -> &AreaCodeSet {
        &self.area_codes
    }

    /// First geography entry for a ZIP. The query is trimmed and padded the
    /// same way the builder pads source zips.
    pub fn find_zip(&self, zip: &str) -> Option<&Value> {
        let (wanted, _) = pad_zip(zip);

        self.geography.iter().find(|entry| {
            ZIP_KEYS
                .iter()
                .find_map(|key| entry.get(*key).and_then(Value::as_str))
                .is_some_and(|z| z == wanted)
        })
    }

    /// Judge a phone number by its area code: the first three digits.
    /// A leading country code is not stripped, so `1-617-555-0100` is
    /// judged by `161`.
    pub fn check_phone(&self, phone: &str) -> PhoneCheck {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

        if digits.len() < 10 {
            return PhoneCheck::Incomplete;
        }

        let area_code = digits[..3].to_string();
        if is_area_code(&area_code) && self.area_codes.contains(&area_code) {
            PhoneCheck::Valid { area_code }
        } else {
            PhoneCheck::UnknownAreaCode { area_code }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(content: &str) -> DocumentIndex {
        DocumentIndex::from_document(PersistedDocument::parse(Some(content)).unwrap()).unwrap()
    }

    #[test]
    fn test_find_zip_pads_query() {
        let idx = index(
            r#"{"geography": [
                {"ZipCode": "02134", "City": "Boston", "State": "MA"},
                {"ZipCode": "02134", "City": "Allston", "State": "MA"}
            ], "area_codes": ["617"]}"#,
        );

        let hit = idx.find_zip(" 2134").unwrap();
        assert_eq!(hit["City"], "Boston", "First match wins");
        assert!(idx.find_zip("99999").is_none());
        assert_eq!(idx.geography_len(), 2);
    }

    #[test]
    fn test_find_zip_in_legacy_list() {
        let idx = index(r#"[{"zip": "00501", "city": "Holtsville", "state": "New York"}]"#);

        assert_eq!(idx.find_zip("501").unwrap()["city"], "Holtsville");
        assert!(idx.area_codes().is_empty());
    }

    #[test]
    fn test_check_phone() {
        let idx = index(r#"{"geography": [], "area_codes": ["617", "212", "bogus"]}"#);

        assert_eq!(idx.area_codes().len(), 2);
        assert_eq!(idx.check_phone("(617) 55"), PhoneCheck::Incomplete);
        assert_eq!(
            idx.check_phone("(617) 555-0100"),
            PhoneCheck::Valid { area_code: "617".to_string() }
        );
        assert_eq!(
            idx.check_phone("999-555-0100"),
            PhoneCheck::UnknownAreaCode { area_code: "999".to_string() }
        );
    }

    #[test]
    fn test_check_phone_country_code_not_stripped() {
        let idx = index(r#"{"geography": [], "area_codes": ["617"]}"#);

        assert_eq!(
            idx.check_phone("1-617-555-0100"),
            PhoneCheck::UnknownAreaCode { area_code: "161".to_string() }
        );
    }

    #[test]
    fn test_unrecognized_document() {
        let doc = PersistedDocument::parse(Some("7")).unwrap();
        assert!(DocumentIndex::from_document(doc).is_err());
    }
}
