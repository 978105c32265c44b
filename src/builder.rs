// 🧱 Dataset Builder - raw rows → canonical geography + area codes
// Best effort: malformed rows are counted and skipped, never fatal.

use crate::normalizer::{normalize_row_detailed, GeographyRecord, ZipStatus};
use crate::parser::{area_code_rows, geography_rows, RawAreaCodeRow, RawGeographyRow, RowSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

// ============================================================================
// AREA CODE SET
// ============================================================================

/// Deduplicated 3-digit area codes, iterated (and serialized) ascending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct AreaCodeSet {
    codes: BTreeSet<String>,
}

pub fn is_area_code(value: &str) -> bool {
    value.len() == 3 && value.bytes().all(|b| b.is_ascii_digit())
}

impl AreaCodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a code. Returns false for duplicates and for anything that is
    /// not exactly 3 decimal digits.
    pub fn insert(&mut self, code: &str) -> bool {
        if !is_area_code(code) {
            return false;
        }
        self.codes.insert(code.to_string())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn to_sorted_vec(&self) -> Vec<String> {
        self.codes.iter().cloned().collect()
    }
}

impl TryFrom<Vec<String>> for AreaCodeSet {
    type Error = String;

    fn try_from(codes: Vec<String>) -> Result<Self, Self::Error> {
        let mut set = AreaCodeSet::new();
        for code in codes {
            if !is_area_code(&code) {
                return Err(format!("invalid area code: {:?}", code));
            }
            set.insert(&code);
        }
        Ok(set)
    }
}

impl From<AreaCodeSet> for Vec<String> {
    fn from(set: AreaCodeSet) -> Self {
        set.codes.into_iter().collect()
    }
}

// ============================================================================
// BUILD REPORT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub geography_rows: usize,
    pub unresolved_states: usize,
    pub padded_zips: usize,
    pub overlong_zips: usize,
    pub area_code_rows: usize,
    pub header_skipped: bool,
    pub area_code_rows_rejected: usize,
    pub unique_area_codes: usize,
    pub decode_errors: usize,
}

impl BuildReport {
    pub fn summary(&self) -> String {
        format!(
            "Geography rows: {} ({} unresolved states, {} padded zips), area codes: {} unique from {} rows ({} rejected)",
            self.geography_rows,
            self.unresolved_states,
            self.padded_zips,
            self.unique_area_codes,
            self.area_code_rows,
            self.area_code_rows_rejected,
        )
    }
}

// ============================================================================
// CANONICAL DATASET
// ============================================================================

/// The freshly built sections of the canonical document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalDataset {
    /// Input row order, duplicates preserved
    pub geography: Vec<GeographyRecord>,
    pub area_codes: AreaCodeSet,
}

// ============================================================================
// DATASET BUILDER
// ============================================================================

pub struct DatasetBuilder {
    /// First-row labels treated as an area-code header (compared lowercase)
    pub header_labels: Vec<String>,
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetBuilder {
    pub fn new() -> Self {
        DatasetBuilder {
            header_labels: vec!["area".to_string(), "area_code".to_string(), "npa".to_string()],
        }
    }

    /// Normalize every row, in order. Nothing is sorted or deduplicated.
    pub fn build_geography<I>(&self, rows: I, report: &mut BuildReport) -> Vec<GeographyRecord>
    where
        I: IntoIterator<Item = RawGeographyRow>,
    {
        let mut out = Vec::new();

        for row in rows {
            let normalized = normalize_row_detailed(&row);

            if !normalized.state.is_resolved() {
                report.unresolved_states += 1;
                debug!(line = row.line_number, state = row.state_input(), "state not resolved");
            }
            match normalized.zip_status {
                ZipStatus::Padded => report.padded_zips += 1,
                ZipStatus::Overlong => {
                    report.overlong_zips += 1;
                    debug!(line = row.line_number, zip = %row.zip, "zip longer than 5 characters");
                }
                ZipStatus::AsIs => {}
            }

            out.push(normalized.record);
        }

        report.geography_rows = out.len();
        out
    }

    fn is_header(&self, first_column: &str) -> bool {
        let label = first_column.to_lowercase();
        self.header_labels.iter().any(|h| *h == label)
    }

    /// Collect unique 3-digit codes from the first column of each row
    pub fn build_area_codes<I>(&self, rows: I, report: &mut BuildReport) -> AreaCodeSet
    where
        I: IntoIterator<Item = RawAreaCodeRow>,
    {
        let mut codes = AreaCodeSet::new();

        for (idx, row) in rows.into_iter().enumerate() {
            report.area_code_rows += 1;

            let candidate = row.first_column().trim().trim_matches('"').trim();

            if idx == 0 && self.is_header(candidate) {
                report.header_skipped = true;
                continue;
            }

            if is_area_code(candidate) {
                codes.insert(candidate);
            } else {
                report.area_code_rows_rejected += 1;
                debug!(line = row.line_number, value = candidate, "rejecting area code row");
            }
        }

        report.unique_area_codes = codes.len();
        codes
    }

    /// Build both sections from the raw source texts
    pub fn build(&self, zip_text: &str, area_code_text: &str) -> (CanonicalDataset, BuildReport) {
        let mut report = BuildReport::default();

        let mut zip_rows = geography_rows(zip_text);
        let geography = self.build_geography(&mut zip_rows, &mut report);
        report.decode_errors += zip_rows.decode_errors();
        info!(source = zip_rows.kind().code(), rows = geography.len(), "geography built");

        let mut npa_rows = area_code_rows(area_code_text);
        let area_codes = self.build_area_codes(&mut npa_rows, &mut report);
        report.decode_errors += npa_rows.decode_errors();
        info!(source = npa_rows.kind().code(), unique = area_codes.len(), "area codes built");

        (CanonicalDataset { geography, area_codes }, report)
    }
}

// ============================================================================
// TESTS
// ============================================================================
