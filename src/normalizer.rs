// 🧹 Row Normalizer - raw ZIP row → canonical GeographyRecord
// Pure and deterministic. A row is never dropped for a lookup miss.

use crate::parser::RawGeographyRow;
use crate::reference::{division_number, region_number, resolve_state, StateResolution};
use serde::{Deserialize, Serialize};

// ============================================================================
// GEOGRAPHY RECORD
// ============================================================================

/// One canonical row of the `geography` section.
/// Serialized field names are what the enrollment form reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographyRecord {
    #[serde(rename = "Region")]
    pub region: String,

    #[serde(rename = "Division")]
    pub division: String,

    #[serde(rename = "City")]
    pub city: String,

    /// 2-letter code (kept even when not in the tables), or "" for
    /// free text that matches no state name
    #[serde(rename = "State")]
    pub state: String,

    /// Always at least 5 characters, left-zero-padded
    #[serde(rename = "ZipCode")]
    pub zip_code: String,

    #[serde(rename = "RegionNumber")]
    pub region_number: String,

    #[serde(rename = "DivisionNumber")]
    pub division_number: String,

    #[serde(rename = "FIPSCode")]
    pub fips_code: String,
}

// ============================================================================
// ZIP PADDING
// ============================================================================

pub const ZIP_WIDTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZipStatus {
    /// Exactly 5 characters already
    AsIs,
    /// Shorter input, zero-padded on the left
    Padded,
    /// Longer than 5 characters, passed through untouched
    Overlong,
}

/// Left-pad with zeros to 5 characters. Never truncates.
pub fn pad_zip(raw: &str) -> (String, ZipStatus) {
    let zip = raw.trim();
    let len = zip.chars().count();

    if len < ZIP_WIDTH {
        (format!("{}{}", "0".repeat(ZIP_WIDTH - len), zip), ZipStatus::Padded)
    } else if len == ZIP_WIDTH {
        (zip.to_string(), ZipStatus::AsIs)
    } else {
        (zip.to_string(), ZipStatus::Overlong)
    }
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// A normalized row plus what happened on the way, for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub record: GeographyRecord,
    pub state: StateResolution,
    pub zip_status: ZipStatus,
}

pub fn normalize_row_detailed(row: &RawGeographyRow) -> NormalizedRow {
    let (zip_code, zip_status) = pad_zip(&row.zip);
    let state = resolve_state(row.state_input());

    let (abbr, region, division, fips) = match &state {
        StateResolution::Resolved(entry) => (
            entry.abbr,
            entry.region().name(),
            entry.division.name(),
            entry.fips,
        ),
        // 2-letter codes are kept as-is (PR, GU, ...); other text is dropped
        StateResolution::Unresolved(text) if text.chars().count() == 2 => (text.as_str(), "", "", ""),
        StateResolution::Unresolved(_) => ("", "", "", ""),
    };

    let record = GeographyRecord {
        region: region.to_string(),
        division: division.to_string(),
        city: row.city.trim().to_string(),
        state: abbr.to_string(),
        zip_code,
        region_number: region_number(region).to_string(),
        division_number: division_number(division).to_string(),
        fips_code: fips.to_string(),
    };

    NormalizedRow {
        record,
        state,
        zip_status,
    }
}

/// Normalize one raw row into a GeographyRecord
pub fn normalize_row(row: &RawGeographyRow) -> GeographyRecord {
    normalize_row_detailed(row).record
}

// ============================================================================
// TESTS
// ============================================================================
