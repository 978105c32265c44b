// 🏗️ Parser Framework - CSV text → raw rows
// Both reference sources arrive as opaque comma-separated text. Rows are
// produced lazily, single pass, in input order.

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

// ============================================================================
// CORE TYPES
// ============================================================================

/// SourceKind - which external table a row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    ZipCodes,
    AreaCodes,
}

impl SourceKind {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            SourceKind::ZipCodes => "ZIP code table",
            SourceKind::AreaCodes => "area code table",
        }
    }

    /// Short code for logs
    pub fn code(&self) -> &str {
        match self {
            SourceKind::ZipCodes => "zip",
            SourceKind::AreaCodes => "npa",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// RawGeographyRow - one ZIP table row before normalization.
/// Missing columns read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGeographyRow {
    pub zip: String,
    pub city: String,
    /// Full state name (or whatever the source put there)
    pub state: String,
    /// 2-letter abbreviation column, when the source has one
    pub state_abbr: String,

    // Provenance
    pub line_number: usize,
}

impl RawGeographyRow {
    pub fn new(zip: impl Into<String>, city: impl Into<String>, state: impl Into<String>) -> Self {
        RawGeographyRow {
            zip: zip.into(),
            city: city.into(),
            state: state.into(),
            ..Default::default()
        }
    }

    /// Builder pattern: add the abbreviation column
    pub fn with_state_abbr(mut self, abbr: impl Into<String>) -> Self {
        self.state_abbr = abbr.into();
        self
    }

    /// The value handed to state normalization: the abbreviation column
    /// when present, else the free-text state column.
    pub fn state_input(&self) -> &str {
        if self.state_abbr.trim().is_empty() {
            &self.state
        } else {
            &self.state_abbr
        }
    }
}

/// RawAreaCodeRow - every field of one area-code table record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAreaCodeRow {
    pub fields: Vec<String>,
    pub line_number: usize,
}

impl RawAreaCodeRow {
    pub fn first_column(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or("")
    }
}

// ============================================================================
// ROW SOURCE TRAIT
// ============================================================================

/// A lazy row iterator that also reports which table it reads and how many
/// records the CSV reader could not decode.
pub trait RowSource: Iterator {
    fn kind(&self) -> SourceKind;

    fn decode_errors(&self) -> usize;
}

fn line_of(record: &StringRecord) -> usize {
    record.position().map(|p| p.line() as usize).unwrap_or(0)
}

// ============================================================================
// ZIP CODE TABLE
// ============================================================================

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy, Default)]
struct ZipColumns {
    zip: Option<usize>,
    city: Option<usize>,
    state: Option<usize>,
    state_abbr: Option<usize>,
}

impl ZipColumns {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut columns = ZipColumns::default();

        for (idx, header) in headers.iter().enumerate() {
            let name = header.trim().trim_start_matches('\u{feff}').to_lowercase();
            let slot = match name.as_str() {
                "zip" => &mut columns.zip,
                "city" => &mut columns.city,
                "state" => &mut columns.state,
                "state_abbr" => &mut columns.state_abbr,
                _ => continue,
            };
            // First occurrence wins
            if slot.is_none() {
                *slot = Some(idx);
            }
        }

        columns
    }

    fn field(record: &StringRecord, idx: Option<usize>) -> String {
        idx.and_then(|i| record.get(i)).unwrap_or("").to_string()
    }

    fn row(&self, record: &StringRecord) -> RawGeographyRow {
        RawGeographyRow {
            zip: Self::field(record, self.zip),
            city: Self::field(record, self.city),
            state: Self::field(record, self.state),
            state_abbr: Self::field(record, self.state_abbr),
            line_number: line_of(record),
        }
    }
}

pub struct GeographyRows<'a> {
    records: StringRecordsIntoIter<&'a [u8]>,
    columns: ZipColumns,
    decode_errors: usize,
}

/// Parse ZIP table text. The first record is the header row.
pub fn geography_rows(text: &str) -> GeographyRows<'_> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let (columns, decode_errors) = match reader.headers() {
        Ok(headers) => (ZipColumns::from_headers(headers), 0),
        Err(e) => {
            debug!(error = %e, "ZIP table header could not be decoded");
            (ZipColumns::default(), 1)
        }
    };

    GeographyRows {
        records: reader.into_records(),
        columns,
        decode_errors,
    }
}

impl Iterator for GeographyRows<'_> {
    type Item = RawGeographyRow;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.records.next()? {
                Ok(record) => return Some(self.columns.row(&record)),
                Err(e) => {
                    self.decode_errors += 1;
                    debug!(error = %e, "skipping undecodable ZIP table record");
                }
            }
        }
    }
}

impl RowSource for GeographyRows<'_> {
    fn kind(&self) -> SourceKind {
        SourceKind::ZipCodes
    }

    fn decode_errors(&self) -> usize {
        self.decode_errors
    }
}

// ============================================================================
// AREA CODE TABLE
// ============================================================================

pub struct AreaCodeRows<'a> {
    records: StringRecordsIntoIter<&'a [u8]>,
    decode_errors: usize,
}

/// Parse area-code table text. No header is assumed; the builder decides
/// whether the first row is one.
pub fn area_code_rows(text: &str) -> AreaCodeRows<'_> {
    let reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    AreaCodeRows {
        records: reader.into_records(),
        decode_errors: 0,
    }
}

impl Iterator for AreaCodeRows<'_> {
    type Item = RawAreaCodeRow;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.records.next()? {
                Ok(record) => {
                    return Some(RawAreaCodeRow {
                        fields: record.iter().map(str::to_string).collect(),
                        line_number: line_of(&record),
                    })
                }
                Err(e) => {
                    self.decode_errors += 1;
                    debug!(error = %e, "skipping undecodable area code record");
                }
            }
        }
    }
}

impl RowSource for AreaCodeRows<'_> {
    fn kind(&self) -> SourceKind {
        SourceKind::AreaCodes
    }

    fn decode_errors(&self) -> usize {
        self.decode_errors
    }
}

// ============================================================================
// TESTS
// ============================================================================
