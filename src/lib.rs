// Family Geodata - Core Library
// Builds the ZIP geography + area code reference document for the
// membership enrollment form. Exposes every stage for the CLI and tests.

// The enrollment schema literal is deep enough to need a higher limit
#![recursion_limit = "256"]

pub mod errors;
pub mod reference;      // Census regions/divisions, FIPS, state names
pub mod parser;         // CSV text → lazy raw rows
pub mod normalizer;     // Raw row → GeographyRecord
pub mod builder;        // Row sequences → canonical sections
pub mod schema;         // Static enrollment schema
pub mod document;       // Load / merge / atomic write
pub mod fetch;          // Source retrieval
pub mod config;
pub mod lookup;         // ZIP and phone lookups against a document
pub mod pipeline;

// Re-export commonly used types
pub use errors::{PipelineError, PipelineResult};
pub use reference::{
    Region, Division, StateEntry, StateResolution, STATES,
    normalize_state, resolve_state, state_by_abbr, state_by_name,
    region_of, division_of, fips_of, region_number, division_number,
};
pub use parser::{
    SourceKind, RawGeographyRow, RawAreaCodeRow, RowSource,
    geography_rows, area_code_rows,
};
pub use normalizer::{GeographyRecord, NormalizedRow, ZipStatus, normalize_row, pad_zip};
pub use builder::{AreaCodeSet, BuildReport, CanonicalDataset, DatasetBuilder};
pub use schema::{ENROLLMENT_SCHEMA, SchemaIssue, enrollment_schema, validate_schema};
pub use document::{
    PersistedDocument, DocumentUpdate, StagedDocument,
    merge, stage, write_atomic, update_document,
};
pub use fetch::fetch_text;
pub use config::PipelineConfig;
pub use lookup::{DocumentIndex, PhoneCheck};
pub use pipeline::{RunSummary, build_dataset, run_build, run_append_schema};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
