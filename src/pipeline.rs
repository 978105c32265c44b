// 🔁 Pipeline - fetch → normalize → merge → write, one linear pass
// Both sources are retrieved before anything is built, and everything is
// built before the persisted document is touched.

use crate::builder::{BuildReport, CanonicalDataset, DatasetBuilder};
use crate::config::PipelineConfig;
use crate::document::{update_document, DocumentUpdate};
use crate::errors::{PipelineError, PipelineResult};
use crate::fetch::fetch_text;
use crate::parser::SourceKind;
use crate::schema::{enrollment_schema, validate_schema};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub report: BuildReport,
    /// SHA-256 of the bytes written
    pub digest: String,
}

fn check_schema(schema: &Value) {
    for issue in validate_schema(schema) {
        warn!(%issue, "enrollment schema issue");
    }
}

/// Retrieve both sources and build the canonical sections
pub fn build_dataset(config: &PipelineConfig) -> PipelineResult<(CanonicalDataset, BuildReport)> {
    let zip_text = fetch_text(SourceKind::ZipCodes, &config.zip_source, config.fetch_timeout)?;
    let area_code_text = fetch_text(SourceKind::AreaCodes, &config.area_code_source, config.fetch_timeout)?;

    let (dataset, report) = DatasetBuilder::new().build(&zip_text, &area_code_text);
    if report.unresolved_states > 0 {
        warn!(count = report.unresolved_states, "rows with unresolved states");
    }
    info!("{}", report.summary());

    Ok((dataset, report))
}

/// Full run: rebuild geography and area codes, keep other keys, refresh schema
pub fn run_build(config: &PipelineConfig) -> PipelineResult<RunSummary> {
    let (dataset, report) = build_dataset(config)?;

    let schema = enrollment_schema();
    check_schema(schema);

    let update = DocumentUpdate::replace(dataset.geography, dataset.area_codes);
    let digest = update_document(&config.output_path, update, schema)?;

    Ok(RunSummary {
        output_path: config.output_path.clone(),
        report,
        digest,
    })
}

/// Refresh only the schema of an existing document, in place
pub fn run_append_schema(path: &Path) -> PipelineResult<String> {
    if !path.exists() {
        return Err(PipelineError::MissingDocument(path.to_path_buf()));
    }

    let schema = enrollment_schema();
    check_schema(schema);

    update_document(path, DocumentUpdate::schema_only(), schema)
}
