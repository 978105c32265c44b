// 📄 Document Merger - fold fresh sections into the persisted JSON document
//
// The persisted file is read once, its shape decided once, merged
// logically, and rewritten whole. Writes go through a temp file in the
// target directory followed by a single rename, so readers see either the
// old document or the new one.

use crate::builder::AreaCodeSet;
use crate::errors::{PipelineError, PipelineResult};
use crate::normalizer::GeographyRecord;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const GEOGRAPHY_KEY: &str = "geography";
pub const AREA_CODES_KEY: &str = "area_codes";
pub const SCHEMA_KEY: &str = "schema";

// ============================================================================
// PERSISTED SHAPES
// ============================================================================

/// Shape of whatever is on disk, decided once at load time
#[derive(Debug, Clone, PartialEq)]
pub enum PersistedDocument {
    /// No file yet
    Empty,
    /// Older format: a bare geography list
    LegacyList(Vec<Value>),
    /// Full object with geography / area_codes / other keys
    Structured(Map<String, Value>),
    /// Valid JSON that is neither a list nor an object
    Unrecognized(Value),
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

impl PersistedDocument {
    /// Classify raw content. `None` means the document does not exist.
    pub fn parse(content: Option<&str>) -> PipelineResult<Self> {
        let Some(text) = content else {
            return Ok(PersistedDocument::Empty);
        };

        let value: Value = serde_json::from_str(text).map_err(|e| PipelineError::CorruptDocument {
            reason: e.to_string(),
        })?;

        Ok(match value {
            Value::Array(list) => PersistedDocument::LegacyList(list),
            Value::Object(map) => PersistedDocument::Structured(map),
            other => PersistedDocument::Unrecognized(other),
        })
    }

    /// Read and classify the document at `path`. A missing file is `Empty`.
    pub fn load(path: &Path) -> PipelineResult<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(Some(&text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(PersistedDocument::Empty),
            Err(e) => Err(PipelineError::filesystem(path, e)),
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            PersistedDocument::Empty => "empty",
            PersistedDocument::LegacyList(_) => "legacy list",
            PersistedDocument::Structured(_) => "structured",
            PersistedDocument::Unrecognized(_) => "unrecognized",
        }
    }
}

// ============================================================================
// MERGE
// ============================================================================

/// Sections to write. `None` keeps whatever the persisted document has.
#[derive(Debug, Clone, Default)]
pub struct DocumentUpdate {
    pub geography: Option<Vec<GeographyRecord>>,
    pub area_codes: Option<AreaCodeSet>,
}

impl DocumentUpdate {
    /// Replace both data sections
    pub fn replace(geography: Vec<GeographyRecord>, area_codes: AreaCodeSet) -> Self {
        DocumentUpdate {
            geography: Some(geography),
            area_codes: Some(area_codes),
        }
    }

    /// Keep both data sections, only refresh the schema
    pub fn schema_only() -> Self {
        Self::default()
    }
}

/// Persisted sections after shape normalization
struct Existing {
    geography: Value,
    area_codes: Value,
    extras: Map<String, Value>,
}

fn existing_sections(document: PersistedDocument) -> PipelineResult<Existing> {
    match document {
        PersistedDocument::Empty => Ok(Existing {
            geography: Value::Array(Vec::new()),
            area_codes: Value::Array(Vec::new()),
            extras: Map::new(),
        }),
        PersistedDocument::LegacyList(list) => Ok(Existing {
            geography: Value::Array(list),
            area_codes: Value::Array(Vec::new()),
            extras: Map::new(),
        }),
        PersistedDocument::Structured(map) => {
            let mut geography = None;
            let mut area_codes = None;
            let mut extras = Map::new();

            // Single ordered pass; removing keys in place would reorder the rest
            for (key, value) in map {
                match key.as_str() {
                    GEOGRAPHY_KEY => geography = Some(value),
                    AREA_CODES_KEY => area_codes = Some(value),
                    SCHEMA_KEY => {}
                    _ => {
                        extras.insert(key, value);
                    }
                }
            }

            Ok(Existing {
                geography: geography.unwrap_or_else(|| Value::Array(Vec::new())),
                area_codes: area_codes.unwrap_or_else(|| Value::Array(Vec::new())),
                extras,
            })
        }
        PersistedDocument::Unrecognized(value) => Err(PipelineError::UnrecognizedDocument {
            found: kind_of(&value),
        }),
    }
}

/// Merge an update into a persisted document.
///
/// Output key order: `geography`, `area_codes`, preserved extra keys in
/// their original order, `schema` last.
pub fn merge(
    document: PersistedDocument,
    update: DocumentUpdate,
    schema: &Value,
) -> PipelineResult<Map<String, Value>> {
    let existing = existing_sections(document)?;

    let geography = match update.geography {
        Some(records) => serde_json::to_value(records)?,
        None => existing.geography,
    };
    let area_codes = match update.area_codes {
        Some(codes) => serde_json::to_value(codes)?,
        None => existing.area_codes,
    };

    let mut merged = Map::new();
    merged.insert(GEOGRAPHY_KEY.to_string(), geography);
    merged.insert(AREA_CODES_KEY.to_string(), area_codes);
    for (key, value) in existing.extras {
        merged.insert(key, value);
    }
    merged.insert(SCHEMA_KEY.to_string(), schema.clone());

    Ok(merged)
}

/// Pretty JSON (2-space indent, non-ASCII kept as-is) with a trailing newline
pub fn render(document: &Map<String, Value>) -> PipelineResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(document)?;
    bytes.push(b'\n');
    Ok(bytes)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// ATOMIC WRITE
// ============================================================================

/// A fully written, fsynced temp file waiting to replace the target.
/// Dropping it without `commit` deletes the temp file.
pub struct StagedDocument {
    temp: NamedTempFile,
    target: PathBuf,
    digest: String,
}

impl StagedDocument {
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Atomically rename the temp file over the target, then fsync the
    /// directory so the rename itself survives a power loss
    pub fn commit(self) -> PipelineResult<String> {
        let StagedDocument { temp, target, digest } = self;
        temp.persist(&target)
            .map_err(|e| PipelineError::filesystem(&target, e.error))?;
        sync_dir(target_dir(&target))?;
        info!(path = %target.display(), digest = %digest, "document written");
        Ok(digest)
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> PipelineResult<()> {
    fs::File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| PipelineError::filesystem(dir, e))
}

// Directories cannot be opened as files here
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> PipelineResult<()> {
    Ok(())
}

fn target_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Serialize the document into a temp file beside `target`
pub fn stage(target: &Path, document: &Map<String, Value>) -> PipelineResult<StagedDocument> {
    let bytes = render(document)?;
    let dir = target_dir(target);

    fs::create_dir_all(dir).map_err(|e| PipelineError::filesystem(dir, e))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| PipelineError::filesystem(dir, e))?;
    temp.write_all(&bytes)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| PipelineError::filesystem(temp.path(), e))?;

    debug!(temp = %temp.path().display(), bytes = bytes.len(), "document staged");

    Ok(StagedDocument {
        temp,
        target: target.to_path_buf(),
        digest: sha256_hex(&bytes),
    })
}

/// Stage and commit in one step. Returns the SHA-256 of the written bytes.
pub fn write_atomic(target: &Path, document: &Map<String, Value>) -> PipelineResult<String> {
    stage(target, document)?.commit()
}

/// Load, merge and atomically rewrite the document at `target`.
/// Nothing is written if loading or merging fails.
pub fn update_document(target: &Path, update: DocumentUpdate, schema: &Value) -> PipelineResult<String> {
    let existing = PersistedDocument::load(target)?;
    debug!(path = %target.display(), shape = existing.shape(), "persisted document loaded");

    let merged = merge(existing, update, schema)?;
    write_atomic(target, &merged)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize_row;
    use crate::parser::RawGeographyRow;
    use serde_json::json;

    fn sample_update() -> DocumentUpdate {
        let geography = vec![
            normalize_row(&RawGeographyRow::new("2134", "Boston", "MA")),
            normalize_row(&RawGeographyRow::new("90210", "Beverly Hills", "California")),
        ];
        let mut codes = AreaCodeSet::new();
        codes.insert("617");
        codes.insert("310");
        DocumentUpdate::replace(geography, codes)
    }

    fn keys(map: &Map<String, Value>) -> Vec<String> {
        map.keys().cloned().collect()
    }

    #[test]
    fn test_parse_shapes() {
        assert_eq!(PersistedDocument::parse(None).unwrap(), PersistedDocument::Empty);
        assert!(matches!(
            PersistedDocument::parse(Some("[]")).unwrap(),
            PersistedDocument::LegacyList(_)
        ));
        assert!(matches!(
            PersistedDocument::parse(Some(r#"{"geography": []}"#)).unwrap(),
            PersistedDocument::Structured(_)
        ));
        assert_eq!(
            PersistedDocument::parse(Some("42")).unwrap(),
            PersistedDocument::Unrecognized(json!(42))
        );
        assert!(matches!(
            PersistedDocument::parse(Some("{not json")),
            Err(PipelineError::CorruptDocument { .. })
        ));
    }

    #[test]
    fn test_merge_into_empty() {
        let schema = json!({"form_name": "x"});
        let merged = merge(PersistedDocument::Empty, sample_update(), &schema).unwrap();

        assert_eq!(keys(&merged), vec!["geography", "area_codes", "schema"]);
        assert_eq!(merged["area_codes"], json!(["310", "617"]));
        assert_eq!(merged["geography"][0]["ZipCode"], "02134");
        assert_eq!(merged["schema"], schema);
    }

    #[test]
    fn test_schema_only_on_empty() {
        let merged = merge(PersistedDocument::Empty, DocumentUpdate::schema_only(), &json!({})).unwrap();
        assert_eq!(merged["geography"], json!([]));
        assert_eq!(merged["area_codes"], json!([]));
    }

    #[test]
    fn test_legacy_list_becomes_geography() {
        let legacy = PersistedDocument::parse(Some(
            r#"[{"zip": "02134", "city": "Boston", "state": "Massachusetts"}]"#,
        ))
        .unwrap();

        let merged = merge(legacy, DocumentUpdate::schema_only(), &json!({"v": 1})).unwrap();

        assert_eq!(keys(&merged), vec!["geography", "area_codes", "schema"]);
        assert_eq!(merged["geography"][0]["city"], "Boston");
        assert_eq!(merged["area_codes"], json!([]));
    }

    #[test]
    fn test_extra_keys_preserved_and_schema_last() {
        let persisted = PersistedDocument::parse(Some(
            r#"{"schema": {"old": true}, "notes": "x", "geography": [], "area_codes": ["212"], "owner": {"team": "ops"}}"#,
        ))
        .unwrap();

        let merged = merge(persisted, sample_update(), &json!({"new": true})).unwrap();

        assert_eq!(keys(&merged), vec!["geography", "area_codes", "notes", "owner", "schema"]);
        assert_eq!(merged["notes"], "x");
        assert_eq!(merged["owner"], json!({"team": "ops"}));
        assert_eq!(merged["schema"], json!({"new": true}));
        assert_eq!(merged["area_codes"], json!(["310", "617"]), "Fresh codes replace persisted ones");
    }

    #[test]
    fn test_interleaved_extra_keys_keep_relative_order() {
        let persisted = PersistedDocument::parse(Some(
            r#"{"geography": [], "a": 1, "b": 2, "area_codes": [], "c": 3, "schema": {}, "d": 4}"#,
        ))
        .unwrap();

        let merged = merge(persisted, sample_update(), &json!({})).unwrap();

        assert_eq!(
            keys(&merged),
            vec!["geography", "area_codes", "a", "b", "c", "d", "schema"]
        );
    }

    #[test]
    fn test_repeated_updates_do_not_reorder_extra_keys() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("geography.json");
        fs::write(&target, r#"{"geography": [], "area_codes": [], "a": 1, "b": 2, "c": 3}"#).unwrap();
        let schema = json!({"form_name": "Membership Enrollment"});

        update_document(&target, sample_update(), &schema).unwrap();
        let first = fs::read(&target).unwrap();
        update_document(&target, sample_update(), &schema).unwrap();
        let second = fs::read(&target).unwrap();

        assert_eq!(first, second, "Extra keys must not shuffle between runs");
        match PersistedDocument::load(&target).unwrap() {
            PersistedDocument::Structured(map) => {
                assert_eq!(keys(&map), vec!["geography", "area_codes", "a", "b", "c", "schema"]);
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn test_schema_only_keeps_persisted_sections() {
        let persisted = PersistedDocument::parse(Some(
            r#"{"geography": [{"ZipCode": "00501"}], "area_codes": ["631"], "notes": "x"}"#,
        ))
        .unwrap();

        let merged = merge(persisted, DocumentUpdate::schema_only(), &json!({})).unwrap();

        assert_eq!(merged["geography"], json!([{"ZipCode": "00501"}]));
        assert_eq!(merged["area_codes"], json!(["631"]));
        assert_eq!(merged["notes"], "x");
    }

    #[test]
    fn test_unrecognized_is_fatal() {
        for content in ["\"just a string\"", "null", "true", "3.5"] {
            let persisted = PersistedDocument::parse(Some(content)).unwrap();
            let result = merge(persisted, sample_update(), &json!({}));
            assert!(
                matches!(result, Err(PipelineError::UnrecognizedDocument { .. })),
                "{} should be rejected",
                content
            );
        }
    }

    #[test]
    fn test_update_document_writes_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("data").join("geography.json");
        let schema = json!({"form_name": "Membership Enrollment"});

        let first_digest = update_document(&target, sample_update(), &schema).unwrap();
        let first = fs::read(&target).unwrap();
        let second_digest = update_document(&target, sample_update(), &schema).unwrap();
        let second = fs::read(&target).unwrap();

        assert_eq!(first, second, "Second run must produce byte-identical output");
        assert_eq!(first_digest, second_digest);
        assert_eq!(first_digest, sha256_hex(&first));

        let text = String::from_utf8(first).unwrap();
        assert!(text.starts_with("{\n  \"geography\": ["), "2-space pretty output");
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_non_ascii_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("geography.json");
        let update = DocumentUpdate::replace(
            vec![normalize_row(&RawGeographyRow::new("00731", "Peñuelas", "PR"))],
            AreaCodeSet::new(),
        );

        update_document(&target, update, &json!({})).unwrap();

        let text = fs::read_to_string(&target).unwrap();
        assert!(text.contains("Peñuelas"));
        assert!(text.contains("\"State\": \"PR\""));
        assert!(text.contains("\"FIPSCode\": \"\""));
    }

    #[test]
    fn test_unrecognized_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("geography.json");
        fs::write(&target, "\"corrupt\"").unwrap();

        let result = update_document(&target, sample_update(), &json!({}));

        assert!(matches!(result, Err(PipelineError::UnrecognizedDocument { found: "a string" })));
        assert_eq!(fs::read_to_string(&target).unwrap(), "\"corrupt\"");
    }

    #[test]
    fn test_interrupted_before_rename_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("geography.json");
        let schema = json!({});

        update_document(&target, sample_update(), &schema).unwrap();
        let original = fs::read(&target).unwrap();

        // Stage a different document, then abandon it before commit
        let replacement = merge(
            PersistedDocument::parse(Some(r#"{"notes": "new"}"#)).unwrap(),
            DocumentUpdate::schema_only(),
            &schema,
        )
        .unwrap();
        let staged = stage(&target, &replacement).unwrap();
        let temp_path = staged.temp_path().to_path_buf();
        assert!(temp_path.exists());
        assert_eq!(temp_path.parent(), target.parent(), "Temp file lives beside the target");
        assert_eq!(fs::read(&target).unwrap(), original);
        drop(staged);

        assert!(!temp_path.exists(), "Abandoned temp file is removed");
        assert_eq!(fs::read(&target).unwrap(), original);
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_commit_into_fresh_directory_syncs_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("geography.json");
        let merged = merge(PersistedDocument::Empty, sample_update(), &json!({})).unwrap();

        let digest = stage(&target, &merged).unwrap().commit().unwrap();

        assert_eq!(digest, sha256_hex(&fs::read(&target).unwrap()));
        let entries = fs::read_dir(target.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1, "Only the committed document remains");
        sync_dir(target.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_commit_replaces_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("geography.json");
        fs::write(&target, r#"{"notes": "x"}"#).unwrap();

        let merged = merge(PersistedDocument::load(&target).unwrap(), sample_update(), &json!({})).unwrap();
        let staged = stage(&target, &merged).unwrap();
        let digest = staged.digest().to_string();
        assert_eq!(staged.commit().unwrap(), digest);

        let reloaded = PersistedDocument::load(&target).unwrap();
        match reloaded {
            PersistedDocument::Structured(map) => {
                assert_eq!(keys(&map), vec!["geography", "area_codes", "notes", "schema"]);
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = PersistedDocument::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(loaded, PersistedDocument::Empty);
    }
}
