// ⚙️ Pipeline configuration
// Defaults point at the public reference tables; the CLI overrides them
// from flags or GEODATA_* environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ZIP_SOURCE: &str = "https://gist.githubusercontent.com/Tucker-Eric/6a1a6b164726f21bb699623b06591389/raw/d87104248e4796f872412993a8b43d583c889176/us_zips.csv";
pub const DEFAULT_AREA_CODE_SOURCE: &str = "https://raw.githubusercontent.com/ravisorg/Area-Code-Geolocation-Database/refs/heads/master/us-area-code-cities.csv";
pub const DEFAULT_OUTPUT: &str = "data/geography.json";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 90;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// URL or path of the ZIP code CSV
    pub zip_source: String,
    /// URL or path of the area code CSV
    pub area_code_source: String,
    /// Persisted document location
    pub output_path: PathBuf,
    /// Upper bound on each source retrieval
    pub fetch_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            zip_source: DEFAULT_ZIP_SOURCE.to_string(),
            area_code_source: DEFAULT_AREA_CODE_SOURCE.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl PipelineConfig {
    pub fn with_output(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    pub fn with_sources(mut self, zip_source: impl Into<String>, area_code_source: impl Into<String>) -> Self {
        self.zip_source = zip_source.into();
        self.area_code_source = area_code_source.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout = Duration::from_secs(secs);
        self
    }
}
