use std::path::PathBuf;
use std::time::Duration;

use crate::{ImporterError, Result};

pub const DEFAULT_BASE_URL: &str = "https://www.parkrun.org.uk";
pub const DEFAULT_RESULTS_PATH: &str = "data/results.csv";
pub const DEFAULT_ATHLETES_PATH: &str = "data/athletes.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Settings for one ingestion run. Passed explicitly to the client and
/// pipeline rather than read from process-wide state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub results_path: PathBuf,
    pub athletes_path: PathBuf,
    pub base_url: String,
    pub fetch_timeout: Duration,
    pub max_concurrent_fetches: usize,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fetch_timeout.is_zero() {
            return Err(ImporterError::Config(
                "fetch timeout must be greater than zero".to_string(),
            ));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(ImporterError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ImporterError::Config(format!(
                "base URL must be http(s): '{}'",
                self.base_url
            )));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            results_path: PathBuf::from(DEFAULT_RESULTS_PATH),
            athletes_path: PathBuf::from(DEFAULT_ATHLETES_PATH),
            base_url: DEFAULT_BASE_URL.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_concurrent_fetches: DEFAULT_CONCURRENCY,
        }
    }
}
