use crate::{ImporterError, Result};
use storage::RawResultRow;

/// What a source returns for one athlete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResults {
    /// Athlete name as shown by the source.
    pub verified_name: String,
    pub rows: Vec<RawResultRow>,
}

/// A source of raw result rows for one athlete.
///
/// Implementations make one outbound request per call and do not retry;
/// when `expected_name` is given they must reject a page for a different
/// athlete via [`verify_identity`].
#[async_trait::async_trait]
pub trait ResultFetcher: Send + Sync {
    async fn fetch(
        &self,
        athlete_id: &str,
        expected_name: Option<&str>,
    ) -> Result<FetchedResults>;

    fn name(&self) -> &'static str;
}

/// Guards against a mistyped athlete id silently importing somebody else's
/// results: names must match ignoring case and surrounding whitespace.
pub fn verify_identity(expected: Option<&str>, found: &str) -> Result<()> {
    let Some(expected) = expected else {
        return Ok(());
    };

    if expected.trim().to_lowercase() == found.trim().to_lowercase() {
        Ok(())
    } else {
        Err(ImporterError::IdentityMismatch {
            expected: expected.trim().to_string(),
            found: found.trim().to_string(),
        })
    }
}
