use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::decode_text;
use crate::codec::{format_date, format_time};
use crate::error::{Result, StorageError};
use crate::models::{RawResultRow, ResultHistory, ResultKey, ResultRow};

/// Column names of the history file, in write order.
pub const HISTORY_HEADERS: [&str; 9] = [
    "Event",
    "Run Date",
    "Run Number",
    "Pos",
    "Time",
    "Age Grade",
    "PB",
    "AthleteName",
    "AthleteId",
];

const PB_MARKER: &str = "PB";

/// One line of the history file. Every column is optional text so that
/// files written before a column existed still load.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoredResult {
    #[serde(rename = "Event")]
    event: String,
    #[serde(rename = "Run Date")]
    run_date: String,
    #[serde(rename = "Run Number")]
    run_number: String,
    #[serde(rename = "Pos")]
    position: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Age Grade")]
    age_grade: String,
    #[serde(rename = "PB")]
    personal_best: String,
    #[serde(rename = "AthleteName")]
    athlete_name: String,
    #[serde(rename = "AthleteId")]
    athlete_id: String,
}

impl StoredResult {
    fn into_row(self) -> std::result::Result<ResultRow, crate::error::ParseError> {
        let raw = RawResultRow {
            event: self.event,
            run_date: self.run_date,
            run_number: self.run_number,
            position: self.position,
            time: self.time,
            age_grade: self.age_grade,
        };
        let mut row = raw.normalize(self.athlete_id.trim(), self.athlete_name.trim())?;
        row.is_personal_best = !self.personal_best.trim().is_empty();
        Ok(row)
    }
}

impl From<&ResultRow> for StoredResult {
    fn from(row: &ResultRow) -> Self {
        Self {
            event: row.event.clone(),
            run_date: format_date(row.date),
            run_number: row.run_number.to_string(),
            position: row.position.to_string(),
            time: format_time(row.time_seconds),
            age_grade: row.age_grade.clone(),
            personal_best: if row.is_personal_best {
                PB_MARKER.to_string()
            } else {
                String::new()
            },
            athlete_name: row.athlete_name.clone(),
            athlete_id: row.athlete_id.clone(),
        }
    }
}

/// Owns the on-disk result history (a single CSV file).
#[derive(Debug, Clone)]
pub struct ResultRepository {
    path: PathBuf,
}

impl ResultRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted history. A missing file is the bootstrap case and
    /// yields an empty history. Rows that no longer normalize are dropped
    /// with a warning.
    pub fn load(&self) -> Result<ResultHistory> {
        if !self.path.exists() {
            info!(
                "No result history at {}, starting empty",
                self.path.display()
            );
            return Ok(ResultHistory::new());
        }

        let text = decode_text(fs::read(&self.path)?);
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for (idx, record) in reader.deserialize::<StoredResult>().enumerate() {
            match record?.into_row() {
                Ok(row) => rows.push(row),
                Err(e) => warn!("Skipping history line {}: {}", idx + 2, e),
            }
        }

        info!("Loaded {} result(s) from {}", rows.len(), self.path.display());
        Ok(ResultHistory::from_rows(rows))
    }

    /// Merges freshly fetched rows into an existing history.
    ///
    /// Rows are keyed on (athlete, event, date). On a collision the incoming
    /// row replaces the existing one, and among incoming rows with the same
    /// key the last one wins. The result is in canonical order regardless of
    /// the order of either input.
    ///
    /// Rows from files written before athlete ids were stored carry an empty
    /// id. An incoming row takes over such a row when event, date, run number
    /// and position all agree.
    pub fn merge(
        existing: ResultHistory,
        incoming: impl IntoIterator<Item = ResultRow>,
    ) -> ResultHistory {
        let mut by_key = BTreeMap::new();
        for row in existing.into_rows() {
            by_key.insert(row.key(), row);
        }

        let before = by_key.len();
        let mut replaced = 0usize;
        let mut adopted = 0usize;
        for row in incoming {
            if !row.athlete_id.is_empty() {
                let legacy = ResultKey {
                    athlete_id: String::new(),
                    ..row.key()
                };
                let same_result = by_key.get(&legacy).is_some_and(|old: &ResultRow| {
                    old.run_number == row.run_number && old.position == row.position
                });
                if same_result {
                    by_key.remove(&legacy);
                    adopted += 1;
                }
            }
            if by_key.insert(row.key(), row).is_some() {
                replaced += 1;
            }
        }
        debug!(
            "Merge: {} existing, {} new, {} replaced, {} legacy row(s) adopted",
            before,
            by_key.len() + adopted - before,
            replaced,
            adopted
        );

        ResultHistory::from_rows(by_key.into_values().collect())
    }

    /// Writes the whole history, replacing the previous file atomically.
    ///
    /// The data goes to a sibling `.tmp` file which is then renamed over the
    /// target, so a failure leaves the previous file untouched.
    pub fn persist(&self, history: &ResultHistory) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(vec![]);
        writer.write_record(HISTORY_HEADERS)?;
        for row in history {
            writer.serialize(StoredResult::from(row))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| StorageError::Io(e.into_error()))?;

        let tmp_path = self.tmp_path();
        self.write_atomic(&tmp_path, &bytes).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            StorageError::Persist {
                path: self.path.clone(),
                source,
            }
        })?;

        info!(
            "Persisted {} result(s) to {}",
            history.len(),
            self.path.display()
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_atomic(&self, tmp_path: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = fs::File::create(tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(tmp_path, &self.path)
    }
}
