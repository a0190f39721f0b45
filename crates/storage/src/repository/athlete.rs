use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use validator::Validate;

use super::decode_text;
use crate::error::Result;
use crate::models::AthleteConfig;

/// Reads the list of athletes to track from a `name,parkrunId` CSV file.
#[derive(Debug, Clone)]
pub struct AthleteRepository {
    path: PathBuf,
}

impl AthleteRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every valid athlete entry. A missing file means nobody is
    /// configured yet; invalid entries are skipped with a warning.
    pub fn load(&self) -> Result<Vec<AthleteConfig>> {
        if !self.path.exists() {
            info!(
                "No athlete configuration at {}, nothing to fetch",
                self.path.display()
            );
            return Ok(Vec::new());
        }

        let text = decode_text(fs::read(&self.path)?);
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: csv::StringRecord = reader
            .headers()?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();
        reader.set_headers(headers);

        let mut athletes = Vec::new();
        for (idx, record) in reader.deserialize::<AthleteConfig>().enumerate() {
            let athlete = match record {
                Ok(athlete) => athlete,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    warn!("Skipping athlete entry {}: {}", idx + 1, e);
                    continue;
                }
            };
            if let Err(e) = athlete.validate() {
                warn!(
                    "Skipping athlete entry {} ('{}', '{}'): {}",
                    idx + 1,
                    athlete.name,
                    athlete.parkrun_id,
                    e
                );
                continue;
            }
            athletes.push(athlete);
        }

        info!(
            "Loaded {} athlete(s) from {}",
            athletes.len(),
            self.path.display()
        );
        Ok(athletes)
    }
}
