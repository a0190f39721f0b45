use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use storage::services::analytics;
use storage::{AthleteConfig, ResultHistory, ResultRepository, ResultRow};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::error::FailureKind;
use crate::traits::{FetchedResults, ResultFetcher};
use crate::{ImporterError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Succeeded { rows: usize, rejected: usize },
    Failed { kind: FailureKind, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AthleteOutcome {
    pub athlete_id: String,
    pub name: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl AthleteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Succeeded { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PersistenceOutcome {
    Persisted { total_rows: usize },
    /// Nothing was fetched, so the stored history was left as it was.
    NoUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub outcomes: Vec<AthleteOutcome>,
    pub persistence: PersistenceOutcome,
    /// At least one athlete succeeded and the merged history was written.
    pub success: bool,
}

impl IngestionReport {
    fn new(outcomes: Vec<AthleteOutcome>, persistence: PersistenceOutcome) -> Self {
        let success = outcomes.iter().any(AthleteOutcome::is_success)
            && matches!(persistence, PersistenceOutcome::Persisted { .. });
        Self {
            outcomes,
            persistence,
            success,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn log_summary(&self) {
        for outcome in &self.outcomes {
            match &outcome.status {
                OutcomeStatus::Succeeded { rows, rejected } => info!(
                    "  ✓ {} ({}): {} row(s), {} rejected",
                    outcome.name, outcome.athlete_id, rows, rejected
                ),
                OutcomeStatus::Failed { kind, message } => error!(
                    "  ✗ {} ({}): {} error: {}",
                    outcome.name, outcome.athlete_id, kind, message
                ),
            }
        }

        match self.persistence {
            PersistenceOutcome::Persisted { total_rows } => {
                info!("History saved with {} result(s)", total_rows)
            }
            PersistenceOutcome::NoUpdate => warn!("No update performed"),
        }
        info!(
            "Summary: {} succeeded, {} failed",
            self.succeeded(),
            self.failed()
        );
    }
}

/// Fetches every configured athlete, merges the results into the stored
/// history and writes it back.
pub struct IngestionPipeline {
    fetcher: Arc<dyn ResultFetcher>,
    store: ResultRepository,
    max_concurrent_fetches: usize,
}

impl IngestionPipeline {
    pub fn new(
        fetcher: Arc<dyn ResultFetcher>,
        store: ResultRepository,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            store,
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
        }
    }

    /// Runs one ingestion pass.
    ///
    /// Fetch, parse and identity failures are recorded per athlete and never
    /// stop the others. Storage failures abort the run and are returned.
    pub async fn run(&self, athletes: &[AthleteConfig]) -> Result<IngestionReport> {
        let athletes = unique_athletes(athletes);
        info!(
            "Ingesting {} athlete(s) via {}",
            athletes.len(),
            self.fetcher.name()
        );

        let fetched = self.fetch_all(&athletes).await;

        let mut outcomes = Vec::with_capacity(athletes.len());
        let mut incoming: Vec<ResultRow> = Vec::new();

        for (athlete, result) in athletes.iter().zip(fetched) {
            let athlete_id = athlete.athlete_id().into_string();
            match result {
                Ok(results) => {
                    let (rows, rejected) = normalize(&athlete_id, &results);
                    outcomes.push(AthleteOutcome {
                        athlete_id,
                        name: results.verified_name,
                        status: OutcomeStatus::Succeeded {
                            rows: rows.len(),
                            rejected,
                        },
                    });
                    incoming.extend(rows);
                }
                Err(e) => {
                    let Some(kind) = e.failure_kind() else {
                        return Err(e);
                    };
                    warn!("Skipping {} ({}): {}", athlete.name, athlete_id, e);
                    outcomes.push(AthleteOutcome {
                        athlete_id,
                        name: athlete.name.clone(),
                        status: OutcomeStatus::Failed {
                            kind,
                            message: e.to_string(),
                        },
                    });
                }
            }
        }

        if incoming.is_empty() {
            info!(
                "No results fetched, leaving {} untouched",
                self.store.path().display()
            );
            return Ok(IngestionReport::new(outcomes, PersistenceOutcome::NoUpdate));
        }

        let existing = self.store.load()?;
        let merged = ResultRepository::merge(existing, incoming);
        let history = ResultHistory::from_rows(analytics::derive(&merged, None));
        self.store.persist(&history)?;

        Ok(IngestionReport::new(
            outcomes,
            PersistenceOutcome::Persisted {
                total_rows: history.len(),
            },
        ))
    }

    /// Fetches all athletes through a bounded pool. Results come back in the
    /// same order as `athletes`, whatever order the requests finish in.
    async fn fetch_all(&self, athletes: &[AthleteConfig]) -> Vec<Result<FetchedResults>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_fetches));

        let handles: Vec<_> = athletes
            .iter()
            .map(|athlete| {
                let fetcher = Arc::clone(&self.fetcher);
                let semaphore = Arc::clone(&semaphore);
                let athlete_id = athlete.athlete_id().into_string();
                let expected_name = athlete.name.clone();

                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| ImporterError::FetchAborted(e.to_string()))?;
                    fetcher.fetch(&athlete_id, Some(&expected_name)).await
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(match handle.await {
                Ok(result) => result,
                Err(e) => Err(ImporterError::FetchAborted(e.to_string())),
            });
        }
        results
    }
}

/// Drops repeated athlete ids so each athlete is fetched once per run.
fn unique_athletes(athletes: &[AthleteConfig]) -> Vec<AthleteConfig> {
    let mut seen = HashSet::new();
    athletes
        .iter()
        .filter(|athlete| {
            let fresh = seen.insert(athlete.athlete_id());
            if !fresh {
                warn!(
                    "Athlete {} ({}) is configured more than once, fetching once",
                    athlete.name, athlete.parkrun_id
                );
            }
            fresh
        })
        .cloned()
        .collect()
}

fn normalize(athlete_id: &str, results: &FetchedResults) -> (Vec<ResultRow>, usize) {
    let mut rows = Vec::with_capacity(results.rows.len());
    let mut rejected = 0;

    for raw in &results.rows {
        match raw.normalize(athlete_id, &results.verified_name) {
            Ok(row) => rows.push(row),
            Err(e) => {
                rejected += 1;
                warn!(
                    "Rejecting row for {} ({} on {}): {}",
                    athlete_id, raw.event, raw.run_date, e
                );
            }
        }
    }

    (rows, rejected)
}
