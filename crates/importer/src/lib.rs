pub mod config;
pub mod error;
pub mod pipeline;
pub mod sources;
pub mod traits;

pub use config::PipelineConfig;
pub use error::{FailureKind, ImporterError, Result};
pub use pipeline::{
    AthleteOutcome, IngestionPipeline, IngestionReport, OutcomeStatus, PersistenceOutcome,
};
pub use traits::{FetchedResults, ResultFetcher, verify_identity};

pub use sources::parkrun::{ParkrunClient, ParkrunFetcher};
