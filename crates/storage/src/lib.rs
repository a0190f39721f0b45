pub mod codec;
pub mod dto;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use error::{ParseError, Result, StorageError};
pub use models::{AthleteConfig, ParkrunId, RawResultRow, ResultHistory, ResultRow};
pub use repository::{AthleteRepository, ResultRepository};
