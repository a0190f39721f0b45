use chrono::NaiveDate;
use serde::Serialize;

use super::result::ResultView;

/// Aggregate figures for one event (venue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub event: String,
    pub count: usize,
    pub best_seconds: u32,
    pub best_time: String,
    /// Mean time, truncated to whole seconds.
    pub mean_seconds: u32,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// A single plotted result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub time_seconds: u32,
    pub time_formatted: String,
    pub position: u32,
    pub age_grade: String,
}

/// All results at one event, split into regular and personal-best points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSeries {
    pub event: String,
    /// Legend label, e.g. `"Bushy parkrun (12)"`.
    pub label: String,
    pub count: usize,
    pub points: Vec<SeriesPoint>,
    pub personal_bests: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStatus {
    Available,
    NoResults,
}

/// Everything a consumer needs to draw one athlete's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AthleteSeriesResponse {
    pub athlete_id: String,
    pub athlete_name: Option<String>,
    pub status: SeriesStatus,
    pub results: Vec<ResultView>,
    pub events: Vec<EventSummary>,
    pub series: Vec<EventSeries>,
}

impl AthleteSeriesResponse {
    pub fn is_empty(&self) -> bool {
        self.status == SeriesStatus::NoResults
    }
}
