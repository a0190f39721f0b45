use chrono::NaiveDate;
use serde::Serialize;

use crate::codec::format_time;
use crate::models::ResultRow;

/// A derived result as handed to charts and tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub event: String,
    pub date: NaiveDate,
    pub run_number: u32,
    pub position: u32,
    pub time_seconds: u32,
    pub time_formatted: String,
    pub age_grade: String,
    pub is_personal_best: bool,
    pub athlete_id: String,
    pub athlete_name: String,
}

impl From<ResultRow> for ResultView {
    fn from(row: ResultRow) -> Self {
        Self {
            time_formatted: format_time(row.time_seconds),
            event: row.event,
            date: row.date,
            run_number: row.run_number,
            position: row.position,
            time_seconds: row.time_seconds,
            age_grade: row.age_grade,
            is_personal_best: row.is_personal_best,
            athlete_id: row.athlete_id,
            athlete_name: row.athlete_name,
        }
    }
}
