use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::codec::{parse_date, parse_number, parse_time};
use crate::error::ParseError;

/// A result row exactly as the source printed it, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResultRow {
    pub event: String,
    pub run_date: String,
    pub run_number: String,
    pub position: String,
    pub time: String,
    pub age_grade: String,
}

impl RawResultRow {
    /// Normalizes the raw text and tags the row with its athlete.
    pub fn normalize(
        &self,
        athlete_id: &str,
        athlete_name: &str,
    ) -> Result<ResultRow, ParseError> {
        let position = parse_number("position", &self.position)?;
        if position == 0 {
            return Err(ParseError::InvalidNumber {
                field: "position",
                value: self.position.clone(),
            });
        }

        Ok(ResultRow {
            event: self.event.trim().to_string(),
            date: parse_date(&self.run_date)?,
            run_number: parse_number("run number", &self.run_number)?,
            position,
            time_seconds: parse_time(&self.time)?,
            age_grade: self.age_grade.trim().to_string(),
            is_personal_best: false,
            athlete_id: athlete_id.to_string(),
            athlete_name: athlete_name.to_string(),
        })
    }
}

/// One race result in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub event: String,
    pub date: NaiveDate,
    pub run_number: u32,
    pub position: u32,
    pub time_seconds: u32,
    pub age_grade: String,
    /// Derived; see [`crate::services::analytics::derive`].
    pub is_personal_best: bool,
    pub athlete_id: String,
    pub athlete_name: String,
}

/// Identifies a result slot: one athlete can only run one event per date.
///
/// Field order doubles as the canonical history order, so sorting by key
/// keeps the history chronological.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResultKey {
    pub date: NaiveDate,
    pub athlete_id: String,
    pub event: String,
}

impl ResultRow {
    pub fn key(&self) -> ResultKey {
        ResultKey {
            date: self.date,
            athlete_id: self.athlete_id.clone(),
            event: self.event.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(time: &str, date: &str, position: &str) -> RawResultRow {
        RawResultRow {
            event: " Bushy parkrun ".to_string(),
            run_date: date.to_string(),
            run_number: "812".to_string(),
            position: position.to_string(),
            time: time.to_string(),
            age_grade: "61.45%".to_string(),
        }
    }

    #[test]
    fn test_normalize_valid_row() {
        let row = raw("24:02:00", "14/01/2023", "57")
            .normalize("123456", "Jane Doe")
            .unwrap();

        assert_eq!(row.event, "Bushy parkrun");
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2023, 1, 14).unwrap());
        assert_eq!(row.run_number, 812);
        assert_eq!(row.position, 57);
        assert_eq!(row.time_seconds, 1442);
        assert_eq!(row.age_grade, "61.45%");
        assert!(!row.is_personal_best);
        assert_eq!(row.athlete_id, "123456");
        assert_eq!(row.athlete_name, "Jane Doe");
    }

    #[test]
    fn test_normalize_rejects_bad_time() {
        let err = raw("DNF", "14/01/2023", "57")
            .normalize("123456", "Jane Doe")
            .unwrap_err();
        assert_eq!(err, ParseError::InvalidTime("DNF".to_string()));
    }

    #[test]
    fn test_normalize_rejects_bad_date() {
        assert!(matches!(
            raw("22:58", "2023-01-14", "57").normalize("1", "A"),
            Err(ParseError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_zero_position() {
        assert!(matches!(
            raw("22:58", "14/01/2023", "0").normalize("1", "A"),
            Err(ParseError::InvalidNumber { field: "position", .. })
        ));
    }

    #[test]
    fn test_key_orders_by_date_first() {
        let early = raw("22:58", "14/01/2023", "1").normalize("9", "Z").unwrap();
        let late = raw("22:58", "21/01/2023", "1").normalize("1", "A").unwrap();
        assert!(early.key() < late.key());
    }
}
