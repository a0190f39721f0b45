use serde::Serialize;

use super::result::ResultRow;

/// The persisted collection of results for every tracked athlete.
///
/// Rows are kept in canonical order (date, athlete, event). The only way to
/// add rows to an existing history is
/// [`crate::repository::ResultRepository::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultHistory {
    rows: Vec<ResultRow>,
}

impl ResultHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a history from rows as they are, sorting them into canonical
    /// order. Duplicate keys are not collapsed here.
    pub fn from_rows(mut rows: Vec<ResultRow>) -> Self {
        rows.sort_by_key(ResultRow::key);
        Self { rows }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultRow> {
        self.rows.iter()
    }

    /// Athlete ids in order of first appearance.
    pub fn athlete_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !ids.contains(&row.athlete_id.as_str()) {
                ids.push(&row.athlete_id);
            }
        }
        ids
    }

    /// Display name from the athlete's most recent result.
    pub fn athlete_name(&self, athlete_id: &str) -> Option<&str> {
        self.rows
            .iter()
            .rev()
            .find(|row| row.athlete_id == athlete_id)
            .map(|row| row.athlete_name.as_str())
    }
}

impl<'a> IntoIterator for &'a ResultHistory {
    type Item = &'a ResultRow;
    type IntoIter = std::slice::Iter<'a, ResultRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl From<Vec<ResultRow>> for ResultHistory {
    fn from(rows: Vec<ResultRow>) -> Self {
        Self::from_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    fn row(athlete: &str, name: &str, event: &str, day: u32) -> ResultRow {
        ResultRow {
            event: event.to_string(),
            date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
            run_number: 1,
            position: 1,
            time_seconds: 1400,
            age_grade: String::new(),
            is_personal_best: false,
            athlete_id: athlete.to_string(),
            athlete_name: name.to_string(),
        }
    }

    #[test]
    fn test_from_rows_sorts_canonically() {
        let history = ResultHistory::from_rows(vec![
            row("2", "B", "Bushy", 14),
            row("1", "A", "Bushy", 21),
            row("1", "A", "Bushy", 14),
        ]);

        let order: Vec<(&str, u32)> = history
            .iter()
            .map(|r| (r.athlete_id.as_str(), r.date.day()))
            .collect();
        assert_eq!(order, vec![("1", 14), ("2", 14), ("1", 21)]);
    }

    #[test]
    fn test_athlete_ids_first_seen_order() {
        let history = ResultHistory::from_rows(vec![
            row("2", "B", "Bushy", 7),
            row("1", "A", "Bushy", 14),
            row("2", "B", "Bushy", 21),
        ]);
        assert_eq!(history.athlete_ids(), vec!["2", "1"]);
    }

    #[test]
    fn test_athlete_name_uses_latest_row() {
        let history = ResultHistory::from_rows(vec![
            row("1", "Jane Smith", "Bushy", 7),
            row("1", "Jane Doe", "Bushy", 14),
        ]);
        assert_eq!(history.athlete_name("1"), Some("Jane Doe"));
        assert_eq!(history.athlete_name("2"), None);
    }
}
