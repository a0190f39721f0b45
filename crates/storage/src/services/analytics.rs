//! Derived attributes computed from the result history.
//!
//! Everything here is pure: inputs are borrowed, outputs are new values.
//! Charts, tables and the CLI read these instead of re-implementing the
//! personal-best or time-formatting rules.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::codec::format_time;
use crate::dto::result::ResultView;
use crate::dto::series::{
    AthleteSeriesResponse, EventSeries, EventSummary, SeriesPoint, SeriesStatus,
};
use crate::models::{ResultHistory, ResultRow};

/// Returns the rows (optionally for one athlete) in chronological order with
/// `is_personal_best` recomputed.
///
/// Rows on the same date keep their history order. For each athlete the
/// earliest row is always a personal best; a later row is one only when it is
/// strictly faster than every earlier row of that same athlete.
pub fn derive(history: &ResultHistory, athlete_id: Option<&str>) -> Vec<ResultRow> {
    let mut rows: Vec<ResultRow> = history
        .iter()
        .filter(|row| athlete_id.is_none_or(|id| row.athlete_id == id))
        .cloned()
        .collect();
    rows.sort_by_key(|row| row.date);

    let mut fastest: HashMap<String, u32> = HashMap::new();
    for row in &mut rows {
        let is_pb = match fastest.get(&row.athlete_id) {
            Some(&best) => row.time_seconds < best,
            None => true,
        };
        if is_pb {
            fastest.insert(row.athlete_id.clone(), row.time_seconds);
        }
        row.is_personal_best = is_pb;
    }

    rows
}

/// Number of results per event, most-run first. Ties keep the order in
/// which events first appear in `rows`.
pub fn event_counts(rows: &[ResultRow]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        match index.get(row.event.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(&row.event, counts.len());
                counts.push((row.event.clone(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Per-event statistics in [`event_counts`] order.
pub fn event_summaries(rows: &[ResultRow]) -> Vec<EventSummary> {
    event_counts(rows)
        .into_iter()
        .filter_map(|(event, count)| {
            let at_event: Vec<&ResultRow> = rows.iter().filter(|r| r.event == event).collect();
            let best_seconds = at_event.iter().map(|r| r.time_seconds).min()?;
            let total: u64 = at_event.iter().map(|r| u64::from(r.time_seconds)).sum();
            let first_date = at_event.iter().map(|r| r.date).min()?;
            let last_date = at_event.iter().map(|r| r.date).max()?;

            Some(EventSummary {
                best_time: format_time(best_seconds),
                mean_seconds: (total / count as u64) as u32,
                event,
                count,
                best_seconds,
                first_date,
                last_date,
            })
        })
        .collect()
}

/// Groups rows into one chart series per event, in [`event_counts`] order.
/// Rows are expected to come from [`derive`] so their PB flags are current.
pub fn event_series(rows: &[ResultRow]) -> Vec<EventSeries> {
    event_counts(rows)
        .into_iter()
        .map(|(event, count)| {
            let (personal_bests, points): (Vec<&ResultRow>, Vec<&ResultRow>) = rows
                .iter()
                .filter(|r| r.event == event)
                .partition(|r| r.is_personal_best);

            EventSeries {
                label: format!("{} ({})", event, count),
                event,
                count,
                points: points.into_iter().map(series_point).collect(),
                personal_bests: personal_bests.into_iter().map(series_point).collect(),
            }
        })
        .collect()
}

/// Builds the full response for one athlete. An athlete without results gets
/// an explicit [`SeriesStatus::NoResults`] response rather than an error.
pub fn athlete_series(history: &ResultHistory, athlete_id: &str) -> AthleteSeriesResponse {
    let rows = derive(history, Some(athlete_id));
    let status = if rows.is_empty() {
        SeriesStatus::NoResults
    } else {
        SeriesStatus::Available
    };

    AthleteSeriesResponse {
        athlete_id: athlete_id.to_string(),
        athlete_name: history.athlete_name(athlete_id).map(str::to_string),
        status,
        events: event_summaries(&rows),
        series: event_series(&rows),
        results: rows.into_iter().map(ResultView::from).collect(),
    }
}

/// Latest personal best per athlete, keyed by athlete id.
pub fn current_personal_bests(history: &ResultHistory) -> HashMap<String, (u32, NaiveDate)> {
    let mut bests = HashMap::new();
    for row in derive(history, None) {
        if row.is_personal_best {
            bests.insert(row.athlete_id, (row.time_seconds, row.date));
        }
    }
    bests
}

fn series_point(row: &ResultRow) -> SeriesPoint {
    SeriesPoint {
        date: row.date,
        time_seconds: row.time_seconds,
        time_formatted: format_time(row.time_seconds),
        position: row.position,
        age_grade: row.age_grade.clone(),
    }
}
