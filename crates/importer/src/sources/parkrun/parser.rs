//! Extracts the athlete name and the "All Results" table from an athlete page.
//!
//! Columns are located by header text, so a reordered table still parses.

use scraper::{ElementRef, Html, Selector};
use storage::RawResultRow;
use tracing::{debug, warn};

use crate::{ImporterError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAthletePage {
    pub name: String,
    pub rows: Vec<RawResultRow>,
}

struct Columns {
    event: usize,
    run_date: usize,
    run_number: usize,
    position: usize,
    time: usize,
    age_grade: usize,
}

impl Columns {
    fn from_headers(headers: &[String]) -> Result<Self> {
        let find = |aliases: &[&str]| -> Result<usize> {
            headers
                .iter()
                .position(|h| aliases.contains(&h.as_str()))
                .ok_or_else(|| {
                    ImporterError::Parse(format!(
                        "results table has no '{}' column (headers: {})",
                        aliases[0],
                        headers.join(", ")
                    ))
                })
        };

        Ok(Self {
            event: find(&["event"])?,
            run_date: find(&["run date", "date"])?,
            run_number: find(&["run number", "run no."])?,
            position: find(&["pos", "position"])?,
            time: find(&["time"])?,
            age_grade: find(&["age grade", "agegrade"])?,
        })
    }

    fn max_index(&self) -> usize {
        [
            self.event,
            self.run_date,
            self.run_number,
            self.position,
            self.time,
            self.age_grade,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

pub fn parse_athlete_page(html: &str) -> Result<ParsedAthletePage> {
    let document = Html::parse_document(html);

    let name = extract_name(&document)?;
    let table = find_results_table(&document)?;
    let rows = extract_rows(table)?;

    debug!("Parsed {} result row(s) for '{}'", rows.len(), name);
    Ok(ParsedAthletePage { name, rows })
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ImporterError::Parse(format!("invalid selector '{}': {:?}", css, e)))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The page heading reads like `Jane DOE (A123456)`.
fn extract_name(document: &Html) -> Result<String> {
    let h2 = selector("h2")?;
    let heading = document
        .select(&h2)
        .map(element_text)
        .find(|text| !text.is_empty())
        .ok_or_else(|| ImporterError::Parse("athlete name heading not found".to_string()))?;

    let name = match (heading.rfind('('), heading.ends_with(')')) {
        (Some(open), true) => heading[..open].trim().to_string(),
        _ => heading,
    };

    if name.is_empty() {
        return Err(ImporterError::Parse(
            "athlete name heading is empty".to_string(),
        ));
    }
    Ok(name)
}

fn header_texts(table: ElementRef<'_>) -> Result<Vec<String>> {
    let th = selector("th")?;
    Ok(table
        .select(&th)
        .map(|cell| element_text(cell).to_lowercase())
        .collect())
}

fn find_results_table(document: &Html) -> Result<ElementRef<'_>> {
    let table = selector("table")?;
    let caption = selector("caption")?;

    let tables: Vec<ElementRef<'_>> = document.select(&table).collect();

    for candidate in &tables {
        let is_all_results = candidate
            .select(&caption)
            .any(|c| element_text(c).to_lowercase().contains("all results"));
        if is_all_results {
            return Ok(*candidate);
        }
    }

    for candidate in &tables {
        let headers = header_texts(*candidate)?;
        if headers.iter().any(|h| h == "run date") && headers.iter().any(|h| h == "time") {
            return Ok(*candidate);
        }
    }

    Err(ImporterError::Parse(
        "results table not found on athlete page".to_string(),
    ))
}

fn extract_rows(table: ElementRef<'_>) -> Result<Vec<RawResultRow>> {
    let columns = Columns::from_headers(&header_texts(table)?)?;
    let tr = selector("tr")?;
    let td = selector("td")?;

    let mut rows = Vec::new();
    for row in table.select(&tr) {
        let cells: Vec<String> = row.select(&td).map(element_text).collect();
        if cells.is_empty() {
            continue;
        }
        if cells.len() <= columns.max_index() {
            warn!("Skipping short results row with {} cell(s)", cells.len());
            continue;
        }

        rows.push(RawResultRow {
            event: cells[columns.event].clone(),
            run_date: cells[columns.run_date].clone(),
            run_number: cells[columns.run_number].clone(),
            position: cells[columns.position].clone(),
            time: cells[columns.time].clone(),
            age_grade: cells[columns.age_grade].clone(),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<!DOCTYPE html>
<html>
<body>
  <div id="content">
    <h2>Jane DOE <span>(A123456)</span></h2>
    <table id="results">
      <caption>Most Recent Runs</caption>
      <thead><tr><th>Event</th><th>Run Date</th><th>Pos</th><th>Time</th></tr></thead>
      <tbody><tr><td>Ignored</td><td>01/01/2000</td><td>1</td><td>10:00</td></tr></tbody>
    </table>
    <table id="results">
      <caption>All Results</caption>
      <thead>
        <tr>
          <th>Event</th><th>Run Date</th><th>Run Number</th><th>Pos</th>
          <th>Time</th><th>Age Grade</th><th>PB?</th>
        </tr>
      </thead>
      <tbody>
        <tr>
          <td><a href="/bushy/results">Bushy parkrun</a></td>
          <td><a href="/bushy/results/812"><span class="format-date">14/01/2023</span></a></td>
          <td>812</td><td>57</td><td>24:02</td><td>61.45%</td><td>PB</td>
        </tr>
        <tr>
          <td>Hackney Marshes parkrun</td><td>21/01/2023</td><td>501</td>
          <td>33</td><td>23:58</td><td>62.01%</td><td></td>
        </tr>
      </tbody>
    </table>
  </div>
</body>
</html>
"#;

    #[test]
    fn test_parses_name_without_barcode() {
        let page = parse_athlete_page(PAGE).unwrap();
        assert_eq!(page.name, "Jane DOE");
    }

    #[test]
    fn test_picks_all_results_table() {
        let page = parse_athlete_page(PAGE).unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(
            page.rows[0],
            RawResultRow {
                event: "Bushy parkrun".to_string(),
                run_date: "14/01/2023".to_string(),
                run_number: "812".to_string(),
                position: "57".to_string(),
                time: "24:02".to_string(),
                age_grade: "61.45%".to_string(),
            }
        );
        assert_eq!(page.rows[1].event, "Hackney Marshes parkrun");
    }

    #[test]
    fn test_falls_back_to_header_match() {
        let html = r#"
<h2>John Smith</h2>
<table>
  <tr><th>Time</th><th>Event</th><th>Run Date</th><th>Run Number</th><th>Pos</th><th>Age Grade</th></tr>
  <tr><td>19:30</td><td>Bushy parkrun</td><td>07/01/2023</td><td>811</td><td>12</td><td>70.00%</td></tr>
</table>
"#;
        let page = parse_athlete_page(html).unwrap();
        assert_eq!(page.name, "John Smith");
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].time, "19:30");
        assert_eq!(page.rows[0].event, "Bushy parkrun");
    }

    #[test]
    fn test_missing_table_is_parse_error() {
        let err = parse_athlete_page("<h2>Jane Doe</h2><p>No results yet</p>").unwrap_err();
        assert!(matches!(err, ImporterError::Parse(_)));
    }

    #[test]
    fn test_missing_name_is_parse_error() {
        let err = parse_athlete_page("<table><caption>All Results</caption></table>").unwrap_err();
        assert!(matches!(err, ImporterError::Parse(_)));
    }

    #[test]
    fn test_missing_column_is_parse_error() {
        let html = r#"
<h2>Jane Doe</h2>
<table>
  <caption>All Results</caption>
  <tr><th>Event</th><th>Run Date</th><th>Time</th></tr>
</table>
"#;
        let err = parse_athlete_page(html).unwrap_err();
        assert!(err.to_string().contains("run number"));
    }
}
