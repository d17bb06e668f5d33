use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use crate::fetch_error::FetchError;
use crate::model::{LakeDescriptor, RawLabRow, RawObservationRow};

pub const OBSERVATION_COLUMNS: usize = 3;
pub const LAB_COLUMNS: usize = 4;

/// Rows of the first two tables of a lake snippet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedTables {
    pub observations: Vec<RawObservationRow>,
    pub lab: Vec<RawLabRow>,
}

/// Locate the observation and laboratory tables in a lake snippet.
///
/// The first table holds field observations, the second laboratory results.
/// Lakes with several extraction points publish more tables; only the first
/// pair is read.
#[instrument(skip(html, lake), fields(lake = %lake.name, html_size = html.len()))]
pub fn extract_tables(
    html: &str,
    lake: &LakeDescriptor,
    url: &str,
) -> Result<ExtractedTables, FetchError> {
    let document = Html::parse_fragment(html);
    let table_selector = Selector::parse("table").unwrap();

    let tables: Vec<ElementRef> = document.select(&table_selector).collect();
    debug!("Found {} table elements", tables.len());

    if tables.len() < 2 {
        debug!(
            "HTML preview (first 500 chars): {}",
            &html.chars().take(500).collect::<String>()
        );
        return Err(FetchError::DataUnavailable {
            lake: lake.name.clone(),
            url: url.to_string(),
            reason: format!("expected 2 tables, found {}", tables.len()),
        });
    }

    let observations = body_rows(tables[0], OBSERVATION_COLUMNS, "observation", lake)?
        .into_iter()
        .map(|mut cells| {
            let sight = cells.pop().unwrap_or_default();
            let abnormality = cells.pop().unwrap_or_default();
            let date = cells.pop().unwrap_or_default();
            RawObservationRow {
                date,
                abnormality,
                sight,
            }
        })
        .collect::<Vec<_>>();

    let lab = body_rows(tables[1], LAB_COLUMNS, "laboratory", lake)?
        .into_iter()
        .map(|mut cells| {
            let microscopy = cells.pop().unwrap_or_default();
            let coli = cells.pop().unwrap_or_default();
            let enterococci = cells.pop().unwrap_or_default();
            let date = cells.pop().unwrap_or_default();
            RawLabRow {
                date,
                enterococci,
                coli,
                microscopy,
            }
        })
        .collect::<Vec<_>>();

    debug!(
        "Extracted {} observation rows and {} laboratory rows",
        observations.len(),
        lab.len()
    );

    Ok(ExtractedTables { observations, lab })
}

/// Cell texts of every body row that has data cells.
///
/// Header rows made only of `th` cells are skipped. Any other row must have
/// exactly `expected` data cells.
fn body_rows(
    table: ElementRef,
    expected: usize,
    table_name: &'static str,
    lake: &LakeDescriptor,
) -> Result<Vec<Vec<String>>, FetchError> {
    let row_selector = Selector::parse("tbody > tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();

    let mut rows = Vec::new();
    for (idx, row) in table.select(&row_selector).enumerate() {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>())
            .collect();

        if cells.is_empty() {
            debug!("Skipping {} row {} without data cells", table_name, idx + 1);
            continue;
        }

        if cells.len() != expected {
            return Err(FetchError::MalformedRow {
                lake: lake.name.clone(),
                table: table_name,
                row: idx + 1,
                expected,
                found: cells.len(),
            });
        }

        rows.push(cells);
    }

    Ok(rows)
}
