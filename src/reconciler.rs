/// Merges the observation and laboratory tables of a lake by sample date.
///
/// Observation rows define which dates exist; laboratory rows only fill in
/// counts for those dates. Laboratory rows for dates without an observation
/// are dropped and counted.
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tracing::{debug, instrument, warn};

use crate::fetch_error::FetchError;
use crate::model::{LabResult, LakeDescriptor, RawLabRow, RawObservationRow, SampleRecord};
use crate::normalize::parse_sample_date;

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// One record per observation date, ascending by date
    pub records: Vec<SampleRecord>,
    /// Dates of laboratory rows that matched no observation row
    pub unmatched_lab_dates: Vec<NaiveDate>,
}

impl Reconciliation {
    /// The record with the most recent sample date
    pub fn latest_record(self) -> Option<SampleRecord> {
        self.records.into_iter().max_by_key(|r| r.sample_date)
    }
}

#[instrument(skip(observations, lab), fields(lake = %lake.name, observations = observations.len(), lab = lab.len()))]
pub fn reconcile(
    lake: &LakeDescriptor,
    observations: Vec<RawObservationRow>,
    lab: Vec<RawLabRow>,
) -> Result<Reconciliation, FetchError> {
    // BTreeMap keeps dates ordered; a repeated date overwrites the earlier row
    let mut by_date: BTreeMap<NaiveDate, SampleRecord> = BTreeMap::new();
    for row in observations {
        let sample_date = parse_sample_date(&row.date)?;
        by_date.insert(
            sample_date,
            SampleRecord {
                lake: lake.clone(),
                sample_date,
                abnormality: row.abnormality,
                sight: row.sight,
                lab: None,
            },
        );
    }

    let mut unmatched_lab_dates = Vec::new();
    for row in lab {
        let sample_date = parse_sample_date(&row.date)?;
        match by_date.get_mut(&sample_date) {
            Some(record) => record.lab = Some(LabResult::from(row)),
            None => unmatched_lab_dates.push(sample_date),
        }
    }

    if !unmatched_lab_dates.is_empty() {
        warn!(
            "Dropped {} laboratory rows without a matching observation date for lake {}: {:?}",
            unmatched_lab_dates.len(),
            lake.name,
            unmatched_lab_dates
        );
    }

    let records: Vec<SampleRecord> = by_date.into_values().collect();
    debug!("Reconciled {} sample dates", records.len());

    Ok(Reconciliation {
        records,
        unmatched_lab_dates,
    })
}

/// Keep only the most recent record per lake name.
///
/// Output follows the order in which each name first appears. On equal dates
/// the later record wins.
pub fn retain_latest(records: Vec<SampleRecord>) -> Vec<SampleRecord> {
    let mut order: Vec<String> = Vec::new();
    let mut latest: HashMap<String, SampleRecord> = HashMap::new();

    for record in records {
        match latest.get(&record.lake.name) {
            Some(existing) if existing.sample_date > record.sample_date => {
                debug!(
                    "Discarding {} sample from {} (newer sample from {} kept)",
                    record.lake.name, record.sample_date, existing.sample_date
                );
            }
            Some(_) => {
                latest.insert(record.lake.name.clone(), record);
            }
            None => {
                order.push(record.lake.name.clone());
                latest.insert(record.lake.name.clone(), record);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|name| latest.remove(&name))
        .collect()
}
