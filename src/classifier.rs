/// Three-tier bathing water status.
///
/// # Clock injection
/// `classify` takes `now` as a parameter rather than calling `Utc::now()`,
/// so staleness is deterministic in tests.
use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{LakeRecord, NumericValue, SampleRecord, Status};
use crate::normalize::{normalize_record, NormalizedFields};

/// Samples older than this many days are outdated
pub const STALENESS_WINDOW_DAYS: i64 = 30;
/// Intestinal enterococci, KBE/100 ml
pub const ENTEROCOCCI_LIMIT: i64 = 700;
/// Escherichia coli, KBE/100 ml
pub const COLI_LIMIT: i64 = 1800;
/// Abnormality cell value meaning "nothing noticed"
pub const NO_ABNORMALITY: &str = "nein";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SafetyPolicy {
    /// Also require an empty microscopy finding for SAFE
    pub require_empty_microscopy: bool,
}

pub fn is_outdated(sample_date: NaiveDate, now: DateTime<Utc>) -> bool {
    (now.date_naive() - sample_date).num_days() > STALENESS_WINDOW_DAYS
}

fn within(value: Option<NumericValue>, limit: i64) -> bool {
    matches!(value, Some(NumericValue::Value(v)) if v <= limit)
}

/// Classify normalized fields; the outdated check runs first and wins.
pub fn classify(
    sample_date: NaiveDate,
    fields: &NormalizedFields,
    now: DateTime<Utc>,
    policy: &SafetyPolicy,
) -> Status {
    if is_outdated(sample_date, now) {
        return Status::Outdated;
    }

    let microscopy_ok = !policy.require_empty_microscopy
        || fields.microscopy.as_deref().is_some_and(str::is_empty);

    if within(fields.enterococci, ENTEROCOCCI_LIMIT)
        && within(fields.coli, COLI_LIMIT)
        && fields.abnormality.to_lowercase() == NO_ABNORMALITY
        && microscopy_ok
    {
        Status::Safe
    } else {
        Status::Unsafe
    }
}

/// Normalize and classify a reconciled sample into the final record.
pub fn to_lake_record(record: SampleRecord, now: DateTime<Utc>, policy: &SafetyPolicy) -> LakeRecord {
    let fields = normalize_record(&record);
    let status = classify(record.sample_date, &fields, now, policy);
    let lake = record.lake;

    LakeRecord {
        id: lake.id,
        name: lake.name,
        lat: lake.lat,
        lon: lake.lon,
        location: lake.location,
        sample_date: record.sample_date,
        abnormality: fields.abnormality,
        sight: fields.sight,
        enterococci: fields.enterococci,
        coli: fields.coli,
        microscopy: fields.microscopy,
        status,
    }
}
