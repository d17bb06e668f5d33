use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

/// A bathing lake as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LakeDescriptor {
    /// Site code used by the state health portal (e.g. "bgwl0085")
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

// Raw rows as they come out of the snippet tables (cell text, untouched)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObservationRow {
    pub date: String,
    pub abnormality: String,
    pub sight: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLabRow {
    pub date: String,
    pub enterococci: String,
    pub coli: String,
    pub microscopy: String,
}

/// Laboratory cell texts overlaid onto an observation date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabResult {
    pub enterococci: String,
    pub coli: String,
    pub microscopy: String,
}

impl From<RawLabRow> for LabResult {
    fn from(row: RawLabRow) -> Self {
        Self {
            enterococci: row.enterococci,
            coli: row.coli,
            microscopy: row.microscopy,
        }
    }
}

/// One reconciled sample for a lake: observation fields plus the matching
/// laboratory fields, if the laboratory table had the same date.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    pub lake: LakeDescriptor,
    pub sample_date: NaiveDate,
    pub abnormality: String,
    pub sight: String,
    pub lab: Option<LabResult>,
}

/// Result of normalizing a (possibly censored) count.
///
/// Serialized as a plain integer, or as the string `"error_in_data"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericValue {
    Value(i64),
    ErrorInData,
}

impl NumericValue {
    pub const ERROR_IN_DATA: &'static str = "error_in_data";

    pub fn value(&self) -> Option<i64> {
        match self {
            NumericValue::Value(v) => Some(*v),
            NumericValue::ErrorInData => None,
        }
    }
}

impl Serialize for NumericValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NumericValue::Value(v) => serializer.serialize_i64(*v),
            NumericValue::ErrorInData => serializer.serialize_str(Self::ERROR_IN_DATA),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Last sample is older than the staleness window
    Outdated,
    Safe,
    Unsafe,
}

/// Final per-lake record handed to the map renderer.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LakeRecord {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub sample_date: NaiveDate,
    pub abnormality: String,
    /// Secchi depth in metres
    pub sight: Option<f64>,
    /// KBE/100 ml; `null` when the laboratory table has no row for this date
    #[schema(value_type = Option<Object>)]
    pub enterococci: Option<NumericValue>,
    #[schema(value_type = Option<Object>)]
    pub coli: Option<NumericValue>,
    pub microscopy: Option<String>,
    pub status: Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    DataUnavailable,
    MalformedRow,
    UnparseableDate,
    FetchFailed,
    UnmatchedLabRows,
}

/// Operator-facing note about a lake that could not be (fully) processed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LakeDiagnostic {
    pub lake_id: String,
    pub lake_name: String,
    pub url: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LakeDataset {
    pub generated_at: DateTime<Utc>,
    pub records: Vec<LakeRecord>,
    pub diagnostics: Vec<LakeDiagnostic>,
}

impl LakeDataset {
    pub fn find(&self, lake_id: &str) -> Option<&LakeRecord> {
        self.records.iter().find(|r| r.id == lake_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_value_serializes_as_number_or_sentinel() {
        assert_eq!(serde_json::to_string(&NumericValue::Value(42)).unwrap(), "42");
        assert_eq!(
            serde_json::to_string(&NumericValue::ErrorInData).unwrap(),
            "\"error_in_data\""
        );
    }

    #[test]
    fn test_status_serializes_screaming_case() {
        assert_eq!(serde_json::to_string(&Status::Outdated).unwrap(), "\"OUTDATED\"");
        assert_eq!(serde_json::to_string(&Status::Unsafe).unwrap(), "\"UNSAFE\"");
    }

    #[test]
    fn test_descriptor_location_is_optional() {
        let lake: LakeDescriptor =
            serde_json::from_str(r#"{"id":"bwwl0101","name":"Harthsee","lat":51.08,"lon":12.54}"#)
                .unwrap();
        assert_eq!(lake.location, None);
    }
}
