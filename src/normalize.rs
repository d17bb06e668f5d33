/// Field normalization for bulletin table cells
///
/// The portal publishes counts as free text: plain numbers, censored bounds
/// ("<15", ">2000"), comma separated lists when several extraction points were
/// sampled, and sight depths with a unit suffix. Everything here is a pure
/// function so the classifier never sees raw strings.
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::fetch_error::FetchError;
use crate::model::{NumericValue, SampleRecord};
use crate::utils::remove_whitespace;

/// Sample dates are published day-first, e.g. "07.08.2025"
pub const SAMPLE_DATE_FORMAT: &str = "%d.%m.%Y";

/// Normalized view of a [`SampleRecord`]
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFields {
    pub abnormality: String,
    pub sight: Option<f64>,
    pub enterococci: Option<NumericValue>,
    pub coli: Option<NumericValue>,
    pub microscopy: Option<String>,
}

pub fn parse_sample_date(value: &str) -> Result<NaiveDate, FetchError> {
    NaiveDate::parse_from_str(value.trim(), SAMPLE_DATE_FORMAT)
        .map_err(|_| FetchError::UnparseableDate(value.to_string()))
}

/// Strip whitespace and keep the first value of a comma separated list.
pub fn first_reading(value: &str) -> String {
    let cleaned = remove_whitespace(value);
    match cleaned.split_once(',') {
        Some((first, _)) => first.to_string(),
        None => cleaned,
    }
}

/// Parse a possibly censored count.
///
/// `"<N"` is read as N and `">N"` as N + 1. Anything that is neither a whole
/// number nor a censored bound yields [`NumericValue::ErrorInData`]. German
/// thousands separators ("1.200") are not guessed at.
pub fn get_numeric_value(value: &str) -> NumericValue {
    let cleaned = first_reading(value);

    if let Ok(v) = cleaned.parse::<i64>() {
        return NumericValue::Value(v);
    }

    let bound = || -> Option<i64> {
        let digits: String = cleaned.chars().filter(|c| c.is_ascii_digit()).collect();
        digits.parse::<i64>().ok()
    };

    match cleaned.chars().next() {
        Some('<') => bound().map_or(NumericValue::ErrorInData, NumericValue::Value),
        Some('>') => bound()
            .and_then(|v| v.checked_add(1))
            .map_or(NumericValue::ErrorInData, NumericValue::Value),
        _ => NumericValue::ErrorInData,
    }
}

fn sight_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+(?:\.\d+)?)m?$").expect("sight regex is valid"))
}

/// Sight depth in metres, `None` when the cell holds no usable reading.
pub fn parse_sight(value: &str) -> Option<f64> {
    let cleaned = first_reading(value);
    sight_regex()
        .captures(&cleaned)
        .and_then(|caps| caps[1].parse::<f64>().ok())
}

/// Case is preserved; the classifier compares case-insensitively.
pub fn normalize_abnormality(value: &str) -> String {
    remove_whitespace(value)
}

pub fn normalize_microscopy(value: &str) -> String {
    value.trim().to_string()
}

pub fn normalize_record(record: &SampleRecord) -> NormalizedFields {
    let lab = record.lab.as_ref();
    NormalizedFields {
        abnormality: normalize_abnormality(&record.abnormality),
        sight: parse_sight(&record.sight),
        enterococci: lab.map(|l| get_numeric_value(&l.enterococci)),
        coli: lab.map(|l| get_numeric_value(&l.coli)),
        microscopy: lab.map(|l| normalize_microscopy(&l.microscopy)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LabResult, LakeDescriptor};

    #[test]
    fn test_parse_sample_date_day_first() {
        let date = parse_sample_date(" 07.08.2025\n").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 8, 7).unwrap());
    }

    #[test]
    fn test_parse_sample_date_rejects_iso() {
        let result = parse_sample_date("2025-08-07");
        assert!(matches!(result, Err(FetchError::UnparseableDate(s)) if s == "2025-08-07"));
    }

    #[test]
    fn test_parse_sample_date_rejects_impossible_day() {
        assert!(parse_sample_date("31.02.2025").is_err());
    }

    #[test]
    fn test_first_reading_keeps_first_segment() {
        assert_eq!(first_reading(" 15 , <15, 30"), "15");
        assert_eq!(first_reading("1,5 m"), "1");
        assert_eq!(first_reading(""), "");
    }

    #[test]
    fn test_get_numeric_value_plain() {
        assert_eq!(get_numeric_value("650"), NumericValue::Value(650));
        assert_eq!(get_numeric_value(" 1 200 "), NumericValue::Value(1200));
    }

    #[test]
    fn test_get_numeric_value_less_than_is_bound() {
        for n in [0_i64, 4, 15, 700, 99999] {
            assert_eq!(get_numeric_value(&format!("<{n}")), NumericValue::Value(n));
        }
    }

    #[test]
    fn test_get_numeric_value_greater_than_is_bound_plus_one() {
        for n in [0_i64, 4, 1800, 2000, 24196] {
            assert_eq!(get_numeric_value(&format!(">{n}")), NumericValue::Value(n + 1));
        }
    }

    #[test]
    fn test_get_numeric_value_censored_with_spaces() {
        assert_eq!(get_numeric_value("< 15"), NumericValue::Value(15));
        assert_eq!(get_numeric_value("> 2 000"), NumericValue::Value(2001));
    }

    #[test]
    fn test_get_numeric_value_multi_value_uses_first() {
        assert_eq!(get_numeric_value("<15, 30"), NumericValue::Value(15));
        assert_eq!(get_numeric_value("46,>2000"), NumericValue::Value(46));
    }

    #[test]
    fn test_get_numeric_value_dotted_numbers_are_error_in_data() {
        for text in ["1.200", "2.419,6", "12.9", "15.0"] {
            assert_eq!(get_numeric_value(text), NumericValue::ErrorInData, "text={text:?}");
        }
    }

    #[test]
    fn test_get_numeric_value_error_in_data() {
        for text in ["", "n.b.", "-", "<", ">", "abc<4", "inf", "NaN"] {
            assert_eq!(get_numeric_value(text), NumericValue::ErrorInData, "text={text:?}");
        }
    }

    #[test]
    fn test_get_numeric_value_is_idempotent_on_plain_integers() {
        let once = get_numeric_value(">2000");
        let again = get_numeric_value(&once.value().unwrap().to_string());
        assert_eq!(once, again);
    }

    #[test]
    fn test_parse_sight() {
        assert_eq!(parse_sight("2.5 m"), Some(2.5));
        assert_eq!(parse_sight("3m, 2m"), Some(3.0));
        assert_eq!(parse_sight(">4"), None);
        assert_eq!(parse_sight(""), None);
    }

    #[test]
    fn test_normalize_text_fields() {
        assert_eq!(normalize_abnormality(" Nein \n"), "Nein");
        assert_eq!(normalize_microscopy("  Blaualgen vorhanden "), "Blaualgen vorhanden");
    }

    #[test]
    fn test_normalize_record_without_lab() {
        let record = SampleRecord {
            lake: LakeDescriptor {
                id: "bwls0088".to_string(),
                name: "Cospudener See".to_string(),
                lat: 51.27,
                lon: 12.33,
                location: None,
            },
            sample_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            abnormality: "nein".to_string(),
            sight: "3 m".to_string(),
            lab: None,
        };

        let fields = normalize_record(&record);
        assert_eq!(fields.sight, Some(3.0));
        assert_eq!(fields.enterococci, None);
        assert_eq!(fields.microscopy, None);

        let with_lab = SampleRecord {
            lab: Some(LabResult {
                enterococci: "<15".to_string(),
                coli: ">2000".to_string(),
                microscopy: " ".to_string(),
            }),
            ..record
        };
        let fields = normalize_record(&with_lab);
        assert_eq!(fields.enterococci, Some(NumericValue::Value(15)));
        assert_eq!(fields.coli, Some(NumericValue::Value(2001)));
        assert_eq!(fields.microscopy, Some(String::new()));
    }
}
