//! Source row and event validation
//!
//! Checks run in a fixed order and stop at the first failure:
//! column count, date, cases, tests, positivity, mortality, hospitalizations.

use crate::domain::{RawDay, RowViolation};
use chrono::{DateTime, NaiveDate};

/// Number of columns in a flat source row
pub const SOURCE_COLUMNS: usize = 6;

/// A decoded but not yet validated source day
///
/// Event payloads arrive already typed, so only sign and range checks remain.
#[derive(Debug, Clone, Copy)]
pub struct UncheckedDay<'a> {
    pub date: &'a str,
    pub daily_new_cases: i64,
    pub tests: i64,
    pub positivity: f64,
    pub mortality: i64,
    pub hospitalizations: i64,
}

/// Parses a source date
///
/// Accepts `YYYY-MM-DD`, or an RFC 3339 timestamp truncated to its date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|d| d.date_naive()))
}

/// Validates one flat source row
///
/// Returns the unindexed day, or the first violation found.
///
/// # Examples
///
/// ```
/// use cobs::core::timeline::validate_row;
/// use cobs::domain::RowViolation;
///
/// let ok = validate_row(&["2020-10-01", "12", "300", "4.5", "0", "3"]);
/// assert!(ok.is_ok());
///
/// let bad = validate_row(&["2020-10-01", "12", "-1", "101", "0", "3"]);
/// assert_eq!(bad.unwrap_err(), RowViolation::TestsNegative);
/// ```
pub fn validate_row<S: AsRef<str>>(fields: &[S]) -> Result<RawDay, RowViolation> {
    if fields.len() != SOURCE_COLUMNS {
        return Err(RowViolation::WrongNumberOfColumns);
    }

    let field = |i: usize| fields[i].as_ref().trim();

    let date = parse_date(field(0)).ok_or(RowViolation::DateUnreadable)?;
    let daily_new_cases = parse_count(
        field(1),
        RowViolation::CasesUnreadable,
        RowViolation::CasesNegative,
    )?;
    let tests = parse_count(
        field(2),
        RowViolation::TestsUnreadable,
        RowViolation::TestsNegative,
    )?;
    let positivity = field(3)
        .parse::<f64>()
        .map_err(|_| RowViolation::PositivityUnreadable)?;
    check_positivity(positivity)?;
    let mortality = parse_count(
        field(4),
        RowViolation::MortalityUnreadable,
        RowViolation::MortalityNegative,
    )?;
    let hospitalizations = parse_count(
        field(5),
        RowViolation::HospitalizationsUnreadable,
        RowViolation::HospitalizationsNegative,
    )?;

    Ok(RawDay::new(
        date,
        daily_new_cases,
        tests,
        positivity,
        mortality,
        hospitalizations,
    ))
}

/// Validates one decoded source event
pub fn validate_event(day: &UncheckedDay<'_>) -> Result<RawDay, RowViolation> {
    let date = parse_date(day.date).ok_or(RowViolation::DateUnreadable)?;
    let daily_new_cases = check_count(
        day.daily_new_cases,
        RowViolation::CasesUnreadable,
        RowViolation::CasesNegative,
    )?;
    let tests = check_count(
        day.tests,
        RowViolation::TestsUnreadable,
        RowViolation::TestsNegative,
    )?;
    check_positivity(day.positivity)?;
    let mortality = check_count(
        day.mortality,
        RowViolation::MortalityUnreadable,
        RowViolation::MortalityNegative,
    )?;
    let hospitalizations = check_count(
        day.hospitalizations,
        RowViolation::HospitalizationsUnreadable,
        RowViolation::HospitalizationsNegative,
    )?;

    Ok(RawDay::new(
        date,
        daily_new_cases,
        tests,
        day.positivity,
        mortality,
        hospitalizations,
    ))
}

fn parse_count(
    value: &str,
    unreadable: RowViolation,
    negative: RowViolation,
) -> Result<u32, RowViolation> {
    let parsed = value.parse::<i64>().map_err(|_| unreadable)?;
    check_count(parsed, unreadable, negative)
}

// Counts must be >= 0; zero is valid.
fn check_count(
    value: i64,
    unreadable: RowViolation,
    negative: RowViolation,
) -> Result<u32, RowViolation> {
    if value < 0 {
        return Err(negative);
    }
    u32::try_from(value).map_err(|_| unreadable)
}

fn check_positivity(value: f64) -> Result<(), RowViolation> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(RowViolation::PositivityOutOfRange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: [&str; 6]) -> Result<RawDay, RowViolation> {
        validate_row(&fields)
    }

    #[test]
    fn test_valid_row() {
        let day = row(["2020-10-01", "12", "300", "4.5", "0", "3"]).unwrap();
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2020, 10, 1).unwrap());
        assert_eq!(day.daily_new_cases, 12);
        assert_eq!(day.tests, 300);
        assert_eq!(day.positivity, 4.5);
        assert_eq!(day.mortality, 0);
        assert_eq!(day.hospitalizations, 3);
        assert!(day.timeline_index.is_none());
    }

    #[test]
    fn test_fields_are_trimmed() {
        assert!(row([" 2020-10-01 ", " 12", "300 ", " 4.5 ", "0", " 3"]).is_ok());
    }

    #[test]
    fn test_wrong_number_of_columns() {
        let result = validate_row(&["2020-10-01", "12", "300"]);
        assert_eq!(result.unwrap_err(), RowViolation::WrongNumberOfColumns);
    }

    #[test]
    fn test_first_violation_wins() {
        // Unreadable date and negative tests: date is checked first.
        let result = row(["yesterday", "12", "-5", "4.5", "0", "3"]);
        assert_eq!(result.unwrap_err(), RowViolation::DateUnreadable);

        let result = row(["2020-10-01", "x", "-5", "400", "-1", "-1"]);
        assert_eq!(result.unwrap_err(), RowViolation::CasesUnreadable);
    }

    #[test]
    fn test_each_field_check() {
        let cases = [
            (["2020-10-01", "-1", "1", "1", "1", "1"], RowViolation::CasesNegative),
            (["2020-10-01", "1", "t", "1", "1", "1"], RowViolation::TestsUnreadable),
            (["2020-10-01", "1", "-1", "1", "1", "1"], RowViolation::TestsNegative),
            (["2020-10-01", "1", "1", "p", "1", "1"], RowViolation::PositivityUnreadable),
            (["2020-10-01", "1", "1", "100.5", "1", "1"], RowViolation::PositivityOutOfRange),
            (["2020-10-01", "1", "1", "-0.1", "1", "1"], RowViolation::PositivityOutOfRange),
            (["2020-10-01", "1", "1", "1", "m", "1"], RowViolation::MortalityUnreadable),
            (["2020-10-01", "1", "1", "1", "-2", "1"], RowViolation::MortalityNegative),
            (["2020-10-01", "1", "1", "1", "1", "h"], RowViolation::HospitalizationsUnreadable),
            (["2020-10-01", "1", "1", "1", "1", "-3"], RowViolation::HospitalizationsNegative),
        ];
        for (fields, expected) in cases {
            assert_eq!(row(fields).unwrap_err(), expected, "fields: {fields:?}");
        }
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        assert!(row(["2020-10-01", "0", "0", "0", "0", "0"]).is_ok());
        assert!(row(["2020-10-01", "0", "0", "100", "0", "0"]).is_ok());
    }

    #[test]
    fn test_rfc3339_date_accepted() {
        let day = row(["2020-10-01T00:00:00Z", "1", "1", "1", "1", "1"]).unwrap();
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2020, 10, 1).unwrap());
    }

    #[test]
    fn test_validate_event() {
        let ok = UncheckedDay {
            date: "2020-10-01",
            daily_new_cases: 5,
            tests: 10,
            positivity: 50.0,
            mortality: 0,
            hospitalizations: 1,
        };
        assert!(validate_event(&ok).is_ok());

        let bad = UncheckedDay {
            mortality: -1,
            hospitalizations: -1,
            ..ok
        };
        assert_eq!(
            validate_event(&bad).unwrap_err(),
            RowViolation::MortalityNegative
        );

        let nan = UncheckedDay {
            positivity: f64::NAN,
            ..ok
        };
        assert_eq!(
            validate_event(&nan).unwrap_err(),
            RowViolation::PositivityOutOfRange
        );
    }
}
