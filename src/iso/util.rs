use std::fmt;

use crate::div_rem::RemFloor;
use crate::error::{DateTimeError, Result};
use crate::field::ChronoField;
use crate::gregorian_normalized_date::GregorianNormalizedDate;

const GREGORIAN_MONTH_LENGTHS_NON_LEAP_YEAR: [u8; 12] =
    [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

const MONTH_NAMES: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

pub(crate) fn is_leap_year(year: i64) -> bool {
    // Get offset into cycle first so we can do this with smaller integers.
    let year = year.rem_floor(400);
    let year = year as u16;
    year % 4 == 0 && (year % 100 != 0 || year == 0)
}

pub(crate) fn days_in_month(year: i64, month: u8) -> u8 {
    debug_assert!((1..=12).contains(&month), "Month must be in range 1-12");
    if month == 2 && is_leap_year(year) {
        29
    } else {
        GREGORIAN_MONTH_LENGTHS_NON_LEAP_YEAR[(month - 1) as usize]
    }
}

pub(crate) fn length_of_year(year: i64) -> u16 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

pub(crate) fn epoch_day_of(year: i64, month: u8, day: u8) -> i64 {
    GregorianNormalizedDate::from_date(year, month, day).to_epoch_day()
}

pub(crate) fn ymd_of(epoch_day: i64) -> (i64, u8, u8) {
    GregorianNormalizedDate::from_epoch_day(epoch_day).to_date()
}

/// Validates an ISO year, month and day and narrows month and day.
pub(crate) fn check_date(year: i64, month: i64, day: i64) -> Result<(u8, u8)> {
    ChronoField::Year.check_valid_value(year)?;
    let month = ChronoField::MonthOfYear.check_valid_int_value(month)? as u8;
    let day = ChronoField::DayOfMonth.check_valid_int_value(day)? as u8;
    if day > 28 && day > days_in_month(year, month) {
        let name = MONTH_NAMES[(month - 1) as usize];
        return Err(if day == 29 {
            DateTimeError::InvalidDate(format!(
                "Invalid date '{} 29' as '{}' is not a leap year",
                name, year
            ))
        } else {
            DateTimeError::InvalidDate(format!("Invalid date '{} {}'", name, day))
        });
    }
    Ok((month, day))
}

/// Writes `yyyy-MM-dd`, with at least four year digits and a sign for years
/// beyond 9999.
pub(crate) fn write_iso_date(
    f: &mut fmt::Formatter<'_>,
    year: i64,
    month: u8,
    day: u8,
) -> fmt::Result {
    if year.abs() < 1000 {
        if year < 0 {
            write!(f, "-{:04}", -year)?;
        } else {
            write!(f, "{:04}", year)?;
        }
    } else {
        if year > 9999 {
            f.write_str("+")?;
        }
        write!(f, "{}", year)?;
    }
    write!(f, "-{:02}-{:02}", month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_leap_year() {
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2023));
        assert!(is_leap_year(0));
        assert!(is_leap_year(-4));
        assert!(!is_leap_year(-100));
        assert!(is_leap_year(-400));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 4), 30);
        assert_eq!(days_in_month(2023, 12), 31);
        assert_eq!(length_of_year(2024), 366);
    }

    #[test]
    fn check_date_messages() {
        assert_eq!(check_date(2024, 2, 29), Ok((2, 29)));
        assert_eq!(
            check_date(2023, 2, 29).unwrap_err().to_string(),
            "Invalid date: Invalid date 'FEBRUARY 29' as '2023' is not a leap year"
        );
        assert_eq!(
            check_date(2023, 4, 31),
            Err(DateTimeError::InvalidDate(
                "Invalid date 'APRIL 31'".to_string()
            ))
        );
        assert!(matches!(
            check_date(2023, 13, 1),
            Err(DateTimeError::Range { .. })
        ));
        assert!(matches!(
            check_date(1_000_000_000, 1, 1),
            Err(DateTimeError::Range { .. })
        ));
    }

    #[test]
    fn epoch_day_extremes_round_trip() {
        let min = epoch_day_of(crate::iso::MIN_YEAR, 1, 1);
        let max = epoch_day_of(crate::iso::MAX_YEAR, 12, 31);
        assert_eq!(min, ChronoField::EpochDay.range().minimum());
        assert_eq!(max, ChronoField::EpochDay.range().maximum());
        assert_eq!(ymd_of(min), (crate::iso::MIN_YEAR, 1, 1));
        assert_eq!(ymd_of(max), (crate::iso::MAX_YEAR, 12, 31));
    }
}
