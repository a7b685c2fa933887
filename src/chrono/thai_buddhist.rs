use crate::chrono::{CalendarSystem, Era};
use crate::error::{DateTimeError, Result};
use crate::field::{ChronoField, ValueRange};
use crate::iso::{util, MAX_YEAR, MIN_YEAR};

const ID: &str = "ThaiBuddhist";

/// Buddhist era year 1 is ISO year -542, so ISO 2023 is BE 2566.
const YEARS_DIFFERENCE: i64 = 543;

const BEFORE_BE: Era = Era::new(ID, 0, "BEFORE_BE");
const BE: Era = Era::new(ID, 1, "BE");
const ERAS: [Era; 2] = [BEFORE_BE, BE];

/// The Thai solar calendar. Identical to ISO apart from the year numbering.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThaiBuddhistChronology;

impl CalendarSystem for ThaiBuddhistChronology {
    fn id(&self) -> &str {
        ID
    }

    fn calendar_type(&self) -> Option<&str> {
        Some("buddhist")
    }

    fn eras(&self) -> &[Era] {
        &ERAS
    }

    fn proleptic_year(&self, era: Era, year_of_era: i64) -> Result<i64> {
        if era == BE {
            Ok(year_of_era)
        } else if era == BEFORE_BE {
            Ok(1 - year_of_era)
        } else {
            Err(DateTimeError::InvalidEra {
                value: era.to_string(),
                chronology: ID.to_string(),
            })
        }
    }

    fn era_and_year_of_era(&self, proleptic_year: i64) -> (Era, i64) {
        if proleptic_year >= 1 {
            (BE, proleptic_year)
        } else {
            (BEFORE_BE, 1 - proleptic_year)
        }
    }

    fn is_leap_year(&self, proleptic_year: i64) -> bool {
        util::is_leap_year(proleptic_year - YEARS_DIFFERENCE)
    }

    fn range(&self, field: ChronoField) -> ValueRange {
        match field {
            ChronoField::ProlepticMonth => ValueRange::fixed(
                MIN_YEAR * 12 + YEARS_DIFFERENCE * 12,
                MAX_YEAR * 12 + 11 + YEARS_DIFFERENCE * 12,
            ),
            ChronoField::YearOfEra => ValueRange::variable(
                1,
                -(MIN_YEAR + YEARS_DIFFERENCE) + 1,
                MAX_YEAR + YEARS_DIFFERENCE,
            ),
            ChronoField::Year => {
                ValueRange::fixed(MIN_YEAR + YEARS_DIFFERENCE, MAX_YEAR + YEARS_DIFFERENCE)
            }
            _ => field.range(),
        }
    }

    fn length_of_month(&self, proleptic_year: i64, month: u8) -> u8 {
        util::days_in_month(proleptic_year - YEARS_DIFFERENCE, month)
    }

    fn length_of_year(&self, proleptic_year: i64) -> u16 {
        util::length_of_year(proleptic_year - YEARS_DIFFERENCE)
    }

    fn check_date(&self, proleptic_year: i64, month: i64, day: i64) -> Result<(u8, u8)> {
        util::check_date(proleptic_year - YEARS_DIFFERENCE, month, day)
    }

    fn epoch_day_of(&self, proleptic_year: i64, month: u8, day: u8) -> i64 {
        util::epoch_day_of(proleptic_year - YEARS_DIFFERENCE, month, day)
    }

    fn ymd_of(&self, epoch_day: i64) -> (i64, u8, u8) {
        let (year, month, day) = util::ymd_of(epoch_day);
        (year + YEARS_DIFFERENCE, month, day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chrono::Chronology;

    #[test]
    fn year_numbering() {
        let thai = Chronology::thai_buddhist();
        let date = thai.date(2566, 1, 15).unwrap();
        assert_eq!(date.epoch_day(), 19372);
        assert_eq!(date.era(), BE);
        assert_eq!(date.to_string(), "ThaiBuddhist BE 2566-01-15");

        let before = thai.date_epoch_day(Chronology::iso().date(-543, 6, 1).unwrap().epoch_day());
        let before = before.unwrap();
        assert_eq!(before.year(), 0);
        assert_eq!(before.era(), BEFORE_BE);
        assert_eq!(before.year_of_era(), 1);
    }

    #[test]
    fn leap_years_follow_iso() {
        let thai = ThaiBuddhistChronology;
        assert!(thai.is_leap_year(2567)); // 2024
        assert!(!thai.is_leap_year(2566)); // 2023
        assert_eq!(thai.length_of_year(2543), 366); // 2000
    }

    #[test]
    fn ranges_are_shifted() {
        let thai = ThaiBuddhistChronology;
        assert_eq!(thai.range(ChronoField::Year).maximum(), 999_999_999 + 543);
        assert_eq!(thai.range(ChronoField::YearOfEra).smallest_maximum(), 999_999_999 - 543 + 1);
        assert_eq!(
            thai.range(ChronoField::ProlepticMonth).minimum(),
            -999_999_999 * 12 + 543 * 12
        );
    }
}
