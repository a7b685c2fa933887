use crate::chrono::{CalendarSystem, Era};
use crate::error::{DateTimeError, Result};
use crate::field::{ChronoField, ValueRange};
use crate::iso::{util, MAX_YEAR, MIN_YEAR};

const ID: &str = "Minguo";

/// Minguo year 1 is ISO year 1912.
const YEARS_DIFFERENCE: i64 = 1911;

const BEFORE_ROC: Era = Era::new(ID, 0, "BEFORE_ROC");
const ROC: Era = Era::new(ID, 1, "ROC");
const ERAS: [Era; 2] = [BEFORE_ROC, ROC];

/// The calendar of the Republic of China, used in Taiwan. Months and days
/// are those of the ISO calendar; only the year numbering differs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinguoChronology;

impl CalendarSystem for MinguoChronology {
    fn id(&self) -> &str {
        ID
    }

    fn calendar_type(&self) -> Option<&str> {
        Some("roc")
    }

    fn eras(&self) -> &[Era] {
        &ERAS
    }

    fn proleptic_year(&self, era: Era, year_of_era: i64) -> Result<i64> {
        if era == ROC {
            Ok(year_of_era)
        } else if era == BEFORE_ROC {
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
            (ROC, proleptic_year)
        } else {
            (BEFORE_ROC, 1 - proleptic_year)
        }
    }

    fn is_leap_year(&self, proleptic_year: i64) -> bool {
        util::is_leap_year(proleptic_year + YEARS_DIFFERENCE)
    }

    fn range(&self, field: ChronoField) -> ValueRange {
        match field {
            ChronoField::ProlepticMonth => ValueRange::fixed(
                MIN_YEAR * 12 - YEARS_DIFFERENCE * 12,
                MAX_YEAR * 12 + 11 - YEARS_DIFFERENCE * 12,
            ),
            ChronoField::YearOfEra => ValueRange::variable(
                1,
                MAX_YEAR - YEARS_DIFFERENCE,
                -MIN_YEAR + 1 + YEARS_DIFFERENCE,
            ),
            ChronoField::Year => {
                ValueRange::fixed(MIN_YEAR - YEARS_DIFFERENCE, MAX_YEAR - YEARS_DIFFERENCE)
            }
            _ => field.range(),
        }
    }

    fn length_of_month(&self, proleptic_year: i64, month: u8) -> u8 {
        util::days_in_month(proleptic_year + YEARS_DIFFERENCE, month)
    }

    fn length_of_year(&self, proleptic_year: i64) -> u16 {
        util::length_of_year(proleptic_year + YEARS_DIFFERENCE)
    }

    fn check_date(&self, proleptic_year: i64, month: i64, day: i64) -> Result<(u8, u8)> {
        util::check_date(proleptic_year + YEARS_DIFFERENCE, month, day)
    }

    fn epoch_day_of(&self, proleptic_year: i64, month: u8, day: u8) -> i64 {
        util::epoch_day_of(proleptic_year + YEARS_DIFFERENCE, month, day)
    }

    fn ymd_of(&self, epoch_day: i64) -> (i64, u8, u8) {
        let (year, month, day) = util::ymd_of(epoch_day);
        (year - YEARS_DIFFERENCE, month, day)
    }
}
