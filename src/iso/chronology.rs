use std::fmt;

use crate::chrono::{CalendarSystem, Era};
use crate::error::{DateTimeError, Result};
use crate::iso::util;

const ID: &str = "ISO";

const BCE: Era = Era::new(ID, 0, "BCE");
const CE: Era = Era::new(ID, 1, "CE");
const ERAS: [Era; 2] = [BCE, CE];

/// The proleptic Gregorian calendar of ISO-8601, in use in most of the world.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoChronology;

impl CalendarSystem for IsoChronology {
    fn id(&self) -> &str {
        ID
    }

    fn calendar_type(&self) -> Option<&str> {
        Some("iso8601")
    }

    fn eras(&self) -> &[Era] {
        &ERAS
    }

    fn proleptic_year(&self, era: Era, year_of_era: i64) -> Result<i64> {
        if era == CE {
            Ok(year_of_era)
        } else if era == BCE {
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
            (CE, proleptic_year)
        } else {
            (BCE, 1 - proleptic_year)
        }
    }

    fn is_leap_year(&self, proleptic_year: i64) -> bool {
        util::is_leap_year(proleptic_year)
    }

    fn length_of_month(&self, proleptic_year: i64, month: u8) -> u8 {
        util::days_in_month(proleptic_year, month)
    }

    fn length_of_year(&self, proleptic_year: i64) -> u16 {
        util::length_of_year(proleptic_year)
    }

    fn check_date(&self, proleptic_year: i64, month: i64, day: i64) -> Result<(u8, u8)> {
        util::check_date(proleptic_year, month, day)
    }

    fn epoch_day_of(&self, proleptic_year: i64, month: u8, day: u8) -> i64 {
        util::epoch_day_of(proleptic_year, month, day)
    }

    fn ymd_of(&self, epoch_day: i64) -> (i64, u8, u8) {
        util::ymd_of(epoch_day)
    }

    fn display_date(
        &self,
        f: &mut fmt::Formatter<'_>,
        proleptic_year: i64,
        month: u8,
        day: u8,
    ) -> fmt::Result {
        util::write_iso_date(f, proleptic_year, month, day)
    }
}
