use std::fmt;

use num_integer::Integer;

use crate::chrono::{ChronoLocalDate, Chronology};
use crate::error::{DateTimeError, Result};
use crate::field::{ChronoField, TemporalField, ValueRange};
use crate::iso::LocalTime;
use crate::zone::{ZoneId, ZoneOffset};

/// Read access to the fields of a date, time or partially resolved value.
pub trait TemporalAccessor {
    fn is_supported(&self, field: &TemporalField) -> bool;

    fn range(&self, field: &TemporalField) -> Result<ValueRange> {
        match field {
            TemporalField::Chrono(f) if self.is_supported(field) => Ok(f.range()),
            TemporalField::Chrono(f) => Err(DateTimeError::UnsupportedField(f.to_string())),
            TemporalField::Custom(custom) => Ok(custom.range()),
        }
    }

    fn get_long(&self, field: &TemporalField) -> Result<i64>;

    /// The value as an `i32`. Fails for fields whose range does not fit, such as
    /// `InstantSeconds`, which must be read with [`get_long`](Self::get_long).
    fn get(&self, field: &TemporalField) -> Result<i32> {
        let range = self.range(field)?;
        if !range.is_int_value() {
            return Err(DateTimeError::UnsupportedField(format!(
                "Invalid field {} for get() method, use get_long() instead",
                field
            )));
        }
        let value = self.get_long(field)?;
        range.check_valid_int_value(value, field)
    }

    fn chronology(&self) -> Option<Chronology> {
        None
    }

    fn zone(&self) -> Option<ZoneId> {
        None
    }

    fn offset(&self) -> Option<ZoneOffset> {
        None
    }

    fn local_date(&self) -> Option<ChronoLocalDate> {
        None
    }

    fn local_time(&self) -> Option<LocalTime> {
        None
    }
}

/// Strategy for adjusting a date, such as "last day of the month".
pub trait TemporalAdjuster {
    fn adjust_into(&self, date: &ChronoLocalDate) -> Result<ChronoLocalDate>;
}

impl<F> TemporalAdjuster for F
where
    F: Fn(&ChronoLocalDate) -> Result<ChronoLocalDate>,
{
    fn adjust_into(&self, date: &ChronoLocalDate) -> Result<ChronoLocalDate> {
        self(date)
    }
}

/// The same date, or the next one falling on `day_of_week`.
pub fn next_or_same(day_of_week: DayOfWeek) -> impl TemporalAdjuster {
    move |date: &ChronoLocalDate| {
        let current = date.day_of_week();
        if current == day_of_week {
            return Ok(date.clone());
        }
        let days = (day_of_week.value() as i64 - current.value() as i64).mod_floor(&7);
        date.plus_days(days)
    }
}

/// The same date, or the previous one falling on `day_of_week`.
pub fn previous_or_same(day_of_week: DayOfWeek) -> impl TemporalAdjuster {
    move |date: &ChronoLocalDate| {
        let current = date.day_of_week();
        if current == day_of_week {
            return Ok(date.clone());
        }
        let days = (current.value() as i64 - day_of_week.value() as i64).mod_floor(&7);
        date.plus_days(-days)
    }
}

pub fn first_day_of_month() -> impl TemporalAdjuster {
    |date: &ChronoLocalDate| date.with(ChronoField::DayOfMonth, 1)
}

pub fn last_day_of_month() -> impl TemporalAdjuster {
    |date: &ChronoLocalDate| date.with(ChronoField::DayOfMonth, date.length_of_month() as i64)
}

pub fn first_day_of_year() -> impl TemporalAdjuster {
    |date: &ChronoLocalDate| date.with(ChronoField::DayOfYear, 1)
}

pub fn last_day_of_year() -> impl TemporalAdjuster {
    |date: &ChronoLocalDate| date.with(ChronoField::DayOfYear, date.length_of_year() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayOfWeek {
    Monday = 1,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn of(value: i64) -> Result<Self> {
        let value = ChronoField::DayOfWeek.check_valid_value(value)?;
        Ok(Self::ALL[(value - 1) as usize])
    }

    /// 1970-01-01 was a Thursday.
    pub fn from_epoch_day(epoch_day: i64) -> Self {
        Self::ALL[(epoch_day + 3).mod_floor(&7) as usize]
    }

    /// ISO numbering, Monday is 1 and Sunday is 7.
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn plus(self, days: i64) -> Self {
        Self::ALL[(self as i64 - 1 + days).mod_floor(&7) as usize]
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
