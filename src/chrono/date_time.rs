use std::cmp::Ordering;
use std::fmt;

use num_integer::Integer;

use crate::chrono::{ensure_valid, ChronoLocalDate, ChronoZonedDateTime, Chronology};
use crate::div_rem::ExactArith;
use crate::error::Result;
use crate::field::{ChronoField, ChronoUnit, TemporalField, ValueRange};
use crate::instant::Instant;
use crate::iso::{
    LocalTime, HOURS_PER_DAY, MICROS_PER_DAY, MILLIS_PER_DAY, MINUTES_PER_DAY, NANOS_PER_DAY,
    NANOS_PER_HOUR, NANOS_PER_MINUTE, NANOS_PER_SECOND, SECONDS_PER_DAY,
};
use crate::temporal::TemporalAccessor;
use crate::zone::{ZoneId, ZoneOffset};

/// A date in some calendar system together with a time of day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChronoLocalDateTime {
    date: ChronoLocalDate,
    time: LocalTime,
}

impl ChronoLocalDateTime {
    pub fn of(date: ChronoLocalDate, time: LocalTime) -> Self {
        ChronoLocalDateTime { date, time }
    }

    pub fn chronology(&self) -> &Chronology {
        self.date.chronology()
    }

    pub fn to_local_date(&self) -> &ChronoLocalDate {
        &self.date
    }

    pub fn to_local_time(&self) -> LocalTime {
        self.time
    }

    fn with_parts(&self, date: ChronoLocalDate, time: LocalTime) -> Self {
        if date == self.date && time == self.time {
            return self.clone();
        }
        ChronoLocalDateTime { date, time }
    }

    pub fn with(&self, field: impl Into<TemporalField>, value: i64) -> Result<Self> {
        let field = field.into();
        if let TemporalField::Chrono(chrono_field) = field {
            if chrono_field.is_time_based() {
                let time = self.time.with(chrono_field, value)?;
                return Ok(self.with_parts(self.date.clone(), time));
            }
        }
        let date = ensure_valid(self.chronology(), self.date.with(field, value)?)?;
        Ok(self.with_parts(date, self.time))
    }

    pub fn plus(&self, amount: i64, unit: ChronoUnit) -> Result<Self> {
        use ChronoUnit::*;
        match unit {
            Nanos => self.plus_nanos(amount),
            Micros => self
                .plus_days(amount / MICROS_PER_DAY)?
                .plus_nanos((amount % MICROS_PER_DAY) * 1000),
            Millis => self
                .plus_days(amount / MILLIS_PER_DAY)?
                .plus_nanos((amount % MILLIS_PER_DAY) * 1_000_000),
            Seconds => self.plus_seconds(amount),
            Minutes => self.plus_minutes(amount),
            Hours => self.plus_hours(amount),
            HalfDays => self.plus_days(amount / 2)?.plus_hours((amount % 2) * 12),
            _ => {
                let date = ensure_valid(self.chronology(), self.date.plus(amount, unit)?)?;
                Ok(self.with_parts(date, self.time))
            }
        }
    }

    pub fn minus(&self, amount: i64, unit: ChronoUnit) -> Result<Self> {
        if amount == i64::MIN {
            return self.plus(i64::MAX, unit)?.plus(1, unit);
        }
        self.plus(-amount, unit)
    }

    pub fn plus_days(&self, days: i64) -> Result<Self> {
        let date = self.date.plus_days(days)?;
        Ok(self.with_parts(date, self.time))
    }

    pub fn plus_hours(&self, hours: i64) -> Result<Self> {
        self.plus_with_overflow(hours, 0, 0, 0)
    }

    pub fn plus_minutes(&self, minutes: i64) -> Result<Self> {
        self.plus_with_overflow(0, minutes, 0, 0)
    }

    pub fn plus_seconds(&self, seconds: i64) -> Result<Self> {
        self.plus_with_overflow(0, 0, seconds, 0)
    }

    pub fn plus_nanos(&self, nanos: i64) -> Result<Self> {
        self.plus_with_overflow(0, 0, 0, nanos)
    }

    // Whole days are split off each amount first so that no intermediate
    // value can overflow.
    fn plus_with_overflow(&self, hours: i64, minutes: i64, seconds: i64, nanos: i64) -> Result<Self> {
        if (hours | minutes | seconds | nanos) == 0 {
            return Ok(self.clone());
        }
        let mut days = nanos / NANOS_PER_DAY
            + seconds / SECONDS_PER_DAY
            + minutes / MINUTES_PER_DAY
            + hours / HOURS_PER_DAY;
        let current = self.time.to_nano_of_day();
        let total_nanos = nanos % NANOS_PER_DAY
            + (seconds % SECONDS_PER_DAY) * NANOS_PER_SECOND
            + (minutes % MINUTES_PER_DAY) * NANOS_PER_MINUTE
            + (hours % HOURS_PER_DAY) * NANOS_PER_HOUR
            + current;
        let (carry, nano_of_day) = total_nanos.div_mod_floor(&NANOS_PER_DAY);
        days = days.add_exact(carry)?;
        let time = if nano_of_day == current {
            self.time
        } else {
            LocalTime::from_nano_of_day(nano_of_day)
        };
        let date = self.date.plus(days, ChronoUnit::Days)?;
        Ok(self.with_parts(date, time))
    }

    /// Whole units from this date-time to `end`, which is first converted to
    /// this calendar system.
    pub fn until(&self, end: &ChronoLocalDateTime, unit: ChronoUnit) -> Result<i64> {
        let end_date = self.chronology().date_epoch_day(end.date.epoch_day())?;
        let end = ChronoLocalDateTime::of(end_date, end.time);
        if let Some(unit_nanos) = unit.nanos() {
            let mut days = end.date.epoch_day() - self.date.epoch_day();
            if days == 0 {
                return self.time.until(&end.time, unit);
            }
            // Borrow a day so both parts have the same sign.
            let mut time_nanos = end.time.to_nano_of_day() - self.time.to_nano_of_day();
            if days > 0 {
                days -= 1;
                time_nanos += NANOS_PER_DAY;
            } else {
                days += 1;
                time_nanos -= NANOS_PER_DAY;
            }
            let amount = days.mul_exact(NANOS_PER_DAY / unit_nanos)?;
            return amount.add_exact(time_nanos / unit_nanos);
        }
        let mut end_date = end.date.clone();
        if end_date.is_after(&self.date) && end.time.is_before(&self.time) {
            end_date = end_date.plus_days(-1)?;
        } else if end_date.is_before(&self.date) && end.time.is_after(&self.time) {
            end_date = end_date.plus_days(1)?;
        }
        self.date.until(&end_date, unit)
    }

    pub fn to_epoch_second(&self, offset: ZoneOffset) -> i64 {
        self.local_epoch_second() - offset.total_seconds() as i64
    }

    pub(crate) fn local_epoch_second(&self) -> i64 {
        self.date.epoch_day() * SECONDS_PER_DAY + self.time.to_second_of_day()
    }

    pub fn to_instant(&self, offset: ZoneOffset) -> Result<Instant> {
        Instant::of_epoch_second(self.to_epoch_second(offset), self.time.nano() as i64)
    }

    /// Places this date-time in a zone, picking the earlier offset in an
    /// overlap and shifting forward across a gap.
    pub fn at_zone(&self, zone: ZoneId) -> Result<ChronoZonedDateTime> {
        ChronoZonedDateTime::of_best(self.clone(), zone, None)
    }

    pub fn is_before(&self, other: &ChronoLocalDateTime) -> bool {
        self.time_line_cmp(other) == Ordering::Less
    }

    pub fn is_after(&self, other: &ChronoLocalDateTime) -> bool {
        self.time_line_cmp(other) == Ordering::Greater
    }

    /// Same local date-time, whatever the calendar system.
    pub fn is_equal(&self, other: &ChronoLocalDateTime) -> bool {
        self.time_line_cmp(other) == Ordering::Equal
    }

    fn time_line_cmp(&self, other: &ChronoLocalDateTime) -> Ordering {
        self.date
            .epoch_day()
            .cmp(&other.date.epoch_day())
            .then_with(|| self.time.cmp(&other.time))
    }

    fn field_range(&self, field: ChronoField) -> Result<ValueRange> {
        if field.is_time_based() {
            Ok(field.range())
        } else {
            self.date.field_range(field)
        }
    }

    pub(crate) fn field(&self, field: ChronoField) -> Result<i64> {
        if field.is_time_based() {
            self.time.field(field)
        } else {
            self.date.field(field)
        }
    }
}

impl TemporalAccessor for ChronoLocalDateTime {
    fn is_supported(&self, field: &TemporalField) -> bool {
        match field {
            TemporalField::Chrono(field) => field.is_date_based() || field.is_time_based(),
            TemporalField::Custom(custom) => custom.is_supported_by(self),
        }
    }

    fn range(&self, field: &TemporalField) -> Result<ValueRange> {
        match field {
            TemporalField::Chrono(field) => self.field_range(*field),
            TemporalField::Custom(custom) => custom.range_refined_by(self),
        }
    }

    fn get_long(&self, field: &TemporalField) -> Result<i64> {
        match field {
            TemporalField::Chrono(field) => self.field(*field),
            TemporalField::Custom(custom) => custom.get_from(self),
        }
    }

    fn chronology(&self) -> Option<Chronology> {
        Some(self.chronology().clone())
    }

    fn local_date(&self) -> Option<ChronoLocalDate> {
        Some(self.date.clone())
    }

    fn local_time(&self) -> Option<LocalTime> {
        Some(self.time)
    }
}

impl PartialOrd for ChronoLocalDateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChronoLocalDateTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time_line_cmp(other)
            .then_with(|| self.chronology().cmp(other.chronology()))
    }
}

impl fmt::Display for ChronoLocalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}T{}", self.date, self.time)
    }
}
