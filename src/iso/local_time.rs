use std::fmt;

use num_integer::Integer;

use crate::error::{DateTimeError, Result};
use crate::field::{ChronoField, ChronoUnit, TemporalField, ValueRange};
use crate::iso::{
    HOURS_PER_DAY, MINUTES_PER_DAY, MINUTES_PER_HOUR, NANOS_PER_DAY, NANOS_PER_HOUR,
    NANOS_PER_MINUTE, NANOS_PER_SECOND, SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE,
};
use crate::temporal::TemporalAccessor;

/// A time of day with nanosecond precision. The same in every calendar system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalTime {
    hour: u8,
    minute: u8,
    second: u8,
    nano: u32,
}

impl LocalTime {
    pub const MIDNIGHT: LocalTime = LocalTime {
        hour: 0,
        minute: 0,
        second: 0,
        nano: 0,
    };
    pub const NOON: LocalTime = LocalTime {
        hour: 12,
        minute: 0,
        second: 0,
        nano: 0,
    };
    pub const MAX: LocalTime = LocalTime {
        hour: 23,
        minute: 59,
        second: 59,
        nano: 999_999_999,
    };

    pub fn of(hour: i64, minute: i64, second: i64, nano: i64) -> Result<Self> {
        Ok(LocalTime {
            hour: ChronoField::HourOfDay.check_valid_int_value(hour)? as u8,
            minute: ChronoField::MinuteOfHour.check_valid_int_value(minute)? as u8,
            second: ChronoField::SecondOfMinute.check_valid_int_value(second)? as u8,
            nano: ChronoField::NanoOfSecond.check_valid_int_value(nano)? as u32,
        })
    }

    pub fn of_second_of_day(second_of_day: i64, nano: i64) -> Result<Self> {
        ChronoField::SecondOfDay.check_valid_value(second_of_day)?;
        ChronoField::NanoOfSecond.check_valid_value(nano)?;
        Ok(Self::from_nano_of_day(
            second_of_day * NANOS_PER_SECOND + nano,
        ))
    }

    pub fn of_nano_of_day(nano_of_day: i64) -> Result<Self> {
        ChronoField::NanoOfDay.check_valid_value(nano_of_day)?;
        Ok(Self::from_nano_of_day(nano_of_day))
    }

    // Callers guarantee 0 <= nano_of_day < NANOS_PER_DAY.
    pub(crate) fn from_nano_of_day(nano_of_day: i64) -> Self {
        let (hour, rest) = nano_of_day.div_rem(&NANOS_PER_HOUR);
        let (minute, rest) = rest.div_rem(&NANOS_PER_MINUTE);
        let (second, nano) = rest.div_rem(&NANOS_PER_SECOND);
        LocalTime {
            hour: hour as u8,
            minute: minute as u8,
            second: second as u8,
            nano: nano as u32,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn nano(&self) -> u32 {
        self.nano
    }

    pub fn to_second_of_day(&self) -> i64 {
        self.hour as i64 * SECONDS_PER_HOUR
            + self.minute as i64 * SECONDS_PER_MINUTE
            + self.second as i64
    }

    pub fn to_nano_of_day(&self) -> i64 {
        self.to_second_of_day() * NANOS_PER_SECOND + self.nano as i64
    }

    pub(crate) fn field(&self, field: ChronoField) -> Result<i64> {
        use ChronoField::*;
        let hour = self.hour as i64;
        Ok(match field {
            NanoOfSecond => self.nano as i64,
            NanoOfDay => self.to_nano_of_day(),
            MicroOfSecond => self.nano as i64 / 1000,
            MicroOfDay => self.to_nano_of_day() / 1000,
            MilliOfSecond => self.nano as i64 / 1_000_000,
            MilliOfDay => self.to_nano_of_day() / 1_000_000,
            SecondOfMinute => self.second as i64,
            SecondOfDay => self.to_second_of_day(),
            MinuteOfHour => self.minute as i64,
            MinuteOfDay => hour * MINUTES_PER_HOUR + self.minute as i64,
            HourOfAmPm => hour % 12,
            ClockHourOfAmPm => match hour % 12 {
                0 => 12,
                h => h,
            },
            HourOfDay => hour,
            ClockHourOfDay => match hour {
                0 => 24,
                h => h,
            },
            AmPmOfDay => hour / 12,
            _ => return Err(DateTimeError::UnsupportedField(field.to_string())),
        })
    }

    pub fn with(&self, field: ChronoField, value: i64) -> Result<Self> {
        use ChronoField::*;
        if !field.is_time_based() {
            return Err(DateTimeError::UnsupportedField(field.to_string()));
        }
        field.check_valid_value(value)?;
        let hour = self.hour as i64;
        Ok(match field {
            NanoOfSecond => self.with_nano(value),
            NanoOfDay => Self::from_nano_of_day(value),
            MicroOfSecond => self.with_nano(value * 1000),
            MicroOfDay => Self::from_nano_of_day(value * 1000),
            MilliOfSecond => self.with_nano(value * 1_000_000),
            MilliOfDay => Self::from_nano_of_day(value * 1_000_000),
            SecondOfMinute => LocalTime {
                second: value as u8,
                ..*self
            },
            SecondOfDay => self.plus_seconds(value - self.to_second_of_day()),
            MinuteOfHour => LocalTime {
                minute: value as u8,
                ..*self
            },
            MinuteOfDay => {
                self.plus_minutes(value - (hour * MINUTES_PER_HOUR + self.minute as i64))
            }
            HourOfAmPm => self.plus_hours(value - hour % 12),
            ClockHourOfAmPm => self.plus_hours((if value == 12 { 0 } else { value }) - hour % 12),
            HourOfDay => LocalTime {
                hour: value as u8,
                ..*self
            },
            ClockHourOfDay => LocalTime {
                hour: if value == 24 { 0 } else { value as u8 },
                ..*self
            },
            AmPmOfDay => self.plus_hours((value - hour / 12) * 12),
            _ => return Err(DateTimeError::UnsupportedField(field.to_string())),
        })
    }

    fn with_nano(&self, nano: i64) -> Self {
        LocalTime {
            nano: nano as u32,
            ..*self
        }
    }

    pub fn plus_hours(&self, hours: i64) -> Self {
        if hours == 0 {
            return *self;
        }
        let hour = (hours.mod_floor(&HOURS_PER_DAY) + self.hour as i64) % HOURS_PER_DAY;
        LocalTime {
            hour: hour as u8,
            ..*self
        }
    }

    pub fn plus_minutes(&self, minutes: i64) -> Self {
        if minutes == 0 {
            return *self;
        }
        let current = self.hour as i64 * MINUTES_PER_HOUR + self.minute as i64;
        let total = (minutes.mod_floor(&MINUTES_PER_DAY) + current) % MINUTES_PER_DAY;
        if total == current {
            return *self;
        }
        LocalTime {
            hour: (total / MINUTES_PER_HOUR) as u8,
            minute: (total % MINUTES_PER_HOUR) as u8,
            ..*self
        }
    }

    pub fn plus_seconds(&self, seconds: i64) -> Self {
        if seconds == 0 {
            return *self;
        }
        let current = self.to_second_of_day();
        let total = (seconds.mod_floor(&SECONDS_PER_DAY) + current) % SECONDS_PER_DAY;
        if total == current {
            return *self;
        }
        LocalTime {
            hour: (total / SECONDS_PER_HOUR) as u8,
            minute: ((total / SECONDS_PER_MINUTE) % MINUTES_PER_HOUR) as u8,
            second: (total % SECONDS_PER_MINUTE) as u8,
            nano: self.nano,
        }
    }

    pub fn plus_nanos(&self, nanos: i64) -> Self {
        if nanos == 0 {
            return *self;
        }
        let current = self.to_nano_of_day();
        let total = (nanos.mod_floor(&NANOS_PER_DAY) + current) % NANOS_PER_DAY;
        if total == current {
            return *self;
        }
        Self::from_nano_of_day(total)
    }

    /// Adds an amount of a time-based unit, wrapping around midnight.
    pub fn plus(&self, amount: i64, unit: ChronoUnit) -> Result<Self> {
        use ChronoUnit::*;
        Ok(match unit {
            Nanos => self.plus_nanos(amount),
            Micros => self.plus_nanos((amount % (NANOS_PER_DAY / 1000)) * 1000),
            Millis => self.plus_nanos((amount % (NANOS_PER_DAY / 1_000_000)) * 1_000_000),
            Seconds => self.plus_seconds(amount),
            Minutes => self.plus_minutes(amount),
            Hours => self.plus_hours(amount),
            HalfDays => self.plus_hours((amount % 2) * 12),
            _ => return Err(DateTimeError::UnsupportedUnit(unit.to_string())),
        })
    }

    /// Whole units between two times of the same day, negative if `end` is earlier.
    pub fn until(&self, end: &LocalTime, unit: ChronoUnit) -> Result<i64> {
        let nanos_until = end.to_nano_of_day() - self.to_nano_of_day();
        match unit.nanos() {
            Some(unit_nanos) => Ok(nanos_until / unit_nanos),
            None => Err(DateTimeError::UnsupportedUnit(unit.to_string())),
        }
    }

    pub fn is_before(&self, other: &LocalTime) -> bool {
        self < other
    }

    pub fn is_after(&self, other: &LocalTime) -> bool {
        self > other
    }
}

impl TemporalAccessor for LocalTime {
    fn is_supported(&self, field: &TemporalField) -> bool {
        match field {
            TemporalField::Chrono(field) => field.is_time_based(),
            TemporalField::Custom(custom) => custom.is_supported_by(self),
        }
    }

    fn range(&self, field: &TemporalField) -> Result<ValueRange> {
        match field {
            TemporalField::Chrono(f) if f.is_time_based() => Ok(f.range()),
            TemporalField::Chrono(f) => Err(DateTimeError::UnsupportedField(f.to_string())),
            TemporalField::Custom(custom) => custom.range_refined_by(self),
        }
    }

    fn get_long(&self, field: &TemporalField) -> Result<i64> {
        match field {
            TemporalField::Chrono(field) => self.field(*field),
            TemporalField::Custom(custom) => custom.get_from(self),
        }
    }

    fn local_time(&self) -> Option<LocalTime> {
        Some(*self)
    }
}

impl fmt::Display for LocalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)?;
        if self.second > 0 || self.nano > 0 {
            write!(f, ":{:02}", self.second)?;
            if self.nano > 0 {
                if self.nano % 1_000_000 == 0 {
                    write!(f, ".{:03}", self.nano / 1_000_000)?;
                } else if self.nano % 1000 == 0 {
                    write!(f, ".{:06}", self.nano / 1000)?;
                } else {
                    write!(f, ".{:09}", self.nano)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: i64, m: i64, s: i64, n: i64) -> LocalTime {
        LocalTime::of(h, m, s, n).unwrap()
    }

    #[test]
    fn of_validates() {
        assert!(LocalTime::of(24, 0, 0, 0).is_err());
        assert!(LocalTime::of(23, 60, 0, 0).is_err());
        assert!(LocalTime::of(23, 59, 59, 1_000_000_000).is_err());
        assert_eq!(LocalTime::of(23, 59, 59, 999_999_999), Ok(LocalTime::MAX));
    }

    #[test]
    fn nano_of_day_round_trip() {
        let t = time(13, 45, 30, 123_456_789);
        assert_eq!(LocalTime::of_nano_of_day(t.to_nano_of_day()), Ok(t));
        assert_eq!(t.to_second_of_day(), 13 * 3600 + 45 * 60 + 30);
        assert!(LocalTime::of_nano_of_day(NANOS_PER_DAY).is_err());
        assert_eq!(LocalTime::of_second_of_day(3661, 5), Ok(time(1, 1, 1, 5)));
    }

    #[test]
    fn clock_hour_fields() {
        assert_eq!(LocalTime::MIDNIGHT.field(ChronoField::ClockHourOfDay), Ok(24));
        assert_eq!(LocalTime::MIDNIGHT.field(ChronoField::ClockHourOfAmPm), Ok(12));
        let t = time(15, 30, 0, 0);
        assert_eq!(t.field(ChronoField::HourOfAmPm), Ok(3));
        assert_eq!(t.field(ChronoField::AmPmOfDay), Ok(1));
        assert_eq!(t.field(ChronoField::MinuteOfDay), Ok(930));
        assert!(matches!(
            t.field(ChronoField::DayOfMonth),
            Err(DateTimeError::UnsupportedField(_))
        ));
    }

    #[test]
    fn with_fields() {
        let t = time(15, 30, 0, 0);
        assert_eq!(t.with(ChronoField::AmPmOfDay, 0), Ok(time(3, 30, 0, 0)));
        assert_eq!(t.with(ChronoField::ClockHourOfDay, 24), Ok(time(0, 30, 0, 0)));
        assert_eq!(t.with(ChronoField::MilliOfSecond, 7), Ok(time(15, 30, 0, 7_000_000)));
        assert_eq!(t.with(ChronoField::SecondOfDay, 60), Ok(time(0, 1, 0, 0)));
        assert!(t.with(ChronoField::HourOfDay, 24).is_err());
        assert!(t.with(ChronoField::Year, 2000).is_err());
    }

    #[test]
    fn plus_wraps_around_midnight() {
        let t = time(23, 30, 0, 0);
        assert_eq!(t.plus_hours(1), time(0, 30, 0, 0));
        assert_eq!(t.plus_minutes(-24 * 60 - 30), time(23, 0, 0, 0));
        assert_eq!(t.plus_seconds(1800), LocalTime::MIDNIGHT);
        assert_eq!(t.plus_nanos(-1), time(23, 29, 59, 999_999_999));
        assert_eq!(t.plus(3, ChronoUnit::HalfDays), Ok(time(11, 30, 0, 0)));
        assert!(t.plus(1, ChronoUnit::Days).is_err());
    }

    #[test]
    fn until_truncates() {
        let start = time(10, 0, 0, 0);
        let end = time(12, 30, 0, 0);
        assert_eq!(start.until(&end, ChronoUnit::Hours), Ok(2));
        assert_eq!(start.until(&end, ChronoUnit::Minutes), Ok(150));
        assert_eq!(end.until(&start, ChronoUnit::Hours), Ok(-2));
        assert!(start.until(&end, ChronoUnit::Days).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(time(9, 5, 0, 0).to_string(), "09:05");
        assert_eq!(time(9, 5, 7, 0).to_string(), "09:05:07");
        assert_eq!(time(9, 5, 7, 120_000_000).to_string(), "09:05:07.120");
        assert_eq!(time(9, 5, 7, 1_000).to_string(), "09:05:07.000001");
        assert_eq!(time(9, 5, 0, 1).to_string(), "09:05:00.000000001");
    }
}
