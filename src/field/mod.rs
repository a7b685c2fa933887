use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub use value_range::ValueRange;
pub use values::FieldValues;

use crate::chrono::{
    ChronoLocalDate, ChronoLocalDateTime, ChronoZonedDateTime, Chronology, ResolverStyle,
};
use crate::error::{DateTimeError, Result};
use crate::iso::LocalTime;
use crate::temporal::TemporalAccessor;
use crate::zone::ZoneId;

mod value_range;
mod values;

const MIN_YEAR: i64 = crate::iso::MIN_YEAR;
const MAX_YEAR: i64 = crate::iso::MAX_YEAR;

/// The built-in set of date and time fields.
///
/// Ordered from the smallest to the largest unit. Everything from
/// `DayOfWeek` through `Era` is date-based, everything before it is
/// time-based; `InstantSeconds` and `OffsetSeconds` are neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChronoField {
    NanoOfSecond,
    NanoOfDay,
    MicroOfSecond,
    MicroOfDay,
    MilliOfSecond,
    MilliOfDay,
    SecondOfMinute,
    SecondOfDay,
    MinuteOfHour,
    MinuteOfDay,
    HourOfAmPm,
    ClockHourOfAmPm,
    HourOfDay,
    ClockHourOfDay,
    AmPmOfDay,
    DayOfWeek,
    AlignedDayOfWeekInMonth,
    AlignedDayOfWeekInYear,
    DayOfMonth,
    DayOfYear,
    EpochDay,
    AlignedWeekOfMonth,
    AlignedWeekOfYear,
    MonthOfYear,
    ProlepticMonth,
    YearOfEra,
    Year,
    Era,
    InstantSeconds,
    OffsetSeconds,
}

impl ChronoField {
    pub const ALL: [ChronoField; 30] = [
        ChronoField::NanoOfSecond,
        ChronoField::NanoOfDay,
        ChronoField::MicroOfSecond,
        ChronoField::MicroOfDay,
        ChronoField::MilliOfSecond,
        ChronoField::MilliOfDay,
        ChronoField::SecondOfMinute,
        ChronoField::SecondOfDay,
        ChronoField::MinuteOfHour,
        ChronoField::MinuteOfDay,
        ChronoField::HourOfAmPm,
        ChronoField::ClockHourOfAmPm,
        ChronoField::HourOfDay,
        ChronoField::ClockHourOfDay,
        ChronoField::AmPmOfDay,
        ChronoField::DayOfWeek,
        ChronoField::AlignedDayOfWeekInMonth,
        ChronoField::AlignedDayOfWeekInYear,
        ChronoField::DayOfMonth,
        ChronoField::DayOfYear,
        ChronoField::EpochDay,
        ChronoField::AlignedWeekOfMonth,
        ChronoField::AlignedWeekOfYear,
        ChronoField::MonthOfYear,
        ChronoField::ProlepticMonth,
        ChronoField::YearOfEra,
        ChronoField::Year,
        ChronoField::Era,
        ChronoField::InstantSeconds,
        ChronoField::OffsetSeconds,
    ];

    pub fn name(self) -> &'static str {
        use ChronoField::*;
        match self {
            NanoOfSecond => "NanoOfSecond",
            NanoOfDay => "NanoOfDay",
            MicroOfSecond => "MicroOfSecond",
            MicroOfDay => "MicroOfDay",
            MilliOfSecond => "MilliOfSecond",
            MilliOfDay => "MilliOfDay",
            SecondOfMinute => "SecondOfMinute",
            SecondOfDay => "SecondOfDay",
            MinuteOfHour => "MinuteOfHour",
            MinuteOfDay => "MinuteOfDay",
            HourOfAmPm => "HourOfAmPm",
            ClockHourOfAmPm => "ClockHourOfAmPm",
            HourOfDay => "HourOfDay",
            ClockHourOfDay => "ClockHourOfDay",
            AmPmOfDay => "AmPmOfDay",
            DayOfWeek => "DayOfWeek",
            AlignedDayOfWeekInMonth => "AlignedDayOfWeekInMonth",
            AlignedDayOfWeekInYear => "AlignedDayOfWeekInYear",
            DayOfMonth => "DayOfMonth",
            DayOfYear => "DayOfYear",
            EpochDay => "EpochDay",
            AlignedWeekOfMonth => "AlignedWeekOfMonth",
            AlignedWeekOfYear => "AlignedWeekOfYear",
            MonthOfYear => "MonthOfYear",
            ProlepticMonth => "ProlepticMonth",
            YearOfEra => "YearOfEra",
            Year => "Year",
            Era => "Era",
            InstantSeconds => "InstantSeconds",
            OffsetSeconds => "OffsetSeconds",
        }
    }

    /// The range of the field in the ISO calendar, independent of any particular date.
    pub fn range(self) -> ValueRange {
        use ChronoField::*;
        match self {
            NanoOfSecond => ValueRange::fixed(0, 999_999_999),
            NanoOfDay => ValueRange::fixed(0, 86_400 * 1_000_000_000 - 1),
            MicroOfSecond => ValueRange::fixed(0, 999_999),
            MicroOfDay => ValueRange::fixed(0, 86_400 * 1_000_000 - 1),
            MilliOfSecond => ValueRange::fixed(0, 999),
            MilliOfDay => ValueRange::fixed(0, 86_400 * 1000 - 1),
            SecondOfMinute => ValueRange::fixed(0, 59),
            SecondOfDay => ValueRange::fixed(0, 86_400 - 1),
            MinuteOfHour => ValueRange::fixed(0, 59),
            MinuteOfDay => ValueRange::fixed(0, 24 * 60 - 1),
            HourOfAmPm => ValueRange::fixed(0, 11),
            ClockHourOfAmPm => ValueRange::fixed(1, 12),
            HourOfDay => ValueRange::fixed(0, 23),
            ClockHourOfDay => ValueRange::fixed(1, 24),
            AmPmOfDay => ValueRange::fixed(0, 1),
            DayOfWeek => ValueRange::fixed(1, 7),
            AlignedDayOfWeekInMonth => ValueRange::fixed(1, 7),
            AlignedDayOfWeekInYear => ValueRange::fixed(1, 7),
            DayOfMonth => ValueRange::variable(1, 28, 31),
            DayOfYear => ValueRange::variable(1, 365, 366),
            EpochDay => ValueRange::fixed(-365_243_219_162, 365_241_780_471),
            AlignedWeekOfMonth => ValueRange::variable(1, 4, 5),
            AlignedWeekOfYear => ValueRange::fixed(1, 53),
            MonthOfYear => ValueRange::fixed(1, 12),
            ProlepticMonth => ValueRange::fixed(MIN_YEAR * 12, MAX_YEAR * 12 + 11),
            YearOfEra => ValueRange::variable(1, MAX_YEAR, MAX_YEAR + 1),
            Year => ValueRange::fixed(MIN_YEAR, MAX_YEAR),
            Era => ValueRange::fixed(0, 1),
            InstantSeconds => ValueRange::fixed(i64::MIN, i64::MAX),
            OffsetSeconds => ValueRange::fixed(-18 * 3600, 18 * 3600),
        }
    }

    pub fn is_date_based(self) -> bool {
        self >= ChronoField::DayOfWeek && self <= ChronoField::Era
    }

    pub fn is_time_based(self) -> bool {
        self < ChronoField::DayOfWeek
    }

    pub fn base_unit(self) -> ChronoUnit {
        use ChronoField::*;
        match self {
            NanoOfSecond | NanoOfDay => ChronoUnit::Nanos,
            MicroOfSecond | MicroOfDay => ChronoUnit::Micros,
            MilliOfSecond | MilliOfDay => ChronoUnit::Millis,
            SecondOfMinute | SecondOfDay | InstantSeconds | OffsetSeconds => ChronoUnit::Seconds,
            MinuteOfHour | MinuteOfDay => ChronoUnit::Minutes,
            HourOfAmPm | ClockHourOfAmPm | HourOfDay | ClockHourOfDay => ChronoUnit::Hours,
            AmPmOfDay => ChronoUnit::HalfDays,
            DayOfWeek | AlignedDayOfWeekInMonth | AlignedDayOfWeekInYear | DayOfMonth
            | DayOfYear | EpochDay => ChronoUnit::Days,
            AlignedWeekOfMonth | AlignedWeekOfYear => ChronoUnit::Weeks,
            MonthOfYear | ProlepticMonth => ChronoUnit::Months,
            YearOfEra | Year => ChronoUnit::Years,
            Era => ChronoUnit::Eras,
        }
    }

    pub fn check_valid_value(self, value: i64) -> Result<i64> {
        self.range().check_valid_value(value, self)
    }

    pub fn check_valid_int_value(self, value: i64) -> Result<i32> {
        self.range().check_valid_int_value(value, self)
    }
}

impl fmt::Display for ChronoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The built-in set of units of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChronoUnit {
    Nanos,
    Micros,
    Millis,
    Seconds,
    Minutes,
    Hours,
    HalfDays,
    Days,
    Weeks,
    Months,
    Years,
    Decades,
    Centuries,
    Millennia,
    Eras,
    Forever,
}

impl ChronoUnit {
    pub fn name(self) -> &'static str {
        use ChronoUnit::*;
        match self {
            Nanos => "Nanos",
            Micros => "Micros",
            Millis => "Millis",
            Seconds => "Seconds",
            Minutes => "Minutes",
            Hours => "Hours",
            HalfDays => "HalfDays",
            Days => "Days",
            Weeks => "Weeks",
            Months => "Months",
            Years => "Years",
            Decades => "Decades",
            Centuries => "Centuries",
            Millennia => "Millennia",
            Eras => "Eras",
            Forever => "Forever",
        }
    }

    pub fn is_date_based(self) -> bool {
        self >= ChronoUnit::Days && self != ChronoUnit::Forever
    }

    pub fn is_time_based(self) -> bool {
        self < ChronoUnit::Days
    }

    /// Days and longer vary in length with daylight saving and calendar rules.
    pub fn is_duration_estimated(self) -> bool {
        self >= ChronoUnit::Days
    }

    /// Length of a time-based unit in nanoseconds.
    pub(crate) fn nanos(self) -> Option<i64> {
        use ChronoUnit::*;
        match self {
            Nanos => Some(1),
            Micros => Some(1_000),
            Millis => Some(1_000_000),
            Seconds => Some(1_000_000_000),
            Minutes => Some(60 * 1_000_000_000),
            Hours => Some(3600 * 1_000_000_000),
            HalfDays => Some(12 * 3600 * 1_000_000_000),
            _ => None,
        }
    }
}

impl fmt::Display for ChronoUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field, either one of the built-in [`ChronoField`]s or an extension.
#[derive(Clone)]
pub enum TemporalField {
    Chrono(ChronoField),
    Custom(Arc<dyn CustomField>),
}

impl TemporalField {
    pub fn custom(field: impl CustomField + 'static) -> Self {
        TemporalField::Custom(Arc::new(field))
    }

    pub fn name(&self) -> &str {
        match self {
            TemporalField::Chrono(field) => field.name(),
            TemporalField::Custom(field) => field.name(),
        }
    }

    pub fn is_date_based(&self) -> bool {
        match self {
            TemporalField::Chrono(field) => field.is_date_based(),
            TemporalField::Custom(field) => field.is_date_based(),
        }
    }

    pub fn is_time_based(&self) -> bool {
        match self {
            TemporalField::Chrono(field) => field.is_time_based(),
            TemporalField::Custom(field) => field.is_time_based(),
        }
    }

    pub fn range(&self) -> ValueRange {
        match self {
            TemporalField::Chrono(field) => field.range(),
            TemporalField::Custom(field) => field.range(),
        }
    }

    pub fn as_chrono(&self) -> Option<ChronoField> {
        match self {
            TemporalField::Chrono(field) => Some(*field),
            TemporalField::Custom(_) => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, TemporalField::Custom(_))
    }
}

impl From<ChronoField> for TemporalField {
    fn from(field: ChronoField) -> Self {
        TemporalField::Chrono(field)
    }
}

impl PartialEq for TemporalField {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TemporalField::Chrono(a), TemporalField::Chrono(b)) => a == b,
            (TemporalField::Custom(a), TemporalField::Custom(b)) => a.name() == b.name(),
            _ => false,
        }
    }
}

impl Eq for TemporalField {}

impl PartialEq<ChronoField> for TemporalField {
    fn eq(&self, other: &ChronoField) -> bool {
        self.as_chrono() == Some(*other)
    }
}

impl Hash for TemporalField {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.is_custom().hash(state);
        self.name().hash(state);
    }
}

impl fmt::Display for TemporalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for TemporalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalField::Chrono(field) => write!(f, "{:?}", field),
            TemporalField::Custom(field) => write!(f, "Custom({})", field.name()),
        }
    }
}

/// What a custom field's resolve hook can see of the resolution in progress.
pub struct ResolveContext<'a> {
    pub chronology: &'a Chronology,
    pub zone: Option<&'a ZoneId>,
    pub style: ResolverStyle,
}

/// A value produced by a custom field's resolve hook.
#[derive(Debug, Clone)]
pub enum Resolved {
    Date(ChronoLocalDate),
    DateTime(ChronoLocalDateTime),
    Zoned(ChronoZonedDateTime),
    Time(LocalTime),
}

/// Extension point for fields beyond the built-in set.
///
/// Fields are identified by name, so two instances with the same name are
/// treated as the same field.
pub trait CustomField: Send + Sync {
    fn name(&self) -> &str;

    fn is_date_based(&self) -> bool;

    fn is_time_based(&self) -> bool;

    fn range(&self) -> ValueRange;

    fn is_supported_by(&self, temporal: &dyn TemporalAccessor) -> bool;

    fn range_refined_by(&self, _temporal: &dyn TemporalAccessor) -> Result<ValueRange> {
        Ok(self.range())
    }

    fn get_from(&self, temporal: &dyn TemporalAccessor) -> Result<i64>;

    fn adjust_into(&self, _date: &ChronoLocalDate, _value: i64) -> Result<ChronoLocalDate> {
        Err(DateTimeError::UnsupportedField(self.name().to_string()))
    }

    /// Called during resolution while the field is still pending. The hook may
    /// consume and add field values and may return a partially resolved value,
    /// which is merged with what has been resolved so far.
    fn resolve(
        &self,
        _field_values: &mut FieldValues,
        _context: &ResolveContext<'_>,
    ) -> Result<Option<Resolved>> {
        Ok(None)
    }
}
