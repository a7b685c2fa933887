use std::cmp::{min, Ordering};
use std::fmt;

use num_integer::Integer;

use crate::chrono::{ensure_valid, ChronoLocalDateTime, Chronology, Era};
use crate::div_rem::{to_int_exact, ExactArith};
use crate::error::{DateTimeError, Result};
use crate::field::{ChronoField, ChronoUnit, TemporalField, ValueRange};
use crate::iso::LocalTime;
use crate::period::ChronoPeriod;
use crate::temporal::{DayOfWeek, TemporalAccessor, TemporalAdjuster};

/// A date in some calendar system, without time of day or zone.
///
/// Dates are compared on the time-line by epoch day. Dates from different
/// calendar systems on the same day are not equal but are
/// [`is_equal`](Self::is_equal).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChronoLocalDate {
    chronology: Chronology,
    year: i64,
    month: u8,
    day: u8,
}

impl ChronoLocalDate {
    // The caller has validated the date against the chronology.
    pub(crate) fn new(chronology: Chronology, year: i64, month: u8, day: u8) -> Self {
        ChronoLocalDate {
            chronology,
            year,
            month,
            day,
        }
    }

    pub fn chronology(&self) -> &Chronology {
        &self.chronology
    }

    /// The proleptic year.
    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day_of_month(&self) -> u8 {
        self.day
    }

    pub fn era(&self) -> Era {
        self.chronology.system().era_and_year_of_era(self.year).0
    }

    pub fn year_of_era(&self) -> i64 {
        self.chronology.system().era_and_year_of_era(self.year).1
    }

    pub fn day_of_year(&self) -> i64 {
        let start = self.chronology.system().epoch_day_of(self.year, 1, 1);
        self.epoch_day() - start + 1
    }

    pub fn day_of_week(&self) -> DayOfWeek {
        DayOfWeek::from_epoch_day(self.epoch_day())
    }

    pub fn epoch_day(&self) -> i64 {
        self.chronology
            .system()
            .epoch_day_of(self.year, self.month, self.day)
    }

    pub fn proleptic_month(&self) -> i64 {
        self.year * self.chronology.system().months_in_year() as i64 + self.month as i64 - 1
    }

    pub fn is_leap_year(&self) -> bool {
        self.chronology.is_leap_year(self.year)
    }

    pub fn length_of_month(&self) -> u8 {
        self.chronology
            .system()
            .length_of_month(self.year, self.month)
    }

    pub fn length_of_year(&self) -> u16 {
        self.chronology.system().length_of_year(self.year)
    }

    pub(crate) fn field(&self, field: ChronoField) -> Result<i64> {
        use ChronoField::*;
        let day = self.day as i64;
        Ok(match field {
            DayOfWeek => self.day_of_week().value() as i64,
            AlignedDayOfWeekInMonth => (day - 1) % 7 + 1,
            AlignedDayOfWeekInYear => (self.day_of_year() - 1) % 7 + 1,
            DayOfMonth => day,
            DayOfYear => self.day_of_year(),
            EpochDay => self.epoch_day(),
            AlignedWeekOfMonth => (day - 1) / 7 + 1,
            AlignedWeekOfYear => (self.day_of_year() - 1) / 7 + 1,
            MonthOfYear => self.month as i64,
            ProlepticMonth => self.proleptic_month(),
            YearOfEra => self.year_of_era(),
            Year => self.year,
            Era => self.era().value() as i64,
            _ => return Err(DateTimeError::UnsupportedField(field.to_string())),
        })
    }

    pub(crate) fn field_range(&self, field: ChronoField) -> Result<ValueRange> {
        use ChronoField::*;
        if !field.is_date_based() {
            return Err(DateTimeError::UnsupportedField(field.to_string()));
        }
        Ok(match field {
            DayOfMonth => ValueRange::fixed(1, self.length_of_month() as i64),
            DayOfYear => ValueRange::fixed(1, self.length_of_year() as i64),
            AlignedWeekOfMonth => {
                let weeks = if self.length_of_month() <= 28 { 4 } else { 5 };
                ValueRange::fixed(1, weeks)
            }
            YearOfEra => {
                let years = self.chronology.range(Year);
                let max = if self.year <= 0 {
                    1 - years.minimum()
                } else {
                    years.maximum()
                };
                ValueRange::fixed(1, max)
            }
            _ => self.chronology.range(field),
        })
    }

    /// A copy with one field changed. Changing a field may change others, for
    /// example moving to a month with fewer days clamps the day-of-month.
    pub fn with(&self, field: impl Into<TemporalField>, value: i64) -> Result<Self> {
        let result = match field.into() {
            TemporalField::Chrono(field) => self.with_field(field, value)?,
            TemporalField::Custom(custom) => custom.adjust_into(self, value)?,
        };
        ensure_valid(&self.chronology, result)
    }

    fn with_field(&self, field: ChronoField, value: i64) -> Result<Self> {
        use ChronoField::*;
        if !field.is_date_based() {
            return Err(DateTimeError::UnsupportedField(field.to_string()));
        }
        if self.field(field)? == value {
            return Ok(self.clone());
        }
        self.chronology.range(field).check_valid_value(value, field)?;
        match field {
            DayOfWeek | AlignedDayOfWeekInMonth | AlignedDayOfWeekInYear => {
                self.plus_days(value - self.field(field)?)
            }
            DayOfMonth => self.chronology.date(self.year, self.month as i64, value),
            DayOfYear => self.chronology.date_year_day(self.year, value),
            EpochDay => self.chronology.date_epoch_day(value),
            AlignedWeekOfMonth | AlignedWeekOfYear => {
                self.plus_weeks(value - self.field(field)?)
            }
            MonthOfYear => self.resolve_previous_valid(self.year, value),
            ProlepticMonth => self.plus_months(value - self.proleptic_month()),
            YearOfEra => {
                let year = if self.year >= 1 { value } else { 1 - value };
                self.with_year(year)
            }
            Year => self.with_year(value),
            Era => self.with_year(1 - self.year),
            _ => Err(DateTimeError::UnsupportedField(field.to_string())),
        }
    }

    fn with_year(&self, year: i64) -> Result<Self> {
        self.resolve_previous_valid(year, self.month as i64)
    }

    // Keeps the day-of-month unless the month is too short for it.
    fn resolve_previous_valid(&self, year: i64, month: i64) -> Result<Self> {
        let system = self.chronology.system();
        let year = self
            .chronology
            .range(ChronoField::Year)
            .check_valid_value(year, ChronoField::Year)?;
        let (month, _) = system.check_date(year, month, 1)?;
        let day = min(self.day, system.length_of_month(year, month));
        Ok(ChronoLocalDate::new(
            self.chronology.clone(),
            year,
            month,
            day,
        ))
    }

    pub fn with_adjuster(&self, adjuster: &dyn TemporalAdjuster) -> Result<Self> {
        ensure_valid(&self.chronology, adjuster.adjust_into(self)?)
    }

    pub fn plus_days(&self, days: i64) -> Result<Self> {
        if days == 0 {
            return Ok(self.clone());
        }
        let epoch_day = self.epoch_day().add_exact(days)?;
        self.chronology.date_epoch_day(epoch_day)
    }

    pub fn plus_weeks(&self, weeks: i64) -> Result<Self> {
        self.plus_days(weeks.mul_exact(7)?)
    }

    pub fn plus_months(&self, months: i64) -> Result<Self> {
        if months == 0 {
            return Ok(self.clone());
        }
        let months_in_year = self.chronology.system().months_in_year() as i64;
        let month_count = self.proleptic_month().add_exact(months)?;
        let (year, month) = month_count.div_mod_floor(&months_in_year);
        self.resolve_previous_valid(year, month + 1)
    }

    pub fn plus_years(&self, years: i64) -> Result<Self> {
        if years == 0 {
            return Ok(self.clone());
        }
        self.with_year(self.year.add_exact(years)?)
    }

    pub fn plus(&self, amount: i64, unit: ChronoUnit) -> Result<Self> {
        use ChronoUnit::*;
        let result = match unit {
            Days => self.plus_days(amount)?,
            Weeks => self.plus_weeks(amount)?,
            Months => self.plus_months(amount)?,
            Years => self.plus_years(amount)?,
            Decades => self.plus_years(amount.mul_exact(10)?)?,
            Centuries => self.plus_years(amount.mul_exact(100)?)?,
            Millennia => self.plus_years(amount.mul_exact(1000)?)?,
            Eras => {
                let era = self.field(ChronoField::Era)?.add_exact(amount)?;
                self.with(ChronoField::Era, era)?
            }
            _ => return Err(DateTimeError::UnsupportedUnit(unit.to_string())),
        };
        ensure_valid(&self.chronology, result)
    }

    pub fn minus(&self, amount: i64, unit: ChronoUnit) -> Result<Self> {
        if amount == i64::MIN {
            return self.plus(i64::MAX, unit)?.plus(1, unit);
        }
        self.plus(-amount, unit)
    }

    pub fn plus_period(&self, period: &ChronoPeriod) -> Result<Self> {
        period.add_to(self)
    }

    pub fn minus_period(&self, period: &ChronoPeriod) -> Result<Self> {
        period.subtract_from(self)
    }

    /// Whole units from this date to `end`, which is first converted to this
    /// calendar system. Negative if `end` is earlier.
    pub fn until(&self, end: &ChronoLocalDate, unit: ChronoUnit) -> Result<i64> {
        use ChronoUnit::*;
        let end = self.chronology.date_epoch_day(end.epoch_day())?;
        match unit {
            Days => Ok(self.days_until(&end)),
            Weeks => Ok(self.days_until(&end) / 7),
            Months => self.months_until(&end),
            Years => Ok(self.months_until(&end)? / 12),
            Decades => Ok(self.months_until(&end)? / 120),
            Centuries => Ok(self.months_until(&end)? / 1200),
            Millennia => Ok(self.months_until(&end)? / 12000),
            Eras => Ok(end.field(ChronoField::Era)? - self.field(ChronoField::Era)?),
            _ => Err(DateTimeError::UnsupportedUnit(unit.to_string())),
        }
    }

    fn days_until(&self, end: &ChronoLocalDate) -> i64 {
        end.epoch_day() - self.epoch_day()
    }

    // Packing month and day keeps the count monotonic whatever the month
    // lengths, e.g. Jan 31 to Feb 28 is not yet a whole month.
    fn months_until(&self, end: &ChronoLocalDate) -> Result<i64> {
        let months_in_year = self.chronology.range(ChronoField::MonthOfYear).maximum();
        if months_in_year != 12 {
            return Err(DateTimeError::UnsupportedUnit(format!(
                "Months in chronology {} with {} months per year",
                self.chronology, months_in_year
            )));
        }
        let packed1 = self.proleptic_month() * 32 + self.day as i64;
        let packed2 = end.proleptic_month() * 32 + end.day as i64;
        Ok((packed2 - packed1) / 32)
    }

    /// The amount of time from this date to `end` as years, months and days
    /// of this calendar system.
    pub fn until_date(&self, end: &ChronoLocalDate) -> Result<ChronoPeriod> {
        let end = self.chronology.date_epoch_day(end.epoch_day())?;
        let mut total_months = end.proleptic_month() - self.proleptic_month();
        let mut days = end.day as i64 - self.day as i64;
        if total_months > 0 && days < 0 {
            total_months -= 1;
            let calc_date = self.plus_months(total_months)?;
            days = end.epoch_day() - calc_date.epoch_day();
        } else if total_months < 0 && days > 0 {
            total_months += 1;
            days -= end.length_of_month() as i64;
        }
        let months_in_year = self.chronology.system().months_in_year() as i64;
        let years = total_months / months_in_year;
        let months = total_months % months_in_year;
        Ok(self.chronology.period(
            to_int_exact(years)?,
            months as i32,
            to_int_exact(days)?,
        ))
    }

    pub fn at_time(&self, time: LocalTime) -> ChronoLocalDateTime {
        ChronoLocalDateTime::of(self.clone(), time)
    }

    pub fn is_before(&self, other: &ChronoLocalDate) -> bool {
        self.epoch_day() < other.epoch_day()
    }

    pub fn is_after(&self, other: &ChronoLocalDate) -> bool {
        self.epoch_day() > other.epoch_day()
    }

    /// Same day on the time-line, whatever the calendar system.
    pub fn is_equal(&self, other: &ChronoLocalDate) -> bool {
        self.epoch_day() == other.epoch_day()
    }
}

impl TemporalAccessor for ChronoLocalDate {
    fn is_supported(&self, field: &TemporalField) -> bool {
        match field {
            TemporalField::Chrono(field) => field.is_date_based(),
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
        Some(self.chronology.clone())
    }

    fn local_date(&self) -> Option<ChronoLocalDate> {
        Some(self.clone())
    }
}

impl PartialOrd for ChronoLocalDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChronoLocalDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch_day()
            .cmp(&other.epoch_day())
            .then_with(|| self.chronology.cmp(&other.chronology))
    }
}

impl fmt::Display for ChronoLocalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chronology
            .system()
            .display_date(f, self.year, self.month, self.day)
    }
}
