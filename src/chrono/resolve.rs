//! Combining date fields into a date.
//!
//! The algorithm is shared by every calendar system. Fields are consumed from
//! the store as they are used, so whatever is left afterwards can be
//! cross-checked against the resolved date.

use num_integer::Integer;
use tracing::{debug, trace};

use crate::chrono::{ChronoLocalDate, Chronology};
use crate::div_rem::{to_int_exact, ExactArith};
use crate::error::{DateTimeError, Result};
use crate::field::{ChronoField, ChronoUnit, FieldValues};
use crate::temporal::{last_day_of_month, next_or_same, DayOfWeek};

/// How strictly field values are interpreted when combining them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolverStyle {
    /// Every value must be within its range and the combination must name an
    /// existing date.
    Strict,
    /// Values must be within their outer range. A day-of-month past the end
    /// of the month is clamped to the last day.
    #[default]
    Smart,
    /// Out-of-range values overflow into the next larger unit.
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combination {
    YearMonthDay,
    YearMonthAlignedWeekAlignedDay,
    YearMonthAlignedWeekDayOfWeek,
    YearDay,
    YearAlignedWeekAlignedDay,
    YearAlignedWeekDayOfWeek,
}

impl Combination {
    fn choose(field_values: &FieldValues) -> Option<Combination> {
        use ChronoField::*;
        if !field_values.contains(Year) {
            return None;
        }
        if field_values.contains(MonthOfYear) {
            if field_values.contains(DayOfMonth) {
                return Some(Combination::YearMonthDay);
            }
            if field_values.contains(AlignedWeekOfMonth) {
                if field_values.contains(AlignedDayOfWeekInMonth) {
                    return Some(Combination::YearMonthAlignedWeekAlignedDay);
                }
                if field_values.contains(DayOfWeek) {
                    return Some(Combination::YearMonthAlignedWeekDayOfWeek);
                }
            }
        }
        if field_values.contains(DayOfYear) {
            return Some(Combination::YearDay);
        }
        if field_values.contains(AlignedWeekOfYear) {
            if field_values.contains(AlignedDayOfWeekInYear) {
                return Some(Combination::YearAlignedWeekAlignedDay);
            }
            if field_values.contains(DayOfWeek) {
                return Some(Combination::YearAlignedWeekDayOfWeek);
            }
        }
        None
    }
}

/// Resolves the date fields in `field_values` into a date, consuming the
/// fields used. Returns `None` when no complete combination is present.
pub(crate) fn resolve_date(
    chronology: &Chronology,
    field_values: &mut FieldValues,
    style: ResolverStyle,
) -> Result<Option<ChronoLocalDate>> {
    if let Some(epoch_day) = field_values.remove(ChronoField::EpochDay) {
        trace!(epoch_day, "resolving date from epoch day");
        return chronology.date_epoch_day(epoch_day).map(Some);
    }
    resolve_proleptic_month(chronology, field_values, style)?;
    resolve_year_of_era(chronology, field_values, style)?;

    let combination = match Combination::choose(field_values) {
        Some(combination) => combination,
        None => return Ok(None),
    };
    trace!(?combination, ?style, chronology = chronology.id(), "resolving date");
    let resolver = Resolver {
        chronology,
        field_values,
        style,
    };
    let date = match combination {
        Combination::YearMonthDay => resolver.year_month_day()?,
        Combination::YearMonthAlignedWeekAlignedDay => resolver.year_month_aligned_aligned()?,
        Combination::YearMonthAlignedWeekDayOfWeek => resolver.year_month_aligned_day_of_week()?,
        Combination::YearDay => resolver.year_day()?,
        Combination::YearAlignedWeekAlignedDay => resolver.year_aligned_aligned()?,
        Combination::YearAlignedWeekDayOfWeek => resolver.year_aligned_day_of_week()?,
    };
    Ok(Some(date))
}

fn resolve_proleptic_month(
    chronology: &Chronology,
    field_values: &mut FieldValues,
    style: ResolverStyle,
) -> Result<()> {
    let proleptic_month = match field_values.remove(ChronoField::ProlepticMonth) {
        Some(value) => value,
        None => return Ok(()),
    };
    if style != ResolverStyle::Lenient {
        chronology
            .range(ChronoField::ProlepticMonth)
            .check_valid_value(proleptic_month, ChronoField::ProlepticMonth)?;
    }
    let date = chronology
        .date_epoch_day(0)?
        .with(ChronoField::DayOfMonth, 1)?
        .with(ChronoField::ProlepticMonth, proleptic_month)?;
    field_values.insert(ChronoField::MonthOfYear, date.month() as i64)?;
    field_values.insert(ChronoField::Year, date.year())?;
    Ok(())
}

fn resolve_year_of_era(
    chronology: &Chronology,
    field_values: &mut FieldValues,
    style: ResolverStyle,
) -> Result<()> {
    let year_of_era = match field_values.remove(ChronoField::YearOfEra) {
        Some(value) => value,
        None => {
            if let Some(era) = field_values.get(ChronoField::Era) {
                chronology
                    .range(ChronoField::Era)
                    .check_valid_value(era, ChronoField::Era)?;
            }
            return Ok(());
        }
    };
    let year_of_era = if style == ResolverStyle::Lenient {
        to_int_exact(year_of_era)?
    } else {
        chronology
            .range(ChronoField::YearOfEra)
            .check_valid_int_value(year_of_era, ChronoField::YearOfEra)?
    };
    let year_of_era = year_of_era as i64;

    if let Some(era) = field_values.remove(ChronoField::Era) {
        let era = chronology
            .range(ChronoField::Era)
            .check_valid_int_value(era, ChronoField::Era)?;
        let era = chronology.era_of(era as i64)?;
        field_values.insert(ChronoField::Year, chronology.proleptic_year(era, year_of_era)?)?;
    } else if let Some(year) = field_values.get(ChronoField::Year) {
        let year = chronology
            .range(ChronoField::Year)
            .check_valid_int_value(year, ChronoField::Year)?;
        let era = chronology.date_year_day(year as i64, 1)?.era();
        field_values.insert(ChronoField::Year, chronology.proleptic_year(era, year_of_era)?)?;
    } else if style == ResolverStyle::Strict {
        // Without an era the year is ambiguous; leave it for the caller.
        field_values.replace(ChronoField::YearOfEra, year_of_era);
    } else {
        let year = match chronology.eras().last() {
            Some(era) => {
                debug!(era = era.name(), year_of_era, "assuming the current era");
                chronology.proleptic_year(*era, year_of_era)?
            }
            None => year_of_era,
        };
        field_values.insert(ChronoField::Year, year)?;
    }
    Ok(())
}

struct Resolver<'a> {
    chronology: &'a Chronology,
    field_values: &'a mut FieldValues,
    style: ResolverStyle,
}

impl Resolver<'_> {
    fn take(&mut self, field: ChronoField) -> Result<i64> {
        self.field_values
            .remove(field)
            .ok_or_else(|| DateTimeError::UnsupportedField(field.to_string()))
    }

    /// Removes a field and checks it against the range of the chronology.
    fn take_valid(&mut self, field: ChronoField) -> Result<i64> {
        let value = self.take(field)?;
        let value = self
            .chronology
            .range(field)
            .check_valid_int_value(value, field)?;
        Ok(value as i64)
    }

    /// Removes a one-based field and returns it zero-based, for lenient
    /// arithmetic.
    fn take_offset(&mut self, field: ChronoField) -> Result<i64> {
        self.take(field)?.sub_exact(1)
    }

    fn is_lenient(&self) -> bool {
        self.style == ResolverStyle::Lenient
    }

    fn check_no_drift(
        &self,
        date: &ChronoLocalDate,
        field: ChronoField,
        expected: i64,
    ) -> Result<()> {
        if self.style == ResolverStyle::Strict && date.field(field)? != expected {
            let unit = if field == ChronoField::Year { "year" } else { "month" };
            return Err(DateTimeError::StrictDrift(unit));
        }
        Ok(())
    }

    fn year_month_day(mut self) -> Result<ChronoLocalDate> {
        let year = self.take_valid(ChronoField::Year)?;
        if self.is_lenient() {
            let months = self.take_offset(ChronoField::MonthOfYear)?;
            let days = self.take_offset(ChronoField::DayOfMonth)?;
            return self
                .chronology
                .date(year, 1, 1)?
                .plus(months, ChronoUnit::Months)?
                .plus(days, ChronoUnit::Days);
        }
        let month = self.take_valid(ChronoField::MonthOfYear)?;
        let day = self.take_valid(ChronoField::DayOfMonth)?;
        match self.chronology.date(year, month, day) {
            Err(err) if self.style == ResolverStyle::Smart => {
                debug!(year, month, day, %err, "clamping day-of-month to end of month");
                self.chronology
                    .date(year, month, 1)?
                    .with_adjuster(&last_day_of_month())
            }
            result => result,
        }
    }

    fn year_day(mut self) -> Result<ChronoLocalDate> {
        let year = self.take_valid(ChronoField::Year)?;
        if self.is_lenient() {
            let days = self.take_offset(ChronoField::DayOfYear)?;
            return self
                .chronology
                .date_year_day(year, 1)?
                .plus(days, ChronoUnit::Days);
        }
        let day_of_year = self.take_valid(ChronoField::DayOfYear)?;
        self.chronology.date_year_day(year, day_of_year)
    }

    fn year_month_aligned_aligned(mut self) -> Result<ChronoLocalDate> {
        let year = self.take_valid(ChronoField::Year)?;
        if self.is_lenient() {
            let months = self.take_offset(ChronoField::MonthOfYear)?;
            let weeks = self.take_offset(ChronoField::AlignedWeekOfMonth)?;
            let days = self.take_offset(ChronoField::AlignedDayOfWeekInMonth)?;
            return self
                .chronology
                .date(year, 1, 1)?
                .plus(months, ChronoUnit::Months)?
                .plus(weeks, ChronoUnit::Weeks)?
                .plus(days, ChronoUnit::Days);
        }
        let month = self.take_valid(ChronoField::MonthOfYear)?;
        let week = self.take_valid(ChronoField::AlignedWeekOfMonth)?;
        let day = self.take_valid(ChronoField::AlignedDayOfWeekInMonth)?;
        let date = self
            .chronology
            .date(year, month, 1)?
            .plus_days((week - 1) * 7 + (day - 1))?;
        self.check_no_drift(&date, ChronoField::MonthOfYear, month)?;
        Ok(date)
    }

    fn year_month_aligned_day_of_week(mut self) -> Result<ChronoLocalDate> {
        let year = self.take_valid(ChronoField::Year)?;
        if self.is_lenient() {
            let months = self.take_offset(ChronoField::MonthOfYear)?;
            let weeks = self.take_offset(ChronoField::AlignedWeekOfMonth)?;
            let day_of_week = self.take(ChronoField::DayOfWeek)?;
            let base = self.chronology.date(year, 1, 1)?;
            return resolve_aligned(&base, months, weeks, day_of_week);
        }
        let month = self.take_valid(ChronoField::MonthOfYear)?;
        let week = self.take_valid(ChronoField::AlignedWeekOfMonth)?;
        let day_of_week = self.take_valid(ChronoField::DayOfWeek)?;
        let date = self
            .chronology
            .date(year, month, 1)?
            .plus_days((week - 1) * 7)?
            .with_adjuster(&next_or_same(DayOfWeek::of(day_of_week)?))?;
        self.check_no_drift(&date, ChronoField::MonthOfYear, month)?;
        Ok(date)
    }

    fn year_aligned_aligned(mut self) -> Result<ChronoLocalDate> {
        let year = self.take_valid(ChronoField::Year)?;
        if self.is_lenient() {
            let weeks = self.take_offset(ChronoField::AlignedWeekOfYear)?;
            let days = self.take_offset(ChronoField::AlignedDayOfWeekInYear)?;
            return self
                .chronology
                .date_year_day(year, 1)?
                .plus(weeks, ChronoUnit::Weeks)?
                .plus(days, ChronoUnit::Days);
        }
        let week = self.take_valid(ChronoField::AlignedWeekOfYear)?;
        let day = self.take_valid(ChronoField::AlignedDayOfWeekInYear)?;
        let date = self
            .chronology
            .date_year_day(year, 1)?
            .plus_days((week - 1) * 7 + (day - 1))?;
        self.check_no_drift(&date, ChronoField::Year, year)?;
        Ok(date)
    }

    fn year_aligned_day_of_week(mut self) -> Result<ChronoLocalDate> {
        let year = self.take_valid(ChronoField::Year)?;
        if self.is_lenient() {
            let weeks = self.take_offset(ChronoField::AlignedWeekOfYear)?;
            let day_of_week = self.take(ChronoField::DayOfWeek)?;
            let base = self.chronology.date_year_day(year, 1)?;
            return resolve_aligned(&base, 0, weeks, day_of_week);
        }
        let week = self.take_valid(ChronoField::AlignedWeekOfYear)?;
        let day_of_week = self.take_valid(ChronoField::DayOfWeek)?;
        let date = self
            .chronology
            .date_year_day(year, 1)?
            .plus_days((week - 1) * 7)?
            .with_adjuster(&next_or_same(DayOfWeek::of(day_of_week)?))?;
        self.check_no_drift(&date, ChronoField::Year, year)?;
        Ok(date)
    }
}

/// Lenient aligned-week resolution. A day-of-week outside 1..=7 moves whole
/// weeks first, so 0 is the Sunday of the week before and 8 the Monday after.
fn resolve_aligned(
    base: &ChronoLocalDate,
    months: i64,
    weeks: i64,
    day_of_week: i64,
) -> Result<ChronoLocalDate> {
    let date = base
        .plus(months, ChronoUnit::Months)?
        .plus(weeks, ChronoUnit::Weeks)?;
    let (extra_weeks, day_index) = day_of_week.sub_exact(1)?.div_mod_floor(&7);
    date.plus_weeks(extra_weeks)?
        .with_adjuster(&next_or_same(DayOfWeek::of(day_index + 1)?))
}
