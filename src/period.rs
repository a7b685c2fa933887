// A period counts calendar slots such as "5 months", unlike a duration, which
// measures elapsed time. One month from January 31st and one month from
// February 28th are different numbers of days, but the same period.

use std::fmt;

use crate::chrono::{ChronoLocalDate, Chronology};
use crate::div_rem::{to_int_exact, ExactArith};
use crate::error::{DateTimeError, Result};
use crate::field::{ChronoField, ChronoUnit};

/// An amount of years, months and days in a particular calendar system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChronoPeriod {
    chronology: Chronology,
    years: i32,
    months: i32,
    days: i32,
}

impl ChronoPeriod {
    pub fn of(chronology: Chronology, years: i32, months: i32, days: i32) -> Self {
        ChronoPeriod {
            chronology,
            years,
            months,
            days,
        }
    }

    pub fn zero(chronology: Chronology) -> Self {
        Self::of(chronology, 0, 0, 0)
    }

    pub fn chronology(&self) -> &Chronology {
        &self.chronology
    }

    pub fn years(&self) -> i32 {
        self.years
    }

    pub fn months(&self) -> i32 {
        self.months
    }

    pub fn days(&self) -> i32 {
        self.days
    }

    pub fn units(&self) -> [ChronoUnit; 3] {
        [ChronoUnit::Years, ChronoUnit::Months, ChronoUnit::Days]
    }

    pub fn get(&self, unit: ChronoUnit) -> Result<i64> {
        match unit {
            ChronoUnit::Years => Ok(self.years as i64),
            ChronoUnit::Months => Ok(self.months as i64),
            ChronoUnit::Days => Ok(self.days as i64),
            _ => Err(DateTimeError::UnsupportedUnit(unit.to_string())),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }

    pub fn is_negative(&self) -> bool {
        self.years < 0 || self.months < 0 || self.days < 0
    }

    fn check_same_chronology(&self, other: &Chronology) -> Result<()> {
        if &self.chronology != other {
            return Err(DateTimeError::ChronologyMismatch {
                expected: self.chronology.id().to_string(),
                actual: other.id().to_string(),
            });
        }
        Ok(())
    }

    pub fn plus(&self, other: &ChronoPeriod) -> Result<Self> {
        self.check_same_chronology(&other.chronology)?;
        Ok(Self::of(
            self.chronology.clone(),
            self.years.add_exact(other.years)?,
            self.months.add_exact(other.months)?,
            self.days.add_exact(other.days)?,
        ))
    }

    pub fn minus(&self, other: &ChronoPeriod) -> Result<Self> {
        self.check_same_chronology(&other.chronology)?;
        Ok(Self::of(
            self.chronology.clone(),
            self.years.sub_exact(other.years)?,
            self.months.sub_exact(other.months)?,
            self.days.sub_exact(other.days)?,
        ))
    }

    pub fn multiplied_by(&self, scalar: i32) -> Result<Self> {
        if self.is_zero() || scalar == 1 {
            return Ok(self.clone());
        }
        Ok(Self::of(
            self.chronology.clone(),
            self.years.mul_exact(scalar)?,
            self.months.mul_exact(scalar)?,
            self.days.mul_exact(scalar)?,
        ))
    }

    pub fn negated(&self) -> Result<Self> {
        self.multiplied_by(-1)
    }

    /// Moves whole years out of the months, keeping both with the same sign.
    /// Calendars with a variable number of months per year are left as they
    /// are.
    pub fn normalized(&self) -> Result<Self> {
        let month_range = match self.month_range() {
            Some(month_range) => month_range,
            None => return Ok(self.clone()),
        };
        let total_months = (self.years as i64).mul_exact(month_range)? + self.months as i64;
        let years = to_int_exact(total_months / month_range)?;
        let months = (total_months % month_range) as i32;
        if years == self.years && months == self.months {
            return Ok(self.clone());
        }
        Ok(Self::of(self.chronology.clone(), years, months, self.days))
    }

    fn month_range(&self) -> Option<i64> {
        let range = self.chronology.range(ChronoField::MonthOfYear);
        if range.is_fixed() {
            Some(range.maximum() - range.minimum() + 1)
        } else {
            None
        }
    }

    /// Adds the period to a date of the same calendar system.
    pub fn add_to(&self, date: &ChronoLocalDate) -> Result<ChronoLocalDate> {
        self.check_same_chronology(date.chronology())?;
        let date = self.add_months_and_years(date, 1)?;
        date.plus(self.days as i64, ChronoUnit::Days)
    }

    pub fn subtract_from(&self, date: &ChronoLocalDate) -> Result<ChronoLocalDate> {
        self.check_same_chronology(date.chronology())?;
        let date = self.add_months_and_years(date, -1)?;
        date.plus(-(self.days as i64), ChronoUnit::Days)
    }

    fn add_months_and_years(&self, date: &ChronoLocalDate, sign: i64) -> Result<ChronoLocalDate> {
        match self.month_range() {
            Some(month_range) if self.months != 0 => {
                let months = (self.years as i64 * month_range + self.months as i64) * sign;
                date.plus(months, ChronoUnit::Months)
            }
            _ => {
                let date = date.plus(self.years as i64 * sign, ChronoUnit::Years)?;
                date.plus(self.months as i64 * sign, ChronoUnit::Months)
            }
        }
    }
}

impl fmt::Display for ChronoPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} P", self.chronology)?;
        if self.is_zero() {
            return f.write_str("0D");
        }
        if self.years != 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months != 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }
        Ok(())
    }
}
