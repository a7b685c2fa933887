//! Turning a bag of parsed field values into a date, a time, or both.
//!
//! A parser fills a [`Parsed`] with whatever fields it recognized, then calls
//! [`Parsed::resolve`]. Resolution runs in fixed phases:
//!
//! 1. instant, date and time fields are combined into a date and a time,
//!    with custom fields given a chance to contribute in between;
//! 2. partially specified times are completed leniently (`10:` means `10:00`);
//! 3. every field still in the store is checked against the result;
//! 4. days that overflowed from the time are added to the date;
//! 5. fractional second fields are filled in when only seconds are known;
//! 6. the instant is stored if a zone or offset is known.
//!
//! Any failure aborts the whole attempt.

use std::fmt;

use num_integer::Integer;
use tracing::{debug, trace};

use crate::chrono::{ChronoLocalDate, ChronoLocalDateTime, Chronology, ResolverStyle};
use crate::div_rem::{to_int_exact, ExactArith};
use crate::error::{DateTimeError, Result};
use crate::field::{ChronoField, FieldValues, ResolveContext, Resolved, TemporalField};
use crate::instant::Instant;
use crate::iso::{
    LocalTime, NANOS_PER_DAY, NANOS_PER_HOUR, NANOS_PER_MINUTE, NANOS_PER_SECOND,
};
use crate::period::ChronoPeriod;
use crate::temporal::TemporalAccessor;
use crate::zone::{ZoneId, ZoneOffset};

/// Rounds of custom field resolution after which resolution is abandoned.
pub const MAX_RESOLVE_ROUNDS: usize = 50;

/// Parsed field values and the date and time resolved from them.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    field_values: FieldValues,
    zone: Option<ZoneId>,
    chronology: Option<Chronology>,
    leap_second: bool,
    style: ResolverStyle,
    date: Option<ChronoLocalDate>,
    time: Option<LocalTime>,
    excess_days: i32,
}

impl Parsed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parsed field value. A second, different value for the same
    /// field is a conflict.
    pub fn with_field(&mut self, field: impl Into<TemporalField>, value: i64) -> Result<&mut Self> {
        self.field_values.insert(field, value)?;
        Ok(self)
    }

    pub fn with_zone(&mut self, zone: ZoneId) -> &mut Self {
        self.zone = Some(zone);
        self
    }

    pub fn with_chronology(&mut self, chronology: Chronology) -> &mut Self {
        self.chronology = Some(chronology);
        self
    }

    /// Records that the text held a leap second (`23:59:60`). The time
    /// itself is resolved as `23:59:59`.
    pub fn with_leap_second(&mut self, leap_second: bool) -> &mut Self {
        self.leap_second = leap_second;
        self
    }

    pub fn field_values(&self) -> &FieldValues {
        &self.field_values
    }

    pub fn date(&self) -> Option<&ChronoLocalDate> {
        self.date.as_ref()
    }

    pub fn time(&self) -> Option<LocalTime> {
        self.time
    }

    pub fn zone(&self) -> Option<&ZoneId> {
        self.zone.as_ref()
    }

    /// The parsed chronology, ISO if none was parsed.
    pub fn chronology(&self) -> Chronology {
        self.chronology.clone().unwrap_or_else(Chronology::iso)
    }

    /// Days the resolved time overflowed into that could not be added to a
    /// date, such as the extra day of `24:00` parsed without a date.
    pub fn excess_days(&self) -> ChronoPeriod {
        self.chronology().period(0, 0, self.excess_days)
    }

    pub fn is_leap_second(&self) -> bool {
        self.leap_second
    }

    /// Resolves the parsed fields. When `allowed` is given, every other field
    /// is dropped before resolution starts.
    pub fn resolve(mut self, style: ResolverStyle, allowed: Option<&[TemporalField]>) -> Result<Parsed> {
        if let Some(allowed) = allowed {
            self.field_values.retain_only(allowed);
        }
        self.style = style;
        trace!(?style, fields = self.field_values.len(), "resolving parsed fields");
        self.resolve_fields()?;
        trace!(date = ?self.date, time = ?self.time, "resolved fields");
        self.resolve_time_lenient()?;
        self.cross_check()?;
        self.resolve_period()?;
        self.resolve_fractional();
        self.resolve_instant()?;
        Ok(self)
    }

    fn resolve_fields(&mut self) -> Result<()> {
        self.resolve_builtin_fields()?;
        if self.field_values.custom_fields().is_empty() {
            return Ok(());
        }
        if self.resolve_custom_fields()? > 0 {
            self.resolve_builtin_fields()?;
        }
        Ok(())
    }

    fn resolve_builtin_fields(&mut self) -> Result<()> {
        self.resolve_instant_fields()?;
        self.resolve_date_fields()?;
        self.resolve_time_fields()
    }

    /// Calls the resolve hook of each pending custom field. After the first
    /// hook that makes progress the pending set is taken again, until a full
    /// pass changes nothing. Returns the number of rounds that made progress.
    fn resolve_custom_fields(&mut self) -> Result<usize> {
        let chronology = self.chronology();
        let mut rounds = 0;
        'rounds: while rounds < MAX_RESOLVE_ROUNDS {
            for field in self.field_values.custom_fields() {
                let custom = match &field {
                    TemporalField::Custom(custom) => custom.clone(),
                    TemporalField::Chrono(_) => continue,
                };
                let before = self.field_values.clone();
                let context = ResolveContext {
                    chronology: &chronology,
                    zone: self.zone.as_ref(),
                    style: self.style,
                };
                let resolved = custom.resolve(&mut self.field_values, &context)?;
                let progressed = match resolved {
                    Some(resolved) => {
                        self.merge_resolved(resolved)?;
                        true
                    }
                    None => self.field_values != before,
                };
                if progressed {
                    rounds += 1;
                    debug!(field = %field, round = rounds, "custom field resolution made progress");
                    continue 'rounds;
                }
            }
            return Ok(rounds);
        }
        Err(DateTimeError::NonConvergence {
            rounds: MAX_RESOLVE_ROUNDS,
        })
    }

    fn merge_resolved(&mut self, resolved: Resolved) -> Result<()> {
        match resolved {
            Resolved::Zoned(zoned) => {
                let parsed_zone = self.zone.get_or_insert_with(|| zoned.zone().clone());
                if parsed_zone != zoned.zone() {
                    return Err(DateTimeError::Conflict(format!(
                        "resolved zone {} differs from parsed zone {}",
                        zoned.zone(),
                        parsed_zone
                    )));
                }
                self.merge_date_time(zoned.to_local_date_time())
            }
            Resolved::DateTime(date_time) => self.merge_date_time(&date_time),
            Resolved::Date(date) => self.update_date(date),
            Resolved::Time(time) => self.update_time(time, 0),
        }
    }

    fn merge_date_time(&mut self, date_time: &ChronoLocalDateTime) -> Result<()> {
        self.update_time(date_time.to_local_time(), 0)?;
        self.update_date(date_time.to_local_date().clone())
    }

    fn update_date(&mut self, date: ChronoLocalDate) -> Result<()> {
        if let Some(current) = &self.date {
            if current != &date {
                return Err(DateTimeError::Conflict(format!(
                    "Fields resolved to two different dates: {} {}",
                    current, date
                )));
            }
            return Ok(());
        }
        let chronology = self.chronology();
        if date.chronology() != &chronology {
            return Err(DateTimeError::ChronologyMismatch {
                expected: chronology.id().to_string(),
                actual: date.chronology().id().to_string(),
            });
        }
        self.date = Some(date);
        Ok(())
    }

    fn update_time(&mut self, time: LocalTime, excess_days: i32) -> Result<()> {
        let current = match self.time {
            Some(current) => current,
            None => {
                self.time = Some(time);
                self.excess_days = excess_days;
                return Ok(());
            }
        };
        if current != time {
            return Err(DateTimeError::Conflict(format!(
                "Fields resolved to different times: {} {}",
                current, time
            )));
        }
        if self.excess_days != 0 && excess_days != 0 && self.excess_days != excess_days {
            return Err(DateTimeError::Conflict(format!(
                "Fields resolved to different excess days: {} {}",
                self.excess_days, excess_days
            )));
        }
        if excess_days != 0 {
            self.excess_days = excess_days;
        }
        Ok(())
    }

    fn check_unless_lenient(&self, field: ChronoField, value: i64) -> Result<i64> {
        if self.style == ResolverStyle::Lenient {
            Ok(value)
        } else {
            field.check_valid_value(value)
        }
    }

    fn resolve_instant_fields(&mut self) -> Result<()> {
        let seconds = match self.field_values.get(ChronoField::InstantSeconds) {
            Some(seconds) => seconds,
            None => return Ok(()),
        };
        let zone = match (&self.zone, self.field_values.get(ChronoField::OffsetSeconds)) {
            (Some(zone), _) => zone.clone(),
            (None, Some(offset)) => ZoneId::Offset(ZoneOffset::of_total_seconds(offset)?),
            (None, None) => return Ok(()),
        };
        self.field_values.remove(ChronoField::InstantSeconds);
        trace!(seconds, zone = %zone, "resolving instant seconds");
        let zoned = self
            .chronology()
            .zoned_date_time(Instant::of_epoch_second(seconds, 0)?, &zone)?;
        self.update_date(zoned.to_local_date().clone())?;
        self.field_values.insert(
            ChronoField::SecondOfDay,
            zoned.to_local_time().to_second_of_day(),
        )?;
        self.field_values.insert(
            ChronoField::OffsetSeconds,
            zoned.offset().total_seconds() as i64,
        )
    }

    fn resolve_date_fields(&mut self) -> Result<()> {
        let chronology = self.chronology();
        if let Some(date) = chronology.resolve_date(&mut self.field_values, self.style)? {
            self.update_date(date)?;
        }
        Ok(())
    }

    /// Breaks the compound time fields down into hour, minute, second and
    /// nano, and resolves the time once all four are known.
    fn resolve_time_fields(&mut self) -> Result<()> {
        use ChronoField::*;

        if let Some(clock_hour) = self.field_values.remove(ClockHourOfDay) {
            if self.style == ResolverStyle::Strict
                || (self.style == ResolverStyle::Smart && clock_hour != 0)
            {
                ClockHourOfDay.check_valid_value(clock_hour)?;
            }
            let hour = if clock_hour == 24 { 0 } else { clock_hour };
            self.field_values.insert(HourOfDay, hour)?;
        }
        if let Some(clock_hour) = self.field_values.remove(ClockHourOfAmPm) {
            if self.style == ResolverStyle::Strict
                || (self.style == ResolverStyle::Smart && clock_hour != 0)
            {
                ClockHourOfAmPm.check_valid_value(clock_hour)?;
            }
            let hour = if clock_hour == 12 { 0 } else { clock_hour };
            self.field_values.insert(HourOfAmPm, hour)?;
        }
        if self.field_values.contains(AmPmOfDay) && self.field_values.contains(HourOfAmPm) {
            let am_pm = self.field_values.remove(AmPmOfDay).unwrap_or_default();
            let hour = self.field_values.remove(HourOfAmPm).unwrap_or_default();
            if self.style != ResolverStyle::Lenient {
                AmPmOfDay.check_valid_value(am_pm)?;
                HourOfAmPm.check_valid_value(hour)?;
            }
            self.field_values
                .insert(HourOfDay, am_pm.mul_exact(12)?.add_exact(hour)?)?;
        }
        if let Some(nano_of_day) = self.field_values.remove(NanoOfDay) {
            let nano_of_day = self.check_unless_lenient(NanoOfDay, nano_of_day)?;
            self.field_values.insert(HourOfDay, nano_of_day / NANOS_PER_HOUR)?;
            self.field_values
                .insert(MinuteOfHour, nano_of_day / NANOS_PER_MINUTE % 60)?;
            self.field_values
                .insert(SecondOfMinute, nano_of_day / NANOS_PER_SECOND % 60)?;
            self.field_values
                .insert(NanoOfSecond, nano_of_day % NANOS_PER_SECOND)?;
        }
        if let Some(micro_of_day) = self.field_values.remove(MicroOfDay) {
            let micro_of_day = self.check_unless_lenient(MicroOfDay, micro_of_day)?;
            self.field_values.insert(SecondOfDay, micro_of_day / 1_000_000)?;
            self.field_values.insert(MicroOfSecond, micro_of_day % 1_000_000)?;
        }
        if let Some(milli_of_day) = self.field_values.remove(MilliOfDay) {
            let milli_of_day = self.check_unless_lenient(MilliOfDay, milli_of_day)?;
            self.field_values.insert(SecondOfDay, milli_of_day / 1_000)?;
            self.field_values.insert(MilliOfSecond, milli_of_day % 1_000)?;
        }
        if let Some(second_of_day) = self.field_values.remove(SecondOfDay) {
            let second_of_day = self.check_unless_lenient(SecondOfDay, second_of_day)?;
            self.field_values.insert(HourOfDay, second_of_day / 3600)?;
            self.field_values
                .insert(MinuteOfHour, second_of_day / 60 % 60)?;
            self.field_values.insert(SecondOfMinute, second_of_day % 60)?;
        }
        if let Some(minute_of_day) = self.field_values.remove(MinuteOfDay) {
            let minute_of_day = self.check_unless_lenient(MinuteOfDay, minute_of_day)?;
            self.field_values.insert(HourOfDay, minute_of_day / 60)?;
            self.field_values.insert(MinuteOfHour, minute_of_day % 60)?;
        }

        if self.style != ResolverStyle::Lenient {
            for field in [MilliOfSecond, MicroOfSecond] {
                if let Some(value) = self.field_values.get(field) {
                    field.check_valid_value(value)?;
                }
            }
        }
        if let Some(nano) = self.field_values.get(NanoOfSecond) {
            let mut nano = self.check_unless_lenient(NanoOfSecond, nano)?;
            if let Some(micro) = self.field_values.remove(MicroOfSecond) {
                nano = micro.mul_exact(1_000)?.add_exact(nano % 1_000)?;
                self.field_values.insert(NanoOfSecond, nano)?;
            }
            if let Some(milli) = self.field_values.remove(MilliOfSecond) {
                let nano = milli.mul_exact(1_000_000)?.add_exact(nano % 1_000_000)?;
                self.field_values.insert(NanoOfSecond, nano)?;
            }
        }

        let time_fields = [HourOfDay, MinuteOfHour, SecondOfMinute, NanoOfSecond];
        if time_fields.iter().all(|field| self.field_values.contains(*field)) {
            let [hour, minute, second, nano] =
                time_fields.map(|field| self.field_values.remove(field).unwrap_or_default());
            self.resolve_time(hour, minute, second, nano)?;
        }
        Ok(())
    }

    /// Completes a time from an hour with some of its lower fields missing.
    /// Once a time is known, whatever time fields are left are range checked.
    /// An incomplete set of time fields stays in the store unchecked.
    fn resolve_time_lenient(&mut self) -> Result<()> {
        use ChronoField::*;

        if self.time.is_none() {
            if let Some(milli) = self.field_values.remove(MilliOfSecond) {
                match self.field_values.get(MicroOfSecond) {
                    Some(micro) => {
                        let micro = milli.mul_exact(1_000)?.add_exact(micro % 1_000)?;
                        self.field_values.insert(MicroOfSecond, micro)?;
                        self.field_values.remove(MicroOfSecond);
                        self.field_values.replace(NanoOfSecond, micro.mul_exact(1_000)?);
                    }
                    None => self
                        .field_values
                        .replace(NanoOfSecond, milli.mul_exact(1_000_000)?),
                }
            } else if let Some(micro) = self.field_values.remove(MicroOfSecond) {
                self.field_values.replace(NanoOfSecond, micro.mul_exact(1_000)?);
            }

            if let Some(hour) = self.field_values.get(HourOfDay) {
                let minute = self.field_values.get(MinuteOfHour);
                let second = self.field_values.get(SecondOfMinute);
                let nano = self.field_values.get(NanoOfSecond);
                // A lower field without the one above it, as in "10::30", is
                // left unresolved.
                let has_hole = (minute.is_none() && (second.is_some() || nano.is_some()))
                    || (minute.is_some() && second.is_none() && nano.is_some());
                if !has_hole {
                    self.resolve_time(
                        hour,
                        minute.unwrap_or(0),
                        second.unwrap_or(0),
                        nano.unwrap_or(0),
                    )?;
                    for field in [HourOfDay, MinuteOfHour, SecondOfMinute, NanoOfSecond] {
                        self.field_values.remove(field);
                    }
                }
            }
        }

        if self.style != ResolverStyle::Lenient && self.time.is_some() {
            for (field, value) in self.field_values.iter() {
                if let TemporalField::Chrono(field) = field {
                    if field.is_time_based() {
                        field.check_valid_value(value)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn resolve_time(&mut self, hour: i64, minute: i64, second: i64, nano: i64) -> Result<()> {
        use ChronoField::*;

        if self.style == ResolverStyle::Lenient {
            let total = hour
                .mul_exact(NANOS_PER_HOUR)?
                .add_exact(minute.mul_exact(NANOS_PER_MINUTE)?)?
                .add_exact(second.mul_exact(NANOS_PER_SECOND)?)?
                .add_exact(nano)?;
            let (days, nano_of_day) = total.div_mod_floor(&NANOS_PER_DAY);
            return self.update_time(LocalTime::from_nano_of_day(nano_of_day), to_int_exact(days)?);
        }
        let minute = MinuteOfHour.check_valid_value(minute)?;
        let nano = NanoOfSecond.check_valid_value(nano)?;
        if self.style == ResolverStyle::Smart && hour == 24 && minute == 0 && second == 0 && nano == 0
        {
            return self.update_time(LocalTime::from_nano_of_day(0), 1);
        }
        let hour = HourOfDay.check_valid_value(hour)?;
        let second = SecondOfMinute.check_valid_value(second)?;
        self.update_time(LocalTime::of(hour, minute, second, nano)?, 0)
    }

    /// Removes every field that agrees with the resolved date and time and
    /// fails on the first one that does not.
    fn cross_check(&mut self) -> Result<()> {
        if let Some(date) = self.date.clone() {
            self.cross_check_against(&date)?;
        }
        if let Some(time) = self.time {
            self.cross_check_against(&time)?;
            if let Some(date) = self.date.clone() {
                if !self.field_values.is_empty() {
                    self.cross_check_against(&date.at_time(time))?;
                }
            }
        }
        Ok(())
    }

    fn cross_check_against<T>(&mut self, target: &T) -> Result<()>
    where
        T: TemporalAccessor + fmt::Display,
    {
        let pending: Vec<(TemporalField, i64)> = self
            .field_values
            .iter()
            .map(|(field, value)| (field.clone(), value))
            .collect();
        for (field, parsed) in pending {
            if !target.is_supported(&field) {
                continue;
            }
            let resolved = match target.get_long(&field) {
                Ok(resolved) => resolved,
                Err(_) => continue,
            };
            if resolved != parsed {
                return Err(DateTimeError::CrossCheck {
                    field: field.to_string(),
                    resolved,
                    parsed,
                    target: target.to_string(),
                });
            }
            self.field_values.remove(field);
        }
        Ok(())
    }

    fn resolve_period(&mut self) -> Result<()> {
        if self.excess_days == 0 || self.time.is_none() {
            return Ok(());
        }
        let date = match &self.date {
            Some(date) => date,
            None => return Ok(()),
        };
        let date = date
            .chronology()
            .period(0, 0, self.excess_days)
            .add_to(date)?;
        trace!(%date, "added excess days to date");
        self.date = Some(date);
        self.excess_days = 0;
        Ok(())
    }

    /// With only whole seconds known, the fractional fields read as zero.
    fn resolve_fractional(&mut self) {
        use ChronoField::*;

        if self.time.is_some()
            || ![InstantSeconds, SecondOfDay, SecondOfMinute]
                .iter()
                .any(|field| self.field_values.contains(*field))
        {
            return;
        }
        let nano = self.field_values.get(NanoOfSecond).unwrap_or(0);
        self.field_values.replace(NanoOfSecond, nano);
        self.field_values.replace(MicroOfSecond, nano / 1_000);
        self.field_values.replace(MilliOfSecond, nano / 1_000_000);
    }

    fn resolve_instant(&mut self) -> Result<()> {
        let local = match (&self.date, self.time) {
            (Some(date), Some(time)) => date.at_time(time),
            _ => return Ok(()),
        };
        let epoch_second = match self.field_values.get(ChronoField::OffsetSeconds) {
            Some(offset) => local.to_epoch_second(ZoneOffset::of_total_seconds(offset)?),
            None => match &self.zone {
                Some(zone) => local.at_zone(zone.clone())?.to_epoch_second(),
                None => return Ok(()),
            },
        };
        self.field_values
            .replace(ChronoField::InstantSeconds, epoch_second);
        Ok(())
    }
}

impl TemporalAccessor for Parsed {
    fn is_supported(&self, field: &TemporalField) -> bool {
        if self.field_values.contains(field.clone())
            || self.date.as_ref().map_or(false, |date| date.is_supported(field))
            || self.time.map_or(false, |time| time.is_supported(field))
        {
            return true;
        }
        match field {
            TemporalField::Chrono(_) => false,
            TemporalField::Custom(custom) => custom.is_supported_by(self),
        }
    }

    fn get_long(&self, field: &TemporalField) -> Result<i64> {
        if let Some(value) = self.field_values.get(field.clone()) {
            return Ok(value);
        }
        if let Some(date) = &self.date {
            if date.is_supported(field) {
                return date.get_long(field);
            }
        }
        if let Some(time) = &self.time {
            if time.is_supported(field) {
                return time.get_long(field);
            }
        }
        match field {
            TemporalField::Chrono(field) => Err(DateTimeError::UnsupportedField(field.to_string())),
            TemporalField::Custom(custom) => custom.get_from(self),
        }
    }

    fn chronology(&self) -> Option<Chronology> {
        Some(Parsed::chronology(self))
    }

    fn zone(&self) -> Option<ZoneId> {
        self.zone.clone()
    }

    /// A parsed offset wins over the offset of a fixed-offset zone.
    fn offset(&self) -> Option<ZoneOffset> {
        match self.field_values.get(ChronoField::OffsetSeconds) {
            Some(seconds) => ZoneOffset::of_total_seconds(seconds).ok(),
            None => match &self.zone {
                Some(ZoneId::Offset(offset)) => Some(*offset),
                _ => None,
            },
        }
    }

    fn local_date(&self) -> Option<ChronoLocalDate> {
        self.date.clone()
    }

    fn local_time(&self) -> Option<LocalTime> {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ChronoField::{
        AmPmOfDay, ClockHourOfAmPm, ClockHourOfDay, DayOfMonth, EpochDay, HourOfDay,
        InstantSeconds, MicroOfSecond, MilliOfSecond, MinuteOfHour, MonthOfYear, NanoOfSecond,
        OffsetSeconds, SecondOfDay, SecondOfMinute, Year,
    };
    use crate::field::{CustomField, ValueRange};

    fn parsed(fields: &[(ChronoField, i64)]) -> Parsed {
        let mut parsed = Parsed::new();
        for (field, value) in fields {
            parsed.with_field(*field, *value).unwrap();
        }
        parsed
    }

    fn iso(y: i64, m: i64, d: i64) -> ChronoLocalDate {
        Chronology::iso().date(y, m, d).unwrap()
    }

    fn time(h: i64, m: i64, s: i64, n: i64) -> LocalTime {
        LocalTime::of(h, m, s, n).unwrap()
    }

    /// Julian day number, resolved by its hook into a date.
    struct JulianDay;

    const JULIAN_DAY_OF_EPOCH: i64 = 2_440_588;

    impl CustomField for JulianDay {
        fn name(&self) -> &str {
            "JulianDay"
        }

        fn is_date_based(&self) -> bool {
            true
        }

        fn is_time_based(&self) -> bool {
            false
        }

        fn range(&self) -> ValueRange {
            ValueRange::of(0, 1_000_000_000_000).unwrap()
        }

        fn is_supported_by(&self, temporal: &dyn TemporalAccessor) -> bool {
            temporal.is_supported(&EpochDay.into())
        }

        fn get_from(&self, temporal: &dyn TemporalAccessor) -> Result<i64> {
            Ok(temporal.get_long(&EpochDay.into())? + JULIAN_DAY_OF_EPOCH)
        }

        fn resolve(
            &self,
            field_values: &mut FieldValues,
            context: &ResolveContext<'_>,
        ) -> Result<Option<Resolved>> {
            let value = match field_values.remove(TemporalField::custom(JulianDay)) {
                Some(value) => value,
                None => return Ok(None),
            };
            let date = context
                .chronology
                .date_epoch_day(value - JULIAN_DAY_OF_EPOCH)?;
            Ok(Some(Resolved::Date(date)))
        }
    }

    /// Packed `yyyymm`, resolved by its hook into year and month fields.
    struct YearMonth;

    impl CustomField for YearMonth {
        fn name(&self) -> &str {
            "YearMonth"
        }

        fn is_date_based(&self) -> bool {
            true
        }

        fn is_time_based(&self) -> bool {
            false
        }

        fn range(&self) -> ValueRange {
            ValueRange::of(0, 999_912).unwrap()
        }

        fn is_supported_by(&self, temporal: &dyn TemporalAccessor) -> bool {
            temporal.is_supported(&Year.into())
        }

        fn get_from(&self, temporal: &dyn TemporalAccessor) -> Result<i64> {
            Ok(temporal.get_long(&Year.into())? * 100 + temporal.get_long(&MonthOfYear.into())?)
        }

        fn resolve(
            &self,
            field_values: &mut FieldValues,
            _context: &ResolveContext<'_>,
        ) -> Result<Option<Resolved>> {
            if let Some(value) = field_values.remove(TemporalField::custom(YearMonth)) {
                field_values.insert(Year, value / 100)?;
                field_values.insert(MonthOfYear, value % 100)?;
            }
            Ok(None)
        }
    }

    /// Replaces its own value with the next one every time it is asked.
    struct Restless;

    impl CustomField for Restless {
        fn name(&self) -> &str {
            "Restless"
        }

        fn is_date_based(&self) -> bool {
            false
        }

        fn is_time_based(&self) -> bool {
            false
        }

        fn range(&self) -> ValueRange {
            ValueRange::of(i64::MIN, i64::MAX).unwrap()
        }

        fn is_supported_by(&self, _temporal: &dyn TemporalAccessor) -> bool {
            false
        }

        fn get_from(&self, _temporal: &dyn TemporalAccessor) -> Result<i64> {
            Err(DateTimeError::UnsupportedField("Restless".to_string()))
        }

        fn resolve(
            &self,
            field_values: &mut FieldValues,
            _context: &ResolveContext<'_>,
        ) -> Result<Option<Resolved>> {
            let field = TemporalField::custom(Restless);
            if let Some(value) = field_values.remove(field.clone()) {
                field_values.insert(field, value + 1)?;
            }
            Ok(None)
        }
    }

    /// Always resolves to the same fixed result.
    struct Always(Resolved);

    impl CustomField for Always {
        fn name(&self) -> &str {
            "Always"
        }

        fn is_date_based(&self) -> bool {
            true
        }

        fn is_time_based(&self) -> bool {
            true
        }

        fn range(&self) -> ValueRange {
            ValueRange::of(0, 1).unwrap()
        }

        fn is_supported_by(&self, _temporal: &dyn TemporalAccessor) -> bool {
            false
        }

        fn get_from(&self, _temporal: &dyn TemporalAccessor) -> Result<i64> {
            Err(DateTimeError::UnsupportedField("Always".to_string()))
        }

        fn resolve(
            &self,
            field_values: &mut FieldValues,
            _context: &ResolveContext<'_>,
        ) -> Result<Option<Resolved>> {
            let pending: Vec<_> = field_values
                .iter()
                .filter(|(field, _)| field.name() == "Always")
                .map(|(field, _)| field.clone())
                .collect();
            for field in pending {
                field_values.remove(field);
            }
            Ok(Some(self.0.clone()))
        }
    }

    fn always(resolved: Resolved) -> TemporalField {
        TemporalField::custom(Always(resolved))
    }

    #[test]
    fn date_and_time() {
        let resolved = parsed(&[
            (Year, 2023),
            (MonthOfYear, 1),
            (DayOfMonth, 15),
            (HourOfDay, 10),
            (MinuteOfHour, 30),
        ])
        .resolve(ResolverStyle::Smart, None)
        .unwrap();
        assert_eq!(resolved.date(), Some(&iso(2023, 1, 15)));
        assert_eq!(resolved.time(), Some(time(10, 30, 0, 0)));
        assert!(resolved.field_values().is_empty());
        assert!(resolved.excess_days().is_zero());
        assert_eq!(resolved.get_long(&DayOfMonth.into()), Ok(15));
        assert_eq!(resolved.get_long(&ChronoField::MinuteOfDay.into()), Ok(630));
    }

    #[test]
    fn day_of_week_conflict() {
        let err = parsed(&[
            (Year, 2023),
            (MonthOfYear, 1),
            (DayOfMonth, 15),
            (ChronoField::DayOfWeek, 3),
        ])
        .resolve(ResolverStyle::Smart, None)
        .unwrap_err();
        assert_eq!(
            err,
            DateTimeError::CrossCheck {
                field: "DayOfWeek".to_string(),
                resolved: 7,
                parsed: 3,
                target: "2023-01-15".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "Conflict found: Field DayOfWeek 7 differs from DayOfWeek 3 derived from 2023-01-15"
        );
        assert!(err.is_conflict());

        let resolved = parsed(&[
            (Year, 2023),
            (MonthOfYear, 1),
            (DayOfMonth, 15),
            (ChronoField::DayOfWeek, 7),
        ])
        .resolve(ResolverStyle::Smart, None)
        .unwrap();
        assert!(resolved.field_values().is_empty());
    }

    #[test]
    fn end_of_day() {
        let fields = [(Year, 2023), (MonthOfYear, 12), (DayOfMonth, 31), (HourOfDay, 24)];
        let smart = parsed(&fields).resolve(ResolverStyle::Smart, None).unwrap();
        assert_eq!(smart.date(), Some(&iso(2024, 1, 1)));
        assert_eq!(smart.time(), Some(time(0, 0, 0, 0)));
        assert!(smart.excess_days().is_zero());

        let strict = parsed(&fields).resolve(ResolverStyle::Strict, None);
        assert!(matches!(strict, Err(DateTimeError::Range { .. })));

        let time_only = parsed(&[(HourOfDay, 24), (MinuteOfHour, 0)])
            .resolve(ResolverStyle::Smart, None)
            .unwrap();
        assert_eq!(time_only.time(), Some(time(0, 0, 0, 0)));
        assert_eq!(time_only.excess_days(), Chronology::iso().period(0, 0, 1));

        let past_end = parsed(&[(HourOfDay, 24), (MinuteOfHour, 1)])
            .resolve(ResolverStyle::Smart, None);
        assert!(matches!(past_end, Err(DateTimeError::Range { .. })));
    }

    #[test]
    fn lenient_time_overflows_into_days() {
        let resolved = parsed(&[(HourOfDay, 25), (MinuteOfHour, 70)])
            .resolve(ResolverStyle::Lenient, None)
            .unwrap();
        assert_eq!(resolved.time(), Some(time(2, 10, 0, 0)));
        assert_eq!(resolved.excess_days().days(), 1);

        let backwards = parsed(&[
            (Year, 2023),
            (MonthOfYear, 3),
            (DayOfMonth, 1),
            (HourOfDay, -1),
        ])
        .resolve(ResolverStyle::Lenient, None)
        .unwrap();
        assert_eq!(backwards.date(), Some(&iso(2023, 2, 28)));
        assert_eq!(backwards.time(), Some(time(23, 0, 0, 0)));
    }

    #[test]
    fn excess_days_use_parsed_chronology() {
        let minguo = Chronology::minguo();
        let mut fields = parsed(&[(Year, 112), (MonthOfYear, 12), (DayOfMonth, 31), (HourOfDay, 24)]);
        fields.with_chronology(minguo.clone());
        let resolved = fields.resolve(ResolverStyle::Smart, None).unwrap();
        assert_eq!(resolved.date(), Some(&minguo.date(113, 1, 1).unwrap()));
        assert_eq!(resolved.chronology(), minguo);
    }

    #[test]
    fn clock_hours_and_am_pm() {
        let noon = parsed(&[(ClockHourOfAmPm, 12), (AmPmOfDay, 1)])
            .resolve(ResolverStyle::Smart, None)
            .unwrap();
        assert_eq!(noon.time(), Some(time(12, 0, 0, 0)));

        let midnight = parsed(&[(ClockHourOfDay, 24)])
            .resolve(ResolverStyle::Smart, None)
            .unwrap();
        assert_eq!(midnight.time(), Some(time(0, 0, 0, 0)));

        let zero = parsed(&[(ClockHourOfDay, 0)]).resolve(ResolverStyle::Strict, None);
        assert!(matches!(zero, Err(DateTimeError::Range { .. })));

        let conflict = parsed(&[(ClockHourOfDay, 13), (HourOfDay, 14)])
            .resolve(ResolverStyle::Smart, None)
            .unwrap_err();
        assert_eq!(
            conflict,
            DateTimeError::FieldConflict {
                field: "HourOfDay".to_string(),
                old: 14,
                new: 13
            }
        );
    }

    #[test]
    fn compound_time_fields() {
        let resolved = parsed(&[(SecondOfDay, 3661), (MilliOfSecond, 5)])
            .resolve(ResolverStyle::Smart, None)
            .unwrap();
        assert_eq!(resolved.time(), Some(time(1, 1, 1, 5_000_000)));

        let resolved = parsed(&[(ChronoField::NanoOfDay, 3_723_000_000_004)])
            .resolve(ResolverStyle::Strict, None)
            .unwrap();
        assert_eq!(resolved.time(), Some(time(1, 2, 3, 4)));

        let resolved = parsed(&[(NanoOfSecond, 123_456_789), (MicroOfSecond, 123_456), (SecondOfDay, 0)])
            .resolve(ResolverStyle::Smart, None)
            .unwrap();
        assert_eq!(resolved.time(), Some(time(0, 0, 0, 123_456_789)));

        let mismatch = parsed(&[(NanoOfSecond, 5), (MilliOfSecond, 1), (SecondOfDay, 0)])
            .resolve(ResolverStyle::Smart, None);
        assert!(matches!(mismatch, Err(DateTimeError::FieldConflict { .. })));
    }

    #[test]
    fn incomplete_time_is_left_alone() {
        let resolved = parsed(&[(HourOfDay, 10), (SecondOfMinute, 30)])
            .resolve(ResolverStyle::Smart, None)
            .unwrap();
        assert_eq!(resolved.time(), None);
        assert_eq!(resolved.field_values().get(HourOfDay), Some(10));
        // Whole seconds are known, so the fractions read as zero.
        assert_eq!(resolved.field_values().get(NanoOfSecond), Some(0));
        assert_eq!(resolved.field_values().get(MilliOfSecond), Some(0));

        for style in [ResolverStyle::Strict, ResolverStyle::Smart] {
            let resolved = parsed(&[(HourOfDay, 10), (SecondOfMinute, 60)])
                .resolve(style, None)
                .unwrap();
            assert_eq!(resolved.time(), None);
            assert_eq!(resolved.field_values().get(SecondOfMinute), Some(60));
        }
        let minute_only = parsed(&[(MinuteOfHour, 75)])
            .resolve(ResolverStyle::Strict, None)
            .unwrap();
        assert_eq!(minute_only.field_values().get(MinuteOfHour), Some(75));
    }

    #[test]
    fn instant_with_zone() {
        let mut fields = parsed(&[(InstantSeconds, 1_688_212_800)]);
        fields.with_zone(ZoneId::Offset(ZoneOffset::of_hours_minutes(2, 0).unwrap()));
        let resolved = fields.resolve(ResolverStyle::Smart, None).unwrap();
        assert_eq!(resolved.date(), Some(&iso(2023, 7, 1)));
        assert_eq!(resolved.time(), Some(time(14, 0, 0, 0)));
        assert_eq!(resolved.get_long(&InstantSeconds.into()), Ok(1_688_212_800));
        assert_eq!(resolved.get_long(&OffsetSeconds.into()), Ok(7200));
    }

    #[test]
    fn instant_with_offset_field() {
        let resolved = parsed(&[(InstantSeconds, 1_688_212_800), (OffsetSeconds, -3600)])
            .resolve(ResolverStyle::Smart, None)
            .unwrap();
        assert_eq!(resolved.time(), Some(time(11, 0, 0, 0)));
        assert_eq!(resolved.offset(), ZoneOffset::of_total_seconds(-3600).ok());
        assert_eq!(resolved.get_long(&InstantSeconds.into()), Ok(1_688_212_800));
    }

    #[test]
    fn instant_without_zone_stays_unresolved() {
        let resolved = parsed(&[(InstantSeconds, 1_688_212_800)])
            .resolve(ResolverStyle::Smart, None)
            .unwrap();
        assert_eq!(resolved.date(), None);
        assert_eq!(resolved.get_long(&InstantSeconds.into()), Ok(1_688_212_800));
        assert_eq!(resolved.field_values().get(MicroOfSecond), Some(0));
    }

    #[test]
    fn zone_gives_instant() {
        let mut fields = parsed(&[(Year, 2023), (MonthOfYear, 7), (DayOfMonth, 1), (HourOfDay, 12)]);
        fields.with_zone(ZoneId::Offset(ZoneOffset::UTC));
        let resolved = fields.resolve(ResolverStyle::Smart, None).unwrap();
        assert_eq!(resolved.get_long(&InstantSeconds.into()), Ok(1_688_212_800));
    }

    #[test]
    fn allow_list_drops_other_fields() {
        let allowed: Vec<TemporalField> = vec![Year.into(), MonthOfYear.into(), DayOfMonth.into()];
        let resolved = parsed(&[(Year, 2023), (MonthOfYear, 2), (DayOfMonth, 3), (HourOfDay, 4)])
            .resolve(ResolverStyle::Smart, Some(allowed.as_slice()))
            .unwrap();
        assert_eq!(resolved.date(), Some(&iso(2023, 2, 3)));
        assert_eq!(resolved.time(), None);
        assert!(!resolved.is_supported(&HourOfDay.into()));
    }

    #[test]
    fn custom_field_resolves_to_date() {
        let mut fields = Parsed::new();
        fields.with_field(TemporalField::custom(JulianDay), 2_460_000).unwrap();
        let resolved = fields.resolve(ResolverStyle::Smart, None).unwrap();
        assert_eq!(resolved.date(), Some(&iso(2023, 2, 24)));
        let julian_day = TemporalField::custom(JulianDay);
        assert!(resolved.is_supported(&julian_day));
        assert_eq!(resolved.get_long(&julian_day), Ok(2_460_000));
    }

    #[test]
    fn custom_field_feeds_builtin_fields() {
        let mut fields = parsed(&[(DayOfMonth, 9)]);
        fields.with_field(TemporalField::custom(YearMonth), 202_305).unwrap();
        let resolved = fields.resolve(ResolverStyle::Strict, None).unwrap();
        assert_eq!(resolved.date(), Some(&iso(2023, 5, 9)));
    }

    #[test]
    fn custom_field_must_agree_with_builtin_fields() {
        let mut fields = parsed(&[(Year, 2023), (MonthOfYear, 1), (DayOfMonth, 15)]);
        fields
            .with_field(always(Resolved::Date(iso(2023, 1, 16))), 1)
            .unwrap();
        let err = fields.resolve(ResolverStyle::Smart, None).unwrap_err();
        assert_eq!(
            err,
            DateTimeError::Conflict(
                "Fields resolved to two different dates: 2023-01-15 2023-01-16".to_string()
            )
        );
    }

    #[test]
    fn custom_field_must_use_parsed_chronology() {
        let minguo_date = Chronology::minguo().date(112, 1, 1).unwrap();
        let mut fields = Parsed::new();
        fields.with_field(always(Resolved::Date(minguo_date)), 1).unwrap();
        assert!(matches!(
            fields.resolve(ResolverStyle::Smart, None),
            Err(DateTimeError::ChronologyMismatch { .. })
        ));
    }

    #[test]
    fn custom_field_resolves_to_zoned_date_time() {
        let plus_two = ZoneId::Offset(ZoneOffset::of_hours_minutes(2, 0).unwrap());
        let zoned = iso(2023, 7, 1)
            .at_time(time(14, 0, 0, 0))
            .at_zone(plus_two.clone())
            .unwrap();

        let mut fields = Parsed::new();
        fields.with_field(always(Resolved::Zoned(zoned.clone())), 1).unwrap();
        let resolved = fields.resolve(ResolverStyle::Smart, None).unwrap();
        assert_eq!(resolved.zone(), Some(&plus_two));
        assert_eq!(resolved.time(), Some(time(14, 0, 0, 0)));
        assert_eq!(resolved.get_long(&InstantSeconds.into()), Ok(1_688_212_800));

        let mut fields = Parsed::new();
        fields.with_field(always(Resolved::Zoned(zoned)), 1).unwrap();
        fields.with_zone(ZoneId::Offset(ZoneOffset::UTC));
        let err = fields.resolve(ResolverStyle::Smart, None).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn custom_field_that_never_settles() {
        let mut fields = Parsed::new();
        fields.with_field(TemporalField::custom(Restless), 0).unwrap();
        assert_eq!(
            fields.resolve(ResolverStyle::Smart, None).unwrap_err(),
            DateTimeError::NonConvergence {
                rounds: MAX_RESOLVE_ROUNDS
            }
        );
    }

    #[test]
    fn leap_second_flag() {
        let mut fields = parsed(&[(HourOfDay, 23), (MinuteOfHour, 59), (SecondOfMinute, 59)]);
        fields.with_leap_second(true);
        let resolved = fields.resolve(ResolverStyle::Smart, None).unwrap();
        assert!(resolved.is_leap_second());
        assert_eq!(resolved.time(), Some(time(23, 59, 59, 0)));
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        fn style() -> impl Strategy<Value = ResolverStyle> {
            prop_oneof![
                Just(ResolverStyle::Strict),
                Just(ResolverStyle::Smart),
                Just(ResolverStyle::Lenient),
            ]
        }

        fn outcome(parsed: Parsed, style: ResolverStyle) -> Result<(Option<ChronoLocalDate>, Option<LocalTime>, i32, FieldValues)> {
            let resolved = parsed.resolve(style, None)?;
            Ok((
                resolved.date().cloned(),
                resolved.time(),
                resolved.excess_days().days(),
                resolved.field_values().clone(),
            ))
        }

        proptest! {
            #[test]
            fn resolution_is_deterministic(
                year in 1900i64..2100,
                month in -2i64..15,
                day in -2i64..34,
                hour in -2i64..27,
                minute in -2i64..62,
                style in style(),
            ) {
                let fields = parsed(&[
                    (Year, year),
                    (MonthOfYear, month),
                    (DayOfMonth, day),
                    (HourOfDay, hour),
                    (MinuteOfHour, minute),
                ]);
                prop_assert_eq!(outcome(fields.clone(), style), outcome(fields, style));
            }
        }
    }
}
