//! Calendar systems and the date types that are generic over them.
//!
//! A [`Chronology`] is a cheap handle to a shared [`CalendarSystem`]. The date,
//! date-time and zoned date-time types hold a handle and route every
//! calendar-specific question through it, so a new calendar system only has to
//! describe its years, months and eras.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub use date::ChronoLocalDate;
pub use date_time::ChronoLocalDateTime;
pub use minguo::MinguoChronology;
pub use resolve::ResolverStyle;
pub use thai_buddhist::ThaiBuddhistChronology;
pub use zoned::ChronoZonedDateTime;

use crate::error::{DateTimeError, Result};
use crate::field::{ChronoField, FieldValues};
use crate::instant::{Clock, Instant};
use crate::iso::LocalTime;
use crate::period::ChronoPeriod;
use crate::temporal::TemporalAccessor;
use crate::zone::ZoneId;

mod date;
mod date_time;
mod minguo;
mod registry;
pub(crate) mod resolve;
mod thai_buddhist;
mod zoned;

/// An era of a calendar system.
///
/// Era 1 is the era in effect at the conventional epoch of the calendar. Later
/// eras have higher values and earlier eras lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Era {
    chronology: &'static str,
    value: i32,
    name: &'static str,
}

impl Era {
    pub const fn new(chronology: &'static str, value: i32, name: &'static str) -> Self {
        Era {
            chronology,
            value,
            name,
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Id of the chronology the era belongs to.
    pub fn chronology_id(&self) -> &'static str {
        self.chronology
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The rules of a calendar system.
///
/// Implementations describe how proleptic years, months and days map to epoch
/// days (days since 1970-01-01 in every calendar) and how eras relate to
/// proleptic years. Everything else, including field resolution and date
/// arithmetic, is shared.
pub trait CalendarSystem: Send + Sync {
    fn id(&self) -> &str;

    /// Calendar type as defined by Unicode LDML, if there is one.
    fn calendar_type(&self) -> Option<&str>;

    fn eras(&self) -> &[Era];

    fn era_of(&self, value: i64) -> Result<Era> {
        self.eras()
            .iter()
            .find(|era| era.value() as i64 == value)
            .copied()
            .ok_or_else(|| DateTimeError::InvalidEra {
                value: value.to_string(),
                chronology: self.id().to_string(),
            })
    }

    /// Fails with [`DateTimeError::InvalidEra`] if the era belongs to another
    /// calendar system.
    fn proleptic_year(&self, era: Era, year_of_era: i64) -> Result<i64>;

    fn era_and_year_of_era(&self, proleptic_year: i64) -> (Era, i64);

    fn is_leap_year(&self, proleptic_year: i64) -> bool;

    /// The range of a field in this calendar, independent of any particular date.
    fn range(&self, field: ChronoField) -> crate::field::ValueRange {
        field.range()
    }

    fn months_in_year(&self) -> u8 {
        12
    }

    fn length_of_month(&self, proleptic_year: i64, month: u8) -> u8;

    fn length_of_year(&self, proleptic_year: i64) -> u16;

    /// Validates month and day against the proleptic year, which is already
    /// known to be in range.
    fn check_date(&self, proleptic_year: i64, month: i64, day: i64) -> Result<(u8, u8)>;

    /// Only called with a date that passed [`check_date`](Self::check_date).
    fn epoch_day_of(&self, proleptic_year: i64, month: u8, day: u8) -> i64;

    /// Only called with an epoch day within the range of `EpochDay`.
    fn ymd_of(&self, epoch_day: i64) -> (i64, u8, u8);

    fn display_date(
        &self,
        f: &mut fmt::Formatter<'_>,
        proleptic_year: i64,
        month: u8,
        day: u8,
    ) -> fmt::Result {
        let (era, year_of_era) = self.era_and_year_of_era(proleptic_year);
        write!(
            f,
            "{} {} {}-{:02}-{:02}",
            self.id(),
            era,
            year_of_era,
            month,
            day
        )
    }

    /// Combines date fields into a date. The default is the field resolution
    /// shared by every calendar system.
    fn resolve_date(
        &self,
        chronology: &Chronology,
        field_values: &mut FieldValues,
        style: ResolverStyle,
    ) -> Result<Option<ChronoLocalDate>> {
        resolve::resolve_date(chronology, field_values, style)
    }
}

/// Handle to a calendar system. Chronologies are equal and ordered by id.
#[derive(Clone)]
pub struct Chronology {
    pimpl: Arc<dyn CalendarSystem>,
}

impl Chronology {
    pub fn new(system: impl CalendarSystem + 'static) -> Self {
        Chronology {
            pimpl: Arc::new(system),
        }
    }

    /// Looks up a registered chronology by id, then by calendar type.
    pub fn of(id: &str) -> Result<Chronology> {
        registry::lookup(id)
    }

    pub fn iso() -> Chronology {
        registry::iso()
    }

    pub fn minguo() -> Chronology {
        registry::minguo()
    }

    pub fn thai_buddhist() -> Chronology {
        registry::thai_buddhist()
    }

    /// Registers a chronology. If the id is already taken the existing
    /// registration is kept and returned.
    pub fn register(chronology: Chronology) -> Chronology {
        registry::register(chronology)
    }

    /// Every registered chronology, sorted by id.
    pub fn available() -> Vec<Chronology> {
        registry::available()
    }

    pub fn id(&self) -> &str {
        self.pimpl.id()
    }

    pub fn calendar_type(&self) -> Option<&str> {
        self.pimpl.calendar_type()
    }

    pub(crate) fn system(&self) -> &dyn CalendarSystem {
        self.pimpl.as_ref()
    }

    pub(crate) fn same_instance(&self, other: &Chronology) -> bool {
        Arc::ptr_eq(&self.pimpl, &other.pimpl)
    }

    pub fn date(&self, proleptic_year: i64, month: i64, day: i64) -> Result<ChronoLocalDate> {
        let year = self
            .range(ChronoField::Year)
            .check_valid_value(proleptic_year, ChronoField::Year)?;
        let (month, day) = self.pimpl.check_date(year, month, day)?;
        Ok(ChronoLocalDate::new(self.clone(), year, month, day))
    }

    pub fn date_year_day(&self, proleptic_year: i64, day_of_year: i64) -> Result<ChronoLocalDate> {
        let year = self
            .range(ChronoField::Year)
            .check_valid_value(proleptic_year, ChronoField::Year)?;
        let day_of_year = ChronoField::DayOfYear.check_valid_value(day_of_year)?;
        let length = self.pimpl.length_of_year(year) as i64;
        if day_of_year > length {
            return Err(DateTimeError::InvalidDate(format!(
                "Invalid date 'DayOfYear {}' as '{}' is not a leap year",
                day_of_year, year
            )));
        }
        let epoch_day = self.pimpl.epoch_day_of(year, 1, 1) + day_of_year - 1;
        self.date_epoch_day(epoch_day)
    }

    pub fn date_epoch_day(&self, epoch_day: i64) -> Result<ChronoLocalDate> {
        let epoch_day = self
            .range(ChronoField::EpochDay)
            .check_valid_value(epoch_day, ChronoField::EpochDay)?;
        let (year, month, day) = self.pimpl.ymd_of(epoch_day);
        Ok(ChronoLocalDate::new(self.clone(), year, month, day))
    }

    pub fn date_era(
        &self,
        era: Era,
        year_of_era: i64,
        month: i64,
        day: i64,
    ) -> Result<ChronoLocalDate> {
        let year = self.proleptic_year(era, year_of_era)?;
        self.date(year, month, day)
    }

    pub fn date_year_day_era(
        &self,
        era: Era,
        year_of_era: i64,
        day_of_year: i64,
    ) -> Result<ChronoLocalDate> {
        let year = self.proleptic_year(era, year_of_era)?;
        self.date_year_day(year, day_of_year)
    }

    /// The date in this chronology on the same day as `temporal`.
    pub fn date_from(&self, temporal: &dyn TemporalAccessor) -> Result<ChronoLocalDate> {
        let epoch_day = match temporal.local_date() {
            Some(date) => date.epoch_day(),
            None => temporal.get_long(&ChronoField::EpochDay.into())?,
        };
        self.date_epoch_day(epoch_day)
    }

    /// Today's date according to the clock's instant and zone.
    pub fn date_now_of(&self, clock: &dyn Clock) -> Result<ChronoLocalDate> {
        let zoned = self.zoned_date_time(clock.instant()?, &clock.zone())?;
        Ok(zoned.to_local_date().clone())
    }

    pub fn local_date_time(&self, temporal: &dyn TemporalAccessor) -> Result<ChronoLocalDateTime> {
        let date = self.date_from(temporal)?;
        let time = match temporal.local_time() {
            Some(time) => time,
            None => LocalTime::of_nano_of_day(
                temporal.get_long(&ChronoField::NanoOfDay.into())?,
            )?,
        };
        Ok(date.at_time(time))
    }

    pub fn zoned_date_time(&self, instant: Instant, zone: &ZoneId) -> Result<ChronoZonedDateTime> {
        ChronoZonedDateTime::of_instant(self, instant, zone)
    }

    /// Uses the instant of `temporal` if it has one, otherwise its local
    /// date-time placed in its zone.
    pub fn zoned_date_time_from(
        &self,
        temporal: &dyn TemporalAccessor,
    ) -> Result<ChronoZonedDateTime> {
        let zone = temporal
            .zone()
            .or_else(|| temporal.offset().map(ZoneId::Offset))
            .ok_or_else(|| DateTimeError::UnsupportedField("zone".to_string()))?;
        let instant_field = ChronoField::InstantSeconds.into();
        if temporal.is_supported(&instant_field) {
            let seconds = temporal.get_long(&instant_field)?;
            let nanos = match temporal.local_time() {
                Some(time) => time.nano() as i64,
                None => 0,
            };
            return self.zoned_date_time(Instant::of_epoch_second(seconds, nanos)?, &zone);
        }
        let local = self.local_date_time(temporal)?;
        ChronoZonedDateTime::of_best(local, zone, temporal.offset())
    }

    pub fn is_leap_year(&self, proleptic_year: i64) -> bool {
        self.pimpl.is_leap_year(proleptic_year)
    }

    pub fn proleptic_year(&self, era: Era, year_of_era: i64) -> Result<i64> {
        self.pimpl.proleptic_year(era, year_of_era)
    }

    pub fn era_of(&self, value: i64) -> Result<Era> {
        self.pimpl.era_of(value)
    }

    pub fn eras(&self) -> &[Era] {
        self.pimpl.eras()
    }

    pub fn range(&self, field: ChronoField) -> crate::field::ValueRange {
        self.pimpl.range(field)
    }

    pub fn resolve_date(
        &self,
        field_values: &mut FieldValues,
        style: ResolverStyle,
    ) -> Result<Option<ChronoLocalDate>> {
        self.pimpl.resolve_date(self, field_values, style)
    }

    pub fn period(&self, years: i32, months: i32, days: i32) -> ChronoPeriod {
        ChronoPeriod::of(self.clone(), years, months, days)
    }
}

/// Checks that a date produced by an adjuster or field is still in the
/// expected calendar system.
pub(crate) fn ensure_valid(expected: &Chronology, date: ChronoLocalDate) -> Result<ChronoLocalDate> {
    if date.chronology() != expected {
        return Err(DateTimeError::ChronologyMismatch {
            expected: expected.id().to_string(),
            actual: date.chronology().id().to_string(),
        });
    }
    Ok(date)
}

impl PartialEq for Chronology {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Chronology {}

impl PartialOrd for Chronology {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Chronology {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(other.id())
    }
}

impl Hash for Chronology {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Chronology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chronology({})", self.id())
    }
}

impl fmt::Display for Chronology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::ZoneOffset;

    struct FixedClock(Instant, ZoneId);

    impl Clock for FixedClock {
        fn instant(&self) -> Result<Instant> {
            Ok(self.0)
        }
        fn zone(&self) -> ZoneId {
            self.1.clone()
        }
    }

    #[test]
    fn ordering_and_equality_by_id() {
        let iso = Chronology::iso();
        let minguo = Chronology::minguo();
        let thai = Chronology::thai_buddhist();
        assert_eq!(iso, Chronology::of("ISO").unwrap());
        assert!(iso < minguo);
        assert!(minguo < thai);
        assert_eq!(Chronology::of("roc").unwrap(), minguo);
        assert_eq!(Chronology::of("buddhist").unwrap(), thai);
        assert_eq!(Chronology::of("iso8601").unwrap(), iso);
        assert!(matches!(
            Chronology::of("Coptic"),
            Err(DateTimeError::UnknownChronology(_))
        ));
    }

    #[test]
    fn date_era_rejects_foreign_era() {
        let iso = Chronology::iso();
        let roc = Chronology::minguo().era_of(1).unwrap();
        let err = iso.date_era(roc, 5, 1, 1).unwrap_err();
        assert!(matches!(err, DateTimeError::InvalidEra { .. }));

        let ce = iso.era_of(1).unwrap();
        assert_eq!(ce.name(), "CE");
        assert_eq!(iso.date_era(ce, 2023, 1, 15), iso.date(2023, 1, 15));
        let bce = iso.era_of(0).unwrap();
        assert_eq!(iso.date_era(bce, 1, 1, 1).unwrap().year(), 0);
    }

    #[test]
    fn date_year_day() {
        let iso = Chronology::iso();
        assert_eq!(iso.date_year_day(2024, 60), iso.date(2024, 2, 29));
        assert_eq!(iso.date_year_day(2023, 365), iso.date(2023, 12, 31));
        assert!(matches!(
            iso.date_year_day(2023, 366),
            Err(DateTimeError::InvalidDate(_))
        ));
        assert!(matches!(
            iso.date_year_day(2023, 0),
            Err(DateTimeError::Range { .. })
        ));
    }

    #[test]
    fn date_epoch_day_range() {
        let iso = Chronology::iso();
        assert_eq!(iso.date_epoch_day(0), iso.date(1970, 1, 1));
        assert!(iso.date_epoch_day(365_241_780_472).is_err());
        assert!(iso.date(1_000_000_000, 1, 1).is_err());
    }

    #[test]
    fn date_from_other_calendar() {
        let iso_date = Chronology::iso().date(2023, 1, 15).unwrap();
        let minguo_date = Chronology::minguo().date_from(&iso_date).unwrap();
        assert_eq!(minguo_date.year(), 112);
        assert_eq!(minguo_date.epoch_day(), iso_date.epoch_day());
    }

    #[test]
    fn date_now_uses_clock_zone() {
        // 2023-01-15T23:30:00Z is already the 16th at +01:00.
        let instant = Instant::of_epoch_second(19372 * 86_400 + 23 * 3600 + 1800, 0).unwrap();
        let plus_one = ZoneId::Offset(ZoneOffset::of_hours_minutes(1, 0).unwrap());
        let clock = FixedClock(instant, plus_one);
        assert_eq!(
            Chronology::iso().date_now_of(&clock),
            Chronology::iso().date(2023, 1, 16)
        );
        let clock = FixedClock(instant, ZoneId::Offset(ZoneOffset::UTC));
        assert_eq!(
            Chronology::thai_buddhist().date_now_of(&clock).unwrap().year(),
            2566
        );
    }
}
