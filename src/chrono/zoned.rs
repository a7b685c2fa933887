use std::cmp::Ordering;
use std::fmt;

use num_integer::Integer;
use tracing::trace;

use crate::chrono::{ChronoLocalDate, ChronoLocalDateTime, Chronology};
use crate::div_rem::ExactArith;
use crate::error::{DateTimeError, Result};
use crate::field::{ChronoField, ChronoUnit, TemporalField, ValueRange};
use crate::instant::Instant;
use crate::iso::{LocalTime, NANOS_PER_SECOND, SECONDS_PER_DAY};
use crate::temporal::TemporalAccessor;
use crate::zone::{ZoneId, ZoneOffset, ZoneOffsetTransition};

/// A date-time with the offset and zone it was observed in.
///
/// The offset is always one the zone's rules allow for the local date-time,
/// so the value identifies a single instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChronoZonedDateTime {
    date_time: ChronoLocalDateTime,
    offset: ZoneOffset,
    zone: ZoneId,
}

impl ChronoZonedDateTime {
    /// Places a local date-time in a zone.
    ///
    /// In an overlap the preferred offset is kept if it is one of the two,
    /// otherwise the first offset listed by the rules is used. In a gap the
    /// local date-time is moved forward by the length of the gap.
    pub fn of_best(
        local: ChronoLocalDateTime,
        zone: ZoneId,
        preferred: Option<ZoneOffset>,
    ) -> Result<Self> {
        if let ZoneId::Offset(offset) = zone {
            return Ok(ChronoZonedDateTime {
                date_time: local,
                offset,
                zone,
            });
        }
        let rules = zone.rules();
        let local_second = local.local_epoch_second();
        let valid = rules.valid_offsets(local_second);
        let (date_time, offset) = match valid.as_slice() {
            [offset] => (local, *offset),
            [] => {
                let transition = rules.transition(local_second).ok_or_else(|| {
                    DateTimeError::ZoneRules {
                        zone: zone.id(),
                        reason: format!("no offset or transition for local time {}", local),
                    }
                })?;
                trace!(zone = %zone, %local, "local date-time is in a gap, moving forward");
                (
                    local.plus_seconds(transition.duration_seconds())?,
                    transition.offset_after(),
                )
            }
            [first, ..] => match preferred {
                Some(preferred) if valid.contains(&preferred) => (local, preferred),
                _ => (local, *first),
            },
        };
        Ok(ChronoZonedDateTime {
            date_time,
            offset,
            zone,
        })
    }

    /// The date-time in `chronology` at `instant` as seen in `zone`.
    pub fn of_instant(chronology: &Chronology, instant: Instant, zone: &ZoneId) -> Result<Self> {
        let offset = zone.rules().offset_at(instant.epoch_second());
        let local_second = instant
            .epoch_second()
            .add_exact(offset.total_seconds() as i64)?;
        let (epoch_day, second_of_day) = local_second.div_mod_floor(&SECONDS_PER_DAY);
        let date = chronology.date_epoch_day(epoch_day)?;
        let time = LocalTime::of_second_of_day(second_of_day, instant.nano() as i64)?;
        Ok(ChronoZonedDateTime {
            date_time: date.at_time(time),
            offset,
            zone: zone.clone(),
        })
    }

    pub fn chronology(&self) -> &Chronology {
        self.date_time.chronology()
    }

    pub fn offset(&self) -> ZoneOffset {
        self.offset
    }

    pub fn zone(&self) -> &ZoneId {
        &self.zone
    }

    pub fn to_local_date(&self) -> &ChronoLocalDate {
        self.date_time.to_local_date()
    }

    pub fn to_local_time(&self) -> LocalTime {
        self.date_time.to_local_time()
    }

    pub fn to_local_date_time(&self) -> &ChronoLocalDateTime {
        &self.date_time
    }

    pub fn to_epoch_second(&self) -> i64 {
        self.date_time.to_epoch_second(self.offset)
    }

    pub fn to_instant(&self) -> Result<Instant> {
        self.date_time.to_instant(self.offset)
    }

    fn with_offset(&self, offset: ZoneOffset) -> Self {
        ChronoZonedDateTime {
            date_time: self.date_time.clone(),
            offset,
            zone: self.zone.clone(),
        }
    }

    /// In an overlap, the same local date-time at the offset in effect
    /// before the transition. Otherwise unchanged.
    pub fn with_earlier_offset_at_overlap(&self) -> Self {
        match self.overlap() {
            Some(transition) => self.with_offset(transition.offset_before()),
            None => self.clone(),
        }
    }

    /// In an overlap, the same local date-time at the offset in effect
    /// after the transition. Otherwise unchanged.
    pub fn with_later_offset_at_overlap(&self) -> Self {
        match self.overlap() {
            Some(transition) => self.with_offset(transition.offset_after()),
            None => self.clone(),
        }
    }

    fn overlap(&self) -> Option<ZoneOffsetTransition> {
        self.zone
            .rules()
            .transition(self.date_time.local_epoch_second())
            .filter(|transition| transition.is_overlap())
    }

    /// The same local date-time in another zone, keeping the offset if the
    /// new zone allows it.
    pub fn with_zone_same_local(&self, zone: ZoneId) -> Result<Self> {
        if zone == self.zone {
            return Ok(self.clone());
        }
        ChronoZonedDateTime::of_best(self.date_time.clone(), zone, Some(self.offset))
    }

    /// The same instant seen from another zone.
    pub fn with_zone_same_instant(&self, zone: ZoneId) -> Result<Self> {
        if zone == self.zone {
            return Ok(self.clone());
        }
        ChronoZonedDateTime::of_instant(self.chronology(), self.to_instant()?, &zone)
    }

    pub fn with(&self, field: impl Into<TemporalField>, value: i64) -> Result<Self> {
        let field = field.into();
        if field == ChronoField::InstantSeconds {
            let seconds = value.sub_exact(self.to_epoch_second())?;
            return self.plus(seconds, ChronoUnit::Seconds);
        }
        if field == ChronoField::OffsetSeconds {
            let offset = ZoneOffset::of_total_seconds(value)?;
            let instant = self.date_time.to_instant(offset)?;
            return ChronoZonedDateTime::of_instant(self.chronology(), instant, &self.zone);
        }
        let local = self.date_time.with(field, value)?;
        ChronoZonedDateTime::of_best(local, self.zone.clone(), Some(self.offset))
    }

    /// Date-based units move the local date-time and keep the offset where
    /// possible. Time-based units move the instant, so adding an hour always
    /// means sixty minutes of elapsed time.
    pub fn plus(&self, amount: i64, unit: ChronoUnit) -> Result<Self> {
        let unit_nanos = match unit.nanos() {
            Some(unit_nanos) => unit_nanos,
            None => {
                let local = self.date_time.plus(amount, unit)?;
                return ChronoZonedDateTime::of_best(local, self.zone.clone(), Some(self.offset));
            }
        };
        let instant = self.to_instant()?;
        let instant = if unit_nanos >= NANOS_PER_SECOND {
            instant.plus_seconds(amount.mul_exact(unit_nanos / NANOS_PER_SECOND)?)?
        } else {
            let (seconds, rest) = amount.div_mod_floor(&(NANOS_PER_SECOND / unit_nanos));
            instant.plus_seconds(seconds)?.plus_nanos(rest * unit_nanos)?
        };
        ChronoZonedDateTime::of_instant(self.chronology(), instant, &self.zone)
    }

    pub fn minus(&self, amount: i64, unit: ChronoUnit) -> Result<Self> {
        if amount == i64::MIN {
            return self.plus(i64::MAX, unit)?.plus(1, unit);
        }
        self.plus(-amount, unit)
    }

    /// Whole units to `end`, measured after moving `end` into this offset.
    pub fn until(&self, end: &ChronoZonedDateTime, unit: ChronoUnit) -> Result<i64> {
        let end = ChronoZonedDateTime::of_instant(self.chronology(), end.to_instant()?, &end.zone)?
            .with_zone_same_instant(ZoneId::Offset(self.offset))?;
        self.date_time.until(&end.date_time, unit)
    }

    fn instant_cmp(&self, other: &ChronoZonedDateTime) -> Ordering {
        self.to_epoch_second()
            .cmp(&other.to_epoch_second())
            .then_with(|| self.to_local_time().nano().cmp(&other.to_local_time().nano()))
    }

    pub fn is_before(&self, other: &ChronoZonedDateTime) -> bool {
        self.instant_cmp(other) == Ordering::Less
    }

    pub fn is_after(&self, other: &ChronoZonedDateTime) -> bool {
        self.instant_cmp(other) == Ordering::Greater
    }

    /// Same instant, whatever the zone or calendar system.
    pub fn is_equal(&self, other: &ChronoZonedDateTime) -> bool {
        self.instant_cmp(other) == Ordering::Equal
    }
}

impl TemporalAccessor for ChronoZonedDateTime {
    fn is_supported(&self, field: &TemporalField) -> bool {
        match field {
            TemporalField::Chrono(_) => true,
            TemporalField::Custom(custom) => custom.is_supported_by(self),
        }
    }

    fn range(&self, field: &TemporalField) -> Result<ValueRange> {
        match field {
            TemporalField::Chrono(
                field @ (ChronoField::InstantSeconds | ChronoField::OffsetSeconds),
            ) => Ok(field.range()),
            TemporalField::Chrono(_) => self.date_time.range(field),
            TemporalField::Custom(custom) => custom.range_refined_by(self),
        }
    }

    fn get_long(&self, field: &TemporalField) -> Result<i64> {
        match field {
            TemporalField::Chrono(ChronoField::InstantSeconds) => Ok(self.to_epoch_second()),
            TemporalField::Chrono(ChronoField::OffsetSeconds) => {
                Ok(self.offset.total_seconds() as i64)
            }
            TemporalField::Chrono(field) => self.date_time.field(*field),
            TemporalField::Custom(custom) => custom.get_from(self),
        }
    }

    fn chronology(&self) -> Option<Chronology> {
        Some(self.chronology().clone())
    }

    fn zone(&self) -> Option<ZoneId> {
        Some(self.zone.clone())
    }

    fn offset(&self) -> Option<ZoneOffset> {
        Some(self.offset)
    }

    fn local_date(&self) -> Option<ChronoLocalDate> {
        Some(self.to_local_date().clone())
    }

    fn local_time(&self) -> Option<LocalTime> {
        Some(self.to_local_time())
    }
}

impl PartialOrd for ChronoZonedDateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Instant first, then local date-time, then zone id, then chronology.
impl Ord for ChronoZonedDateTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant_cmp(other)
            .then_with(|| self.date_time.cmp(&other.date_time))
            .then_with(|| self.zone.id().cmp(&other.zone.id()))
            .then_with(|| self.chronology().cmp(other.chronology()))
    }
}

impl fmt::Display for ChronoZonedDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.date_time, self.offset)?;
        if self.zone.is_region() {
            write!(f, "[{}]", self.zone)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::zone::tests::{europe_2023, offset};
    use crate::zone::{OffsetInfo, TransitionRules, ZoneRules};

    fn europe() -> ZoneId {
        ZoneId::region("Test/Europe", Arc::new(europe_2023()))
    }

    fn local(m: i64, d: i64, h: i64, min: i64) -> ChronoLocalDateTime {
        Chronology::iso()
            .date(2023, m, d)
            .unwrap()
            .at_time(LocalTime::of(h, min, 0, 0).unwrap())
    }

    // Lists the offsets of an overlap with the later one first.
    struct LaterFirst(TransitionRules);

    impl ZoneRules for LaterFirst {
        fn offset_at(&self, epoch_second: i64) -> ZoneOffset {
            self.0.offset_at(epoch_second)
        }

        fn offset_info(&self, local_epoch_second: i64) -> OffsetInfo {
            self.0.offset_info(local_epoch_second)
        }

        fn valid_offsets(&self, local_epoch_second: i64) -> Vec<ZoneOffset> {
            let mut offsets = self.0.valid_offsets(local_epoch_second);
            offsets.reverse();
            offsets
        }
    }

    #[test]
    fn overlap_offsets() {
        let zoned = ChronoZonedDateTime::of_best(local(10, 29, 2, 30), europe(), None).unwrap();
        assert_eq!(zoned.offset(), offset(2));
        assert_eq!(zoned.with_later_offset_at_overlap().offset(), offset(1));
        assert_eq!(
            zoned.with_later_offset_at_overlap().with_earlier_offset_at_overlap().offset(),
            offset(2)
        );
        assert!(zoned.is_before(&zoned.with_later_offset_at_overlap()));

        let preferred =
            ChronoZonedDateTime::of_best(local(10, 29, 2, 30), europe(), Some(offset(1))).unwrap();
        assert_eq!(preferred.offset(), offset(1));
        let not_valid =
            ChronoZonedDateTime::of_best(local(10, 29, 2, 30), europe(), Some(offset(3))).unwrap();
        assert_eq!(not_valid.offset(), offset(2));

        let later_first = ZoneId::region("Test/LaterFirst", Arc::new(LaterFirst(europe_2023())));
        let zoned = ChronoZonedDateTime::of_best(local(10, 29, 2, 30), later_first, None).unwrap();
        assert_eq!(zoned.offset(), offset(1));
    }

    #[test]
    fn overlap_adjustment_outside_overlap_is_identity() {
        let zoned = ChronoZonedDateTime::of_best(local(7, 1, 12, 0), europe(), None).unwrap();
        assert_eq!(zoned.with_earlier_offset_at_overlap(), zoned);
        assert_eq!(zoned.with_later_offset_at_overlap(), zoned);
    }

    #[test]
    fn gap_moves_forward() {
        let zoned = ChronoZonedDateTime::of_best(local(3, 26, 2, 30), europe(), None).unwrap();
        assert_eq!(zoned.to_local_date_time(), &local(3, 26, 3, 30));
        assert_eq!(zoned.offset(), offset(2));
        assert_eq!(zoned.to_string(), "2023-03-26T03:30+02:00[Test/Europe]");
    }

    #[test]
    fn of_instant_uses_zone_offset() {
        let instant = Instant::of_epoch_second(1_698_541_200 - 1800, 0).unwrap();
        let zoned = Chronology::iso().zoned_date_time(instant, &europe()).unwrap();
        assert_eq!(zoned.to_local_date_time(), &local(10, 29, 2, 30));
        assert_eq!(zoned.offset(), offset(2));
        let minguo = Chronology::minguo().zoned_date_time(instant, &europe()).unwrap();
        assert_eq!(minguo.to_local_date().year(), 112);
        assert!(minguo.is_equal(&zoned));
    }

    #[test]
    fn plus_time_units_follow_the_instant() {
        let start = ChronoZonedDateTime::of_best(local(10, 29, 1, 30), europe(), None).unwrap();
        let one = start.plus(1, ChronoUnit::Hours).unwrap();
        assert_eq!((one.to_local_time().hour(), one.offset()), (2, offset(2)));
        let two = start.plus(2, ChronoUnit::Hours).unwrap();
        assert_eq!((two.to_local_time().hour(), two.offset()), (2, offset(1)));
        assert_eq!(start.until(&two, ChronoUnit::Hours), Ok(2));
        assert_eq!(start.plus(7_200_000, ChronoUnit::Millis), Ok(two.clone()));
        assert_eq!(two.minus(2, ChronoUnit::Hours), Ok(start));
    }

    #[test]
    fn plus_date_units_follow_the_local_time() {
        let start = ChronoZonedDateTime::of_best(local(3, 25, 2, 30), europe(), None).unwrap();
        let next = start.plus(1, ChronoUnit::Days).unwrap();
        assert_eq!(next.to_local_date_time(), &local(3, 26, 3, 30));
        let later = start.plus(1, ChronoUnit::Weeks).unwrap();
        assert_eq!(later.to_local_date_time(), &local(4, 1, 2, 30));
        assert_eq!(later.offset(), offset(2));
    }

    #[test]
    fn with_fields() {
        let zoned = ChronoZonedDateTime::of_best(local(10, 29, 2, 30), europe(), None).unwrap();
        let later = zoned.with(ChronoField::OffsetSeconds, 3600).unwrap();
        assert_eq!(later.to_local_date_time(), &local(10, 29, 2, 30));
        assert_eq!(later.offset(), offset(1));
        let moved = zoned
            .with(ChronoField::InstantSeconds, zoned.to_epoch_second() + 3600)
            .unwrap();
        assert_eq!(moved, later);
        let hour = zoned.with(ChronoField::HourOfDay, 12).unwrap();
        assert_eq!(hour.to_local_time().hour(), 12);
        assert_eq!(hour.offset(), offset(1));
    }

    #[test]
    fn zone_changes() {
        let zoned = ChronoZonedDateTime::of_best(local(7, 1, 12, 0), europe(), None).unwrap();
        let utc = zoned.with_zone_same_instant(ZoneId::Offset(ZoneOffset::UTC)).unwrap();
        assert_eq!(utc.to_local_date_time(), &local(7, 1, 10, 0));
        assert!(utc.is_equal(&zoned));
        assert_eq!(utc.to_string(), "2023-07-01T10:00Z");
        let same_local = zoned
            .with_zone_same_local(ZoneId::Offset(ZoneOffset::UTC))
            .unwrap();
        assert_eq!(same_local.to_local_date_time(), zoned.to_local_date_time());
        assert!(same_local.is_after(&zoned));
    }

    #[test]
    fn instant_seconds_needs_get_long() {
        let zoned = ChronoZonedDateTime::of_best(local(7, 1, 12, 0), europe(), None).unwrap();
        let field = ChronoField::InstantSeconds.into();
        assert!(matches!(zoned.get(&field), Err(DateTimeError::UnsupportedField(_))));
        assert_eq!(zoned.get_long(&field), Ok(zoned.to_epoch_second()));
        assert_eq!(zoned.get(&ChronoField::OffsetSeconds.into()), Ok(7200));
        assert_eq!(zoned.get(&ChronoField::HourOfDay.into()), Ok(12));
    }

    #[test]
    fn ordering_tie_breaks() {
        let paris = ChronoZonedDateTime::of_best(local(7, 1, 12, 0), europe(), None).unwrap();
        let fixed = paris
            .with_zone_same_local(ZoneId::Offset(offset(2)))
            .unwrap();
        // Same instant and local date-time, so the zone id decides.
        assert!(paris.is_equal(&fixed));
        assert_ne!(paris, fixed);
        assert_eq!(fixed.cmp(&paris), "+02:00".cmp("Test/Europe"));

        let minguo_local = Chronology::minguo()
            .date_from(paris.to_local_date())
            .unwrap()
            .at_time(paris.to_local_time());
        let minguo = ChronoZonedDateTime::of_best(minguo_local, europe(), None).unwrap();
        assert!(paris < minguo);

        let earlier = paris.minus(1, ChronoUnit::Nanos).unwrap();
        assert!(earlier < paris && earlier < fixed && earlier < minguo);
    }
}
