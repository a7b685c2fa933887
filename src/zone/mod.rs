//! Zone offsets, zone ids and the rules that map instants to offsets.
//!
//! Rules normally come from the tz database through [`ZoneId::of`]. Any other
//! source can be plugged in by implementing [`ZoneRules`] and wrapping it with
//! [`ZoneId::region`].

use std::fmt;
use std::sync::Arc;

use crate::error::{DateTimeError, Result};
use crate::field::ChronoField;
use crate::iso::{SECONDS_PER_HOUR, SECONDS_PER_MINUTE};

mod zoneinfo;

/// A fixed difference from UTC, between -18:00 and +18:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoneOffset {
    total_seconds: i32,
}

impl ZoneOffset {
    pub const UTC: ZoneOffset = ZoneOffset { total_seconds: 0 };

    pub fn of_total_seconds(total_seconds: i64) -> Result<Self> {
        let total_seconds = ChronoField::OffsetSeconds.check_valid_int_value(total_seconds)?;
        Ok(ZoneOffset { total_seconds })
    }

    /// Hours and minutes must have the same sign.
    pub fn of_hours_minutes(hours: i32, minutes: i32) -> Result<Self> {
        Self::of_hours_minutes_seconds(hours, minutes, 0)
    }

    pub fn of_hours_minutes_seconds(hours: i32, minutes: i32, seconds: i32) -> Result<Self> {
        let invalid = |reason: &str| {
            DateTimeError::UnknownZone(format!(
                "Zone offset {}:{}:{} {}",
                hours, minutes, seconds, reason
            ))
        };
        if !(-18..=18).contains(&hours) {
            return Err(invalid("has hours out of range"));
        }
        if !(-59..=59).contains(&minutes) || !(-59..=59).contains(&seconds) {
            return Err(invalid("has minutes or seconds out of range"));
        }
        let signs = [hours.signum(), minutes.signum(), seconds.signum()];
        if signs.contains(&1) && signs.contains(&-1) {
            return Err(invalid("has fields with different signs"));
        }
        let total = hours as i64 * SECONDS_PER_HOUR
            + minutes as i64 * SECONDS_PER_MINUTE
            + seconds as i64;
        Self::of_total_seconds(total)
    }

    /// Parses `Z`, `±h`, `±hh`, `±hh:mm`, `±hhmm`, `±hh:mm:ss` or `±hhmmss`.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || {
            DateTimeError::UnknownZone(format!(
                "Invalid ID for ZoneOffset, invalid format: {}",
                text
            ))
        };
        if text == "Z" {
            return Ok(ZoneOffset::UTC);
        }
        let sign = match text.as_bytes().first() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Err(invalid()),
        };
        let digits = &text[1..];
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let parts: Vec<&str> = if digits.contains(':') {
            digits.split(':').collect()
        } else {
            match digits.len() {
                1 | 2 => vec![digits],
                4 => vec![&digits[..2], &digits[2..]],
                6 => vec![&digits[..2], &digits[2..4], &digits[4..]],
                _ => return Err(invalid()),
            }
        };
        if parts.len() > 3 || parts.iter().skip(1).any(|part| part.len() != 2) {
            return Err(invalid());
        }
        let mut values = [0i32; 3];
        for (value, part) in values.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *value = part.parse().map_err(|_| invalid())?;
        }
        Self::of_hours_minutes_seconds(sign * values[0], sign * values[1], sign * values[2])
    }

    pub fn total_seconds(&self) -> i32 {
        self.total_seconds
    }
}

impl fmt::Display for ZoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total_seconds == 0 {
            return f.write_str("Z");
        }
        let sign = if self.total_seconds < 0 { '-' } else { '+' };
        let total = self.total_seconds.unsigned_abs();
        let hours = total / 3600;
        let minutes = total / 60 % 60;
        let seconds = total % 60;
        write!(f, "{}{:02}:{:02}", sign, hours, minutes)?;
        if seconds != 0 {
            write!(f, ":{:02}", seconds)?;
        }
        Ok(())
    }
}

/// A change of offset at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoneOffsetTransition {
    epoch_second: i64,
    offset_before: ZoneOffset,
    offset_after: ZoneOffset,
}

impl ZoneOffsetTransition {
    pub fn new(epoch_second: i64, offset_before: ZoneOffset, offset_after: ZoneOffset) -> Self {
        ZoneOffsetTransition {
            epoch_second,
            offset_before,
            offset_after,
        }
    }

    pub fn epoch_second(&self) -> i64 {
        self.epoch_second
    }

    pub fn offset_before(&self) -> ZoneOffset {
        self.offset_before
    }

    pub fn offset_after(&self) -> ZoneOffset {
        self.offset_after
    }

    /// Local clock reading, in seconds since the local epoch, just before the
    /// transition.
    pub fn local_before(&self) -> i64 {
        self.epoch_second + self.offset_before.total_seconds() as i64
    }

    pub fn local_after(&self) -> i64 {
        self.epoch_second + self.offset_after.total_seconds() as i64
    }

    /// Signed size of the jump in the local clock.
    pub fn duration_seconds(&self) -> i64 {
        self.offset_after.total_seconds() as i64 - self.offset_before.total_seconds() as i64
    }

    /// Local times were skipped, as when clocks go forward in spring.
    pub fn is_gap(&self) -> bool {
        self.duration_seconds() > 0
    }

    /// Local times repeat, as when clocks go back in autumn.
    pub fn is_overlap(&self) -> bool {
        self.duration_seconds() < 0
    }

    /// The offsets valid for a local time inside the transition: none for a
    /// gap, the earlier then the later offset for an overlap.
    pub fn valid_offsets(&self) -> Vec<ZoneOffset> {
        if self.is_gap() {
            Vec::new()
        } else {
            vec![self.offset_before, self.offset_after]
        }
    }

    pub fn is_valid_offset(&self, offset: ZoneOffset) -> bool {
        !self.is_gap() && (offset == self.offset_before || offset == self.offset_after)
    }

    fn local_window(&self) -> (i64, i64) {
        let (before, after) = (self.local_before(), self.local_after());
        (before.min(after), before.max(after))
    }
}

/// How a local date-time maps onto a zone's offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetInfo {
    /// Exactly one offset applies.
    Single(ZoneOffset),
    /// The local date-time falls in a gap or an overlap.
    Transition(ZoneOffsetTransition),
}

/// Provider of the offsets in effect in a zone.
///
/// Local times are given as seconds since 1970-01-01T00:00 on the local clock.
pub trait ZoneRules: Send + Sync {
    fn offset_at(&self, epoch_second: i64) -> ZoneOffset;

    fn offset_info(&self, local_epoch_second: i64) -> OffsetInfo;

    /// Offsets under which the local time exists, in order of preference.
    fn valid_offsets(&self, local_epoch_second: i64) -> Vec<ZoneOffset> {
        match self.offset_info(local_epoch_second) {
            OffsetInfo::Single(offset) => vec![offset],
            OffsetInfo::Transition(transition) => transition.valid_offsets(),
        }
    }

    fn transition(&self, local_epoch_second: i64) -> Option<ZoneOffsetTransition> {
        match self.offset_info(local_epoch_second) {
            OffsetInfo::Single(_) => None,
            OffsetInfo::Transition(transition) => Some(transition),
        }
    }
}

/// Rules backed by a list of transitions sorted by instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRules {
    initial: ZoneOffset,
    transitions: Vec<ZoneOffsetTransition>,
}

impl TransitionRules {
    pub fn fixed(offset: ZoneOffset) -> Self {
        TransitionRules {
            initial: offset,
            transitions: Vec::new(),
        }
    }

    /// Each transition must start from the offset the previous one ended on.
    pub fn new(initial: ZoneOffset, transitions: Vec<ZoneOffsetTransition>) -> Result<Self> {
        let mut current = initial;
        let mut last_second = i64::MIN;
        for transition in &transitions {
            if transition.offset_before != current || transition.epoch_second <= last_second {
                return Err(DateTimeError::ZoneRules {
                    zone: "custom".to_string(),
                    reason: format!(
                        "transition at {} does not follow the previous one",
                        transition.epoch_second
                    ),
                });
            }
            current = transition.offset_after;
            last_second = transition.epoch_second;
        }
        Ok(TransitionRules {
            initial,
            transitions,
        })
    }

    pub fn transitions(&self) -> &[ZoneOffsetTransition] {
        &self.transitions
    }
}

impl ZoneRules for TransitionRules {
    fn offset_at(&self, epoch_second: i64) -> ZoneOffset {
        let index = self
            .transitions
            .partition_point(|t| t.epoch_second <= epoch_second);
        match index {
            0 => self.initial,
            _ => self.transitions[index - 1].offset_after,
        }
    }

    fn offset_info(&self, local_epoch_second: i64) -> OffsetInfo {
        let index = self
            .transitions
            .partition_point(|t| t.local_window().1 <= local_epoch_second);
        if let Some(next) = self.transitions.get(index) {
            if next.local_window().0 <= local_epoch_second {
                return OffsetInfo::Transition(*next);
            }
        }
        match index {
            0 => OffsetInfo::Single(self.initial),
            _ => OffsetInfo::Single(self.transitions[index - 1].offset_after),
        }
    }
}

/// A time-zone: either a fixed offset or a region with its own rules.
#[derive(Clone)]
pub enum ZoneId {
    Offset(ZoneOffset),
    Region { id: Arc<str>, rules: Arc<dyn ZoneRules> },
}

impl ZoneId {
    /// `Z` and `±hh:mm` style ids are fixed offsets. `UTC`, `GMT` and `UT` are
    /// regions with fixed rules. Anything else is looked up in the tz database.
    pub fn of(id: &str) -> Result<ZoneId> {
        if id == "Z" || id.starts_with('+') || id.starts_with('-') {
            return Ok(ZoneId::Offset(ZoneOffset::parse(id)?));
        }
        if matches!(id, "UTC" | "GMT" | "UT") {
            return Ok(ZoneId::region(
                id,
                Arc::new(TransitionRules::fixed(ZoneOffset::UTC)),
            ));
        }
        let rules = zoneinfo::load_rules(id)?;
        Ok(ZoneId::region(id, rules))
    }

    pub fn region(id: &str, rules: Arc<dyn ZoneRules>) -> ZoneId {
        ZoneId::Region {
            id: Arc::from(id),
            rules,
        }
    }

    pub fn id(&self) -> String {
        match self {
            ZoneId::Offset(offset) => offset.to_string(),
            ZoneId::Region { id, .. } => id.to_string(),
        }
    }

    pub fn rules(&self) -> Arc<dyn ZoneRules> {
        match self {
            ZoneId::Offset(offset) => Arc::new(TransitionRules::fixed(*offset)),
            ZoneId::Region { rules, .. } => rules.clone(),
        }
    }

    pub fn is_region(&self) -> bool {
        matches!(self, ZoneId::Region { .. })
    }
}

impl PartialEq for ZoneId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ZoneId::Offset(a), ZoneId::Offset(b)) => a == b,
            (ZoneId::Region { id: a, .. }, ZoneId::Region { id: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for ZoneId {}

impl fmt::Debug for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZoneId({})", self.id())
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}
