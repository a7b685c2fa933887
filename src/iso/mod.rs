pub use chronology::IsoChronology;
pub use local_time::LocalTime;

mod chronology;
mod local_time;
pub(crate) mod util;

pub const MIN_YEAR: i64 = -999_999_999;
pub const MAX_YEAR: i64 = 999_999_999;

pub(crate) const HOURS_PER_DAY: i64 = 24;
pub(crate) const MINUTES_PER_HOUR: i64 = 60;
pub(crate) const MINUTES_PER_DAY: i64 = MINUTES_PER_HOUR * HOURS_PER_DAY;
pub(crate) const SECONDS_PER_MINUTE: i64 = 60;
pub(crate) const SECONDS_PER_HOUR: i64 = SECONDS_PER_MINUTE * MINUTES_PER_HOUR;
pub(crate) const SECONDS_PER_DAY: i64 = SECONDS_PER_HOUR * HOURS_PER_DAY;
pub(crate) const MILLIS_PER_DAY: i64 = SECONDS_PER_DAY * 1000;
pub(crate) const MICROS_PER_DAY: i64 = SECONDS_PER_DAY * 1_000_000;
pub(crate) const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub(crate) const NANOS_PER_MINUTE: i64 = NANOS_PER_SECOND * SECONDS_PER_MINUTE;
pub(crate) const NANOS_PER_HOUR: i64 = NANOS_PER_MINUTE * MINUTES_PER_HOUR;
pub(crate) const NANOS_PER_DAY: i64 = NANOS_PER_HOUR * HOURS_PER_DAY;
