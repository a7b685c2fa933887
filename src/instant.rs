use std::time::SystemTime;

use num_integer::Integer;

use crate::div_rem::ExactArith;
use crate::error::{DateTimeError, Result};
use crate::iso::NANOS_PER_SECOND;
use crate::zone::ZoneId;

/// A point on the time-line, as seconds and nanoseconds since
/// 1970-01-01T00:00:00Z. Days are 86,400 seconds long; leap seconds are not
/// counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Instant {
    seconds: i64,
    // Always 0..1_000_000_000, also for instants before the epoch.
    nanos: u32,
}

impl Instant {
    pub const EPOCH: Instant = Instant {
        seconds: 0,
        nanos: 0,
    };

    /// The nano adjustment may be outside the second and is carried into the
    /// seconds, so `of_epoch_second(3, -1)` is 2.999999999.
    pub fn of_epoch_second(seconds: i64, nano_adjustment: i64) -> Result<Self> {
        let (carry, nanos) = nano_adjustment.div_mod_floor(&NANOS_PER_SECOND);
        Ok(Instant {
            seconds: seconds.add_exact(carry)?,
            nanos: nanos as u32,
        })
    }

    pub fn now() -> Result<Self> {
        SystemTime::now().try_into()
    }

    pub fn epoch_second(&self) -> i64 {
        self.seconds
    }

    pub fn nano(&self) -> u32 {
        self.nanos
    }

    pub fn plus_seconds(&self, seconds: i64) -> Result<Self> {
        Instant::of_epoch_second(self.seconds.add_exact(seconds)?, self.nanos as i64)
    }

    pub fn plus_nanos(&self, nanos: i64) -> Result<Self> {
        let (seconds, nanos) = nanos.div_mod_floor(&NANOS_PER_SECOND);
        Instant::of_epoch_second(
            self.seconds.add_exact(seconds)?,
            self.nanos as i64 + nanos,
        )
    }
}

impl TryFrom<SystemTime> for Instant {
    type Error = DateTimeError;

    fn try_from(value: SystemTime) -> Result<Self> {
        match value.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(duration) => {
                let seconds =
                    i64::try_from(duration.as_secs()).map_err(|_| DateTimeError::Overflow)?;
                Instant::of_epoch_second(seconds, duration.subsec_nanos() as i64)
            }
            // Before the epoch the error carries the distance back to it.
            Err(err) => {
                let duration = err.duration();
                let seconds =
                    i64::try_from(duration.as_secs()).map_err(|_| DateTimeError::Overflow)?;
                Instant::of_epoch_second(-seconds, -(duration.subsec_nanos() as i64))
            }
        }
    }
}

/// Source of the current instant and the zone to interpret it in.
pub trait Clock {
    fn instant(&self) -> Result<Instant>;

    fn zone(&self) -> ZoneId;
}
