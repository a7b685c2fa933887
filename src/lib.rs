//! Calendar-system aware dates and times, and resolution of parsed fields.
//!
//! Dates are always tied to a [`Chronology`]. ISO, Minguo and Thai Buddhist
//! calendars are built in and others can be added through [`CalendarSystem`].
//! [`Parsed`] turns a set of field values, as produced by a parser, into a
//! date, a time and possibly an instant.

pub use chrono::{
    CalendarSystem, ChronoLocalDate, ChronoLocalDateTime, ChronoZonedDateTime, Chronology, Era,
    MinguoChronology, ResolverStyle, ThaiBuddhistChronology,
};
pub use error::{DateTimeError, Result};
pub use field::{
    ChronoField, ChronoUnit, CustomField, FieldValues, ResolveContext, Resolved, TemporalField,
    ValueRange,
};
pub use instant::{Clock, Instant};
pub use iso::{IsoChronology, LocalTime};
pub use parsed::{Parsed, MAX_RESOLVE_ROUNDS};
pub use period::ChronoPeriod;
pub use temporal::{DayOfWeek, TemporalAccessor, TemporalAdjuster};
pub use zone::{OffsetInfo, TransitionRules, ZoneId, ZoneOffset, ZoneOffsetTransition, ZoneRules};

pub mod chrono;
mod div_rem;
mod error;
pub mod field;
mod gregorian_normalized_date;
mod instant;
pub mod iso;
mod parsed;
mod period;
pub mod temporal;
pub mod zone;
