use thiserror::Error;

use crate::field::ValueRange;

/// Every failure the calendar core can report.
///
/// Resolution is all-or-nothing: the first error raised aborts the whole
/// attempt and is returned to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateTimeError {
    #[error("Invalid value for {field} (valid values {range}): {value}")]
    Range {
        field: String,
        range: ValueRange,
        value: i64,
    },

    #[error("Invalid era {value} for chronology {chronology}")]
    InvalidEra { value: String, chronology: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Conflict found: {field} {old} differs from {field} {new}")]
    FieldConflict { field: String, old: i64, new: i64 },

    #[error("Conflict found: Field {field} {resolved} differs from {field} {parsed} derived from {target}")]
    CrossCheck {
        field: String,
        resolved: i64,
        parsed: i64,
        target: String,
    },

    #[error("Conflict found: {0}")]
    Conflict(String),

    #[error("Strict mode rejected resolved date as it is in a different {0}")]
    StrictDrift(&'static str),

    #[error("Chronology mismatch, expected: {expected}, actual: {actual}")]
    ChronologyMismatch { expected: String, actual: String },

    #[error("Custom field resolution did not converge within {rounds} rounds")]
    NonConvergence { rounds: usize },

    #[error("Unsupported field: {0}")]
    UnsupportedField(String),

    #[error("Unsupported unit: {0}")]
    UnsupportedUnit(String),

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Invalid value range: {0}")]
    InvalidRange(String),

    #[error("Unknown chronology: {0}")]
    UnknownChronology(String),

    #[error("Unknown time-zone: {0}")]
    UnknownZone(String),

    #[error("Unable to use rules for zone {zone}: {reason}")]
    ZoneRules { zone: String, reason: String },
}

impl DateTimeError {
    /// True for the errors raised when two sources disagree about a value.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DateTimeError::FieldConflict { .. }
                | DateTimeError::CrossCheck { .. }
                | DateTimeError::Conflict(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DateTimeError>;
