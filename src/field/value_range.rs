use std::fmt;

use crate::error::{DateTimeError, Result};

/// The range of valid values for a field.
///
/// The minimum and maximum may each vary, for instance the maximum day-of-month
/// is 28 in some months and 31 in others. Both ends are therefore described by a
/// smallest and a largest value. A range where both ends are constant is "fixed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueRange {
    min_smallest: i64,
    min_largest: i64,
    max_smallest: i64,
    max_largest: i64,
}

impl ValueRange {
    /// Fixed range for static tables. The bounds are not checked.
    pub const fn fixed(min: i64, max: i64) -> Self {
        ValueRange {
            min_smallest: min,
            min_largest: min,
            max_smallest: max,
            max_largest: max,
        }
    }

    /// Range with a variable maximum for static tables. The bounds are not checked.
    pub const fn variable(min: i64, max_smallest: i64, max_largest: i64) -> Self {
        ValueRange {
            min_smallest: min,
            min_largest: min,
            max_smallest,
            max_largest,
        }
    }

    pub fn of(min: i64, max: i64) -> Result<Self> {
        Self::of_full(min, min, max, max)
    }

    pub fn of_variable(min: i64, max_smallest: i64, max_largest: i64) -> Result<Self> {
        Self::of_full(min, min, max_smallest, max_largest)
    }

    pub fn of_full(
        min_smallest: i64,
        min_largest: i64,
        max_smallest: i64,
        max_largest: i64,
    ) -> Result<Self> {
        if min_smallest > min_largest {
            return Err(DateTimeError::InvalidRange(
                "Smallest minimum value must be less than largest minimum value".to_string(),
            ));
        }
        if max_smallest > max_largest {
            return Err(DateTimeError::InvalidRange(
                "Smallest maximum value must be less than largest maximum value".to_string(),
            ));
        }
        if min_largest > max_largest {
            return Err(DateTimeError::InvalidRange(
                "Minimum value must be less than maximum value".to_string(),
            ));
        }
        if min_smallest > max_smallest {
            return Err(DateTimeError::InvalidRange(
                "Minimum value must be less than smallest maximum value".to_string(),
            ));
        }
        Ok(ValueRange {
            min_smallest,
            min_largest,
            max_smallest,
            max_largest,
        })
    }

    pub fn minimum(&self) -> i64 {
        self.min_smallest
    }

    pub fn largest_minimum(&self) -> i64 {
        self.min_largest
    }

    pub fn smallest_maximum(&self) -> i64 {
        self.max_smallest
    }

    pub fn maximum(&self) -> i64 {
        self.max_largest
    }

    pub fn is_fixed(&self) -> bool {
        self.min_smallest == self.min_largest && self.max_smallest == self.max_largest
    }

    /// True if every value in the range fits in an `i32`.
    pub fn is_int_value(&self) -> bool {
        self.minimum() >= i32::MIN as i64 && self.maximum() <= i32::MAX as i64
    }

    pub fn is_valid_value(&self, value: i64) -> bool {
        value >= self.minimum() && value <= self.maximum()
    }

    pub fn is_valid_int_value(&self, value: i64) -> bool {
        self.is_int_value() && self.is_valid_value(value)
    }

    pub fn check_valid_value(&self, value: i64, field: impl fmt::Display) -> Result<i64> {
        if !self.is_valid_value(value) {
            return Err(self.range_error(value, field));
        }
        Ok(value)
    }

    pub fn check_valid_int_value(&self, value: i64, field: impl fmt::Display) -> Result<i32> {
        if !self.is_valid_int_value(value) {
            return Err(self.range_error(value, field));
        }
        Ok(value as i32)
    }

    fn range_error(&self, value: i64, field: impl fmt::Display) -> DateTimeError {
        DateTimeError::Range {
            field: field.to_string(),
            range: *self,
            value,
        }
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.min_smallest)?;
        if self.min_smallest != self.min_largest {
            write!(f, "/{}", self.min_largest)?;
        }
        write!(f, " - {}", self.max_smallest)?;
        if self.max_smallest != self.max_largest {
            write!(f, "/{}", self.max_largest)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_and_variable() {
        let range = ValueRange::of(1, 12).unwrap();
        assert!(range.is_fixed());
        assert_eq!(range, ValueRange::fixed(1, 12));

        let range = ValueRange::of_variable(1, 28, 31).unwrap();
        assert!(!range.is_fixed());
        assert_eq!(range.minimum(), 1);
        assert_eq!(range.smallest_maximum(), 28);
        assert_eq!(range.maximum(), 31);
        assert_eq!(range.to_string(), "1 - 28/31");
    }

    #[test]
    fn rejects_inverted_bounds() {
        assert!(matches!(
            ValueRange::of(5, 1),
            Err(DateTimeError::InvalidRange(_))
        ));
        assert!(matches!(
            ValueRange::of_variable(1, 31, 28),
            Err(DateTimeError::InvalidRange(_))
        ));
        assert!(matches!(
            ValueRange::of_full(3, 2, 5, 6),
            Err(DateTimeError::InvalidRange(_))
        ));
    }

    #[test]
    fn check_valid_value_names_the_field() {
        let range = ValueRange::fixed(1, 12);
        assert_eq!(range.check_valid_value(12, "MonthOfYear"), Ok(12));
        let err = range.check_valid_value(13, "MonthOfYear").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for MonthOfYear (valid values 1 - 12): 13"
        );
    }

    #[test]
    fn int_value_checks() {
        let wide = ValueRange::fixed(i64::MIN, i64::MAX);
        assert!(!wide.is_int_value());
        assert!(wide.is_valid_value(5));
        assert!(!wide.is_valid_int_value(5));
        assert!(wide.check_valid_int_value(5, "InstantSeconds").is_err());

        let narrow = ValueRange::fixed(0, 59);
        assert_eq!(narrow.check_valid_int_value(42, "MinuteOfHour"), Ok(42));
    }
}
