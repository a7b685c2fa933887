use crate::error::{DateTimeError, Result};
use crate::field::TemporalField;

/// Field values collected for resolution, kept in insertion order.
///
/// Resolution walks this store several times and must see the same order on
/// every pass, so it is a plain vector rather than a hash map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    entries: Vec<(TemporalField, i64)>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value. Adding the value a field already holds does nothing;
    /// adding a different one is a conflict.
    pub fn insert(&mut self, field: impl Into<TemporalField>, value: i64) -> Result<()> {
        let field = field.into();
        match self.position(&field) {
            Some(index) => {
                let old = self.entries[index].1;
                if old != value {
                    return Err(DateTimeError::FieldConflict {
                        field: field.to_string(),
                        old,
                        new: value,
                    });
                }
                Ok(())
            }
            None => {
                self.entries.push((field, value));
                Ok(())
            }
        }
    }

    pub fn remove(&mut self, field: impl Into<TemporalField>) -> Option<i64> {
        let field = field.into();
        let index = self.position(&field)?;
        Some(self.entries.remove(index).1)
    }

    /// Drops every field not on the allow-list.
    pub fn retain_only(&mut self, allowed: &[TemporalField]) {
        self.entries.retain(|(field, _)| allowed.contains(field));
    }

    pub fn get(&self, field: impl Into<TemporalField>) -> Option<i64> {
        let field = field.into();
        self.position(&field).map(|index| self.entries[index].1)
    }

    pub fn contains(&self, field: impl Into<TemporalField>) -> bool {
        let field = field.into();
        self.position(&field).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TemporalField, i64)> {
        self.entries.iter().map(|(field, value)| (field, *value))
    }

    /// Snapshot of the extension fields still waiting to be resolved.
    pub fn custom_fields(&self) -> Vec<TemporalField> {
        self.entries
            .iter()
            .filter(|(field, _)| field.is_custom())
            .map(|(field, _)| field.clone())
            .collect()
    }

    /// Overwrites without a conflict check. Only the defaulting steps of
    /// resolution are allowed to do this.
    pub(crate) fn replace(&mut self, field: impl Into<TemporalField>, value: i64) {
        let field = field.into();
        match self.position(&field) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((field, value)),
        }
    }

    fn position(&self, field: &TemporalField) -> Option<usize> {
        self.entries.iter().position(|(f, _)| f == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ChronoField;

    #[test]
    fn insert_same_value_is_noop() {
        let mut values = FieldValues::new();
        values.insert(ChronoField::Year, 2023).unwrap();
        values.insert(ChronoField::Year, 2023).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values.get(ChronoField::Year), Some(2023));
    }

    #[test]
    fn insert_different_value_conflicts() {
        let mut values = FieldValues::new();
        values.insert(ChronoField::Year, 2023).unwrap();
        let err = values.insert(ChronoField::Year, 2024).unwrap_err();
        assert_eq!(
            err,
            DateTimeError::FieldConflict {
                field: "Year".to_string(),
                old: 2023,
                new: 2024
            }
        );
        assert_eq!(
            err.to_string(),
            "Conflict found: Year 2023 differs from Year 2024"
        );
        assert!(err.is_conflict());
        assert_eq!(values.get(ChronoField::Year), Some(2023));
    }

    #[test]
    fn keeps_insertion_order() {
        let mut values = FieldValues::new();
        values.insert(ChronoField::DayOfMonth, 15).unwrap();
        values.insert(ChronoField::Year, 2023).unwrap();
        values.insert(ChronoField::MonthOfYear, 1).unwrap();
        values.remove(ChronoField::Year);
        values.insert(ChronoField::Year, 2022).unwrap();
        let order: Vec<_> = values.iter().map(|(f, v)| (f.to_string(), v)).collect();
        assert_eq!(
            order,
            vec![
                ("DayOfMonth".to_string(), 15),
                ("MonthOfYear".to_string(), 1),
                ("Year".to_string(), 2022)
            ]
        );
    }

    #[test]
    fn remove_returns_value() {
        let mut values = FieldValues::new();
        values.insert(ChronoField::Era, 1).unwrap();
        assert_eq!(values.remove(ChronoField::Era), Some(1));
        assert_eq!(values.remove(ChronoField::Era), None);
        assert!(values.is_empty());
    }

    #[test]
    fn retain_only_filters() {
        let mut values = FieldValues::new();
        values.insert(ChronoField::Year, 2023).unwrap();
        values.insert(ChronoField::MonthOfYear, 4).unwrap();
        values.insert(ChronoField::HourOfDay, 13).unwrap();
        values.retain_only(&[ChronoField::Year.into(), ChronoField::HourOfDay.into()]);
        assert_eq!(values.len(), 2);
        assert!(!values.contains(ChronoField::MonthOfYear));
    }

    #[test]
    fn replace_overwrites() {
        let mut values = FieldValues::new();
        values.insert(ChronoField::NanoOfSecond, 5).unwrap();
        values.replace(ChronoField::NanoOfSecond, 7);
        values.replace(ChronoField::MilliOfSecond, 0);
        assert_eq!(values.get(ChronoField::NanoOfSecond), Some(7));
        assert_eq!(values.len(), 2);
        assert!(values.custom_fields().is_empty());
    }
}
