use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use lazy_static::lazy_static;
use tracing::{debug, warn};

use crate::chrono::{Chronology, MinguoChronology, ThaiBuddhistChronology};
use crate::error::{DateTimeError, Result};
use crate::iso::IsoChronology;

#[derive(Default)]
struct Registry {
    by_id: HashMap<String, Chronology>,
    by_type: HashMap<String, Chronology>,
}

impl Registry {
    fn with_builtins() -> Self {
        let mut registry = Registry::default();
        for chronology in [ISO.clone(), MINGUO.clone(), THAI_BUDDHIST.clone()] {
            registry.insert(chronology);
        }
        registry
    }

    /// First write wins, per id and per calendar type.
    fn insert(&mut self, chronology: Chronology) -> Chronology {
        if let Some(existing) = self.by_id.get(chronology.id()) {
            if !existing.same_instance(&chronology) {
                warn!(
                    id = chronology.id(),
                    "chronology already registered, keeping the existing one"
                );
            }
            return existing.clone();
        }
        if let Some(calendar_type) = chronology.calendar_type() {
            if self.by_type.contains_key(calendar_type) {
                warn!(
                    id = chronology.id(),
                    calendar_type, "calendar type already registered, keeping the existing one"
                );
            } else {
                self.by_type
                    .insert(calendar_type.to_string(), chronology.clone());
            }
        }
        debug!(id = chronology.id(), "registered chronology");
        self.by_id
            .insert(chronology.id().to_string(), chronology.clone());
        chronology
    }
}

lazy_static! {
    static ref ISO: Chronology = Chronology::new(IsoChronology);
    static ref MINGUO: Chronology = Chronology::new(MinguoChronology);
    static ref THAI_BUDDHIST: Chronology = Chronology::new(ThaiBuddhistChronology);
    static ref REGISTRY: RwLock<Registry> = RwLock::new(Registry::with_builtins());
}

pub(super) fn iso() -> Chronology {
    ISO.clone()
}

pub(super) fn minguo() -> Chronology {
    MINGUO.clone()
}

pub(super) fn thai_buddhist() -> Chronology {
    THAI_BUDDHIST.clone()
}

pub(super) fn register(chronology: Chronology) -> Chronology {
    // insert never leaves the maps half-updated, so poisoning is ignored.
    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    registry.insert(chronology)
}

pub(super) fn lookup(id: &str) -> Result<Chronology> {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    registry
        .by_id
        .get(id)
        .or_else(|| registry.by_type.get(id))
        .cloned()
        .ok_or_else(|| DateTimeError::UnknownChronology(id.to_string()))
}

pub(super) fn available() -> Vec<Chronology> {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    let mut chronologies: Vec<Chronology> = registry.by_id.values().cloned().collect();
    chronologies.sort();
    chronologies
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::chrono::{CalendarSystem, Era};
    use crate::iso::util;

    // An ISO-like calendar registered under a test-only id.
    struct Proleptic(&'static str);

    const PROLEPTIC_ERAS: [Era; 1] = [Era::new("TestProleptic", 1, "AD")];

    impl CalendarSystem for Proleptic {
        fn id(&self) -> &str {
            self.0
        }
        fn calendar_type(&self) -> Option<&str> {
            None
        }
        fn eras(&self) -> &[Era] {
            &PROLEPTIC_ERAS
        }
        fn proleptic_year(&self, _era: Era, year_of_era: i64) -> Result<i64> {
            Ok(year_of_era)
        }
        fn era_and_year_of_era(&self, proleptic_year: i64) -> (Era, i64) {
            (PROLEPTIC_ERAS[0], proleptic_year)
        }
        fn is_leap_year(&self, proleptic_year: i64) -> bool {
            util::is_leap_year(proleptic_year)
        }
        fn length_of_month(&self, proleptic_year: i64, month: u8) -> u8 {
            util::days_in_month(proleptic_year, month)
        }
        fn length_of_year(&self, proleptic_year: i64) -> u16 {
            util::length_of_year(proleptic_year)
        }
        fn check_date(&self, proleptic_year: i64, month: i64, day: i64) -> Result<(u8, u8)> {
            util::check_date(proleptic_year, month, day)
        }
        fn epoch_day_of(&self, proleptic_year: i64, month: u8, day: u8) -> i64 {
            util::epoch_day_of(proleptic_year, month, day)
        }
        fn ymd_of(&self, epoch_day: i64) -> (i64, u8, u8) {
            util::ymd_of(epoch_day)
        }
    }

    #[test]
    fn builtins_are_available() {
        let ids: Vec<String> = Chronology::available()
            .iter()
            .map(|c| c.id().to_string())
            .collect();
        assert!(ids.contains(&"ISO".to_string()));
        assert!(ids.contains(&"Minguo".to_string()));
        assert!(ids.contains(&"ThaiBuddhist".to_string()));
    }

    #[test]
    fn reregistering_builtin_keeps_original() {
        let winner = Chronology::register(Chronology::new(IsoChronology));
        assert!(winner.same_instance(&Chronology::iso()));
    }

    #[test]
    fn concurrent_registration_is_first_write_wins() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                thread::spawn(|| Chronology::register(Chronology::new(Proleptic("TestProleptic"))))
            })
            .collect();
        let winners: Vec<Chronology> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let first = winners[0].clone();
        for winner in &winners {
            assert!(winner.same_instance(&first));
        }
        let found = Chronology::of("TestProleptic").unwrap();
        assert!(found.same_instance(&first));
        assert_eq!(found.date(2023, 1, 15).unwrap().epoch_day(), 19372);
    }
}
