use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use lazy_static::lazy_static;
use tracing::{debug, warn};
use zoneinfo_compiled::{parse, TZData};

use crate::error::{DateTimeError, Result};
use crate::zone::{TransitionRules, ZoneOffset, ZoneOffsetTransition};

// Only the 32-bit transition table is read. Zones whose rules continue past
// 2037 through the POSIX TZ footer keep their last offset from then on.

fn tzdir() -> PathBuf {
    // Same lookup as the C library: TZDIR, or the usual system location.
    std::env::var("TZDIR")
        .unwrap_or_else(|_| "/usr/share/zoneinfo".to_string())
        .into()
}

lazy_static! {
    static ref RULES: Mutex<HashMap<String, Arc<TransitionRules>>> = Mutex::new(HashMap::new());
}

/// Rules for a tz database id such as `Europe/Paris`, cached after the first
/// load.
pub(super) fn load_rules(id: &str) -> Result<Arc<TransitionRules>> {
    // A failed load never leaves a partial entry behind, so poisoning is ignored.
    let mut cache = RULES.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(rules) = cache.get(id) {
        return Ok(rules.clone());
    }
    let rules = Arc::new(read_rules(id, &tzdir())?);
    cache.insert(id.to_string(), rules.clone());
    Ok(rules)
}

fn read_rules(id: &str, dir: &Path) -> Result<TransitionRules> {
    let relative = Path::new(id);
    let is_plain = !id.is_empty()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if !is_plain {
        return Err(DateTimeError::UnknownZone(id.to_string()));
    }
    let path = dir.join(relative);
    let data = std::fs::read(&path).map_err(|_| DateTimeError::UnknownZone(id.to_string()))?;
    let tz = parse(data).map_err(|err| DateTimeError::ZoneRules {
        zone: id.to_string(),
        reason: format!("{:?}", err),
    })?;
    let rules = transition_rules(id, &tz)?;
    debug!(
        zone = id,
        path = %path.display(),
        transitions = rules.transitions().len(),
        "loaded zone rules"
    );
    Ok(rules)
}

fn transition_rules(id: &str, tz: &TZData) -> Result<TransitionRules> {
    let to_offset = |seconds: i64| {
        ZoneOffset::of_total_seconds(seconds).map_err(|err| DateTimeError::ZoneRules {
            zone: id.to_string(),
            reason: err.to_string(),
        })
    };
    let first = match tz.transitions.first() {
        Some(first) => first,
        None => {
            warn!(zone = id, "zone file has no transitions, using UTC");
            return Ok(TransitionRules::fixed(ZoneOffset::UTC));
        }
    };
    let initial = to_offset(first.local_time_type.offset as i64)?;
    let mut current = initial;
    let mut transitions = Vec::with_capacity(tz.transitions.len());
    for transition in tz.transitions.iter().skip(1) {
        let offset = to_offset(transition.local_time_type.offset as i64)?;
        // Changes of abbreviation or DST flag alone do not move the clock.
        if offset == current {
            continue;
        }
        transitions.push(ZoneOffsetTransition::new(
            transition.timestamp as i64,
            current,
            offset,
        ));
        current = offset;
    }
    TransitionRules::new(initial, transitions).map_err(|err| DateTimeError::ZoneRules {
        zone: id.to_string(),
        reason: err.to_string(),
    })
}
