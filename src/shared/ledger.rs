//! Global kill tally keyed by normalized entity id.

use bevy::prelude::*;
use std::collections::HashMap;

use super::observer::ObserverRegistry;

/// Delivered to ledger observers after every successful increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillNotice {
    pub entity_id: String,
    pub total: u32,
}

/// Trim + case-fold. "Slime", " slime ", "SLIME" → "slime".
pub fn normalize_entity_id(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Resource, Debug, Default)]
pub struct KillLedger {
    counts: HashMap<String, u32>,
    pub observers: ObserverRegistry<KillNotice>,
}

impl KillLedger {
    /// Adds `amount` kills and notifies observers. Returns the normalized id
    /// and new total, or `None` when the id is blank or `amount` is zero.
    pub fn register_kill(&mut self, entity_id: &str, amount: u32) -> Option<KillNotice> {
        let key = normalize_entity_id(entity_id);
        if key.is_empty() || amount == 0 {
            return None;
        }
        let total = self.counts.entry(key.clone()).or_insert(0);
        *total = total.saturating_add(amount);

        let notice = KillNotice {
            entity_id: key,
            total: *total,
        };
        self.observers.notify(&notice);
        Some(notice)
    }

    pub fn total(&self, entity_id: &str) -> u32 {
        self.counts
            .get(&normalize_entity_id(entity_id))
            .copied()
            .unwrap_or(0)
    }

    pub fn reset_enemy(&mut self, entity_id: &str) -> bool {
        self.counts.remove(&normalize_entity_id(entity_id)).is_some()
    }

    pub fn reset_all(&mut self) {
        self.counts.clear();
    }

    pub fn tracked_ids(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
