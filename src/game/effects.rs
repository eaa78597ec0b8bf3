//! Status effect tracker.
//!
//! Effects expire lazily: nothing removes them until a caller prunes with the
//! current time. Reapplying an effect with the same name stacks; each copy keeps
//! its own start time and expires on its own.

use super::types::{Character, Enemy, StatusEffect};
use chrono::{DateTime, Utc};
use log::debug;

/// Append `effect` unconditionally.
pub fn apply_effect(effects: &mut Vec<StatusEffect>, effect: StatusEffect) {
    effects.push(effect);
}

/// Remove every effect with `now - start >= duration`. Returns the removed effects.
pub fn prune_expired(effects: &mut Vec<StatusEffect>, now: DateTime<Utc>) -> Vec<StatusEffect> {
    let (live, expired): (Vec<_>, Vec<_>) = effects.drain(..).partition(|e| e.is_live(now));
    *effects = live;
    expired
}

/// Effects live at `now`, without mutating the list.
pub fn active_effects(effects: &[StatusEffect], now: DateTime<Utc>) -> Vec<&StatusEffect> {
    effects.iter().filter(|e| e.is_live(now)).collect()
}

/// Compact "Name (Ns)" listing of live effects for status output.
pub fn format_effects(effects: &[StatusEffect], now: DateTime<Utc>) -> String {
    let live = active_effects(effects, now);
    if live.is_empty() {
        return "none".to_string();
    }
    live.iter()
        .map(|e| {
            let left = (e.expires_at() - now).num_seconds().max(0);
            format!("{} ({}s)", e.name, left)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl Character {
    pub fn apply_effect(&mut self, effect: StatusEffect) {
        debug!("{} gains effect {}", self.name, effect.name);
        apply_effect(&mut self.status_effects, effect);
    }

    pub fn prune_effects(&mut self, now: DateTime<Utc>) -> Vec<StatusEffect> {
        let expired = prune_expired(&mut self.status_effects, now);
        for e in &expired {
            debug!("{}: effect {} expired", self.name, e.name);
        }
        expired
    }
}

impl Enemy {
    pub fn apply_effect(&mut self, effect: StatusEffect) {
        apply_effect(&mut self.status_effects, effect);
    }

    pub fn prune_effects(&mut self, now: DateTime<Utc>) -> Vec<StatusEffect> {
        prune_expired(&mut self.status_effects, now)
    }
}
