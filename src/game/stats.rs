//! Stat model: the ability-bonus formula and effective (modified) stats.
//!
//! Bonuses are derived on every call from the current stats, equipment,
//! cybernetics and status effects. Nothing here is cached.

use super::types::{Character, Enemy, Item, StatusEffect, Stats};

pub const STAT_NAMES: [&str; 4] = ["strength", "agility", "intelligence", "tech_aptitude"];

/// `floor((value - 10) / 2)`, rounding toward negative infinity (9 -> -1).
pub fn calculate_bonus(value: i32) -> i32 {
    (value - 10).div_euclid(2)
}

impl Stats {
    pub fn get(&self, stat: &str) -> Option<i32> {
        match stat {
            "strength" => Some(self.strength),
            "agility" => Some(self.agility),
            "intelligence" => Some(self.intelligence),
            "tech_aptitude" => Some(self.tech_aptitude),
            _ => None,
        }
    }

    /// Add `delta` to the named stat. Unknown names are ignored and return false.
    pub fn add(&mut self, stat: &str, delta: i32) -> bool {
        let slot = match stat {
            "strength" => &mut self.strength,
            "agility" => &mut self.agility,
            "intelligence" => &mut self.intelligence,
            "tech_aptitude" => &mut self.tech_aptitude,
            _ => return false,
        };
        *slot = slot.saturating_add(delta);
        true
    }

    pub fn damage_bonus(&self) -> i32 {
        calculate_bonus(self.strength)
    }

    pub fn defense_bonus(&self) -> i32 {
        calculate_bonus(self.agility)
    }

    fn apply_modifiers<'a>(&mut self, modifiers: impl IntoIterator<Item = (&'a String, &'a i32)>) {
        for (stat, delta) in modifiers {
            self.add(stat, *delta);
        }
    }
}

fn with_effects(base: Stats, effects: &[StatusEffect]) -> Stats {
    let mut stats = base;
    for effect in effects {
        stats.apply_modifiers(&effect.modifiers);
    }
    stats
}

fn gear<'a>(character: &'a Character) -> impl Iterator<Item = &'a Item> + 'a {
    character
        .equipped
        .values()
        .chain(character.cybernetics.iter())
}

impl Character {
    /// Base stats plus equipment, cybernetics and held status effects.
    ///
    /// Callers prune expired effects first; this reads the list as-is.
    pub fn effective_stats(&self) -> Stats {
        let mut stats = with_effects(self.stats, &self.status_effects);
        for item in gear(self) {
            stats.apply_modifiers(&item.effects);
        }
        stats
    }

    pub fn damage_bonus(&self) -> i32 {
        let flat: i32 = gear(self).map(|item| item.effect("damage")).sum();
        self.effective_stats().damage_bonus() + flat
    }

    pub fn defense_bonus(&self) -> i32 {
        let flat: i32 = gear(self).map(|item| item.effect("defense")).sum();
        self.effective_stats().defense_bonus() + flat
    }
}

impl Enemy {
    pub fn effective_stats(&self) -> Stats {
        with_effects(self.stats, &self.status_effects)
    }

    pub fn damage_bonus(&self) -> i32 {
        self.effective_stats().damage_bonus()
    }

    pub fn defense_bonus(&self) -> i32 {
        self.effective_stats().defense_bonus()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::ItemType;
    use chrono::Utc;

    #[test]
    fn bonus_matches_floor_formula() {
        for v in -20..=40 {
            let expected = ((v - 10) as f64 / 2.0).floor() as i32;
            assert_eq!(calculate_bonus(v), expected, "value {}", v);
        }
        assert_eq!(calculate_bonus(9), -1);
        assert_eq!(calculate_bonus(10), 0);
        assert_eq!(calculate_bonus(11), 0);
        assert_eq!(calculate_bonus(14), 2);
        assert_eq!(calculate_bonus(8), -1);
        assert_eq!(calculate_bonus(7), -2);
    }

    #[test]
    fn bonuses_follow_status_effects() {
        let mut c = Character::new("Rook").with_stats(Stats::new(14, 12, 10, 10));
        assert_eq!(c.damage_bonus(), 2);
        assert_eq!(c.defense_bonus(), 1);

        c.status_effects
            .push(StatusEffect::new("Stunned", 2, Utc::now()).with_modifier("agility", -2));
        assert_eq!(c.effective_stats().agility, 10);
        assert_eq!(c.defense_bonus(), 0);

        c.status_effects.clear();
        assert_eq!(c.defense_bonus(), 1);
    }

    #[test]
    fn gear_contributes_stats_and_flat_bonuses() {
        let mut c = Character::new("Rook");
        c.equipped.insert(
            "weapon".into(),
            Item::new("Mono Blade", ItemType::Weapon).with_effect("damage", 3),
        );
        c.cybernetics.push(
            Item::new("Reflex Booster", ItemType::Cybernetic).with_effect("agility", 4),
        );
        assert_eq!(c.damage_bonus(), 3);
        assert_eq!(c.effective_stats().agility, 14);
        assert_eq!(c.defense_bonus(), 2);
    }

    #[test]
    fn unknown_stat_names_are_ignored() {
        let mut stats = Stats::default();
        assert!(!stats.add("charisma", 5));
        assert_eq!(stats, Stats::default());
        assert_eq!(stats.get("tech_aptitude"), Some(10));
        assert_eq!(stats.get("luck"), None);
    }
}
