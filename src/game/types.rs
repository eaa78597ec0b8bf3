use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const SNAPSHOT_SCHEMA_VERSION: u8 = 1;

/// Slot that loses durability when the player lands a blow.
pub const WEAPON_SLOT: &str = "weapon";

/// Item name that opens locations flagged `requires_keycard`.
pub const KEYCARD_ITEM: &str = "Keycard";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Weapon,
    Armor,
    Consumable,
    Quest,
    Cybernetic,
}

/// Character-level combat policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CombatStyle {
    /// Own damage ×1.2
    Aggressive,
    /// Own defense ×1.2 while being attacked
    Defensive,
    /// Chance to stun the defender on each attack
    Technical,
}

impl Default for CombatStyle {
    fn default() -> Self {
        Self::Aggressive
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub strength: i32,
    pub agility: i32,
    pub intelligence: i32,
    pub tech_aptitude: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            strength: 10,
            agility: 10,
            intelligence: 10,
            tech_aptitude: 10,
        }
    }
}

impl Stats {
    pub fn new(strength: i32, agility: i32, intelligence: i32, tech_aptitude: i32) -> Self {
        Self {
            strength,
            agility,
            intelligence,
            tech_aptitude,
        }
    }
}

/// `at + secs`, or `None` when the result falls outside chrono's range.
pub fn offset_secs(at: DateTime<Utc>, secs: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(secs).and_then(|delta| at.checked_add_signed(delta))
}

/// A timed modifier. Live while `now - started_at < duration_secs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusEffect {
    pub name: String,
    pub duration_secs: i64,
    /// Stat name -> delta
    #[serde(default)]
    pub modifiers: BTreeMap<String, i32>,
    pub started_at: DateTime<Utc>,
}

impl StatusEffect {
    pub fn new(name: &str, duration_secs: i64, started_at: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            duration_secs,
            modifiers: BTreeMap::new(),
            started_at,
        }
    }

    pub fn with_modifier(mut self, stat: &str, delta: i32) -> Self {
        self.modifiers.insert(stat.to_string(), delta);
        self
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        offset_secs(self.started_at, self.duration_secs).unwrap_or(if self.duration_secs < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub item_type: ItemType,
    #[serde(default = "default_rarity")]
    pub rarity: u8,
    #[serde(default)]
    pub level_req: u32,
    /// Effect name -> magnitude (`health`, `energy`, stat names, `damage`, `defense`, `duration`)
    #[serde(default)]
    pub effects: BTreeMap<String, i32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub value: u32,
    #[serde(default)]
    pub durability: Option<u32>,
}

fn default_rarity() -> u8 {
    1
}

impl Item {
    pub fn new(name: &str, item_type: ItemType) -> Self {
        Self {
            name: name.to_string(),
            item_type,
            rarity: 1,
            level_req: 0,
            effects: BTreeMap::new(),
            description: String::new(),
            value: 0,
            durability: None,
        }
    }

    pub fn with_rarity(mut self, rarity: u8) -> Self {
        self.rarity = rarity.clamp(1, 5);
        self
    }

    pub fn with_level_req(mut self, level_req: u32) -> Self {
        self.level_req = level_req;
        self
    }

    pub fn with_effect(mut self, effect: &str, magnitude: i32) -> Self {
        self.effects.insert(effect.to_string(), magnitude);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    pub fn with_durability(mut self, durability: u32) -> Self {
        self.durability = Some(durability);
        self
    }

    pub fn effect(&self, name: &str) -> i32 {
        self.effects.get(name).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Character {
    pub name: String,
    pub level: u32,
    pub stats: Stats,
    pub health: i32,
    pub max_health: i32,
    pub energy: i32,
    pub max_energy: i32,
    pub experience: u32,
    pub credits: u32,
    /// Ordered, duplicates allowed
    #[serde(default)]
    pub inventory: Vec<Item>,
    /// Slot name -> item
    #[serde(default)]
    pub equipped: BTreeMap<String, Item>,
    #[serde(default)]
    pub status_effects: Vec<StatusEffect>,
    #[serde(default)]
    pub combat_style: CombatStyle,
    #[serde(default)]
    pub cybernetics: Vec<Item>,
    /// Faction -> standing
    #[serde(default)]
    pub reputation: BTreeMap<String, i32>,
}

impl Character {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: 1,
            stats: Stats::default(),
            health: 100,
            max_health: 100,
            energy: 50,
            max_energy: 50,
            experience: 0,
            credits: 0,
            inventory: Vec::new(),
            equipped: BTreeMap::new(),
            status_effects: Vec::new(),
            combat_style: CombatStyle::default(),
            cybernetics: Vec::new(),
            reputation: BTreeMap::new(),
        }
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_style(mut self, style: CombatStyle) -> Self {
        self.combat_style = style;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self
    }

    pub fn with_credits(mut self, credits: u32) -> Self {
        self.credits = credits;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Shift health by `delta`, clamped to `0..=max_health`. Returns the applied change.
    pub fn adjust_health(&mut self, delta: i32) -> i32 {
        let before = self.health;
        self.health = (self.health.saturating_add(delta)).clamp(0, self.max_health);
        self.health - before
    }

    /// Shift energy by `delta`, clamped to `0..=max_energy`. Returns the applied change.
    pub fn adjust_energy(&mut self, delta: i32) -> i32 {
        let before = self.energy;
        self.energy = (self.energy.saturating_add(delta)).clamp(0, self.max_energy);
        self.energy - before
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.inventory.iter().any(|item| item.name.eq_ignore_ascii_case(name))
    }

    pub fn item_count(&self, name: &str) -> usize {
        self.inventory
            .iter()
            .filter(|item| item.name.eq_ignore_ascii_case(name))
            .count()
    }
}

/// What an objective listens for when progress is recorded from game events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveTrigger {
    Defeat { enemy: String },
    Collect { item: String },
    Visit { location: String },
}

impl ObjectiveTrigger {
    pub fn matches(&self, other: &ObjectiveTrigger) -> bool {
        match (self, other) {
            (Self::Defeat { enemy: a }, Self::Defeat { enemy: b }) => a.eq_ignore_ascii_case(b),
            (Self::Collect { item: a }, Self::Collect { item: b }) => a.eq_ignore_ascii_case(b),
            (Self::Visit { location: a }, Self::Visit { location: b }) => {
                a.eq_ignore_ascii_case(b)
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestObjective {
    pub description: String,
    pub target_amount: u32,
    #[serde(default)]
    pub current_amount: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub trigger: Option<ObjectiveTrigger>,
}

impl QuestObjective {
    pub fn new(description: &str, target_amount: u32) -> Self {
        Self {
            description: description.to_string(),
            target_amount,
            current_amount: 0,
            completed: target_amount == 0,
            trigger: None,
        }
    }

    pub fn with_trigger(mut self, trigger: ObjectiveTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn is_complete(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Clamp-add progress. Never exceeds the target and never decreases.
    pub fn add_progress(&mut self, amount: u32) {
        self.current_amount = self
            .current_amount
            .saturating_add(amount)
            .min(self.target_amount);
        self.completed = self.is_complete();
    }
}

/// Quest lifecycle. Completed and Failed are terminal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestState {
    NotStarted,
    InProgress { started_at: DateTime<Utc> },
    Completed { completed_at: DateTime<Utc> },
    Failed { failed_at: DateTime<Utc> },
}

impl Default for QuestState {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Resource name -> amount. Keys: `credits`, `experience`, `rep:<faction>`, or an item name.
pub type Rewards = BTreeMap<String, i64>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub level_req: u32,
    pub objectives: Vec<QuestObjective>,
    #[serde(default)]
    pub rewards: Rewards,
    #[serde(default)]
    pub state: QuestState,
    /// Seconds from acceptance until the quest fails
    #[serde(default)]
    pub time_limit_secs: Option<i64>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

impl Quest {
    pub fn new(name: &str, description: &str, level_req: u32) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            level_req,
            objectives: Vec::new(),
            rewards: Rewards::new(),
            state: QuestState::NotStarted,
            time_limit_secs: None,
            deadline: None,
        }
    }

    pub fn with_objective(mut self, objective: QuestObjective) -> Self {
        self.objectives.push(objective);
        self
    }

    pub fn with_reward(mut self, resource: &str, amount: i64) -> Self {
        self.rewards.insert(resource.to_string(), amount);
        self
    }

    pub fn with_time_limit(mut self, secs: i64) -> Self {
        self.time_limit_secs = Some(secs);
        self
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self.state, QuestState::InProgress { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            QuestState::Completed { .. } | QuestState::Failed { .. }
        )
    }

    pub fn all_objectives_complete(&self) -> bool {
        !self.objectives.is_empty() && self.objectives.iter().all(|obj| obj.is_complete())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Directed edges: each entry is reachable from here, not necessarily back.
    #[serde(default)]
    pub connected_locations: BTreeSet<String>,
    #[serde(default)]
    pub npcs: Vec<String>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub danger_level: u8,
    #[serde(default)]
    pub requires_keycard: bool,
    #[serde(default)]
    pub shop: bool,
}

impl Location {
    pub fn new(name: &str, description: &str, danger_level: u8) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            connected_locations: BTreeSet::new(),
            npcs: Vec::new(),
            items: Vec::new(),
            danger_level,
            requires_keycard: false,
            shop: false,
        }
    }

    pub fn with_exit(mut self, target: &str) -> Self {
        self.connected_locations.insert(target.to_string());
        self
    }

    pub fn with_npc(mut self, npc: &str) -> Self {
        self.npcs.push(npc.to_string());
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_keycard_lock(mut self) -> Self {
        self.requires_keycard = true;
        self
    }

    pub fn with_shop(mut self) -> Self {
        self.shop = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnemyTemplate {
    pub name: String,
    #[serde(default = "default_enemy_level")]
    pub level: u32,
    #[serde(default)]
    pub stats: Stats,
    pub max_health: i32,
    #[serde(default)]
    pub combat_style: CombatStyle,
    /// Lowest location danger level this enemy appears at
    #[serde(default)]
    pub min_danger: u8,
}

fn default_enemy_level() -> u32 {
    1
}

impl EnemyTemplate {
    pub fn new(name: &str, level: u32, stats: Stats, max_health: i32) -> Self {
        Self {
            name: name.to_string(),
            level,
            stats,
            max_health,
            combat_style: CombatStyle::default(),
            min_danger: 0,
        }
    }

    pub fn with_style(mut self, style: CombatStyle) -> Self {
        self.combat_style = style;
        self
    }

    pub fn with_min_danger(mut self, min_danger: u8) -> Self {
        self.min_danger = min_danger;
        self
    }
}

/// Combat opponent: a Character without inventory, equipment or economy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Enemy {
    pub name: String,
    pub level: u32,
    pub stats: Stats,
    pub health: i32,
    pub max_health: i32,
    pub combat_style: CombatStyle,
    #[serde(default)]
    pub status_effects: Vec<StatusEffect>,
}

impl Enemy {
    pub fn from_template(template: &EnemyTemplate) -> Self {
        Self {
            name: template.name.clone(),
            level: template.level,
            stats: template.stats,
            health: template.max_health,
            max_health: template.max_health,
            combat_style: template.combat_style,
            status_effects: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipe {
    pub name: String,
    /// Item name -> count consumed
    pub ingredients: BTreeMap<String, u32>,
    /// Item template name produced
    pub output: String,
    #[serde(default)]
    pub energy_cost: i32,
}

impl Recipe {
    pub fn new(name: &str, output: &str, energy_cost: i32) -> Self {
        Self {
            name: name.to_string(),
            ingredients: BTreeMap::new(),
            output: output.to_string(),
            energy_cost,
        }
    }

    pub fn with_ingredient(mut self, item: &str, count: u32) -> Self {
        self.ingredients.insert(item.to_string(), count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn health_and_energy_stay_in_bounds() {
        let mut c = Character::new("Vex");
        assert_eq!(c.adjust_health(-250), -100);
        assert_eq!(c.health, 0);
        assert!(!c.is_alive());
        assert_eq!(c.adjust_health(500), 100);
        assert_eq!(c.health, c.max_health);

        c.adjust_energy(-10);
        assert_eq!(c.energy, 40);
        c.adjust_energy(1000);
        assert_eq!(c.energy, c.max_energy);
    }

    #[test]
    fn objective_progress_is_clamped() {
        let mut obj = QuestObjective::new("Scrap drones", 3);
        obj.add_progress(2);
        assert!(!obj.completed);
        obj.add_progress(5);
        assert_eq!(obj.current_amount, 3);
        assert!(obj.completed);
    }

    #[test]
    fn effect_liveness_boundary() {
        let start = Utc.with_ymd_and_hms(2077, 1, 1, 0, 0, 0).unwrap();
        let effect = StatusEffect::new("Stunned", 2, start).with_modifier("agility", -2);
        assert!(effect.is_live(start + Duration::seconds(1)));
        assert!(!effect.is_live(start + Duration::seconds(2)));
        assert_eq!(effect.expires_at(), start + Duration::seconds(2));
    }

    #[test]
    fn huge_effect_duration_never_expires() {
        let start = Utc.with_ymd_and_hms(2077, 1, 1, 0, 0, 0).unwrap();
        let effect = StatusEffect::new("Forever", i64::MAX, start);
        assert_eq!(effect.expires_at(), DateTime::<Utc>::MAX_UTC);
        assert!(effect.is_live(start + Duration::days(365 * 1000)));
        assert_eq!(offset_secs(start, i64::MAX), None);
        assert_eq!(offset_secs(start, 5), Some(start + Duration::seconds(5)));
    }

    #[test]
    fn rarity_is_clamped() {
        assert_eq!(Item::new("Relic", ItemType::Quest).with_rarity(9).rarity, 5);
        assert_eq!(Item::new("Rock", ItemType::Quest).with_rarity(0).rarity, 1);
    }

    #[test]
    fn item_deserializes_with_defaults() {
        let json = r#"{"name":"Stim","item_type":"consumable","effects":{"health":20}}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.rarity, 1);
        assert_eq!(item.effect("health"), 20);
        assert_eq!(item.durability, None);
    }
}
