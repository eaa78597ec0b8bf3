//! Built-in template set.
//!
//! Used for any collection whose JSON file is absent from the template
//! directory. Also the content written by `wasteland templates`.
//!
//! The map:
//!
//! ```text
//! Rust Market (0, shop) <-> Scrap Yard (2)
//!       ^                      ^
//!       +---> Undercity (4) <--+
//!                  |
//!                  +--> Corp Vault (6, keycard) --> Undercity
//! ```

use super::types::{
    CombatStyle, EnemyTemplate, Item, ItemType, Location, ObjectiveTrigger, Quest,
    QuestObjective, Recipe, Stats, KEYCARD_ITEM,
};

pub const START_LOCATION: &str = "Rust Market";

pub fn default_items() -> Vec<Item> {
    vec![
        Item::new("Stim", ItemType::Consumable)
            .with_effect("health", 30)
            .with_value(25)
            .with_description("Auto-injector. Patches you up."),
        Item::new("Energy Cell", ItemType::Consumable)
            .with_effect("energy", 25)
            .with_value(20)
            .with_description("Hot-swappable power for your rig."),
        Item::new("Combat Stim", ItemType::Consumable)
            .with_effect("strength", 3)
            .with_effect("duration", 60)
            .with_rarity(2)
            .with_value(40)
            .with_description("A minute of borrowed muscle."),
        Item::new("Rusty Pipe", ItemType::Weapon)
            .with_effect("damage", 1)
            .with_durability(20)
            .with_value(15),
        Item::new("Pipe Rifle", ItemType::Weapon)
            .with_effect("damage", 2)
            .with_durability(25)
            .with_rarity(2)
            .with_value(60),
        Item::new("Mono Blade", ItemType::Weapon)
            .with_effect("damage", 3)
            .with_level_req(2)
            .with_durability(30)
            .with_rarity(3)
            .with_value(120),
        Item::new("Kevlar Vest", ItemType::Armor)
            .with_effect("defense", 2)
            .with_rarity(2)
            .with_value(80),
        Item::new("Reflex Booster", ItemType::Cybernetic)
            .with_effect("agility", 2)
            .with_level_req(3)
            .with_rarity(4)
            .with_value(200),
        Item::new("Scrap Metal", ItemType::Quest).with_value(5),
        Item::new("Circuit Board", ItemType::Quest).with_value(10),
        Item::new(KEYCARD_ITEM, ItemType::Quest)
            .with_rarity(3)
            .with_description("Corp security pass. Still warm."),
        Item::new("Data Shard", ItemType::Quest)
            .with_rarity(5)
            .with_description("Encrypted corp ledger."),
    ]
}

fn item(name: &str) -> Item {
    default_items()
        .into_iter()
        .find(|i| i.name == name)
        .unwrap_or_else(|| Item::new(name, ItemType::Quest))
}

pub fn default_locations() -> Vec<Location> {
    vec![
        Location::new(START_LOCATION, "Stalls of salvage under a patched tarp sky.", 0)
            .with_exit("Scrap Yard")
            .with_exit("Undercity")
            .with_npc("Old Mags")
            .with_shop(),
        Location::new("Scrap Yard", "Heaps of dead machines. Something skitters.", 2)
            .with_exit(START_LOCATION)
            .with_exit("Undercity")
            .with_item(item("Scrap Metal"))
            .with_item(item("Scrap Metal"))
            .with_item(item("Circuit Board")),
        Location::new("Undercity", "Flooded transit tunnels below the market.", 4)
            .with_exit(START_LOCATION)
            .with_exit("Scrap Yard")
            .with_exit("Corp Vault")
            .with_item(item(KEYCARD_ITEM)),
        Location::new("Corp Vault", "Humming servers behind a blast door.", 6)
            .with_exit("Undercity")
            .with_keycard_lock()
            .with_item(item("Data Shard")),
    ]
}

pub fn default_quests() -> Vec<Quest> {
    vec![
        Quest::new("Salvage Run", "Old Mags wants scrap for her stall.", 1)
            .with_objective(
                QuestObjective::new("Collect scrap metal", 2).with_trigger(
                    ObjectiveTrigger::Collect {
                        item: "Scrap Metal".into(),
                    },
                ),
            )
            .with_reward("credits", 50)
            .with_reward("experience", 50),
        Quest::new("Clear the Tunnels", "Ghouls are nesting in the Undercity.", 1)
            .with_objective(
                QuestObjective::new("Put down feral ghouls", 3).with_trigger(
                    ObjectiveTrigger::Defeat {
                        enemy: "Feral Ghoul".into(),
                    },
                ),
            )
            .with_reward("credits", 100)
            .with_reward("experience", 100)
            .with_reward("rep:Market", 5),
        Quest::new("Vault Heist", "Get in, grab the ledger, get out.", 2)
            .with_objective(QuestObjective::new("Reach the Corp Vault", 1).with_trigger(
                ObjectiveTrigger::Visit {
                    location: "Corp Vault".into(),
                },
            ))
            .with_objective(QuestObjective::new("Steal the data shard", 1).with_trigger(
                ObjectiveTrigger::Collect {
                    item: "Data Shard".into(),
                },
            ))
            .with_time_limit(1800)
            .with_reward("credits", 300)
            .with_reward("experience", 200)
            .with_reward("Stim", 2),
    ]
}

pub fn default_enemies() -> Vec<EnemyTemplate> {
    vec![
        EnemyTemplate::new("Scav Drone", 1, Stats::new(8, 12, 6, 12), 20)
            .with_style(CombatStyle::Technical),
        EnemyTemplate::new("Feral Ghoul", 2, Stats::new(12, 10, 4, 4), 30).with_min_danger(2),
        EnemyTemplate::new("Corp Enforcer", 4, Stats::new(14, 12, 10, 12), 50)
            .with_style(CombatStyle::Defensive)
            .with_min_danger(5),
    ]
}

pub fn default_recipes() -> Vec<Recipe> {
    vec![
        Recipe::new("Pipe Rifle", "Pipe Rifle", 10)
            .with_ingredient("Scrap Metal", 2)
            .with_ingredient("Circuit Board", 1),
        Recipe::new("Energy Cell", "Energy Cell", 5).with_ingredient("Circuit Board", 1),
    ]
}
