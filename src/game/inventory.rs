/// Inventory and equipment operations.
///
/// An item lives in exactly one place: the inventory sequence, an equip slot,
/// or the cybernetics list. Every operation here moves items between those
/// places; none clone them.
use super::errors::ActionError;
use super::types::{Character, Item, ItemType, StatusEffect, WEAPON_SLOT};
use super::stats::STAT_NAMES;
use chrono::{DateTime, Utc};
use log::{debug, info};

/// Default lifetime of a consumable's stat boost when the item has no `duration` effect.
pub const DEFAULT_BOOST_SECS: i64 = 60;

/// What a consumable did when used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumeReport {
    pub item: String,
    pub health: i32,
    pub energy: i32,
    pub boost: Option<StatusEffect>,
}

// ============================================================================
// Inventory Operations
// ============================================================================

/// Append to the inventory. No capacity limit.
pub fn add_item(character: &mut Character, item: Item) {
    debug!("{} picks up {}", character.name, item.name);
    character.inventory.push(item);
}

fn position_of(character: &Character, name: &str) -> Option<usize> {
    character
        .inventory
        .iter()
        .position(|item| item.name.eq_ignore_ascii_case(name))
}

/// Remove the first copy of `name` from the inventory.
pub fn remove_item(character: &mut Character, name: &str) -> Result<Item, ActionError> {
    let idx = position_of(character, name).ok_or_else(|| ActionError::NotOwned(name.to_string()))?;
    Ok(character.inventory.remove(idx))
}

fn check_level(character: &Character, item: &Item) -> Result<(), ActionError> {
    if character.level < item.level_req {
        return Err(ActionError::LevelTooLow {
            required: item.level_req,
            actual: character.level,
        });
    }
    Ok(())
}

/// Move an item from the inventory into `slot`.
///
/// Any item already in the slot goes back to the inventory; its name is returned.
pub fn equip(
    character: &mut Character,
    item_name: &str,
    slot: &str,
) -> Result<Option<String>, ActionError> {
    let idx = position_of(character, item_name)
        .ok_or_else(|| ActionError::NotOwned(item_name.to_string()))?;
    check_level(character, &character.inventory[idx])?;

    let item = character.inventory.remove(idx);
    info!("{} equips {} in {}", character.name, item.name, slot);
    let replaced = character.equipped.insert(slot.to_string(), item);
    Ok(replaced.map(|old| {
        let name = old.name.clone();
        character.inventory.push(old);
        name
    }))
}

/// Move the item in `slot` back to the inventory.
pub fn unequip(character: &mut Character, slot: &str) -> Result<String, ActionError> {
    let item = character
        .equipped
        .remove(slot)
        .ok_or_else(|| ActionError::EmptySlot(slot.to_string()))?;
    let name = item.name.clone();
    character.inventory.push(item);
    Ok(name)
}

/// Consume one copy of a Consumable item.
///
/// `health` and `energy` effects apply at once (clamped). Stat-named effects
/// become a status effect named after the item.
pub fn use_consumable(
    character: &mut Character,
    item_name: &str,
    now: DateTime<Utc>,
) -> Result<ConsumeReport, ActionError> {
    let idx = position_of(character, item_name)
        .ok_or_else(|| ActionError::NotOwned(item_name.to_string()))?;
    if character.inventory[idx].item_type != ItemType::Consumable {
        return Err(ActionError::NotConsumable(
            character.inventory[idx].name.clone(),
        ));
    }
    let item = character.inventory.remove(idx);

    let health = character.adjust_health(item.effect("health"));
    let energy = character.adjust_energy(item.effect("energy"));

    let mut boost: Option<StatusEffect> = None;
    for stat in STAT_NAMES {
        let delta = item.effect(stat);
        if delta != 0 {
            let duration = item
                .effects
                .get("duration")
                .copied()
                .map(i64::from)
                .unwrap_or(DEFAULT_BOOST_SECS);
            let effect = boost.take().unwrap_or_else(|| StatusEffect::new(&item.name, duration, now));
            boost = Some(effect.with_modifier(stat, delta));
        }
    }
    if let Some(effect) = &boost {
        character.apply_effect(effect.clone());
    }

    Ok(ConsumeReport {
        item: item.name,
        health,
        energy,
        boost,
    })
}

/// Move a Cybernetic item from the inventory into the character's implants.
pub fn install_cybernetic(character: &mut Character, item_name: &str) -> Result<(), ActionError> {
    let idx = position_of(character, item_name)
        .ok_or_else(|| ActionError::NotOwned(item_name.to_string()))?;
    let item = &character.inventory[idx];
    if item.item_type != ItemType::Cybernetic {
        return Err(ActionError::WrongItemType(item.name.clone()));
    }
    check_level(character, item)?;

    let item = character.inventory.remove(idx);
    info!("{} installs {}", character.name, item.name);
    character.cybernetics.push(item);
    Ok(())
}

/// Wear the weapon slot by one point. Returns the name of the weapon if it broke.
pub fn wear_weapon(character: &mut Character) -> Option<String> {
    let weapon = character.equipped.get_mut(WEAPON_SLOT)?;
    let left = weapon.durability.as_mut()?;
    *left = left.saturating_sub(1);
    if *left > 0 {
        return None;
    }
    character
        .equipped
        .remove(WEAPON_SLOT)
        .map(|broken| broken.name)
}

/// Inventory listing, one item per line, followed by equipped slots.
pub fn format_inventory(character: &Character) -> Vec<String> {
    let mut lines = Vec::new();
    if character.inventory.is_empty() {
        lines.push("Inventory: empty".to_string());
    } else {
        for (idx, item) in character.inventory.iter().enumerate() {
            let dur = item
                .durability
                .map(|d| format!(" [{}]", d))
                .unwrap_or_default();
            lines.push(format!("{}. {} ({:?}){}", idx + 1, item.name, item.item_type, dur));
        }
    }
    for (slot, item) in &character.equipped {
        lines.push(format!("{}: {}", slot, item.name));
    }
    for implant in &character.cybernetics {
        lines.push(format!("implant: {}", implant.name));
    }
    lines
}

// ============================================================================
// Unit Tests
// ============================================================================
