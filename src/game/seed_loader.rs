//! Template loaders for data-driven content.
//!
//! Each collection is read from its own JSON file in the template directory
//! (`items.json`, `locations.json`, `quests.json`, `enemies.json`,
//! `recipes.json`). A missing file falls back to the built-in set for that
//! collection only; a file that exists but does not parse is an error.

use super::errors::StoreError;
use super::seeds;
use super::types::{EnemyTemplate, Item, Location, Quest, Recipe};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const ITEMS_FILE: &str = "items.json";
pub const LOCATIONS_FILE: &str = "locations.json";
pub const QUESTS_FILE: &str = "quests.json";
pub const ENEMIES_FILE: &str = "enemies.json";
pub const RECIPES_FILE: &str = "recipes.json";

/// Parsed content templates.
#[derive(Debug, Clone, PartialEq)]
pub struct Templates {
    pub items: Vec<Item>,
    pub locations: Vec<Location>,
    pub quests: Vec<Quest>,
    pub enemies: Vec<EnemyTemplate>,
    pub recipes: Vec<Recipe>,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            items: seeds::default_items(),
            locations: seeds::default_locations(),
            quests: seeds::default_quests(),
            enemies: seeds::default_enemies(),
            recipes: seeds::default_recipes(),
        }
    }
}

impl Templates {
    pub fn item(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Enemies that may appear at `danger_level`.
    pub fn enemies_for(&self, danger_level: u8) -> Vec<&EnemyTemplate> {
        self.enemies
            .iter()
            .filter(|e| e.min_danger <= danger_level)
            .collect()
    }
}

fn load_collection<T: DeserializeOwned>(
    dir: Option<&Path>,
    file: &str,
    fallback: fn() -> Vec<T>,
) -> Result<Vec<T>, StoreError> {
    let path = match dir {
        Some(dir) => dir.join(file),
        None => return Ok(fallback()),
    };
    if !path.exists() {
        warn!("{} not found; using built-in templates", path.display());
        return Ok(fallback());
    }
    let contents = fs::read_to_string(&path)?;
    let records: Vec<T> =
        serde_json::from_str(&contents).map_err(|e| StoreError::MalformedTemplate {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    debug!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Load every collection from `dir`, or the built-in set when `dir` is `None`.
pub fn load_templates(dir: Option<&Path>) -> Result<Templates, StoreError> {
    Ok(Templates {
        items: load_collection(dir, ITEMS_FILE, seeds::default_items)?,
        locations: load_collection(dir, LOCATIONS_FILE, seeds::default_locations)?,
        quests: load_collection(dir, QUESTS_FILE, seeds::default_quests)?,
        enemies: load_collection(dir, ENEMIES_FILE, seeds::default_enemies)?,
        recipes: load_collection(dir, RECIPES_FILE, seeds::default_recipes)?,
    })
}

fn write_collection<T: Serialize>(dir: &Path, file: &str, records: &[T]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(dir.join(file), json)?;
    Ok(())
}

/// Write `templates` as one JSON file per collection, creating `dir` if needed.
pub fn write_templates(dir: &Path, templates: &Templates) -> Result<(), StoreError> {
    fs::create_dir_all(dir)?;
    write_collection(dir, ITEMS_FILE, &templates.items)?;
    write_collection(dir, LOCATIONS_FILE, &templates.locations)?;
    write_collection(dir, QUESTS_FILE, &templates.quests)?;
    write_collection(dir, ENEMIES_FILE, &templates.enemies)?;
    write_collection(dir, RECIPES_FILE, &templates.recipes)?;
    Ok(())
}
