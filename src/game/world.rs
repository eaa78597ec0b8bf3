//! Location graph and the world clock.
//!
//! Edges are directed. The world never holds the character; it only tracks
//! which location the player is standing in.

use super::errors::ActionError;
use super::types::{Character, Item, Location, KEYCARD_ITEM};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct World {
    locations: BTreeMap<String, Location>,
    current: Option<String>,
    last_update: Option<DateTime<Utc>>,
    ticks: u64,
}

impl World {
    pub fn new(locations: Vec<Location>) -> Self {
        let locations = locations
            .into_iter()
            .map(|loc| (loc.name.clone(), loc))
            .collect();
        Self {
            locations,
            current: None,
            last_update: None,
            ticks: 0,
        }
    }

    /// Resolve a name case-insensitively to its canonical key.
    fn key_for(&self, name: &str) -> Option<String> {
        self.locations
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn location(&self, name: &str) -> Option<&Location> {
        self.key_for(name).and_then(|k| self.locations.get(&k))
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_location(&self) -> Result<&Location, ActionError> {
        self.current
            .as_ref()
            .and_then(|name| self.locations.get(name))
            .ok_or(ActionError::NoLocation)
    }

    /// Place the player without checking edges (new game, resumed snapshot).
    pub fn place(&mut self, name: &str) -> Result<(), ActionError> {
        let key = self.key_for(name).ok_or(ActionError::NoLocation)?;
        debug!("player placed at {}", key);
        self.current = Some(key);
        Ok(())
    }

    /// Follow an edge from the current location. Returns the arrival location's name.
    pub fn travel(&mut self, character: &Character, target: &str) -> Result<String, ActionError> {
        let here = self.current_location()?;
        let no_route = || ActionError::NoRoute {
            from: here.name.clone(),
            to: target.to_string(),
        };
        let edge = here
            .connected_locations
            .iter()
            .find(|name| name.eq_ignore_ascii_case(target))
            .ok_or_else(no_route)?;
        let dest = self.location(edge).ok_or_else(no_route)?;
        if dest.requires_keycard && !character.has_item(KEYCARD_ITEM) {
            return Err(ActionError::Locked(dest.name.clone()));
        }

        let arrived = dest.name.clone();
        info!("{} travels {} -> {}", character.name, here.name, arrived);
        self.current = Some(arrived.clone());
        Ok(arrived)
    }

    /// Pick up the first item lying at the current location.
    pub fn take_item(&mut self) -> Option<Item> {
        let name = self.current.as_ref()?;
        let here = self.locations.get_mut(name)?;
        if here.items.is_empty() {
            None
        } else {
            Some(here.items.remove(0))
        }
    }

    /// Describe the current location: name, description, exits, NPCs and items.
    pub fn describe(&self) -> Result<Vec<String>, ActionError> {
        let here = self.current_location()?;
        let mut lines = vec![format!("== {} (danger {}) ==", here.name, here.danger_level)];
        if !here.description.is_empty() {
            lines.push(here.description.clone());
        }
        let exits: Vec<&str> = here.connected_locations.iter().map(String::as_str).collect();
        lines.push(format!(
            "Exits: {}",
            if exits.is_empty() { "none".to_string() } else { exits.join(", ") }
        ));
        if !here.npcs.is_empty() {
            lines.push(format!("People: {}", here.npcs.join(", ")));
        }
        if !here.items.is_empty() {
            let items: Vec<&str> = here.items.iter().map(|i| i.name.as_str()).collect();
            lines.push(format!("You see: {}", items.join(", ")));
        }
        if here.shop {
            lines.push("A trader has set up shop here.".to_string());
        }
        Ok(lines)
    }

    /// Advance the world clock to `now`. Earlier timestamps are ignored.
    pub fn advance(&mut self, now: DateTime<Utc>) {
        if self.last_update.is_some_and(|last| now < last) {
            return;
        }
        self.last_update = Some(now);
        self.ticks += 1;
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
