//! Snapshot persistence.
//!
//! Every save creates a new JSON file named
//! `<safe name>-<YYYYmmddTHHMMSS.fffZ>.json` in the save directory; existing
//! files are never overwritten. A numeric suffix disambiguates saves made in
//! the same millisecond. Writers serialize on a per-character lock file.

use super::errors::StoreError;
use super::quest::QuestLog;
use super::types::{Character, SNAPSHOT_SCHEMA_VERSION};
use crate::validation::safe_filename;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Immutable record of a session at one instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub schema_version: u8,
    pub session_id: Uuid,
    pub character: Character,
    /// Current location name, if the player has entered the world
    pub location: Option<String>,
    pub quests: QuestLog,
    pub timestamp: DateTime<Utc>,
}

impl Snapshot {
    /// True when both snapshots hold the same game state, ignoring when they were taken.
    pub fn same_state(&self, other: &Snapshot) -> bool {
        self.session_id == other.session_id
            && self.character == other.character
            && self.location == other.location
            && self.quests == other.quests
    }
}

fn ensure_dir(dir: &Path) -> Result<(), StoreError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn stamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%S%.3fZ").to_string()
}

/// Write `snapshot` to a fresh file in `save_dir`. Returns the path written.
pub fn write_snapshot(save_dir: &Path, snapshot: &Snapshot) -> Result<PathBuf, StoreError> {
    ensure_dir(save_dir)?;
    let safe = safe_filename(&snapshot.character.name);
    let json = serde_json::to_string_pretty(snapshot)?;

    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(save_dir.join(format!(".{}.lock", safe)))?;
    lock_file.lock_exclusive()?;

    let base = format!("{}-{}", safe, stamp(snapshot.timestamp));
    let mut counter = 0u32;
    let path = loop {
        let candidate = if counter == 0 {
            save_dir.join(format!("{}.json", base))
        } else {
            save_dir.join(format!("{}-{}.json", base, counter))
        };
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut file) => {
                file.write_all(json.as_bytes())?;
                file.sync_all()?;
                break candidate;
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    };

    drop(lock_file);
    info!("saved {} to {}", snapshot.character.name, path.display());
    Ok(path)
}

/// Read one snapshot file, rejecting unknown schema versions.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
    let contents = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&contents)?;
    if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
        return Err(StoreError::SchemaMismatch {
            entity: "snapshot",
            expected: SNAPSHOT_SCHEMA_VERSION,
            found: snapshot.schema_version,
        });
    }
    Ok(snapshot)
}

/// Sort key from a snapshot file name: (timestamp text, collision suffix).
fn order_key(rest: &str) -> Option<(String, u32)> {
    let stem = rest.strip_suffix(".json")?;
    match stem.split_once("Z-") {
        Some((ts, n)) => Some((format!("{}Z", ts), n.parse().ok()?)),
        None => Some((stem.to_string(), 0)),
    }
}

/// Snapshot files for `name`, oldest first.
pub fn list_snapshots(save_dir: &Path, name: &str) -> Result<Vec<PathBuf>, StoreError> {
    if !save_dir.exists() {
        return Ok(Vec::new());
    }
    let prefix = format!("{}-", safe_filename(name));
    let mut found = Vec::new();
    for entry in fs::read_dir(save_dir)? {
        let path = entry?.path();
        let key = path
            .file_name()
            .and_then(|f| f.to_str())
            .and_then(|f| f.strip_prefix(prefix.as_str()))
            .and_then(order_key);
        if let Some(key) = key {
            found.push((key, path));
        }
    }
    found.sort();
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

/// Newest snapshot for `name`.
pub fn load_latest(save_dir: &Path, name: &str) -> Result<Snapshot, StoreError> {
    let path = list_snapshots(save_dir, name)?
        .pop()
        .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
    debug!("loading snapshot {}", path.display());
    load_snapshot(&path)
}
