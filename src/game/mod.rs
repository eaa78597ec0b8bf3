//! Simulation engine: character model, combat, quests, world and sessions.
//!
//! Subsystems take `&mut Character` per call; only [`Session`] owns state
//! across commands.

pub mod clock;
pub mod combat;
pub mod crafting;
pub mod effects;
pub mod errors;
pub mod inventory;
pub mod quest;
pub mod seed_loader;
pub mod seeds;
pub mod shop;
pub mod state;
pub mod stats;
pub mod storage;
pub mod types;
pub mod world;

pub use clock::{Clock, ManualClock, SystemClock};
pub use combat::{CombatEngine, CombatOutcome, Combatant, RoundReport};
pub use errors::{ActionError, StoreError};
pub use inventory::{
    add_item, equip, format_inventory, install_cybernetic, remove_item, unequip, use_consumable,
    ConsumeReport,
};
pub use quest::{format_quest_list, format_quest_status, CompletedQuest, QuestLog};
pub use seed_loader::{load_templates, write_templates, Templates};
pub use state::{Command, CommandReport, CommandStatus, GameMode, Session};
pub use stats::calculate_bonus;
pub use storage::{list_snapshots, load_latest, load_snapshot, write_snapshot, Snapshot};
pub use types::*;
pub use world::World;
