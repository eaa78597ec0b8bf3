//! # Wasteland - Turn-Based Text Adventure Engine
//!
//! A single-player simulation of a post-collapse cyberpunk wasteland: a player
//! character explores a location graph, fights enemies, manages gear and
//! quests, and saves progress as timestamped snapshots.
//!
//! ## Features
//!
//! - **Combat**: Agility-ordered rounds with Aggressive, Defensive and Technical styles, stuns and flee attempts.
//! - **Status Effects**: Timed stat modifiers that stack and expire independently.
//! - **Inventory**: Equip slots, consumables, cybernetic implants and weapon durability.
//! - **Quests**: Event-driven objectives, rewards, abandonment and deadlines.
//! - **Economy**: Shops at trading posts and recipe crafting.
//! - **Persistence**: JSON snapshots that are never overwritten, plus JSON content templates.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wasteland::config::Config;
//! use wasteland::game::{load_templates, write_snapshot, Session, SystemClock};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let templates = load_templates(None)?;
//!     let mut session = Session::new_game("Kade", templates, config, SystemClock);
//!
//!     for line in ["start", "explore", "save"] {
//!         let report = session.handle_line(line);
//!         for out in &report.lines {
//!             println!("{}", out);
//!         }
//!         if report.save_requested {
//!             write_snapshot(Path::new("./saves"), &session.snapshot())?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - The simulation engine and session state machine
//! - [`config`] - Configuration management and validation
//! - [`validation`] - Character name validation and filename sanitization

pub mod config;
pub mod game;
pub mod validation;
