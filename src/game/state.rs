//! Game session: the mode state machine and command dispatch.
//!
//! A [`Session`] exclusively owns the character, quest log, world and any
//! active combat. Callers feed it [`Command`]s and get a [`CommandReport`]
//! back. Commands that are not legal in the current mode are reported as
//! [`CommandStatus::Illegal`] and change nothing; rule violations come back as
//! [`CommandStatus::Failed`]. Neither ends the session. Only a combat defeat
//! does, by moving to [`GameMode::Dying`].

use super::clock::{Clock, SystemClock};
use super::combat::{CombatEngine, CombatOutcome, RoundReport};
use super::crafting;
use super::effects::format_effects;
use super::errors::ActionError;
use super::inventory::{self, format_inventory};
use super::quest::{format_quest_list, format_quest_status, QuestLog};
use super::seed_loader::Templates;
use super::shop;
use super::storage::Snapshot;
use super::types::{
    Character, Enemy, ItemType, ObjectiveTrigger, Rewards, SNAPSHOT_SCHEMA_VERSION,
    WEAPON_SLOT,
};
use super::world::World;
use crate::config::Config;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use uuid::Uuid;

/// Slot names recognized as the trailing word of `equip <item> <slot>`.
pub const EQUIP_SLOTS: [&str; 5] = ["weapon", "armor", "head", "offhand", "accessory"];

pub const ARMOR_SLOT: &str = "armor";

/// Top-level modes. Dying is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    MainMenu,
    Exploring,
    Combat,
    Inventory,
    Shop,
    Crafting,
    QuestLog,
    Dying,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameMode::MainMenu => "main menu",
            GameMode::Exploring => "exploring",
            GameMode::Combat => "combat",
            GameMode::Inventory => "inventory",
            GameMode::Shop => "shop",
            GameMode::Crafting => "crafting",
            GameMode::QuestLog => "quest log",
            GameMode::Dying => "dying",
        };
        f.write_str(name)
    }
}

impl GameMode {
    /// Whether `cmd` may run in this mode.
    pub fn allows(self, cmd: &Command) -> bool {
        match self {
            GameMode::MainMenu => {
                matches!(cmd, Command::Start | Command::Status | Command::Quit)
            }
            GameMode::Exploring => matches!(
                cmd,
                Command::Explore
                    | Command::Go(_)
                    | Command::Look
                    | Command::Inventory
                    | Command::Quests
                    | Command::Shop
                    | Command::Craft(None)
                    | Command::Rest
                    | Command::Status
                    | Command::Save
                    | Command::Quit
            ),
            GameMode::Combat => {
                matches!(cmd, Command::Attack | Command::Flee | Command::Status)
            }
            GameMode::Inventory => matches!(
                cmd,
                Command::List
                    | Command::Equip { .. }
                    | Command::Unequip(_)
                    | Command::Use(_)
                    | Command::Install(_)
                    | Command::Back
            ),
            GameMode::Shop => matches!(
                cmd,
                Command::List | Command::Buy(_) | Command::Sell(_) | Command::Back
            ),
            GameMode::Crafting => {
                matches!(cmd, Command::List | Command::Craft(Some(_)) | Command::Back)
            }
            GameMode::QuestLog => matches!(
                cmd,
                Command::List | Command::Accept(_) | Command::Abandon(_) | Command::Back
            ),
            GameMode::Dying => false,
        }
    }

    /// Command summary shown when an illegal command is rejected.
    pub fn verbs(self) -> &'static [&'static str] {
        match self {
            GameMode::MainMenu => &["start", "status", "quit"],
            GameMode::Exploring => &[
                "explore", "go <place>", "look", "inventory", "quests", "shop", "craft", "rest",
                "status", "save", "quit",
            ],
            GameMode::Combat => &["attack", "flee", "status"],
            GameMode::Inventory => &[
                "list",
                "equip <item> [slot]",
                "unequip <slot>",
                "use <item>",
                "install <item>",
                "back",
            ],
            GameMode::Shop => &["list", "buy <item>", "sell <item>", "back"],
            GameMode::Crafting => &["list", "craft <recipe>", "back"],
            GameMode::QuestLog => &["list", "accept <quest>", "abandon <quest>", "back"],
            GameMode::Dying => &[],
        }
    }
}

/// The closed command set. Each variant maps to one engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Status,
    Quit,
    Explore,
    Go(String),
    Look,
    Inventory,
    Quests,
    Shop,
    /// `craft` opens the workbench; `craft <recipe>` builds at it.
    Craft(Option<String>),
    Rest,
    Save,
    Attack,
    Flee,
    List,
    Equip { item: String, slot: Option<String> },
    Unequip(String),
    Use(String),
    Install(String),
    Back,
    Buy(String),
    Sell(String),
    Accept(String),
    Abandon(String),
    /// Anything that did not parse; illegal in every mode.
    Unknown(String),
}

impl Command {
    /// Map a verb line to a command. Verbs are case-insensitive; arguments keep their case.
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let arg = rest.to_string();
        let unknown = || Command::Unknown(line.to_string());
        let needs_arg = |make: fn(String) -> Command| {
            if rest.is_empty() {
                unknown()
            } else {
                make(arg.clone())
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "status" | "stats" => Command::Status,
            "quit" | "exit" => Command::Quit,
            "explore" => Command::Explore,
            "go" | "travel" => needs_arg(Command::Go),
            "look" => Command::Look,
            "inventory" | "inv" | "i" => Command::Inventory,
            "quests" => Command::Quests,
            "shop" => Command::Shop,
            "craft" => Command::Craft((!rest.is_empty()).then(|| arg.clone())),
            "rest" => Command::Rest,
            "save" => Command::Save,
            "attack" | "a" => Command::Attack,
            "flee" | "run" => Command::Flee,
            "list" | "l" => Command::List,
            "equip" => {
                if rest.is_empty() {
                    return unknown();
                }
                match rest.rsplit_once(char::is_whitespace) {
                    Some((item, slot))
                        if EQUIP_SLOTS.iter().any(|s| s.eq_ignore_ascii_case(slot)) =>
                    {
                        Command::Equip {
                            item: item.trim().to_string(),
                            slot: Some(slot.to_ascii_lowercase()),
                        }
                    }
                    _ => Command::Equip {
                        item: arg.clone(),
                        slot: None,
                    },
                }
            }
            "unequip" => needs_arg(Command::Unequip),
            "use" => needs_arg(Command::Use),
            "install" => needs_arg(Command::Install),
            "back" | "b" => Command::Back,
            "buy" => needs_arg(Command::Buy),
            "sell" => needs_arg(Command::Sell),
            "accept" => needs_arg(Command::Accept),
            "abandon" => needs_arg(Command::Abandon),
            _ => unknown(),
        }
    }

    pub fn verb(&self) -> &str {
        match self {
            Command::Start => "start",
            Command::Status => "status",
            Command::Quit => "quit",
            Command::Explore => "explore",
            Command::Go(_) => "go",
            Command::Look => "look",
            Command::Inventory => "inventory",
            Command::Quests => "quests",
            Command::Shop => "shop",
            Command::Craft(_) => "craft",
            Command::Rest => "rest",
            Command::Save => "save",
            Command::Attack => "attack",
            Command::Flee => "flee",
            Command::List => "list",
            Command::Equip { .. } => "equip",
            Command::Unequip(_) => "unequip",
            Command::Use(_) => "use",
            Command::Install(_) => "install",
            Command::Back => "back",
            Command::Buy(_) => "buy",
            Command::Sell(_) => "sell",
            Command::Accept(_) => "accept",
            Command::Abandon(_) => "abandon",
            Command::Unknown(line) => line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    Applied,
    /// Not available in the mode the session was in; nothing changed.
    Illegal,
    Failed(ActionError),
}

/// Result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    /// Mode after the command
    pub mode: GameMode,
    pub lines: Vec<String>,
    pub status: CommandStatus,
    /// The caller should write a snapshot now
    pub save_requested: bool,
}

impl CommandReport {
    pub fn is_applied(&self) -> bool {
        self.status == CommandStatus::Applied
    }
}

pub struct Session<C: Clock = SystemClock> {
    id: Uuid,
    character: Character,
    quests: QuestLog,
    world: World,
    mode: GameMode,
    combat: Option<CombatEngine>,
    rng: StdRng,
    clock: C,
    templates: Templates,
    config: Config,
    save_pending: bool,
}

impl<C: Clock> Session<C> {
    pub fn new(character: Character, templates: Templates, config: Config, clock: C) -> Self {
        let rng = match config.game.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            id: Uuid::new_v4(),
            character,
            quests: QuestLog::new(templates.quests.clone()),
            world: World::new(templates.locations.clone()),
            mode: GameMode::MainMenu,
            combat: None,
            rng,
            clock,
            templates,
            config,
            save_pending: false,
        }
    }

    /// Fresh level-1 character with the configured starting credits.
    pub fn new_game(name: &str, templates: Templates, config: Config, clock: C) -> Self {
        let character = Character::new(name).with_credits(config.game.starting_credits);
        info!("new game for {}", name);
        Self::new(character, templates, config, clock)
    }

    /// Resume a saved session. It starts in the main menu at the saved location.
    pub fn from_snapshot(snapshot: Snapshot, templates: Templates, config: Config, clock: C) -> Self {
        let mut session = Self::new(snapshot.character, templates, config, clock);
        session.id = snapshot.session_id;
        session.quests = snapshot.quests;
        if let Some(location) = snapshot.location {
            if session.world.place(&location).is_err() {
                warn!("saved location {} no longer exists", location);
            }
        }
        info!("resumed {} ({})", session.character.name, session.id);
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    pub fn quests(&self) -> &QuestLog {
        &self.quests
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn combat(&self) -> Option<&CombatEngine> {
        self.combat.as_ref()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_over(&self) -> bool {
        self.mode == GameMode::Dying
    }

    pub fn handle_line(&mut self, line: &str) -> CommandReport {
        self.handle(Command::parse(line))
    }

    pub fn handle(&mut self, cmd: Command) -> CommandReport {
        if !self.mode.allows(&cmd) {
            debug!("illegal command '{}' in {}", cmd.verb(), self.mode);
            let lines = if self.mode == GameMode::Dying {
                vec!["You are dying. Nothing more can be done.".to_string()]
            } else {
                vec![format!(
                    "Can't '{}' while in {}. Try: {}",
                    cmd.verb(),
                    self.mode,
                    self.mode.verbs().join(", ")
                )]
            };
            return self.report(lines, CommandStatus::Illegal);
        }

        let now = self.clock.now();
        let before = self.mode;
        match self.dispatch(cmd, now) {
            Ok(lines) => {
                if self.mode != before {
                    debug!("mode {} -> {}", before, self.mode);
                }
                self.report(lines, CommandStatus::Applied)
            }
            Err(err) => {
                let line = format!("Error: {}", err);
                self.report(vec![line], CommandStatus::Failed(err))
            }
        }
    }

    fn report(&mut self, lines: Vec<String>, status: CommandStatus) -> CommandReport {
        CommandReport {
            mode: self.mode,
            lines,
            status,
            save_requested: std::mem::take(&mut self.save_pending),
        }
    }

    fn dispatch(&mut self, cmd: Command, now: DateTime<Utc>) -> Result<Vec<String>, ActionError> {
        match cmd {
            Command::Start => self.start(),
            Command::Status => Ok(self.status_lines(now)),
            Command::Quit => {
                self.save_pending = true;
                self.mode = GameMode::MainMenu;
                Ok(vec!["Back at the main menu.".to_string()])
            }
            Command::Explore => self.explore(now),
            Command::Go(target) => self.go(&target, now),
            Command::Look => self.world.describe(),
            Command::Inventory => {
                self.mode = GameMode::Inventory;
                Ok(format_inventory(&self.character))
            }
            Command::Quests => {
                self.mode = GameMode::QuestLog;
                Ok(self.quest_lines(now))
            }
            Command::Shop => {
                if !self.world.current_location()?.shop {
                    return Err(ActionError::NoShopHere);
                }
                self.mode = GameMode::Shop;
                Ok(self.shop_lines())
            }
            Command::Craft(None) => {
                self.mode = GameMode::Crafting;
                Ok(crafting::list_recipes(&self.templates.recipes))
            }
            Command::Craft(Some(recipe)) => {
                let made = crafting::craft(
                    &mut self.character,
                    &self.templates.recipes,
                    &self.templates.items,
                    &recipe,
                )?;
                Ok(vec![format!("You craft a {}.", made)])
            }
            Command::Rest => {
                let health = self.character.adjust_health(self.config.game.rest_health);
                let energy = self.character.adjust_energy(self.config.game.rest_energy);
                Ok(vec![format!("You rest. +{} HP, +{} energy.", health, energy)])
            }
            Command::Save => {
                self.save_pending = true;
                Ok(vec!["Saving...".to_string()])
            }
            Command::Attack => self.combat_turn(now, false),
            Command::Flee => self.combat_turn(now, true),
            Command::List => Ok(self.list_lines(now)),
            Command::Equip { item, slot } => self.equip(&item, slot),
            Command::Unequip(slot) => {
                let name = inventory::unequip(&mut self.character, &slot.to_ascii_lowercase())?;
                Ok(vec![format!("You unequip {}.", name)])
            }
            Command::Use(item) => {
                let used = inventory::use_consumable(&mut self.character, &item, now)?;
                let mut lines = vec![format!(
                    "You use {}. {:+} HP, {:+} energy.",
                    used.item, used.health, used.energy
                )];
                if let Some(boost) = used.boost {
                    lines.push(format!("{} takes effect for {}s.", boost.name, boost.duration_secs));
                }
                Ok(lines)
            }
            Command::Install(item) => {
                inventory::install_cybernetic(&mut self.character, &item)?;
                Ok(vec![format!("{} installed.", item)])
            }
            Command::Back => {
                self.mode = GameMode::Exploring;
                Ok(vec!["Back to exploring.".to_string()])
            }
            Command::Buy(item) => {
                let price = shop::buy(&mut self.character, &self.templates.items, &item)?;
                Ok(vec![format!("Bought {} for {} cr.", item, price)])
            }
            Command::Sell(item) => {
                let price = shop::sell(&mut self.character, &item)?;
                Ok(vec![format!("Sold {} for {} cr.", item, price)])
            }
            Command::Accept(quest) => {
                self.quests.accept(&self.character, &quest, now)?;
                Ok(vec![format!("Quest accepted: {}", quest)])
            }
            Command::Abandon(quest) => {
                self.quests.abandon(&quest, now)?;
                Ok(vec![format!("Quest abandoned: {}", quest)])
            }
            // Illegal everywhere; rejected before dispatch.
            Command::Unknown(line) => Ok(vec![format!("Unknown command: {}", line)]),
        }
    }

    fn start(&mut self) -> Result<Vec<String>, ActionError> {
        if self.world.current_name().is_none() {
            let start = self.config.game.start_location.clone();
            if self.world.place(&start).is_err() {
                warn!("start location {} not found; using first location", start);
                let first = self
                    .world
                    .locations()
                    .next()
                    .map(|l| l.name.clone())
                    .ok_or(ActionError::NoLocation)?;
                self.world.place(&first)?;
            }
        }
        self.mode = GameMode::Exploring;
        let mut lines = vec![format!("Welcome to the wasteland, {}.", self.character.name)];
        lines.extend(self.world.describe()?);
        Ok(lines)
    }

    fn explore(&mut self, now: DateTime<Utc>) -> Result<Vec<String>, ActionError> {
        let cost = self.config.game.explore_energy_cost;
        if self.character.energy < cost {
            return Err(ActionError::InsufficientResource {
                resource: "energy",
                needed: cost.max(0) as u32,
                available: self.character.energy.max(0) as u32,
            });
        }
        let danger = self.world.current_location()?.danger_level;
        self.character.adjust_energy(-cost);

        let chance = self.config.game.encounter_chance(danger);
        if self.rng.gen_bool(chance) {
            let candidates = self.templates.enemies_for(danger);
            if !candidates.is_empty() {
                let pick = self.rng.gen_range(0..candidates.len());
                let enemy = Enemy::from_template(candidates[pick]);
                let line = format!("A {} (Lv{}) attacks!", enemy.name, enemy.level);
                info!("{} encountered {}", self.character.name, enemy.name);
                self.combat = Some(CombatEngine::new(enemy, self.config.combat.clone()));
                self.mode = GameMode::Combat;
                return Ok(vec![line]);
            }
        }

        match self.world.take_item() {
            Some(item) => {
                let mut lines = vec![format!("You found {}.", item.name)];
                let trigger = ObjectiveTrigger::Collect {
                    item: item.name.clone(),
                };
                inventory::add_item(&mut self.character, item);
                lines.extend(self.record_event(&trigger, now));
                Ok(lines)
            }
            None => Ok(vec!["You search the area but find nothing of value.".to_string()]),
        }
    }

    fn go(&mut self, target: &str, now: DateTime<Utc>) -> Result<Vec<String>, ActionError> {
        let arrived = self.world.travel(&self.character, target)?;
        let mut lines = self.world.describe()?;
        lines.extend(self.record_event(&ObjectiveTrigger::Visit { location: arrived }, now));
        Ok(lines)
    }

    fn equip(&mut self, item: &str, slot: Option<String>) -> Result<Vec<String>, ActionError> {
        let slot = match slot {
            Some(slot) => slot,
            None => {
                let held = self
                    .character
                    .inventory
                    .iter()
                    .find(|i| i.name.eq_ignore_ascii_case(item))
                    .ok_or_else(|| ActionError::NotOwned(item.to_string()))?;
                match held.item_type {
                    ItemType::Weapon => WEAPON_SLOT.to_string(),
                    ItemType::Armor => ARMOR_SLOT.to_string(),
                    _ => return Err(ActionError::WrongItemType(held.name.clone())),
                }
            }
        };
        let replaced = inventory::equip(&mut self.character, item, &slot)?;
        let mut lines = vec![format!("You equip {} ({}).", item, slot)];
        if let Some(old) = replaced {
            lines.push(format!("{} returned to your pack.", old));
        }
        Ok(lines)
    }

    fn combat_turn(&mut self, now: DateTime<Utc>, flee: bool) -> Result<Vec<String>, ActionError> {
        let Some(engine) = self.combat.as_mut() else {
            warn!("combat mode without an engine; returning to exploring");
            self.mode = GameMode::Exploring;
            return Ok(vec!["There is nothing to fight.".to_string()]);
        };
        let RoundReport { mut lines, outcome } = if flee {
            engine.flee(&mut self.character, &mut self.rng, now)
        } else {
            engine.resolve_round(&mut self.character, &mut self.rng, now)
        };

        match outcome {
            CombatOutcome::Ongoing => {
                let foe = engine.enemy();
                lines.push(format!(
                    "{}: {}/{} HP | {}: {}/{} HP",
                    self.character.name,
                    self.character.health,
                    self.character.max_health,
                    foe.name,
                    foe.health,
                    foe.max_health
                ));
            }
            CombatOutcome::Victory { .. } => {
                let defeated = engine.enemy().name.clone();
                self.combat = None;
                self.mode = GameMode::Exploring;
                lines.extend(self.record_event(&ObjectiveTrigger::Defeat { enemy: defeated }, now));
                lines.extend(self.check_level_up());
            }
            CombatOutcome::Escaped => {
                self.combat = None;
                self.mode = GameMode::Exploring;
            }
            CombatOutcome::Defeat => {
                self.combat = None;
                self.mode = GameMode::Dying;
                self.save_pending = true;
                lines.push("Everything goes dark.".to_string());
            }
        }
        Ok(lines)
    }

    /// Feed a game event to the quest log and pay out any quests it completes.
    fn record_event(&mut self, trigger: &ObjectiveTrigger, now: DateTime<Utc>) -> Vec<String> {
        let mut lines = Vec::new();
        for done in self.quests.record_event(trigger, 1, now) {
            lines.push(format!("Quest complete: {}", done.name));
            lines.extend(self.apply_rewards(&done.rewards));
        }
        lines
    }

    /// Record progress on one objective by index; pays out if it completes the quest.
    pub fn record_progress(
        &mut self,
        quest: &str,
        objective_index: usize,
        amount: u32,
    ) -> Result<Vec<String>, ActionError> {
        let now = self.clock.now();
        let mut lines = Vec::new();
        if let Some(rewards) = self
            .quests
            .record_progress(quest, objective_index, amount, now)?
        {
            lines.push(format!("Quest complete: {}", quest));
            lines.extend(self.apply_rewards(&rewards));
        }
        Ok(lines)
    }

    fn apply_rewards(&mut self, rewards: &Rewards) -> Vec<String> {
        let mut lines = Vec::new();
        for (resource, &amount) in rewards {
            let magnitude = u32::try_from(amount.unsigned_abs()).unwrap_or(u32::MAX);
            match resource.as_str() {
                "credits" => {
                    self.character.credits = if amount >= 0 {
                        self.character.credits.saturating_add(magnitude)
                    } else {
                        self.character.credits.saturating_sub(magnitude)
                    };
                    lines.push(format!("  {:+} credits", amount));
                }
                "experience" => {
                    self.character.experience = if amount >= 0 {
                        self.character.experience.saturating_add(magnitude)
                    } else {
                        self.character.experience.saturating_sub(magnitude)
                    };
                    lines.push(format!("  {:+} XP", amount));
                }
                other => {
                    if let Some(faction) = other.strip_prefix("rep:") {
                        let delta = amount.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
                        let standing = self.character.reputation.entry(faction.to_string()).or_insert(0);
                        *standing = standing.saturating_add(delta);
                        lines.push(format!("  {:+} reputation with {}", delta, faction));
                    } else if let Some(template) = self.templates.item(other).cloned() {
                        for _ in 0..amount.max(0) {
                            inventory::add_item(&mut self.character, template.clone());
                        }
                        lines.push(format!("  {}x {}", amount.max(0), template.name));
                    } else {
                        warn!("reward {} matches no item template; skipped", other);
                    }
                }
            }
        }
        lines.extend(self.check_level_up());
        lines
    }

    /// Level up while experience reaches `level * 100`. The final level is the
    /// first one whose threshold is above the current experience.
    fn check_level_up(&mut self) -> Vec<String> {
        let c = &mut self.character;
        let target = c.experience / 100 + 1;
        let gained = target.saturating_sub(c.level);
        if gained == 0 {
            return Vec::new();
        }
        let steps = i32::try_from(gained).unwrap_or(i32::MAX);
        c.level = target;
        c.max_health = c.max_health.saturating_add(steps.saturating_mul(10));
        c.max_energy = c.max_energy.saturating_add(steps.saturating_mul(5));
        c.health = c.max_health;
        c.energy = c.max_energy;
        info!("{} reached level {}", c.name, c.level);
        vec![format!("Level up! You are now level {}.", c.level)]
    }

    fn shop_lines(&self) -> Vec<String> {
        let mut lines = shop::list_stock(&self.templates.items);
        lines.push(format!("Credits: {}", self.character.credits));
        lines
    }

    /// Quest list followed by the detail of every active quest.
    fn quest_lines(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut lines = format_quest_list(&self.quests);
        for quest in self.quests.active() {
            lines.extend(format_quest_status(quest, now));
        }
        lines
    }

    fn list_lines(&self, now: DateTime<Utc>) -> Vec<String> {
        match self.mode {
            GameMode::Inventory => format_inventory(&self.character),
            GameMode::Shop => self.shop_lines(),
            GameMode::Crafting => crafting::list_recipes(&self.templates.recipes),
            GameMode::QuestLog => self.quest_lines(now),
            GameMode::MainMenu | GameMode::Exploring | GameMode::Combat | GameMode::Dying => {
                Vec::new()
            }
        }
    }

    fn status_lines(&mut self, now: DateTime<Utc>) -> Vec<String> {
        self.character.prune_effects(now);
        let c = &self.character;
        let s = c.effective_stats();
        let mut lines = vec![
            format!("{} - Level {} ({} XP)", c.name, c.level, c.experience),
            format!(
                "HP {}/{} | Energy {}/{} | Credits {}",
                c.health, c.max_health, c.energy, c.max_energy, c.credits
            ),
            format!(
                "STR {} AGI {} INT {} TECH {} | DMG {:+} DEF {:+} | {:?}",
                s.strength,
                s.agility,
                s.intelligence,
                s.tech_aptitude,
                c.damage_bonus(),
                c.defense_bonus(),
                c.combat_style
            ),
            format!("Effects: {}", format_effects(&c.status_effects, now)),
        ];
        if let Some(here) = self.world.current_name() {
            lines.push(format!("Location: {}", here));
        }
        if let Some(engine) = &self.combat {
            let foe = engine.enemy();
            lines.push(format!(
                "Fighting {} (Lv{}) {}/{} HP, turn {}",
                foe.name,
                foe.level,
                foe.health,
                foe.max_health,
                engine.turn()
            ));
        }
        lines
    }

    /// Advance time-based state to the clock's current time.
    pub fn update(&mut self) -> Vec<String> {
        let now = self.clock.now();
        self.update_at(now)
    }

    /// Prune status effects, fail overdue quests and advance the world clock.
    pub fn update_at(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let mut lines = Vec::new();
        for expired in self.character.prune_effects(now) {
            lines.push(format!("{} wears off.", expired.name));
        }
        for failed in self.quests.tick(now) {
            lines.push(format!("Quest failed: {} (out of time)", failed));
        }
        self.world.advance(now);
        lines
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            session_id: self.id,
            character: self.character.clone(),
            location: self.world.current_name().map(str::to_string),
            quests: self.quests.clone(),
            timestamp: self.clock.now(),
        }
    }
}
