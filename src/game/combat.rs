//! Turn-based combat between the player and one enemy.
//!
//! Rounds are deterministic given the participants and the RNG: turn order is
//! effective agility descending with the player acting first on a tie, and the
//! RNG is only consulted for Technical stuns, flee attempts and the victory reward.
//!
//! The engine owns the enemy; the player character is borrowed for each call.

use super::inventory::wear_weapon;
use super::types::{Character, CombatStyle, Enemy, StatusEffect};
use crate::config::CombatConfig;
use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::Rng;

pub const STUNNED: &str = "Stunned";

/// Anything that can trade blows in a round.
pub trait Combatant {
    fn name(&self) -> &str;
    fn health(&self) -> i32;
    fn style(&self) -> CombatStyle;
    fn agility(&self) -> i32;
    fn damage_bonus(&self) -> i32;
    fn defense_bonus(&self) -> i32;
    /// Reduce health by `amount`, clamped at 0.
    fn take_damage(&mut self, amount: i32);
    fn apply_effect(&mut self, effect: StatusEffect);
}

impl Combatant for Character {
    fn name(&self) -> &str {
        &self.name
    }
    fn health(&self) -> i32 {
        self.health
    }
    fn style(&self) -> CombatStyle {
        self.combat_style
    }
    fn agility(&self) -> i32 {
        self.effective_stats().agility
    }
    fn damage_bonus(&self) -> i32 {
        Character::damage_bonus(self)
    }
    fn defense_bonus(&self) -> i32 {
        Character::defense_bonus(self)
    }
    fn take_damage(&mut self, amount: i32) {
        self.adjust_health(-amount);
    }
    fn apply_effect(&mut self, effect: StatusEffect) {
        Character::apply_effect(self, effect);
    }
}

impl Combatant for Enemy {
    fn name(&self) -> &str {
        &self.name
    }
    fn health(&self) -> i32 {
        self.health
    }
    fn style(&self) -> CombatStyle {
        self.combat_style
    }
    fn agility(&self) -> i32 {
        self.effective_stats().agility
    }
    fn damage_bonus(&self) -> i32 {
        Enemy::damage_bonus(self)
    }
    fn defense_bonus(&self) -> i32 {
        Enemy::defense_bonus(self)
    }
    fn take_damage(&mut self, amount: i32) {
        self.health = (self.health - amount).max(0);
    }
    fn apply_effect(&mut self, effect: StatusEffect) {
        Enemy::apply_effect(self, effect);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    Ongoing,
    /// Rewards already credited to the player.
    Victory { credits: u32, experience: u32 },
    Defeat,
    Escaped,
}

impl CombatOutcome {
    pub fn is_over(&self) -> bool {
        !matches!(self, CombatOutcome::Ongoing)
    }
}

/// Lines produced by one call plus where the fight stands afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub lines: Vec<String>,
    pub outcome: CombatOutcome,
}

#[derive(Clone, Copy)]
enum Side {
    Player,
    Enemy,
}

/// Damage one exchange deals before it is applied.
///
/// Aggressive attackers scale their damage; Defensive defenders scale their
/// defense for this exchange only.
pub fn exchange_damage<A, D>(attacker: &A, defender: &D, settings: &CombatConfig) -> i32
where
    A: Combatant + ?Sized,
    D: Combatant + ?Sized,
{
    let mut base = f64::from(attacker.damage_bonus());
    if attacker.style() == CombatStyle::Aggressive {
        base *= settings.aggressive_multiplier;
    }
    let mut defense = f64::from(defender.defense_bonus());
    if defender.style() == CombatStyle::Defensive {
        defense *= settings.defensive_multiplier;
    }
    (base.round() as i32 - defense.round() as i32).max(0)
}

fn exchange<A, D, R>(
    attacker: &A,
    defender: &mut D,
    settings: &CombatConfig,
    rng: &mut R,
    now: DateTime<Utc>,
    lines: &mut Vec<String>,
) -> i32
where
    A: Combatant + ?Sized,
    D: Combatant + ?Sized,
    R: Rng,
{
    let damage = exchange_damage(attacker, defender, settings);
    defender.take_damage(damage);
    lines.push(format!(
        "{} deals {} damage to {}",
        attacker.name(),
        damage,
        defender.name()
    ));

    if attacker.style() == CombatStyle::Technical
        && defender.health() > 0
        && rng.gen_bool(settings.stun_chance.clamp(0.0, 1.0))
    {
        defender.apply_effect(
            StatusEffect::new(STUNNED, settings.stun_duration_secs, now)
                .with_modifier("agility", settings.stun_agility_penalty),
        );
        lines.push(format!("{} is stunned", defender.name()));
    }
    damage
}

pub struct CombatEngine {
    enemy: Enemy,
    turn: u32,
    log: Vec<String>,
    settings: CombatConfig,
    finished: Option<CombatOutcome>,
}

impl CombatEngine {
    pub fn new(enemy: Enemy, settings: CombatConfig) -> Self {
        Self {
            enemy,
            turn: 0,
            log: Vec::new(),
            settings,
            finished: None,
        }
    }

    pub fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Every line produced so far, oldest first.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn outcome(&self) -> CombatOutcome {
        self.finished.unwrap_or(CombatOutcome::Ongoing)
    }

    /// Play one round: both sides act in agility order until one drops.
    pub fn resolve_round<R: Rng>(
        &mut self,
        player: &mut Character,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> RoundReport {
        if let Some(outcome) = self.finished {
            return RoundReport {
                lines: Vec::new(),
                outcome,
            };
        }
        player.prune_effects(now);
        self.enemy.prune_effects(now);
        self.turn += 1;

        let player_first = Combatant::agility(&*player) >= self.enemy.agility();
        let order = if player_first {
            [Side::Player, Side::Enemy]
        } else {
            [Side::Enemy, Side::Player]
        };
        debug!(
            "round {}: {} acts first",
            self.turn,
            if player_first { &player.name } else { &self.enemy.name }
        );

        let mut lines = Vec::new();
        for side in order {
            if !player.is_alive() || self.enemy.health <= 0 {
                break;
            }
            match side {
                Side::Player => {
                    let dealt = exchange(&*player, &mut self.enemy, &self.settings, rng, now, &mut lines);
                    if dealt > 0 {
                        if let Some(broken) = wear_weapon(player) {
                            lines.push(format!("{} breaks!", broken));
                        }
                    }
                }
                Side::Enemy => {
                    exchange(&self.enemy, player, &self.settings, rng, now, &mut lines);
                }
            }
        }

        let outcome = self.settle(player, rng, &mut lines);
        self.log.extend(lines.iter().cloned());
        RoundReport { lines, outcome }
    }

    /// Player-only escape attempt. On failure the enemy gets a free attack.
    pub fn flee<R: Rng>(
        &mut self,
        player: &mut Character,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> RoundReport {
        if let Some(outcome) = self.finished {
            return RoundReport {
                lines: Vec::new(),
                outcome,
            };
        }
        player.prune_effects(now);
        self.enemy.prune_effects(now);
        self.turn += 1;

        let mut lines = Vec::new();
        if rng.gen_bool(self.settings.flee_chance.clamp(0.0, 1.0)) {
            lines.push(format!("{} escapes from {}", player.name, self.enemy.name));
            info!("{} fled from {}", player.name, self.enemy.name);
            self.finished = Some(CombatOutcome::Escaped);
            self.log.extend(lines.iter().cloned());
            return RoundReport {
                lines,
                outcome: CombatOutcome::Escaped,
            };
        }

        lines.push(format!("{} fails to escape", player.name));
        exchange(&self.enemy, player, &self.settings, rng, now, &mut lines);
        let outcome = self.settle(player, rng, &mut lines);
        self.log.extend(lines.iter().cloned());
        RoundReport { lines, outcome }
    }

    fn settle<R: Rng>(
        &mut self,
        player: &mut Character,
        rng: &mut R,
        lines: &mut Vec<String>,
    ) -> CombatOutcome {
        let outcome = if self.enemy.health <= 0 {
            let (lo, hi) = if self.settings.reward_min <= self.settings.reward_max {
                (self.settings.reward_min, self.settings.reward_max)
            } else {
                (self.settings.reward_max, self.settings.reward_min)
            };
            let credits = rng.gen_range(lo..=hi);
            let experience = self
                .enemy
                .level
                .saturating_mul(self.settings.experience_per_level);
            player.credits = player.credits.saturating_add(credits);
            player.experience = player.experience.saturating_add(experience);
            lines.push(format!(
                "{} is defeated (+{} credits, +{} XP)",
                self.enemy.name, credits, experience
            ));
            info!("{} defeated {}", player.name, self.enemy.name);
            CombatOutcome::Victory {
                credits,
                experience,
            }
        } else if !player.is_alive() {
            lines.push(format!("{} has fallen", player.name));
            info!("{} was killed by {}", player.name, self.enemy.name);
            CombatOutcome::Defeat
        } else {
            CombatOutcome::Ongoing
        };
        if outcome.is_over() {
            self.finished = Some(outcome);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::{EnemyTemplate, Item, ItemType, Stats};
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2077, 7, 7, 7, 0, 0).unwrap()
    }

    fn bruiser() -> Character {
        Character::new("Kade")
            .with_stats(Stats::new(14, 12, 10, 10))
            .with_style(CombatStyle::Aggressive)
    }

    fn scav(health: i32) -> Enemy {
        Enemy::from_template(&EnemyTemplate::new("Scav", 2, Stats::new(10, 8, 10, 10), health))
    }

    #[test]
    fn aggressive_strength_14_deals_3_to_agility_8() {
        let mut player = bruiser();
        let mut engine = CombatEngine::new(scav(9), CombatConfig::default());
        let mut rng = StdRng::seed_from_u64(1);

        let r1 = engine.resolve_round(&mut player, &mut rng, now());
        assert_eq!(r1.lines[0], "Kade deals 3 damage to Scav");
        assert_eq!(engine.enemy().health, 6);
        assert_eq!(r1.outcome, CombatOutcome::Ongoing);

        engine.resolve_round(&mut player, &mut rng, now());
        assert_eq!(engine.enemy().health, 3);

        let r3 = engine.resolve_round(&mut player, &mut rng, now());
        assert_eq!(engine.enemy().health, 0);
        match r3.outcome {
            CombatOutcome::Victory {
                credits,
                experience,
            } => {
                let cfg = CombatConfig::default();
                assert!(credits >= cfg.reward_min && credits <= cfg.reward_max);
                assert_eq!(experience, 2 * cfg.experience_per_level);
                assert_eq!(player.credits, credits);
            }
            other => panic!("expected victory, got {:?}", other),
        }
        // Enemy never acted in the final round.
        assert_eq!(r3.lines.len(), 2);
        assert_eq!(player.health, player.max_health);
    }

    #[test]
    fn victory_experience_saturates_for_huge_levels() {
        let mut player = bruiser();
        let mut foe = scav(1);
        foe.level = u32::MAX;
        let mut engine = CombatEngine::new(foe, CombatConfig::default());
        let mut rng = StdRng::seed_from_u64(3);
        let report = engine.resolve_round(&mut player, &mut rng, now());
        assert!(matches!(
            report.outcome,
            CombatOutcome::Victory {
                experience: u32::MAX,
                ..
            }
        ));
        assert_eq!(player.experience, u32::MAX);
    }

    #[test]
    fn finished_combat_is_inert() {
        let mut player = bruiser();
        let mut engine = CombatEngine::new(scav(3), CombatConfig::default());
        let mut rng = StdRng::seed_from_u64(2);
        let first = engine.resolve_round(&mut player, &mut rng, now());
        assert!(first.outcome.is_over());
        let credits = player.credits;
        let again = engine.resolve_round(&mut player, &mut rng, now());
        assert!(again.lines.is_empty());
        assert_eq!(again.outcome, first.outcome);
        assert_eq!(player.credits, credits);
    }

    #[test]
    fn faster_enemy_acts_first_and_ties_favour_player() {
        let mut player = Character::new("Slow").with_stats(Stats::new(12, 8, 10, 10));
        let fast = EnemyTemplate::new("Fast", 1, Stats::new(12, 14, 10, 10), 50);
        let mut engine = CombatEngine::new(Enemy::from_template(&fast), CombatConfig::default());
        let mut rng = StdRng::seed_from_u64(3);
        let report = engine.resolve_round(&mut player, &mut rng, now());
        assert!(report.lines[0].starts_with("Fast deals"));

        let mut even = Character::new("Even").with_stats(Stats::new(12, 14, 10, 10));
        let mut engine = CombatEngine::new(Enemy::from_template(&fast), CombatConfig::default());
        let report = engine.resolve_round(&mut even, &mut rng, now());
        assert!(report.lines[0].starts_with("Even deals"));
    }

    #[test]
    fn defensive_defender_boosts_defense_for_the_exchange() {
        let settings = CombatConfig::default();
        let attacker = Character::new("A")
            .with_stats(Stats::new(20, 10, 10, 10))
            .with_style(CombatStyle::Technical);
        let mut defender = Character::new("D").with_stats(Stats::new(10, 18, 10, 10));
        // damage 5 vs defense 4
        assert_eq!(exchange_damage(&attacker, &defender, &settings), 1);
        defender.combat_style = CombatStyle::Defensive;
        // defense 4 * 1.2 = 4.8 -> 5
        assert_eq!(exchange_damage(&attacker, &defender, &settings), 0);
        // nothing persisted
        assert_eq!(defender.defense_bonus(), 4);
    }

    #[test]
    fn negative_damage_floors_at_zero() {
        let weak = Character::new("W").with_stats(Stats::new(6, 10, 10, 10));
        let tank = Character::new("T").with_stats(Stats::new(10, 16, 10, 10));
        assert_eq!(exchange_damage(&weak, &tank, &CombatConfig::default()), 0);
    }

    #[test]
    fn technical_stun_always_with_chance_one() {
        let settings = CombatConfig {
            stun_chance: 1.0,
            ..CombatConfig::default()
        };
        let mut player = Character::new("Tech")
            .with_stats(Stats::new(12, 12, 10, 10))
            .with_style(CombatStyle::Technical);
        let mut engine = CombatEngine::new(scav(40), settings);
        let mut rng = StdRng::seed_from_u64(4);
        let report = engine.resolve_round(&mut player, &mut rng, now());
        assert!(report.lines.contains(&"Scav is stunned".to_string()));
        let stunned = &engine.enemy().status_effects[0];
        assert_eq!(stunned.name, STUNNED);
        assert_eq!(stunned.duration_secs, 2);
        assert_eq!(engine.enemy().agility(), 6);

        // Expired by the next round two seconds later (and re-applied by the new hit).
        engine.resolve_round(&mut player, &mut rng, now() + Duration::seconds(2));
        assert_eq!(engine.enemy().status_effects.len(), 1);
        assert_eq!(engine.enemy().status_effects[0].started_at, now() + Duration::seconds(2));
    }

    #[test]
    fn seeded_rounds_are_reproducible() {
        fn run(seed: u64) -> (Vec<String>, i32, i32) {
            let mut player = Character::new("Tech")
                .with_stats(Stats::new(13, 11, 10, 10))
                .with_style(CombatStyle::Technical);
            let foe = EnemyTemplate::new("Hacker", 3, Stats::new(13, 11, 10, 10), 30)
                .with_style(CombatStyle::Technical);
            let mut engine = CombatEngine::new(Enemy::from_template(&foe), CombatConfig::default());
            let mut rng = StdRng::seed_from_u64(seed);
            for i in 0..6 {
                engine.resolve_round(&mut player, &mut rng, now() + Duration::seconds(i));
            }
            (engine.log().to_vec(), player.health, engine.enemy().health)
        }
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn flee_success_and_failure() {
        let always = CombatConfig {
            flee_chance: 1.0,
            ..CombatConfig::default()
        };
        let mut player = bruiser();
        let mut engine = CombatEngine::new(scav(20), always);
        let mut rng = StdRng::seed_from_u64(5);
        let report = engine.flee(&mut player, &mut rng, now());
        assert_eq!(report.outcome, CombatOutcome::Escaped);

        let never = CombatConfig {
            flee_chance: 0.0,
            ..CombatConfig::default()
        };
        let brute = EnemyTemplate::new("Brute", 1, Stats::new(18, 10, 10, 10), 20);
        let mut player = Character::new("Kade").with_stats(Stats::new(10, 10, 10, 10));
        let mut engine = CombatEngine::new(Enemy::from_template(&brute), never);
        let report = engine.flee(&mut player, &mut rng, now());
        assert_eq!(report.outcome, CombatOutcome::Ongoing);
        assert_eq!(report.lines[0], "Kade fails to escape");
        // 4 * 1.2 = 4.8 -> 5 damage, defense 0
        assert_eq!(report.lines[1], "Brute deals 5 damage to Kade");
        assert_eq!(player.health, 95);
        assert_eq!(engine.enemy().health, 20);
    }

    #[test]
    fn defeat_when_player_drops() {
        let brute = EnemyTemplate::new("Brute", 1, Stats::new(30, 20, 10, 10), 500);
        let mut player = Character::new("Kade");
        player.health = 5;
        let mut engine = CombatEngine::new(Enemy::from_template(&brute), CombatConfig::default());
        let mut rng = StdRng::seed_from_u64(6);
        let report = engine.resolve_round(&mut player, &mut rng, now());
        assert_eq!(report.outcome, CombatOutcome::Defeat);
        assert_eq!(player.health, 0);
        assert_eq!(report.lines.last().unwrap(), "Kade has fallen");
    }

    #[test]
    fn landed_hits_wear_the_weapon() {
        let mut player = bruiser();
        player
            .equipped
            .insert("weapon".into(), Item::new("Shiv", ItemType::Weapon).with_durability(1));
        let mut engine = CombatEngine::new(scav(40), CombatConfig::default());
        let mut rng = StdRng::seed_from_u64(7);
        let report = engine.resolve_round(&mut player, &mut rng, now());
        assert!(report.lines.contains(&"Shiv breaks!".to_string()));
        assert!(player.equipped.is_empty());
    }
}
