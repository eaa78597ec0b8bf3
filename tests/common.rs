//! Test utilities & fixtures shared by the integration tests.

use chrono::{DateTime, TimeZone, Utc};
use std::path::Path;
use wasteland::config::Config;
use wasteland::game::{ManualClock, Session, Templates};

/// Fixed start instant for every test clock.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2077, 11, 2, 8, 0, 0).unwrap()
}

/// Seeded config that never rolls encounters and saves under `save_dir`.
pub fn quiet_config(save_dir: &Path) -> Config {
    let mut config = Config::default();
    config.game.rng_seed = Some(7);
    config.game.encounter_chance_per_danger = 0.0;
    config.storage.save_dir = save_dir.to_string_lossy().into_owned();
    config
}

/// Seeded config where every explore at danger > 0 is an encounter.
#[allow(dead_code)] // not every test binary fights
pub fn hostile_config(save_dir: &Path) -> Config {
    let mut config = quiet_config(save_dir);
    config.game.encounter_chance_per_danger = 1.0;
    config.game.max_encounter_chance = 1.0;
    config
}

/// New game on the built-in templates with a manual clock at [`t0`].
pub fn session(name: &str, config: Config) -> Session<ManualClock> {
    Session::new_game(name, Templates::default(), config, ManualClock::new(t0()))
}

/// Run each line, asserting it was applied.
#[allow(dead_code)]
pub fn run(session: &mut Session<ManualClock>, lines: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    for line in lines {
        let report = session.handle_line(line);
        assert!(report.is_applied(), "'{}' failed: {:?}", line, report);
        out.extend(report.lines);
    }
    out
}
