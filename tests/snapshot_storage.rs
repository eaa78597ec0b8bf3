//! Snapshot save/resume through the filesystem.
mod common;

use common::{quiet_config, run, session, t0};
use tempfile::TempDir;
use wasteland::game::{
    list_snapshots, load_latest, write_snapshot, GameMode, ManualClock, QuestState, Session,
    StoreError, Templates,
};

#[test]
fn resume_restores_character_quests_and_location() {
    let tmp = TempDir::new().unwrap();
    let config = quiet_config(tmp.path());
    let mut s = session("Kade", config.clone());
    run(&mut s, &["start", "quests", "accept Salvage Run", "back", "go Scrap Yard", "explore"]);
    let report = s.handle_line("save");
    assert!(report.save_requested);

    let path = write_snapshot(tmp.path(), &s.snapshot()).unwrap();
    assert!(path.exists());

    let snapshot = load_latest(tmp.path(), "Kade").unwrap();
    assert_eq!(snapshot.timestamp, t0());
    assert_eq!(snapshot.location.as_deref(), Some("Scrap Yard"));

    let mut resumed = Session::from_snapshot(
        snapshot,
        Templates::default(),
        config,
        ManualClock::new(t0()),
    );
    assert_eq!(resumed.id(), s.id());
    assert_eq!(resumed.character(), s.character());
    assert_eq!(resumed.quests(), s.quests());
    assert_eq!(resumed.mode(), GameMode::MainMenu);

    run(&mut resumed, &["start"]);
    assert_eq!(resumed.world().current_name(), Some("Scrap Yard"));
    let quest = resumed.quests().get("Salvage Run").unwrap();
    assert!(matches!(quest.state, QuestState::InProgress { .. }));
    assert_eq!(quest.objectives[0].current_amount, 1);
}

#[test]
fn saves_accumulate_and_latest_wins() {
    let tmp = TempDir::new().unwrap();
    let mut s = session("Kade", quiet_config(tmp.path()));
    run(&mut s, &["start"]);
    write_snapshot(tmp.path(), &s.snapshot()).unwrap();

    s.character_mut().credits = 999;
    // Same clock instant: must not overwrite the first save.
    write_snapshot(tmp.path(), &s.snapshot()).unwrap();
    s.clock().advance(5);
    s.character_mut().credits = 1234;
    write_snapshot(tmp.path(), &s.snapshot()).unwrap();

    assert_eq!(list_snapshots(tmp.path(), "Kade").unwrap().len(), 3);
    assert_eq!(load_latest(tmp.path(), "Kade").unwrap().character.credits, 1234);
}

#[test]
fn dying_requests_a_final_save() {
    let tmp = TempDir::new().unwrap();
    let mut config = common::hostile_config(tmp.path());
    config.combat.flee_chance = 0.0;
    let mut templates = Templates::default();
    templates.enemies = vec![wasteland::game::EnemyTemplate::new(
        "Titan",
        9,
        wasteland::game::Stats::new(40, 30, 10, 10),
        999,
    )];
    let mut s = Session::new_game("Kade", templates, config, ManualClock::new(t0()));
    run(&mut s, &["start", "go Scrap Yard", "explore"]);
    s.character_mut().health = 5;

    let report = s.handle_line("flee");
    assert_eq!(report.mode, GameMode::Dying);
    assert!(report.save_requested);
    let path = write_snapshot(tmp.path(), &s.snapshot()).unwrap();
    let saved = wasteland::game::load_snapshot(&path).unwrap();
    assert_eq!(saved.character.health, 0);
}

#[test]
fn other_characters_are_not_mixed_in() {
    let tmp = TempDir::new().unwrap();
    let a = session("Kade", quiet_config(tmp.path()));
    let b = session("Kade Jr", quiet_config(tmp.path()));
    write_snapshot(tmp.path(), &a.snapshot()).unwrap();
    write_snapshot(tmp.path(), &b.snapshot()).unwrap();
    assert_eq!(list_snapshots(tmp.path(), "Kade").unwrap().len(), 1);
    assert!(matches!(
        load_latest(tmp.path(), "Nobody"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn quitting_twice_leaves_nothing_new_to_save() {
    let tmp = TempDir::new().unwrap();
    let mut s = session("Kade", quiet_config(tmp.path()));
    run(&mut s, &["start", "go Scrap Yard"]);

    let report = s.handle_line("quit");
    assert!(report.save_requested);
    assert_eq!(report.mode, GameMode::MainMenu);
    let saved = s.snapshot();
    write_snapshot(tmp.path(), &saved).unwrap();

    s.clock().advance(3);
    let report = s.handle_line("quit");
    assert_eq!(report.mode, GameMode::MainMenu);
    assert!(s.snapshot().same_state(&saved));

    s.character_mut().credits += 5;
    assert!(!s.snapshot().same_state(&saved));
}
