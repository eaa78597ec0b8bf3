//! End-to-end play through the built-in world: quests, exploring, crafting,
//! equipment and the shop.
mod common;

use common::{quiet_config, run, session};
use tempfile::TempDir;
use wasteland::game::{ActionError, CommandStatus, GameMode, QuestState};

#[test]
fn salvage_run_to_crafted_rifle() {
    let tmp = TempDir::new().unwrap();
    let mut s = session("Kade", quiet_config(tmp.path()));

    run(&mut s, &["start", "quests", "accept Salvage Run", "back", "go Scrap Yard"]);
    assert_eq!(s.world().current_name(), Some("Scrap Yard"));

    let out = run(&mut s, &["explore", "explore"]);
    assert!(out.contains(&"Quest complete: Salvage Run".to_string()));
    assert!(matches!(
        s.quests().get("Salvage Run").unwrap().state,
        QuestState::Completed { .. }
    ));
    assert_eq!(s.character().credits, 25 + 50);
    assert_eq!(s.character().experience, 50);

    run(&mut s, &["explore"]);
    assert_eq!(s.character().item_count("Scrap Metal"), 2);
    assert!(s.character().has_item("Circuit Board"));
    assert_eq!(s.character().energy, 20);

    // The yard is picked clean now.
    let out = run(&mut s, &["explore"]);
    assert!(out[0].contains("nothing"));

    run(&mut s, &["craft", "craft Pipe Rifle", "back"]);
    assert!(s.character().has_item("Pipe Rifle"));
    assert!(!s.character().has_item("Scrap Metal"));
    assert_eq!(s.character().energy, 0);

    run(&mut s, &["inventory", "equip Pipe Rifle"]);
    assert_eq!(s.character().equipped["weapon"].name, "Pipe Rifle");
    assert_eq!(s.character().damage_bonus(), 2);
}

#[test]
fn shopping_at_the_market() {
    let tmp = TempDir::new().unwrap();
    let mut s = session("Kade", quiet_config(tmp.path()));
    run(&mut s, &["start", "shop", "buy Stim"]);
    assert_eq!(s.character().credits, 0);

    let report = s.handle_line("buy Stim");
    assert!(matches!(
        report.status,
        CommandStatus::Failed(ActionError::InsufficientResource { resource: "credits", .. })
    ));

    run(&mut s, &["sell Stim"]);
    assert_eq!(s.character().credits, 12);
    assert_eq!(s.mode(), GameMode::Shop);
    run(&mut s, &["back"]);
    assert_eq!(s.mode(), GameMode::Exploring);
}

#[test]
fn keycard_door_and_one_way_exit() {
    let tmp = TempDir::new().unwrap();
    let mut s = session("Kade", quiet_config(tmp.path()));
    run(&mut s, &["start", "go Undercity"]);

    let report = s.handle_line("go Corp Vault");
    assert_eq!(
        report.status,
        CommandStatus::Failed(ActionError::Locked("Corp Vault".into()))
    );

    run(&mut s, &["explore", "go Corp Vault"]);
    assert!(s.character().has_item("Keycard"));
    assert_eq!(s.world().current_name(), Some("Corp Vault"));

    let report = s.handle_line("go Rust Market");
    assert!(matches!(
        report.status,
        CommandStatus::Failed(ActionError::NoRoute { .. })
    ));
}

#[test]
fn illegal_commands_change_nothing() {
    let tmp = TempDir::new().unwrap();
    let mut s = session("Kade", quiet_config(tmp.path()));
    run(&mut s, &["start", "inventory"]);
    let before = s.character().clone();

    for line in ["attack", "explore", "buy Stim", "accept Salvage Run", "dance"] {
        let report = s.handle_line(line);
        assert_eq!(report.status, CommandStatus::Illegal, "{}", line);
        assert_eq!(report.mode, GameMode::Inventory);
        assert!(!report.save_requested);
    }
    assert_eq!(s.character(), &before);
}

#[test]
fn consumables_and_rest() {
    let tmp = TempDir::new().unwrap();
    let mut s = session("Kade", quiet_config(tmp.path()));
    run(&mut s, &["start", "shop", "buy Stim", "back"]);
    s.character_mut().health = 40;
    s.character_mut().energy = 10;

    run(&mut s, &["inventory", "use Stim", "back"]);
    assert_eq!(s.character().health, 70);
    assert!(!s.character().has_item("Stim"));

    run(&mut s, &["rest"]);
    assert_eq!(s.character().health, 95);
    assert_eq!(s.character().energy, 30);
}
