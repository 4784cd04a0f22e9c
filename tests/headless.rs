//! Headless integration tests for the chat stage.
//!
//! These tests exercise the simulation systems without a window or GPU.
//! They use Bevy's `MinimalPlugins`, register only the log, roster, and
//! layout systems (skipping all drawing), and drive `FixedUpdate` by hand
//! so each call is exactly one simulation frame.
//!
//! Run with: `cargo test --test headless`

use bevy::prelude::*;
use chatfolk::chatlog::{parse_log, ChatLog};
use chatfolk::data::AssetCatalog;
use chatfolk::npcs::{ingest_chat_records, update_characters, Roster};
use chatfolk::settings::LogEncoding;
use chatfolk::shared::*;
use chatfolk::ui::layout_speech_bubbles;
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

struct Scratch {
    root: PathBuf,
    log: PathBuf,
}

impl Scratch {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("chatfolk_{}_{}", name, std::process::id()));
        let sprites = root.join("sprites");
        fs::create_dir_all(&sprites).unwrap();
        fs::create_dir_all(root.join("sprites_objetos")).unwrap();
        for file in ["sprite_a.png", "sprite_b.png", "sprite_c.png", "sprite_d.png"] {
            fs::write(sprites.join(file), b"png").unwrap();
        }
        let log = root.join("historial.txt");
        fs::write(&log, "").unwrap();
        Self { root, log }
    }

    fn append(&self, line: &str) {
        append_line(&self.log, line);
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.root).ok();
    }
}

fn append_line(path: &Path, line: &str) {
    let mut text = fs::read_to_string(path).unwrap();
    text.push_str(line);
    fs::write(path, text).unwrap();
}

/// Builds a minimal app with the simulation resources and the three
/// frame steps, but NO rendering, windowing, or asset server.
fn build_test_app(scratch: &Scratch, capacity: usize) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);

    app.init_resource::<Assets<Image>>()
        .insert_resource(ChatLog::new(&scratch.log, LogEncoding::Utf8))
        .insert_resource(Roster::with_capacity(capacity))
        .insert_resource(ChatRng::seeded(42))
        .insert_resource(AssetCatalog::scan(
            scratch.root.join("sprites"),
            scratch.root.join("sprites_objetos"),
        ));

    app.configure_sets(
        FixedUpdate,
        (FrameStep::Ingest, FrameStep::Behave, FrameStep::Layout).chain(),
    );
    app.add_systems(FixedUpdate, ingest_chat_records.in_set(FrameStep::Ingest));
    app.add_systems(FixedUpdate, update_characters.in_set(FrameStep::Behave));
    app.add_systems(FixedUpdate, layout_speech_bubbles.in_set(FrameStep::Layout));
    app
}

/// Runs exactly one simulation frame.
fn frame(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

fn roster(app: &App) -> &Roster {
    app.world().resource::<Roster>()
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_alice_and_bob_scenario() {
    let scratch = Scratch::new("scenario");
    let mut app = build_test_app(&scratch, 50);

    scratch.append("alice: hello\n");
    frame(&mut app);
    let initial_skin = roster(&app).get("alice").unwrap().skin.clone();
    assert!(initial_skin.is_some(), "Alice should start with a pool sprite");

    scratch.append("alice: !skin random\n");
    frame(&mut app);

    scratch.append("bob: !mover alice\n");
    frame(&mut app);

    let roster = roster(&app);
    assert_eq!(roster.len(), 2);
    let names: Vec<&str> = roster.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);

    let alice = roster.get("alice").unwrap();
    assert_ne!(alice.skin, initial_skin, "Random skin avoids the current one");
    assert_eq!(alice.speech, Speech::Silent, "A command clears the earlier bubble");
    assert!(alice.bubble.is_empty());

    let bob = roster.get("bob").unwrap();
    assert_eq!(bob.locomotion, Locomotion::FollowTarget);
    assert_eq!(bob.follow.as_deref(), Some("alice"));
}

#[test]
fn test_population_cap_evicts_oldest() {
    let scratch = Scratch::new("cap");
    let mut app = build_test_app(&scratch, 3);

    for name in ["ana", "beto", "caro"] {
        scratch.append(&format!("{}: hola\n", name));
        frame(&mut app);
    }
    assert_eq!(roster(&app).len(), 3);

    scratch.append("dani: hola\n");
    frame(&mut app);

    let roster = roster(&app);
    assert_eq!(roster.len(), 3);
    assert!(!roster.contains("ana"), "First admitted speaker should be evicted");
    assert!(roster.contains("dani"));
}

#[test]
fn test_malformed_lines_and_missing_assets_are_harmless() {
    let scratch = Scratch::new("harmless");
    let mut app = build_test_app(&scratch, 50);

    scratch.append("no separator\n");
    scratch.append("carol: !gif nothing_here\n");
    scratch.append("carol: !skin dragon\n");
    scratch.append("carol: !frobnicate\n");
    frame(&mut app);

    let roster = roster(&app);
    assert_eq!(roster.len(), 1);
    let carol = roster.get("carol").unwrap();
    assert!(carol.overlay.is_none());
    assert_eq!(carol.speech, Speech::Silent);
}

#[test]
fn test_command_clears_bubble_but_unknown_command_does_not() {
    let scratch = Scratch::new("hush");
    let mut app = build_test_app(&scratch, 50);

    scratch.append("alice: hola\n");
    scratch.append("bob: hola\n");
    frame(&mut app);
    assert!(!roster(&app).get("alice").unwrap().bubble.is_empty());

    scratch.append("alice: !mover izquierda\n");
    scratch.append("bob: !frobnicate\n");
    frame(&mut app);

    let roster = roster(&app);
    let alice = roster.get("alice").unwrap();
    assert_eq!(alice.speech, Speech::Silent);
    assert!(alice.bubble.is_empty());
    let bob = roster.get("bob").unwrap();
    assert_eq!(bob.speech.display_text(), Some("hola"));
    assert!(!bob.bubble.is_empty());
}

#[test]
fn test_speakers_get_bubbles_after_a_frame() {
    let scratch = Scratch::new("bubbles");
    let mut app = build_test_app(&scratch, 50);

    scratch.append("alice: primera\n");
    scratch.append("bob: segunda\n");
    frame(&mut app);

    for character in roster(&app).iter() {
        assert!(
            !character.bubble.is_empty(),
            "{} should have a laid-out bubble",
            character.name
        );
    }
}

#[test]
fn test_records_are_consumed_once() {
    let scratch = Scratch::new("once");
    let mut app = build_test_app(&scratch, 50);

    scratch.append("alice: uno\n");
    frame(&mut app);
    frame(&mut app);
    frame(&mut app);

    let log = app.world().resource::<ChatLog>();
    assert_eq!(log.cursor, 1);
    assert_eq!(parse_log(&fs::read_to_string(&scratch.log).unwrap()).len(), 1);
}
