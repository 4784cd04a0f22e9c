//! Chat command grammar and dispatch.
//!
//! A message starting with `!` is a command; anything else is speech.
//! A recognised command other than `!help` also clears the speaker's
//! bubble. Unknown or incomplete commands do nothing at all.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use super::behavior::MoveOrder;
use crate::data::{skin_file, AssetLookup};
use crate::shared::*;

/// Either a random pick or a named asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick {
    Random,
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Gif(Pick),
    Move(MoveOrder),
    Skin(Pick),
    Help,
}

fn pick(arg: &str) -> Pick {
    if arg == "random" {
        Pick::Random
    } else {
        Pick::Named(arg.to_string())
    }
}

/// Parse a `!` command. `None` for plain speech and for anything outside
/// the grammar.
pub fn parse_command(message: &str) -> Option<ChatCommand> {
    let body = message.strip_prefix('!')?;
    let mut words = body.split_whitespace();
    let verb = words.next()?;
    let arg = words.next();

    match (verb, arg) {
        ("gif", Some(arg)) => Some(ChatCommand::Gif(pick(arg))),
        ("mover", Some("izquierda")) => Some(ChatCommand::Move(MoveOrder::Left)),
        ("mover", Some("derecha")) => Some(ChatCommand::Move(MoveOrder::Right)),
        ("mover", Some("parado")) => Some(ChatCommand::Move(MoveOrder::Stop)),
        ("mover", Some(target)) => Some(ChatCommand::Move(MoveOrder::Follow(target.to_string()))),
        ("skin", Some(arg)) => Some(ChatCommand::Skin(pick(arg))),
        ("skinrandom", None) => Some(ChatCommand::Skin(Pick::Random)),
        ("help", None) => Some(ChatCommand::Help),
        _ => None,
    }
}

/// Apply one chat message to its speaker's character.
pub fn handle_message(
    character: &mut Character,
    message: &str,
    now: f64,
    assets: &mut impl AssetLookup,
    rng: &mut impl Rng,
) {
    if !message.starts_with('!') {
        character.say(message, now);
        return;
    }
    let Some(command) = parse_command(message) else {
        debug!("[Command] Ignoring '{}' from '{}'", message, character.name);
        return;
    };
    debug!("[Command] '{}' -> {:?}", character.name, command);

    match command {
        ChatCommand::Gif(choice) => start_overlay(character, choice, now, assets, rng),
        ChatCommand::Move(order) => character.order_move(order, now),
        ChatCommand::Skin(choice) => change_skin(character, choice, assets, rng),
        ChatCommand::Help => {
            character.speech = Speech::Help;
            return;
        }
    }
    character.hush();
}

fn start_overlay(
    character: &mut Character,
    choice: Pick,
    now: f64,
    assets: &mut impl AssetLookup,
    rng: &mut impl Rng,
) {
    let name = match choice {
        Pick::Named(name) => name,
        Pick::Random => match assets.overlay_names().choose(rng) {
            Some(name) => name.clone(),
            None => return,
        },
    };
    if let Some(frame_count) = assets.load_overlay(&name) {
        character.overlay = Some(Overlay::new(name, frame_count, now));
    }
}

fn change_skin(
    character: &mut Character,
    choice: Pick,
    assets: &mut impl AssetLookup,
    rng: &mut impl Rng,
) {
    match choice {
        Pick::Named(name) => {
            let Some(file) = skin_file(&name) else {
                debug!("[Command] Rejected skin name '{}'", name);
                return;
            };
            if assets.skin_exists(&file) {
                character.skin = Some(file);
            }
        }
        Pick::Random => {
            let pool = assets.sprite_pool();
            let current = character.skin.as_deref();
            let others: Vec<&String> = pool
                .iter()
                .filter(|s| Some(s.as_str()) != current)
                .collect();
            let chosen = if others.is_empty() {
                pool.choose(rng)
            } else {
                others.choose(rng).copied()
            };
            if let Some(file) = chosen {
                character.skin = Some(file.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StubAssets;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixture() -> (Character, StubAssets, StdRng) {
        let mut rng = StdRng::seed_from_u64(11);
        let assets = StubAssets::with_sprites(&["sprite_a.png", "sprite_b.png", "sprite_c.png"])
            .with_overlay("party", 4);
        let mut c = Character::spawn("alice", 0, 0.0, &assets.sprites, &mut rng);
        c.locomotion = Locomotion::Stopped;
        c.next_change_at = 3.0;
        (c, assets, rng)
    }

    #[test]
    fn test_parse_grammar() {
        assert_eq!(parse_command("!gif random"), Some(ChatCommand::Gif(Pick::Random)));
        assert_eq!(
            parse_command("!gif party"),
            Some(ChatCommand::Gif(Pick::Named("party".into())))
        );
        assert_eq!(
            parse_command("!mover izquierda"),
            Some(ChatCommand::Move(MoveOrder::Left))
        );
        assert_eq!(parse_command("!mover derecha"), Some(ChatCommand::Move(MoveOrder::Right)));
        assert_eq!(parse_command("!mover parado"), Some(ChatCommand::Move(MoveOrder::Stop)));
        assert_eq!(
            parse_command("!mover bob"),
            Some(ChatCommand::Move(MoveOrder::Follow("bob".into())))
        );
        assert_eq!(parse_command("!skin random"), Some(ChatCommand::Skin(Pick::Random)));
        assert_eq!(parse_command("!skinrandom"), Some(ChatCommand::Skin(Pick::Random)));
        assert_eq!(parse_command("!help"), Some(ChatCommand::Help));
    }

    #[test]
    fn test_parse_rejects_outside_grammar() {
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command("!frobnicate"), None);
        assert_eq!(parse_command("!gif"), None);
        assert_eq!(parse_command("!mover"), None);
        assert_eq!(parse_command("!Help"), None, "Commands are case-sensitive");
        assert_eq!(parse_command("!help me"), None);
        assert_eq!(parse_command("!"), None);
    }

    #[test]
    fn test_mover_izquierda_forces_left_for_override() {
        let (mut c, mut assets, mut rng) = fixture();
        handle_message(&mut c, "!mover izquierda", 5.0, &mut assets, &mut rng);
        assert_eq!(c.locomotion, Locomotion::Left);
        assert!(c.next_change_at >= 5.0 + MOVE_OVERRIDE_SECS);
    }

    #[test]
    fn test_mover_name_follows_with_longer_override() {
        let (mut c, mut assets, mut rng) = fixture();
        handle_message(&mut c, "!mover bob", 5.0, &mut assets, &mut rng);
        assert_eq!(c.locomotion, Locomotion::FollowTarget);
        assert_eq!(c.follow.as_deref(), Some("bob"));
        assert_eq!(c.next_change_at, 5.0 + FOLLOW_OVERRIDE_SECS);
    }

    #[test]
    fn test_unknown_command_changes_nothing() {
        let (mut c, mut assets, mut rng) = fixture();
        c.say("previous", 1.0);
        let before = c.clone();

        handle_message(&mut c, "!frobnicate", 2.0, &mut assets, &mut rng);

        assert_eq!(c.speech, before.speech);
        assert_eq!(c.locomotion, before.locomotion);
        assert_eq!(c.next_change_at, before.next_change_at);
        assert_eq!(c.skin, before.skin);
        assert!(c.overlay.is_none());
    }

    #[test]
    fn test_recognised_command_clears_bubble() {
        let (mut c, mut assets, mut rng) = fixture();
        handle_message(&mut c, "hola", 1.0, &mut assets, &mut rng);
        c.bubble = Rect::new(0.0, 0.0, 40.0, 20.0);

        handle_message(&mut c, "!mover izquierda", 2.0, &mut assets, &mut rng);
        assert_eq!(c.speech, Speech::Silent);
        assert_eq!(c.bubble, Rect::default());
        assert_eq!(c.speech.display_text(), None);
    }

    #[test]
    fn test_command_after_help_clears_help() {
        let (mut c, mut assets, mut rng) = fixture();
        handle_message(&mut c, "!help", 1.0, &mut assets, &mut rng);
        handle_message(&mut c, "!gif party", 2.0, &mut assets, &mut rng);
        assert_eq!(c.speech, Speech::Silent);
        assert!(c.overlay.is_some());
    }

    #[test]
    fn test_skin_name_with_path_is_ignored() {
        let (mut c, mut assets, mut rng) = fixture();
        let before = c.skin.clone();
        handle_message(&mut c, "!skin ../a", 1.0, &mut assets, &mut rng);
        assert_eq!(c.skin, before);
    }

    #[test]
    fn test_plain_message_is_speech_and_replaces_help() {
        let (mut c, mut assets, mut rng) = fixture();
        handle_message(&mut c, "!help", 1.0, &mut assets, &mut rng);
        assert_eq!(c.speech, Speech::Help);
        assert_eq!(c.speech.display_text(), Some(HELP_TEXT));

        handle_message(&mut c, "hola a todos", 2.0, &mut assets, &mut rng);
        assert_eq!(
            c.speech,
            Speech::Said {
                text: "hola a todos".into(),
                since: 2.0
            }
        );
    }

    #[test]
    fn test_skin_random_picks_a_different_sprite() {
        let (mut c, mut assets, mut rng) = fixture();
        for _ in 0..20 {
            let before = c.skin.clone();
            handle_message(&mut c, "!skin random", 1.0, &mut assets, &mut rng);
            assert_ne!(c.skin, before);
            assert!(c.skin.is_some());
        }
    }

    #[test]
    fn test_skin_random_with_single_sprite_keeps_it() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut assets = StubAssets::with_sprites(&["only.png"]);
        let mut c = Character::spawn("solo", 0, 0.0, &assets.sprites, &mut rng);
        handle_message(&mut c, "!skin random", 1.0, &mut assets, &mut rng);
        assert_eq!(c.skin.as_deref(), Some("only.png"));
    }

    #[test]
    fn test_skin_by_name_only_when_present() {
        let (mut c, mut assets, mut rng) = fixture();
        handle_message(&mut c, "!skin b", 1.0, &mut assets, &mut rng);
        assert_eq!(c.skin.as_deref(), Some("sprite_b.png"));

        handle_message(&mut c, "!skin dragon", 1.0, &mut assets, &mut rng);
        assert_eq!(c.skin.as_deref(), Some("sprite_b.png"), "Missing skin is a no-op");
    }

    #[test]
    fn test_gif_starts_overlay_or_noops() {
        let (mut c, mut assets, mut rng) = fixture();
        handle_message(&mut c, "!gif missing", 1.0, &mut assets, &mut rng);
        assert!(c.overlay.is_none());

        handle_message(&mut c, "!gif party", 2.0, &mut assets, &mut rng);
        let overlay = c.overlay.as_ref().expect("overlay should start");
        assert_eq!(overlay.clip, "party");
        assert_eq!(overlay.frame_count, 4);
        assert_eq!(overlay.started_at, 2.0);
    }

    #[test]
    fn test_gif_random_uses_overlay_directory() {
        let (mut c, mut assets, mut rng) = fixture();
        handle_message(&mut c, "!gif random", 1.0, &mut assets, &mut rng);
        assert_eq!(c.overlay.as_ref().map(|o| o.clip.as_str()), Some("party"));

        let mut empty = StubAssets::default();
        let (mut d, _, _) = fixture();
        handle_message(&mut d, "!gif random", 1.0, &mut empty, &mut rng);
        assert!(d.overlay.is_none());
    }
}
