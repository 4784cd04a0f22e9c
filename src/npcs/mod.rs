//! Character domain plugin.
//!
//! Owns the roster: admits speakers from new chat records, routes their
//! messages through the command grammar, and steps every character's
//! behaviour machine once per simulation frame.

use bevy::prelude::*;

use crate::chatlog::ChatLog;
use crate::data::{AssetCatalog, AssetLookup, CatalogAccess};
use crate::settings::Settings;
use crate::shared::*;

mod animation;
pub mod behavior;
pub mod commands;
pub mod registry;
pub mod spawning;

pub use behavior::MoveOrder;
pub use commands::{handle_message, parse_command, ChatCommand, Pick};
pub use registry::Roster;

pub struct NpcPlugin;

impl Plugin for NpcPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_roster);
        app.add_systems(FixedUpdate, ingest_chat_records.in_set(FrameStep::Ingest));
        app.add_systems(FixedUpdate, update_characters.in_set(FrameStep::Behave));
    }
}

/// System: size the roster and seed the random source from settings.
fn setup_roster(mut commands: Commands, settings: Res<Settings>) {
    commands.insert_resource(Roster::with_capacity(settings.max_characters));
    let rng = match settings.seed {
        Some(seed) => {
            info!("[Roster] Using fixed seed {}", seed);
            ChatRng::seeded(seed)
        }
        None => ChatRng::from_entropy(),
    };
    commands.insert_resource(rng);
}

/// Apply one batch of chat records, in order.
pub fn apply_records(
    roster: &mut Roster,
    records: &[ChatRecord],
    now: f64,
    assets: &mut impl AssetLookup,
    rng: &mut impl rand::Rng,
) {
    for record in records {
        let sprite_pool = assets.sprite_pool().to_vec();
        let character = roster.resolve(&record.speaker, now, &sprite_pool, rng);
        handle_message(character, &record.message, now, assets, rng);
    }
}

/// Step every character. Follow targets are looked up by name among the
/// characters on stage at the start of the frame.
pub fn step_roster(roster: &mut Roster, now: f64, rng: &mut impl rand::Rng) {
    let positions = roster.positions();
    for character in roster.iter_mut() {
        let target_x = character.follow.as_deref().and_then(|target| {
            positions
                .iter()
                .find(|(name, _)| name == target)
                .map(|(_, x)| *x)
        });
        character.update(now, target_x, rng);
    }
}

/// System: poll the log and feed new records to the roster.
pub fn ingest_chat_records(
    time: Res<Time>,
    mut chat_log: ResMut<ChatLog>,
    mut roster: ResMut<Roster>,
    mut catalog: ResMut<AssetCatalog>,
    mut images: ResMut<Assets<Image>>,
    mut rng: ResMut<ChatRng>,
) {
    let records = chat_log.poll();
    if records.is_empty() {
        return;
    }
    let mut access = CatalogAccess {
        catalog: &mut catalog,
        images: &mut images,
    };
    apply_records(
        &mut roster,
        &records,
        time.elapsed_secs_f64(),
        &mut access,
        &mut rng.0,
    );
}

/// System: advance every character's behaviour machine.
pub fn update_characters(time: Res<Time>, mut roster: ResMut<Roster>, mut rng: ResMut<ChatRng>) {
    step_roster(&mut roster, time.elapsed_secs_f64(), &mut rng.0);
}
