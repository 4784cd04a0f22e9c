//! Draw pass and window chrome: character views, speech bubbles, the
//! optional debug panel, and the quit key.

mod debug_overlay;
pub mod layout;
pub mod stage;

use bevy::prelude::*;
use crate::shared::*;

pub use layout::{layout_bubbles, layout_speech_bubbles, name_rect, text_size};
pub use stage::{CharacterView, StagedCharacters, ViewPart};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(BACKGROUND))
            .init_resource::<StagedCharacters>();

        // ─── BUBBLE LAYOUT: last step of each simulation frame ───
        app.add_systems(FixedUpdate, layout_speech_bubbles.in_set(FrameStep::Layout));

        // ─── DRAW: mirror the roster into sprites and text ───
        app.add_systems(
            Update,
            (
                stage::sync_stage_entities,
                stage::measure_bodies,
                stage::draw_characters,
            )
                .chain(),
        );

        // ─── DEBUG PANEL ───
        app.add_systems(Startup, debug_overlay::spawn_debug_overlay);
        app.add_systems(Update, debug_overlay::update_debug_overlay);

        app.add_systems(Update, quit_on_escape);
    }
}

fn quit_on_escape(keyboard: Res<ButtonInput<KeyCode>>, mut app_exit: EventWriter<AppExit>) {
    if keyboard.just_pressed(KeyCode::Escape) {
        app_exit.send(AppExit::Success);
    }
}
