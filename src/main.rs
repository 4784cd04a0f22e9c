mod shared;
mod settings;
mod chatlog;
mod data;
mod npcs;
mod ui;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

fn main() {
    let settings = settings::load_settings();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "NPC Chat".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: false,
                        ..default()
                    }),
                    ..default()
                })
                // Sprite and overlay directories are relative to the working directory.
                .set(AssetPlugin {
                    file_path: ".".to_string(),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        .insert_resource(settings)
        .insert_resource(Time::<Fixed>::from_hz(FRAME_RATE))
        // One simulation frame: read chat, act, then lay out bubbles.
        .configure_sets(
            FixedUpdate,
            (FrameStep::Ingest, FrameStep::Behave, FrameStep::Layout).chain(),
        )
        // Domain plugins
        .add_plugins(data::DataPlugin)
        .add_plugins(chatlog::ChatLogPlugin)
        .add_plugins(npcs::NpcPlugin)
        .add_plugins(ui::UiPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
