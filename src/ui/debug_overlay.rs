use bevy::prelude::*;

use crate::chatlog::{ChatLog, WarmLog};
use crate::npcs::Roster;
use crate::settings::Settings;

/// Marker for the debug overlay root node.
#[derive(Component)]
pub struct DebugOverlayRoot;

/// Marker for the debug text.
#[derive(Component)]
pub struct DebugOverlayText;

/// Spawn the debug overlay UI (runs once at startup).
pub fn spawn_debug_overlay(mut commands: Commands, settings: Res<Settings>) {
    let visibility = if settings.show_debug {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    commands
        .spawn((
            DebugOverlayRoot,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(8.0),
                top: Val::Px(8.0),
                padding: UiRect::all(Val::Px(4.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
            visibility,
        ))
        .with_children(|parent| {
            parent.spawn((
                DebugOverlayText,
                Text::new("Debug"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 1.0, 1.0)),
            ));
        });
}

pub fn debug_lines(roster: &Roster, chat_log: Option<&ChatLog>, warm: &WarmLog) -> Vec<String> {
    let mut lines = vec![format!("Characters: {}/{}", roster.len(), roster.capacity())];
    if let Some(log) = chat_log {
        lines.push(format!("Log cursor: {}", log.cursor));
        if log.unreadable {
            lines.push(format!("Log unreadable: {}", log.path.display()));
        }
    }
    lines.push(format!(
        "Warm snapshot: {} records ({} refreshes)",
        warm.records.len(),
        warm.refreshes
    ));
    lines
}

/// Update debug overlay content.
pub fn update_debug_overlay(
    settings: Res<Settings>,
    roster: Res<Roster>,
    chat_log: Option<Res<ChatLog>>,
    warm: Res<WarmLog>,
    mut text_query: Query<&mut Text, With<DebugOverlayText>>,
) {
    if !settings.show_debug {
        return;
    }
    let Ok(mut text) = text_query.get_single_mut() else { return };
    **text = debug_lines(&roster, chat_log.as_deref(), &warm).join("\n");
}
