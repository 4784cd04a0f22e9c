//! Draw pass: keeps one group of sprite and text entities per character
//! and moves them to match the roster every frame.
//!
//! The roster works in screen space (origin top-left, y down); entities
//! live in world space centred on the camera.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::data::AssetCatalog;
use crate::npcs::Roster;
use crate::shared::*;

use super::layout::name_rect;

/// Which piece of a character an entity draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewPart {
    Body,
    Overlay,
    NameOutline(Vec2),
    Name,
    BubbleBorder,
    BubbleFill,
    BubbleOutline(Vec2),
    BubbleText,
}

impl ViewPart {
    fn depth(self) -> f32 {
        match self {
            ViewPart::Body => 1.0,
            ViewPart::Overlay => 2.0,
            ViewPart::NameOutline(_) => 3.0,
            ViewPart::Name => 4.0,
            ViewPart::BubbleBorder => 5.0,
            ViewPart::BubbleFill => 6.0,
            ViewPart::BubbleOutline(_) => 6.5,
            ViewPart::BubbleText => 7.0,
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct CharacterView {
    pub owner: String,
    /// Serial of the character this view was built for.
    pub serial: u64,
    pub part: ViewPart,
}

/// Sprite file currently shown on a body entity.
#[derive(Component, Debug, Default)]
pub struct BodySkin(pub Option<String>);

/// Characters that currently have view entities, by name → serial.
#[derive(Resource, Debug, Default)]
pub struct StagedCharacters {
    pub serials: HashMap<String, u64>,
}

pub fn to_world(screen: Vec2) -> Vec2 {
    Vec2::new(screen.x - SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0 - screen.y)
}

fn outline_offsets() -> [Vec2; 8] {
    let t = OUTLINE_THICKNESS;
    [
        Vec2::new(-t, -t),
        Vec2::new(0.0, -t),
        Vec2::new(t, -t),
        Vec2::new(-t, 0.0),
        Vec2::new(t, 0.0),
        Vec2::new(-t, t),
        Vec2::new(0.0, t),
        Vec2::new(t, t),
    ]
}

fn view(character: &Character, part: ViewPart) -> CharacterView {
    CharacterView {
        owner: character.name.clone(),
        serial: character.serial,
        part,
    }
}

fn spawn_views(commands: &mut Commands, character: &Character) {
    let hidden = Visibility::Hidden;

    commands.spawn((
        view(character, ViewPart::Body),
        BodySkin(None),
        Sprite::from_color(character.name_color, Vec2::splat(BODY_WIDTH)),
        Transform::default(),
        hidden,
    ));
    commands.spawn((
        view(character, ViewPart::Overlay),
        Sprite::default(),
        Transform::default(),
        hidden,
    ));

    for offset in outline_offsets() {
        commands.spawn((
            view(character, ViewPart::NameOutline(offset)),
            Text2d::new(character.name.clone()),
            TextFont {
                font_size: NAME_FONT_SIZE,
                ..default()
            },
            TextColor(Color::WHITE),
            Transform::default(),
            hidden,
        ));
    }
    commands.spawn((
        view(character, ViewPart::Name),
        Text2d::new(character.name.clone()),
        TextFont {
            font_size: NAME_FONT_SIZE,
            ..default()
        },
        TextColor(character.name_color),
        Transform::default(),
        hidden,
    ));

    commands.spawn((
        view(character, ViewPart::BubbleBorder),
        Sprite::from_color(Color::BLACK, Vec2::ONE),
        Transform::default(),
        hidden,
    ));
    commands.spawn((
        view(character, ViewPart::BubbleFill),
        Sprite::from_color(Color::WHITE, Vec2::ONE),
        Transform::default(),
        hidden,
    ));
    for offset in outline_offsets() {
        commands.spawn((
            view(character, ViewPart::BubbleOutline(offset)),
            Text2d::new(String::new()),
            TextFont {
                font_size: MESSAGE_FONT_SIZE,
                ..default()
            },
            TextColor(Color::WHITE),
            Transform::default(),
            hidden,
        ));
    }
    commands.spawn((
        view(character, ViewPart::BubbleText),
        Text2d::new(String::new()),
        TextFont {
            font_size: MESSAGE_FONT_SIZE,
            ..default()
        },
        TextColor(Color::BLACK),
        Transform::default(),
        hidden,
    ));
}

/// System: spawn views for newcomers, despawn views of departed characters.
pub fn sync_stage_entities(
    mut commands: Commands,
    roster: Res<Roster>,
    mut staged: ResMut<StagedCharacters>,
    views: Query<(Entity, &CharacterView)>,
) {
    let live: HashMap<&str, u64> = roster.iter().map(|c| (c.name.as_str(), c.serial)).collect();

    for (entity, view) in &views {
        if live.get(view.owner.as_str()) != Some(&view.serial) {
            commands.entity(entity).despawn_recursive();
        }
    }
    staged
        .serials
        .retain(|name, serial| live.get(name.as_str()) == Some(&*serial));

    for character in roster.iter() {
        if staged.serials.get(&character.name) == Some(&character.serial) {
            continue;
        }
        spawn_views(&mut commands, character);
        staged
            .serials
            .insert(character.name.clone(), character.serial);
    }
}

/// System: learn each body's height once its sprite has loaded, keeping
/// the fixed body width and the image's aspect ratio.
pub fn measure_bodies(
    mut roster: ResMut<Roster>,
    images: Res<Assets<Image>>,
    bodies: Query<(&CharacterView, &Sprite), With<BodySkin>>,
) {
    for (view, sprite) in &bodies {
        let Some(character) = roster.get_mut(&view.owner) else {
            continue;
        };
        let height = match (&character.skin, images.get(&sprite.image)) {
            (Some(_), Some(image)) => {
                let size = image.size();
                if size.x == 0 {
                    continue;
                }
                BODY_WIDTH * size.y as f32 / size.x as f32
            }
            _ => BODY_WIDTH,
        };
        character.body_height = height;
    }
}

/// System: move and restyle every view to match its character.
#[allow(clippy::type_complexity)]
pub fn draw_characters(
    roster: Res<Roster>,
    catalog: Option<Res<AssetCatalog>>,
    asset_server: Res<AssetServer>,
    mut views: Query<(
        &CharacterView,
        &mut Transform,
        &mut Visibility,
        Option<&mut Sprite>,
        Option<&mut Text2d>,
        Option<&mut BodySkin>,
    )>,
) {
    let order: HashMap<&str, (usize, &Character)> = roster
        .iter()
        .enumerate()
        .map(|(i, c)| (c.name.as_str(), (i, c)))
        .collect();

    for (view, mut transform, mut visibility, sprite, text, skin) in &mut views {
        let Some(&(index, character)) = order.get(view.owner.as_str()) else {
            continue;
        };
        let depth = view.part.depth() + index as f32 * 0.01;

        let shown = match view.part {
            ViewPart::Body => {
                let center = Vec2::new(
                    character.center_x(),
                    character.baseline - character.hop - character.body_height / 2.0,
                );
                if let (Some(mut sprite), Some(mut skin)) = (sprite, skin) {
                    if skin.0 != character.skin {
                        match (&character.skin, catalog.as_deref()) {
                            (Some(file), Some(catalog)) => {
                                sprite.image = asset_server.load(catalog.sprite_path(file));
                                sprite.color = Color::WHITE;
                            }
                            _ => {
                                sprite.image = Handle::default();
                                sprite.color = character.name_color;
                            }
                        }
                        skin.0 = character.skin.clone();
                    }
                    sprite.custom_size = Some(Vec2::new(BODY_WIDTH, character.body_height));
                    sprite.flip_x = character.facing_left;
                }
                place(&mut transform, center, depth);
                true
            }
            ViewPart::Overlay => {
                let frame = match (&character.overlay, catalog.as_deref()) {
                    (Some(overlay), Some(catalog)) => {
                        catalog.overlay_frame(&overlay.clip, overlay.frame)
                    }
                    _ => None,
                };
                match (frame, sprite) {
                    (Some(frame), Some(mut sprite)) => {
                        sprite.image = frame;
                        let center =
                            Vec2::new(character.center_x(), character.body_top() - OVERLAY_LIFT);
                        place(&mut transform, center, depth);
                        true
                    }
                    _ => false,
                }
            }
            ViewPart::NameOutline(offset) => {
                let center = name_rect(character).center() + offset;
                place(&mut transform, center, depth);
                true
            }
            ViewPart::Name => {
                place(&mut transform, name_rect(character).center(), depth);
                true
            }
            ViewPart::BubbleBorder
            | ViewPart::BubbleFill
            | ViewPart::BubbleOutline(_)
            | ViewPart::BubbleText => {
                match character.speech.display_text() {
                    Some(message) if !character.bubble.is_empty() => {
                        let bubble = character.bubble;
                        let pad = match view.part {
                            ViewPart::BubbleBorder => BUBBLE_PADDING + BUBBLE_BORDER,
                            ViewPart::BubbleFill => BUBBLE_PADDING,
                            _ => 0.0,
                        };
                        if let Some(mut sprite) = sprite {
                            sprite.custom_size = Some(bubble.size() + Vec2::splat(pad * 2.0));
                        }
                        if let Some(mut text) = text {
                            if text.0 != message {
                                text.0 = message.to_string();
                            }
                        }
                        let offset = match view.part {
                            ViewPart::BubbleOutline(offset) => offset,
                            _ => Vec2::ZERO,
                        };
                        place(&mut transform, bubble.center() + offset, depth);
                        true
                    }
                    _ => false,
                }
            }
        };

        *visibility = if shown {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

fn place(transform: &mut Transform, screen: Vec2, depth: f32) {
    let world = to_world(screen);
    transform.translation = world.extend(depth);
}
