//! Speech-bubble placement.
//!
//! Bubbles sit a fixed distance above the name tag. A bubble that would
//! overlap its own name is lifted clear of it; then every other bubble it
//! touches lifts it again, above that bubble. Collisions are resolved one
//! pair at a time in roster order, so crowded stages can still stack
//! imperfectly.

use bevy::prelude::*;

use crate::npcs::Roster;
use crate::shared::*;

/// Rough glyph advance as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;
const LINE_HEIGHT: f32 = 1.2;

/// Approximate on-screen size of a single line of text.
pub fn text_size(text: &str, font_size: f32) -> Vec2 {
    let glyphs = text.chars().count() as f32;
    Vec2::new(glyphs * font_size * GLYPH_WIDTH, font_size * LINE_HEIGHT)
}

/// Screen-space box of a character's name tag.
pub fn name_rect(character: &Character) -> Rect {
    Rect::from_center_size(
        Vec2::new(character.center_x(), character.name_y()),
        text_size(&character.name, NAME_FONT_SIZE),
    )
}

fn bubble_with_bottom(center_x: f32, bottom: f32, size: Vec2) -> Rect {
    Rect::from_corners(
        Vec2::new(center_x - size.x / 2.0, bottom - size.y),
        Vec2::new(center_x + size.x / 2.0, bottom),
    )
}

fn overlaps(a: Rect, b: Rect) -> bool {
    !a.intersect(b).is_empty()
}

/// Recompute every character's bubble box in place.
pub fn layout_bubbles(characters: &mut [Character]) {
    for i in 0..characters.len() {
        let bubble = match characters[i].speech.display_text() {
            Some(text) => place_bubble(characters, i, text_size(text, MESSAGE_FONT_SIZE)),
            None => Rect::default(),
        };
        characters[i].bubble = bubble;
    }
}

fn place_bubble(characters: &[Character], index: usize, size: Vec2) -> Rect {
    let speaker = &characters[index];
    let name = name_rect(speaker);
    let center_x = speaker.center_x();

    let mut bubble = bubble_with_bottom(center_x, speaker.name_y() - BUBBLE_NAME_GAP, size);
    if bubble.max.y > name.min.y {
        bubble = bubble_with_bottom(center_x, name.min.y - BUBBLE_NAME_CLEARANCE, size);
    }

    for (j, other) in characters.iter().enumerate() {
        if j != index && overlaps(bubble, other.bubble) {
            bubble = bubble_with_bottom(center_x, other.bubble.min.y - BUBBLE_STACK_GAP, size);
        }
    }
    bubble
}

/// System: lay out bubbles after characters have moved this frame.
pub fn layout_speech_bubbles(mut roster: ResMut<Roster>) {
    layout_bubbles(roster.as_mut_slice());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn speaker(name: &str, x: f32, text: Option<&str>) -> Character {
        let mut rng = StdRng::seed_from_u64(5);
        let mut c = Character::spawn(name, 0, 0.0, &[], &mut rng);
        c.x = x;
        if let Some(text) = text {
            c.say(text, 0.0);
        }
        c
    }

    #[test]
    fn test_default_bubble_sits_above_name() {
        let mut characters = vec![speaker("alice", 300.0, Some("hola"))];
        layout_bubbles(&mut characters);

        let c = &characters[0];
        let name = name_rect(c);
        assert_eq!(c.bubble.max.y, c.name_y() - BUBBLE_NAME_GAP);
        assert!(c.bubble.max.y <= name.min.y);
        assert_eq!(c.bubble.center().x, c.center_x());
        assert_eq!(c.bubble.size(), text_size("hola", MESSAGE_FONT_SIZE));
    }

    #[test]
    fn test_silent_character_has_no_bubble() {
        let mut characters = vec![speaker("alice", 300.0, None)];
        characters[0].bubble = Rect::new(1.0, 1.0, 50.0, 50.0);
        layout_bubbles(&mut characters);
        assert_eq!(characters[0].bubble, Rect::default());
    }

    #[test]
    fn test_overlapping_bubbles_stack_upward() {
        let mut characters = vec![
            speaker("alice", 300.0, Some("first message")),
            speaker("bob", 310.0, Some("second message")),
        ];
        layout_bubbles(&mut characters);

        let lower = characters[0].bubble;
        let upper = characters[1].bubble;
        assert!(
            upper.max.y <= lower.min.y - BUBBLE_STACK_GAP + f32::EPSILON,
            "Second bubble should sit above the first: {:?} vs {:?}",
            upper,
            lower
        );

        // Layout is stable frame to frame.
        layout_bubbles(&mut characters);
        assert_eq!(characters[0].bubble, lower);
        assert_eq!(characters[1].bubble, upper);
    }

    #[test]
    fn test_distant_bubbles_stay_at_default_height() {
        let mut characters = vec![
            speaker("alice", 100.0, Some("hi")),
            speaker("bob", 900.0, Some("hey")),
        ];
        layout_bubbles(&mut characters);
        assert_eq!(characters[0].bubble.max.y, characters[1].bubble.max.y);
    }

    #[test]
    fn test_help_gets_a_bubble() {
        let mut characters = vec![speaker("alice", 300.0, None)];
        characters[0].speech = Speech::Help;
        layout_bubbles(&mut characters);
        assert_eq!(characters[0].bubble.size(), text_size(HELP_TEXT, MESSAGE_FONT_SIZE));
    }
}
