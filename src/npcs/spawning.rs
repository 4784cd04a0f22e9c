//! Character creation: where a newcomer stands, what it wears, and the
//! colour of its name tag.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

/// Letter value used to pick a starting skin: `'a'` is 0, `'b'` is 1, and
/// anything else is its codepoint offset from `'a'` (possibly negative).
fn letter_value(c: char) -> i64 {
    let lower = c.to_lowercase().next().unwrap_or(c);
    lower as i64 - 'a' as i64
}

/// Index of the starting skin for `name` in a pool of `pool_len` sprites.
/// The same name always starts with the same sprite.
pub fn skin_index_for_name(name: &str, pool_len: usize) -> Option<usize> {
    if pool_len == 0 {
        return None;
    }
    let sum: i64 = name.chars().map(letter_value).sum();
    Some(sum.rem_euclid(pool_len as i64) as usize)
}

impl Character {
    /// A freshly admitted character: random spot on the ground, random
    /// wander state, skin derived from its name.
    pub fn spawn(
        name: &str,
        serial: u64,
        now: f64,
        sprite_pool: &[String],
        rng: &mut impl Rng,
    ) -> Self {
        let skin = skin_index_for_name(name, sprite_pool.len()).map(|i| sprite_pool[i].clone());
        let x = rng.gen_range(SPAWN_MARGIN..SCREEN_WIDTH - SPAWN_MARGIN);
        let name_color = NAME_PALETTE[rng.gen_range(0..NAME_PALETTE.len())];
        let locomotion = Locomotion::random(rng);
        let next_change_at = now + wander_interval(rng);

        Self {
            name: name.to_string(),
            serial,
            created_at: now,
            skin,
            body_height: BODY_WIDTH,
            overlay: None,
            facing_left: false,
            name_color,
            x,
            baseline: SCREEN_HEIGHT / 2.0,
            hop: 0.0,
            last_hop_at: now,
            locomotion,
            pace: Pace::Still,
            next_change_at,
            follow: None,
            speech: Speech::Silent,
            bubble: Rect::default(),
        }
    }
}

/// Seconds until the next autonomous re-roll.
pub fn wander_interval(rng: &mut impl Rng) -> f64 {
    rng.gen_range(WANDER_MIN_SECS..=WANDER_MAX_SECS) as f64
}
