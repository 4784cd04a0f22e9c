//! Overlay playback: cycles clip frames on a short fixed period and ends
//! the clip after a fixed duration, whatever its length.

use crate::shared::*;

impl Overlay {
    /// Advance the frame if its period has elapsed.
    pub fn tick(&mut self, now: f64) {
        if now - self.last_frame_at > OVERLAY_FRAME_SECS {
            self.frame = (self.frame + 1) % self.frame_count;
            self.last_frame_at = now;
        }
    }

    pub fn expired(&self, now: f64) -> bool {
        now - self.started_at > OVERLAY_DURATION_SECS
    }
}

/// Tick a character's overlay, clearing it once it has run its course.
pub fn animate_overlay(character: &mut Character, now: f64) {
    let Some(overlay) = character.overlay.as_mut() else {
        return;
    };
    overlay.tick(now);
    if overlay.expired(now) {
        character.overlay = None;
    }
}
