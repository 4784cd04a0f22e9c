//! Per-character behaviour machine.
//!
//! Each frame a character may re-roll its wander state, walks or follows,
//! hops while moving, and lets stale speech lapse. Commands push the next
//! re-roll out so a forced state holds for its override window.

use bevy::math::Rect;
use rand::Rng;

use super::animation::animate_overlay;
use super::spawning::wander_interval;
use crate::shared::*;

/// A movement order issued from chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOrder {
    Left,
    Right,
    Stop,
    Follow(String),
}

impl Character {
    /// Advance one frame. `target_x` is the follow target's current `x`, or
    /// `None` when there is no target or it is not on stage.
    pub fn update(&mut self, now: f64, target_x: Option<f32>, rng: &mut impl Rng) {
        animate_overlay(self, now);

        if now >= self.next_change_at {
            self.locomotion = Locomotion::random(rng);
            self.next_change_at = now + wander_interval(rng);
            self.follow = None;
        }

        self.pace = self.choose_pace(target_x);
        self.walk(now);
        self.expire_speech(now);
    }

    fn choose_pace(&self, target_x: Option<f32>) -> Pace {
        match self.locomotion {
            Locomotion::Left => Pace::Left,
            Locomotion::Right => Pace::Right,
            Locomotion::Stopped => Pace::Still,
            // A target that leaves the stage leaves the last pace in place.
            Locomotion::FollowTarget => match target_x {
                Some(tx) if tx < self.x - FOLLOW_DEAD_ZONE => Pace::Left,
                Some(tx) if tx > self.x + FOLLOW_DEAD_ZONE => Pace::Right,
                Some(_) => Pace::Still,
                None => self.pace,
            },
        }
    }

    fn walk(&mut self, now: f64) {
        let direction = match self.pace {
            Pace::Left => -1.0,
            Pace::Right => 1.0,
            Pace::Still => {
                self.hop = 0.0;
                return;
            }
        };

        if now - self.last_hop_at >= HOP_PERIOD_SECS {
            self.hop = if self.hop == 0.0 { HOP_HEIGHT } else { 0.0 };
            self.last_hop_at = now;
        }

        self.x += direction * WALK_STEP;
        self.facing_left = direction < 0.0;

        let max_x = SCREEN_WIDTH - BODY_WIDTH;
        if self.x <= 0.0 {
            self.x = 0.0;
            if self.locomotion == Locomotion::Left {
                self.locomotion = Locomotion::Right;
            }
        } else if self.x >= max_x {
            self.x = max_x;
            if self.locomotion == Locomotion::Right {
                self.locomotion = Locomotion::Left;
            }
        }
    }

    fn expire_speech(&mut self, now: f64) {
        if let Speech::Said { since, .. } = self.speech {
            if now - since > SPEECH_TIMEOUT_SECS {
                self.speech = Speech::Silent;
                self.bubble = Rect::default();
            }
        }
    }

    /// Force a movement state for its override window.
    pub fn order_move(&mut self, order: MoveOrder, now: f64) {
        let (locomotion, follow, hold) = match order {
            MoveOrder::Left => (Locomotion::Left, None, MOVE_OVERRIDE_SECS),
            MoveOrder::Right => (Locomotion::Right, None, MOVE_OVERRIDE_SECS),
            MoveOrder::Stop => (Locomotion::Stopped, None, MOVE_OVERRIDE_SECS),
            MoveOrder::Follow(target) => {
                (Locomotion::FollowTarget, Some(target), FOLLOW_OVERRIDE_SECS)
            }
        };
        if follow.is_some() {
            self.pace = Pace::Still;
        }
        self.locomotion = locomotion;
        self.follow = follow;
        self.next_change_at = now + hold;
    }

    /// Drop whatever the bubble is showing.
    pub fn hush(&mut self) {
        self.speech = Speech::Silent;
        self.bubble = Rect::default();
    }

    /// Show an ordinary chat line.
    pub fn say(&mut self, text: &str, now: f64) {
        self.speech = Speech::Said {
            text: text.to_string(),
            since: now,
        };
    }
}
