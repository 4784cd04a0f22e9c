//! Shared components, resources, and constants for the chat stage.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain's internals directly.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ═══════════════════════════════════════════════════════════════════════
// FRAME ORDERING
// ═══════════════════════════════════════════════════════════════════════

/// Steps of one simulation frame, chained in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameStep {
    /// Poll the chat log and apply new records to the roster.
    Ingest,
    /// Advance every character's behaviour state machine.
    Behave,
    /// Recompute speech-bubble placement.
    Layout,
}

// ═══════════════════════════════════════════════════════════════════════
// CHAT RECORDS
// ═══════════════════════════════════════════════════════════════════════

/// One `speaker: message` line from the chat log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRecord {
    pub speaker: String,
    pub message: String,
}

impl ChatRecord {
    pub fn new(speaker: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            message: message.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RANDOMNESS
// ═══════════════════════════════════════════════════════════════════════

/// Single random source for the whole simulation.
/// Seeded from `Settings::seed` when present so runs can be replayed.
#[derive(Resource)]
pub struct ChatRng(pub StdRng);

impl ChatRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl Default for ChatRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CHARACTER
// ═══════════════════════════════════════════════════════════════════════

/// Locomotion state of a character's behaviour machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locomotion {
    Left,
    Right,
    Stopped,
    FollowTarget,
}

impl Locomotion {
    /// States the autonomous re-roll picks from.
    pub const WANDER: [Locomotion; 3] = [Locomotion::Left, Locomotion::Right, Locomotion::Stopped];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::WANDER[rng.gen_range(0..Self::WANDER.len())]
    }
}

/// Movement actually taken on the last update. For `Left`/`Right`/`Stopped`
/// this mirrors the locomotion state; while following it is derived from
/// the target's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pace {
    Left,
    Right,
    #[default]
    Still,
}

/// What a character is currently saying.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Speech {
    #[default]
    Silent,
    /// Ordinary chat line, expires `SPEECH_TIMEOUT_SECS` after `since`.
    Said { text: String, since: f64 },
    /// The command reference, shown until replaced.
    Help,
}

impl Speech {
    /// Text to put in the bubble, if any.
    pub fn display_text(&self) -> Option<&str> {
        match self {
            Speech::Silent => None,
            Speech::Said { text, .. } => Some(text.as_str()),
            Speech::Help => Some(HELP_TEXT),
        }
    }
}

/// A transient animated clip playing above a character.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// Clip name (file stem inside the overlay directory).
    pub clip: String,
    pub frame_count: usize,
    pub frame: usize,
    pub started_at: f64,
    pub last_frame_at: f64,
}

impl Overlay {
    pub fn new(clip: impl Into<String>, frame_count: usize, now: f64) -> Self {
        Self {
            clip: clip.into(),
            frame_count: frame_count.max(1),
            frame: 0,
            started_at: now,
            last_frame_at: now,
        }
    }
}

/// One on-stage chat participant.
///
/// Positions are in screen space: `x` is the left edge of the body, y grows
/// downward, and `baseline` is the ground line the body stands on.
#[derive(Debug, Clone)]
pub struct Character {
    pub name: String,
    /// Admission order, used to break creation-time ties.
    pub serial: u64,
    pub created_at: f64,

    /// Sprite file inside the sprite directory; `None` draws a placeholder.
    pub skin: Option<String>,
    /// Height of the body after the aspect-preserving resize to `BODY_WIDTH`.
    pub body_height: f32,
    pub overlay: Option<Overlay>,
    /// True when the last horizontal move was to the left.
    pub facing_left: bool,
    pub name_color: Color,

    pub x: f32,
    pub baseline: f32,
    /// Current hop offset above the baseline (0 or `HOP_HEIGHT`).
    pub hop: f32,
    pub last_hop_at: f64,

    pub locomotion: Locomotion,
    pub pace: Pace,
    pub next_change_at: f64,
    pub follow: Option<String>,

    pub speech: Speech,
    /// Last computed bubble box in screen space; zero-sized when silent.
    pub bubble: Rect,
}

impl Character {
    pub fn center_x(&self) -> f32 {
        self.x + BODY_WIDTH / 2.0
    }

    /// Top edge of the body, including the current hop.
    pub fn body_top(&self) -> f32 {
        self.baseline - self.hop - self.body_height
    }

    /// Vertical centre of the name tag.
    pub fn name_y(&self) -> f32 {
        self.baseline - NAME_OFFSET
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;
pub const FRAME_RATE: f64 = 30.0;

/// Chroma-key green behind the characters.
pub const BACKGROUND: Color = Color::srgb(0.0, 1.0, 0.0);

pub const DEFAULT_MAX_CHARACTERS: usize = 50;

/// Every body is resized to this width, keeping its aspect ratio.
pub const BODY_WIDTH: f32 = 64.0;
pub const SPAWN_MARGIN: f32 = 50.0;

pub const WALK_STEP: f32 = 4.0;
pub const HOP_HEIGHT: f32 = 5.0;
pub const HOP_PERIOD_SECS: f64 = 0.1;
pub const FOLLOW_DEAD_ZONE: f32 = 32.0;

/// Autonomous re-roll interval, whole seconds, inclusive.
pub const WANDER_MIN_SECS: u32 = 2;
pub const WANDER_MAX_SECS: u32 = 10;

pub const MOVE_OVERRIDE_SECS: f64 = 10.0;
pub const FOLLOW_OVERRIDE_SECS: f64 = 20.0;

pub const SPEECH_TIMEOUT_SECS: f64 = 60.0;
pub const OVERLAY_FRAME_SECS: f64 = 0.06;
pub const OVERLAY_DURATION_SECS: f64 = 7.0;
/// Overlay centre sits this far above the body top.
pub const OVERLAY_LIFT: f32 = 64.0;

pub const NAME_OFFSET: f32 = 96.0;
pub const NAME_FONT_SIZE: f32 = 20.0;
pub const MESSAGE_FONT_SIZE: f32 = 16.0;
pub const OUTLINE_THICKNESS: f32 = 3.0;

/// Gap between the name centre and the default bubble bottom.
pub const BUBBLE_NAME_GAP: f32 = 20.0;
/// Gap kept above the name box when the bubble has to be lifted.
pub const BUBBLE_NAME_CLEARANCE: f32 = 5.0;
/// Gap kept above another bubble when stacking.
pub const BUBBLE_STACK_GAP: f32 = 10.0;
pub const BUBBLE_PADDING: f32 = 5.0;
pub const BUBBLE_BORDER: f32 = 1.0;

pub const HELP_TEXT: &str =
    "!gif <nombre|random>  !mover <izquierda|derecha|parado|nombre>  !skin <nombre|random>  !help";

/// Bright name colours; picked independently per character.
pub const NAME_PALETTE: [Color; 10] = [
    Color::srgb(1.0, 0.0, 0.0),
    Color::srgb(0.5, 0.5, 0.5),
    Color::srgb(0.0, 0.0, 1.0),
    Color::srgb(1.0, 0.5, 0.0),
    Color::srgb(1.0, 0.0, 1.0),
    Color::srgb(0.0, 0.5, 0.5),
    Color::srgb(0.48, 0.78, 0.48),
    Color::srgb(0.5, 0.0, 0.5),
    Color::srgb(1.0, 0.5, 0.0),
    Color::srgb(0.0, 0.4, 1.0),
];
