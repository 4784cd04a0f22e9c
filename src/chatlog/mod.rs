//! Chat log bridge: turns the shared, append-only `speaker: message` log
//! into batches of records that are new since the previous poll.
//!
//! The log is opened, read, and closed on every poll with no locking; a
//! concurrent writer may be halfway through rewriting it. Reads that fail
//! count as "nothing new" and are retried on the next frame.

use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::settings::{LogEncoding, Settings};
use crate::shared::*;

mod warm;

pub use warm::{drain_warm_log, spawn_log_warmer, WarmLog, WarmLogFeed};

pub struct ChatLogPlugin;

impl Plugin for ChatLogPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WarmLog>()
            .add_systems(Startup, (insert_chat_log, start_log_warmer))
            .add_systems(Update, drain_warm_log);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PARSING
// ═══════════════════════════════════════════════════════════════════════

/// Parse one log line. Lines without a `": "` separator, or with an empty
/// speaker or message, are not records.
pub fn parse_line(line: &str) -> Option<ChatRecord> {
    let (speaker, message) = line.trim().split_once(": ")?;
    let speaker = speaker.trim();
    let message = message.trim();
    if speaker.is_empty() || message.is_empty() {
        return None;
    }
    Some(ChatRecord::new(speaker, message))
}

/// Parse every complete (newline-terminated) line of the log. A trailing
/// fragment without its newline is still being written and is skipped.
pub fn parse_log(text: &str) -> Vec<ChatRecord> {
    let complete = match text.rfind('\n') {
        Some(end) => &text[..=end],
        None => "",
    };
    complete.lines().filter_map(parse_line).collect()
}

/// Read and parse the whole log.
pub fn read_records(path: &Path, encoding: LogEncoding) -> Result<Vec<ChatRecord>, String> {
    let bytes =
        fs::read(path).map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
    Ok(parse_log(&encoding.decode(&bytes)))
}

// ═══════════════════════════════════════════════════════════════════════
// CURSOR
// ═══════════════════════════════════════════════════════════════════════

/// The render loop's own view of the log: a count of records already
/// handed out.
#[derive(Resource, Debug, Clone)]
pub struct ChatLog {
    pub path: PathBuf,
    pub encoding: LogEncoding,
    pub cursor: usize,
    /// Set while reads are failing, so the outage is reported once.
    pub unreadable: bool,
}

impl ChatLog {
    pub fn new(path: impl Into<PathBuf>, encoding: LogEncoding) -> Self {
        Self {
            path: path.into(),
            encoding,
            cursor: 0,
            unreadable: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.log_path.clone(), settings.log_encoding)
    }

    /// Records appended since the previous poll, in log order.
    pub fn poll(&mut self) -> Vec<ChatRecord> {
        let records = match read_records(&self.path, self.encoding) {
            Ok(records) => {
                if self.unreadable {
                    info!("[Chat] Log readable again: {}", self.path.display());
                    self.unreadable = false;
                }
                records
            }
            Err(e) => {
                if !self.unreadable {
                    warn!("[Chat] {}. Treating as no new messages.", e);
                    self.unreadable = true;
                }
                return Vec::new();
            }
        };

        // Fewer records than already consumed means the writer is mid-rewrite.
        if records.len() <= self.cursor {
            return Vec::new();
        }
        let fresh = records[self.cursor..].to_vec();
        self.cursor += fresh.len();
        debug!("[Chat] {} new record(s), cursor at {}", fresh.len(), self.cursor);
        fresh
    }
}

fn insert_chat_log(mut commands: Commands, settings: Res<Settings>) {
    info!("[Chat] Watching {}", settings.log_path.display());
    commands.insert_resource(ChatLog::from_settings(&settings));
}

fn start_log_warmer(mut commands: Commands, settings: Res<Settings>) {
    let feed = spawn_log_warmer(
        settings.log_path.clone(),
        settings.log_encoding,
        settings.warm_period(),
    );
    commands.insert_resource(feed);
}
