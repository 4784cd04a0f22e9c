//! Runtime settings read from an optional `chatfolk.ron` next to the
//! working directory. Every field has a default, so a missing or partial
//! file is fine; a malformed one is reported and ignored.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::shared::DEFAULT_MAX_CHARACTERS;

pub const SETTINGS_FILE: &str = "chatfolk.ron";

/// Longest accepted warmer period, in seconds.
pub const MAX_WARM_POLL_SECS: f32 = 3600.0;

/// Byte encoding shared with the process that writes the chat log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LogEncoding {
    /// Windows-1252, the Western code page chat bridges on Windows write.
    #[default]
    Cp1252,
    /// ISO-8859-1; each byte is one character.
    Latin1,
    /// UTF-8, invalid sequences replaced.
    Utf8,
}

impl LogEncoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            LogEncoding::Cp1252 => {
                let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
                text.into_owned()
            }
            LogEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            LogEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_path: PathBuf,
    pub log_encoding: LogEncoding,
    pub sprite_dir: PathBuf,
    pub overlay_dir: PathBuf,
    pub max_characters: usize,
    pub seed: Option<u64>,
    pub warm_poll_secs: f32,
    pub show_debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("historial.txt"),
            log_encoding: LogEncoding::Cp1252,
            sprite_dir: PathBuf::from("sprites"),
            overlay_dir: PathBuf::from("sprites_objetos"),
            max_characters: DEFAULT_MAX_CHARACTERS,
            seed: None,
            warm_poll_secs: 2.0,
            show_debug: false,
        }
    }
}

pub fn parse_settings(text: &str) -> Result<Settings, String> {
    let settings: Settings =
        ron::from_str(text).map_err(|e| format!("Invalid settings: {}", e))?;
    if settings.max_characters == 0 {
        return Err("max_characters must be at least 1".to_string());
    }
    let period = settings.warm_poll_secs;
    if !period.is_finite() || period <= 0.0 || period > MAX_WARM_POLL_SECS {
        return Err(format!(
            "warm_poll_secs must be in (0, {}], got {}",
            MAX_WARM_POLL_SECS, period
        ));
    }
    Ok(settings)
}

impl Settings {
    /// Period of the background log warmer, never shorter than 0.1 s.
    pub fn warm_period(&self) -> Duration {
        Duration::try_from_secs_f32(self.warm_poll_secs.max(0.1))
            .unwrap_or_else(|_| Duration::from_secs_f32(Settings::default().warm_poll_secs))
    }
}

fn read_settings(path: &Path) -> Result<Option<Settings>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
    parse_settings(&text).map(Some)
}

/// Load settings from `SETTINGS_FILE`, falling back to defaults.
pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> Settings {
    match read_settings(path) {
        Ok(Some(settings)) => {
            info!("[Settings] Loaded {}", path.display());
            settings
        }
        Ok(None) => Settings::default(),
        Err(e) => {
            warn!("[Settings] {}. Using defaults.", e);
            Settings::default()
        }
    }
}
