//! Asset catalog: the sprite pool and the overlay clip directory.
//!
//! Sprites are listed once at startup and loaded through the asset server
//! by path. Overlay GIFs are decoded on first use and cached as frame
//! handles. Missing or unreadable files are never fatal; the caller just
//! gets "nothing to show".

mod clips;

use bevy::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::settings::Settings;

pub use clips::{decode_gif, frame_to_image};

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, build_asset_catalog);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LOOKUP SEAM
// ═══════════════════════════════════════════════════════════════════════

/// What the command interpreter needs to know about assets.
pub trait AssetLookup {
    /// Sprite file names available for skins, sorted.
    fn sprite_pool(&self) -> &[String];
    /// Whether a sprite file with this name exists right now.
    fn skin_exists(&self, file: &str) -> bool;
    /// Stems of every overlay clip currently in the overlay directory.
    fn overlay_names(&self) -> Vec<String>;
    /// Make the clip `<name>.gif` ready to play; returns its frame count.
    fn load_overlay(&mut self, name: &str) -> Option<usize>;
}

/// Whether a chat-supplied asset name stays inside its directory.
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.contains("..")
}

/// Sprite file for a skin name, or `None` if the name is not plain.
pub fn skin_file(name: &str) -> Option<String> {
    is_plain_name(name).then(|| format!("sprite_{}.png", name))
}

// ═══════════════════════════════════════════════════════════════════════
// CATALOG
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Default)]
pub struct AssetCatalog {
    pub sprite_dir: PathBuf,
    pub overlay_dir: PathBuf,
    pub sprites: Vec<String>,
    /// Decoded overlay frames keyed by clip name.
    pub clips: HashMap<String, Vec<Handle<Image>>>,
}

impl AssetCatalog {
    pub fn scan(sprite_dir: impl Into<PathBuf>, overlay_dir: impl Into<PathBuf>) -> Self {
        let sprite_dir = sprite_dir.into();
        let sprites = list_files(&sprite_dir, "png");
        Self {
            sprite_dir,
            overlay_dir: overlay_dir.into(),
            sprites,
            clips: HashMap::new(),
        }
    }

    /// Asset-server path of a sprite file.
    pub fn sprite_path(&self, file: &str) -> PathBuf {
        self.sprite_dir.join(file)
    }

    pub fn overlay_frame(&self, clip: &str, frame: usize) -> Option<Handle<Image>> {
        let frames = self.clips.get(clip)?;
        frames.get(frame % frames.len().max(1)).cloned()
    }
}

/// File names in `dir` with the given extension, sorted. An unreadable or
/// missing directory lists as empty.
pub fn list_files(dir: &Path, extension: &str) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(extension))
        .filter_map(|path| path.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .collect();
    files.sort();
    files
}

/// Live access to the catalog plus the image store overlay frames go into.
pub struct CatalogAccess<'a> {
    pub catalog: &'a mut AssetCatalog,
    pub images: &'a mut Assets<Image>,
}

impl AssetLookup for CatalogAccess<'_> {
    fn sprite_pool(&self) -> &[String] {
        &self.catalog.sprites
    }

    fn skin_exists(&self, file: &str) -> bool {
        is_plain_name(file) && self.catalog.sprite_path(file).is_file()
    }

    fn overlay_names(&self) -> Vec<String> {
        list_files(&self.catalog.overlay_dir, "gif")
            .into_iter()
            .filter_map(|file| file.strip_suffix(".gif").map(str::to_string))
            .collect()
    }

    fn load_overlay(&mut self, name: &str) -> Option<usize> {
        if !is_plain_name(name) {
            debug!("[Assets] Rejected overlay name '{}'", name);
            return None;
        }
        if let Some(frames) = self.catalog.clips.get(name) {
            return Some(frames.len());
        }
        let path = self.catalog.overlay_dir.join(format!("{}.gif", name));
        match decode_gif(&path) {
            Ok(frames) => {
                let handles: Vec<Handle<Image>> = frames
                    .into_iter()
                    .map(|frame| self.images.add(frame_to_image(frame)))
                    .collect();
                let count = handles.len();
                info!("[Assets] Decoded overlay '{}' ({} frames)", name, count);
                self.catalog.clips.insert(name.to_string(), handles);
                Some(count)
            }
            Err(e) => {
                debug!("[Assets] Overlay '{}' unavailable: {}", name, e);
                None
            }
        }
    }
}

/// System: list the sprite pool once at startup.
fn build_asset_catalog(mut commands: Commands, settings: Res<Settings>) {
    let catalog = AssetCatalog::scan(&settings.sprite_dir, &settings.overlay_dir);
    if catalog.sprites.is_empty() {
        warn!(
            "[Assets] No sprites in {}; characters will use placeholder bodies.",
            settings.sprite_dir.display()
        );
    } else {
        info!("[Assets] Sprite pool: {} file(s)", catalog.sprites.len());
    }
    commands.insert_resource(catalog);
}

// ═══════════════════════════════════════════════════════════════════════
// TEST DOUBLE
// ═══════════════════════════════════════════════════════════════════════

/// In-memory asset lookup for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct StubAssets {
    pub sprites: Vec<String>,
    /// Clip name → frame count.
    pub overlays: HashMap<String, usize>,
}

#[cfg(test)]
impl StubAssets {
    pub fn with_sprites(names: &[&str]) -> Self {
        Self {
            sprites: names.iter().map(|s| s.to_string()).collect(),
            overlays: HashMap::new(),
        }
    }

    pub fn with_overlay(mut self, name: &str, frames: usize) -> Self {
        self.overlays.insert(name.to_string(), frames);
        self
    }
}

#[cfg(test)]
impl AssetLookup for StubAssets {
    fn sprite_pool(&self) -> &[String] {
        &self.sprites
    }

    fn skin_exists(&self, file: &str) -> bool {
        self.sprites.iter().any(|s| s == file)
    }

    fn overlay_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.overlays.keys().cloned().collect();
        names.sort();
        names
    }

    fn load_overlay(&mut self, name: &str) -> Option<usize> {
        self.overlays.get(name).copied()
    }
}
