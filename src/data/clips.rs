//! GIF overlay decoding.

use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, RgbaImage};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Decode every frame of a GIF into RGBA buffers.
pub fn decode_gif(path: &Path) -> Result<Vec<RgbaImage>, String> {
    let file =
        File::open(path).map_err(|e| format!("Open failed for {}: {}", path.display(), e))?;
    let decoder = GifDecoder::new(BufReader::new(file))
        .map_err(|e| format!("Not a GIF {}: {}", path.display(), e))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| format!("Frame decode failed for {}: {}", path.display(), e))?;
    if frames.is_empty() {
        return Err(format!("{} has no frames", path.display()));
    }
    Ok(frames.into_iter().map(|frame| frame.into_buffer()).collect())
}

pub fn frame_to_image(frame: RgbaImage) -> Image {
    let (width, height) = frame.dimensions();
    Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        frame.into_raw(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}
