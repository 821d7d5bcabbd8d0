//! Full-page raster cache for fast-scroll mode
//!
//! The whole page is rendered once and color-normalized in place, so
//! every later pan is a plain row copy out of this buffer.

use log::debug;

use super::color;
use super::pixels::PixelBuffer;
use super::rasterizer::{Rasterizer, Tile};
use super::types::Rotation;

/// Fill for screen area not covered by a small page
pub const NEUTRAL_FILL: u32 = 0x5050_5050;

/// Identity of a cached page raster
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Page number (1-based)
    pub page: usize,
    /// Zoom table index
    pub zoom_level: usize,
    /// Effective user rotation
    pub rotation: Rotation,
}

/// Single-entry cache of the current page's full raster
#[derive(Debug, Default)]
pub struct FullPageCache {
    entry: Option<(CacheKey, Tile)>,
}

impl FullPageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the cache holds the raster for `key`
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entry.as_ref().is_some_and(|(k, _)| k == key)
    }

    /// Cached raster size in pixels
    #[must_use]
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.entry.as_ref().map(|(_, t)| (t.width(), t.height()))
    }

    /// Bytes held by the cached raster
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.entry
            .as_ref()
            .map_or(0, |(_, t)| t.samples.len() * std::mem::size_of::<u32>())
    }

    /// Replace the cached raster. The previous one is released first and
    /// the new one is normalized once here.
    pub fn store<R: Rasterizer + ?Sized>(&mut self, rasterizer: &R, key: CacheKey, mut tile: Tile) {
        self.release(rasterizer);
        color::normalize_in_place(&mut tile.samples);
        self.entry = Some((key, tile));
        if let Some((w, h)) = self.dimensions() {
            debug!("cached full page {} at {w}x{h} ({} bytes)", key.page, self.byte_len());
        }
    }

    /// Hand the cached raster back to the rasterizer
    pub fn release<R: Rasterizer + ?Sized>(&mut self, rasterizer: &R) {
        if let Some((key, tile)) = self.entry.take() {
            debug!("released full page {}", key.page);
            rasterizer.release(tile);
        }
    }

    /// Copy the window at `(pan_x, pan_y)` into `dst`.
    ///
    /// A page narrower or shorter than `dst` is centered on that axis and
    /// the uncovered area gets [`NEUTRAL_FILL`]. Returns false when empty.
    pub fn blit(&self, pan_x: i32, pan_y: i32, dst: &mut PixelBuffer) -> bool {
        let Some((_, tile)) = &self.entry else {
            return false;
        };

        let (page_w, page_h) = (tile.width() as usize, tile.height() as usize);
        let (screen_w, screen_h) = (dst.width() as usize, dst.height() as usize);

        let (src_x, dst_x, copy_w, fill_x) = clip_axis(pan_x, page_w, screen_w);
        let (src_y, dst_y, copy_h, fill_y) = clip_axis(pan_y, page_h, screen_h);

        let pixels = dst.pixels_mut();
        if fill_x || fill_y {
            pixels.fill(NEUTRAL_FILL);
        }
        for row in 0..copy_h {
            let s = (src_y + row) * page_w + src_x;
            let d = (dst_y + row) * screen_w + dst_x;
            pixels[d..d + copy_w].copy_from_slice(&tile.samples[s..s + copy_w]);
        }
        true
    }
}

/// Source offset, destination offset, copy length and whether filling is needed
fn clip_axis(pan: i32, page: usize, screen: usize) -> (usize, usize, usize, bool) {
    if page < screen {
        (0, (screen - page) / 2, page, true)
    } else {
        let src = (pan.max(0) as usize).min(page - screen);
        (src, 0, screen, false)
    }
}
