//! Incremental panning over a double-buffered viewport
//!
//! A pan keeps the pixels that stay on screen, moves them inside the back
//! buffer and renders only the strip that scrolled into view. Vertical and
//! horizontal deltas are applied one after the other, each ending with a
//! buffer swap, so rendering cost follows the exposed area.

use log::debug;

use super::cache::FullPageCache;
use super::color;
use super::error::PageError;
use super::pixels::{BufferPair, PixelBuffer};
use super::rasterizer::Rasterizer;
use super::tile::TileRenderer;
use super::types::ScreenSize;

/// Viewport offset plus the buffer pair it is drawn into
#[derive(Debug)]
pub struct PanEngine {
    screen: ScreenSize,
    buffers: BufferPair,
    pan_x: i32,
    pan_y: i32,
}

impl PanEngine {
    #[must_use]
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            screen,
            buffers: BufferPair::new(screen),
            pan_x: 0,
            pan_y: 0,
        }
    }

    #[must_use]
    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    /// Current viewport offset in device pixels
    #[must_use]
    pub fn offset(&self) -> (i32, i32) {
        (self.pan_x, self.pan_y)
    }

    /// Move the viewport without touching pixels; the next redraw uses it
    pub fn set_offset(&mut self, x: i32, y: i32) {
        self.pan_x = x;
        self.pan_y = y;
    }

    /// Buffer safe to present
    #[must_use]
    pub fn front(&self) -> &PixelBuffer {
        self.buffers.front()
    }

    #[must_use]
    pub fn buffers(&self) -> &BufferPair {
        &self.buffers
    }

    /// Repaint the whole viewport with one screen-sized tile
    pub fn redraw_full<R: Rasterizer>(&mut self, renderer: &TileRenderer<'_, R>) -> Result<(), PageError> {
        let ScreenSize { width, height } = self.screen;
        let tile = renderer.render_viewport(self.pan_x, self.pan_y, width, height)?;

        let back = self.buffers.back_mut();
        color::copy_rect_normalized(
            back.pixels_mut(),
            0,
            width as usize,
            &tile.samples,
            width as usize,
            height as usize,
        );
        drop(tile);

        self.buffers.swap();
        debug!("full redraw at ({}, {})", self.pan_x, self.pan_y);
        Ok(())
    }

    /// Present the window at `(x, y)` from the full-page cache
    pub fn redraw_from_cache(&mut self, cache: &FullPageCache, x: i32, y: i32) -> bool {
        self.set_offset(x, y);
        if !cache.blit(x, y, self.buffers.back_mut()) {
            return false;
        }
        self.buffers.swap();
        true
    }

    /// Move the viewport to `(new_x, new_y)`, rendering only exposed strips.
    ///
    /// Each axis renders its strip before touching any buffer; a failed
    /// render leaves that axis' pixels and offset unchanged.
    pub fn pan_to<R: Rasterizer>(
        &mut self,
        renderer: &TileRenderer<'_, R>,
        new_x: i32,
        new_y: i32,
    ) -> Result<(), PageError> {
        if new_y != self.pan_y {
            self.shift_vertical(renderer, new_y)?;
        }
        if new_x != self.pan_x {
            self.shift_horizontal(renderer, new_x)?;
        }
        Ok(())
    }

    fn shift_vertical<R: Rasterizer>(
        &mut self,
        renderer: &TileRenderer<'_, R>,
        new_y: i32,
    ) -> Result<(), PageError> {
        let ScreenSize { width, height } = self.screen;
        let dy = new_y - self.pan_y;
        let strip_h = dy.unsigned_abs().min(height);
        let retained = height - strip_h;
        let strip_y = if dy > 0 { new_y + retained as i32 } else { new_y };

        let tile = renderer.render_viewport(self.pan_x, strip_y, width, strip_h)?;

        let w = width as usize;
        let (front, back) = self.buffers.split();
        let n = retained as usize * w;
        if n > 0 {
            let (src_row, dst_row) = if dy > 0 {
                (strip_h as usize, 0)
            } else {
                (0, strip_h as usize)
            };
            back.pixels_mut()[dst_row * w..dst_row * w + n]
                .copy_from_slice(&front.pixels()[src_row * w..src_row * w + n]);
        }

        let strip_row = if dy > 0 { retained as usize } else { 0 };
        color::copy_rect_normalized(
            back.pixels_mut(),
            strip_row * w,
            w,
            &tile.samples,
            w,
            strip_h as usize,
        );
        drop(tile);

        self.pan_y = new_y;
        self.buffers.swap();
        debug!("vertical pan by {dy}: {strip_h} rows rendered");
        Ok(())
    }

    fn shift_horizontal<R: Rasterizer>(
        &mut self,
        renderer: &TileRenderer<'_, R>,
        new_x: i32,
    ) -> Result<(), PageError> {
        let ScreenSize { width, height } = self.screen;
        let dx = new_x - self.pan_x;
        let strip_w = dx.unsigned_abs().min(width);
        let retained = width - strip_w;
        let strip_x = if dx > 0 { new_x + retained as i32 } else { new_x };

        let tile = renderer.render_viewport(strip_x, self.pan_y, strip_w, height)?;

        let w = width as usize;
        let (sw, rw) = (strip_w as usize, retained as usize);
        let (front, back) = self.buffers.split();
        if rw > 0 {
            let (src_col, dst_col) = if dx > 0 { (sw, 0) } else { (0, sw) };
            let src = front.pixels();
            let dst = back.pixels_mut();
            for row in 0..height as usize {
                let base = row * w;
                dst[base + dst_col..base + dst_col + rw]
                    .copy_from_slice(&src[base + src_col..base + src_col + rw]);
            }
        }

        let strip_col = if dx > 0 { rw } else { 0 };
        color::copy_rect_normalized(back.pixels_mut(), strip_col, w, &tile.samples, sw, height as usize);
        drop(tile);

        self.pan_x = new_x;
        self.buffers.swap();
        debug!("horizontal pan by {dx}: {strip_w} columns rendered");
        Ok(())
    }
}
