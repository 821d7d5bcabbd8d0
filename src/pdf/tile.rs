//! Rendering of arbitrary page regions

use log::debug;

use super::error::PageError;
use super::rasterizer::{Rasterizer, TileLease};
use super::transform::ViewportTransform;
use super::types::IRect;

/// Renders regions of one loaded page at one transform
pub struct TileRenderer<'a, R: Rasterizer> {
    rasterizer: &'a R,
    page: &'a R::Page,
    transform: &'a ViewportTransform,
}

impl<'a, R: Rasterizer> TileRenderer<'a, R> {
    pub fn new(rasterizer: &'a R, page: &'a R::Page, transform: &'a ViewportTransform) -> Self {
        Self {
            rasterizer,
            page,
            transform,
        }
    }

    /// Device rectangle of a viewport-relative request
    #[must_use]
    pub fn viewport_region(&self, x: i32, y: i32, width: u32, height: u32) -> IRect {
        let (ox, oy) = self.transform.device_origin();
        IRect::from_origin_size(ox + x, oy + y, width, height)
    }

    /// Render `width x height` device pixels at viewport offset `(x, y)`.
    /// Both edges of a strip share the page's device origin, so adjacent
    /// strips never overlap or leave a gap.
    pub fn render_viewport(
        &self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<TileLease<'a, R>, PageError> {
        self.render_region(self.viewport_region(x, y, width, height))
    }

    /// Render the page's whole device raster, exactly
    /// [`ViewportTransform::device_bounds`]
    pub fn render_full_page(&self) -> Result<TileLease<'a, R>, PageError> {
        self.render_region(self.transform.device_bounds())
    }

    fn render_region(&self, region: IRect) -> Result<TileLease<'a, R>, PageError> {
        debug!("render tile {region:?}");

        let tile = self.rasterizer.render(self.page, self.transform.ctm(), region)?;
        let lease = TileLease::new(self.rasterizer, tile);

        let expected = region.width() as usize * region.height() as usize;
        if lease.region != region || lease.samples.len() != expected {
            return Err(PageError::render(format!(
                "rasterizer returned {:?} with {} samples for {region:?}",
                lease.region,
                lease.samples.len()
            )));
        }
        Ok(lease)
    }
}
