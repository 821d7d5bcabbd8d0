//! Boundary to the external document rasterizer

use std::path::Path;

use super::error::{OpenError, PageError};
use super::transform::Matrix;
use super::types::{IRect, PageGeometry};

/// Rectangle of native rasterizer pixels (see [`super::color`] for packing)
#[derive(Clone, PartialEq, Eq)]
pub struct Tile {
    /// Device-space area covered by the tile
    pub region: IRect,
    /// Row-major native pixels, `region.width() * region.height()` long
    pub samples: Vec<u32>,
}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tile")
            .field("region", &self.region)
            .field("samples_len", &self.samples.len())
            .finish()
    }
}

impl Tile {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.region.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.region.height()
    }
}

/// Document rendering library as seen by the viewer core.
///
/// Closing a document or page is dropping its handle.
pub trait Rasterizer {
    type Document;
    type Page;

    fn open(&self, path: &Path) -> Result<Self::Document, OpenError>;

    fn page_count(&self, doc: &Self::Document) -> usize;

    /// Load a page by 0-based index
    fn load_page(&self, doc: &Self::Document, index: usize) -> Result<Self::Page, PageError>;

    fn page_geometry(&self, page: &Self::Page) -> PageGeometry;

    /// Rasterize `region` of the device raster produced by `ctm`
    fn render(&self, page: &Self::Page, ctm: &Matrix, region: IRect) -> Result<Tile, PageError>;

    /// Give a tile's storage back to the rasterizer
    fn release(&self, tile: Tile) {
        drop(tile);
    }
}

impl<R: Rasterizer + ?Sized> Rasterizer for &R {
    type Document = R::Document;
    type Page = R::Page;

    fn open(&self, path: &Path) -> Result<Self::Document, OpenError> {
        (**self).open(path)
    }

    fn page_count(&self, doc: &Self::Document) -> usize {
        (**self).page_count(doc)
    }

    fn load_page(&self, doc: &Self::Document, index: usize) -> Result<Self::Page, PageError> {
        (**self).load_page(doc, index)
    }

    fn page_geometry(&self, page: &Self::Page) -> PageGeometry {
        (**self).page_geometry(page)
    }

    fn render(&self, page: &Self::Page, ctm: &Matrix, region: IRect) -> Result<Tile, PageError> {
        (**self).render(page, ctm, region)
    }

    fn release(&self, tile: Tile) {
        (**self).release(tile);
    }
}

/// Scoped ownership of a rendered tile.
///
/// The tile is handed back through [`Rasterizer::release`] exactly once,
/// when the lease drops, on every exit path.
pub struct TileLease<'a, R: Rasterizer + ?Sized> {
    rasterizer: &'a R,
    tile: Option<Tile>,
}

impl<'a, R: Rasterizer + ?Sized> TileLease<'a, R> {
    pub fn new(rasterizer: &'a R, tile: Tile) -> Self {
        Self {
            rasterizer,
            tile: Some(tile),
        }
    }

    /// Take the tile out of the lease; the caller becomes responsible for it
    #[must_use]
    pub fn into_inner(mut self) -> Tile {
        self.tile
            .take()
            .unwrap_or_else(|| unreachable!("lease always holds a tile until dropped"))
    }
}

impl<R: Rasterizer + ?Sized> std::ops::Deref for TileLease<'_, R> {
    type Target = Tile;

    fn deref(&self) -> &Tile {
        self.tile
            .as_ref()
            .unwrap_or_else(|| unreachable!("lease always holds a tile until dropped"))
    }
}

impl<R: Rasterizer + ?Sized> Drop for TileLease<'_, R> {
    fn drop(&mut self) {
        if let Some(tile) = self.tile.take() {
            self.rasterizer.release(tile);
        }
    }
}
