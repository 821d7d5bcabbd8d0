//! MuPDF-backed rasterizer

use std::path::Path;

use log::{debug, warn};
use mupdf::{Colorspace, Device, Document, Page, Pixmap};

use super::color::pack_native;
use super::error::{OpenError, PageError};
use super::rasterizer::{Rasterizer, Tile};
use super::transform::Matrix;
use super::types::{IRect, PageGeometry, Rect, Rotation};

/// Renders through MuPDF. Stateless; all state lives in the handles.
#[derive(Clone, Copy, Debug, Default)]
pub struct MupdfRasterizer;

pub struct MupdfPage {
    page: Page,
    bounds: Rect,
}

impl MupdfRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Rasterizer for MupdfRasterizer {
    type Document = Document;
    type Page = MupdfPage;

    fn open(&self, path: &Path) -> Result<Document, OpenError> {
        std::fs::metadata(path).map_err(|source| OpenError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut doc = Document::open(path.to_string_lossy().as_ref())
            .map_err(|e| OpenError::corrupt(e.to_string()))?;

        if doc.needs_password().map_err(|e| OpenError::corrupt(e.to_string()))? {
            let unlocked = doc.authenticate("").unwrap_or(false);
            if !unlocked {
                return Err(OpenError::EncryptionUnsupported);
            }
            debug!("Opened {} with empty password", path.display());
        }

        match doc.outlines() {
            Ok(outlines) if outlines.is_empty() => {
                warn!("{} has no outline", path.display());
            }
            Ok(_) => {}
            Err(e) => warn!("Could not read outline of {}: {e}", path.display()),
        }
        Ok(doc)
    }

    fn page_count(&self, doc: &Document) -> usize {
        match doc.page_count() {
            Ok(count) => count.max(0) as usize,
            Err(e) => {
                warn!("Could not count pages: {e}");
                0
            }
        }
    }

    fn load_page(&self, doc: &Document, index: usize) -> Result<MupdfPage, PageError> {
        let count = self.page_count(doc);
        if index >= count {
            return Err(PageError::OutOfRange {
                page: index + 1,
                count,
            });
        }
        let page = doc
            .load_page(index as i32)
            .map_err(|e| PageError::content(e.to_string()))?;
        let b = page.bounds().map_err(|e| PageError::content(e.to_string()))?;
        Ok(MupdfPage {
            page,
            bounds: Rect::new(b.x0, b.y0, b.x1, b.y1),
        })
    }

    /// MuPDF bounds already include the page's own rotation
    fn page_geometry(&self, page: &MupdfPage) -> PageGeometry {
        PageGeometry::new(page.bounds, Rotation::Deg0)
    }

    fn render(&self, page: &MupdfPage, ctm: &Matrix, region: IRect) -> Result<Tile, PageError> {
        // MuPDF page space is y-down; flip it into the y-up space `ctm` expects.
        let flip = Matrix::new(1.0, 0.0, 0.0, -1.0, 0.0, page.bounds.y0 + page.bounds.y1);
        let m = flip.concat(ctm);
        let matrix = mupdf::Matrix::new(m.a, m.b, m.c, m.d, m.e, m.f);

        let render_err = |e: mupdf::error::Error| PageError::render(e.to_string());
        let rect = mupdf::IRect::new(region.x0, region.y0, region.x1, region.y1);
        let mut pixmap =
            Pixmap::new_with_rect(&Colorspace::device_rgb(), rect, false).map_err(render_err)?;
        pixmap.clear_with(255).map_err(render_err)?;
        {
            let device = Device::from_pixmap(&pixmap).map_err(render_err)?;
            page.page
                .run(&device, &matrix)
                .map_err(|e| PageError::content(e.to_string()))?;
        }

        let samples = pixmap_to_native(&pixmap, region)?;
        Ok(Tile { region, samples })
    }
}

fn pixmap_to_native(pixmap: &Pixmap, region: IRect) -> Result<Vec<u32>, PageError> {
    let n = pixmap.n() as usize;
    let width = region.width() as usize;
    let height = region.height() as usize;
    if n < 3 || pixmap.width() as usize != width || pixmap.height() as usize != height {
        return Err(PageError::render(format!(
            "unexpected pixmap {}x{}x{n} for {region:?}",
            pixmap.width(),
            pixmap.height()
        )));
    }

    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    if samples.len() < stride * height || width * n > stride {
        return Err(PageError::render("pixmap buffer size mismatch"));
    }

    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = &samples[y * stride..y * stride + width * n];
        out.extend(row.chunks_exact(n).map(|px| pack_native(0xFF, px[0], px[1], px[2])));
    }
    Ok(out)
}
