//! Deterministic rasterizer and input scripting for tests
//!
//! `SyntheticRasterizer` paints every device pixel as a pure function of
//! its position, the page and the transform, so any two renders of the
//! same device area agree bit for bit. It also counts every handle and
//! tile it hands out.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::pdf::color::pack_native;
use crate::pdf::error::{OpenError, PageError};
use crate::pdf::rasterizer::{Rasterizer, Tile};
use crate::pdf::transform::Matrix;
use crate::pdf::{IRect, PageGeometry};

/// White, as painted outside the page bounds
pub const PAPER: u32 = pack_native(0xFF, 0xFF, 0xFF, 0xFF);

/// Resource counters of a [`SyntheticRasterizer`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub opened: usize,
    pub closed: usize,
    pub pages_loaded: usize,
    pub pages_dropped: usize,
    pub rendered: usize,
    pub released: usize,
}

type SharedStats = Rc<RefCell<RasterStats>>;

pub struct SyntheticDocument {
    path: PathBuf,
    page_count: usize,
    stats: SharedStats,
}

impl SyntheticDocument {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SyntheticDocument {
    fn drop(&mut self) {
        self.stats.borrow_mut().closed += 1;
    }
}

pub struct SyntheticPage {
    index: usize,
    geometry: PageGeometry,
    stats: SharedStats,
}

impl Drop for SyntheticPage {
    fn drop(&mut self) {
        self.stats.borrow_mut().pages_dropped += 1;
    }
}

pub struct SyntheticRasterizer {
    page_count: Cell<usize>,
    geometry: Cell<PageGeometry>,
    corrupt_pages: RefCell<HashSet<usize>>,
    open_failure: RefCell<Option<fn() -> OpenError>>,
    fail_renders: Cell<bool>,
    stats: SharedStats,
    regions: RefCell<Vec<IRect>>,
}

impl SyntheticRasterizer {
    /// Rasterizer whose documents have `page_count` US Letter pages
    pub fn new(page_count: usize) -> Self {
        Self {
            page_count: Cell::new(page_count),
            geometry: Cell::new(PageGeometry::letter()),
            corrupt_pages: RefCell::new(HashSet::new()),
            open_failure: RefCell::new(None),
            fail_renders: Cell::new(false),
            stats: SharedStats::default(),
            regions: RefCell::new(Vec::new()),
        }
    }

    /// Use `geometry` for every page
    pub fn with_geometry(self, geometry: PageGeometry) -> Self {
        self.geometry.set(geometry);
        self
    }

    /// Make `page` (1-based) fail to load with a content error
    pub fn with_corrupt_page(self, page: usize) -> Self {
        self.corrupt_pages.borrow_mut().insert(page);
        self
    }

    /// Change the page count reported by documents opened from now on
    pub fn set_page_count(&self, page_count: usize) {
        self.page_count.set(page_count);
    }

    /// Make every following `open` fail with the error `make` builds
    pub fn fail_opens(&self, make: Option<fn() -> OpenError>) {
        *self.open_failure.borrow_mut() = make;
    }

    /// Make every following `render` fail
    pub fn fail_renders(&self, fail: bool) {
        self.fail_renders.set(fail);
    }

    pub fn stats(&self) -> RasterStats {
        *self.stats.borrow()
    }

    /// Device regions rendered since the last [`Self::clear_log`]
    pub fn rendered_regions(&self) -> Vec<IRect> {
        self.regions.borrow().clone()
    }

    pub fn clear_log(&self) {
        self.regions.borrow_mut().clear();
    }

    /// Native pixel the rasterizer paints at device `(x, y)`
    pub fn native_pixel(page: usize, ctm: &Matrix, bounds: IRect, x: i32, y: i32) -> u32 {
        if x < bounds.x0 || x >= bounds.x1 || y < bounds.y0 || y >= bounds.y1 {
            return PAPER;
        }
        let scale = (ctm.a.abs() + ctm.b.abs()).to_bits();
        let r = (x.wrapping_mul(7) ^ y) as u8;
        let g = (y.wrapping_mul(3)).wrapping_add(x) as u8;
        let b = (page as u32 ^ scale ^ (scale >> 16)) as u8;
        pack_native(0xFF, r, g, b)
    }
}

impl Rasterizer for SyntheticRasterizer {
    type Document = SyntheticDocument;
    type Page = SyntheticPage;

    fn open(&self, path: &Path) -> Result<SyntheticDocument, OpenError> {
        if let Some(make) = *self.open_failure.borrow() {
            return Err(make());
        }
        self.stats.borrow_mut().opened += 1;
        Ok(SyntheticDocument {
            path: path.to_path_buf(),
            page_count: self.page_count.get(),
            stats: Rc::clone(&self.stats),
        })
    }

    fn page_count(&self, doc: &SyntheticDocument) -> usize {
        doc.page_count
    }

    fn load_page(&self, doc: &SyntheticDocument, index: usize) -> Result<SyntheticPage, PageError> {
        if index >= doc.page_count {
            return Err(PageError::OutOfRange {
                page: index + 1,
                count: doc.page_count,
            });
        }
        if self.corrupt_pages.borrow().contains(&(index + 1)) {
            return Err(PageError::content("syntax error in content stream"));
        }
        self.stats.borrow_mut().pages_loaded += 1;
        Ok(SyntheticPage {
            index,
            geometry: self.geometry.get(),
            stats: Rc::clone(&self.stats),
        })
    }

    fn page_geometry(&self, page: &SyntheticPage) -> PageGeometry {
        page.geometry
    }

    fn render(&self, page: &SyntheticPage, ctm: &Matrix, region: IRect) -> Result<Tile, PageError> {
        if self.fail_renders.get() {
            return Err(PageError::render("out of memory"));
        }
        let bounds = ctm.transform_aabb(&page.geometry.media_box).round_out();
        let samples = (region.y0..region.y1)
            .flat_map(|y| (region.x0..region.x1).map(move |x| (x, y)))
            .map(|(x, y)| Self::native_pixel(page.index, ctm, bounds, x, y))
            .collect();

        self.stats.borrow_mut().rendered += 1;
        self.regions.borrow_mut().push(region);
        Ok(Tile { region, samples })
    }

    fn release(&self, tile: Tile) {
        self.stats.borrow_mut().released += 1;
        drop(tile);
    }
}

pub mod test_helpers {
    use crate::inputs::{Button, ButtonReps};

    /// Builder for per-frame button snapshots fed to `Session::update`
    #[derive(Default)]
    pub struct FrameScriptBuilder {
        frames: Vec<ButtonReps>,
    }

    impl FrameScriptBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        /// One frame with `button` freshly pressed
        pub fn press(mut self, button: Button) -> Self {
            self.frames.push(ButtonReps::default().with(button, 1));
            self
        }

        /// Press `button` on `times` separate frames, releasing in between
        pub fn tap(mut self, button: Button, times: usize) -> Self {
            for _ in 0..times {
                self = self.press(button).idle(1);
            }
            self
        }

        /// Hold `button` for `frames` frames, counting up from 1
        pub fn hold(mut self, button: Button, frames: u32) -> Self {
            let mut reps = ButtonReps::default();
            for _ in 0..frames {
                reps = reps.advance(&[button]);
                self.frames.push(reps);
            }
            self
        }

        /// Frames with nothing pressed
        pub fn idle(mut self, frames: usize) -> Self {
            self.frames
                .extend(std::iter::repeat_n(ButtonReps::default(), frames));
            self
        }

        pub fn build(self) -> Vec<ButtonReps> {
            self.frames
        }
    }
}
