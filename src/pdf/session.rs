//! One open document driven frame by frame
//!
//! `Session` owns the rasterizer, the document and page handles, the
//! buffer pair and the full-page cache. The host calls [`Session::update`]
//! once per frame with the button snapshot and presents
//! [`Session::front_buffer`] plus [`Session::overlay`] afterwards.

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use super::cache::{CacheKey, FullPageCache};
use super::error::{OpenError, PageError, SessionError};
use super::overlay::{Banner, Overlay};
use super::pan::PanEngine;
use super::pixels::PixelBuffer;
use super::rasterizer::{Rasterizer, TileLease};
use super::state::{Command, Effect, PageState};
use super::tile::TileRenderer;
use super::transform::ViewportTransform;
use super::types::{Rotation, ScreenSize};
use super::zoom::{self, ScrollDirection, Zoom};
use crate::bookmark::{
    Bookmark, BookmarkStore, VIEW_PAGE, VIEW_PAN_X, VIEW_PAN_Y, VIEW_ROTATION, VIEW_ZOOM_LEVEL,
};
use crate::inputs::ButtonReps;
use crate::settings::Settings;

/// Updates between two reopen attempts after a failed resume
pub const RESUME_RETRY_FRAMES: u32 = 60;

/// What the host should do after a frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewCommand {
    None,
    /// The front buffer or overlay changed, present again
    MarkDirty,
    /// Settings changed underneath the session, call [`Session::reload`]
    Reload,
    InvokeMenu,
    InvokePageChooser,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ResumeState {
    Idle,
    /// Host reported a suspend; reopen before the next page load
    Pending,
    /// Reopen failed; counts down to the next attempt
    Failed { retry_in: u32 },
}

pub struct Session<R: Rasterizer> {
    rasterizer: R,
    path: PathBuf,
    document: Option<R::Document>,
    page: Option<R::Page>,
    transform: Option<ViewportTransform>,
    state: PageState,
    pan: PanEngine,
    cache: FullPageCache,
    page_error: Option<PageError>,
    load_pending: bool,
    banner: Banner,
    resume: ResumeState,
}

impl<R: Rasterizer> Session<R> {
    /// Open `path`, restore its last view from `bookmarks` and render the
    /// first frame. A broken first page is not fatal.
    pub fn open(
        rasterizer: R,
        path: &Path,
        settings: &Settings,
        bookmarks: Option<&BookmarkStore>,
    ) -> Result<Self, SessionError> {
        let document = rasterizer.open(path)?;
        let page_count = rasterizer.page_count(&document);
        if page_count == 0 {
            return Err(SessionError::Empty);
        }
        info!("Opened {} ({page_count} pages)", path.display());

        let mut session = Self {
            rasterizer,
            path: path.to_path_buf(),
            document: Some(document),
            page: None,
            transform: None,
            state: PageState::new(page_count, settings.fast_scroll),
            pan: PanEngine::new(settings.screen),
            cache: FullPageCache::new(),
            page_error: None,
            load_pending: false,
            banner: Banner::default(),
            resume: ResumeState::Idle,
        };

        if let Some(last) = bookmarks.and_then(|b| b.last_view(&session.document_key())) {
            session.restore_view(last);
        }
        session.load_current_page();
        Ok(session)
    }

    /// Key under which bookmarks of this document are stored
    pub fn document_key(&self) -> String {
        std::path::absolute(&self.path)
            .unwrap_or_else(|_| self.path.clone())
            .to_string_lossy()
            .into_owned()
    }

    fn restore_view(&mut self, last: &Bookmark) {
        let page = last.view(VIEW_PAGE).map_or(last.page, |p| p.max(0) as usize);
        if (1..=self.state.page_count).contains(&page) {
            self.state.page = page;
        }
        if let Some(level) = last.view(VIEW_ZOOM_LEVEL) {
            let _ = self.state.apply(Command::SetZoomLevel(level.max(0) as usize));
        }
        if let Some(degrees) = last.view(VIEW_ROTATION) {
            let _ = self
                .state
                .apply(Command::SetRotation(Rotation::from_degrees(degrees as i32)));
        }
        let x = last.view(VIEW_PAN_X).unwrap_or(0) as i32;
        let y = last.view(VIEW_PAN_Y).unwrap_or(0) as i32;
        self.pan.set_offset(x, y);
        debug!("Restored last view: page {}, offset ({x}, {y})", self.state.page);
    }

    /// Record page and viewer position as the last view of this document
    pub fn save_last_view(&self, store: &mut BookmarkStore) {
        let key = self.document_key();
        let (x, y) = self.pan.offset();
        let page = self.state.page;
        let bookmark = Bookmark::last_view(page)
            .with_view(VIEW_PAGE, page as i64)
            .with_view(VIEW_PAN_X, i64::from(x))
            .with_view(VIEW_PAN_Y, i64::from(y))
            .with_view(VIEW_ZOOM_LEVEL, self.state.zoom.level() as i64)
            .with_view(VIEW_ROTATION, i64::from(self.state.rotation.degrees()));
        store.add_bookmark(&key, bookmark);
        store.set_last_file(&key);
    }

    /// Advance one frame
    pub fn update(&mut self, buttons: &ButtonReps, settings: &Settings) -> ViewCommand {
        if settings.fast_scroll != self.state.fast_scroll {
            return ViewCommand::Reload;
        }

        self.banner.tick();

        if let ResumeState::Failed { retry_in } = self.resume {
            if retry_in > 1 {
                self.resume = ResumeState::Failed {
                    retry_in: retry_in - 1,
                };
                if buttons.pressed(settings.controls.show_menu) {
                    return ViewCommand::InvokeMenu;
                }
                return ViewCommand::None;
            }
            self.resume = ResumeState::Pending;
        }

        if self.load_pending {
            if self.resume == ResumeState::Pending {
                if let Err(e) = self.reopen() {
                    warn!("Reopening {} after resume failed: {e}", self.path.display());
                    self.resume = ResumeState::Failed {
                        retry_in: RESUME_RETRY_FRAMES,
                    };
                    return ViewCommand::MarkDirty;
                }
                self.resume = ResumeState::Idle;
            }
            self.load_current_page();
            return ViewCommand::MarkDirty;
        }

        let controls = &settings.controls;
        let (old_x, old_y) = self.pan.offset();
        let (mut nx, mut ny) = (old_x, old_y);
        let mut full_redraw = false;

        if self.page_error.is_none() {
            for (button, direction) in [
                (controls.pan_up, ScrollDirection::Up),
                (controls.pan_down, ScrollDirection::Down),
                (controls.pan_left, ScrollDirection::Left),
                (controls.pan_right, ScrollDirection::Right),
            ] {
                if buttons.pressed_or_repeating(button) {
                    let (dx, dy) = zoom::pan_delta(direction);
                    nx += dx;
                    ny += dy;
                }
            }

            let mut view_commands = Vec::new();
            if buttons.pressed(controls.zoom_out) {
                view_commands.push(Command::ZoomOut);
            }
            if buttons.pressed(controls.zoom_in) {
                view_commands.push(Command::ZoomIn);
            }
            if controls.rotate_clockwise.is_some_and(|b| buttons.pressed(b)) {
                view_commands.push(Command::SetRotation(self.state.rotation.clockwise()));
            }
            if controls
                .rotate_counter_clockwise
                .is_some_and(|b| buttons.pressed(b))
            {
                view_commands.push(Command::SetRotation(self.state.rotation.counter_clockwise()));
            }

            for cmd in view_commands {
                let zooming = matches!(cmd, Command::ZoomIn | Command::ZoomOut);
                let old_factor = self.state.zoom.factor();
                let effects = self.state.apply(cmd);
                if zooming {
                    let new_factor = self.state.zoom.factor();
                    nx = zoom::rescale_offset(nx, old_factor, new_factor);
                    ny = zoom::rescale_offset(ny, old_factor, new_factor);
                    self.banner.show(self.state.zoom.label());
                }
                full_redraw |= self.handle_effects(effects);
            }
            if full_redraw {
                self.rebuild_transform();
            }

            if let Some(transform) = &self.transform {
                let screen = self.pan.screen();
                (nx, ny) = transform.clamp_offset(nx, ny, screen.width, screen.height);
            }
        }

        if full_redraw {
            self.pan.set_offset(nx, ny);
            if !self.load_pending {
                self.redraw_buffer();
            }
            return ViewCommand::MarkDirty;
        }
        if (nx, ny) != (old_x, old_y) {
            self.pan_buffer(nx, ny);
            return ViewCommand::MarkDirty;
        }

        if buttons.pressed(controls.show_menu) {
            return ViewCommand::InvokeMenu;
        }
        if buttons.pressed(controls.show_page_chooser) {
            return ViewCommand::InvokePageChooser;
        }

        if self.banner.is_active() {
            return ViewCommand::MarkDirty;
        }

        let mut step = 0isize;
        if buttons.pressed(controls.next_page) {
            step += 1;
        }
        if buttons.pressed(controls.previous_page) {
            step -= 1;
        }
        if buttons.pressed(controls.next_10_pages) {
            step += 10;
        }
        if buttons.pressed(controls.previous_10_pages) {
            step -= 10;
        }
        if step != 0 {
            let effects = self.state.apply(Command::StepPages(step));
            if !effects.is_empty() {
                self.handle_effects(effects);
                self.pan.set_offset(nx, 0);
                return ViewCommand::MarkDirty;
            }
        }

        ViewCommand::None
    }

    /// Apply state effects; true when the viewport needs a full redraw
    fn handle_effects(&mut self, effects: Vec<Effect>) -> bool {
        let mut full_redraw = false;
        for effect in effects {
            match effect {
                Effect::InvalidateFullPage => self.cache.release(&self.rasterizer),
                Effect::FullRedraw => full_redraw = true,
                Effect::LoadPage => {
                    self.load_pending = true;
                    full_redraw = true;
                }
            }
        }
        full_redraw
    }

    /// Apply changed settings after [`ViewCommand::Reload`]
    pub fn reload(&mut self, settings: &Settings) {
        let effects = self.state.apply(Command::SetFastScroll(settings.fast_scroll));
        self.handle_effects(effects);
        info!(
            "Reloading page {} (fast scroll {})",
            self.state.page,
            if settings.fast_scroll { "on" } else { "off" }
        );
    }

    /// Go to page `n` (1-based); out-of-range values are ignored
    pub fn set_page(&mut self, page: usize) -> bool {
        if !(1..=self.state.page_count).contains(&page) {
            return false;
        }
        let effects = self.state.apply(Command::GoToPage(page));
        self.handle_effects(effects);
        true
    }

    /// Go to page `n` and load it from the top on the next update
    pub fn reload_page(&mut self, page: usize) {
        if self.set_page(page) {
            self.load_pending = true;
            let (x, _) = self.pan.offset();
            self.pan.set_offset(x, 0);
        }
    }

    /// Jump to a zoom table index outside of button input
    pub fn set_zoom_level(&mut self, level: usize) {
        self.change_view(Command::SetZoomLevel(level));
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.change_view(Command::SetRotation(rotation));
    }

    fn change_view(&mut self, cmd: Command) {
        let old_factor = self.state.zoom.factor();
        let effects = self.state.apply(cmd);
        if effects.is_empty() {
            return;
        }
        let new_factor = self.state.zoom.factor();
        let (x, y) = self.pan.offset();
        let (mut x, mut y) = (
            zoom::rescale_offset(x, old_factor, new_factor),
            zoom::rescale_offset(y, old_factor, new_factor),
        );

        self.handle_effects(effects);
        self.rebuild_transform();
        if let Some(transform) = &self.transform {
            let screen = self.pan.screen();
            (x, y) = transform.clamp_offset(x, y, screen.width, screen.height);
        }
        self.pan.set_offset(x, y);
        if !self.load_pending {
            self.redraw_buffer();
        }
    }

    /// The host was suspended; the document is reopened on the next update
    pub fn notify_suspended(&mut self) {
        info!("Suspend reported, reopening {} on next update", self.path.display());
        self.resume = ResumeState::Pending;
        self.load_pending = true;
    }

    fn reopen(&mut self) -> Result<(), OpenError> {
        self.page = None;
        self.transform = None;
        self.cache.release(&self.rasterizer);

        match self.rasterizer.open(&self.path) {
            Ok(document) => {
                let page_count = self.rasterizer.page_count(&document);
                drop(self.document.replace(document));
                let _ = self.state.apply(Command::SetPageCount(page_count));
                info!("Reopened {} ({page_count} pages)", self.path.display());
                Ok(())
            }
            Err(e) => {
                drop(self.document.take());
                Err(e)
            }
        }
    }

    fn load_current_page(&mut self) {
        self.load_pending = false;
        self.page = None;
        self.transform = None;
        self.cache.release(&self.rasterizer);

        let Some(document) = &self.document else {
            return;
        };
        let number = self.state.page;
        self.banner
            .show(format!("Page {number} of {}", self.state.page_count));

        match self.rasterizer.load_page(document, number - 1) {
            Ok(page) => {
                self.page = Some(page);
                self.page_error = None;
                info!("Loaded page {number}");
            }
            Err(e) => {
                self.set_page_error(e);
                return;
            }
        }

        self.rebuild_transform();
        if let Some(transform) = &self.transform {
            let screen = self.pan.screen();
            let (x, y) = self.pan.offset();
            let (x, y) = transform.clamp_offset(x, y, screen.width, screen.height);
            self.pan.set_offset(x, y);
        }
        self.redraw_buffer();
    }

    fn rebuild_transform(&mut self) {
        if let Some(page) = &self.page {
            let geometry = self.rasterizer.page_geometry(page);
            self.transform = Some(ViewportTransform::new(
                geometry,
                self.state.zoom.factor(),
                self.state.rotation,
            ));
        }
    }

    fn cache_key(&self) -> CacheKey {
        CacheKey {
            page: self.state.page,
            zoom_level: self.state.zoom.level(),
            rotation: self.state.rotation,
        }
    }

    /// Repaint the viewport at the current offset
    fn redraw_buffer(&mut self) {
        let key = self.cache_key();
        let (Some(page), Some(transform)) = (&self.page, &self.transform) else {
            return;
        };
        let renderer = TileRenderer::new(&self.rasterizer, page, transform);
        let (x, y) = self.pan.offset();

        let result = if self.state.fast_scroll {
            if !self.cache.contains(&key) {
                let extent = transform.page_extent();
                let outcome = renderer.render_full_page().map(TileLease::into_inner);
                match outcome {
                    Ok(tile) => {
                        debug_assert_eq!((tile.width(), tile.height()), extent);
                        self.cache.store(&self.rasterizer, key, tile);
                    }
                    Err(e) => {
                        self.set_page_error(e);
                        return;
                    }
                }
            }
            self.pan.redraw_from_cache(&self.cache, x, y);
            Ok(())
        } else {
            self.pan.redraw_full(&renderer)
        };

        if let Err(e) = result {
            self.set_page_error(e);
        }
    }

    fn pan_buffer(&mut self, x: i32, y: i32) {
        if self.state.fast_scroll {
            self.pan.redraw_from_cache(&self.cache, x, y);
            return;
        }
        let (Some(page), Some(transform)) = (&self.page, &self.transform) else {
            return;
        };
        let renderer = TileRenderer::new(&self.rasterizer, page, transform);
        if let Err(e) = self.pan.pan_to(&renderer, x, y) {
            self.set_page_error(e);
        }
    }

    fn set_page_error(&mut self, e: PageError) {
        error!("Error in page {}: {e}", self.state.page);
        self.page_error = Some(e);
    }

    /// Buffer to present
    pub fn front_buffer(&self) -> &PixelBuffer {
        self.pan.front()
    }

    /// Labels to draw over the front buffer this frame
    pub fn overlay(&self, settings: &Settings) -> Overlay {
        let error = self
            .page_error
            .as_ref()
            .map(|e| format!("Error in page {}: {e}", self.state.page));
        let banner = (self.banner.is_active() && settings.display_labels)
            .then(|| (self.banner.text().to_string(), self.banner.alpha()));
        Overlay {
            error,
            loading: self.load_pending && settings.display_labels,
            banner,
        }
    }

    pub fn current_page(&self) -> usize {
        self.state.page
    }

    pub fn page_count(&self) -> usize {
        self.state.page_count
    }

    pub fn zoom(&self) -> Zoom {
        self.state.zoom
    }

    pub fn rotation(&self) -> Rotation {
        self.state.rotation
    }

    pub fn offset(&self) -> (i32, i32) {
        self.pan.offset()
    }

    pub fn screen(&self) -> ScreenSize {
        self.pan.screen()
    }

    pub fn page_error(&self) -> Option<&PageError> {
        self.page_error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.load_pending
    }

    pub fn is_resume_failed(&self) -> bool {
        matches!(self.resume, ResumeState::Failed { .. })
    }

    /// Device extent of the loaded page at the current zoom
    pub fn page_extent(&self) -> Option<(u32, u32)> {
        self.transform.as_ref().map(ViewportTransform::page_extent)
    }

    pub fn cached_full_page(&self) -> Option<(u32, u32)> {
        self.cache.dimensions()
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<R: Rasterizer> Drop for Session<R> {
    fn drop(&mut self) {
        self.cache.release(&self.rasterizer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::Button;
    use crate::test_utils::SyntheticRasterizer;

    fn open(pages: usize) -> Session<SyntheticRasterizer> {
        Session::open(
            SyntheticRasterizer::new(pages),
            Path::new("/docs/manual.pdf"),
            &Settings::default(),
            None,
        )
        .unwrap()
    }

    fn press(button: Button) -> ButtonReps {
        ButtonReps::default().with(button, 1)
    }

    #[test]
    fn open_renders_first_page() {
        let session = open(3);
        assert_eq!(session.current_page(), 1);
        assert_eq!(session.offset(), (0, 0));
        assert_eq!(session.page_extent(), Some((612, 792)));
        assert_eq!(session.rasterizer().stats().rendered, 1);
        assert!(session.overlay(&Settings::default()).banner.is_some());
    }

    #[test]
    fn empty_document_is_rejected() {
        let result = Session::open(
            SyntheticRasterizer::new(0),
            Path::new("empty.pdf"),
            &Settings::default(),
            None,
        );
        assert!(matches!(result, Err(SessionError::Empty)));
    }

    #[test]
    fn open_failure_is_reported() {
        let raster = SyntheticRasterizer::new(1);
        raster.fail_opens(Some(|| OpenError::EncryptionUnsupported));
        let result = Session::open(raster, Path::new("locked.pdf"), &Settings::default(), None);
        assert!(matches!(
            result,
            Err(SessionError::Open(OpenError::EncryptionUnsupported))
        ));
    }

    #[test]
    fn pan_is_clamped_at_origin() {
        let mut session = open(1);
        let settings = Settings::default();
        assert_eq!(session.update(&press(Button::Up), &settings), ViewCommand::MarkDirty);
        assert_eq!(session.offset(), (0, 0));
    }

    #[test]
    fn page_navigation_schedules_load() {
        let mut session = open(20);
        let settings = Settings::default();
        for _ in 0..super::super::overlay::BANNER_FRAMES {
            session.update(&ButtonReps::default(), &settings);
        }

        assert_eq!(session.update(&press(Button::Circle), &settings), ViewCommand::MarkDirty);
        assert_eq!(session.current_page(), 11);
        assert!(session.is_loading());
        assert!(session.overlay(&settings).loading);

        assert_eq!(session.update(&ButtonReps::default(), &settings), ViewCommand::MarkDirty);
        assert!(!session.is_loading());
        assert_eq!(
            session.overlay(&settings).banner.map(|(text, _)| text),
            Some("Page 11 of 20".to_string())
        );
    }

    #[test]
    fn banner_blocks_navigation_until_faded() {
        let mut session = open(5);
        let settings = Settings::default();
        assert_eq!(session.update(&press(Button::RTrigger), &settings), ViewCommand::MarkDirty);
        assert_eq!(session.current_page(), 1);
    }

    #[test]
    fn labels_follow_settings() {
        let session = open(2);
        let settings = Settings {
            display_labels: false,
            ..Settings::default()
        };
        assert!(session.overlay(&settings).is_empty());
    }

    #[test]
    fn set_page_ignores_out_of_range() {
        let mut session = open(4);
        assert!(!session.set_page(0));
        assert!(!session.set_page(5));
        assert!(session.set_page(3));
        assert_eq!(session.current_page(), 3);
    }

    #[test]
    fn save_last_view_records_position() {
        let mut session = open(4);
        let settings = Settings::default();
        session.update(&press(Button::Down), &settings);
        session.reload_page(2);
        session.update(&ButtonReps::default(), &settings);
        session.update(&press(Button::Down), &settings);

        let mut store = BookmarkStore::ephemeral();
        session.save_last_view(&mut store);
        let key = session.document_key();
        let last = store.last_view(&key).unwrap();
        assert_eq!(last.page, 2);
        assert_eq!(last.view(VIEW_PAN_Y), Some(16));
        assert_eq!(last.view(VIEW_ZOOM_LEVEL), Some(4));
        assert_eq!(store.last_file(), Some(key.as_str()));
    }

    #[test]
    fn dropping_session_releases_everything() {
        let raster = SyntheticRasterizer::new(2);
        let settings = Settings {
            fast_scroll: true,
            ..Settings::default()
        };
        let mut session = Session::open(&raster, Path::new("a.pdf"), &settings, None).unwrap();
        session.update(&press(Button::Down), &settings);
        assert_eq!(session.cached_full_page(), Some((612, 792)));
        drop(session);

        let stats = raster.stats();
        assert_eq!(stats.rendered, 1);
        assert_eq!(stats.released, stats.rendered);
        assert_eq!((stats.opened, stats.closed), (1, 1));
        assert_eq!(stats.pages_loaded, stats.pages_dropped);
    }
}
