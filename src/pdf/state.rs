//! Page, zoom and rotation state management

use super::types::Rotation;
use super::zoom::Zoom;

/// Navigation and view state for the open document
#[derive(Clone, Debug, PartialEq)]
pub struct PageState {
    /// Current page (1-based)
    pub page: usize,

    /// Total page count
    pub page_count: usize,

    /// Zoom table position
    pub zoom: Zoom,

    /// User rotation on top of the page's own rotation
    pub rotation: Rotation,

    /// Whether the full-page cache serves pans
    pub fast_scroll: bool,
}

impl PageState {
    #[must_use]
    pub fn new(page_count: usize, fast_scroll: bool) -> Self {
        Self {
            page: 1,
            page_count,
            zoom: Zoom::default(),
            rotation: Rotation::Deg0,
            fast_scroll,
        }
    }

    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::GoToPage(page) => {
                let clamped = page.clamp(1, self.page_count.max(1));
                if self.page != clamped {
                    self.page = clamped;
                    vec![Effect::InvalidateFullPage, Effect::LoadPage]
                } else {
                    vec![]
                }
            }

            Command::StepPages(delta) => {
                let target = self.page.saturating_add_signed(delta).max(1);
                self.apply(Command::GoToPage(target))
            }

            Command::ZoomIn => {
                let mut zoom = self.zoom;
                zoom.step_in(self.fast_scroll);
                self.set_zoom(zoom)
            }

            Command::ZoomOut => {
                let mut zoom = self.zoom;
                zoom.step_out(self.fast_scroll);
                self.set_zoom(zoom)
            }

            Command::SetZoomLevel(level) => {
                let mut zoom = self.zoom;
                zoom.set_level(level, self.fast_scroll);
                self.set_zoom(zoom)
            }

            Command::SetRotation(rotation) => {
                if self.rotation != rotation {
                    self.rotation = rotation;
                    self.view_changed()
                } else {
                    vec![]
                }
            }

            Command::SetPageCount(count) => {
                self.page_count = count;
                if self.page > count && count > 0 {
                    self.page = count;
                }
                vec![]
            }

            Command::SetFastScroll(enabled) => {
                if self.fast_scroll != enabled {
                    self.fast_scroll = enabled;
                    let mut zoom = self.zoom;
                    zoom.set_level(zoom.level(), enabled);
                    self.zoom = zoom;
                    vec![Effect::InvalidateFullPage, Effect::LoadPage]
                } else {
                    vec![]
                }
            }
        }
    }

    fn set_zoom(&mut self, zoom: Zoom) -> Vec<Effect> {
        if self.zoom != zoom {
            self.zoom = zoom;
            self.view_changed()
        } else {
            vec![]
        }
    }

    /// Zoom or rotation changed: the cached page raster no longer matches.
    /// Fast scroll re-renders the whole page through a page load, the
    /// incremental path repaints the viewport.
    fn view_changed(&self) -> Vec<Effect> {
        if self.fast_scroll {
            vec![Effect::InvalidateFullPage, Effect::LoadPage]
        } else {
            vec![Effect::InvalidateFullPage, Effect::FullRedraw]
        }
    }
}

/// Commands that modify page state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Go to a specific page (1-based), clamped to the document
    GoToPage(usize),
    /// Move forwards or backwards by a number of pages
    StepPages(isize),
    ZoomIn,
    ZoomOut,
    /// Jump to a zoom table index
    SetZoomLevel(usize),
    SetRotation(Rotation),
    /// Update the page count
    SetPageCount(usize),
    /// Switch the full-page cache on or off
    SetFastScroll(bool),
}

/// Effects produced by state changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Release the full-page buffer
    InvalidateFullPage,
    /// Repaint the whole viewport at the current offset
    FullRedraw,
    /// Load the current page on the next frame
    LoadPage,
}
