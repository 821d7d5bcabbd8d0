//! Zoom and pan state for page rendering
//!
//! Zoom is always one entry of a fixed table, addressed by index. Pan
//! offsets are device pixels at the current zoom.

/// Allowed zoom factors, from deep zoom-out to large zoom-in
pub const ZOOM_LEVELS: [f32; 25] = [
    0.25, 0.5, 0.75, 0.90, 1.0, 1.1, 1.2, 1.3, 1.4, 1.5, 1.6, 1.7, 1.8, 1.9, 2.0, 2.25, 2.5, 2.75,
    3.0, 3.5, 4.0, 5.0, 7.5, 10.0, 16.0,
];

/// Scroll/pan direction for viewport navigation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Zoom level index into [`ZOOM_LEVELS`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    level: usize,
    factor: f32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self::at_level(Self::DEFAULT_LEVEL)
    }
}

impl Zoom {
    /// Index of the 1.0 factor
    pub const DEFAULT_LEVEL: usize = 4;
    /// Highest index reachable while the full-page cache is active
    pub const FAST_SCROLL_MAX_LEVEL: usize = 14;
    /// Factor forced at the fast-scroll ceiling
    pub const FAST_SCROLL_MAX_FACTOR: f32 = 2.0;

    /// Pan step in device pixels for one press or repeat
    pub const PAN_STEP: i32 = 16;

    /// Zoom at a table index, clamped to the table
    #[must_use]
    pub fn at_level(level: usize) -> Self {
        let level = level.min(ZOOM_LEVELS.len() - 1);
        Self {
            level,
            factor: ZOOM_LEVELS[level],
        }
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Returns the current zoom factor
    #[must_use]
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Zoom in by one table step
    pub fn step_in(&mut self, fast_scroll: bool) {
        self.set_level(self.level.saturating_add(1), fast_scroll);
    }

    /// Zoom out by one table step
    pub fn step_out(&mut self, fast_scroll: bool) {
        self.set_level(self.level.saturating_sub(1), fast_scroll);
    }

    /// Jump to a table index, honoring the fast-scroll ceiling
    pub fn set_level(&mut self, level: usize, fast_scroll: bool) {
        let mut level = level.min(ZOOM_LEVELS.len() - 1);
        if fast_scroll && level > Self::FAST_SCROLL_MAX_LEVEL {
            level = Self::FAST_SCROLL_MAX_LEVEL;
            self.level = level;
            self.factor = Self::FAST_SCROLL_MAX_FACTOR;
            return;
        }
        self.level = level;
        self.factor = ZOOM_LEVELS[level];
    }

    /// Display form used by the zoom banner, e.g. "Zoom 1.1x"
    #[must_use]
    pub fn label(&self) -> String {
        format!("Zoom {}x", self.factor)
    }
}

/// Pixel delta for one pan step in the given direction
#[must_use]
pub fn pan_delta(direction: ScrollDirection) -> (i32, i32) {
    match direction {
        ScrollDirection::Up => (0, -Zoom::PAN_STEP),
        ScrollDirection::Down => (0, Zoom::PAN_STEP),
        ScrollDirection::Left => (-Zoom::PAN_STEP, 0),
        ScrollDirection::Right => (Zoom::PAN_STEP, 0),
    }
}

/// Rescale a pan offset so the same page point stays at the window corner
#[must_use]
pub fn rescale_offset(offset: i32, old_factor: f32, new_factor: f32) -> i32 {
    if old_factor <= 0.0 || !new_factor.is_finite() {
        return offset;
    }
    (offset as f32 * new_factor / old_factor) as i32
}
