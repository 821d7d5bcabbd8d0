//! Core geometry types for page rendering

use serde::{Deserialize, Serialize};

/// Reference device resolution
pub const DEFAULT_SCREEN_WIDTH: u32 = 480;
pub const DEFAULT_SCREEN_HEIGHT: u32 = 272;

/// Fixed output resolution of the display
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self::new(DEFAULT_SCREEN_WIDTH, DEFAULT_SCREEN_HEIGHT)
    }
}

/// Floating point rectangle, page-space or device-space depending on context
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Round outward to integer device pixels
    #[must_use]
    pub fn round_out(&self) -> IRect {
        IRect::new(
            self.x0.floor() as i32,
            self.y0.floor() as i32,
            self.x1.ceil() as i32,
            self.y1.ceil() as i32,
        )
    }
}

/// Integer device-space rectangle, `x1`/`y1` exclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl IRect {
    #[must_use]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[must_use]
    pub const fn from_origin_size(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::new(x, y, x + width as i32, y + height as i32)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        (self.x1 - self.x0).max(0) as u32
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        (self.y1 - self.y0).max(0) as u32
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Clockwise rotation in quarter turns
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Normalize any multiple of 90 degrees; other values snap down to the
    /// previous quarter turn
    #[must_use]
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) / 90 {
            1 => Self::Deg90,
            2 => Self::Deg180,
            3 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    #[must_use]
    pub const fn degrees(self) -> i32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    #[must_use]
    pub fn clockwise(self) -> Self {
        Self::from_degrees(self.degrees() + 90)
    }

    #[must_use]
    pub fn counter_clockwise(self) -> Self {
        Self::from_degrees(self.degrees() - 90)
    }

    /// Combined user and intrinsic rotation
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        Self::from_degrees(self.degrees() + other.degrees())
    }
}

/// Page geometry reported by the rasterizer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    /// Media box in page space (PDF points, y axis pointing up)
    pub media_box: Rect,
    /// Rotation declared by the page itself
    pub intrinsic_rotation: Rotation,
}

impl PageGeometry {
    #[must_use]
    pub const fn new(media_box: Rect, intrinsic_rotation: Rotation) -> Self {
        Self {
            media_box,
            intrinsic_rotation,
        }
    }

    /// Upright US Letter page, handy as a default for tests and tools
    #[must_use]
    pub const fn letter() -> Self {
        Self::new(Rect::new(0.0, 0.0, 612.0, 792.0), Rotation::Deg0)
    }
}
