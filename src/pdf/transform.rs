//! Page-to-device transform
//!
//! Matrices follow the row-vector convention used by PDF renderers:
//! a point `[x y 1]` is multiplied on the left, so `concat(a, b)` applies
//! `a` first and `b` second.

use super::types::{IRect, PageGeometry, Rect, Rotation};

/// 2D affine matrix `[a b 0; c d 0; e f 1]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    #[must_use]
    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    #[must_use]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by quarter turns, kept exact to avoid drifting pixel edges
    #[must_use]
    pub const fn rotate(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Deg0 => Self::IDENTITY,
            Rotation::Deg90 => Self::new(0.0, 1.0, -1.0, 0.0, 0.0, 0.0),
            Rotation::Deg180 => Self::new(-1.0, 0.0, 0.0, -1.0, 0.0, 0.0),
            Rotation::Deg270 => Self::new(0.0, -1.0, 1.0, 0.0, 0.0, 0.0),
        }
    }

    /// `self` followed by `next`
    #[must_use]
    pub fn concat(&self, next: &Self) -> Self {
        Self {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
            e: self.e * next.a + self.f * next.c + next.e,
            f: self.e * next.b + self.f * next.d + next.f,
        }
    }

    #[must_use]
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Axis-aligned bounding box of a transformed rectangle
    #[must_use]
    pub fn transform_aabb(&self, rect: &Rect) -> Rect {
        let corners = [
            self.apply(rect.x0, rect.y0),
            self.apply(rect.x1, rect.y0),
            self.apply(rect.x0, rect.y1),
            self.apply(rect.x1, rect.y1),
        ];
        let mut out = Rect::new(f32::MAX, f32::MAX, f32::MIN, f32::MIN);
        for (x, y) in corners {
            out.x0 = out.x0.min(x);
            out.y0 = out.y0.min(y);
            out.x1 = out.x1.max(x);
            out.y1 = out.y1.max(y);
        }
        out
    }
}

/// Transform from page space into the device raster for one zoom/rotation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
    ctm: Matrix,
    geometry: PageGeometry,
    device_bounds: IRect,
}

impl ViewportTransform {
    /// Translate the page top to the origin, flip and scale, then rotate.
    #[must_use]
    pub fn new(geometry: PageGeometry, zoom: f32, user_rotation: Rotation) -> Self {
        let rotation = user_rotation.combine(geometry.intrinsic_rotation);
        let ctm = Matrix::translate(0.0, -geometry.media_box.y1)
            .concat(&Matrix::scale(zoom, -zoom))
            .concat(&Matrix::rotate(rotation));
        let device_bounds = ctm.transform_aabb(&geometry.media_box).round_out();
        Self {
            ctm,
            geometry,
            device_bounds,
        }
    }

    #[must_use]
    pub fn ctm(&self) -> &Matrix {
        &self.ctm
    }

    #[must_use]
    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Rounded device bounding box of the whole page
    #[must_use]
    pub fn device_bounds(&self) -> IRect {
        self.device_bounds
    }

    /// Device position of viewport offset (0, 0)
    #[must_use]
    pub fn device_origin(&self) -> (i32, i32) {
        (self.device_bounds.x0, self.device_bounds.y0)
    }

    /// Page size in device pixels
    #[must_use]
    pub fn page_extent(&self) -> (u32, u32) {
        (self.device_bounds.width(), self.device_bounds.height())
    }

    /// Largest viewport offset that keeps a `screen`-sized window inside the page
    #[must_use]
    pub fn max_offset(&self, screen_width: u32, screen_height: u32) -> (i32, i32) {
        let (w, h) = self.page_extent();
        (
            w.saturating_sub(screen_width) as i32,
            h.saturating_sub(screen_height) as i32,
        )
    }

    /// Clamp a requested offset so the window stays within the page
    #[must_use]
    pub fn clamp_offset(&self, x: i32, y: i32, screen_width: u32, screen_height: u32) -> (i32, i32) {
        let (max_x, max_y) = self.max_offset(screen_width, screen_height);
        (x.clamp(0, max_x), y.clamp(0, max_y))
    }
}
