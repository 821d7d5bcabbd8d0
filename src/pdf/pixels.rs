//! Double-buffered screen rasters

use super::types::ScreenSize;

/// Owned raster of display-packed 32-bit pixels, row-major
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    /// Wrap existing pixels; `pixels.len()` must equal `width * height`
    #[must_use]
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    #[must_use]
    pub fn row(&self, y: u32) -> &[u32] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    pub fn fill(&mut self, pixel: u32) {
        self.pixels.fill(pixel);
    }
}

/// Front/back raster pair for tear-free incremental updates.
///
/// The front buffer is what the presentation layer reads; only the back
/// buffer is ever written. `swap` exchanges the roles without copying.
#[derive(Debug)]
pub struct BufferPair {
    buffers: [PixelBuffer; 2],
    front: usize,
}

impl BufferPair {
    #[must_use]
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            buffers: [
                PixelBuffer::new(screen.width, screen.height),
                PixelBuffer::new(screen.width, screen.height),
            ],
            front: 0,
        }
    }

    #[must_use]
    pub fn front(&self) -> &PixelBuffer {
        &self.buffers[self.front]
    }

    #[must_use]
    pub fn back(&self) -> &PixelBuffer {
        &self.buffers[self.front ^ 1]
    }

    pub fn back_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffers[self.front ^ 1]
    }

    /// Borrow the presented buffer for reading and the working buffer for writing
    pub fn split(&mut self) -> (&PixelBuffer, &mut PixelBuffer) {
        let (first, second) = self.buffers.split_at_mut(1);
        if self.front == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        }
    }

    pub fn swap(&mut self) {
        self.front ^= 1;
    }

    /// Index of the buffer currently presented
    #[must_use]
    pub fn front_index(&self) -> usize {
        self.front
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.buffers[0].width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.buffers[0].height()
    }
}
