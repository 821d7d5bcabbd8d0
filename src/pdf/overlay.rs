//! Transient labels drawn over the page by the presentation layer

/// Frames a banner stays up after being shown
pub const BANNER_FRAMES: u32 = 60;
/// Trailing frames during which the banner fades out
pub const FADE_FRAMES: u32 = 32;

/// Short message such as "Page 3 of 10" that counts down once per frame
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Banner {
    text: String,
    frames: u32,
}

impl Banner {
    pub fn show(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.frames = BANNER_FRAMES;
    }

    pub fn tick(&mut self) {
        self.frames = self.frames.saturating_sub(1);
    }

    /// Still counting down; the session keeps frames dirty meanwhile
    pub fn is_active(&self) -> bool {
        self.frames > 0
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Opacity for the current frame, 0 once faded out
    pub fn alpha(&self) -> u8 {
        match self.frames {
            0 => 0,
            f if f <= FADE_FRAMES => (f * 8).saturating_sub(8).min(255) as u8,
            _ => u8::MAX,
        }
    }
}

/// Everything the presentation layer should draw on top of the front buffer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overlay {
    /// "Error in page N: message", always shown
    pub error: Option<String>,
    /// A page load is pending
    pub loading: bool,
    /// Banner text and its opacity
    pub banner: Option<(String, u8)>,
}

impl Overlay {
    pub fn is_empty(&self) -> bool {
        self.error.is_none() && !self.loading && self.banner.is_none()
    }
}
