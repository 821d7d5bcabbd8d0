//! Page rendering and incremental scrolling

pub mod cache;
pub mod color;
pub mod error;
pub mod overlay;
pub mod pan;
pub mod pixels;
pub mod rasterizer;
pub mod session;
pub mod state;
pub mod tile;
pub mod transform;
mod types;
mod zoom;

#[cfg(feature = "pdf")]
pub mod mupdf_backend;

pub use cache::{CacheKey, FullPageCache, NEUTRAL_FILL};
pub use error::{OpenError, PageError, SessionError};
pub use overlay::{Banner, Overlay};
pub use pan::PanEngine;
pub use pixels::{BufferPair, PixelBuffer};
pub use rasterizer::{Rasterizer, Tile, TileLease};
pub use session::{RESUME_RETRY_FRAMES, Session, ViewCommand};
pub use state::{Command, Effect, PageState};
pub use tile::TileRenderer;
pub use transform::{Matrix, ViewportTransform};
pub use types::*;
pub use zoom::*;

#[cfg(feature = "pdf")]
pub use mupdf_backend::MupdfRasterizer;
