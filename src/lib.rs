pub mod bookmark;
pub mod event_source;
pub mod inputs;
pub mod panic_handler;
pub mod pdf;
pub mod settings;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use pdf::{Session, ViewCommand};
