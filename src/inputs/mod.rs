pub mod buttons;

pub use buttons::{Button, ButtonReps, PdfControls, REPEAT_THRESHOLD};
