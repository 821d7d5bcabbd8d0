use serde::{Deserialize, Serialize};

/// Hold count past which a held button starts auto-repeating
pub const REPEAT_THRESHOLD: u32 = 20;

/// Physical buttons of the handheld
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Triangle,
    Circle,
    Cross,
    Square,
    LTrigger,
    RTrigger,
    Start,
    Select,
}

impl Button {
    pub const ALL: [Button; 12] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::Triangle,
        Button::Circle,
        Button::Cross,
        Button::Square,
        Button::LTrigger,
        Button::RTrigger,
        Button::Start,
        Button::Select,
    ];

    const fn slot(self) -> usize {
        self as usize
    }

    /// Parse a script token such as `down` or `rtrigger`
    pub fn from_name(name: &str) -> Option<Self> {
        let button = match name.to_ascii_lowercase().as_str() {
            "up" => Button::Up,
            "down" => Button::Down,
            "left" => Button::Left,
            "right" => Button::Right,
            "triangle" => Button::Triangle,
            "circle" => Button::Circle,
            "cross" => Button::Cross,
            "square" => Button::Square,
            "l" | "ltrigger" | "l_trigger" => Button::LTrigger,
            "r" | "rtrigger" | "r_trigger" => Button::RTrigger,
            "start" => Button::Start,
            "select" => Button::Select,
            _ => return None,
        };
        Some(button)
    }
}

/// Per-frame snapshot of how many consecutive frames each button has been held.
///
/// A count of 1 is the press edge; 0 means released.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonReps {
    counts: [u32; Button::ALL.len()],
}

impl ButtonReps {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, button: Button, count: u32) -> Self {
        self.set(button, count);
        self
    }

    pub fn set(&mut self, button: Button, count: u32) {
        self.counts[button.slot()] = count;
    }

    pub fn count(&self, button: Button) -> u32 {
        self.counts[button.slot()]
    }

    /// Button went down this frame
    pub fn pressed(&self, button: Button) -> bool {
        self.count(button) == 1
    }

    /// Button went down this frame or has been held long enough to repeat
    pub fn pressed_or_repeating(&self, button: Button) -> bool {
        let count = self.count(button);
        count == 1 || count > REPEAT_THRESHOLD
    }

    /// Next snapshot given the set of buttons currently held
    #[must_use]
    pub fn advance(&self, held: &[Button]) -> Self {
        let mut next = Self::default();
        for &button in held {
            next.set(button, self.count(button).saturating_add(1));
        }
        next
    }
}

/// Button bindings of the page viewer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfControls {
    pub pan_up: Button,
    pub pan_down: Button,
    pub pan_left: Button,
    pub pan_right: Button,
    pub zoom_in: Button,
    pub zoom_out: Button,
    pub next_page: Button,
    pub previous_page: Button,
    pub next_10_pages: Button,
    pub previous_10_pages: Button,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate_clockwise: Option<Button>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate_counter_clockwise: Option<Button>,
    pub show_menu: Button,
    pub show_page_chooser: Button,
}

impl Default for PdfControls {
    fn default() -> Self {
        Self {
            pan_up: Button::Up,
            pan_down: Button::Down,
            pan_left: Button::Left,
            pan_right: Button::Right,
            zoom_in: Button::Triangle,
            zoom_out: Button::Cross,
            next_page: Button::RTrigger,
            previous_page: Button::LTrigger,
            next_10_pages: Button::Circle,
            previous_10_pages: Button::Square,
            rotate_clockwise: None,
            rotate_counter_clockwise: None,
            show_menu: Button::Start,
            show_page_chooser: Button::Select,
        }
    }
}
