use anyhow::{Context, Result, bail};

use crate::inputs::{Button, ButtonReps};

/// Trait for abstracting per-frame button input to enable testing
pub trait ButtonSource {
    /// Snapshot for the next frame, `None` once input has ended
    fn poll(&mut self) -> Result<Option<ButtonReps>>;
}

/// Replays a fixed list of frames
pub struct ScriptedButtonSource {
    pub(crate) frames: Vec<ButtonReps>,
    current_index: usize,
}

impl ScriptedButtonSource {
    pub fn new(frames: Vec<ButtonReps>) -> Self {
        Self {
            frames,
            current_index: 0,
        }
    }

    /// Parse a whitespace or comma separated script.
    ///
    /// Tokens: `down` taps a button (press frame plus release frame),
    /// `down*3` taps it three times, `hold:right:30` holds it for 30
    /// frames, `wait:10` idles for 10 frames.
    pub fn parse(script: &str) -> Result<Self> {
        let mut frames = Vec::new();
        for token in script
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let parts: Vec<&str> = token.split(':').collect();
            match parts.as_slice() {
                ["wait", n] => {
                    let n: usize = n.parse().with_context(|| format!("bad frame count in {token:?}"))?;
                    frames.extend(std::iter::repeat_n(ButtonReps::default(), n));
                }
                ["hold", name, n] => {
                    let button = parse_button(name)?;
                    let n: u32 = n.parse().with_context(|| format!("bad frame count in {token:?}"))?;
                    let mut reps = ButtonReps::default();
                    for _ in 0..n {
                        reps = reps.advance(&[button]);
                        frames.push(reps);
                    }
                    frames.push(reps.advance(&[]));
                }
                [tap] => {
                    let (name, times) = match tap.split_once('*') {
                        Some((name, n)) => (
                            name,
                            n.parse::<usize>()
                                .with_context(|| format!("bad repeat count in {token:?}"))?,
                        ),
                        None => (*tap, 1),
                    };
                    let button = parse_button(name)?;
                    for _ in 0..times {
                        frames.push(ButtonReps::default().with(button, 1));
                        frames.push(ButtonReps::default());
                    }
                }
                _ => bail!("unrecognized script token {token:?}"),
            }
        }
        Ok(Self::new(frames))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn parse_button(name: &str) -> Result<Button> {
    match Button::from_name(name) {
        Some(button) => Ok(button),
        None => bail!("unknown button {name:?}"),
    }
}

impl ButtonSource for ScriptedButtonSource {
    fn poll(&mut self) -> Result<Option<ButtonReps>> {
        let frame = self.frames.get(self.current_index).copied();
        if frame.is_some() {
            self.current_index += 1;
        }
        Ok(frame)
    }
}
