//! Loading indicator

use std::fmt;

pub const DEFAULT_MESSAGE: &str = "Loading...";

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Spinner plus a caller-supplied message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loader {
    message: String,
}

impl Loader {
    pub fn new(message: Option<&str>) -> Self {
        Self {
            message: message.unwrap_or(DEFAULT_MESSAGE).to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Render animation frame `tick`
    pub fn frame(&self, tick: usize) -> String {
        format!("{} {}", SPINNER_FRAMES[tick % SPINNER_FRAMES.len()], self.message)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Display for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.frame(0))
    }
}
