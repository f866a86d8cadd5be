//! Window collaborator.
//!
//! The application only needs a size, a native handle for the swap chain and a
//! per-frame `tick` that pumps OS messages into the event registry.

mod headless;
mod native;

pub use headless::HeadlessWindow;
pub use native::WinitWindow;

use raw_window_handle::HasWindowHandle;

use crate::events::EventRegistry;

/// Window creation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "nabu".to_string(),
            width: 800,
            height: 600,
        }
    }
}

pub trait Window: HasWindowHandle {
    /// Client-area width in physical pixels.
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Pumps pending OS messages and queues the resulting events on `events`.
    ///
    /// Never blocks.
    fn tick(&mut self, events: &mut EventRegistry) -> anyhow::Result<()>;
}
