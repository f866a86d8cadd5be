use raw_window_handle::{HandleError, HasWindowHandle, WindowHandle};

use super::{Window, WindowSettings};
use crate::events::{Event, EventRegistry};

/// Window without an OS surface.
///
/// Requests to close itself once `frame_limit` ticks have passed.
pub struct HeadlessWindow {
    width: u32,
    height: u32,
    frame_limit: Option<u64>,
    ticks: u64,
}

impl HeadlessWindow {
    pub fn new(settings: &WindowSettings, frame_limit: Option<u64>) -> Self {
        log::info!(
            "headless window {}x{} (frame limit: {frame_limit:?})",
            settings.width,
            settings.height
        );
        Self {
            width: settings.width,
            height: settings.height,
            frame_limit,
            ticks: 0,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Window for HeadlessWindow {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn tick(&mut self, events: &mut EventRegistry) -> anyhow::Result<()> {
        self.ticks += 1;
        if self.frame_limit.is_some_and(|limit| self.ticks > limit) {
            events.notify_delayed(Event::WindowClose);
        }
        Ok(())
    }
}

impl HasWindowHandle for HeadlessWindow {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        Err(HandleError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::events::EventKind;

    #[test]
    fn closes_after_frame_limit() {
        let mut registry = EventRegistry::new();
        let closed = Rc::new(Cell::new(false));
        let c = closed.clone();
        registry.register(EventKind::WindowClose, move |_| c.set(true));

        let mut window = HeadlessWindow::new(&WindowSettings::default(), Some(2));
        for _ in 0..2 {
            window.tick(&mut registry).unwrap();
            registry.tick();
            assert!(!closed.get());
        }

        window.tick(&mut registry).unwrap();
        registry.tick();
        assert!(closed.get());
    }

    #[test]
    fn unlimited_window_never_closes() {
        let mut registry = EventRegistry::new();
        let mut window = HeadlessWindow::new(&WindowSettings::default(), None);
        registry.register(EventKind::WindowClose, |_| panic!("closed"));
        for _ in 0..100 {
            window.tick(&mut registry).unwrap();
        }
        registry.tick();
        assert_eq!((window.width(), window.height()), (800, 600));
    }
}
