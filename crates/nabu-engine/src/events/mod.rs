//! Typed event dispatch between the window, input and the application.
//!
//! Producers either notify listeners immediately or queue the event until the
//! next [`EventRegistry::tick`], which is what the window does while pumping
//! OS messages.

mod registry;

pub use registry::{CallbackId, EventRegistry};

use crate::input::{Key, KeyState, MouseButton};

/// Something that happened, with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    KeyboardKey { key: Key, state: KeyState, scancode: u32 },
    MouseButton { button: MouseButton, state: KeyState },
    MouseScroll { delta: f64 },
    MousePos { x: f64, y: f64 },
    FramebufferResize { width: u32, height: u32 },
    WindowResize { width: u32, height: u32 },
    WindowClose,
    CriticalAssetsLoaded,
}

/// Payload-free discriminant of [`Event`], used to subscribe.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventKind {
    KeyboardKey,
    MouseButton,
    MouseScroll,
    MousePos,
    FramebufferResize,
    WindowResize,
    WindowClose,
    CriticalAssetsLoaded,
}

impl EventKind {
    pub const COUNT: usize = 8;

    fn index(self) -> usize {
        self as usize
    }
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::KeyboardKey { .. } => EventKind::KeyboardKey,
            Event::MouseButton { .. } => EventKind::MouseButton,
            Event::MouseScroll { .. } => EventKind::MouseScroll,
            Event::MousePos { .. } => EventKind::MousePos,
            Event::FramebufferResize { .. } => EventKind::FramebufferResize,
            Event::WindowResize { .. } => EventKind::WindowResize,
            Event::WindowClose => EventKind::WindowClose,
            Event::CriticalAssetsLoaded => EventKind::CriticalAssetsLoaded,
        }
    }
}
