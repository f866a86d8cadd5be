use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::events::Event;
use crate::input::{Key, KeyState, MouseButton};

/// Lines scrolled per pixel of high-precision wheel delta.
const PIXELS_PER_LINE: f64 = 120.0;

/// Translates a winit `WindowEvent` into an engine [`Event`].
///
/// Returns `None` for events the engine does not represent. Close requests are
/// handled by the window itself.
pub fn translate_window_event(event: &WindowEvent) -> Option<Event> {
    match event {
        WindowEvent::Resized(size) => Some(Event::FramebufferResize {
            width: size.width,
            height: size.height,
        }),

        WindowEvent::CursorMoved { position, .. } => Some(Event::MousePos {
            x: position.x,
            y: position.y,
        }),

        WindowEvent::MouseInput { state, button, .. } => Some(Event::MouseButton {
            button: map_mouse_button(*button),
            state: map_state(*state, false),
        }),

        WindowEvent::MouseWheel { delta, .. } => {
            let delta = match delta {
                MouseScrollDelta::LineDelta(_, y) => f64::from(*y),
                MouseScrollDelta::PixelDelta(p) => p.y / PIXELS_PER_LINE,
            };
            Some(Event::MouseScroll { delta })
        }

        WindowEvent::KeyboardInput { event, .. } => {
            let (key, scancode) = map_key(event.physical_key);
            Some(Event::KeyboardKey {
                key,
                state: map_state(event.state, event.repeat),
                scancode,
            })
        }

        _ => None,
    }
}

fn map_state(state: ElementState, repeat: bool) -> KeyState {
    match state {
        ElementState::Pressed if repeat => KeyState::Repeated,
        ElementState::Pressed => KeyState::Pressed,
        ElementState::Released => KeyState::Released,
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

fn map_key(pk: PhysicalKey) -> (Key, u32) {
    match pk {
        PhysicalKey::Code(code) => {
            let key = match code {
                KeyCode::Escape => Key::Escape,
                KeyCode::Enter => Key::Enter,
                KeyCode::Tab => Key::Tab,
                KeyCode::Backspace => Key::Backspace,
                KeyCode::Space => Key::Space,

                KeyCode::Insert => Key::Insert,
                KeyCode::Delete => Key::Delete,
                KeyCode::Home => Key::Home,
                KeyCode::End => Key::End,
                KeyCode::PageUp => Key::PageUp,
                KeyCode::PageDown => Key::PageDown,

                KeyCode::ArrowUp => Key::ArrowUp,
                KeyCode::ArrowDown => Key::ArrowDown,
                KeyCode::ArrowLeft => Key::ArrowLeft,
                KeyCode::ArrowRight => Key::ArrowRight,

                KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
                KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
                KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,
                KeyCode::SuperLeft | KeyCode::SuperRight => Key::Meta,

                KeyCode::KeyA => Key::A,
                KeyCode::KeyB => Key::B,
                KeyCode::KeyC => Key::C,
                KeyCode::KeyD => Key::D,
                KeyCode::KeyE => Key::E,
                KeyCode::KeyF => Key::F,
                KeyCode::KeyG => Key::G,
                KeyCode::KeyH => Key::H,
                KeyCode::KeyI => Key::I,
                KeyCode::KeyJ => Key::J,
                KeyCode::KeyK => Key::K,
                KeyCode::KeyL => Key::L,
                KeyCode::KeyM => Key::M,
                KeyCode::KeyN => Key::N,
                KeyCode::KeyO => Key::O,
                KeyCode::KeyP => Key::P,
                KeyCode::KeyQ => Key::Q,
                KeyCode::KeyR => Key::R,
                KeyCode::KeyS => Key::S,
                KeyCode::KeyT => Key::T,
                KeyCode::KeyU => Key::U,
                KeyCode::KeyV => Key::V,
                KeyCode::KeyW => Key::W,
                KeyCode::KeyX => Key::X,
                KeyCode::KeyY => Key::Y,
                KeyCode::KeyZ => Key::Z,

                KeyCode::Digit0 => Key::Digit0,
                KeyCode::Digit1 => Key::Digit1,
                KeyCode::Digit2 => Key::Digit2,
                KeyCode::Digit3 => Key::Digit3,
                KeyCode::Digit4 => Key::Digit4,
                KeyCode::Digit5 => Key::Digit5,
                KeyCode::Digit6 => Key::Digit6,
                KeyCode::Digit7 => Key::Digit7,
                KeyCode::Digit8 => Key::Digit8,
                KeyCode::Digit9 => Key::Digit9,

                KeyCode::F1 => Key::F1,
                KeyCode::F2 => Key::F2,
                KeyCode::F3 => Key::F3,
                KeyCode::F4 => Key::F4,
                KeyCode::F5 => Key::F5,
                KeyCode::F6 => Key::F6,
                KeyCode::F7 => Key::F7,
                KeyCode::F8 => Key::F8,
                KeyCode::F9 => Key::F9,
                KeyCode::F10 => Key::F10,
                KeyCode::F11 => Key::F11,
                KeyCode::F12 => Key::F12,

                other => Key::Unknown(other as u32),
            };

            (key, code as u32)
        }

        // winit 0.30 uses NativeKeyCode; no stable numeric is guaranteed here.
        PhysicalKey::Unidentified(_) => (Key::Unknown(0), 0),
    }
}
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_engine_codes() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Escape)).0, Key::Escape);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyW)).0, Key::W);
        assert!(matches!(map_key(PhysicalKey::Code(KeyCode::NumLock)).0, Key::Unknown(_)));
    }

    #[test]
    fn repeat_is_distinguished_from_press() {
        assert_eq!(map_state(ElementState::Pressed, false), KeyState::Pressed);
        assert_eq!(map_state(ElementState::Pressed, true), KeyState::Repeated);
        assert_eq!(map_state(ElementState::Released, true), KeyState::Released);
    }

    #[test]
    fn resize_becomes_framebuffer_event() {
        let event = WindowEvent::Resized(winit::dpi::PhysicalSize::new(640, 480));
        assert_eq!(
            translate_window_event(&event),
            Some(Event::FramebufferResize { width: 640, height: 480 })
        );
    }
}
