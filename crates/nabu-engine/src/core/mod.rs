//! Application layer.
//!
//! [`Application`] wires the window, events, GPU context and renderer
//! together; [`scene`] holds the static content it renders.

mod app;
pub mod scene;

pub use app::Application;
