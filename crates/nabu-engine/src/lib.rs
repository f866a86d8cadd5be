//! Nabu engine crate.
//!
//! A minimal Direct3D 12 renderer. The GPU core (`device`, `resource`,
//! `pipeline`, `render`) is written once against [`hal::Api`] and runs on the
//! D3D12 backend on Windows or the headless emulation everywhere else. The
//! application layer (`core`, `window`, `events`) drives it one frame at a time.

pub mod error;
pub mod hal;
pub mod backend;

pub mod device;
pub mod resource;
pub mod pipeline;
pub mod render;

pub mod events;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod config;
pub mod logging;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ApiError, Error, Result};
