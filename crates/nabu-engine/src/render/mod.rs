//! Frame recording.
//!
//! One [`Renderer::render`] call records the whole frame into the command
//! context of the current back-buffer slot, submits it on the direct queue and
//! presents. Resources are addressed through the ids of the resource manager.

pub mod barrier;
mod renderer;

pub use renderer::{FrameState, RenderData, Renderer, RendererSettings};
