//! Root signatures, pipeline state objects and shader compilation.

pub mod presets;
mod pso;
mod root_signature;
mod shader;

pub use pso::{GraphicsPso, GraphicsPsoBuilder};
pub use root_signature::RootSignature;
pub use shader::{compile_shader, compile_shader_file};
