//! GPU device layer.
//!
//! Backend-generic wrappers over [`crate::hal`] that own the native objects
//! and encode their lifetime and synchronisation rules.

mod command;
mod context;
mod descriptor_heap;
mod fence;
mod gpu;
mod init;
mod queue;
mod swap_chain;

pub use command::{CommandManager, GraphicsCommandContext, execute_immediate};
pub use context::{GpuContext, GpuParts};
pub use descriptor_heap::DescriptorHeap;
pub use fence::Fence;
pub use gpu::{Device, select_adapter};
pub use init::{FrameSync, GpuSettings};
pub use queue::Queue;
pub use swap_chain::SwapChain;
