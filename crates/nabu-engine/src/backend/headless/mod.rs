//! Software emulation of the D3D12 execution model.
//!
//! Nothing is rasterized. What is modeled is the part the engine has to get
//! right:
//! - queues execute submitted lists asynchronously; pending work only retires
//!   when the CPU blocks on a fence event, while a signal enqueued on an idle
//!   queue completes immediately
//! - barriers are checked against the tracked state of each resource
//! - command allocators refuse to reset while their lists are in flight
//! - placed resources must be 64 KiB aligned and fit in their heap
//! - swap chains rotate through their buffers and may start at any index
//!
//! Validation findings go to the registered `DiagnosticsSink` and are counted
//! in [`DeviceStats`].

mod command;
mod device;
mod instance;
mod pipeline;
mod resource;
mod swap_chain;
mod sync;

use crate::hal::{self, RootSignatureDesc, ShaderSource};
use crate::{Error, Result};

pub use command::{HeadlessCommandAllocator, HeadlessCommandList};
pub use device::{DeviceStats, HeadlessDevice};
pub use instance::{HeadlessAdapter, HeadlessAdapterDesc, HeadlessInstance};
pub use pipeline::{HeadlessPipelineState, HeadlessRootSignature};
pub use resource::{HeadlessDescriptorHeap, HeadlessHeap, HeadlessResource};
pub use swap_chain::HeadlessSwapChain;
pub use sync::{HeadlessEvent, HeadlessFence, HeadlessQueue};

/// Marker type selecting the headless backend.
#[derive(Debug, Copy, Clone, Default)]
pub struct Headless;

impl hal::Api for Headless {
    type Instance = HeadlessInstance;
    type Adapter = HeadlessAdapter;
    type Device = HeadlessDevice;
    type Queue = HeadlessQueue;
    type Fence = HeadlessFence;
    type Event = HeadlessEvent;
    type CommandAllocator = HeadlessCommandAllocator;
    type CommandList = HeadlessCommandList;
    type DescriptorHeap = HeadlessDescriptorHeap;
    type Heap = HeadlessHeap;
    type Resource = HeadlessResource;
    type SwapChain = HeadlessSwapChain;
    type RootSignature = HeadlessRootSignature;
    type PipelineState = HeadlessPipelineState;
    type DiagnosticsCookie = u32;

    const NAME: &'static str = "headless";

    fn enable_debug_layer(gpu_based_validation: bool) -> Result<()> {
        log::debug!("headless validation always on (gpu-based: {gpu_based_validation})");
        Ok(())
    }

    fn serialize_root_signature(desc: &RootSignatureDesc) -> Result<Vec<u8>> {
        Ok(pipeline::serialize_root_signature(desc))
    }

    fn compile_shader(source: &ShaderSource<'_>, _debug: bool) -> std::result::Result<Vec<u8>, String> {
        pipeline::compile_shader(source)
    }
}

#[track_caller]
pub(crate) fn invalid_call(operation: &'static str, message: impl Into<String>) -> Error {
    Error::api(operation, message, "E_INVALIDARG")
}
