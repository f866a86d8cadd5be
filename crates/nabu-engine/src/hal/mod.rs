//! Hardware abstraction layer.
//!
//! The engine's GPU components are written once against [`Api`]. Each backend
//! provides the native object types and the thin creation/recording calls:
//! - `backend::dx12` maps them onto Direct3D 12 and DXGI
//! - `backend::headless` emulates the same execution model in software
//!
//! The traits deliberately mirror the native API one-to-one. Policy (ordering,
//! synchronisation, lifetimes) lives in the generic layer above.

mod pipeline;
mod types;

use std::sync::Arc;

use raw_window_handle::HasWindowHandle;

use crate::Result;

pub use pipeline::*;
pub use types::*;

/// Receives messages emitted by the GPU validation layer.
pub trait DiagnosticsSink: Send + Sync {
    fn on_message(&self, severity: Severity, message: &str);
}

/// A graphics backend.
pub trait Api: Sized + 'static {
    type Instance: Instance<Self>;
    type Adapter: Adapter;
    type Device: Device<Self>;
    type Queue: Queue<Self>;
    type Fence: Fence<Self>;
    type Event: Event;
    type CommandAllocator: CommandAllocator;
    type CommandList: CommandList<Self>;
    type DescriptorHeap: DescriptorHeap;
    type Heap;
    type Resource: Resource;
    type SwapChain: SwapChain<Self>;
    type RootSignature;
    type PipelineState;
    /// Registration handle returned by [`Device::register_diagnostics`].
    type DiagnosticsCookie;

    /// Backend name for logs.
    const NAME: &'static str;

    /// Turns on the API validation layer. Must run before any factory exists.
    fn enable_debug_layer(gpu_based_validation: bool) -> Result<()>;

    /// Serializes a binding layout into an opaque blob.
    fn serialize_root_signature(desc: &RootSignatureDesc) -> Result<Vec<u8>>;

    /// Compiles HLSL. The error carries the compiler's diagnostic text.
    fn compile_shader(source: &ShaderSource<'_>, debug: bool) -> std::result::Result<Vec<u8>, String>;
}

/// The API factory (DXGI factory).
pub trait Instance<A: Api>: Sized {
    fn init(desc: &InstanceDesc) -> Result<Self>;

    /// Adapters in high-performance preference order.
    fn enumerate_adapters(&self) -> Result<Vec<A::Adapter>>;

    fn create_device(&self, adapter: &A::Adapter, level: FeatureLevel) -> Result<A::Device>;

    fn create_swap_chain(
        &self,
        queue: &A::Queue,
        window: &dyn HasWindowHandle,
        desc: &SwapChainDesc,
    ) -> Result<A::SwapChain>;

    /// Opts out of the automatic Alt+Enter fullscreen transition.
    fn disable_fullscreen_transitions(&self, window: &dyn HasWindowHandle) -> Result<()>;
}

pub trait Adapter {
    fn info(&self) -> AdapterInfo;

    /// Whether a device could be created at `level` without creating one.
    fn supports(&self, level: FeatureLevel) -> bool;
}

pub trait Device<A: Api> {
    fn create_queue(&self, kind: QueueKind) -> Result<A::Queue>;
    fn create_fence(&self, initial_value: u64) -> Result<A::Fence>;
    fn create_event(&self) -> Result<A::Event>;
    fn create_command_allocator(&self, kind: QueueKind) -> Result<A::CommandAllocator>;

    /// Returns the list in the recording state.
    fn create_command_list(&self, kind: QueueKind, allocator: &A::CommandAllocator) -> Result<A::CommandList>;

    fn create_descriptor_heap(&self, desc: &DescriptorHeapDesc) -> Result<A::DescriptorHeap>;
    fn descriptor_increment(&self, kind: DescriptorHeapKind) -> u32;
    fn create_render_target_view(&self, resource: &A::Resource, dest: CpuDescriptor);

    fn create_heap(&self, desc: &HeapDesc) -> Result<A::Heap>;
    fn create_placed_resource(
        &self,
        heap: &A::Heap,
        offset: u64,
        desc: &BufferDesc,
        initial_state: ResourceState,
    ) -> Result<A::Resource>;

    fn create_root_signature(&self, blob: &[u8]) -> Result<A::RootSignature>;
    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc<'_, A>) -> Result<A::PipelineState>;

    fn register_diagnostics(&self, sink: Arc<dyn DiagnosticsSink>) -> Result<A::DiagnosticsCookie>;
    fn unregister_diagnostics(&self, cookie: A::DiagnosticsCookie) -> Result<()>;
}

pub trait Queue<A: Api> {
    fn kind(&self) -> QueueKind;
    fn execute(&self, lists: &[&A::CommandList]);

    /// Enqueues a GPU-side signal after all previously submitted work.
    fn signal(&self, fence: &A::Fence, value: u64) -> Result<()>;
}

pub trait Fence<A: Api> {
    fn completed_value(&self) -> u64;

    /// Sets the value from the CPU.
    fn signal(&self, value: u64) -> Result<()>;

    fn set_event_on_completion(&self, value: u64, event: &A::Event) -> Result<()>;
}

/// OS waitable object.
pub trait Event {
    /// Blocks until the event is signaled.
    fn wait(&self) -> Result<()>;
}

pub trait CommandAllocator {
    /// Only valid once every list recorded from it has finished executing.
    fn reset(&self) -> Result<()>;
}

pub trait CommandList<A: Api> {
    fn reset(&mut self, allocator: &A::CommandAllocator, initial_state: Option<&A::PipelineState>) -> Result<()>;
    fn close(&mut self) -> Result<()>;

    fn set_pipeline_state(&mut self, pipeline: &A::PipelineState);
    fn set_graphics_root_signature(&mut self, root_signature: &A::RootSignature);
    fn set_viewports(&mut self, viewports: &[Viewport]);
    fn set_scissor_rects(&mut self, rects: &[ScissorRect]);
    fn transition_barrier(&mut self, resource: &A::Resource, before: ResourceState, after: ResourceState);
    fn set_render_targets(&mut self, rtvs: &[CpuDescriptor]);
    fn clear_render_target_view(&mut self, rtv: CpuDescriptor, color: [f32; 4]);
    fn set_primitive_topology(&mut self, topology: PrimitiveTopology);
    fn set_vertex_buffers(&mut self, start_slot: u32, views: &[VertexBufferView]);
    fn set_index_buffer(&mut self, view: &IndexBufferView);
    fn draw_instanced(&mut self, vertex_count: u32, instance_count: u32, start_vertex: u32, start_instance: u32);
    fn draw_indexed_instanced(
        &mut self,
        index_count: u32,
        instance_count: u32,
        start_index: u32,
        base_vertex: i32,
        start_instance: u32,
    );
}

pub trait DescriptorHeap {
    fn cpu_start(&self) -> CpuDescriptor;
}

pub trait Resource {
    fn gpu_virtual_address(&self) -> u64;

    /// Map, copy `data` to the start of the resource, unmap.
    fn write(&self, data: &[u8]) -> Result<()>;

    /// Map, copy `len` bytes out, unmap.
    fn read(&self, len: usize) -> Result<Vec<u8>>;
}

pub trait SwapChain<A: Api> {
    fn current_back_buffer_index(&self) -> u32;
    fn buffer(&self, index: u32) -> Result<A::Resource>;
    fn present(&self, sync_interval: u32) -> Result<()>;
}
