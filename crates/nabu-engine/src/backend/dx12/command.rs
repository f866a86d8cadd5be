use windows::Win32::Graphics::Direct3D12::*;

use super::pipeline::{Dx12PipelineState, Dx12RootSignature};
use super::resource::Dx12Resource;
use super::{ApiResultExt, Dx12, conv};
use crate::Result;
use crate::hal::{
    self, CpuDescriptor, IndexBufferView, PrimitiveTopology, ResourceState, ScissorRect, VertexBufferView, Viewport,
};

pub struct Dx12CommandAllocator {
    raw: ID3D12CommandAllocator,
}

impl Dx12CommandAllocator {
    pub(super) fn new(raw: ID3D12CommandAllocator) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &ID3D12CommandAllocator {
        &self.raw
    }
}

impl hal::CommandAllocator for Dx12CommandAllocator {
    fn reset(&self) -> Result<()> {
        unsafe { self.raw.Reset() }.api("ID3D12CommandAllocator::Reset", "failed to reset command allocator")
    }
}

pub struct Dx12CommandList {
    raw: ID3D12GraphicsCommandList,
}

impl Dx12CommandList {
    pub(super) fn new(raw: ID3D12GraphicsCommandList) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &ID3D12GraphicsCommandList {
        &self.raw
    }
}

fn cpu_handle(descriptor: CpuDescriptor) -> D3D12_CPU_DESCRIPTOR_HANDLE {
    D3D12_CPU_DESCRIPTOR_HANDLE { ptr: descriptor.ptr }
}

impl hal::CommandList<Dx12> for Dx12CommandList {
    fn reset(&mut self, allocator: &Dx12CommandAllocator, initial_state: Option<&Dx12PipelineState>) -> Result<()> {
        unsafe { self.raw.Reset(allocator.raw(), initial_state.map(Dx12PipelineState::raw)) }
            .api("ID3D12GraphicsCommandList::Reset", "failed to reset command list")
    }

    fn close(&mut self) -> Result<()> {
        unsafe { self.raw.Close() }.api("ID3D12GraphicsCommandList::Close", "failed to close command list")
    }

    fn set_pipeline_state(&mut self, pipeline: &Dx12PipelineState) {
        unsafe { self.raw.SetPipelineState(pipeline.raw()) }
    }

    fn set_graphics_root_signature(&mut self, root_signature: &Dx12RootSignature) {
        unsafe { self.raw.SetGraphicsRootSignature(root_signature.raw()) }
    }

    fn set_viewports(&mut self, viewports: &[Viewport]) {
        let viewports: Vec<D3D12_VIEWPORT> = viewports.iter().map(conv::viewport).collect();
        unsafe { self.raw.RSSetViewports(&viewports) }
    }

    fn set_scissor_rects(&mut self, rects: &[ScissorRect]) {
        let rects: Vec<_> = rects.iter().map(conv::rect).collect();
        unsafe { self.raw.RSSetScissorRects(&rects) }
    }

    fn transition_barrier(&mut self, resource: &Dx12Resource, before: ResourceState, after: ResourceState) {
        let barrier = D3D12_RESOURCE_BARRIER {
            Type: D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
            Flags: D3D12_RESOURCE_BARRIER_FLAG_NONE,
            Anonymous: D3D12_RESOURCE_BARRIER_0 {
                Transition: std::mem::ManuallyDrop::new(D3D12_RESOURCE_TRANSITION_BARRIER {
                    // Borrowed without AddRef, never released.
                    pResource: unsafe { std::mem::transmute_copy(resource.raw()) },
                    Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
                    StateBefore: conv::resource_state(before),
                    StateAfter: conv::resource_state(after),
                }),
            },
        };
        unsafe { self.raw.ResourceBarrier(&[barrier]) }
    }

    fn set_render_targets(&mut self, rtvs: &[CpuDescriptor]) {
        let handles: Vec<_> = rtvs.iter().copied().map(cpu_handle).collect();
        unsafe {
            self.raw
                .OMSetRenderTargets(handles.len() as u32, Some(handles.as_ptr()), false, None)
        }
    }

    fn clear_render_target_view(&mut self, rtv: CpuDescriptor, color: [f32; 4]) {
        unsafe { self.raw.ClearRenderTargetView(cpu_handle(rtv), &color, None) }
    }

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        unsafe { self.raw.IASetPrimitiveTopology(conv::primitive_topology(topology)) }
    }

    fn set_vertex_buffers(&mut self, start_slot: u32, views: &[VertexBufferView]) {
        let views: Vec<D3D12_VERTEX_BUFFER_VIEW> = views
            .iter()
            .map(|view| D3D12_VERTEX_BUFFER_VIEW {
                BufferLocation: view.location,
                SizeInBytes: view.size_in_bytes,
                StrideInBytes: view.stride_in_bytes,
            })
            .collect();
        unsafe { self.raw.IASetVertexBuffers(start_slot, Some(&views)) }
    }

    fn set_index_buffer(&mut self, view: &IndexBufferView) {
        let view = D3D12_INDEX_BUFFER_VIEW {
            BufferLocation: view.location,
            SizeInBytes: view.size_in_bytes,
            Format: conv::index_format(view.format),
        };
        unsafe { self.raw.IASetIndexBuffer(Some(&view)) }
    }

    fn draw_instanced(&mut self, vertex_count: u32, instance_count: u32, start_vertex: u32, start_instance: u32) {
        unsafe {
            self.raw
                .DrawInstanced(vertex_count, instance_count, start_vertex, start_instance)
        }
    }

    fn draw_indexed_instanced(
        &mut self,
        index_count: u32,
        instance_count: u32,
        start_index: u32,
        base_vertex: i32,
        start_instance: u32,
    ) {
        unsafe {
            self.raw
                .DrawIndexedInstanced(index_count, instance_count, start_index, base_vertex, start_instance)
        }
    }
}
