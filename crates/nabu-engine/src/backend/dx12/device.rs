use std::ffi::c_void;
use std::sync::Arc;

use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::{DXGI_FORMAT_UNKNOWN, DXGI_SAMPLE_DESC};
use windows::core::{Interface, PCSTR};

use super::command::{Dx12CommandAllocator, Dx12CommandList};
use super::pipeline::{self, Dx12PipelineState, Dx12RootSignature};
use super::resource::{Dx12DescriptorHeap, Dx12Heap, Dx12Resource};
use super::sync::{Dx12Event, Dx12Fence, Dx12Queue};
use super::{ApiResultExt, Dx12, conv};
use crate::hal::{
    self, BufferDesc, CpuDescriptor, DescriptorHeapDesc, DescriptorHeapKind, DiagnosticsSink, GraphicsPipelineDesc,
    HeapDesc, QueueKind, ResourceState, Severity,
};
use crate::{Error, Result};

pub struct Dx12Device {
    raw: ID3D12Device,
}

impl Dx12Device {
    pub(super) fn new(raw: ID3D12Device) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &ID3D12Device {
        &self.raw
    }
}

/// Info-queue callback registration.
///
/// Owns the boxed sink handed to the runtime as callback context until
/// [`hal::Device::unregister_diagnostics`] reclaims it.
pub struct Dx12DiagnosticsCookie {
    cookie: u32,
    context: *mut Arc<dyn DiagnosticsSink>,
}

unsafe extern "system" fn diagnostics_callback(
    _category: D3D12_MESSAGE_CATEGORY,
    severity: D3D12_MESSAGE_SEVERITY,
    _id: D3D12_MESSAGE_ID,
    description: PCSTR,
    context: *mut c_void,
) {
    let severity = match severity {
        D3D12_MESSAGE_SEVERITY_CORRUPTION => Severity::Corruption,
        D3D12_MESSAGE_SEVERITY_ERROR => Severity::Error,
        D3D12_MESSAGE_SEVERITY_WARNING => Severity::Warning,
        D3D12_MESSAGE_SEVERITY_INFO => Severity::Info,
        _ => Severity::Message,
    };
    if context.is_null() || description.is_null() {
        return;
    }

    let sink = unsafe { &*(context as *const Arc<dyn DiagnosticsSink>) };
    let message = unsafe { description.to_string() }.unwrap_or_else(|_| "<invalid UTF-8>".to_string());
    sink.on_message(severity, &message);
}

impl hal::Device<Dx12> for Dx12Device {
    fn create_queue(&self, kind: QueueKind) -> Result<Dx12Queue> {
        let desc = D3D12_COMMAND_QUEUE_DESC {
            Type: conv::command_list_type(kind),
            ..Default::default()
        };
        let raw: ID3D12CommandQueue = unsafe { self.raw.CreateCommandQueue(&desc) }
            .api("ID3D12Device::CreateCommandQueue", "failed to create command queue")?;
        Ok(Dx12Queue::new(raw, kind))
    }

    fn create_fence(&self, initial_value: u64) -> Result<Dx12Fence> {
        let raw: ID3D12Fence = unsafe { self.raw.CreateFence(initial_value, D3D12_FENCE_FLAG_NONE) }
            .api("ID3D12Device::CreateFence", "failed to create fence")?;
        Ok(Dx12Fence::new(raw))
    }

    fn create_event(&self) -> Result<Dx12Event> {
        Dx12Event::new()
    }

    fn create_command_allocator(&self, kind: QueueKind) -> Result<Dx12CommandAllocator> {
        let raw: ID3D12CommandAllocator = unsafe { self.raw.CreateCommandAllocator(conv::command_list_type(kind)) }
            .api("ID3D12Device::CreateCommandAllocator", "failed to create command allocator")?;
        Ok(Dx12CommandAllocator::new(raw))
    }

    fn create_command_list(&self, kind: QueueKind, allocator: &Dx12CommandAllocator) -> Result<Dx12CommandList> {
        let raw: ID3D12GraphicsCommandList = unsafe {
            self.raw
                .CreateCommandList(0, conv::command_list_type(kind), allocator.raw(), None::<&ID3D12PipelineState>)
        }
        .api("ID3D12Device::CreateCommandList", "failed to create command list")?;
        Ok(Dx12CommandList::new(raw))
    }

    fn create_descriptor_heap(&self, desc: &DescriptorHeapDesc) -> Result<Dx12DescriptorHeap> {
        let native = D3D12_DESCRIPTOR_HEAP_DESC {
            Type: conv::descriptor_heap_type(desc.kind),
            NumDescriptors: desc.count,
            Flags: if desc.shader_visible {
                D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE
            } else {
                D3D12_DESCRIPTOR_HEAP_FLAG_NONE
            },
            NodeMask: 0,
        };
        let raw: ID3D12DescriptorHeap = unsafe { self.raw.CreateDescriptorHeap(&native) }
            .api("ID3D12Device::CreateDescriptorHeap", "failed to create descriptor heap")?;
        Ok(Dx12DescriptorHeap::new(raw))
    }

    fn descriptor_increment(&self, kind: DescriptorHeapKind) -> u32 {
        unsafe { self.raw.GetDescriptorHandleIncrementSize(conv::descriptor_heap_type(kind)) }
    }

    fn create_render_target_view(&self, resource: &Dx12Resource, dest: CpuDescriptor) {
        unsafe {
            self.raw
                .CreateRenderTargetView(resource.raw(), None, D3D12_CPU_DESCRIPTOR_HANDLE { ptr: dest.ptr })
        }
    }

    fn create_heap(&self, desc: &HeapDesc) -> Result<Dx12Heap> {
        let native = D3D12_HEAP_DESC {
            SizeInBytes: desc.size,
            Properties: D3D12_HEAP_PROPERTIES {
                Type: conv::heap_type(desc.kind),
                CPUPageProperty: D3D12_CPU_PAGE_PROPERTY_UNKNOWN,
                MemoryPoolPreference: D3D12_MEMORY_POOL_UNKNOWN,
                CreationNodeMask: 0,
                VisibleNodeMask: 0,
            },
            Alignment: desc.alignment,
            Flags: if desc.buffers_only {
                D3D12_HEAP_FLAG_ALLOW_ONLY_BUFFERS
            } else {
                D3D12_HEAP_FLAG_NONE
            },
        };
        let mut heap: Option<ID3D12Heap> = None;
        unsafe { self.raw.CreateHeap(&native, &mut heap) }.api("ID3D12Device::CreateHeap", "failed to create heap")?;
        let raw = heap.ok_or_else(|| Error::os_handle("ID3D12Device::CreateHeap", "no heap returned", "null"))?;
        Ok(Dx12Heap::new(raw, *desc))
    }

    fn create_placed_resource(
        &self,
        heap: &Dx12Heap,
        offset: u64,
        desc: &BufferDesc,
        initial_state: ResourceState,
    ) -> Result<Dx12Resource> {
        let native = D3D12_RESOURCE_DESC {
            Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
            Alignment: 0,
            Width: desc.size,
            Height: 1,
            DepthOrArraySize: 1,
            MipLevels: 1,
            Format: DXGI_FORMAT_UNKNOWN,
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
            Flags: D3D12_RESOURCE_FLAG_NONE,
        };
        let mut resource: Option<ID3D12Resource> = None;
        unsafe {
            self.raw.CreatePlacedResource(
                heap.raw(),
                offset,
                &native,
                conv::resource_state(initial_state),
                None,
                &mut resource,
            )
        }
        .api(
            "ID3D12Device::CreatePlacedResource",
            &format!("failed to place a {} byte buffer at offset {offset}", desc.size),
        )?;
        let raw = resource
            .ok_or_else(|| Error::os_handle("ID3D12Device::CreatePlacedResource", "no resource returned", "null"))?;
        Ok(Dx12Resource::new(raw))
    }

    fn create_root_signature(&self, blob: &[u8]) -> Result<Dx12RootSignature> {
        let raw: ID3D12RootSignature = unsafe { self.raw.CreateRootSignature(0, blob) }
            .api("ID3D12Device::CreateRootSignature", "failed to create root signature")?;
        Ok(Dx12RootSignature::new(raw))
    }

    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc<'_, Dx12>) -> Result<Dx12PipelineState> {
        let semantic_names = pipeline::semantic_names(desc.input_layout)?;
        let input_elements = pipeline::input_elements(desc.input_layout, &semantic_names);

        let mut native = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
            // Borrowed without AddRef. ManuallyDrop never releases it.
            pRootSignature: unsafe { std::mem::transmute_copy(desc.root_signature.raw()) },
            VS: pipeline::bytecode(Some(desc.vertex_shader)),
            PS: pipeline::bytecode(desc.pixel_shader),
            BlendState: conv::blend_state(&desc.blend),
            SampleMask: desc.sample_mask,
            RasterizerState: conv::rasterizer(&desc.rasterizer),
            DepthStencilState: conv::depth_stencil(&desc.depth_stencil),
            InputLayout: D3D12_INPUT_LAYOUT_DESC {
                pInputElementDescs: input_elements.as_ptr(),
                NumElements: input_elements.len() as u32,
            },
            PrimitiveTopologyType: conv::primitive_topology_type(desc.primitive_topology_type),
            NumRenderTargets: desc.render_target_formats.len() as u32,
            DSVFormat: conv::format(desc.depth_stencil_format),
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: desc.sample.count,
                Quality: desc.sample.quality,
            },
            ..Default::default()
        };
        for (slot, format) in native.RTVFormats.iter_mut().zip(desc.render_target_formats) {
            *slot = conv::format(*format);
        }

        let raw: ID3D12PipelineState = unsafe { self.raw.CreateGraphicsPipelineState(&native) }
            .api("ID3D12Device::CreateGraphicsPipelineState", "failed to create graphics PSO")?;
        Ok(Dx12PipelineState::new(raw))
    }

    fn register_diagnostics(&self, sink: Arc<dyn DiagnosticsSink>) -> Result<Dx12DiagnosticsCookie> {
        let info_queue: ID3D12InfoQueue1 = self
            .raw
            .cast()
            .api("ID3D12Device::QueryInterface", "ID3D12InfoQueue1 unavailable; is the debug layer on?")?;

        let context = Box::into_raw(Box::new(sink));
        let mut cookie = 0u32;
        let registered = unsafe {
            info_queue.RegisterMessageCallback(
                Some(diagnostics_callback),
                D3D12_MESSAGE_CALLBACK_FLAG_NONE,
                context as *const c_void,
                &mut cookie,
            )
        };
        if let Err(e) = registered {
            drop(unsafe { Box::from_raw(context) });
            return Err(Error::api(
                "ID3D12InfoQueue1::RegisterMessageCallback",
                "failed to register diagnostics callback",
                e.message(),
            ));
        }

        log::debug!("D3D12 diagnostics callback registered (cookie {cookie})");
        Ok(Dx12DiagnosticsCookie { cookie, context })
    }

    fn unregister_diagnostics(&self, cookie: Dx12DiagnosticsCookie) -> Result<()> {
        let info_queue: ID3D12InfoQueue1 = self
            .raw
            .cast()
            .api("ID3D12Device::QueryInterface", "ID3D12InfoQueue1 unavailable")?;
        unsafe { info_queue.UnregisterMessageCallback(cookie.cookie) }
            .api("ID3D12InfoQueue1::UnregisterMessageCallback", "failed to unregister diagnostics callback")?;

        // The runtime no longer references the context.
        drop(unsafe { Box::from_raw(cookie.context) });
        Ok(())
    }
}
