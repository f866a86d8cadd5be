use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::invalid_call;
use crate::Result;
use crate::hal::{self, CpuDescriptor, DescriptorHeapDesc, Format, HeapDesc, HeapKind, ResourceState};

struct HeapInner {
    desc: HeapDesc,
    address: u64,
    memory: RefCell<Vec<u8>>,
}

/// Emulated memory heap. Backing bytes are allocated up front.
#[derive(Clone)]
pub struct HeadlessHeap(Rc<HeapInner>);

impl HeadlessHeap {
    pub(crate) fn new(desc: HeapDesc, address: u64) -> Self {
        let size = usize::try_from(desc.size).unwrap_or(usize::MAX);
        Self(Rc::new(HeapInner {
            desc,
            address,
            memory: RefCell::new(vec![0; size]),
        }))
    }

    pub fn desc(&self) -> &HeapDesc {
        &self.0.desc
    }

    /// Number of live resources placed in this heap, plus the heap itself.
    pub fn reference_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

enum ResourceKind {
    Buffer {
        heap: HeadlessHeap,
        offset: u64,
        size: u64,
    },
    Texture {
        width: u32,
        height: u32,
        format: Format,
        last_clear: Cell<Option<[f32; 4]>>,
    },
}

struct ResourceInner {
    kind: ResourceKind,
    state: Cell<ResourceState>,
    address: u64,
}

/// Emulated resource: a placed buffer or a swap-chain texture.
#[derive(Clone)]
pub struct HeadlessResource(Rc<ResourceInner>);

impl HeadlessResource {
    pub(crate) fn placed_buffer(heap: &HeadlessHeap, offset: u64, size: u64, state: ResourceState) -> Self {
        Self(Rc::new(ResourceInner {
            address: heap.0.address + offset,
            kind: ResourceKind::Buffer {
                heap: heap.clone(),
                offset,
                size,
            },
            state: Cell::new(state),
        }))
    }

    pub(crate) fn texture(width: u32, height: u32, format: Format, state: ResourceState) -> Self {
        Self(Rc::new(ResourceInner {
            address: 0,
            kind: ResourceKind::Texture {
                width,
                height,
                format,
                last_clear: Cell::new(None),
            },
            state: Cell::new(state),
        }))
    }

    pub fn state(&self) -> ResourceState {
        self.0.state.get()
    }

    pub(crate) fn set_state(&self, state: ResourceState) {
        self.0.state.set(state);
    }

    pub fn is_texture(&self) -> bool {
        matches!(self.0.kind, ResourceKind::Texture { .. })
    }

    /// Width and height for textures, `None` for buffers.
    pub fn extent(&self) -> Option<(u32, u32)> {
        match &self.0.kind {
            ResourceKind::Texture { width, height, .. } => Some((*width, *height)),
            ResourceKind::Buffer { .. } => None,
        }
    }

    pub fn format(&self) -> Format {
        match &self.0.kind {
            ResourceKind::Texture { format, .. } => *format,
            ResourceKind::Buffer { .. } => Format::Unknown,
        }
    }

    /// Byte offset inside the owning heap, for placed buffers.
    pub fn heap_offset(&self) -> Option<u64> {
        match &self.0.kind {
            ResourceKind::Buffer { offset, .. } => Some(*offset),
            ResourceKind::Texture { .. } => None,
        }
    }

    /// Color of the most recent executed clear.
    pub fn last_clear_color(&self) -> Option<[f32; 4]> {
        match &self.0.kind {
            ResourceKind::Texture { last_clear, .. } => last_clear.get(),
            ResourceKind::Buffer { .. } => None,
        }
    }

    pub(crate) fn record_clear(&self, color: [f32; 4]) {
        if let ResourceKind::Texture { last_clear, .. } = &self.0.kind {
            last_clear.set(Some(color));
        }
    }

    pub(crate) fn same_object(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn mapped_range(&self, operation: &'static str, len: usize) -> Result<(&HeadlessHeap, usize)> {
        let ResourceKind::Buffer { heap, offset, size } = &self.0.kind else {
            return Err(invalid_call(operation, "textures are not CPU mappable"));
        };
        if heap.desc().kind == HeapKind::Default {
            return Err(invalid_call(operation, "resources on DEFAULT heaps are not CPU mappable"));
        }
        if len as u64 > *size {
            return Err(invalid_call(
                operation,
                format!("{len} bytes do not fit in a buffer of {size} bytes"),
            ));
        }
        Ok((heap, *offset as usize))
    }
}

impl hal::Resource for HeadlessResource {
    fn gpu_virtual_address(&self) -> u64 {
        self.0.address
    }

    fn write(&self, data: &[u8]) -> Result<()> {
        let (heap, offset) = self.mapped_range("ID3D12Resource::Map", data.len())?;
        heap.0.memory.borrow_mut()[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn read(&self, len: usize) -> Result<Vec<u8>> {
        let (heap, offset) = self.mapped_range("ID3D12Resource::Map", len)?;
        Ok(heap.0.memory.borrow()[offset..offset + len].to_vec())
    }
}

pub struct HeadlessDescriptorHeap {
    desc: DescriptorHeapDesc,
    start: CpuDescriptor,
}

impl HeadlessDescriptorHeap {
    pub(crate) fn new(desc: DescriptorHeapDesc, start: CpuDescriptor) -> Self {
        Self { desc, start }
    }

    pub fn desc(&self) -> &DescriptorHeapDesc {
        &self.desc
    }
}

impl hal::DescriptorHeap for HeadlessDescriptorHeap {
    fn cpu_start(&self) -> CpuDescriptor {
        self.start
    }
}
