use crate::device::Device;
use crate::hal::{self, Api, BufferDesc, IndexBufferView, IndexFormat, Resource as _, ResourceState, VertexBufferView};
use crate::{Error, Result};

/// Source bytes for a placed buffer.
#[derive(Debug, Copy, Clone)]
pub struct BufferData<'a> {
    pub bytes: &'a [u8],
    /// Size of one element (vertex stride or index size).
    pub element_size: usize,
    /// Offset of the buffer inside its heap.
    pub heap_offset: u64,
}

impl BufferData<'_> {
    fn element_count(&self) -> Result<u32> {
        if self.element_size == 0 {
            return Err(Error::InvalidArgument("buffer element size must be non-zero".into()));
        }
        debug_assert_eq!(
            self.bytes.len() % self.element_size,
            0,
            "buffer size is not a multiple of the element size"
        );
        Ok((self.bytes.len() / self.element_size) as u32)
    }
}

/// Places a CPU-visible buffer in `heap` and copies `data` into it.
fn create_placed<A: Api>(device: &Device<A>, heap: &A::Heap, data: &BufferData<'_>) -> Result<A::Resource> {
    let resource = hal::Device::create_placed_resource(
        device.raw(),
        heap,
        data.heap_offset,
        &BufferDesc {
            size: data.bytes.len() as u64,
        },
        ResourceState::GenericRead,
    )?;
    resource.write(data.bytes)?;
    Ok(resource)
}

pub struct VertexBuffer<A: Api> {
    resource: A::Resource,
    view: VertexBufferView,
    vertex_count: u32,
}

impl<A: Api> VertexBuffer<A> {
    pub fn new(device: &Device<A>, heap: &A::Heap, data: &BufferData<'_>) -> Result<Self> {
        let vertex_count = data.element_count()?;
        let resource = create_placed(device, heap, data)?;
        let view = VertexBufferView {
            location: resource.gpu_virtual_address(),
            size_in_bytes: data.bytes.len() as u32,
            stride_in_bytes: data.element_size as u32,
        };

        Ok(Self {
            resource,
            view,
            vertex_count,
        })
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn view(&self) -> &VertexBufferView {
        &self.view
    }

    pub fn resource(&self) -> &A::Resource {
        &self.resource
    }

    /// Copies the buffer contents back to the CPU.
    pub fn read_back(&self) -> Result<Vec<u8>> {
        self.resource.read(self.view.size_in_bytes as usize)
    }
}

pub struct IndexBuffer<A: Api> {
    resource: A::Resource,
    view: IndexBufferView,
    index_count: u32,
}

impl<A: Api> IndexBuffer<A> {
    /// The index format follows from the element size.
    pub fn new(device: &Device<A>, heap: &A::Heap, data: &BufferData<'_>) -> Result<Self> {
        let format = IndexFormat::from_size(data.element_size)
            .filter(|f| *f != IndexFormat::U8)
            .ok_or(Error::UnsupportedIndexFormat(data.element_size))?;
        let index_count = data.element_count()?;
        let resource = create_placed(device, heap, data)?;
        let view = IndexBufferView {
            location: resource.gpu_virtual_address(),
            size_in_bytes: data.bytes.len() as u32,
            format,
        };

        Ok(Self {
            resource,
            view,
            index_count,
        })
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn format(&self) -> IndexFormat {
        self.view.format
    }

    pub fn view(&self) -> &IndexBufferView {
        &self.view
    }

    pub fn resource(&self) -> &A::Resource {
        &self.resource
    }

    pub fn read_back(&self) -> Result<Vec<u8>> {
        self.resource.read(self.view.size_in_bytes as usize)
    }
}
