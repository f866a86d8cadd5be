use super::buffer::{BufferData, IndexBuffer, VertexBuffer};
use super::vertex::Vertex;
use crate::device::Device;
use crate::hal::{self, Api, HeapDesc, HeapKind};
use crate::{Error, Result};

/// Placed resources must start on a 64 KiB boundary.
pub const RESOURCE_PLACEMENT_ALIGNMENT: u64 = 64 * 1024;

/// Where the vertex and index buffers of a mesh live inside its heap.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct HeapLayout {
    pub vb_offset: u64,
    pub ib_offset: u64,
    pub heap_size: u64,
    pub vb_size: u64,
    pub ib_size: u64,
}

impl HeapLayout {
    /// Vertex buffer at 0, index buffer at the first aligned offset after it.
    pub fn new(vb_size: u64, ib_size: u64) -> Self {
        let vb_units = vb_size.div_ceil(RESOURCE_PLACEMENT_ALIGNMENT);
        let ib_units = ib_size.div_ceil(RESOURCE_PLACEMENT_ALIGNMENT);

        Self {
            vb_offset: 0,
            ib_offset: vb_units * RESOURCE_PLACEMENT_ALIGNMENT,
            heap_size: (vb_units + ib_units) * RESOURCE_PLACEMENT_ALIGNMENT,
            vb_size,
            ib_size,
        }
    }
}

/// Vertex (and optional index) buffer placed in one shared upload heap.
///
/// The buffers hold a reference to the heap's memory; they are dropped first.
pub struct Mesh<A: Api> {
    vertex_buffer: Option<VertexBuffer<A>>,
    index_buffer: Option<IndexBuffer<A>>,
    heap: A::Heap,
    layout: HeapLayout,
}

impl<A: Api> Mesh<A> {
    /// Allocates the heap for buffers of the given sizes, with no buffers yet.
    pub fn initialize_heap(device: &Device<A>, vb_size: u64, ib_size: u64) -> Result<Self> {
        let layout = HeapLayout::new(vb_size, ib_size);
        if layout.heap_size == 0 {
            return Err(Error::InvalidArgument("mesh without vertex data".into()));
        }

        let heap = hal::Device::create_heap(
            device.raw(),
            &HeapDesc {
                size: layout.heap_size,
                kind: HeapKind::Upload,
                alignment: RESOURCE_PLACEMENT_ALIGNMENT,
                buffers_only: true,
            },
        )?;
        log::debug!(
            "mesh heap: {} bytes (vb @ {}, ib @ {})",
            layout.heap_size,
            layout.vb_offset,
            layout.ib_offset
        );

        Ok(Self {
            vertex_buffer: None,
            index_buffer: None,
            heap,
            layout,
        })
    }

    pub fn create_vertex_buffer(&mut self, device: &Device<A>, bytes: &[u8], stride: usize) -> Result<()> {
        check_region("vertex", bytes, self.layout.vb_size)?;
        self.vertex_buffer = Some(VertexBuffer::new(
            device,
            &self.heap,
            &BufferData {
                bytes,
                element_size: stride,
                heap_offset: self.layout.vb_offset,
            },
        )?);
        Ok(())
    }

    pub fn create_index_buffer(&mut self, device: &Device<A>, bytes: &[u8], index_size: usize) -> Result<()> {
        check_region("index", bytes, self.layout.ib_size)?;
        self.index_buffer = Some(IndexBuffer::new(
            device,
            &self.heap,
            &BufferData {
                bytes,
                element_size: index_size,
                heap_offset: self.layout.ib_offset,
            },
        )?);
        Ok(())
    }

    /// Builds a complete mesh from typed vertices and optional 32-bit indices.
    pub fn from_vertices<V: Vertex>(device: &Device<A>, vertices: &[V], indices: Option<&[u32]>) -> Result<Self> {
        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        let index_bytes: &[u8] = indices.map(bytemuck::cast_slice).unwrap_or_default();

        let mut mesh = Self::initialize_heap(device, vertex_bytes.len() as u64, index_bytes.len() as u64)?;
        mesh.create_vertex_buffer(device, vertex_bytes, size_of::<V>())?;
        if !index_bytes.is_empty() {
            mesh.create_index_buffer(device, index_bytes, size_of::<u32>())?;
        }
        Ok(mesh)
    }

    pub fn vertex_buffer(&self) -> Option<&VertexBuffer<A>> {
        self.vertex_buffer.as_ref()
    }

    pub fn index_buffer(&self) -> Option<&IndexBuffer<A>> {
        self.index_buffer.as_ref()
    }

    pub fn heap(&self) -> &A::Heap {
        &self.heap
    }

    pub fn layout(&self) -> &HeapLayout {
        &self.layout
    }
}

/// A buffer larger than its reserved region would alias the next one.
fn check_region(kind: &str, bytes: &[u8], reserved: u64) -> Result<()> {
    if bytes.len() as u64 > reserved {
        return Err(Error::InvalidArgument(format!(
            "{kind} buffer of {} bytes exceeds the {reserved} bytes reserved in the mesh heap",
            bytes.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{VertexP, VertexPC};
    use crate::testing;

    const KB64: u64 = RESOURCE_PLACEMENT_ALIGNMENT;

    // ── heap layout ───────────────────────────────────────────────────────

    #[test]
    fn layout_invariants_hold_across_sizes() {
        let sizes = [1, 12, 72, KB64 - 1, KB64, KB64 + 1, 3 * KB64 + 5, 1 << 20];
        for &vb in &sizes {
            for &ib in sizes.iter().chain([0].iter()) {
                let layout = HeapLayout::new(vb, ib);
                assert_eq!(layout.vb_offset, 0);
                assert!(layout.ib_offset >= vb, "vb {vb}, ib {ib}");
                assert_eq!(layout.ib_offset % KB64, 0);
                assert!(layout.heap_size >= layout.ib_offset + ib);
                assert_eq!(layout.heap_size % KB64, 0);
            }
        }
    }

    #[test]
    fn exact_multiple_needs_no_padding() {
        let layout = HeapLayout::new(KB64, KB64);
        assert_eq!(layout.ib_offset, KB64);
        assert_eq!(layout.heap_size, 2 * KB64);
    }

    // ── buffers ───────────────────────────────────────────────────────────

    #[test]
    fn three_colored_vertices() {
        let device = testing::device();
        let vertices = [
            VertexPC { position: [0.0, 0.25, 0.0], color: [1.0, 0.0, 0.0] },
            VertexPC { position: [-0.25, -0.25, 0.0], color: [0.0, 1.0, 0.0] },
            VertexPC { position: [0.25, -0.25, 0.0], color: [0.0, 0.0, 1.0] },
        ];
        let mesh = Mesh::from_vertices(&device, &vertices, None).unwrap();

        let vb = mesh.vertex_buffer().unwrap();
        assert_eq!(vb.vertex_count(), 3);
        assert_eq!(vb.view().stride_in_bytes, 24);
        assert_eq!(vb.view().size_in_bytes, 72);
        assert!(mesh.index_buffer().is_none());
        assert_eq!(mesh.layout().heap_size, KB64);
    }

    #[test]
    fn vertex_bytes_round_trip() {
        let device = testing::device();
        let vertices: Vec<VertexP> = (0..100)
            .map(|i| VertexP { position: [i as f32, -(i as f32), 0.5] })
            .collect();
        let mesh = Mesh::from_vertices(&device, &vertices, None).unwrap();

        let vb = mesh.vertex_buffer().unwrap();
        assert_eq!(vb.read_back().unwrap(), bytemuck::cast_slice::<_, u8>(&vertices));
        assert_eq!(vb.vertex_count() as usize, vb.view().size_in_bytes as usize / size_of::<VertexP>());
    }

    #[test]
    fn index_buffer_placed_at_aligned_offset() {
        let device = testing::device();
        let vertices = vec![VertexP::default(); 6000]; // 72000 bytes: spills past 64 KiB
        let indices: Vec<u32> = (0..6000).collect();
        let mesh = Mesh::from_vertices(&device, &vertices, Some(indices.as_slice())).unwrap();

        let ib = mesh.index_buffer().unwrap();
        assert_eq!(mesh.layout().ib_offset, 2 * KB64);
        assert_eq!(ib.index_count(), 6000);
        assert_eq!(ib.format(), hal::IndexFormat::U32);
        assert_eq!(ib.view().location - mesh.vertex_buffer().unwrap().view().location, 2 * KB64);
        assert_eq!(ib.read_back().unwrap(), bytemuck::cast_slice::<_, u8>(&indices));
    }

    #[test]
    fn sixteen_bit_indices_pick_r16() {
        let device = testing::device();
        let mut mesh = Mesh::initialize_heap(&device, 36, 6).unwrap();
        mesh.create_vertex_buffer(&device, &[0; 36], 12).unwrap();
        mesh.create_index_buffer(&device, bytemuck::cast_slice(&[0u16, 1, 2]), 2).unwrap();
        assert_eq!(mesh.index_buffer().unwrap().format(), hal::IndexFormat::U16);
        assert!(matches!(
            mesh.create_index_buffer(&device, &[0, 1, 2], 1),
            Err(Error::UnsupportedIndexFormat(1))
        ));
    }

    #[test]
    fn oversized_buffers_are_rejected() {
        let device = testing::device();
        let mut mesh = Mesh::initialize_heap(&device, 36, 12).unwrap();

        assert!(matches!(
            mesh.create_vertex_buffer(&device, &[0; 48], 12),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            mesh.create_index_buffer(&device, &[0; 16], 4),
            Err(Error::InvalidArgument(_))
        ));
        assert!(mesh.vertex_buffer().is_none());
        assert!(mesh.index_buffer().is_none());

        mesh.create_vertex_buffer(&device, &[0; 36], 12).unwrap();
        mesh.create_index_buffer(&device, &[0; 12], 4).unwrap();
        assert_eq!(mesh.vertex_buffer().unwrap().vertex_count(), 3);
        assert_eq!(mesh.index_buffer().unwrap().index_count(), 3);
    }

    #[test]
    fn zero_stride_is_rejected() {
        let device = testing::device();
        let mut mesh = Mesh::initialize_heap(&device, 36, 0).unwrap();
        assert!(matches!(
            mesh.create_vertex_buffer(&device, &[0; 36], 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(mesh.vertex_buffer().is_none());
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let device = testing::device();
        assert!(Mesh::<crate::backend::headless::Headless>::initialize_heap(&device, 0, 0).is_err());
    }
}
