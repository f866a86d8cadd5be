//! GPU resources: mesh buffers placed in shared heaps, vertex layouts and the
//! id-addressed resource containers.

mod arena;
mod buffer;
mod manager;
mod mesh;
mod vertex;

pub use arena::{IdGenerator, ResourceId, SlotArena};
pub use buffer::{BufferData, IndexBuffer, VertexBuffer};
pub use manager::{ResourceCapacities, ResourceManager};
pub use mesh::{HeapLayout, Mesh, RESOURCE_PLACEMENT_ALIGNMENT};
pub use vertex::{
    Vertex, VertexAttribDescriptor, VertexAttribFormat, VertexAttribType, VertexP, VertexPC, attrib_format,
    input_layout, vertex_stride,
};
