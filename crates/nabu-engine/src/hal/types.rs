use std::fmt;

/// Minimum Direct3D feature level a device is created against.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FeatureLevel {
    Level11_0,
    Level11_1,
    Level12_0,
    Level12_1,
    Level12_2,
}

impl fmt::Display for FeatureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FeatureLevel::Level11_0 => "11_0",
            FeatureLevel::Level11_1 => "11_1",
            FeatureLevel::Level12_0 => "12_0",
            FeatureLevel::Level12_1 => "12_1",
            FeatureLevel::Level12_2 => "12_2",
        };
        f.write_str(s)
    }
}

/// Submission queue class. Also selects the command list/allocator type.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum QueueKind {
    Direct,
    Compute,
    Copy,
}

/// Severity reported by the GPU diagnostics layer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    Corruption,
    Error,
    Warning,
    Info,
    Message,
}

/// Factory-level options.
#[derive(Debug, Copy, Clone, Default)]
pub struct InstanceDesc {
    /// Create the factory with debug flags (matches the debug layer).
    pub debug: bool,
}

/// Description of a physical or virtual adapter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdapterInfo {
    pub name: String,
    pub vendor_id: u32,
    pub device_id: u32,
    /// Bytes.
    pub dedicated_video_memory: u64,
    /// Bytes.
    pub dedicated_system_memory: u64,
    /// Bytes.
    pub shared_system_memory: u64,
    pub is_software: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DescriptorHeapKind {
    CbvSrvUav,
    Sampler,
    Rtv,
    Dsv,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DescriptorHeapDesc {
    pub kind: DescriptorHeapKind,
    pub count: u32,
    pub shader_visible: bool,
}

/// CPU-side descriptor address.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct CpuDescriptor {
    pub ptr: usize,
}

impl CpuDescriptor {
    #[inline]
    pub const fn offset(self, index: u32, increment: u32) -> Self {
        Self {
            ptr: self.ptr + index as usize * increment as usize,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HeapKind {
    Default,
    Upload,
    Readback,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct HeapDesc {
    pub size: u64,
    pub kind: HeapKind,
    pub alignment: u64,
    /// Restrict the heap to buffer resources.
    pub buffers_only: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BufferDesc {
    pub size: u64,
}

/// Resource usage state for transition barriers.
///
/// `Present` and `Common` share the same native value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResourceState {
    Common,
    Present,
    VertexAndConstantBuffer,
    IndexBuffer,
    RenderTarget,
    CopyDest,
    CopySource,
    GenericRead,
}

impl ResourceState {
    /// Collapses aliases onto one canonical state.
    pub fn canonical(self) -> Self {
        match self {
            ResourceState::Present => ResourceState::Common,
            other => other,
        }
    }
}

/// Texture and vertex element formats used by the engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Format {
    Unknown,

    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Rgba16Float,
    D32Float,

    R32Float,
    Rg32Float,
    Rgb32Float,
    Rgba32Float,

    R32Uint,
    Rg32Uint,
    Rgb32Uint,
    Rgba32Uint,
    R16Uint,
    Rg16Uint,
    Rgba16Uint,
    R8Uint,
    Rg8Uint,
    Rgba8Uint,

    R32Sint,
    Rg32Sint,
    Rgb32Sint,
    Rgba32Sint,
    R16Sint,
    Rg16Sint,
    Rgba16Sint,
    R8Sint,
    Rg8Sint,
    Rgba8Sint,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SwapEffect {
    Discard,
    Sequential,
    FlipSequential,
    FlipDiscard,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SwapChainDesc {
    pub width: u32,
    pub height: u32,
    pub format: Format,
    pub buffer_count: u32,
    pub swap_effect: SwapEffect,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-target viewport with the `[0, 1]` depth range.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            top_left_x: 0.0,
            top_left_y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ScissorRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScissorRect {
    pub fn new(right: u32, bottom: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            right: right as i32,
            bottom: bottom as i32,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

/// Topology class baked into a pipeline state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrimitiveTopologyType {
    Undefined,
    Point,
    Line,
    Triangle,
    Patch,
}

impl PrimitiveTopology {
    pub fn topology_type(self) -> PrimitiveTopologyType {
        match self {
            PrimitiveTopology::PointList => PrimitiveTopologyType::Point,
            PrimitiveTopology::LineList | PrimitiveTopology::LineStrip => PrimitiveTopologyType::Line,
            PrimitiveTopology::TriangleList | PrimitiveTopology::TriangleStrip => {
                PrimitiveTopologyType::Triangle
            }
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IndexFormat {
    U32,
    U16,
    U8,
}

impl IndexFormat {
    pub fn size(self) -> usize {
        match self {
            IndexFormat::U32 => 4,
            IndexFormat::U16 => 2,
            IndexFormat::U8 => 1,
        }
    }

    /// Index format for an element of `size` bytes.
    pub fn from_size(size: usize) -> Option<Self> {
        match size {
            4 => Some(IndexFormat::U32),
            2 => Some(IndexFormat::U16),
            1 => Some(IndexFormat::U8),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct VertexBufferView {
    pub location: u64,
    pub size_in_bytes: u32,
    pub stride_in_bytes: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct IndexBufferView {
    pub location: u64,
    pub size_in_bytes: u32,
    pub format: IndexFormat,
}

/// Layout of the shader-visible bindings. This engine only uses empty layouts.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct RootSignatureDesc {
    pub allow_input_assembler_input_layout: bool,
}

impl RootSignatureDesc {
    /// No parameters, input assembler enabled.
    pub fn empty() -> Self {
        Self {
            allow_input_assembler_input_layout: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_offset_scales_by_increment() {
        let start = CpuDescriptor { ptr: 0x1000 };
        assert_eq!(start.offset(0, 32), start);
        assert_eq!(start.offset(3, 32).ptr, 0x1000 + 96);
    }

    #[test]
    fn present_aliases_common() {
        assert_eq!(ResourceState::Present.canonical(), ResourceState::Common);
        assert_eq!(ResourceState::RenderTarget.canonical(), ResourceState::RenderTarget);
    }

    #[test]
    fn feature_levels_order_by_capability() {
        assert!(FeatureLevel::Level12_2 > FeatureLevel::Level12_0);
        assert_eq!(FeatureLevel::Level12_2.to_string(), "12_2");
    }

    #[test]
    fn viewport_spans_unit_depth() {
        let vp = Viewport::new(800, 600);
        assert_eq!((vp.width, vp.height), (800.0, 600.0));
        assert_eq!((vp.min_depth, vp.max_depth), (0.0, 1.0));
    }

    #[test]
    fn index_format_sizes() {
        assert_eq!(IndexFormat::from_size(4), Some(IndexFormat::U32));
        assert_eq!(IndexFormat::from_size(3), None);
        assert_eq!(IndexFormat::U16.size(), 2);
    }
}
