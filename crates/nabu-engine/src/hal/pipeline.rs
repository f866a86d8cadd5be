use super::{Api, Format, PrimitiveTopologyType};

/// Maximum simultaneous render targets of a graphics pipeline.
pub const MAX_RENDER_TARGETS: usize = 8;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FillMode {
    Wireframe,
    Solid,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RasterizerState {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_counter_clockwise: bool,
    pub depth_bias: i32,
    pub depth_bias_clamp: f32,
    pub slope_scaled_depth_bias: f32,
    pub depth_clip_enable: bool,
    pub multisample_enable: bool,
    pub antialiased_line_enable: bool,
    pub forced_sample_count: u32,
    pub conservative_raster: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Blend {
    Zero,
    One,
    SrcColor,
    InvSrcColor,
    SrcAlpha,
    InvSrcAlpha,
    DestAlpha,
    InvDestAlpha,
    DestColor,
    InvDestColor,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BlendOp {
    Add,
    Subtract,
    RevSubtract,
    Min,
    Max,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LogicOp {
    Clear,
    Set,
    Copy,
    Noop,
}

/// Color write mask bits.
pub mod color_write {
    pub const RED: u8 = 1;
    pub const GREEN: u8 = 2;
    pub const BLUE: u8 = 4;
    pub const ALPHA: u8 = 8;
    pub const ALL: u8 = RED | GREEN | BLUE | ALPHA;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RenderTargetBlend {
    pub blend_enable: bool,
    pub logic_op_enable: bool,
    pub src_blend: Blend,
    pub dest_blend: Blend,
    pub blend_op: BlendOp,
    pub src_blend_alpha: Blend,
    pub dest_blend_alpha: Blend,
    pub blend_op_alpha: BlendOp,
    pub logic_op: LogicOp,
    pub write_mask: u8,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BlendState {
    pub alpha_to_coverage_enable: bool,
    pub independent_blend_enable: bool,
    pub render_targets: [RenderTargetBlend; MAX_RENDER_TARGETS],
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ComparisonFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DepthWriteMask {
    Zero,
    All,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    IncrSat,
    DecrSat,
    Invert,
    Incr,
    Decr,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StencilFace {
    pub fail_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub pass_op: StencilOp,
    pub func: ComparisonFunc,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DepthStencilState {
    pub depth_enable: bool,
    pub depth_write_mask: DepthWriteMask,
    pub depth_func: ComparisonFunc,
    pub stencil_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub front_face: StencilFace,
    pub back_face: StencilFace,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SampleDesc {
    pub count: u32,
    pub quality: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InputClassification {
    PerVertex,
    PerInstance,
}

/// One element of an input-assembler layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct InputElement {
    pub semantic_name: &'static str,
    pub semantic_index: u32,
    pub format: Format,
    pub input_slot: u32,
    pub aligned_byte_offset: u32,
    pub classification: InputClassification,
    pub instance_data_step_rate: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
    Compute,
}

impl ShaderStage {
    /// HLSL compile target.
    pub fn target(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_5_0",
            ShaderStage::Pixel => "ps_5_0",
            ShaderStage::Compute => "cs_5_0",
        }
    }
}

/// HLSL text handed to the backend compiler.
#[derive(Debug, Copy, Clone)]
pub struct ShaderSource<'a> {
    /// File name or label used in diagnostics.
    pub name: &'a str,
    pub code: &'a str,
    pub entry_point: &'a str,
    pub stage: ShaderStage,
}

/// Compiled shader bytecode.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShaderBlob {
    pub stage: ShaderStage,
    pub bytes: Vec<u8>,
}

/// Everything a graphics pipeline state is created from.
pub struct GraphicsPipelineDesc<'a, A: Api> {
    pub root_signature: &'a A::RootSignature,
    pub vertex_shader: &'a ShaderBlob,
    pub pixel_shader: Option<&'a ShaderBlob>,
    pub input_layout: &'a [InputElement],
    pub rasterizer: RasterizerState,
    pub blend: BlendState,
    pub sample_mask: u32,
    pub depth_stencil: DepthStencilState,
    pub primitive_topology_type: PrimitiveTopologyType,
    pub render_target_formats: &'a [Format],
    pub depth_stencil_format: Format,
    pub sample: SampleDesc,
}
