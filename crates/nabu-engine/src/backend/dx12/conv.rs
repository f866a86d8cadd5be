//! Engine enums to their native Direct3D 12 / DXGI values.

use windows::Win32::Foundation::RECT;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::{
    DXGI_SWAP_EFFECT, DXGI_SWAP_EFFECT_DISCARD, DXGI_SWAP_EFFECT_FLIP_DISCARD, DXGI_SWAP_EFFECT_FLIP_SEQUENTIAL,
    DXGI_SWAP_EFFECT_SEQUENTIAL,
};

use crate::hal::{
    Blend, BlendOp, BlendState, ComparisonFunc, CullMode, DepthStencilState, DepthWriteMask, DescriptorHeapKind,
    FeatureLevel, FillMode, Format, HeapKind, IndexFormat, InputClassification, LogicOp, MAX_RENDER_TARGETS,
    PrimitiveTopology, PrimitiveTopologyType, QueueKind, RasterizerState, ResourceState, ScissorRect, StencilFace,
    StencilOp, SwapEffect, Viewport,
};

pub fn feature_level(level: FeatureLevel) -> D3D_FEATURE_LEVEL {
    match level {
        FeatureLevel::Level11_0 => D3D_FEATURE_LEVEL_11_0,
        FeatureLevel::Level11_1 => D3D_FEATURE_LEVEL_11_1,
        FeatureLevel::Level12_0 => D3D_FEATURE_LEVEL_12_0,
        FeatureLevel::Level12_1 => D3D_FEATURE_LEVEL_12_1,
        FeatureLevel::Level12_2 => D3D_FEATURE_LEVEL_12_2,
    }
}

pub fn command_list_type(kind: QueueKind) -> D3D12_COMMAND_LIST_TYPE {
    match kind {
        QueueKind::Direct => D3D12_COMMAND_LIST_TYPE_DIRECT,
        QueueKind::Compute => D3D12_COMMAND_LIST_TYPE_COMPUTE,
        QueueKind::Copy => D3D12_COMMAND_LIST_TYPE_COPY,
    }
}

pub fn descriptor_heap_type(kind: DescriptorHeapKind) -> D3D12_DESCRIPTOR_HEAP_TYPE {
    match kind {
        DescriptorHeapKind::CbvSrvUav => D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
        DescriptorHeapKind::Sampler => D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER,
        DescriptorHeapKind::Rtv => D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
        DescriptorHeapKind::Dsv => D3D12_DESCRIPTOR_HEAP_TYPE_DSV,
    }
}

pub fn heap_type(kind: HeapKind) -> D3D12_HEAP_TYPE {
    match kind {
        HeapKind::Default => D3D12_HEAP_TYPE_DEFAULT,
        HeapKind::Upload => D3D12_HEAP_TYPE_UPLOAD,
        HeapKind::Readback => D3D12_HEAP_TYPE_READBACK,
    }
}

pub fn resource_state(state: ResourceState) -> D3D12_RESOURCE_STATES {
    match state {
        ResourceState::Common => D3D12_RESOURCE_STATE_COMMON,
        ResourceState::Present => D3D12_RESOURCE_STATE_PRESENT,
        ResourceState::VertexAndConstantBuffer => D3D12_RESOURCE_STATE_VERTEX_AND_CONSTANT_BUFFER,
        ResourceState::IndexBuffer => D3D12_RESOURCE_STATE_INDEX_BUFFER,
        ResourceState::RenderTarget => D3D12_RESOURCE_STATE_RENDER_TARGET,
        ResourceState::CopyDest => D3D12_RESOURCE_STATE_COPY_DEST,
        ResourceState::CopySource => D3D12_RESOURCE_STATE_COPY_SOURCE,
        ResourceState::GenericRead => D3D12_RESOURCE_STATE_GENERIC_READ,
    }
}

pub fn format(format: Format) -> DXGI_FORMAT {
    match format {
        Format::Unknown => DXGI_FORMAT_UNKNOWN,

        Format::Rgba8Unorm => DXGI_FORMAT_R8G8B8A8_UNORM,
        Format::Rgba8UnormSrgb => DXGI_FORMAT_R8G8B8A8_UNORM_SRGB,
        Format::Bgra8Unorm => DXGI_FORMAT_B8G8R8A8_UNORM,
        Format::Rgba16Float => DXGI_FORMAT_R16G16B16A16_FLOAT,
        Format::D32Float => DXGI_FORMAT_D32_FLOAT,

        Format::R32Float => DXGI_FORMAT_R32_FLOAT,
        Format::Rg32Float => DXGI_FORMAT_R32G32_FLOAT,
        Format::Rgb32Float => DXGI_FORMAT_R32G32B32_FLOAT,
        Format::Rgba32Float => DXGI_FORMAT_R32G32B32A32_FLOAT,

        Format::R32Uint => DXGI_FORMAT_R32_UINT,
        Format::Rg32Uint => DXGI_FORMAT_R32G32_UINT,
        Format::Rgb32Uint => DXGI_FORMAT_R32G32B32_UINT,
        Format::Rgba32Uint => DXGI_FORMAT_R32G32B32A32_UINT,
        Format::R16Uint => DXGI_FORMAT_R16_UINT,
        Format::Rg16Uint => DXGI_FORMAT_R16G16_UINT,
        Format::Rgba16Uint => DXGI_FORMAT_R16G16B16A16_UINT,
        Format::R8Uint => DXGI_FORMAT_R8_UINT,
        Format::Rg8Uint => DXGI_FORMAT_R8G8_UINT,
        Format::Rgba8Uint => DXGI_FORMAT_R8G8B8A8_UINT,

        Format::R32Sint => DXGI_FORMAT_R32_SINT,
        Format::Rg32Sint => DXGI_FORMAT_R32G32_SINT,
        Format::Rgb32Sint => DXGI_FORMAT_R32G32B32_SINT,
        Format::Rgba32Sint => DXGI_FORMAT_R32G32B32A32_SINT,
        Format::R16Sint => DXGI_FORMAT_R16_SINT,
        Format::Rg16Sint => DXGI_FORMAT_R16G16_SINT,
        Format::Rgba16Sint => DXGI_FORMAT_R16G16B16A16_SINT,
        Format::R8Sint => DXGI_FORMAT_R8_SINT,
        Format::Rg8Sint => DXGI_FORMAT_R8G8_SINT,
        Format::Rgba8Sint => DXGI_FORMAT_R8G8B8A8_SINT,
    }
}

pub fn index_format(format: IndexFormat) -> DXGI_FORMAT {
    match format {
        IndexFormat::U32 => DXGI_FORMAT_R32_UINT,
        IndexFormat::U16 => DXGI_FORMAT_R16_UINT,
        IndexFormat::U8 => DXGI_FORMAT_R8_UINT,
    }
}

pub fn swap_effect(effect: SwapEffect) -> DXGI_SWAP_EFFECT {
    match effect {
        SwapEffect::Discard => DXGI_SWAP_EFFECT_DISCARD,
        SwapEffect::Sequential => DXGI_SWAP_EFFECT_SEQUENTIAL,
        SwapEffect::FlipSequential => DXGI_SWAP_EFFECT_FLIP_SEQUENTIAL,
        SwapEffect::FlipDiscard => DXGI_SWAP_EFFECT_FLIP_DISCARD,
    }
}

pub fn primitive_topology(topology: PrimitiveTopology) -> D3D_PRIMITIVE_TOPOLOGY {
    match topology {
        PrimitiveTopology::PointList => D3D_PRIMITIVE_TOPOLOGY_POINTLIST,
        PrimitiveTopology::LineList => D3D_PRIMITIVE_TOPOLOGY_LINELIST,
        PrimitiveTopology::LineStrip => D3D_PRIMITIVE_TOPOLOGY_LINESTRIP,
        PrimitiveTopology::TriangleList => D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST,
        PrimitiveTopology::TriangleStrip => D3D_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP,
    }
}

pub fn primitive_topology_type(topology: PrimitiveTopologyType) -> D3D12_PRIMITIVE_TOPOLOGY_TYPE {
    match topology {
        PrimitiveTopologyType::Undefined => D3D12_PRIMITIVE_TOPOLOGY_TYPE_UNDEFINED,
        PrimitiveTopologyType::Point => D3D12_PRIMITIVE_TOPOLOGY_TYPE_POINT,
        PrimitiveTopologyType::Line => D3D12_PRIMITIVE_TOPOLOGY_TYPE_LINE,
        PrimitiveTopologyType::Triangle => D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE,
        PrimitiveTopologyType::Patch => D3D12_PRIMITIVE_TOPOLOGY_TYPE_PATCH,
    }
}

pub fn input_classification(classification: InputClassification) -> D3D12_INPUT_CLASSIFICATION {
    match classification {
        InputClassification::PerVertex => D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
        InputClassification::PerInstance => D3D12_INPUT_CLASSIFICATION_PER_INSTANCE_DATA,
    }
}

pub fn viewport(vp: &Viewport) -> D3D12_VIEWPORT {
    D3D12_VIEWPORT {
        TopLeftX: vp.top_left_x,
        TopLeftY: vp.top_left_y,
        Width: vp.width,
        Height: vp.height,
        MinDepth: vp.min_depth,
        MaxDepth: vp.max_depth,
    }
}

pub fn rect(rect: &ScissorRect) -> RECT {
    RECT {
        left: rect.left,
        top: rect.top,
        right: rect.right,
        bottom: rect.bottom,
    }
}

pub fn rasterizer(state: &RasterizerState) -> D3D12_RASTERIZER_DESC {
    D3D12_RASTERIZER_DESC {
        FillMode: match state.fill_mode {
            FillMode::Wireframe => D3D12_FILL_MODE_WIREFRAME,
            FillMode::Solid => D3D12_FILL_MODE_SOLID,
        },
        CullMode: match state.cull_mode {
            CullMode::None => D3D12_CULL_MODE_NONE,
            CullMode::Front => D3D12_CULL_MODE_FRONT,
            CullMode::Back => D3D12_CULL_MODE_BACK,
        },
        FrontCounterClockwise: state.front_counter_clockwise.into(),
        DepthBias: state.depth_bias,
        DepthBiasClamp: state.depth_bias_clamp,
        SlopeScaledDepthBias: state.slope_scaled_depth_bias,
        DepthClipEnable: state.depth_clip_enable.into(),
        MultisampleEnable: state.multisample_enable.into(),
        AntialiasedLineEnable: state.antialiased_line_enable.into(),
        ForcedSampleCount: state.forced_sample_count,
        ConservativeRaster: if state.conservative_raster {
            D3D12_CONSERVATIVE_RASTERIZATION_MODE_ON
        } else {
            D3D12_CONSERVATIVE_RASTERIZATION_MODE_OFF
        },
    }
}

fn blend(blend: Blend) -> D3D12_BLEND {
    match blend {
        Blend::Zero => D3D12_BLEND_ZERO,
        Blend::One => D3D12_BLEND_ONE,
        Blend::SrcColor => D3D12_BLEND_SRC_COLOR,
        Blend::InvSrcColor => D3D12_BLEND_INV_SRC_COLOR,
        Blend::SrcAlpha => D3D12_BLEND_SRC_ALPHA,
        Blend::InvSrcAlpha => D3D12_BLEND_INV_SRC_ALPHA,
        Blend::DestAlpha => D3D12_BLEND_DEST_ALPHA,
        Blend::InvDestAlpha => D3D12_BLEND_INV_DEST_ALPHA,
        Blend::DestColor => D3D12_BLEND_DEST_COLOR,
        Blend::InvDestColor => D3D12_BLEND_INV_DEST_COLOR,
    }
}

fn blend_op(op: BlendOp) -> D3D12_BLEND_OP {
    match op {
        BlendOp::Add => D3D12_BLEND_OP_ADD,
        BlendOp::Subtract => D3D12_BLEND_OP_SUBTRACT,
        BlendOp::RevSubtract => D3D12_BLEND_OP_REV_SUBTRACT,
        BlendOp::Min => D3D12_BLEND_OP_MIN,
        BlendOp::Max => D3D12_BLEND_OP_MAX,
    }
}

fn logic_op(op: LogicOp) -> D3D12_LOGIC_OP {
    match op {
        LogicOp::Clear => D3D12_LOGIC_OP_CLEAR,
        LogicOp::Set => D3D12_LOGIC_OP_SET,
        LogicOp::Copy => D3D12_LOGIC_OP_COPY,
        LogicOp::Noop => D3D12_LOGIC_OP_NOOP,
    }
}

pub fn blend_state(state: &BlendState) -> D3D12_BLEND_DESC {
    let mut render_targets = [D3D12_RENDER_TARGET_BLEND_DESC::default(); MAX_RENDER_TARGETS];
    for (native, rt) in render_targets.iter_mut().zip(state.render_targets.iter()) {
        *native = D3D12_RENDER_TARGET_BLEND_DESC {
            BlendEnable: rt.blend_enable.into(),
            LogicOpEnable: rt.logic_op_enable.into(),
            SrcBlend: blend(rt.src_blend),
            DestBlend: blend(rt.dest_blend),
            BlendOp: blend_op(rt.blend_op),
            SrcBlendAlpha: blend(rt.src_blend_alpha),
            DestBlendAlpha: blend(rt.dest_blend_alpha),
            BlendOpAlpha: blend_op(rt.blend_op_alpha),
            LogicOp: logic_op(rt.logic_op),
            RenderTargetWriteMask: rt.write_mask,
        };
    }

    D3D12_BLEND_DESC {
        AlphaToCoverageEnable: state.alpha_to_coverage_enable.into(),
        IndependentBlendEnable: state.independent_blend_enable.into(),
        RenderTarget: render_targets,
    }
}

fn comparison(func: ComparisonFunc) -> D3D12_COMPARISON_FUNC {
    match func {
        ComparisonFunc::Never => D3D12_COMPARISON_FUNC_NEVER,
        ComparisonFunc::Less => D3D12_COMPARISON_FUNC_LESS,
        ComparisonFunc::Equal => D3D12_COMPARISON_FUNC_EQUAL,
        ComparisonFunc::LessEqual => D3D12_COMPARISON_FUNC_LESS_EQUAL,
        ComparisonFunc::Greater => D3D12_COMPARISON_FUNC_GREATER,
        ComparisonFunc::NotEqual => D3D12_COMPARISON_FUNC_NOT_EQUAL,
        ComparisonFunc::GreaterEqual => D3D12_COMPARISON_FUNC_GREATER_EQUAL,
        ComparisonFunc::Always => D3D12_COMPARISON_FUNC_ALWAYS,
    }
}

fn stencil_op(op: StencilOp) -> D3D12_STENCIL_OP {
    match op {
        StencilOp::Keep => D3D12_STENCIL_OP_KEEP,
        StencilOp::Zero => D3D12_STENCIL_OP_ZERO,
        StencilOp::Replace => D3D12_STENCIL_OP_REPLACE,
        StencilOp::IncrSat => D3D12_STENCIL_OP_INCR_SAT,
        StencilOp::DecrSat => D3D12_STENCIL_OP_DECR_SAT,
        StencilOp::Invert => D3D12_STENCIL_OP_INVERT,
        StencilOp::Incr => D3D12_STENCIL_OP_INCR,
        StencilOp::Decr => D3D12_STENCIL_OP_DECR,
    }
}

fn stencil_face(face: &StencilFace) -> D3D12_DEPTH_STENCILOP_DESC {
    D3D12_DEPTH_STENCILOP_DESC {
        StencilFailOp: stencil_op(face.fail_op),
        StencilDepthFailOp: stencil_op(face.depth_fail_op),
        StencilPassOp: stencil_op(face.pass_op),
        StencilFunc: comparison(face.func),
    }
}

pub fn depth_stencil(state: &DepthStencilState) -> D3D12_DEPTH_STENCIL_DESC {
    D3D12_DEPTH_STENCIL_DESC {
        DepthEnable: state.depth_enable.into(),
        DepthWriteMask: match state.depth_write_mask {
            DepthWriteMask::Zero => D3D12_DEPTH_WRITE_MASK_ZERO,
            DepthWriteMask::All => D3D12_DEPTH_WRITE_MASK_ALL,
        },
        DepthFunc: comparison(state.depth_func),
        StencilEnable: state.stencil_enable.into(),
        StencilReadMask: state.stencil_read_mask,
        StencilWriteMask: state.stencil_write_mask,
        FrontFace: stencil_face(&state.front_face),
        BackFace: stencil_face(&state.back_face),
    }
}
