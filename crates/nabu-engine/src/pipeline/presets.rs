//! Named fixed-function states.

use crate::hal::{
    Blend, BlendOp, BlendState, ComparisonFunc, CullMode, DepthStencilState, DepthWriteMask, FillMode,
    LogicOp, MAX_RENDER_TARGETS, RasterizerState, RenderTargetBlend, SampleDesc, StencilFace, StencilOp,
    color_write,
};

/// Solid fill, back-face culling, counter-clockwise front faces.
pub fn default_rasterizer_state() -> RasterizerState {
    RasterizerState {
        fill_mode: FillMode::Solid,
        cull_mode: CullMode::Back,
        front_counter_clockwise: true,
        depth_bias: 0,
        depth_bias_clamp: 0.0,
        slope_scaled_depth_bias: 0.0,
        depth_clip_enable: true,
        multisample_enable: false,
        antialiased_line_enable: false,
        forced_sample_count: 0,
        conservative_raster: false,
    }
}

/// Blending off on every render target; source replaces destination.
pub fn opaque_blend_state() -> BlendState {
    let target = RenderTargetBlend {
        blend_enable: false,
        logic_op_enable: false,
        src_blend: Blend::One,
        dest_blend: Blend::Zero,
        blend_op: BlendOp::Add,
        src_blend_alpha: Blend::One,
        dest_blend_alpha: Blend::Zero,
        blend_op_alpha: BlendOp::Add,
        logic_op: LogicOp::Noop,
        write_mask: color_write::ALL,
    };

    BlendState {
        alpha_to_coverage_enable: false,
        independent_blend_enable: false,
        render_targets: [target; MAX_RENDER_TARGETS],
    }
}

pub fn single_sample() -> SampleDesc {
    SampleDesc { count: 1, quality: 0 }
}

pub fn multi_sample_2x() -> SampleDesc {
    SampleDesc { count: 2, quality: 0 }
}

pub fn multi_sample_4x() -> SampleDesc {
    SampleDesc { count: 4, quality: 0 }
}

pub fn multi_sample_8x() -> SampleDesc {
    SampleDesc { count: 8, quality: 0 }
}

fn keep_stencil_face() -> StencilFace {
    StencilFace {
        fail_op: StencilOp::Keep,
        depth_fail_op: StencilOp::Keep,
        pass_op: StencilOp::Keep,
        func: ComparisonFunc::Never,
    }
}

/// Depth test off. Stencil is enabled with zero masks, so it never writes.
pub fn no_depth_no_stencil() -> DepthStencilState {
    DepthStencilState {
        depth_enable: false,
        depth_write_mask: DepthWriteMask::Zero,
        depth_func: ComparisonFunc::Never,
        stencil_enable: true,
        stencil_read_mask: 0,
        stencil_write_mask: 0,
        front_face: keep_stencil_face(),
        back_face: keep_stencil_face(),
    }
}

/// Depth test `LESS` with writes, stencil inert.
pub fn default_depth_no_stencil() -> DepthStencilState {
    DepthStencilState {
        depth_enable: true,
        depth_write_mask: DepthWriteMask::All,
        depth_func: ComparisonFunc::Less,
        ..no_depth_no_stencil()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_blend_covers_every_target() {
        let blend = opaque_blend_state();
        assert!(blend.render_targets.iter().all(|rt| !rt.blend_enable && rt.write_mask == color_write::ALL));
    }

    #[test]
    fn depth_presets_differ_only_in_depth() {
        let off = no_depth_no_stencil();
        let on = default_depth_no_stencil();
        assert!(!off.depth_enable && on.depth_enable);
        assert_eq!(on.depth_func, ComparisonFunc::Less);
        assert_eq!(on.depth_write_mask, DepthWriteMask::All);
        assert_eq!((on.stencil_read_mask, on.stencil_write_mask), (0, 0));
        assert_eq!(on.front_face, off.front_face);
    }

    #[test]
    fn sample_presets() {
        let counts: Vec<u32> = [single_sample(), multi_sample_2x(), multi_sample_4x(), multi_sample_8x()]
            .iter()
            .map(|s| s.count)
            .collect();
        assert_eq!(counts, [1, 2, 4, 8]);
    }
}
