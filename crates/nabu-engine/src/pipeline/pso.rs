use std::rc::Rc;

use super::presets;
use super::root_signature::RootSignature;
use crate::device::Device;
use crate::hal::{
    self, Api, BlendState, DepthStencilState, Format, GraphicsPipelineDesc, InputElement, MAX_RENDER_TARGETS,
    PrimitiveTopologyType, RasterizerState, SampleDesc, ShaderBlob, ShaderStage,
};
use crate::{Error, Result};

/// Immutable graphics pipeline plus the root signature it was built against.
pub struct GraphicsPso<A: Api> {
    pipeline_state: A::PipelineState,
    root_signature: Rc<RootSignature<A>>,
}

impl<A: Api> GraphicsPso<A> {
    pub fn pipeline_state(&self) -> &A::PipelineState {
        &self.pipeline_state
    }

    pub fn root_signature(&self) -> &Rc<RootSignature<A>> {
        &self.root_signature
    }
}

/// Accumulates pipeline facets; [`GraphicsPsoBuilder::build`] freezes them.
pub struct GraphicsPsoBuilder<A: Api> {
    root_signature: Option<Rc<RootSignature<A>>>,
    vertex_shader: Option<ShaderBlob>,
    pixel_shader: Option<ShaderBlob>,
    input_layout: Vec<InputElement>,
    rasterizer: Option<RasterizerState>,
    blend: Option<BlendState>,
    sample_mask: u32,
    depth_stencil: DepthStencilState,
    primitive_topology_type: PrimitiveTopologyType,
    rtv_count: u32,
    rtv_formats: [Format; MAX_RENDER_TARGETS],
    depth_stencil_format: Format,
    sample: SampleDesc,
}

impl<A: Api> Default for GraphicsPsoBuilder<A> {
    fn default() -> Self {
        Self {
            root_signature: None,
            vertex_shader: None,
            pixel_shader: None,
            input_layout: Vec::new(),
            rasterizer: None,
            blend: None,
            sample_mask: 0,
            depth_stencil: presets::no_depth_no_stencil(),
            primitive_topology_type: PrimitiveTopologyType::Undefined,
            rtv_count: 0,
            rtv_formats: [Format::Unknown; MAX_RENDER_TARGETS],
            depth_stencil_format: Format::Unknown,
            sample: presets::single_sample(),
        }
    }
}

impl<A: Api> GraphicsPsoBuilder<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input_layout(&mut self, layout: &[InputElement]) -> &mut Self {
        self.input_layout = layout.to_vec();
        self
    }

    pub fn set_vertex_shader(&mut self, blob: ShaderBlob) -> &mut Self {
        self.vertex_shader = Some(blob);
        self
    }

    pub fn set_pixel_shader(&mut self, blob: ShaderBlob) -> &mut Self {
        self.pixel_shader = Some(blob);
        self
    }

    pub fn set_rasterizer_state(&mut self, state: RasterizerState) -> &mut Self {
        self.rasterizer = Some(state);
        self
    }

    /// Also enables every sample in the sample mask.
    pub fn set_blend_state(&mut self, state: BlendState) -> &mut Self {
        self.blend = Some(state);
        self.sample_mask = u32::MAX;
        self
    }

    pub fn set_root_signature(&mut self, root_signature: Rc<RootSignature<A>>) -> &mut Self {
        self.root_signature = Some(root_signature);
        self
    }

    pub fn set_primitive_topology(&mut self, topology: PrimitiveTopologyType) -> &mut Self {
        self.primitive_topology_type = topology;
        self
    }

    pub fn set_rtv_count(&mut self, count: u32) -> &mut Self {
        self.rtv_count = count;
        self
    }

    /// Panics if `index` is not a valid render-target slot.
    pub fn set_rtv_format(&mut self, format: Format, index: usize) -> &mut Self {
        self.rtv_formats[index] = format;
        self
    }

    pub fn set_multi_sample_state(&mut self, sample: SampleDesc) -> &mut Self {
        self.sample = sample;
        self
    }

    pub fn set_depth_stencil_state(&mut self, state: DepthStencilState) -> &mut Self {
        self.depth_stencil = state;
        self
    }

    pub fn set_depth_stencil_format(&mut self, format: Format) -> &mut Self {
        self.depth_stencil_format = format;
        self
    }

    /// Validates and compiles the accumulated description in one call.
    pub fn build(&self, device: &Device<A>) -> Result<GraphicsPso<A>> {
        let root_signature = self
            .root_signature
            .clone()
            .ok_or(Error::IncompletePipeline("root signature"))?;
        let vertex_shader = self
            .vertex_shader
            .as_ref()
            .ok_or(Error::IncompletePipeline("vertex shader"))?;
        let rasterizer = self.rasterizer.ok_or(Error::IncompletePipeline("rasterizer state"))?;
        let blend = self.blend.ok_or(Error::IncompletePipeline("blend state"))?;
        if self.primitive_topology_type == PrimitiveTopologyType::Undefined {
            return Err(Error::IncompletePipeline("primitive topology"));
        }

        debug_assert_eq!(vertex_shader.stage, ShaderStage::Vertex);
        let rtv_count = self.rtv_count as usize;
        if rtv_count > MAX_RENDER_TARGETS {
            return Err(Error::InvalidArgument(format!(
                "{rtv_count} render targets requested, at most {MAX_RENDER_TARGETS} are supported"
            )));
        }

        let desc = GraphicsPipelineDesc::<A> {
            root_signature: root_signature.raw(),
            vertex_shader,
            pixel_shader: self.pixel_shader.as_ref(),
            input_layout: &self.input_layout,
            rasterizer,
            blend,
            sample_mask: self.sample_mask,
            depth_stencil: self.depth_stencil,
            primitive_topology_type: self.primitive_topology_type,
            render_target_formats: &self.rtv_formats[..rtv_count],
            depth_stencil_format: self.depth_stencil_format,
            sample: self.sample,
        };
        let pipeline_state = hal::Device::create_graphics_pipeline(device.raw(), &desc)?;
        log::debug!(
            "graphics PSO created: {} input elements, {rtv_count} render target(s), {}x MSAA",
            self.input_layout.len(),
            self.sample.count
        );

        Ok(GraphicsPso {
            pipeline_state,
            root_signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::Headless;
    use crate::hal::{RootSignatureDesc, ShaderSource};
    use crate::pipeline::compile_shader;
    use crate::resource::{Vertex, VertexPC, input_layout};
    use crate::testing;

    const HLSL: &str = include_str!("../../shaders/triangle.hlsl");

    fn shader(entry_point: &str, stage: ShaderStage) -> ShaderBlob {
        compile_shader::<Headless>(
            &ShaderSource {
                name: "triangle.hlsl",
                code: HLSL,
                entry_point,
                stage,
            },
            true,
        )
        .unwrap()
    }

    fn complete_builder(device: &Device<Headless>) -> GraphicsPsoBuilder<Headless> {
        let root_signature = Rc::new(RootSignature::empty(device).unwrap());
        let mut builder = GraphicsPsoBuilder::new();
        builder
            .set_root_signature(root_signature)
            .set_input_layout(&input_layout(VertexPC::ATTRIBUTES).unwrap())
            .set_vertex_shader(shader("VSMain", ShaderStage::Vertex))
            .set_pixel_shader(shader("PSMain", ShaderStage::Pixel))
            .set_rasterizer_state(presets::default_rasterizer_state())
            .set_blend_state(presets::opaque_blend_state())
            .set_depth_stencil_state(presets::no_depth_no_stencil())
            .set_primitive_topology(PrimitiveTopologyType::Triangle)
            .set_rtv_count(1)
            .set_rtv_format(Format::Rgba8Unorm, 0)
            .set_multi_sample_state(presets::single_sample());
        builder
    }

    #[test]
    fn default_triangle_pipeline_builds() {
        let device = testing::device();
        let pso = complete_builder(&device).build(&device).unwrap();

        assert_eq!(pso.pipeline_state().render_target_formats(), [Format::Rgba8Unorm]);
        assert_eq!(pso.pipeline_state().sample_count(), 1);
        assert!(pso.root_signature().desc().allow_input_assembler_input_layout);
    }

    #[test]
    fn blend_state_enables_full_sample_mask() {
        let mut builder = GraphicsPsoBuilder::<Headless>::new();
        assert_eq!(builder.sample_mask, 0);
        builder.set_blend_state(presets::opaque_blend_state());
        assert_eq!(builder.sample_mask, u32::MAX);
    }

    #[test]
    fn missing_facets_are_named() {
        let device = testing::device();
        let err = GraphicsPsoBuilder::<Headless>::new().build(&device).err().unwrap();
        assert!(matches!(err, Error::IncompletePipeline("root signature")));

        let mut builder = complete_builder(&device);
        builder.set_primitive_topology(PrimitiveTopologyType::Undefined);
        assert!(matches!(
            builder.build(&device).err().unwrap(),
            Error::IncompletePipeline("primitive topology")
        ));
    }

    #[test]
    fn inconsistent_pipeline_is_rejected_by_the_device() {
        let device = testing::device();
        let mut builder = complete_builder(&device);
        let denying = RootSignature::new(
            &device,
            RootSignatureDesc {
                allow_input_assembler_input_layout: false,
            },
        )
        .unwrap();
        builder.set_root_signature(Rc::new(denying));

        let err = builder.build(&device).err().unwrap();
        assert!(err.is_api_failure());
        assert_eq!(device.raw().stats().validation_errors, 1);
    }

    #[test]
    fn unset_render_target_format_is_rejected() {
        let device = testing::device();
        let mut builder = complete_builder(&device);
        builder.set_rtv_count(2);
        assert!(builder.build(&device).is_err());
    }
}
