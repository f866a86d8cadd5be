//! The static scene: one colored triangle.

use std::rc::Rc;

use crate::Result;
use crate::device::GpuContext;
use crate::hal::{Api, PrimitiveTopologyType, ShaderSource, ShaderStage};
use crate::pipeline::{GraphicsPsoBuilder, RootSignature, compile_shader, presets};
use crate::render::RenderData;
use crate::resource::{Mesh, Vertex, VertexPC, input_layout};

const TRIANGLE_HLSL: &str = include_str!("../../shaders/triangle.hlsl");

/// Counter-clockwise on screen, so it survives the default back-face culling.
pub const TRIANGLE: [VertexPC; 3] = [
    VertexPC::new([0.0, 0.5, 0.0], [1.0, 0.0, 0.0]),
    VertexPC::new([-0.5, -0.5, 0.0], [0.0, 1.0, 0.0]),
    VertexPC::new([0.5, -0.5, 0.0], [0.0, 0.0, 1.0]),
];

fn shader_source(entry_point: &'static str, stage: ShaderStage) -> ShaderSource<'static> {
    ShaderSource {
        name: "triangle.hlsl",
        code: TRIANGLE_HLSL,
        entry_point,
        stage,
    }
}

/// Uploads the triangle, compiles its pipeline and registers everything with
/// the context's resource manager.
pub fn load_triangle<A: Api>(gpu: &mut GpuContext<A>, debug_shaders: bool) -> Result<RenderData> {
    let vertex_shader = compile_shader::<A>(&shader_source("VSMain", ShaderStage::Vertex), debug_shaders)?;
    let pixel_shader = compile_shader::<A>(&shader_source("PSMain", ShaderStage::Pixel), debug_shaders)?;

    let root_signature = Rc::new(RootSignature::empty(gpu.device())?);
    let mesh = Mesh::from_vertices(gpu.device(), &TRIANGLE, None)?;

    let mut builder = GraphicsPsoBuilder::new();
    builder
        .set_input_layout(&input_layout(VertexPC::ATTRIBUTES)?)
        .set_vertex_shader(vertex_shader)
        .set_pixel_shader(pixel_shader)
        .set_root_signature(root_signature.clone())
        .set_rasterizer_state(presets::default_rasterizer_state())
        .set_blend_state(presets::opaque_blend_state())
        .set_depth_stencil_state(presets::no_depth_no_stencil())
        .set_primitive_topology(PrimitiveTopologyType::Triangle)
        .set_rtv_count(1)
        .set_rtv_format(gpu.swap_chain().format(), 0)
        .set_multi_sample_state(presets::single_sample());
    let pso = builder.build(gpu.device())?;

    let resources = gpu.resources_mut();
    let data = RenderData {
        mesh_id: resources.add_mesh(mesh)?,
        root_signature_id: resources.add_root_signature(root_signature)?,
        graphics_pso_id: resources.add_graphics_pso(pso)?,
    };
    log::info!("triangle scene loaded");
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::Headless;
    use crate::hal::CullMode;
    use crate::resource::ResourceCapacities;
    use crate::testing::{self, NoWindow};

    /// Twice the signed area after the viewport transform; positive is
    /// clockwise with y pointing down.
    fn screen_area(vertices: &[VertexPC; 3], width: f32, height: f32) -> f32 {
        let [a, b, c] = vertices.map(|v| {
            let [x, y, _] = v.position;
            ((x + 1.0) * 0.5 * width, (1.0 - y) * 0.5 * height)
        });
        (b.0 - a.0) * (c.1 - a.1) - (c.0 - a.0) * (b.1 - a.1)
    }

    #[test]
    fn triangle_survives_default_culling() {
        let rasterizer = presets::default_rasterizer_state();
        let area = screen_area(&TRIANGLE, 800.0, 600.0);
        assert_ne!(area, 0.0);

        let clockwise = area > 0.0;
        let front_facing = clockwise != rasterizer.front_counter_clockwise;
        assert_eq!(rasterizer.cull_mode, CullMode::Back);
        assert!(front_facing, "triangle winding is culled (area {area})");
    }

    #[test]
    fn registers_one_of_each_resource() {
        let mut gpu = GpuContext::<Headless>::with_device(
            testing::device(),
            &NoWindow,
            800,
            600,
            testing::settings(),
            ResourceCapacities::default(),
        )
        .unwrap();

        let data = load_triangle(&mut gpu, true).unwrap();
        let resources = gpu.resources();
        assert_eq!(resources.mesh_count(), 1);
        assert_eq!(resources.root_signature_count(), 1);
        assert_eq!(resources.graphics_pso_count(), 1);

        let mesh = resources.mesh(data.mesh_id).unwrap();
        assert_eq!(mesh.vertex_buffer().unwrap().vertex_count(), 3);
        assert!(mesh.index_buffer().is_none());

        let pso = resources.graphics_pso(data.graphics_pso_id).unwrap();
        let root_signature = resources.root_signature(data.root_signature_id).unwrap();
        assert!(Rc::ptr_eq(pso.root_signature(), &root_signature));
    }

    #[test]
    fn mesh_capacity_is_enforced() {
        let mut gpu = GpuContext::<Headless>::with_device(
            testing::device(),
            &NoWindow,
            64,
            64,
            testing::settings(),
            ResourceCapacities {
                meshes: 1,
                ..ResourceCapacities::default()
            },
        )
        .unwrap();

        load_triangle(&mut gpu, true).unwrap();
        assert!(matches!(
            load_triangle(&mut gpu, true),
            Err(crate::Error::CapacityExceeded { container: "meshes", capacity: 1 })
        ));
    }
}
