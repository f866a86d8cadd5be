use std::fmt;

use super::barrier;
use crate::device::{FrameSync, GpuContext};
use crate::hal::{Api, CommandList as _, PrimitiveTopology, ScissorRect, Viewport};
use crate::resource::ResourceId;
use crate::{Error, Result};

/// Per-frame renderer parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RendererSettings {
    pub clear_color: [f32; 4],
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.2, 0.4, 1.0],
        }
    }
}

/// Ids of the resources one draw needs, as registered in the resource manager.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RenderData {
    pub mesh_id: ResourceId,
    pub root_signature_id: ResourceId,
    pub graphics_pso_id: ResourceId,
}

/// Where the renderer is within a frame.
///
/// Every frame walks `Idle → Recording → Submitted → Presented → Idle`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameState {
    Idle,
    Recording,
    Submitted,
    Presented,
}

impl FrameState {
    fn next(self) -> Self {
        match self {
            FrameState::Idle => FrameState::Recording,
            FrameState::Recording => FrameState::Submitted,
            FrameState::Submitted => FrameState::Presented,
            FrameState::Presented => FrameState::Idle,
        }
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FrameState::Idle => "idle",
            FrameState::Recording => "recording",
            FrameState::Submitted => "submitted",
            FrameState::Presented => "presented",
        };
        f.write_str(s)
    }
}

/// Records, submits and presents one frame per [`Renderer::render`] call.
pub struct Renderer {
    viewport: Viewport,
    scissor: ScissorRect,
    clear_color: [f32; 4],
    frame_sync: FrameSync,
    state: FrameState,
    frames: u64,
}

impl Renderer {
    /// Viewport and scissor cover the whole swap chain.
    pub fn new<A: Api>(gpu: &GpuContext<A>, settings: &RendererSettings) -> Self {
        let (width, height) = gpu.swap_chain().extent();
        let frame_sync = gpu.settings().frame_sync;
        log::info!("renderer initialized ({width}x{height}, {frame_sync:?})");

        Self {
            viewport: Viewport::new(width, height),
            scissor: ScissorRect::new(width, height),
            clear_color: settings.clear_color,
            frame_sync,
            state: FrameState::Idle,
            frames: 0,
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_scissors(&mut self, scissor: ScissorRect) {
        self.scissor = scissor;
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scissor(&self) -> ScissorRect {
        self.scissor
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn advance(&mut self, to: FrameState) -> Result<()> {
        if self.state.next() != to {
            return Err(Error::InvalidArgument(format!(
                "frame state cannot go from {} to {to}",
                self.state
            )));
        }
        self.state = to;
        Ok(())
    }

    /// Draws `data` into the current back buffer and presents it.
    ///
    /// Resource lookups happen before recording starts, so an unknown id
    /// leaves the renderer idle. A frame that fails later is abandoned and the
    /// renderer returns to idle as well.
    pub fn render<A: Api>(&mut self, gpu: &mut GpuContext<A>, data: &RenderData) -> Result<()> {
        let result = self.draw_frame(gpu, data);
        if result.is_err() && self.state != FrameState::Idle {
            log::warn!("frame abandoned in {} state", self.state);
            self.state = FrameState::Idle;
        }
        result
    }

    fn draw_frame<A: Api>(&mut self, gpu: &mut GpuContext<A>, data: &RenderData) -> Result<()> {
        let mut parts = gpu.parts_mut();

        let mesh = parts.resources.mesh(data.mesh_id)?;
        let root_signature = parts.resources.root_signature(data.root_signature_id)?;
        let pso = parts.resources.graphics_pso(data.graphics_pso_id)?;
        let vertex_buffer = mesh
            .vertex_buffer()
            .ok_or_else(|| Error::InvalidArgument(format!("mesh {} has no vertex buffer", data.mesh_id)))?;

        self.advance(FrameState::Recording)?;
        let slot = parts.swap_chain.current_back_buffer_index();
        let rtv = parts.swap_chain.current_back_buffer_rtv()?;
        let back_buffer = parts.swap_chain.current_back_buffer_resource();

        let context = parts.commands.acquire_graphics_context(slot)?;
        context.reset()?;

        let list = context.list_mut();
        list.set_pipeline_state(pso.pipeline_state());
        list.set_graphics_root_signature(root_signature.raw());
        list.set_viewports(&[self.viewport]);
        list.set_scissor_rects(&[self.scissor]);
        barrier::present_to_render_target::<A>(list, back_buffer);

        list.set_render_targets(&[rtv]);
        list.clear_render_target_view(rtv, self.clear_color);

        list.set_primitive_topology(PrimitiveTopology::TriangleList);
        list.set_vertex_buffers(0, &[*vertex_buffer.view()]);
        match mesh.index_buffer() {
            Some(index_buffer) => {
                list.set_index_buffer(index_buffer.view());
                list.draw_indexed_instanced(index_buffer.index_count(), 1, 0, 0, 0);
            }
            None => list.draw_instanced(vertex_buffer.vertex_count(), 1, 0, 0),
        }

        barrier::render_target_to_present::<A>(list, back_buffer);
        context.close()?;

        parts.commands.submit_graphics_context(slot)?;
        self.advance(FrameState::Submitted)?;

        parts.swap_chain.present()?;
        self.advance(FrameState::Presented)?;

        if self.frame_sync == FrameSync::WaitEveryFrame {
            parts.commands.wait_for_frame_to_finish()?;
        }
        self.frames += 1;
        self.advance(FrameState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::Headless;
    use crate::core::scene;
    use crate::hal::{ResourceState, Severity};
    use crate::resource::{Mesh, ResourceCapacities, VertexPC};
    use crate::testing::{self, CollectingSink, NoWindow};

    fn context_with(settings: crate::device::GpuSettings) -> GpuContext<Headless> {
        GpuContext::with_device(
            testing::device(),
            &NoWindow,
            800,
            600,
            settings,
            ResourceCapacities::default(),
        )
        .unwrap()
    }

    // ── state machine ──

    #[test]
    fn frame_state_cycle() {
        let mut state = FrameState::Idle;
        let mut seen = Vec::new();
        for _ in 0..4 {
            state = state.next();
            seen.push(state);
        }
        assert_eq!(
            seen,
            [FrameState::Recording, FrameState::Submitted, FrameState::Presented, FrameState::Idle]
        );
    }

    #[test]
    fn out_of_order_transition_is_rejected() {
        let gpu = context_with(testing::settings());
        let mut renderer = Renderer::new(&gpu, &RendererSettings::default());

        assert!(renderer.advance(FrameState::Submitted).is_err());
        assert_eq!(renderer.state(), FrameState::Idle);
    }

    #[test]
    fn failed_frame_returns_to_idle() {
        let mut gpu = context_with(testing::settings());
        let data = scene::load_triangle(&mut gpu, true).unwrap();
        let mut renderer = Renderer::new(&gpu, &RendererSettings::default());

        // An open list cannot be reset, so recording fails after leaving Idle.
        let slot = gpu.swap_chain().current_back_buffer_index();
        gpu.parts_mut().commands.acquire_graphics_context(slot).unwrap().reset().unwrap();

        assert!(renderer.render(&mut gpu, &data).unwrap_err().is_api_failure());
        assert_eq!(renderer.state(), FrameState::Idle);
        assert_eq!(renderer.frames(), 0);

        gpu.parts_mut().commands.acquire_graphics_context(slot).unwrap().close().unwrap();
        renderer.render(&mut gpu, &data).unwrap();
        assert_eq!(renderer.state(), FrameState::Idle);
        assert_eq!(renderer.frames(), 1);
    }

    // ── frames ──

    #[test]
    fn renders_triangle_frames_without_validation_errors() {
        let mut gpu = context_with(testing::settings());
        let data = scene::load_triangle(&mut gpu, true).unwrap();
        let mut renderer = Renderer::new(&gpu, &RendererSettings::default());

        for _ in 0..6 {
            renderer.render(&mut gpu, &data).unwrap();
            assert_eq!(renderer.state(), FrameState::Idle);
        }
        gpu.flush().unwrap();

        let stats = gpu.device().raw().stats();
        assert_eq!(renderer.frames(), 6);
        assert_eq!(stats.draw_calls, 6);
        assert_eq!(stats.vertices, 18);
        assert_eq!(stats.clears, 6);
        assert_eq!(stats.barriers, 12);
        assert_eq!(stats.presents, 6);
        assert_eq!(stats.validation_errors, 0);
        assert_eq!(
            gpu.swap_chain().current_back_buffer_resource().state(),
            ResourceState::Present
        );
    }

    #[test]
    fn back_buffer_is_cleared_to_the_configured_color() {
        let mut gpu = context_with(testing::settings());
        let data = scene::load_triangle(&mut gpu, true).unwrap();
        let mut renderer = Renderer::new(
            &gpu,
            &RendererSettings {
                clear_color: [1.0, 0.0, 0.0, 1.0],
            },
        );

        let slot = gpu.swap_chain().current_back_buffer_index();
        renderer.render(&mut gpu, &data).unwrap();
        gpu.flush().unwrap();

        let cleared = hal_buffer(&gpu, slot).last_clear_color();
        assert_eq!(cleared, Some([1.0, 0.0, 0.0, 1.0]));
    }

    fn hal_buffer(gpu: &GpuContext<Headless>, index: u32) -> crate::backend::headless::HeadlessResource {
        crate::hal::SwapChain::buffer(gpu.swap_chain().raw(), index).unwrap()
    }

    #[test]
    fn per_slot_sync_overlaps_one_frame() {
        let mut gpu = context_with(testing::settings());
        let data = scene::load_triangle(&mut gpu, true).unwrap();
        let mut renderer = Renderer::new(&gpu, &RendererSettings::default());

        renderer.render(&mut gpu, &data).unwrap();
        renderer.render(&mut gpu, &data).unwrap();
        // Neither slot had been used before.
        assert_eq!(gpu.device().raw().stats().blocking_waits, 0);

        renderer.render(&mut gpu, &data).unwrap();
        assert_eq!(gpu.device().raw().stats().blocking_waits, 1);
        assert!(gpu.device().raw().pending_ops() > 0);
    }

    #[test]
    fn wait_every_frame_drains_after_each_present() {
        let settings = crate::device::GpuSettings {
            frame_sync: FrameSync::WaitEveryFrame,
            ..testing::settings()
        };
        let mut gpu = context_with(settings);
        let data = scene::load_triangle(&mut gpu, true).unwrap();
        let mut renderer = Renderer::new(&gpu, &RendererSettings::default());

        for _ in 0..3 {
            renderer.render(&mut gpu, &data).unwrap();
            assert_eq!(gpu.device().raw().pending_ops(), 0);
        }
        assert_eq!(gpu.device().raw().stats().validation_errors, 0);
    }

    #[test]
    fn indexed_mesh_uses_indexed_draw() {
        let mut gpu = context_with(testing::settings());
        let triangle = scene::load_triangle(&mut gpu, true).unwrap();

        let quad = [
            VertexPC::new([-0.5, -0.5, 0.0], [1.0, 0.0, 0.0]),
            VertexPC::new([-0.5, 0.5, 0.0], [0.0, 1.0, 0.0]),
            VertexPC::new([0.5, 0.5, 0.0], [0.0, 0.0, 1.0]),
            VertexPC::new([0.5, -0.5, 0.0], [1.0, 1.0, 1.0]),
        ];
        let indices = [0u32, 1, 2, 0, 2, 3];
        let mesh = Mesh::from_vertices(gpu.device(), &quad, Some(&indices)).unwrap();
        let mesh_id = gpu.resources_mut().add_mesh(mesh).unwrap();

        let mut renderer = Renderer::new(&gpu, &RendererSettings::default());
        renderer.render(&mut gpu, &RenderData { mesh_id, ..triangle }).unwrap();
        gpu.flush().unwrap();

        let stats = gpu.device().raw().stats();
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(stats.vertices, 6);
        assert_eq!(stats.validation_errors, 0);
    }

    #[test]
    fn unknown_id_leaves_renderer_idle() {
        let mut gpu = context_with(testing::settings());
        let data = scene::load_triangle(&mut gpu, true).unwrap();
        let mut renderer = Renderer::new(&gpu, &RendererSettings::default());

        let bogus = RenderData {
            mesh_id: ResourceId(42),
            ..data
        };
        assert!(matches!(renderer.render(&mut gpu, &bogus), Err(Error::InvalidId { .. })));
        assert_eq!(renderer.state(), FrameState::Idle);

        renderer.render(&mut gpu, &data).unwrap();
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn validation_findings_reach_the_sink() {
        let sink = CollectingSink::new();
        let device = crate::device::Device::<Headless>::with_instance(
            Default::default(),
            &testing::settings(),
            sink.clone(),
        )
        .unwrap();
        let mut gpu =
            GpuContext::with_device(device, &NoWindow, 64, 64, testing::settings(), ResourceCapacities::default())
                .unwrap();
        let data = scene::load_triangle(&mut gpu, true).unwrap();
        let mut renderer = Renderer::new(&gpu, &RendererSettings::default());
        renderer.set_scissors(ScissorRect::new(64, 64));

        renderer.render(&mut gpu, &data).unwrap();
        gpu.flush().unwrap();
        assert_eq!(sink.errors(), 0);
        assert!(sink.messages().iter().all(|(severity, _)| *severity > Severity::Error));
    }
}
