use std::cell::Cell;
use std::rc::Rc;

use super::device::{Op, SharedGpu};
use super::pipeline::{HeadlessPipelineState, HeadlessRootSignature};
use super::resource::HeadlessResource;
use super::{Headless, invalid_call};
use crate::hal::{
    self, CpuDescriptor, IndexBufferView, PrimitiveTopology, QueueKind, ResourceState, ScissorRect,
    Severity, VertexBufferView, Viewport,
};
use crate::{Error, Result};

/// Recorded command. Only what the emulator validates is kept.
#[derive(Clone)]
pub(crate) enum Command {
    SetPipelineState(HeadlessPipelineState),
    SetRootSignature(HeadlessRootSignature),
    SetViewports(usize),
    SetScissorRects(usize),
    Barrier {
        resource: HeadlessResource,
        before: ResourceState,
        after: ResourceState,
    },
    SetRenderTargets(Vec<CpuDescriptor>),
    ClearRenderTarget {
        rtv: CpuDescriptor,
        color: [f32; 4],
    },
    SetTopology(PrimitiveTopology),
    SetVertexBuffers(usize),
    SetIndexBuffer,
    Draw {
        vertex_count: u32,
        instance_count: u32,
    },
    DrawIndexed {
        index_count: u32,
        instance_count: u32,
    },
}

pub(crate) struct AllocatorState {
    kind: QueueKind,
    /// Submitted lists recorded from this allocator that have not executed yet.
    pub(crate) in_flight: Cell<u32>,
}

pub struct HeadlessCommandAllocator {
    state: Rc<AllocatorState>,
    gpu: SharedGpu,
}

impl HeadlessCommandAllocator {
    pub(crate) fn new(kind: QueueKind, gpu: SharedGpu) -> Self {
        Self {
            state: Rc::new(AllocatorState {
                kind,
                in_flight: Cell::new(0),
            }),
            gpu,
        }
    }

    pub(crate) fn kind(&self) -> QueueKind {
        self.state.kind
    }

    /// Number of submitted lists from this allocator still pending on the GPU.
    pub fn in_flight(&self) -> u32 {
        self.state.in_flight.get()
    }
}

impl hal::CommandAllocator for HeadlessCommandAllocator {
    fn reset(&self) -> Result<()> {
        let pending = self.state.in_flight.get();
        if pending > 0 {
            let msg = format!(
                "ID3D12CommandAllocator::Reset: allocator is still referenced by {pending} executing command list(s)"
            );
            self.gpu.borrow_mut().report(Severity::Error, &msg);
            return Err(Error::api("ID3D12CommandAllocator::Reset", msg, "E_FAIL"));
        }
        Ok(())
    }
}

pub struct HeadlessCommandList {
    kind: QueueKind,
    recording: bool,
    allocator: Rc<AllocatorState>,
    commands: Vec<Command>,
    gpu: SharedGpu,
}

impl HeadlessCommandList {
    pub(crate) fn new(kind: QueueKind, allocator: &HeadlessCommandAllocator, gpu: SharedGpu) -> Self {
        Self {
            kind,
            recording: true,
            allocator: allocator.state.clone(),
            commands: Vec::new(),
            gpu,
        }
    }

    pub(crate) fn kind(&self) -> QueueKind {
        self.kind
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Number of commands recorded since the last reset.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Snapshot for submission, or `None` while still recording.
    pub(crate) fn submission(&self) -> Option<Op> {
        if self.recording {
            return None;
        }
        self.allocator.in_flight.set(self.allocator.in_flight.get() + 1);
        Some(Op::Execute {
            commands: Rc::from(self.commands.as_slice()),
            allocator: self.allocator.clone(),
        })
    }

    fn record(&mut self, cmd: Command) {
        if !self.recording {
            self.gpu
                .borrow_mut()
                .report(Severity::Error, "command recorded into a closed command list");
            return;
        }
        self.commands.push(cmd);
    }
}

impl hal::CommandList<Headless> for HeadlessCommandList {
    fn reset(
        &mut self,
        allocator: &HeadlessCommandAllocator,
        initial_state: Option<&HeadlessPipelineState>,
    ) -> Result<()> {
        if self.recording {
            return Err(invalid_call(
                "ID3D12GraphicsCommandList::Reset",
                "command list must be closed before it is reset",
            ));
        }
        if allocator.kind() != self.kind {
            return Err(invalid_call(
                "ID3D12GraphicsCommandList::Reset",
                "allocator type does not match the command list type",
            ));
        }

        self.allocator = allocator.state.clone();
        self.commands.clear();
        self.recording = true;
        if let Some(pso) = initial_state {
            self.commands.push(Command::SetPipelineState(pso.clone()));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.recording {
            return Err(invalid_call(
                "ID3D12GraphicsCommandList::Close",
                "command list is already closed",
            ));
        }
        self.recording = false;
        Ok(())
    }

    fn set_pipeline_state(&mut self, pipeline: &HeadlessPipelineState) {
        self.record(Command::SetPipelineState(pipeline.clone()));
    }

    fn set_graphics_root_signature(&mut self, root_signature: &HeadlessRootSignature) {
        self.record(Command::SetRootSignature(root_signature.clone()));
    }

    fn set_viewports(&mut self, viewports: &[Viewport]) {
        self.record(Command::SetViewports(viewports.len()));
    }

    fn set_scissor_rects(&mut self, rects: &[ScissorRect]) {
        self.record(Command::SetScissorRects(rects.len()));
    }

    fn transition_barrier(&mut self, resource: &HeadlessResource, before: ResourceState, after: ResourceState) {
        self.record(Command::Barrier {
            resource: resource.clone(),
            before,
            after,
        });
    }

    fn set_render_targets(&mut self, rtvs: &[CpuDescriptor]) {
        self.record(Command::SetRenderTargets(rtvs.to_vec()));
    }

    fn clear_render_target_view(&mut self, rtv: CpuDescriptor, color: [f32; 4]) {
        self.record(Command::ClearRenderTarget { rtv, color });
    }

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.record(Command::SetTopology(topology));
    }

    fn set_vertex_buffers(&mut self, _start_slot: u32, views: &[VertexBufferView]) {
        self.record(Command::SetVertexBuffers(views.len()));
    }

    fn set_index_buffer(&mut self, _view: &IndexBufferView) {
        self.record(Command::SetIndexBuffer);
    }

    fn draw_instanced(&mut self, vertex_count: u32, instance_count: u32, _start_vertex: u32, _start_instance: u32) {
        self.record(Command::Draw {
            vertex_count,
            instance_count,
        });
    }

    fn draw_indexed_instanced(
        &mut self,
        index_count: u32,
        instance_count: u32,
        _start_index: u32,
        _base_vertex: i32,
        _start_instance: u32,
    ) {
        self.record(Command::DrawIndexed {
            index_count,
            instance_count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessDevice;
    use crate::hal::{CommandAllocator as _, CommandList as _, Device as _, Queue as _};

    fn setup() -> (HeadlessDevice, HeadlessCommandAllocator, HeadlessCommandList) {
        let device = HeadlessDevice::new(Default::default());
        let allocator = device.create_command_allocator(QueueKind::Direct).unwrap();
        let list = device.create_command_list(QueueKind::Direct, &allocator).unwrap();
        (device, allocator, list)
    }

    // ── allocator reuse ───────────────────────────────────────────────────

    #[test]
    fn allocator_reset_fails_while_list_in_flight() {
        let (device, allocator, mut list) = setup();
        let queue = device.create_queue(QueueKind::Direct).unwrap();

        list.close().unwrap();
        queue.execute(&[&list]);
        assert_eq!(allocator.in_flight(), 1);
        assert!(allocator.reset().is_err());
        assert_eq!(device.stats().validation_errors, 1);

        device.drain();
        assert_eq!(allocator.in_flight(), 0);
        allocator.reset().unwrap();
    }

    // ── list state ────────────────────────────────────────────────────────

    #[test]
    fn reset_requires_closed_list() {
        let (_device, allocator, mut list) = setup();
        assert!(list.reset(&allocator, None).is_err());
        list.close().unwrap();
        list.reset(&allocator, None).unwrap();
        assert!(list.is_recording());
    }

    #[test]
    fn open_list_is_rejected_at_submission() {
        let (device, _allocator, list) = setup();
        let queue = device.create_queue(QueueKind::Direct).unwrap();

        queue.execute(&[&list]);
        assert_eq!(device.stats().submitted_lists, 0);
        assert_eq!(device.stats().validation_errors, 1);
    }

    #[test]
    fn recording_into_closed_list_is_reported() {
        let (device, _allocator, mut list) = setup();
        list.close().unwrap();
        list.set_primitive_topology(PrimitiveTopology::TriangleList);
        assert_eq!(list.command_count(), 0);
        assert_eq!(device.stats().validation_errors, 1);
    }

    #[test]
    fn draw_without_pipeline_is_reported() {
        let (device, _allocator, mut list) = setup();
        let queue = device.create_queue(QueueKind::Direct).unwrap();

        list.draw_instanced(3, 1, 0, 0);
        list.close().unwrap();
        queue.execute(&[&list]);
        device.drain();

        let stats = device.stats();
        assert_eq!(stats.draw_calls, 1);
        assert!(stats.validation_errors > 0);
    }
}
