use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use super::command::{AllocatorState, Command, HeadlessCommandAllocator, HeadlessCommandList};
use super::pipeline::{self, HeadlessPipelineState, HeadlessRootSignature};
use super::resource::{HeadlessDescriptorHeap, HeadlessHeap, HeadlessResource};
use super::swap_chain::SwapChainState;
use super::sync::{EventState, FenceState, HeadlessEvent, HeadlessFence, HeadlessQueue};
use super::{Headless, invalid_call};
use crate::hal::{
    self, AdapterInfo, BufferDesc, CpuDescriptor, DescriptorHeapDesc, DescriptorHeapKind,
    DiagnosticsSink, GraphicsPipelineDesc, HeapDesc, HeapKind, QueueKind, ResourceState, Severity,
};
use crate::{Error, Result};

/// Counters describing what the emulated GPU has done so far.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DeviceStats {
    pub submitted_lists: u64,
    pub executed_lists: u64,
    pub draw_calls: u64,
    pub vertices: u64,
    pub clears: u64,
    pub barriers: u64,
    pub presents: u64,
    pub signals: u64,
    /// CPU waits that actually had to block on pending GPU work.
    pub blocking_waits: u64,
    /// Corruption- and error-severity findings.
    pub validation_errors: u64,
}

pub(crate) type SharedGpu = Rc<RefCell<GpuState>>;

pub(crate) enum Op {
    Execute {
        commands: Rc<[Command]>,
        allocator: Rc<AllocatorState>,
    },
    Signal {
        fence: Rc<FenceState>,
        value: u64,
    },
    Present {
        chain: Rc<SwapChainState>,
        index: u32,
    },
}

struct PendingOp {
    seq: u64,
    op: Op,
}

/// State shared by every object created from one device.
pub(crate) struct GpuState {
    queues: Vec<VecDeque<PendingOp>>,
    next_seq: u64,
    /// RTV address -> resource the view was created for.
    descriptors: HashMap<usize, HeadlessResource>,
    next_descriptor_base: usize,
    next_address: u64,
    sink: Option<Arc<dyn DiagnosticsSink>>,
    next_cookie: u32,
    pub(crate) stats: DeviceStats,
}

impl GpuState {
    fn new() -> Self {
        Self {
            queues: Vec::new(),
            next_seq: 0,
            descriptors: HashMap::new(),
            next_descriptor_base: 0x0010_0000,
            next_address: 0x0001_0000_0000,
            sink: None,
            next_cookie: 1,
            stats: DeviceStats::default(),
        }
    }

    pub(crate) fn add_queue(&mut self) -> usize {
        self.queues.push(VecDeque::new());
        self.queues.len() - 1
    }

    pub(crate) fn report(&mut self, severity: Severity, message: &str) {
        if severity <= Severity::Error {
            self.stats.validation_errors += 1;
        }
        if let Some(sink) = &self.sink {
            sink.on_message(severity, message);
        }
    }

    /// Appends work to a queue, then retires whatever no longer waits on execution.
    pub(crate) fn enqueue(&mut self, queue: usize, op: Op) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queues[queue].push_back(PendingOp { seq, op });
        self.retire(queue);
    }

    fn retire(&mut self, queue: usize) {
        while let Some(front) = self.queues[queue].front() {
            if matches!(front.op, Op::Execute { .. }) {
                break;
            }
            if let Some(pending) = self.queues[queue].pop_front() {
                self.complete(pending.op);
            }
        }
    }

    /// Executes the oldest pending operation across all queues.
    ///
    /// Returns false when there is no pending work at all.
    pub(crate) fn step(&mut self) -> bool {
        let oldest = self
            .queues
            .iter()
            .enumerate()
            .filter_map(|(i, q)| q.front().map(|op| (op.seq, i)))
            .min();

        let Some((_, queue)) = oldest else {
            return false;
        };

        if let Some(pending) = self.queues[queue].pop_front() {
            self.complete(pending.op);
        }
        self.retire(queue);
        true
    }

    pub(crate) fn pending_ops(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    fn complete(&mut self, op: Op) {
        match op {
            Op::Execute { commands, allocator } => {
                self.run(&commands);
                allocator.in_flight.set(allocator.in_flight.get().saturating_sub(1));
                self.stats.executed_lists += 1;
            }
            Op::Signal { fence, value } => {
                self.stats.signals += 1;
                fence.complete(value);
            }
            Op::Present { chain, index } => {
                let buffer = &chain.buffers[index as usize];
                if buffer.state().canonical() != ResourceState::Common {
                    let msg = format!(
                        "Present: back buffer {index} is in state {:?}, expected PRESENT",
                        buffer.state()
                    );
                    self.report(Severity::Error, &msg);
                }
                self.stats.presents += 1;
            }
        }
    }

    fn run(&mut self, commands: &[Command]) {
        let mut bound = BoundState::default();

        for cmd in commands {
            match cmd {
                Command::SetPipelineState(pso) => bound.pipeline = Some(pso.clone()),
                Command::SetRootSignature(rs) => bound.root_signature = Some(rs.clone()),
                Command::SetViewports(n) => bound.viewports = *n,
                Command::SetScissorRects(n) => bound.scissors = *n,
                Command::Barrier { resource, before, after } => {
                    self.stats.barriers += 1;
                    if resource.state().canonical() != before.canonical() {
                        let msg = format!(
                            "ResourceBarrier: before state {before:?} does not match current state {:?}",
                            resource.state()
                        );
                        self.report(Severity::Error, &msg);
                    }
                    resource.set_state(*after);
                }
                Command::SetRenderTargets(rtvs) => bound.render_targets = rtvs.clone(),
                Command::ClearRenderTarget { rtv, color } => {
                    self.stats.clears += 1;
                    match self.descriptors.get(&rtv.ptr).cloned() {
                        Some(target) => {
                            if target.state() != ResourceState::RenderTarget {
                                let msg = format!(
                                    "ClearRenderTargetView: resource is in state {:?}, expected RENDER_TARGET",
                                    target.state()
                                );
                                self.report(Severity::Error, &msg);
                            }
                            target.record_clear(*color);
                        }
                        None => self.report(
                            Severity::Corruption,
                            "ClearRenderTargetView: descriptor does not reference a render target view",
                        ),
                    }
                }
                Command::SetTopology(_) => bound.topology = true,
                Command::SetVertexBuffers(n) => bound.vertex_buffers = *n,
                Command::SetIndexBuffer => bound.index_buffer = true,
                Command::Draw { vertex_count, instance_count } => {
                    self.validate_draw(&bound, false);
                    self.stats.draw_calls += 1;
                    self.stats.vertices += u64::from(*vertex_count) * u64::from(*instance_count);
                }
                Command::DrawIndexed { index_count, instance_count } => {
                    self.validate_draw(&bound, true);
                    self.stats.draw_calls += 1;
                    self.stats.vertices += u64::from(*index_count) * u64::from(*instance_count);
                }
            }
        }
    }

    fn validate_draw(&mut self, bound: &BoundState, indexed: bool) {
        let mut problems = Vec::new();

        match (&bound.pipeline, &bound.root_signature) {
            (None, _) => problems.push("no pipeline state set"),
            (_, None) => problems.push("no graphics root signature set"),
            (Some(pso), Some(rs)) => {
                if !pso.root_signature().same_object(rs) {
                    problems.push("root signature differs from the one the pipeline was created with");
                }
                if pso.input_element_count() > 0 && bound.vertex_buffers == 0 {
                    problems.push("input layout declared but no vertex buffer bound");
                }
            }
        }
        if bound.viewports == 0 {
            problems.push("no viewport set");
        }
        if bound.scissors == 0 {
            problems.push("no scissor rect set");
        }
        if !bound.topology {
            problems.push("no primitive topology set");
        }
        if indexed && !bound.index_buffer {
            problems.push("indexed draw without an index buffer");
        }
        if bound.render_targets.is_empty() {
            problems.push("no render target bound");
        }
        for rtv in &bound.render_targets {
            if let Some(target) = self.descriptors.get(&rtv.ptr) {
                if target.state() != ResourceState::RenderTarget {
                    problems.push("render target is not in RENDER_TARGET state");
                }
            }
        }

        for p in problems {
            let msg = format!("Draw: {p}");
            self.report(Severity::Error, &msg);
        }
    }
}

#[derive(Default)]
struct BoundState {
    pipeline: Option<HeadlessPipelineState>,
    root_signature: Option<HeadlessRootSignature>,
    viewports: usize,
    scissors: usize,
    render_targets: Vec<CpuDescriptor>,
    topology: bool,
    vertex_buffers: usize,
    index_buffer: bool,
}

/// Emulated logical device.
pub struct HeadlessDevice {
    gpu: SharedGpu,
    adapter: AdapterInfo,
}

impl HeadlessDevice {
    pub(crate) fn new(adapter: AdapterInfo) -> Self {
        Self {
            gpu: Rc::new(RefCell::new(GpuState::new())),
            adapter,
        }
    }

    pub(crate) fn gpu(&self) -> &SharedGpu {
        &self.gpu
    }

    /// Adapter the device was created on.
    pub fn adapter_info(&self) -> &AdapterInfo {
        &self.adapter
    }

    /// Snapshot of the execution counters.
    pub fn stats(&self) -> DeviceStats {
        self.gpu.borrow().stats
    }

    /// Operations submitted but not yet retired, across all queues.
    pub fn pending_ops(&self) -> usize {
        self.gpu.borrow().pending_ops()
    }

    /// Retires every pending operation, as if the GPU caught up.
    pub fn drain(&self) {
        let mut gpu = self.gpu.borrow_mut();
        while gpu.step() {}
    }
}

fn descriptor_increment(kind: DescriptorHeapKind) -> u32 {
    match kind {
        DescriptorHeapKind::CbvSrvUav => 64,
        DescriptorHeapKind::Sampler => 32,
        DescriptorHeapKind::Rtv => 32,
        DescriptorHeapKind::Dsv => 8,
    }
}

const PLACEMENT_ALIGNMENT: u64 = 64 * 1024;

impl hal::Device<Headless> for HeadlessDevice {
    fn create_queue(&self, kind: QueueKind) -> Result<HeadlessQueue> {
        let index = self.gpu.borrow_mut().add_queue();
        Ok(HeadlessQueue::new(kind, index, self.gpu.clone()))
    }

    fn create_fence(&self, initial_value: u64) -> Result<HeadlessFence> {
        Ok(HeadlessFence::new(initial_value))
    }

    fn create_event(&self) -> Result<HeadlessEvent> {
        Ok(HeadlessEvent::new(Rc::new(EventState::default()), self.gpu.clone()))
    }

    fn create_command_allocator(&self, kind: QueueKind) -> Result<HeadlessCommandAllocator> {
        Ok(HeadlessCommandAllocator::new(kind, self.gpu.clone()))
    }

    fn create_command_list(&self, kind: QueueKind, allocator: &HeadlessCommandAllocator) -> Result<HeadlessCommandList> {
        if allocator.kind() != kind {
            return Err(invalid_call(
                "ID3D12Device::CreateCommandList",
                "command list type does not match the allocator type",
            ));
        }
        Ok(HeadlessCommandList::new(kind, allocator, self.gpu.clone()))
    }

    fn create_descriptor_heap(&self, desc: &DescriptorHeapDesc) -> Result<HeadlessDescriptorHeap> {
        if desc.count == 0 {
            return Err(invalid_call(
                "ID3D12Device::CreateDescriptorHeap",
                "descriptor heap must hold at least one descriptor",
            ));
        }
        if desc.shader_visible && matches!(desc.kind, DescriptorHeapKind::Rtv | DescriptorHeapKind::Dsv) {
            return Err(invalid_call(
                "ID3D12Device::CreateDescriptorHeap",
                "RTV/DSV heaps cannot be shader visible",
            ));
        }

        let mut gpu = self.gpu.borrow_mut();
        let base = gpu.next_descriptor_base;
        let span = desc.count as usize * descriptor_increment(desc.kind) as usize;
        gpu.next_descriptor_base += span.next_multiple_of(0x1000) + 0x1000;

        Ok(HeadlessDescriptorHeap::new(*desc, CpuDescriptor { ptr: base }))
    }

    fn descriptor_increment(&self, kind: DescriptorHeapKind) -> u32 {
        descriptor_increment(kind)
    }

    fn create_render_target_view(&self, resource: &HeadlessResource, dest: CpuDescriptor) {
        let mut gpu = self.gpu.borrow_mut();
        if !resource.is_texture() {
            gpu.report(Severity::Error, "CreateRenderTargetView: resource is not a texture");
            return;
        }
        gpu.descriptors.insert(dest.ptr, resource.clone());
    }

    fn create_heap(&self, desc: &HeapDesc) -> Result<HeadlessHeap> {
        const OP: &str = "ID3D12Device::CreateHeap";
        if desc.size == 0 {
            return Err(invalid_call(OP, "heap size must be non-zero"));
        }
        if desc.alignment != PLACEMENT_ALIGNMENT && desc.alignment != 4 * 1024 * 1024 {
            return Err(invalid_call(OP, format!("unsupported heap alignment {}", desc.alignment)));
        }
        if desc.size % desc.alignment != 0 {
            return Err(invalid_call(OP, "heap size must be a multiple of its alignment"));
        }

        let mut gpu = self.gpu.borrow_mut();
        let address = gpu.next_address;
        gpu.next_address += desc.size.next_multiple_of(PLACEMENT_ALIGNMENT);
        Ok(HeadlessHeap::new(*desc, address))
    }

    fn create_placed_resource(
        &self,
        heap: &HeadlessHeap,
        offset: u64,
        desc: &BufferDesc,
        initial_state: ResourceState,
    ) -> Result<HeadlessResource> {
        const OP: &str = "ID3D12Device::CreatePlacedResource";
        if desc.size == 0 {
            return Err(invalid_call(OP, "buffer size must be non-zero"));
        }
        if offset % PLACEMENT_ALIGNMENT != 0 {
            return Err(invalid_call(
                OP,
                format!("heap offset {offset} is not aligned to {PLACEMENT_ALIGNMENT} bytes"),
            ));
        }
        let end = offset.checked_add(desc.size).unwrap_or(u64::MAX);
        if end > heap.desc().size {
            return Err(invalid_call(
                OP,
                format!(
                    "resource [{offset}, {end}) exceeds heap of {} bytes",
                    heap.desc().size
                ),
            ));
        }
        if heap.desc().kind == HeapKind::Upload && initial_state != ResourceState::GenericRead {
            return Err(invalid_call(OP, "resources on upload heaps must start in GENERIC_READ"));
        }

        Ok(HeadlessResource::placed_buffer(heap, offset, desc.size, initial_state))
    }

    fn create_root_signature(&self, blob: &[u8]) -> Result<HeadlessRootSignature> {
        pipeline::deserialize_root_signature(blob)
    }

    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc<'_, Headless>) -> Result<HeadlessPipelineState> {
        pipeline::create_graphics_pipeline(desc).inspect_err(|e| {
            if let Error::Api(api) = e {
                self.gpu.borrow_mut().report(Severity::Error, &api.user_message);
            }
        })
    }

    fn register_diagnostics(&self, sink: Arc<dyn DiagnosticsSink>) -> Result<u32> {
        let mut gpu = self.gpu.borrow_mut();
        gpu.sink = Some(sink);
        let cookie = gpu.next_cookie;
        gpu.next_cookie += 1;
        Ok(cookie)
    }

    fn unregister_diagnostics(&self, cookie: u32) -> Result<()> {
        let mut gpu = self.gpu.borrow_mut();
        if cookie == 0 || cookie >= gpu.next_cookie {
            return Err(invalid_call(
                "ID3D12InfoQueue1::UnregisterMessageCallback",
                format!("unknown callback cookie {cookie}"),
            ));
        }
        gpu.sink = None;
        Ok(())
    }
}
