use super::{Device, Fence, Queue};
use crate::Result;
use crate::hal::{self, Api, CommandAllocator as _, CommandList as _, QueueKind};

/// One in-flight frame's recording resources.
///
/// `fence_value` is the frame-fence value signaled after this context's last
/// submission; the allocator may only be reset once the fence reaches it.
pub struct GraphicsCommandContext<A: Api> {
    list: A::CommandList,
    allocator: A::CommandAllocator,
    fence_value: u64,
}

impl<A: Api> GraphicsCommandContext<A> {
    fn new(device: &Device<A>) -> Result<Self> {
        let allocator = device.create_command_allocator(QueueKind::Direct)?;
        let list = device.create_graphics_command_list(&allocator)?;
        Ok(Self {
            list,
            allocator,
            fence_value: 0,
        })
    }

    /// Resets the allocator and reopens the list for recording.
    ///
    /// The caller must have waited for this context's last submission.
    pub fn reset(&mut self) -> Result<()> {
        self.allocator.reset()?;
        self.list.reset(&self.allocator, None)
    }

    pub fn list(&self) -> &A::CommandList {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut A::CommandList {
        &mut self.list
    }

    pub fn close(&mut self) -> Result<()> {
        self.list.close()
    }

    pub fn fence_value(&self) -> u64 {
        self.fence_value
    }
}

/// Owns the three queues and one graphics command context per frame buffer.
pub struct CommandManager<A: Api> {
    contexts: Vec<GraphicsCommandContext<A>>,
    frame_fence: Fence<A>,
    direct: Queue<A>,
    compute: Queue<A>,
    copy: Queue<A>,
}

impl<A: Api> CommandManager<A> {
    pub fn new(device: &Device<A>, frame_buffer_count: u32) -> Result<Self> {
        let direct = Queue::new(device, QueueKind::Direct)?;
        let compute = Queue::new(device, QueueKind::Compute)?;
        let copy = Queue::new(device, QueueKind::Copy)?;

        let contexts = (0..frame_buffer_count)
            .map(|_| GraphicsCommandContext::new(device))
            .collect::<Result<Vec<_>>>()?;
        let frame_fence = device.create_fence()?;

        log::debug!("command manager created with {frame_buffer_count} graphics contexts");
        Ok(Self {
            contexts,
            frame_fence,
            direct,
            compute,
            copy,
        })
    }

    pub fn direct_queue(&self) -> &Queue<A> {
        &self.direct
    }

    pub fn compute_queue(&self) -> &Queue<A> {
        &self.compute
    }

    pub fn copy_queue(&self) -> &Queue<A> {
        &self.copy
    }

    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    pub fn frame_fence(&self) -> &Fence<A> {
        &self.frame_fence
    }

    /// Waits until the GPU finished the last frame recorded in `slot`, then
    /// hands its context out for recording.
    ///
    /// Panics if `slot` is not below the frame-buffer count.
    pub fn acquire_graphics_context(&mut self, slot: u32) -> Result<&mut GraphicsCommandContext<A>> {
        let context = &mut self.contexts[slot as usize];
        self.frame_fence.wait_for_value(context.fence_value)?;
        Ok(context)
    }

    /// Submits the context's list on the direct queue and tags the slot with
    /// the frame-fence value signaled right after it.
    pub fn submit_graphics_context(&mut self, slot: u32) -> Result<u64> {
        let context = &mut self.contexts[slot as usize];
        self.direct.execute(&[&context.list]);
        let value = self.frame_fence.signal_on_gpu(self.direct.raw())?;
        context.fence_value = value;
        Ok(value)
    }

    /// Blocks until every frame submitted so far has executed.
    pub fn wait_for_frame_to_finish(&self) -> Result<()> {
        self.frame_fence.wait_for_fence_event()
    }

    /// Drains all three queues.
    pub fn flush_all(&mut self) -> Result<()> {
        self.direct.flush()?;
        self.compute.flush()?;
        self.copy.flush()
    }
}

impl<A: Api> Drop for CommandManager<A> {
    fn drop(&mut self) {
        if let Err(e) = self.flush_all() {
            log::error!("failed to flush command queues: {e}");
        }
    }
}

/// Records a direct list through `record`, submits it and waits for it.
///
/// For one-off work outside the frame loop.
pub fn execute_immediate<A: Api>(
    device: &Device<A>,
    queue: &mut Queue<A>,
    record: impl FnOnce(&mut A::CommandList) -> Result<()>,
) -> Result<()> {
    let allocator = device.create_command_allocator(QueueKind::Direct)?;
    let mut list = hal::Device::create_command_list(device.raw(), QueueKind::Direct, &allocator)?;
    record(&mut list)?;
    list.close()?;
    queue.execute(&[&list]);
    queue.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::Headless;
    use crate::hal::PrimitiveTopology;
    use crate::testing;

    fn record_and_submit(manager: &mut CommandManager<Headless>, slot: u32) -> u64 {
        let ctx = manager.acquire_graphics_context(slot).unwrap();
        ctx.reset().unwrap();
        ctx.close().unwrap();
        manager.submit_graphics_context(slot).unwrap()
    }

    #[test]
    fn one_context_per_frame_buffer() {
        let device = testing::device();
        let manager = CommandManager::new(&device, 3).unwrap();
        assert_eq!(manager.context_count(), 3);
        assert_eq!(manager.direct_queue().kind(), QueueKind::Direct);
        assert_eq!(manager.compute_queue().kind(), QueueKind::Compute);
        assert_eq!(manager.copy_queue().kind(), QueueKind::Copy);
    }

    #[test]
    fn reacquiring_a_slot_waits_only_for_its_own_frame() {
        let device = testing::device();
        let mut manager = CommandManager::new(&device, 2).unwrap();

        let first = record_and_submit(&mut manager, 0);
        let second = record_and_submit(&mut manager, 1);
        assert_eq!((first, second), (1, 2));
        assert_eq!(device.raw().stats().blocking_waits, 0);

        // Slot 0 blocks until frame 1 retires; frame 2 may still be pending.
        manager.acquire_graphics_context(0).unwrap();
        assert_eq!(device.raw().stats().blocking_waits, 1);
        assert!(manager.frame_fence().is_complete(first));
        assert!(!manager.frame_fence().is_complete(second));
    }

    #[test]
    fn allocator_is_never_reset_while_in_flight() {
        let device = testing::device();
        let mut manager = CommandManager::new(&device, 2).unwrap();

        for frame in 0..8 {
            record_and_submit(&mut manager, frame % 2);
        }
        manager.wait_for_frame_to_finish().unwrap();

        let stats = device.raw().stats();
        assert_eq!(stats.executed_lists, 8);
        assert_eq!(stats.validation_errors, 0);
    }

    #[test]
    fn flush_all_is_idempotent() {
        let device = testing::device();
        let mut manager = CommandManager::new(&device, 2).unwrap();
        record_and_submit(&mut manager, 0);

        manager.flush_all().unwrap();
        let waits = device.raw().stats().blocking_waits;
        manager.flush_all().unwrap();
        assert_eq!(device.raw().stats().blocking_waits, waits);
        assert_eq!(device.raw().pending_ops(), 0);
    }

    #[test]
    fn drop_drains_pending_work() {
        let device = testing::device();
        let mut manager = CommandManager::new(&device, 2).unwrap();
        record_and_submit(&mut manager, 0);
        assert!(device.raw().pending_ops() > 0);

        drop(manager);
        assert_eq!(device.raw().pending_ops(), 0);
    }

    #[test]
    fn immediate_execution_waits_for_completion() {
        let device = testing::device();
        let mut queue = Queue::new(&device, QueueKind::Direct).unwrap();

        execute_immediate(&device, &mut queue, |list| {
            list.set_primitive_topology(PrimitiveTopology::TriangleList);
            Ok(())
        })
        .unwrap();

        assert_eq!(device.raw().stats().executed_lists, 1);
        assert_eq!(device.raw().pending_ops(), 0);
    }
}
