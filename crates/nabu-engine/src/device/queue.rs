use super::{Device, Fence};
use crate::Result;
use crate::hal::{self, Api, QueueKind};

/// A command-submission queue with a private fence used for full drains.
///
/// Work on one queue executes in submission order. Different queues are only
/// ordered through explicit fence signals.
pub struct Queue<A: Api> {
    raw: A::Queue,
    fence: Fence<A>,
}

impl<A: Api> Queue<A> {
    /// Creates the submission queue and its flush fence.
    pub fn new(device: &Device<A>, kind: QueueKind) -> Result<Self> {
        let raw = hal::Device::create_queue(device.raw(), kind)?;
        let fence = Fence::new(device.raw())?;
        log::debug!("{kind:?} queue created");
        Ok(Self { raw, fence })
    }

    pub fn raw(&self) -> &A::Queue {
        &self.raw
    }

    pub fn kind(&self) -> QueueKind {
        hal::Queue::kind(&self.raw)
    }

    pub fn execute(&self, lists: &[&A::CommandList]) {
        hal::Queue::execute(&self.raw, lists);
    }

    /// Signals a fence owned elsewhere from this queue.
    pub fn signal_fence(&self, fence: &mut Fence<A>) -> Result<u64> {
        fence.signal_on_gpu(&self.raw)
    }

    /// Blocks until every submitted command on this queue has executed.
    pub fn flush(&mut self) -> Result<()> {
        self.fence.signal_on_gpu_and_wait_for_fence_event(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::Headless;
    use crate::testing;

    fn submit_empty_list(device: &Device<Headless>, queue: &Queue<Headless>) {
        let allocator = device.create_command_allocator(QueueKind::Direct).unwrap();
        let list = device.create_graphics_command_list(&allocator).unwrap();
        queue.execute(&[&list]);
    }

    #[test]
    fn second_flush_does_not_block() {
        let device = testing::device();
        let mut queue = Queue::new(&device, QueueKind::Direct).unwrap();
        submit_empty_list(&device, &queue);

        queue.flush().unwrap();
        assert_eq!(device.raw().stats().blocking_waits, 1);

        queue.flush().unwrap();
        assert_eq!(device.raw().stats().blocking_waits, 1);
        assert_eq!(device.raw().pending_ops(), 0);
    }

    #[test]
    fn flush_on_idle_queue_never_blocks() {
        let device = testing::device();
        let mut queue = Queue::new(&device, QueueKind::Compute).unwrap();
        queue.flush().unwrap();
        assert_eq!(queue.kind(), QueueKind::Compute);
        assert_eq!(device.raw().stats().blocking_waits, 0);
    }

    #[test]
    fn external_fence_tracks_queue_progress() {
        let device = testing::device();
        let queue = Queue::new(&device, QueueKind::Direct).unwrap();
        let mut frame_fence = device.create_fence().unwrap();

        submit_empty_list(&device, &queue);
        let value = queue.signal_fence(&mut frame_fence).unwrap();
        assert!(!frame_fence.is_complete(value));

        frame_fence.wait_for_value(value).unwrap();
        assert!(frame_fence.is_complete(value));
    }

    #[test]
    fn queues_share_no_implicit_ordering_with_fences() {
        let device = testing::device();
        let direct = Queue::new(&device, QueueKind::Direct).unwrap();
        let copy = Queue::new(&device, QueueKind::Copy).unwrap();
        let mut fence = device.create_fence().unwrap();

        submit_empty_list(&device, &direct);
        // The idle copy queue signals right away, independent of direct-queue work.
        let value = copy.signal_fence(&mut fence).unwrap();
        assert!(fence.is_complete(value));
        assert_eq!(device.raw().pending_ops(), 1);
    }
}
