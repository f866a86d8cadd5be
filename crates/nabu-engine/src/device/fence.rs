use crate::Result;
use crate::hal::{self, Api, Device as _, Event as _, Fence as _};

/// GPU/CPU synchronization point: a monotonically increasing target value plus
/// an OS event to block on.
pub struct Fence<A: Api> {
    raw: A::Fence,
    event: A::Event,
    /// Last value a signal was requested for.
    value: u64,
}

impl<A: Api> Fence<A> {
    /// Creates the fence object (starting at 0) and its wait event.
    pub fn new(device: &A::Device) -> Result<Self> {
        let raw = device.create_fence(0)?;
        let event = device.create_event()?;
        Ok(Self { raw, event, value: 0 })
    }

    pub fn raw(&self) -> &A::Fence {
        &self.raw
    }

    /// Last requested signal value.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Value the GPU has reached.
    pub fn completed_value(&self) -> u64 {
        self.raw.completed_value()
    }

    pub fn is_complete(&self, value: u64) -> bool {
        self.completed_value() >= value
    }

    /// Increments the target and enqueues a signal on `queue`.
    ///
    /// The GPU performs the signal once all work submitted before it finished.
    pub fn signal_on_gpu(&mut self, queue: &A::Queue) -> Result<u64> {
        self.value += 1;
        hal::Queue::signal(queue, &self.raw, self.value)?;
        Ok(self.value)
    }

    /// Increments the target and sets it from the CPU.
    pub fn signal_on_cpu(&mut self) -> Result<u64> {
        self.value += 1;
        self.raw.signal(self.value)?;
        Ok(self.value)
    }

    /// Blocks until the last requested value is reached.
    pub fn wait_for_fence_event(&self) -> Result<()> {
        self.wait_for_value(self.value)
    }

    /// Blocks until the GPU reaches `value`. Returns at once if it already has.
    pub fn wait_for_value(&self, value: u64) -> Result<()> {
        if self.raw.completed_value() >= value {
            return Ok(());
        }
        self.raw.set_event_on_completion(value, &self.event)?;
        self.event.wait()
    }

    /// Full drain of `queue`.
    pub fn signal_on_gpu_and_wait_for_fence_event(&mut self, queue: &A::Queue) -> Result<()> {
        self.signal_on_gpu(queue)?;
        self.wait_for_fence_event()
    }
}
