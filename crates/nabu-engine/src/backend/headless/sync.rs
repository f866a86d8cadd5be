use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::Headless;
use super::command::HeadlessCommandList;
use super::device::{Op, SharedGpu};
use crate::hal::{self, QueueKind, Severity};
use crate::{Error, Result};

#[derive(Default)]
pub(crate) struct EventState {
    signaled: Cell<bool>,
}

impl EventState {
    fn set(&self) {
        self.signaled.set(true);
    }

    /// Auto-reset semantics: consuming the signal clears it.
    fn take(&self) -> bool {
        self.signaled.replace(false)
    }
}

pub(crate) struct FenceState {
    completed: Cell<u64>,
    waiters: RefCell<Vec<(u64, Rc<EventState>)>>,
}

impl FenceState {
    pub(crate) fn complete(&self, value: u64) {
        if value > self.completed.get() {
            self.completed.set(value);
        }
        let completed = self.completed.get();
        self.waiters.borrow_mut().retain(|(target, event)| {
            if *target <= completed {
                event.set();
                false
            } else {
                true
            }
        });
    }
}

pub struct HeadlessFence {
    state: Rc<FenceState>,
}

impl HeadlessFence {
    pub(crate) fn new(initial_value: u64) -> Self {
        Self {
            state: Rc::new(FenceState {
                completed: Cell::new(initial_value),
                waiters: RefCell::new(Vec::new()),
            }),
        }
    }
}

impl hal::Fence<Headless> for HeadlessFence {
    fn completed_value(&self) -> u64 {
        self.state.completed.get()
    }

    fn signal(&self, value: u64) -> Result<()> {
        self.state.complete(value);
        Ok(())
    }

    fn set_event_on_completion(&self, value: u64, event: &HeadlessEvent) -> Result<()> {
        if self.state.completed.get() >= value {
            event.state.set();
        } else {
            self.state.waiters.borrow_mut().push((value, event.state.clone()));
        }
        Ok(())
    }
}

pub struct HeadlessEvent {
    state: Rc<EventState>,
    gpu: SharedGpu,
}

impl HeadlessEvent {
    pub(crate) fn new(state: Rc<EventState>, gpu: SharedGpu) -> Self {
        Self { state, gpu }
    }
}

impl hal::Event for HeadlessEvent {
    fn wait(&self) -> Result<()> {
        if self.state.take() {
            return Ok(());
        }

        // Blocking: run the emulated GPU until the event fires.
        let mut gpu = self.gpu.borrow_mut();
        gpu.stats.blocking_waits += 1;
        loop {
            if !gpu.step() {
                return Err(Error::api(
                    "WaitForSingleObject",
                    "wait on a fence value that no pending GPU work will ever signal",
                    "WAIT_TIMEOUT (device hung)",
                ));
            }
            if self.state.take() {
                return Ok(());
            }
        }
    }
}

#[derive(Clone)]
pub struct HeadlessQueue {
    kind: QueueKind,
    index: usize,
    gpu: SharedGpu,
}

impl HeadlessQueue {
    pub(crate) fn new(kind: QueueKind, index: usize, gpu: SharedGpu) -> Self {
        Self { kind, index, gpu }
    }

    pub(crate) fn enqueue(&self, op: Op) {
        self.gpu.borrow_mut().enqueue(self.index, op);
    }
}

impl hal::Queue<Headless> for HeadlessQueue {
    fn kind(&self) -> QueueKind {
        self.kind
    }

    fn execute(&self, lists: &[&HeadlessCommandList]) {
        for list in lists {
            if list.kind() != self.kind {
                let msg = format!(
                    "ExecuteCommandLists: {:?} list submitted to a {:?} queue",
                    list.kind(),
                    self.kind
                );
                self.gpu.borrow_mut().report(Severity::Error, &msg);
                continue;
            }
            match list.submission() {
                Some(op) => {
                    let mut gpu = self.gpu.borrow_mut();
                    gpu.stats.submitted_lists += 1;
                    gpu.enqueue(self.index, op);
                }
                None => self
                    .gpu
                    .borrow_mut()
                    .report(Severity::Error, "ExecuteCommandLists: command list is not closed"),
            }
        }
    }

    fn signal(&self, fence: &HeadlessFence, value: u64) -> Result<()> {
        self.enqueue(Op::Signal {
            fence: fence.state.clone(),
            value,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessDevice;
    use crate::hal::{Device as _, Event as _, Fence as _, Queue as _};

    fn device() -> HeadlessDevice {
        HeadlessDevice::new(Default::default())
    }

    #[test]
    fn signal_on_idle_queue_completes_immediately() {
        let device = device();
        let queue = device.create_queue(QueueKind::Direct).unwrap();
        let fence = device.create_fence(0).unwrap();

        queue.signal(&fence, 1).unwrap();
        assert_eq!(fence.completed_value(), 1);
    }

    #[test]
    fn event_for_completed_value_does_not_block() {
        let device = device();
        let fence = device.create_fence(5).unwrap();
        let event = device.create_event().unwrap();

        fence.set_event_on_completion(3, &event).unwrap();
        event.wait().unwrap();
        assert_eq!(device.stats().blocking_waits, 0);
    }

    #[test]
    fn waiting_for_unreachable_value_reports_hang() {
        let device = device();
        let fence = device.create_fence(0).unwrap();
        let event = device.create_event().unwrap();

        fence.set_event_on_completion(1, &event).unwrap();
        let err = event.wait().unwrap_err();
        assert!(err.is_api_failure());
    }

    #[test]
    fn cpu_signal_wakes_waiters() {
        let device = device();
        let fence = device.create_fence(0).unwrap();
        let event = device.create_event().unwrap();

        fence.set_event_on_completion(2, &event).unwrap();
        fence.signal(2).unwrap();
        event.wait().unwrap();
        assert_eq!(device.stats().blocking_waits, 0);
    }
}
