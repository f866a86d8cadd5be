use std::cell::Cell;
use std::rc::Rc;

use super::device::Op;
use super::resource::HeadlessResource;
use super::sync::HeadlessQueue;
use super::{Headless, invalid_call};
use crate::Result;
use crate::hal::{self, ResourceState, SwapChainDesc};

pub(crate) struct SwapChainState {
    pub(crate) buffers: Vec<HeadlessResource>,
}

/// Emulated flip-model swap chain bound to one queue.
///
/// Presents are queued behind the work already submitted to that queue. The
/// back-buffer index advances on the CPU right away, as DXGI does.
pub struct HeadlessSwapChain {
    state: Rc<SwapChainState>,
    current: Cell<u32>,
    queue: HeadlessQueue,
    desc: SwapChainDesc,
}

impl HeadlessSwapChain {
    pub(crate) fn new(queue: HeadlessQueue, desc: SwapChainDesc, first_index: u32) -> Self {
        let buffers = (0..desc.buffer_count)
            .map(|_| HeadlessResource::texture(desc.width, desc.height, desc.format, ResourceState::Present))
            .collect();

        Self {
            state: Rc::new(SwapChainState { buffers }),
            current: Cell::new(first_index % desc.buffer_count),
            queue,
            desc,
        }
    }

    pub fn desc(&self) -> &SwapChainDesc {
        &self.desc
    }
}

impl hal::SwapChain<Headless> for HeadlessSwapChain {
    fn current_back_buffer_index(&self) -> u32 {
        self.current.get()
    }

    fn buffer(&self, index: u32) -> Result<HeadlessResource> {
        self.state
            .buffers
            .get(index as usize)
            .cloned()
            .ok_or_else(|| invalid_call("IDXGISwapChain::GetBuffer", format!("no back buffer {index}")))
    }

    fn present(&self, sync_interval: u32) -> Result<()> {
        if sync_interval > 4 {
            return Err(invalid_call("IDXGISwapChain::Present", "sync interval must be in 0..=4"));
        }

        let index = self.current.get();
        self.queue.enqueue(Op::Present {
            chain: self.state.clone(),
            index,
        });
        self.current.set((index + 1) % self.desc.buffer_count);
        Ok(())
    }
}
