use windows::Win32::Foundation::{CloseHandle, HANDLE, WAIT_OBJECT_0};
use windows::Win32::Graphics::Direct3D12::{ID3D12CommandList, ID3D12CommandQueue, ID3D12Fence};
use windows::Win32::System::Threading::{CreateEventW, INFINITE, WaitForSingleObject};
use windows::core::PCWSTR;

use super::command::Dx12CommandList;
use super::{ApiResultExt, Dx12};
use crate::hal::{self, QueueKind};
use crate::{Error, Result};

pub struct Dx12Queue {
    raw: ID3D12CommandQueue,
    kind: QueueKind,
}

impl Dx12Queue {
    pub(super) fn new(raw: ID3D12CommandQueue, kind: QueueKind) -> Self {
        Self { raw, kind }
    }

    pub fn raw(&self) -> &ID3D12CommandQueue {
        &self.raw
    }
}

impl hal::Queue<Dx12> for Dx12Queue {
    fn kind(&self) -> QueueKind {
        self.kind
    }

    fn execute(&self, lists: &[&Dx12CommandList]) {
        let lists: Vec<Option<ID3D12CommandList>> = lists.iter().map(|list| Some(list.raw().clone().into())).collect();
        unsafe { self.raw.ExecuteCommandLists(&lists) }
    }

    fn signal(&self, fence: &Dx12Fence, value: u64) -> Result<()> {
        unsafe { self.raw.Signal(&fence.raw, value) }.api("ID3D12CommandQueue::Signal", "failed to enqueue signal")
    }
}

pub struct Dx12Fence {
    raw: ID3D12Fence,
}

impl Dx12Fence {
    pub(super) fn new(raw: ID3D12Fence) -> Self {
        Self { raw }
    }
}

impl hal::Fence<Dx12> for Dx12Fence {
    fn completed_value(&self) -> u64 {
        unsafe { self.raw.GetCompletedValue() }
    }

    fn signal(&self, value: u64) -> Result<()> {
        unsafe { self.raw.Signal(value) }.api("ID3D12Fence::Signal", "failed to signal fence from the CPU")
    }

    fn set_event_on_completion(&self, value: u64, event: &Dx12Event) -> Result<()> {
        unsafe { self.raw.SetEventOnCompletion(value, event.handle) }
            .api("ID3D12Fence::SetEventOnCompletion", "failed to arm fence event")
    }
}

/// Auto-reset Win32 event.
pub struct Dx12Event {
    handle: HANDLE,
}

impl Dx12Event {
    pub(super) fn new() -> Result<Self> {
        let handle = unsafe { CreateEventW(None, false, false, PCWSTR::null()) }
            .map_err(|e| Error::os_handle("CreateEventW", "failed to create fence event", e.message()))?;
        if handle.is_invalid() {
            return Err(Error::os_handle("CreateEventW", "null event handle", "INVALID_HANDLE_VALUE"));
        }
        Ok(Self { handle })
    }
}

impl hal::Event for Dx12Event {
    fn wait(&self) -> Result<()> {
        let status = unsafe { WaitForSingleObject(self.handle, INFINITE) };
        if status != WAIT_OBJECT_0 {
            return Err(Error::os_handle(
                "WaitForSingleObject",
                "fence wait failed",
                format!("{:#x}", status.0),
            ));
        }
        Ok(())
    }
}

impl Drop for Dx12Event {
    fn drop(&mut self) {
        if let Err(e) = unsafe { CloseHandle(self.handle) } {
            log::warn!("CloseHandle on fence event failed: {e}");
        }
    }
}
