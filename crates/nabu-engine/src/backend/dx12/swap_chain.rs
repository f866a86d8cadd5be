use windows::Win32::Graphics::Direct3D12::ID3D12Resource;
use windows::Win32::Graphics::Dxgi::{DXGI_PRESENT, IDXGISwapChain3};

use super::resource::Dx12Resource;
use super::{ApiResultExt, Dx12};
use crate::Result;
use crate::hal;

pub struct Dx12SwapChain {
    raw: IDXGISwapChain3,
}

impl Dx12SwapChain {
    pub(super) fn new(raw: IDXGISwapChain3) -> Self {
        Self { raw }
    }
}

impl hal::SwapChain<Dx12> for Dx12SwapChain {
    fn current_back_buffer_index(&self) -> u32 {
        unsafe { self.raw.GetCurrentBackBufferIndex() }
    }

    fn buffer(&self, index: u32) -> Result<Dx12Resource> {
        let raw: ID3D12Resource = unsafe { self.raw.GetBuffer(index) }
            .api("IDXGISwapChain::GetBuffer", &format!("failed to get back buffer {index}"))?;
        Ok(Dx12Resource::new(raw))
    }

    fn present(&self, sync_interval: u32) -> Result<()> {
        unsafe { self.raw.Present(sync_interval, DXGI_PRESENT(0)) }
            .ok()
            .api("IDXGISwapChain::Present", "present failed")
    }
}
