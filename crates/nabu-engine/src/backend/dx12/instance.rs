use std::ffi::c_void;

use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Direct3D12::{D3D12CreateDevice, ID3D12Device};
use windows::Win32::Graphics::Dxgi::Common::DXGI_SAMPLE_DESC;
use windows::Win32::Graphics::Dxgi::{
    CreateDXGIFactory2, DXGI_ADAPTER_FLAG_SOFTWARE, DXGI_CREATE_FACTORY_DEBUG, DXGI_CREATE_FACTORY_FLAGS,
    DXGI_GPU_PREFERENCE_HIGH_PERFORMANCE, DXGI_MWA_NO_ALT_ENTER, DXGI_SWAP_CHAIN_DESC1, DXGI_USAGE_RENDER_TARGET_OUTPUT,
    IDXGIAdapter1, IDXGIFactory6, IDXGISwapChain1, IDXGISwapChain3,
};
use windows::core::Interface;

use super::device::Dx12Device;
use super::swap_chain::Dx12SwapChain;
use super::sync::Dx12Queue;
use super::{ApiResultExt, conv};
use crate::hal::{self, AdapterInfo, FeatureLevel, InstanceDesc, SwapChainDesc};
use crate::{Error, Result};

pub struct Dx12Adapter {
    raw: IDXGIAdapter1,
    info: AdapterInfo,
}

impl hal::Adapter for Dx12Adapter {
    fn info(&self) -> AdapterInfo {
        self.info.clone()
    }

    fn supports(&self, level: FeatureLevel) -> bool {
        // A null output pointer only checks that creation would succeed.
        unsafe {
            D3D12CreateDevice(
                &self.raw,
                conv::feature_level(level),
                std::ptr::null_mut::<Option<ID3D12Device>>(),
            )
        }
        .is_ok()
    }
}

/// DXGI factory.
pub struct Dx12Instance {
    factory: IDXGIFactory6,
}

impl hal::Instance<super::Dx12> for Dx12Instance {
    fn init(desc: &InstanceDesc) -> Result<Self> {
        let flags = if desc.debug {
            DXGI_CREATE_FACTORY_DEBUG
        } else {
            DXGI_CREATE_FACTORY_FLAGS(0)
        };
        let factory: IDXGIFactory6 =
            unsafe { CreateDXGIFactory2(flags) }.api("CreateDXGIFactory2", "failed to create DXGI factory")?;
        Ok(Self { factory })
    }

    fn enumerate_adapters(&self) -> Result<Vec<Dx12Adapter>> {
        let mut adapters = Vec::new();
        // Enumeration ends with DXGI_ERROR_NOT_FOUND.
        for index in 0.. {
            let Ok(raw) = (unsafe {
                self.factory
                    .EnumAdapterByGpuPreference::<IDXGIAdapter1>(index, DXGI_GPU_PREFERENCE_HIGH_PERFORMANCE)
            }) else {
                break;
            };
            let desc = unsafe { raw.GetDesc1() }.api("IDXGIAdapter1::GetDesc1", "failed to query adapter")?;

            let name_len = desc.Description.iter().position(|&c| c == 0).unwrap_or(desc.Description.len());
            let info = AdapterInfo {
                name: String::from_utf16_lossy(&desc.Description[..name_len]),
                vendor_id: desc.VendorId,
                device_id: desc.DeviceId,
                dedicated_video_memory: desc.DedicatedVideoMemory as u64,
                dedicated_system_memory: desc.DedicatedSystemMemory as u64,
                shared_system_memory: desc.SharedSystemMemory as u64,
                is_software: desc.Flags & DXGI_ADAPTER_FLAG_SOFTWARE.0 as u32 != 0,
            };
            adapters.push(Dx12Adapter { raw, info });
        }
        Ok(adapters)
    }

    fn create_device(&self, adapter: &Dx12Adapter, level: FeatureLevel) -> Result<Dx12Device> {
        let mut device: Option<ID3D12Device> = None;
        unsafe { D3D12CreateDevice(&adapter.raw, conv::feature_level(level), &mut device) }.api(
            "D3D12CreateDevice",
            &format!("failed to create device on '{}' at feature level {level}", adapter.info.name),
        )?;
        let device = device.ok_or_else(|| Error::os_handle("D3D12CreateDevice", "no device returned", "null"))?;
        Ok(Dx12Device::new(device))
    }

    fn create_swap_chain(
        &self,
        queue: &Dx12Queue,
        window: &dyn HasWindowHandle,
        desc: &SwapChainDesc,
    ) -> Result<Dx12SwapChain> {
        let hwnd = hwnd(window)?;
        let native = DXGI_SWAP_CHAIN_DESC1 {
            Width: desc.width,
            Height: desc.height,
            Format: conv::format(desc.format),
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: desc.buffer_count,
            SwapEffect: conv::swap_effect(desc.swap_effect),
            ..Default::default()
        };

        let swap_chain: IDXGISwapChain1 = unsafe {
            self.factory
                .CreateSwapChainForHwnd(queue.raw(), hwnd, &native, None, None)
        }
        .api("IDXGIFactory2::CreateSwapChainForHwnd", "failed to create swap chain")?;
        let swap_chain: IDXGISwapChain3 = swap_chain
            .cast()
            .api("IDXGISwapChain1::QueryInterface", "IDXGISwapChain3 unavailable")?;
        Ok(Dx12SwapChain::new(swap_chain))
    }

    fn disable_fullscreen_transitions(&self, window: &dyn HasWindowHandle) -> Result<()> {
        let hwnd = hwnd(window)?;
        unsafe { self.factory.MakeWindowAssociation(hwnd, DXGI_MWA_NO_ALT_ENTER) }
            .api("IDXGIFactory::MakeWindowAssociation", "failed to disable Alt+Enter")
    }
}

fn hwnd(window: &dyn HasWindowHandle) -> Result<HWND> {
    const OP: &str = "HasWindowHandle::window_handle";
    let handle = window
        .window_handle()
        .map_err(|e| Error::os_handle(OP, "window handle unavailable", e.to_string()))?;
    match handle.as_raw() {
        RawWindowHandle::Win32(win32) => Ok(HWND(win32.hwnd.get() as *mut c_void)),
        other => Err(Error::os_handle(OP, "not a Win32 window", format!("{other:?}"))),
    }
}
