use raw_window_handle::HasWindowHandle;

use super::device::HeadlessDevice;
use super::swap_chain::HeadlessSwapChain;
use super::sync::HeadlessQueue;
use super::{Headless, invalid_call};
use crate::hal::{self, AdapterInfo, FeatureLevel, InstanceDesc, SwapChainDesc, SwapEffect};
use crate::{Error, Result};

/// An emulated adapter as the factory would report it.
#[derive(Debug, Clone)]
pub struct HeadlessAdapterDesc {
    pub info: AdapterInfo,
    pub max_feature_level: FeatureLevel,
}

impl HeadlessAdapterDesc {
    pub fn hardware(name: &str, dedicated_video_memory: u64, max_feature_level: FeatureLevel) -> Self {
        Self {
            info: AdapterInfo {
                name: name.to_string(),
                dedicated_video_memory,
                shared_system_memory: 8 << 30,
                ..Default::default()
            },
            max_feature_level,
        }
    }

    /// A WARP-like rasterizer.
    pub fn software(name: &str) -> Self {
        Self {
            info: AdapterInfo {
                name: name.to_string(),
                shared_system_memory: 8 << 30,
                is_software: true,
                ..Default::default()
            },
            max_feature_level: FeatureLevel::Level12_1,
        }
    }
}

pub struct HeadlessAdapter {
    desc: HeadlessAdapterDesc,
}

impl hal::Adapter for HeadlessAdapter {
    fn info(&self) -> AdapterInfo {
        self.desc.info.clone()
    }

    fn supports(&self, level: FeatureLevel) -> bool {
        level <= self.desc.max_feature_level
    }
}

/// Emulated factory.
///
/// By default it exposes one hardware adapter and a software rasterizer.
#[derive(Debug, Clone)]
pub struct HeadlessInstance {
    adapters: Vec<HeadlessAdapterDesc>,
    first_back_buffer: u32,
}

impl HeadlessInstance {
    /// Replaces the adapters the factory reports.
    pub fn with_adapters(mut self, adapters: Vec<HeadlessAdapterDesc>) -> Self {
        self.adapters = adapters;
        self
    }

    /// Back-buffer index new swap chains report before the first present.
    pub fn with_first_back_buffer(mut self, index: u32) -> Self {
        self.first_back_buffer = index;
        self
    }
}

impl Default for HeadlessInstance {
    fn default() -> Self {
        Self {
            adapters: vec![
                HeadlessAdapterDesc::hardware("Nabu Headless GPU", 4 << 30, FeatureLevel::Level12_2),
                HeadlessAdapterDesc::software("Nabu Basic Render Driver"),
            ],
            first_back_buffer: 0,
        }
    }
}

impl hal::Instance<Headless> for HeadlessInstance {
    fn init(_desc: &InstanceDesc) -> Result<Self> {
        Ok(Self::default())
    }

    fn enumerate_adapters(&self) -> Result<Vec<HeadlessAdapter>> {
        let mut adapters: Vec<_> = self.adapters.clone();
        // High-performance preference: most dedicated memory first, software last.
        adapters.sort_by_key(|a| (a.info.is_software, std::cmp::Reverse(a.info.dedicated_video_memory)));
        Ok(adapters.into_iter().map(|desc| HeadlessAdapter { desc }).collect())
    }

    fn create_device(&self, adapter: &HeadlessAdapter, level: FeatureLevel) -> Result<HeadlessDevice> {
        if !hal::Adapter::supports(adapter, level) {
            return Err(Error::api(
                "D3D12CreateDevice",
                format!("adapter '{}' does not support feature level {level}", adapter.desc.info.name),
                "DXGI_ERROR_UNSUPPORTED",
            ));
        }
        Ok(HeadlessDevice::new(adapter.desc.info.clone()))
    }

    fn create_swap_chain(
        &self,
        queue: &HeadlessQueue,
        _window: &dyn HasWindowHandle,
        desc: &SwapChainDesc,
    ) -> Result<HeadlessSwapChain> {
        const OP: &str = "IDXGIFactory2::CreateSwapChainForHwnd";
        if desc.width == 0 || desc.height == 0 {
            return Err(invalid_call(OP, "swap chain extent must be non-zero"));
        }
        let flip = matches!(desc.swap_effect, SwapEffect::FlipDiscard | SwapEffect::FlipSequential);
        let min_buffers = if flip { 2 } else { 1 };
        if !(min_buffers..=16).contains(&desc.buffer_count) {
            return Err(invalid_call(
                OP,
                format!(
                    "{} buffers requested, {:?} needs {min_buffers}..=16",
                    desc.buffer_count, desc.swap_effect
                ),
            ));
        }
        if hal::Queue::kind(queue) != hal::QueueKind::Direct {
            return Err(invalid_call(OP, "swap chains must be bound to a direct queue"));
        }

        Ok(HeadlessSwapChain::new(queue.clone(), *desc, self.first_back_buffer))
    }

    fn disable_fullscreen_transitions(&self, _window: &dyn HasWindowHandle) -> Result<()> {
        Ok(())
    }
}
