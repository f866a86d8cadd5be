use raw_window_handle::HasWindowHandle;

use super::{DescriptorHeap, Device, GpuSettings, Queue};
use crate::hal::{self, Api, CpuDescriptor, DescriptorHeapKind, Format, Instance as _, SwapChainDesc};
use crate::{Error, Result};

/// Presentation surface bound to a window and a direct queue.
///
/// Owns one render target view per back buffer.
pub struct SwapChain<A: Api> {
    buffers: Vec<A::Resource>,
    rtv_heap: DescriptorHeap<A>,
    raw: A::SwapChain,
    desc: SwapChainDesc,
    current: u32,
    vsync: bool,
}

impl<A: Api> SwapChain<A> {
    pub fn new(
        device: &Device<A>,
        queue: &Queue<A>,
        window: &dyn HasWindowHandle,
        width: u32,
        height: u32,
        settings: &GpuSettings,
    ) -> Result<Self> {
        let desc = SwapChainDesc {
            width,
            height,
            format: settings.rtv_format,
            buffer_count: settings.frame_buffer_count,
            swap_effect: settings.swap_effect,
        };

        let rtv_heap = DescriptorHeap::new(device, DescriptorHeapKind::Rtv, desc.buffer_count)?;
        let raw = device.instance().create_swap_chain(queue.raw(), window, &desc)?;
        device.instance().disable_fullscreen_transitions(window)?;
        let current = hal::SwapChain::current_back_buffer_index(&raw);

        let mut buffers = Vec::with_capacity(desc.buffer_count as usize);
        for i in 0..desc.buffer_count {
            let buffer = hal::SwapChain::buffer(&raw, i)?;
            hal::Device::create_render_target_view(device.raw(), &buffer, rtv_heap.handle(i)?);
            buffers.push(buffer);
        }

        log::info!(
            "swap chain created: {width}x{height}, {} buffers, {:?}",
            desc.buffer_count,
            desc.format
        );

        Ok(Self {
            buffers,
            rtv_heap,
            raw,
            desc,
            current,
            vsync: settings.vsync,
        })
    }

    pub fn raw(&self) -> &A::SwapChain {
        &self.raw
    }

    pub fn frame_buffer_count(&self) -> u32 {
        self.desc.buffer_count
    }

    pub fn format(&self) -> Format {
        self.desc.format
    }

    pub fn extent(&self) -> (u32, u32) {
        (self.desc.width, self.desc.height)
    }

    /// Always in `[0, frame_buffer_count)`.
    pub fn current_back_buffer_index(&self) -> u32 {
        self.current
    }

    pub fn current_back_buffer_rtv(&self) -> Result<CpuDescriptor> {
        self.rtv_heap.handle(self.current)
    }

    pub fn current_back_buffer_resource(&self) -> &A::Resource {
        &self.buffers[self.current as usize]
    }

    /// Presents the current back buffer and advances to the next one.
    pub fn present(&mut self) -> Result<()> {
        let sync_interval = u32::from(self.vsync);
        hal::SwapChain::present(&self.raw, sync_interval)?;
        self.current = hal::SwapChain::current_back_buffer_index(&self.raw);
        Ok(())
    }

    pub fn resize(&mut self, _width: u32, _height: u32) -> Result<()> {
        Err(Error::Unsupported("swap chain resize"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::{Headless, HeadlessInstance};
    use crate::hal::QueueKind;
    use crate::testing::{self, CollectingSink, NoWindow};

    fn chain_on(instance: HeadlessInstance, buffers: u32) -> (Device<Headless>, Queue<Headless>, Result<SwapChain<Headless>>) {
        let mut settings = testing::settings();
        settings.frame_buffer_count = buffers;
        let device = Device::with_instance(instance, &settings, CollectingSink::new()).unwrap();
        let queue = Queue::new(&device, QueueKind::Direct).unwrap();
        let chain = SwapChain::new(&device, &queue, &NoWindow, 64, 32, &settings);
        (device, queue, chain)
    }

    #[test]
    fn back_buffer_index_stays_in_range_across_presents() {
        let (device, _queue, chain) = chain_on(HeadlessInstance::default(), 3);
        let mut chain = chain.unwrap();

        for _ in 0..10 {
            assert!(chain.current_back_buffer_index() < chain.frame_buffer_count());
            // Presents of buffers still in PRESENT state are valid.
            chain.present().unwrap();
        }
        device.raw().drain();
        assert_eq!(device.raw().stats().presents, 10);
        assert_eq!(device.raw().stats().validation_errors, 0);
    }

    #[test]
    fn first_index_is_queried_not_assumed() {
        let (_device, _queue, chain) = chain_on(HeadlessInstance::default().with_first_back_buffer(1), 2);
        let chain = chain.unwrap();
        assert_eq!(chain.current_back_buffer_index(), 1);
        assert_eq!(chain.current_back_buffer_rtv().unwrap(), chain.rtv_heap.handle(1).unwrap());
    }

    #[test]
    fn default_window_chain_has_two_buffers() {
        let settings = testing::settings();
        assert_eq!(settings.frame_buffer_count, 2);

        for first in [0, 1] {
            let instance = HeadlessInstance::default().with_first_back_buffer(first);
            let device: Device<Headless> = Device::with_instance(instance, &settings, CollectingSink::new()).unwrap();
            let queue = Queue::new(&device, QueueKind::Direct).unwrap();
            let mut chain = SwapChain::new(&device, &queue, &NoWindow, 800, 600, &settings).unwrap();

            assert_eq!(chain.frame_buffer_count(), 2);
            assert_eq!(chain.extent(), (800, 600));
            assert_eq!(chain.current_back_buffer_index(), first);
            for _ in 0..4 {
                chain.present().unwrap();
                assert!(chain.current_back_buffer_index() < 2);
            }
            device.raw().drain();
            assert_eq!(device.raw().stats().presents, 4);
        }
    }

    #[test]
    fn flip_model_needs_two_buffers() {
        let (_device, _queue, chain) = chain_on(HeadlessInstance::default(), 1);
        assert!(chain.err().unwrap().is_api_failure());
    }

    #[test]
    fn resize_is_unsupported() {
        let (_device, _queue, chain) = chain_on(HeadlessInstance::default(), 2);
        let mut chain = chain.unwrap();
        assert!(matches!(chain.resize(128, 128), Err(Error::Unsupported(_))));
        assert_eq!(chain.extent(), (64, 32));
    }
}
