use std::sync::Arc;

use super::{Fence, GpuSettings};
use crate::hal::{
    self, Adapter as _, AdapterInfo, Api, DiagnosticsSink, FeatureLevel, Instance as _, InstanceDesc,
    QueueKind,
};
use crate::{Error, Result};

const MIB: u64 = 1024 * 1024;

/// Logical GPU device plus the factory and adapter it was created from.
///
/// Field order is drop order: the diagnostics registration goes first, the
/// factory last.
pub struct Device<A: Api> {
    diagnostics: Option<A::DiagnosticsCookie>,
    raw: A::Device,
    adapter: A::Adapter,
    instance: A::Instance,
    info: AdapterInfo,
    feature_level: FeatureLevel,
}

impl<A: Api> Device<A> {
    /// Enables the debug layer when requested, creates the factory, then
    /// picks an adapter and creates the device on it.
    pub fn new(settings: &GpuSettings, sink: Arc<dyn DiagnosticsSink>) -> Result<Self> {
        if settings.debug_layer {
            A::enable_debug_layer(settings.gpu_based_validation)?;
            log::info!("{} debug layer enabled", A::NAME);
        }

        let instance = A::Instance::init(&InstanceDesc {
            debug: settings.debug_layer,
        })?;
        Self::with_instance(instance, settings, sink)
    }

    /// Like [`Device::new`] but on an existing factory.
    pub fn with_instance(
        instance: A::Instance,
        settings: &GpuSettings,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Result<Self> {
        let level = settings.min_feature_level;
        let mut adapters = instance.enumerate_adapters()?;
        let infos: Vec<AdapterInfo> = adapters.iter().map(hal::Adapter::info).collect();

        for (i, info) in infos.iter().enumerate() {
            log::info!("Adapter [{i}]: {}", info.name);
            log::debug!("  dedicated video memory:  {} MiB", info.dedicated_video_memory / MIB);
            log::debug!("  dedicated system memory: {} MiB", info.dedicated_system_memory / MIB);
            log::debug!("  shared system memory:    {} MiB", info.shared_system_memory / MIB);
            if info.is_software {
                log::debug!("  software adapter, skipped");
            }
        }

        let index = select_adapter(&infos, |i| adapters[i].supports(level))
            .ok_or(Error::NoSuitableAdapter { feature_level: level })?;
        let adapter = adapters.swap_remove(index);
        let info = infos[index].clone();

        let raw = instance.create_device(&adapter, level)?;
        log::info!("{} device created on '{}' at feature level {level}", A::NAME, info.name);

        let diagnostics = if settings.debug_layer {
            Some(hal::Device::register_diagnostics(&raw, sink)?)
        } else {
            None
        };

        Ok(Self {
            diagnostics,
            raw,
            adapter,
            instance,
            info,
            feature_level: level,
        })
    }

    pub fn raw(&self) -> &A::Device {
        &self.raw
    }

    pub fn instance(&self) -> &A::Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &A::Adapter {
        &self.adapter
    }

    pub fn adapter_info(&self) -> &AdapterInfo {
        &self.info
    }

    pub fn feature_level(&self) -> FeatureLevel {
        self.feature_level
    }

    pub fn create_command_queue(&self, kind: QueueKind) -> Result<A::Queue> {
        hal::Device::create_queue(&self.raw, kind)
    }

    pub fn create_command_allocator(&self, kind: QueueKind) -> Result<A::CommandAllocator> {
        hal::Device::create_command_allocator(&self.raw, kind)
    }

    /// Creates a direct command list and closes it, ready for its first reset.
    pub fn create_graphics_command_list(&self, allocator: &A::CommandAllocator) -> Result<A::CommandList> {
        let mut list = hal::Device::create_command_list(&self.raw, QueueKind::Direct, allocator)?;
        hal::CommandList::close(&mut list)?;
        Ok(list)
    }

    pub fn create_fence(&self) -> Result<Fence<A>> {
        Fence::new(&self.raw)
    }
}

impl<A: Api> Drop for Device<A> {
    fn drop(&mut self) {
        if let Some(cookie) = self.diagnostics.take() {
            if let Err(e) = hal::Device::unregister_diagnostics(&self.raw, cookie) {
                log::error!("failed to unregister diagnostics callback: {e}");
            }
        }
    }
}

/// First hardware adapter that supports the requested feature level.
///
/// `infos` must already be in preference order.
pub fn select_adapter(infos: &[AdapterInfo], supports: impl Fn(usize) -> bool) -> Option<usize> {
    infos
        .iter()
        .enumerate()
        .find(|(i, info)| !info.is_software && supports(*i))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::{Headless, HeadlessAdapterDesc, HeadlessInstance};
    use crate::testing::{self, CollectingSink};

    fn info(name: &str, is_software: bool) -> AdapterInfo {
        AdapterInfo {
            name: name.to_string(),
            is_software,
            ..Default::default()
        }
    }

    #[test]
    fn skips_software_adapters() {
        let infos = [info("warp", true), info("gpu", false)];
        assert_eq!(select_adapter(&infos, |_| true), Some(1));
    }

    #[test]
    fn skips_adapters_below_feature_level() {
        let infos = [info("old", false), info("new", false)];
        assert_eq!(select_adapter(&infos, |i| i == 1), Some(1));
    }

    #[test]
    fn no_candidate_yields_none() {
        let infos = [info("warp", true)];
        assert_eq!(select_adapter(&infos, |_| true), None);
        assert_eq!(select_adapter(&[], |_| true), None);
    }

    #[test]
    fn picks_most_capable_hardware_adapter() {
        let instance = HeadlessInstance::default().with_adapters(vec![
            HeadlessAdapterDesc::software("warp"),
            HeadlessAdapterDesc::hardware("small", 1 << 30, FeatureLevel::Level12_2),
            HeadlessAdapterDesc::hardware("big", 8 << 30, FeatureLevel::Level12_2),
        ]);
        let device =
            Device::<Headless>::with_instance(instance, &testing::settings(), CollectingSink::new()).unwrap();
        assert_eq!(device.adapter_info().name, "big");
        assert_eq!(device.feature_level(), FeatureLevel::Level12_2);
    }

    #[test]
    fn fails_without_suitable_adapter() {
        let instance = HeadlessInstance::default().with_adapters(vec![
            HeadlessAdapterDesc::software("warp"),
            HeadlessAdapterDesc::hardware("legacy", 2 << 30, FeatureLevel::Level12_0),
        ]);
        let err = Device::<Headless>::with_instance(instance, &testing::settings(), CollectingSink::new())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            Error::NoSuitableAdapter {
                feature_level: FeatureLevel::Level12_2
            }
        ));
    }

    #[test]
    fn graphics_command_list_starts_closed() {
        let device = testing::device();
        let allocator = device.create_command_allocator(QueueKind::Direct).unwrap();
        let list = device.create_graphics_command_list(&allocator).unwrap();
        assert!(!list.is_recording());
    }

    #[test]
    fn debug_layer_routes_validation_messages_to_sink() {
        let sink = CollectingSink::new();
        let device = Device::<Headless>::with_instance(HeadlessInstance::default(), &testing::settings(), sink.clone())
            .unwrap();

        let allocator = device.create_command_allocator(QueueKind::Direct).unwrap();
        let list = device.create_graphics_command_list(&allocator).unwrap();
        let compute = device.create_command_queue(QueueKind::Compute).unwrap();
        hal::Queue::execute(&compute, &[&list]);

        assert_eq!(sink.errors(), 1);
        drop(device);
    }
}
