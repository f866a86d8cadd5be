use std::sync::Arc;

use raw_window_handle::HasWindowHandle;

use super::{CommandManager, Device, GpuSettings, SwapChain};
use crate::Result;
use crate::hal::{Api, DiagnosticsSink};
use crate::resource::{ResourceCapacities, ResourceManager};

/// Everything the renderer needs, created in dependency order.
///
/// Dropping the context first drains every queue, then releases resources,
/// the swap chain, command objects and finally the device, in that order.
pub struct GpuContext<A: Api> {
    resources: ResourceManager<A>,
    swap_chain: SwapChain<A>,
    commands: CommandManager<A>,
    device: Device<A>,
    settings: GpuSettings,
}

/// Mutable split of a [`GpuContext`] for frame recording.
pub struct GpuParts<'a, A: Api> {
    pub device: &'a Device<A>,
    pub commands: &'a mut CommandManager<A>,
    pub swap_chain: &'a mut SwapChain<A>,
    pub resources: &'a ResourceManager<A>,
}

impl<A: Api> GpuContext<A> {
    /// Creates the device on a fresh factory and everything that hangs off it.
    pub fn new(
        window: &dyn HasWindowHandle,
        width: u32,
        height: u32,
        settings: GpuSettings,
        capacities: ResourceCapacities,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Result<Self> {
        let device = Device::new(&settings, sink)?;
        Self::with_device(device, window, width, height, settings, capacities)
    }

    pub fn with_device(
        device: Device<A>,
        window: &dyn HasWindowHandle,
        width: u32,
        height: u32,
        settings: GpuSettings,
        capacities: ResourceCapacities,
    ) -> Result<Self> {
        let commands = CommandManager::new(&device, settings.frame_buffer_count)?;
        let swap_chain = SwapChain::new(&device, commands.direct_queue(), window, width, height, &settings)?;
        let resources = ResourceManager::new(capacities);

        Ok(Self {
            resources,
            swap_chain,
            commands,
            device,
            settings,
        })
    }

    pub fn device(&self) -> &Device<A> {
        &self.device
    }

    pub fn commands(&self) -> &CommandManager<A> {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandManager<A> {
        &mut self.commands
    }

    pub fn swap_chain(&self) -> &SwapChain<A> {
        &self.swap_chain
    }

    pub fn resources(&self) -> &ResourceManager<A> {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceManager<A> {
        &mut self.resources
    }

    pub fn settings(&self) -> &GpuSettings {
        &self.settings
    }

    pub fn parts_mut(&mut self) -> GpuParts<'_, A> {
        GpuParts {
            device: &self.device,
            commands: &mut self.commands,
            swap_chain: &mut self.swap_chain,
            resources: &self.resources,
        }
    }

    /// Blocks until the GPU is idle.
    pub fn flush(&mut self) -> Result<()> {
        self.commands.flush_all()
    }
}

impl<A: Api> Drop for GpuContext<A> {
    fn drop(&mut self) {
        // Resources may still be referenced by queued frames.
        if let Err(e) = self.commands.flush_all() {
            log::error!("failed to drain the GPU before shutdown: {e}");
        }
    }
}
