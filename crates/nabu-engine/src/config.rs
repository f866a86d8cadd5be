//! Engine configuration.
//!
//! Plain structs with defaults; each subsystem owns its own settings type and
//! [`EngineConfig`] bundles them for the application.

pub use crate::device::{FrameSync, GpuSettings};
pub use crate::logging::LoggingConfig;
pub use crate::render::RendererSettings;
pub use crate::resource::ResourceCapacities;
pub use crate::window::WindowSettings;

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub window: WindowSettings,
    pub gpu: GpuSettings,
    pub resources: ResourceCapacities,
    pub renderer: RendererSettings,
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{FeatureLevel, Format, SwapEffect};

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!((config.window.width, config.window.height), (800, 600));
        assert_eq!(config.gpu.frame_buffer_count, 2);
        assert_eq!(config.gpu.rtv_format, Format::Rgba8Unorm);
        assert_eq!(config.gpu.swap_effect, SwapEffect::FlipDiscard);
        assert_eq!(config.gpu.min_feature_level, FeatureLevel::Level12_2);
        assert_eq!(config.gpu.frame_sync, FrameSync::PerSlotFence);
        assert_eq!(config.resources.meshes, 64);
        assert_eq!(config.renderer.clear_color, [0.0, 0.2, 0.4, 1.0]);
        assert!(config.logging.env_filter.is_none());
    }
}
