use crate::hal::{FeatureLevel, Format, SwapEffect};

/// How the CPU paces itself against frames still executing on the GPU.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameSync {
    /// Each command-context slot waits only for the frame that last used it.
    ///
    /// The CPU records frame N+1 while the GPU executes frame N.
    PerSlotFence,

    /// Stall after every frame until the GPU is idle.
    WaitEveryFrame,
}

/// Initialization parameters for the GPU layer.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuSettings {
    /// Swap-chain buffers, and therefore command-context slots.
    pub frame_buffer_count: u32,

    /// Back-buffer format.
    pub rtv_format: Format,

    pub swap_effect: SwapEffect,

    /// Adapters below this level are skipped.
    pub min_feature_level: FeatureLevel,

    /// Enables the API validation layer and the diagnostics callback.
    ///
    /// Defaults to on in debug builds.
    pub debug_layer: bool,

    /// GPU-based validation. Slow; only honoured with `debug_layer`.
    pub gpu_based_validation: bool,

    /// Present with a sync interval of 1.
    pub vsync: bool,

    pub frame_sync: FrameSync,
}

impl Default for GpuSettings {
    fn default() -> Self {
        Self {
            frame_buffer_count: 2,
            rtv_format: Format::Rgba8Unorm,
            swap_effect: SwapEffect::FlipDiscard,
            min_feature_level: FeatureLevel::Level12_2,
            debug_layer: cfg!(debug_assertions),
            gpu_based_validation: cfg!(debug_assertions),
            vsync: true,
            frame_sync: FrameSync::PerSlotFence,
        }
    }
}
