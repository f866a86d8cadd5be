//! Frame timing.
//!
//! One [`FrameClock`] per render loop; call `tick()` once per presented frame.
//! [`FrameStatsAccumulator`] turns the ticks into periodic FPS figures.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameStats, FrameStatsAccumulator, FrameTime};
