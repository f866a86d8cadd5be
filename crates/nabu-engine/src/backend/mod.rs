//! Implementations of [`crate::hal::Api`].
//!
//! - `dx12`: Direct3D 12 through the `windows` crate (Windows only)
//! - `headless`: software emulation used by tests and non-Windows hosts

#[cfg(windows)]
pub mod dx12;
pub mod headless;
