//! Input vocabulary.
//!
//! Public types are platform-agnostic. Window backends translate their native
//! events into [`crate::events::Event`]s built from these types.

pub mod platform;
mod types;

pub use types::{Key, KeyState, MouseButton};
