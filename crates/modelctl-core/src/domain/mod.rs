//! Domain types for the control plane.
//!
//! These types cross the boundary to whatever shell embeds the core
//! (UI, IPC, tests), so the serialized field names are part of the
//! contract and use camelCase.

pub mod config;
pub mod interaction;
pub mod status;

pub use config::RuntimeConfig;
pub use interaction::{InteractionMetadata, InteractionResult, Message, Role};
pub use status::RuntimeStatus;
