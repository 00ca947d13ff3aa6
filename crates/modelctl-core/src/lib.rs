//! Core domain types and contracts for the modelctl control plane.
//!
//! This crate defines the uniform runtime-adapter contract, the registry
//! that routes protocol identifiers to adapter instances, and the
//! lifecycle orchestrator that sequences initialize → load → start →
//! generate → stop against whichever adapter a configuration selects.
//! It contains no HTTP or process-management code; concrete adapters
//! live in their own crates (see `modelctl-ollama`).

pub mod domain;
pub mod ports;
pub mod registry;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    InteractionMetadata, InteractionResult, Message, Role, RuntimeConfig, RuntimeStatus,
};
pub use ports::{AdapterError, ChunkHandler, RuntimeAdapter};
pub use registry::{AdapterRegistry, RegistryError};
pub use services::{LifecycleOrchestrator, OrchestratorError};
