//! Core services.

pub mod orchestrator;

pub use orchestrator::{LifecycleOrchestrator, OrchestratorError};
