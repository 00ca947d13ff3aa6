//! Port definitions (trait abstractions) for runtime backends.
//!
//! Ports define what the core expects from a model-serving runtime.
//! They use only domain types; wire formats and transport details live
//! in the adapter crates.

pub mod runtime_adapter;

pub use runtime_adapter::{AdapterError, ChunkHandler, RuntimeAdapter};
