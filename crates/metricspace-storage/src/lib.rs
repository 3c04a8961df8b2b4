//! # metricspace-storage
//!
//! Storage backends and the best-effort persistence store used by the
//! Metricspace calculators and subscription gate.
//!
//! This crate provides:
//! - The [`StorageBackend`] abstraction
//! - In-memory storage (for tests and ephemeral sessions)
//! - Durable single-file storage on `redb`
//! - [`PersistenceStore`], which absorbs every backend failure
//! - [`CalculatorState`], the per-calculator input rows

#![doc = include_str!("../README.md")]

pub mod durable;
pub mod error;
pub mod memory;
pub mod state;
pub mod store;
pub mod traits;

#[cfg(test)]
mod proptests;

pub use durable::RedbBackend;
pub use error::{Error, Result};
pub use memory::MemoryBackend;
pub use state::CalculatorState;
pub use store::{PersistenceStore, STORAGE_WRITE_EVENT};
pub use traits::StorageBackend;
