//! Core components of the `tradestation-rs` client.
//!
//! This module contains the foundational building blocks of the library:
//! - The main [`TsClient`] and its builder.
//! - The primary [`TsError`] type.
//! - Request execution with 401 handling and transient-failure retry.

/// The main client (`TsClient`), builder, and retry configuration.
pub mod client;
/// The primary error type (`TsError`) for the crate.
pub mod error;
pub(crate) mod params;

// convenient re-exports so most code can just `use crate::core::TsClient`
pub use client::{TsClient, TsClientBuilder};
pub use error::TsError;
