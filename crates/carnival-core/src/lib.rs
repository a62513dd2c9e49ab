//! carnival-core: Shared types, errors, configuration and amount handling
//!
//! This crate provides the foundational types used across the Carnival Wallet workspace.

pub mod amount;
pub mod config;
pub mod errors;
pub mod types;

pub use amount::{format_units, normalize, NormalizedAmount};
pub use config::*;
pub use errors::*;
pub use types::*;
