//! carnival-api: HTTP API layer for Carnival Wallet
//!
//! Exposes wallet sessions, transfers and purchases to the UI.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::{AppState, StateError};
