//! Core domain types for Pledge.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the workspace.

mod ids;
mod reason;
mod state;

pub use ids::FutureId;
pub use reason::{CyclicResolution, Reason};
pub use state::FutureState;
