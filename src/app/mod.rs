//! App layer - harness state and command processing
//!
//! The harness actor receives UI events and network responses,
//! updates state, and emits network commands and render state.

pub mod state;
pub mod actor;
pub mod commands;

pub use state::Harness;
pub use actor::HarnessActor;
