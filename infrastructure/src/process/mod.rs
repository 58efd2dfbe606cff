//! External program adapter
//!
//! Implements the [`ProcessLauncher`](avp_sweep_application::ProcessLauncher)
//! port with `tokio::process`.

mod commands;
mod launcher;
mod party;

pub use commands::{ProgramSpec, ProtocolCommands};
pub use launcher::{DEFAULT_MODULUS_ENV, DEFAULT_UTILITY_TIMEOUT, TokioProcessLauncher};
pub use party::ChildParty;
