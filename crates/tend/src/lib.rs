//! Tend console library.
//!
//! The binary in main.rs spawns the host process and hands its stdio to
//! [`app::run`]; the pieces live here so they can be driven from tests.

pub mod app;
pub mod command;

// Re-export commonly used types
pub use app::{run, Console, Step};
pub use command::Command;
