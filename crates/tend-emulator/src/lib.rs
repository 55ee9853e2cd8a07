//! # tend-emulator
//!
//! The seam between a session view and the terminal emulator it drives.
//!
//! This crate provides:
//! - The [`Emulator`] trait a view controller mounts, writes to, resizes,
//!   focuses and disposes
//! - [`VtScreen`], a headless line-oriented screen backed by the VTE parser,
//!   used by the console frontend and in tests
//!
//! Full cursor addressing and rendering belong to the embedding UI's emulator.
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends only on tend-core.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod emulator;
pub mod screen;

// Re-export commonly used types
pub use emulator::Emulator;
pub use screen::VtScreen;
