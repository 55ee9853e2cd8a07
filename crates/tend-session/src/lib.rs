//! # tend-session
//!
//! Session lifecycle for the Tend terminal core.
//!
//! This crate provides:
//! - [`SessionRegistry`], the authoritative list of sessions and the
//!   one-active-per-page rule
//! - [`SessionView`], the per-session controller binding an emulator to the
//!   transport
//! - [`PageTerminals`], the per-page tab orchestration
//! - Routing of host data to views, including untagged legacy output
//! - [`Workspace`], the facade a UI process drives
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on tend-core,
//! tend-transport and tend-emulator.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod orchestrator;
pub mod registry;
pub mod resize;
pub mod routing;
pub mod view;
pub mod workspace;

// Re-export commonly used types
pub use orchestrator::PageTerminals;
pub use registry::SessionRegistry;
pub use resize::{ResizeObserver, ResizeSubscription};
pub use routing::{route_data, Route};
pub use view::{CloseReason, SessionView, ViewState};
pub use workspace::{EmulatorFactory, Workspace};
