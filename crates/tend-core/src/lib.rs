//! # tend-core
//!
//! Core types for the Tend terminal session manager.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other tend crates. It provides:
//!
//! - Session types (SessionId, PageKey, Session)
//! - Page display names (PageDirectory)
//! - Terminal dimensions
//! - Configuration loaded from YAML
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other tend crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod geometry;
pub mod page;
pub mod session;

// Re-export commonly used types
pub use config::{
    AppConfig, HostSettings, PageConfig, Pages, ShellSettings, TerminalSettings, TransportSettings,
};
pub use error::{Error, Result};
pub use geometry::Dimensions;
pub use page::PageDirectory;
pub use session::{PageKey, Session, SessionId};
