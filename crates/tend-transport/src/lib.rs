//! # tend-transport
//!
//! The message channel between the UI process and the host process.
//!
//! This crate provides:
//! - The wire message catalog (`create`, `keystroke`, `remove`, `resize`,
//!   `ready`, `data`, `exited`) and its JSON-lines encoding
//! - An in-process channel pair for embedding and tests
//! - A bridge from any async byte stream (child stdio, sockets) to the channel
//! - JSON Schema export of the wire contract
//!
//! Delivery is FIFO and at-most-once: a dropped connection loses in-flight
//! messages and nothing is retried here.
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends only on tend-core.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod message;
pub mod schema;
pub mod stream;

// Re-export commonly used types
pub use channel::{channel_pair, Endpoint, HostEndpoint, Sender, UiEndpoint, UiSender};
pub use message::{HostToUi, IncomingData, UiToHost, WireMessage};
pub use schema::protocol_schema;
pub use stream::{connect_host, connect_ui};
