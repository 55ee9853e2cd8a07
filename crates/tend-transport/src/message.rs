//! Wire message catalog.
//!
//! One JSON object per line, internally tagged by `"type"`. Field names are
//! part of the contract shared with the host and must not drift.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tend_core::{Error, Result, SessionId};

/// A message that can cross the process boundary as one line of JSON.
pub trait WireMessage: Sized {
    /// Encode to a single line (no trailing newline).
    fn encode(&self) -> Result<String>;

    /// Decode from a single line.
    fn decode(line: &str) -> Result<Self>;
}

/// Messages sent by the UI process to the host supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UiToHost {
    /// Spawn the backing process for `id`
    Create {
        /// Session to spawn
        id: SessionId,
    },
    /// Forward input verbatim to the process stdin
    Keystroke {
        /// Target session
        id: SessionId,
        /// Input as typed into the emulator
        bytes: String,
    },
    /// Force-terminate the backing process
    Remove {
        /// Session to terminate
        id: SessionId,
    },
    /// Resize the session's pty
    Resize {
        /// Target session
        id: SessionId,
        /// New column count
        cols: u16,
        /// New row count
        rows: u16,
    },
}

impl UiToHost {
    /// The session this message is about.
    pub fn session_id(&self) -> SessionId {
        match self {
            Self::Create { id }
            | Self::Keystroke { id, .. }
            | Self::Remove { id }
            | Self::Resize { id, .. } => *id,
        }
    }
}

impl WireMessage for UiToHost {
    fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn decode(line: &str) -> Result<Self> {
        serde_json::from_str(line.trim()).map_err(|e| Error::Protocol(e.to_string()))
    }
}

/// Output routed to a terminal, decoded into an explicit union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingData {
    /// Data tagged with its session
    Addressed {
        /// Source session
        id: SessionId,
        /// Terminal output
        bytes: String,
    },
    /// Untagged data from a host that predates session ids
    Legacy {
        /// Terminal output
        bytes: String,
    },
}

impl IncomingData {
    /// The output payload.
    pub fn bytes(&self) -> &str {
        match self {
            Self::Addressed { bytes, .. } | Self::Legacy { bytes } => bytes,
        }
    }
}

/// Messages sent by the host supervisor to the UI process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostToUi {
    /// The backing process for `id` exists
    Ready {
        /// Acknowledged session
        id: SessionId,
    },
    /// Process output
    Data(IncomingData),
    /// The backing process ended
    Exited {
        /// Session whose process ended
        id: SessionId,
        /// Process exit code
        exit_code: i32,
    },
}

impl HostToUi {
    /// The session this message is about, if it names one.
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            Self::Ready { id } | Self::Exited { id, .. } => Some(*id),
            Self::Data(IncomingData::Addressed { id, .. }) => Some(*id),
            Self::Data(IncomingData::Legacy { .. }) => None,
        }
    }
}

/// On-the-wire shape of [`HostToUi`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum HostWire {
    Ready {
        id: SessionId,
    },
    Data {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<SessionId>,
        bytes: String,
    },
    Exited {
        id: SessionId,
        #[serde(rename = "exitCode")]
        exit_code: i32,
    },
}

impl From<HostWire> for HostToUi {
    fn from(wire: HostWire) -> Self {
        match wire {
            HostWire::Ready { id } => Self::Ready { id },
            HostWire::Data { id: Some(id), bytes } => {
                Self::Data(IncomingData::Addressed { id, bytes })
            }
            HostWire::Data { id: None, bytes } => Self::Data(IncomingData::Legacy { bytes }),
            HostWire::Exited { id, exit_code } => Self::Exited { id, exit_code },
        }
    }
}

impl From<&HostToUi> for HostWire {
    fn from(message: &HostToUi) -> Self {
        match message {
            HostToUi::Ready { id } => Self::Ready { id: *id },
            HostToUi::Data(IncomingData::Addressed { id, bytes }) => Self::Data {
                id: Some(*id),
                bytes: bytes.clone(),
            },
            HostToUi::Data(IncomingData::Legacy { bytes }) => Self::Data {
                id: None,
                bytes: bytes.clone(),
            },
            HostToUi::Exited { id, exit_code } => Self::Exited {
                id: *id,
                exit_code: *exit_code,
            },
        }
    }
}

impl WireMessage for HostToUi {
    fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(&HostWire::from(self))?)
    }

    /// Decode a host line.
    ///
    /// A bare JSON string is the oldest form of terminal output and decodes
    /// as [`IncomingData::Legacy`].
    fn decode(line: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(line.trim()).map_err(|e| Error::Protocol(e.to_string()))?;
        if let Value::String(bytes) = value {
            return Ok(Self::Data(IncomingData::Legacy { bytes }));
        }
        let wire: HostWire =
            serde_json::from_value(value).map_err(|e| Error::Protocol(e.to_string()))?;
        Ok(wire.into())
    }
}
