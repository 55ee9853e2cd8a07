//! Session types shared by the registry, the transport and the UI layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a terminal session.
///
/// Random v4 UUIDs, so concurrent creations never collide and an id is never
/// handed out twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of the logical workspace page a session belongs to (e.g. `"files"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct PageKey(String);

impl PageKey {
    /// Create a page key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PageKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl std::fmt::Display for PageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One live shell session as tracked by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier
    pub id: SessionId,
    /// Page this session belongs to; never changes
    pub page_key: PageKey,
    /// Tab label, e.g. "File Explorer 2"
    pub display_name: String,
    /// Whether this is the page's active session
    pub is_active: bool,
    /// Whether the host acknowledged the backing process
    pub is_ready: bool,
}

impl Session {
    /// Create a freshly added session: active, not yet ready.
    pub fn new(page_key: PageKey, display_name: String) -> Self {
        Self {
            id: SessionId::new(),
            page_key,
            display_name,
            is_active: true,
            is_ready: false,
        }
    }
}
