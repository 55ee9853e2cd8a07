//! Session registry.
//!
//! The single source of truth for which sessions exist, which page they
//! belong to and which one is active on each page. Pure state: no I/O, no
//! transport, no emulator.

use tracing::{debug, info};

use tend_core::{Error, PageDirectory, PageKey, Session, SessionId};

/// Ordered collection of live sessions across all pages.
///
/// At most one session per page is active at any time. Operations on an
/// unknown id are silent no-ops so that late host messages about a removed
/// session never fail.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Vec<Session>,
    pages: PageDirectory,
}

impl SessionRegistry {
    /// Create an empty registry with the default page names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry using the given page names.
    pub fn with_pages(pages: PageDirectory) -> Self {
        Self {
            sessions: Vec::new(),
            pages,
        }
    }

    /// Append a new active session to a page.
    ///
    /// Every other session on the page is deactivated. The display name is
    /// the page name followed by the page's session count after insertion.
    pub fn create(&mut self, page_key: &PageKey) -> Session {
        let ordinal = self.count_for_page(page_key) + 1;
        let display_name = format!("{} {}", self.pages.display_name(page_key), ordinal);

        for session in self.sessions.iter_mut().filter(|s| &s.page_key == page_key) {
            session.is_active = false;
        }

        let session = Session::new(page_key.clone(), display_name);
        info!(
            "Created session {} ({}) on page {}",
            session.id, session.display_name, page_key
        );
        self.sessions.push(session.clone());
        session
    }

    /// Remove a session.
    ///
    /// If it was the active one and siblings remain, the sibling earliest in
    /// creation order becomes active. Removing an unknown id returns `None`.
    pub fn remove(&mut self, id: SessionId) -> Option<Session> {
        let Some(position) = self.index_of(id) else {
            debug!("Ignoring removal: {}", Error::SessionNotFound(id));
            return None;
        };
        let removed = self.sessions.remove(position);

        if removed.is_active {
            if let Some(first) = self
                .sessions
                .iter_mut()
                .find(|s| s.page_key == removed.page_key)
            {
                first.is_active = true;
                debug!("Promoted session {} on page {}", first.id, first.page_key);
            }
        }

        info!("Removed session {} from page {}", id, removed.page_key);
        Some(removed)
    }

    /// Make a session the active one on its page.
    ///
    /// Returns `false` and changes nothing if the id is unknown.
    pub fn set_active(&mut self, id: SessionId) -> bool {
        let Some(page_key) = self.get(id).map(|s| s.page_key.clone()) else {
            debug!("Ignoring activation: {}", Error::SessionNotFound(id));
            return false;
        };
        for session in self.sessions.iter_mut().filter(|s| s.page_key == page_key) {
            session.is_active = session.id == id;
        }
        true
    }

    /// Record that the host acknowledged the session's process.
    ///
    /// Returns `false` if the id is unknown.
    pub fn mark_ready(&mut self, id: SessionId) -> bool {
        match self.sessions.iter_mut().find(|s| s.id == id) {
            Some(session) => {
                session.is_ready = true;
                true
            }
            None => {
                debug!("Ignoring readiness: {}", Error::SessionNotFound(id));
                false
            }
        }
    }

    /// Sessions on a page, in creation order.
    pub fn list_for_page(&self, page_key: &PageKey) -> Vec<&Session> {
        self.sessions
            .iter()
            .filter(|s| &s.page_key == page_key)
            .collect()
    }

    /// Look up a session.
    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Whether the session is still live.
    pub fn contains(&self, id: SessionId) -> bool {
        self.get(id).is_some()
    }

    /// The active session of a page, if any.
    pub fn active_for_page(&self, page_key: &PageKey) -> Option<&Session> {
        self.sessions
            .iter()
            .find(|s| &s.page_key == page_key && s.is_active)
    }

    /// Position of a session among its page's sessions.
    pub fn position_in_page(&self, id: SessionId) -> Option<usize> {
        let session = self.get(id)?;
        self.list_for_page(&session.page_key)
            .iter()
            .position(|s| s.id == id)
    }

    /// Every live session, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }

    /// Ids of every live session, in creation order.
    pub fn live_ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|s| s.id).collect()
    }

    /// Page names used for display names.
    pub fn pages(&self) -> &PageDirectory {
        &self.pages
    }

    /// Total number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether there are no live sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn count_for_page(&self, page_key: &PageKey) -> usize {
        self.sessions
            .iter()
            .filter(|s| &s.page_key == page_key)
            .count()
    }

    fn index_of(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }
}
