//! Page terminal orchestration.
//!
//! One [`PageTerminals`] per page translates tab actions (mount, add, select,
//! close, process exit) into registry mutations and caches which tab index is
//! active. The registry stays authoritative; the index is re-derived from it
//! after every mutation.

use tracing::debug;

use tend_core::{PageKey, Session, SessionId};

use crate::registry::SessionRegistry;

/// Tab state of one page.
#[derive(Debug, Clone)]
pub struct PageTerminals {
    page: PageKey,
    active_index: Option<usize>,
}

impl PageTerminals {
    /// Orchestrator for `page`, with no active tab yet.
    pub fn new(page: PageKey) -> Self {
        Self {
            page,
            active_index: None,
        }
    }

    /// The page this orchestrator drives.
    pub fn page(&self) -> &PageKey {
        &self.page
    }

    /// Index of the active tab, if the page has sessions.
    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Page becomes visible.
    ///
    /// If the page has sessions but none is active, the first one is
    /// activated. Otherwise the cached index is synced to the active session.
    pub fn mount(&mut self, registry: &mut SessionRegistry) {
        let sessions = registry.list_for_page(&self.page);
        if sessions.is_empty() {
            self.active_index = None;
            return;
        }

        let first = sessions[0].id;
        let active = sessions.iter().position(|s| s.is_active);
        match active {
            Some(index) => self.active_index = Some(index),
            None => {
                registry.set_active(first);
                self.active_index = Some(0);
            }
        }
    }

    /// Add a new session to the page and make it the active tab.
    pub fn add(&mut self, registry: &mut SessionRegistry) -> Session {
        let created = registry.create(&self.page);
        let sessions = registry.list_for_page(&self.page);
        let last = sessions.len() - 1;
        let last_id = sessions[last].id;
        registry.set_active(last_id);
        self.active_index = Some(last);
        created
    }

    /// Switch to the tab at `index`. Out-of-range indices change nothing.
    pub fn select(&mut self, registry: &mut SessionRegistry, index: usize) -> Option<SessionId> {
        let id = registry.list_for_page(&self.page).get(index).map(|s| s.id)?;
        registry.set_active(id);
        self.active_index = Some(index);
        Some(id)
    }

    /// Close a session on this page.
    ///
    /// The active index is clamped to `min(previous, len - 1)` and that tab is
    /// activated; an emptied page has no active index. Returns `false` if the
    /// session was not live.
    pub fn close(&mut self, registry: &mut SessionRegistry, id: SessionId) -> bool {
        if registry.remove(id).is_none() {
            return false;
        }

        let sessions = registry.list_for_page(&self.page);
        if sessions.is_empty() {
            self.active_index = None;
            return true;
        }

        let index = self.active_index.unwrap_or(0).min(sessions.len() - 1);
        let target = sessions[index].id;
        registry.set_active(target);
        self.active_index = Some(index);
        true
    }

    /// The session's process exited on its own.
    ///
    /// Same as [`close`](Self::close) if the session is still live, a no-op
    /// if the user already removed it.
    pub fn handle_exit(&mut self, registry: &mut SessionRegistry, id: SessionId) -> bool {
        if !registry.contains(id) {
            debug!("Exit for already removed session {}", id);
            return false;
        }
        self.close(registry, id)
    }
}
