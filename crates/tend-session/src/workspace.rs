//! Workspace facade.
//!
//! Owns the registry, one orchestrator per page, one view per session, the
//! transport sender and the resize observer. A UI process constructs exactly
//! one and drives it from a single loop.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use tend_core::{AppConfig, Dimensions, Error, PageDirectory, PageKey, Session, SessionId};
use tend_emulator::Emulator;
use tend_transport::{HostToUi, UiSender};

use crate::orchestrator::PageTerminals;
use crate::registry::SessionRegistry;
use crate::resize::ResizeObserver;
use crate::routing::{route_data, Route};
use crate::view::{CloseReason, SessionView};

/// Builds the emulator for a newly mounted session pane.
pub type EmulatorFactory<E> = Box<dyn FnMut(&Session) -> E>;

/// All terminal sessions of one UI process.
pub struct Workspace<E: Emulator> {
    registry: SessionRegistry,
    pages: HashMap<PageKey, PageTerminals>,
    views: HashMap<SessionId, SessionView<E>>,
    visible_page: Option<PageKey>,
    sender: UiSender,
    factory: EmulatorFactory<E>,
    observer: ResizeObserver,
    accept_legacy: bool,
    spawn_timeout: Option<Duration>,
}

impl<E: Emulator> Workspace<E> {
    /// Workspace with default page names, legacy routing on and no spawn
    /// timeout.
    pub fn new(sender: UiSender, factory: EmulatorFactory<E>) -> Self {
        Self::with_parts(PageDirectory::default(), sender, factory, true, None)
    }

    /// Workspace configured from the application config.
    pub fn from_config(config: &AppConfig, sender: UiSender, factory: EmulatorFactory<E>) -> Self {
        Self::with_parts(
            PageDirectory::from_config(&config.pages),
            sender,
            factory,
            config.transport.accept_legacy_data,
            config.terminal.spawn_timeout(),
        )
    }

    fn with_parts(
        pages: PageDirectory,
        sender: UiSender,
        factory: EmulatorFactory<E>,
        accept_legacy: bool,
        spawn_timeout: Option<Duration>,
    ) -> Self {
        Self {
            registry: SessionRegistry::with_pages(pages),
            pages: HashMap::new(),
            views: HashMap::new(),
            visible_page: None,
            sender,
            factory,
            observer: ResizeObserver::new(),
            accept_legacy,
            spawn_timeout,
        }
    }

    /// Make a page the visible one and mount its tabs.
    pub fn show_page(&mut self, page: &PageKey) {
        info!("Showing page {}", page);
        self.visible_page = Some(page.clone());
        page_terminals(&mut self.pages, page).mount(&mut self.registry);

        let unmounted: Vec<Session> = self
            .registry
            .list_for_page(page)
            .into_iter()
            .filter(|s| !self.views.contains_key(&s.id))
            .cloned()
            .collect();
        for session in unmounted {
            self.open_view(&session);
        }
        self.sync_views();
    }

    /// Add a session to a page and make it that page's active tab.
    pub fn add_session(&mut self, page: &PageKey) -> Session {
        let session = page_terminals(&mut self.pages, page).add(&mut self.registry);
        self.open_view(&session);
        self.sync_views();
        session
    }

    /// Switch the active tab of a page. Out-of-range indices change nothing.
    pub fn select_tab(&mut self, page: &PageKey, index: usize) -> Option<SessionId> {
        let selected = page_terminals(&mut self.pages, page).select(&mut self.registry, index);
        if selected.is_some() {
            self.sync_views();
        }
        selected
    }

    /// Close a session at the user's request and tell the host to kill it.
    ///
    /// Unknown ids are a no-op returning `false`.
    pub fn close_session(&mut self, id: SessionId) -> bool {
        self.remove_session(id, CloseReason::User)
    }

    /// Forward input to a session's process. Dropped while not ready.
    pub fn send_input(&mut self, id: SessionId, data: &str) -> bool {
        match self.views.get(&id) {
            Some(view) => view.forward_input(data),
            None => {
                debug!("Dropping input: {}", Error::SessionNotFound(id));
                false
            }
        }
    }

    /// The visible pane changed size; only subscribed views react.
    ///
    /// Returns how many views were resized.
    pub fn resize_visible_pane(&mut self, dimensions: Dimensions) -> usize {
        self.views
            .values_mut()
            .filter(|view| view.has_resize_subscription())
            .map(|view| view.pane_resized(dimensions))
            .filter(|resized| *resized)
            .count()
    }

    /// Apply one message from the host.
    pub fn handle_host_message(&mut self, message: HostToUi) {
        match message {
            HostToUi::Ready { id } => {
                self.mark_ready(id);
            }
            HostToUi::Data(data) => match route_data(&self.registry, &data, self.accept_legacy) {
                Route::Session(id) => {
                    if self.registry.get(id).is_some_and(|s| !s.is_ready) {
                        self.mark_ready(id);
                    }
                    if let Some(view) = self.views.get_mut(&id) {
                        view.write_output(data.bytes());
                    }
                }
                Route::Unknown(id) => debug!("Dropping data for removed session {}", id),
                Route::Ambiguous { live } => {
                    warn!("{}", Error::AmbiguousLegacyRouting { live });
                }
                Route::NoTarget => debug!("Dropping legacy data, no live session"),
                Route::LegacyDisabled => debug!("Dropping legacy data, legacy routing disabled"),
            },
            HostToUi::Exited { id, exit_code } => {
                if self.remove_session(id, CloseReason::Exited { code: exit_code }) {
                    info!("Session {} exited with code {}", id, exit_code);
                } else {
                    debug!("Exit for already removed session {}", id);
                }
            }
        }
    }

    /// Close sessions the host has not acknowledged within the configured
    /// spawn timeout. Returns the reaped ids.
    pub fn reap_unready(&mut self, now: Instant) -> Vec<SessionId> {
        let Some(timeout) = self.spawn_timeout else {
            return Vec::new();
        };

        let stuck: Vec<(SessionId, Duration)> = self
            .views
            .values()
            .filter(|view| !view.is_ready())
            .map(|view| (view.id(), now.saturating_duration_since(view.created_at())))
            .filter(|(_, waited)| *waited >= timeout)
            .collect();

        let mut reaped = Vec::new();
        for (id, waited) in stuck {
            let error = Error::SpawnTimeout {
                id,
                waited_ms: waited.as_millis() as u64,
            };
            warn!("{}", error);
            if self.remove_session(id, CloseReason::SpawnTimeout) {
                reaped.push(id);
            }
        }
        reaped
    }

    /// Close every session and tell the host to kill them.
    ///
    /// Returns how many sessions were closed.
    pub fn shutdown(&mut self) -> usize {
        let ids = self.registry.live_ids();
        let closed = ids
            .into_iter()
            .filter(|id| self.remove_session(*id, CloseReason::User))
            .count();
        info!("Workspace shut down, closed {} sessions", closed);
        closed
    }

    /// Sessions of a page in tab order.
    pub fn sessions_for_page(&self, page: &PageKey) -> Vec<&Session> {
        self.registry.list_for_page(page)
    }

    /// Active session of a page.
    pub fn active_session(&self, page: &PageKey) -> Option<&Session> {
        self.registry.active_for_page(page)
    }

    /// Active tab index of a page, as cached by its orchestrator.
    pub fn active_index(&self, page: &PageKey) -> Option<usize> {
        self.pages.get(page).and_then(PageTerminals::active_index)
    }

    /// The view bound to a session.
    pub fn view(&self, id: SessionId) -> Option<&SessionView<E>> {
        self.views.get(&id)
    }

    /// Currently visible page.
    pub fn visible_page(&self) -> Option<&PageKey> {
        self.visible_page.as_ref()
    }

    /// Number of resize subscriptions currently held.
    pub fn live_resize_subscriptions(&self) -> usize {
        self.observer.live_subscriptions()
    }

    /// The underlying registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    fn open_view(&mut self, session: &Session) {
        let emulator = (self.factory)(session);
        let view = SessionView::open(session, emulator, self.sender.clone());
        self.views.insert(session.id, view);
    }

    fn mark_ready(&mut self, id: SessionId) {
        if !self.registry.mark_ready(id) {
            return;
        }
        if let Some(view) = self.views.get_mut(&id) {
            view.mark_ready();
        }
    }

    fn remove_session(&mut self, id: SessionId, reason: CloseReason) -> bool {
        let Some(page) = self.registry.get(id).map(|s| s.page_key.clone()) else {
            return false;
        };

        if let Some(mut view) = self.views.remove(&id) {
            view.close(reason);
        }

        let orchestrator = page_terminals(&mut self.pages, &page);
        let removed = match reason {
            CloseReason::Exited { .. } => orchestrator.handle_exit(&mut self.registry, id),
            _ => orchestrator.close(&mut self.registry, id),
        };
        self.sync_views();
        removed
    }

    fn sync_views(&mut self) {
        let visible = self.visible_page.as_ref();
        for session in self.registry.iter() {
            if let Some(view) = self.views.get_mut(&session.id) {
                let page_visible = visible == Some(&session.page_key);
                view.set_active(session.is_active, page_visible, &self.observer);
            }
        }
    }
}

fn page_terminals<'a>(
    pages: &'a mut HashMap<PageKey, PageTerminals>,
    page: &PageKey,
) -> &'a mut PageTerminals {
    pages
        .entry(page.clone())
        .or_insert_with(|| PageTerminals::new(page.clone()))
}

impl<E: Emulator> std::fmt::Debug for Workspace<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("sessions", &self.registry.len())
            .field("visible_page", &self.visible_page)
            .field("accept_legacy", &self.accept_legacy)
            .field("spawn_timeout", &self.spawn_timeout)
            .finish_non_exhaustive()
    }
}
