//! Session view controller.
//!
//! Binds one session to one emulator instance and to the transport. A view
//! is opened once, when the session's pane is first mounted, and lives until
//! the session is removed. Lifecycle:
//!
//! ```text
//! Initializing -> {Active <-> Inactive} -> Terminating -> Removed
//! ```

use std::time::Instant;

use tracing::{debug, info, warn};

use tend_core::{Dimensions, Session, SessionId};
use tend_emulator::Emulator;
use tend_transport::{UiSender, UiToHost};

use crate::resize::{ResizeObserver, ResizeSubscription};

/// Where a view is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Waiting for the host to acknowledge the process
    Initializing,
    /// Ready and the active tab of its page
    Active,
    /// Ready, another tab is active
    Inactive,
    /// Tearing down
    Terminating,
    /// Gone; absorbs every further call
    Removed,
}

/// Why a view is being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The user closed the tab; the host is told to kill the process
    User,
    /// The process ended on its own; the host already knows
    Exited {
        /// Process exit code
        code: i32,
    },
    /// The host never acknowledged the process; it is told to kill it
    SpawnTimeout,
}

impl CloseReason {
    fn notifies_host(&self) -> bool {
        !matches!(self, Self::Exited { .. })
    }
}

/// Controller for one session's pane.
pub struct SessionView<E: Emulator> {
    id: SessionId,
    display_name: String,
    emulator: E,
    sender: UiSender,
    ready: bool,
    active: bool,
    closing: Option<ViewState>,
    subscription: Option<ResizeSubscription>,
    resize_pending: bool,
    created_at: Instant,
}

impl<E: Emulator> std::fmt::Debug for SessionView<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionView")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("state", &self.state())
            .field("resize_subscribed", &self.subscription.is_some())
            .finish_non_exhaustive()
    }
}

impl<E: Emulator> SessionView<E> {
    /// Bind an emulator to a session and ask the host to spawn its process.
    pub fn open(session: &Session, emulator: E, sender: UiSender) -> Self {
        info!("Opening view for session {} ({})", session.id, session.display_name);
        if let Err(e) = sender.send(UiToHost::Create { id: session.id }) {
            warn!("Could not request process for {}: {}", session.id, e);
        }

        Self {
            id: session.id,
            display_name: session.display_name.clone(),
            emulator,
            sender,
            ready: session.is_ready,
            active: false,
            closing: None,
            subscription: None,
            resize_pending: false,
            created_at: Instant::now(),
        }
    }

    /// The host acknowledged the process.
    ///
    /// Focuses the emulator if the view is already active, and reports a
    /// pane size the host missed while starting. Returns `false` if the view
    /// was not initializing.
    pub fn mark_ready(&mut self) -> bool {
        if self.state() != ViewState::Initializing {
            return false;
        }
        self.ready = true;
        debug!("Session {} ready", self.id);
        if self.active {
            self.emulator.focus();
        }
        if std::mem::take(&mut self.resize_pending) && self.subscription.is_some() {
            self.send_resize(self.emulator.dimensions());
        }
        true
    }

    /// Apply the registry's active flag and the page visibility.
    ///
    /// Focus moves only on the transition into active. A resize subscription
    /// is held only while active on the visible page.
    pub fn set_active(&mut self, active: bool, page_visible: bool, observer: &ResizeObserver) {
        if self.is_closed() {
            return;
        }

        let became_active = active && !self.active;
        self.active = active;
        if became_active && self.ready {
            self.emulator.focus();
        }

        if active && page_visible {
            if self.subscription.is_none() {
                self.subscription = Some(observer.subscribe(self.id));
            }
        } else {
            self.subscription = None;
        }
    }

    /// Render host output. Dropped once the view is closed.
    pub fn write_output(&mut self, data: &str) -> bool {
        if self.is_closed() {
            debug!("Dropping output for closed session {}", self.id);
            return false;
        }
        self.emulator.write(data);
        true
    }

    /// Forward keystrokes captured by the emulator to the host.
    ///
    /// Input is dropped while the process is not ready and after close.
    pub fn forward_input(&self, data: &str) -> bool {
        if !self.ready || self.is_closed() {
            debug!("Dropping input for non-interactive session {}", self.id);
            return false;
        }
        let message = UiToHost::Keystroke {
            id: self.id,
            bytes: data.to_string(),
        };
        match self.sender.send(message) {
            Ok(()) => true,
            Err(e) => {
                warn!("Keystroke for {} lost: {}", self.id, e);
                false
            }
        }
    }

    /// The pane changed size.
    ///
    /// Ignored without a resize subscription. Before the process is ready
    /// only the emulator resizes; the latest size goes to the host on ready.
    pub fn pane_resized(&mut self, dimensions: Dimensions) -> bool {
        if self.subscription.is_none() {
            return false;
        }
        self.emulator.resize(dimensions);
        if self.ready {
            self.send_resize(dimensions);
        } else {
            self.resize_pending = true;
        }
        true
    }

    /// Tear the view down.
    ///
    /// Detaches the resize subscription, disposes the emulator and, unless
    /// the process already exited, tells the host to remove it. Returns
    /// `false` if the view was already closed.
    pub fn close(&mut self, reason: CloseReason) -> bool {
        if self.is_closed() {
            return false;
        }
        self.closing = Some(ViewState::Terminating);

        self.subscription = None;
        self.emulator.dispose();
        if reason.notifies_host() {
            if let Err(e) = self.sender.send(UiToHost::Remove { id: self.id }) {
                warn!("Remove for {} lost: {}", self.id, e);
            }
        }

        self.closing = Some(ViewState::Removed);
        info!("Closed view for session {} ({:?})", self.id, reason);
        true
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ViewState {
        match self.closing {
            Some(state) => state,
            None if !self.ready => ViewState::Initializing,
            None if self.active => ViewState::Active,
            None => ViewState::Inactive,
        }
    }

    /// Session this view renders.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Tab label.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Whether the process was acknowledged.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether the view is the active tab of its page.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the view is listening for pane resizes.
    pub fn has_resize_subscription(&self) -> bool {
        self.subscription.is_some()
    }

    /// When the view was opened.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// The bound emulator.
    pub fn emulator(&self) -> &E {
        &self.emulator
    }

    fn is_closed(&self) -> bool {
        self.closing.is_some()
    }

    fn send_resize(&self, dimensions: Dimensions) {
        let message = UiToHost::Resize {
            id: self.id,
            cols: dimensions.cols,
            rows: dimensions.rows,
        };
        if let Err(e) = self.sender.send(message) {
            warn!("Resize for {} lost: {}", self.id, e);
        }
    }
}

impl<E: Emulator> Drop for SessionView<E> {
    fn drop(&mut self) {
        if !self.is_closed() {
            debug!("Releasing view for session {} without close", self.id);
            self.subscription = None;
            self.emulator.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tend_core::PageKey;
    use tend_emulator::VtScreen;
    use tend_transport::{channel_pair, HostEndpoint};

    fn open_view() -> (SessionView<VtScreen>, HostEndpoint, ResizeObserver) {
        let (ui, host) = channel_pair();
        let session = Session::new(PageKey::from("files"), "File Explorer 1".to_string());
        let emulator = VtScreen::new(Dimensions::default(), 100);
        let view = SessionView::open(&session, emulator, ui.sender());
        (view, host, ResizeObserver::new())
    }

    #[test]
    fn test_open_sends_create() {
        let (view, mut host, _) = open_view();
        assert_eq!(host.drain(), vec![UiToHost::Create { id: view.id() }]);
        assert_eq!(view.state(), ViewState::Initializing);
        assert_eq!(view.display_name(), "File Explorer 1");
    }

    #[test]
    fn test_ready_then_active_focuses_once() {
        let (mut view, _host, observer) = open_view();
        assert!(view.mark_ready());
        assert!(!view.mark_ready());
        assert_eq!(view.state(), ViewState::Inactive);
        assert_eq!(view.emulator().focus_count(), 0);

        view.set_active(true, true, &observer);
        view.set_active(true, true, &observer);
        assert_eq!(view.state(), ViewState::Active);
        assert_eq!(view.emulator().focus_count(), 1);
    }

    #[test]
    fn test_active_before_ready_focuses_on_ready() {
        let (mut view, _host, observer) = open_view();
        view.set_active(true, true, &observer);
        assert_eq!(view.emulator().focus_count(), 0);
        view.mark_ready();
        assert_eq!(view.emulator().focus_count(), 1);
        assert_eq!(view.state(), ViewState::Active);
    }

    #[test]
    fn test_input_dropped_until_ready() {
        let (mut view, mut host, _) = open_view();
        host.drain();

        assert!(!view.forward_input("ls\r"));
        assert!(host.drain().is_empty());

        view.mark_ready();
        assert!(view.forward_input("ls\r"));
        assert_eq!(
            host.drain(),
            vec![UiToHost::Keystroke {
                id: view.id(),
                bytes: "ls\r".to_string()
            }]
        );
    }

    #[test]
    fn test_resize_requires_subscription_and_readiness() {
        let (mut view, mut host, observer) = open_view();
        host.drain();
        let dims = Dimensions::new(40, 120);

        assert!(!view.pane_resized(dims));

        view.set_active(true, true, &observer);
        assert!(view.has_resize_subscription());
        assert!(view.pane_resized(dims));
        assert_eq!(view.emulator().dimensions(), dims);
        assert!(host.drain().is_empty());

        view.mark_ready();
        view.pane_resized(Dimensions::new(30, 100));
        assert_eq!(
            host.drain(),
            vec![
                UiToHost::Resize {
                    id: view.id(),
                    cols: 120,
                    rows: 40
                },
                UiToHost::Resize {
                    id: view.id(),
                    cols: 100,
                    rows: 30
                },
            ]
        );
    }

    #[test]
    fn test_resize_before_ready_reaches_host_once() {
        let (mut view, mut host, observer) = open_view();
        view.set_active(true, true, &observer);
        host.drain();

        view.pane_resized(Dimensions::new(40, 120));
        view.pane_resized(Dimensions::new(50, 132));
        assert!(host.drain().is_empty());

        view.mark_ready();
        assert_eq!(
            host.drain(),
            vec![UiToHost::Resize {
                id: view.id(),
                cols: 132,
                rows: 50
            }]
        );
        assert!(!view.mark_ready());
        assert!(host.drain().is_empty());
    }

    #[test]
    fn test_ready_without_resize_sends_nothing() {
        let (mut view, mut host, observer) = open_view();
        view.set_active(true, true, &observer);
        host.drain();

        view.mark_ready();
        assert!(host.drain().is_empty());
    }

    #[test]
    fn test_subscription_only_on_visible_page() {
        let (mut view, _host, observer) = open_view();
        view.set_active(true, false, &observer);
        assert!(!view.has_resize_subscription());
        view.set_active(true, true, &observer);
        assert_eq!(observer.live_subscriptions(), 1);
        view.set_active(false, true, &observer);
        assert_eq!(observer.live_subscriptions(), 0);
    }

    #[test]
    fn test_user_close_sends_remove_once() {
        let (mut view, mut host, observer) = open_view();
        view.set_active(true, true, &observer);
        host.drain();

        assert!(view.close(CloseReason::User));
        assert!(!view.close(CloseReason::User));
        assert_eq!(view.state(), ViewState::Removed);
        assert!(view.emulator().is_disposed());
        assert_eq!(observer.live_subscriptions(), 0);
        assert_eq!(host.drain(), vec![UiToHost::Remove { id: view.id() }]);
    }

    #[test]
    fn test_exit_close_does_not_send_remove() {
        let (mut view, mut host, _) = open_view();
        view.mark_ready();
        host.drain();

        assert!(view.close(CloseReason::Exited { code: 0 }));
        assert!(host.drain().is_empty());
        assert!(!view.write_output("late"));
        assert!(!view.forward_input("late"));
    }

    #[test]
    fn test_drop_releases_subscription() {
        let (mut view, _host, observer) = open_view();
        view.set_active(true, true, &observer);
        assert_eq!(observer.live_subscriptions(), 1);
        drop(view);
        assert_eq!(observer.live_subscriptions(), 0);
    }

    #[test]
    fn test_write_output_renders() {
        let (mut view, _host, _) = open_view();
        assert!(view.write_output("hello\r\n"));
        assert_eq!(view.emulator().lines(), vec!["hello", ""]);
    }
}
