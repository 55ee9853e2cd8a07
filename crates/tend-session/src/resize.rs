//! Pane resize subscriptions.
//!
//! Only the active session of the visible page listens for pane size
//! changes. The observer counts live subscriptions so that bound can be
//! checked at runtime.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::trace;

use tend_core::SessionId;

/// Hands out resize subscriptions and counts the live ones.
#[derive(Debug, Clone, Default)]
pub struct ResizeObserver {
    live: Arc<AtomicUsize>,
}

impl ResizeObserver {
    /// Create an observer with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a session's pane. The subscription ends when the token drops.
    pub fn subscribe(&self, id: SessionId) -> ResizeSubscription {
        self.live.fetch_add(1, Ordering::SeqCst);
        trace!("Resize subscription opened for {}", id);
        ResizeSubscription {
            id,
            live: Arc::clone(&self.live),
        }
    }

    /// Number of subscriptions currently held.
    pub fn live_subscriptions(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// A live resize subscription.
#[derive(Debug)]
pub struct ResizeSubscription {
    id: SessionId,
    live: Arc<AtomicUsize>,
}

impl ResizeSubscription {
    /// The subscribed session.
    pub fn session_id(&self) -> SessionId {
        self.id
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        trace!("Resize subscription closed for {}", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriptions_are_counted() {
        let observer = ResizeObserver::new();
        assert_eq!(observer.live_subscriptions(), 0);

        let id = SessionId::new();
        let a = observer.subscribe(id);
        let b = observer.clone().subscribe(SessionId::new());
        assert_eq!(observer.live_subscriptions(), 2);
        assert_eq!(a.session_id(), id);

        drop(a);
        assert_eq!(observer.live_subscriptions(), 1);
        drop(b);
        assert_eq!(observer.live_subscriptions(), 0);
    }
}
