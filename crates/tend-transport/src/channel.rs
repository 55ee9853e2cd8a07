//! In-process message channel.
//!
//! Both directions are unbounded tokio mpsc queues: sending never blocks the
//! caller, and a single FIFO queue per direction keeps messages about any one
//! session in the order they were sent.

use std::fmt::Debug;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use tend_core::{Error, Result};

use crate::message::{HostToUi, UiToHost};

/// Cloneable sending half of one direction.
#[derive(Debug)]
pub struct Sender<M> {
    tx: mpsc::UnboundedSender<M>,
}

impl<M> Clone for Sender<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M: Debug> Sender<M> {
    pub(crate) fn new(tx: mpsc::UnboundedSender<M>) -> Self {
        Self { tx }
    }

    /// Queue a message without blocking.
    ///
    /// Fails with [`Error::TransportClosed`] once the other side is gone; the
    /// message is lost.
    pub fn send(&self, message: M) -> Result<()> {
        trace!("Transport send: {:?}", message);
        self.tx.send(message).map_err(|e| {
            debug!("Transport closed, dropping {:?}", e.0);
            Error::TransportClosed
        })
    }

    /// Whether the receiving side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// One end of the transport: sends `Out`, receives `In`.
#[derive(Debug)]
pub struct Endpoint<Out, In> {
    sender: Sender<Out>,
    incoming: mpsc::UnboundedReceiver<In>,
}

impl<Out: Debug, In> Endpoint<Out, In> {
    pub(crate) fn new(sender: Sender<Out>, incoming: mpsc::UnboundedReceiver<In>) -> Self {
        Self { sender, incoming }
    }

    /// A sending handle that can be shared with other components.
    pub fn sender(&self) -> Sender<Out> {
        self.sender.clone()
    }

    /// Send a message without blocking.
    pub fn send(&self, message: Out) -> Result<()> {
        self.sender.send(message)
    }

    /// Wait for the next incoming message; `None` once the peer is gone.
    pub async fn recv(&mut self) -> Option<In> {
        self.incoming.recv().await
    }

    /// Take an already delivered message, if any.
    pub fn try_recv(&mut self) -> Option<In> {
        self.incoming.try_recv().ok()
    }

    /// Drain every message delivered so far.
    pub fn drain(&mut self) -> Vec<In> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

/// Sending handle held by the UI side.
pub type UiSender = Sender<UiToHost>;

/// The UI process end.
pub type UiEndpoint = Endpoint<UiToHost, HostToUi>;

/// The host process end.
pub type HostEndpoint = Endpoint<HostToUi, UiToHost>;

/// Create a connected pair of endpoints in this process.
pub fn channel_pair() -> (UiEndpoint, HostEndpoint) {
    let (to_host_tx, to_host_rx) = mpsc::unbounded_channel();
    let (to_ui_tx, to_ui_rx) = mpsc::unbounded_channel();

    let ui = Endpoint::new(Sender::new(to_host_tx), to_ui_rx);
    let host = Endpoint::new(Sender::new(to_ui_tx), to_host_rx);
    (ui, host)
}
