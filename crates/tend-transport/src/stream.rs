//! JSON-lines bridge between a byte stream and a transport endpoint.
//!
//! Typically the UI side wraps the host child's stdout/stdin with
//! [`connect_ui`], and a host wraps its own stdin/stdout with
//! [`connect_host`].

use std::fmt::Debug;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::channel::{Endpoint, HostEndpoint, Sender, UiEndpoint};
use crate::message::WireMessage;

/// Bridge a host's output stream and input stream into a UI endpoint.
///
/// Must be called from within a tokio runtime.
pub fn connect_ui<R, W>(reader: R, writer: W) -> UiEndpoint
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    bridge(reader, writer)
}

/// Bridge the UI's output stream and input stream into a host endpoint.
///
/// Must be called from within a tokio runtime.
pub fn connect_host<R, W>(reader: R, writer: W) -> HostEndpoint
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    bridge(reader, writer)
}

fn bridge<Out, In, R, W>(reader: R, writer: W) -> Endpoint<Out, In>
where
    Out: WireMessage + Debug + Send + 'static,
    In: WireMessage + Send + 'static,
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (out_tx, out_rx) = mpsc::unbounded_channel::<Out>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<In>();

    tokio::spawn(write_lines(writer, out_rx));
    tokio::spawn(read_lines(reader, in_tx));

    Endpoint::new(Sender::new(out_tx), in_rx)
}

async fn write_lines<W, M>(mut writer: W, mut outgoing: mpsc::UnboundedReceiver<M>)
where
    W: AsyncWrite + Unpin,
    M: WireMessage,
{
    while let Some(message) = outgoing.recv().await {
        let mut line = match message.encode() {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to encode outgoing message: {}", e);
                continue;
            }
        };
        line.push('\n');

        if let Err(e) = writer.write_all(line.as_bytes()).await {
            warn!("Transport write failed, closing: {}", e);
            break;
        }
        if let Err(e) = writer.flush().await {
            warn!("Transport flush failed, closing: {}", e);
            break;
        }
    }
    debug!("Transport writer stopped");
}

async fn read_lines<R, M>(reader: R, incoming: mpsc::UnboundedSender<M>)
where
    R: AsyncRead + Unpin,
    M: WireMessage,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => {
                info!("Transport peer closed the stream");
                break;
            }
            Ok(_) => {
                let line = match std::str::from_utf8(&buf) {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Dropping line that is not UTF-8: {}", e);
                        continue;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match M::decode(line) {
                    Ok(message) => {
                        if incoming.send(message).is_err() {
                            debug!("Transport receiver dropped, stopping reader");
                            break;
                        }
                    }
                    Err(e) => warn!("Dropping undecodable line: {}", e),
                }
            }
            Err(e) => {
                warn!("Transport read failed, closing: {}", e);
                break;
            }
        }
    }
}
