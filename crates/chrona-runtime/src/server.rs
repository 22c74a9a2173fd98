//! The answering actor
//!
//! The server accepts connections without limit. Each connection gets a
//! reader task that forwards decoded frames into one mpsc channel; a single
//! service task consumes the channel, owns the endpoint, and writes replies
//! back on the originating connection. The funnel is what serializes every
//! touch of the server's vector timestamp without locking it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use chrona_core::ActorId;
use chrona_protocol::{classify_request, time_of_day_payload, Endpoint, Request};
use chrona_transport::{Acceptor, FrameReader, FrameWriter, TransportError, TransportResult};
use chrona_wire::Packet;

use crate::{log_info, EventLog, ServerConfig};

/// Channel depth between connection readers and the service task.
const EVENT_QUEUE_DEPTH: usize = 64;

enum ConnEvent {
    Opened(u64, FrameWriter),
    Frame(u64, Packet),
    Closed(u64),
}

/// The server actor. Owns its endpoint for its entire runtime.
pub struct Server {
    actor: ActorId,
    config: ServerConfig,
    log: Arc<EventLog>,
    local_addr: Option<SocketAddr>,
    tasks: Vec<JoinHandle<()>>,
}

impl Server {
    pub fn new(actor: ActorId, config: ServerConfig, log: Arc<EventLog>) -> Self {
        Server {
            actor,
            config,
            log,
            local_addr: None,
            tasks: Vec::new(),
        }
    }

    #[inline]
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// The bound address, once listening.
    #[inline]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Bind and start serving. Returns the bound address.
    pub async fn listen(&mut self) -> TransportResult<SocketAddr> {
        let acceptor = Acceptor::bind(self.config.bind_addr).await?;
        let local = acceptor.local_addr();
        self.local_addr = Some(local);

        let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);

        self.tasks.push(tokio::spawn(accept_loop(acceptor, tx)));
        self.tasks.push(tokio::spawn(serve(
            Endpoint::new(self.actor),
            rx,
            Arc::clone(&self.log),
        )));

        Ok(local)
    }

    /// Stop listening and drop every connection.
    pub fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn accept_loop(acceptor: Acceptor, tx: mpsc::Sender<ConnEvent>) {
    let mut next_id = 0u64;

    loop {
        match acceptor.accept().await {
            Ok(conn) => {
                let (reader, writer) = conn.into_split();
                let id = next_id;
                next_id += 1;

                if tx.send(ConnEvent::Opened(id, writer)).await.is_err() {
                    break; // service task gone
                }
                tokio::spawn(read_loop(id, reader, tx.clone()));
            }
            Err(err) => {
                tracing::warn!(%err, "accept failed");
            }
        }
    }
}

/// Forward every inbound frame; the connection survives malformed frames,
/// only a close ends the loop.
async fn read_loop(id: u64, mut reader: FrameReader, tx: mpsc::Sender<ConnEvent>) {
    let peer = reader.peer_addr();

    loop {
        match reader.read_frame().await {
            Ok(packet) => {
                if tx.send(ConnEvent::Frame(id, packet)).await.is_err() {
                    return;
                }
            }
            Err(TransportError::ConnectionClosed) => {
                tracing::debug!(%peer, "client disconnected");
                let _ = tx.send(ConnEvent::Closed(id)).await;
                return;
            }
            Err(TransportError::Io(err)) => {
                // The socket itself failed; no more frames will come.
                tracing::warn!(%peer, %err, "connection failed");
                let _ = tx.send(ConnEvent::Closed(id)).await;
                return;
            }
            Err(err) => {
                tracing::warn!(%peer, %err, "server dropped a request cycle");
            }
        }
    }
}

/// The single thread of control that owns the server's endpoint.
async fn serve(mut endpoint: Endpoint, mut rx: mpsc::Receiver<ConnEvent>, log: Arc<EventLog>) {
    let mut writers: HashMap<u64, FrameWriter> = HashMap::new();

    while let Some(event) = rx.recv().await {
        match event {
            ConnEvent::Opened(id, writer) => {
                writers.insert(id, writer);
            }
            ConnEvent::Closed(id) => {
                writers.remove(&id);
            }
            ConnEvent::Frame(id, packet) => {
                let Some(writer) = writers.get_mut(&id) else {
                    continue;
                };
                answer_request(&mut endpoint, &packet, writer, &log).await;
            }
        }
    }
}

/// One receive/respond cycle: tick, merge, dispatch, and on the expected
/// token tick again and reply with the time of day. Every failure drops the
/// cycle; the connection stays open.
async fn answer_request(
    endpoint: &mut Endpoint,
    packet: &Packet,
    writer: &mut FrameWriter,
    log: &EventLog,
) {
    let payload = match endpoint.absorb(packet) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(%err, "server failed to absorb incoming packet");
            return;
        }
    };

    match classify_request(&payload) {
        Request::TimeOfDay => {}
        Request::Unexpected => {
            tracing::warn!("server received unexpected payload from client");
            return;
        }
    }

    log_info!(
        log,
        endpoint.stamp(),
        endpoint.actor(),
        "RECV Server received \"{}\".",
        String::from_utf8_lossy(&payload)
    );

    let response_payload = time_of_day_payload(SystemTime::now());
    let response = match endpoint.stamp_outgoing(&response_payload) {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(%err, "server couldn't tick own clock for send event");
            return;
        }
    };

    log_info!(
        log,
        endpoint.stamp(),
        endpoint.actor(),
        "SENT Server sent \"{}\".",
        String::from_utf8_lossy(&response_payload)
    );

    if let Err(err) = writer.send_frame(&response).await {
        tracing::warn!(%err, "server couldn't write response to client");
    }
}
