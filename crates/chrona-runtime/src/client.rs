//! The requesting actor
//!
//! On connect, the client starts a fixed-period timer. Every period it runs
//! the send path with the request token; framed responses are forwarded by a
//! reader task through a channel and run the receive path. The exchange task
//! is the only code that touches the endpoint, so every send and receive
//! event is serialized.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use chrona_core::ActorId;
use chrona_protocol::{Endpoint, REQUEST_PAYLOAD};
use chrona_transport::{Connection, FrameReader, FrameWriter, TransportError, TransportResult};
use chrona_wire::Packet;

use crate::{log_info, ClientConfig, EventLog};

/// Channel depth between the connection reader and the exchange task.
const RESPONSE_QUEUE_DEPTH: usize = 16;

/// The client actor. Owns its endpoint for its entire runtime.
pub struct Client {
    actor: ActorId,
    config: ClientConfig,
    log: Arc<EventLog>,
    tasks: Vec<JoinHandle<()>>,
}

impl Client {
    pub fn new(actor: ActorId, config: ClientConfig, log: Arc<EventLog>) -> Self {
        Client {
            actor,
            config,
            log,
            tasks: Vec::new(),
        }
    }

    #[inline]
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Connect to the server and start the request timer. The first request
    /// goes out one full period after connecting.
    pub async fn connect(&mut self) -> TransportResult<()> {
        let conn = Connection::connect(self.config.server_addr).await?;
        let (reader, writer) = conn.into_split();

        let (tx, rx) = mpsc::channel(RESPONSE_QUEUE_DEPTH);
        self.tasks.push(tokio::spawn(read_loop(reader, tx)));
        self.tasks.push(tokio::spawn(run_exchange(
            Endpoint::new(self.actor),
            rx,
            writer,
            Arc::clone(&self.log),
            self.config.request_interval,
        )));

        Ok(())
    }

    /// Tear the connection down, aborting any in-flight read.
    pub fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Forward every framed response; the connection survives malformed frames,
/// only a close or a socket failure ends the loop.
async fn read_loop(mut reader: FrameReader, tx: mpsc::Sender<Packet>) {
    loop {
        match reader.read_frame().await {
            Ok(packet) => {
                if tx.send(packet).await.is_err() {
                    return;
                }
            }
            Err(TransportError::ConnectionClosed) => {
                tracing::debug!("server closed the connection");
                return;
            }
            Err(TransportError::Io(err)) => {
                // The socket itself failed; no more frames will come.
                tracing::warn!(%err, "client connection failed");
                return;
            }
            Err(err) => {
                // Drop the cycle; the next frame resynchronizes.
                tracing::warn!(%err, "client dropped a response cycle");
            }
        }
    }
}

async fn run_exchange(
    mut endpoint: Endpoint,
    mut responses: mpsc::Receiver<Packet>,
    mut writer: FrameWriter,
    log: Arc<EventLog>,
    period: Duration,
) {
    let mut timer = time::interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = timer.tick() => {
                request_time(&mut endpoint, &mut writer, &log).await;
            }
            response = responses.recv() => {
                match response {
                    Some(packet) => handle_response(&mut endpoint, &packet, &log),
                    // Reader gone: the connection is dead.
                    None => break,
                }
            }
        }
    }
}

/// Send path: tick for the send event, envelope the request token, ship it.
async fn request_time(endpoint: &mut Endpoint, writer: &mut FrameWriter, log: &EventLog) {
    let packet = match endpoint.stamp_outgoing(REQUEST_PAYLOAD) {
        Ok(packet) => packet,
        Err(err) => {
            tracing::error!(%err, "client couldn't tick its vector timestamp");
            return;
        }
    };

    log_info!(
        log,
        endpoint.stamp(),
        endpoint.actor(),
        "SEND Client sent \"{}\" to server.",
        String::from_utf8_lossy(REQUEST_PAYLOAD)
    );

    if let Err(err) = writer.send_frame(&packet).await {
        tracing::warn!(%err, "client couldn't send packet");
    }
}

/// Receive path: tick for the receive event, merge the server's clock, and
/// log the returned time. The payload is informational only.
fn handle_response(endpoint: &mut Endpoint, packet: &Packet, log: &EventLog) {
    match endpoint.absorb(packet) {
        Ok(payload) => {
            log_info!(
                log,
                endpoint.stamp(),
                endpoint.actor(),
                "RECV Client received time from server: \"{}\".",
                String::from_utf8_lossy(&payload)
            );
        }
        Err(err) => {
            tracing::warn!(%err, "client failed to absorb incoming packet");
        }
    }
}
