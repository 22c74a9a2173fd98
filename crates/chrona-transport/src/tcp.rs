//! TCP transport implementation

use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

use chrona_core::{DecodeError, DecodeErrorKind};
use chrona_wire::Packet;

/// Well-known server port for the reference deployment.
pub const DEFAULT_PORT: u16 = 7401;

/// Transport failures. A failed read or write drops the current message
/// cycle; the connection is only torn down at explicit shutdown or when the
/// peer goes away.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport error: {0}")]
    Io(#[from] io::Error),

    /// Malformed framing, including a frame cut short by the peer closing
    /// mid-frame (the "too few bytes" condition).
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The peer closed the connection at a frame boundary.
    #[error("connection closed by peer")]
    ConnectionClosed,
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Read one framed packet field by field: u64 stamp length, stamp bytes,
/// u64 payload length, payload bytes (all lengths big-endian).
///
/// EOF before the first length byte is a clean close; EOF anywhere later is
/// a frame the peer abandoned half-way through.
async fn read_frame_from<R>(reader: &mut R) -> TransportResult<Packet>
where
    R: AsyncRead + Unpin,
{
    let stamp_len = read_len(reader, true).await?;
    if stamp_len == 0 {
        return Err(DecodeError::new(DecodeErrorKind::EmptyTimestamp).into());
    }
    let stamp = read_region(reader, stamp_len).await?;

    let payload_len = read_len(reader, false).await?;
    if payload_len == 0 {
        return Err(DecodeError::new(DecodeErrorKind::EmptyPayload).into());
    }
    let payload = read_region(reader, payload_len).await?;

    Ok(Packet::new(&stamp, &payload))
}

async fn read_len<R>(reader: &mut R, at_boundary: bool) -> TransportResult<u64>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 8];
    match reader.read_exact(&mut buf).await {
        Ok(_) => Ok(u64::from_be_bytes(buf)),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            if at_boundary {
                Err(TransportError::ConnectionClosed)
            } else {
                Err(DecodeError::new(DecodeErrorKind::PacketTruncated).into())
            }
        }
        Err(err) => Err(err.into()),
    }
}

async fn read_region<R>(reader: &mut R, len: u64) -> TransportResult<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; len as usize];
    match reader.read_exact(&mut buf).await {
        Ok(_) => Ok(buf),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            Err(DecodeError::new(DecodeErrorKind::PacketTruncated).into())
        }
        Err(err) => Err(err.into()),
    }
}

/// Serialize `packet` and write it in one call.
async fn write_frame_to<W>(writer: &mut W, packet: &Packet) -> TransportResult<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&packet.serialize_to_binary()).await?;
    Ok(())
}

/// A connected TCP stream carrying framed packets.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Connection {
    /// Connect to a server.
    pub async fn connect(addr: SocketAddr) -> TransportResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        let peer = stream.peer_addr()?;
        tracing::debug!(%peer, "connected");
        Ok(Connection { stream, peer })
    }

    #[inline]
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub async fn read_frame(&mut self) -> TransportResult<Packet> {
        read_frame_from(&mut self.stream).await
    }

    pub async fn send_frame(&mut self, packet: &Packet) -> TransportResult<()> {
        write_frame_to(&mut self.stream, packet).await
    }

    /// Split into independently owned read and write halves, so one task can
    /// wait for inbound frames while another arm sends.
    pub fn into_split(self) -> (FrameReader, FrameWriter) {
        let peer = self.peer;
        let (read, write) = self.stream.into_split();
        (FrameReader { half: read, peer }, FrameWriter { half: write, peer })
    }
}

/// Read half of a [`Connection`].
pub struct FrameReader {
    half: OwnedReadHalf,
    peer: SocketAddr,
}

impl FrameReader {
    #[inline]
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub async fn read_frame(&mut self) -> TransportResult<Packet> {
        read_frame_from(&mut self.half).await
    }
}

/// Write half of a [`Connection`].
pub struct FrameWriter {
    half: OwnedWriteHalf,
    peer: SocketAddr,
}

impl FrameWriter {
    #[inline]
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub async fn send_frame(&mut self, packet: &Packet) -> TransportResult<()> {
        write_frame_to(&mut self.half, packet).await
    }
}

/// A listening socket. Connections are accepted unboundedly; limiting them
/// is the caller's concern, not the transport's.
pub struct Acceptor {
    listener: TcpListener,
    local: SocketAddr,
}

impl Acceptor {
    /// Bind to a local address. Use port 0 to let the OS pick one.
    pub async fn bind(addr: SocketAddr) -> TransportResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local = listener.local_addr()?;
        tracing::debug!(%local, "listening");
        Ok(Acceptor { listener, local })
    }

    #[inline]
    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    pub async fn accept(&self) -> TransportResult<Connection> {
        let (stream, peer) = self.listener.accept().await?;
        tracing::debug!(%peer, "accepted");
        Ok(Connection { stream, peer })
    }
}
