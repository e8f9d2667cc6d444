//! Blocking transport to the relay.
//!
//! The game client is single-threaded cooperative, so network calls ride the
//! frame loop: `call` is a blocking round trip, `cast` writes a frame and
//! walks away. Socket timeouts bound every operation by roughly a frame
//! budget so a stalled relay costs a skipped sync tick, not a frozen client.
//!
//! A failed round trip leaves the socket desynchronized: a late response may
//! still be in flight, or a header was only partially read. The client marks
//! itself desynced and replaces the socket before the next operation, so a
//! stale response can never be paired with a later request.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use thiserror::Error;

use shared::{
    decode_payload, encode_frame, parse_header, FrameKind, ProtocolError, Request, Response,
    HEADER_LEN,
};

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("could not resolve relay address '{0}'")]
    Unresolvable(String),

    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

pub struct RpcClient {
    stream: TcpStream,
    addr: SocketAddr,
    timeout: Duration,
    desynced: bool,
}

impl RpcClient {
    /// Connects to the relay and arms both socket timeouts.
    pub fn connect(addr: &str, timeout: Duration) -> Result<RpcClient, RpcError> {
        let socket_addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| RpcError::Unresolvable(addr.to_string()))?;
        let stream = Self::open(&socket_addr, timeout)?;
        Ok(RpcClient { stream, addr: socket_addr, timeout, desynced: false })
    }

    fn open(addr: &SocketAddr, timeout: Duration) -> Result<TcpStream, std::io::Error> {
        let stream = TcpStream::connect_timeout(addr, timeout)?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        Ok(stream)
    }

    /// Replaces a desynchronized socket. Dropping the old stream discards
    /// whatever unread bytes it still carried.
    fn resync(&mut self) -> Result<(), RpcError> {
        if self.desynced {
            self.stream = Self::open(&self.addr, self.timeout)?;
            self.desynced = false;
        }
        Ok(())
    }

    /// Blocking request/response round trip. Any transport failure poisons
    /// the socket; the next operation reconnects before touching the wire.
    pub fn call(&mut self, request: &Request) -> Result<Response, RpcError> {
        self.resync()?;
        let frame = encode_frame(FrameKind::Call, request)?;
        match self.round_trip(&frame) {
            Ok(response) => Ok(response),
            Err(err) => {
                self.desynced = true;
                Err(err)
            }
        }
    }

    fn round_trip(&mut self, frame: &[u8]) -> Result<Response, RpcError> {
        self.stream.write_all(frame)?;

        let mut header = [0u8; HEADER_LEN];
        self.stream.read_exact(&mut header)?;
        let (_, len) = parse_header(&header)?;
        let mut payload = vec![0u8; len];
        self.stream.read_exact(&mut payload)?;
        Ok(decode_payload(&payload)?)
    }

    /// Fire-and-forget write. On a dead relay this fails fast (or silently
    /// drops in the kernel buffer); either way the frame loop moves on.
    pub fn cast(&mut self, request: &Request) -> Result<(), RpcError> {
        self.resync()?;
        let frame = encode_frame(FrameKind::Cast, request)?;
        self.stream.write_all(&frame)?;
        Ok(())
    }
}
