//! Connection Handler
//!
//! One TCP connection per request: connect, write the message in chunks,
//! read until the store closes, close.

use std::io::{self, Read};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use bytes::BytesMut;

use crate::config::{Config, EndOfResponse};
use crate::error::{ChipmunkError, Result};
use crate::protocol::{write_chunked, Response};

/// A single request/response exchange with the store
///
/// The value owns the socket. `receive` consumes it, so the stream is closed
/// on every path out of a call, including early returns on error.
pub struct Connection {
    /// TCP stream to the store
    stream: TcpStream,

    /// Peer address for logging
    peer_addr: String,

    /// Write chunk and read buffer size
    chunk_size: usize,

    /// Bound on each read
    read_timeout: Duration,

    /// Bound on the whole receive loop
    response_timeout: Duration,

    /// Response termination rule
    end_of_response: EndOfResponse,
}

impl Connection {
    /// Connect to the configured store
    ///
    /// Tries every resolved address in turn, each bounded by the connect
    /// timeout, and reports the last failure if none accept.
    pub fn open(config: &Config) -> Result<Self> {
        let addr = config.addr();
        let addrs: Vec<SocketAddr> = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|e| {
                ChipmunkError::Connection(format!("cannot resolve {}: {}", addr, e))
            })?
            .collect();

        let mut last_err =
            io::Error::new(io::ErrorKind::AddrNotAvailable, "no address resolved");
        for socket_addr in &addrs {
            match TcpStream::connect_timeout(socket_addr, config.connect_timeout) {
                Ok(stream) => return Self::from_stream(stream, config),
                Err(e) => {
                    tracing::trace!("Connect to {} failed: {}", socket_addr, e);
                    last_err = e;
                }
            }
        }

        Err(ChipmunkError::from_io(&format!("connect to {}", addr), last_err))
    }

    /// Wrap an established stream and apply socket options
    fn from_stream(stream: TcpStream, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| config.addr());

        let setup = |e| ChipmunkError::from_io("configure socket", e);

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true).map_err(setup)?;
        stream.set_write_timeout(Some(config.write_timeout)).map_err(setup)?;

        tracing::debug!("Connected to {}", peer_addr);

        Ok(Self {
            stream,
            peer_addr,
            chunk_size: config.chunk_size,
            read_timeout: config.read_timeout,
            response_timeout: config.response_timeout,
            end_of_response: config.end_of_response,
        })
    }

    /// Connect and write `message`, returning the connection ready for reading
    pub fn send(config: &Config, message: &[u8]) -> Result<Self> {
        let mut connection = Self::open(config)?;
        connection.write_message(message)?;
        Ok(connection)
    }

    /// Write the whole message in chunks of at most `chunk_size` bytes
    ///
    /// The first failed write aborts the call.
    pub fn write_message(&mut self, message: &[u8]) -> Result<()> {
        let chunks = write_chunked(&mut self.stream, message, self.chunk_size)
            .map_err(|e| ChipmunkError::from_io(&format!("write to {}", self.peer_addr), e))?;

        tracing::trace!(
            "Sent {} bytes to {} in {} chunk(s)",
            message.len(),
            self.peer_addr,
            chunks
        );
        Ok(())
    }

    /// Read the response until the store closes the connection, then close
    ///
    /// A read returning 0 bytes means the peer closed. A read that times out
    /// fails the call, unless the connection uses `EndOfResponse::Idle`, some
    /// bytes have already arrived, and the store was silent for a full
    /// `read_timeout`; then the response is taken as complete. Running into
    /// `response_timeout` always fails, whatever the mode.
    pub fn receive(mut self) -> Result<Response> {
        let result = self.read_until_close();
        self.close();

        let bytes = result?;
        tracing::debug!("Received {} bytes from {}", bytes.len(), self.peer_addr);
        Ok(Response::new(Vec::from(bytes)))
    }

    fn read_until_close(&mut self) -> Result<BytesMut> {
        let deadline = Instant::now() + self.response_timeout;
        let mut response = BytesMut::with_capacity(self.chunk_size);
        let mut buf = vec![0u8; self.chunk_size];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(self.response_timed_out());
            }

            let bound = remaining.min(self.read_timeout);
            self.stream
                .set_read_timeout(Some(bound))
                .map_err(|e| ChipmunkError::from_io("configure socket", e))?;

            match self.stream.read(&mut buf) {
                Ok(0) => return Ok(response),
                Ok(n) => {
                    tracing::trace!("Read {} bytes from {}", n, self.peer_addr);
                    response.extend_from_slice(&buf[..n]);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => {
                    // A read cut short by the total deadline says nothing about idleness
                    if bound < self.read_timeout {
                        return Err(self.response_timed_out());
                    }
                    if self.end_of_response == EndOfResponse::Idle && !response.is_empty() {
                        tracing::trace!("{} went idle, ending response", self.peer_addr);
                        return Ok(response);
                    }
                    return Err(ChipmunkError::Timeout(format!(
                        "no data from {} within {:?}",
                        self.peer_addr, self.read_timeout
                    )));
                }
                Err(e) => {
                    return Err(ChipmunkError::from_io(
                        &format!("read from {}", self.peer_addr),
                        e,
                    ))
                }
            }
        }
    }

    fn response_timed_out(&self) -> ChipmunkError {
        ChipmunkError::Timeout(format!(
            "response from {} not complete within {:?}",
            self.peer_addr, self.response_timeout
        ))
    }

    fn close(&mut self) {
        // The socket is released when `self` drops; shutdown only signals the peer early
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            tracing::trace!("Shutdown of {} failed: {}", self.peer_addr, e);
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Read timeouts surface as `WouldBlock` on Unix and `TimedOut` on Windows
fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
