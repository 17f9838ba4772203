//! Record-layer demultiplexing for one TLS session.
//!
//! The ClientHello is dissected from the chunk that classifies the session;
//! everything after that comes from the server direction, accumulated into
//! whole records and handed to the handshake dispatcher until the server's
//! cleartext flight ends.

pub mod handshake;

use serde::Serialize;
use tracing::{debug, trace};

use crate::fingerprint::ja3::process_client_hello;
use crate::sink::SessionSink;
use crate::worker::Worker;

use handshake::{process_server_records, HANDSHAKE_CLIENT_HELLO, HANDSHAKE_SERVER_HELLO};

pub const BUFFER_CAPACITY: usize = 8192;
pub const RECORD_HEADER_LEN: usize = 5;
pub const CONTENT_TYPE_HANDSHAKE: u8 = 0x16;
pub const PROTOCOL_TLS: &str = "tls";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Client,
    Server,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Client => Direction::Server,
            Direction::Server => Direction::Client,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Client => f.write_str("client"),
            Direction::Server => f.write_str("server"),
        }
    }
}

/// Outcome of handing a chunk to a `TlsStream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedResult {
    /// Chunk belongs to the direction we are not watching.
    Ignored,
    /// Waiting for more bytes.
    Pending,
    /// The stream has stopped watching and will not look at more data.
    Detached,
}

/// Per-session accumulation state for the watched direction.
pub struct TlsStream {
    buf: Box<[u8; BUFFER_CAPACITY]>,
    len: usize,
    /// Bytes that arrived while the buffer was full.
    dropped: usize,
    direction: Direction,
    detached: bool,
}

impl TlsStream {
    fn new(direction: Direction) -> Self {
        Self {
            buf: Box::new([0u8; BUFFER_CAPACITY]),
            len: 0,
            dropped: 0,
            direction,
            detached: false,
        }
    }

    /// Look at the first chunk of a direction and attach if it opens a TLS
    /// handshake.
    ///
    /// A ClientHello is dissected right here and the stream watches the
    /// opposite direction; a ServerHello makes it watch this one. Returns
    /// `None` when the bytes are not a handshake or the session is already
    /// marked as TLS.
    pub fn classify<S: SessionSink>(
        worker: &Worker,
        sink: &mut S,
        direction: Direction,
        data: &[u8],
    ) -> Option<Self> {
        if data.len() < 6 || data[0] != CONTENT_TYPE_HANDSHAKE || data[2] > 0x03 {
            return None;
        }
        if sink.has_protocol(PROTOCOL_TLS) {
            return None;
        }

        let watched = match data[5] {
            HANDSHAKE_CLIENT_HELLO => direction.opposite(),
            HANDSHAKE_SERVER_HELLO => direction,
            _ => return None,
        };
        sink.add_protocol(PROTOCOL_TLS);

        if data[5] == HANDSHAKE_CLIENT_HELLO {
            let declared = usize::from(u16::from_be_bytes([data[3], data[4]]));
            let len = declared.min(data.len() - RECORD_HEADER_LEN);
            process_client_hello(worker, sink, &data[RECORD_HEADER_LEN..RECORD_HEADER_LEN + len]);
        }

        debug!("TLS session classified from {}, watching {}", direction, watched);
        Some(Self::new(watched))
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Bytes currently held in the accumulation buffer.
    pub fn buffered(&self) -> usize {
        self.len
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn detach(&mut self) {
        self.len = 0;
        self.detached = true;
    }

    /// Accumulate a chunk and dissect every complete record it finishes.
    pub fn feed<S: SessionSink>(
        &mut self,
        worker: &mut Worker,
        sink: &mut S,
        direction: Direction,
        data: &[u8],
    ) -> FeedResult {
        if self.detached {
            return FeedResult::Detached;
        }
        if direction != self.direction {
            return FeedResult::Ignored;
        }

        let n = data.len().min(BUFFER_CAPACITY - self.len);
        self.buf[self.len..self.len + n].copy_from_slice(&data[..n]);
        self.len += n;
        if n < data.len() {
            self.dropped += data.len() - n;
            trace!("accumulation buffer full, {} bytes dropped", data.len() - n);
        }

        loop {
            if self.len < RECORD_HEADER_LEN {
                return FeedResult::Pending;
            }
            if self.buf[0] != CONTENT_TYPE_HANDSHAKE {
                trace!("content type {:#04x}, detaching", self.buf[0]);
                self.detach();
                return FeedResult::Detached;
            }

            let need = usize::from(u16::from_be_bytes([self.buf[3], self.buf[4]])) + RECORD_HEADER_LEN;
            if need > self.len {
                return FeedResult::Pending;
            }

            if process_server_records(worker, sink, &self.buf[RECORD_HEADER_LEN..need]) {
                self.detach();
                return FeedResult::Detached;
            }

            self.buf.copy_within(need..self.len, 0);
            self.len -= need;
        }
    }

    /// Session teardown: dissect whatever partial record is still buffered,
    /// once.
    pub fn finish<S: SessionSink>(&mut self, worker: &mut Worker, sink: &mut S) {
        if !self.detached && self.len >= RECORD_HEADER_LEN && self.buf[0] == CONTENT_TYPE_HANDSHAKE {
            debug!("salvaging {} buffered bytes at teardown", self.len);
            process_server_records(worker, sink, &self.buf[RECORD_HEADER_LEN..self.len]);
        }
        self.detach();
    }
}
