use std::fmt::{self, Write};

/// Fields of a ClientHello needed for JA3, in wire order.
///
/// GREASE values are kept here and filtered when the fingerprint is built.
#[derive(Debug, Clone, Default)]
pub struct ClientHelloInfo {
    /// Version from the ClientHello body (e.g. 0x0303 for TLS 1.2)
    pub tls_version: u16,
    /// Session id bytes, when non-empty and fully present
    pub session_id: Option<Vec<u8>>,
    /// Cipher suite values
    pub cipher_suites: Vec<u16>,
    /// Extension type codes
    pub extensions: Vec<u16>,
    /// Supported groups / named curves (extension 0x000a)
    pub elliptic_curves: Vec<u16>,
    /// EC point format values (extension 0x000b)
    pub ec_point_formats: Vec<u8>,
    /// Server Name Indication host names whose lengths were self-consistent
    pub server_names: Vec<String>,
    /// Set when a nested list overran its container; no JA3 is built then.
    pub malformed: Option<&'static str>,
}

/// Fields of a ServerHello needed for JA3S.
#[derive(Debug, Clone, Default)]
pub struct ServerHelloInfo {
    /// Legacy version from the ServerHello body
    pub tls_version: u16,
    /// Session id bytes (SSLv3 to TLS 1.2 only)
    pub session_id: Option<Vec<u8>>,
    /// Selected cipher suite, absent if the message ended before it
    pub cipher_suite: Option<u16>,
    /// Extension type codes, wire order, unfiltered
    pub extensions: Vec<u16>,
    /// Value of a two-byte supported_versions extension (0x002b)
    pub supported_version: Option<u16>,
    /// ALPN selected exactly "h2"
    pub alpn_h2: bool,
}

/// Result of a JA3 or JA3S fingerprint computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ja3Result {
    /// 32-character MD5 hex hash
    pub hash: String,
    /// The raw string before hashing
    pub raw_string: String,
}

/// Fixed-capacity string builder for fingerprint segments.
///
/// Writes that would exceed the capacity are refused and latch an overflow
/// flag; the buffer never grows past `cap` bytes.
#[derive(Debug, Clone)]
pub struct SegmentBuf {
    buf: String,
    cap: usize,
    overflow: bool,
}

impl SegmentBuf {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: String::new(),
            cap,
            overflow: false,
        }
    }

    /// Append `value`, preceded by `-` unless this is the first item.
    pub fn push<T: fmt::Display>(&mut self, value: T) -> bool {
        let mut item = String::new();
        if !self.buf.is_empty() {
            item.push('-');
        }
        let _ = write!(item, "{}", value);
        self.push_str(&item)
    }

    /// Append `s` verbatim.
    pub fn push_str(&mut self, s: &str) -> bool {
        if self.overflow || self.buf.len() + s.len() > self.cap {
            self.overflow = true;
            return false;
        }
        self.buf.push_str(s);
        true
    }

    pub fn is_overflowed(&self) -> bool {
        self.overflow
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// The built string, or `None` if any write was refused.
    pub fn finish(self) -> Option<String> {
        if self.overflow {
            None
        } else {
            Some(self.buf)
        }
    }
}
