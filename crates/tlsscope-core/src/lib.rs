//! Passive TLS handshake dissection.
//!
//! Feed reassembled stream bytes through [`dissect::TlsStream`] and collect
//! JA3/JA3S fingerprints, negotiated parameters and certificate-chain
//! metadata in any [`sink::SessionSink`].

pub mod asn1;
pub mod cert;
pub mod config;
pub mod cursor;
pub mod dissect;
pub mod fingerprint;
pub mod sink;
pub mod worker;

#[cfg(test)]
mod testutil;

pub use config::Config;
pub use dissect::{Direction, FeedResult, TlsStream};
pub use sink::{Field, SessionFields, SessionSink};
pub use worker::Worker;
