use md5::{Digest, Md5};
use tls_parser::TlsCipherSuite;
use tracing::{debug, trace};

use crate::fingerprint::ja3::{JA3_CAPACITY, LIST_CAPACITY};
use crate::fingerprint::serverhello::parse_server_hello;
use crate::fingerprint::types::{Ja3Result, SegmentBuf, ServerHelloInfo};
use crate::sink::{Field, SessionSink};
use crate::worker::Worker;

const TLS13: u16 = 0x0304;

/// Compute the JA3S fingerprint from a parsed ServerHello.
///
/// JA3S format: MD5(SSLVersion,Cipher,Extensions)
///
/// The version is the legacy ServerHello version, and extensions are kept
/// unfiltered in wire order. `None` if the hello had no cipher or the
/// extension list outgrew its accumulator.
pub fn compute_ja3s(info: &ServerHelloInfo) -> Option<Ja3Result> {
    let cipher = info.cipher_suite?;

    let mut extensions = SegmentBuf::with_capacity(LIST_CAPACITY);
    for e in &info.extensions {
        extensions.push(e);
    }

    let mut raw = SegmentBuf::with_capacity(JA3_CAPACITY);
    raw.push_str(&format!(
        "{},{},{}",
        info.tls_version,
        cipher,
        extensions.finish()?
    ));
    let raw_string = raw.finish()?;

    let mut hasher = Md5::new();
    hasher.update(raw_string.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Some(Ja3Result { hash, raw_string })
}

/// Display name of a TLS protocol version.
pub fn version_name(ver: u16) -> String {
    match ver {
        0x0300 => "SSLv3".to_string(),
        0x0301 => "TLSv1".to_string(),
        0x0302 => "TLSv1.1".to_string(),
        0x0303 => "TLSv1.2".to_string(),
        0x0304 => "TLSv1.3".to_string(),
        0x7f00..=0x7fff => format!("TLSv1.3-draft-{:02}", ver & 0xff),
        _ => format!("0x{:04x}", ver),
    }
}

/// IANA name of a cipher suite, or its code as `0xNNNN`.
pub fn cipher_name(id: u16) -> String {
    TlsCipherSuite::from_id(id)
        .map(|c| c.name.to_string())
        .unwrap_or_else(|| format!("0x{:04x}", id))
}

/// Dissect a ServerHello body and record version, cipher, session id,
/// JA3S and the h2 ALPN protocol in `sink`.
pub fn process_server_hello<S: SessionSink>(worker: &Worker, sink: &mut S, data: &[u8]) {
    let info = match parse_server_hello(data) {
        Ok(info) => info,
        Err(e) => {
            trace!("ServerHello skipped: {}", e);
            return;
        }
    };

    // 0x0303 may be a TLS 1.3 hello in disguise; wait for supported_versions.
    if info.tls_version != 0x0303 {
        sink.add_field(Field::Version, &version_name(info.tls_version));
    }
    if info.supported_version == Some(TLS13) {
        sink.add_field(Field::Version, &version_name(TLS13));
    } else if info.tls_version == 0x0303 {
        sink.add_field(Field::Version, &version_name(0x0303));
    }

    if let Some(id) = &info.session_id {
        sink.add_field(Field::DstSessionId, &hex::encode(id));
    }

    if info.alpn_h2 {
        sink.add_protocol("http2");
    }

    let Some(cipher) = info.cipher_suite else {
        debug!("ServerHello ended before cipher suite");
        return;
    };
    sink.add_field(Field::Cipher, &cipher_name(cipher));

    let Some(ja3s) = compute_ja3s(&info) else {
        debug!("JA3S accumulator overflow, no JA3S");
        return;
    };

    if worker.config.ja3_strings {
        sink.add_field(Field::Ja3sString, &ja3s.raw_string);
    }
    if worker.config.debug > 1 {
        debug!("JA3s: {} => {}", ja3s.raw_string, ja3s.hash);
    }
    sink.add_field(Field::Ja3s, &ja3s.hash);
}
