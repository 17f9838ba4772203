use md5::{Digest, Md5};
use tracing::{debug, trace};

use crate::fingerprint::clienthello::parse_client_hello;
use crate::fingerprint::grease::is_grease_u16;
use crate::fingerprint::types::{ClientHelloInfo, Ja3Result, SegmentBuf};
use crate::sink::{Field, SessionSink};
use crate::worker::Worker;

pub(crate) const JA3_CAPACITY: usize = 30000;
pub(crate) const LIST_CAPACITY: usize = 10000;
const POINT_FORMAT_CAPACITY: usize = 1000;

/// Compute the JA3 fingerprint from a parsed ClientHello.
///
/// JA3 format: MD5(SSLVersion,Ciphers,Extensions,EllipticCurves,EcPointFormats)
///
/// - Fields separated by commas
/// - Values within each field separated by dashes
/// - GREASE values filtered from all fields
/// - All values in decimal
///
/// Returns `None` if the hello was malformed or a segment outgrew its
/// accumulator.
pub fn compute_ja3(info: &ClientHelloInfo) -> Option<Ja3Result> {
    if info.malformed.is_some() {
        return None;
    }

    let mut ciphers = SegmentBuf::with_capacity(JA3_CAPACITY);
    for c in info.cipher_suites.iter().filter(|c| !is_grease_u16(**c)) {
        ciphers.push(c);
    }

    let mut extensions = SegmentBuf::with_capacity(LIST_CAPACITY);
    for e in info.extensions.iter().filter(|e| !is_grease_u16(**e)) {
        extensions.push(e);
    }

    let mut curves = SegmentBuf::with_capacity(LIST_CAPACITY);
    for g in info.elliptic_curves.iter().filter(|g| !is_grease_u16(**g)) {
        curves.push(g);
    }

    let mut point_formats = SegmentBuf::with_capacity(POINT_FORMAT_CAPACITY);
    for f in &info.ec_point_formats {
        point_formats.push(f);
    }

    let mut raw = SegmentBuf::with_capacity(JA3_CAPACITY);
    raw.push_str(&format!(
        "{},{},{},{},{}",
        info.tls_version,
        ciphers.finish()?,
        extensions.finish()?,
        curves.finish()?,
        point_formats.finish()?
    ));
    let raw_string = raw.finish()?;

    let mut hasher = Md5::new();
    hasher.update(raw_string.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Some(Ja3Result { hash, raw_string })
}

/// Dissect a ClientHello handshake message (starting at its handshake
/// header) and record session id, SNI and JA3 in `sink`.
pub fn process_client_hello<S: SessionSink>(worker: &Worker, sink: &mut S, data: &[u8]) {
    let info = match parse_client_hello(data) {
        Ok(info) => info,
        Err(e) => {
            trace!("ClientHello skipped: {}", e);
            return;
        }
    };

    if let Some(id) = &info.session_id {
        sink.add_field(Field::SrcSessionId, &hex::encode(id));
    }
    for host in &info.server_names {
        sink.add_field(Field::Host, host);
    }

    if let Some(what) = info.malformed {
        debug!("ClientHello {} malformed, no JA3", what);
        return;
    }

    let Some(ja3) = compute_ja3(&info) else {
        debug!("JA3 accumulator overflow, no JA3");
        return;
    };

    if worker.config.ja3_strings {
        sink.add_field(Field::Ja3String, &ja3.raw_string);
    }
    if worker.config.debug > 1 {
        debug!("JA3: {} => {}", ja3.raw_string, ja3.hash);
    }
    sink.add_field(Field::Ja3, &ja3.hash);
}
