use std::fmt::Write;

use tracing::{debug, trace};

use crate::cert::extract::parse_certificate;
use crate::cert::CertInfo;
use crate::cursor::Cursor;
use crate::sink::SessionSink;
use crate::worker::Worker;

pub const TAG_SELF_SIGNED: &str = "cert:self-signed";
pub const TAG_BAD_ALT_NAME: &str = "bad-altname";

/// Render a SHA-1 digest as `aa:bb:...:tt` (59 characters).
pub fn hash_hex(digest: &[u8; 20]) -> String {
    let mut out = String::with_capacity(59);
    for (i, b) in digest.iter().enumerate() {
        if i > 0 {
            out.push(':');
        }
        let _ = write!(out, "{:02x}", b);
    }
    out
}

/// Same single CN on both sides, and either no O on either side or the
/// same single O. Not meaningful for CA certificates.
fn looks_self_signed(info: &CertInfo) -> bool {
    if info.is_ca {
        return false;
    }
    let (issuer, subject) = (&info.issuer, &info.subject);

    let org_match = match (issuer.org_name.as_slice(), subject.org_name.as_slice()) {
        ([], []) => true,
        ([a], [b]) => a.value == b.value,
        _ => false,
    };
    let cn_match = match (issuer.common_name.as_slice(), subject.common_name.as_slice()) {
        ([a], [b]) => a.value == b.value,
        _ => false,
    };
    org_match && cn_match
}

/// Dissect a Certificate handshake body and hand each decoded certificate
/// to `sink`.
///
/// A certificate whose TBSCertificate spine is truncated ends processing of
/// the whole chain.
pub fn process_certificate_chain<S: SessionSink>(worker: &mut Worker, sink: &mut S, data: &[u8]) {
    let mut chain = Cursor::new(data);
    chain.skip(3);

    while chain.remaining() > 3 {
        let declared = chain.read_u24().unwrap_or(0) as usize;
        let der = chain.sub_clamped(declared).rest();

        let digest = worker.sha1(der);

        let parsed = match parse_certificate(worker.oids(), der) {
            Ok(parsed) => parsed,
            Err(e) => {
                if worker.config.debug > 0 {
                    debug!("{} - {}", e, der.len());
                }
                break;
            }
        };

        if parsed.bad_alt_name {
            sink.add_tag(TAG_BAD_ALT_NAME);
        }

        let mut info = parsed.info;
        info.hash = hash_hex(&digest);

        if !sink.has_certs() && looks_self_signed(&info) {
            sink.add_tag(TAG_SELF_SIGNED);
        }

        let weight = der.len() * 2;
        if !sink.add_cert(info, weight) {
            trace!("duplicate certificate dropped");
        }
    }
}
