use tracing::trace;

use crate::cert::process_certificate_chain;
use crate::cursor::Cursor;
use crate::fingerprint::ja3s::process_server_hello;
use crate::sink::SessionSink;
use crate::worker::Worker;

pub const HANDSHAKE_CLIENT_HELLO: u8 = 1;
pub const HANDSHAKE_SERVER_HELLO: u8 = 2;
pub const HANDSHAKE_CERTIFICATE: u8 = 11;
/// ServerHelloDone: nothing after it is readable without keys.
pub const HANDSHAKE_SERVER_DONE: u8 = 14;

/// Walk the handshake messages inside one record body.
///
/// Returns `true` once the end of the server's cleartext flight is seen;
/// the caller should stop watching the direction.
pub fn process_server_records<S: SessionSink>(
    worker: &mut Worker,
    sink: &mut S,
    data: &[u8],
) -> bool {
    let mut rec = Cursor::new(data);

    while rec.remaining() >= 4 {
        let msg_type = rec.read_u8().unwrap_or(0);
        let declared = rec.read_u24().unwrap_or(0) as usize;
        let body = rec.sub_clamped(declared).rest();

        match msg_type {
            HANDSHAKE_SERVER_HELLO => process_server_hello(worker, sink, body),
            HANDSHAKE_CERTIFICATE => process_certificate_chain(worker, sink, body),
            HANDSHAKE_SERVER_DONE => return true,
            other => trace!("handshake type {} ignored ({} bytes)", other, body.len()),
        }
    }
    false
}
