use crate::cursor::Cursor;
use crate::fingerprint::clienthello::ParseError;
use crate::fingerprint::types::ServerHelloInfo;

pub const EXT_ALPN: u16 = 0x0010;
pub const EXT_SUPPORTED_VERSIONS: u16 = 0x002b;

/// ALPN extension payload selecting exactly "h2".
const ALPN_H2: &[u8] = b"\x00\x03\x02h2";

/// Parse a ServerHello handshake body (after the 4-byte handshake header).
pub fn parse_server_hello(data: &[u8]) -> Result<ServerHelloInfo, ParseError> {
    let mut c = Cursor::new(data);
    let tls_version = c.read_u16();
    c.skip(32);
    let Some(tls_version) = tls_version.filter(|_| !c.is_error()) else {
        return Err(ParseError::NotEnoughData(34));
    };

    let mut info = ServerHelloInfo {
        tls_version,
        ..Default::default()
    };

    // Only SSLv3 .. TLS 1.2 hellos are guaranteed to carry a session id.
    if (0x0300..=0x0303).contains(&tls_version) {
        let sid_len = usize::from(c.read_u8().unwrap_or(0));
        if sid_len > 0 && c.remaining() > sid_len {
            info.session_id = Some(c.rest()[..sid_len].to_vec());
        }
        c.skip(sid_len);
    }

    info.cipher_suite = c.read_u16();
    c.skip(1);

    if c.remaining() > 2 {
        let ext_total = usize::from(c.read_u16().unwrap_or(0));
        let mut exts = c.sub_clamped(ext_total);

        while exts.remaining() > 0 {
            let (Some(etype), Some(elen)) = (exts.read_u16(), exts.read_u16()) else {
                break;
            };
            info.extensions.push(etype);

            let Some(payload) = exts.take(usize::from(elen)) else {
                break;
            };

            match etype {
                EXT_SUPPORTED_VERSIONS if payload.len() == 2 => {
                    info.supported_version = Some(u16::from_be_bytes([payload[0], payload[1]]));
                }
                EXT_ALPN if payload == ALPN_H2 => info.alpn_h2 = true,
                _ => {}
            }
        }
    }

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ext, ServerHelloBuilder};

    #[test]
    fn parses_tls12_hello() {
        let body = ServerHelloBuilder::new()
            .session_id(&[0xab; 32])
            .cipher(0xc02f)
            .extension(ext(0xff01, &[0x00]))
            .extension(ext(0x000b, &[0x01, 0x00]))
            .body();
        let info = parse_server_hello(&body).unwrap();
        assert_eq!(info.tls_version, 0x0303);
        assert_eq!(info.session_id, Some(vec![0xab; 32]));
        assert_eq!(info.cipher_suite, Some(0xc02f));
        assert_eq!(info.extensions, vec![0xff01, 0x000b]);
        assert_eq!(info.supported_version, None);
        assert!(!info.alpn_h2);
    }

    #[test]
    fn picks_up_supported_versions_and_h2() {
        let body = ServerHelloBuilder::new()
            .cipher(0x1301)
            .extension(ext(EXT_SUPPORTED_VERSIONS, &[0x03, 0x04]))
            .extension(ext(EXT_ALPN, ALPN_H2))
            .body();
        let info = parse_server_hello(&body).unwrap();
        assert_eq!(info.supported_version, Some(0x0304));
        assert!(info.alpn_h2);
        assert_eq!(info.extensions, vec![0x002b, 0x0010]);
    }

    #[test]
    fn other_alpn_is_not_h2() {
        let body = ServerHelloBuilder::new()
            .extension(ext(EXT_ALPN, b"\x00\x09\x08http/1.1"))
            .body();
        assert!(!parse_server_hello(&body).unwrap().alpn_h2);
    }

    #[test]
    fn grease_like_extensions_are_kept() {
        let body = ServerHelloBuilder::new()
            .extension(ext(0x0a0a, &[]))
            .body();
        assert_eq!(parse_server_hello(&body).unwrap().extensions, vec![0x0a0a]);
    }

    #[test]
    fn truncated_random_is_rejected() {
        let body = ServerHelloBuilder::new().body();
        assert!(parse_server_hello(&body[..20]).is_err());
    }

    #[test]
    fn missing_cipher_is_reported() {
        let body = ServerHelloBuilder::new().body();
        let info = parse_server_hello(&body[..35]).unwrap();
        assert_eq!(info.cipher_suite, None);
    }
}
