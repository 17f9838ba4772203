use crate::cursor::Cursor;
use crate::fingerprint::types::ClientHelloInfo;

pub const EXT_SERVER_NAME: u16 = 0x0000;
pub const EXT_SUPPORTED_GROUPS: u16 = 0x000a;
pub const EXT_EC_POINT_FORMATS: u16 = 0x000b;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("not enough data: need at least {0} bytes")]
    NotEnoughData(usize),
}

/// Parse a ClientHello handshake message into a `ClientHelloInfo`.
///
/// The input starts at the handshake header (type + 24-bit length); the
/// declared length is clamped to what is present. Lists that overrun their
/// container mark the info as malformed instead of failing. A bad list
/// inside one extension does not stop the walk, so SNI is still collected.
pub fn parse_client_hello(data: &[u8]) -> Result<ClientHelloInfo, ParseError> {
    if data.len() < 7 {
        return Err(ParseError::NotEnoughData(7));
    }

    let mut msg = Cursor::new(data);
    msg.skip(1);
    let declared = msg.read_u24().unwrap_or(0) as usize;
    let mut body = msg.sub_clamped(declared);

    let tls_version = body
        .read_u16()
        .ok_or(ParseError::NotEnoughData(6))?;

    let mut info = ClientHelloInfo {
        tls_version,
        ..Default::default()
    };

    if body.remaining() <= 32 {
        info.malformed = Some("random");
        return Ok(info);
    }
    body.skip(32);

    let sid_len = usize::from(body.read_u8().unwrap_or(0));
    if sid_len > 0 && body.remaining() > sid_len {
        info.session_id = Some(body.rest()[..sid_len].to_vec());
    }
    body.skip(sid_len);

    let Some(ciphers) = body.read_u16().and_then(|n| body.take(usize::from(n))) else {
        info.malformed = Some("cipher list");
        return Ok(info);
    };
    info.cipher_suites = ciphers
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();

    let compression = body.read_u8().map(usize::from);
    if !compression.map_or(false, |n| body.skip(n)) {
        info.malformed = Some("compression methods");
        return Ok(info);
    }

    if body.remaining() < 6 {
        return Ok(info);
    }
    let ext_total = usize::from(body.read_u16().unwrap_or(0));
    let mut exts = body.sub_clamped(ext_total);

    while exts.remaining() >= 4 {
        let (Some(etype), Some(elen)) = (exts.read_u16(), exts.read_u16()) else {
            break;
        };
        info.extensions.push(etype);

        let Some(payload) = exts.take(usize::from(elen)) else {
            break;
        };

        match etype {
            EXT_SERVER_NAME => {
                if let Some(name) = parse_sni(payload) {
                    info.server_names.push(name);
                }
            }
            EXT_SUPPORTED_GROUPS => {
                let mut c = Cursor::new(payload);
                match c.read_u16().and_then(|n| c.take(usize::from(n))) {
                    Some(list) => info.elliptic_curves.extend(
                        list.chunks_exact(2)
                            .map(|g| u16::from_be_bytes([g[0], g[1]])),
                    ),
                    None => info.malformed = Some("supported_groups"),
                }
            }
            EXT_EC_POINT_FORMATS => {
                let mut c = Cursor::new(payload);
                match c.read_u8().and_then(|n| c.take(usize::from(n))) {
                    Some(list) => info.ec_point_formats.extend_from_slice(list),
                    None => info.malformed = Some("ec_point_formats"),
                }
            }
            _ => {}
        }
    }

    Ok(info)
}

/// Host name from a server_name extension, if every nested length agrees
/// with the bytes actually present.
fn parse_sni(payload: &[u8]) -> Option<String> {
    let mut c = Cursor::new(payload);
    let list_len = usize::from(c.read_u16()?);
    if list_len != c.remaining() {
        return None;
    }
    if c.read_u8()? != 0 {
        return None;
    }
    let name_len = usize::from(c.read_u16()?);
    if name_len != c.remaining() {
        return None;
    }
    Some(String::from_utf8_lossy(c.rest()).into_owned())
}
