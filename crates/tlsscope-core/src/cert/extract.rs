use std::borrow::Cow;

use oid_registry::{Oid, OidRegistry};

use crate::asn1::{
    decode_oid, parse_time, read_tlv, TagClass, Tlv, TAG_OCTET_STRING, TAG_OID,
    TAG_PRINTABLE_STRING, TAG_TELETEX_STRING, TAG_UTF8_STRING,
};
use crate::cert::{CertError, CertInfo, CertStep, NameInfo, NameString, MAX_DEPTH};
use crate::cursor::Cursor;

const OID_COMMON_NAME: &str = "2.5.4.3";
const OID_ORGANIZATION: &str = "2.5.4.10";
const OID_ORG_UNIT: &str = "2.5.4.11";
const OID_KEY_USAGE: &str = "2.5.29.15";
const OID_SUBJECT_ALT_NAME: &str = "2.5.29.17";
const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";

/// Longest curve OID we try to resolve.
const MAX_CURVE_OID_LEN: usize = 12;

/// A decoded certificate plus what went wrong along the way without
/// aborting it.
#[derive(Debug, Clone)]
pub struct ParsedCert {
    pub info: CertInfo,
    /// Some dNSName was not valid UTF-8 and was dropped.
    pub bad_alt_name: bool,
}

fn next<'a>(cur: &mut Cursor<'a>, step: CertStep) -> Result<Tlv<'a>, CertError> {
    read_tlv(cur).ok_or(CertError::Truncated(step))
}

/// Walk one DER certificate and pull out the indexed fields.
///
/// Any missing TLV along the TBSCertificate spine fails with the step it
/// happened at. The `hash` field is left for the caller.
pub fn parse_certificate(oids: &OidRegistry<'_>, der: &[u8]) -> Result<ParsedCert, CertError> {
    let mut info = CertInfo {
        raw_len: der.len(),
        ..Default::default()
    };

    let cert = next(&mut Cursor::new(der), CertStep::Certificate)?;
    let tbs = next(&mut cert.contents(), CertStep::TbsCertificate)?;
    let mut tbs = tbs.contents();

    // version is an optional explicit [0] in front of the serial
    let mut serial = next(&mut tbs, CertStep::VersionOrSerial)?;
    if serial.constructed {
        serial = next(&mut tbs, CertStep::Serial)?;
    }
    info.serial_number = serial.value.to_vec();

    next(&mut tbs, CertStep::Signature)?;

    let issuer = next(&mut tbs, CertStep::Issuer)?;
    process_name(&mut issuer.contents(), &mut info.issuer, 0);

    let mut validity = next(&mut tbs, CertStep::Validity)?.contents();
    let not_before = next(&mut validity, CertStep::Validity)?;
    info.not_before = decode_time(&not_before);
    let not_after = next(&mut validity, CertStep::Validity)?;
    info.not_after = decode_time(&not_after);

    let subject = next(&mut tbs, CertStep::Subject)?;
    process_name(&mut subject.contents(), &mut info.subject, 0);

    let spki = next(&mut tbs, CertStep::SubjectPublicKeyInfo)?;
    process_public_key(oids, spki.value, &mut info);

    let mut bad_alt_name = false;
    if tbs.remaining() > 0 {
        let exts = next(&mut tbs, CertStep::Extensions)?;
        let mut last_oid = String::new();
        process_extensions(
            &mut exts.contents(),
            &mut info,
            &mut last_oid,
            &mut bad_alt_name,
            0,
        );
    }

    Ok(ParsedCert { info, bad_alt_name })
}

fn decode_time(tlv: &Tlv<'_>) -> Option<i64> {
    if tlv.class != TagClass::Universal {
        return None;
    }
    parse_time(tlv.tag, tlv.value)
}

/// Collect CN/O/OU strings from a Name, descending through every
/// constructed wrapper. Each string is attributed to the last OID seen at
/// its own nesting level.
fn process_name(cur: &mut Cursor<'_>, name: &mut NameInfo, depth: usize) {
    if depth > MAX_DEPTH {
        return;
    }
    let mut last_oid = String::new();

    while cur.remaining() > 0 {
        let Some(tlv) = read_tlv(cur) else {
            return;
        };

        if tlv.constructed {
            process_name(&mut tlv.contents(), name, depth + 1);
        } else if tlv.is_universal(TAG_OID) {
            decode_oid(tlv.value, &mut last_oid);
        } else if !last_oid.is_empty()
            && tlv.class == TagClass::Universal
            && matches!(
                tlv.tag,
                TAG_UTF8_STRING | TAG_PRINTABLE_STRING | TAG_TELETEX_STRING
            )
        {
            let utf8 = tlv.tag == TAG_UTF8_STRING;
            // Printable and Teletex bytes are taken as Latin-1.
            let raw: String = if utf8 {
                String::from_utf8_lossy(tlv.value).into_owned()
            } else {
                tlv.value.iter().map(|&b| char::from(b)).collect()
            };
            match last_oid.as_str() {
                OID_COMMON_NAME => {
                    let value = if utf8 {
                        raw.to_lowercase()
                    } else {
                        raw.to_ascii_lowercase()
                    };
                    name.common_name.push(NameString { value, utf8 });
                }
                OID_ORGANIZATION => name.org_name.push(NameString { value: raw, utf8 }),
                OID_ORG_UNIT => name.org_unit.push(NameString { value: raw, utf8 }),
                _ => {}
            }
        }
    }
}

fn short_name(oids: &OidRegistry<'_>, raw: &[u8]) -> Option<String> {
    let oid = Oid::new(Cow::Owned(raw.to_vec()));
    oids.get(&oid).map(|entry| entry.sn().to_string())
}

/// Algorithm (and curve, for EC keys) of a SubjectPublicKeyInfo. Damage
/// here only marks the field "corrupt".
fn process_public_key(oids: &OidRegistry<'_>, spki: &[u8], info: &mut CertInfo) {
    let algorithm = read_tlv(&mut Cursor::new(spki));
    let mut params = algorithm.map(|a| a.contents()).unwrap_or(Cursor::new(&[]));
    let Some(alg_oid) = read_tlv(&mut params) else {
        info.public_algorithm = "corrupt".to_string();
        return;
    };

    info.public_algorithm =
        short_name(oids, alg_oid.value).unwrap_or_else(|| "unknown".to_string());

    let mut dotted = String::new();
    decode_oid(alg_oid.value, &mut dotted);
    if dotted != OID_EC_PUBLIC_KEY {
        return;
    }

    info.curve = Some(match read_tlv(&mut params) {
        Some(curve) if curve.value.len() <= MAX_CURVE_OID_LEN => {
            short_name(oids, curve.value).unwrap_or_else(|| "unknown".to_string())
        }
        _ => "corrupt".to_string(),
    });
}

/// Walk the extensions block for keyUsage and subjectAltName.
///
/// `last_oid` is shared across nesting levels so an extension's OID can
/// steer how its OCTET STRING payload is read. Once any alt name has been
/// collected, the walk stops at the level that recursed.
fn process_extensions(
    cur: &mut Cursor<'_>,
    info: &mut CertInfo,
    last_oid: &mut String,
    bad_alt_name: &mut bool,
    depth: usize,
) {
    if depth > MAX_DEPTH {
        return;
    }

    while cur.remaining() >= 2 {
        let Some(tlv) = read_tlv(cur) else {
            return;
        };

        if tlv.constructed {
            process_extensions(&mut tlv.contents(), info, last_oid, bad_alt_name, depth + 1);
            if !info.alt_names.is_empty() {
                return;
            }
        } else if tlv.is_universal(TAG_OID) {
            decode_oid(tlv.value, last_oid);
            if last_oid.as_str() == OID_KEY_USAGE {
                process_key_usage(cur, info);
            }
            if last_oid.as_str() != OID_SUBJECT_ALT_NAME {
                last_oid.clear();
            }
        } else if !last_oid.is_empty() && tlv.is_universal(TAG_OCTET_STRING) {
            process_extensions(&mut tlv.contents(), info, last_oid, bad_alt_name, depth + 1);
            return;
        } else if !last_oid.is_empty() && tlv.class == TagClass::ContextSpecific && tlv.tag == 2 {
            match std::str::from_utf8(tlv.value) {
                Ok(dns) => info.alt_names.push(dns.to_ascii_lowercase()),
                Err(_) => *bad_alt_name = true,
            }
        }
    }
    last_oid.clear();
}

/// Consume the rest of a keyUsage extension; the CA flag comes from the
/// last byte of its 4-byte wrapped BIT STRING.
fn process_key_usage(cur: &mut Cursor<'_>, info: &mut CertInfo) {
    while cur.remaining() >= 2 {
        let Some(tlv) = read_tlv(cur) else {
            return;
        };
        if tlv.is_universal(TAG_OCTET_STRING) && tlv.value.len() == 4 {
            info.is_ca = tlv.value[3] & 0x02 != 0;
        }
    }
}
