//! Minimal DER reader: one TLV at a time on top of [`Cursor`], plus the
//! OID and time decoders the certificate walker needs.

use std::fmt::Write;

use chrono::{NaiveDateTime, TimeZone, Utc};

use crate::cursor::Cursor;

pub const TAG_INTEGER: u32 = 2;
pub const TAG_OCTET_STRING: u32 = 4;
pub const TAG_OID: u32 = 6;
pub const TAG_UTF8_STRING: u32 = 12;
pub const TAG_PRINTABLE_STRING: u32 = 19;
pub const TAG_TELETEX_STRING: u32 = 20;
pub const TAG_UTC_TIME: u32 = 23;
pub const TAG_GENERALIZED_TIME: u32 = 24;

/// Longest dotted-decimal OID we render.
pub const MAX_OID_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

/// One decoded TLV. `value` is already clamped to the bytes that were
/// actually available, whatever the header declared.
#[derive(Debug, Clone, Copy)]
pub struct Tlv<'a> {
    pub class: TagClass,
    pub constructed: bool,
    pub tag: u32,
    pub value: &'a [u8],
}

impl<'a> Tlv<'a> {
    pub fn is_universal(&self, tag: u32) -> bool {
        self.class == TagClass::Universal && self.tag == tag
    }

    /// A fresh cursor over the value bytes.
    pub fn contents(&self) -> Cursor<'a> {
        Cursor::new(self.value)
    }
}

/// Read the next TLV from `cur`.
///
/// Returns `None` when the header itself is truncated or uses a form DER
/// does not allow (indefinite length, more than four length octets, a tag
/// number wider than 28 bits).
pub fn read_tlv<'a>(cur: &mut Cursor<'a>) -> Option<Tlv<'a>> {
    let first = cur.read_u8()?;
    let class = match first >> 6 {
        0 => TagClass::Universal,
        1 => TagClass::Application,
        2 => TagClass::ContextSpecific,
        _ => TagClass::Private,
    };
    let constructed = first & 0x20 != 0;

    let mut tag = u32::from(first & 0x1f);
    if tag == 0x1f {
        tag = 0;
        let mut octets = 0;
        loop {
            let b = cur.read_u8()?;
            octets += 1;
            if octets > 4 {
                return None;
            }
            tag = (tag << 7) | u32::from(b & 0x7f);
            if b & 0x80 == 0 {
                break;
            }
        }
    }

    let lb = cur.read_u8()?;
    let declared = if lb & 0x80 == 0 {
        usize::from(lb)
    } else {
        let n = usize::from(lb & 0x7f);
        if n == 0 || n > 4 {
            return None;
        }
        cur.take(n)?
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | usize::from(b))
    };

    let len = declared.min(cur.remaining());
    let value = cur.take(len)?;
    Some(Tlv {
        class,
        constructed,
        tag,
        value,
    })
}

/// Render BER-encoded OID content octets as dotted decimal into `out`.
///
/// `out` is cleared first. On malformed input (dangling continuation
/// octet, sub-identifier wider than 64 bits, result longer than
/// [`MAX_OID_LEN`]) `out` is left empty and `false` is returned.
pub fn decode_oid(raw: &[u8], out: &mut String) -> bool {
    out.clear();
    if raw.is_empty() {
        return false;
    }

    let mut acc: u64 = 0;
    let mut first = true;
    let mut pending = false;
    for &b in raw {
        if acc > (u64::MAX >> 7) {
            out.clear();
            return false;
        }
        acc = (acc << 7) | u64::from(b & 0x7f);
        pending = true;
        if b & 0x80 != 0 {
            continue;
        }

        if first {
            let (arc0, arc1) = match acc {
                0..=39 => (0, acc),
                40..=79 => (1, acc - 40),
                _ => (2, acc - 80),
            };
            let _ = write!(out, "{}.{}", arc0, arc1);
            first = false;
        } else {
            let _ = write!(out, ".{}", acc);
        }
        if out.len() > MAX_OID_LEN {
            out.clear();
            return false;
        }
        acc = 0;
        pending = false;
    }

    if pending {
        out.clear();
        return false;
    }
    true
}

/// Decode an X.509 `Time` (UTCTime or GeneralizedTime) to Unix seconds.
///
/// Accepts `Z` or a `+HHMM`/`-HHMM` suffix; seconds may be omitted and
/// fractional seconds are ignored. UTCTime years below 50 are 20YY.
pub fn parse_time(tag: u32, value: &[u8]) -> Option<i64> {
    let s = std::str::from_utf8(value).ok()?;
    let digits_end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (digits, mut suffix) = s.split_at(digits_end);

    let mut full = match tag {
        TAG_UTC_TIME => {
            if digits.len() < 10 {
                return None;
            }
            let yy: u32 = digits[..2].parse().ok()?;
            let century = if yy < 50 { "20" } else { "19" };
            format!("{}{}", century, digits)
        }
        TAG_GENERALIZED_TIME => {
            if digits.len() < 12 {
                return None;
            }
            digits.to_string()
        }
        _ => return None,
    };
    match full.len() {
        12 => full.push_str("00"),
        14 => {}
        _ => return None,
    }

    if let Some(rest) = suffix.strip_prefix('.') {
        let frac_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        suffix = &rest[frac_end..];
    }

    let naive = NaiveDateTime::parse_from_str(&full, "%Y%m%d%H%M%S").ok()?;
    let utc = Utc.from_utc_datetime(&naive).timestamp();

    let offset = match suffix {
        "" | "Z" => 0,
        _ => {
            let (sign, hhmm) = match suffix.as_bytes()[0] {
                b'+' => (1i64, &suffix[1..]),
                b'-' => (-1i64, &suffix[1..]),
                _ => return None,
            };
            if hhmm.len() != 4 || !hhmm.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let hh: i64 = hhmm[..2].parse().ok()?;
            let mm: i64 = hhmm[2..].parse().ok()?;
            sign * (hh * 3600 + mm * 60)
        }
    };
    Some(utc - offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_short_and_long_form_lengths() {
        let mut data = vec![0x30, 0x81, 0x03, 0x02, 0x01, 0x05];
        data.extend_from_slice(&[0x04, 0x00]);
        let mut c = Cursor::new(&data);

        let seq = read_tlv(&mut c).unwrap();
        assert!(seq.constructed);
        assert!(seq.is_universal(16));
        assert_eq!(seq.value, &[0x02, 0x01, 0x05]);

        let int = read_tlv(&mut seq.contents()).unwrap();
        assert!(int.is_universal(TAG_INTEGER));
        assert_eq!(int.value, &[0x05]);

        let empty = read_tlv(&mut c).unwrap();
        assert!(empty.is_universal(TAG_OCTET_STRING));
        assert!(empty.value.is_empty());
        assert!(read_tlv(&mut c).is_none());
    }

    #[test]
    fn declared_length_is_clamped() {
        // Claims 0x7f bytes but only 2 follow.
        let data = [0x04, 0x7f, 0xAA, 0xBB];
        let tlv = read_tlv(&mut Cursor::new(&data)).unwrap();
        assert_eq!(tlv.value, &[0xAA, 0xBB]);

        let huge = [0x04, 0x84, 0xff, 0xff, 0xff, 0xff, 0x01];
        let tlv = read_tlv(&mut Cursor::new(&huge)).unwrap();
        assert_eq!(tlv.value, &[0x01]);
    }

    #[test]
    fn truncated_header_fails() {
        assert!(read_tlv(&mut Cursor::new(&[0x30])).is_none());
        assert!(read_tlv(&mut Cursor::new(&[0x30, 0x82, 0x01])).is_none());
        // Indefinite length is not DER.
        assert!(read_tlv(&mut Cursor::new(&[0x30, 0x80, 0x00, 0x00])).is_none());
    }

    #[test]
    fn context_specific_tags() {
        let data = [0x82, 0x03, b'a', b'.', b'b', 0xa3, 0x00];
        let mut c = Cursor::new(&data);
        let dns = read_tlv(&mut c).unwrap();
        assert_eq!(dns.class, TagClass::ContextSpecific);
        assert_eq!(dns.tag, 2);
        assert!(!dns.constructed);
        let ext = read_tlv(&mut c).unwrap();
        assert_eq!(ext.tag, 3);
        assert!(ext.constructed);
    }

    #[test]
    fn oid_rendering() {
        let mut out = String::new();
        assert!(decode_oid(&[0x55, 0x04, 0x03], &mut out));
        assert_eq!(out, "2.5.4.3");
        assert!(decode_oid(
            &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01],
            &mut out
        ));
        assert_eq!(out, "1.2.840.113549.1.1.1");
        assert!(decode_oid(&[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01], &mut out));
        assert_eq!(out, "1.2.840.10045.2.1");
    }

    #[test]
    fn oid_rejects_garbage() {
        let mut out = String::from("stale");
        assert!(!decode_oid(&[0x2a, 0x86], &mut out));
        assert!(out.is_empty());
        assert!(!decode_oid(&[], &mut out));
        assert!(!decode_oid(&[0xff; 12], &mut out));
    }

    #[test]
    fn utc_and_generalized_time() {
        assert_eq!(parse_time(TAG_UTC_TIME, b"700101000000Z"), Some(0));
        assert_eq!(parse_time(TAG_UTC_TIME, b"240101000000Z"), Some(1_704_067_200));
        assert_eq!(
            parse_time(TAG_GENERALIZED_TIME, b"20240101000000Z"),
            Some(1_704_067_200)
        );
        assert_eq!(
            parse_time(TAG_UTC_TIME, b"240101010000+0100"),
            Some(1_704_067_200)
        );
        assert_eq!(parse_time(TAG_UTC_TIME, b"2401010000Z"), Some(1_704_067_200));
        assert_eq!(parse_time(TAG_UTC_TIME, b"garbage"), None);
        assert_eq!(parse_time(TAG_INTEGER, b"240101000000Z"), None);
    }
}
