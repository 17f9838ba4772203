//! X.509 field extraction from certificate chains seen in the clear.

mod chain;
mod extract;

use serde::Serialize;
use thiserror::Error;

pub use chain::{hash_hex, process_certificate_chain, TAG_BAD_ALT_NAME, TAG_SELF_SIGNED};
pub use extract::parse_certificate;

/// Deepest ASN.1 nesting the recursive walkers will follow.
pub const MAX_DEPTH: usize = 16;

/// One issuer/subject name component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameString {
    pub value: String,
    /// Encoded as UTF8String rather than Printable/Teletex.
    pub utf8: bool,
}

/// The subset of an X.501 Name we index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NameInfo {
    #[serde(rename = "cn", skip_serializing_if = "Vec::is_empty")]
    pub common_name: Vec<NameString>,
    #[serde(rename = "on", skip_serializing_if = "Vec::is_empty")]
    pub org_name: Vec<NameString>,
    #[serde(rename = "ou", skip_serializing_if = "Vec::is_empty")]
    pub org_unit: Vec<NameString>,
}

/// Metadata extracted from one DER certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertInfo {
    pub issuer: NameInfo,
    pub subject: NameInfo,
    #[serde(rename = "serial", serialize_with = "serialize_hex")]
    pub serial_number: Vec<u8>,
    pub public_algorithm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve: Option<String>,
    pub not_before: Option<i64>,
    pub not_after: Option<i64>,
    #[serde(rename = "isCA")]
    pub is_ca: bool,
    #[serde(rename = "alt", skip_serializing_if = "Vec::is_empty")]
    pub alt_names: Vec<String>,
    /// SHA-1 of the DER bytes, colon separated.
    pub hash: String,
    /// Length of the DER bytes.
    #[serde(skip)]
    pub raw_len: usize,
}

fn serialize_hex<S: serde::Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(bytes))
}

impl CertInfo {
    /// Whole days between notBefore and notAfter.
    pub fn valid_days(&self) -> Option<i64> {
        Some((self.not_after? - self.not_before?) / 86_400)
    }
}

/// Step of the TBSCertificate walk that hit a missing or short TLV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertStep {
    Certificate = 1,
    TbsCertificate = 2,
    VersionOrSerial = 3,
    Serial = 4,
    Signature = 5,
    Issuer = 6,
    Validity = 7,
    Subject = 8,
    SubjectPublicKeyInfo = 9,
    Extensions = 10,
}

impl CertStep {
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CertError {
    #[error("bad cert {} ({:?})", .0.code(), .0)]
    Truncated(CertStep),
}

impl CertError {
    pub fn code(&self) -> u8 {
        match self {
            CertError::Truncated(step) => step.code(),
        }
    }
}
