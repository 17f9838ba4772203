use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::cert::CertInfo;

/// Named string fields a TLS session can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Field {
    #[serde(rename = "host.http")]
    Host,
    #[serde(rename = "tls.version")]
    Version,
    #[serde(rename = "tls.cipher")]
    Cipher,
    #[serde(rename = "tls.ja3")]
    Ja3,
    #[serde(rename = "tls.ja3s")]
    Ja3s,
    #[serde(rename = "tls.ja3string")]
    Ja3String,
    #[serde(rename = "tls.ja3sstring")]
    Ja3sString,
    #[serde(rename = "tls.sessionid.src")]
    SrcSessionId,
    #[serde(rename = "tls.sessionid.dst")]
    DstSessionId,
}

/// Where dissected metadata goes, and what the dissector may ask about the
/// session it is attached to.
pub trait SessionSink {
    /// Add a value to a multi-valued field. Returns `true` iff the value was
    /// not already present.
    fn add_field(&mut self, field: Field, value: &str) -> bool;

    /// Hand over a decoded certificate. Returns `false` if the sink did not
    /// keep it (the certificate is dropped).
    fn add_cert(&mut self, cert: CertInfo, weight: usize) -> bool;

    fn add_tag(&mut self, tag: &str);

    fn add_protocol(&mut self, protocol: &str);

    fn has_protocol(&self, protocol: &str) -> bool;

    fn has_field(&self, field: Field) -> bool;

    fn has_certs(&self) -> bool;
}

/// In-memory session record. Values are kept sorted and deduplicated.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SessionFields {
    pub protocols: BTreeSet<String>,
    pub fields: BTreeMap<Field, BTreeSet<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub certs: Vec<CertInfo>,
    #[serde(skip_serializing_if = "is_zero")]
    pub cert_bytes: usize,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl SessionFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self, field: Field) -> impl Iterator<Item = &str> {
        self.fields
            .get(&field)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// The single value of a field, if it holds exactly one.
    pub fn value(&self, field: Field) -> Option<&str> {
        let mut it = self.values(field);
        match (it.next(), it.next()) {
            (Some(v), None) => Some(v),
            _ => None,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

impl SessionSink for SessionFields {
    fn add_field(&mut self, field: Field, value: &str) -> bool {
        self.fields
            .entry(field)
            .or_default()
            .insert(value.to_string())
    }

    fn add_cert(&mut self, cert: CertInfo, weight: usize) -> bool {
        if self.certs.contains(&cert) {
            return false;
        }
        self.cert_bytes += weight;
        self.certs.push(cert);
        true
    }

    fn add_tag(&mut self, tag: &str) {
        self.tags.insert(tag.to_string());
    }

    fn add_protocol(&mut self, protocol: &str) {
        self.protocols.insert(protocol.to_string());
    }

    fn has_protocol(&self, protocol: &str) -> bool {
        self.protocols.contains(protocol)
    }

    fn has_field(&self, field: Field) -> bool {
        self.fields.get(&field).map_or(false, |set| !set.is_empty())
    }

    fn has_certs(&self) -> bool {
        !self.certs.is_empty()
    }
}
