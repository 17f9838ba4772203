//! Wire-format builders shared by the unit tests.

pub type Extension = (u16, Vec<u8>);

pub fn ext(etype: u16, payload: &[u8]) -> Extension {
    (etype, payload.to_vec())
}

pub fn ext_u16_list(etype: u16, values: &[u16]) -> Extension {
    let mut payload = ((values.len() * 2) as u16).to_be_bytes().to_vec();
    for v in values {
        payload.extend_from_slice(&v.to_be_bytes());
    }
    (etype, payload)
}

pub fn sni_ext(host: &str) -> Extension {
    let name = host.as_bytes();
    let mut payload = ((name.len() + 3) as u16).to_be_bytes().to_vec();
    payload.push(0);
    payload.extend_from_slice(&(name.len() as u16).to_be_bytes());
    payload.extend_from_slice(name);
    (0x0000, payload)
}

fn encode_extensions(exts: &[Extension]) -> Vec<u8> {
    let mut block = Vec::new();
    for (etype, payload) in exts {
        block.extend_from_slice(&etype.to_be_bytes());
        block.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        block.extend_from_slice(payload);
    }
    let mut out = (block.len() as u16).to_be_bytes().to_vec();
    out.extend(block);
    out
}

/// Handshake message: type + 24-bit length + body.
pub fn handshake(msg_type: u8, body: &[u8]) -> Vec<u8> {
    let len = body.len() as u32;
    let mut out = vec![msg_type];
    out.extend_from_slice(&len.to_be_bytes()[1..]);
    out.extend_from_slice(body);
    out
}

/// TLS record with the given content type and a TLS 1.2 record version.
pub fn record(content_type: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![content_type, 0x03, 0x03];
    out.extend_from_slice(&(body.len() as u16).to_be_bytes());
    out.extend_from_slice(body);
    out
}

pub struct ClientHelloBuilder {
    version: u16,
    session_id: Vec<u8>,
    ciphers: Vec<u16>,
    extensions: Vec<Extension>,
}

impl ClientHelloBuilder {
    pub fn new() -> Self {
        Self {
            version: 0x0303,
            session_id: Vec::new(),
            ciphers: Vec::new(),
            extensions: Vec::new(),
        }
    }

    pub fn version(mut self, v: u16) -> Self {
        self.version = v;
        self
    }

    pub fn session_id(mut self, id: &[u8]) -> Self {
        self.session_id = id.to_vec();
        self
    }

    pub fn ciphers(mut self, c: &[u16]) -> Self {
        self.ciphers = c.to_vec();
        self
    }

    pub fn extension(mut self, e: Extension) -> Self {
        self.extensions.push(e);
        self
    }

    pub fn body(&self) -> Vec<u8> {
        let mut b = self.version.to_be_bytes().to_vec();
        b.extend_from_slice(&[0x11; 32]);
        b.push(self.session_id.len() as u8);
        b.extend_from_slice(&self.session_id);
        b.extend_from_slice(&((self.ciphers.len() * 2) as u16).to_be_bytes());
        for c in &self.ciphers {
            b.extend_from_slice(&c.to_be_bytes());
        }
        b.extend_from_slice(&[0x01, 0x00]);
        if !self.extensions.is_empty() {
            b.extend(encode_extensions(&self.extensions));
        }
        b
    }

    pub fn message(&self) -> Vec<u8> {
        handshake(1, &self.body())
    }
}

pub struct ServerHelloBuilder {
    version: u16,
    session_id: Vec<u8>,
    cipher: u16,
    extensions: Vec<Extension>,
}

impl ServerHelloBuilder {
    pub fn new() -> Self {
        Self {
            version: 0x0303,
            session_id: Vec::new(),
            cipher: 0xc02f,
            extensions: Vec::new(),
        }
    }

    pub fn version(mut self, v: u16) -> Self {
        self.version = v;
        self
    }

    pub fn session_id(mut self, id: &[u8]) -> Self {
        self.session_id = id.to_vec();
        self
    }

    pub fn cipher(mut self, c: u16) -> Self {
        self.cipher = c;
        self
    }

    pub fn extension(mut self, e: Extension) -> Self {
        self.extensions.push(e);
        self
    }

    pub fn body(&self) -> Vec<u8> {
        let mut b = self.version.to_be_bytes().to_vec();
        b.extend_from_slice(&[0x22; 32]);
        b.push(self.session_id.len() as u8);
        b.extend_from_slice(&self.session_id);
        b.extend_from_slice(&self.cipher.to_be_bytes());
        b.push(0x00);
        if !self.extensions.is_empty() {
            b.extend(encode_extensions(&self.extensions));
        }
        b
    }

    pub fn message(&self) -> Vec<u8> {
        handshake(2, &self.body())
    }
}

// DER

pub fn der(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    let len = content.len();
    if len < 0x80 {
        out.push(len as u8);
    } else if len <= 0xff {
        out.extend_from_slice(&[0x81, len as u8]);
    } else {
        out.push(0x82);
        out.extend_from_slice(&(len as u16).to_be_bytes());
    }
    out.extend_from_slice(content);
    out
}

pub fn seq(items: &[Vec<u8>]) -> Vec<u8> {
    der(0x30, &items.concat())
}

pub fn set(items: &[Vec<u8>]) -> Vec<u8> {
    der(0x31, &items.concat())
}

pub const OID_CN: &[u8] = &[0x55, 0x04, 0x03];
pub const OID_O: &[u8] = &[0x55, 0x04, 0x0a];
pub const OID_OU: &[u8] = &[0x55, 0x04, 0x0b];
pub const OID_KEY_USAGE: &[u8] = &[0x55, 0x1d, 0x0f];
pub const OID_SAN: &[u8] = &[0x55, 0x1d, 0x11];
pub const OID_EC_PUBLIC_KEY: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01];
pub const OID_PRIME256V1: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07];
pub const OID_SHA256_RSA: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x0b];

pub fn oid(raw: &[u8]) -> Vec<u8> {
    der(0x06, raw)
}

/// X.501 Name from (attribute OID, string tag, value) triples, one RDN each.
pub fn name(attrs: &[(&[u8], u8, &str)]) -> Vec<u8> {
    let rdns: Vec<Vec<u8>> = attrs
        .iter()
        .map(|(o, tag, v)| set(&[seq(&[oid(o), der(*tag, v.as_bytes())])]))
        .collect();
    seq(&rdns)
}

pub struct CertBuilder {
    pub serial: Vec<u8>,
    pub issuer: Vec<u8>,
    pub subject: Vec<u8>,
    pub not_before: &'static str,
    pub not_after: &'static str,
    pub spki: Vec<u8>,
    pub extensions: Vec<Vec<u8>>,
}

impl CertBuilder {
    pub fn new(issuer_cn: &str, subject_cn: &str) -> Self {
        Self {
            serial: vec![0x01, 0x02, 0x03],
            issuer: name(&[(OID_CN, 0x13, issuer_cn)]),
            subject: name(&[(OID_CN, 0x13, subject_cn)]),
            not_before: "240101000000Z",
            not_after: "250101000000Z",
            spki: seq(&[
                seq(&[oid(OID_EC_PUBLIC_KEY), oid(OID_PRIME256V1)]),
                der(0x03, &[0x00, 0x04, 0x01, 0x02]),
            ]),
            extensions: Vec::new(),
        }
    }

    /// keyUsage extension whose 4-byte bitstring ends in `last`.
    pub fn key_usage(mut self, last: u8) -> Self {
        self.extensions.push(seq(&[
            oid(OID_KEY_USAGE),
            der(0x01, &[0xff]),
            der(0x04, &[0x03, 0x02, 0x01, last]),
        ]));
        self
    }

    /// subjectAltName extension with one dNSName per entry.
    pub fn alt_names(mut self, names: &[&[u8]]) -> Self {
        let general: Vec<Vec<u8>> = names.iter().map(|n| der(0x82, n)).collect();
        self.extensions
            .push(seq(&[oid(OID_SAN), der(0x04, &seq(&general))]));
        self
    }

    pub fn tbs(&self) -> Vec<u8> {
        let mut items = vec![
            der(0xa0, &der(0x02, &[0x02])),
            der(0x02, &self.serial),
            seq(&[oid(OID_SHA256_RSA), der(0x05, &[])]),
            self.issuer.clone(),
            seq(&[
                der(0x17, self.not_before.as_bytes()),
                der(0x17, self.not_after.as_bytes()),
            ]),
            self.subject.clone(),
            self.spki.clone(),
        ];
        if !self.extensions.is_empty() {
            items.push(der(0xa3, &seq(&self.extensions)));
        }
        seq(&items)
    }

    pub fn der(&self) -> Vec<u8> {
        seq(&[
            self.tbs(),
            seq(&[oid(OID_SHA256_RSA), der(0x05, &[])]),
            der(0x03, &[0x00, 0xaa, 0xbb]),
        ])
    }
}

/// Certificate handshake body: 24-bit total length, then length-prefixed
/// DER entries.
pub fn certificate_body(certs: &[Vec<u8>]) -> Vec<u8> {
    let mut entries = Vec::new();
    for c in certs {
        entries.extend_from_slice(&(c.len() as u32).to_be_bytes()[1..]);
        entries.extend_from_slice(c);
    }
    let mut out = (entries.len() as u32).to_be_bytes()[1..].to_vec();
    out.extend(entries);
    out
}
