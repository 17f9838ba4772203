use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use tlsscope_core::cert::{CertInfo, NameInfo};
use tlsscope_core::{Field, SessionSink};

use crate::replay::SessionReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Invalid output format '{}'. Expected 'text' or 'json'.", s),
        }
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: String,
    #[serde(flatten)]
    report: &'a SessionReport,
}

pub fn print_report(report: &SessionReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(report)),
        OutputFormat::Json => println!("{}", render_json(report)?),
    }
    Ok(())
}

pub fn render_json(report: &SessionReport) -> serde_json::Result<String> {
    serde_json::to_string(&JsonRecord {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        report,
    })
}

fn format_time(secs: Option<i64>) -> String {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "(unknown)".to_string())
}

fn join_names(name: &NameInfo) -> String {
    let cn: Vec<&str> = name.common_name.iter().map(|n| n.value.as_str()).collect();
    let on: Vec<&str> = name.org_name.iter().map(|n| n.value.as_str()).collect();
    match (cn.is_empty(), on.is_empty()) {
        (true, true) => "(none)".to_string(),
        (false, true) => cn.join(", "),
        (true, false) => format!("O={}", on.join(", ")),
        (false, false) => format!("{} (O={})", cn.join(", "), on.join(", ")),
    }
}

fn write_cert(out: &mut String, index: usize, cert: &CertInfo) {
    let _ = writeln!(out, "  Cert #{}:   {}", index, join_names(&cert.subject));
    let _ = writeln!(out, "    Issuer:   {}", join_names(&cert.issuer));
    let _ = writeln!(out, "    Serial:   {}", hex::encode(&cert.serial_number));
    let _ = writeln!(
        out,
        "    Valid:    {} .. {}{}",
        format_time(cert.not_before),
        format_time(cert.not_after),
        cert.valid_days()
            .map(|d| format!(" ({} days)", d))
            .unwrap_or_default()
    );
    match &cert.curve {
        Some(curve) => {
            let _ = writeln!(out, "    Key:      {} / {}", cert.public_algorithm, curve);
        }
        None => {
            let _ = writeln!(out, "    Key:      {}", cert.public_algorithm);
        }
    }
    if cert.is_ca {
        let _ = writeln!(out, "    CA:       yes");
    }
    if !cert.alt_names.is_empty() {
        let _ = writeln!(out, "    Alt:      {}", cert.alt_names.join(", "));
    }
    let _ = writeln!(out, "    SHA-1:    {}", cert.hash);
}

pub fn render_text(report: &SessionReport) -> String {
    let s = &report.session;
    let mut out = String::new();
    let line = |out: &mut String, label: &str, field: Field| {
        let values: Vec<&str> = s.values(field).collect();
        if !values.is_empty() {
            let _ = writeln!(out, "  {:<11} {}", label, values.join(", "));
        }
    };

    let _ = writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    match report.watched {
        Some(dir) => {
            let _ = writeln!(out, "  Watching:   {} side", dir);
        }
        None => {
            let _ = writeln!(out, "  Not a TLS handshake");
        }
    }
    if !s.protocols.is_empty() {
        let protocols: Vec<&str> = s.protocols.iter().map(String::as_str).collect();
        let _ = writeln!(out, "  Protocols:  {}", protocols.join(", "));
    }
    line(&mut out, "SNI:", Field::Host);
    line(&mut out, "TLS ver:", Field::Version);
    line(&mut out, "Cipher:", Field::Cipher);
    line(&mut out, "Client SID:", Field::SrcSessionId);
    line(&mut out, "Server SID:", Field::DstSessionId);

    if s.has_field(Field::Ja3) || s.has_field(Field::Ja3s) {
        let _ = writeln!(out, "  ──────────────────────────────────────────────────");
        line(&mut out, "JA3:", Field::Ja3);
        line(&mut out, "JA3 raw:", Field::Ja3String);
        line(&mut out, "JA3S:", Field::Ja3s);
        line(&mut out, "JA3S raw:", Field::Ja3sString);
    }

    if !s.certs.is_empty() {
        let _ = writeln!(out, "  ──────────────────────────────────────────────────");
        for (i, cert) in s.certs.iter().enumerate() {
            write_cert(&mut out, i, cert);
        }
    }

    if !s.tags.is_empty() {
        let tags: Vec<&str> = s.tags.iter().map(String::as_str).collect();
        let _ = writeln!(out, "  Tags:       {}", tags.join(", "));
    }
    if report.dropped > 0 {
        let _ = writeln!(out, "  Dropped:    {} bytes past buffer", report.dropped);
    }
    let _ = writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out
}
