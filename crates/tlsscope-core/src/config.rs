/// Read-only switches for the dissector.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Also record the canonical JA3/JA3S strings, not just their hashes.
    pub ja3_strings: bool,
    /// Diagnostic verbosity. `> 0` logs rejected certificates, `> 1` logs
    /// every fingerprint string. Never changes what is extracted.
    pub debug: u8,
}
