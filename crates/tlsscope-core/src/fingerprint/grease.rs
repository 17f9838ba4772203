/// Reserved GREASE codepoint (RFC 8701): `0x?A?A` with both bytes equal.
///
/// Used for cipher suites, extension types and supported groups alike.
pub fn is_grease_u16(val: u16) -> bool {
    val & 0x0f0f == 0x0a0a && val >> 8 == val & 0x00ff
}
