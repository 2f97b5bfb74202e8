//! Inbound wire formats.
//!
//! Only the plaintext metric line lives here today. The parser is panic-free:
//! malformed input is reported as `RegistryError` instead of panicking, so a
//! hostile or broken reporter can never take the cache down.

pub mod line;

pub use line::{parse_line, ParsedLine, RawRecord, LOOPBACK_SOURCE};
