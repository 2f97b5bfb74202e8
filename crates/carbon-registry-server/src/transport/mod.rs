//! Transport layer.
//!
//! Inbound: syslog UDP receiver plus the datagram codec that turns frames into
//! raw records. Outbound: HTTP handlers that expose cache snapshots.

pub mod codec;
pub mod http;
pub mod syslog;
