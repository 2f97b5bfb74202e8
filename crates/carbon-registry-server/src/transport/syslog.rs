//! Syslog UDP receiver.
//!
//! Responsibilities:
//! - Read datagrams from the bound socket
//! - Decode once (`codec::decode_datagram`) into a `RawRecord`
//! - Hand records to the ingestion worker over an unbounded channel
//!
//! Framing errors are counted and logged here; metric line validation is the
//! ingestion worker's job.

use std::sync::Arc;

use chrono::Utc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use carbon_registry_core::RawRecord;

use crate::obs::metrics::TransportMetrics;
use crate::transport::codec::decode_datagram;

/// `decode_errors` reason for datagrams longer than `max_datagram_bytes`.
pub const REASON_TRUNCATED: &str = "TRUNCATED";

/// Receive until the ingestion side hangs up.
///
/// Datagrams longer than `max_datagram_bytes` are dropped whole: the kernel
/// cuts them to the buffer silently, and a cut line can still parse.
pub async fn run(
    socket: UdpSocket,
    tx: mpsc::UnboundedSender<RawRecord>,
    metrics: Arc<TransportMetrics>,
    max_datagram_bytes: usize,
) {
    // One spare byte tells an exact fit from a cut datagram.
    let mut buf = vec![0u8; max_datagram_bytes + 1];
    let local = socket.local_addr().ok();
    tracing::info!(?local, "syslog receiver started");

    loop {
        let (len, peer) = match socket.recv_from(&mut buf).await {
            Ok(v) => v,
            Err(e) => {
                // ICMP port-unreachable and friends surface here on some
                // platforms; they do not invalidate the socket.
                tracing::warn!(error = %e, "syslog recv failed");
                metrics.recv_errors.inc(&[("proto", "udp")]);
                continue;
            }
        };

        let peer_ip = peer.ip().to_string();
        metrics.datagrams.inc(&[("proto", "udp")]);

        if len > max_datagram_bytes {
            tracing::warn!(peer = %peer_ip, max_datagram_bytes, "drop oversized datagram");
            metrics.decode_errors.inc(&[("reason", REASON_TRUNCATED)]);
            continue;
        }

        let raw = match decode_datagram(&buf[..len], Utc::now()) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(peer = %peer_ip, code = e.kind().as_str(), "drop datagram: {e}");
                metrics.decode_errors.inc(&[("reason", e.kind().as_str())]);
                continue;
            }
        };

        if tx.send(raw).is_err() {
            tracing::info!("ingestion queue closed, syslog receiver stopping");
            break;
        }
    }
}
