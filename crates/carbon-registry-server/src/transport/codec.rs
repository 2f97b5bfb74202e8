//! Syslog datagram codec (panic-free).
//!
//! - RFC 5424: `<PRI>1 TS HOST APP PROCID MSGID SD MSG`
//! - RFC 3164: `<PRI>Mmm dd hh:mm:ss HOST TAG: MSG`
//! - No `<PRI>`: the whole datagram is the metric line, reporter unknown
//!
//! The header timestamp is not trusted; `received_at` is always the local
//! receive time.

use chrono::{DateTime, Utc};

use carbon_registry_core::error::{RegistryError, Result};
use carbon_registry_core::RawRecord;

const MAX_PRI: u16 = 191;
const BSD_TS_LEN: usize = 15;
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Decode one datagram into a raw record for the ingestion queue.
pub fn decode_datagram(buf: &[u8], now: DateTime<Utc>) -> Result<RawRecord> {
    let text = String::from_utf8_lossy(buf);
    let text = text.trim_end_matches(['\r', '\n', '\0']);

    let Some(after_lt) = text.strip_prefix('<') else {
        return Ok(RawRecord::new(text, "", now));
    };
    let rest = strip_priority(after_lt)?;

    let (host, msg) = match rest.strip_prefix("1 ") {
        Some(body) => split_rfc5424(body)?,
        None => split_rfc3164(rest),
    };
    Ok(RawRecord::new(msg, host, now))
}

/// `NNN>rest` -> `rest`.
fn strip_priority(s: &str) -> Result<&str> {
    let (digits, rest) = s
        .split_once('>')
        .ok_or_else(|| RegistryError::BadDatagram("unterminated priority".into()))?;

    if digits.is_empty() || digits.len() > 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RegistryError::BadDatagram(format!("invalid priority: {digits:?}")));
    }
    let pri: u16 = digits
        .parse()
        .map_err(|_| RegistryError::BadDatagram(format!("invalid priority: {digits:?}")))?;
    if pri > MAX_PRI {
        return Err(RegistryError::BadDatagram(format!("priority out of range: {pri}")));
    }
    Ok(rest)
}

fn split_rfc5424(body: &str) -> Result<(&str, &str)> {
    let mut parts = body.splitn(6, ' ');
    let (Some(_ts), Some(host), Some(_app), Some(_procid), Some(_msgid)) =
        (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(RegistryError::BadDatagram("truncated rfc5424 header".into()));
    };
    let host = if host == "-" { "" } else { host };

    let after_sd = skip_structured_data(parts.next().unwrap_or(""))?;
    let msg = after_sd.strip_prefix(' ').unwrap_or(after_sd);
    let msg = msg.strip_prefix('\u{feff}').unwrap_or(msg);
    Ok((host, msg))
}

/// Skip `-` or one or more `[...]` blocks (`\]` escapes inside values).
fn skip_structured_data(s: &str) -> Result<&str> {
    if let Some(rest) = s.strip_prefix('-') {
        return Ok(rest);
    }
    if !s.starts_with('[') {
        return Err(RegistryError::BadDatagram("missing structured data".into()));
    }

    let mut rest = s;
    while rest.starts_with('[') {
        let mut escaped = false;
        let mut end = None;
        for (i, c) in rest.char_indices().skip(1) {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                ']' => {
                    end = Some(i);
                    break;
                }
                _ => {}
            }
        }
        let Some(end) = end else {
            return Err(RegistryError::BadDatagram("unterminated structured data".into()));
        };
        rest = &rest[end + 1..];
    }
    Ok(rest)
}

fn split_rfc3164(rest: &str) -> (&str, &str) {
    let Some(after_ts) = strip_bsd_timestamp(rest) else {
        return ("", strip_tag(rest));
    };
    match after_ts.split_once(' ') {
        Some((host, content)) => (host, strip_tag(content)),
        None => (after_ts, ""),
    }
}

/// `Mmm dd hh:mm:ss ` prefix, day may be space-padded.
fn strip_bsd_timestamp(s: &str) -> Option<&str> {
    let ts = s.get(..BSD_TS_LEN)?;
    let rest = s.get(BSD_TS_LEN..)?.strip_prefix(' ')?;

    let month = ts.get(..3)?;
    let clock = ts.get(7..)?.as_bytes();
    let clock_ok = clock.len() == 8
        && clock[2] == b':'
        && clock[5] == b':'
        && clock
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit());

    if MONTHS.contains(&month) && ts.get(3..4) == Some(" ") && clock_ok {
        Some(rest)
    } else {
        None
    }
}

/// Drop a leading `tag:` or `tag[pid]:` followed by a space or end of input.
fn strip_tag(content: &str) -> &str {
    let tag_end = content
        .find(|c: char| c == ':' || c == '[' || c.is_whitespace())
        .unwrap_or(content.len());
    if tag_end == 0 {
        return content;
    }

    let mut rest = &content[tag_end..];
    if let Some(pid) = rest.strip_prefix('[') {
        match pid.split_once(']') {
            Some((digits, after)) if digits.bytes().all(|b| b.is_ascii_digit()) => rest = after,
            _ => return content,
        }
    }

    match rest.strip_prefix(':') {
        Some("") => "",
        Some(msg) if msg.starts_with(' ') => &msg[1..],
        _ => content,
    }
}
