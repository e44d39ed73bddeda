//! CSV serialization of delivery logs
//!
//! Pure, synchronous, idempotent transform of an in-memory event log:
//! header row `name,email,status,reason`, then one row per event in append
//! order. Every data field is double-quoted with embedded quotes doubled;
//! rows are CRLF-joined.

use crate::events::DeliveryEvent;

/// Column order of the exported log
pub const CSV_HEADER: &str = "name,email,status,reason";

/// Serialize the full event log to CSV text.
///
/// Calling this twice with the same log produces byte-identical output.
pub fn delivery_log_csv(events: &[DeliveryEvent]) -> String {
    let mut lines = Vec::with_capacity(events.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for event in events {
        let fields = [
            event.name.as_str(),
            event.email.as_str(),
            &event.status.to_string(),
            event.reason.as_deref().unwrap_or(""),
        ];
        lines.push(csv_row(&fields));
    }

    lines.join("\r\n")
}

/// One quoted, comma-separated row
fn csv_row(fields: &[&str]) -> String {
    let quoted: Vec<String> = fields.iter().map(|field| quote(field)).collect();
    quoted.join(",")
}

/// Quote a field, doubling embedded double-quote characters
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
