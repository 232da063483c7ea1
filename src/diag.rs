//! Diagnostic tracing for filter decisions.
//!
//! The filter reports every type inspection and selector test through a
//! [`DiagnosticSink`] handed to it at construction time. Keeping the sink an
//! injected capability lets embedders route traces wherever they want and
//! lets tests capture them without installing a global subscriber.

use std::fmt;
use std::sync::Mutex;

/// Receiver for debug-level, key-value structured trace entries.
///
/// Implementations must accept arbitrary key/value pairs without error and
/// be safe for concurrent writes.
pub trait DiagnosticSink: Send + Sync {
    /// Record one trace entry.
    fn debug(&self, message: &str, fields: &[(&str, &dyn fmt::Debug)]);
}

/// Sink that forwards entries to the `tracing` ecosystem at DEBUG level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn debug(&self, message: &str, fields: &[(&str, &dyn fmt::Debug)]) {
        tracing::debug!(target: "pkgsieve::filter", fields = ?fields, "{message}");
    }
}

/// One recorded entry: the message plus `Debug`-rendered field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEntry {
    pub message: String,
    pub fields: Vec<(String, String)>,
}

/// Sink that buffers entries in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<DiagnosticEntry>>,
}

impl MemorySink {
    /// Snapshot of everything recorded so far.
    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.entries.lock().expect("diagnostic buffer poisoned").clone()
    }
}

impl DiagnosticSink for MemorySink {
    fn debug(&self, message: &str, fields: &[(&str, &dyn fmt::Debug)]) {
        let fields = fields
            .iter()
            .map(|(key, value)| ((*key).to_string(), format!("{value:?}")))
            .collect();
        self.entries
            .lock()
            .expect("diagnostic buffer poisoned")
            .push(DiagnosticEntry {
                message: message.to_string(),
                fields,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_entries_in_order() {
        let sink = MemorySink::default();
        sink.debug("first", &[("answer", &42)]);
        sink.debug("second", &[]);

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "first");
        assert_eq!(
            entries[0].fields,
            vec![("answer".to_string(), "42".to_string())]
        );
        assert_eq!(entries[1].message, "second");
        assert!(entries[1].fields.is_empty());
    }

    #[test]
    fn tracing_sink_accepts_entries_without_a_subscriber() {
        TracingSink.debug("no subscriber installed", &[("kind", &"Deployment")]);
    }
}
