//! Sinks receiving reported protocol errors.
//!
//! The client never panics on bad input. Each failure is handed to a
//! [`DiagnosticSink`] and returned to the caller. [`TracingSink`] is the
//! default and writes through `tracing`; [`RecordingSink`] keeps reports for
//! inspection.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::error;

use crate::error::ProtocolError;

/// Tracing target for reported protocol errors.
pub const DIAGNOSTICS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::diagnostics");

/// Destination for reported protocol errors.
pub trait DiagnosticSink {
    /// Records one error.
    fn report(&mut self, error: &ProtocolError);
}

/// Writes reports as `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, error: &ProtocolError) {
        if let ProtocolError::ResponseFailed { request_id, errors } = error {
            error!(
                target: DIAGNOSTICS_TARGET,
                kind = error.label(),
                request_id,
                "request failed"
            );
            for entry in errors {
                error!(
                    target: DIAGNOSTICS_TARGET,
                    kind = error.label(),
                    request_id,
                    "    {entry}"
                );
            }
            return;
        }
        error!(target: DIAGNOSTICS_TARGET, kind = error.label(), "{error}");
    }
}

/// Keeps every report in memory.
///
/// Clones share the same buffer, so a test can hand one clone to the client
/// and read reports through another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    reports: Rc<RefCell<Vec<ProtocolError>>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every report so far.
    #[must_use]
    pub fn reports(&self) -> Vec<ProtocolError> {
        self.reports.borrow().clone()
    }

    /// Number of reports so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.borrow().len()
    }

    /// Returns `true` when nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.borrow().is_empty()
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&mut self, error: &ProtocolError) {
        self.reports.borrow_mut().push(error.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_clones_share_reports() {
        let observer = RecordingSink::new();
        let mut sink = observer.clone();

        sink.report(&ProtocolError::unknown_domain("Timeline"));
        sink.report(&ProtocolError::ClientShutdown);

        assert_eq!(observer.len(), 2);
        assert!(matches!(
            observer.reports().first(),
            Some(ProtocolError::UnknownDomain { .. })
        ));
    }

    #[test]
    fn tracing_sink_accepts_every_kind() {
        let mut sink = TracingSink;
        sink.report(&ProtocolError::response_failed(3, vec!["a".into(), "b".into()]));
        sink.report(&ProtocolError::unimplemented_event("DOM", "x"));
    }
}
