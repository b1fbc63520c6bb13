// crates/dataset-registry-core/src/runtime/audit.rs
// ============================================================================
// Module: Registry Audit Sinks
// Description: JSON-line audit sinks for registry mutation events.
// Purpose: Emit structured audit logs without hard logging dependencies.
// Dependencies: crate::interfaces, serde_json
// ============================================================================

//! ## Overview
//! Every mutating registry call produces one [`RegistryAuditEvent`]. Sinks
//! serialize events as JSON lines to stderr or an append-only file, discard
//! them, or keep them in memory for inspection. Write failures are swallowed;
//! auditing never changes the outcome of a registry call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::interfaces::RegistryAuditEvent;
use crate::interfaces::RegistryAuditSink;

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that discards events.
pub struct NoopAuditSink;

impl RegistryAuditSink for NoopAuditSink {
    fn record(&self, _event: &RegistryAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl RegistryAuditSink for StderrAuditSink {
    fn record(&self, event: &RegistryAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RegistryAuditSink for FileAuditSink {
    fn record(&self, event: &RegistryAuditEvent) {
        let Ok(payload) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
        }
    }
}

/// Audit sink that keeps events in memory.
#[derive(Default)]
pub struct MemoryAuditSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<RegistryAuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<RegistryAuditEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl RegistryAuditSink for MemoryAuditSink {
    fn record(&self, event: &RegistryAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
