//! Audit log capability.
//!
//! Every operation reports what it did through an injected [`AuditSink`],
//! categorized by operation kind. The log is a side channel: a handle built
//! with [`NoopAudit`] behaves identically apart from the missing events.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use docstore_sqlite::{AuditCategory, Database, MemoryAudit};
//!
//! let audit = Arc::new(MemoryAudit::new());
//! let db = Database::builder(":memory:").audit(audit.clone()).open().unwrap();
//! db.close().unwrap();
//!
//! assert_eq!(audit.messages(AuditCategory::Open).len(), 1);
//! assert_eq!(audit.messages(AuditCategory::Close).len(), 1);
//! ```

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Kind of operation an audit event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditCategory {
    Open,
    Close,
    Create,
    Insert,
    Select,
    Update,
    Delete,
    Drop,
    Backup,
    Schema,
    Warn,
    Error,
    /// A destructive operation was declined at the confirmation gate.
    Cancel,
    /// Dry-run statement previews.
    Debug,
}

impl AuditCategory {
    /// Lowercase category name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditCategory::Open => "open",
            AuditCategory::Close => "close",
            AuditCategory::Create => "create",
            AuditCategory::Insert => "insert",
            AuditCategory::Select => "select",
            AuditCategory::Update => "update",
            AuditCategory::Delete => "delete",
            AuditCategory::Drop => "drop",
            AuditCategory::Backup => "backup",
            AuditCategory::Schema => "schema",
            AuditCategory::Warn => "warn",
            AuditCategory::Error => "error",
            AuditCategory::Cancel => "cancel",
            AuditCategory::Debug => "debug",
        }
    }
}

impl fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub category: AuditCategory,
    pub message: String,
}

impl AuditEvent {
    pub fn new(category: AuditCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

/// Receiver of audit events.
///
/// Sinks are shared between handles (a backup target reports to the same
/// sink as its source), so implementations must be thread-safe.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAudit;

impl AuditSink for NoopAudit {
    fn record(&self, _event: &AuditEvent) {}
}

/// Forwards events to [`tracing`] with a `category` field.
///
/// Warnings and cancellations are emitted at `WARN`, errors at `ERROR`,
/// dry-run previews at `DEBUG` and everything else at `INFO`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAudit;

impl AuditSink for TracingAudit {
    fn record(&self, event: &AuditEvent) {
        let category = event.category.as_str();
        match event.category {
            AuditCategory::Warn | AuditCategory::Cancel => {
                tracing::warn!(category, "{}", event.message)
            }
            AuditCategory::Error => tracing::error!(category, "{}", event.message),
            AuditCategory::Debug => tracing::debug!(category, "{}", event.message),
            _ => tracing::info!(category, "{}", event.message),
        }
    }
}

/// Collects events in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemoryAudit {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAudit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events in order.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.lock().clone()
    }

    /// Messages recorded under `category`, in order.
    pub fn messages(&self, category: AuditCategory) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|event| event.category == category)
            .map(|event| event.message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AuditEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuditSink for MemoryAudit {
    fn record(&self, event: &AuditEvent) {
        self.lock().push(event.clone());
    }
}
