//! Per-file diagnostic records emitted during a discovery pass.

use serde::Serialize;

/// Whether a file made it into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

/// The pipeline step that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Walk,
    Transform,
    Load,
    Register,
}

/// One structured record per processed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    /// Root-relative path of the file (`v1/users/[id].rs`), or the walked path for walk failures.
    pub path: String,
    pub outcome: Outcome,
    pub stage: Stage,
    /// Full mount pattern, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DiagnosticRecord {
    pub fn success(path: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            outcome: Outcome::Success,
            stage: Stage::Register,
            pattern: Some(pattern.into()),
            error: None,
        }
    }

    pub fn failure(path: impl Into<String>, stage: Stage, error: impl ToString) -> Self {
        Self { path: path.into(), outcome: Outcome::Failure, stage, pattern: None, error: Some(error.to_string()) }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Failure
    }
}

/// Sink for diagnostic records.
pub trait Reporter {
    fn record(&mut self, record: DiagnosticRecord);
}

/// Logs every record through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn record(&mut self, record: DiagnosticRecord) {
        let pattern = record.pattern.as_deref().unwrap_or("-");
        match (record.outcome, record.error.as_deref()) {
            (Outcome::Success, _) => {
                tracing::info!(path = %record.path, pattern = %pattern, "route module registered");
            }
            // Registration failures abort startup.
            (Outcome::Failure, error) if record.stage == Stage::Register => {
                tracing::error!(
                    path = %record.path,
                    pattern = %pattern,
                    error = error.unwrap_or("unknown"),
                    "route registration rejected"
                );
            }
            (Outcome::Failure, error) => {
                tracing::warn!(
                    path = %record.path,
                    stage = ?record.stage,
                    pattern = %pattern,
                    error = error.unwrap_or("unknown"),
                    "route module skipped"
                );
            }
        }
    }
}

/// Keeps records in memory, in arrival order.
#[derive(Debug, Default, Clone)]
pub struct MemoryReporter {
    pub records: Vec<DiagnosticRecord>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DiagnosticRecord> {
        self.records.iter().filter(|r| r.is_failure())
    }

    pub fn successes(&self) -> impl Iterator<Item = &DiagnosticRecord> {
        self.records.iter().filter(|r| !r.is_failure())
    }
}

impl Reporter for MemoryReporter {
    fn record(&mut self, record: DiagnosticRecord) {
        self.records.push(record);
    }
}

/// Forwards each record to two reporters.
pub struct Tee<'a, A: Reporter, B: Reporter>(pub &'a mut A, pub &'a mut B);

impl<A: Reporter, B: Reporter> Reporter for Tee<'_, A, B> {
    fn record(&mut self, record: DiagnosticRecord) {
        self.0.record(record.clone());
        self.1.record(record);
    }
}
