//! Typed diagnostic channel for belt generation runs.
//!
//! Every pipeline stage reports informational milestones and non-fatal
//! fallbacks here as structured records; the caller decides how to render
//! them. Warnings are additionally mirrored to the `log` facade so hosts
//! with a logger installed see them without draining the channel.

use std::fmt;

use serde::Serialize;

/// Pipeline stage a diagnostic originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Extract,
    Intersect,
    Align,
    Plan,
    Frame,
    Section,
    Loft,
}

impl Stage {
    #[must_use]
    const fn label(self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Intersect => "intersect",
            Self::Align => "align",
            Self::Plan => "plan",
            Self::Frame => "frame",
            Self::Section => "section",
            Self::Loft => "loft",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Info,
    Warning,
}

/// One diagnostic record: which stage, how serious, and what happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticRecord {
    pub stage: Stage,
    pub severity: Severity,
    pub message: String,
}

/// Ordered collection of diagnostic records for one generation run.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct BeltDiagnostics {
    records: Vec<DiagnosticRecord>,
}

impl BeltDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        log::debug!("[{}] {message}", stage.label());
        self.records.push(DiagnosticRecord {
            stage,
            severity: Severity::Info,
            message,
        });
    }

    pub fn warn(&mut self, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        log::warn!("[{}] {message}", stage.label());
        self.records.push(DiagnosticRecord {
            stage,
            severity: Severity::Warning,
            message,
        });
    }

    #[must_use]
    pub fn records(&self) -> &[DiagnosticRecord] {
        &self.records
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.severity == Severity::Warning)
            .count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticRecord> {
        self.records
            .iter()
            .filter(|r| r.severity == Severity::Warning)
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Display for BeltDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            let tag = match record.severity {
                Severity::Info => "info",
                Severity::Warning => "warning",
            };
            writeln!(f, "[{}] {tag}: {}", record.stage.label(), record.message)?;
        }
        Ok(())
    }
}
