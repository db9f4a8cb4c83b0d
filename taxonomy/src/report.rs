//! Findings produced by [`crate::validate`].

use std::fmt;

/// How bad a finding is. Ordered, so the worst of a report is its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Holds.
    Pass,
    /// Tolerated drift, e.g. a class linked under a second parent.
    Warning,
    /// Broken invariant.
    Failure,
}

/// Outcome of one named check.
#[derive(Debug, Clone)]
pub struct Finding {
    /// Check name, `taxonomy/<aspect>`.
    pub check: &'static str,
    /// Outcome.
    pub severity: Severity,
    /// One-line summary.
    pub message: String,
    /// Offending nodes, one per line.
    pub details: Vec<String>,
}

impl Finding {
    pub(crate) fn new(
        check: &'static str,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check,
            severity,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub(crate) fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.check, self.message)
    }
}

/// Findings of one [`crate::validate::validate`] run, in check order.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// All findings.
    pub findings: Vec<Finding>,
}

impl FromIterator<Finding> for ValidationReport {
    fn from_iter<I: IntoIterator<Item = Finding>>(iter: I) -> Self {
        Self {
            findings: iter.into_iter().collect(),
        }
    }
}

impl ValidationReport {
    /// Number of findings at exactly `severity`.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Number of warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Worst severity seen; `Pass` for an empty report.
    #[must_use]
    pub fn worst(&self) -> Severity {
        self.findings
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or(Severity::Pass)
    }

    /// No invariant is broken. Warnings are allowed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.worst() < Severity::Failure
    }

    /// The finding of the named check.
    #[must_use]
    pub fn get(&self, check: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.check == check)
    }

    /// Logs each finding at its severity; details go to debug.
    pub fn log(&self) {
        for finding in &self.findings {
            match finding.severity {
                Severity::Pass => tracing::debug!("{finding}"),
                Severity::Warning => tracing::warn!("{finding}"),
                Severity::Failure => tracing::error!("{finding}"),
            }
            for detail in &finding.details {
                tracing::debug!("  {detail}");
            }
        }
    }
}
