use std::fmt;
use std::time::Duration;

use super::error::RuleError;
use super::result::ValidationResult;

/// Everything produced by one validation run.
///
/// `results` holds one entry per evaluated rule, in evaluation order. When a
/// compile, build or environment failure stopped the run, `error` holds it
/// and `results` is the trail up to and including the failing rule.
#[derive(Debug, Clone)]
#[must_use]
pub struct ValidationReport {
    results: Vec<ValidationResult>,
    error: Option<RuleError>,
    duration: Duration,
}

impl ValidationReport {
    pub(crate) fn new(
        results: Vec<ValidationResult>,
        error: Option<RuleError>,
        duration: Duration,
    ) -> Self {
        Self {
            results,
            error,
            duration,
        }
    }

    /// Per-rule outcomes in evaluation order.
    #[must_use]
    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    /// The error that halted the run, if any.
    #[must_use]
    pub fn error(&self) -> Option<&RuleError> {
        self.error.as_ref()
    }

    /// Wall-clock duration of the run.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether the run completed and every evaluated rule passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.results.iter().all(ValidationResult::passed)
    }

    /// Results of rules that did not pass.
    pub fn failures(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| !r.passed())
    }

    /// Non-empty messages of rules that evaluated to a non-`true` value.
    #[must_use]
    pub fn failure_messages(&self) -> Vec<&str> {
        self.failures()
            .map(ValidationResult::message)
            .filter(|m| !m.is_empty())
            .collect()
    }

    /// Split into the per-rule trail, or the halting error.
    ///
    /// # Errors
    ///
    /// Returns the halting [`RuleError`] if the run stopped early.
    pub fn into_result(self) -> Result<Vec<ValidationResult>, RuleError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.results),
        }
    }

    /// Consume the report, returning results and halting error together.
    #[must_use]
    pub fn into_parts(self) -> (Vec<ValidationResult>, Option<RuleError>) {
        (self.results, self.error)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failures().count();
        write!(
            f,
            "evaluated: {}, passed: {}, failed: {}",
            self.results.len(),
            self.results.len() - failed,
            failed,
        )?;
        if let Some(err) = &self.error {
            write!(f, ", halted: {err}")?;
        }
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}
