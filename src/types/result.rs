use std::fmt;

use super::context::ValidationContext;
use super::error::RuleError;

/// Outcome of one evaluated rule.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct ValidationResult {
    rule: String,
    passed: bool,
    error: Option<RuleError>,
    message: String,
    context: ValidationContext,
}

impl ValidationResult {
    pub(crate) fn new(
        rule: impl Into<String>,
        passed: bool,
        error: Option<RuleError>,
        message: impl Into<String>,
        context: ValidationContext,
    ) -> Self {
        Self {
            rule: rule.into(),
            passed,
            error,
            message: message.into(),
            context,
        }
    }

    /// The rule's expression text.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Whether the expression evaluated to `true` without error.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Compile, build or evaluation failure of this rule, if any.
    #[must_use]
    pub fn error(&self) -> Option<&RuleError> {
        self.error.as_ref()
    }

    /// The rule's failure message. Only set when the rule evaluated to a
    /// non-`true` value without error.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn context(&self) -> &ValidationContext {
        &self.context
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "pass" } else { "fail" };
        write!(f, "[{status}] {}", self.rule)?;
        if let Some(err) = &self.error {
            write!(f, " (error: {err})")?;
        } else if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EvalError;

    fn ctx() -> ValidationContext {
        ValidationContext::new("User", "Create").at(0)
    }

    #[test]
    fn accessors() {
        let result = ValidationResult::new("Age > 18", false, None, "too young", ctx());
        assert_eq!(result.rule(), "Age > 18");
        assert!(!result.passed());
        assert!(result.error().is_none());
        assert_eq!(result.message(), "too young");
        assert_eq!(result.context().rule_index(), Some(0));
    }

    #[test]
    fn display_failure_message() {
        let result = ValidationResult::new("Age > 18", false, None, "too young", ctx());
        assert_eq!(result.to_string(), "[fail] Age > 18: too young");
    }

    #[test]
    fn display_error() {
        let result = ValidationResult::new(
            "Details.missing == 'x'",
            false,
            Some(EvalError::NoSuchKey {
                key: "missing".into(),
            }
            .into()),
            "",
            ctx(),
        );
        assert_eq!(
            result.to_string(),
            "[fail] Details.missing == 'x' (error: no such key: 'missing')"
        );
    }

    #[test]
    fn display_pass() {
        let result = ValidationResult::new("true", true, None, "", ctx());
        assert_eq!(result.to_string(), "[pass] true");
    }
}
