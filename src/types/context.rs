use std::fmt;

use super::repository::{RuleRepository, DEFAULT_OPERATION};
use crate::Record;

const CHAIN_SEPARATOR: &str = " > ";

/// Where a rule came from and how it was reached.
///
/// The root context of a run comes from [`for_record()`](Self::for_record)
/// or [`new()`](Self::new); the validator derives one per evaluated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    type_name: String,
    operation: String,
    chain_path: String,
    rule_index: Option<usize>,
    parent_rule: String,
}

impl ValidationContext {
    /// A root context with an empty chain path and no rule index.
    #[must_use]
    pub fn new(type_name: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            operation: operation.into(),
            chain_path: String::new(),
            rule_index: None,
            parent_rule: String::new(),
        }
    }

    /// Root context for validating `record`, with the operation settled
    /// against the repository.
    ///
    /// - a type with no rules is validated as [`DEFAULT_OPERATION`];
    /// - an empty `operation` picks the type's only bucket, or
    ///   [`DEFAULT_OPERATION`] when it has several;
    /// - otherwise `operation` is kept as given.
    #[must_use]
    pub fn for_record<R: Record + ?Sized>(
        record: &R,
        operation: &str,
        repository: &RuleRepository,
    ) -> Self {
        let type_name = record.type_name();
        let operation = match repository.operations(&type_name) {
            None => DEFAULT_OPERATION,
            Some(ops) if operation.is_empty() => match ops.as_slice() {
                [only] => *only,
                _ => DEFAULT_OPERATION,
            },
            Some(_) => operation,
        };
        Self::new(type_name, operation)
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Breadcrumb of chain steps, e.g. `then > then`. Empty for top-level
    /// rules.
    #[must_use]
    pub fn chain_path(&self) -> &str {
        &self.chain_path
    }

    /// Position among sibling rules, `None` for synthesized contexts.
    #[must_use]
    pub fn rule_index(&self) -> Option<usize> {
        self.rule_index
    }

    /// Expression of the rule whose success led here, empty at top level.
    #[must_use]
    pub fn parent_rule(&self) -> &str {
        &self.parent_rule
    }

    /// Context of the rule at `index` in the current sibling list.
    pub(crate) fn at(&self, index: usize) -> Self {
        Self {
            rule_index: Some(index),
            ..self.clone()
        }
    }

    /// Context of the rule at `index` that failed at a setup stage.
    pub(crate) fn failed_at(&self, index: usize, marker: &str) -> Self {
        Self {
            chain_path: extend_chain(&self.chain_path, marker),
            rule_index: Some(index),
            ..self.clone()
        }
    }

    /// Context for the chained rules of `parent_rule`.
    pub(crate) fn chained(&self, parent_rule: &str) -> Self {
        Self {
            type_name: self.type_name.clone(),
            operation: self.operation.clone(),
            chain_path: extend_chain(&self.chain_path, "then"),
            rule_index: None,
            parent_rule: parent_rule.to_owned(),
        }
    }
}

fn extend_chain(current: &str, next: &str) -> String {
    if current.is_empty() {
        next.to_owned()
    } else {
        format!("{current}{CHAIN_SEPARATOR}{next}")
    }
}

impl fmt::Display for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.operation)?;
        if !self.chain_path.is_empty() {
            write!(f, " [{}]", self.chain_path)?;
        }
        if let Some(index) = self.rule_index {
            write!(f, " #{index}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldVisitor, RuleEntry};

    struct User;

    impl Record for User {
        fn visit_fields(&self, _: &mut FieldVisitor<'_>) {}
    }

    #[test]
    fn unknown_type_forces_default() {
        let ctx = ValidationContext::for_record(&User, "Create", &RuleRepository::new());
        assert_eq!(ctx.type_name(), "User");
        assert_eq!(ctx.operation(), DEFAULT_OPERATION);
        assert_eq!(ctx.rule_index(), None);
        assert!(ctx.chain_path().is_empty());
        assert!(ctx.parent_rule().is_empty());
    }

    #[test]
    fn empty_operation_infers_sole_bucket() {
        let repo = RuleRepository::new().with_rules("User", "Create", vec![RuleEntry::new("true")]);
        let ctx = ValidationContext::for_record(&User, "", &repo);
        assert_eq!(ctx.operation(), "Create");
    }

    #[test]
    fn empty_operation_with_several_buckets_is_default() {
        let repo = RuleRepository::new()
            .with_rules("User", "Create", vec![])
            .with_rules("User", "Update", vec![]);
        let ctx = ValidationContext::for_record(&User, "", &repo);
        assert_eq!(ctx.operation(), DEFAULT_OPERATION);
    }

    #[test]
    fn explicit_operation_is_kept() {
        let repo = RuleRepository::new().with_rules("User", "Create", vec![]);
        let ctx = ValidationContext::for_record(&User, "Archive", &repo);
        assert_eq!(ctx.operation(), "Archive");
    }

    #[test]
    fn chain_paths_extend_without_leading_separator() {
        let root = ValidationContext::new("User", "Create");
        assert_eq!(root.failed_at(2, "compileError").chain_path(), "compileError");

        let child = root.chained("Age > 18");
        assert_eq!(child.chain_path(), "then");
        assert_eq!(child.rule_index(), None);
        assert_eq!(child.parent_rule(), "Age > 18");

        let grandchild = child.at(0).chained("Email != ''");
        assert_eq!(grandchild.chain_path(), "then > then");
        assert_eq!(
            grandchild.failed_at(1, "programError").chain_path(),
            "then > then > programError"
        );
    }

    #[test]
    fn display() {
        let ctx = ValidationContext::new("User", "Create").chained("x").at(3);
        assert_eq!(ctx.to_string(), "User.Create [then] #3");
    }
}
