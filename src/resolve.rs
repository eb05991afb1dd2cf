use std::collections::HashSet;

use tracing::debug;

use crate::{Record, RuleEntry, RuleRepository, DEFAULT_OPERATION};

/// Rules that apply to `record` for `operation`.
///
/// The record's type bucket is looked up by [`Record::type_name()`]. The
/// enabled entries of its [`DEFAULT_OPERATION`] bucket come first, then the
/// enabled entries of the `operation` bucket, each in declaration order.
/// An entry whose expression text was already taken is skipped, so the
/// first occurrence wins. Retained entries keep only their recursively
/// enabled chained rules. Unknown types yield no rules.
///
/// ```
/// use ruletrail::{rules_for, FieldVisitor, Record, RuleEntry, RuleRepository};
///
/// struct User { age: i64 }
///
/// impl Record for User {
///     fn visit_fields(&self, v: &mut FieldVisitor<'_>) {
///         v.field("Age", self.age);
///     }
/// }
///
/// let repo = RuleRepository::new()
///     .with_rules("User", "Default", vec![RuleEntry::new("Age > 0")])
///     .with_rules("User", "Create", vec![RuleEntry::new("Age > 0"), RuleEntry::new("Age < 150")]);
///
/// let rules = rules_for(&User { age: 30 }, "Create", &repo);
/// assert_eq!(rules.len(), 2);
/// ```
#[must_use]
pub fn rules_for<R: Record + ?Sized>(
    record: &R,
    operation: &str,
    repository: &RuleRepository,
) -> Vec<RuleEntry> {
    resolve(repository, &record.type_name(), operation)
}

pub(crate) fn resolve(
    repository: &RuleRepository,
    type_name: &str,
    operation: &str,
) -> Vec<RuleEntry> {
    let Some(buckets) = repository.buckets(type_name) else {
        debug!(type_name, operation, "no rules declared for type");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    let mut buckets_used = 0_usize;

    // Requesting the default operation itself visits the bucket once.
    let names = [DEFAULT_OPERATION, operation];
    let names = if operation == DEFAULT_OPERATION {
        &names[..1]
    } else {
        &names[..]
    };

    for entries in names.iter().filter_map(|name| buckets.get(*name)) {
        buckets_used += 1;
        for entry in entries {
            if entry.enabled && seen.insert(entry.rule.as_str()) {
                merged.push(entry.enabled_subtree());
            }
        }
    }

    debug!(
        type_name,
        operation,
        buckets = buckets_used,
        rules = merged.len(),
        "resolved rules"
    );
    merged
}
