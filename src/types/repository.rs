use std::collections::BTreeMap;
use std::fmt;

use super::rule::RuleEntry;

/// Name of the operation bucket whose rules apply to every operation of a
/// type.
pub const DEFAULT_OPERATION: &str = "Default";

/// Rules keyed by record type name, then by operation name.
///
/// The [`DEFAULT_OPERATION`] bucket of a type is merged into every operation
/// of that type by [`rules_for()`](Self::rules_for). A repository is
/// immutable while validation runs and can be shared behind `Arc`.
///
/// # Example
///
/// ```
/// use ruletrail::{RuleEntry, RuleRepository};
///
/// let repo = RuleRepository::new()
///     .with_rules("User", "Default", vec![RuleEntry::new("Name != ''")])
///     .with_rules("User", "Create", vec![RuleEntry::new("Age >= 18")]);
///
/// let rules = repo.rules_for("User", "Create");
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules[0].rule, "Name != ''");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "yaml",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct RuleRepository {
    types: BTreeMap<String, BTreeMap<String, Vec<RuleEntry>>>,
}

impl RuleRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append entries to the bucket of `type_name` and `operation`.
    pub fn insert(&mut self, type_name: &str, operation: &str, entries: Vec<RuleEntry>) {
        self.types
            .entry(type_name.to_owned())
            .or_default()
            .entry(operation.to_owned())
            .or_default()
            .extend(entries);
    }

    /// Builder form of [`insert()`](Self::insert).
    #[must_use]
    pub fn with_rules(mut self, type_name: &str, operation: &str, entries: Vec<RuleEntry>) -> Self {
        self.insert(type_name, operation, entries);
        self
    }

    /// Whether any bucket is declared for the type.
    #[must_use]
    pub fn contains_type(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Operation buckets of a type in name order, or `None` for an unknown
    /// type.
    #[must_use]
    pub fn operations(&self, type_name: &str) -> Option<Vec<&str>> {
        self.types
            .get(type_name)
            .map(|ops| ops.keys().map(String::as_str).collect())
    }

    /// The raw entries of one bucket, disabled entries included.
    #[must_use]
    pub fn bucket(&self, type_name: &str, operation: &str) -> Option<&[RuleEntry]> {
        self.types
            .get(type_name)
            .and_then(|ops| ops.get(operation))
            .map(Vec::as_slice)
    }

    /// Number of declared record types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Merged, deduplicated and enabled-filtered rules for a type name and
    /// operation. See [`rules_for()`](crate::rules_for).
    #[must_use]
    pub fn rules_for(&self, type_name: &str, operation: &str) -> Vec<RuleEntry> {
        crate::resolve::resolve(self, type_name, operation)
    }

    pub(crate) fn buckets(&self, type_name: &str) -> Option<&BTreeMap<String, Vec<RuleEntry>>> {
        self.types.get(type_name)
    }
}

#[cfg(feature = "yaml")]
impl RuleRepository {
    /// Parse a rule document of the form
    /// `Type: { Operation: [ {rule, enabled, message, then} ] }`.
    ///
    /// An empty document yields an empty repository.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`](crate::LoadError::Parse) if the document
    /// is malformed.
    pub fn from_yaml(input: &str) -> Result<Self, crate::LoadError> {
        let parsed: Option<Self> = serde_yaml::from_str(input)?;
        Ok(parsed.unwrap_or_default())
    }

    /// Read and parse a rule document file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`](crate::LoadError::Read) if the file cannot
    /// be read and [`LoadError::Parse`](crate::LoadError::Parse) if it is
    /// malformed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::LoadError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| crate::LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&input)
    }
}

impl fmt::Display for RuleRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buckets: usize = self.types.values().map(BTreeMap::len).sum();
        write!(
            f,
            "RuleRepository({} types, {} operations)",
            self.types.len(),
            buckets,
        )
    }
}
