/// A rule entry: a boolean expression with an on/off switch, the message
/// reported when it fails, and chained rules evaluated only when it passes.
///
/// Entries are usually loaded from a rule document (see
/// [`RuleRepository::from_yaml()`](super::RuleRepository::from_yaml)) or
/// built in code:
///
/// ```
/// use ruletrail::RuleEntry;
///
/// let entry = RuleEntry::new("Age > 18")
///     .with_message("must be an adult")
///     .then(RuleEntry::new("Email != ''").with_message("email required"));
///
/// assert!(entry.enabled);
/// assert_eq!(entry.then.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "yaml", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleEntry {
    /// Expression text. Also the identity used for deduplication.
    pub rule: String,
    /// Disabled entries and their whole `then` subtree are never evaluated.
    #[cfg_attr(feature = "yaml", serde(default))]
    pub enabled: bool,
    #[cfg_attr(
        feature = "yaml",
        serde(default, skip_serializing_if = "String::is_empty")
    )]
    pub message: String,
    #[cfg_attr(
        feature = "yaml",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub then: Vec<RuleEntry>,
}

impl RuleEntry {
    /// Create an enabled entry with no message and no chained rules.
    #[must_use]
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            enabled: true,
            message: String::new(),
            then: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Append a chained rule, evaluated only if this one passes.
    #[must_use]
    pub fn then(mut self, child: RuleEntry) -> Self {
        self.then.push(child);
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Copy of this entry keeping only recursively enabled chained rules.
    #[must_use]
    pub(crate) fn enabled_subtree(&self) -> Self {
        Self {
            rule: self.rule.clone(),
            enabled: self.enabled,
            message: self.message.clone(),
            then: self
                .then
                .iter()
                .filter(|child| child.enabled)
                .map(RuleEntry::enabled_subtree)
                .collect(),
        }
    }
}
