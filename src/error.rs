use std::path::PathBuf;

use thiserror::Error;

/// Failure to load a rule document into a
/// [`RuleRepository`](crate::RuleRepository).
///
/// Returned by [`RuleRepository::from_file()`](crate::RuleRepository::from_file)
/// and [`RuleRepository::from_yaml()`](crate::RuleRepository::from_yaml).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading rule file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "yaml")]
    #[error("unmarshalling rule document: {0}")]
    Parse(#[from] serde_yaml::Error),
}
