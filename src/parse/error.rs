use thiserror::Error;

/// Expression text that is not a single well-formed expression.
///
/// `offset` is the byte position in the source where parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at offset {offset}: {reason}")]
pub struct ParseError {
    offset: usize,
    reason: String,
}

impl ParseError {
    pub(crate) fn at(offset: usize, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            offset,
            reason: if reason.is_empty() {
                "unexpected input".to_owned()
            } else {
                reason
            },
        }
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// What the parser expected at [`offset`](Self::offset).
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
