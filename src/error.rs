//! Error types surfaced by the library.
//!
//! Two boundaries produce errors: input normalization (per-call, cheap to
//! recover from) and rule-table loading (once, at construction). Rules that
//! fail to fire during a rewrite are not errors; a pass that kills every
//! alternative yields an empty encoding instead of failing.

/// Maximum number of codepoints accepted after normalization.
pub const MAX_INPUT_CHARS: usize = 1000;

/// Errors raised while normalizing an input name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// The input was empty or only whitespace after trimming.
    #[error("input is empty after trimming")]
    Empty,
    /// The input bytes are not valid in any supported encoding
    /// (UTF-8, ISO-8859-1, Windows-1252, ASCII).
    #[error("input bytes are not valid in any supported encoding")]
    InvalidEncoding,
    /// The normalized input exceeds the configured length cap.
    #[error("input exceeds {max} characters after normalization")]
    TooLong {
        /// The cap that was exceeded.
        max: usize,
    },
}

/// Errors raised while loading or parsing rule tables.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// A required rule file could not be read.
    #[error("rule file not found: {0}")]
    FileNotFound(String),
    /// A rule file is not valid JSON or does not match the schema.
    #[error("invalid rule file format")]
    Format(#[from] serde_json::Error),
    /// A rule file is missing a required field.
    #[error("rule file is missing required field `{0}`")]
    MissingField(&'static str),
    /// A context or detect pattern failed to compile.
    #[error("invalid pattern `{pattern}`")]
    Pattern {
        /// The pattern text as it appeared in the rule file.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: Box<regex::Error>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_display() {
        assert_eq!(
            InputError::TooLong { max: 1000 }.to_string(),
            "input exceeds 1000 characters after normalization"
        );
        assert_eq!(InputError::Empty.to_string(), "input is empty after trimming");
    }

    #[test]
    fn test_rule_error_display() {
        let err = RuleError::MissingField("rules");
        assert_eq!(err.to_string(), "rule file is missing required field `rules`");
    }
}
