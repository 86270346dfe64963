use thiserror::Error;

/// An error that can occur when compiling an extended glob.
///
/// Every variant carries the original pattern so callers can name the
/// offending rule without keeping the input around.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ExtGlobError {
    /// The pattern ends with an unescaped `\`.
    #[error("invalid glob '{pattern}': trailing backslash")]
    TrailingBackslash {
        /// The invalid glob
        pattern: String,
    },

    /// A character class was opened with `[` but never closed.
    #[error("invalid glob '{pattern}': unterminated character class starting at offset {position}")]
    MissingBracket {
        /// The invalid glob
        pattern: String,
        /// Byte offset of the opening `[`
        position: usize,
    },

    /// An extglob group such as `@(` was opened but never closed.
    #[error("invalid glob '{pattern}': unterminated group starting at offset {position}")]
    MissingParen {
        /// The invalid glob
        pattern: String,
        /// Byte offset of the group operator
        position: usize,
    },

    /// A `!(` group was opened inside another extglob group.
    #[error("invalid glob '{pattern}': negated group at offset {position} cannot be nested inside another group")]
    NestedNegation {
        /// The invalid glob
        pattern: String,
        /// Byte offset of the `!` operator
        position: usize,
    },

    /// The glob contains a `!(` group, which has no single regular expression
    /// equivalent. Only returned by [`crate::compile_to_regex`].
    #[error("invalid glob '{pattern}': negated group at offset {position} cannot be written as a single regular expression")]
    NegatedGroup {
        /// The invalid glob
        pattern: String,
        /// Byte offset of the `!` operator
        position: usize,
    },

    /// The translated expression was rejected by the regex engine.
    #[error("invalid glob '{pattern}': translated expression '{regex}' was rejected: {reason}")]
    InvalidRegex {
        /// The invalid glob
        pattern: String,
        /// The expression that was handed to the engine
        regex: String,
        /// The message reported by the engine
        reason: String,
    },
}

impl ExtGlobError {
    /// Returns the pattern that failed to compile.
    pub fn pattern(&self) -> &str {
        match self {
            ExtGlobError::TrailingBackslash { pattern }
            | ExtGlobError::MissingBracket { pattern, .. }
            | ExtGlobError::MissingParen { pattern, .. }
            | ExtGlobError::NestedNegation { pattern, .. }
            | ExtGlobError::NegatedGroup { pattern, .. }
            | ExtGlobError::InvalidRegex { pattern, .. } => pattern,
        }
    }
}
