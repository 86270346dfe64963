//! Translation of extended globs into anchored regular expression sources.
//!
//! The translator is a single-pass recursive descent over the pattern. All
//! state lives in a [`CompilationContext`] that is created for one call and
//! dropped at the end of it.

use crate::ExtGlobError;

/// A single character that is not a path separator.
const SEGMENT_CHAR: &str = "[^/]";

/// A pattern that consists of nothing but `**`.
const FULL_GLOBSTAR: &str = "(?:[^/]+(?:/[^/]*)*)?";

/// An optional directory prefix of any depth, used for leading `**/`.
const LEADING_GLOBSTAR: &str = "(?:[^/]+(?:/[^/]*)*/)?";

/// Zero or more `/segment` pairs, used for `/**/` and a trailing `/**`.
const INNER_GLOBSTAR: &str = "(?:/[^/]*)*";

/// A top-level `!(...)` group.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct Negation {
    /// Byte offset of the `!` operator.
    pub position: usize,

    /// The translated alternatives, not yet grouped or anchored.
    pub alternatives: String,
}

/// The result of translating a glob.
///
/// The glob is split at its top-level negated groups: `segments[0]`, then
/// `negations[0]`, then `segments[1]` and so on. Without negated groups there
/// is exactly one segment and it is the whole translation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct Translation {
    /// Unanchored regular expression fragments between negated groups.
    pub segments: Vec<String>,

    /// The negated groups in the order they appear.
    pub negations: Vec<Negation>,
}

/// Anchors a fragment that has no top-level alternation.
pub(crate) fn anchor(fragment: &str) -> String {
    format!("^{fragment}$")
}

/// Translates an extended glob into an anchored regular expression source.
///
/// The returned string starts with `^` and ends with `$`. The regex engine is
/// not involved, so a successful translation can still be rejected later by
/// the engine (see [`crate::ExtGlob::new`]).
///
/// A negated group `!(...)` is not a regular construct and cannot be written
/// as a single expression; globs containing one fail with
/// [`ExtGlobError::NegatedGroup`]. [`crate::ExtGlob`] matches them.
///
/// ```rust
/// # use extglob::compile_to_regex;
/// assert_eq!(compile_to_regex("src/*.rs").unwrap(), r"^src/[^/]*\.rs$");
/// ```
pub fn compile_to_regex(pattern: &str) -> Result<String, ExtGlobError> {
    let translation = translate(pattern)?;
    if let Some(negation) = translation.negations.first() {
        return Err(ExtGlobError::NegatedGroup {
            pattern: pattern.to_string(),
            position: negation.position,
        });
    }
    Ok(anchor(&translation.segments.concat()))
}

pub(crate) fn translate(pattern: &str) -> Result<Translation, ExtGlobError> {
    let mut context = CompilationContext::new(pattern);
    context.fold_leading_globstars();
    context.parse_sequence()?;
    debug_assert_eq!(context.depth, 0);
    debug_assert_eq!(context.position, pattern.len());

    let mut segments = context.segments;
    segments.push(context.output);
    Ok(Translation {
        segments,
        negations: context.negations,
    })
}

/// Cursor and output buffer shared by the recursive calls of one translation.
struct CompilationContext<'p> {
    /// The glob being translated.
    source: &'p str,

    /// Byte offset of the next unread character. Only ever moves forward.
    position: usize,

    /// Number of currently open extglob groups. Decides whether `)` and `|`
    /// are structural or literal.
    depth: usize,

    /// The fragment built since the last negated group. Only appended to.
    output: String,

    /// Finished fragments that precede each entry of `negations`.
    segments: Vec<String>,

    /// Top-level negated groups closed so far.
    negations: Vec<Negation>,
}

impl<'p> CompilationContext<'p> {
    fn new(source: &'p str) -> Self {
        Self {
            source,
            position: 0,
            depth: 0,
            output: String::with_capacity(source.len() * 2),
            segments: Vec::new(),
            negations: Vec::new(),
        }
    }

    fn rest(&self) -> &'p str {
        &self.source[self.position..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn advance(&mut self, bytes: usize) {
        self.position = (self.position + bytes).min(self.source.len());
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.advance(c.len_utf8());
        Some(c)
    }

    fn error_trailing_backslash(&self) -> ExtGlobError {
        ExtGlobError::TrailingBackslash {
            pattern: self.source.to_string(),
        }
    }

    /// Consumes globstars at the very start of the pattern. These have no
    /// preceding `/` to anchor on, so they are handled before the general
    /// loop.
    fn fold_leading_globstars(&mut self) {
        if self.source == "**" {
            self.output.push_str(FULL_GLOBSTAR);
            self.advance(2);
            return;
        }

        while self.rest().starts_with("**/") {
            self.output.push_str(LEADING_GLOBSTAR);
            self.advance(3);
        }
    }

    /// Translates constructs until the input ends or, inside a group, until
    /// the `)` that closes it. The closing `)` is left for the caller.
    fn parse_sequence(&mut self) -> Result<(), ExtGlobError> {
        while let Some(c) = self.peek() {
            match c {
                ')' if self.depth > 0 => return Ok(()),
                '|' if self.depth > 0 => {
                    self.advance(1);
                    self.output.push('|');
                }
                '*' | '?' | '+' | '@' | '!' if self.peek_nth(1) == Some('(') => {
                    self.parse_group(c)?;
                }
                '*' => self.parse_star(),
                '?' => {
                    self.advance(1);
                    self.output.push_str(SEGMENT_CHAR);
                }
                '/' if self.depth == 0 && self.at_inner_globstar() => {
                    self.advance(3);
                    self.output.push_str(INNER_GLOBSTAR);
                }
                '[' => self.parse_class()?,
                '\\' => {
                    self.advance(1);
                    let escaped = self
                        .next_char()
                        .ok_or_else(|| self.error_trailing_backslash())?;
                    self.push_literal(escaped);
                }
                _ => {
                    self.advance(c.len_utf8());
                    self.push_literal(c);
                }
            }
        }
        Ok(())
    }

    /// Returns true if the cursor sits on a `/` that starts either `/**/` or
    /// a `/**` that ends the pattern.
    fn at_inner_globstar(&self) -> bool {
        let rest = self.rest();
        rest == "/**" || rest.starts_with("/**/")
    }

    /// Translates a run of stars. A single star stays within a path segment,
    /// two or more cross separators. If the run is followed by `(` the last
    /// star is left behind to open a group.
    fn parse_star(&mut self) {
        let run = self.rest().bytes().take_while(|&b| b == b'*').count();
        let consumed = if self.rest()[run..].starts_with('(') {
            run - 1
        } else {
            run
        };

        self.advance(consumed);
        if consumed > 1 {
            self.output.push_str(".*");
        } else {
            self.output.push_str(SEGMENT_CHAR);
            self.output.push('*');
        }
    }

    /// Translates an extglob group such as `@(a|b)`. The cursor is on the
    /// operator character.
    fn parse_group(&mut self, operator: char) -> Result<(), ExtGlobError> {
        let start = self.position;
        if operator == '!' && self.depth > 0 {
            return Err(ExtGlobError::NestedNegation {
                pattern: self.source.to_string(),
                position: start,
            });
        }

        self.advance(2);
        self.depth += 1;

        // The alternatives are collected in their own buffer so they can be
        // wrapped once the closing paren is known.
        let outer = std::mem::take(&mut self.output);
        self.parse_sequence()?;
        let alternatives = std::mem::replace(&mut self.output, outer);

        if self.peek() != Some(')') {
            return Err(ExtGlobError::MissingParen {
                pattern: self.source.to_string(),
                position: start,
            });
        }
        self.advance(1);
        self.depth -= 1;

        let quantifier = match operator {
            '*' => "*",
            '?' => "?",
            '+' => "+",
            '@' => "",
            _ => {
                self.push_negation(start, alternatives);
                return Ok(());
            }
        };

        self.output.push_str("(?:");
        self.output.push_str(&alternatives);
        self.output.push(')');
        self.output.push_str(quantifier);
        Ok(())
    }

    /// Closes the current segment at a top-level negated group. The group is
    /// matched separately because "any run that is none of the alternatives"
    /// has no regular expression equivalent.
    fn push_negation(&mut self, position: usize, alternatives: String) {
        debug_assert_eq!(self.depth, 0);
        self.segments.push(std::mem::take(&mut self.output));
        self.negations.push(Negation {
            position,
            alternatives,
        });
    }

    /// Translates a bracket expression. The cursor is on the opening `[`.
    fn parse_class(&mut self) -> Result<(), ExtGlobError> {
        let start = self.position;
        self.advance(1);
        self.output.push('[');

        match self.peek() {
            Some(']') => {
                self.advance(1);
                self.output.push_str(r"\]");
            }
            Some('-') => {
                self.advance(1);
                self.output.push('-');
            }
            Some('!' | '^') => {
                self.advance(1);
                self.output.push('^');
                if self.peek() == Some(']') {
                    self.advance(1);
                    self.output.push_str(r"\]");
                }
            }
            _ => {}
        }

        loop {
            let Some(c) = self.peek() else {
                return Err(ExtGlobError::MissingBracket {
                    pattern: self.source.to_string(),
                    position: start,
                });
            };

            match c {
                ']' => {
                    self.advance(1);
                    self.output.push(']');
                    return Ok(());
                }
                '[' => {
                    if let Some(token) = posix_class_token(self.rest()) {
                        self.output.push_str(token);
                        self.advance(token.len());
                    } else {
                        self.advance(1);
                        self.output.push_str(r"\[");
                    }
                }
                '\\' => {
                    self.advance(1);
                    let escaped = self
                        .next_char()
                        .ok_or_else(|| self.error_trailing_backslash())?;
                    self.push_class_literal(escaped);
                }
                '&' | '~' => {
                    self.advance(1);
                    self.push_class_literal(c);
                }
                _ => {
                    self.advance(c.len_utf8());
                    self.output.push(c);
                }
            }
        }
    }

    /// Appends a character that must match itself outside a bracket
    /// expression.
    fn push_literal(&mut self, c: char) {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
        ) {
            self.output.push('\\');
        }
        self.output.push(c);
    }

    /// Appends a character that must match itself inside a bracket
    /// expression.
    fn push_class_literal(&mut self, c: char) {
        if matches!(c, '\\' | '[' | ']' | '^' | '-' | '&' | '~') {
            self.output.push('\\');
        }
        self.output.push(c);
    }
}

/// Returns the `[:name:]` token at the start of `rest`, if there is one.
fn posix_class_token(rest: &str) -> Option<&str> {
    let name = rest.strip_prefix("[:")?;
    let name_len = name.bytes().take_while(u8::is_ascii_alphabetic).count();
    if name_len > 0 && name[name_len..].starts_with(":]") {
        Some(&rest[..name_len + 4])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use insta::assert_debug_snapshot;
    use rstest::rstest;

    #[rstest]
    #[case("", "^$")]
    #[case("index.html", r"^index\.html$")]
    #[case("asdf/*.jpg", r"^asdf/[^/]*\.jpg$")]
    #[case("file?.txt", r"^file[^/]\.txt$")]
    #[case("asdf/**.jpg", r"^asdf/.*\.jpg$")]
    #[case("a/***", "^a/.*$")]
    #[case("**", r"^(?:[^/]+(?:/[^/]*)*)?$")]
    #[case("**/*.js", r"^(?:[^/]+(?:/[^/]*)*/)?[^/]*\.js$")]
    #[case("**/**/a", r"^(?:[^/]+(?:/[^/]*)*/)?(?:[^/]+(?:/[^/]*)*/)?a$")]
    #[case("a/b/**/*.js", r"^a/b(?:/[^/]*)*/[^/]*\.js$")]
    #[case("a/**", r"^a(?:/[^/]*)*$")]
    #[case("asdf/*.@(jpg|jpeg)", r"^asdf/[^/]*\.(?:jpg|jpeg)$")]
    #[case("*(f*(o))", r"^(?:f(?:o)*)*$")]
    #[case("a+(b|c)d", r"^a(?:b|c)+d$")]
    #[case("b?(a|b)", r"^b(?:a|b)?$")]
    #[case("**(a)", r"^[^/]*(?:a)*$")]
    #[case("a+b@c!d", r"^a\+b@c!d$")]
    #[case("a)b|c", r"^a\)b\|c$")]
    #[case("$(x){y}^", r"^\$\(x\)\{y\}\^$")]
    #[case(r"\*\?\d", r"^\*\?d$")]
    fn test_translation(#[case] glob: &str, #[case] expected: &str) {
        assert_eq!(compile_to_regex(glob).unwrap(), expected);
    }

    #[rstest]
    #[case("a[^[:alnum:]]b", "^a[^[:alnum:]]b$")]
    #[case("[!]a]", r"^[^\]a]$")]
    #[case("[]a]", r"^[\]a]$")]
    #[case("[-a]", "^[-a]$")]
    #[case("[a-z0-9]", "^[a-z0-9]$")]
    #[case("[[]", r"^[\[]$")]
    #[case("[a&&b~~c]", r"^[a\&\&b\~\~c]$")]
    #[case(r"[\]\d]", r"^[\]d]$")]
    #[case("[[:alpha]", r"^[\[:alpha]$")]
    fn test_character_classes(#[case] glob: &str, #[case] expected: &str) {
        assert_eq!(compile_to_regex(glob).unwrap(), expected);
    }

    #[test]
    fn test_negated_group() {
        let translation = translate("!(foo).js").unwrap();
        assert_eq!(translation.segments, vec!["", r"\.js"]);
        assert_eq!(
            translation.negations,
            vec![Negation {
                position: 0,
                alternatives: "foo".to_string()
            }]
        );

        assert_debug_snapshot!(translate("**/!(*.min).js").unwrap(), @r#"
        Translation {
            segments: [
                "(?:[^/]+(?:/[^/]*)*/)?",
                "\\.js",
            ],
            negations: [
                Negation {
                    position: 3,
                    alternatives: "[^/]*\\.min",
                },
            ],
        }
        "#);

        let translation = translate("a/!(b|c)/**").unwrap();
        assert_eq!(translation.segments, vec!["a/", "(?:/[^/]*)*"]);
        assert_eq!(translation.negations[0].alternatives, "b|c");
    }

    #[test]
    fn test_negated_group_is_not_a_regex() {
        assert_matches!(
            compile_to_regex("x/!(a)"),
            Err(ExtGlobError::NegatedGroup { pattern, position: 2 }) if pattern == "x/!(a)"
        );
        assert!(translate("*.@(jpg|png)").unwrap().negations.is_empty());
        assert!(translate("a!b").unwrap().negations.is_empty());
    }

    #[test]
    fn test_negated_groups_translate_in_linear_size() {
        for count in [1, 8, 32, 256] {
            let glob = "!(a)*".repeat(count);
            let translation = translate(&glob).unwrap();
            assert_eq!(translation.negations.len(), count);
            assert_eq!(translation.segments.len(), count + 1);

            let size: usize = translation.segments.iter().map(String::len).sum::<usize>()
                + translation
                    .negations
                    .iter()
                    .map(|negation| negation.alternatives.len())
                    .sum::<usize>();
            assert!(size <= 2 * glob.len(), "{count} groups translated to {size} bytes");
        }

        let translation = translate(&"!(a)".repeat(32)).unwrap();
        assert!(translation.segments.iter().all(String::is_empty));
        assert!(translation
            .negations
            .iter()
            .all(|negation| negation.alternatives == "a"));
    }

    #[test]
    fn test_trailing_backslash() {
        assert_matches!(
            compile_to_regex(r"foo\"),
            Err(ExtGlobError::TrailingBackslash { pattern }) if pattern == r"foo\"
        );
        assert_matches!(
            compile_to_regex(r"[a\"),
            Err(ExtGlobError::TrailingBackslash { .. })
        );
    }

    #[test]
    fn test_missing_bracket() {
        assert_matches!(
            compile_to_regex("a/[bc"),
            Err(ExtGlobError::MissingBracket { pattern, position: 2 }) if pattern == "a/[bc"
        );
        assert_matches!(
            compile_to_regex("[!]"),
            Err(ExtGlobError::MissingBracket { position: 0, .. })
        );
    }

    #[test]
    fn test_missing_paren() {
        assert_matches!(
            compile_to_regex("x*(a|b"),
            Err(ExtGlobError::MissingParen { pattern, position: 1 }) if pattern == "x*(a|b"
        );
        // The innermost unclosed group is reported.
        assert_matches!(
            compile_to_regex("@(a|+(b)|?(c"),
            Err(ExtGlobError::MissingParen { position: 9, .. })
        );
    }

    #[test]
    fn test_nested_negation() {
        assert_matches!(
            compile_to_regex("@(a|!(b))"),
            Err(ExtGlobError::NestedNegation { position: 4, .. })
        );
        assert_matches!(
            compile_to_regex("!(!(a))"),
            Err(ExtGlobError::NestedNegation { position: 2, .. })
        );
    }

    #[test]
    fn test_non_ascii() {
        assert_eq!(compile_to_regex("ü*.@(jpg|jpeg)").unwrap(), r"^ü[^/]*\.(?:jpg|jpeg)$");
        assert_eq!(compile_to_regex("[äö]").unwrap(), "^[äö]$");
    }

    #[test]
    fn test_deterministic() {
        let glob = "**/assets/*.@(png|jp?(e)g)";
        assert_eq!(compile_to_regex(glob), compile_to_regex(glob));
    }
}
