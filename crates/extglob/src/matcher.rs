use std::{
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
    str::FromStr,
};

use crate::{
    compiler::{anchor, translate},
    ExtGlobError,
};

/// The engine that evaluates a translated glob.
#[derive(Debug, Clone)]
enum Engine {
    /// Globs without negated groups are a single regular expression.
    Regex(regex::Regex),
    /// Globs with negated groups are matched piece by piece.
    Segmented(Segmented),
}

/// A glob split at its top-level `!(...)` groups.
///
/// `segments` has one more entry than `negations`; the glob reads
/// `segments[0] negations[0] segments[1] ...`. All expressions are anchored.
#[derive(Debug, Clone)]
struct Segmented {
    segments: Vec<regex::Regex>,
    negations: Vec<regex::Regex>,
}

impl Segmented {
    /// Tracks, for every character boundary of `candidate`, whether the
    /// pieces read so far can end there. A negated group accepts any run
    /// without `/` that none of its alternatives matches in full.
    fn matches(&self, candidate: &str) -> bool {
        let Some((first, rest)) = self.segments.split_first() else {
            return false;
        };

        let offsets: Vec<usize> = candidate
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(candidate.len()))
            .collect();

        let mut reachable = vec![false; offsets.len()];
        reachable[0] = true;
        reachable = advance(&reachable, candidate, &offsets, |run| first.is_match(run));

        for (negation, segment) in self.negations.iter().zip(rest) {
            reachable = advance(&reachable, candidate, &offsets, |run| {
                !run.contains('/') && !negation.is_match(run)
            });
            reachable = advance(&reachable, candidate, &offsets, |run| segment.is_match(run));
            if !reachable.contains(&true) {
                return false;
            }
        }

        reachable.last().copied().unwrap_or(false)
    }
}

/// Returns for every boundary whether it is reached from a reachable boundary
/// at or before it by a slice that `accepts`.
fn advance(
    reachable: &[bool],
    candidate: &str,
    offsets: &[usize],
    accepts: impl Fn(&str) -> bool,
) -> Vec<bool> {
    (0..offsets.len())
        .map(|end| {
            (0..=end).any(|start| {
                reachable[start] && accepts(&candidate[offsets[start]..offsets[end]])
            })
        })
        .collect()
}

/// A compiled extended glob.
///
/// The glob is translated once when constructed; matching is always anchored,
/// so a candidate has to match in its entirety.
///
/// ```rust
/// # use extglob::ExtGlob;
/// let glob = ExtGlob::new("assets/**/*.@(png|jp?(e)g)").unwrap();
/// assert!(glob.matches("assets/logo.png"));
/// assert!(glob.matches("assets/img/2024/header.jpeg"));
/// assert!(!glob.matches("assets/logo.svg"));
///
/// let glob = ExtGlob::new("!(*.min).js").unwrap();
/// assert!(glob.matches("app.js"));
/// assert!(!glob.matches("app.min.js"));
/// ```
#[derive(Debug, Clone)]
pub struct ExtGlob {
    pattern: String,
    engine: Engine,
}

impl ExtGlob {
    /// Compiles a glob.
    ///
    /// # Errors
    /// Returns an [`ExtGlobError`] if the glob is malformed or if a translated
    /// expression is rejected by the regex engine.
    pub fn new(pattern: &str) -> Result<Self, ExtGlobError> {
        let translation = translate(pattern)?;
        let compile = |source: String| {
            regex::Regex::new(&source).map_err(|err| ExtGlobError::InvalidRegex {
                pattern: pattern.to_string(),
                regex: source,
                reason: err.to_string(),
            })
        };

        let engine = if translation.negations.is_empty() {
            Engine::Regex(compile(anchor(&translation.segments.concat()))?)
        } else {
            Engine::Segmented(Segmented {
                segments: translation
                    .segments
                    .iter()
                    .map(|segment| compile(anchor(segment)))
                    .collect::<Result<_, _>>()?,
                negations: translation
                    .negations
                    .iter()
                    .map(|negation| compile(anchor(&format!("(?:{})", negation.alternatives))))
                    .collect::<Result<_, _>>()?,
            })
        };

        tracing::debug!("compiled glob '{pattern}' to {engine:?}");

        Ok(Self {
            pattern: pattern.to_string(),
            engine,
        })
    }

    /// Returns true if the whole `candidate` matches this glob.
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.engine {
            Engine::Regex(regex) => regex.is_match(candidate),
            Engine::Segmented(segmented) => segmented.matches(candidate),
        }
    }

    /// Returns the glob this matcher was compiled from.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns the anchored regular expression the glob was translated to, or
    /// `None` if the glob contains a negated group and is matched piecewise.
    pub fn regex_source(&self) -> Option<&str> {
        match &self.engine {
            Engine::Regex(regex) => Some(regex.as_str()),
            Engine::Segmented(_) => None,
        }
    }
}

impl Hash for ExtGlob {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
    }
}

impl PartialEq for ExtGlob {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for ExtGlob {}

impl FromStr for ExtGlob {
    type Err = ExtGlobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExtGlob::new(s)
    }
}

impl Display for ExtGlob {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ExtGlob {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.pattern)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ExtGlob {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let pattern = String::deserialize(deserializer)?;
        ExtGlob::new(&pattern).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case(
        "asdf/*.jpg",
        &["asdf/asdf.jpg", "asdf/asdf_asdf.jpg", "asdf/.jpg", "asdf/x.jpg"],
        &["asdf/asdf/asdf.jpg", "asdf/a/b.jpg", "xxxasdf/asdf.jpgxxx"]
    )]
    #[case(
        "asdf/**.jpg",
        &["asdf/asdf.jpg", "asdf/asdf_asdf.jpg", "asdf/a/b.jpg", "asdf/asdf/asdf/asdf/asdf.jpg"],
        &["/asdf/asdf.jpg", "asdff/asdf.jpg", "xxxasdf/asdf.jpgxxx"]
    )]
    #[case(
        "asdf/*.@(jpg|jpeg)",
        &["asdf/asdf.jpg", "asdf/asdf_asdf.jpeg", "asdf/x.jpg", "asdf/x.jpeg"],
        &["/asdf/asdf.jpg", "asdff/asdf.jpg", "asdf/x.png", "asdf/x.jpgjpeg"]
    )]
    #[case("**/*.js", &["a.js", "a/b.js", "a/b/c.js", ".js"], &["a.jsx", "a/b.ts", "/a.js"])]
    #[case("a/b/**/*.js", &["a/b/z.js", "a/b/c/z.js", "a/b/c/d/e/z.js"], &["a/z.js", "a/bz.js"])]
    #[case("a/**", &["a", "a/", "a/b", "a/b/c"], &["ab", "b/a"])]
    #[case("**", &["", "a", "a/b", "a/b/c.d"], &["/a"])]
    #[case("*(f*(o))", &["", "fofo", "ffo", "foooofo"], &["ofooofoofofooo", "fox"])]
    #[case("a+(b|c)d", &["abd", "acd", "abcbd"], &["ad", "abed"])]
    #[case("b?(a|b)", &["b", "ba", "bb"], &["baa", "bab"])]
    #[case("a[^[:alnum:]]b", &["a.b", "a,b", "a b"], &["a1b", "aZb", "ab"])]
    #[case("[!a-c]x", &["dx", "Zx"], &["ax", "cx", "x"])]
    #[case("file?.txt", &["file1.txt", "fileA.txt"], &["file.txt", "file12.txt", "file/.txt"])]
    fn test_matches(#[case] glob: &str, #[case] matches: &[&str], #[case] non_matches: &[&str]) {
        let glob = ExtGlob::new(glob).unwrap();
        for candidate in matches {
            assert!(glob.matches(candidate), "{glob} should match {candidate}");
        }
        for candidate in non_matches {
            assert!(!glob.matches(candidate), "{glob} should not match {candidate}");
        }
    }

    #[rstest]
    #[case("index.html")]
    #[case("a.b+c(d)[e]{f}^g$h|i")]
    #[case("path/with spaces/and-dashes_#&~")]
    #[case("ünïcödé/文件")]
    fn test_literal_globs_match_only_themselves(#[case] literal: &str) {
        // Brackets are glob syntax, so escape them to make the glob literal.
        let glob = literal.replace('[', r"\[");
        let glob = ExtGlob::new(&glob).unwrap();
        assert!(glob.matches(literal));
        assert!(!glob.matches(&format!("{literal}x")));
        assert!(!glob.matches(&format!("x{literal}")));
        assert!(!glob.matches(""));
    }

    #[rstest]
    #[case("!(foo).js", &["bar.js", "fo.js", "foobar.js", "foo.bar.js", ".js"], &["foo.js", "a/bar.js"])]
    #[case("a/!(b|c)", &["a/d", "a/bc", "a/"], &["a/b", "a/c", "a/d/e"])]
    #[case("!(*.min).js", &["app.js", "min.js"], &["app.min.js"])]
    #[case("!(a)-!(b)", &["x-y", "ab-y", "-"], &["a-b", "a-y", "x-b"])]
    #[case("!(a)*", &["", "a", "ab", "abc", "b"], &["a/b", "/"])]
    #[case("!(a)?", &["a", "b", "ba", "aaa"], &["", "aa", "a/"])]
    #[case(
        "**/!(*.min).js",
        &["app.js", "src/app.js", "a/b/app.js", "src/min.js"],
        &["app.min.js", "src/app.min.js", "src/app.ts", "a/b/app.min.js"]
    )]
    #[case("a/!(b)/**", &["a/", "a/c", "a/c/d/e", "a/bb/x"], &["a", "a/b", "a/b/c", "b/c"])]
    #[case("!(x)[0-9].txt", &["a1.txt", "1.txt", "x12.txt"], &["x1.txt", "a.txt", "a/1.txt"])]
    fn test_negated_groups(
        #[case] glob: &str,
        #[case] matches: &[&str],
        #[case] non_matches: &[&str],
    ) {
        let glob = ExtGlob::new(glob).unwrap();
        for candidate in matches {
            assert!(glob.matches(candidate), "{glob} should match {candidate}");
        }
        for candidate in non_matches {
            assert!(!glob.matches(candidate), "{glob} should not match {candidate}");
        }
    }

    #[test]
    fn test_many_negated_groups() {
        let glob = ExtGlob::new(&"!(a)".repeat(32)).unwrap();
        assert_eq!(glob.regex_source(), None);
        assert!(glob.matches(""));
        assert!(glob.matches("b"));
        assert!(glob.matches("aa"));
        // However the runs are split, one of them is exactly `a`.
        assert!(!glob.matches("a"));
        assert!(!glob.matches("a/b"));
    }

    #[test]
    fn test_rejected_by_engine() {
        assert_matches!(
            ExtGlob::new("[[:nonsense:]]"),
            Err(ExtGlobError::InvalidRegex { pattern, regex, .. })
                if pattern == "[[:nonsense:]]" && regex == "^[[:nonsense:]]$"
        );
        assert_matches!(
            ExtGlob::new("[z-a]"),
            Err(ExtGlobError::InvalidRegex { .. })
        );
    }

    #[test]
    fn test_syntax_errors_carry_pattern() {
        let err = ExtGlob::new("*.@(jpg|png").unwrap_err();
        assert_eq!(err.pattern(), "*.@(jpg|png");
        assert_eq!(
            err.to_string(),
            "invalid glob '*.@(jpg|png': unterminated group starting at offset 2"
        );
    }

    #[test]
    fn test_equality_and_display() {
        let a: ExtGlob = "*.@(jpg|png)".parse().unwrap();
        let b = ExtGlob::new("*.@(jpg|png)").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, ExtGlob::new("*.@(png|jpg)").unwrap());
        assert_eq!(a.to_string(), "*.@(jpg|png)");
        assert_eq!(a.as_str(), "*.@(jpg|png)");
        assert_eq!(a.regex_source(), Some(r"^[^/]*\.(?:jpg|png)$"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() {
        let glob: ExtGlob = serde_json::from_str(r#""/blog/**""#).unwrap();
        assert!(glob.matches("/blog/2024/post"));
        assert_eq!(serde_json::to_string(&glob).unwrap(), r#""/blog/**""#);

        let err = serde_json::from_str::<ExtGlob>(r#""[abc""#).unwrap_err();
        assert!(err.to_string().contains("unterminated character class"));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExtGlob>();
    }
}
