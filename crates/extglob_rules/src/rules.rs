//! Compiled hosting rules and their evaluation against request paths.

use extglob::{ExtGlob, ExtGlobError};

use crate::manifest::{Header, HostingManifest};

/// The status code used for redirects that do not specify one.
pub const DEFAULT_REDIRECT_STATUS: u16 = 301;

/// The kind of rule a source pattern belongs to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RuleKind {
    /// A redirect rule
    Redirect,
    /// A rewrite rule
    Rewrite,
    /// A header rule
    Header,
}

/// An error that can occur when compiling a [`RuleSet`].
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The source of a rule is not a valid glob.
    #[error("invalid {kind} source '{pattern}' (rule {index})")]
    InvalidSource {
        /// The kind of the offending rule
        kind: RuleKind,
        /// The position of the rule within its list
        index: usize,
        /// The source pattern as written in the manifest
        pattern: String,
        /// Why the glob was rejected
        #[source]
        error: ExtGlobError,
    },

    /// A redirect uses a status code that is not a redirection.
    #[error("redirect {index} uses status {status} which is not a 3xx status code")]
    InvalidRedirectStatus {
        /// The position of the rule within its list
        index: usize,
        /// The configured status
        status: u16,
    },
}

/// A redirect selected for a request.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Redirect {
    /// The location to redirect to.
    pub destination: String,
    /// The HTTP status code.
    pub status: u16,
}

/// The outcome of applying a [`RuleSet`] to a request path.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Resolution {
    /// The request should be answered with a redirect.
    Redirect(Redirect),

    /// The request should be served from `path` with additional `headers`.
    Serve {
        /// The path to serve, after rewrites.
        path: String,
        /// Headers to add to the response.
        headers: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone)]
struct CompiledRedirect {
    glob: ExtGlob,
    redirect: Redirect,
}

#[derive(Debug, Clone)]
struct CompiledRewrite {
    glob: ExtGlob,
    destination: String,
}

#[derive(Debug, Clone)]
struct CompiledHeaders {
    glob: ExtGlob,
    headers: Vec<Header>,
}

/// The rules of a [`HostingManifest`] with every source compiled once.
///
/// Rules of the outer manifest come before those of a nested `hosting`
/// manifest, so evaluation order is declaration order throughout.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    public: Option<String>,
    redirects: Vec<CompiledRedirect>,
    rewrites: Vec<CompiledRewrite>,
    headers: Vec<CompiledHeaders>,
}

impl RuleSet {
    /// Compiles all rules of a manifest.
    ///
    /// # Errors
    /// Fails on the first rule whose source is not a valid glob or whose
    /// redirect status is not a 3xx code. No partial rule set is returned.
    pub fn compile(manifest: &HostingManifest) -> Result<Self, RuleError> {
        let mut rule_set = RuleSet::default();
        let mut current = Some(manifest);
        while let Some(manifest) = current {
            rule_set.extend(manifest)?;
            current = manifest.hosting.as_deref();
        }
        Ok(rule_set)
    }

    fn extend(&mut self, manifest: &HostingManifest) -> Result<(), RuleError> {
        if let Some(public) = manifest.public.as_ref().filter(|public| !public.is_empty()) {
            self.public = Some(public.clone());
        }

        for (index, rule) in manifest.redirects.iter().enumerate() {
            let status = match rule.status {
                None | Some(0) => DEFAULT_REDIRECT_STATUS,
                Some(status @ 300..=399) => status,
                Some(status) => return Err(RuleError::InvalidRedirectStatus { index, status }),
            };
            self.redirects.push(CompiledRedirect {
                glob: compile_source(RuleKind::Redirect, index, &rule.source)?,
                redirect: Redirect {
                    destination: rule.destination.clone(),
                    status,
                },
            });
        }

        for (index, rule) in manifest.rewrites.iter().enumerate() {
            self.rewrites.push(CompiledRewrite {
                glob: compile_source(RuleKind::Rewrite, index, &rule.source)?,
                destination: rule.destination.clone(),
            });
        }

        for (index, rule) in manifest.headers.iter().enumerate() {
            self.headers.push(CompiledHeaders {
                glob: compile_source(RuleKind::Header, index, &rule.source)?,
                headers: rule.headers.clone(),
            });
        }

        Ok(())
    }

    /// The directory files are served from. A nested manifest takes
    /// precedence over the outer one.
    pub fn public_dir(&self) -> &str {
        self.public.as_deref().unwrap_or(".")
    }

    /// Returns the first redirect whose source matches `path`.
    pub fn redirect_for(&self, path: &str) -> Option<&Redirect> {
        self.redirects
            .iter()
            .find(|rule| rule.glob.matches(path))
            .map(|rule| {
                tracing::debug!("'{path}' matches redirect source '{}'", rule.glob);
                &rule.redirect
            })
    }

    /// Returns the path to serve for `path` according to the first matching
    /// rewrite. A trailing `index.html` is stripped from the destination.
    pub fn rewrite_for(&self, path: &str) -> Option<&str> {
        self.rewrites
            .iter()
            .find(|rule| rule.glob.matches(path))
            .map(|rule| {
                tracing::debug!("'{path}' matches rewrite source '{}'", rule.glob);
                rule.destination
                    .strip_suffix("index.html")
                    .unwrap_or(&rule.destination)
            })
    }

    /// Returns the headers of every rule whose source matches `path`. A later
    /// header replaces an earlier one with the same (case-insensitive) name.
    pub fn headers_for(&self, path: &str) -> Vec<(String, String)> {
        let mut result: Vec<(String, String)> = Vec::new();
        for rule in self.headers.iter().filter(|rule| rule.glob.matches(path)) {
            tracing::debug!("'{path}' matches header source '{}'", rule.glob);
            for header in &rule.headers {
                match result
                    .iter_mut()
                    .find(|(key, _)| key.eq_ignore_ascii_case(&header.key))
                {
                    Some(existing) => existing.1.clone_from(&header.value),
                    None => result.push((header.key.clone(), header.value.clone())),
                }
            }
        }
        result
    }

    /// Applies all rules to a request path.
    ///
    /// Redirects win outright. Otherwise a rewrite is only applied when
    /// `file_exists` reports that `path` is not present on disk. Headers are
    /// computed for the path that is served, so a rewritten request gets the
    /// headers of its destination.
    pub fn resolve(&self, path: &str, file_exists: impl FnOnce(&str) -> bool) -> Resolution {
        if let Some(redirect) = self.redirect_for(path) {
            return Resolution::Redirect(redirect.clone());
        }

        let served = if file_exists(path) {
            path
        } else {
            self.rewrite_for(path).unwrap_or(path)
        };

        Resolution::Serve {
            path: served.to_string(),
            headers: self.headers_for(served),
        }
    }
}

/// Compiles a rule source. Sources are matched against request paths, so they
/// are normalised to start with exactly one `/`.
fn compile_source(kind: RuleKind, index: usize, source: &str) -> Result<ExtGlob, RuleError> {
    let normalized = format!("/{}", source.strip_prefix('/').unwrap_or(source));
    ExtGlob::new(&normalized).map_err(|error| RuleError::InvalidSource {
        kind,
        index,
        pattern: source.to_string(),
        error,
    })
}
