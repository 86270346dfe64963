//! The JSON hosting manifest that declares redirect, rewrite and header rules.

use std::{path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

/// A hosting manifest (`firebase.json` style).
///
/// ```json
/// {
///   "public": "dist",
///   "redirects": [{ "source": "/old/**", "destination": "/new", "type": 302 }],
///   "rewrites": [{ "source": "**", "destination": "/index.html" }],
///   "headers": [{ "source": "**/*.@(js|css)", "headers": [{ "key": "Cache-Control", "value": "max-age=3600" }] }]
/// }
/// ```
///
/// The same keys may also appear in a nested `hosting` object. Rules of the
/// outer manifest are evaluated before the nested ones.
#[derive(Debug, Default, Clone, Deserialize, Serialize, Eq, PartialEq)]
pub struct HostingManifest {
    /// The directory files are served from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<String>,

    /// Redirect rules in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redirects: Vec<RedirectRule>,

    /// Rewrite rules in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rewrites: Vec<RewriteRule>,

    /// Header rules in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HeaderRule>,

    /// A nested manifest with the same shape.
    #[serde(default, alias = "Hosting", skip_serializing_if = "Option::is_none")]
    pub hosting: Option<Box<HostingManifest>>,
}

/// Redirects requests matching `source` to `destination`.
#[derive(Debug, Clone, Deserialize, Serialize, Eq, PartialEq)]
pub struct RedirectRule {
    /// The glob request paths are matched against.
    pub source: String,

    /// The location to redirect to.
    pub destination: String,

    /// The HTTP status code of the redirect. Defaults to 301.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Serves `destination` for requests matching `source` that do not exist on
/// disk.
#[derive(Debug, Clone, Deserialize, Serialize, Eq, PartialEq)]
pub struct RewriteRule {
    /// The glob request paths are matched against.
    pub source: String,

    /// The path that is served instead.
    pub destination: String,
}

/// Adds headers to responses for requests matching `source`.
#[derive(Debug, Clone, Deserialize, Serialize, Eq, PartialEq)]
pub struct HeaderRule {
    /// The glob request paths are matched against.
    pub source: String,

    /// The headers to set.
    #[serde(default)]
    pub headers: Vec<Header>,
}

/// A single response header.
#[derive(Debug, Clone, Deserialize, Serialize, Eq, PartialEq)]
pub struct Header {
    /// The header name
    pub key: String,

    /// The header value
    pub value: String,
}

/// An error that can occur when reading a [`HostingManifest`].
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The manifest could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The manifest is not valid JSON or does not have the expected shape.
    #[error("failed to parse hosting manifest")]
    Parse(#[from] serde_json::Error),
}

impl HostingManifest {
    /// Reads a manifest from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let contents = fs_err::read_to_string(path.as_ref())?;
        Ok(contents.parse()?)
    }
}

impl FromStr for HostingManifest {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}
