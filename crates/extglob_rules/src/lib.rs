#![deny(missing_docs)]
//! Redirect, rewrite and header rules for static hosting.
//!
//! Rules are read from a JSON [`HostingManifest`] and compiled once into a
//! [`RuleSet`]. Every rule has a `source` that is an extended glob (see the
//! [`extglob`] crate) matched against the request path. Redirects and
//! rewrites use the first matching rule in declaration order, header rules
//! all apply.
//!
//! ```rust
//! use extglob_rules::{HostingManifest, Resolution, RuleSet};
//!
//! let manifest: HostingManifest = r#"{
//!     "rewrites": [{ "source": "**", "destination": "/index.html" }]
//! }"#.parse().unwrap();
//! let rules = RuleSet::compile(&manifest).unwrap();
//!
//! assert_eq!(
//!     rules.resolve("/settings", |_| false),
//!     Resolution::Serve { path: "/".to_string(), headers: vec![] }
//! );
//! ```

mod manifest;
mod rules;

pub use manifest::{Header, HeaderRule, HostingManifest, ManifestError, RedirectRule, RewriteRule};
pub use rules::{
    Redirect, Resolution, RuleError, RuleKind, RuleSet, DEFAULT_REDIRECT_STATUS,
};
