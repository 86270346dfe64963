#![deny(missing_docs)]
//! Compiles extended shell globs ("extglobs") into anchored regular
//! expressions for matching request paths.
//!
//! # Glob Semantics
//!
//! - `*` matches any run of characters except `/`, `?` matches exactly one
//!   such character.
//! - `**` matches across `/`. A leading `**/` matches any (possibly empty)
//!   directory prefix and `/**/` in the middle of a pattern matches any number
//!   of intervening directories.
//! - `[...]` is a bracket expression. `[!...]` and `[^...]` negate it and POSIX
//!   classes such as `[:alnum:]` may be used inside.
//! - `*(a|b)`, `?(a|b)`, `+(a|b)` and `@(a|b)` match zero or more, zero or one,
//!   one or more and exactly one of the alternatives. `!(a|b)` matches any run
//!   of non-separator characters that is not one of the alternatives. It may
//!   not appear inside another group, and a glob that uses it is matched piece
//!   by piece, so [`compile_to_regex`] rejects it.
//! - `\` escapes the next character. Outside a group `)` and `|` are literal.
//!
//! Brace expansion (`{a,b}`) is not supported; braces are matched literally.
//!
//! # Example
//!
//! ```rust
//! use extglob::ExtGlob;
//!
//! let glob = ExtGlob::new("**/*.@(js|css)").unwrap();
//! assert!(glob.matches("static/app.js"));
//! assert!(!glob.matches("static/app.ts"));
//! ```

mod compiler;
mod error;
mod matcher;

pub use compiler::compile_to_regex;
pub use error::ExtGlobError;
pub use matcher::ExtGlob;
