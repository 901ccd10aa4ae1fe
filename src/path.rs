//! Route patterns and the strict-arity path matcher.
//!
//! A pattern is split on `/` into segments. A segment starting with `:` is a
//! named parameter and binds whatever the request path holds at the same
//! position. Every other segment is a literal and must match byte-for-byte.
//!
//! ```text
//! pattern  /user/:id        path  /user/42      →  {id: "42"}
//! pattern  /user/:id        path  /user/42/x    →  no match (3 vs 4 segments)
//! pattern  /user/:id        path  /User/42      →  no match (case-sensitive)
//! ```
//!
//! There are no wildcards, no optional segments and no trailing-slash
//! normalisation: `/a/` has one more (empty) segment than `/a`.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Parameter bindings produced by a successful match, keyed by name.
///
/// Values are the raw path segments: no percent-decoding, no type coercion.
pub type Params = HashMap<String, String>;

const PARAM_MARKER: char = ':';

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A route pattern, split into segments once at registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Why a pattern was refused at registration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    /// A `:` segment with nothing after it.
    #[error("parameter segment {position} has no name")]
    EmptyParam { position: usize },
    /// The same parameter name appears twice.
    #[error("parameter `{0}` appears more than once")]
    DuplicateParam(String),
}

impl Pattern {
    /// Splits `raw` into segments.
    ///
    /// Duplicate parameter names are rejected rather than resolved, so a
    /// binding never silently shadows another.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        for (position, token) in raw.split('/').enumerate() {
            match token.strip_prefix(PARAM_MARKER) {
                Some("") => return Err(PatternError::EmptyParam { position }),
                Some(name) => {
                    let taken = segments
                        .iter()
                        .any(|s| matches!(s, Segment::Param(n) if n == name));
                    if taken {
                        return Err(PatternError::DuplicateParam(name.to_owned()));
                    }
                    segments.push(Segment::Param(name.to_owned()));
                }
                None => segments.push(Segment::Literal(token.to_owned())),
            }
        }
        Ok(Self { raw: raw.to_owned(), segments })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Matches `path` against this pattern, returning the bindings on success.
    ///
    /// The segment counts must be equal. On success the map holds one entry
    /// per parameter segment (and is empty for an all-literal pattern).
    pub fn matches(&self, path: &str) -> Option<Params> {
        if path.split('/').count() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, actual) in self.segments.iter().zip(path.split('/')) {
            match segment {
                Segment::Param(name) => {
                    params.insert(name.clone(), actual.to_owned());
                }
                Segment::Literal(expected) if expected == actual => {}
                Segment::Literal(_) => return None,
            }
        }
        Some(params)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Matches `path` against a pattern string in one step.
///
/// Returns `None` when the pattern is invalid or does not match. The router
/// parses patterns once at registration and calls [`Pattern::matches`]
/// instead; this is the convenience form.
pub fn match_path(pattern: &str, path: &str) -> Option<Params> {
    Pattern::parse(pattern).ok()?.matches(path)
}
