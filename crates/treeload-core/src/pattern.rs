//! Name patterns for include/exclude filtering.
//!
//! A [`Pattern`] is anything that can answer "does this name match". Regular
//! expressions, globs and plain closures all work through the same
//! [`NameMatcher`] capability.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use globset::{Glob, GlobMatcher, GlobSet, GlobSetBuilder};
use regex::Regex;

use crate::error::{PatternError, PatternSyntax};

/// Capability to test a bare entry name.
pub trait NameMatcher: Send + Sync {
    /// Check whether `name` matches.
    fn is_match(&self, name: &str) -> bool;
}

impl NameMatcher for Regex {
    fn is_match(&self, name: &str) -> bool {
        Regex::is_match(self, name)
    }
}

impl NameMatcher for GlobMatcher {
    fn is_match(&self, name: &str) -> bool {
        GlobMatcher::is_match(self, name)
    }
}

impl NameMatcher for GlobSet {
    fn is_match(&self, name: &str) -> bool {
        GlobSet::is_match(self, name)
    }
}

impl<F> NameMatcher for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_match(&self, name: &str) -> bool {
        self(name)
    }
}

/// A compiled include/exclude pattern.
#[derive(Clone)]
pub struct Pattern {
    matcher: Arc<dyn NameMatcher>,
    source: Arc<str>,
}

impl Pattern {
    /// Wrap any matcher.
    pub fn new(matcher: impl NameMatcher + 'static, source: impl Into<Arc<str>>) -> Self {
        Self {
            matcher: Arc::new(matcher),
            source: source.into(),
        }
    }

    /// Compile a regular expression. Matching is unanchored, as with
    /// [`Regex::is_match`].
    pub fn regex(source: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(source)
            .map_err(|e| PatternError::new(source, PatternSyntax::Regex, e))?;
        Ok(Self::new(regex, source))
    }

    /// Compile a glob such as `*.json` or `test_*`.
    pub fn glob(source: &str) -> Result<Self, PatternError> {
        let glob =
            Glob::new(source).map_err(|e| PatternError::new(source, PatternSyntax::Glob, e))?;
        Ok(Self::new(glob.compile_matcher(), source))
    }

    /// Compile several globs; a name matches if any of them matches.
    pub fn globs<I, S>(sources: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut joined = Vec::new();
        for source in sources {
            let source = source.as_ref();
            let glob =
                Glob::new(source).map_err(|e| PatternError::new(source, PatternSyntax::Glob, e))?;
            builder.add(glob);
            joined.push(source.to_string());
        }
        let joined = joined.join(",");
        let set = builder
            .build()
            .map_err(|e| PatternError::new(joined.as_str(), PatternSyntax::Glob, e))?;
        Ok(Self::new(set, joined))
    }

    /// Build a pattern from a predicate.
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::new(predicate, "<predicate>")
    }

    /// Check whether a bare entry name matches.
    pub fn is_match(&self, name: &str) -> bool {
        self.matcher.is_match(name)
    }

    /// Source text the pattern was built from.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parses as a regular expression.
impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::regex(s)
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        let source = regex.as_str().to_string();
        Self::new(regex, source)
    }
}

impl From<GlobMatcher> for Pattern {
    fn from(matcher: GlobMatcher) -> Self {
        let source = matcher.glob().glob().to_string();
        Self::new(matcher, source)
    }
}
