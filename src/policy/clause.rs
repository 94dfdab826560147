use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Has,
    HasAnyOf,
    HasAllOf,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Has => write!(f, "has"),
            Method::HasAnyOf => write!(f, "hasAnyOf"),
            Method::HasAllOf => write!(f, "hasAllOf"),
        }
    }
}

/// One term of a composite rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Literal(bool),
    /// Built through [`Matcher`], which always supplies at least one query.
    /// `Has` tests only the first query; an empty `Has` never matches.
    Check {
        method: Method,
        queries: Vec<String>,
        /// A disabled check is skipped by `match_one` and denies in `match_all`.
        enabled: bool,
    },
}

impl Clause {
    pub(crate) fn check<I, S>(method: Method, queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Clause::Check {
            method,
            queries: queries.into_iter().map(Into::into).collect(),
            enabled: true,
        }
    }

    /// Gate this clause on `condition`.
    ///
    /// A gated-off literal becomes `false`, which both composite modes
    /// already treat the same way as a disabled check.
    #[must_use]
    pub fn cond(self, condition: bool) -> Self {
        match self {
            Clause::Literal(value) => Clause::Literal(value && condition),
            Clause::Check { method, queries, .. } => Clause::Check {
                method,
                queries,
                enabled: condition,
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            Clause::Literal(_) => true,
            Clause::Check { enabled, .. } => *enabled,
        }
    }
}

impl From<bool> for Clause {
    fn from(value: bool) -> Self {
        Clause::Literal(value)
    }
}

/// Clause builder handed to `match_one` / `match_all` callbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher;

impl Matcher {
    pub fn has(&self, query: impl Into<String>) -> Clause {
        let query: String = query.into();
        Clause::check(Method::Has, [query])
    }

    pub fn has_any_of<I, S>(&self, queries: I) -> Clause
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Clause::check(Method::HasAnyOf, queries)
    }

    pub fn has_all_of<I, S>(&self, queries: I) -> Clause
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Clause::check(Method::HasAllOf, queries)
    }

    pub fn cond(&self, condition: bool) -> Clause {
        Clause::Literal(condition)
    }
}
