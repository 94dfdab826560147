use super::{Clause, Matcher, Method, PermissionSet};
use crate::{Error, Result};
use tracing::debug;

/// Evaluates access rules against an expanded [`PermissionSet`].
///
/// A fresh validator returns `Ok(false)` on failure. After [`guard`](Self::guard)
/// every failed decision becomes [`Error::PolicyDenied`] instead; there is no
/// way back.
#[derive(Debug, Clone)]
pub struct Validator {
    permissions: PermissionSet,
    guarded: bool,
}

impl Validator {
    pub fn new(permissions: PermissionSet) -> Self {
        Self {
            permissions,
            guarded: false,
        }
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn is_guarded(&self) -> bool {
        self.guarded
    }

    #[must_use]
    pub fn guard(mut self) -> Self {
        self.guarded = true;
        self
    }

    pub fn has(&self, query: &str) -> Result<bool> {
        self.decide(self.permissions.contains(query), || {
            format!("requires {query:?}")
        })
    }

    /// `false` for an empty list.
    pub fn has_any_of<I, S>(&self, queries: I) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let queries: Vec<S> = queries.into_iter().collect();
        let passed = self.any(&queries);
        self.decide(passed, || format!("requires any of {:?}", as_strs(&queries)))
    }

    /// `true` for an empty list.
    pub fn has_all_of<I, S>(&self, queries: I) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let queries: Vec<S> = queries.into_iter().collect();
        let passed = self.all(&queries);
        self.decide(passed, || format!("requires all of {:?}", as_strs(&queries)))
    }

    /// Passes at the first enabled clause that holds. Disabled clauses and
    /// `false` literals are skipped.
    pub fn match_one<F>(&self, build: F) -> Result<bool>
    where
        F: FnOnce(&Matcher) -> Vec<Clause>,
    {
        let clauses = build(&Matcher);
        let passed = clauses.iter().any(|clause| match clause {
            Clause::Literal(value) => *value,
            Clause::Check { enabled: false, .. } => false,
            Clause::Check { method, queries, .. } => self.probe(*method, queries),
        });
        self.decide(passed, || "no alternative matched".to_string())
    }

    /// Fails at the first `false` literal, disabled clause or failed check.
    pub fn match_all<F>(&self, build: F) -> Result<bool>
    where
        F: FnOnce(&Matcher) -> Vec<Clause>,
    {
        let clauses = build(&Matcher);
        let failed = clauses.iter().position(|clause| match clause {
            Clause::Literal(value) => !*value,
            Clause::Check { enabled: false, .. } => true,
            Clause::Check { method, queries, .. } => !self.probe(*method, queries),
        });
        match failed {
            None => Ok(true),
            Some(index) => self.decide(false, || format!("clause {index} not satisfied")),
        }
    }

    // Never raises, so composite evaluation can move on to the next clause
    fn probe(&self, method: Method, queries: &[String]) -> bool {
        match method {
            Method::Has => queries.first().is_some_and(|query| self.permissions.contains(query)),
            Method::HasAnyOf => self.any(queries),
            Method::HasAllOf => self.all(queries),
        }
    }

    fn any<S: AsRef<str>>(&self, queries: &[S]) -> bool {
        queries.iter().any(|query| self.permissions.contains(query.as_ref()))
    }

    fn all<S: AsRef<str>>(&self, queries: &[S]) -> bool {
        queries.iter().all(|query| self.permissions.contains(query.as_ref()))
    }

    fn decide(&self, passed: bool, reason: impl FnOnce() -> String) -> Result<bool> {
        if passed || !self.guarded {
            return Ok(passed);
        }
        let reason = reason();
        debug!(%reason, "access denied");
        Err(Error::PolicyDenied { reason })
    }
}

fn as_strs<S: AsRef<str>>(queries: &[S]) -> Vec<&str> {
    queries.iter().map(AsRef::as_ref).collect()
}
