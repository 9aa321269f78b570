//! Checks that the site a key points to is actually part of the farm.

use crate::{php::strtr, rule::Rule};
use std::collections::HashSet;

/// Decides whether a site exists.
///
/// Implementations are called in the middle of URL generation, so they must
/// be cheap, must not block, and must not have side effects.
pub trait ExistenceCheck: Send + Sync {
    /// Returns true if the site named by `site` (and `language`, which is empty
    /// for keys without a language) exists in the farm of `rule`.
    fn exists(&self, rule: &Rule, site: &str, language: &str) -> bool;
}

impl<F> ExistenceCheck for F
where
    F: Fn(&Rule, &str, &str) -> bool + Send + Sync,
{
    #[inline]
    fn exists(&self, rule: &Rule, site: &str, language: &str) -> bool {
        self(rule, site, language)
    }
}

/// The database names of the sites known to be part of the farm.
///
/// This is the default existence check: a key resolves only when the
/// database name built from the rule’s `dbname` (or `dbnameInt`) template is
/// in the set. Rules without a template for the key’s language case are not
/// checked at all.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KnownSites {
    names: HashSet<String>,
}

impl KnownSites {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a list of database names, one per line. Blank lines and lines
    /// starting with `#` are ignored.
    pub fn parse(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect()
    }

    /// Returns true if the given database name is known.
    #[inline]
    pub fn contains(&self, dbname: &str) -> bool {
        self.names.contains(dbname)
    }

    /// The number of known database names.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no database names are known.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for KnownSites {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl ExistenceCheck for KnownSites {
    fn exists(&self, rule: &Rule, site: &str, language: &str) -> bool {
        let international = !language.is_empty();
        let Some(template) = rule.dbname_for(international) else {
            return true;
        };

        let dbname = if international {
            strtr(template, &[("$3", language), ("$2", site)])
        } else {
            strtr(template, &[("$2", site)])
        };

        let exists = self.contains(&dbname);
        if !exists {
            log::trace!("{rule}: no local database '{dbname}'");
        }
        exists
    }
}

/// Returns true if the site exists according to the rule’s custom check, or
/// according to `known` if the rule has no custom check.
pub fn site_exists(rule: &Rule, known: &KnownSites, site: &str, language: &str) -> bool {
    rule.existence_check()
        .unwrap_or(known)
        .exists(rule, site, language)
}
