//! Dispatch rules.

use crate::{exists::ExistenceCheck, key::KeyPattern};
use std::sync::Arc;

/// One interwiki prefix (plus optional subprefix) mapped onto a wiki farm.
///
/// URL templates use `$1` for the encoded article, `$2` for the site token,
/// and `$3` for the language code. Database name templates use `$2` and `$3`.
#[derive(Clone)]
pub struct Rule {
    /// The interwiki prefix this rule handles.
    interwiki: String,
    /// The key grammar, including the subprefix.
    pattern: KeyPattern,
    /// The URL template for keys without a language.
    url: String,
    /// The URL template for keys with a language.
    url_int: Option<String>,
    /// The database name template for keys without a language.
    dbname: Option<String>,
    /// The database name template for keys with a language.
    dbname_int: Option<String>,
    /// A custom existence check which replaces the database name lookup.
    exists: Option<Arc<dyn ExistenceCheck>>,
    /// Whether transclusion requests may only use this rule through the
    /// plain interwiki.
    base_trans_only: bool,
}

impl core::fmt::Debug for Rule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rule")
            .field("interwiki", &self.interwiki)
            .field("subprefix", &self.subprefix())
            .field("url", &self.url)
            .field("url_int", &self.url_int)
            .field("dbname", &self.dbname)
            .field("dbname_int", &self.dbname_int)
            .field("exists", &self.exists.as_ref().map(|_| ".."))
            .field("base_trans_only", &self.base_trans_only)
            .finish()
    }
}

impl core::fmt::Display for Rule {
    /// Formats the rule as the prefix a link has to start with to use it.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.interwiki)?;
        if let Some(subprefix) = self.subprefix() {
            write!(f, ":{subprefix}")?;
        }
        Ok(())
    }
}

impl Rule {
    /// Starts building a rule for the given interwiki prefix and plain URL
    /// template.
    pub fn builder(interwiki: impl Into<String>, url: impl Into<String>) -> RuleBuilder {
        RuleBuilder {
            interwiki: interwiki.into(),
            subprefix: None,
            url: url.into(),
            url_int: None,
            dbname: None,
            dbname_int: None,
            exists: None,
            base_trans_only: false,
        }
    }

    /// The interwiki prefix this rule handles.
    #[inline]
    pub fn interwiki(&self) -> &str {
        &self.interwiki
    }

    /// The fixed subprefix keys must start with, if any.
    #[inline]
    pub fn subprefix(&self) -> Option<&str> {
        self.pattern.subprefix()
    }

    /// The compiled key grammar.
    #[inline]
    pub fn pattern(&self) -> &KeyPattern {
        &self.pattern
    }

    /// The URL template for keys without a language.
    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The URL template for keys with a language.
    #[inline]
    pub fn url_int(&self) -> Option<&str> {
        self.url_int.as_deref()
    }

    /// The URL template for the language case of a key.
    pub fn url_for(&self, international: bool) -> Option<&str> {
        if international {
            self.url_int()
        } else {
            Some(self.url())
        }
    }

    /// The database name template for keys without a language.
    #[inline]
    pub fn dbname(&self) -> Option<&str> {
        self.dbname.as_deref()
    }

    /// The database name template for keys with a language.
    #[inline]
    pub fn dbname_int(&self) -> Option<&str> {
        self.dbname_int.as_deref()
    }

    /// The database name template for the language case of a key.
    pub fn dbname_for(&self, international: bool) -> Option<&str> {
        if international {
            self.dbname_int()
        } else {
            self.dbname()
        }
    }

    /// The custom existence check, if one was configured.
    #[inline]
    pub fn existence_check(&self) -> Option<&dyn ExistenceCheck> {
        self.exists.as_deref()
    }

    /// Returns true if this rule verifies that target sites exist, either
    /// with a custom check or a plain database name template.
    ///
    /// A rule with only an international database name template still checks
    /// language keys, but is reported as unchecked, since plain keys always
    /// pass.
    pub fn checks_existence(&self) -> bool {
        self.exists.is_some() || self.dbname.is_some()
    }

    /// Whether this rule is skipped for transclusion requests.
    #[inline]
    pub fn base_trans_only(&self) -> bool {
        self.base_trans_only
    }
}

/// Builder for [`Rule`].
#[derive(Clone)]
#[must_use]
pub struct RuleBuilder {
    interwiki: String,
    subprefix: Option<String>,
    url: String,
    url_int: Option<String>,
    dbname: Option<String>,
    dbname_int: Option<String>,
    exists: Option<Arc<dyn ExistenceCheck>>,
    base_trans_only: bool,
}

impl RuleBuilder {
    /// Requires keys to start with `subprefix:`.
    pub fn subprefix(mut self, subprefix: impl Into<String>) -> Self {
        self.subprefix = Some(subprefix.into());
        self
    }

    /// Sets the URL template used for keys with a language.
    pub fn url_int(mut self, url_int: impl Into<String>) -> Self {
        self.url_int = Some(url_int.into());
        self
    }

    /// Sets the database name template checked for keys without a language.
    pub fn dbname(mut self, dbname: impl Into<String>) -> Self {
        self.dbname = Some(dbname.into());
        self
    }

    /// Sets the database name template checked for keys with a language.
    pub fn dbname_int(mut self, dbname_int: impl Into<String>) -> Self {
        self.dbname_int = Some(dbname_int.into());
        self
    }

    /// Replaces the database name lookup with a custom check.
    pub fn existence_check(mut self, check: Arc<dyn ExistenceCheck>) -> Self {
        self.exists = Some(check);
        self
    }

    /// Skips the rule for transclusion requests.
    pub fn base_trans_only(mut self, base_trans_only: bool) -> Self {
        self.base_trans_only = base_trans_only;
        self
    }

    /// Compiles the key grammar and returns the finished rule.
    pub fn build(self) -> Result<Rule, regex::Error> {
        Ok(Rule {
            pattern: KeyPattern::new(self.subprefix.as_deref())?,
            interwiki: self.interwiki,
            url: self.url,
            url_int: self.url_int,
            dbname: self.dbname,
            dbname_int: self.dbname_int,
            exists: self.exists,
            base_trans_only: self.base_trans_only,
        })
    }
}

/// An ordered list of rules. Earlier rules win.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates a rule set from rules in priority order.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Iterates the rules in priority order.
    pub fn iter(&self) -> core::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// The number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = core::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let rule = Rule::builder("gg", "https://$2.example.org/wiki/$1")
            .build()
            .unwrap();
        assert_eq!(rule.to_string(), "gg");

        let rule = Rule::builder("gg", "https://$2.example.org/wiki/$1")
            .subprefix("c")
            .build()
            .unwrap();
        assert_eq!(rule.to_string(), "gg:c");
    }

    #[test]
    fn templates_by_case() {
        let rule = Rule::builder("gg", "plain")
            .dbname("db_$2")
            .build()
            .unwrap();
        assert_eq!(rule.url_for(false), Some("plain"));
        assert_eq!(rule.url_for(true), None);
        assert_eq!(rule.dbname_for(false), Some("db_$2"));
        assert_eq!(rule.dbname_for(true), None);
        assert!(rule.checks_existence());

        let rule = Rule::builder("gg", "plain")
            .url_int("intl")
            .dbname_int("db_$3_$2")
            .build()
            .unwrap();
        assert_eq!(rule.url_for(true), Some("intl"));
        assert_eq!(rule.dbname_for(false), None);
        assert_eq!(rule.dbname_for(true), Some("db_$3_$2"));
        assert!(!rule.checks_existence());
    }

    #[test]
    fn existence_flag() {
        let rule = Rule::builder("gg", "plain").build().unwrap();
        assert!(!rule.checks_existence());
        assert!(rule.existence_check().is_none());

        let rule = Rule::builder("gg", "plain")
            .existence_check(Arc::new(|_: &Rule, _: &str, _: &str| true))
            .build()
            .unwrap();
        assert!(rule.checks_existence());
        assert!(rule.existence_check().is_some());
    }

    #[test]
    fn order() {
        let rules = ["a", "b", "c"]
            .into_iter()
            .map(|iw| Rule::builder(iw, "$1").build().unwrap())
            .collect::<RuleSet>();
        assert_eq!(rules.len(), 3);
        assert_eq!(
            rules.iter().map(Rule::interwiki).collect::<Vec<_>>(),
            ["a", "b", "c"]
        );
    }
}
