//! Resolution of interwiki page references to wiki farm URLs.

use crate::{
    common::{append_query, url_encode},
    exists::{KnownSites, site_exists},
    php::strtr,
    rule::{Rule, RuleSet},
    title::Title,
};
use arc_cell::ArcCell;
use regex::Regex;
use std::{borrow::Cow, sync::Arc, sync::LazyLock};

/// The reason a rule did not produce a URL for a title.
///
/// None of these are failures from the point of view of the caller: the next
/// rule is tried, and if no rule applies, the title gets the normal interwiki
/// treatment.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Skip {
    /// The title uses another interwiki prefix.
    #[error("different interwiki prefix")]
    Prefix,

    /// The request is a transclusion and the rule is limited to the plain
    /// interwiki for those.
    #[error("transclusion request on a base-only rule")]
    Transclusion,

    /// The page key does not have the form the rule accepts.
    #[error("page key does not address a farm site")]
    NoMatch,

    /// The page key has a language but the rule has no international URL.
    #[error("no international URL template for language key")]
    MissingTemplate,

    /// The target site is not part of the farm.
    #[error("target site does not exist")]
    UnresolvedSite,
}

/// Returns true if the query string requests a transclusion (raw or rendered
/// page content) instead of a page view.
pub fn is_transclusion(query: &str) -> bool {
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)(?:^|&)action=(?:render|raw)(?:&|$)").unwrap());
    RE.is_match(query)
}

/// Applies a single rule to a title.
pub fn resolve_rule(
    rule: &Rule,
    title: &Title,
    query: &str,
    known: &KnownSites,
) -> Result<String, Skip> {
    if title.interwiki() != rule.interwiki() {
        return Err(Skip::Prefix);
    }

    if rule.base_trans_only() && is_transclusion(query) {
        return Err(Skip::Transclusion);
    }

    let key = rule.pattern().parse(title.db_key()).ok_or(Skip::NoMatch)?;

    let template = rule
        .url_for(key.is_international())
        .ok_or(Skip::MissingTemplate)?;

    if !site_exists(rule, known, &key.site, &key.language) {
        return Err(Skip::UnresolvedSite);
    }

    let article = match title.ns_text() {
        "" => Cow::Borrowed(key.article),
        ns => Cow::Owned(format!("{ns}:{}", key.article)),
    };
    let article = url_encode(&article);

    let url = if key.is_international() {
        strtr(
            template,
            &[
                ("$3", key.language.as_str()),
                ("$2", key.site.as_str()),
                ("$1", article.as_str()),
            ],
        )
    } else {
        strtr(template, &[("$2", key.site.as_str()), ("$1", article.as_str())])
    };

    Ok(append_query(&url, query))
}

/// Resolves a title to a URL using the first rule that applies to it.
///
/// Returns `None` if no rule applies, in which case the title should be
/// linked the same way as any other interwiki title.
pub fn resolve(rules: &RuleSet, title: &Title, query: &str, known: &KnownSites) -> Option<String> {
    for rule in rules {
        match resolve_rule(rule, title, query, known) {
            Ok(url) => {
                log::debug!("{rule}: {title} -> {url}");
                return Some(url);
            }
            Err(Skip::Prefix) => {}
            Err(skip) => log::trace!("{rule}: skipping {title}: {skip}"),
        }
    }
    None
}

/// A dispatcher holding the current rule set and known site list.
///
/// Both can be replaced at any time from any thread. A resolution which is
/// already running keeps using the snapshot it started with.
pub struct Dispatcher {
    /// The current rules.
    rules: ArcCell<RuleSet>,
    /// The current known sites.
    known: ArcCell<KnownSites>,
}

impl Dispatcher {
    /// Creates a new dispatcher.
    pub fn new(rules: RuleSet, known: KnownSites) -> Self {
        Self {
            rules: ArcCell::new(Arc::new(rules)),
            known: ArcCell::new(Arc::new(known)),
        }
    }

    /// Resolves a title to a URL. See [`resolve`].
    pub fn resolve(&self, title: &Title, query: &str) -> Option<String> {
        let rules = self.rules.get();
        let known = self.known.get();
        resolve(&rules, title, query, &known)
    }

    /// The current rule set.
    pub fn rules(&self) -> Arc<RuleSet> {
        self.rules.get()
    }

    /// The current known sites.
    pub fn known_sites(&self) -> Arc<KnownSites> {
        self.known.get()
    }

    /// Replaces the rule set, returning the old one.
    pub fn set_rules(&self, rules: RuleSet) -> Arc<RuleSet> {
        self.rules.set(Arc::new(rules))
    }

    /// Replaces the known sites, returning the old ones.
    pub fn set_known_sites(&self, known: KnownSites) -> Arc<KnownSites> {
        self.known.set(Arc::new(known))
    }
}
