//! Dispatcher configuration.
//!
//! Rules are stored as a JSON array of records using the same keys as the
//! `$wgIWDPrefixes` setting of the InterwikiDispatcher extension, so existing
//! farm configurations can be exported as-is:
//!
//! ```json
//! [
//!     {
//!         "interwiki": "gg",
//!         "url": "https://$2.wiki.gg/wiki/$1",
//!         "urlInt": "https://$2.wiki.gg/$3/wiki/$1",
//!         "dbname": "$2_en",
//!         "dbnameInt": "$2_$3",
//!         "baseTransOnly": true
//!     }
//! ]
//! ```
//!
//! Custom existence checks cannot be written in JSON, so a record names one
//! with `wikiExistsCallback` and the loader looks the name up in the
//! [`Callbacks`] it was given.

use crate::{
    exists::{ExistenceCheck, KnownSites},
    rule::{Rule, RuleSet},
};
use serde::Deserialize;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Named existence checks that rule records may refer to.
pub type Callbacks = HashMap<String, Arc<dyn ExistenceCheck>>;

/// The result type for configuration operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors that may occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred reading a configuration file.
    #[error("{1}: I/O error: {0}")]
    Io(std::io::Error, PathBuf),

    /// The rule list was not valid JSON, or a record had a field of the wrong
    /// type, or an unknown field.
    #[error("invalid rule list: {0}")]
    Json(#[from] serde_json::Error),

    /// A rule record had an invalid value.
    #[error("rule {index} ('{interwiki}'): {reason}")]
    Invalid {
        /// The position of the record in the list.
        index: usize,
        /// The interwiki prefix of the record.
        interwiki: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A rule record named an existence check which was not registered.
    #[error("rule {index} ('{interwiki}'): unknown existence callback '{name}'")]
    UnknownCallback {
        /// The position of the record in the list.
        index: usize,
        /// The interwiki prefix of the record.
        interwiki: String,
        /// The unregistered callback name.
        name: String,
    },

    /// A rule subprefix could not be compiled into a key pattern.
    #[error("rule {index} ('{interwiki}'): bad subprefix: {source}")]
    Subprefix {
        /// The position of the record in the list.
        index: usize,
        /// The interwiki prefix of the record.
        interwiki: String,
        /// The pattern compiler error.
        source: regex::Error,
    },
}

/// A rule exactly as it appears in the configuration file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RuleRecord {
    interwiki: String,
    #[serde(default)]
    subprefix: Option<String>,
    url: String,
    #[serde(default)]
    url_int: Option<String>,
    #[serde(default)]
    dbname: Option<String>,
    #[serde(default)]
    dbname_int: Option<String>,
    #[serde(default)]
    wiki_exists_callback: Option<String>,
    #[serde(default)]
    base_trans_only: bool,
}

impl RuleRecord {
    /// Validates the record and converts it into a rule.
    fn into_rule(self, index: usize, callbacks: &Callbacks) -> Result<Rule> {
        let invalid = |interwiki: &str, reason| Error::Invalid {
            index,
            interwiki: interwiki.to_string(),
            reason,
        };

        if self.interwiki.is_empty() {
            return Err(invalid("", "interwiki prefix is empty"));
        } else if self.interwiki.contains(':') {
            return Err(invalid(&self.interwiki, "interwiki prefix contains ':'"));
        } else if self.url.is_empty() {
            return Err(invalid(&self.interwiki, "url is empty"));
        } else if self.url_int.as_deref() == Some("") {
            return Err(invalid(&self.interwiki, "urlInt is empty"));
        } else if self.subprefix.as_deref().is_some_and(|s| s.contains(':')) {
            return Err(invalid(&self.interwiki, "subprefix contains ':'"));
        }

        if self.interwiki.chars().any(char::is_uppercase) {
            log::warn!(
                "rule {index} ('{}'): prefix has upper case letters, but titles \
                 are looked up with a lower case prefix",
                self.interwiki
            );
        }
        if !self.url.contains("$2") {
            log::warn!("rule {index} ('{}'): url has no $2", self.interwiki);
        }
        if self.url_int.as_deref().is_some_and(|url| !url.contains("$3")) {
            log::warn!("rule {index} ('{}'): urlInt has no $3", self.interwiki);
        }
        if self.dbname_int.is_some() && self.url_int.is_none() {
            log::warn!(
                "rule {index} ('{}'): dbnameInt is never used without urlInt",
                self.interwiki
            );
        }

        let mut builder = Rule::builder(self.interwiki.clone(), self.url)
            .base_trans_only(self.base_trans_only);
        if let Some(subprefix) = self.subprefix {
            builder = builder.subprefix(subprefix);
        }
        if let Some(url_int) = self.url_int {
            builder = builder.url_int(url_int);
        }
        if let Some(dbname) = self.dbname {
            builder = builder.dbname(dbname);
        }
        if let Some(dbname_int) = self.dbname_int {
            builder = builder.dbname_int(dbname_int);
        }
        if let Some(name) = self.wiki_exists_callback {
            let Some(check) = callbacks.get(&name) else {
                return Err(Error::UnknownCallback {
                    index,
                    interwiki: self.interwiki,
                    name,
                });
            };
            builder = builder.existence_check(Arc::clone(check));
        }

        builder.build().map_err(|source| Error::Subprefix {
            index,
            interwiki: self.interwiki,
            source,
        })
    }
}

/// Parses a JSON rule list.
pub fn parse_rules(text: &str, callbacks: &Callbacks) -> Result<RuleSet> {
    let records = serde_json::from_str::<Vec<RuleRecord>>(text)?;
    let rules = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_rule(index, callbacks))
        .collect::<Result<RuleSet>>()?;
    log::debug!("Loaded {} dispatch rules", rules.len());
    Ok(rules)
}

/// Loads a JSON rule list from a file.
pub fn load_rules(path: impl AsRef<Path>, callbacks: &Callbacks) -> Result<RuleSet> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|err| Error::Io(err, path.into()))?;
    parse_rules(&text, callbacks)
}

/// Loads a list of local database names from a file, one per line.
pub fn load_known_sites(path: impl AsRef<Path>) -> Result<KnownSites> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|err| Error::Io(err, path.into()))?;
    let sites = KnownSites::parse(&text);
    log::debug!("Loaded {} known sites", sites.len());
    Ok(sites)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = r#"[
        {
            "interwiki": "gg",
            "subprefix": "c",
            "url": "https://$2.wiki.gg/wiki/$1",
            "urlInt": "https://$2.wiki.gg/$3/wiki/$1",
            "dbname": "$2_en",
            "dbnameInt": "$2_$3",
            "baseTransOnly": true
        },
        {
            "interwiki": "gg",
            "url": "https://$2.wiki.gg/wiki/$1",
            "wikiExistsCallback": "never"
        }
    ]"#;

    fn callbacks() -> Callbacks {
        let mut callbacks = Callbacks::new();
        callbacks.insert(
            "never".into(),
            Arc::new(|_: &Rule, _: &str, _: &str| false),
        );
        callbacks
    }

    #[test]
    fn parse() {
        let rules = parse_rules(RULES, &callbacks()).unwrap();
        assert_eq!(rules.len(), 2);

        let mut iter = rules.iter();
        let rule = iter.next().unwrap();
        assert_eq!(rule.interwiki(), "gg");
        assert_eq!(rule.subprefix(), Some("c"));
        assert_eq!(rule.url(), "https://$2.wiki.gg/wiki/$1");
        assert_eq!(rule.url_int(), Some("https://$2.wiki.gg/$3/wiki/$1"));
        assert_eq!(rule.dbname(), Some("$2_en"));
        assert_eq!(rule.dbname_int(), Some("$2_$3"));
        assert!(rule.existence_check().is_none());
        assert!(rule.base_trans_only());

        let rule = iter.next().unwrap();
        assert_eq!(rule.subprefix(), None);
        assert_eq!(rule.url_int(), None);
        assert!(rule.existence_check().is_some());
        assert!(!rule.base_trans_only());
    }

    #[test]
    fn empty() {
        assert!(parse_rules("[]", &Callbacks::new()).unwrap().is_empty());
    }

    #[test]
    fn wrong_type() {
        let err = parse_rules(r#"[{"interwiki": "gg", "url": 5}]"#, &Callbacks::new());
        assert!(matches!(err, Err(Error::Json(_))));

        let err = parse_rules(r#"[{"interwiki": "gg"}]"#, &Callbacks::new());
        assert!(matches!(err, Err(Error::Json(_))));

        let err = parse_rules(r#"{"interwiki": "gg", "url": "$1"}"#, &Callbacks::new());
        assert!(matches!(err, Err(Error::Json(_))));
    }

    #[test]
    fn unknown_field() {
        let err = parse_rules(
            r#"[{"interwiki": "gg", "url": "$2/$1", "urlint": "$3"}]"#,
            &Callbacks::new(),
        );
        assert!(matches!(err, Err(Error::Json(_))));
    }

    #[test]
    fn invalid_values() {
        for (text, expected) in [
            (r#"[{"interwiki": "", "url": "$2/$1"}]"#, "interwiki prefix is empty"),
            (r#"[{"interwiki": "a:b", "url": "$2/$1"}]"#, "interwiki prefix contains ':'"),
            (r#"[{"interwiki": "gg", "url": ""}]"#, "url is empty"),
            (r#"[{"interwiki": "gg", "url": "$2", "urlInt": ""}]"#, "urlInt is empty"),
            (
                r#"[{"interwiki": "gg", "url": "$2", "subprefix": "a:b"}]"#,
                "subprefix contains ':'",
            ),
        ] {
            match parse_rules(text, &Callbacks::new()) {
                Err(Error::Invalid { index, reason, .. }) => {
                    assert_eq!(index, 0);
                    assert_eq!(reason, expected);
                }
                other => panic!("expected {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn upper_case_prefix() {
        use crate::{KnownSites, Title, resolve};

        let rules = parse_rules(
            r#"[{"interwiki": "GG", "url": "https://$2.wiki.gg/wiki/$1"}]"#,
            &Callbacks::new(),
        )
        .unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.iter().next().unwrap().interwiki(), "GG");

        let title = Title::new("GG:mysite:Foo");
        assert_eq!(title.interwiki(), "gg");
        assert_eq!(resolve(&rules, &title, "", &KnownSites::new()), None);
    }

    #[test]
    fn unknown_callback() {
        let err = parse_rules(RULES, &Callbacks::new()).unwrap_err();
        assert!(matches!(
            &err,
            Error::UnknownCallback { index: 1, name, .. } if name == "never"
        ));
        assert_eq!(
            err.to_string(),
            "rule 1 ('gg'): unknown existence callback 'never'"
        );
    }

    #[test]
    fn missing_file() {
        let err = load_rules("/nonexistent/rules.json", &Callbacks::new()).unwrap_err();
        assert!(matches!(err, Error::Io(_, path) if path == Path::new("/nonexistent/rules.json")));
    }
}
