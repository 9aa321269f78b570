//! A summary table of the configured rules, for wiki administrators.
//!
//! This is the table the dispatcher adds to `Special:Interwiki`. The markup
//! uses the same classes as the interwiki table of the Interwiki extension,
//! so it picks up the same site styles.

use crate::rule::{Rule, RuleSet};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::{collections::HashMap, fmt::Write as _};

/// A plain interwiki table entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Interwiki {
    /// Whether pages from the interwiki may be transcluded.
    pub transcludable: bool,
}

/// Looks up entries in the plain interwiki table.
pub trait InterwikiLookup {
    /// Returns the entry for `prefix`, if there is one.
    fn fetch(&self, prefix: &str) -> Option<Interwiki>;
}

impl InterwikiLookup for HashMap<String, Interwiki> {
    fn fetch(&self, prefix: &str) -> Option<Interwiki> {
        self.get(prefix).cloned()
    }
}

/// One row of the rule table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleSummary {
    /// The link prefix, including the subprefix.
    pub prefix: String,
    /// The plain URL template.
    pub url: String,
    /// The international URL template.
    pub url_int: Option<String>,
    /// Whether target sites are checked for existence.
    pub checks_exists: bool,
    /// Whether the rule can be used for transclusion.
    pub transcludable: bool,
    /// Whether the plain interwiki the rule hooks into is missing.
    pub missing: bool,
}

impl RuleSummary {
    /// Summarises a rule.
    pub fn new(rule: &Rule, lookup: &impl InterwikiLookup) -> Self {
        let vanilla = lookup.fetch(rule.interwiki());
        Self {
            prefix: rule.to_string(),
            url: rule.url().to_string(),
            url_int: rule.url_int().map(String::from),
            checks_exists: rule.checks_existence(),
            transcludable: !rule.base_trans_only()
                && vanilla.as_ref().is_some_and(|iw| iw.transcludable),
            missing: vanilla.is_none(),
        }
    }
}

/// Summarises every rule, in order.
pub fn summarize(rules: &RuleSet, lookup: &impl InterwikiLookup) -> Vec<RuleSummary> {
    rules
        .iter()
        .map(|rule| RuleSummary::new(rule, lookup))
        .collect()
}

/// Renders the rule table as HTML.
pub fn render_table(rows: &[RuleSummary]) -> String {
    let mut out = String::new();
    // Writing to a `String` never fails
    let _ = write_table(&mut out, rows);
    out
}

/// Writes the rule table.
fn write_table(out: &mut String, rows: &[RuleSummary]) -> core::fmt::Result {
    writeln!(
        out,
        r#"<table class="mw-interwikitable wikitable sortable body">"#
    )?;
    writeln!(
        out,
        concat!(
            r#"<thead><tr class="interwikitable-header">"#,
            "<th>Prefix</th><th>URL</th><th>International URL</th>",
            "<th>Checks existence</th><th>Transclude</th>",
            "</tr></thead>"
        )
    )?;
    out.push_str("<tbody>");

    for row in rows {
        let class = if row.missing {
            "mw-interwikitable-row ext-interwikidispatcher-missing"
        } else {
            "mw-interwikitable-row"
        };
        write!(out, r#"<tr class="{}">"#, encode_double_quoted_attribute(class))?;
        write!(
            out,
            r#"<td class="mw-interwikitable-prefix">{}</td>"#,
            encode_text(&row.prefix)
        )?;
        write!(
            out,
            r#"<td class="mw-interwikitable-url">{}</td>"#,
            encode_text(&row.url)
        )?;
        write!(
            out,
            r#"<td class="mw-interwikitable-url">{}</td>"#,
            encode_text(row.url_int.as_deref().unwrap_or("-"))
        )?;
        write!(
            out,
            r#"<td class="ext-interwikidispatcher-checksexists{}">{}</td>"#,
            if row.checks_exists {
                " ext-interwikidispatcher-checksexists-yes"
            } else {
                ""
            },
            yes_no(row.checks_exists)
        )?;
        writeln!(
            out,
            r#"<td class="mw-interwikitable-trans{}">{}</td></tr>"#,
            if row.transcludable {
                " mw-interwikitable-trans-yes"
            } else {
                ""
            },
            yes_no(row.transcludable)
        )?;
    }

    out.push_str("</tbody></table>");
    Ok(())
}

/// The table text for a flag.
fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
