//! Extraction of the language, site, and article parts of an interwiki page
//! key.
//!
//! A key addressed to a wiki farm looks like this:
//!
//! ```text
//! [subprefix:][language.]site[:article]
//! ```
//!
//! The colons may be surrounded by any number of underscores (or spaces, for
//! keys which have not been converted to dbkey form). The language is 2–12
//! characters from `[a-z-]` and the site is 1–50 characters from `[a-z0-9-]`.
//! Those bounds are what tells `en.mysite` (language + site) apart from a site
//! name which merely contains a dot, which is never valid.

use regex::{Regex, RegexBuilder};

/// The parts of a page key which addresses a wiki farm site.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedKey<'a> {
    /// The lower-cased language code, or an empty string if the key had no
    /// language part.
    pub language: String,
    /// The lower-cased site token.
    pub site: String,
    /// The article on the target site, exactly as written. Empty when the key
    /// names only a site.
    pub article: &'a str,
}

impl ParsedKey<'_> {
    /// Returns true if the key addressed a specific language edition.
    #[inline]
    pub fn is_international(&self) -> bool {
        !self.language.is_empty()
    }
}

/// A compiled key grammar for one subprefix.
#[derive(Clone, Debug)]
pub struct KeyPattern {
    /// The subprefix literal, if any.
    subprefix: Option<String>,
    /// The compiled grammar.
    pattern: Regex,
}

impl KeyPattern {
    /// The longest accepted site token. Keys with longer tokens do not match.
    pub const MAX_SITE_LEN: usize = 50;

    /// The longest accepted language code.
    pub const MAX_LANGUAGE_LEN: usize = 12;

    /// Compiles the grammar for keys which must start with the given
    /// `subprefix` literal. An empty or missing subprefix means keys start
    /// directly with the language or site part.
    pub fn new(subprefix: Option<&str>) -> Result<Self, regex::Error> {
        let subprefix = subprefix.filter(|subprefix| !subprefix.is_empty());

        // The structural classes are ASCII-only so that case-insensitive
        // matching does not let things like U+212A KELVIN SIGN in as `k`
        let mut pattern = String::from("^");
        if let Some(subprefix) = subprefix {
            pattern += "(?i:";
            pattern += &regex::escape(subprefix);
            pattern += ")[_ ]*:[_ ]*";
        }
        pattern += concat!(
            r"(?i-u:(?:([a-z\-]{2,12})\.)?([a-z0-9\-]{1,50}))",
            r"(?:[_ ]*:[_ ]*(.*))?$"
        );

        Ok(Self {
            subprefix: subprefix.map(String::from),
            pattern: RegexBuilder::new(&pattern).build()?,
        })
    }

    /// The subprefix this pattern requires, if any.
    pub fn subprefix(&self) -> Option<&str> {
        self.subprefix.as_deref()
    }

    /// Splits `key` into its language, site, and article parts, or returns
    /// `None` if the key is not addressed to a farm site in the form this
    /// pattern accepts.
    pub fn parse<'a>(&self, key: &'a str) -> Option<ParsedKey<'a>> {
        if key.is_empty() {
            return None;
        }

        let captures = self.pattern.captures(key)?;
        let language = captures
            .get(1)
            .map_or_else(String::new, |m| m.as_str().to_ascii_lowercase());
        let site = captures.get(2)?.as_str().to_ascii_lowercase();
        let article = captures.get(3).map_or("", |m| m.as_str());

        Some(ParsedKey {
            language,
            site,
            article,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<'a>(subprefix: Option<&str>, key: &'a str) -> Option<ParsedKey<'a>> {
        KeyPattern::new(subprefix).unwrap().parse(key)
    }

    fn parsed<'a>(language: &str, site: &str, article: &'a str) -> Option<ParsedKey<'a>> {
        Some(ParsedKey {
            language: language.into(),
            site: site.into(),
            article,
        })
    }

    #[test]
    fn site_only() {
        assert_eq!(parse(None, "mysite"), parsed("", "mysite", ""));
        assert_eq!(parse(None, "mysite:"), parsed("", "mysite", ""));
        assert_eq!(parse(None, "mysite_:__"), parsed("", "mysite", ""));
    }

    #[test]
    fn site_and_article() {
        assert_eq!(parse(None, "mysite:Foo_Bar"), parsed("", "mysite", "Foo_Bar"));
        assert_eq!(parse(None, "my-site2:Foo"), parsed("", "my-site2", "Foo"));
        assert_eq!(
            parse(None, "mysite__:__Help:Foo:Bar"),
            parsed("", "mysite", "Help:Foo:Bar")
        );
        assert_eq!(parse(None, "mysite : Foo"), parsed("", "mysite", "Foo"));
    }

    #[test]
    fn language() {
        assert_eq!(parse(None, "en.mysite:Foo"), parsed("en", "mysite", "Foo"));
        assert_eq!(
            parse(None, "zh-hant.mysite:Foo"),
            parsed("zh-hant", "mysite", "Foo")
        );
        assert_eq!(parse(None, "pt-br.mysite"), parsed("pt-br", "mysite", ""));
    }

    #[test]
    fn language_bounds() {
        // Too short or too long to be a language, and a dot is never part of
        // a site token
        assert_eq!(parse(None, "e.mysite:Foo"), None);
        assert_eq!(parse(None, "abcdefghijklm.mysite:Foo"), None);
        assert_eq!(
            parse(None, "abcdefghijkl.mysite:Foo"),
            parsed("abcdefghijkl", "mysite", "Foo")
        );
        assert_eq!(parse(None, "e1.mysite:Foo"), None);
        assert_eq!(parse(None, "en.my.site:Foo"), None);
    }

    #[test]
    fn site_bounds() {
        let longest = "a".repeat(KeyPattern::MAX_SITE_LEN);
        let key = format!("{longest}:Foo");
        assert_eq!(parse(None, &key), parsed("", &longest, "Foo"));

        let key = format!("{longest}a:Foo");
        assert_eq!(parse(None, &key), None);
    }

    #[test]
    fn case_folding() {
        assert_eq!(parse(None, "EN.MySite:Foo"), parsed("en", "mysite", "Foo"));
        assert_eq!(parse(None, "MySite:FooBar"), parsed("", "mysite", "FooBar"));
        // Non-ASCII case variants are not structural characters
        assert_eq!(parse(None, "\u{212a}site:Foo"), None);
    }

    #[test]
    fn invalid() {
        assert_eq!(parse(None, ""), None);
        assert_eq!(parse(None, ":Foo"), None);
        assert_eq!(parse(None, "my_site:Foo"), None);
        assert_eq!(parse(None, "my site"), None);
        assert_eq!(parse(None, "mysite/Foo"), None);
        assert_eq!(parse(None, "Ünï:Foo"), None);
    }

    #[test]
    fn subprefix() {
        assert_eq!(parse(Some("c"), "c:mysite:Foo"), parsed("", "mysite", "Foo"));
        assert_eq!(parse(Some("c"), "C__:__mysite:Foo"), parsed("", "mysite", "Foo"));
        assert_eq!(
            parse(Some("c"), "c:de.mysite:Foo"),
            parsed("de", "mysite", "Foo")
        );
        assert_eq!(parse(Some("c"), "mysite:Foo"), None);
        assert_eq!(parse(Some("c"), "c"), None);
        assert_eq!(parse(Some("c"), "cmysite:Foo"), None);
    }

    #[test]
    fn subprefix_is_literal() {
        assert_eq!(parse(Some("a.b"), "a.b:mysite"), parsed("", "mysite", ""));
        assert_eq!(parse(Some("a.b"), "axb:mysite"), None);
    }

    #[test]
    fn empty_subprefix() {
        assert_eq!(parse(Some(""), "mysite:Foo"), parsed("", "mysite", "Foo"));
        assert!(KeyPattern::new(Some("")).unwrap().subprefix().is_none());
    }
}
