//! Types and functions for the page references handed to the dispatcher.

use std::borrow::Cow;

/// A normalised interwiki page reference.
///
/// The reference is stored as a single dbkey-form string with the positions of
/// its delimiters, so each part can be borrowed without extra allocation.
#[derive(Clone, Debug, Eq)]
pub struct Title {
    /// The location of the interwiki delimiter in the title, if one exists.
    ///
    /// ```text
    /// Interwiki:Namespace:Page_key
    ///          ^
    /// ```
    iw_delimiter: Option<usize>,

    /// The location of the namespace delimiter in the title, if one exists.
    ///
    /// ```text
    /// Interwiki:Namespace:Page_key
    ///                    ^
    /// ```
    ns_delimiter: Option<usize>,

    /// The full title text, in dbkey form.
    text: String,
}

impl PartialEq for Title {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.interwiki() == other.interwiki()
            && self.ns_text() == other.ns_text()
    }
}

impl Title {
    /// Creates a title from its interwiki prefix, namespace text, and page key.
    ///
    /// Empty `interwiki` or `namespace` parts are treated as absent.
    pub fn from_parts(interwiki: &str, namespace: &str, key: &str) -> Self {
        let interwiki = normalize(interwiki);
        let namespace = normalize(namespace);
        let key = normalize(key);

        let mut text = String::with_capacity(interwiki.len() + namespace.len() + key.len() + 2);

        let iw_delimiter = (!interwiki.is_empty()).then(|| {
            text += &interwiki;
            let delimiter = text.len();
            text.push(':');
            delimiter
        });

        let ns_delimiter = (!namespace.is_empty()).then(|| {
            text += &namespace;
            let delimiter = text.len();
            text.push(':');
            delimiter
        });

        text += &key;

        Self {
            iw_delimiter,
            ns_delimiter,
            text,
        }
    }

    /// Creates a new [`Title`] from link text like `prefix:Some page`.
    ///
    /// Everything before the first colon is the interwiki prefix, which is
    /// lower-cased the same way MediaWiki stores prefixes in its interwiki
    /// table. Text without a colon is a title with no interwiki prefix.
    pub fn new(text: &str) -> Self {
        match text.split_once(':') {
            Some((interwiki, key)) => {
                Self::from_parts(&interwiki.trim().to_lowercase(), "", key)
            }
            None => Self::from_parts("", "", text),
        }
    }

    /// Returns a copy of this title in the given namespace.
    ///
    /// Interwiki titles normally never carry a namespace, but interwiki
    /// transclusion hands over references whose namespace was already split
    /// off the key.
    #[must_use]
    pub fn with_namespace(&self, namespace: &str) -> Self {
        Self::from_parts(self.interwiki(), namespace, self.db_key())
    }

    /// The title interwiki prefix.
    ///
    /// ```text
    /// Interwiki:Namespace:Page_key
    /// ^^^^^^^^^
    /// ```
    pub fn interwiki(&self) -> &str {
        let end_at = self.iw_delimiter.unwrap_or(0);
        &self.text[..end_at]
    }

    /// The namespace display text.
    ///
    /// ```text
    /// Interwiki:Namespace:Page_key
    ///           ^^^^^^^^^
    /// ```
    pub fn ns_text(&self) -> &str {
        let start_at = self.iw_delimiter.map_or(0, |d| d + 1);
        let end_at = self.ns_delimiter.unwrap_or(start_at);
        &self.text[start_at..end_at]
    }

    /// The page key, without namespace.
    ///
    /// ```text
    /// Interwiki:Namespace:Page_key
    ///                     ^^^^^^^^
    /// ```
    pub fn db_key(&self) -> &str {
        let start_at = self
            .ns_delimiter
            .or(self.iw_delimiter)
            .map_or(0, |d| d + 1);
        &self.text[start_at..]
    }

    /// The page key, with the namespace prefixed if there is one.
    ///
    /// ```text
    /// Interwiki:Namespace:Page_key
    ///           ^^^^^^^^^^^^^^^^^^
    /// ```
    pub fn prefixed_db_key(&self) -> &str {
        let start_at = self.iw_delimiter.map_or(0, |d| d + 1);
        &self.text[start_at..]
    }

    /// The full text of the title.
    ///
    /// ```text
    /// Interwiki:Namespace:Page_key
    /// ^^^^^^^^^^^^^^^^^^^^^^^^^^^^
    /// ```
    pub fn full_text(&self) -> &str {
        &self.text
    }
}

impl core::fmt::Display for Title {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Returns true if the given character `c` is a bidirectional text control
/// character.
fn bidi(c: char) -> bool {
    ('\u{200e}'..='\u{200f}').contains(&c) || ('\u{202a}'..='\u{202e}').contains(&c)
}

/// Normalises a title text part into dbkey form by converting runs of
/// whitespace + underscore to a single underscore and trimming them from
/// both ends.
pub fn normalize(text: &str) -> Cow<'_, str> {
    let mut out = String::new();
    let mut flushed = 0;
    let mut iter = text.char_indices().peekable();

    while let Some((index, c)) = iter.next() {
        // Peek to avoid switching to owned-mode when encountering a single
        // underscore
        if trimmable(c)
            && (index == 0 || c != '_' || matches!(iter.peek(), Some((_, c)) if trimmable(*c)))
        {
            while iter.next_if(|(_, c)| trimmable(*c)).is_some() {}

            // This acts like `trim`, not emitting an underscore at the start
            // (`index == 0`) or end (`peek().is_none()`) of the text.
            if let Some((next_index, _)) = iter.peek() {
                out += &text[flushed..index];
                flushed = *next_index;
                if index != 0 && text[index..*next_index].chars().any(spacelike) {
                    out.push('_');
                }
            }
        }
    }

    if flushed == 0 {
        Cow::Borrowed(text.trim_matches(trimmable))
    } else {
        out += text[flushed..].trim_end_matches(trimmable);
        Cow::Owned(out)
    }
}

/// Returns true if the character `c` is considered like whitespace in title
/// text.
fn spacelike(c: char) -> bool {
    c == '_' || c.is_whitespace()
}

/// Returns true if the character `c` is trimmable in title text.
fn trimmable(c: char) -> bool {
    bidi(c) || spacelike(c)
}
