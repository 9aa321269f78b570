//! MediaWiki global helper functions which do not correspond to a PHP
//! built-in.

use crate::php::{strtr, urlencode};
use std::borrow::Cow;

/// Encodes a title for use in the path part of a URL, like MediaWiki’s
/// `wfUrlencode`.
///
/// This is [`urlencode`] with the escapes for characters that are safe in a
/// path segment reverted, so that `Help:Foo/Bar` stays readable.
pub fn url_encode(input: &str) -> String {
    let encoded = urlencode(input);
    match strtr(
        &encoded,
        &[
            ("%3B", ";"),
            ("%40", "@"),
            ("%24", "$"),
            ("%21", "!"),
            ("%2A", "*"),
            ("%28", "("),
            ("%29", ")"),
            ("%2C", ","),
            ("%2F", "/"),
            ("%7E", "~"),
            ("%3A", ":"),
        ],
    ) {
        Cow::Borrowed(_) => encoded,
        Cow::Owned(decoded) => decoded,
    }
}

/// Appends a query string to a URL, like MediaWiki’s `wfAppendQuery`.
///
/// Any fragment on the URL stays at the end.
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }

    let (base, fragment) = url
        .find('#')
        .map_or((url, ""), |index| url.split_at(index));

    let mut out = String::with_capacity(url.len() + query.len() + 1);
    out += base;
    out.push(if base.contains('?') { '&' } else { '?' });
    out += query;
    out += fragment;
    out
}
