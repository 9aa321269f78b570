//! PHP compatible functions.
//!
//! The rewriting rules were written against PHP string semantics, and
//! existing farm configurations depend on the exact byte output of these
//! functions, so they are reproduced here instead of using whatever the
//! closest Rust equivalent happens to be.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::borrow::Cow;

/// Bytes which [`urlencode`] leaves alone. Everything that is not ASCII
/// alphanumeric or one of these is percent-encoded.
const URLENCODE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Finds and replaces substrings in the input like [`strtr`](https://php.net/strtr).
/// To avoid extra temporary allocation, `replacements` should be ordered from
/// longest to shortest match.
///
/// Replacement text is never rescanned, so a replacement which contains one of
/// the search strings is emitted as-is.
pub fn strtr<'a>(input: &'a str, replacements: &[(&str, &str)]) -> Cow<'a, str> {
    let replacements = if replacements.is_sorted_by(|(a, _), (b, _)| a.len() >= b.len()) {
        Cow::Borrowed(replacements)
    } else {
        let mut replacements = Vec::from(replacements);
        replacements.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
        Cow::Owned(replacements)
    };

    let mut iter = input.char_indices();
    let mut out = String::new();
    let mut flushed = 0;
    'next: while iter.offset() != input.len() {
        for (find, replace) in replacements.iter() {
            if !find.is_empty() && iter.as_str().starts_with(find) {
                out += &input[flushed..iter.offset()];
                out += *replace;
                flushed = iter.offset() + find.len();
                // `find` is a prefix of the remaining input, so skipping its
                // byte length always lands on a char boundary
                while iter.offset() < flushed {
                    iter.next();
                }
                continue 'next;
            }
        }
        iter.next();
    }

    if flushed == 0 {
        Cow::Borrowed(input)
    } else {
        out += &input[flushed..];
        Cow::Owned(out)
    }
}

/// Encodes a string like [`urlencode`](https://php.net/urlencode).
///
/// This is the `application/x-www-form-urlencoded` flavour: spaces become `+`
/// and hex digits are upper-case.
pub fn urlencode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (index, part) in input.split(' ').enumerate() {
        if index != 0 {
            out.push('+');
        }
        out.extend(utf8_percent_encode(part, URLENCODE));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strtr() {
        let input = "hello, world!";

        // longest first
        assert_eq!(
            strtr(input, &[("ll", "lol"), ("hello", "goodbye")]),
            Cow::<str>::Owned(String::from("goodbye, world!"))
        );

        // do not match already matched
        assert_eq!(
            strtr(input, &[("hello", "world"), ("world", "universe")]),
            Cow::<str>::Owned(String::from("world, universe!"))
        );

        // return original if no match
        assert_eq!(
            strtr(input, &[("foo", "bar")]),
            Cow::Borrowed("hello, world!")
        );
    }

    #[test]
    fn test_strtr_multibyte() {
        assert_eq!(
            strtr("ÿ$1ÿ$2ÿ", &[("$1", "one"), ("$2", "two")]),
            "ÿoneÿtwoÿ"
        );
        assert_eq!(strtr("$1", &[("$1", "$2"), ("$2", "no")]), "$2");
    }

    #[test]
    fn test_urlencode() {
        assert_eq!(urlencode("Foo_Bar"), "Foo_Bar");
        assert_eq!(urlencode("a b"), "a+b");
        assert_eq!(urlencode("a-b.c~d"), "a-b.c%7Ed");
        assert_eq!(urlencode("50%&x=y"), "50%25%26x%3Dy");
        assert_eq!(urlencode("é"), "%C3%A9");
        assert_eq!(urlencode(" "), "+");
        assert_eq!(urlencode(""), "");
    }
}
