//! Label extraction from fetched documents

use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title(?:\s[^>]*)?>(.*?)</title\s*>").expect("title regex is valid")
});

#[allow(clippy::expect_used)]
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").expect("entity regex is valid")
});

/// Trait for deriving a short label from a response body
///
/// Must be a pure function of `body`. Returning an empty string is normal; the
/// runner substitutes a fallback label.
pub trait Extractor: Send + Sync {
    /// Extract a label from `body`
    fn extract(&self, body: &str) -> String;
}

/// Reads the text of the first `<title>` element
///
/// Entities are decoded and runs of whitespace collapsed to a single space.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleExtractor;

impl Extractor for TitleExtractor {
    fn extract(&self, body: &str) -> String {
        let Some(raw) = TITLE_RE.captures(body).and_then(|c| c.get(1)) else {
            return String::new();
        };

        let decoded = decode_entities(raw.as_str());
        decoded.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Decode the common named entities and all numeric character references
///
/// Unknown names are left as written.
fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(entity)
            };

            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "trade" => '\u{2122}',
        "laquo" => '\u{ab}',
        "raquo" => '\u{bb}',
        "middot" => '\u{b7}',
        _ => return None,
    })
}
