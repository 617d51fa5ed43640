//! Path encoding helpers
//!
//! The delivery service expects "smart" escaping: form-style percent
//! encoding where `/` and `:` stay literal and spaces become `%20`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::constants::CDN_SHARD_COUNT;

/// Everything except `A-Za-z0-9 . - * _ / :` is escaped
const SMART_ESCAPE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'*')
    .remove(b'_')
    .remove(b'/')
    .remove(b':');

static MULTIPLE_SLASHES: OnceLock<Regex> = OnceLock::new();

static DOUBLE_SLASH: OnceLock<Regex> = OnceLock::new();

static LEADING_SLASHES: OnceLock<Regex> = OnceLock::new();

static ABSOLUTE_URL: OnceLock<Regex> = OnceLock::new();

fn multiple_slashes() -> &'static Regex {
    MULTIPLE_SLASHES.get_or_init(|| {
        Regex::new(r"([^:])/+").expect("Invalid slash regex - this is a compile-time bug")
    })
}

fn double_slash() -> &'static Regex {
    DOUBLE_SLASH.get_or_init(|| {
        Regex::new(r"([^:])//").expect("Invalid slash regex - this is a compile-time bug")
    })
}

fn leading_slashes() -> &'static Regex {
    LEADING_SLASHES.get_or_init(|| {
        Regex::new(r"^/+").expect("Invalid slash regex - this is a compile-time bug")
    })
}

fn absolute_url() -> &'static Regex {
    ABSOLUTE_URL.get_or_init(|| {
        Regex::new(r"(?i)^https?:/").expect("Invalid URL regex - this is a compile-time bug")
    })
}

/// Percent-encode for use as a delivery path, keeping `/` and `:`
pub fn smart_escape(value: &str) -> String {
    utf8_percent_encode(value, SMART_ESCAPE_SET).to_string()
}

/// Undo existing escapes before re-escaping; a literal `+` is kept as `+`
pub fn unescape(value: &str) -> String {
    let protected = value.replace('+', "%2B");
    match urlencoding::decode(&protected) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => value.to_string(),
    }
}

/// Whether `value` is an absolute http(s) URL
pub fn is_absolute_url(value: &str) -> bool {
    absolute_url().is_match(value)
}

/// Collapse runs of `/` that are not part of a `scheme://`
pub fn merge_slashes(url: &str) -> Cow<'_, str> {
    multiple_slashes().replace_all(url, "${1}/")
}

/// Collapse a single doubled slash outside of `scheme://`
pub fn merge_double_slash(value: &str) -> Cow<'_, str> {
    double_slash().replace_all(value, "${1}/")
}

pub fn strip_leading_slashes(value: &str) -> Cow<'_, str> {
    leading_slashes().replace(value, "")
}

/// CDN shard number (1..=5) for a source string
pub fn shard(source: &str) -> u32 {
    crc32fast::hash(source.as_bytes()) % CDN_SHARD_COUNT + 1
}
