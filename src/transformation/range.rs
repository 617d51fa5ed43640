//! Range value normalization for video offsets and durations
//!
//! Accepted forms are a plain number (`5`, `2.63`) optionally followed by a
//! percent marker (`%`, `p`, `P`), which is rendered as a literal `p`.
//! Offsets can also be given as a `start..end` string or a two element list.

use regex::Regex;
use std::sync::OnceLock;

use super::params::ParamValue;
use crate::error::{CloudinaryError, Result};

static RANGE_VALUE: OnceLock<Regex> = OnceLock::new();

static RANGE: OnceLock<Regex> = OnceLock::new();

fn range_value_pattern() -> &'static Regex {
    RANGE_VALUE.get_or_init(|| {
        Regex::new(r"^((?:\d+\.)?\d+)([%pP])?$")
            .expect("Invalid range value regex - this is a compile-time bug")
    })
}

fn range_pattern() -> &'static Regex {
    RANGE.get_or_init(|| {
        Regex::new(r"^(\d+\.)?\d+[%pP]?\.\.(\d+\.)?\d+[%pP]?$")
            .expect("Invalid range regex - this is a compile-time bug")
    })
}

/// Normalize a single range value, `None` when it does not match the grammar
pub fn norm_range_value(value: &ParamValue) -> Option<String> {
    let raw = value.to_string();
    if raw.is_empty() {
        return None;
    }

    let caps = range_value_pattern().captures(&raw)?;
    let number = caps.get(1)?.as_str();
    let modifier = if caps.get(2).is_some() { "p" } else { "" };
    Some(format!("{}{}", number, modifier))
}

/// Split an offset into its start and end components
///
/// Lists must hold at least two elements. Strings must look like
/// `start..end`; any other string is not a range and yields `None`.
pub fn split_range(value: &ParamValue) -> Result<Option<(ParamValue, ParamValue)>> {
    match value {
        ParamValue::List(items) => {
            if items.len() < 2 {
                return Err(CloudinaryError::invalid_param(
                    "offset",
                    format!("expected 2 elements, got {}", items.len()),
                ));
            }
            Ok(Some((items[0].clone(), items[1].clone())))
        }
        ParamValue::Str(s) if range_pattern().is_match(s) => {
            let (start, end) = s
                .split_once("..")
                .ok_or_else(|| CloudinaryError::invalid_param("offset", "missing '..'"))?;
            Ok(Some((start.into(), end.into())))
        }
        _ => Ok(None),
    }
}
