//! `<img>` tag rendering

use std::collections::BTreeMap;

use super::Url;
use crate::constants::{BLANK_PLACEHOLDER, HIDPI_CLASS, RESPONSIVE_CLASS};
use crate::error::Result;

/// Attribute that names the visible `src` for responsive / hiDPI images
pub const RESPONSIVE_PLACEHOLDER_ATTR: &str = "responsive_placeholder";

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl Url {
    /// Render an `<img>` tag for `source`
    ///
    /// `width`/`height` come from the transformation unless the caller passes
    /// them. Responsive and hiDPI images move the real URL to `data-src` and
    /// show `responsive_placeholder` (`"blank"` for a transparent GIF) instead.
    pub fn image_tag(
        &self,
        source: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<Option<String>> {
        let generated = match self.generate_with_meta(source)? {
            Some(generated) => generated,
            None => return Ok(None),
        };

        let mut attributes = attributes.clone();
        let meta = generated.meta;
        let mut src = Some(generated.url);

        if !self.config.client_hints {
            if let Some(height) = meta.html_height {
                attributes.entry("height".to_string()).or_insert(height);
            }
            if let Some(width) = meta.html_width {
                attributes.entry("width".to_string()).or_insert(width);
            }

            if meta.hi_dpi || meta.is_responsive {
                let extra_class = if meta.is_responsive {
                    RESPONSIVE_CLASS
                } else {
                    HIDPI_CLASS
                };
                let class = match attributes.get("class").filter(|c| !c.trim().is_empty()) {
                    Some(existing) => format!("{} {}", existing, extra_class),
                    None => extra_class.to_string(),
                };
                attributes.insert("class".to_string(), class);

                if let Some(url) = src.take() {
                    attributes.insert("data-src".to_string(), url);
                }
                src = attributes
                    .remove(RESPONSIVE_PLACEHOLDER_ATTR)
                    .map(|placeholder| match placeholder.as_str() {
                        "blank" => BLANK_PLACEHOLDER.to_string(),
                        _ => placeholder,
                    });
            }
        }
        attributes.remove(RESPONSIVE_PLACEHOLDER_ATTR);

        let mut tag = String::from("<img");
        if let Some(src) = src {
            tag.push_str(&format!(" src='{}'", escape_attribute(&src)));
        }
        for (key, value) in &attributes {
            tag.push_str(&format!(" {}='{}'", key, escape_attribute(value)));
        }
        tag.push_str("/>");
        Ok(Some(tag))
    }
}
