//! Overlay and underlay descriptors
//!
//! A layer renders to the value of the `l_` / `u_` parameter:
//!
//! ```text
//! Asset      [resource_type:][type:]folder:public_id[.format]
//! Text       text:<style>|<public_id>[:<escaped text>]
//! Subtitles  subtitles:[<style>:]public_id
//! Fetch      fetch:<base64url(url)>
//! ```

use base64::{engine::general_purpose::URL_SAFE, Engine};

use crate::error::{CloudinaryError, Result};
use crate::url::encoding::smart_escape;

/// Font and layout options shared by text and subtitle layers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<String>,
    pub font_style: Option<String>,
    pub text_decoration: Option<String>,
    pub text_align: Option<String>,
    pub stroke: Option<String>,
    pub letter_spacing: Option<String>,
    pub line_spacing: Option<String>,
}

impl TextStyle {
    pub fn new(font_family: impl Into<String>, font_size: impl ToString) -> Self {
        Self {
            font_family: Some(font_family.into()),
            font_size: Some(font_size.to_string()),
            ..Default::default()
        }
    }

    pub fn font_weight(mut self, weight: impl Into<String>) -> Self {
        self.font_weight = Some(weight.into());
        self
    }

    pub fn font_style(mut self, style: impl Into<String>) -> Self {
        self.font_style = Some(style.into());
        self
    }

    pub fn text_decoration(mut self, decoration: impl Into<String>) -> Self {
        self.text_decoration = Some(decoration.into());
        self
    }

    pub fn text_align(mut self, align: impl Into<String>) -> Self {
        self.text_align = Some(align.into());
        self
    }

    pub fn stroke(mut self, stroke: impl Into<String>) -> Self {
        self.stroke = Some(stroke.into());
        self
    }

    pub fn letter_spacing(mut self, spacing: impl ToString) -> Self {
        self.letter_spacing = Some(spacing.to_string());
        self
    }

    pub fn line_spacing(mut self, spacing: impl ToString) -> Self {
        self.line_spacing = Some(spacing.to_string());
        self
    }

    /// `family_size[_weight][_style][_decoration][_align][_stroke][_letter_spacing_N][_line_spacing_N]`
    ///
    /// Returns `None` when no style is set at all; defaults such as
    /// `normal` weight or `none` decoration are left out.
    pub fn identifier(&self) -> Result<Option<String>> {
        let mut components: Vec<String> = Vec::new();

        let not_default = |value: &Option<String>, default: &str| {
            value.as_ref().filter(|v| v.as_str() != default).cloned()
        };

        components.extend(not_default(&self.font_weight, "normal"));
        components.extend(not_default(&self.font_style, "normal"));
        components.extend(not_default(&self.text_decoration, "none"));
        components.extend(self.text_align.clone());
        components.extend(not_default(&self.stroke, "none"));
        if let Some(spacing) = &self.letter_spacing {
            components.push(format!("letter_spacing_{}", spacing));
        }
        if let Some(spacing) = &self.line_spacing {
            components.push(format!("line_spacing_{}", spacing));
        }

        if self.font_family.is_none() && self.font_size.is_none() && components.is_empty() {
            return Ok(None);
        }

        let family = self
            .font_family
            .as_ref()
            .ok_or_else(|| CloudinaryError::invalid_param("overlay", "Must supply font_family"))?;
        let size = self
            .font_size
            .as_ref()
            .ok_or_else(|| CloudinaryError::invalid_param("overlay", "Must supply font_size"))?;

        let mut identifier = vec![family.clone(), size.clone()];
        identifier.extend(components);
        Ok(Some(identifier.join("_")))
    }
}

/// Layer descriptor for `overlay` / `underlay`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    /// A stored asset
    Asset {
        public_id: String,
        format: Option<String>,
        resource_type: Option<String>,
        delivery_type: Option<String>,
    },
    /// Rendered text, either styled inline or from a stored text style (`public_id`)
    Text {
        public_id: Option<String>,
        text: Option<String>,
        style: TextStyle,
    },
    /// A subtitles file burned into a video
    Subtitles {
        public_id: String,
        style: TextStyle,
    },
    /// A remote image fetched by URL
    Fetch { url: String },
}

impl Layer {
    pub fn asset(public_id: impl Into<String>) -> Self {
        Layer::Asset {
            public_id: public_id.into(),
            format: None,
            resource_type: None,
            delivery_type: None,
        }
    }

    pub fn text(text: impl Into<String>, style: TextStyle) -> Self {
        Layer::Text {
            public_id: None,
            text: Some(text.into()),
            style,
        }
    }

    pub fn subtitles(public_id: impl Into<String>) -> Self {
        Layer::Subtitles {
            public_id: public_id.into(),
            style: TextStyle::default(),
        }
    }

    pub fn fetch(url: impl Into<String>) -> Self {
        Layer::Fetch { url: url.into() }
    }

    /// Set the format of an asset layer; other variants are returned unchanged
    pub fn with_format(mut self, value: impl Into<String>) -> Self {
        if let Layer::Asset { format, .. } = &mut self {
            *format = Some(value.into());
        }
        self
    }

    pub fn with_resource_type(mut self, value: impl Into<String>) -> Self {
        if let Layer::Asset { resource_type, .. } = &mut self {
            *resource_type = Some(value.into());
        }
        self
    }

    pub fn with_delivery_type(mut self, value: impl Into<String>) -> Self {
        if let Layer::Asset { delivery_type, .. } = &mut self {
            *delivery_type = Some(value.into());
        }
        self
    }

    /// Render the layer into its parameter value
    pub fn render(&self) -> Result<String> {
        match self {
            Layer::Asset {
                public_id,
                format,
                resource_type,
                delivery_type,
            } => {
                if public_id.trim().is_empty() {
                    return Err(CloudinaryError::invalid_param(
                        "overlay",
                        "Must supply public_id",
                    ));
                }
                let mut components: Vec<String> = Vec::new();
                if let Some(rt) = resource_type.as_ref().filter(|rt| rt.as_str() != "image") {
                    components.push(rt.clone());
                }
                if let Some(dt) = delivery_type.as_ref().filter(|dt| dt.as_str() != "upload") {
                    components.push(dt.clone());
                }
                components.push(formatted_public_id(public_id, format.as_deref()));
                Ok(components.join(":"))
            }
            Layer::Text {
                public_id,
                text,
                style,
            } => {
                if public_id.is_none() && text.is_none() {
                    return Err(CloudinaryError::invalid_param(
                        "overlay",
                        "Must supply either text or public_id",
                    ));
                }
                let mut components = vec!["text".to_string()];
                match public_id {
                    Some(id) => components.push(formatted_public_id(id, None)),
                    None => {
                        let identifier = style.identifier()?.ok_or_else(|| {
                            CloudinaryError::invalid_param(
                                "overlay",
                                "Must supply font_family and font_size for text overlay",
                            )
                        })?;
                        components.push(identifier);
                    }
                }
                if let Some(text) = text {
                    components.push(escape_text(text));
                }
                Ok(components.join(":"))
            }
            Layer::Subtitles { public_id, style } => {
                if public_id.trim().is_empty() {
                    return Err(CloudinaryError::invalid_param(
                        "overlay",
                        "Must supply public_id",
                    ));
                }
                let mut components = vec!["subtitles".to_string()];
                components.extend(style.identifier()?);
                components.push(formatted_public_id(public_id, None));
                Ok(components.join(":"))
            }
            Layer::Fetch { url } => {
                if url.trim().is_empty() {
                    return Err(CloudinaryError::invalid_param("overlay", "Must supply url"));
                }
                Ok(format!("fetch:{}", URL_SAFE.encode(url.as_bytes())))
            }
        }
    }
}

fn formatted_public_id(public_id: &str, format: Option<&str>) -> String {
    let id = public_id.replace('/', ":");
    match format {
        Some(format) => format!("{}.{}", id, format),
        None => id,
    }
}

/// Commas and slashes would split the parameter or the path, so they are escaped twice
fn escape_text(text: &str) -> String {
    smart_escape(text)
        .replace("%2C", "%252C")
        .replace('/', "%252F")
}
