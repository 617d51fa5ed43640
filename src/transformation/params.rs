//! Transformation parameter values and the short-code table
//!
//! A stage maps semantic parameter names (`width`, `crop`, `overlay`) to
//! [`ParamValue`]s. Rendering looks each name up in [`SHORT_CODES`] to get
//! the code the delivery service understands.

use std::collections::BTreeMap;
use std::fmt;

use super::layer::Layer;
use crate::error::Result;
use crate::expression::Expression;

/// One set of transformation parameters, rendered as a single path component
pub type Stage = BTreeMap<String, ParamValue>;

/// A transformation parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    /// Always renders with a fractional part: `1.0` means 100%, `1` means one pixel
    Float(f64),
    Bool(bool),
    List(Vec<ParamValue>),
    /// Nested transformation given as a parameter map
    Stage(Stage),
    VideoCodec(VideoCodec),
    Layer(Layer),
    Expression(Expression),
}

impl ParamValue {
    /// Render a scalar or a list; lists join with `separator`
    pub fn render_joined(&self, separator: &str) -> String {
        match self {
            ParamValue::List(items) => items
                .iter()
                .map(|item| item.render_joined(separator))
                .collect::<Vec<_>>()
                .join(separator),
            other => other.to_string(),
        }
    }

    /// Like [`render_joined`](Self::render_joined), but a layer that cannot
    /// be rendered is an error instead of an empty string
    pub fn try_render_joined(&self, separator: &str) -> Result<String> {
        match self {
            ParamValue::List(items) => Ok(items
                .iter()
                .map(|item| item.try_render_joined(separator))
                .collect::<Result<Vec<_>>>()?
                .join(separator)),
            ParamValue::Layer(layer) => layer.render(),
            other => Ok(other.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Str(s) => match s.as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            ParamValue::Int(i) => Some(*i != 0),
            _ => None,
        }
    }

    /// Blank means nothing is rendered for the parameter
    pub fn is_blank(&self) -> bool {
        match self {
            ParamValue::Str(s) => s.trim().is_empty(),
            ParamValue::List(items) => items.is_empty(),
            ParamValue::Stage(stage) => stage.is_empty(),
            ParamValue::Expression(expr) => expr.is_empty(),
            _ => false,
        }
    }
}

/// Layers that fail to render display as an empty string; use
/// [`ParamValue::try_render_joined`] where the error matters.
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => write!(f, "{}", s),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::List(_) => write!(f, "{}", self.render_joined(",")),
            ParamValue::Stage(_) => Ok(()),
            ParamValue::VideoCodec(codec) => write!(f, "{}", codec),
            ParamValue::Layer(layer) => match layer.render() {
                Ok(rendered) => write!(f, "{}", rendered),
                Err(_) => Ok(()),
            },
            ParamValue::Expression(expr) => write!(f, "{}", expr),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Str(value.clone())
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        // Go through the shortest decimal form so 0.1f32 stays "0.1"
        ParamValue::Float(value.to_string().parse().unwrap_or(value as f64))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<Layer> for ParamValue {
    fn from(value: Layer) -> Self {
        ParamValue::Layer(value)
    }
}

impl From<VideoCodec> for ParamValue {
    fn from(value: VideoCodec) -> Self {
        ParamValue::VideoCodec(value)
    }
}

impl From<Expression> for ParamValue {
    fn from(value: Expression) -> Self {
        ParamValue::Expression(value)
    }
}

impl From<Stage> for ParamValue {
    fn from(value: Stage) -> Self {
        ParamValue::Stage(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(value: Vec<T>) -> Self {
        ParamValue::List(value.into_iter().map(Into::into).collect())
    }
}

/// Video codec with optional profile and level
///
/// Renders `codec[:profile[:level]]`; a level without a profile is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoCodec {
    pub codec: String,
    pub profile: Option<String>,
    pub level: Option<String>,
}

impl VideoCodec {
    pub fn new(codec: impl Into<String>) -> Self {
        Self {
            codec: codec.into(),
            ..Default::default()
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.codec)?;
        if let Some(profile) = &self.profile {
            write!(f, ":{}", profile)?;
            if let Some(level) = &self.level {
                write!(f, ":{}", level)?;
            }
        }
        Ok(())
    }
}

/// How a parameter is turned into its rendered value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    /// Scalar; lists join with `,`
    Plain,
    /// Lists join with the given separator
    Joined(&'static str),
    /// Scalar passed through expression normalization
    Expression,
    /// Leading `#` becomes `rgb:`
    Color,
    /// Range value (`5.5`, `20p`, `30%`)
    Range,
    /// Overlay / underlay descriptor
    Layer,
    /// Computed by the compiler itself (named transformations, offsets, codecs)
    Special,
}

/// Short code, semantic name, rendering rule; sorted by short code
pub const SHORT_CODES: &[(&str, &str, Rendering)] = &[
    ("a", "angle", Rendering::Joined(".")),
    ("ac", "audio_codec", Rendering::Plain),
    ("af", "audio_frequency", Rendering::Plain),
    ("ar", "aspect_ratio", Rendering::Expression),
    ("b", "background", Rendering::Color),
    ("bo", "border", Rendering::Plain),
    ("br", "bit_rate", Rendering::Plain),
    ("c", "crop", Rendering::Plain),
    ("co", "color", Rendering::Color),
    ("cs", "color_space", Rendering::Plain),
    ("d", "default_image", Rendering::Plain),
    ("dl", "delay", Rendering::Plain),
    ("dn", "density", Rendering::Plain),
    ("dpr", "dpr", Rendering::Special),
    ("du", "duration", Rendering::Range),
    ("e", "effect", Rendering::Joined(":")),
    ("eo", "end_offset", Rendering::Special),
    ("f", "fetch_format", Rendering::Plain),
    ("fl", "flags", Rendering::Joined(".")),
    ("fps", "fps", Rendering::Joined("-")),
    ("g", "gravity", Rendering::Plain),
    ("h", "height", Rendering::Expression),
    ("ki", "keyframe_interval", Rendering::Plain),
    ("l", "overlay", Rendering::Layer),
    ("o", "opacity", Rendering::Expression),
    ("p", "prefix", Rendering::Plain),
    ("pg", "page", Rendering::Plain),
    ("q", "quality", Rendering::Expression),
    ("r", "radius", Rendering::Joined(":")),
    ("so", "start_offset", Rendering::Special),
    ("sp", "streaming_profile", Rendering::Plain),
    ("t", "transformation", Rendering::Special),
    ("u", "underlay", Rendering::Layer),
    ("vc", "video_codec", Rendering::Special),
    ("vs", "video_sampling", Rendering::Plain),
    ("w", "width", Rendering::Expression),
    ("x", "x", Rendering::Expression),
    ("y", "y", Rendering::Expression),
    ("z", "zoom", Rendering::Expression),
];

/// Look up the short code for a semantic parameter name
pub fn short_code(name: &str) -> Option<&'static str> {
    SHORT_CODES
        .iter()
        .find(|(_, param, _)| *param == name)
        .map(|(code, _, _)| *code)
}
