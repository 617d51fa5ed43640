//! Transformation compiler
//!
//! A [`Transformation`] is an ordered list of stages. Each stage is rendered
//! into one comma separated path component of short-code parameters
//! (`c_fill,h_100,w_100`), and stages are joined with `/`:
//!
//! ```text
//! width(100).height(101).crop("fill").chain().effect("sepia")
//!   => c_fill,h_101,w_100/e_sepia
//! ```
//!
//! Rendering is a pure function of the stages and the [`RenderOptions`]; the
//! HTML dimensions and responsive flags that tag rendering needs are returned
//! in [`RenderedMeta`] instead of being stored on the transformation.

pub mod layer;
pub mod params;
pub mod range;

use std::collections::BTreeMap;

pub use layer::{Layer, TextStyle};
pub use params::{short_code, ParamValue, Rendering, Stage, VideoCodec, SHORT_CODES};

use crate::error::Result;
use crate::expression::normalize;
use range::{norm_range_value, split_range};

/// Compiler defaults that apply to every render call
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Treat every stage as `responsive_width = true` unless it says otherwise
    pub default_responsive: bool,
    /// `dpr` used by stages that don't set one
    pub default_dpr: Option<ParamValue>,
    /// Stage appended after each responsive stage
    pub responsive_width_transformation: Stage,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            default_responsive: false,
            default_dpr: None,
            responsive_width_transformation: default_responsive_width_transformation(),
        }
    }
}

/// `c_limit,w_auto`
pub fn default_responsive_width_transformation() -> Stage {
    let mut stage = Stage::new();
    stage.insert("width".to_string(), "auto".into());
    stage.insert("crop".to_string(), "limit".into());
    stage
}

/// Values derived while rendering, consumed by tag generation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedMeta {
    /// `width` attribute for an `<img>` tag, if the width is a plain size
    pub html_width: Option<String>,
    /// `height` attribute for an `<img>` tag, if the height is a plain size
    pub html_height: Option<String>,
    /// Some stage used `width=auto` or responsive width
    pub is_responsive: bool,
    /// Some stage used `dpr=auto`
    pub hi_dpi: bool,
}

/// Result of rendering a transformation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rendered {
    pub path: String,
    pub meta: RenderedMeta,
}

/// Ordered list of transformation stages; never empty
#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    stages: Vec<Stage>,
}

impl Default for Transformation {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformation {
    pub fn new() -> Self {
        Self {
            stages: vec![Stage::new()],
        }
    }

    /// Build from explicit stages; an empty list yields one empty stage
    pub fn from_stages(stages: Vec<Stage>) -> Self {
        if stages.is_empty() {
            Self::new()
        } else {
            Self { stages }
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Whether no stage holds any parameter
    pub fn is_empty(&self) -> bool {
        self.stages.iter().all(Stage::is_empty)
    }

    fn current(&mut self) -> &mut Stage {
        if self.stages.is_empty() {
            self.stages.push(Stage::new());
        }
        let last = self.stages.len() - 1;
        &mut self.stages[last]
    }

    /// Start a new stage; subsequent setters apply to it
    pub fn chain(mut self) -> Self {
        self.stages.push(Stage::new());
        self
    }

    /// Set any parameter on the current stage by its semantic name
    pub fn param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.current().insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.stages.last().and_then(|stage| stage.get(name))
    }

    // === Geometry ===

    pub fn width(self, value: impl Into<ParamValue>) -> Self {
        self.param("width", value)
    }

    pub fn height(self, value: impl Into<ParamValue>) -> Self {
        self.param("height", value)
    }

    /// `"WxH"`, split into width and height at render time
    pub fn size(self, value: &str) -> Self {
        self.param("size", value)
    }

    pub fn crop(self, value: &str) -> Self {
        self.param("crop", value)
    }

    pub fn gravity(self, value: &str) -> Self {
        self.param("gravity", value)
    }

    pub fn x(self, value: impl Into<ParamValue>) -> Self {
        self.param("x", value)
    }

    pub fn y(self, value: impl Into<ParamValue>) -> Self {
        self.param("y", value)
    }

    pub fn zoom(self, value: impl Into<ParamValue>) -> Self {
        self.param("zoom", value)
    }

    pub fn aspect_ratio(self, value: impl Into<ParamValue>) -> Self {
        self.param("aspect_ratio", value)
    }

    /// Single angle or a list such as `["auto_right", "hflip"]`
    pub fn angle(self, value: impl Into<ParamValue>) -> Self {
        self.param("angle", value)
    }

    pub fn radius(self, value: impl Into<ParamValue>) -> Self {
        self.param("radius", value)
    }

    pub fn dpr(self, value: impl Into<ParamValue>) -> Self {
        self.param("dpr", value)
    }

    /// Mark this stage responsive; adds the responsive width stage after it
    pub fn responsive_width(self, value: bool) -> Self {
        self.param("responsive_width", value)
    }

    // === Appearance ===

    pub fn background(self, value: &str) -> Self {
        self.param("background", value)
    }

    pub fn color(self, value: &str) -> Self {
        self.param("color", value)
    }

    pub fn effect(self, value: &str) -> Self {
        self.param("effect", value)
    }

    /// `e_<name>:<value>`
    pub fn effect_with(self, name: &str, value: impl ToString) -> Self {
        self.param("effect", vec![name.to_string(), value.to_string()])
    }

    /// `bo_<width>px_solid_<color>`
    pub fn border(self, width: u32, color: &str) -> Self {
        let color = render_color(&color.into());
        self.param("border", format!("{}px_solid_{}", width, color))
    }

    pub fn opacity(self, value: impl Into<ParamValue>) -> Self {
        self.param("opacity", value)
    }

    pub fn quality(self, value: impl Into<ParamValue>) -> Self {
        self.param("quality", value)
    }

    pub fn flags(self, value: impl Into<ParamValue>) -> Self {
        self.param("flags", value)
    }

    pub fn color_space(self, value: &str) -> Self {
        self.param("color_space", value)
    }

    pub fn density(self, value: impl Into<ParamValue>) -> Self {
        self.param("density", value)
    }

    pub fn page(self, value: impl Into<ParamValue>) -> Self {
        self.param("page", value)
    }

    pub fn default_image(self, value: &str) -> Self {
        self.param("default_image", value)
    }

    pub fn prefix(self, value: &str) -> Self {
        self.param("prefix", value)
    }

    pub fn delay(self, value: impl Into<ParamValue>) -> Self {
        self.param("delay", value)
    }

    pub fn fetch_format(self, value: &str) -> Self {
        self.param("fetch_format", value)
    }

    // === Layers ===

    /// A raw layer string (`"text:hello"`) or a [`Layer`]
    pub fn overlay(self, value: impl Into<ParamValue>) -> Self {
        self.param("overlay", value)
    }

    pub fn underlay(self, value: impl Into<ParamValue>) -> Self {
        self.param("underlay", value)
    }

    // === Video / audio ===

    pub fn video_codec(self, value: impl Into<ParamValue>) -> Self {
        self.param("video_codec", value)
    }

    pub fn audio_codec(self, value: &str) -> Self {
        self.param("audio_codec", value)
    }

    pub fn audio_frequency(self, value: impl Into<ParamValue>) -> Self {
        self.param("audio_frequency", value)
    }

    pub fn bit_rate(self, value: impl Into<ParamValue>) -> Self {
        self.param("bit_rate", value)
    }

    pub fn video_sampling(self, value: impl Into<ParamValue>) -> Self {
        self.param("video_sampling", value)
    }

    pub fn keyframe_interval(self, value: impl Into<ParamValue>) -> Self {
        self.param("keyframe_interval", value)
    }

    pub fn streaming_profile(self, value: &str) -> Self {
        self.param("streaming_profile", value)
    }

    /// Single rate or a `[min, max]` list rendered as `min-max`
    pub fn fps(self, value: impl Into<ParamValue>) -> Self {
        self.param("fps", value)
    }

    pub fn duration(self, value: impl Into<ParamValue>) -> Self {
        self.param("duration", value)
    }

    pub fn start_offset(self, value: impl Into<ParamValue>) -> Self {
        self.param("start_offset", value)
    }

    pub fn end_offset(self, value: impl Into<ParamValue>) -> Self {
        self.param("end_offset", value)
    }

    /// `"start..end"` or a two element list; overrides start/end offsets
    pub fn offset(self, value: impl Into<ParamValue>) -> Self {
        self.param("offset", value)
    }

    // === Composition ===

    /// Reference one or more named transformations
    pub fn named<S: AsRef<str>>(self, names: &[S]) -> Self {
        let names: Vec<ParamValue> = names.iter().map(|n| n.as_ref().into()).collect();
        self.param("transformation", ParamValue::List(names))
    }

    /// Prepend nested transformations (stages or names) to the current stage
    pub fn nested(self, items: Vec<ParamValue>) -> Self {
        self.param("transformation", ParamValue::List(items))
    }

    /// Appended verbatim after the rendered parameters
    pub fn raw_transformation(self, value: &str) -> Self {
        self.param("raw_transformation", value)
    }

    /// `if_<condition>`; accepts a raw string or an [`Expression`](crate::expression::Expression)
    pub fn if_condition(self, condition: impl Into<ParamValue>) -> Self {
        self.param("if", condition)
    }

    /// Close a conditional block in its own `if_end` stage
    pub fn end_if_condition(self) -> Self {
        self.chain().param("if", "end")
    }

    /// User defined variable, rendered as `$name_value`
    pub fn variable(self, name: &str, value: impl Into<ParamValue>) -> Self {
        let name = format!("${}", name.trim_start_matches('$'));
        self.param(&name, value)
    }

    /// Render with default options
    pub fn generate(&self) -> Result<String> {
        Ok(self.render(&RenderOptions::default())?.path)
    }

    /// Render all stages; empty stages contribute nothing
    pub fn render(&self, options: &RenderOptions) -> Result<Rendered> {
        let mut meta = RenderedMeta::default();
        let mut parts = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let rendered = render_stage(stage, options, &mut meta, true)?;
            if !rendered.is_empty() {
                parts.push(rendered);
            }
        }

        let path = parts.join("/");
        tracing::debug!(transformation = %path, "Rendered transformation");
        Ok(Rendered { path, meta })
    }
}

/// Render a transformation with explicit compiler options
pub fn render_transformation(
    transformation: &Transformation,
    options: &RenderOptions,
) -> Result<Rendered> {
    transformation.render(options)
}

/// `auto`, unparseable and sub-pixel sizes make no sense as tag attributes
fn is_html_size(value: &str) -> bool {
    !value.starts_with("auto") && value.parse::<f64>().map(|v| v >= 1.0).unwrap_or(false)
}

fn render_color(value: &ParamValue) -> String {
    let raw = value.to_string();
    match raw.strip_prefix('#') {
        Some(hex) => format!("rgb:{}", hex),
        None => raw,
    }
}

/// Plain codec, [`VideoCodec`], or a `codec`/`profile`/`level` map
fn render_video_codec(value: &ParamValue) -> String {
    match value {
        ParamValue::Stage(map) => {
            let field = |key: &str| map.get(key).map(ToString::to_string);
            let mut codec = VideoCodec::new(field("codec").unwrap_or_default());
            codec.profile = field("profile");
            codec.level = field("level");
            codec.to_string()
        }
        other => other.to_string(),
    }
}

fn render_range(name: &str, value: Option<&ParamValue>) -> Option<String> {
    let value = value?;
    let normalized = norm_range_value(value);
    if normalized.is_none() && !value.is_blank() {
        tracing::warn!(param = name, value = %value, "Dropping malformed range value");
    }
    normalized
}

fn render_stage(
    stage: &Stage,
    options: &RenderOptions,
    meta: &mut RenderedMeta,
    top_level: bool,
) -> Result<String> {
    render_stage_inner(stage, options, meta, top_level, true)
}

fn render_stage_inner(
    stage: &Stage,
    options: &RenderOptions,
    meta: &mut RenderedMeta,
    top_level: bool,
    allow_responsive: bool,
) -> Result<String> {
    let mut stage = stage.clone();

    if let Some(ParamValue::Str(size)) = stage.remove("size") {
        if let Some((w, h)) = size.split_once('x') {
            stage.insert("width".to_string(), w.into());
            stage.insert("height".to_string(), h.into());
        }
    }

    let width = stage.get("width").map(ToString::to_string);
    let height = stage.get("height").map(ToString::to_string);

    let has_layer = ["overlay", "underlay"]
        .iter()
        .any(|name| stage.get(*name).map(|v| !v.is_blank()).unwrap_or(false));
    let angle = stage
        .get("angle")
        .map(|v| v.render_joined("."))
        .unwrap_or_default();
    let crop = stage.get("crop").map(ToString::to_string);
    let responsive = allow_responsive
        && stage
            .get("responsive_width")
            .and_then(ParamValue::as_bool)
            .unwrap_or(options.default_responsive);

    let no_html_sizes = has_layer
        || !angle.trim().is_empty()
        || matches!(crop.as_deref(), Some("fit") | Some("limit"))
        || responsive;

    let html_width = width
        .clone()
        .filter(|w| is_html_size(w) && !no_html_sizes);
    let html_height = height
        .clone()
        .filter(|h| h.parse::<f64>().map(|v| v >= 1.0).unwrap_or(false) && !no_html_sizes);

    // Nested transformations become separate path components before this stage
    let mut child_paths: Vec<String> = Vec::new();
    let mut named: Option<String> = None;
    match stage.get("transformation") {
        Some(ParamValue::List(items)) => {
            if items.iter().all(|item| !matches!(item, ParamValue::Stage(_))) {
                let names = items
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(".");
                named = Some(names);
            } else {
                for item in items {
                    let child = match item {
                        ParamValue::Stage(child) => child.clone(),
                        other => {
                            let mut wrapper = Stage::new();
                            wrapper.insert("transformation".to_string(), other.clone());
                            wrapper
                        }
                    };
                    let rendered = render_stage_inner(&child, options, meta, false, true)?;
                    if !rendered.is_empty() {
                        child_paths.push(rendered);
                    }
                }
            }
        }
        Some(ParamValue::Stage(child)) => {
            let rendered = render_stage_inner(child, options, meta, false, true)?;
            if !rendered.is_empty() {
                child_paths.push(rendered);
            }
        }
        Some(other) => named = Some(other.to_string()),
        None => {}
    }

    let mut start_offset = render_range("start_offset", stage.get("start_offset"));
    let mut end_offset = render_range("end_offset", stage.get("end_offset"));
    if let Some(offset) = stage.get("offset") {
        if let Some((start, end)) = split_range(offset)? {
            start_offset = render_range("start_offset", Some(&start));
            end_offset = render_range("end_offset", Some(&end));
        }
    }

    let dpr = stage
        .get("dpr")
        .or(options.default_dpr.as_ref())
        .map(ToString::to_string);

    let video_codec = stage.get("video_codec").map(render_video_codec);

    let mut params: BTreeMap<&'static str, String> = BTreeMap::new();
    for (code, name, rendering) in SHORT_CODES {
        let rendered = match rendering {
            Rendering::Special => match *name {
                "dpr" => dpr.clone(),
                "start_offset" => start_offset.clone(),
                "end_offset" => end_offset.clone(),
                "transformation" => named.clone(),
                "video_codec" => video_codec.clone(),
                _ => None,
            },
            Rendering::Range => render_range(name, stage.get(*name)),
            Rendering::Layer => match stage.get(*name) {
                Some(ParamValue::Layer(layer)) => Some(layer.render()?),
                Some(other) => Some(other.to_string()),
                None => None,
            },
            Rendering::Joined(separator) => stage.get(*name).map(|v| v.render_joined(separator)),
            Rendering::Color => stage.get(*name).map(render_color),
            Rendering::Expression => stage.get(*name).map(|v| match v {
                ParamValue::Str(s) => normalize(s),
                other => other.to_string(),
            }),
            Rendering::Plain => stage.get(*name).map(ToString::to_string),
        };
        if let Some(value) = rendered.filter(|v| !v.trim().is_empty()) {
            params.insert(*code, value);
        }
    }

    let mut components: Vec<String> = Vec::new();

    if let Some(condition) = stage.get("if").filter(|v| !v.is_blank()) {
        let condition = match condition {
            ParamValue::Str(s) => normalize(s),
            other => other.to_string(),
        };
        components.push(format!("if_{}", condition));
    }

    for (name, value) in stage.iter().filter(|(name, _)| name.starts_with('$')) {
        let value = match value {
            ParamValue::Str(s) => normalize(s),
            other => other.to_string(),
        };
        components.push(format!("{}_{}", name, value));
    }

    components.extend(params.iter().map(|(code, value)| format!("{}_{}", code, value)));

    if let Some(raw) = stage.get("raw_transformation").filter(|v| !v.is_blank()) {
        components.push(raw.to_string());
    }

    let mut parts = child_paths;
    if !components.is_empty() {
        parts.push(components.join(","));
    }
    if responsive {
        let extra = render_stage_inner(
            &options.responsive_width_transformation,
            options,
            meta,
            false,
            false,
        )?;
        if !extra.is_empty() {
            parts.push(extra);
        }
    }

    if width.as_deref() == Some("auto") || responsive {
        meta.is_responsive = true;
    }
    if dpr.as_deref() == Some("auto") {
        meta.hi_dpi = true;
    }
    if top_level && !stage.is_empty() {
        meta.html_width = html_width;
        meta.html_height = html_height;
    }

    Ok(parts.join("/"))
}
