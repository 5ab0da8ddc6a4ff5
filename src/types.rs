// Strong typing over strings. Percent points, pixel points, and effect configuration.
// Percentages live in 0-100 at the config boundary; pixels are logical (CSS) units.

use serde::{Deserialize, Serialize};

use crate::error::EffectError;

/// Point expressed as percentages of the viewport (0-100 on each axis).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentPoint {
    pub x: f64,
    pub y: f64,
}

impl PercentPoint {
    pub fn new(x: f64, y: f64) -> Self {
        PercentPoint { x, y }
    }

    pub fn center() -> Self {
        PercentPoint { x: 50.0, y: 50.0 }
    }

    /// Resolve against a viewport of `width` x `height` logical pixels.
    pub fn resolve(&self, width: f64, height: f64) -> PixelPoint {
        PixelPoint::new(self.x / 100.0 * width, self.y / 100.0 * height)
    }
}

impl Default for PercentPoint {
    fn default() -> Self {
        PercentPoint::center()
    }
}

/// Absolute point in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        PixelPoint { x, y }
    }

    /// Point at `distance` along the unit direction (`cos`, `sin`).
    pub fn offset(&self, cos: f64, sin: f64, distance: f64) -> Self {
        PixelPoint::new(self.x + cos * distance, self.y + sin * distance)
    }
}

/// Which animation runs while `animated` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnimationStyle {
    /// Per-line sinusoidal opacity pulse over a single line set.
    #[default]
    Pulse,
    /// Cycle through pre-generated line sets for a flickering look.
    FrameSwap,
}

/// The subset of configuration that affects line generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    pub line_count: u32,
    /// Percentage 0-100.
    pub min_length: f64,
    /// Percentage 0-100.
    pub max_length: f64,
}

/// Speed lines configuration passed from JS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    #[serde(default)]
    pub center: PercentPoint,
    #[serde(default = "default_line_count")]
    pub line_count: u32,
    /// Minimum line length, percent of the ray's edge distance.
    #[serde(default = "default_min_length")]
    pub min_length: f64,
    /// Maximum line length, percent of the ray's edge distance.
    #[serde(default = "default_max_length")]
    pub max_length: f64,
    /// Clear area around the center, percent of the max radius.
    #[serde(default)]
    pub inner_radius: f64,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub animated: bool,
    #[serde(default = "default_animation_speed")]
    pub animation_speed: f64,
    #[serde(default)]
    pub animation_style: AnimationStyle,
    /// Fixed seed for reproducible lines. Random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_line_count() -> u32 {
    60
}

fn default_min_length() -> f64 {
    10.0
}

fn default_max_length() -> f64 {
    30.0
}

pub(crate) const DEFAULT_COLOR: &str = "rgba(0, 0, 0, 0.6)";

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_animation_speed() -> f64 {
    1.0
}

impl Default for EffectConfig {
    fn default() -> Self {
        EffectConfig {
            center: PercentPoint::center(),
            line_count: default_line_count(),
            min_length: default_min_length(),
            max_length: default_max_length(),
            inner_radius: 0.0,
            color: default_color(),
            animated: false,
            animation_speed: default_animation_speed(),
            animation_style: AnimationStyle::Pulse,
            seed: None,
        }
    }
}

impl EffectConfig {
    /// Short static lines hugging the edges.
    pub fn classic() -> Self {
        EffectConfig::default()
    }

    /// Long flickering lines swapped between frames.
    pub fn chaotic() -> Self {
        EffectConfig {
            min_length: 30.0,
            max_length: 60.0,
            animated: true,
            animation_style: AnimationStyle::FrameSwap,
            ..EffectConfig::default()
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Result<Self, EffectError> {
        match name {
            "classic" => Ok(EffectConfig::classic()),
            "chaotic" => Ok(EffectConfig::chaotic()),
            other => Err(EffectError::InvalidConfig(format!(
                "unknown preset {:?} (expected \"classic\" or \"chaotic\")",
                other
            ))),
        }
    }

    /// Parse from JSON, then clamp out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, EffectError> {
        let config: EffectConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Clamp numeric fields into their documented domains.
    /// Misordered lengths are kept as-is; generation collapses them to a zero span.
    pub fn sanitized(mut self) -> Self {
        self.min_length = clamp_percent(self.min_length, default_min_length());
        self.max_length = clamp_percent(self.max_length, default_max_length());
        self.inner_radius = clamp_percent(self.inner_radius, 0.0);
        if !self.center.x.is_finite() || !self.center.y.is_finite() {
            log::warn!("non-finite center {:?}, using viewport center", self.center);
            self.center = PercentPoint::center();
        }
        if !self.animation_speed.is_finite() || self.animation_speed <= 0.0 {
            log::warn!(
                "animation_speed {} is not positive, using {}",
                self.animation_speed,
                default_animation_speed()
            );
            self.animation_speed = default_animation_speed();
        }
        if self.min_length > self.max_length {
            log::warn!(
                "min_length {} exceeds max_length {}, lines will all use min_length",
                self.min_length,
                self.max_length
            );
        }
        self
    }

    pub fn generator(&self) -> GeneratorConfig {
        GeneratorConfig {
            line_count: self.line_count,
            min_length: self.min_length,
            max_length: self.max_length,
        }
    }
}

fn clamp_percent(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        fallback
    }
}
