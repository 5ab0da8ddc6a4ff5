// CSS color strings to straight-alpha RGBA.
// Covers hex, rgb()/rgba(), and the common named colors.

use serde::{Deserialize, Serialize};

use crate::error::EffectError;

/// Straight (non-premultiplied) RGBA color. Channels 0-255, alpha 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Rgba { r, g, b, a }
    }

    /// The speed lines default, `rgba(0, 0, 0, 0.6)`.
    pub const fn default_line() -> Self {
        Rgba::new(0, 0, 0, 0.6)
    }

    /// Parse a CSS color string.
    pub fn parse(input: &str) -> Result<Rgba, EffectError> {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();

        if let Some(hex) = lower.strip_prefix('#') {
            return parse_hex(input, hex);
        }
        if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb")) {
            return parse_rgb_function(input, args);
        }
        named(&lower).ok_or_else(|| EffectError::color(input, "unrecognized color"))
    }

    /// Parse, falling back to the default line color.
    pub fn parse_or_default(input: &str) -> Rgba {
        Rgba::parse(input).unwrap_or_else(|err| {
            log::warn!("{}; using default line color", err);
            Rgba::default_line()
        })
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::default_line()
    }
}

fn function_args<'a>(input: &'a str, name: &str) -> Option<&'a str> {
    input
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_hex(input: &str, hex: &str) -> Result<Rgba, EffectError> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EffectError::color(input, "non-hex digit"));
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).map(|d| d * 17);
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    let channels = match hex.len() {
        3 | 4 => {
            let alpha = if hex.len() == 4 { digit(3) } else { Ok(255) };
            (digit(0), digit(1), digit(2), alpha)
        }
        6 | 8 => {
            let alpha = if hex.len() == 8 { pair(6) } else { Ok(255) };
            (pair(0), pair(2), pair(4), alpha)
        }
        n => {
            return Err(EffectError::color(
                input,
                format!("expected 3, 4, 6 or 8 hex digits, got {}", n),
            ))
        }
    };
    match channels {
        (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Rgba::new(r, g, b, a as f64 / 255.0)),
        _ => Err(EffectError::color(input, "non-hex digit")),
    }
}

fn parse_rgb_function(input: &str, args: &str) -> Result<Rgba, EffectError> {
    // Accept both `r, g, b, a` and `r g b / a`.
    let normalized = args.replace('/', " ").replace(',', " ");
    let parts: Vec<&str> = normalized.split_whitespace().collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(EffectError::color(
            input,
            format!("expected 3 or 4 components, got {}", parts.len()),
        ));
    }

    let mut rgb = [0u8; 3];
    for (slot, part) in rgb.iter_mut().zip(&parts) {
        *slot = parse_channel(input, part)?;
    }
    let alpha = match parts.get(3) {
        Some(part) => parse_alpha(input, part)?,
        None => 1.0,
    };
    Ok(Rgba::new(rgb[0], rgb[1], rgb[2], alpha))
}

fn parse_number(input: &str, text: &str) -> Result<f64, EffectError> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EffectError::color(input, format!("bad component {:?}", text)))
}

fn parse_channel(input: &str, text: &str) -> Result<u8, EffectError> {
    let value = match text.strip_suffix('%') {
        Some(pct) => parse_number(input, pct)? / 100.0 * 255.0,
        None => parse_number(input, text)?,
    };
    Ok(value.round().clamp(0.0, 255.0) as u8)
}

fn parse_alpha(input: &str, text: &str) -> Result<f64, EffectError> {
    let value = match text.strip_suffix('%') {
        Some(pct) => parse_number(input, pct)? / 100.0,
        None => parse_number(input, text)?,
    };
    Ok(value.clamp(0.0, 1.0))
}

fn named(name: &str) -> Option<Rgba> {
    let (r, g, b) = match name {
        "transparent" => return Some(Rgba::TRANSPARENT),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "maroon" => (128, 0, 0),
        "navy" => (0, 0, 128),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "pink" => (255, 192, 203),
        _ => return None,
    };
    Some(Rgba::new(r, g, b, 1.0))
}
