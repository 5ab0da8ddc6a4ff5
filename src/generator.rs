// Line generation: randomized radial line descriptors.
// Pure apart from the injected random source, so a seeded rng reproduces a set exactly.

use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::GeneratorConfig;

pub const MIN_WIDTH: f64 = 2.0;
pub const MAX_WIDTH: f64 = 10.0;
pub const MIN_OPACITY: f64 = 0.6;
pub const MAX_OPACITY: f64 = 1.0;
pub const MIN_PULSE_SPEED: f64 = 2.0;
pub const MAX_PULSE_SPEED: f64 = 5.0;

/// Per-line parameters for the sinusoidal opacity pulse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    /// Phase offset in radians, [0, 2π).
    pub offset: f64,
    /// Angular speed multiplier.
    pub speed: f64,
}

/// A single speed line. Never mutated after generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Direction from the center in radians, [0, 2π).
    pub angle: f64,
    /// Fraction of the ray's edge distance to cover, [0, 1].
    pub length: f64,
    /// Thickness at the outer end.
    pub width: f64,
    /// Base alpha before any pulse.
    pub opacity: f64,
    pub pulse: Option<Pulse>,
}

/// An ordered, immutable set of lines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineSet {
    lines: Vec<Line>,
}

impl LineSet {
    pub fn new(lines: Vec<Line>) -> Self {
        LineSet { lines }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Generate `config.line_count` lines. `with_pulse` draws pulse parameters for each line.
pub fn generate<R: Rng + ?Sized>(config: &GeneratorConfig, with_pulse: bool, rng: &mut R) -> LineSet {
    let min = config.min_length.clamp(0.0, 100.0);
    let max = config.max_length.clamp(0.0, 100.0);
    // Misordered bounds collapse to min_length.
    let span = (max - min).max(0.0);

    let lines = (0..config.line_count)
        .map(|_| {
            let angle = rng.gen_range(0.0..TAU);
            let length = (min + rng.gen::<f64>() * span) / 100.0;
            let width = MIN_WIDTH + rng.gen::<f64>() * (MAX_WIDTH - MIN_WIDTH);
            let opacity = MIN_OPACITY + rng.gen::<f64>() * (MAX_OPACITY - MIN_OPACITY);
            let pulse = with_pulse.then(|| Pulse {
                offset: rng.gen_range(0.0..TAU),
                speed: MIN_PULSE_SPEED + rng.gen::<f64>() * (MAX_PULSE_SPEED - MIN_PULSE_SPEED),
            });
            Line {
                angle,
                length,
                width,
                opacity,
                pulse,
            }
        })
        .collect();

    LineSet::new(lines)
}
