// Animation driver: which line set is on screen and how its opacity is resolved.
// Static and the two animated variants are one tagged union; the effect paints through
// `active_lines` + `pulse_clock` regardless of mode.

use rand::Rng;

use crate::generator::{generate, LineSet};
use crate::renderer::PulseClock;
use crate::types::{AnimationStyle, EffectConfig, GeneratorConfig};

/// Number of line sets cycled in frame-swap mode.
pub const FRAME_SWAP_SETS: usize = 3;

/// Swap cadence at `animation_speed == 1`.
pub const BASE_SWAP_INTERVAL_MS: f64 = 80.0;

/// Milliseconds between swaps. Speeds below 0.1 are treated as 0.1.
pub fn swap_interval_ms(animation_speed: f64) -> f64 {
    BASE_SWAP_INTERVAL_MS / animation_speed.max(0.1)
}

/// Rotating line sets for the chaotic flicker.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSwap {
    sets: Vec<LineSet>,
    cursor: usize,
    elapsed_ms: f64,
    last_swap_ms: f64,
}

impl FrameSwap {
    fn generate<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> Self {
        FrameSwap {
            sets: (0..FRAME_SWAP_SETS).map(|_| generate(config, false, rng)).collect(),
            cursor: 0,
            elapsed_ms: 0.0,
            last_swap_ms: 0.0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn sets(&self) -> &[LineSet] {
        &self.sets
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    fn advance(&mut self, delta_ms: f64, animation_speed: f64) {
        self.elapsed_ms += delta_ms;
        if self.elapsed_ms - self.last_swap_ms >= swap_interval_ms(animation_speed) {
            self.cursor = (self.cursor + 1) % self.sets.len();
            self.last_swap_ms = self.elapsed_ms;
            log::trace!("frame swap -> set {}", self.cursor);
        }
    }
}

/// Current animation state of one effect instance.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationMode {
    /// One set, painted on change only.
    Static { lines: LineSet },
    /// One set with pulse parameters; `time_secs` drives the opacity pulse.
    Pulse { lines: LineSet, time_secs: f64 },
    /// Three sets swapped on a fixed cadence.
    FrameSwap(FrameSwap),
}

impl AnimationMode {
    /// Build the mode `config` asks for, generating fresh line sets.
    pub fn build<R: Rng + ?Sized>(config: &EffectConfig, rng: &mut R) -> Self {
        let generator = config.generator();
        let mode = match (config.animated, config.animation_style) {
            (false, _) => AnimationMode::Static {
                lines: generate(&generator, false, rng),
            },
            (true, AnimationStyle::Pulse) => AnimationMode::Pulse {
                lines: generate(&generator, true, rng),
                time_secs: 0.0,
            },
            (true, AnimationStyle::FrameSwap) => {
                AnimationMode::FrameSwap(FrameSwap::generate(&generator, rng))
            }
        };
        log::debug!(
            "generated {} line(s) for {} mode",
            config.line_count,
            mode.name()
        );
        mode
    }

    pub fn name(&self) -> &'static str {
        match self {
            AnimationMode::Static { .. } => "static",
            AnimationMode::Pulse { .. } => "pulse",
            AnimationMode::FrameSwap(_) => "frame-swap",
        }
    }

    pub fn is_animated(&self) -> bool {
        !matches!(self, AnimationMode::Static { .. })
    }

    /// Advance time by `delta_ms`. Static mode ignores time.
    pub fn advance(&mut self, delta_ms: f64, animation_speed: f64) {
        match self {
            AnimationMode::Static { .. } => {}
            AnimationMode::Pulse { time_secs, .. } => *time_secs += delta_ms * 0.001,
            AnimationMode::FrameSwap(swap) => swap.advance(delta_ms, animation_speed),
        }
    }

    /// The set to paint this frame.
    pub fn active_lines(&self) -> &LineSet {
        match self {
            AnimationMode::Static { lines } | AnimationMode::Pulse { lines, .. } => lines,
            AnimationMode::FrameSwap(swap) => &swap.sets[swap.cursor],
        }
    }

    /// Pulse clock for the renderer; only pulse mode modulates opacity.
    pub fn pulse_clock(&self, animation_speed: f64) -> Option<PulseClock> {
        match self {
            AnimationMode::Pulse { time_secs, .. } => Some(PulseClock {
                time_secs: *time_secs,
                animation_speed,
            }),
            _ => None,
        }
    }
}

/// Owns the animation mode and the random source used to regenerate it.
#[derive(Debug)]
pub struct AnimationDriver<R> {
    mode: AnimationMode,
    rng: R,
}

impl<R: Rng> AnimationDriver<R> {
    pub fn new(config: &EffectConfig, mut rng: R) -> Self {
        let mode = AnimationMode::build(config, &mut rng);
        AnimationDriver { mode, rng }
    }

    pub fn mode(&self) -> &AnimationMode {
        &self.mode
    }

    /// Discard current sets and rebuild from `config`.
    pub fn regenerate(&mut self, config: &EffectConfig) {
        self.mode = AnimationMode::build(config, &mut self.rng);
    }

    /// Replace the random source. Takes effect at the next regeneration.
    pub fn reseed(&mut self, rng: R) {
        self.rng = rng;
    }

    pub fn advance(&mut self, delta_ms: f64, animation_speed: f64) {
        self.mode.advance(delta_ms, animation_speed);
    }
}
