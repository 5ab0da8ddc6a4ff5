// One speed lines instance: configuration, animation, viewport, and surface.
// Every instance owns its state outright; nothing is shared between instances.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::animation::{AnimationDriver, AnimationMode};
use crate::color::Rgba;
use crate::frame_loop::{FrameHandle, FrameLoop, FrameScheduler};
use crate::raster::{PixelBuffer, Surface};
use crate::renderer::{paint_lines, FrameParams};
use crate::types::EffectConfig;
use crate::viewport::{ResizeOutcome, SizeObserver, ViewportShell, ViewportState};

/// A mounted speed lines effect.
///
/// Static configurations paint once per visual change. Animated configurations keep a
/// frame request outstanding with the scheduler and repaint on every fired frame.
pub struct SpeedLinesEffect<S: FrameScheduler, R: Rng + SeedableRng = SmallRng> {
    config: EffectConfig,
    color: Rgba,
    driver: AnimationDriver<R>,
    frames: FrameLoop,
    scheduler: S,
    shell: ViewportShell,
    surface: Option<PixelBuffer>,
    paint_passes: u32,
    torn_down: bool,
}

impl<S: FrameScheduler, R: Rng + SeedableRng> SpeedLinesEffect<S, R> {
    /// Mount with `config`. `entropy` seeds generation unless the config fixes a seed.
    pub fn new(config: EffectConfig, scheduler: S, entropy: u64) -> Self {
        let rng = R::seed_from_u64(config.seed.unwrap_or(entropy));
        Self::with_rng(config, scheduler, rng)
    }

    /// Mount with an explicit random source.
    pub fn with_rng(config: EffectConfig, scheduler: S, rng: R) -> Self {
        let config = config.sanitized();
        let mut effect = SpeedLinesEffect {
            color: Rgba::parse_or_default(&config.color),
            driver: AnimationDriver::new(&config, rng),
            frames: FrameLoop::new(),
            scheduler,
            shell: ViewportShell::new(),
            surface: None,
            paint_passes: 0,
            torn_down: false,
            config,
        };
        if effect.config.animated {
            effect.frames.start(&mut effect.scheduler);
        }
        effect
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn mode(&self) -> &AnimationMode {
        self.driver.mode()
    }

    pub fn viewport(&self) -> &ViewportState {
        self.shell.state()
    }

    pub fn shell(&self) -> &ViewportShell {
        &self.shell
    }

    pub fn surface(&self) -> Option<&PixelBuffer> {
        self.surface.as_ref()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Completed paint passes since mount.
    pub fn paint_passes(&self) -> u32 {
        self.paint_passes
    }

    /// Whether a frame request is outstanding.
    pub fn is_animating(&self) -> bool {
        self.frames.is_running()
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.frames.pending()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Apply a new configuration, regenerating and repainting only what it affects.
    pub fn set_config(&mut self, config: EffectConfig) {
        if self.torn_down {
            return;
        }
        let config = config.sanitized();
        let old = std::mem::replace(&mut self.config, config);
        let new = &self.config;

        let color_changed = old.color != new.color;
        if color_changed {
            self.color = Rgba::parse_or_default(&new.color);
        }

        let reseed = new.seed.filter(|seed| old.seed != Some(*seed));
        let regenerate = reseed.is_some()
            || old.generator() != new.generator()
            || old.animated != new.animated
            || (new.animated && old.animation_style != new.animation_style);

        if let Some(seed) = reseed {
            self.driver.reseed(R::seed_from_u64(seed));
        }
        if regenerate {
            self.driver.regenerate(&self.config);
        }

        match (old.animated, self.config.animated) {
            (false, true) => self.frames.start(&mut self.scheduler),
            (true, false) => self.frames.stop(&mut self.scheduler),
            _ => {}
        }

        // Animated modes pick changes up on the next frame.
        if !self.config.animated {
            let visual_changed = regenerate
                || color_changed
                || old.center != self.config.center
                || old.inner_radius != self.config.inner_radius;
            if visual_changed {
                self.paint();
            }
        }
    }

    /// Attach the host's size observer; it is disconnected on teardown.
    pub fn attach_observer(&mut self, observer: Box<dyn SizeObserver>) {
        if self.torn_down {
            let mut observer = observer;
            observer.disconnect();
            return;
        }
        self.shell.attach(observer);
    }

    /// Report the container's size. Returns whether the backing store was reallocated,
    /// in which case the surface is repainted immediately.
    pub fn resize(&mut self, client_width: f64, client_height: f64, device_pixel_ratio: f64) -> bool {
        if self.torn_down {
            return false;
        }
        match self.shell.observe(client_width, client_height, device_pixel_ratio) {
            ResizeOutcome::Unchanged => false,
            ResizeOutcome::Reallocated(backing) => {
                let dpr = self.shell.state().device_pixel_ratio;
                self.surface = (!backing.is_empty())
                    .then(|| PixelBuffer::new(backing.width, backing.height, dpr));
                self.paint();
                true
            }
        }
    }

    /// Deliver a fired frame. Returns whether a paint pass ran.
    pub fn on_frame(&mut self, handle: FrameHandle, now_ms: f64) -> bool {
        if self.torn_down {
            return false;
        }
        let Some(delta_ms) = self.frames.fire(handle, now_ms, &mut self.scheduler) else {
            return false;
        };
        self.driver.advance(delta_ms, self.config.animation_speed);
        self.paint()
    }

    /// Clear the surface and paint the active line set. No-op without a drawable surface.
    pub fn paint(&mut self) -> bool {
        let state = *self.shell.state();
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        if !state.is_drawable() {
            return false;
        }

        let (width, height) = (state.logical.width, state.logical.height);
        let mode = self.driver.mode();
        let params = FrameParams::resolve(
            self.config.center.resolve(width, height),
            self.config.inner_radius,
            self.color,
            width,
            height,
            mode.pulse_clock(self.config.animation_speed),
        );

        surface.clear();
        paint_lines(surface, mode.active_lines().lines(), &params);
        self.paint_passes += 1;
        true
    }

    /// Cancel the frame loop, disconnect the observer, and release the surface.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.frames.stop(&mut self.scheduler);
        self.shell.detach();
        self.surface = None;
        self.torn_down = true;
        log::debug!("speed lines torn down after {} paint pass(es)", self.paint_passes);
    }
}

impl<S: FrameScheduler, R: Rng + SeedableRng> Drop for SpeedLinesEffect<S, R> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::FRAME_SWAP_SETS;
    use crate::frame_loop::ManualScheduler;
    use crate::types::{AnimationStyle, PercentPoint};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type Effect = SpeedLinesEffect<ManualScheduler>;

    fn seeded(config: EffectConfig) -> Effect {
        SpeedLinesEffect::new(config, ManualScheduler::new(), 42)
    }

    fn animated(style: AnimationStyle) -> EffectConfig {
        EffectConfig {
            animated: true,
            animation_style: style,
            line_count: 16,
            ..EffectConfig::default()
        }
    }

    /// Step one frame through the manual scheduler.
    fn step(effect: &mut Effect, now_ms: f64) -> bool {
        let handle = effect.scheduler_mut().take_pending().expect("frame pending");
        effect.on_frame(handle, now_ms)
    }

    /// Shared log so assertions survive the effect being dropped.
    #[derive(Clone, Default)]
    struct SharedScheduler(Rc<RefCell<ManualScheduler>>);

    impl FrameScheduler for SharedScheduler {
        fn request_frame(&mut self, handle: FrameHandle) {
            self.0.borrow_mut().request_frame(handle);
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.0.borrow_mut().cancel_frame(handle);
        }
    }

    struct FlagObserver(Rc<Cell<bool>>);

    impl SizeObserver for FlagObserver {
        fn disconnect(&mut self) {
            self.0.set(true);
        }
    }

    #[test]
    fn static_mount_waits_for_size() {
        let effect = seeded(EffectConfig::default());
        assert!(!effect.is_animating());
        assert!(effect.surface().is_none());
        assert_eq!(effect.paint_passes(), 0);
        assert_eq!(effect.scheduler().requested(), 0);
    }

    #[test]
    fn first_nonzero_size_reallocates_and_paints_once() {
        let mut effect = seeded(EffectConfig::default());
        assert!(!effect.resize(0.0, 0.0, 1.0));
        assert_eq!(effect.paint_passes(), 0);

        assert!(effect.resize(400.0, 300.0, 1.0));
        assert_eq!(effect.shell().reallocations(), 1);
        assert_eq!(effect.paint_passes(), 1);
        let surface = effect.surface().unwrap();
        assert_eq!((surface.width(), surface.height()), (400, 300));
        assert!(surface.data().iter().any(|&b| b != 0));

        assert!(!effect.resize(400.0, 300.0, 1.0));
        assert_eq!(effect.paint_passes(), 1);
    }

    #[test]
    fn high_density_backing() {
        let mut effect = seeded(EffectConfig::default());
        effect.resize(100.0, 50.0, 2.0);
        let surface = effect.surface().unwrap();
        assert_eq!((surface.width(), surface.height()), (200, 100));
        assert_eq!(surface.scale(), 2.0);
    }

    #[test]
    fn shrinking_to_zero_drops_surface() {
        let mut effect = seeded(EffectConfig::default());
        effect.resize(100.0, 100.0, 1.0);
        assert!(effect.resize(0.0, 0.0, 1.0));
        assert!(effect.surface().is_none());
        assert_eq!(effect.paint_passes(), 1);
    }

    #[test]
    fn static_repaints_on_visual_change_only() {
        let mut effect = seeded(EffectConfig::default());
        effect.resize(120.0, 80.0, 1.0);
        let base = effect.config().clone();

        effect.set_config(EffectConfig {
            color: "red".into(),
            ..base.clone()
        });
        assert_eq!(effect.paint_passes(), 2);

        effect.set_config(EffectConfig {
            color: "red".into(),
            center: PercentPoint::new(30.0, 70.0),
            ..base.clone()
        });
        assert_eq!(effect.paint_passes(), 3);

        let current = effect.config().clone();
        effect.set_config(EffectConfig {
            animation_speed: 4.0,
            ..current
        });
        assert_eq!(effect.paint_passes(), 3);
        assert_eq!(effect.scheduler().requested(), 0);
    }

    #[test]
    fn generation_fields_regenerate_in_place() {
        let mut effect = seeded(EffectConfig::default());
        effect.resize(120.0, 80.0, 1.0);
        let before = effect.mode().active_lines().clone();

        effect.set_config(EffectConfig {
            line_count: 9,
            ..EffectConfig::default()
        });
        assert_eq!(effect.mode().name(), "static");
        assert_eq!(effect.mode().active_lines().len(), 9);
        assert_ne!(effect.mode().active_lines(), &before);
        assert_eq!(effect.paint_passes(), 2);
    }

    #[test]
    fn color_change_keeps_lines() {
        let mut effect = seeded(EffectConfig::default());
        let before = effect.mode().active_lines().clone();
        effect.set_config(EffectConfig {
            color: "#ff0000".into(),
            inner_radius: 20.0,
            ..EffectConfig::default()
        });
        assert_eq!(effect.mode().active_lines(), &before);
    }

    #[test]
    fn pulse_mode_repaints_every_frame() {
        let mut effect = seeded(animated(AnimationStyle::Pulse));
        assert!(effect.is_animating());
        effect.resize(64.0, 64.0, 1.0);
        let after_resize = effect.paint_passes();

        assert!(step(&mut effect, 0.0));
        let first = effect.surface().unwrap().clone();
        assert!(step(&mut effect, 400.0));
        assert!(step(&mut effect, 800.0));
        assert_eq!(effect.paint_passes(), after_resize + 3);
        match effect.mode() {
            AnimationMode::Pulse { time_secs, .. } => assert!((time_secs - 0.8).abs() < 1e-9),
            other => panic!("expected pulse, got {}", other.name()),
        }
        assert_ne!(effect.surface().unwrap(), &first);
    }

    #[test]
    fn frame_swap_advances_with_frames() {
        let mut effect = seeded(animated(AnimationStyle::FrameSwap));
        effect.resize(64.0, 64.0, 1.0);
        step(&mut effect, 1000.0);
        for i in 1..=161 {
            step(&mut effect, 1000.0 + i as f64);
        }
        match effect.mode() {
            AnimationMode::FrameSwap(swap) => {
                assert_eq!(swap.sets().len(), FRAME_SWAP_SETS);
                assert_eq!(swap.cursor(), 2);
            }
            other => panic!("expected frame swap, got {}", other.name()),
        }
    }

    #[test]
    fn stopping_animation_cancels_and_paints_once() {
        let mut effect = seeded(animated(AnimationStyle::FrameSwap));
        effect.resize(64.0, 64.0, 1.0);
        step(&mut effect, 0.0);
        step(&mut effect, 100.0);
        let stale = effect.pending_frame().unwrap();
        let passes = effect.paint_passes();

        let config = EffectConfig {
            animated: false,
            ..effect.config().clone()
        };
        effect.set_config(config);

        assert!(!effect.is_animating());
        assert_eq!(effect.scheduler().cancelled(), 1);
        assert_eq!(effect.scheduler().pending(), None);
        assert_eq!(effect.paint_passes(), passes + 1);
        assert_eq!(effect.mode().name(), "static");
        assert_eq!(effect.mode().active_lines().len(), 16);

        // A frame that slipped through after cancellation does nothing.
        assert!(!effect.on_frame(stale, 200.0));
        assert_eq!(effect.paint_passes(), passes + 1);
    }

    #[test]
    fn starting_animation_builds_three_sets() {
        let mut effect = seeded(EffectConfig {
            line_count: 16,
            ..EffectConfig::default()
        });
        effect.set_config(animated(AnimationStyle::FrameSwap));
        assert!(effect.is_animating());
        assert_eq!(effect.scheduler().requested(), 1);
        match effect.mode() {
            AnimationMode::FrameSwap(swap) => {
                assert_eq!(swap.cursor(), 0);
                assert_eq!(swap.sets().len(), 3);
            }
            other => panic!("expected frame swap, got {}", other.name()),
        }
    }

    #[test]
    fn regeneration_preserves_animated_mode() {
        let mut effect = seeded(animated(AnimationStyle::FrameSwap));
        effect.set_config(EffectConfig {
            line_count: 4,
            ..animated(AnimationStyle::FrameSwap)
        });
        assert!(effect.is_animating());
        assert_eq!(effect.scheduler().requested(), 1);
        match effect.mode() {
            AnimationMode::FrameSwap(swap) => {
                assert!(swap.sets().iter().all(|s| s.len() == 4))
            }
            other => panic!("expected frame swap, got {}", other.name()),
        }
    }

    #[test]
    fn switching_style_while_animated() {
        let mut effect = seeded(animated(AnimationStyle::Pulse));
        effect.set_config(animated(AnimationStyle::FrameSwap));
        assert_eq!(effect.mode().name(), "frame-swap");
        assert_eq!(effect.scheduler().requested(), 1);
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let config = EffectConfig {
            seed: Some(99),
            ..EffectConfig::default()
        };
        let a: Effect = SpeedLinesEffect::new(config.clone(), ManualScheduler::new(), 1);
        let b: Effect = SpeedLinesEffect::new(config, ManualScheduler::new(), 2);
        assert_eq!(a.mode(), b.mode());
    }

    #[test]
    fn invalid_color_falls_back() {
        let mut effect = seeded(EffectConfig {
            color: "not-a-color".into(),
            ..EffectConfig::default()
        });
        effect.resize(10.0, 10.0, 1.0);
        assert_eq!(effect.paint_passes(), 1);
    }

    #[test]
    fn teardown_cancels_everything() {
        let disconnected = Rc::new(Cell::new(false));
        let mut effect = seeded(animated(AnimationStyle::Pulse));
        effect.attach_observer(Box::new(FlagObserver(disconnected.clone())));
        effect.resize(32.0, 32.0, 1.0);
        let pending = effect.pending_frame().unwrap();

        effect.teardown();
        assert!(disconnected.get());
        assert!(!effect.is_animating());
        assert_eq!(effect.scheduler().cancelled(), 1);
        assert!(effect.surface().is_none());

        let passes = effect.paint_passes();
        assert!(!effect.on_frame(pending, 16.0));
        assert!(!effect.resize(64.0, 64.0, 1.0));
        effect.set_config(EffectConfig::default());
        assert_eq!(effect.paint_passes(), passes);
    }

    #[test]
    fn drop_tears_down() {
        let scheduler = SharedScheduler::default();
        let log = scheduler.0.clone();
        let disconnected = Rc::new(Cell::new(false));
        {
            let mut effect: SpeedLinesEffect<SharedScheduler> =
                SpeedLinesEffect::new(animated(AnimationStyle::Pulse), scheduler, 5);
            effect.attach_observer(Box::new(FlagObserver(disconnected.clone())));
        }
        assert!(disconnected.get());
        assert_eq!(log.borrow().cancelled(), 1);
        assert_eq!(log.borrow().pending(), None);
    }

    #[test]
    fn instances_are_independent() {
        let mut a = seeded(animated(AnimationStyle::Pulse));
        let mut b = seeded(animated(AnimationStyle::Pulse));
        a.resize(32.0, 32.0, 1.0);
        b.resize(32.0, 32.0, 1.0);
        step(&mut a, 0.0);
        step(&mut a, 500.0);
        b.teardown();
        assert!(a.is_animating());
        assert!(step(&mut a, 1000.0));
    }
}
