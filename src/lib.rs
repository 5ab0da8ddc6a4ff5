// speedlines_core: Rust/WASM engine for manga-style speed lines.
// Generation, geometry, rasterization and animation state live here; JS only wires
// requestAnimationFrame, ResizeObserver and putImageData.

mod animation;
mod color;
mod easing;
mod effect;
mod error;
mod frame_loop;
mod generator;
mod host;
mod raster;
mod renderer;
mod types;
mod viewport;

use js_sys::Function;
use wasm_bindgen::prelude::*;

pub use animation::{swap_interval_ms, AnimationDriver, AnimationMode, FrameSwap};
pub use color::Rgba;
pub use easing::Easing;
pub use effect::SpeedLinesEffect;
pub use error::EffectError;
pub use frame_loop::{FrameHandle, FrameLoop, FrameScheduler, ManualScheduler};
pub use generator::{generate, Line, LineSet, Pulse};
pub use host::{JsFrameScheduler, JsSizeObserver};
pub use raster::{PixelBuffer, Surface};
pub use renderer::{
    distance_to_edge, line_quad, max_radius, paint_line, paint_lines, pulse_multiplier,
    resolve_opacity, FrameParams, LineQuad, PulseClock,
};
pub use types::*;
pub use viewport::{BackingSize, LogicalSize, ResizeOutcome, SizeObserver, ViewportShell, ViewportState};

/// Initialize panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(feature = "console_log")]
    console_log::init_with_level(log::Level::Info).ok();
}

/// Speed lines effect exposed to JavaScript.
///
/// The host forwards container sizes and animation frames; the effect renders into an
/// RGBA buffer readable through `pixels()`.
#[wasm_bindgen]
pub struct SpeedLines {
    inner: SpeedLinesEffect<JsFrameScheduler>,
}

#[wasm_bindgen]
impl SpeedLines {
    /// Mount from JSON configuration. `request_frame(id)` and `cancel_frame(id)` wrap
    /// requestAnimationFrame; fired frames come back through `frame(id, timestamp)`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: &str,
        request_frame: Function,
        cancel_frame: Function,
    ) -> Result<SpeedLines, JsValue> {
        let config = EffectConfig::from_json(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        Ok(SpeedLines::mount(config, request_frame, cancel_frame))
    }

    /// Mount a named preset ("classic" or "chaotic").
    pub fn with_preset(
        name: &str,
        request_frame: Function,
        cancel_frame: Function,
    ) -> Result<SpeedLines, JsValue> {
        let config = EffectConfig::preset(name).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(SpeedLines::mount(config, request_frame, cancel_frame))
    }

    /// Replace the configuration. Missing fields take their defaults.
    pub fn set_config(&mut self, config_json: &str) -> Result<(), JsValue> {
        let config = EffectConfig::from_json(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        self.inner.set_config(config);
        Ok(())
    }

    /// Current configuration as JSON.
    pub fn config_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.config())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Report the container size. Returns `true` when the backing store was reallocated
    /// and repainted; the host should then resize its canvas to `width()` x `height()`.
    pub fn resize(&mut self, client_width: f64, client_height: f64, device_pixel_ratio: f64) -> bool {
        self.inner.resize(client_width, client_height, device_pixel_ratio)
    }

    /// Deliver a fired animation frame. Returns `true` when pixels changed.
    pub fn frame(&mut self, handle: u32, timestamp_ms: f64) -> bool {
        self.inner.on_frame(FrameHandle::new(handle), timestamp_ms)
    }

    /// Register the ResizeObserver's disconnect; called on `dispose()`.
    pub fn attach_observer(&mut self, disconnect: Function) {
        self.inner.attach_observer(Box::new(JsSizeObserver::new(disconnect)));
    }

    /// Backing store width in device pixels.
    pub fn width(&self) -> u32 {
        self.inner.viewport().backing.width
    }

    /// Backing store height in device pixels.
    pub fn height(&self) -> u32 {
        self.inner.viewport().backing.height
    }

    /// RGBA8 pixels for `putImageData`. Empty until a nonzero size is observed.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner
            .surface()
            .map(|surface| surface.data().to_vec())
            .unwrap_or_default()
    }

    pub fn is_animating(&self) -> bool {
        self.inner.is_animating()
    }

    /// Stop the frame loop and disconnect the observer.
    pub fn dispose(&mut self) {
        self.inner.teardown();
    }
}

impl SpeedLines {
    fn mount(config: EffectConfig, request_frame: Function, cancel_frame: Function) -> SpeedLines {
        let scheduler = JsFrameScheduler::new(request_frame, cancel_frame);
        SpeedLines {
            inner: SpeedLinesEffect::new(config, scheduler, host_entropy()),
        }
    }
}

/// Evaluate a named easing curve at `t`.
#[wasm_bindgen]
pub fn ease(name: &str, t: f64) -> f64 {
    Easing::from_name(name).apply(t)
}

/// CSS timing-function keyword for a named easing.
#[wasm_bindgen]
pub fn easing_css(name: &str) -> String {
    Easing::from_name(name).css_keyword().to_string()
}

fn host_entropy() -> u64 {
    let random = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let now = js_sys::Date::now() as u64;
    (random << 32) ^ now
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_exports() {
        assert_eq!(ease("linear", 0.25), 0.25);
        assert_eq!(easing_css("easeOut"), "ease-out");
        assert_eq!(easing_css("mystery"), "ease-in-out");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    fn noop() -> Function {
        Function::new_with_args("id", "")
    }

    #[wasm_bindgen_test]
    fn mounts_and_paints() {
        let mut lines = SpeedLines::new(r#"{"line_count": 20}"#, noop(), noop()).unwrap();
        assert!(lines.pixels().is_empty());
        assert!(lines.resize(40.0, 30.0, 1.0));
        assert_eq!((lines.width(), lines.height()), (40, 30));
        assert_eq!(lines.pixels().len(), 40 * 30 * 4);
        lines.dispose();
    }

    #[wasm_bindgen_test]
    fn rejects_bad_json() {
        assert!(SpeedLines::new("{", noop(), noop()).is_err());
        assert!(SpeedLines::with_preset("nope", noop(), noop()).is_err());
    }

    #[wasm_bindgen_test]
    fn animated_preset_requests_frames() {
        let lines = SpeedLines::with_preset("chaotic", noop(), noop()).unwrap();
        assert!(lines.is_animating());
    }
}
