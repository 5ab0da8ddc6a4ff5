// Named easing curves shared with the transition components.
// Unknown names fall back to ease-in-out.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
}

impl Easing {
    pub const ALL: [Easing; 4] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
    ];

    /// Look up a preset by name.
    pub fn from_name(name: &str) -> Easing {
        match name {
            "linear" => Easing::Linear,
            "easeIn" => Easing::EaseIn,
            "easeOut" => Easing::EaseOut,
            "easeInOut" => Easing::EaseInOut,
            other => {
                log::debug!("unknown easing {:?}, using easeInOut", other);
                Easing::EaseInOut
            }
        }
    }

    /// Map progress `t` in [0, 1] through the curve. Input is clamped.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }

    /// Equivalent CSS `transition-timing-function` keyword.
    pub fn css_keyword(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_bounds() {
        for easing in Easing::ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{:?} start", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12, "{:?} end", easing);
        }
    }

    #[test]
    fn monotonic() {
        for easing in Easing::ALL {
            let mut prev = 0.0;
            for i in 1..=100 {
                let v = easing.apply(i as f64 / 100.0);
                assert!(v >= prev, "{:?} at step {}", easing, i);
                prev = v;
            }
        }
    }

    #[test]
    fn ease_in_out_is_symmetric_at_half() {
        assert!((Easing::EaseInOut.apply(0.5) - 0.5).abs() < 1e-12);
        assert!((Easing::EaseIn.apply(0.5) - 0.25).abs() < 1e-12);
        assert!((Easing::EaseOut.apply(0.5) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn unknown_name_falls_back() {
        assert_eq!(Easing::from_name("easeOut"), Easing::EaseOut);
        assert_eq!(Easing::from_name("bouncy"), Easing::EaseInOut);
    }

    #[test]
    fn css_keywords() {
        assert_eq!(Easing::from_name("easeIn").css_keyword(), "ease-in");
        assert_eq!(Easing::default().css_keyword(), "ease-in-out");
    }

    #[test]
    fn clamps_progress() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
    }
}
