// Frame renderer: ray casting against the viewport, inner-radius clipping, pulse opacity,
// and the tapered quad each line is painted as.
//
// A line's `length` is a fraction of *its own ray's* edge distance, not of the max radius.
// Configuration documents lengths as "percent of radius"; rendering keeps the edge-relative
// behaviour.

use crate::color::Rgba;
use crate::generator::Line;
use crate::raster::Surface;
use crate::types::PixelPoint;

/// Outward buffer past the viewport edge so lines never show a seam at the boundary.
pub const EDGE_BUFFER: f64 = 2.0;

const PARALLEL_EPSILON: f64 = 0.0001;

/// Elapsed time and speed for the sinusoidal pulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseClock {
    /// Accumulated animation time in seconds.
    pub time_secs: f64,
    pub animation_speed: f64,
}

/// Everything a paint call needs besides the line itself. Resolved once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub center: PixelPoint,
    pub max_radius: f64,
    /// Percentage 0-100 of `max_radius`.
    pub inner_radius_pct: f64,
    pub color: Rgba,
    pub width: f64,
    pub height: f64,
    pub pulse: Option<PulseClock>,
}

impl FrameParams {
    /// Resolve a percent center against the viewport and derive the max radius.
    pub fn resolve(
        center: PixelPoint,
        inner_radius_pct: f64,
        color: Rgba,
        width: f64,
        height: f64,
        pulse: Option<PulseClock>,
    ) -> Self {
        FrameParams {
            center,
            max_radius: max_radius(center, width, height),
            inner_radius_pct,
            color,
            width,
            height,
            pulse,
        }
    }
}

/// Screen-space quad for one line: a base across the outer end tapering to a tip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineQuad {
    pub start_dist: f64,
    pub end_dist: f64,
    pub base: [PixelPoint; 2],
    pub tip: PixelPoint,
}

/// Distance from `center` to the farthest viewport corner.
pub fn max_radius(center: PixelPoint, width: f64, height: f64) -> f64 {
    let dx = center.x.max(width - center.x);
    let dy = center.y.max(height - center.y);
    dx.hypot(dy)
}

/// Smallest non-negative distance along `angle` from `center` to an edge of
/// [0, width] x [0, height]. Returns 0 when no edge is hit.
pub fn distance_to_edge(center: PixelPoint, angle: f64, width: f64, height: f64) -> f64 {
    let dx = angle.cos();
    let dy = angle.sin();
    let mut t_min = f64::INFINITY;

    if dx.abs() > PARALLEL_EPSILON {
        let edge = if dx > 0.0 { width } else { 0.0 };
        let t = (edge - center.x) / dx;
        if t >= 0.0 {
            t_min = t_min.min(t);
        }
    }

    if dy.abs() > PARALLEL_EPSILON {
        let edge = if dy > 0.0 { height } else { 0.0 };
        let t = (edge - center.y) / dy;
        if t >= 0.0 {
            t_min = t_min.min(t);
        }
    }

    if t_min.is_finite() {
        t_min
    } else {
        0.0
    }
}

/// Multiplier in [0.5, 1.0] for the pulse at `clock`.
pub fn pulse_multiplier(offset: f64, speed: f64, clock: &PulseClock) -> f64 {
    let phase = clock.time_secs * speed * clock.animation_speed + offset;
    0.5 + 0.25 * (1.0 + phase.sin())
}

/// Paint-time opacity. The stored line is never touched.
pub fn resolve_opacity(line: &Line, pulse: Option<&PulseClock>) -> f64 {
    match (pulse, line.pulse) {
        (Some(clock), Some(p)) => line.opacity * pulse_multiplier(p.offset, p.speed, clock),
        _ => line.opacity,
    }
}

/// Compute the quad for `line`, or `None` when clipping leaves nothing to draw.
pub fn line_quad(line: &Line, params: &FrameParams) -> Option<LineQuad> {
    let edge_dist = distance_to_edge(params.center, line.angle, params.width, params.height);
    let start_dist = edge_dist + EDGE_BUFFER;
    let inner_radius = params.max_radius * params.inner_radius_pct / 100.0;
    let end_dist = (start_dist - start_dist * line.length).max(inner_radius);

    if end_dist >= start_dist {
        return None;
    }

    let (sin, cos) = line.angle.sin_cos();
    let start = params.center.offset(cos, sin, start_dist);
    let tip = params.center.offset(cos, sin, end_dist);
    // Unit perpendicular (-sin, cos).
    let half = line.width / 2.0;
    let base = [
        PixelPoint::new(start.x - sin * half, start.y + cos * half),
        PixelPoint::new(start.x + sin * half, start.y - cos * half),
    ];

    Some(LineQuad {
        start_dist,
        end_dist,
        base,
        tip,
    })
}

/// Paint one line. Returns whether anything was drawn.
pub fn paint_line<S: Surface + ?Sized>(surface: &mut S, line: &Line, params: &FrameParams) -> bool {
    let Some(quad) = line_quad(line, params) else {
        return false;
    };
    let opacity = resolve_opacity(line, params.pulse.as_ref());
    surface.fill_triangle([quad.base[0], quad.base[1], quad.tip], params.color, opacity);
    true
}

/// Paint lines in order. Returns the number actually drawn.
pub fn paint_lines<S: Surface + ?Sized>(surface: &mut S, lines: &[Line], params: &FrameParams) -> usize {
    lines
        .iter()
        .filter(|line| paint_line(surface, line, params))
        .count()
}
