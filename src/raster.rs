// Raster surfaces. The renderer paints through `Surface`; `PixelBuffer` is the
// deterministic RGBA8 target handed to the host for `putImageData`.

use crate::color::Rgba;
use crate::types::PixelPoint;

/// A 2D paint target addressed in logical pixels.
pub trait Surface {
    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Fill a triangle with `color`, its alpha further scaled by `opacity`.
    /// Opacity applies to this fill only.
    fn fill_triangle(&mut self, points: [PixelPoint; 3], color: Rgba, opacity: f64);
}

/// RGBA8 pixel buffer with straight alpha and a logical-to-backing scale.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    scale: f64,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a transparent buffer of `width` x `height` backing pixels.
    /// `scale` maps logical coordinates to backing pixels (the device pixel ratio).
    pub fn new(width: u32, height: u32, scale: f64) -> Self {
        PixelBuffer {
            width,
            height,
            scale,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgba, alpha: f64) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let dst_a = self.data[i + 3] as f64 / 255.0;
        let out_a = alpha + dst_a * (1.0 - alpha);
        if out_a <= 0.0 {
            return;
        }
        let src = [color.r, color.g, color.b];
        for (c, &s) in src.iter().enumerate() {
            let d = self.data[i + c] as f64;
            let v = (s as f64 * alpha + d * dst_a * (1.0 - alpha)) / out_a;
            self.data[i + c] = v.round().clamp(0.0, 255.0) as u8;
        }
        self.data[i + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

impl Surface for PixelBuffer {
    fn clear(&mut self) {
        self.data.fill(0);
    }

    fn fill_triangle(&mut self, points: [PixelPoint; 3], color: Rgba, opacity: f64) {
        let alpha = (color.a * opacity).clamp(0.0, 1.0);
        if alpha <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }

        let [a, b, c] = points.map(|p| (p.x * self.scale, p.y * self.scale));
        let area = edge(a, b, c);
        if area == 0.0 || !area.is_finite() {
            return;
        }

        let min_x = a.0.min(b.0).min(c.0).floor().max(0.0);
        let min_y = a.1.min(b.1).min(c.1).floor().max(0.0);
        let max_x = a.0.max(b.0).max(c.0).ceil().min(self.width as f64);
        let max_y = a.1.max(b.1).max(c.1).ceil().min(self.height as f64);
        if min_x >= max_x || min_y >= max_y {
            return;
        }

        // Sample pixel centres; winding-agnostic via the sign of the area.
        for y in min_y as u32..max_y as u32 {
            let py = y as f64 + 0.5;
            for x in min_x as u32..max_x as u32 {
                let p = (x as f64 + 0.5, py);
                let w0 = edge(b, c, p) * area.signum();
                let w1 = edge(c, a, p) * area.signum();
                let w2 = edge(a, b, p) * area.signum();
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    self.blend(x, y, color, alpha);
                }
            }
        }
    }
}

fn edge(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}
