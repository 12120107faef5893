/// Draw surfaces and an in-memory software rasterizer
use nalgebra::Point2;

use crate::color::Color;
use crate::error::RenderError;

/// A 2D target the viewport paints onto.
pub trait Surface {
    /// Re-read the display size and return it in pixels.
    fn resize(&mut self) -> Result<(u32, u32), RenderError>;

    /// Fill the whole surface with a solid colour.
    fn clear(&mut self, color: Color);

    /// Fill and stroke (1 unit wide) a triangle.
    fn fill_triangle(&mut self, points: &[Point2<f64>; 3], color: Color, alpha: f64);

    /// Push the finished frame to the display.
    fn present(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// RGB framebuffer with alpha-blended triangle fill.
///
/// There is no depth buffer: later triangles paint over earlier ones.
#[derive(Debug, Clone)]
pub struct BufferSurface {
    width: usize,
    height: usize,
    pixels: Vec<[u8; 3]>,
}

impl BufferSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 3]; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Change the buffer size; contents are reset to black.
    pub fn set_size(&mut self, width: usize, height: usize) {
        if (width, height) != (self.width, self.height) {
            *self = Self::new(width, height);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(Color::from_rgb8(self.pixels[y * self.width + x]))
        } else {
            None
        }
    }

    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.pixels
    }

    /// One row of pixels, top to bottom.
    pub fn row(&self, y: usize) -> &[[u8; 3]] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    fn blend(&mut self, x: i64, y: i64, color: Color, alpha: f64) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        let dst = Color::from_rgb8(self.pixels[idx]);
        let a = alpha.clamp(0.0, 1.0);
        let out = Color::new(
            dst.r * (1.0 - a) + color.r * a,
            dst.g * (1.0 - a) + color.g * a,
            dst.b * (1.0 - a) + color.b * a,
        );
        self.pixels[idx] = out.to_rgb8();
    }

    fn rasterize(&mut self, points: &[Point2<f64>; 3], color: Color, alpha: f64) {
        let [v0, v1, v2] = *points;

        // Bounding box, clipped to the buffer
        let min_x = v0.x.min(v1.x).min(v2.x).floor().max(0.0) as i64;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil().min(self.width as f64 - 1.0) as i64;
        let min_y = v0.y.min(v1.y).min(v2.y).floor().max(0.0) as i64;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil().min(self.height as f64 - 1.0) as i64;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Point2::new(x as f64 + 0.5, y as f64 + 0.5);
                if let Some((w0, w1, w2)) = barycentric(&v0, &v1, &v2, &p) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        self.blend(x, y, color, alpha);
                    }
                }
            }
        }
    }

    fn stroke(&mut self, from: &Point2<f64>, to: &Point2<f64>, color: Color, alpha: f64) {
        let steps = (to.x - from.x).abs().max((to.y - from.y).abs()).ceil().min(1e5) as i64;
        if steps == 0 {
            self.blend(from.x.floor() as i64, from.y.floor() as i64, color, alpha);
            return;
        }
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = from.x + (to.x - from.x) * t;
            let y = from.y + (to.y - from.y) * t;
            self.blend(x.floor() as i64, y.floor() as i64, color, alpha);
        }
    }
}

impl Surface for BufferSurface {
    fn resize(&mut self) -> Result<(u32, u32), RenderError> {
        Ok((self.width as u32, self.height as u32))
    }

    fn clear(&mut self, color: Color) {
        self.pixels.fill(color.to_rgb8());
    }

    fn fill_triangle(&mut self, points: &[Point2<f64>; 3], color: Color, alpha: f64) {
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return;
        }
        self.rasterize(points, color, alpha);
        for i in 0..3 {
            self.stroke(&points[i], &points[(i + 1) % 3], color, alpha);
        }
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: &Point2<f64>,
    v1: &Point2<f64>,
    v2: &Point2<f64>,
    p: &Point2<f64>,
) -> Option<(f64, f64, f64)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);

    if denom.abs() < 1e-12 {
        return None;
    }

    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> [Point2<f64>; 3] {
        [
            Point2::new(1.0, 1.0),
            Point2::new(9.0, 1.0),
            Point2::new(1.0, 9.0),
        ]
    }

    #[test]
    fn test_clear() {
        let mut surface = BufferSurface::new(4, 3);
        surface.clear(Color::new(1.0, 2.0, 3.0));
        assert!(surface.pixels().iter().all(|p| *p == [1, 2, 3]));
        assert_eq!(surface.resize().unwrap(), (4, 3));
    }

    #[test]
    fn test_fill_inside_only() {
        let mut surface = BufferSurface::new(10, 10);
        surface.clear(Color::BLACK);
        surface.fill_triangle(&triangle(), Color::WHITE, 1.0);

        assert_eq!(surface.pixel(2, 2), Some(Color::WHITE));
        assert_eq!(surface.pixel(8, 8), Some(Color::BLACK));
        assert_eq!(surface.pixel(0, 9), Some(Color::BLACK));
        assert_eq!(surface.pixel(10, 0), None);
    }

    #[test]
    fn test_winding_does_not_matter() {
        let [a, b, c] = triangle();
        let mut surface = BufferSurface::new(10, 10);
        surface.fill_triangle(&[a, c, b], Color::WHITE, 1.0);
        assert_eq!(surface.pixel(2, 2), Some(Color::WHITE));
    }

    #[test]
    fn test_alpha_blends_over_existing() {
        let mut surface = BufferSurface::new(10, 10);
        surface.clear(Color::new(0.0, 0.0, 200.0));
        surface.fill_triangle(&triangle(), Color::new(200.0, 0.0, 0.0), 0.5);
        assert_eq!(surface.pixel(3, 3), Some(Color::new(100.0, 0.0, 100.0)));
    }

    #[test]
    fn test_later_triangles_paint_over() {
        let mut surface = BufferSurface::new(10, 10);
        surface.fill_triangle(&triangle(), Color::new(255.0, 0.0, 0.0), 1.0);
        surface.fill_triangle(&triangle(), Color::new(0.0, 255.0, 0.0), 1.0);
        assert_eq!(surface.pixel(3, 3), Some(Color::new(0.0, 255.0, 0.0)));
    }

    #[test]
    fn test_off_screen_and_degenerate_triangles() {
        let mut surface = BufferSurface::new(10, 10);
        surface.fill_triangle(
            &[Point2::new(-50.0, -50.0), Point2::new(-40.0, -50.0), Point2::new(-50.0, -40.0)],
            Color::WHITE,
            1.0,
        );
        surface.fill_triangle(
            &[Point2::new(f64::NAN, 0.0), Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)],
            Color::WHITE,
            1.0,
        );
        assert!(surface.pixels().iter().all(|p| *p == [0, 0, 0]));
    }

    #[test]
    fn test_set_size_resets() {
        let mut surface = BufferSurface::new(2, 2);
        surface.clear(Color::WHITE);
        surface.set_size(3, 1);
        assert_eq!(surface.row(0).len(), 3);
        assert_eq!(surface.pixel(2, 0), Some(Color::BLACK));
    }
}
