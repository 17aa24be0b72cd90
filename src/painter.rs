//! Drawing session over an [`ImageView`]
//!
//! A [`Painter`] borrows its view mutably for the whole session, so no sampler
//! or second painter can observe a half-drawn frame. Every primitive marks the
//! view dirty; ending the session (`finish` or drop) recomputes derived data
//! once.
//!
//! Coordinates come in two flavours. `usize` entry points are unchecked and
//! panic (slice indexing) when they leave the buffer. `i64` entry points clip.

use crate::color::{Color, Sample};
use crate::error::{Error, Result};
use crate::geometry::{bresenham, Polygon};
use crate::noise::{grid_size, NoiseGenerator, FRACTAL_FREQUENCIES};
use crate::texture::Texture;
use crate::view::ImageView;

/// Exclusive write handle for one drawing session
#[derive(Debug)]
pub struct Painter<'a, T: Sample = u8> {
    view: &'a mut ImageView<T>,
    finished: bool,
}

impl<T: Sample> ImageView<T> {
    /// Begin a drawing session
    pub fn painter(&mut self) -> Painter<'_, T> {
        Painter::new(self)
    }
}

impl<'a, T: Sample> Painter<'a, T> {
    pub fn new(view: &'a mut ImageView<T>) -> Self {
        log::trace!("painter session started");
        Self {
            view,
            finished: false,
        }
    }

    /// End the session, recomputing derived data if anything was drawn
    pub fn finish(mut self) {
        self.end();
    }

    fn end(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.view.refresh();
        log::debug!("painter session ended at revision {}", self.view.revision());
    }

    /// Read access to the texture being drawn
    pub fn texture(&self) -> &Texture<T> {
        self.view.texture()
    }

    #[inline]
    fn target(&mut self) -> &mut Texture<T> {
        self.view.texture_mut()
    }

    pub fn width(&self) -> usize {
        self.view.texture().width()
    }

    pub fn height(&self) -> usize {
        self.view.texture().height()
    }

    pub fn channels(&self) -> usize {
        self.view.texture().channels()
    }

    // ------------------------------------------------------------------------
    // Buffer management
    // ------------------------------------------------------------------------

    /// Zero every sample
    pub fn clear_image(&mut self) {
        self.target().set_zero();
    }

    /// Reallocate the texture. Contents are zeroed.
    pub fn set_size(&mut self, width: usize, height: usize, channels: usize) -> Result<()> {
        self.target().set_size(width, height, channels)
    }

    // ------------------------------------------------------------------------
    // Pixels
    // ------------------------------------------------------------------------

    /// Write `color` at `(x, y)`. Unchecked.
    ///
    /// `Rgb` overwrites the color channels; `Rgba` composites over the
    /// channels already there. Only the pixel's own channels are touched.
    #[inline]
    pub fn draw_pixel<C: Color<T>>(&mut self, x: usize, y: usize, color: C) {
        let tex = self.target();
        debug_assert!(x < tex.width() && y < tex.height(), "draw_pixel out of range: ({}, {})", x, y);
        let index = tex.index(x, y);
        let channels = tex.channels();
        color.paint(&mut tex.data_mut()[index..index + channels]);
    }

    /// Write `color` at a raw sample index (the pixel's first channel)
    #[inline]
    pub fn draw_pixel_at<C: Color<T>>(&mut self, index: usize, color: C) {
        let tex = self.target();
        let channels = tex.channels();
        color.paint(&mut tex.data_mut()[index..index + channels]);
    }

    /// Write `color` at `(x, y)` only if `0 <= x < width` and `0 <= y < height`
    #[inline]
    pub fn draw_pixel_safe<C: Color<T>>(&mut self, x: i64, y: i64, color: C) {
        if self.view.texture().in_bounds(x, y) {
            self.draw_pixel(x as usize, y as usize, color);
        }
    }

    /// Clipped horizontal run from `x1` to `x2` inclusive
    fn span<C: Color<T>>(&mut self, x1: i64, x2: i64, y: i64, color: C) {
        let (w, h) = (self.width() as i64, self.height() as i64);
        if y < 0 || y >= h {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let x1 = x1.max(0);
        let x2 = x2.min(w - 1);
        if x1 > x2 {
            return;
        }

        let tex = self.target();
        let channels = tex.channels();
        let start = tex.index(x1 as usize, y as usize);
        let end = tex.index(x2 as usize, y as usize) + channels;
        for px in tex.data_mut()[start..end].chunks_exact_mut(channels) {
            color.paint(px);
        }
    }

    /// Horizontal run of `width` pixels starting at `(x, y)`, clipped
    pub fn draw_scanline<C: Color<T>>(&mut self, x: i64, y: i64, width: usize, color: C) {
        if width == 0 {
            return;
        }
        self.span(x, x.saturating_add(width as i64 - 1), y, color);
    }

    // ------------------------------------------------------------------------
    // Lines and rectangles
    // ------------------------------------------------------------------------

    /// Bresenham line including both endpoints. Unchecked.
    pub fn draw_line<C: Color<T>>(&mut self, x1: usize, y1: usize, x2: usize, y2: usize, color: C) {
        bresenham(x1 as i64, y1 as i64, x2 as i64, y2 as i64, |x, y| {
            self.draw_pixel(x as usize, y as usize, color)
        });
    }

    /// Bresenham line including both endpoints; off-buffer points are skipped
    pub fn draw_line_safe<C: Color<T>>(&mut self, x1: i64, y1: i64, x2: i64, y2: i64, color: C) {
        bresenham(x1, y1, x2, y2, |x, y| self.draw_pixel_safe(x, y, color));
    }

    /// Filled `width x height` rectangle with top-left corner `(x, y)`. Unchecked.
    pub fn draw_rect<C: Color<T>>(&mut self, x: usize, y: usize, width: usize, height: usize, color: C) {
        for dy in 0..height {
            for dx in 0..width {
                self.draw_pixel(x + dx, y + dy, color);
            }
        }
    }

    /// Rectangle outline; every pixel, corners included, is drawn once. Unchecked.
    pub fn draw_rect_empty<C: Color<T>>(&mut self, x: usize, y: usize, width: usize, height: usize, color: C) {
        if width == 0 || height == 0 {
            return;
        }
        let right = x + width - 1;
        let bottom = y + height - 1;

        for px in x..=right {
            self.draw_pixel(px, y, color);
        }
        if bottom != y {
            for px in x..=right {
                self.draw_pixel(px, bottom, color);
            }
        }
        for py in y + 1..bottom {
            self.draw_pixel(x, py, color);
            if right != x {
                self.draw_pixel(right, py, color);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Circles
    // ------------------------------------------------------------------------

    /// Filled circle from horizontal spans; each row is drawn once. Clipped.
    pub fn draw_circle<C: Color<T>>(&mut self, cx: i64, cy: i64, radius: i64, color: C) {
        if radius <= 0 {
            if radius == 0 {
                self.draw_pixel_safe(cx, cy, color);
            }
            return;
        }

        let mut x = radius;
        let mut y = 0;
        let mut err = 1 - radius;

        while x >= y {
            self.span(cx - x, cx + x, cy + y, color);
            if y != 0 {
                self.span(cx - x, cx + x, cy - y, color);
            }
            // Rows cy +- x are only finished once x is about to step
            if x != y && err >= 0 {
                self.span(cx - y, cx + y, cy + x, color);
                self.span(cx - y, cx + y, cy - x, color);
            }

            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    /// Circle outline: one octant by midpoint stepping, mirrored into the
    /// other seven. Clipped.
    pub fn draw_circle_empty<C: Color<T>>(&mut self, cx: i64, cy: i64, radius: i64, color: C) {
        if radius < 0 {
            return;
        }

        // err tracks x^2 + y^2 - r^2; dx and dy are the next x and y increments
        let mut x = radius;
        let mut y = 0;
        let mut dx = 1 - 2 * radius;
        let mut dy = 1;
        let mut err = 0;

        while x >= y {
            self.draw_pixel_safe(cx + x, cy + y, color);
            self.draw_pixel_safe(cx + y, cy + x, color);
            self.draw_pixel_safe(cx - y, cy + x, color);
            self.draw_pixel_safe(cx - x, cy + y, color);
            self.draw_pixel_safe(cx - x, cy - y, color);
            self.draw_pixel_safe(cx - y, cy - x, color);
            self.draw_pixel_safe(cx + y, cy - x, color);
            self.draw_pixel_safe(cx + x, cy - y, color);

            y += 1;
            err += dy;
            dy += 2;
            if 2 * err + dx > 0 {
                x -= 1;
                err += dx;
                dx += 2;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Polygons
    // ------------------------------------------------------------------------

    /// Even-odd scanline fill followed by an outline stroke. Clipped.
    pub fn draw_polygon<C: Color<T>>(&mut self, polygon: &Polygon, color: C) -> Result<()> {
        let Some(bounds) = polygon.bounds().filter(|_| polygon.is_closed()) else {
            log::warn!("polygon fill skipped: {} vertices", polygon.len());
            return Err(Error::DegeneratePolygon(polygon.len()));
        };

        let min_y = bounds.min_y.max(0);
        let max_y = bounds.max_y.min(self.height() as i64 - 1);

        // Reused per scanline
        let mut intersections = Vec::with_capacity(polygon.len());
        for y in min_y..=max_y {
            polygon.scanline_intersections(y, &mut intersections);
            for pair in intersections.chunks_exact(2) {
                self.span(pair[0], pair[1], y, color);
            }
        }

        // Crossings truncate toward zero; the stroke closes any gap on the edges
        for edge in polygon.edges() {
            self.draw_line_safe(edge.from.x, edge.from.y, edge.to.x, edge.to.y, color);
        }
        Ok(())
    }

    /// Outline only, including the edge from the last vertex back to the first
    pub fn draw_polygon_empty<C: Color<T>>(&mut self, polygon: &Polygon, color: C) -> Result<()> {
        if !polygon.is_closed() {
            log::warn!("polygon outline skipped: {} vertices", polygon.len());
            return Err(Error::DegeneratePolygon(polygon.len()));
        }
        for edge in polygon.edges() {
            self.draw_line_safe(edge.from.x, edge.from.y, edge.to.x, edge.to.y, color);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Noise
    // ------------------------------------------------------------------------

    /// Write one value per pixel into the color channels (at most three).
    /// Further channels, alpha included, are left untouched.
    fn fill_gray(&mut self, mut value: impl FnMut(usize, usize) -> T) {
        let tex = self.target();
        let (w, h, c) = (tex.width(), tex.height(), tex.channels());
        let color_channels = c.min(3);
        let data = tex.data_mut();
        for y in 0..h {
            for x in 0..w {
                let v = value(x, y);
                let base = (y * w + x) * c;
                data[base..base + color_channels].fill(v);
            }
        }
    }

    /// Independent uniform values in [0, 255], one per pixel
    pub fn generate_common_noise(&mut self, noise: &mut NoiseGenerator) {
        self.fill_gray(|_, _| T::from_u8(noise.next_value()));
        log::trace!("common noise filled {}x{}", self.width(), self.height());
    }

    /// Single-frequency Perlin noise as grayscale
    pub fn generate_perlin_noise(&mut self, noise: &NoiseGenerator, freq: usize) -> Result<()> {
        let grid = grid_size(self.width(), self.height(), freq)?;
        self.fill_gray(|x, y| T::from_unit(noise.perlin_at_grid(x, y, grid)));
        Ok(())
    }

    /// Sum of Perlin octaves from frequency 4 to 128 as grayscale. Needs an
    /// extent of at least 128 pixels.
    pub fn generate_fractal_perlin_noise(&mut self, noise: &NoiseGenerator) -> Result<()> {
        let mut grids = [0usize; FRACTAL_FREQUENCIES.len()];
        for (grid, &freq) in grids.iter_mut().zip(FRACTAL_FREQUENCIES.iter()) {
            *grid = grid_size(self.width(), self.height(), freq)?;
        }

        self.fill_gray(|x, y| {
            let sum: f32 = grids
                .iter()
                .zip(FRACTAL_FREQUENCIES.iter())
                .map(|(&grid, &freq)| noise.perlin_at_grid(x, y, grid) / freq as f32 * 2.0)
                .sum();
            T::from_unit(sum)
        });
        Ok(())
    }
}

impl<T: Sample> Drop for Painter<'_, T> {
    fn drop(&mut self) {
        self.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Rgb, Rgba};
    use crate::view::{UndersamplingFix, ViewConfig};

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };

    fn canvas(w: usize, h: usize, channels: usize) -> ImageView<u8> {
        ImageView::with_size(w, h, channels, ViewConfig::default()).unwrap()
    }

    fn lit(view: &ImageView<u8>) -> Vec<(usize, usize)> {
        let tex = view.texture();
        let mut out = Vec::new();
        for y in 0..tex.height() {
            for x in 0..tex.width() {
                if tex.texel(x, y) != Rgb::default() {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_square_fill_covers_all_lattice_points() {
        let mut view = canvas(16, 16, 3);
        let square = Polygon::from_coords(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        view.painter().draw_polygon(&square, RED).unwrap();

        let pts = lit(&view);
        assert_eq!(pts.len(), 121);
        assert!(pts.iter().all(|&(x, y)| x <= 10 && y <= 10));
    }

    #[test]
    fn test_pentagon_fill_is_closed() {
        let mut view = canvas(300, 220, 3);
        let pentagon = Polygon::from_coords(&[(80, 100), (150, 50), (280, 100), (200, 200), (100, 200)]);
        view.painter().draw_polygon(&pentagon, RED).unwrap();
        let tex = view.texture();
        for &(x, y) in &[(150, 120), (150, 50), (80, 100), (200, 199), (270, 105)] {
            assert_eq!(tex.texel(x, y), RED, "({}, {}) not filled", x, y);
        }
        assert_eq!(tex.texel(10, 10), Rgb::default());
        assert_eq!(tex.texel(290, 210), Rgb::default());
    }

    #[test]
    fn test_polygon_outline_closes_loop() {
        let mut view = canvas(10, 10, 3);
        let tri = Polygon::from_coords(&[(1, 1), (8, 1), (8, 8)]);
        view.painter().draw_polygon_empty(&tri, RED).unwrap();
        let tex = view.texture();
        // Closing edge (8,8) -> (1,1)
        for k in 1..=8 {
            assert_eq!(tex.texel(k, k), RED);
        }
        // Interior stays empty
        assert_eq!(tex.texel(6, 3), Rgb::default());
        assert_eq!(lit(&view).len(), 8 + 7 + 6);
    }

    #[test]
    fn test_degenerate_polygon_is_an_error() {
        let mut view = canvas(4, 4, 3);
        let line = Polygon::from_coords(&[(0, 0), (3, 3)]);
        let mut p = view.painter();
        assert!(matches!(p.draw_polygon(&line, RED), Err(Error::DegeneratePolygon(2))));
        assert!(matches!(
            p.draw_polygon_empty(&Polygon::new(Vec::new()), RED),
            Err(Error::DegeneratePolygon(0))
        ));
        p.finish();
        assert!(lit(&view).is_empty());
    }

    #[test]
    fn test_polygon_clips_to_buffer() {
        let mut view = canvas(8, 8, 3);
        let big = Polygon::from_coords(&[(-20, -20), (30, -20), (30, 30), (-20, 30)]);
        view.painter().draw_polygon(&big, RED).unwrap();
        assert_eq!(lit(&view).len(), 64);
    }

    #[test]
    fn test_draw_pixel_safe_stays_in_bounds() {
        let mut view = canvas(4, 3, 3);
        {
            let mut p = view.painter();
            p.draw_pixel_safe(-1, 0, RED);
            p.draw_pixel_safe(0, -1, RED);
            p.draw_pixel_safe(4, 0, RED);
            p.draw_pixel_safe(0, 3, RED);
            p.draw_pixel_safe(i64::MIN, i64::MAX, RED);
            p.draw_pixel_safe(i64::MAX, 1, RED);
        }
        assert!(lit(&view).is_empty());

        {
            let mut p = view.painter();
            for y in -50..50 {
                for x in -50..50 {
                    p.draw_pixel_safe(x, y, RED);
                }
            }
        }
        assert_eq!(lit(&view).len(), 12);
        assert_eq!(view.texture().length(), 36);
    }

    #[test]
    fn test_origin_is_writable() {
        let mut view = canvas(2, 2, 4);
        {
            let mut p = view.painter();
            p.draw_pixel_safe(0, 0, RED);
            p.draw_pixel_safe(0, 0, Rgba::new(0, 0, 255, 255));
        }
        assert_eq!(view.texture().get_rgba(0, 0), Rgba::new(0, 0, 255, 255));
    }

    #[test]
    fn test_rgba_pixel_composites() {
        let mut view = canvas(1, 1, 4);
        {
            let mut p = view.painter();
            p.draw_pixel(0, 0, Rgba::new(200, 100, 50, 255));
            p.draw_pixel(0, 0, Rgba::new(0, 0, 0, 0));
        }
        assert_eq!(view.texture().get_rgba(0, 0), Rgba::new(200, 100, 50, 255));
    }

    #[test]
    fn test_draw_pixel_at_index() {
        let mut view = canvas(3, 2, 3);
        let index = view.texture().index(1, 1);
        view.painter().draw_pixel_at(index, RED);
        assert_eq!(view.texture().get_rgb(1, 1), RED);
        assert_eq!(lit(&view).len(), 1);
    }

    #[test]
    fn test_line_endpoints_and_clipping() {
        let mut view = canvas(10, 10, 3);
        view.painter().draw_line(1, 2, 8, 6, RED);
        let tex = view.texture();
        assert_eq!(tex.texel(1, 2), RED);
        assert_eq!(tex.texel(8, 6), RED);
        assert_eq!(lit(&view).len(), 8);

        let mut view = canvas(10, 10, 3);
        view.painter().draw_line_safe(-5, 5, 20, 5, RED);
        assert_eq!(lit(&view).len(), 10);
    }

    #[test]
    fn test_filled_rect() {
        let mut view = canvas(10, 10, 3);
        view.painter().draw_rect(2, 3, 4, 5, RED);
        let pts = lit(&view);
        assert_eq!(pts.len(), 20);
        assert!(pts.iter().all(|&(x, y)| (2..6).contains(&x) && (3..8).contains(&y)));
    }

    #[test]
    fn test_rect_outline_draws_corners_once() {
        // A half-alpha color shows any pixel painted twice
        let half = Rgba::new(255, 255, 255, 128);
        let mut view = canvas(10, 10, 4);
        view.painter().draw_rect_empty(1, 1, 6, 4, half);

        let once = half.over(Rgba::default());
        let tex = view.texture();
        let mut count = 0;
        for y in 0..10 {
            for x in 0..10 {
                let px = tex.get_rgba(x, y);
                if px != Rgba::default() {
                    assert_eq!(px, once, "({}, {}) drawn more than once", x, y);
                    count += 1;
                }
            }
        }
        assert_eq!(count, 2 * 6 + 2 * 2);
        assert_eq!(tex.get_rgba(3, 2), Rgba::default());
    }

    #[test]
    fn test_degenerate_rect_outlines() {
        let mut view = canvas(8, 8, 3);
        {
            let mut p = view.painter();
            p.draw_rect_empty(0, 0, 5, 1, RED);
            p.draw_rect_empty(6, 2, 1, 4, RED);
            p.draw_rect_empty(0, 7, 0, 3, RED);
        }
        assert_eq!(lit(&view).len(), 5 + 4);
    }

    #[test]
    fn test_filled_circle_rows_drawn_once() {
        let half = Rgba::new(255, 255, 255, 128);
        let mut view = canvas(32, 32, 4);
        view.painter().draw_circle(16, 16, 9, half);

        let once = half.over(Rgba::default());
        let tex = view.texture();
        for y in 0..32 {
            for x in 0..32 {
                let px = tex.get_rgba(x, y);
                assert!(px == once || px == Rgba::default(), "({}, {}) = {:?}", x, y, px);
            }
        }
        // Extremes and symmetry
        assert_eq!(tex.get_rgba(7, 16), once);
        assert_eq!(tex.get_rgba(25, 16), once);
        assert_eq!(tex.get_rgba(16, 7), once);
        assert_eq!(tex.get_rgba(16, 25), once);
        assert_eq!(tex.get_rgba(6, 16), Rgba::default());
        for y in 1..32 {
            for x in 1..32 {
                assert_eq!(tex.get_rgba(x, y), tex.get_rgba(32 - x, y));
                assert_eq!(tex.get_rgba(x, y), tex.get_rgba(x, 32 - y));
            }
        }
    }

    #[test]
    fn test_circle_outline_hits_axes() {
        let mut view = canvas(40, 40, 3);
        view.painter().draw_circle_empty(20, 20, 10, RED);
        let tex = view.texture();
        for &(x, y) in &[(30, 20), (10, 20), (20, 30), (20, 10)] {
            assert_eq!(tex.texel(x, y), RED);
        }
        assert_eq!(tex.texel(20, 20), Rgb::default());
    }

    #[test]
    fn test_circle_outline_stays_on_radius() {
        for &r in &[1i64, 5, 10, 23, 50] {
            let mut view = canvas(120, 120, 3);
            view.painter().draw_circle_empty(60, 60, r, RED);
            let pts = lit(&view);
            assert!(!pts.is_empty());
            for (x, y) in pts {
                let d = (x as f64 - 60.0).hypot(y as f64 - 60.0);
                assert!((d - r as f64).abs() <= 0.5, "r={} ({}, {}) at distance {}", r, x, y, d);
            }
        }
    }

    #[test]
    fn test_circle_outline_octant_steps() {
        let mut view = canvas(40, 40, 3);
        view.painter().draw_circle_empty(20, 20, 10, RED);
        let tex = view.texture();
        for &(dx, dy) in &[(10, 0), (10, 3), (9, 4), (9, 5), (8, 6), (7, 7)] {
            assert_eq!(tex.texel(20 + dx, 20 + dy), RED, "({}, {})", dx, dy);
        }
        assert_eq!(tex.texel(20 + 10, 20 + 4), Rgb::default());
    }

    #[test]
    fn test_rgb_on_single_channel_target() {
        let mut view = canvas(8, 8, 1);
        {
            let mut p = view.painter();
            p.draw_circle(4, 4, 2, Rgb::new(200, 100, 50));
            p.draw_pixel(7, 7, Rgb::new(90, 1, 2));
            p.draw_scanline(0, 0, 8, Rgb::new(30, 40, 50));
        }
        let tex = view.texture();
        assert_eq!(tex.data().len(), 64);
        assert_eq!(tex.texel(4, 4), Rgb::gray(200));
        assert_eq!(tex.texel(7, 7), Rgb::gray(90));
        assert_eq!(tex.texel(6, 7), Rgb::default());
        assert_eq!(tex.texel(7, 0), Rgb::gray(30));
    }

    #[test]
    fn test_rgba_on_three_channel_target() {
        let mut view = canvas(4, 4, 3);
        let opaque = Rgba::new(255, 0, 0, 255);
        {
            let mut p = view.painter();
            p.draw_pixel(0, 0, opaque);
            p.draw_pixel(3, 3, opaque);
            p.draw_scanline(0, 2, 4, Rgba::new(0, 255, 0, 255));
            p.draw_circle(1, 1, 1, Rgba::new(0, 0, 255, 0));
        }
        let tex = view.texture();
        assert_eq!(tex.texel(0, 0), RED);
        assert_eq!(tex.texel(1, 0), Rgb::default());
        assert_eq!(tex.texel(3, 3), RED);
        assert_eq!(tex.texel(3, 2), Rgb::new(0, 255, 0));
        assert_eq!(tex.texel(2, 3), Rgb::default());
    }

    #[test]
    fn test_circles_clip_and_degenerate() {
        let mut view = canvas(8, 8, 3);
        {
            let mut p = view.painter();
            p.draw_circle(0, 0, 100, RED);
            p.draw_circle_empty(-3, -3, 2, RED);
            p.draw_circle(5, 5, -1, RED);
        }
        assert_eq!(lit(&view).len(), 64);

        let mut view = canvas(8, 8, 3);
        view.painter().draw_circle(3, 3, 0, RED);
        assert_eq!(lit(&view), vec![(3, 3)]);
    }

    #[test]
    fn test_scanline_clips() {
        let mut view = canvas(6, 2, 3);
        {
            let mut p = view.painter();
            p.draw_scanline(-2, 1, 5, RED);
            p.draw_scanline(0, 5, 5, RED);
            p.draw_scanline(3, 0, 0, RED);
        }
        assert_eq!(lit(&view), vec![(0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn test_clear_and_resize() {
        let mut view = canvas(4, 4, 3);
        {
            let mut p = view.painter();
            p.draw_rect(0, 0, 4, 4, RED);
            p.clear_image();
        }
        assert!(lit(&view).is_empty());

        {
            let mut p = view.painter();
            p.set_size(8, 2, 4).unwrap();
            assert_eq!((p.width(), p.height(), p.channels()), (8, 2, 4));
            assert!(p.set_size(0, 2, 4).is_err());
        }
    }

    #[test]
    fn test_session_recomputes_exactly_once() {
        let config = ViewConfig {
            undersampling: UndersamplingFix::Mipmap,
            ..ViewConfig::default()
        };
        let mut view = ImageView::<u8>::with_size(16, 16, 3, config).unwrap();
        view.update();
        assert_eq!(view.revision(), 1);

        {
            let mut p = view.painter();
            for i in 0..16 {
                p.draw_pixel(i, i, RED);
            }
            p.draw_circle(8, 8, 4, RED);
            p.finish();
        }
        assert!(!view.is_dirty());
        assert_eq!(view.revision(), 2);
        assert_eq!(view.mip_level_count(), 5);

        // Dropped without drawing: nothing to recompute
        drop(view.painter());
        assert_eq!(view.revision(), 2);

        // Dropped after drawing
        {
            let mut p = view.painter();
            p.draw_rect(0, 0, 2, 2, RED);
        }
        assert_eq!(view.revision(), 3);
    }

    #[test]
    fn test_common_noise_leaves_alpha() {
        let mut view = canvas(8, 8, 4);
        let mut noise = NoiseGenerator::new(3);
        {
            let mut p = view.painter();
            p.draw_rect(0, 0, 8, 8, Rgba::new(0, 0, 0, 255));
            p.generate_common_noise(&mut noise);
        }
        let tex = view.texture();
        let mut distinct = std::collections::HashSet::new();
        for y in 0..8 {
            for x in 0..8 {
                let px = tex.get_rgba(x, y);
                assert_eq!(px.a, 255);
                assert_eq!(px.r, px.g);
                assert_eq!(px.g, px.b);
                distinct.insert(px.r);
            }
        }
        assert!(distinct.len() > 8);

        // Same seed, same image
        let mut again = canvas(8, 8, 4);
        {
            let mut p = again.painter();
            p.draw_rect(0, 0, 8, 8, Rgba::new(0, 0, 0, 255));
            p.generate_common_noise(&mut NoiseGenerator::new(3));
        }
        assert_eq!(again.texture(), view.texture());
    }

    #[test]
    fn test_perlin_fill_is_gray_and_deterministic() {
        let noise = NoiseGenerator::new(42);
        let mut a = canvas(64, 32, 3);
        let mut b = canvas(64, 32, 3);
        a.painter().generate_perlin_noise(&noise, 8).unwrap();
        b.painter().generate_perlin_noise(&noise, 8).unwrap();
        assert_eq!(a.texture(), b.texture());

        let tex = a.texture();
        for y in 0..32 {
            for x in 0..64 {
                let c = tex.get_rgb(x, y);
                assert!(c.r == c.g && c.g == c.b);
                let expected = noise.perlin_noise(x, y, 8, 64, 32).unwrap();
                assert_eq!(c.r, (expected * 255.0) as u8);
            }
        }
    }

    #[test]
    fn test_perlin_frequency_error_writes_nothing() {
        let noise = NoiseGenerator::new(1);
        let mut view = canvas(16, 16, 3);
        {
            let mut p = view.painter();
            assert!(matches!(
                p.generate_perlin_noise(&noise, 17),
                Err(Error::FrequencyOutOfRange { freq: 17, extent: 16 })
            ));
            assert!(p.generate_perlin_noise(&noise, 0).is_err());
        }
        assert!(lit(&view).is_empty());
    }

    #[test]
    fn test_fractal_needs_extent_128() {
        let noise = NoiseGenerator::new(8);
        let mut small = canvas(64, 64, 3);
        assert!(small.painter().generate_fractal_perlin_noise(&noise).is_err());

        let mut view = canvas(128, 4, 3);
        view.painter().generate_fractal_perlin_noise(&noise).unwrap();
        let tex = view.texture();
        for x in 0..128 {
            let expected = noise.fractal_noise(x, 2, 128, 4).unwrap();
            assert_eq!(tex.get_rgb(x, 2).r, (expected * 255.0) as u8);
        }
    }

    #[test]
    fn test_hdr_painting() {
        let mut view = ImageView::<f32>::with_size(8, 8, 4, ViewConfig::default()).unwrap();
        {
            let mut p = view.painter();
            p.draw_rect(0, 0, 8, 8, Rgb::new(2.0, 0.5, 0.0));
            p.draw_pixel(1, 1, Rgba::new(0.0, 0.0, 1.0, 0.5));
        }
        let px = view.texture().get_rgba(1, 1);
        assert!((px.r - 1.0).abs() < 1e-6);
        assert!((px.g - 0.25).abs() < 1e-6);
        assert!((px.b - 0.5).abs() < 1e-6);
        assert!((px.a - 0.25).abs() < 1e-6);
        // HDR samples above 1.0 survive
        assert_eq!(view.texture().get_rgb(5, 5), Rgb::new(2.0, 0.5, 0.0));

        view.painter().generate_perlin_noise(&NoiseGenerator::new(2), 4).unwrap();
        let c = view.texture().get_rgba(3, 6);
        assert!((0.0..=1.0).contains(&c.r));
        assert!(c.r == c.g && c.g == c.b);
        assert!((c.a - 0.0).abs() < 1e-6);
    }
}
