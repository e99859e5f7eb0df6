//! CPU raster surface backed by an RGBA8 framebuffer.

use crate::color::Color;
use crate::surface::DrawSurface;
use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Polyline, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use glam::Vec2;
use std::convert::Infallible;

/// Row-major RGBA8 pixels.
struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    fn fill(&mut self, color: Color) {
        let rgba = color.to_rgba();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x >= self.width || y >= self.height {
                continue;
            }
            let i = (y as usize * self.width as usize + x as usize) * 4;
            self.pixels[i..i + 4].copy_from_slice(&[color.r(), color.g(), color.b(), 255]);
        }
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Coordinates are clamped to this many buffer sides around the origin before
/// they reach embedded-graphics, whose point arithmetic must stay inside `i32`.
const COORD_LIMIT_SIDES: f32 = 4.0;

fn to_rgb(color: Color) -> Rgb888 {
    Rgb888::new(color.r, color.g, color.b)
}

/// Software surface rasterized with `embedded-graphics`. Clears to opaque
/// `background`.
pub struct PixelSurface {
    buffer: FrameBuffer,
    background: Color,
    released: bool,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let mut surface = Self {
            buffer: FrameBuffer::new(width, height),
            background: Color::WHITE,
            released: false,
        };
        surface.clear();
        surface
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self.clear();
        self
    }

    /// RGBA8 pixels, row-major, `4 * width` bytes per row.
    pub fn pixels(&self) -> &[u8] {
        &self.buffer.pixels
    }

    fn coord_limit(&self) -> f32 {
        COORD_LIMIT_SIDES * self.buffer.width.max(self.buffer.height).max(1) as f32
    }

    /// Pixel position for `v`, clamped to the coordinate limit. NaN maps to 0.
    fn to_point(&self, v: Vec2) -> Point {
        let limit = self.coord_limit();
        let clamp = |c: f32| {
            if c.is_nan() {
                0
            } else {
                c.clamp(-limit, limit).round() as i32
            }
        };
        Point::new(clamp(v.x), clamp(v.y))
    }

    /// Color at (`x`, `y`), `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.buffer.width || y >= self.buffer.height {
            return None;
        }
        let i = (y as usize * self.buffer.width as usize + x as usize) * 4;
        let p = &self.buffer.pixels[i..i + 4];
        Some(Color::rgb(p[0], p[1], p[2]))
    }
}

impl DrawSurface for PixelSurface {
    fn resize(&mut self, width: u32, height: u32) {
        if self.released {
            return;
        }
        if (width, height) != (self.buffer.width, self.buffer.height) {
            self.buffer = FrameBuffer::new(width, height);
            self.clear();
        }
    }

    fn size(&self) -> (u32, u32) {
        (self.buffer.width, self.buffer.height)
    }

    fn clear(&mut self) {
        self.buffer.fill(self.background);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        let max_side = 2.0 * self.coord_limit();
        let w = size.x.round().clamp(0.0, max_side) as u32;
        let h = size.y.round().clamp(0.0, max_side) as u32;
        let _ = Rectangle::new(self.to_point(origin), Size::new(w, h))
            .into_styled(PrimitiveStyle::with_fill(to_rgb(color)))
            .draw(&mut self.buffer);
    }

    fn stroke_polyline(&mut self, points: &[Vec2], color: Color, width: f32) {
        if points.len() < 2 {
            return;
        }
        let style = PrimitiveStyle::with_stroke(to_rgb(color), width.round().max(1.0) as u32);

        // A NaN vertex breaks the line; infinite ones are clamped like any other.
        for run in points.split(|p| p.is_nan()) {
            if run.len() < 2 {
                continue;
            }
            let run: Vec<Point> = run.iter().map(|&p| self.to_point(p)).collect();
            let _ = Polyline::new(&run).into_styled(style).draw(&mut self.buffer);
        }
    }

    fn fill_text(&mut self, text: &str, anchor: Vec2, color: Color, px: f32) {
        let font = if px < 14.0 { &FONT_6X10 } else { &FONT_10X20 };
        let style = MonoTextStyle::new(font, to_rgb(color));
        let _ = Text::with_baseline(text, self.to_point(anchor), style, Baseline::Middle)
            .draw(&mut self.buffer);
    }

    fn release(&mut self) {
        self.released = true;
        self.buffer = FrameBuffer::new(0, 0);
    }
}
