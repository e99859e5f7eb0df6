use crate::color::Color;
use glam::Vec2;

/// Drawing primitives the plot renders through.
///
/// Coordinates are backing-store pixels with the origin at the top left and
/// y growing downward. Implementations never fail: a primitive that cannot be
/// drawn is skipped.
pub trait DrawSurface {
    /// Resize the backing store, in pixels.
    fn resize(&mut self, width: u32, height: u32);

    /// Backing store size in pixels.
    fn size(&self) -> (u32, u32);

    fn clear(&mut self);

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color);

    /// Stroke connected segments. Fewer than two points draws nothing.
    fn stroke_polyline(&mut self, points: &[Vec2], color: Color, width: f32);

    /// Draw `text` left-aligned and vertically centered on `anchor`.
    fn fill_text(&mut self, text: &str, anchor: Vec2, color: Color, px: f32);

    /// Drop any backing resources. Later draws are no-ops.
    fn release(&mut self) {}
}

/// One recorded primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    FillRect {
        origin: Vec2,
        size: Vec2,
        color: Color,
    },
    Polyline {
        points: Vec<Vec2>,
        color: Color,
        width: f32,
    },
    Text {
        text: String,
        anchor: Vec2,
        color: Color,
        px: f32,
    },
}

/// Surface that records primitives instead of drawing them.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
    released: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primitives recorded since the last `clear`.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn polylines(&self) -> impl Iterator<Item = (&[Vec2], Color)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Polyline { points, color, .. } => Some((points.as_slice(), *color)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    fn record(&mut self, command: DrawCommand) {
        if !self.released {
            self.commands.push(command);
        }
    }
}

impl DrawSurface for RecordingSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        // A clear starts a new frame.
        self.commands.clear();
        self.record(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        self.record(DrawCommand::FillRect {
            origin,
            size,
            color,
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], color: Color, width: f32) {
        if points.len() < 2 {
            return;
        }
        self.record(DrawCommand::Polyline {
            points: points.to_vec(),
            color,
            width,
        });
    }

    fn fill_text(&mut self, text: &str, anchor: Vec2, color: Color, px: f32) {
        self.record(DrawCommand::Text {
            text: text.to_string(),
            anchor,
            color,
            px,
        });
    }

    fn release(&mut self) {
        self.released = true;
        self.commands.clear();
        self.width = 0;
        self.height = 0;
    }
}
