use glam::Vec2;

use crate::render::{Color, DrawSurface, Stroke};
use crate::types::Point;

/// A recorded drawing primitive with the transform already applied.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Line { from: Point, to: Point, stroke: Stroke },
    Circle { center: Point, radius: f32, color: Color },
}

/// A [`DrawSurface`] that records commands instead of rasterizing them.
///
/// The worker renders into a `DisplayList`, and the host paints it on its
/// own thread.
#[derive(Clone, Debug, Default)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
    offset: Vec2,
    saved: Vec<Vec2>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Every recorded line as `(from, to, stroke)`.
    pub fn lines(&self) -> impl Iterator<Item = (Point, Point, Stroke)> + '_ {
        self.commands.iter().filter_map(|c| match *c {
            DrawCommand::Line { from, to, stroke } => Some((from, to, stroke)),
            _ => None,
        })
    }
}

impl DrawSurface for DisplayList {
    /// Drops everything recorded so far; the clear color becomes the first
    /// command.
    fn clear(&mut self, color: Color) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.commands.push(DrawCommand::Line {
            from: from + self.offset,
            to: to + self.offset,
            stroke,
        });
    }

    fn draw_circle(&mut self, center: Point, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center: center + self.offset,
            radius,
            color,
        });
    }

    fn translate(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    fn save(&mut self) {
        self.saved.push(self.offset);
    }

    fn restore(&mut self) {
        match self.saved.pop() {
            Some(offset) => self.offset = offset,
            None => tracing::trace!("restore without matching save"),
        }
    }
}
