use glam::Vec2;

/// A 2-D position or displacement on the canvas.
///
/// Canvas coordinates follow the drawing surface: `x` grows to the right
/// and `y` grows downward, so an upward-growing tree has decreasing `y`.
pub type Point = Vec2;

/// Index of a child inside a [`crate::tree::Children::Branched`] list.
pub type ChildIndex = usize;
