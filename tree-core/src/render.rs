//! Drawing the live tree onto a [`DrawSurface`].

use std::ops::AddAssign;

use glam::Vec2;

use crate::config::Geometry;
use crate::scroll::ScrollState;
use crate::tree::TreeNode;
use crate::types::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const CYAN: Color = Color::rgb(0, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

/// Primitives the renderer needs from a drawing backend.
///
/// `translate` affects every later call until the matching `restore`.
pub trait DrawSurface {
    fn clear(&mut self, color: Color);
    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke);
    fn draw_circle(&mut self, center: Point, radius: f32, color: Color);
    fn translate(&mut self, delta: Vec2);
    fn save(&mut self);
    fn restore(&mut self);
}

/// What a traversal touched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Nodes with at least one child that were expanded.
    pub visited: usize,
    /// Edges drawn.
    pub segments: usize,
}

impl AddAssign for RenderStats {
    fn add_assign(&mut self, rhs: Self) {
        self.visited += rhs.visited;
        self.segments += rhs.segments;
    }
}

/// Paints the tree held by a [`ScrollState`].
#[derive(Clone, Debug)]
pub struct Renderer {
    pub background: Color,
    /// Edge colors, cycled by child index.
    pub palette: Vec<Color>,
    pub stroke_width: f32,
    pub root_marker: Color,
    pub previous_root_marker: Color,
    pub marker_radius: f32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            palette: vec![Color::MAGENTA, Color::YELLOW, Color::GREEN],
            stroke_width: 2.0,
            root_marker: Color::RED,
            previous_root_marker: Color::CYAN,
            marker_radius: 4.0,
        }
    }
}

impl Renderer {
    /// Clears the surface and draws the previous root, the root and their
    /// subtrees, shifted by the scroll offset.
    pub fn draw_frame<S: DrawSurface + ?Sized>(
        &self,
        surface: &mut S,
        state: &ScrollState,
    ) -> RenderStats {
        surface.clear(self.background);

        let Some(tree) = state.tree() else {
            return RenderStats::default();
        };
        let geometry = state.config().geometry;
        let base = Stroke {
            color: Color::WHITE,
            width: self.stroke_width,
        };

        surface.save();
        surface.translate(state.scroll_offset());

        let mut stats = self.draw_tree(
            surface,
            &tree.previous_root,
            tree.previous_root_pos,
            &geometry,
            base,
        );
        stats += self.draw_tree(surface, &tree.root, tree.root_pos, &geometry, base);

        surface.draw_circle(
            tree.previous_root_pos,
            self.marker_radius,
            self.previous_root_marker,
        );
        surface.draw_circle(tree.root_pos, self.marker_radius, self.root_marker);

        surface.restore();
        stats
    }

    /// Pre-order traversal drawing an edge from `node` to each child.
    ///
    /// `node_pos` is the absolute position of `node`. Leaves end the
    /// recursion; they are the frontier, not an error.
    pub fn draw_tree<S: DrawSurface + ?Sized>(
        &self,
        surface: &mut S,
        node: &TreeNode,
        node_pos: Point,
        geometry: &Geometry,
        inherited: Stroke,
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        self.walk(surface, node, node_pos, geometry, inherited, &mut stats);
        stats
    }

    fn walk<S: DrawSurface + ?Sized>(
        &self,
        surface: &mut S,
        node: &TreeNode,
        node_pos: Point,
        geometry: &Geometry,
        inherited: Stroke,
        stats: &mut RenderStats,
    ) {
        let children = node.children();
        if children.is_empty() || !node_pos.is_finite() {
            return;
        }
        stats.visited += 1;

        for (i, child) in children.iter().enumerate() {
            let child_pos = geometry.resolve(node_pos, child);
            if !child_pos.is_finite() {
                continue;
            }
            let stroke = Stroke {
                color: self.edge_color(i).unwrap_or(inherited.color),
                ..inherited
            };
            surface.draw_line(node_pos, child_pos, stroke);
            stats.segments += 1;
            self.walk(surface, child, child_pos, geometry, stroke, stats);
        }
    }

    fn edge_color(&self, index: usize) -> Option<Color> {
        if self.palette.is_empty() {
            None
        } else {
            Some(self.palette[index % self.palette.len()])
        }
    }
}
