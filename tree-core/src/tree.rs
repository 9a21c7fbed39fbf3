use std::f32::consts::PI;

use crate::config::{BranchMode, Geometry};
use crate::types::{ChildIndex, Point};

/// Base angle used when the reference vector has no direction.
pub const FALLBACK_ANGLE: f32 = 0.0;

/// Child list of a [`TreeNode`].
#[derive(Debug, PartialEq)]
pub enum Children {
    /// Not generated yet. The frontier of the tree.
    Leaf,
    /// Generated by [`TreeNode::branch`]; may be empty for a fan-out of zero.
    Branched(Vec<TreeNode>),
}

/// A node of the scrolling tree.
///
/// Every node exclusively owns its subtree. Depending on
/// [`Geometry::mode`], `pos` is either an absolute canvas position or the
/// displacement `parent - self`.
#[derive(Debug, PartialEq)]
pub struct TreeNode {
    pub pos: Point,
    pub children: Children,
}

/// Angle of the `index`-th child around `base`.
///
/// Siblings are spaced `PI / fan_divisor` apart and index `1` continues
/// straight along `base`.
#[inline]
pub fn fan_angle(base: f32, index: ChildIndex, fan_divisor: f32) -> f32 {
    base + (1.0 - index as f32) * (PI / fan_divisor)
}

/// Heading of a node derived from the vector `parent - self`.
///
/// The tree grows along the vertical axis, so the arguments are swapped
/// compared to the usual `atan2(y, x)`: the angle is measured from the `y`
/// axis. `atan` alone cannot tell forward from backward growth; with
/// `quadrant_correction` the angle is rotated by `PI` when `diff.y < 0`.
///
/// A zero or non-finite `diff` yields [`FALLBACK_ANGLE`].
pub fn base_angle(diff: Point, quadrant_correction: bool) -> f32 {
    if !diff.is_finite() || diff == Point::ZERO {
        tracing::trace!(?diff, "degenerate branch reference, using fallback angle");
        return FALLBACK_ANGLE;
    }

    let mut theta = (diff.x / diff.y).atan();
    if quadrant_correction && diff.y < 0.0 {
        theta += PI;
    }
    theta
}

impl TreeNode {
    pub fn leaf(pos: Point) -> Self {
        Self {
            pos,
            children: Children::Leaf,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.children, Children::Leaf)
    }

    /// Children of this node; empty for leaves.
    pub fn children(&self) -> &[TreeNode] {
        match &self.children {
            Children::Leaf => &[],
            Children::Branched(kids) => kids,
        }
    }

    pub fn children_mut(&mut self) -> &mut [TreeNode] {
        match &mut self.children {
            Children::Leaf => &mut [],
            Children::Branched(kids) => kids,
        }
    }

    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Replaces this node's children with `num_children` fresh leaves.
    ///
    /// `reference` is the parent's absolute position in
    /// [`BranchMode::Position`], or the displacement `parent - self` in
    /// [`BranchMode::Displacement`]. Child `i` sits `branch_length` away at
    /// [`fan_angle`]`(theta, i, k)`. Children grow away from the parent, so
    /// in position mode the displacement is subtracted from `self.pos`.
    ///
    /// Only one level is generated.
    pub fn branch(
        &mut self,
        num_children: usize,
        branch_length: f32,
        reference: Point,
        geometry: &Geometry,
    ) {
        let diff = match geometry.mode {
            BranchMode::Position => reference - self.pos,
            BranchMode::Displacement => reference,
        };
        let theta = base_angle(diff, geometry.quadrant_correction);

        let kids = (0..num_children)
            .map(|i| {
                let angle = fan_angle(theta, i, geometry.fan_divisor);
                let disp = Point::new(branch_length * angle.sin(), branch_length * angle.cos());
                match geometry.mode {
                    BranchMode::Position => TreeNode::leaf(self.pos - disp),
                    BranchMode::Displacement => TreeNode::leaf(disp),
                }
            })
            .collect();

        self.children = Children::Branched(kids);
    }

    /// Moves the child at `index` out of this node.
    ///
    /// The slot keeps a leaf with the same `pos`, so the edge to the
    /// removed child can still be drawn from this node.
    pub fn take_child(&mut self, index: ChildIndex) -> Option<TreeNode> {
        let Children::Branched(kids) = &mut self.children else {
            return None;
        };
        let slot = kids.get_mut(index)?;
        let stub = TreeNode::leaf(slot.pos);
        Some(std::mem::replace(slot, stub))
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(TreeNode::node_count).sum::<usize>()
    }

    /// Number of generated levels below this node.
    pub fn depth(&self) -> usize {
        self.children()
            .iter()
            .map(|c| 1 + c.depth())
            .max()
            .unwrap_or(0)
    }
}

impl Geometry {
    /// The reference to pass to [`TreeNode::branch`] for `node`, whose
    /// parent sits at the absolute position `parent_pos`.
    pub fn reference(&self, parent_pos: Point, node: &TreeNode) -> Point {
        match self.mode {
            BranchMode::Position => parent_pos,
            BranchMode::Displacement => node.pos,
        }
    }

    /// Absolute position of `node`, whose parent sits at `parent_pos`.
    pub fn resolve(&self, parent_pos: Point, node: &TreeNode) -> Point {
        match self.mode {
            BranchMode::Position => node.pos,
            BranchMode::Displacement => parent_pos - node.pos,
        }
    }

    /// The value stored in `pos` for a node at `abs` whose parent is at
    /// `parent_pos`.
    pub fn encode(&self, parent_pos: Point, abs: Point) -> Point {
        match self.mode {
            BranchMode::Position => abs,
            BranchMode::Displacement => parent_pos - abs,
        }
    }
}
