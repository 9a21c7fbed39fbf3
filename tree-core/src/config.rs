use crate::types::Point;

/// How a [`crate::tree::TreeNode`] interprets its `pos` field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BranchMode {
    /// `pos` is an absolute canvas position. The reference handed to
    /// `branch` is the absolute position of the node's parent.
    #[default]
    Position,
    /// `pos` is the displacement `parent - self`. The reference handed to
    /// `branch` is that displacement.
    Displacement,
}

/// Geometric convention used when branching.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub mode: BranchMode,
    /// Divisor `k` in the sibling spacing `PI / k` (6 gives 30 degrees).
    pub fan_divisor: f32,
    /// Add `PI` to the base angle when the reference lies above the node.
    pub quadrant_correction: bool,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            mode: BranchMode::Position,
            fan_divisor: 6.0,
            quadrant_correction: true,
        }
    }
}

/// Which quantity of the accumulated scroll is compared to the branch length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadjustMetric {
    /// Euclidean length of the accumulated vector.
    #[default]
    Euclidean,
    /// Signed vertical component only.
    ///
    /// Only headings with an upward component make progress under this
    /// metric, so forks that would turn the scroll direction horizontal or
    /// downward fall back to the middle child.
    Vertical,
}

/// Policy choosing which child of the root becomes the next root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RootSelector {
    /// Always the middle child (`n / 2`).
    Center,
    /// A fixed child index, clamped to the available children.
    Fixed(usize),
    /// Middle child unless the player steers left or right.
    #[default]
    Steered,
    /// A uniformly random child from a seeded generator.
    Random { seed: u64 },
}

/// Thresholds for turning a drag gesture into a left/right swipe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwipeConfig {
    /// Minimum horizontal travel in pixels.
    pub min_distance: f32,
    /// Maximum vertical travel in pixels before the gesture is rejected.
    pub max_off_path: f32,
    /// Minimum horizontal speed in pixels per second.
    pub min_velocity: f32,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            min_distance: 10.0,
            max_off_path: 300.0,
            min_velocity: 200.0,
        }
    }
}

/// Tunables for tree generation and scrolling.
///
/// Changes take effect on the next start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Fan-out of every `branch` call.
    pub num_children: usize,
    pub geometry: Geometry,
    /// Scroll speed in pixels per second.
    pub speed: f32,
    /// Fixed branch length; `None` uses a twentieth of the canvas height.
    pub branch_length: Option<f32>,
    /// Fixed root position; `None` places the root near the bottom center.
    pub origin: Option<Point>,
    /// Gap between the canvas bottom and the synthetic previous root.
    pub bottom_margin: f32,
    pub readjust_metric: ReadjustMetric,
    pub root_selector: RootSelector,
    /// Delay before the first physics step after start or resume.
    pub resume_grace_ms: i64,
    /// Longest wall-clock interval a single tick may simulate. A stalled
    /// frame scrolls at most this far.
    pub max_step_ms: i64,
    pub swipe: SwipeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_children: 3,
            geometry: Geometry::default(),
            speed: 10.0,
            branch_length: None,
            origin: None,
            bottom_margin: 50.0,
            readjust_metric: ReadjustMetric::Euclidean,
            root_selector: RootSelector::Steered,
            resume_grace_ms: 100,
            max_step_ms: 100,
            swipe: SwipeConfig::default(),
        }
    }
}
