//! Scroll physics and re-rooting.
//!
//! A run proceeds like this:
//! 1. [`ScrollState::start`] builds the root, its synthetic parent, and two
//!    generated levels below the root.
//! 2. Every frame [`ScrollState::tick`] turns wall-clock time into scroll
//!    distance along the current [`ScrollState::direction`].
//! 3. Once a branch length has been travelled, the passed root is retired
//!    to `previous_root`, one of its children becomes the root, and the next
//!    frontier is generated.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{Config, ReadjustMetric, RootSelector};
use crate::error::StateError;
use crate::input::{Command, DirectionFlags, InputEvent, Turn};
use crate::point::PointExt;
use crate::tree::{Children, TreeNode};
use crate::types::{ChildIndex, Point};

/// Fraction of the canvas height used as branch length when none is configured.
const LENGTH_DIVISOR: f32 = 20.0;

/// Smallest upward scroll component a fork may leave under the vertical metric.
const MIN_VERTICAL_HEADING: f32 = 1e-3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GameMode {
    #[default]
    Ready,
    Running,
    Paused,
    Lose,
    Win,
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Lose,
    Win,
}

/// The visible part of the tree.
///
/// `root_pos` and `previous_root_pos` are absolute, whatever the
/// [`crate::config::BranchMode`].
#[derive(Debug)]
pub struct LiveTree {
    pub root: TreeNode,
    pub previous_root: TreeNode,
    pub root_pos: Point,
    pub previous_root_pos: Point,
}

/// Emitted by [`ScrollState::advance`] when the root moved on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reroot {
    /// Index of the promoted child within the old root.
    pub index: ChildIndex,
    /// Accumulated scroll that triggered the event.
    pub travelled: Point,
    /// Absolute position of the new root.
    pub root_pos: Point,
}

#[derive(Debug)]
pub struct ScrollState {
    cfg: Config,
    mode: GameMode,
    tree: Option<LiveTree>,
    scroll_offset: Point,
    since_readjust: Point,
    direction: Vec2,
    branch_length: f32,
    last_tick_ms: i64,
    canvas: Option<Vec2>,
    held: DirectionFlags,
    swipe: Option<Turn>,
    rng: StdRng,
    reroots: u64,
}

/// Unit vector that carries the content from `root` back toward
/// `previous`, i.e. the canvas translation that keeps the view travelling
/// along the branch just taken.
fn scroll_direction(previous: Point, root: Point, fallback: Vec2) -> Vec2 {
    (previous - root).try_normalize().unwrap_or(fallback)
}

impl ScrollState {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            mode: GameMode::Ready,
            tree: None,
            scroll_offset: Point::ZERO,
            since_readjust: Point::ZERO,
            direction: Vec2::Y,
            branch_length: 0.0,
            last_tick_ms: 0,
            canvas: None,
            held: DirectionFlags::default(),
            swipe: None,
            rng: StdRng::seed_from_u64(0),
            reroots: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Replaces the configuration. The current run keeps its geometry; the
    /// new values apply from the next [`ScrollState::start`].
    pub fn set_config(&mut self, cfg: Config) {
        self.cfg = cfg;
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn tree(&self) -> Option<&LiveTree> {
        self.tree.as_ref()
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.tree.as_ref().map(|t| &t.root)
    }

    pub fn previous_root(&self) -> Option<&TreeNode> {
        self.tree.as_ref().map(|t| &t.previous_root)
    }

    /// Total scroll applied to the canvas since start.
    pub fn scroll_offset(&self) -> Point {
        self.scroll_offset
    }

    /// Scroll accumulated since the last re-root.
    pub fn since_readjust(&self) -> Point {
        self.since_readjust
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn branch_length(&self) -> f32 {
        self.branch_length
    }

    pub fn reroots(&self) -> u64 {
        self.reroots
    }

    pub fn held(&self) -> DirectionFlags {
        self.held
    }

    pub fn canvas_size(&self) -> Option<Vec2> {
        self.canvas
    }

    pub fn set_surface_size(&mut self, width: f32, height: f32) {
        self.canvas = Some(Vec2::new(width, height));
    }

    /// Branch length and root position for a new run.
    fn layout(&self) -> Result<(f32, Point), StateError> {
        let branch_length = match (self.cfg.branch_length, self.canvas) {
            (Some(len), _) => len,
            (None, Some(size)) => size.y / LENGTH_DIVISOR,
            (None, None) => return Err(StateError::SurfaceSizeUnknown),
        };
        let root_pos = match (self.cfg.origin, self.canvas) {
            (Some(origin), _) => origin,
            (None, Some(size)) => Point::new(
                size.x / 2.0,
                size.y - self.cfg.bottom_margin - branch_length,
            ),
            (None, None) => return Err(StateError::SurfaceSizeUnknown),
        };
        Ok((branch_length, root_pos))
    }

    /// Builds a fresh tree and starts scrolling. Accepted in every mode.
    pub fn start(&mut self, now_ms: i64) -> Result<(), StateError> {
        let (branch_length, root_pos) = self.layout()?;
        let g = self.cfg.geometry;
        let n = self.cfg.num_children;

        // The synthetic previous root sits one branch below the root and is
        // itself treated as having grown straight up.
        let previous_root_pos = root_pos + Vec2::new(0.0, branch_length);
        let grandparent_pos = previous_root_pos + Vec2::new(0.0, branch_length);

        let mut root = TreeNode::leaf(g.encode(previous_root_pos, root_pos));
        let previous_root = TreeNode {
            pos: g.encode(grandparent_pos, previous_root_pos),
            children: Children::Branched(vec![TreeNode::leaf(root.pos)]),
        };

        let reference = g.reference(previous_root_pos, &root);
        root.branch(n, branch_length, reference, &g);
        for child in root.children_mut() {
            let reference = g.reference(root_pos, child);
            child.branch(n, branch_length, reference, &g);
        }

        self.tree = Some(LiveTree {
            root,
            previous_root,
            root_pos,
            previous_root_pos,
        });
        self.branch_length = branch_length;
        self.scroll_offset = Point::ZERO;
        self.since_readjust = Point::ZERO;
        self.direction = scroll_direction(previous_root_pos, root_pos, Vec2::Y);
        self.last_tick_ms = now_ms + self.cfg.resume_grace_ms;
        self.swipe = None;
        self.reroots = 0;
        if let RootSelector::Random { seed } = self.cfg.root_selector {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.mode = GameMode::Running;

        tracing::info!(branch_length, ?root_pos, "tree scroll started");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), StateError> {
        if self.mode != GameMode::Running {
            return Err(StateError::InvalidTransition {
                from: self.mode,
                command: Command::Pause,
            });
        }
        self.mode = GameMode::Paused;
        tracing::info!("tree scroll paused");
        Ok(())
    }

    /// Resumes a paused run. The clock is pushed past `now_ms` by the grace
    /// period so the pause itself is never simulated.
    pub fn resume(&mut self, now_ms: i64) -> Result<(), StateError> {
        if self.mode != GameMode::Paused {
            return Err(StateError::InvalidTransition {
                from: self.mode,
                command: Command::Resume,
            });
        }
        self.last_tick_ms = now_ms + self.cfg.resume_grace_ms;
        self.mode = GameMode::Running;
        tracing::info!("tree scroll resumed");
        Ok(())
    }

    pub fn stop(&mut self, outcome: Outcome) -> Result<(), StateError> {
        if !matches!(self.mode, GameMode::Running | GameMode::Paused) {
            return Err(StateError::InvalidTransition {
                from: self.mode,
                command: Command::Stop,
            });
        }
        self.mode = match outcome {
            Outcome::Lose => GameMode::Lose,
            Outcome::Win => GameMode::Win,
        };
        tracing::info!(?outcome, reroots = self.reroots, "tree scroll stopped");
        Ok(())
    }

    pub fn apply(&mut self, command: Command, now_ms: i64) -> Result<(), StateError> {
        match command {
            Command::Start => self.start(now_ms),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(now_ms),
            Command::Stop => self.stop(Outcome::Lose),
        }
    }

    /// Records a direction signal. Returns `true` if the event was used.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Press(dir) => {
                self.held.set(dir, true);
                true
            }
            InputEvent::Release(dir) => {
                self.held.set(dir, false);
                true
            }
            InputEvent::Fling(fling) => match fling.classify(&self.cfg.swipe) {
                Some(turn) => {
                    tracing::debug!(?turn, "swipe latched");
                    self.swipe = Some(turn);
                    true
                }
                None => false,
            },
        }
    }

    /// Advances the physics to `now_ms`.
    ///
    /// Does nothing unless running. A last tick in the future (start or
    /// resume grace) skips the step entirely. The simulated interval is
    /// capped at [`Config::max_step_ms`].
    pub fn tick(&mut self, now_ms: i64) -> Option<Reroot> {
        if self.mode != GameMode::Running {
            return None;
        }
        if self.last_tick_ms > now_ms {
            tracing::trace!(now_ms, last = self.last_tick_ms, "tick skipped");
            return None;
        }
        let gap_ms = now_ms - self.last_tick_ms;
        let step_ms = gap_ms.min(self.cfg.max_step_ms.max(0));
        if step_ms < gap_ms {
            tracing::debug!(gap_ms, step_ms, "long frame, step capped");
        }
        self.last_tick_ms = now_ms;
        self.advance(step_ms as f64 / 1000.0)
    }

    /// Scrolls by `elapsed_secs` of travel and re-roots at most once.
    ///
    /// Travel stops at the fork: whatever lies beyond it is dropped, so the
    /// new root sits exactly where the old one was on screen.
    pub fn advance(&mut self, elapsed_secs: f64) -> Option<Reroot> {
        if self.mode != GameMode::Running || self.tree.is_none() {
            return None;
        }

        let distance = (elapsed_secs * f64::from(self.cfg.speed)) as f32;
        let remaining = self.remaining_to_fork();
        let reached = distance >= remaining;
        let travel = if reached { remaining } else { distance };

        let step = self.direction * travel;
        self.scroll_offset.translate(step.x, step.y);
        self.since_readjust += step;

        if reached { self.reroot() } else { None }
    }

    /// Distance left along `direction` before the readjust metric reaches
    /// the branch length. Infinite when the heading cannot get there.
    fn remaining_to_fork(&self) -> f32 {
        let left = match self.cfg.readjust_metric {
            // The accumulator is collinear with `direction`: both are reset
            // together at every re-root.
            ReadjustMetric::Euclidean => self.branch_length - self.since_readjust.length(),
            ReadjustMetric::Vertical if self.direction.y > 0.0 => {
                (self.branch_length - self.since_readjust.y) / self.direction.y
            }
            ReadjustMetric::Vertical => f32::INFINITY,
        };
        left.max(0.0)
    }

    fn select_child(&mut self, available: usize) -> ChildIndex {
        let center = available / 2;
        match self.cfg.root_selector {
            RootSelector::Center => center,
            RootSelector::Fixed(index) => index.min(available - 1),
            RootSelector::Steered => match self.swipe.or(self.held.turn()) {
                Some(Turn::Left) => 0,
                Some(Turn::Right) => available - 1,
                None => center,
            },
            RootSelector::Random { .. } => self.rng.random_range(0..available),
        }
    }

    fn reroot(&mut self) -> Option<Reroot> {
        let travelled = self.since_readjust;
        self.since_readjust = Point::ZERO;

        let available = self.tree.as_ref()?.root.child_count();
        if available == 0 {
            tracing::warn!("root has no children, cannot re-root");
            return None;
        }
        let mut index = self.select_child(available);

        let g = self.cfg.geometry;
        let n = self.cfg.num_children;
        let len = self.branch_length;
        let tree = self.tree.as_mut()?;

        if self.cfg.readjust_metric == ReadjustMetric::Vertical
            && let Some(child) = tree.root.children().get(index)
        {
            let candidate = g.resolve(tree.root_pos, child);
            let heading = scroll_direction(tree.root_pos, candidate, Vec2::ZERO);
            if heading.y <= MIN_VERTICAL_HEADING {
                tracing::debug!(index, "fork would stall the vertical metric, going straight");
                index = available / 2;
            }
        }

        let mut new_root = tree.root.take_child(index)?;
        let new_root_pos = g.resolve(tree.root_pos, &new_root);

        // Children of a root are always generated; this only matters for a
        // tree that was built by hand.
        if new_root.is_leaf() {
            let reference = g.reference(tree.root_pos, &new_root);
            new_root.branch(n, len, reference, &g);
        }
        for child in new_root.children_mut() {
            let reference = g.reference(new_root_pos, child);
            child.branch(n, len, reference, &g);
        }

        tree.previous_root = std::mem::replace(&mut tree.root, new_root);
        tree.previous_root_pos = tree.root_pos;
        tree.root_pos = new_root_pos;

        self.direction = scroll_direction(tree.previous_root_pos, tree.root_pos, self.direction);
        self.reroots += 1;
        self.swipe = None;

        tracing::debug!(index, ?travelled, root = ?new_root_pos, "re-rooted");
        Some(Reroot {
            index,
            travelled,
            root_pos: new_root_pos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BranchMode, Geometry};
    use crate::input::{Direction, Fling};

    const EPS: f32 = 1e-4;

    fn fixed_config(branch_length: f32, speed: f32) -> Config {
        Config {
            branch_length: Some(branch_length),
            origin: Some(Point::new(200.0, 400.0)),
            speed,
            ..Config::default()
        }
    }

    fn started(cfg: Config) -> ScrollState {
        let mut state = ScrollState::new(cfg);
        state.start(0).unwrap();
        state
    }

    #[test]
    fn new_state_is_ready_without_tree() {
        let state = ScrollState::new(Config::default());
        assert_eq!(state.mode(), GameMode::Ready);
        assert!(state.root().is_none());
        assert!(state.previous_root().is_none());
        assert_eq!(state.scroll_offset(), Point::ZERO);
    }

    #[test]
    fn start_needs_a_surface_size_unless_layout_is_fixed() {
        let mut state = ScrollState::new(Config::default());
        assert_eq!(state.start(0), Err(StateError::SurfaceSizeUnknown));
        assert_eq!(state.mode(), GameMode::Ready);

        state.set_surface_size(400.0, 600.0);
        assert_eq!(state.start(0), Ok(()));
        assert_eq!(state.mode(), GameMode::Running);

        let mut fixed = ScrollState::new(fixed_config(30.0, 10.0));
        assert_eq!(fixed.start(0), Ok(()));
    }

    #[test]
    fn start_builds_two_generated_levels_above_the_previous_root() {
        let mut state = ScrollState::new(Config::default());
        state.set_surface_size(400.0, 600.0);
        state.start(0).unwrap();

        // 600 / 20 = 30; root at the bottom center above the 50 px margin.
        assert_eq!(state.branch_length(), 30.0);
        let tree = state.tree().unwrap();
        assert_eq!(tree.root_pos, Point::new(200.0, 520.0));
        assert_eq!(tree.previous_root_pos, Point::new(200.0, 550.0));
        assert_eq!(tree.previous_root.child_count(), 1);
        assert_eq!(tree.previous_root.children()[0].pos, tree.root.pos);

        let root = state.root().unwrap();
        assert_eq!(root.child_count(), 3);
        for child in root.children() {
            assert_eq!(child.child_count(), 3);
            assert!(child.children().iter().all(TreeNode::is_leaf));
        }
        assert_eq!(root.depth(), 2);

        assert_eq!(state.direction(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn one_and_a_half_seconds_trigger_exactly_one_reroot() {
        let mut state = started(fixed_config(30.0, 20.0));
        assert_eq!(state.direction(), Vec2::new(0.0, 1.0));

        let reroot = state.advance(1.5).expect("branch length reached");

        assert_eq!(reroot.travelled.y, 30.0);
        assert_eq!(state.reroots(), 1);
        assert_eq!(state.since_readjust(), Point::ZERO);
        assert_eq!(state.scroll_offset(), Point::new(0.0, 30.0));
    }

    #[test]
    fn reroot_resets_accumulator_and_regenerates_frontier() {
        let mut state = started(fixed_config(30.0, 20.0));
        let old_root_pos = state.tree().unwrap().root_pos;
        let expected = state.root().unwrap().children()[1].pos;

        let reroot = state.advance(1.5).unwrap();

        assert_eq!(reroot.index, 1);
        let tree = state.tree().unwrap();
        assert_eq!(tree.previous_root_pos, old_root_pos);
        assert_eq!(tree.root_pos, expected);
        assert_eq!(reroot.root_pos, expected);
        assert_eq!(state.since_readjust(), Point::ZERO);

        // The retired root keeps a stub where the new root was.
        assert!(tree.previous_root.children()[1].is_leaf());

        for child in tree.root.children() {
            assert_eq!(child.child_count(), 3);
            assert!(child.children().iter().all(TreeNode::is_leaf));
        }
    }

    #[test]
    fn short_advance_accumulates_without_rerooting() {
        let mut state = started(fixed_config(30.0, 20.0));

        assert!(state.advance(0.5).is_none());
        assert!(state.advance(0.5).is_none());

        assert_eq!(state.reroots(), 0);
        assert!((state.since_readjust().y - 20.0).abs() < EPS);
    }

    #[test]
    fn tick_skips_timestamps_before_the_grace_period() {
        let mut state = ScrollState::new(fixed_config(30.0, 10.0));
        state.start(1_000).unwrap();

        // The first step is deferred by 100 ms.
        assert!(state.tick(1_050).is_none());
        assert_eq!(state.scroll_offset(), Point::ZERO);

        state.tick(1_100);
        assert_eq!(state.scroll_offset(), Point::ZERO);

        state.tick(1_200);
        assert_eq!(state.scroll_offset(), Point::new(0.0, 1.0));
    }

    #[test]
    fn stalled_frame_is_capped_to_one_step() {
        let mut state = started(fixed_config(30.0, 20.0));
        state.tick(100);

        // 4.5 s without a frame only simulates the 100 ms cap.
        assert!(state.tick(4_600).is_none());
        assert!((state.scroll_offset().y - 2.0).abs() < EPS);
        assert_eq!(state.reroots(), 0);
    }

    #[test]
    fn root_stays_aligned_on_screen_after_a_long_stall() {
        let mut state = started(fixed_config(30.0, 20.0));
        let on_screen = |s: &ScrollState| {
            s.tree().unwrap().root_pos + s.scroll_offset() - s.since_readjust()
        };
        let before = on_screen(&state);

        state.tick(100);
        state.tick(4_600);
        let mut now = 4_600;
        for _ in 0..120 {
            now += 16;
            state.tick(now);
        }

        assert_eq!(state.reroots(), 1);
        let after = on_screen(&state);
        assert!((after - before).length() < EPS, "{before} -> {after}");
    }

    #[test]
    fn overshooting_advance_stops_at_the_fork() {
        let mut state = started(fixed_config(30.0, 20.0));

        let reroot = state.advance(4.5).unwrap();

        assert_eq!(reroot.travelled, Point::new(0.0, 30.0));
        assert_eq!(state.reroots(), 1);
        assert_eq!(state.scroll_offset(), Point::new(0.0, 30.0));
        let tree = state.tree().unwrap();
        assert_eq!(tree.root_pos + state.scroll_offset(), Point::new(200.0, 400.0));
    }

    #[test]
    fn pause_and_resume_do_not_replay_the_pause() {
        let mut state = ScrollState::new(fixed_config(1_000.0, 10.0));
        state.start(0).unwrap();
        state.tick(100);
        state.tick(116);
        state.pause().unwrap();

        // Ticks while paused do nothing.
        let before = state.scroll_offset();
        assert!(state.tick(5_000).is_none());
        assert_eq!(state.scroll_offset(), before);

        state.resume(10_000).unwrap();
        state.tick(10_016);
        assert_eq!(state.scroll_offset(), before);

        state.tick(10_116);
        let jump = (state.scroll_offset() - before).length();
        assert!(jump > 0.0);
        assert!(jump <= state.config().speed * 0.017, "jump = {jump}");
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let mut state = ScrollState::new(fixed_config(30.0, 10.0));

        assert_eq!(
            state.pause(),
            Err(StateError::InvalidTransition {
                from: GameMode::Ready,
                command: Command::Pause
            })
        );
        assert!(state.resume(0).is_err());
        assert!(state.stop(Outcome::Lose).is_err());

        state.start(0).unwrap();
        assert!(state.resume(0).is_err());

        state.apply(Command::Stop, 0).unwrap();
        assert_eq!(state.mode(), GameMode::Lose);
        assert!(state.pause().is_err());
        assert!(state.advance(10.0).is_none());
    }

    #[test]
    fn stop_can_end_a_paused_run_as_a_win() {
        let mut state = started(fixed_config(30.0, 10.0));
        state.pause().unwrap();
        state.stop(Outcome::Win).unwrap();
        assert_eq!(state.mode(), GameMode::Win);
    }

    #[test]
    fn restart_rebuilds_the_tree() {
        let mut state = started(fixed_config(30.0, 20.0));
        state.advance(1.5);
        state.stop(Outcome::Lose).unwrap();

        state.apply(Command::Start, 0).unwrap();
        assert_eq!(state.mode(), GameMode::Running);
        assert_eq!(state.reroots(), 0);
        assert_eq!(state.scroll_offset(), Point::ZERO);
        assert_eq!(state.tree().unwrap().root_pos, Point::new(200.0, 400.0));
    }

    #[test]
    fn held_left_key_steers_into_the_first_child() {
        let mut state = started(fixed_config(30.0, 20.0));
        assert!(state.handle_input(InputEvent::Press(Direction::Left)));

        let reroot = state.advance(1.5).unwrap();
        assert_eq!(reroot.index, 0);
        assert!(reroot.root_pos.x < 200.0);

        // The view now travels up and to the left, so the content moves
        // right and down.
        let dir = state.direction();
        assert!(dir.x > 0.0 && dir.y > 0.0);
        assert!((dir.length() - 1.0).abs() < EPS);

        state.handle_input(InputEvent::Release(Direction::Left));
        assert_eq!(state.held().turn(), None);
    }

    #[test]
    fn swipe_applies_to_the_next_fork_only() {
        let mut state = started(fixed_config(30.0, 20.0));
        let swipe = Fling {
            start: Point::new(100.0, 100.0),
            end: Point::new(180.0, 100.0),
            velocity: Vec2::new(900.0, 0.0),
        };
        assert!(state.handle_input(InputEvent::Fling(swipe)));

        assert_eq!(state.advance(1.5).unwrap().index, 2);
        assert_eq!(state.advance(1.5).unwrap().index, 1);
    }

    #[test]
    fn slow_fling_is_ignored() {
        let mut state = started(fixed_config(30.0, 20.0));
        let fling = Fling {
            start: Point::new(100.0, 100.0),
            end: Point::new(180.0, 100.0),
            velocity: Vec2::new(20.0, 0.0),
        };
        assert!(!state.handle_input(InputEvent::Fling(fling)));
    }

    #[test]
    fn fixed_selector_is_clamped_to_available_children() {
        let cfg = Config {
            root_selector: RootSelector::Fixed(9),
            ..fixed_config(30.0, 20.0)
        };
        let mut state = started(cfg);
        assert_eq!(state.advance(1.5).unwrap().index, 2);
    }

    #[test]
    fn random_selector_is_reproducible_for_a_seed() {
        let cfg = Config {
            root_selector: RootSelector::Random { seed: 42 },
            ..fixed_config(30.0, 20.0)
        };

        let picks = |cfg: Config| {
            let mut state = started(cfg);
            (0..8)
                .map(|_| state.advance(1.5).map(|r| r.index))
                .collect::<Vec<_>>()
        };

        let a = picks(cfg);
        assert_eq!(a, picks(cfg));
        assert!(a.iter().all(|i| matches!(i, Some(0..=2))));
    }

    #[test]
    fn vertical_metric_only_counts_the_y_component() {
        let cfg = Config {
            readjust_metric: ReadjustMetric::Vertical,
            ..fixed_config(30.0, 30.0)
        };
        let mut state = started(cfg);

        // Turn left once so the direction gains an x component.
        state.handle_input(InputEvent::Press(Direction::Left));
        assert_eq!(state.advance(1.0).unwrap().index, 0);
        state.handle_input(InputEvent::Release(Direction::Left));

        // A full branch length of travel is only ~26 px vertically.
        assert!(state.advance(1.0).is_none());
        assert!(state.since_readjust().y < 30.0);
        assert!(state.advance(0.2).is_some());
    }

    #[test]
    fn vertical_metric_never_turns_past_horizontal() {
        let cfg = Config {
            readjust_metric: ReadjustMetric::Vertical,
            ..fixed_config(30.0, 30.0)
        };
        let mut state = started(cfg);
        state.handle_input(InputEvent::Press(Direction::Left));

        let picks: Vec<_> = (0..6)
            .map(|_| state.advance(10.0).map(|r| r.index))
            .collect();

        // Two left turns reach 60 degrees; a third would be horizontal.
        assert_eq!(picks, vec![Some(0), Some(0), Some(1), Some(1), Some(1), Some(1)]);
        assert_eq!(state.reroots(), 6);
        assert!(state.direction().y > 0.4);
    }

    #[test]
    fn displacement_mode_scrolls_through_the_same_positions() {
        let pos_cfg = fixed_config(30.0, 20.0);
        let disp_cfg = Config {
            geometry: Geometry {
                mode: BranchMode::Displacement,
                ..Geometry::default()
            },
            ..pos_cfg
        };

        let mut a = started(pos_cfg);
        let mut b = started(disp_cfg);
        let turns = [Direction::Left, Direction::Right, Direction::Right, Direction::Up];

        for dir in turns {
            a.handle_input(InputEvent::Press(dir));
            b.handle_input(InputEvent::Press(dir));
            let ra = a.advance(1.5).unwrap();
            let rb = b.advance(1.5).unwrap();
            a.handle_input(InputEvent::Release(dir));
            b.handle_input(InputEvent::Release(dir));

            // Both modes round differently, so allow a little drift.
            assert_eq!(ra.index, rb.index);
            assert!((ra.root_pos - rb.root_pos).length() < 1e-2);
            assert!((a.direction() - b.direction()).length() < 1e-3);
        }
    }

    #[test]
    fn zero_fan_out_never_reroots() {
        let cfg = Config {
            num_children: 0,
            ..fixed_config(30.0, 20.0)
        };
        let mut state = started(cfg);

        assert!(state.advance(2.0).is_none());
        assert_eq!(state.reroots(), 0);
        assert_eq!(state.since_readjust(), Point::ZERO);
        assert_eq!(state.root().unwrap().child_count(), 0);
    }
}
