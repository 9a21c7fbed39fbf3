//! Lock-guarded access to the one [`ScrollState`] shared by the worker and
//! the host thread.

use std::sync::Arc;

use glam::Vec2;
use parking_lot::{Mutex, MutexGuard};

use crate::clock::Clock;
use crate::config::Config;
use crate::error::StateError;
use crate::input::{Command, InputEvent};
use crate::scroll::{GameMode, Outcome, Reroot, ScrollState};
use crate::types::Point;

/// Copy of the values a status bar wants, taken under the lock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusSnapshot {
    pub mode: GameMode,
    pub reroots: u64,
    pub scroll_offset: Point,
    pub direction: Vec2,
    pub branch_length: f32,
    pub node_count: usize,
}

/// Cloneable handle to the shared [`ScrollState`].
///
/// Every method takes the same mutex the game loop holds while ticking and
/// drawing, and releases it before returning.
#[derive(Clone)]
pub struct ScrollHandle {
    state: Arc<Mutex<ScrollState>>,
    clock: Arc<dyn Clock>,
}

impl ScrollHandle {
    pub fn new(cfg: Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScrollState::new(cfg))),
            clock,
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Locks the state for the duration of the returned guard.
    ///
    /// Keep the guard short-lived and never block while holding it.
    pub fn lock(&self) -> MutexGuard<'_, ScrollState> {
        self.state.lock()
    }

    /// Runs `f` with shared access to the state.
    pub fn with_state<R>(&self, f: impl FnOnce(&ScrollState) -> R) -> R {
        f(&self.state.lock())
    }

    pub fn command(&self, command: Command) -> Result<(), StateError> {
        let now = self.clock.now_ms();
        let result = self.state.lock().apply(command, now);
        if let Err(err) = &result {
            tracing::debug!(%err, "command rejected");
        }
        result
    }

    pub fn start(&self) -> Result<(), StateError> {
        self.command(Command::Start)
    }

    pub fn pause(&self) -> Result<(), StateError> {
        self.command(Command::Pause)
    }

    pub fn resume(&self) -> Result<(), StateError> {
        self.command(Command::Resume)
    }

    pub fn stop(&self, outcome: Outcome) -> Result<(), StateError> {
        self.state.lock().stop(outcome)
    }

    /// Pauses only if running. Used when the host loses focus.
    pub fn pause_if_running(&self) {
        let mut state = self.state.lock();
        if state.mode() == GameMode::Running
            && let Err(err) = state.pause()
        {
            tracing::warn!(%err, "pause on focus loss rejected");
        }
    }

    pub fn handle_input(&self, event: InputEvent) -> bool {
        self.state.lock().handle_input(event)
    }

    pub fn set_surface_size(&self, width: f32, height: f32) {
        self.state.lock().set_surface_size(width, height);
    }

    pub fn set_config(&self, cfg: Config) {
        self.state.lock().set_config(cfg);
    }

    pub fn config(&self) -> Config {
        *self.state.lock().config()
    }

    /// Advances the physics to the clock's current time.
    pub fn tick(&self) -> Option<Reroot> {
        let now = self.clock.now_ms();
        self.state.lock().tick(now)
    }

    pub fn status(&self) -> StatusSnapshot {
        let state = self.state.lock();
        let node_count = state.tree().map_or(0, |t| {
            t.root.node_count() + t.previous_root.node_count()
        });
        StatusSnapshot {
            mode: state.mode(),
            reroots: state.reroots(),
            scroll_offset: state.scroll_offset(),
            direction: state.direction(),
            branch_length: state.branch_length(),
            node_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::input::Direction;
    use std::thread;

    fn handle(clock: Arc<ManualClock>) -> ScrollHandle {
        let cfg = Config {
            branch_length: Some(30.0),
            origin: Some(Point::new(100.0, 200.0)),
            speed: 20.0,
            max_step_ms: 2_000,
            ..Config::default()
        };
        ScrollHandle::new(cfg, clock)
    }

    #[test]
    fn commands_use_the_shared_clock() {
        let clock = Arc::new(ManualClock::new(1_000));
        let h = handle(clock.clone());
        h.start().unwrap();

        // Inside the start grace period.
        clock.set(1_050);
        assert!(h.tick().is_none());
        assert_eq!(h.status().scroll_offset, Point::ZERO);

        clock.set(2_100);
        assert!(h.tick().is_none());
        assert_eq!(h.status().scroll_offset, Point::new(0.0, 20.0));

        clock.set(2_600);
        assert!(h.tick().is_some());
        assert_eq!(h.status().reroots, 1);
    }

    #[test]
    fn pause_if_running_ignores_other_modes() {
        let clock = Arc::new(ManualClock::new(0));
        let h = handle(clock);

        h.pause_if_running();
        assert_eq!(h.status().mode, GameMode::Ready);

        h.start().unwrap();
        h.pause_if_running();
        assert_eq!(h.status().mode, GameMode::Paused);
        h.pause_if_running();
        assert_eq!(h.status().mode, GameMode::Paused);

        h.resume().unwrap();
        assert_eq!(h.status().mode, GameMode::Running);
    }

    #[test]
    fn rejected_command_leaves_state_untouched() {
        let h = handle(Arc::new(ManualClock::new(0)));
        assert!(h.resume().is_err());
        assert_eq!(h.status().mode, GameMode::Ready);
    }

    #[test]
    fn status_counts_live_nodes() {
        let h = handle(Arc::new(ManualClock::new(0)));
        assert_eq!(h.status().node_count, 0);

        h.start().unwrap();
        // Root with two levels (1 + 3 + 9) and the previous root with its stub.
        assert_eq!(h.status().node_count, 13 + 2);
    }

    #[test]
    fn handles_can_be_shared_across_threads() {
        let h = handle(Arc::new(ManualClock::new(0)));
        h.start().unwrap();

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let h = h.clone();
                thread::spawn(move || {
                    let dir = if i % 2 == 0 {
                        Direction::Left
                    } else {
                        Direction::Right
                    };
                    for _ in 0..100 {
                        h.handle_input(InputEvent::Press(dir));
                        h.handle_input(InputEvent::Release(dir));
                        h.with_state(|s| s.root().map(|r| r.child_count()));
                    }
                })
            })
            .collect();

        for w in workers {
            w.join().unwrap();
        }

        assert_eq!(h.with_state(|s| s.held().turn()), None);
        assert_eq!(h.status().mode, GameMode::Running);
    }

    #[test]
    fn config_changes_apply_on_next_start() {
        let h = handle(Arc::new(ManualClock::new(0)));
        h.start().unwrap();

        let mut cfg = h.config();
        cfg.num_children = 5;
        h.set_config(cfg);
        assert_eq!(h.with_state(|s| s.root().unwrap().child_count()), 3);

        h.start().unwrap();
        assert_eq!(h.with_state(|s| s.root().unwrap().child_count()), 5);
    }
}
