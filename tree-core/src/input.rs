//! Direction signals, swipe gestures and commands delivered by the host.

use glam::Vec2;

use crate::config::SwipeConfig;
use crate::types::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Side chosen at the next fork.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

/// A finished drag gesture in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fling {
    pub start: Point,
    pub end: Point,
    /// Release velocity in pixels per second.
    pub velocity: Vec2,
}

impl Fling {
    /// Interprets the gesture as a horizontal swipe.
    ///
    /// Gestures that travel too far vertically, too little horizontally, or
    /// too slowly are not swipes. A negative horizontal velocity is a
    /// right-to-left swipe, i.e. a left turn.
    pub fn classify(&self, cfg: &SwipeConfig) -> Option<Turn> {
        let vertical = (self.start.y - self.end.y).abs();
        let horizontal = (self.start.x - self.end.x).abs();

        if vertical > cfg.max_off_path {
            return None;
        }
        if horizontal > cfg.min_distance && self.velocity.x.abs() > cfg.min_velocity {
            return Some(if self.velocity.x < 0.0 {
                Turn::Left
            } else {
                Turn::Right
            });
        }
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Press(Direction),
    Release(Direction),
    Fling(Fling),
}

/// Commands the host menu can issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Resume,
    /// Ends the run as a loss.
    Stop,
}

/// Currently held direction keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirectionFlags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionFlags {
    pub fn set(&mut self, dir: Direction, held: bool) {
        match dir {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    /// Turn requested by the held horizontal keys; none when both or
    /// neither are held.
    pub fn turn(&self) -> Option<Turn> {
        match (self.left, self.right) {
            (true, false) => Some(Turn::Left),
            (false, true) => Some(Turn::Right),
            _ => None,
        }
    }
}
