//! Core of the infinite scrolling tree.
//!
//! Main components:
//! - [`tree`] - tree nodes and the branching rule.
//! - [`scroll`] - scroll physics, re-rooting and the run state machine.
//! - [`render`] - recursive traversal onto a [`render::DrawSurface`].
//! - [`display_list`] - a recording draw surface.
//! - [`game_loop`] - the worker ticking and drawing once per frame.
//! - [`shared`] - the lock-guarded handle used from every thread.
//! - [`input`] - direction signals, swipes and commands.
//! - [`config`] - tunables for generation and scrolling.
//! - [`clock`] - millisecond time sources.
//! - [`error`] - error types.
//! - [`point`] / [`types`] - shared vector helpers and aliases.

pub mod clock;
pub mod config;
pub mod display_list;
pub mod error;
pub mod game_loop;
pub mod input;
pub mod point;
pub mod render;
pub mod scroll;
pub mod shared;
pub mod tree;
pub mod types;
