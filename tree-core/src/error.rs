use crate::input::Command;
use crate::scroll::GameMode;

/// Rejected [`crate::scroll::ScrollState`] commands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("cannot {command:?} while {from:?}")]
    InvalidTransition { from: GameMode, command: Command },
    #[error("canvas size is unknown and the config does not fix origin and branch length")]
    SurfaceSizeUnknown,
}

/// Why a frame could not be acquired from a [`crate::game_loop::FrameSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// No frame is available right now; try again next iteration.
    #[error("surface is not ready")]
    NotReady,
    /// The surface is gone and must not be drawn to again.
    #[error("surface was destroyed")]
    Destroyed,
}

#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    #[error("game loop worker is already running")]
    AlreadyRunning,
    #[error("failed to spawn game loop worker: {0}")]
    Spawn(#[from] std::io::Error),
}
