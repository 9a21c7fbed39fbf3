//! The worker that ticks and draws once per available frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::error::{LoopError, SurfaceError};
use crate::render::{DrawSurface, Renderer};
use crate::scroll::GameMode;
use crate::shared::ScrollHandle;

/// The host's drawable surface.
///
/// `acquire_frame` may block until the host can take another frame.
pub trait FrameSource: Send + 'static {
    type Frame: DrawSurface;

    fn acquire_frame(&mut self) -> Result<Self::Frame, SurfaceError>;
    fn present(&mut self, frame: Self::Frame);
}

/// Counters returned when the worker exits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Frames drawn and presented.
    pub frames: u64,
    /// Iterations skipped because no frame was available.
    pub skipped: u64,
    pub reroots: u64,
}

/// Runs update, draw, present until `running` is cleared or the surface
/// reports [`SurfaceError::Destroyed`].
///
/// The flag is only checked at the top of an iteration, so at most one
/// in-flight frame completes after it is cleared.
pub fn run_loop<S: FrameSource>(
    running: &AtomicBool,
    handle: &ScrollHandle,
    renderer: &Renderer,
    mut source: S,
) -> LoopStats {
    let mut stats = LoopStats::default();

    while running.load(Ordering::Acquire) {
        let mut frame = match source.acquire_frame() {
            Ok(frame) => frame,
            Err(SurfaceError::NotReady) => {
                stats.skipped += 1;
                tracing::trace!("frame not ready, skipping iteration");
                thread::yield_now();
                continue;
            }
            Err(SurfaceError::Destroyed) => {
                tracing::warn!("surface destroyed while the loop was running");
                break;
            }
        };

        let now = handle.now_ms();
        {
            let mut state = handle.lock();
            if state.mode() == GameMode::Running && state.tick(now).is_some() {
                stats.reroots += 1;
            }
            renderer.draw_frame(&mut frame, &state);
        }

        source.present(frame);
        stats.frames += 1;
    }

    stats
}

/// Owns the worker thread for the lifetime of one surface.
///
/// The surface must not be released until [`GameLoop::surface_destroyed`]
/// has returned; dropping the `GameLoop` does the same.
pub struct GameLoop {
    handle: ScrollHandle,
    renderer: Renderer,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<LoopStats>>,
}

impl GameLoop {
    pub fn new(handle: ScrollHandle, renderer: Renderer) -> Self {
        Self {
            handle,
            renderer,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn handle(&self) -> &ScrollHandle {
        &self.handle
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Spawns the worker for a freshly created surface.
    pub fn surface_created<S: FrameSource>(&mut self, source: S) -> Result<(), LoopError> {
        if self.worker.is_some() {
            return Err(LoopError::AlreadyRunning);
        }

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let handle = self.handle.clone();
        let renderer = self.renderer.clone();

        let spawned = thread::Builder::new()
            .name("tree-loop".into())
            .spawn(move || run_loop(&running, &handle, &renderer, source));

        match spawned {
            Ok(worker) => {
                self.worker = Some(worker);
                tracing::info!("game loop started");
                Ok(())
            }
            Err(err) => {
                self.running.store(false, Ordering::Release);
                Err(LoopError::Spawn(err))
            }
        }
    }

    pub fn surface_changed(&self, width: f32, height: f32) {
        tracing::debug!(width, height, "surface resized");
        self.handle.set_surface_size(width, height);
    }

    /// Stops the worker and waits for it to exit.
    ///
    /// Returns `None` if no worker was running or it panicked.
    pub fn surface_destroyed(&mut self) -> Option<LoopStats> {
        self.running.store(false, Ordering::Release);
        let worker = self.worker.take()?;

        match worker.join() {
            Ok(stats) => {
                tracing::info!(
                    frames = stats.frames,
                    skipped = stats.skipped,
                    reroots = stats.reroots,
                    "game loop stopped"
                );
                Some(stats)
            }
            Err(_) => {
                tracing::error!("game loop worker panicked");
                None
            }
        }
    }
}

impl Drop for GameLoop {
    fn drop(&mut self) {
        self.surface_destroyed();
    }
}
