//! Bridges the game loop worker and the egui paint cycle.
//!
//! Each egui frame posts a request; the worker's [`ChannelFrames`] turns a
//! request into a blank [`DisplayList`], and presenting it stores the list
//! for the next paint.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::time::Duration;

use parking_lot::Mutex;
use tree_core::display_list::{DisplayList, DrawCommand};
use tree_core::error::SurfaceError;
use tree_core::game_loop::FrameSource;
use tree_core::render::Color;
use tree_core::types::Point;

/// How long the worker waits for a frame request before skipping.
const REQUEST_WAIT: Duration = Duration::from_millis(50);

type Latest = Arc<Mutex<Option<DisplayList>>>;

/// UI-thread end of the frame bridge.
pub struct FrameChannel {
    requests: SyncSender<()>,
    latest: Latest,
}

/// Worker-thread end of the frame bridge.
pub struct ChannelFrames {
    requests: Receiver<()>,
    latest: Latest,
    ctx: egui::Context,
    wait: Duration,
}

impl FrameChannel {
    pub fn new(ctx: egui::Context) -> (Self, ChannelFrames) {
        Self::with_wait(ctx, REQUEST_WAIT)
    }

    fn with_wait(ctx: egui::Context, wait: Duration) -> (Self, ChannelFrames) {
        let (tx, rx) = mpsc::sync_channel(1);
        let latest: Latest = Arc::new(Mutex::new(None));
        let source = ChannelFrames {
            requests: rx,
            latest: Arc::clone(&latest),
            ctx,
            wait,
        };
        (
            Self {
                requests: tx,
                latest,
            },
            source,
        )
    }

    /// Asks the worker for a new frame. A pending request is enough.
    pub fn request(&self) {
        match self.requests.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Disconnected(())) => {
                tracing::trace!("frame requested after the worker exited");
            }
        }
    }

    /// Runs `f` on the most recently presented frame.
    pub fn with_latest<R>(&self, f: impl FnOnce(Option<&DisplayList>) -> R) -> R {
        f(self.latest.lock().as_ref())
    }
}

impl FrameSource for ChannelFrames {
    type Frame = DisplayList;

    fn acquire_frame(&mut self) -> Result<DisplayList, SurfaceError> {
        match self.requests.recv_timeout(self.wait) {
            Ok(()) => Ok(DisplayList::new()),
            Err(RecvTimeoutError::Timeout) => Err(SurfaceError::NotReady),
            Err(RecvTimeoutError::Disconnected) => Err(SurfaceError::Destroyed),
        }
    }

    fn present(&mut self, frame: DisplayList) {
        *self.latest.lock() = Some(frame);
        self.ctx.request_repaint();
    }
}

pub fn to_color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Canvas coordinates to screen coordinates.
pub fn canvas_to_screen(origin: egui::Pos2, p: Point) -> egui::Pos2 {
    egui::pos2(origin.x + p.x, origin.y + p.y)
}

/// Screen coordinates to canvas coordinates.
pub fn screen_to_canvas(origin: egui::Pos2, p: egui::Pos2) -> Point {
    Point::new(p.x - origin.x, p.y - origin.y)
}

/// Paints a recorded frame with its canvas origin at `origin`.
pub fn paint(painter: &egui::Painter, origin: egui::Pos2, list: &DisplayList) {
    for command in list.commands() {
        match *command {
            DrawCommand::Clear(color) => {
                painter.rect_filled(painter.clip_rect(), egui::CornerRadius::ZERO, to_color32(color));
            }
            DrawCommand::Line { from, to, stroke } => {
                painter.line_segment(
                    [canvas_to_screen(origin, from), canvas_to_screen(origin, to)],
                    egui::Stroke::new(stroke.width, to_color32(stroke.color)),
                );
            }
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => {
                painter.circle_filled(canvas_to_screen(origin, center), radius, to_color32(color));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_core::render::DrawSurface;

    fn channel() -> (FrameChannel, ChannelFrames) {
        FrameChannel::with_wait(egui::Context::default(), Duration::from_millis(5))
    }

    #[test]
    fn acquire_without_request_is_not_ready() {
        let (_ui, mut source) = channel();
        assert_eq!(source.acquire_frame().err(), Some(SurfaceError::NotReady));
    }

    #[test]
    fn request_yields_one_blank_frame() {
        let (ui, mut source) = channel();
        ui.request();
        ui.request();

        let frame = source.acquire_frame().unwrap();
        assert!(frame.is_empty());
        // The second request collapsed into the first.
        assert_eq!(source.acquire_frame().err(), Some(SurfaceError::NotReady));
    }

    #[test]
    fn presented_frame_becomes_latest() {
        let (ui, mut source) = channel();
        assert!(ui.with_latest(|l| l.is_none()));

        let mut frame = DisplayList::new();
        frame.clear(Color::BLACK);
        source.present(frame);

        assert_eq!(ui.with_latest(|l| l.map(DisplayList::len)), Some(1));
    }

    #[test]
    fn dropping_the_ui_end_destroys_the_surface() {
        let (ui, mut source) = channel();
        drop(ui);
        assert_eq!(source.acquire_frame().err(), Some(SurfaceError::Destroyed));
    }

    #[test]
    fn canvas_and_screen_coordinates_round_trip() {
        let origin = egui::pos2(12.0, 34.0);
        let p = Point::new(5.5, -2.0);

        let screen = canvas_to_screen(origin, p);
        assert_eq!(screen, egui::pos2(17.5, 32.0));
        assert_eq!(screen_to_canvas(origin, screen), p);
    }

    #[test]
    fn colors_keep_their_channels() {
        let c = to_color32(Color::rgb(10, 20, 30));
        assert_eq!(c, egui::Color32::from_rgb(10, 20, 30));
    }
}
