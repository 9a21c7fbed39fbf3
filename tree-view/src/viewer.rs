//! Interactive infinite-scrolling tree viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the game loop worker and a
//! handle to the shared scroll state, and implements [`eframe::App`] to
//! forward input, issue commands and paint the frames the worker records.

use std::sync::Arc;

use eframe::App;
use tree_core::{
    clock::MonotonicClock,
    config::{BranchMode, Config, ReadjustMetric, RootSelector},
    error::StateError,
    game_loop::GameLoop,
    input::{Command, Direction, Fling, InputEvent},
    render::Renderer,
    scroll::GameMode,
    shared::ScrollHandle,
};

use crate::frames::{self, FrameChannel};

/// A drag in progress on the canvas, in screen coordinates.
#[derive(Clone, Copy, Debug)]
struct DragTrack {
    start: egui::Pos2,
    latest: egui::Pos2,
}

/// Main application state for the interactive viewer.
///
/// The game loop worker ticks and renders the shared state into display
/// lists; the viewer only paints the latest list and turns egui input into
/// commands and direction signals.
///
/// ### Fields
/// - `game_loop` - Worker thread driving physics and rendering. Declared
///   first so it is joined before the frame channel goes away.
/// - `frames` - UI end of the frame bridge to the worker.
/// - `handle` - Shared scroll state used for commands, input and status.
///
/// - `cfg` - Configuration being edited in the side panel. Applied with
///   the "Apply" button and used from the next start on.
///
/// - `canvas_size` - Last size reported to the game loop.
/// - `was_focused` - Window focus in the previous frame.
/// - `drag` - Drag gesture being tracked for swipe detection.
/// - `last_error` - Last rejected command, shown in the status bar.
pub struct Viewer {
    game_loop: GameLoop,
    frames: FrameChannel,
    handle: ScrollHandle,

    cfg: Config,

    canvas_size: Option<egui::Vec2>,
    was_focused: bool,
    drag: Option<DragTrack>,
    last_error: Option<String>,
}

impl Viewer {
    /// Creates the viewer and starts its game loop worker.
    ///
    /// The state starts in [`GameMode::Ready`]; the tree is built on the
    /// first start, once the canvas size is known.
    ///
    /// ### Parameters
    /// - `ctx` - egui context the worker asks to repaint after each frame.
    pub fn new(ctx: egui::Context) -> Self {
        let cfg = Config::default();
        let handle = ScrollHandle::new(cfg, Arc::new(MonotonicClock::default()));
        let mut game_loop = GameLoop::new(handle.clone(), Renderer::default());

        let (frames, source) = FrameChannel::new(ctx);
        let mut last_error = None;
        if let Err(err) = game_loop.surface_created(source) {
            tracing::error!(%err, "could not start the game loop");
            last_error = Some(err.to_string());
        }

        Self {
            game_loop,
            frames,
            handle,
            cfg,
            canvas_size: None,
            was_focused: true,
            drag: None,
            last_error,
        }
    }

    /// Issues a command and remembers the error if it was rejected.
    fn run_command(&mut self, command: Command) {
        self.record(self.handle.command(command));
    }

    fn record(&mut self, result: Result<(), StateError>) {
        match result {
            Ok(()) => self.last_error = None,
            Err(err) => self.last_error = Some(err.to_string()),
        }
    }

    /// Toggles between running and paused; anything else starts a new run.
    fn toggle_pause(&mut self) {
        let command = match self.handle.status().mode {
            GameMode::Running => Command::Pause,
            GameMode::Paused => Command::Resume,
            GameMode::Ready | GameMode::Lose | GameMode::Win => Command::Start,
        };
        self.run_command(command);
    }

    /// Arrow keys map to direction signals.
    fn direction_for_key(key: egui::Key) -> Option<Direction> {
        match key {
            egui::Key::ArrowUp => Some(Direction::Up),
            egui::Key::ArrowDown => Some(Direction::Down),
            egui::Key::ArrowLeft => Some(Direction::Left),
            egui::Key::ArrowRight => Some(Direction::Right),
            _ => None,
        }
    }

    /// Forwards keyboard events to the scroll state.
    ///
    /// Arrow keys become press/release signals. Enter starts a run, Space
    /// toggles pause and Escape ends the run. Key repeats are ignored.
    fn handle_events(&mut self, events: &[egui::Event]) {
        for event in events {
            let egui::Event::Key {
                key,
                pressed,
                repeat,
                ..
            } = *event
            else {
                continue;
            };
            if repeat {
                continue;
            }

            if let Some(dir) = Self::direction_for_key(key) {
                let signal = if pressed {
                    InputEvent::Press(dir)
                } else {
                    InputEvent::Release(dir)
                };
                self.handle.handle_input(signal);
                continue;
            }

            if !pressed {
                continue;
            }
            match key {
                egui::Key::Enter => self.run_command(Command::Start),
                egui::Key::Space => self.toggle_pause(),
                egui::Key::Escape => self.run_command(Command::Stop),
                _ => {}
            }
        }
    }

    /// Pauses a running game when the window loses focus.
    fn focus_changed(&mut self, focused: bool) {
        if self.was_focused && !focused {
            tracing::debug!("window lost focus");
            self.handle.pause_if_running();
        }
        self.was_focused = focused;
    }

    /// Builds a fling from a finished drag.
    ///
    /// ### Parameters
    /// - `origin` - Screen position of the canvas' top-left corner.
    /// - `drag` - Start and end of the drag in screen coordinates.
    /// - `velocity` - Pointer velocity at release, in points per second.
    ///
    /// ### Returns
    /// The gesture in canvas coordinates.
    fn fling_from_drag(origin: egui::Pos2, drag: DragTrack, velocity: egui::Vec2) -> Fling {
        Fling {
            start: frames::screen_to_canvas(origin, drag.start),
            end: frames::screen_to_canvas(origin, drag.latest),
            velocity: glam::Vec2::new(velocity.x, velocity.y),
        }
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    fn selector_label(selector: &RootSelector) -> &'static str {
        match selector {
            RootSelector::Center => "center",
            RootSelector::Fixed(_) => "fixed",
            RootSelector::Steered => "steered",
            RootSelector::Random { .. } => "random",
        }
    }

    /// Builds the top panel UI (run controls).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        let mode = self.handle.status().mode;

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("▶ Start").clicked() {
                    self.run_command(Command::Start);
                }

                let pause_label = if mode == GameMode::Paused {
                    "⏵ Resume"
                } else {
                    "⏸ Pause"
                };
                let can_toggle = matches!(mode, GameMode::Running | GameMode::Paused);
                if ui
                    .add_enabled(can_toggle, egui::Button::new(pause_label))
                    .clicked()
                {
                    self.toggle_pause();
                }

                if ui
                    .add_enabled(can_toggle, egui::Button::new("⏹ Stop"))
                    .clicked()
                {
                    self.run_command(Command::Stop);
                }

                ui.separator();
                ui.label("←/→ or swipe to steer, Enter start, Space pause, Esc stop");
            });
        });
    }

    /// Builds the bottom status bar (mode, re-roots, scroll and node counts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        let status = self.handle.status();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("branch = {:.1} px", status.branch_length));
                ui.label(format!(
                    "dir = ({:.2}, {:.2})",
                    status.direction.x, status.direction.y
                ));
                ui.label(format!(
                    "offset = ({:.1}, {:.1})",
                    status.scroll_offset.x, status.scroll_offset.y
                ));
                ui.separator();
                ui.label(format!("nodes = {}", status.node_count));
                ui.label(format!("re-roots = {}", status.reroots));
                ui.label(format!("mode = {:?}", status.mode));
                if let Some(err) = &self.last_error {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }
            });
        });
    }

    /// Builds the right-hand configuration panel.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Branching");
                Self::labeled_drag_usize(
                    ui,
                    "num_children:",
                    &mut self.cfg.num_children,
                    0..=9,
                    1.0,
                );
                Self::labeled_drag_f32(
                    ui,
                    "fan_divisor:",
                    &mut self.cfg.geometry.fan_divisor,
                    1.0..=24.0,
                    0.1,
                );
                ui.checkbox(
                    &mut self.cfg.geometry.quadrant_correction,
                    "quadrant correction",
                );
                egui::ComboBox::from_label("node mode")
                    .selected_text(format!("{:?}", self.cfg.geometry.mode))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(
                            &mut self.cfg.geometry.mode,
                            BranchMode::Position,
                            "Position",
                        );
                        ui.selectable_value(
                            &mut self.cfg.geometry.mode,
                            BranchMode::Displacement,
                            "Displacement",
                        );
                    });

                ui.separator();
                ui.label("Scrolling");
                Self::labeled_drag_f32(ui, "speed:", &mut self.cfg.speed, 0.0..=500.0, 1.0);
                Self::labeled_drag_f32(
                    ui,
                    "bottom_margin:",
                    &mut self.cfg.bottom_margin,
                    0.0..=500.0,
                    1.0,
                );

                let mut fixed_length = self.cfg.branch_length.is_some();
                ui.checkbox(&mut fixed_length, "fixed branch length");
                match (fixed_length, self.cfg.branch_length) {
                    (true, None) => self.cfg.branch_length = Some(40.0),
                    (false, Some(_)) => self.cfg.branch_length = None,
                    _ => {}
                }
                if let Some(length) = self.cfg.branch_length.as_mut() {
                    Self::labeled_drag_f32(ui, "branch_length:", length, 1.0..=400.0, 0.5);
                }

                ui.horizontal(|ui| {
                    ui.label("resume_grace_ms:");
                    ui.add(
                        egui::DragValue::new(&mut self.cfg.resume_grace_ms)
                            .range(0..=2_000)
                            .speed(5.0),
                    );
                });

                ui.horizontal(|ui| {
                    ui.label("max_step_ms:");
                    ui.add(
                        egui::DragValue::new(&mut self.cfg.max_step_ms)
                            .range(1..=2_000)
                            .speed(5.0),
                    );
                });

                egui::ComboBox::from_label("re-root metric")
                    .selected_text(format!("{:?}", self.cfg.readjust_metric))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(
                            &mut self.cfg.readjust_metric,
                            ReadjustMetric::Euclidean,
                            "Euclidean",
                        );
                        ui.selectable_value(
                            &mut self.cfg.readjust_metric,
                            ReadjustMetric::Vertical,
                            "Vertical",
                        );
                    });

                ui.separator();
                ui.label("Next root");
                egui::ComboBox::from_label("selector")
                    .selected_text(Self::selector_label(&self.cfg.root_selector))
                    .show_ui(ui, |ui| {
                        let selector = &mut self.cfg.root_selector;
                        ui.selectable_value(selector, RootSelector::Steered, "steered");
                        ui.selectable_value(selector, RootSelector::Center, "center");
                        ui.selectable_value(selector, RootSelector::Fixed(0), "fixed");
                        ui.selectable_value(selector, RootSelector::Random { seed: 0 }, "random");
                    });
                match &mut self.cfg.root_selector {
                    RootSelector::Fixed(index) => {
                        Self::labeled_drag_usize(ui, "index:", index, 0..=8, 1.0);
                    }
                    RootSelector::Random { seed } => {
                        ui.horizontal(|ui| {
                            ui.label("seed:");
                            ui.add(egui::DragValue::new(seed));
                        });
                    }
                    RootSelector::Center | RootSelector::Steered => {}
                }

                ui.separator();
                ui.label("Swipe");
                Self::labeled_drag_f32(
                    ui,
                    "min_distance:",
                    &mut self.cfg.swipe.min_distance,
                    0.0..=500.0,
                    1.0,
                );
                Self::labeled_drag_f32(
                    ui,
                    "max_off_path:",
                    &mut self.cfg.swipe.max_off_path,
                    0.0..=1000.0,
                    1.0,
                );
                Self::labeled_drag_f32(
                    ui,
                    "min_velocity:",
                    &mut self.cfg.swipe.min_velocity,
                    0.0..=5000.0,
                    10.0,
                );

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Apply").clicked() {
                        self.handle.set_config(self.cfg);
                    }
                    if ui.button("Reset cfg to default").clicked() {
                        self.cfg = Config::default();
                    }
                });
                ui.small("Applied settings take effect on the next start.");
            });
    }

    /// Builds the central panel where the latest frame is painted and drag
    /// gestures are tracked.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let response =
                    ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
                let rect = response.rect;
                let painter = ui.painter_at(rect);

                if self.canvas_size != Some(rect.size()) {
                    self.canvas_size = Some(rect.size());
                    self.game_loop.surface_changed(rect.width(), rect.height());
                }

                // Swipe tracking.
                if response.drag_started()
                    && let Some(pos) = response.interact_pointer_pos()
                {
                    self.drag = Some(DragTrack {
                        start: pos,
                        latest: pos,
                    });
                }
                if response.dragged()
                    && let (Some(drag), Some(pos)) =
                        (self.drag.as_mut(), response.interact_pointer_pos())
                {
                    drag.latest = pos;
                }
                if response.drag_stopped()
                    && let Some(drag) = self.drag.take()
                {
                    let velocity = ctx.input(|i| i.pointer.velocity());
                    let fling = Self::fling_from_drag(rect.min, drag, velocity);
                    self.handle.handle_input(InputEvent::Fling(fling));
                }

                self.frames.with_latest(|latest| {
                    if let Some(list) = latest {
                        frames::paint(&painter, rect.min, list);
                    }
                });

                let banner = match self.handle.status().mode {
                    GameMode::Running => None,
                    GameMode::Ready => Some("Press Enter to start"),
                    GameMode::Paused => Some("Paused"),
                    GameMode::Lose => Some("Game over"),
                    GameMode::Win => Some("You win"),
                };
                if let Some(text) = banner {
                    painter.text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        text,
                        egui::FontId::proportional(24.0),
                        egui::Color32::WHITE,
                    );
                }
            });
    }
}

impl App for Viewer {
    /// eframe callback that handles input, builds all panels and asks the
    /// worker for the next frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let focused = ctx.input(|i| i.focused);
        self.focus_changed(focused);

        if !ctx.wants_keyboard_input() {
            let events = ctx.input(|i| i.events.clone());
            self.handle_events(&events);
        }

        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);

        self.frames.request();
        ctx.request_repaint();
    }
}
