//! Interactive cosmic string playback built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns an evolved [`Ensemble`] and
//! its [`Config`] and implements [`eframe::App`] to play the precomputed
//! frames back under a fixed oblique projection of the box.

use eframe::App;
use glam::{DVec3, Vec2};
use string_core::{
    config::Config,
    ensemble::{CurveKind, Ensemble},
};

/// Main application state for the viewer.
///
/// [`Viewer`] glues together:
/// - The simulation output: an [`Ensemble`] built from a [`Config`].
/// - View settings (projection angles, pan/zoom, playback timing).
/// - eframe/egui callbacks for drawing and user interaction.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, call [`Viewer::step_once`].
/// 3. Draw the box and every curve visible in the current frame.
///
/// ### Fields
/// - `ensemble` - Evolved strings, or `None` after a clear or failed run.
/// - `cfg` - Configuration edited in the side panel; used on regenerate.
/// - `last_error` - Message of the last failed generation, if any.
///
/// - `frame` - Time index currently shown.
/// - `running` - Whether playback is currently auto-advancing.
/// - `azimuth`, `elevation` - Projection angles in degrees.
/// - `zoom` - Pixels per world unit.
/// - `pan` - Screen-space pan offset in pixels.
///
/// - `step_interval` - Target time between automatic frame advances (seconds).
/// - `last_step_time` - Time stamp of the last advance (egui time).
/// - `last_step_dt` - Actual time delta between the last two advances.
pub struct Viewer {
    ensemble: Option<Ensemble>,
    cfg: Config,
    last_error: Option<String>,

    frame: usize,
    running: bool,
    azimuth: f32,
    elevation: f32,
    zoom: f32,
    pan: egui::Vec2,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a viewer and generates the default ensemble.
    ///
    /// The camera looks down at 45° from azimuth −45°.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a viewer for `cfg` and generates its ensemble right away.
    pub fn with_config(cfg: Config) -> Self {
        let mut viewer = Self {
            ensemble: None,
            cfg,
            last_error: None,
            frame: 0,
            running: false,
            azimuth: -45.0,
            elevation: 45.0,
            zoom: 12.0,
            pan: egui::vec2(0.0, 0.0),
            step_interval: 1.0 / 12.0,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        };
        viewer.reset();
        viewer
    }

    /// Regenerates the ensemble from the current configuration.
    ///
    /// Keeps the camera settings, rewinds to frame 0 and stops playback.
    /// A failed generation leaves no ensemble and records the error.
    fn reset(&mut self) {
        self.frame = 0;
        self.running = false;
        match Ensemble::generate(&self.cfg) {
            Ok(ensemble) => {
                self.ensemble = Some(ensemble);
                self.last_error = None;
            }
            Err(e) => {
                log::error!("ensemble generation failed: {e}");
                self.ensemble = None;
                self.last_error = Some(e.to_string());
            }
        }
    }

    /// Drops the current ensemble.
    fn clear(&mut self) {
        self.ensemble = None;
        self.frame = 0;
        self.running = false;
    }

    fn frame_count(&self) -> usize {
        self.ensemble.as_ref().map_or(0, Ensemble::frame_count)
    }

    /// Advances playback by one frame, wrapping to the start after the
    /// last frame.
    fn step_once(&mut self) {
        let frames = self.frame_count();
        if frames == 0 {
            self.frame = 0;
            return;
        }
        self.frame = (self.frame + 1) % frames;
    }

    /// Projects a world point onto the view plane.
    ///
    /// The view plane is spanned by the camera's right and up vectors for
    /// the current azimuth and elevation; depth is dropped.
    fn project(&self, p: DVec3) -> Vec2 {
        let az = (self.azimuth as f64).to_radians();
        let el = (self.elevation as f64).to_radians();
        let right = DVec3::new(-az.sin(), az.cos(), 0.0);
        let up = DVec3::new(-az.cos() * el.sin(), -az.sin() * el.sin(), el.cos());
        Vec2::new(p.dot(right) as f32, p.dot(up) as f32)
    }

    /// Converts a view-plane position to screen-space.
    ///
    /// View coordinates are scaled by `zoom`, offset by `pan`, and then
    /// centered inside the given `rect`. The y-axis is flipped so that
    /// positive y goes up on screen.
    fn view_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::view_to_screen`] (up to floating point rounding).
    fn screen_to_view(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

    fn world_to_screen(&self, p: DVec3, rect: egui::Rect) -> egui::Pos2 {
        self.view_to_screen(self.project(p), rect)
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

    /// Helper to draw a labeled `f64` [`egui::DragValue`].
    fn labeled_drag_f64(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f64,
        range: std::ops::RangeInclusive<f64>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (playback controls, frame slider, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Play" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.01..=1.0)
                        .speed(0.01),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Regenerate").clicked() {
                    self.reset();
                }

                if ui.button("Clear").clicked() {
                    self.clear();
                }

                ui.separator();
                let last = self.frame_count().saturating_sub(1);
                ui.add(egui::Slider::new(&mut self.frame, 0..=last).text("Frame"));

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 1.0..=60.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (time, curve counts, last error).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();

                if let Some(ens) = &self.ensemble {
                    let step = ens.config().step;
                    let loops_born = ens
                        .strings()
                        .iter()
                        .flat_map(|s| s.loops())
                        .filter(|lp| lp.birth_index() <= self.frame)
                        .count();
                    ui.label(format!("loops = {loops_born}"));
                    ui.label(format!("strings = {}", ens.strings().len()));
                    ui.label(format!("t = {}δ ({:.2})", self.frame, self.frame as f64 * step));
                }

                if let Some(err) = &self.last_error {
                    ui.colored_label(egui::Color32::RED, err);
                }
            });
        });
    }

    /// Builds the right-hand configuration panel for run and view settings.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Box");
                Self::labeled_drag_usize(
                    ui,
                    "lattice_size:",
                    &mut self.cfg.lattice_size,
                    1..=256,
                    1.0,
                );
                Self::labeled_drag_f64(ui, "step:", &mut self.cfg.step, 0.05..=4.0, 0.05);

                ui.separator();
                ui.label("Walk");
                Self::labeled_drag_usize(ui, "repeat:", &mut self.cfg.repeat, 1..=64, 1.0);

                ui.separator();
                ui.label("Run");
                Self::labeled_drag_usize(
                    ui,
                    "string_count:",
                    &mut self.cfg.string_count,
                    0..=64,
                    1.0,
                );
                Self::labeled_drag_usize(
                    ui,
                    "frame_count:",
                    &mut self.cfg.frame_count,
                    0..=1000,
                    1.0,
                );
                ui.checkbox(&mut self.cfg.self_intersect, "self-intersection");
                ui.checkbox(&mut self.cfg.save_animation, "save animation");

                ui.separator();
                ui.label("View");
                ui.add(egui::Slider::new(&mut self.azimuth, -180.0..=180.0).text("azimuth"));
                ui.add(egui::Slider::new(&mut self.elevation, -90.0..=90.0).text("elevation"));

                ui.separator();
                if ui.button("Regenerate").clicked() {
                    self.reset();
                }
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = Config::default();
                }
            });
    }

    /// Draws the twelve edges of the enclosing box.
    fn draw_box(&self, painter: &egui::Painter, rect: egui::Rect, half_width: f64) {
        let stroke = egui::Stroke::new(0.5, egui::Color32::DARK_GRAY);
        let corner = |k: usize| {
            let s = |bit: usize| if k & bit != 0 { half_width } else { -half_width };
            DVec3::new(s(1), s(2), s(4))
        };
        for a in 0..8 {
            for bit in [1, 2, 4] {
                if a & bit == 0 {
                    let pa = self.world_to_screen(corner(a), rect);
                    let pb = self.world_to_screen(corner(a | bit), rect);
                    painter.line_segment([pa, pb], stroke);
                }
            }
        }
    }

    /// Builds the central panel where the box and the curves are drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                let delta = response.drag_delta();
                self.pan += delta;
            }

            // Zoom around the mouse cursor.
            if ui.ctx().input(|i| i.raw_scroll_delta.y != 0.0) {
                let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    let pointer_screen = response.hover_pos().unwrap_or(rect.center());

                    let view_before = self.screen_to_view(pointer_screen, rect);

                    let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                    self.zoom = (self.zoom * factor).clamp(1.0, 60.0);

                    let screen_after = self.view_to_screen(view_before, rect);

                    let delta = pointer_screen - screen_after;
                    self.pan += delta;
                }
            }

            if let Some(ens) = &self.ensemble {
                self.draw_box(&painter, rect, ens.config().half_width());

                for line in ens.frame_polylines(self.frame) {
                    let color = match line.kind {
                        CurveKind::String => egui::Color32::LIGHT_BLUE,
                        CurveKind::Loop => egui::Color32::LIGHT_RED,
                    };
                    let points: Vec<egui::Pos2> = line
                        .points
                        .iter()
                        .map(|&p| self.world_to_screen(p, rect))
                        .collect();
                    painter.add(egui::Shape::line(points, egui::Stroke::new(1.0, color)));
                }
            }

            // Auto-advance playback if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    ///
    /// This method:
    /// - Renders the top control bar and status bar.
    /// - Renders the config side panel.
    /// - Draws the central view and handles pan/zoom.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
