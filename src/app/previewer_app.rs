//! Main previewer application
//!
//! Implements the egui App trait: draws the layout with scrolling reels,
//! the preset timeline and the transport controls.

use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Receiver;
use egui::{Align2, Color32, FontId, Pos2, RichText, Sense, Stroke, Vec2};
use tracing::{info, warn};

use slotforge::animation::{ChannelObserver, PhaseTransition, ReelMotionState, SequencerEvent};
use slotforge::config::{
    LayoutElement, Orientation, PresetPhase, Rect, SlotManifest, SpeedMode, StopPattern,
};
use slotforge::render::{ReelStrip, DEFAULT_STRIP_LENGTH};
use slotforge::timeline::{
    ClockTick, ElementTransform, FrameState, PlaybackBridge, PlaybackMode,
};

use super::palette::{blurred, element_fill, parse_hex_color, symbol_fill};
use super::state::{EventLog, LogKind};

const STOP_PATTERNS: [StopPattern; 3] = [
    StopPattern::Sequential,
    StopPattern::Slam,
    StopPattern::Anticipation,
];

const EDITABLE_PHASES: [PresetPhase; 5] = [
    PresetPhase::Spin,
    PresetPhase::Decelerate,
    PresetPhase::Align,
    PresetPhase::Settle,
    PresetPhase::Interval,
];

const TRACK_HEIGHT: f32 = 26.0;
const TRACK_LABEL_WIDTH: f32 = 90.0;

/// Seed for the cosmetic symbol strips
const STRIP_SEED: u64 = 0x5107_F0E6;

pub struct PreviewerApp {
    manifest: SlotManifest,
    bridge: PlaybackBridge,
    strips: Vec<ReelStrip>,

    /// Phase transitions from the reel controllers
    phase_rx: Receiver<PhaseTransition>,
    log: EventLog,

    /// Last frame time for clock ticks
    last_frame_time: Instant,
    started_at: Instant,

    orientation: Orientation,
    show_frame_state: bool,
    last_error: Option<String>,
}

impl PreviewerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        manifest: SlotManifest,
        mut bridge: PlaybackBridge,
    ) -> Self {
        let (observer, phase_rx) = ChannelObserver::channel();
        bridge.set_observer(Some(Arc::new(observer)));

        let strips = (0..manifest.reel_count())
            .map(|reel| ReelStrip::generate(reel, DEFAULT_STRIP_LENGTH, STRIP_SEED))
            .collect();
        let orientation = manifest.meta.orientation;

        info!(
            "Previewer ready: {} reels, {} mode, {:?} stops",
            manifest.reel_count(),
            bridge.speed_mode(),
            bridge.stop_pattern()
        );

        let now = Instant::now();
        Self {
            manifest,
            bridge,
            strips,
            phase_rx,
            log: EventLog::default(),
            last_frame_time: now,
            started_at: now,
            orientation,
            show_frame_state: false,
            last_error: None,
        }
    }

    fn record(&mut self, events: Vec<SequencerEvent>) {
        for event in &events {
            self.log.push_event(event);
        }
    }

    fn drain_transitions(&mut self) {
        for transition in self.phase_rx.try_iter() {
            self.log.push_transition(&transition);
        }
    }

    fn advance_clock(&mut self) {
        let now = Instant::now();
        let delta_ms = now.duration_since(self.last_frame_time).as_secs_f64() * 1000.0;
        let absolute_ms = now.duration_since(self.started_at).as_secs_f64() * 1000.0;
        self.last_frame_time = now;

        let events = self.bridge.tick(ClockTick::new(absolute_ms, delta_ms));
        self.record(events);
    }

    fn edit_phase(&mut self, phase: PresetPhase, duration_ms: f64) {
        match self.bridge.update_phase_duration(phase, duration_ms) {
            Ok(()) => self.last_error = None,
            Err(e) => {
                warn!("Rejected {} edit: {}", phase.field_name(), e);
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        ui.heading(RichText::new(&self.manifest.meta.project_name).color(Color32::LIGHT_GRAY));
        ui.separator();

        // Transport
        ui.horizontal(|ui| {
            if self.bridge.playback_mode() == PlaybackMode::Playing {
                if ui.button("Pause").clicked() {
                    self.bridge.pause();
                }
            } else if ui.button("Play").clicked() {
                self.last_frame_time = Instant::now();
                let events = self.bridge.play();
                self.record(events);
            }

            if ui.button("Stop").clicked() {
                self.bridge.stop();
                self.log.clear();
            }
        });

        ui.horizontal(|ui| {
            if ui.button("Stop Reels").clicked() {
                let events = self.bridge.request_stop();
                self.record(events);
            }
            if ui.button("Instant Stop").clicked() {
                let events = self.bridge.request_instant_stop();
                self.record(events);
            }
        });

        ui.separator();

        let mut mode = self.bridge.speed_mode();
        ui.horizontal(|ui| {
            ui.label("Speed:");
            egui::ComboBox::from_id_salt("speed_mode")
                .selected_text(mode.name())
                .show_ui(ui, |ui| {
                    for candidate in SpeedMode::ALL {
                        ui.selectable_value(&mut mode, candidate, candidate.name());
                    }
                });
        });
        if mode != self.bridge.speed_mode() {
            self.bridge.set_speed_mode(mode);
            self.log.clear();
        }

        let mut pattern = self.bridge.stop_pattern();
        ui.horizontal(|ui| {
            ui.label("Stops:");
            egui::ComboBox::from_id_salt("stop_pattern")
                .selected_text(format!("{:?}", pattern))
                .show_ui(ui, |ui| {
                    for candidate in STOP_PATTERNS {
                        ui.selectable_value(&mut pattern, candidate, format!("{:?}", candidate));
                    }
                });
        });
        if pattern != self.bridge.stop_pattern() {
            self.bridge.set_stop_pattern(pattern);
            self.log.clear();
        }

        ui.horizontal(|ui| {
            ui.radio_value(&mut self.orientation, Orientation::Landscape, "Landscape");
            ui.radio_value(&mut self.orientation, Orientation::Portrait, "Portrait");
        });
        ui.checkbox(&mut self.show_frame_state, "Show evaluated frame");

        ui.separator();

        let mut playhead = self.bridge.current_time();
        let total = self.bridge.total_duration();
        let scrubbed = ui
            .add(egui::Slider::new(&mut playhead, 0.0..=total).suffix(" ms").text("Time"))
            .changed();
        if scrubbed {
            self.bridge.scrub(playhead);
        }

        ui.separator();
        ui.label(RichText::new("Preset").strong());

        let preset = self.bridge.preset();
        let mut edits = Vec::new();
        egui::Grid::new("phase_durations").num_columns(2).show(ui, |ui| {
            for phase in EDITABLE_PHASES {
                let mut value = preset.duration(phase);
                ui.label(phase.label());
                let changed = ui
                    .add(
                        egui::DragValue::new(&mut value)
                            .range(0.0..=10_000.0)
                            .speed(5.0)
                            .suffix(" ms"),
                    )
                    .changed();
                if changed {
                    edits.push((phase, value));
                }
                ui.end_row();
            }
        });
        for (phase, value) in edits {
            self.edit_phase(phase, value);
        }

        if let Some(error) = &self.last_error {
            ui.label(RichText::new(error).color(Color32::LIGHT_RED).small());
        }

        ui.separator();
        ui.label(
            RichText::new(format!(
                "{} | {:.0} / {:.0} ms",
                self.bridge.playback_mode().display_name(),
                self.bridge.current_time(),
                total
            ))
            .color(Color32::GRAY)
            .small(),
        );
        for (reel, state) in self.bridge.reel_states().iter().enumerate() {
            ui.label(
                RichText::new(format!(
                    "Reel {}: {} | {:.0}px | {:.0}px/s",
                    reel + 1,
                    state.status,
                    state.position,
                    state.speed
                ))
                .color(if state.status.is_moving() {
                    Color32::LIGHT_GREEN
                } else {
                    Color32::DARK_GRAY
                })
                .small(),
            );
        }
    }

    fn render_timeline(&mut self, ui: &mut egui::Ui) {
        let timeline = self.bridge.timeline();
        let total = timeline.total_duration.max(1.0);
        let height = TRACK_HEIGHT * timeline.tracks.len() as f32;
        let width = ui.available_width();

        let (response, painter) =
            ui.allocate_painter(Vec2::new(width, height), Sense::click_and_drag());
        let area = response.rect;
        let lane_left = area.left() + TRACK_LABEL_WIDTH;
        let lane_width = (area.width() - TRACK_LABEL_WIDTH).max(1.0);
        let to_x = |ms: f64| lane_left + (ms / total) as f32 * lane_width;

        for (row, track) in timeline.tracks.iter().enumerate() {
            let top = area.top() + row as f32 * TRACK_HEIGHT;
            let lane = egui::Rect::from_min_size(
                Pos2::new(lane_left, top),
                Vec2::new(lane_width, TRACK_HEIGHT - 2.0),
            );
            painter.rect_filled(lane, 2.0, Color32::from_gray(30));
            painter.text(
                Pos2::new(area.left() + 4.0, top + TRACK_HEIGHT / 2.0),
                Align2::LEFT_CENTER,
                &track.label,
                FontId::proportional(12.0),
                Color32::GRAY,
            );

            for block in timeline.blocks_on(&track.id) {
                let rect = egui::Rect::from_min_max(
                    Pos2::new(to_x(block.start), lane.top() + 2.0),
                    Pos2::new(to_x(block.end()), lane.bottom() - 2.0),
                );
                let color = parse_hex_color(&block.color).unwrap_or(Color32::GRAY);
                painter.rect_filled(rect, 3.0, color.gamma_multiply(0.8));
                painter.with_clip_rect(rect).text(
                    rect.left_center() + Vec2::new(4.0, 0.0),
                    Align2::LEFT_CENTER,
                    &block.label,
                    FontId::proportional(11.0),
                    Color32::BLACK,
                );
            }
        }

        let playhead_x = to_x(timeline.current_time);
        painter.line_segment(
            [
                Pos2::new(playhead_x, area.top()),
                Pos2::new(playhead_x, area.bottom()),
            ],
            Stroke::new(2.0, Color32::from_rgb(239, 68, 68)),
        );

        if response.clicked() || response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                let ms = ((pos.x - lane_left) / lane_width) as f64 * total;
                self.bridge.scrub(ms);
            }
        }
    }

    fn render_log(&self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for entry in self.log.entries() {
                    let color = match entry.kind {
                        LogKind::Phase(_) => Color32::GRAY,
                        LogKind::ReelStopped => Color32::LIGHT_BLUE,
                        LogKind::AllStopped => Color32::LIGHT_GREEN,
                    };
                    ui.label(
                        RichText::new(format!("{:>7.1}ms  {}", entry.at_ms, entry.text))
                            .color(color)
                            .monospace()
                            .small(),
                    );
                }
            });
    }

    fn render_stage(&self, ui: &mut egui::Ui) {
        let resolution = &self.manifest.meta.base_resolution;
        let (stage_w, stage_h) = match self.orientation {
            Orientation::Landscape => (resolution.w, resolution.h),
            Orientation::Portrait => (resolution.h, resolution.w),
        };

        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, Sense::hover());
        let fit = StageFit::new(stage_w, stage_h, response.rect);
        let stage = fit.to_screen(&Rect::new(0.0, 0.0, stage_w, stage_h));
        painter.rect_filled(stage, 0.0, Color32::BLACK);

        let frame = self.bridge.frame_state(&self.manifest.layout_elements);
        let reel_states = self.bridge.reel_states();
        let symbol_height = self.bridge.symbol_height();

        let mut reels_drawn = false;
        for element in self.manifest.sorted_elements() {
            if element.is_symbol() {
                // every symbol cell is covered by its reel column
                if !reels_drawn {
                    self.render_reels(&painter, &fit, &frame, &reel_states, symbol_height);
                    reels_drawn = true;
                }
                continue;
            }

            let rect = fit.to_screen(&element.rect(self.orientation));
            painter.rect_filled(rect, 4.0, element_fill(element.element_type));
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                &element.name,
                FontId::proportional(12.0),
                Color32::from_white_alpha(90),
            );
        }

        if self.show_frame_state {
            for element in self.manifest.layout_elements.iter().filter(|e| e.is_symbol()) {
                let transform = frame.get(&element.id).copied().unwrap_or_default();
                let mut rect = element.rect(self.orientation);
                rect.y += transform.offset_y;
                painter.rect_stroke(
                    fit.to_screen(&rect),
                    2.0,
                    Stroke::new(1.0, Color32::from_rgb(251, 191, 36)),
                );
            }
        }
    }

    fn render_reels(
        &self,
        painter: &egui::Painter,
        fit: &StageFit,
        frame: &FrameState,
        reel_states: &[ReelMotionState],
        symbol_height: f64,
    ) {
        let cell_h = self.manifest.grid.cell_h;
        for (reel, strip) in self.strips.iter().enumerate() {
            let Some((column, first)) =
                reel_column(&self.manifest.layout_elements, reel, self.orientation)
            else {
                continue;
            };
            let position = reel_states.get(reel).map(|s| s.position).unwrap_or(0.0);
            let transform = frame.get(&first).copied().unwrap_or(ElementTransform::STATIC);

            let clip = fit.to_screen(&column);
            let reel_painter = painter.with_clip_rect(clip);
            reel_painter.rect_filled(clip, 0.0, Color32::from_rgb(16, 18, 26));

            let rows = (column.h / symbol_height).ceil() as usize + 1;
            for visible in strip.visible_symbols(position, symbol_height, rows) {
                let tile_h = cell_h * transform.scale_y;
                let tile = Rect::new(
                    column.x,
                    column.y + visible.y + (cell_h - tile_h) / 2.0,
                    column.w,
                    tile_h,
                );
                let screen = fit.to_screen(&tile);
                let color = blurred(symbol_fill(visible.symbol), transform.blur)
                    .gamma_multiply(transform.opacity as f32);
                reel_painter.rect_filled(screen, 6.0, color);
                reel_painter.text(
                    screen.center(),
                    Align2::CENTER_CENTER,
                    visible.symbol,
                    FontId::proportional((28.0 * fit.scale).max(6.0)),
                    Color32::WHITE,
                );
            }
        }
    }
}

impl eframe::App for PreviewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.bridge.playback_mode() == PlaybackMode::Playing {
            self.advance_clock();
        } else {
            self.last_frame_time = Instant::now();
        }
        self.drain_transitions();

        egui::SidePanel::left("controls")
            .resizable(false)
            .min_width(240.0)
            .show(ctx, |ui| self.render_controls(ui));

        egui::TopBottomPanel::bottom("timeline")
            .resizable(true)
            .min_height(180.0)
            .show(ctx, |ui| {
                self.render_timeline(ui);
                ui.separator();
                self.render_log(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| self.render_stage(ui));

        // Request repaint if playing
        if self.bridge.playback_mode() == PlaybackMode::Playing {
            ctx.request_repaint();
        }
    }
}

/// Uniform scale from stage pixels into a screen rectangle, centered
#[derive(Debug, Clone, Copy)]
struct StageFit {
    scale: f32,
    origin: Pos2,
}

impl StageFit {
    fn new(stage_w: f64, stage_h: f64, target: egui::Rect) -> Self {
        let stage_w = stage_w.max(1.0) as f32;
        let stage_h = stage_h.max(1.0) as f32;
        let scale = (target.width() / stage_w).min(target.height() / stage_h).max(0.0);
        let size = Vec2::new(stage_w * scale, stage_h * scale);
        Self {
            scale,
            origin: target.center() - size / 2.0,
        }
    }

    fn to_screen(&self, rect: &Rect) -> egui::Rect {
        egui::Rect::from_min_size(
            self.origin + Vec2::new(rect.x as f32, rect.y as f32) * self.scale,
            Vec2::new(rect.w as f32, rect.h as f32) * self.scale,
        )
    }
}

/// Bounding box of a reel's symbol cells, and the id of its first cell
fn reel_column(
    elements: &[LayoutElement],
    reel: usize,
    orientation: Orientation,
) -> Option<(Rect, String)> {
    let mut cells = elements
        .iter()
        .filter(|e| e.is_symbol() && e.reel_index() == reel);
    let first = cells.next()?;
    let mut bounds = first.rect(orientation);
    for cell in cells {
        let rect = cell.rect(orientation);
        let right = (bounds.x + bounds.w).max(rect.x + rect.w);
        let bottom = (bounds.y + bounds.h).max(rect.y + rect.h);
        bounds.x = bounds.x.min(rect.x);
        bounds.y = bounds.y.min(rect.y);
        bounds.w = right - bounds.x;
        bounds.h = bottom - bounds.y;
    }
    Some((bounds, first.id.clone()))
}
