use std::time::Instant;

use eframe::egui;

use crate::pipeline::MediaPipeline;
use crate::player::controller::PlaybackController;
use crate::ui::widgets::{PlayerWidgets, UiSignal};

const SEEK_BAR_WIDTH: f32 = 200.0;

/// The player window. Each frame is one dispatch turn of the controller.
pub struct PlayerWindow<P: MediaPipeline> {
    controller: PlaybackController<P>,
    now_playing: String,
    /// Slider position while the user drags it.
    scrub_value: Option<f64>,
}

impl<P: MediaPipeline> PlayerWindow<P> {
    pub fn new(controller: PlaybackController<P>, now_playing: String) -> Self {
        Self {
            controller,
            now_playing,
            scrub_value: None,
        }
    }
}

impl<P: MediaPipeline> eframe::App for PlayerWindow<P> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Q)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        let now = Instant::now();
        self.controller.dispatch(now);

        let mut signals = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.group(|ui| {
                ui.label(egui::RichText::new("Player").strong());
                ui.vertical_centered(|ui| {
                    ui.label(&self.now_playing);
                });
                ui.horizontal(|ui| {
                    controls(
                        ui,
                        self.controller.widgets(),
                        &mut self.scrub_value,
                        &mut signals,
                    );
                });
            });
        });

        for signal in signals {
            self.controller.handle_signal(signal);
        }

        if let Some(wait) = self.controller.next_wakeup(now) {
            ctx.request_repaint_after(wait);
        }
    }
}

fn controls(
    ui: &mut egui::Ui,
    widgets: &PlayerWidgets,
    scrub_value: &mut Option<f64>,
    signals: &mut Vec<UiSignal>,
) {
    let playpause = egui::Button::new(widgets.playpause_icon.glyph());
    if ui
        .add_enabled(widgets.playpause_sensitive, playpause)
        .on_hover_text(widgets.playpause_icon.icon_name())
        .clicked()
    {
        signals.push(UiSignal::PlayPauseClicked);
    }
    if ui
        .add_enabled(widgets.stop_sensitive, egui::Button::new("⏹"))
        .clicked()
    {
        signals.push(UiSignal::StopClicked);
    }
    if ui
        .add_enabled(widgets.skip_backward_sensitive, egui::Button::new("⏮"))
        .clicked()
    {
        signals.push(UiSignal::SkipBackwardClicked);
    }
    if ui
        .add_enabled(widgets.skip_forward_sensitive, egui::Button::new("⏭"))
        .clicked()
    {
        signals.push(UiSignal::SkipForwardClicked);
    }

    let mut value = scrub_value.unwrap_or(widgets.seek_bar.value());
    ui.spacing_mut().slider_width = SEEK_BAR_WIDTH;
    let response = ui.add_enabled(
        widgets.seek_bar.is_sensitive(),
        egui::Slider::new(&mut value, 0.0..=1.0).show_value(false),
    );
    if response.drag_started() {
        signals.push(UiSignal::SeekPressed);
    }
    if response.changed() {
        signals.push(UiSignal::SeekMoved(value));
    }
    if response.dragged() {
        *scrub_value = Some(value);
    }
    if response.drag_stopped() {
        *scrub_value = None;
        signals.push(UiSignal::SeekReleased);
    }

    ui.label(&widgets.time_label);
}
