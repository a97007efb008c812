use eframe::egui;
use tracing::info;

use crate::config::WindowConfig;
use crate::pipeline::MediaPipeline;
use crate::player::controller::PlaybackController;
use crate::ui::player_window::PlayerWindow;

pub fn app_title() -> String {
    format!("JEFF {}", env!("CARGO_PKG_VERSION"))
}

/// Opens the player window and blocks until it is closed. The controller
/// is dropped with the window, which tears the pipeline down.
pub fn run<P: MediaPipeline + 'static>(
    controller: PlaybackController<P>,
    now_playing: String,
    window: &WindowConfig,
) -> eframe::Result<()> {
    let title = app_title();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title.clone())
            .with_inner_size([window.width, window.height]),
        ..Default::default()
    };

    info!("Opening player window");
    eframe::run_native(
        &title,
        native_options,
        Box::new(move |_cc| Ok(Box::new(PlayerWindow::new(controller, now_playing)))),
    )
}
