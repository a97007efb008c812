mod config;
mod error;
mod event_loop;
mod logging;
mod ops;
mod pipeline;
mod player;
mod types;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use gstreamer as gst;
use tracing::{error, info};

use crate::config::Config;
use crate::ops::media_uri;
use crate::pipeline::{GstPipeline, MediaPipeline};
use crate::player::controller::PlaybackController;
use crate::player::headless;

const MEDIA_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "oga", "opus", "wav", "m4a", "aac", "mp4", "mkv", "webm",
];

/// Command-line arguments for jeff
#[derive(Parser, Debug)]
#[command(name = "jeff")]
#[command(about = "Minimal GStreamer media player")]
#[command(version)]
struct Args {
    /// Media URI or file path
    media: Option<String>,

    /// Play without a window and exit at end of stream
    #[arg(long)]
    headless: bool,

    /// TOML configuration file
    #[arg(short, long, env = "JEFF_CONFIG")]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (overrides the config file)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    logging::init(args.log_level.as_deref().unwrap_or(&config.logging.level));

    gst::init().context("Failed to initialise GStreamer")?;
    info!("Starting {}", ui::app::app_title());

    if args.headless {
        run_headless(args.media, &config)
    } else {
        run_interactive(args.media, &config)
    }
}

fn run_headless(media: Option<String>, config: &Config) -> Result<()> {
    let media = media.context("MEDIA is required with --headless")?;
    let uri = media_uri::to_uri(&media)?;

    // A missing pipeline is handled by the player: it ends the loop on enqueue.
    let pipeline = match GstPipeline::new(config.state_query_timeout()) {
        Ok(pipeline) => Some(pipeline),
        Err(e) => {
            error!("{}", e);
            None
        }
    };

    headless::run(pipeline, uri, config.bus_poll_interval());
    Ok(())
}

fn run_interactive(media: Option<String>, config: &Config) -> Result<()> {
    let media = match media {
        Some(media) => media,
        None => match rfd::FileDialog::new()
            .add_filter("Media", MEDIA_EXTENSIONS)
            .pick_file()
        {
            Some(path) => path.to_string_lossy().into_owned(),
            None => {
                info!("No media selected");
                return Ok(());
            }
        },
    };
    let uri = media_uri::to_uri(&media)?;

    let mut pipeline =
        GstPipeline::new(config.state_query_timeout()).context("Failed to create pipeline")?;
    pipeline.set_uri(&uri);

    let controller = PlaybackController::new(pipeline, config.update_interval())
        .context("Failed to start playback controller")?;

    ui::app::run(
        controller,
        media_uri::display_name(&media).to_string(),
        &config.window,
    )
    .map_err(|e| anyhow!("Player window error: {e}"))
}
