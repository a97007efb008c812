use gstreamer as gst;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The playbin element could not be created
    #[error("Pipeline unavailable: {0}")]
    PipelineUnavailable(gst::glib::BoolError),

    #[error("Pipeline has no bus")]
    NoBus,

    #[error("Bus already has a watch")]
    AlreadyWatched,

    /// The pipeline refused a state change
    #[error("State change error: {0}")]
    StateChange(#[from] gst::StateChangeError),

    #[error("Seek error: {0}")]
    Seek(gst::glib::BoolError),

    /// The target does not fit in a GStreamer clock time
    #[error("Seek target out of range: {0:?}")]
    SeekOutOfRange(std::time::Duration),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Neither a URI nor a usable file path
    #[error("Invalid media location: {0}")]
    InvalidMedia(String),
}

pub type Result<T> = std::result::Result<T, Error>;
