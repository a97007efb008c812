use crate::types::playback_state::PlaybackState;

/// Notification delivered from the pipeline bus to its watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// The pipeline reached a new state.
    StateChanged(PlaybackState),
    EndOfStream,
    /// Anything else the bus carries. Consumers ignore it.
    Other,
}
