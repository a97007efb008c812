use gstreamer as gst;

/// Pipeline state as last reported on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Null,
    Ready,
    Paused,
    Playing,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        self == PlaybackState::Playing
    }

    /// Maps a GStreamer state. `VoidPending` has no counterpart.
    pub fn from_gst(state: gst::State) -> Option<Self> {
        match state {
            gst::State::Null => Some(PlaybackState::Null),
            gst::State::Ready => Some(PlaybackState::Ready),
            gst::State::Paused => Some(PlaybackState::Paused),
            gst::State::Playing => Some(PlaybackState::Playing),
            _ => None,
        }
    }

    pub fn to_gst(self) -> gst::State {
        match self {
            PlaybackState::Null => gst::State::Null,
            PlaybackState::Ready => gst::State::Ready,
            PlaybackState::Paused => gst::State::Paused,
            PlaybackState::Playing => gst::State::Playing,
        }
    }
}
