pub mod gst_pipeline;
#[cfg(test)]
pub mod mock;

use std::time::Duration;

use crossbeam_channel::Receiver;

use crate::error::Result;
use crate::types::bus_event::BusEvent;
use crate::types::playback_state::PlaybackState;

pub use gst_pipeline::GstPipeline;

/// Identifies one bus subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

/// Seek behaviour requested alongside a target time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeekFlags {
    /// Drop queued data so the seek takes effect immediately.
    pub flush: bool,
    /// Snap to the nearest keyframe.
    pub key_unit: bool,
}

impl SeekFlags {
    pub const FLUSH_KEY_UNIT: SeekFlags = SeekFlags {
        flush: true,
        key_unit: true,
    };
}

/// Receiving end of a bus subscription.
///
/// Events queue up until the owner drains them on its next dispatch turn.
#[derive(Debug)]
pub struct BusWatch {
    id: WatchId,
    events: Receiver<BusEvent>,
}

impl BusWatch {
    pub fn new(id: WatchId, events: Receiver<BusEvent>) -> Self {
        Self { id, events }
    }

    pub fn id(&self) -> WatchId {
        self.id
    }

    /// Takes every event queued so far, oldest first.
    pub fn drain(&self) -> Vec<BusEvent> {
        self.events.try_iter().collect()
    }
}

pub trait MediaPipeline {
    fn set_uri(&mut self, uri: &str);

    /// Asks the pipeline to move to `state`. Acceptance is not completion:
    /// the change is confirmed later by a `StateChanged` bus event.
    fn request_state(&mut self, state: PlaybackState) -> Result<()>;

    /// Current state. Blocks until the pipeline settles or its own query
    /// timeout runs out.
    fn query_state(&self) -> PlaybackState;

    /// `None` while no media is loaded or prerolled.
    fn query_duration(&self) -> Option<Duration>;

    fn query_position(&self) -> Option<Duration>;

    fn seek(&mut self, flags: SeekFlags, target: Duration) -> Result<()>;

    fn subscribe(&mut self) -> Result<BusWatch>;

    fn unsubscribe(&mut self, watch: WatchId);
}
