use std::time::Duration;

use gst::prelude::*;
use gstreamer as gst;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::pipeline::{BusWatch, MediaPipeline, SeekFlags, WatchId};
use crate::types::bus_event::BusEvent;
use crate::types::playback_state::PlaybackState;

/// `MediaPipeline` backed by a GStreamer `playbin`.
pub struct GstPipeline {
    playbin: gst::Element,
    state_query_timeout: Option<gst::ClockTime>,
    watch: Option<WatchId>,
    next_watch: u64,
}

impl GstPipeline {
    /// Creates the playbin. `gst::init` must have succeeded.
    ///
    /// `state_query_timeout` bounds `query_state`; `None` waits until the
    /// pipeline settles.
    pub fn new(state_query_timeout: Option<Duration>) -> Result<Self> {
        let playbin = gst::ElementFactory::make("playbin")
            .name("player")
            .build()
            .map_err(Error::PipelineUnavailable)?;

        let state_query_timeout = state_query_timeout.and_then(|t| {
            let clock = clock_time(t);
            if clock.is_none() {
                warn!("State query timeout {:?} is out of range, waiting indefinitely", t);
            }
            clock
        });

        Ok(Self {
            playbin,
            state_query_timeout,
            watch: None,
            next_watch: 1,
        })
    }
}

impl MediaPipeline for GstPipeline {
    fn set_uri(&mut self, uri: &str) {
        debug!("Setting playbin uri to {}", uri);
        self.playbin.set_property("uri", uri);
    }

    fn request_state(&mut self, state: PlaybackState) -> Result<()> {
        let result = self.playbin.set_state(state.to_gst())?;
        debug!("Requested {:?}: {:?}", state, result);
        Ok(())
    }

    fn query_state(&self) -> PlaybackState {
        let (result, current, pending) = self.playbin.state(self.state_query_timeout);
        if result.is_err() {
            warn!(
                "State query failed, current state: {:?}, pending: {:?}",
                current, pending
            );
        }
        PlaybackState::from_gst(current).unwrap_or_default()
    }

    fn query_duration(&self) -> Option<Duration> {
        self.playbin
            .query_duration::<gst::ClockTime>()
            .map(|t| Duration::from_nanos(t.nseconds()))
    }

    fn query_position(&self) -> Option<Duration> {
        self.playbin
            .query_position::<gst::ClockTime>()
            .map(|t| Duration::from_nanos(t.nseconds()))
    }

    fn seek(&mut self, flags: SeekFlags, target: Duration) -> Result<()> {
        let mut seek_flags = gst::SeekFlags::empty();
        if flags.flush {
            seek_flags |= gst::SeekFlags::FLUSH;
        }
        if flags.key_unit {
            seek_flags |= gst::SeekFlags::KEY_UNIT;
        }

        let position = clock_time(target).ok_or(Error::SeekOutOfRange(target))?;
        debug!("Seeking to {} ({:?})", position, seek_flags);
        self.playbin
            .seek_simple(seek_flags, position)
            .map_err(Error::Seek)
    }

    fn subscribe(&mut self) -> Result<BusWatch> {
        if self.watch.is_some() {
            return Err(Error::AlreadyWatched);
        }
        let bus = self.playbin.bus().ok_or(Error::NoBus)?;

        let (sender, receiver) = crossbeam_channel::unbounded();
        bus.set_flushing(false);
        bus.set_sync_handler(move |_, msg| {
            // The receiver only goes away on unsubscribe, after which
            // nothing is listening anyway.
            let _ = sender.send(bus_event(msg));
            gst::BusSyncReply::Drop
        });

        let id = WatchId(self.next_watch);
        self.next_watch += 1;
        self.watch = Some(id);
        debug!("Bus watch {:?} installed", id);
        Ok(BusWatch::new(id, receiver))
    }

    fn unsubscribe(&mut self, watch: WatchId) {
        if self.watch != Some(watch) {
            warn!("Ignoring unsubscribe for unknown bus watch {:?}", watch);
            return;
        }
        if let Some(bus) = self.playbin.bus() {
            bus.unset_sync_handler();
            bus.set_flushing(true);
        }
        self.watch = None;
        debug!("Bus watch {:?} removed", watch);
    }
}

impl Drop for GstPipeline {
    fn drop(&mut self) {
        if let Some(watch) = self.watch {
            self.unsubscribe(watch);
        }
        let _ = self.playbin.set_state(gst::State::Null);
    }
}

fn clock_time(duration: Duration) -> Option<gst::ClockTime> {
    gst::ClockTime::try_from(duration).ok()
}

/// Translates a bus message. Only the top-level pipeline's own state
/// changes count; child elements report theirs on the same bus.
fn bus_event(msg: &gst::Message) -> BusEvent {
    match msg.view() {
        gst::MessageView::Eos(_) => BusEvent::EndOfStream,
        gst::MessageView::StateChanged(changed) if is_top_level(msg) => {
            PlaybackState::from_gst(changed.current())
                .map_or(BusEvent::Other, BusEvent::StateChanged)
        }
        gst::MessageView::Error(err) => {
            warn!("Pipeline error: {} ({:?})", err.error(), err.debug());
            BusEvent::Other
        }
        gst::MessageView::Warning(warning) => {
            warn!("Pipeline warning: {}", warning.error());
            BusEvent::Other
        }
        _ => BusEvent::Other,
    }
}

fn is_top_level(msg: &gst::Message) -> bool {
    msg.src().is_some_and(|src| src.parent().is_none())
}
