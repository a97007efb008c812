use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gstreamer::glib::{self, ControlFlow};
use tracing::{debug, error, info, warn};

use crate::event_loop::EventLoop;
use crate::pipeline::{BusWatch, MediaPipeline};
use crate::types::bus_event::BusEvent;
use crate::types::playback_state::PlaybackState;

pub struct Player<P: MediaPipeline, L: EventLoop> {
    main_loop: L,
    pipeline: Option<P>,
    watch: Option<BusWatch>,
}

impl<P: MediaPipeline, L: EventLoop> Player<P, L> {
    /// `pipeline` is `None` when it could not be created. The player then
    /// only ends the loop on `enqueue`.
    pub fn new(pipeline: Option<P>, main_loop: L) -> Self {
        let mut pipeline = pipeline;
        let watch = match pipeline.as_mut().map(|p| p.subscribe()) {
            Some(Ok(watch)) => Some(watch),
            Some(Err(e)) => {
                error!("Failed to watch pipeline bus: {}", e);
                // Without a bus there is no end-of-stream, so the pipeline
                // is as good as missing.
                pipeline = None;
                None
            }
            None => None,
        };

        Self {
            main_loop,
            pipeline,
            watch,
        }
    }

    pub fn enqueue(&mut self, uri: &str) {
        let Some(pipeline) = self.pipeline.as_mut() else {
            error!("No pipeline available, quitting");
            self.main_loop.quit();
            return;
        };

        info!("Playing {}", uri);
        pipeline.set_uri(uri);
        if let Err(e) = pipeline.request_state(PlaybackState::Playing) {
            warn!("Pipeline refused to play: {}", e);
        }
    }

    /// Handles one bus event. `Break` means the watch should be removed.
    pub fn on_bus_event(&mut self, event: BusEvent) -> ControlFlow {
        match event {
            BusEvent::EndOfStream => {
                info!("End of stream");
                if let Some(pipeline) = self.pipeline.as_mut() {
                    if let Err(e) = pipeline.request_state(PlaybackState::Null) {
                        warn!("Failed to release pipeline: {}", e);
                    }
                }
                self.main_loop.quit();
                ControlFlow::Break
            }
            other => {
                debug!("Ignoring bus event {:?}", other);
                ControlFlow::Continue
            }
        }
    }

    /// Delivers queued bus events, dropping the watch once a handler breaks.
    pub fn dispatch_pending(&mut self) -> ControlFlow {
        let Some(watch) = self.watch.as_ref() else {
            return ControlFlow::Break;
        };

        for event in watch.drain() {
            if self.on_bus_event(event) == ControlFlow::Break {
                self.remove_watch();
                return ControlFlow::Break;
            }
        }
        ControlFlow::Continue
    }

    #[cfg(test)]
    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    fn remove_watch(&mut self) {
        if let (Some(pipeline), Some(watch)) = (self.pipeline.as_mut(), self.watch.take()) {
            pipeline.unsubscribe(watch.id());
        }
    }
}

impl<P: MediaPipeline, L: EventLoop> Drop for Player<P, L> {
    fn drop(&mut self) {
        if let Some(pipeline) = self.pipeline.as_mut() {
            if let Err(e) = pipeline.request_state(PlaybackState::Null) {
                warn!("Failed to release pipeline: {}", e);
            }
        }
        self.remove_watch();
    }
}

/// Plays `uri` on the default main context until end of stream.
pub fn run<P: MediaPipeline + 'static>(pipeline: Option<P>, uri: String, poll_interval: Duration) {
    let main_loop = glib::MainLoop::new(None, false);
    let player = Rc::new(RefCell::new(Player::new(pipeline, main_loop.clone())));

    // Enqueue from inside the loop so a quit on a missing pipeline is seen
    // by the running loop.
    let enqueue = Rc::clone(&player);
    glib::idle_add_local_once(move || enqueue.borrow_mut().enqueue(&uri));

    let watch = Rc::clone(&player);
    glib::timeout_add_local(poll_interval, move || watch.borrow_mut().dispatch_pending());

    main_loop.run();
    debug!("Main loop finished");
}
