use std::time::{Duration, Instant};

use gstreamer::glib::{ControlFlow, Propagation};
use tracing::{debug, info, trace, warn};

use crate::error::Result;
use crate::event_loop::IntervalTimer;
use crate::ops::time_format::{NO_MEDIA_LABEL, format_progress, progress_fraction};
use crate::pipeline::{BusWatch, MediaPipeline, SeekFlags};
use crate::types::bus_event::BusEvent;
use crate::types::playback_state::PlaybackState;
use crate::ui::widgets::{PlayPauseIcon, PlayerWidgets, UiSignal};

/// Drives one pipeline for the player window. Widgets follow the state the
/// bus reports, not the state last requested.
pub struct PlaybackController<P: MediaPipeline> {
    pipeline: P,
    watch: Option<BusWatch>,
    timer: IntervalTimer,
    widgets: PlayerWidgets,
    state: PlaybackState,
}

impl<P: MediaPipeline> PlaybackController<P> {
    /// Watches the pipeline bus, starts the sync timer and asks for
    /// playback straight away.
    pub fn new(mut pipeline: P, update_interval: Duration) -> Result<Self> {
        let watch = pipeline.subscribe()?;

        let mut widgets = PlayerWidgets::new();
        widgets.playpause_sensitive = true;

        let mut controller = Self {
            pipeline,
            watch: Some(watch),
            timer: IntervalTimer::register(update_interval, Instant::now()),
            widgets,
            state: PlaybackState::Null,
        };
        controller.request(PlaybackState::Playing);
        Ok(controller)
    }

    pub fn widgets(&self) -> &PlayerWidgets {
        &self.widgets
    }

    /// State from the most recent `StateChanged` event.
    #[cfg(test)]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[cfg(test)]
    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    /// Pauses when playing, plays otherwise. Asks the pipeline for its
    /// current state first, which may block.
    pub fn playpause(&mut self) {
        if self.pipeline.query_state().is_playing() {
            self.request(PlaybackState::Paused);
        } else {
            self.request(PlaybackState::Playing);
        }
    }

    /// Halts playback but keeps the media loaded.
    pub fn stop(&mut self) {
        self.request(PlaybackState::Ready);
    }

    pub fn skip_backward(&mut self) {
        trace!("Skip backward: nothing to skip to");
    }

    pub fn skip_forward(&mut self) {
        trace!("Skip forward: nothing to skip to");
    }

    /// One dispatch turn: bus events, then the sync timer if due, then
    /// pending seek-bar emissions.
    pub fn dispatch(&mut self, now: Instant) {
        self.dispatch_bus_events();
        if self.timer.poll(now) {
            let _ = self.on_timeout_update();
        }
        self.dispatch_value_changed();
    }

    /// How long the window may sleep before the next dispatch is needed.
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        self.timer.remaining(now)
    }

    pub fn handle_signal(&mut self, signal: UiSignal) {
        match signal {
            UiSignal::PlayPauseClicked => self.playpause(),
            UiSignal::StopClicked => self.stop(),
            UiSignal::SkipBackwardClicked => self.skip_backward(),
            UiSignal::SkipForwardClicked => self.skip_forward(),
            UiSignal::SeekPressed => self.widgets.seek_bar.set_pressed(true),
            UiSignal::SeekReleased => self.widgets.seek_bar.set_pressed(false),
            UiSignal::SeekMoved(value) => self.widgets.seek_bar.change_value(value),
        }
        self.dispatch_value_changed();
    }

    /// Bus callback. The controller keeps watching for as long as it lives.
    pub fn on_bus_event(&mut self, event: BusEvent) -> ControlFlow {
        match event {
            BusEvent::EndOfStream => {
                info!("End of stream, stopping");
                self.stop();
            }
            BusEvent::StateChanged(state) => {
                debug!("Pipeline state changed to {:?}", state);
                self.state = state;
                self.update_buttons();
            }
            BusEvent::Other => {}
        }
        ControlFlow::Continue
    }

    /// Sync timer callback.
    pub fn on_timeout_update(&mut self) -> ControlFlow {
        self.update_seek_bar();
        ControlFlow::Continue
    }

    /// Seek-bar `value-changed` handler: seeks to `value` of the duration.
    ///
    /// Always stops default handling; the bar catches up on the next sync
    /// tick once the pipeline has moved.
    pub fn on_seek_value_changed(&mut self, value: f64) -> Propagation {
        let duration = match self.pipeline.query_duration() {
            Some(duration) if !duration.is_zero() => duration,
            _ => {
                debug!("Ignoring seek to {:.3}: duration unknown", value);
                return Propagation::Stop;
            }
        };

        let fraction = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
        let target = duration.mul_f64(fraction);
        debug!("Seeking to {:?} of {:?}", target, duration);
        if let Err(e) = self.pipeline.seek(SeekFlags::FLUSH_KEY_UNIT, target) {
            warn!("Seek to {:?} failed: {}", target, e);
        }
        Propagation::Stop
    }

    fn dispatch_bus_events(&mut self) {
        let Some(watch) = self.watch.as_ref() else {
            return;
        };
        for event in watch.drain() {
            let _ = self.on_bus_event(event);
        }
    }

    fn dispatch_value_changed(&mut self) {
        while let Some(value) = self.widgets.seek_bar.take_value_changed() {
            if self.on_seek_value_changed(value) == Propagation::Proceed {
                self.widgets.seek_bar.apply_value(value);
            }
        }
    }

    fn update_buttons(&mut self) {
        let widgets = &mut self.widgets;
        match self.state {
            PlaybackState::Null => {
                widgets.seek_bar.set_sensitive(false);
            }
            PlaybackState::Ready => {
                widgets.stop_sensitive = false;
                widgets.seek_bar.set_sensitive(true);
            }
            PlaybackState::Paused => {
                widgets.playpause_icon = PlayPauseIcon::Play;
                widgets.stop_sensitive = true;
            }
            PlaybackState::Playing => {
                widgets.playpause_icon = PlayPauseIcon::Pause;
            }
        }
    }

    fn update_seek_bar(&mut self) {
        let progress = self
            .pipeline
            .query_duration()
            .and_then(|duration| Some((self.pipeline.query_position()?, duration)));

        let fraction = match progress {
            Some((position, duration)) => {
                self.widgets.time_label = format_progress(position, duration);
                progress_fraction(position, duration)
            }
            None => {
                self.widgets.time_label = NO_MEDIA_LABEL.to_string();
                0.0
            }
        };

        // Leave the bar alone while the user is holding it.
        if !self.widgets.seek_bar.is_pressed() {
            self.widgets
                .seek_bar
                .block_value_changed()
                .set_value(fraction);
        }
    }

    fn request(&mut self, state: PlaybackState) {
        debug!("Requesting {:?}", state);
        if let Err(e) = self.pipeline.request_state(state) {
            warn!("Pipeline refused {:?}: {}", state, e);
        }
    }
}

impl<P: MediaPipeline> Drop for PlaybackController<P> {
    fn drop(&mut self) {
        self.request(PlaybackState::Null);
        if let Some(watch) = self.watch.take() {
            self.pipeline.unsubscribe(watch.id());
        }
        self.timer.cancel();
        debug!("Playback controller torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::mock::{MockPipeline, Op};

    const INTERVAL: Duration = Duration::from_millis(200);

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn controller_with(mock: &MockPipeline) -> PlaybackController<MockPipeline> {
        PlaybackController::new(mock.clone(), INTERVAL).unwrap()
    }

    #[test]
    fn test_new_subscribes_and_requests_playing() {
        let mock = MockPipeline::new();
        let controller = controller_with(&mock);

        let ops = mock.ops();
        assert!(matches!(ops[0], Op::Subscribe(_)));
        assert_eq!(ops[1], Op::Request(PlaybackState::Playing));
        assert!(controller.is_watching());

        let widgets = controller.widgets();
        assert!(widgets.playpause_sensitive);
        assert!(!widgets.stop_sensitive);
        assert!(!widgets.skip_backward_sensitive);
        assert!(!widgets.skip_forward_sensitive);
        assert!(!widgets.seek_bar.is_sensitive());
        assert_eq!(widgets.time_label, "0:00 / 0:00");
        assert_eq!(controller.state(), PlaybackState::Null);
    }

    #[test]
    fn test_new_fails_without_bus() {
        let mock = MockPipeline::new();
        mock.fail_subscribe();

        assert!(PlaybackController::new(mock.clone(), INTERVAL).is_err());
        assert!(mock.requested().is_empty());
    }

    #[test]
    fn test_playpause_toggles_on_queried_state() {
        let mock = MockPipeline::new();
        let mut controller = controller_with(&mock);
        mock.clear_ops();

        mock.set_current(PlaybackState::Playing);
        controller.playpause();
        mock.set_current(PlaybackState::Paused);
        controller.playpause();
        mock.set_current(PlaybackState::Ready);
        controller.playpause();

        assert_eq!(
            mock.requested(),
            vec![
                PlaybackState::Paused,
                PlaybackState::Playing,
                PlaybackState::Playing
            ]
        );
        assert_eq!(mock.state_queries(), 3);
    }

    #[test]
    fn test_requests_do_not_change_affordances() {
        let mock = MockPipeline::new();
        let mut controller = controller_with(&mock);
        mock.set_current(PlaybackState::Playing);

        controller.handle_signal(UiSignal::PlayPauseClicked);

        assert_eq!(mock.requested().last(), Some(&PlaybackState::Paused));
        assert_eq!(controller.widgets().playpause_icon, PlayPauseIcon::Play);
        assert_eq!(controller.state(), PlaybackState::Null);
    }

    #[test]
    fn test_stop_requests_ready() {
        let mock = MockPipeline::new();
        let mut controller = controller_with(&mock);
        controller.handle_signal(UiSignal::StopClicked);

        assert_eq!(mock.requested().last(), Some(&PlaybackState::Ready));
    }

    #[test]
    fn test_state_changes_drive_affordances() {
        let mock = MockPipeline::new();
        let mut controller = controller_with(&mock);

        controller.on_bus_event(BusEvent::StateChanged(PlaybackState::Ready));
        assert!(!controller.widgets().stop_sensitive);
        assert!(controller.widgets().seek_bar.is_sensitive());

        controller.on_bus_event(BusEvent::StateChanged(PlaybackState::Paused));
        assert_eq!(controller.widgets().playpause_icon, PlayPauseIcon::Play);
        assert!(controller.widgets().stop_sensitive);

        controller.on_bus_event(BusEvent::StateChanged(PlaybackState::Playing));
        assert_eq!(controller.widgets().playpause_icon, PlayPauseIcon::Pause);
        assert!(controller.widgets().stop_sensitive);
        assert!(controller.widgets().seek_bar.is_sensitive());
        assert_eq!(controller.state(), PlaybackState::Playing);

        controller.on_bus_event(BusEvent::StateChanged(PlaybackState::Paused));
        assert_eq!(controller.widgets().playpause_icon, PlayPauseIcon::Play);

        controller.on_bus_event(BusEvent::StateChanged(PlaybackState::Null));
        assert!(!controller.widgets().seek_bar.is_sensitive());
        assert_eq!(controller.state(), PlaybackState::Null);
    }

    #[test]
    fn test_bus_events_are_dispatched_in_order() {
        let mock = MockPipeline::new();
        let mut controller = controller_with(&mock);
        mock.emit(BusEvent::StateChanged(PlaybackState::Ready));
        mock.emit(BusEvent::StateChanged(PlaybackState::Paused));
        mock.emit(BusEvent::Other);
        mock.emit(BusEvent::StateChanged(PlaybackState::Playing));

        controller.dispatch(Instant::now());

        assert_eq!(controller.state(), PlaybackState::Playing);
        assert_eq!(controller.widgets().playpause_icon, PlayPauseIcon::Pause);
        assert!(controller.widgets().stop_sensitive);
    }

    #[test]
    fn test_end_of_stream_stops_and_keeps_watching() {
        let mock = MockPipeline::new();
        let mut controller = controller_with(&mock);
        mock.clear_ops();

        assert_eq!(
            controller.on_bus_event(BusEvent::EndOfStream),
            ControlFlow::Continue
        );
        assert_eq!(mock.requested(), vec![PlaybackState::Ready]);

        mock.emit(BusEvent::EndOfStream);
        controller.dispatch(Instant::now());
        assert_eq!(
            mock.requested(),
            vec![PlaybackState::Ready, PlaybackState::Ready]
        );
        assert!(controller.is_watching());
        assert!(mock.is_watched());

        mock.emit(BusEvent::StateChanged(PlaybackState::Ready));
        controller.dispatch(Instant::now());
        assert_eq!(controller.state(), PlaybackState::Ready);
    }

    #[test]
    fn test_sync_shows_hours_from_duration() {
        let mock = MockPipeline::with_media(secs(3725), secs(65));
        let mut controller = controller_with(&mock);

        controller.on_timeout_update();

        let widgets = controller.widgets();
        assert_eq!(widgets.time_label, "0:01:05 / 1:02:05");
        assert!((widgets.seek_bar.value() - 0.017_45).abs() < 1e-4);
    }

    #[test]
    fn test_sync_without_media_shows_sentinel() {
        let mock = MockPipeline::with_media(secs(100), secs(40));
        let mut controller = controller_with(&mock);
        controller.on_timeout_update();
        assert_eq!(controller.widgets().time_label, "0:40 / 1:40");

        mock.set_media(None, None);
        controller.on_timeout_update();
        assert_eq!(controller.widgets().time_label, "0:00 / 0:00");
        assert_eq!(controller.widgets().seek_bar.value(), 0.0);

        mock.set_media(Some(secs(100)), None);
        controller.on_timeout_update();
        assert_eq!(controller.widgets().time_label, "0:00 / 0:00");
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mock = MockPipeline::with_media(secs(200), secs(50));
        let mut controller = controller_with(&mock);

        controller.on_timeout_update();
        let label = controller.widgets().time_label.clone();
        let value = controller.widgets().seek_bar.value();
        for _ in 0..5 {
            controller.on_timeout_update();
        }

        assert_eq!(controller.widgets().time_label, label);
        assert_eq!(controller.widgets().seek_bar.value(), value);
        assert_eq!(value, 0.25);
    }

    #[test]
    fn test_sync_never_seeks() {
        let mock = MockPipeline::with_media(secs(200), secs(50));
        let mut controller = controller_with(&mock);
        let start = Instant::now();

        for tick in 1..=5 {
            controller.dispatch(start + INTERVAL * tick);
        }
        mock.set_media(None, None);
        controller.dispatch(start + INTERVAL * 6);

        assert!(mock.seeks().is_empty());
        assert!(!controller.widgets().seek_bar.is_value_changed_blocked());
    }

    #[test]
    fn test_timer_drives_sync() {
        let mock = MockPipeline::with_media(secs(100), secs(10));
        let mut controller = controller_with(&mock);
        let start = Instant::now();

        controller.dispatch(start);
        assert_eq!(controller.widgets().time_label, "0:00 / 0:00");

        controller.dispatch(start + INTERVAL * 2);
        assert_eq!(controller.widgets().time_label, "0:10 / 1:40");
        assert!(controller.next_wakeup(start + INTERVAL * 2).is_some());
    }

    #[test]
    fn test_user_seek_issues_flushing_key_unit_seek() {
        let mock = MockPipeline::with_media(secs(100), secs(10));
        let mut controller = controller_with(&mock);

        controller.handle_signal(UiSignal::SeekMoved(0.5));

        assert_eq!(mock.seeks(), vec![(SeekFlags::FLUSH_KEY_UNIT, secs(50))]);
        // The bar waits for the pipeline instead of taking the drag value.
        assert_eq!(controller.widgets().seek_bar.value(), 0.0);

        mock.set_media(Some(secs(100)), Some(secs(50)));
        controller.on_timeout_update();
        assert_eq!(controller.widgets().seek_bar.value(), 0.5);
        assert_eq!(mock.seeks().len(), 1);
    }

    #[test]
    fn test_seek_handler_stops_default_handling() {
        let mock = MockPipeline::with_media(secs(100), secs(0));
        let mut controller = controller_with(&mock);

        assert_eq!(controller.on_seek_value_changed(0.3), Propagation::Stop);
        assert_eq!(controller.on_seek_value_changed(0.3), Propagation::Stop);
    }

    #[test]
    fn test_seek_target_is_clamped() {
        let mock = MockPipeline::with_media(secs(100), secs(0));
        let mut controller = controller_with(&mock);

        controller.on_seek_value_changed(1.7);
        controller.on_seek_value_changed(-0.2);
        controller.on_seek_value_changed(f64::NAN);

        let targets: Vec<Duration> = mock.seeks().into_iter().map(|(_, t)| t).collect();
        assert_eq!(targets, vec![secs(100), secs(0), secs(0)]);
    }

    #[test]
    fn test_seek_without_duration_is_skipped() {
        let mock = MockPipeline::new();
        let mut controller = controller_with(&mock);
        controller.handle_signal(UiSignal::SeekMoved(0.5));

        mock.set_media(Some(Duration::ZERO), Some(Duration::ZERO));
        controller.handle_signal(UiSignal::SeekMoved(0.5));

        assert!(mock.seeks().is_empty());
    }

    #[test]
    fn test_pressed_seek_bar_is_not_overwritten() {
        let mock = MockPipeline::with_media(secs(100), secs(20));
        let mut controller = controller_with(&mock);
        controller.on_timeout_update();
        assert_eq!(controller.widgets().seek_bar.value(), 0.2);

        controller.handle_signal(UiSignal::SeekPressed);
        mock.set_media(Some(secs(100)), Some(secs(30)));
        controller.on_timeout_update();
        assert_eq!(controller.widgets().time_label, "0:30 / 1:40");
        assert_eq!(controller.widgets().seek_bar.value(), 0.2);

        controller.handle_signal(UiSignal::SeekReleased);
        controller.on_timeout_update();
        assert_eq!(controller.widgets().seek_bar.value(), 0.3);
        assert!(mock.seeks().is_empty());
    }

    #[test]
    fn test_skip_buttons_do_nothing() {
        let mock = MockPipeline::with_media(secs(100), secs(20));
        let mut controller = controller_with(&mock);
        mock.clear_ops();

        controller.handle_signal(UiSignal::SkipBackwardClicked);
        controller.handle_signal(UiSignal::SkipForwardClicked);

        assert!(mock.ops().is_empty());
        assert_eq!(mock.state_queries(), 0);
    }

    #[test]
    fn test_drop_releases_then_unsubscribes() {
        let mock = MockPipeline::new();
        let controller = controller_with(&mock);
        mock.clear_ops();

        drop(controller);

        let ops = mock.ops();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0], Op::Request(PlaybackState::Null));
        assert!(matches!(ops[1], Op::Unsubscribe(_)));
        assert!(!mock.is_watched());
        assert!(!mock.emit(BusEvent::EndOfStream));
    }
}
