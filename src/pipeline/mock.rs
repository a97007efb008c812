use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crossbeam_channel::Sender;

use crate::error::{Error, Result};
use crate::pipeline::{BusWatch, MediaPipeline, SeekFlags, WatchId};
use crate::types::bus_event::BusEvent;
use crate::types::playback_state::PlaybackState;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    SetUri(String),
    Request(PlaybackState),
    Seek(SeekFlags, Duration),
    Subscribe(WatchId),
    Unsubscribe(WatchId),
}

#[derive(Default)]
pub struct MockState {
    pub ops: Vec<Op>,
    /// Answer for `query_state`.
    pub current: PlaybackState,
    pub state_queries: usize,
    pub duration: Option<Duration>,
    pub position: Option<Duration>,
    pub fail_subscribe: bool,
    sender: Option<Sender<BusEvent>>,
    next_watch: u64,
}

/// Cloneable handle: the player owns one clone, the test keeps another.
#[derive(Clone, Default)]
pub struct MockPipeline {
    state: Rc<RefCell<MockState>>,
}

impl MockPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_media(duration: Duration, position: Duration) -> Self {
        let mock = Self::new();
        mock.set_media(Some(duration), Some(position));
        mock
    }

    pub fn set_media(&self, duration: Option<Duration>, position: Option<Duration>) {
        let mut state = self.state.borrow_mut();
        state.duration = duration;
        state.position = position;
    }

    pub fn set_current(&self, current: PlaybackState) {
        self.state.borrow_mut().current = current;
    }

    pub fn fail_subscribe(&self) {
        self.state.borrow_mut().fail_subscribe = true;
    }

    /// Posts an event on the bus. Returns false if nobody is watching.
    pub fn emit(&self, event: BusEvent) -> bool {
        match &self.state.borrow().sender {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }

    pub fn is_watched(&self) -> bool {
        self.state.borrow().sender.is_some()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.state.borrow().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.state.borrow_mut().ops.clear();
    }

    pub fn requested(&self) -> Vec<PlaybackState> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Request(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn seeks(&self) -> Vec<(SeekFlags, Duration)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Seek(flags, target) => Some((flags, target)),
                _ => None,
            })
            .collect()
    }

    pub fn state_queries(&self) -> usize {
        self.state.borrow().state_queries
    }
}

impl MediaPipeline for MockPipeline {
    fn set_uri(&mut self, uri: &str) {
        self.state.borrow_mut().ops.push(Op::SetUri(uri.to_string()));
    }

    fn request_state(&mut self, state: PlaybackState) -> Result<()> {
        self.state.borrow_mut().ops.push(Op::Request(state));
        Ok(())
    }

    fn query_state(&self) -> PlaybackState {
        let mut state = self.state.borrow_mut();
        state.state_queries += 1;
        state.current
    }

    fn query_duration(&self) -> Option<Duration> {
        self.state.borrow().duration
    }

    fn query_position(&self) -> Option<Duration> {
        self.state.borrow().position
    }

    fn seek(&mut self, flags: SeekFlags, target: Duration) -> Result<()> {
        self.state.borrow_mut().ops.push(Op::Seek(flags, target));
        Ok(())
    }

    fn subscribe(&mut self) -> Result<BusWatch> {
        let mut state = self.state.borrow_mut();
        if state.fail_subscribe {
            return Err(Error::NoBus);
        }
        if state.sender.is_some() {
            return Err(Error::AlreadyWatched);
        }
        state.next_watch += 1;
        let id = WatchId(state.next_watch);
        let (sender, receiver) = crossbeam_channel::unbounded();
        state.sender = Some(sender);
        state.ops.push(Op::Subscribe(id));
        Ok(BusWatch::new(id, receiver))
    }

    fn unsubscribe(&mut self, watch: WatchId) {
        let mut state = self.state.borrow_mut();
        state.sender = None;
        state.ops.push(Op::Unsubscribe(watch));
    }
}
