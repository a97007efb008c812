use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};

use crate::ops::time_format::NO_MEDIA_LABEL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayPauseIcon {
    Play,
    Pause,
}

impl PlayPauseIcon {
    /// Freedesktop icon name.
    pub fn icon_name(self) -> &'static str {
        match self {
            PlayPauseIcon::Play => "media-playback-start",
            PlayPauseIcon::Pause => "media-playback-pause",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            PlayPauseIcon::Play => "▶",
            PlayPauseIcon::Pause => "⏸",
        }
    }
}

/// User interaction reported by the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiSignal {
    PlayPauseClicked,
    StopClicked,
    SkipBackwardClicked,
    SkipForwardClicked,
    /// The user grabbed the seek bar.
    SeekPressed,
    /// The user let go of the seek bar.
    SeekReleased,
    /// The user dragged or clicked the seek bar to this fraction.
    SeekMoved(f64),
}

/// Seek control holding a fraction in [0.0, 1.0].
///
/// Every value write, programmatic or user-driven, emits `value-changed`
/// unless the connection is blocked. Emissions queue until the controller
/// dispatches them.
#[derive(Debug, Default)]
pub struct SeekBar {
    value: f64,
    sensitive: bool,
    pressed: bool,
    blocked: bool,
    emitted: VecDeque<f64>,
}

impl SeekBar {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    pub fn set_sensitive(&mut self, sensitive: bool) {
        self.sensitive = sensitive;
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    /// Writes the value and emits `value-changed`.
    pub fn set_value(&mut self, value: f64) {
        self.value = clamp_fraction(value);
        self.emit(self.value);
    }

    /// User interaction: emits `value-changed` with the requested value but
    /// leaves applying it to whoever handles the signal.
    pub fn change_value(&mut self, value: f64) {
        self.emit(clamp_fraction(value));
    }

    /// Default handling of `value-changed`: store without re-emitting.
    pub fn apply_value(&mut self, value: f64) {
        self.value = clamp_fraction(value);
    }

    #[cfg(test)]
    pub fn is_value_changed_blocked(&self) -> bool {
        self.blocked
    }

    /// Blocks `value-changed` until the returned guard is dropped.
    pub fn block_value_changed(&mut self) -> BlockedSeekBar<'_> {
        let was_blocked = std::mem::replace(&mut self.blocked, true);
        BlockedSeekBar {
            seek_bar: self,
            was_blocked,
        }
    }

    /// Oldest undelivered `value-changed` emission.
    pub fn take_value_changed(&mut self) -> Option<f64> {
        self.emitted.pop_front()
    }

    fn emit(&mut self, value: f64) {
        if !self.blocked {
            self.emitted.push_back(value);
        }
    }
}

fn clamp_fraction(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// A [`SeekBar`] whose `value-changed` connection is blocked.
pub struct BlockedSeekBar<'a> {
    seek_bar: &'a mut SeekBar,
    was_blocked: bool,
}

impl Deref for BlockedSeekBar<'_> {
    type Target = SeekBar;

    fn deref(&self) -> &SeekBar {
        self.seek_bar
    }
}

impl DerefMut for BlockedSeekBar<'_> {
    fn deref_mut(&mut self) -> &mut SeekBar {
        self.seek_bar
    }
}

impl Drop for BlockedSeekBar<'_> {
    fn drop(&mut self) {
        self.seek_bar.blocked = self.was_blocked;
    }
}

/// Everything the window shows.
#[derive(Debug)]
pub struct PlayerWidgets {
    pub time_label: String,
    pub playpause_icon: PlayPauseIcon,
    pub playpause_sensitive: bool,
    pub stop_sensitive: bool,
    pub skip_backward_sensitive: bool,
    pub skip_forward_sensitive: bool,
    pub seek_bar: SeekBar,
}

impl PlayerWidgets {
    pub fn new() -> Self {
        Self {
            time_label: NO_MEDIA_LABEL.to_string(),
            playpause_icon: PlayPauseIcon::Play,
            playpause_sensitive: false,
            stop_sensitive: false,
            skip_backward_sensitive: false,
            skip_forward_sensitive: false,
            seek_bar: SeekBar::default(),
        }
    }
}

impl Default for PlayerWidgets {
    fn default() -> Self {
        Self::new()
    }
}
