pub mod bus_event;
pub mod playback_state;
