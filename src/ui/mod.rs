pub mod app;
pub mod player_window;
pub mod widgets;
