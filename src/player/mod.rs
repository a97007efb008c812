pub mod controller;
pub mod headless;
