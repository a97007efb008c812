pub mod media_uri;
pub mod time_format;
