use std::path::Path;

use gstreamer::glib;

use crate::error::{Error, Result};

/// Turns a command-line media argument into a URI playbin accepts.
/// Anything with a scheme passes through; everything else must be an
/// existing file.
pub fn to_uri(media: &str) -> Result<String> {
    if media.contains("://") {
        return Ok(media.to_string());
    }

    let path = Path::new(media)
        .canonicalize()
        .map_err(|e| Error::InvalidMedia(format!("{media}: {e}")))?;
    glib::filename_to_uri(&path, None)
        .map(|uri| uri.to_string())
        .map_err(|e| Error::InvalidMedia(format!("{media}: {e}")))
}

/// Last path segment, for the "now playing" label.
pub fn display_name(media: &str) -> &str {
    media
        .trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(media)
}
