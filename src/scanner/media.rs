//! Media resolution probing.
//!
//! Dimensions come from image headers only; pixel data is never decoded.
//! Anything that cannot be probed (videos, RAW formats, truncated headers)
//! yields `None`, which the resolver ranks below every known resolution.

use std::io::Cursor;
use std::path::Path;

use super::{extension_of, Resolution};

/// Extensions whose headers the `image` crate can read.
const PROBEABLE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp",
];

/// Whether the file type has a header we know how to probe.
#[must_use]
pub fn is_photo(path: &Path) -> bool {
    let ext = extension_of(path);
    PROBEABLE_EXTENSIONS.contains(&ext.as_str())
}

/// Read the dimensions of an image file on disk.
#[must_use]
pub fn probe_file(path: &Path) -> Option<Resolution> {
    if !is_photo(path) {
        return None;
    }
    match image::image_dimensions(path) {
        Ok((width, height)) => Some(Resolution::new(width, height)),
        Err(e) => {
            log::trace!("No resolution for {}: {}", path.display(), e);
            None
        }
    }
}

/// Read the dimensions from an in-memory header prefix.
#[must_use]
pub fn probe_bytes(bytes: &[u8]) -> Option<Resolution> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    reader
        .into_dimensions()
        .ok()
        .map(|(width, height)| Resolution::new(width, height))
}
