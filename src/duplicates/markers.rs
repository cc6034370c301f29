//! Copy-marker detection for file name stems.
//!
//! A copy marker is a suffix that file managers and phone exporters append
//! when a name collides: `photo(1)`, `photo - Copy`, `Foto Kopie (2)`.
//! [`CopyMarkers`] is an ordered list of predicates; a stem is "clean" when
//! none of them match.

use regex::Regex;
use std::fmt;

/// A single "does this stem look like a copy" predicate.
pub trait CopyMarker: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Whether `stem` (file name without extension) carries this marker.
    fn matches(&self, stem: &str) -> bool;
}

/// Regex-backed copy marker.
#[derive(Debug, Clone)]
pub struct PatternMarker {
    name: String,
    regex: Regex,
}

impl PatternMarker {
    /// Compile a marker from a regular expression applied to the stem.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if the pattern does not compile.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            regex: Regex::new(pattern)?,
        })
    }

    /// The source pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl CopyMarker for PatternMarker {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, stem: &str) -> bool {
        self.regex.is_match(stem)
    }
}

/// Trailing parenthesized integer: `photo(1)`, `photo (12)`.
pub const PAREN_COUNTER: &str = r"\(\d+\)$";

/// Trailing English "copy" with optional counter: `photo - Copy`, `photo copy 2`, `photo_copy`.
pub const COPY_SUFFIX: &str = r"(?i)(^|[\s_\-.])copy(\s*\d+)?$";

/// Trailing localized "copy" word with optional parenthesized counter: `Foto - Kopie (2)`.
pub const LOCALIZED_COPY_SUFFIX: &str =
    r"(?i)(^|[\s_\-.])(kopie|kopia|kopio|copia|copie|cópia|kopya|másolat|копия|コピー|副本)(\s*\(\d+\))?$";

/// Ordered list of copy-marker predicates.
pub struct CopyMarkers {
    markers: Vec<Box<dyn CopyMarker>>,
}

impl CopyMarkers {
    /// An empty list; every stem counts as clean.
    #[must_use]
    pub fn none() -> Self {
        Self {
            markers: Vec::new(),
        }
    }

    /// Build a list from regular expressions, in order.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] for the first pattern that does not compile.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        let mut markers = Self::none();
        for (i, pattern) in patterns.iter().enumerate() {
            markers.push(PatternMarker::new(format!("pattern-{}", i + 1), pattern.as_ref())?);
        }
        Ok(markers)
    }

    /// Append a marker.
    pub fn push(&mut self, marker: impl CopyMarker + 'static) {
        self.markers.push(Box::new(marker));
    }

    /// Number of markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether the list has no markers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// The first marker matching `stem`, if any.
    #[must_use]
    pub fn find(&self, stem: &str) -> Option<&dyn CopyMarker> {
        self.markers
            .iter()
            .find(|m| m.matches(stem))
            .map(|m| &**m)
    }

    /// Whether `stem` carries any copy marker.
    #[must_use]
    pub fn is_copy(&self, stem: &str) -> bool {
        self.find(stem).is_some()
    }
}

impl Default for CopyMarkers {
    fn default() -> Self {
        let builtin = [
            ("paren-counter", PAREN_COUNTER),
            ("copy-suffix", COPY_SUFFIX),
            ("localized-copy-suffix", LOCALIZED_COPY_SUFFIX),
        ];
        let mut markers = Self::none();
        for (name, pattern) in builtin {
            match PatternMarker::new(name, pattern) {
                Ok(marker) => markers.push(marker),
                Err(e) => log::error!("Built-in copy marker {} failed to compile: {}", name, e),
            }
        }
        markers
    }
}

impl fmt::Debug for CopyMarkers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.markers.iter().map(|m| m.name()))
            .finish()
    }
}
