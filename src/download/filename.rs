//! Destination filename derivation for beatmap archives.
//!
//! Beatmapset titles come straight from the catalog and routinely contain
//! characters that are illegal in filenames on at least one supported
//! platform. Each illegal character is replaced one-for-one with `_` so that
//! titles differing only in illegal characters still map to distinct names.

/// File extension of the beatmap archive format.
pub const ARCHIVE_EXTENSION: &str = ".osz";

/// Characters that must never appear in a destination filename.
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replaces every filename-illegal character in `title` with `_`.
///
/// The replacement is strictly one-for-one (runs are not collapsed), so
/// `"a/b"` and `"a//b"` sanitize to the distinct names `"a_b"` and `"a__b"`.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if ILLEGAL_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Builds the archive filename for a beatmapset title.
#[must_use]
pub fn osz_filename(title: &str) -> String {
    format!("{}{ARCHIVE_EXTENSION}", sanitize_title(title))
}
