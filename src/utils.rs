//! Utility functions for filename manipulation

use sha2::{Digest, Sha256};

/// Number of hex characters of the URL hash used to disambiguate filenames
const URL_HASH_LEN: usize = 8;

/// Split a filename into stem and extension (the extension keeps its dot)
///
/// Leading dots do not start an extension, so dotfiles have no extension.
///
/// # Examples
///
/// ```
/// use thumbnail_maker::utils::split_extension;
///
/// assert_eq!(split_extension("a.jpg"), ("a", ".jpg"));
/// assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
/// assert_eq!(split_extension("README"), ("README", ""));
/// assert_eq!(split_extension(".hidden"), (".hidden", ""));
/// ```
#[must_use]
pub fn split_extension(filename: &str) -> (&str, &str) {
    let leading_dots = filename.len() - filename.trim_start_matches('.').len();
    match filename[leading_dots..].rfind('.') {
        Some(idx) => filename.split_at(leading_dots + idx),
        None => (filename, ""),
    }
}

/// Filename of the thumbnail for `filename` at `width`: `<stem>_<width><ext>`
///
/// # Examples
///
/// ```
/// use thumbnail_maker::utils::thumbnail_filename;
///
/// assert_eq!(thumbnail_filename("a.jpg", 32), "a_32.jpg");
/// assert_eq!(thumbnail_filename("scan", 200), "scan_200");
/// ```
#[must_use]
pub fn thumbnail_filename(filename: &str, width: u32) -> String {
    let (stem, ext) = split_extension(filename);
    format!("{stem}_{width}{ext}")
}

/// Filename suffixed with a short SHA-256 hash of the full source URL
///
/// Used to keep URLs that share a basename apart in the staging area.
/// The extension is preserved so the output format can still be inferred.
#[must_use]
pub fn hashed_filename(filename: &str, url: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(url.as_bytes()));
    let (stem, ext) = split_extension(filename);
    format!("{stem}-{}{ext}", &digest[..URL_HASH_LEN])
}
