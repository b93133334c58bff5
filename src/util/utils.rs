use std::{
    ffi::OsStr,
    os::unix::ffi::OsStrExt as _,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

/**
 Byte level views over paths.

 Matching is done on raw bytes rather than `str` so non UTF-8 names are still
 handled, case folding is ASCII only.
*/
pub trait BytePath {
    /// The whole path as bytes
    fn as_bytes(&self) -> &[u8];

    /// The final component as bytes, empty if there is none
    fn file_name_bytes(&self) -> &[u8];

    /// The extension after the last `.` of the file name, if any
    fn extension_bytes(&self) -> Option<&[u8]>;

    /// Dot-files and dot-directories
    #[inline]
    fn is_hidden(&self) -> bool {
        self.file_name_bytes().first() == Some(&b'.')
    }
}

impl BytePath for Path {
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        self.as_os_str().as_bytes()
    }

    #[inline]
    fn file_name_bytes(&self) -> &[u8] {
        self.file_name().map(OsStr::as_bytes).unwrap_or_default()
    }

    #[inline]
    fn extension_bytes(&self) -> Option<&[u8]> {
        let name = self.file_name_bytes();
        // exclude a trailing '.' and a leading one (hidden files have no extension)
        let pos = name.iter().rposition(|&b| b == b'.')?;
        (pos != 0 && pos + 1 < name.len()).then(|| &name[pos + 1..])
    }
}

/// Suffix test, `needle` must sit at the very end of `haystack`
#[inline]
#[must_use]
pub fn ends_with_bytes(haystack: &[u8], needle: &[u8], case_sensitive: bool) -> bool {
    if needle.len() > haystack.len() {
        return false;
    }
    let tail = &haystack[haystack.len() - needle.len()..];
    if case_sensitive {
        tail == needle
    } else {
        tail.eq_ignore_ascii_case(needle)
    }
}

/// Substring test anywhere in `haystack`, an empty needle always matches
#[inline]
#[must_use]
pub fn contains_bytes(haystack: &[u8], needle: &[u8], case_sensitive: bool) -> bool {
    if needle.is_empty() {
        return true;
    }
    if case_sensitive {
        haystack.windows(needle.len()).any(|window| window == needle)
    } else {
        haystack
            .windows(needle.len())
            .any(|window| window.eq_ignore_ascii_case(needle))
    }
}

/**
 Removes the `base` prefix from `path`, and then one leading `/` if `cut_slash` is set.

 Paths that don't start with `base` are returned untouched.
*/
#[must_use]
pub fn trim_base_path(path: &Path, base: &Path, cut_slash: bool) -> PathBuf {
    let bytes = path.as_bytes();
    let Some(stripped) = bytes.strip_prefix(base.as_bytes()) else {
        return path.to_path_buf();
    };

    let stripped = if cut_slash {
        stripped.strip_prefix(b"/").unwrap_or(stripped)
    } else {
        stripped
    };

    PathBuf::from(OsStr::from_bytes(stripped))
}

/// Current time in whole seconds since the Unix epoch, negative before it
#[must_use]
pub fn unix_now() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_secs()).map_or(i64::MIN, |s| -s),
    }
}
