mod extension_filter;
mod mtime_filter;
mod path_filter;

pub use extension_filter::ExtensionFilter;
pub use mtime_filter::{
    AcceptedOrderings, MtimeFilter, MtimeOperator, MtimeOperatorParser, ParseTimestampError,
    TimestampParser, compare_mtime, parse_timestamp,
};
pub use path_filter::{RegexFilter, SubstringFilter};

use crate::Result;
use core::fmt;
use std::path::Path;

/// Caller supplied predicate, the last word on whether a file is kept
pub type CustomFilter = fn(&Path) -> bool;

/**
 One layer of the per-file decision hook.

 The scanner holds an ordered chain of these and keeps a file only when every
 layer accepts it. Layers see the full, untrimmed path of a regular file.
*/
pub trait FileFilter: fmt::Debug {
    /// Returns `Ok(true)` when the file passes this layer.
    ///
    /// # Errors
    /// Layers that need to touch the filesystem (eg the mtime layer) propagate
    /// the IO error instead of guessing.
    fn accepts(&self, path: &Path) -> Result<bool>;
}

/// Wraps a [`CustomFilter`] so it can sit in the chain
#[derive(Clone, Copy)]
pub struct PredicateFilter(pub CustomFilter);

impl fmt::Debug for PredicateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PredicateFilter")
    }
}

impl FileFilter for PredicateFilter {
    #[inline]
    fn accepts(&self, path: &Path) -> Result<bool> {
        Ok((self.0)(path))
    }
}

/// Runs every layer in order, stopping at the first rejection or error
///
/// # Errors
/// Propagates the first error raised by a layer.
#[inline]
pub fn accepts_all(chain: &[Box<dyn FileFilter>], path: &Path) -> Result<bool> {
    for layer in chain {
        if !layer.accepts(path)? {
            return Ok(false);
        }
    }
    Ok(true)
}
