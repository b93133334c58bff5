//! `snoop` finds files below a base directory.
//!
//! A [`Snoop`] is configured in place (recursion, extension whitelist, path substrings,
//! regexes, an mtime comparison, a custom predicate), then [`Snoop::scan`] walks the tree
//! once and stores every accepted path. Results are fully collected before they can be
//! iterated, and can be iterated again without another scan.
//!
//! ```no_run
//! use snoop::Snoop;
//!
//! let mut snoop = Snoop::mtime("/var/www");
//! snoop.add_extension("php").set_mtime(1_300_147_200);
//! snoop.set_mtime_operator(">=")?;
//! snoop.scan()?;
//!
//! for file in &snoop {
//!     println!("{}", file.display());
//! }
//! # Ok::<(), snoop::SnoopError>(())
//! ```

mod error;
pub mod filters;
pub mod util;
mod walk;

#[cfg(test)]
mod test;

pub use error::{FilesystemIOError, Result, SnoopError, TraversalError};
pub use filters::{
    CustomFilter, ExtensionFilter, FileFilter, MtimeFilter, MtimeOperator, RegexFilter,
    SubstringFilter,
};
pub use walk::Snoop;
