use libc::{EACCES, EINVAL, ELOOP, ENOENT, ENOTDIR};
use std::{
    fmt, io,
    path::{Path, PathBuf},
};

/// Generic result type for scanner operations
pub type Result<T> = core::result::Result<T, SnoopError>;

/// A thin wrapper around [`io::Error`] so the error enum can stay `Display`-friendly
/// without leaking the platform error straight into the variant list.
#[derive(Debug)]
pub struct FilesystemIOError(io::Error);

impl FilesystemIOError {
    #[must_use]
    pub const fn from_io_error(error: io::Error) -> Self {
        Self(error)
    }

    /// Returns the underlying IO error
    #[must_use]
    pub const fn inner(&self) -> &io::Error {
        &self.0
    }

    /// Returns the kind of the underlying IO error
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind {
        self.0.kind()
    }
}

impl fmt::Display for FilesystemIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/**
 Errors produced while configuring or running a scan.

 Configuration errors (`InvalidMtimeOperator`) only ever affect the call that produced them,
 scan errors (`BasePathNotFound`, `RegexError` and the IO family) abort the whole scan and
 leave the scanner without results.
*/
#[derive(Debug)]
#[non_exhaustive]
pub enum SnoopError {
    /// The base path does not exist or is not a directory
    BasePathNotFound(PathBuf),
    /// An mtime operator outside of `<`, `>`, `<=`, `>=`
    InvalidMtimeOperator(String),
    /// A three-way timestamp comparison produced no ordering.
    /// `i64` is totally ordered so this is never constructed by the crate itself.
    TimestampCompare,
    /// A regex path filter failed to compile
    RegexError(regex::Error),
    InvalidPath(FilesystemIOError),
    NotADirectory(FilesystemIOError),
    AccessDenied(FilesystemIOError),
    TooManySymbolicLinks(FilesystemIOError),
    IOError(FilesystemIOError),
}

impl SnoopError {
    /// Returns the underlying IO error, if this error came from the filesystem
    #[must_use]
    #[allow(clippy::pattern_type_mismatch)]
    pub const fn io_error(&self) -> Option<&FilesystemIOError> {
        match self {
            Self::InvalidPath(e)
            | Self::NotADirectory(e)
            | Self::AccessDenied(e)
            | Self::TooManySymbolicLinks(e)
            | Self::IOError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SnoopError {
    fn from(error: io::Error) -> Self {
        let code = error.raw_os_error();
        let wrapped = FilesystemIOError::from_io_error(error);
        match code {
            Some(EINVAL | ENOENT) => Self::InvalidPath(wrapped),
            Some(ENOTDIR) => Self::NotADirectory(wrapped),
            Some(EACCES) => Self::AccessDenied(wrapped),
            Some(ELOOP) => Self::TooManySymbolicLinks(wrapped),
            _ => Self::IOError(wrapped),
        }
    }
}

impl From<regex::Error> for SnoopError {
    fn from(error: regex::Error) -> Self {
        Self::RegexError(error)
    }
}

#[allow(clippy::pattern_type_mismatch)]
impl fmt::Display for SnoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BasePathNotFound(path) => {
                write!(f, "Base path not found or not a directory: {}", path.display())
            }
            Self::InvalidMtimeOperator(op) => {
                write!(f, "Invalid mtime operator '{op}', expected one of <, >, <=, >=")
            }
            Self::TimestampCompare => write!(f, "Timestamps could not be compared"),
            Self::RegexError(e) => write!(f, "Regex error: {e}"),
            Self::InvalidPath(e) => write!(f, "Invalid path: {e}"),
            Self::NotADirectory(e) => write!(f, "Not a directory: {e}"),
            Self::AccessDenied(e) => write!(f, "Access denied: {e}"),
            Self::TooManySymbolicLinks(e) => write!(f, "Too many symbolic links: {e}"),
            Self::IOError(e) => write!(f, "OS error: {e}"),
        }
    }
}

#[allow(clippy::pattern_type_mismatch)]
impl std::error::Error for SnoopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RegexError(e) => Some(e),
            _ => self
                .io_error()
                .map(|e| e.inner() as &(dyn std::error::Error + 'static)),
        }
    }
}

/// A directory or symlink that could not be read while error collection was enabled
#[derive(Debug)]
pub struct TraversalError {
    pub(crate) dir: PathBuf,
    pub(crate) error: SnoopError,
}

impl TraversalError {
    /// The directory or symlink that failed to be read
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The error encountered
    #[must_use]
    pub const fn error(&self) -> &SnoopError {
        &self.error
    }
}

impl fmt::Display for TraversalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.dir.display(), self.error)
    }
}

impl std::error::Error for TraversalError {}
