use crate::{
    ExtensionFilter, FileFilter, MtimeFilter, MtimeOperator, RegexFilter, Result, SnoopError,
    SubstringFilter, TraversalError,
    filters::{AcceptedOrderings, CustomFilter, PredicateFilter, accepts_all},
    util::{BytePath as _, trim_base_path, unix_now},
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{debug, trace, warn};

/**
 A directory-tree file finder.

 `Snoop` is configured in place, then [`scan`](Self::scan) walks the tree once and
 keeps the accepted paths. The results can be iterated, indexed or walked with the
 built in cursor as often as needed without scanning again.

 Every regular file goes through the decision hook, an ordered chain of layers that
 must all accept it: the custom predicate, the substring filter, the regex filter,
 the mtime filter and finally the extension whitelist. Layers that have nothing
 configured are left out of the chain.

 Symlinks are resolved when deciding between file and directory, dangling ones are
 skipped. There is no cycle detection.

 # Examples
 ```no_run
 use snoop::Snoop;

 let mut snoop = Snoop::new("/home/codepfuscher");
 snoop.add_extension("js").add_extension("php").recursive();

 for file in snoop.scan()? {
     println!("{}", file.display());
 }
 # Ok::<(), snoop::SnoopError>(())
 ```
*/
#[derive(Debug)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "Naturally a scanner configuration will contain many bools"
)]
pub struct Snoop {
    base_path: PathBuf,
    recursive: bool,
    case_sensitive: bool,
    cut_base_path: bool,
    cut_slash: bool,
    hide_hidden: bool,
    collect_errors: bool,
    extensions: Vec<String>,
    substrings: Vec<String>,
    regexes: Vec<String>,
    /// Default reference for the mtime layer
    constructed_at: i64,
    mtime: Option<MtimeFilter>,
    filter: Option<CustomFilter>,
    files: Vec<PathBuf>,
    errors: Vec<TraversalError>,
    cursor: usize,
}

impl Snoop {
    /// Creates a scanner rooted at `base_path`. The filesystem isn't touched until [`scan`](Self::scan).
    #[must_use]
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            recursive: false,
            case_sensitive: false,
            cut_base_path: false,
            cut_slash: false,
            hide_hidden: false,
            collect_errors: false,
            extensions: Vec::new(),
            substrings: Vec::new(),
            regexes: Vec::new(),
            constructed_at: unix_now(),
            mtime: None,
            filter: None,
            files: Vec::new(),
            errors: Vec::new(),
            cursor: 0,
        }
    }

    /**
     Creates a scanner with the mtime layer active.

     Recursion and base path trimming are switched on, the reference is the current
     time and the operator is `<=`, ie files with `now <= mtime` are kept.
    */
    #[must_use]
    pub fn mtime<P: AsRef<Path>>(base_path: P) -> Self {
        let mut snoop = Self::new(base_path);
        snoop.recursive = true;
        snoop.cut_base_path = true;
        snoop.mtime = Some(MtimeFilter::new(
            snoop.constructed_at,
            AcceptedOrderings::default(),
        ));
        snoop
    }

    /// The directory the scan starts from
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Descend into subdirectories, depth first
    pub const fn recursive(&mut self) -> &mut Self {
        self.recursive = true;
        self
    }

    /// Match extensions, substrings and regexes case-sensitively (default is insensitive)
    pub const fn case_sensitive(&mut self) -> &mut Self {
        self.case_sensitive = true;
        self
    }

    /// Strip the base path from recorded results
    pub const fn cut_base_path(&mut self) -> &mut Self {
        self.cut_base_path = true;
        self
    }

    /// Also strip the leading `/` left behind by [`cut_base_path`](Self::cut_base_path).
    /// Has no effect on its own.
    pub const fn cut_slash(&mut self) -> &mut Self {
        self.cut_slash = true;
        self
    }

    /// Skip files and directories whose name starts with `.`
    pub const fn hide_hidden(&mut self) -> &mut Self {
        self.hide_hidden = true;
        self
    }

    /// Record unreadable subdirectories and unresolvable symlinks in [`errors`](Self::errors)
    /// instead of failing the scan. An unreadable base path still fails.
    pub const fn collect_errors(&mut self) -> &mut Self {
        self.collect_errors = true;
        self
    }

    /// Add an extension to the whitelist. Stored verbatim, nothing is escaped or interpreted.
    pub fn add_extension<S: AsRef<str>>(&mut self, extension: S) -> &mut Self {
        self.extensions.push(extension.as_ref().to_owned());
        self
    }

    /// Add a substring that must appear somewhere in the full path
    pub fn add_filter<S: AsRef<str>>(&mut self, filter: S) -> &mut Self {
        self.substrings.push(filter.as_ref().to_owned());
        self
    }

    /// Add a regex searched in the full path, compiled when the scan starts
    pub fn add_regex<S: AsRef<str>>(&mut self, pattern: S) -> &mut Self {
        self.regexes.push(pattern.as_ref().to_owned());
        self
    }

    /// Set a custom predicate, called with the full path of every regular file
    pub const fn with_filter(&mut self, filter: CustomFilter) -> &mut Self {
        self.filter = Some(filter);
        self
    }

    /// Current mtime layer, if active
    #[must_use]
    pub const fn mtime_filter(&self) -> Option<MtimeFilter> {
        self.mtime
    }

    fn mtime_or_default(&self) -> MtimeFilter {
        self.mtime.unwrap_or_else(|| {
            MtimeFilter::new(self.constructed_at, AcceptedOrderings::default())
        })
    }

    /// Set the reference timestamp (seconds since the epoch) and activate the mtime layer
    pub fn set_mtime(&mut self, timestamp: i64) -> &mut Self {
        let current = self.mtime_or_default();
        self.mtime = Some(MtimeFilter::new(timestamp, current.accepted()));
        self
    }

    /**
     Set the operator relating the reference to each file's mtime (`reference OP mtime`)
     and activate the mtime layer.

     # Errors
     Returns [`SnoopError::InvalidMtimeOperator`] for anything other than `<`, `>`, `<=`
     or `>=`, in which case the configuration is left as it was.
    */
    pub fn set_mtime_operator(&mut self, operator: &str) -> Result<&mut Self> {
        let operator: MtimeOperator = operator.parse()?;
        Ok(self.mtime_operator(operator))
    }

    /// Typed version of [`set_mtime_operator`](Self::set_mtime_operator)
    pub fn mtime_operator(&mut self, operator: MtimeOperator) -> &mut Self {
        let current = self.mtime_or_default();
        self.mtime = Some(MtimeFilter::new(current.reference(), operator.accepted()));
        self
    }

    /// Builds the decision hook from the current configuration
    fn build_chain(&self) -> Result<Vec<Box<dyn FileFilter>>> {
        let mut chain: Vec<Box<dyn FileFilter>> = Vec::with_capacity(5);

        if let Some(filter) = self.filter {
            chain.push(Box::new(PredicateFilter(filter)));
        }
        if !self.substrings.is_empty() {
            chain.push(Box::new(SubstringFilter::new(
                &self.substrings,
                self.case_sensitive,
            )));
        }
        if !self.regexes.is_empty() {
            chain.push(Box::new(RegexFilter::new(
                &self.regexes,
                self.case_sensitive,
            )?));
        }
        if let Some(mtime) = self.mtime {
            chain.push(Box::new(mtime));
        }
        if !self.extensions.is_empty() {
            chain.push(Box::new(ExtensionFilter::new(
                &self.extensions,
                self.case_sensitive,
            )));
        }

        Ok(chain)
    }

    /**
     Walks the tree and stores the accepted paths, replacing the results of any earlier scan.

     # Errors
     - [`SnoopError::BasePathNotFound`] if the base path is missing or not a directory
     - [`SnoopError::RegexError`] if a regex filter doesn't compile
     - any IO error met during the walk, unless it's an unreadable subdirectory and
       [`collect_errors`](Self::collect_errors) is on

     On error no results are kept.
    */
    pub fn scan(&mut self) -> Result<&[PathBuf]> {
        self.files.clear();
        self.errors.clear();
        self.cursor = 0;

        if !self.base_path.is_dir() {
            return Err(SnoopError::BasePathNotFound(self.base_path.clone()));
        }

        let chain = self.build_chain()?;
        debug!(
            base = %self.base_path.display(),
            recursive = self.recursive,
            layers = chain.len(),
            "starting scan"
        );

        let mut files = Vec::new();
        let mut errors = Vec::new();
        self.scan_path(&self.base_path, &chain, &mut files, &mut errors)?;

        debug!(
            accepted = files.len(),
            errors = errors.len(),
            "scan finished"
        );
        self.files = files;
        self.errors = errors;
        Ok(&self.files)
    }

    /// Directory entries sorted by name so results are reproducible
    fn read_sorted(dir: &Path) -> Result<Vec<fs::DirEntry>> {
        let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
        entries.sort_unstable_by_key(fs::DirEntry::file_name);
        Ok(entries)
    }

    fn scan_path(
        &self,
        dir: &Path,
        chain: &[Box<dyn FileFilter>],
        files: &mut Vec<PathBuf>,
        errors: &mut Vec<TraversalError>,
    ) -> Result<()> {
        trace!(dir = %dir.display(), "reading directory");

        let entries = match Self::read_sorted(dir) {
            Ok(entries) => entries,
            Err(error) if self.collect_errors && dir != self.base_path => {
                warn!(dir = %dir.display(), %error, "skipping unreadable directory");
                errors.push(TraversalError {
                    dir: dir.to_path_buf(),
                    error,
                });
                return Ok(());
            }
            Err(error) => return Err(error),
        };

        for entry in entries {
            let path = entry.path();
            if self.hide_hidden && path.is_hidden() {
                continue;
            }

            let mut file_type = entry.file_type()?;
            if file_type.is_symlink() {
                file_type = match fs::metadata(&path) {
                    Ok(target) => target.file_type(),
                    // dangling, neither a file nor a directory
                    Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                    // eg ELOOP from a link pointing back up the tree
                    Err(e) if self.collect_errors => {
                        warn!(link = %path.display(), error = %e, "skipping unresolvable symlink");
                        errors.push(TraversalError {
                            dir: path,
                            error: e.into(),
                        });
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
            }

            if file_type.is_dir() {
                if self.recursive {
                    self.scan_path(&path, chain, files, errors)?;
                }
            } else if file_type.is_file() && accepts_all(chain, &path)? {
                files.push(self.record(&path));
            }
        }

        Ok(())
    }

    fn record(&self, path: &Path) -> PathBuf {
        if self.cut_base_path {
            trim_base_path(path, &self.base_path, self.cut_slash)
        } else {
            path.to_path_buf()
        }
    }

    /// The accepted paths of the last scan, in traversal order
    #[must_use]
    pub fn results(&self) -> &[PathBuf] {
        &self.files
    }

    /// Directories and symlinks skipped during the last scan (only filled with [`collect_errors`](Self::collect_errors))
    #[must_use]
    pub fn errors(&self) -> &[TraversalError] {
        &self.errors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Path> {
        self.files.get(index).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, PathBuf> {
        self.files.iter()
    }

    /// Move the cursor back to the first result
    pub const fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// The result under the cursor, `None` once exhausted
    #[must_use]
    pub fn current(&self) -> Option<&Path> {
        self.get(self.cursor)
    }

    /// Index of the cursor
    #[must_use]
    pub const fn key(&self) -> usize {
        self.cursor
    }

    /// Step the cursor forward
    pub const fn advance(&mut self) {
        self.cursor = self.cursor.saturating_add(1);
    }

    /// Whether the cursor points at a result
    #[must_use]
    pub fn valid(&self) -> bool {
        self.cursor < self.files.len()
    }
}

impl<'a> IntoIterator for &'a Snoop {
    type Item = &'a PathBuf;
    type IntoIter = core::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
