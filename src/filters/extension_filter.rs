use crate::{FileFilter, Result, util::BytePath as _, util::ends_with_bytes};
use std::path::Path;

/**
 Extension whitelist, the innermost layer of every scan.

 A file passes when its name ends with any of the registered extensions.
 This is a plain suffix test and not an extension parse, so `weirdjs`
 passes for `js` just like `a.js` does. An empty whitelist accepts everything.

 # Examples
 ```
 use snoop::{ExtensionFilter, FileFilter};
 use std::path::Path;

 let filter = ExtensionFilter::new(["js", "php"], false);
 assert!(filter.accepts(Path::new("/r/a.JS")).unwrap());
 assert!(!filter.accepts(Path::new("/r/c.txt")).unwrap());
 ```
*/
#[derive(Clone, Debug, Default)]
pub struct ExtensionFilter {
    extensions: Vec<Box<[u8]>>,
    case_sensitive: bool,
}

impl ExtensionFilter {
    #[must_use]
    pub fn new<I, S>(extensions: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().as_bytes().into())
                .collect(),
            case_sensitive,
        }
    }

    /// Checks a bare file name against the whitelist
    #[inline]
    #[must_use]
    pub fn matches_name(&self, file_name: &[u8]) -> bool {
        self.extensions.is_empty()
            || self
                .extensions
                .iter()
                .any(|ext| ends_with_bytes(file_name, ext, self.case_sensitive))
    }
}

impl FileFilter for ExtensionFilter {
    #[inline]
    fn accepts(&self, path: &Path) -> Result<bool> {
        Ok(self.matches_name(path.file_name_bytes()))
    }
}
