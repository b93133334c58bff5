use crate::{FileFilter, Result, util::BytePath as _, util::contains_bytes};
use regex::bytes::{RegexSet, RegexSetBuilder};
use std::path::Path;

/// Substring whitelist searched anywhere in the full path. Empty accepts all.
#[derive(Clone, Debug, Default)]
pub struct SubstringFilter {
    needles: Vec<Box<[u8]>>,
    case_sensitive: bool,
}

impl SubstringFilter {
    #[must_use]
    pub fn new<I, S>(needles: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            needles: needles
                .into_iter()
                .map(|needle| needle.as_ref().as_bytes().into())
                .collect(),
            case_sensitive,
        }
    }

    #[inline]
    #[must_use]
    pub fn matches_path(&self, path: &[u8]) -> bool {
        self.needles.is_empty()
            || self
                .needles
                .iter()
                .any(|needle| contains_bytes(path, needle, self.case_sensitive))
    }
}

impl FileFilter for SubstringFilter {
    #[inline]
    fn accepts(&self, path: &Path) -> Result<bool> {
        Ok(self.matches_path(path.as_bytes()))
    }
}

/**
 Regex whitelist searched anywhere in the full path.

 All patterns are compiled into a single [`RegexSet`], a path passes when any of
 them matches. An empty set of patterns accepts everything.
*/
#[derive(Clone, Debug)]
pub struct RegexFilter {
    set: Option<RegexSet>,
}

impl RegexFilter {
    /// Compiles the patterns
    ///
    /// # Errors
    /// Returns [`crate::SnoopError::RegexError`] if any pattern is invalid.
    pub fn new<I, S>(patterns: I, case_sensitive: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|pattern| pattern.as_ref().to_owned())
            .collect();
        if patterns.is_empty() {
            return Ok(Self { set: None });
        }

        let set = RegexSetBuilder::new(&patterns)
            .case_insensitive(!case_sensitive)
            .build()?;

        Ok(Self { set: Some(set) })
    }

    #[inline]
    #[must_use]
    pub fn matches_path(&self, path: &[u8]) -> bool {
        self.set.as_ref().is_none_or(|set| set.is_match(path))
    }
}

impl FileFilter for RegexFilter {
    #[inline]
    fn accepts(&self, path: &Path) -> Result<bool> {
        Ok(self.matches_path(path.as_bytes()))
    }
}
