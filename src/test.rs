#[cfg(test)]
mod tests {
    use crate::{Snoop, SnoopError};
    use filetime::{FileTime, set_file_mtime};
    use std::{
        fs,
        path::{Path, PathBuf},
        sync::atomic::{AtomicUsize, Ordering},
    };

    static FIXTURE_COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// A throwaway directory tree under the system temp dir, removed on drop
    struct Fixture {
        root: PathBuf,
    }

    impl Fixture {
        fn new(name: &str) -> Self {
            let unique = FIXTURE_COUNTER.fetch_add(1, Ordering::Relaxed);
            let root = std::env::temp_dir().join(format!(
                "snoop_test_{name}_{}_{unique}",
                std::process::id()
            ));
            // Clean up from previous if errored
            let _ = fs::remove_dir_all(&root);
            fs::create_dir_all(&root).expect("Failed to create fixture root");
            Self { root }
        }

        /// `/r/a.js`, `/r/sub/b.js`, `/r/c.txt`
        fn standard(name: &str) -> Self {
            let fixture = Self::new(name);
            fixture.file("a.js");
            fixture.file("sub/b.js");
            fixture.file("c.txt");
            fixture
        }

        fn file(&self, relative: &str) -> PathBuf {
            let path = self.root.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("Failed to create parent directory");
            }
            fs::write(&path, relative).expect("Failed to write fixture file");
            path
        }

        fn dir(&self, relative: &str) -> PathBuf {
            let path = self.root.join(relative);
            fs::create_dir_all(&path).expect("Failed to create fixture directory");
            path
        }

        fn file_with_mtime(&self, relative: &str, mtime: i64) -> PathBuf {
            let path = self.file(relative);
            set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).expect("Failed to set mtime");
            path
        }

        fn path(&self, relative: &str) -> PathBuf {
            self.root.join(relative)
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.root);
        }
    }

    fn relative(results: &[PathBuf]) -> Vec<&str> {
        results
            .iter()
            .map(|p| p.to_str().expect("fixture paths are UTF-8"))
            .collect()
    }

    fn is_root() -> bool {
        // SAFETY: geteuid has no preconditions and can't fail
        unsafe { libc::geteuid() == 0 }
    }

    #[test]
    fn non_recursive_sees_only_direct_children() {
        let fixture = Fixture::standard("shallow");
        let mut snoop = Snoop::new(&fixture.root);
        snoop.add_extension("js");

        let results = snoop.scan().unwrap();
        assert_eq!(results, [fixture.path("a.js")]);
    }

    #[test]
    fn non_recursive_without_filters_returns_every_direct_file() {
        let fixture = Fixture::standard("shallow_all");
        let mut snoop = Snoop::new(&fixture.root);

        let results = snoop.scan().unwrap();
        assert_eq!(results, [fixture.path("a.js"), fixture.path("c.txt")]);
    }

    #[test]
    fn recursive_follows_traversal_order() {
        let fixture = Fixture::standard("recursive");
        let mut snoop = Snoop::new(&fixture.root);
        snoop.recursive().add_extension("js");

        let results = snoop.scan().unwrap();
        assert_eq!(results, [fixture.path("a.js"), fixture.path("sub/b.js")]);
    }

    #[test]
    fn recursive_visits_every_file_exactly_once() {
        let fixture = Fixture::new("deep");
        let mut expected = vec![
            fixture.file("z.txt"),
            fixture.file("a/b/c/d/deep.txt"),
            fixture.file("a/b/mid.txt"),
            fixture.file("a/top.txt"),
            fixture.file("m/file"),
        ];
        fixture.dir("empty/nested");

        let mut snoop = Snoop::new(&fixture.root);
        snoop.recursive();
        let mut results = snoop.scan().unwrap().to_vec();

        results.sort();
        expected.sort();
        assert_eq!(results, expected);
    }

    #[test]
    fn trimming_base_and_slash() {
        let fixture = Fixture::standard("trim_slash");
        let mut snoop = Snoop::new(&fixture.root);
        snoop.recursive().cut_base_path().cut_slash();

        let results = snoop.scan().unwrap();
        assert_eq!(relative(results), ["a.js", "c.txt", "sub/b.js"]);
    }

    #[test]
    fn trimming_base_keeps_separator_without_slash_cut() {
        let fixture = Fixture::standard("trim_only");
        let mut snoop = Snoop::new(&fixture.root);
        snoop.recursive().cut_base_path();

        let results = snoop.scan().unwrap();
        assert_eq!(relative(results), ["/a.js", "/c.txt", "/sub/b.js"]);
    }

    #[test]
    fn slash_cut_alone_does_nothing() {
        let fixture = Fixture::standard("slash_only");
        let mut snoop = Snoop::new(&fixture.root);
        snoop.cut_slash();

        let results = snoop.scan().unwrap();
        assert_eq!(results, [fixture.path("a.js"), fixture.path("c.txt")]);
    }

    #[test]
    fn missing_base_path_fails() {
        let fixture = Fixture::new("missing");
        let missing = fixture.path("does/not/exist");
        let mut snoop = Snoop::new(&missing);

        let err = snoop.scan().unwrap_err();
        assert!(matches!(err, SnoopError::BasePathNotFound(ref p) if *p == missing));
        assert!(snoop.is_empty());
        assert!(!snoop.valid());
    }

    #[test]
    fn file_as_base_path_fails() {
        let fixture = Fixture::standard("file_base");
        let mut snoop = Snoop::new(fixture.path("a.js"));

        assert!(matches!(
            snoop.scan(),
            Err(SnoopError::BasePathNotFound(_))
        ));
    }

    #[test]
    fn failed_scan_drops_previous_results() {
        let fixture = Fixture::standard("failed_rescan");
        let mut snoop = Snoop::new(&fixture.root);
        snoop.add_regex("fine");
        assert!(snoop.scan().unwrap().is_empty());

        snoop.add_regex("(broken");
        assert!(matches!(snoop.scan(), Err(SnoopError::RegexError(_))));
        assert!(snoop.results().is_empty());
    }

    #[test]
    fn empty_directories_contribute_nothing() {
        let fixture = Fixture::new("empty");
        fixture.dir("a/b");
        fixture.dir("c");

        let mut snoop = Snoop::new(&fixture.root);
        snoop.recursive();
        assert!(snoop.scan().unwrap().is_empty());
    }

    #[test]
    fn enabling_options_twice_is_idempotent() {
        let fixture = Fixture::standard("idempotent");

        let mut once = Snoop::new(&fixture.root);
        once.recursive().cut_base_path().cut_slash();
        let mut twice = Snoop::new(&fixture.root);
        twice
            .recursive()
            .recursive()
            .cut_base_path()
            .cut_base_path()
            .cut_slash()
            .cut_slash();

        assert_eq!(once.scan().unwrap(), twice.scan().unwrap());
    }

    #[test]
    fn rescanning_replaces_results() {
        let fixture = Fixture::standard("rescan");
        let mut snoop = Snoop::new(&fixture.root);
        snoop.recursive();

        let first = snoop.scan().unwrap().to_vec();
        let second = snoop.scan().unwrap().to_vec();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);

        fixture.file("sub/new.txt");
        assert_eq!(snoop.scan().unwrap().len(), 4);
    }

    #[test]
    fn cursor_walks_and_rewinds() {
        let fixture = Fixture::standard("cursor");
        let mut snoop = Snoop::new(&fixture.root);
        snoop.recursive();
        let expected = snoop.scan().unwrap().to_vec();

        let mut walked = Vec::new();
        let mut steps = 0;
        while snoop.valid() {
            assert_eq!(snoop.key(), steps);
            walked.push(snoop.current().unwrap().to_path_buf());
            snoop.advance();
            steps += 1;
        }
        assert_eq!(steps, expected.len());
        assert_eq!(snoop.current(), None);
        assert_eq!(walked, expected);

        snoop.rewind();
        assert_eq!(snoop.key(), 0);
        assert_eq!(snoop.current(), Some(expected[0].as_path()));

        // plain iteration can be repeated as well
        let first: Vec<_> = snoop.iter().cloned().collect();
        let second: Vec<_> = (&snoop).into_iter().cloned().collect();
        assert_eq!(first, expected);
        assert_eq!(second, expected);
        assert_eq!(snoop.get(expected.len()), None);
    }

    #[test]
    fn extension_match_is_case_insensitive_by_default() {
        let fixture = Fixture::new("ext_case");
        fixture.file("upper.JS");
        fixture.file("lower.js");
        fixture.file("other.txt");

        let mut insensitive = Snoop::new(&fixture.root);
        insensitive.add_extension("js").cut_base_path().cut_slash();
        assert_eq!(relative(insensitive.scan().unwrap()), ["lower.js", "upper.JS"]);

        let mut sensitive = Snoop::new(&fixture.root);
        sensitive
            .add_extension("js")
            .case_sensitive()
            .cut_base_path()
            .cut_slash();
        assert_eq!(relative(sensitive.scan().unwrap()), ["lower.js"]);
    }

    #[test]
    fn several_extensions_any_match() {
        let fixture = Fixture::new("multi_ext");
        fixture.file("a.js");
        fixture.file("b.php");
        fixture.file("c.txt");
        fixture.file("weirdjs");

        let mut snoop = Snoop::new(&fixture.root);
        snoop
            .add_extension("js")
            .add_extension("php")
            .cut_base_path()
            .cut_slash();
        assert_eq!(relative(snoop.scan().unwrap()), ["a.js", "b.php", "weirdjs"]);
    }

    #[test]
    fn substring_filter_intersects_with_extensions() {
        let fixture = Fixture::new("substring");
        fixture.file("UberCoder/app.js");
        fixture.file("UberCoder/readme.txt");
        fixture.file("other/app.js");

        let mut snoop = Snoop::new(&fixture.root);
        snoop
            .recursive()
            .add_extension("js")
            .add_filter("ubercoder")
            .cut_base_path()
            .cut_slash();
        assert_eq!(relative(snoop.scan().unwrap()), ["UberCoder/app.js"]);

        let mut sensitive = Snoop::new(&fixture.root);
        sensitive
            .recursive()
            .case_sensitive()
            .add_filter("ubercoder");
        assert!(sensitive.scan().unwrap().is_empty());
    }

    #[test]
    fn substring_filters_union_among_themselves() {
        let fixture = Fixture::new("substring_many");
        fixture.file("lib/a.js");
        fixture.file("vendor/b.js");
        fixture.file("src/c.js");

        let mut snoop = Snoop::new(&fixture.root);
        snoop
            .recursive()
            .add_filter("lib/")
            .add_filter("vendor/")
            .cut_base_path()
            .cut_slash();
        assert_eq!(relative(snoop.scan().unwrap()), ["lib/a.js", "vendor/b.js"]);
    }

    #[test]
    fn regex_filter_searches_full_path() {
        let fixture = Fixture::new("regex");
        fixture.file("src/main.rs");
        fixture.file("src/lib.rs");
        fixture.file("tests/main.rs");

        let mut snoop = Snoop::new(&fixture.root);
        snoop
            .recursive()
            .add_regex(r"/SRC/\w+\.rs$")
            .cut_base_path()
            .cut_slash();
        assert_eq!(relative(snoop.scan().unwrap()), ["src/lib.rs", "src/main.rs"]);
    }

    #[test]
    fn mtime_operators_compare_reference_against_mtime() {
        let fixture = Fixture::new("mtime_ops");
        fixture.file_with_mtime("old.js", 1_000);
        fixture.file_with_mtime("same.js", 2_000);
        fixture.file_with_mtime("new.js", 3_000);
        fixture.file_with_mtime("new.txt", 3_000);

        let scan_with = |op: &str| {
            let mut snoop = Snoop::mtime(&fixture.root);
            snoop.cut_slash().add_extension("js").set_mtime(2_000);
            snoop.set_mtime_operator(op).unwrap();
            let found: Vec<String> = snoop
                .scan()
                .unwrap()
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
            found
        };

        assert_eq!(scan_with("<="), ["new.js", "same.js"]);
        assert_eq!(scan_with("<"), ["new.js"]);
        assert_eq!(scan_with(">"), ["old.js"]);
        assert_eq!(scan_with(">="), ["old.js", "same.js"]);
    }

    #[test]
    fn mtime_constructor_defaults() {
        let fixture = Fixture::new("mtime_defaults");
        fixture.file_with_mtime("sub/ancient.txt", 10);
        fixture.file_with_mtime("sub/future.txt", i64::from(i32::MAX));

        let mut snoop = Snoop::mtime(&fixture.root);
        let filter = snoop.mtime_filter().unwrap();
        assert!(filter.accepted().less && filter.accepted().equal);
        assert!(!filter.accepted().greater);

        // recursive and trimmed, the default keeps files with now <= mtime
        assert_eq!(relative(snoop.scan().unwrap()), ["/sub/future.txt"]);
    }

    #[test]
    fn invalid_operator_keeps_previous_configuration() {
        let mut snoop = Snoop::mtime("/nonexistent");
        snoop.set_mtime(42);
        snoop.set_mtime_operator(">").unwrap();
        let before = snoop.mtime_filter();

        for bad in ["=", "!=", "=>", ""] {
            let err = snoop.set_mtime_operator(bad).unwrap_err();
            assert!(matches!(err, SnoopError::InvalidMtimeOperator(ref op) if op == bad));
            assert_eq!(snoop.mtime_filter(), before);
        }
    }

    #[test]
    fn plain_scanner_has_no_mtime_layer_until_asked() {
        let fixture = Fixture::new("mtime_lazy");
        fixture.file_with_mtime("old.txt", 10);

        let mut snoop = Snoop::new(&fixture.root);
        assert!(snoop.mtime_filter().is_none());
        assert_eq!(snoop.scan().unwrap().len(), 1);

        snoop.set_mtime(20);
        assert_eq!(snoop.mtime_filter().unwrap().reference(), 20);
        assert!(snoop.scan().unwrap().is_empty());
    }

    #[test]
    fn hidden_entries_are_kept_unless_hidden() {
        let fixture = Fixture::new("hidden");
        fixture.file(".env");
        fixture.file(".git/config");
        fixture.file("visible.txt");

        let mut all = Snoop::new(&fixture.root);
        all.recursive().cut_base_path().cut_slash();
        assert_eq!(relative(all.scan().unwrap()), [".env", ".git/config", "visible.txt"]);

        let mut visible = Snoop::new(&fixture.root);
        visible.recursive().hide_hidden().cut_base_path().cut_slash();
        assert_eq!(relative(visible.scan().unwrap()), ["visible.txt"]);
    }

    #[test]
    fn custom_predicate_runs_first() {
        fn not_tests(path: &Path) -> bool {
            !path.to_string_lossy().contains("/tests/")
        }

        let fixture = Fixture::new("custom");
        fixture.file("src/a.rs");
        fixture.file("tests/b.rs");

        let mut snoop = Snoop::new(&fixture.root);
        snoop
            .recursive()
            .with_filter(not_tests)
            .cut_base_path()
            .cut_slash();
        assert_eq!(relative(snoop.scan().unwrap()), ["src/a.rs"]);
    }

    #[test]
    fn symlinks_are_resolved() {
        let fixture = Fixture::new("symlinks");
        let target = fixture.file("real/file.txt");
        std::os::unix::fs::symlink(&target, fixture.path("link.txt")).unwrap();
        std::os::unix::fs::symlink(fixture.path("real"), fixture.path("linkdir")).unwrap();
        std::os::unix::fs::symlink(fixture.path("gone"), fixture.path("dangling")).unwrap();

        let mut snoop = Snoop::new(&fixture.root);
        snoop.recursive().cut_base_path().cut_slash();
        assert_eq!(
            relative(snoop.scan().unwrap()),
            ["link.txt", "linkdir/file.txt", "real/file.txt"]
        );
    }

    #[test]
    fn symlink_loop_propagates_or_is_collected() {
        let fixture = Fixture::new("symlink_loop");
        let top = fixture.file("a.js");
        fixture.dir("sub");
        std::os::unix::fs::symlink(&fixture.root, fixture.path("sub/loop")).unwrap();

        let mut strict = Snoop::new(&fixture.root);
        strict.recursive().add_extension("js");
        let err = strict.scan().unwrap_err();
        assert!(matches!(err, SnoopError::TooManySymbolicLinks(_)));
        assert!(strict.is_empty());

        let mut lenient = Snoop::new(&fixture.root);
        lenient.recursive().collect_errors().add_extension("js");
        let results = lenient.scan().unwrap();
        assert_eq!(results.first(), Some(&top));
        // the loop is followed until the kernel refuses to resolve it
        assert!(results.len() > 1);
        assert!(results.iter().all(|path| path.ends_with("a.js")));

        assert_eq!(lenient.errors().len(), 1);
        let skipped = &lenient.errors()[0];
        assert!(skipped.dir().ends_with("sub/loop"));
        assert!(matches!(
            skipped.error(),
            SnoopError::TooManySymbolicLinks(_)
        ));
    }

    #[test]
    fn unreadable_subdirectory_propagates_or_is_collected() {
        use std::os::unix::fs::PermissionsExt as _;

        if is_root() {
            // root can read anything, nothing to test
            return;
        }

        let fixture = Fixture::new("unreadable");
        fixture.file("a.txt");
        let locked = fixture.dir("locked");
        fixture.file("locked/secret.txt");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let mut strict = Snoop::new(&fixture.root);
        strict.recursive();
        let err = strict.scan().unwrap_err();
        assert!(matches!(err, SnoopError::AccessDenied(_)));
        assert!(strict.is_empty());

        let mut lenient = Snoop::new(&fixture.root);
        lenient.recursive().collect_errors().cut_base_path().cut_slash();
        assert_eq!(relative(lenient.scan().unwrap()), ["a.txt"]);
        assert_eq!(lenient.errors().len(), 1);
        assert_eq!(lenient.errors()[0].dir(), locked.as_path());

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
