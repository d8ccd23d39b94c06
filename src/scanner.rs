//! Directory scanner for compiled classes.
//!
//! Walks one subtree per scope below the root (or the root itself when no
//! scope is set), maps every candidate `.class` file back to its dotted
//! identifier and keeps those the caller's predicate accepts.

use anyhow::{Context, Result};
use ignore::{Walk, WalkBuilder};
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, warn};

use crate::error::{ResolveError, ScanError};
use crate::locale::{Locale, LogCode};
use crate::naming::{check_candidate, package_to_path, path_to_identifier};
use crate::registry::{Marker, TypeResolver};

pub fn default_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to resolve current working directory")?;
    Ok(cwd.join("target").join("classes"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub identifier: String,
}

#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    scopes: BTreeSet<String>,
    matches: Vec<String>,
    locale: Locale,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            scopes: BTreeSet::new(),
            matches: Vec::new(),
            locale: Locale::default(),
        }
    }

    /// Scanner rooted at `<cwd>/target/classes`.
    pub fn from_working_dir() -> Result<Self> {
        Ok(Self::new(default_root()?))
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    /// Results of the most recent scan.
    pub fn matches(&self) -> &[String] {
        &self.matches
    }

    pub fn add_scope(&mut self, name: &str) -> Result<(), ScanError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScanError::InvalidArgument {
                name: "scope",
                reason: "must not be empty",
            });
        }

        self.scopes.insert(name.to_string());
        self.log(LogCode::ScopeAdded, name);
        Ok(())
    }

    pub fn clear_scopes(&mut self) {
        self.scopes.clear();
        self.log(LogCode::ScopesCleared, "");
    }

    /// Directories walked by a scan. With no scopes the root is walked
    /// directly; it is never added to the scope set.
    pub fn scope_dirs(&self) -> Vec<PathBuf> {
        if self.scopes.is_empty() {
            return vec![self.root.clone()];
        }
        self.scopes
            .iter()
            .map(|scope| package_to_path(&self.root, scope))
            .collect()
    }

    /// Lazily walks every scope and yields accepted candidate files in
    /// scope order, then file-name order within each directory.
    pub fn candidates(&self) -> impl Iterator<Item = Candidate> + '_ {
        self.scope_dirs()
            .into_iter()
            .flat_map(move |dir| {
                self.log(LogCode::ScanningDirectory, &dir.to_string_lossy());
                walker(&dir)
            })
            .filter_map(move |entry| self.accept(entry))
    }

    pub fn find_with<F>(&mut self, mut predicate: F) -> &[String]
    where
        F: FnMut(&str) -> Result<bool, ResolveError>,
    {
        self.matches.clear();
        self.log(LogCode::ScanStarted, &self.root.to_string_lossy());

        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for candidate in self.candidates() {
            if seen.contains(&candidate.identifier) {
                continue;
            }

            match predicate(&candidate.identifier) {
                Ok(true) => {
                    self.log(LogCode::Matched, &candidate.path.to_string_lossy());
                    seen.insert(candidate.identifier.clone());
                    found.push(candidate.identifier);
                }
                Ok(false) => {
                    seen.insert(candidate.identifier);
                }
                Err(err) => {
                    warn!(
                        identifier = %candidate.identifier,
                        error = %err,
                        "type resolution failed, skipping"
                    );
                    seen.insert(candidate.identifier);
                }
            }
        }

        self.matches = found;
        &self.matches
    }

    pub fn find_marked<R>(&mut self, resolver: &R, marker: &Marker) -> &[String]
    where
        R: TypeResolver + ?Sized,
    {
        self.find_with(|identifier| {
            resolver
                .resolve(identifier)
                .map(|resolved| {
                    let carries = resolved.carries(marker);
                    if carries {
                        debug!(type_name = %resolved.name, %marker, "marker present");
                    }
                    carries
                })
        })
    }

    fn accept(&self, entry: Result<ignore::DirEntry, ignore::Error>) -> Option<Candidate> {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                self.warn(LogCode::Unreadable, &err.to_string());
                return None;
            }
        };

        let file_type = entry.file_type()?;
        let path = entry.path();
        if file_type.is_dir() {
            if entry.depth() > 0 {
                self.log(LogCode::ScanningDirectory, &path.to_string_lossy());
            }
            return None;
        }
        if !file_type.is_file() {
            return None;
        }

        self.log(LogCode::CheckingFile, &path.to_string_lossy());

        let file_name = entry.file_name().to_string_lossy();
        if !check_candidate(&file_name).is_accepted() {
            self.log(LogCode::Rejected, &path.to_string_lossy());
            return None;
        }

        if let Err(err) = File::open(path) {
            self.warn(
                LogCode::Unreadable,
                &format!("{} ({err})", path.display()),
            );
            return None;
        }

        let Some(identifier) = path_to_identifier(&self.root, path) else {
            warn!(
                error = %ResolveError::InvalidIdentifier(path.display().to_string()),
                "type resolution failed, skipping"
            );
            return None;
        };

        Some(Candidate {
            path: path.to_path_buf(),
            identifier,
        })
    }

    fn log(&self, code: LogCode, subject: &str) {
        if tracing::enabled!(Level::DEBUG) {
            debug!(code = code.code(), "{}", code.render(self.locale, subject));
        }
    }

    fn warn(&self, code: LogCode, subject: &str) {
        warn!(code = code.code(), "{}", code.render(self.locale, subject));
    }
}

fn walker(dir: &Path) -> Walk {
    WalkBuilder::new(dir)
        .hidden(true)
        .parents(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MarkerRegistry;
    use std::fs;
    use tempfile::TempDir;

    const MARKER: &str = "app.annotations.MyAnnotation";

    fn marker() -> Marker {
        Marker::new(MARKER).unwrap()
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"\xca\xfe\xba\xbe").unwrap();
    }

    /// Two packages with two marked classes and one plain class each, plus
    /// descriptors and sources that must never be reported.
    fn media_tree() -> (TempDir, MarkerRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for file in [
            "app/films/Comedy.class",
            "app/films/Drama.class",
            "app/films/Poster.class",
            "app/films/package-info.class",
            "app/films/Drama.java",
            "app/musics/Jazz.class",
            "app/musics/Rock.class",
            "app/musics/Lyrics.class",
            "app/books/Novel.class",
            "module-info.class",
        ] {
            touch(root, file);
        }

        let registry = MarkerRegistry::from_entries([
            ("app.films.Comedy", vec![marker()]),
            ("app.films.Drama", vec![marker()]),
            ("app.films.Poster", vec![]),
            ("app.films.package-info", vec![marker()]),
            ("app.musics.Jazz", vec![marker()]),
            ("app.musics.Rock", vec![marker()]),
            ("app.musics.Lyrics", vec![]),
            ("app.books.Novel", vec![marker()]),
            ("module-info", vec![marker()]),
        ]);
        (dir, registry)
    }

    #[test]
    fn find_marked_limits_results_to_scoped_packages() {
        let (dir, registry) = media_tree();
        let mut scanner = Scanner::new(dir.path());
        scanner.add_scope("app.films").unwrap();
        scanner.add_scope("app.musics").unwrap();

        let found = scanner.find_marked(&registry, &marker()).to_vec();
        assert_eq!(
            found,
            vec![
                "app.films.Comedy",
                "app.films.Drama",
                "app.musics.Jazz",
                "app.musics.Rock",
            ]
        );
    }

    #[test]
    fn empty_scope_walks_root() {
        let (dir, registry) = media_tree();
        let mut scanner = Scanner::new(dir.path());
        let from_root = scanner.find_marked(&registry, &marker()).to_vec();
        assert_eq!(from_root.len(), 5);
        assert!(from_root.contains(&"app.books.Novel".to_string()));
        assert_eq!(scanner.scopes().count(), 0);

        let mut explicit = Scanner::new(dir.path());
        explicit.add_scope("app").unwrap();
        assert_eq!(explicit.find_marked(&registry, &marker()), from_root.as_slice());
    }

    #[test]
    fn reserved_descriptors_are_never_reported() {
        let (dir, registry) = media_tree();
        let mut scanner = Scanner::new(dir.path());
        let found = scanner.find_marked(&registry, &marker());
        assert!(!found.iter().any(|id| id.ends_with("package-info")));
        assert!(!found.iter().any(|id| id == "module-info"));
    }

    #[test]
    fn add_scope_is_idempotent_and_rejects_blank() {
        let (dir, registry) = media_tree();
        let mut scanner = Scanner::new(dir.path());
        scanner.add_scope("app.films").unwrap();
        scanner.add_scope("app.films").unwrap();
        assert_eq!(scanner.scopes().collect::<Vec<_>>(), vec!["app.films"]);
        assert_eq!(scanner.find_marked(&registry, &marker()).len(), 2);

        assert!(matches!(
            scanner.add_scope(" "),
            Err(ScanError::InvalidArgument { name: "scope", .. })
        ));
    }

    #[test]
    fn clear_scopes_falls_back_to_root() {
        let (dir, registry) = media_tree();
        let mut scanner = Scanner::new(dir.path());
        scanner.add_scope("app.films").unwrap();
        assert_eq!(scanner.find_marked(&registry, &marker()).len(), 2);

        scanner.clear_scopes();
        assert_eq!(scanner.find_marked(&registry, &marker()).len(), 5);
        assert_eq!(scanner.scope_dirs(), vec![dir.path().to_path_buf()]);
    }

    #[test]
    fn overlapping_scopes_do_not_duplicate_matches() {
        let (dir, registry) = media_tree();
        let mut scanner = Scanner::new(dir.path());
        scanner.add_scope("app").unwrap();
        scanner.add_scope("app.films").unwrap();
        assert_eq!(scanner.find_marked(&registry, &marker()).len(), 5);
    }

    #[test]
    fn unresolvable_types_and_missing_scopes_are_skipped() {
        let (dir, _) = media_tree();
        touch(dir.path(), "app/films/Ghost.class");
        let registry = MarkerRegistry::from_entries([("app.films.Comedy", vec![marker()])]);

        let mut scanner = Scanner::new(dir.path());
        scanner.add_scope("app.films").unwrap();
        scanner.add_scope("app.nowhere").unwrap();
        assert_eq!(
            scanner.find_marked(&registry, &marker()),
            ["app.films.Comedy".to_string()]
        );
    }

    #[test]
    fn hidden_entries_are_skipped() {
        let (dir, mut registry) = media_tree();
        touch(dir.path(), "app/.cache/Hidden.class");
        touch(dir.path(), "app/films/.Shadow.class");
        registry.insert("app..cache.Hidden", [marker()]);
        registry.insert("app.films..Shadow", [marker()]);

        let mut scanner = Scanner::new(dir.path());
        assert_eq!(scanner.find_marked(&registry, &marker()).len(), 5);
    }

    #[test]
    fn missing_root_degrades_to_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut scanner = Scanner::new(dir.path().join("target").join("classes"));
        assert!(scanner.find_marked(&MarkerRegistry::new(), &marker()).is_empty());
    }

    #[test]
    fn accumulator_is_reset_between_scans() {
        let (dir, registry) = media_tree();
        let mut scanner = Scanner::new(dir.path());
        scanner.add_scope("app.films").unwrap();
        scanner.find_marked(&registry, &marker());

        let other = Marker::new("app.annotations.Unused").unwrap();
        assert!(scanner.find_marked(&registry, &other).is_empty());
        assert!(scanner.matches().is_empty());
    }

    #[test]
    fn candidates_lists_class_files_in_file_name_order() {
        let (dir, _) = media_tree();
        let mut scanner = Scanner::new(dir.path());
        scanner.add_scope("app.musics").unwrap();
        let ids: Vec<String> = scanner.candidates().map(|c| c.identifier).collect();
        assert_eq!(ids, vec!["app.musics.Jazz", "app.musics.Lyrics", "app.musics.Rock"]);
    }

    #[test]
    fn find_with_treats_predicate_errors_as_false() {
        let (dir, _) = media_tree();
        let mut scanner = Scanner::new(dir.path());
        scanner.add_scope("app.films").unwrap();
        let found = scanner.find_with(|id| {
            if id.ends_with("Drama") {
                Err(ResolveError::NotFound(id.to_string()))
            } else {
                Ok(true)
            }
        });
        assert_eq!(found, ["app.films.Comedy", "app.films.Poster"]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subtree_does_not_stop_siblings() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, registry) = media_tree();
        let locked = dir.path().join("app").join("books");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let enforced = fs::read_dir(&locked).is_err();

        let mut scanner = Scanner::new(dir.path());
        let found = scanner.find_marked(&registry, &marker()).to_vec();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        for expected in ["app.films.Comedy", "app.films.Drama", "app.musics.Jazz", "app.musics.Rock"] {
            assert!(found.contains(&expected.to_string()), "missing {expected}");
        }
        if enforced {
            assert!(!found.contains(&"app.books.Novel".to_string()));
        }
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_class_file_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, registry) = media_tree();
        let locked = dir.path().join("app").join("films").join("Drama.class");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if File::open(&locked).is_ok() {
            // Permission bits are not enforced for this user.
            return;
        }

        let mut scanner = Scanner::new(dir.path());
        scanner.add_scope("app.films").unwrap();
        let ids: Vec<String> = scanner.candidates().map(|c| c.identifier).collect();
        let found = scanner.find_marked(&registry, &marker()).to_vec();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

        assert_eq!(ids, vec!["app.films.Comedy", "app.films.Poster"]);
        assert_eq!(found, vec!["app.films.Comedy"]);
    }

    #[test]
    fn scope_dirs_never_leave_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut scanner = Scanner::new(dir.path());
        for scope in ["../x", "app./etc", "/"] {
            scanner.add_scope(scope).unwrap();
        }
        let dirs = scanner.scope_dirs();
        assert_eq!(dirs.len(), 3);
        assert!(dirs.iter().all(|d| d.starts_with(dir.path())), "{dirs:?}");
    }

    #[test]
    fn locale_is_held_per_instance() {
        let mut scanner = Scanner::new("/tmp").with_locale(Locale::EnUs);
        assert_eq!(scanner.locale(), Locale::EnUs);
        scanner.set_locale(Locale::RuRu);
        assert_eq!(scanner.locale(), Locale::RuRu);
    }
}
