//! Search controller
//!
//! Drives the locator across a start directory and its ancestors, memoizing
//! one outcome per queried directory. The cache is owned by the resolver
//! instance; there is no global state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::core::paths::canonical;
use crate::resolver::config::{ConfigError, ResolverConfig};
use crate::resolver::fs::{FileSystem, OsFileSystem};
use crate::resolver::locate::{locate_in_directory, Pass};
use crate::resolver::log::Reporter;

/// Outcome of one resolution call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOutcome {
    /// The resolved environment, if any
    pub path: Option<PathBuf>,

    /// Which pass matched (absent for cache hits and misses)
    pub pass: Option<Pass>,

    /// Ancestor levels climbed before the match (absent for cache hits and misses)
    pub depth: Option<usize>,

    /// Whether the outcome was served from the cache
    pub cached: bool,
}

impl ResolveOutcome {
    fn cached(path: Option<PathBuf>) -> Self {
        Self {
            path,
            pass: None,
            depth: None,
            cached: true,
        }
    }

    fn found(path: PathBuf, pass: Pass, depth: usize) -> Self {
        Self {
            path: Some(path),
            pass: Some(pass),
            depth: Some(depth),
            cached: false,
        }
    }

    fn miss() -> Self {
        Self {
            path: None,
            pass: None,
            depth: None,
            cached: false,
        }
    }
}

/// Locates the nearest virtual environment for queried directories
pub struct Resolver<F: FileSystem = OsFileSystem> {
    config: ResolverConfig,
    fingerprint: String,
    fs: F,
    reporter: Reporter,
    cache: Mutex<HashMap<PathBuf, Option<PathBuf>>>,
}

impl Resolver<OsFileSystem> {
    /// Create a resolver over the real filesystem
    pub fn new(config: ResolverConfig) -> Result<Self, ConfigError> {
        Self::with_fs(config, OsFileSystem)
    }
}

impl<F: FileSystem> Resolver<F> {
    /// Create a resolver over a caller-supplied filesystem
    pub fn with_fs(config: ResolverConfig, fs: F) -> Result<Self, ConfigError> {
        config.validate()?;
        let fingerprint = config.fingerprint();
        let reporter = Reporter::new(config.log_level);
        Ok(Self {
            config,
            fingerprint,
            fs,
            reporter,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Replace the reporter (e.g. to capture diagnostics in tests)
    #[allow(dead_code)]
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    #[allow(dead_code)]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the nearest virtual environment for `start`.
    ///
    /// Never fails: filesystem absence and probe errors read as "not found".
    #[allow(dead_code)]
    pub fn resolve(&self, start: &Path) -> Option<PathBuf> {
        self.resolve_entry(start).path
    }

    /// Resolve with provenance: which pass matched, how many ancestor levels
    /// were climbed, and whether the answer came from the cache.
    pub fn resolve_entry(&self, start: &Path) -> ResolveOutcome {
        let key = canonical(start);

        if let Some(hit) = self.cache().get(&key) {
            self.reporter
                .verbose(&format!("cache hit for {}", key.display()));
            return ResolveOutcome::cached(hit.clone());
        }

        // Searched without holding the lock: a racing duplicate recomputes
        // the same value, and both writers store identical entries.
        let outcome = self.search(&key);
        self.cache().insert(key, outcome.path.clone());
        outcome
    }

    /// Drop all memoized outcomes
    #[allow(dead_code)]
    pub fn clear_cache(&self) {
        self.cache().clear();
        self.reporter.verbose("cache cleared");
    }

    /// Replace the configuration.
    ///
    /// Entries memoized under different markers are never served: when the
    /// replacement fingerprint differs, the cache is cleared.
    #[allow(dead_code)]
    pub fn set_config(&mut self, config: ResolverConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let fingerprint = config.fingerprint();
        if fingerprint != self.fingerprint {
            self.cache().clear();
        }
        self.reporter = Reporter::new(config.log_level);
        self.fingerprint = fingerprint;
        self.config = config;
        Ok(())
    }

    fn search(&self, start: &Path) -> ResolveOutcome {
        if let Some(located) = locate_in_directory(&self.fs, &self.config, start) {
            self.reporter.info(&format!(
                "found virtual environment at {}",
                located.path.display()
            ));
            return ResolveOutcome::found(located.path, located.pass, 0);
        }

        if self.config.search_parents {
            let mut current = start.to_path_buf();
            for depth in 1..=self.config.max_parent_depth {
                let parent = match current.parent() {
                    Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                    // Filesystem root reached: no further ancestor exists
                    _ => break,
                };
                self.reporter.verbose(&format!(
                    "no match in {}, ascending to {}",
                    current.display(),
                    parent.display()
                ));
                if let Some(located) = locate_in_directory(&self.fs, &self.config, &parent) {
                    self.reporter.info(&format!(
                        "found virtual environment at {} ({} levels up)",
                        located.path.display(),
                        depth
                    ));
                    return ResolveOutcome::found(located.path, located.pass, depth);
                }
                current = parent;
            }
        }

        self.reporter.info(&format!(
            "no virtual environment found for {}",
            start.display()
        ));
        ResolveOutcome::miss()
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<PathBuf, Option<PathBuf>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::testutil::make_env;
    use std::fs;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    /// Real filesystem plus a probe counter
    struct CountingFs {
        probes: Arc<AtomicUsize>,
    }

    impl CountingFs {
        fn new() -> (Self, Arc<AtomicUsize>) {
            let probes = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    probes: probes.clone(),
                },
                probes,
            )
        }
    }

    impl FileSystem for CountingFs {
        fn is_file(&self, path: &Path) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            OsFileSystem.is_file(path)
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            OsFileSystem.is_dir(path)
        }

        fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            OsFileSystem.list_dir(path)
        }
    }

    /// A filesystem with directories everywhere and nothing in them
    struct EmptyFs;

    impl FileSystem for EmptyFs {
        fn is_file(&self, _path: &Path) -> bool {
            false
        }

        fn is_dir(&self, _path: &Path) -> bool {
            true
        }

        fn list_dir(&self, _path: &Path) -> io::Result<Vec<PathBuf>> {
            Ok(Vec::new())
        }
    }

    fn counting_resolver(config: ResolverConfig) -> (Resolver<CountingFs>, Arc<AtomicUsize>) {
        let (fs, probes) = CountingFs::new();
        (Resolver::with_fs(config, fs).unwrap(), probes)
    }

    #[test]
    fn test_resolves_conventional_env() {
        let temp = tempdir().unwrap();
        let project = temp.path().join("project");
        fs::create_dir(&project).unwrap();
        let env = make_env(&project, ".venv");

        let resolver = Resolver::new(ResolverConfig::default()).unwrap();
        assert_eq!(resolver.resolve(&project), Some(canonical(&env)));
    }

    #[test]
    fn test_missing_marker_file_is_a_miss() {
        let temp = tempdir().unwrap();
        let project = temp.path().join("project");
        fs::create_dir(&project).unwrap();
        let env = make_env(&project, ".venv");
        fs::remove_file(env.join("pyvenv.cfg")).unwrap();

        let config = ResolverConfig {
            search_parents: false,
            ..Default::default()
        };
        let resolver = Resolver::new(config).unwrap();
        assert_eq!(resolver.resolve(&project), None);
    }

    #[test]
    fn test_second_resolve_is_served_from_cache() {
        let temp = tempdir().unwrap();
        make_env(temp.path(), "venv");

        let (resolver, probes) = counting_resolver(ResolverConfig::default());
        let first = resolver.resolve(temp.path());
        assert!(first.is_some());
        assert!(probes.load(Ordering::SeqCst) > 0);

        probes.store(0, Ordering::SeqCst);
        let second = resolver.resolve(temp.path());
        assert_eq!(first, second);
        assert_eq!(probes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_miss_is_cached_too() {
        let temp = tempdir().unwrap();

        let config = ResolverConfig {
            search_parents: false,
            ..Default::default()
        };
        let (resolver, probes) = counting_resolver(config);
        assert_eq!(resolver.resolve(temp.path()), None);

        probes.store(0, Ordering::SeqCst);
        assert_eq!(resolver.resolve(temp.path()), None);
        assert_eq!(probes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cached_outcome_is_marked() {
        let temp = tempdir().unwrap();
        make_env(temp.path(), "env");

        let resolver = Resolver::new(ResolverConfig::default()).unwrap();
        let first = resolver.resolve_entry(temp.path());
        assert!(!first.cached);
        assert_eq!(first.pass, Some(Pass::Name));
        assert_eq!(first.depth, Some(0));

        let second = resolver.resolve_entry(temp.path());
        assert!(second.cached);
        assert_eq!(second.path, first.path);
        assert_eq!(second.pass, None);
        assert_eq!(second.depth, None);
    }

    #[test]
    fn test_clear_cache_forces_reprobe() {
        let temp = tempdir().unwrap();
        make_env(temp.path(), "venv");

        let (resolver, probes) = counting_resolver(ResolverConfig::default());
        let first = resolver.resolve(temp.path());

        resolver.clear_cache();
        probes.store(0, Ordering::SeqCst);
        let second = resolver.resolve(temp.path());
        assert_eq!(first, second);
        assert!(probes.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_parent_walk_finds_ancestor_env() {
        let temp = tempdir().unwrap();
        let env = make_env(temp.path(), ".venv");
        let deep = temp.path().join("src").join("pkg").join("module");
        fs::create_dir_all(&deep).unwrap();

        let resolver = Resolver::new(ResolverConfig::default()).unwrap();
        let outcome = resolver.resolve_entry(&deep);
        assert_eq!(outcome.path, Some(canonical(&env)));
        assert_eq!(outcome.depth, Some(3));
    }

    #[test]
    fn test_parent_depth_bound() {
        let temp = tempdir().unwrap();
        make_env(temp.path(), ".venv");
        let deep = temp.path().join("a").join("b").join("c");
        fs::create_dir_all(&deep).unwrap();

        // Environment lies three levels up; a bound of two never reaches it
        let config = ResolverConfig {
            max_parent_depth: 2,
            ..Default::default()
        };
        let resolver = Resolver::new(config).unwrap();
        assert_eq!(resolver.resolve(&deep), None);
    }

    #[test]
    fn test_parent_search_disabled() {
        let temp = tempdir().unwrap();
        make_env(temp.path(), ".venv");
        let child = temp.path().join("child");
        fs::create_dir(&child).unwrap();

        let config = ResolverConfig {
            search_parents: false,
            ..Default::default()
        };
        let resolver = Resolver::new(config).unwrap();
        assert_eq!(resolver.resolve(&child), None);
    }

    #[test]
    fn test_zero_depth_bound_stays_local() {
        let temp = tempdir().unwrap();
        make_env(temp.path(), ".venv");
        let child = temp.path().join("child");
        fs::create_dir(&child).unwrap();

        let config = ResolverConfig {
            max_parent_depth: 0,
            ..Default::default()
        };
        let resolver = Resolver::new(config).unwrap();
        assert_eq!(resolver.resolve(&child), None);
    }

    #[test]
    fn test_walk_from_root_terminates() {
        let resolver = Resolver::with_fs(
            ResolverConfig {
                max_parent_depth: 100,
                ..Default::default()
            },
            EmptyFs,
        )
        .unwrap();
        assert_eq!(resolver.resolve(Path::new("/")), None);
    }

    #[test]
    fn test_intermediate_ancestors_not_cached() {
        let temp = tempdir().unwrap();
        make_env(temp.path(), ".venv");
        let a = temp.path().join("a");
        let b = a.join("b");
        fs::create_dir_all(&b).unwrap();

        let (resolver, probes) = counting_resolver(ResolverConfig::default());
        let from_b = resolver.resolve(&b);
        assert!(from_b.is_some());

        // `a` was visited during the walk from `b`, but only `b` was cached
        probes.store(0, Ordering::SeqCst);
        let from_a = resolver.resolve(&a);
        assert_eq!(from_a, from_b);
        assert!(probes.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_nonexistent_start_walks_upward() {
        let temp = tempdir().unwrap();
        make_env(temp.path(), ".venv");
        let ghost = temp.path().join("not-created-yet");

        let resolver = Resolver::new(ResolverConfig::default()).unwrap();
        assert!(resolver.resolve(&ghost).is_some());
    }

    #[test]
    fn test_set_config_with_new_markers_clears_cache() {
        let temp = tempdir().unwrap();
        make_env(temp.path(), "venv");

        let (mut resolver, probes) = counting_resolver(ResolverConfig::default());
        resolver.resolve(temp.path());

        resolver
            .set_config(ResolverConfig {
                required_files: vec!["conda-meta".to_string()],
                search_parents: false,
                ..Default::default()
            })
            .unwrap();

        probes.store(0, Ordering::SeqCst);
        assert_eq!(resolver.resolve(temp.path()), None);
        assert!(probes.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_set_config_unchanged_keeps_cache() {
        let temp = tempdir().unwrap();
        make_env(temp.path(), "venv");

        let (mut resolver, probes) = counting_resolver(ResolverConfig::default());
        let first = resolver.resolve(temp.path());

        resolver.set_config(ResolverConfig::default()).unwrap();

        probes.store(0, Ordering::SeqCst);
        assert_eq!(resolver.resolve(temp.path()), first);
        assert_eq!(probes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_set_config_invalid_is_rejected() {
        let mut resolver = Resolver::new(ResolverConfig::default()).unwrap();
        let result = resolver.set_config(ResolverConfig {
            common_names: vec![String::new()],
            ..Default::default()
        });
        assert!(result.is_err());
        // The previous configuration stays in force
        assert!(!resolver.config().common_names.is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = Resolver::new(ResolverConfig {
            required_dirs: vec!["bin/python".to_string()],
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_dot_and_plain_key_share_cache_entry() {
        let temp = tempdir().unwrap();
        make_env(temp.path(), "venv");

        let (resolver, probes) = counting_resolver(ResolverConfig::default());
        resolver.resolve(temp.path());

        probes.store(0, Ordering::SeqCst);
        resolver.resolve(&temp.path().join("."));
        assert_eq!(probes.load(Ordering::SeqCst), 0);
    }
}
