//! Copy new and changed styles from the source checkout into the
//! distribution checkout.
//!
//! Only the source root and its single dependent directory are scanned, and
//! neither recursively. Every in-scope path ends up in
//! [`SyncResult::retained`], whatever its classification, so the pruner can
//! tell which distribution files are still wanted.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use stylesync_core::{SyncConfig, VersionControl};

use crate::diff::{classify, stamp_metadata, Classification};
use crate::error::{io_err, SyncError};
use crate::timestamp;
use crate::writer::atomic_write;

/// Outcome of one planner pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncResult {
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
    /// Distribution-relative paths that must survive pruning.
    pub retained: HashSet<PathBuf>,
}

impl SyncResult {
    fn record(&mut self, rel_path: PathBuf, class: Classification) {
        match class {
            Classification::New => self.added += 1,
            Classification::Changed => self.updated += 1,
            Classification::Unchanged => self.skipped += 1,
        }
        self.retained.insert(rel_path);
    }
}

/// Sync every in-scope style from `config.source_root` to `config.distribution_root`.
pub fn sync_styles(config: &SyncConfig, vcs: &dyn VersionControl) -> Result<SyncResult, SyncError> {
    tracing::info!("Processing files");

    let dependent = config.distribution_root.join(&config.dependent_dir);
    std::fs::create_dir_all(&dependent).map_err(|e| io_err(&dependent, e))?;

    let mut result = SyncResult::default();
    for rel_path in collect_source_styles(config)? {
        let class = sync_one(config, vcs, &rel_path)?;
        result.record(rel_path, class);
    }
    Ok(result)
}

fn sync_one(
    config: &SyncConfig,
    vcs: &dyn VersionControl,
    rel_path: &Path,
) -> Result<Classification, SyncError> {
    let source_path = config.source_root.join(rel_path);
    let dist_path = config.distribution_root.join(rel_path);

    let source = std::fs::read(&source_path).map_err(|e| io_err(&source_path, e))?;
    let existing = read_if_exists(&dist_path)?;

    let class = classify(&source, existing.as_deref());
    match class {
        Classification::New => tracing::info!("Adding {}", rel_path.display()),
        Classification::Changed => tracing::info!("Updating {}", rel_path.display()),
        Classification::Unchanged => return Ok(class),
    }

    let updated = timestamp::resolve(vcs, &config.source_root, rel_path)?;
    atomic_write(&dist_path, stamp_metadata(&source, &updated))?;
    Ok(class)
}

/// In-scope style paths relative to the source root, sorted.
pub fn collect_source_styles(config: &SyncConfig) -> Result<Vec<PathBuf>, SyncError> {
    let mut paths = list_styles_in(config, &config.source_root, Path::new(""))?;
    let dependent = config.source_root.join(&config.dependent_dir);
    if dependent.is_dir() {
        paths.extend(list_styles_in(config, &dependent, Path::new(&config.dependent_dir))?);
    }
    paths.sort();
    Ok(paths)
}

/// Style files directly inside `dir`, joined onto `prefix`.
fn list_styles_in(config: &SyncConfig, dir: &Path, prefix: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let ty = entry.file_type().map_err(|e| io_err(entry.path(), e))?;
        if !ty.is_file() {
            continue;
        }
        let name = PathBuf::from(entry.file_name());
        if config.is_style_file(&name) {
            paths.push(prefix.join(name));
        }
    }
    Ok(paths)
}

fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>, SyncError> {
    match std::fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use stylesync_core::VcsError;
    use tempfile::TempDir;

    /// Reports the same commit time for every path and records the lookups.
    #[derive(Default)]
    struct StubHistory {
        lookups: Mutex<Vec<PathBuf>>,
    }

    impl VersionControl for StubHistory {
        fn checkout(&self, _: &Path, _: &str) -> Result<(), VcsError> {
            Ok(())
        }
        fn pull(&self, _: &Path) -> Result<(), VcsError> {
            Ok(())
        }
        fn add_all(&self, _: &Path) -> Result<(), VcsError> {
            Ok(())
        }
        fn commit_all(&self, _: &Path, _: &str) -> Result<(), VcsError> {
            Ok(())
        }
        fn push(&self, _: &Path) -> Result<(), VcsError> {
            Ok(())
        }
        fn head_commit(&self, _: &Path) -> Result<String, VcsError> {
            Ok("f".repeat(40))
        }
        fn last_commit_time(&self, _: &Path, rel: &Path) -> Result<Option<String>, VcsError> {
            self.lookups.lock().unwrap().push(rel.to_path_buf());
            Ok(Some("2024-03-01 12:00:00 +0200".to_string()))
        }
        fn tracked_files(&self, _: &Path) -> Result<Vec<String>, VcsError> {
            Ok(vec![])
        }
    }

    fn style(title: &str, updated: &str) -> String {
        format!("<style><info><title>{title}</title><updated>{updated}</updated></info></style>\n")
    }

    struct Fixture {
        _source: TempDir,
        _dist: TempDir,
        config: SyncConfig,
    }

    fn fixture() -> Fixture {
        let source = TempDir::new().unwrap();
        let dist = TempDir::new().unwrap();
        let config = SyncConfig::new(source.path(), dist.path());
        Fixture {
            _source: source,
            _dist: dist,
            config,
        }
    }

    fn put(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn new_files_are_added_with_resolved_timestamp() {
        let fx = fixture();
        put(&fx.config.source_root, "apa.csl", &style("APA", "2000-01-01T00:00:00+00:00"));
        put(&fx.config.source_root, "dependent/nature.csl", &style("Nature", ""));

        let vcs = StubHistory::default();
        let result = sync_styles(&fx.config, &vcs).unwrap();

        assert_eq!((result.added, result.updated, result.skipped), (2, 0, 0));
        let written = fs::read_to_string(fx.config.distribution_root.join("apa.csl")).unwrap();
        assert_eq!(written, style("APA", "2024-03-01T10:00:00+00:00"));
        let dependent =
            fs::read_to_string(fx.config.distribution_root.join("dependent/nature.csl")).unwrap();
        assert_eq!(dependent, style("Nature", "2024-03-01T10:00:00+00:00"));
    }

    #[test]
    fn changed_file_is_updated_and_unchanged_is_skipped() {
        let fx = fixture();
        put(&fx.config.source_root, "apa.csl", &style("APA 7th", "x"));
        put(&fx.config.source_root, "mla.csl", &style("MLA", "x"));
        put(&fx.config.distribution_root, "apa.csl", &style("APA", "2020-01-01T00:00:00+00:00"));
        put(&fx.config.distribution_root, "mla.csl", &style("MLA", "2020-01-01T00:00:00+00:00"));

        let vcs = StubHistory::default();
        let result = sync_styles(&fx.config, &vcs).unwrap();

        assert_eq!((result.added, result.updated, result.skipped), (0, 1, 1));
        assert_eq!(*vcs.lookups.lock().unwrap(), vec![PathBuf::from("apa.csl")]);
        let mla = fs::read_to_string(fx.config.distribution_root.join("mla.csl")).unwrap();
        assert_eq!(mla, style("MLA", "2020-01-01T00:00:00+00:00"), "skipped file untouched");
    }

    #[test]
    fn every_in_scope_path_is_retained() {
        let fx = fixture();
        put(&fx.config.source_root, "apa.csl", &style("APA", ""));
        put(&fx.config.source_root, "dependent/nature.csl", &style("Nature", ""));
        put(&fx.config.distribution_root, "apa.csl", &style("APA", "old"));

        let result = sync_styles(&fx.config, &StubHistory::default()).unwrap();
        let expected: HashSet<PathBuf> =
            [PathBuf::from("apa.csl"), PathBuf::from("dependent/nature.csl")]
                .into_iter()
                .collect();
        assert_eq!(result.retained, expected);
    }

    #[test]
    fn out_of_scope_files_are_ignored() {
        let fx = fixture();
        put(&fx.config.source_root, "README.md", "readme");
        put(&fx.config.source_root, "renamed-styles.json", "{}");
        put(&fx.config.source_root, "spec/test.csl", &style("Nested", ""));
        put(&fx.config.source_root, "dependent/deeper/x.csl", &style("Deeper", ""));

        let result = sync_styles(&fx.config, &StubHistory::default()).unwrap();
        assert_eq!(result, SyncResult::default());
        assert!(!fx.config.distribution_root.join("spec").exists());
        assert!(!fx.config.distribution_root.join("dependent/deeper").exists());
    }

    #[test]
    fn non_utf8_style_is_copied_byte_for_byte() {
        let fx = fixture();
        let source_path = fx.config.source_root.join("revue.csl");
        fs::write(
            &source_path,
            b"<title>Revue d'\xe9tudes</title>\r\n<updated/>\n<updated></updated>\xff",
        )
        .unwrap();

        let result = sync_styles(&fx.config, &StubHistory::default()).unwrap();

        assert_eq!(result.added, 1);
        assert_eq!(
            fs::read(fx.config.distribution_root.join("revue.csl")).unwrap(),
            b"<title>Revue d'\xe9tudes</title>\r\n<updated/>\n<updated>2024-03-01T10:00:00+00:00</updated>\xff"
        );
    }

    #[test]
    fn dependent_dir_is_created_even_when_empty() {
        let fx = fixture();
        put(&fx.config.source_root, "apa.csl", &style("APA", ""));
        sync_styles(&fx.config, &StubHistory::default()).unwrap();
        assert!(fx.config.distribution_root.join("dependent").is_dir());
    }

    #[test]
    fn second_pass_skips_everything() {
        let fx = fixture();
        put(&fx.config.source_root, "apa.csl", &style("APA", ""));
        put(&fx.config.source_root, "dependent/nature.csl", &style("Nature", ""));

        let vcs = StubHistory::default();
        sync_styles(&fx.config, &vcs).unwrap();
        let second = sync_styles(&fx.config, &vcs).unwrap();
        assert_eq!((second.added, second.updated, second.skipped), (0, 0, 2));
    }

    #[test]
    fn missing_history_aborts_the_pass() {
        let fx = fixture();
        put(&fx.config.source_root, "apa.csl", &style("APA", ""));

        struct Empty;
        impl VersionControl for Empty {
            fn checkout(&self, _: &Path, _: &str) -> Result<(), VcsError> {
                Ok(())
            }
            fn pull(&self, _: &Path) -> Result<(), VcsError> {
                Ok(())
            }
            fn add_all(&self, _: &Path) -> Result<(), VcsError> {
                Ok(())
            }
            fn commit_all(&self, _: &Path, _: &str) -> Result<(), VcsError> {
                Ok(())
            }
            fn push(&self, _: &Path) -> Result<(), VcsError> {
                Ok(())
            }
            fn head_commit(&self, _: &Path) -> Result<String, VcsError> {
                Ok(String::new())
            }
            fn last_commit_time(&self, _: &Path, _: &Path) -> Result<Option<String>, VcsError> {
                Ok(None)
            }
            fn tracked_files(&self, _: &Path) -> Result<Vec<String>, VcsError> {
                Ok(vec![])
            }
        }

        let err = sync_styles(&fx.config, &Empty).unwrap_err();
        assert!(matches!(err, SyncError::MissingHistory { .. }), "got {err:?}");
        assert!(!fx.config.distribution_root.join("apa.csl").exists());
    }
}
