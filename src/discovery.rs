use crate::error::Error;
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

/// Compile a report file pattern that matches the whole path, with every
/// `/` also accepting `\` so the same pattern works on any platform
pub fn platform_independent_pattern(pattern: &str) -> Result<Regex, Error> {
    let portable = pattern.replace('/', r"(?:/|\\)");
    Regex::new(&format!("^(?:{})$", portable)).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Build a glob set from exclude patterns; any invalid glob is an error
pub fn build_globset(patterns: &[String]) -> Result<GlobSet, Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| Error::InvalidGlob {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| Error::InvalidGlob {
        pattern: patterns.join(", "),
        source,
    })
}

/// Find report files under `root`
///
/// Files are returned in a stable order (directory walk sorted by file
/// name). The walk starts from the canonical form of `root`, so returned
/// paths are absolute and `pattern` is matched against the full absolute
/// path. `exclude` globs are matched against the path relative to `root`.
pub fn find_all_reports(
    root: &Path,
    pattern: Option<&Regex>,
    exclude: Option<&GlobSet>,
) -> Vec<PathBuf> {
    let root = match root.canonicalize() {
        Ok(canonical) => canonical,
        Err(e) => {
            warn!("Cannot resolve {}, walking it as given: {}", root.display(), e);
            root.to_path_buf()
        }
    };
    let root = root.as_path();
    let mut reports = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if let Some(pattern) = pattern {
            if !pattern.is_match(&path.to_string_lossy()) {
                continue;
            }
        }
        if let Some(exclude) = exclude {
            let relative = path.strip_prefix(root).unwrap_or(path);
            if exclude.is_match(relative) {
                trace!("Excluded {}", path.display());
                continue;
            }
        }

        trace!("Found report {}", path.display());
        reports.push(path.to_path_buf());
    }

    debug!("Found {} reports under {}", reports.len(), root.display());
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    fn names(root: &Path, reports: &[PathBuf]) -> Vec<String> {
        let root = root.canonicalize().unwrap();
        reports
            .iter()
            .map(|p| {
                p.strip_prefix(&root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_slash_matches_backslash() {
        let regex = platform_independent_pattern(r".*/reports/.*\.txt").unwrap();
        assert!(regex.is_match("/build/reports/lint.txt"));
        assert!(regex.is_match(r"C:\build\reports\lint.txt"));
        assert!(!regex.is_match("/build/reports/lint.xml"));
    }

    #[test]
    fn test_pattern_matches_whole_path() {
        let regex = platform_independent_pattern(r"lint\.txt").unwrap();
        assert!(regex.is_match("lint.txt"));
        assert!(!regex.is_match("/build/lint.txt"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = platform_independent_pattern("(unclosed").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_invalid_glob() {
        let err = build_globset(&["a/{b".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidGlob { .. }));
    }

    #[test]
    fn test_find_all_reports_is_sorted() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b/report.txt");
        touch(dir.path(), "a/report.txt");
        touch(dir.path(), "a/other.log");
        touch(dir.path(), "c.txt");

        let reports = find_all_reports(dir.path(), None, None);
        assert_eq!(
            names(dir.path(), &reports),
            vec!["a/other.log", "a/report.txt", "b/report.txt", "c.txt"]
        );
        assert_eq!(reports, find_all_reports(dir.path(), None, None));
    }

    #[test]
    fn test_pattern_sees_resolved_absolute_path() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "build/reports/lint.txt");
        touch(dir.path(), "build/tmp/keep");

        let pattern = platform_independent_pattern(r".*/build/reports/.*\.txt").unwrap();
        let indirect = dir.path().join("build/tmp/../reports");
        let reports = find_all_reports(&indirect, Some(&pattern), None);

        assert_eq!(reports.len(), 1);
        assert!(reports[0].is_absolute());
        assert!(reports[0].ends_with("build/reports/lint.txt"));
    }

    #[test]
    fn test_find_all_reports_with_pattern_and_exclude() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a/report.txt");
        touch(dir.path(), "a/other.log");
        touch(dir.path(), "vendor/report.txt");

        let pattern = platform_independent_pattern(r".*/report\.txt").unwrap();
        let exclude = build_globset(&["vendor/**".to_string()]).unwrap();
        let reports = find_all_reports(dir.path(), Some(&pattern), Some(&exclude));
        assert_eq!(names(dir.path(), &reports), vec!["a/report.txt"]);
    }
}
