//! Input file discovery
//!
//! Yields the files to ingest together with their data time. Three modes are
//! supported: a realtime watcher that polls a directory for newly arrived
//! files, an archive scan over a directory tree restricted to a time window,
//! and an explicit file list (glob patterns allowed).
//!
//! Data time comes from the file path when it carries a timestamp
//! (`YYYYMMDD_HHMMSS` or `YYYYMMDDHHMM` in the file name, or a `YYYYMMDD`
//! directory holding an `HHMMSS` file), otherwise from the modification time.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

static DATE_UNDERSCORE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{8})_(\d{6})").unwrap_or_else(|e| panic!("Invalid date pattern: {e}"))
});

static COMPACT_DATE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(\d{8})(\d{4})(?:\D|$)")
        .unwrap_or_else(|e| panic!("Invalid date pattern: {e}"))
});

static DAY_DIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{8})$").unwrap_or_else(|e| panic!("Invalid date pattern: {e}"))
});

static TIME_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{6})").unwrap_or_else(|e| panic!("Invalid time pattern: {e}"))
});

/// A file to ingest and the time its contents refer to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub data_time: DateTime<Utc>,
}

impl InputFile {
    /// Build from a path, working out its data time
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data_time = data_time_for(&path)?;
        Ok(Self { path, data_time })
    }
}

fn parse_date_time(date: &str, time: &str, time_format: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
    let time = NaiveTime::parse_from_str(time, time_format).ok()?;
    Some(NaiveDateTime::new(date, time).and_utc())
}

/// Data time encoded in a file path, if any
pub fn time_from_path(path: &Path) -> Option<DateTime<Utc>> {
    let file_name = path.file_name()?.to_str()?;

    if let Some(caps) = DATE_UNDERSCORE_TIME_RE.captures(file_name) {
        if let Some(time) = parse_date_time(&caps[1], &caps[2], "%H%M%S") {
            return Some(time);
        }
    }
    if let Some(caps) = COMPACT_DATE_TIME_RE.captures(file_name) {
        if let Some(time) = parse_date_time(&caps[1], &caps[2], "%H%M") {
            return Some(time);
        }
    }

    let dir_name = path.parent()?.file_name()?.to_str()?;
    let day = DAY_DIR_RE.captures(dir_name)?;
    let time = TIME_FILE_RE.captures(file_name)?;
    parse_date_time(&day[1], &time[1], "%H%M%S")
}

fn modified_time(path: &Path) -> Result<SystemTime> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| Error::input_file(path.display().to_string(), e.to_string()))
}

/// Data time for a file: from its path, else its modification time
pub fn data_time_for(path: &Path) -> Result<DateTime<Utc>> {
    if let Some(time) = time_from_path(path) {
        return Ok(time);
    }
    trace!("No time in path {}, using modification time", path.display());
    Ok(DateTime::<Utc>::from(modified_time(path)?))
}

/// All files under `dir` whose data time lies in `[start, end]`, oldest first
pub fn scan_archive(dir: &Path, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<InputFile>> {
    info!(
        "Scanning archive {} for files between {} and {}",
        dir.display(),
        start,
        end
    );
    if !dir.is_dir() {
        return Err(Error::input_file(
            dir.display().to_string(),
            "input directory does not exist",
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() || is_hidden(entry.path()) {
            continue;
        }
        let file = match InputFile::from_path(entry.path()) {
            Ok(file) => file,
            Err(e) => {
                warn!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        if file.data_time >= start && file.data_time <= end {
            files.push(file);
        }
    }
    files.sort_by(|a, b| a.data_time.cmp(&b.data_time).then_with(|| a.path.cmp(&b.path)));

    info!("Found {} archive files", files.len());
    Ok(files)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Expand explicit paths and glob patterns into input files, in the given order
///
/// A path that matches nothing is kept as given so that the failure to open
/// it is reported against that file.
pub fn expand_file_list(patterns: &[String]) -> Result<Vec<InputFile>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let matches: Vec<PathBuf> = match glob::glob(pattern) {
            Ok(paths) => paths.filter_map(|p| p.ok()).filter(|p| p.is_file()).collect(),
            Err(e) => {
                warn!("Invalid file pattern '{}': {}", pattern, e);
                Vec::new()
            }
        };

        if matches.is_empty() {
            let path = PathBuf::from(pattern);
            let data_time = time_from_path(&path).unwrap_or_else(Utc::now);
            files.push(InputFile { path, data_time });
            continue;
        }
        for path in matches {
            files.push(InputFile::from_path(path)?);
        }
    }
    debug!("File list expanded to {} files", files.len());
    Ok(files)
}

/// Polls a directory for files that arrived since the last poll
#[derive(Debug)]
pub struct RealtimeWatcher {
    dir: PathBuf,
    max_age: Duration,
    seen: HashMap<PathBuf, SystemTime>,
}

impl RealtimeWatcher {
    pub fn new(dir: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            dir: dir.into(),
            max_age,
            seen: HashMap::new(),
        }
    }

    /// Files modified within the maximum age and not yet returned, oldest first
    ///
    /// A file rewritten after it was returned is returned again.
    pub fn poll(&mut self) -> Result<Vec<InputFile>> {
        self.poll_at(SystemTime::now())
    }

    /// Entries that cannot be read are skipped and picked up by a later poll.
    pub(crate) fn poll_at(&mut self, now: SystemTime) -> Result<Vec<InputFile>> {
        if !self.dir.is_dir() {
            return Err(Error::input_file(
                self.dir.display().to_string(),
                "input directory does not exist",
            ));
        }

        let mut arrivals = Vec::new();
        for entry in WalkDir::new(&self.dir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", self.dir.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || is_hidden(entry.path()) {
                continue;
            }

            let modified = match modified_time(entry.path()) {
                Ok(modified) => modified,
                Err(e) => {
                    warn!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age > self.max_age {
                continue;
            }
            if self.seen.get(entry.path()) == Some(&modified) {
                continue;
            }
            arrivals.push((modified, entry.into_path()));
        }

        for (modified, path) in &arrivals {
            self.seen.insert(path.clone(), *modified);
        }

        // Forget files that have aged out so the set stays bounded
        let max_age = self.max_age;
        self.seen.retain(|_, modified| {
            now.duration_since(*modified).unwrap_or(Duration::ZERO) <= max_age
        });

        arrivals.sort();
        if !arrivals.is_empty() {
            debug!("{} new files in {}", arrivals.len(), self.dir.display());
        }
        Ok(arrivals
            .into_iter()
            .map(|(modified, path)| {
                let data_time =
                    time_from_path(&path).unwrap_or_else(|| DateTime::<Utc>::from(modified));
                InputFile { path, data_time }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn at(day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, minute, second).unwrap()
    }

    fn touch(dir: &Path, relative: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, "TAF KDEN 261130Z 2612/2712 09008KT P6SM SKC=\n").unwrap();
        path
    }

    #[test]
    fn test_time_from_file_name() {
        assert_eq!(
            time_from_path(Path::new("/data/taf_20240326_113000.txt")),
            Some(at(26, 11, 30, 0))
        );
        assert_eq!(
            time_from_path(Path::new("/data/202403261130.taf")),
            Some(at(26, 11, 30, 0))
        );
        assert_eq!(
            time_from_path(Path::new("/data/20240326/113015.txt")),
            Some(at(26, 11, 30, 15))
        );
        assert_eq!(time_from_path(Path::new("/data/bulletin.txt")), None);
        // Not a real date
        assert_eq!(time_from_path(Path::new("/data/20241399_113000.txt")), None);
    }

    #[test]
    fn test_data_time_falls_back_to_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let path = touch(temp_dir.path(), "bulletin.txt");
        let data_time = data_time_for(&path).unwrap();
        assert!((Utc::now() - data_time).num_seconds().abs() < 60);

        assert!(data_time_for(Path::new("/nonexistent/bulletin.txt")).is_err());
    }

    #[test]
    fn test_scan_archive_window() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "20240326/120000.txt");
        touch(temp_dir.path(), "20240326/060000.txt");
        touch(temp_dir.path(), "20240327/000000.txt");
        touch(temp_dir.path(), "20240326/.hidden_20240326_070000");

        let files = scan_archive(temp_dir.path(), at(26, 0, 0, 0), at(26, 23, 59, 59)).unwrap();
        let times: Vec<_> = files.iter().map(|f| f.data_time).collect();
        assert_eq!(times, vec![at(26, 6, 0, 0), at(26, 12, 0, 0)]);
    }

    #[test]
    fn test_scan_missing_archive() {
        let result = scan_archive(Path::new("/nonexistent/taf"), at(26, 0, 0, 0), at(27, 0, 0, 0));
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_file_list() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "taf_20240326_060000.txt");
        touch(temp_dir.path(), "taf_20240326_120000.txt");
        touch(temp_dir.path(), "notes.md");

        let pattern = temp_dir.path().join("taf_*.txt").display().to_string();
        let missing = temp_dir.path().join("taf_20240326_180000.txt").display().to_string();
        let files = expand_file_list(&[pattern, missing]).unwrap();

        assert_eq!(files.len(), 3);
        assert_eq!(files[0].data_time, at(26, 6, 0, 0));
        assert_eq!(files[1].data_time, at(26, 12, 0, 0));
        // Kept so the open failure is reported later
        assert!(!files[2].path.exists());
        assert_eq!(files[2].data_time, at(26, 18, 0, 0));
    }

    #[test]
    fn test_realtime_watcher_returns_each_file_once() {
        let temp_dir = TempDir::new().unwrap();
        let mut watcher = RealtimeWatcher::new(temp_dir.path(), Duration::from_secs(3600));

        touch(temp_dir.path(), "first.txt");
        let first = watcher.poll().unwrap();
        assert_eq!(first.len(), 1);
        assert!(watcher.poll().unwrap().is_empty());

        touch(temp_dir.path(), "second.txt");
        let second = watcher.poll().unwrap();
        assert_eq!(second.len(), 1);
        assert!(second[0].path.ends_with("second.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_archive_skips_broken_symlink() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "taf_20240326_113000.txt");
        std::os::unix::fs::symlink(
            temp_dir.path().join("gone.txt"),
            temp_dir.path().join("zz_dangling"),
        )
        .unwrap();

        let files = scan_archive(temp_dir.path(), at(26, 0, 0, 0), at(27, 0, 0, 0)).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].data_time, at(26, 11, 30, 0));
    }

    #[cfg(unix)]
    #[test]
    fn test_realtime_watcher_survives_broken_symlink() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..20 {
            touch(temp_dir.path(), &format!("taf_{:02}.txt", i));
        }
        let dangling = temp_dir.path().join("m_dangling");
        std::os::unix::fs::symlink(temp_dir.path().join("gone.txt"), &dangling).unwrap();
        let mut watcher = RealtimeWatcher::new(temp_dir.path(), Duration::from_secs(3600));

        assert_eq!(watcher.poll().unwrap().len(), 20);

        fs::remove_file(&dangling).unwrap();
        assert!(watcher.poll().unwrap().is_empty());
    }

    #[test]
    fn test_realtime_watcher_missing_dir_is_an_error() {
        let mut watcher = RealtimeWatcher::new("/nonexistent/taf", Duration::from_secs(60));
        assert!(watcher.poll().is_err());
    }

    #[test]
    fn test_realtime_watcher_ignores_old_files() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "old.txt");
        let mut watcher = RealtimeWatcher::new(temp_dir.path(), Duration::from_secs(60));

        let later = SystemTime::now() + Duration::from_secs(3600);
        assert!(watcher.poll_at(later).unwrap().is_empty());
    }
}
