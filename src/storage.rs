//! Upload storage and disk retention.

use crate::error::{PapercastError, Result};
use crate::registry::UploadRegistry;
use crate::speech::AUDIO_FILE_PREFIX;
use chrono::Utc;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Extensions accepted for upload, lowercase.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];

/// Whether `filename` carries an allowed extension (case-insensitive).
pub fn is_allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

fn unsafe_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid filename regex"))
}

/// Reduce a client-supplied filename to a safe, flat ASCII name.
///
/// Path separators become spaces, whitespace runs become `_`, anything outside
/// `[A-Za-z0-9_.-]` is dropped and leading/trailing dots and underscores are
/// stripped. The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    unsafe_chars()
        .replace_all(&joined, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// An upload written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// `<dir>/<file_id>-<filename>`.
    pub path: PathBuf,
    /// Sanitised client filename.
    pub filename: String,
}

/// Save uploaded bytes under `dir`, keyed by `file_id`.
pub async fn save_upload(
    dir: &Path,
    file_id: &str,
    filename: &str,
    data: &[u8],
) -> Result<StoredUpload> {
    let safe = secure_filename(filename);
    if safe.is_empty() {
        return Err(PapercastError::Validation("Invalid file name".to_string()));
    }

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("{}-{}", file_id, safe));
    tokio::fs::write(&path, data).await?;
    debug!("Saved {} bytes to {}", data.len(), path.display());
    Ok(StoredUpload {
        path,
        filename: safe,
    })
}

/// Outcome of one retention sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub expired_uploads: usize,
    pub files_removed: usize,
}

/// Periodically purges old uploads and synthesized audio.
pub struct Janitor {
    registry: Arc<UploadRegistry>,
    upload_dir: PathBuf,
    audio_dir: PathBuf,
    retention: Duration,
}

impl Janitor {
    pub fn new(
        registry: Arc<UploadRegistry>,
        upload_dir: PathBuf,
        audio_dir: PathBuf,
        retention: Duration,
    ) -> Self {
        Self {
            registry,
            upload_dir,
            audio_dir,
            retention,
        }
    }

    /// Run one sweep: expire registry entries, then delete stale files.
    pub fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();

        let retention = chrono::Duration::from_std(self.retention).unwrap_or(chrono::Duration::MAX);
        let cutoff = Utc::now()
            .checked_sub_signed(retention)
            .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);
        report.expired_uploads = self.registry.take_expired(cutoff).len();

        let file_cutoff = SystemTime::now()
            .checked_sub(self.retention)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let live: HashSet<PathBuf> = self.registry.paths().into_iter().collect();
        report.files_removed += purge_dir(&self.upload_dir, file_cutoff, |path| {
            !live.contains(path)
        });
        report.files_removed += purge_dir(&self.audio_dir, file_cutoff, |path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(AUDIO_FILE_PREFIX))
        });

        report
    }

    /// Sweep every `interval` on the current runtime until the task is aborted.
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let report = self.sweep();
                if report.expired_uploads > 0 || report.files_removed > 0 {
                    info!(
                        "Retention sweep expired {} upload(s), removed {} file(s)",
                        report.expired_uploads, report.files_removed
                    );
                }
            }
        })
    }
}

/// Delete regular files in `dir` last modified at or before `cutoff` and accepted by `filter`.
fn purge_dir(dir: &Path, cutoff: SystemTime, filter: impl Fn(&Path) -> bool) -> usize {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
        Err(e) => {
            warn!("Cannot read {}: {}", dir.display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let stale = entry
            .metadata()
            .ok()
            .filter(|m| m.is_file())
            .and_then(|m| m.modified().ok())
            .is_some_and(|modified| modified <= cutoff);

        if !stale || !filter(&path) {
            continue;
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                removed += 1;
            }
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
    removed
}
