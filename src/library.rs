//! Media lookup by filename stem
//!
//! The directory is scanned on every request so newly copied videos are
//! playable without a restart.

use std::path::{Path, PathBuf};
use tracing::warn;

/// Find a file in `media_dir` whose stem equals `stem` ignoring case and whose
/// extension is in `extensions` (lowercase, no dot)
pub fn find_video(media_dir: &Path, stem: &str, extensions: &[String]) -> Option<PathBuf> {
    let entries = match std::fs::read_dir(media_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(media_dir = %media_dir.display(), error = %e, "Cannot read media directory");
            return None;
        }
    };

    let wanted = stem.to_lowercase();
    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            let stem_matches = path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.to_lowercase() == wanted);
            let playable = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)));
            stem_matches && playable
        })
        .collect();

    // read_dir order is unspecified; keep the choice stable
    matches.sort();
    matches.into_iter().next()
}
