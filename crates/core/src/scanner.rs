//! Expands command-line inputs into the audio files to select.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Explicit file paths are returned as given, so the upload check can reject
/// them. Directories are walked in name order and contribute only files with
/// an accepted extension.
pub fn collect_audio_paths(
    roots: &[PathBuf],
    extensions: &[String],
    excludes: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let exclude_set = build_globset(excludes)?;
    let mut out = Vec::new();
    for root in roots {
        if !root.is_dir() {
            out.push(root.clone());
            continue;
        }
        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.path() == root.as_path() || should_descend(e.path(), &exclude_set))
        {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            let path = entry.path();
            if path.is_dir() || !has_extension(path, extensions) {
                continue;
            }
            out.push(path.to_path_buf());
        }
    }
    Ok(out)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(builder.build()?)
}

fn should_descend(path: &Path, excludes: &GlobSet) -> bool {
    !excludes.is_match(path) && !is_hidden(path)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
