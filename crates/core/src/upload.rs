//! The set of files selected for the next submission.

use crate::config::UploadConfig;
use crate::error::{AssessmentError, InputIssue};
use anyhow::Context;
use providers::AudioFile;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Accepted { added: usize },
    /// The selection went over the limit; only the first files were kept.
    Truncated { added: usize, dropped: usize },
}

/// Owns the pending selection. Other components get files only through
/// [`UploadBatch::take`].
#[derive(Debug, Clone)]
pub struct UploadBatch {
    files: Vec<AudioFile>,
    max_files: usize,
    extensions: Vec<String>,
}

impl UploadBatch {
    pub fn new(cfg: &UploadConfig) -> Self {
        Self {
            files: Vec::new(),
            max_files: cfg.max_files,
            extensions: cfg.extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    pub fn is_accepted(&self, file: &AudioFile) -> bool {
        file.extension()
            .map(|ext| self.extensions.iter().any(|e| *e == ext))
            .unwrap_or(false)
    }

    /// Adds a selection. One non-audio file rejects the whole selection.
    pub fn add(&mut self, new_files: Vec<AudioFile>) -> Result<AddOutcome, AssessmentError> {
        if let Some(bad) = new_files.iter().find(|f| !self.is_accepted(f)) {
            return Err(AssessmentError::InputValidation(InputIssue::NotAudio {
                file: bad.name.clone(),
            }));
        }

        let before = self.files.len();
        let offered = new_files.len();
        self.files.extend(new_files);

        if self.files.len() > self.max_files {
            let dropped = self.files.len() - self.max_files;
            self.files.truncate(self.max_files);
            warn!(max = self.max_files, dropped, "selection truncated");
            return Ok(AddOutcome::Truncated {
                added: self.files.len() - before,
                dropped,
            });
        }
        debug!(added = offered, total = self.files.len(), "files selected");
        Ok(AddOutcome::Accepted { added: offered })
    }

    /// Removes the first file with this name.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.files.iter().position(|f| f.name == name) {
            Some(idx) => {
                self.files.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[AudioFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Hands the selection off for submission and resets the batch.
    pub fn take(&mut self) -> Result<Vec<AudioFile>, AssessmentError> {
        if self.files.is_empty() {
            return Err(AssessmentError::InputValidation(InputIssue::EmptyBatch));
        }
        Ok(std::mem::take(&mut self.files))
    }
}

pub async fn load_audio_file(path: &Path) -> anyhow::Result<AudioFile> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read audio file: {:?}", path))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    Ok(AudioFile::new(name, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wavs(n: usize) -> Vec<AudioFile> {
        (0..n)
            .map(|i| AudioFile::new(format!("take{i}.wav"), Vec::new()))
            .collect()
    }

    fn batch() -> UploadBatch {
        UploadBatch::new(&UploadConfig::default())
    }

    #[test]
    fn up_to_ten_files_are_accepted() {
        for n in 1..=10 {
            let mut b = batch();
            assert_eq!(b.add(wavs(n)).unwrap(), AddOutcome::Accepted { added: n });
            assert_eq!(b.len(), n);
        }
    }

    #[test]
    fn extra_files_are_truncated_with_a_warning() {
        let mut b = batch();
        let outcome = b.add(wavs(13)).unwrap();
        assert_eq!(outcome, AddOutcome::Truncated { added: 10, dropped: 3 });
        assert_eq!(b.len(), 10);
        assert_eq!(b.files()[0].name, "take0.wav");
        assert_eq!(b.files()[9].name, "take9.wav");
    }

    #[test]
    fn truncation_counts_files_already_selected() {
        let mut b = batch();
        b.add(wavs(8)).unwrap();
        let outcome = b.add(wavs(4)).unwrap();
        assert_eq!(outcome, AddOutcome::Truncated { added: 2, dropped: 2 });
    }

    #[test]
    fn one_non_audio_file_rejects_the_whole_selection() {
        for n in [1usize, 5, 12] {
            let mut b = batch();
            let mut files = wavs(n);
            files.push(AudioFile::new("notes.txt", Vec::new()));
            let err = b.add(files).unwrap_err();
            assert!(matches!(
                err,
                AssessmentError::InputValidation(InputIssue::NotAudio { ref file }) if file == "notes.txt"
            ));
            assert!(b.is_empty());
        }
    }

    #[test]
    fn extension_check_ignores_case() {
        let mut b = batch();
        assert!(b.add(vec![AudioFile::new("LOUD.WAV", Vec::new())]).is_ok());
    }

    #[test]
    fn take_requires_a_selection_and_resets() {
        let mut b = batch();
        assert!(matches!(
            b.take(),
            Err(AssessmentError::InputValidation(InputIssue::EmptyBatch))
        ));
        b.add(wavs(2)).unwrap();
        assert!(b.remove("take1.wav"));
        assert!(!b.remove("missing.wav"));
        assert_eq!(b.take().unwrap().len(), 1);
        assert!(b.is_empty());
    }

    #[test]
    fn clear_empties_the_selection_and_frees_the_limit() {
        let mut b = batch();
        b.add(wavs(10)).unwrap();
        b.clear();
        assert!(b.is_empty());
        assert_eq!(b.add(wavs(10)).unwrap(), AddOutcome::Accepted { added: 10 });
    }
}
