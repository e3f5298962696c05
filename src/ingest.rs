use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::audio::AudioLoader;
use crate::error::Result;
use crate::fingerprint::AudioFingerprinter;
use crate::params::FingerprintParams;
use crate::store::FingerprintStore;

/// Outcome of a corpus build, for the `--check`-style summary in §6.
#[derive(Debug, Default, Clone, Copy)]
pub struct IngestReport {
    pub processed: usize,
    pub errored: usize,
}

/// Batch fingerprinting of the corpus into the index, with per-file
/// replace semantics (C6, §4.6).
pub struct IngestPipeline {
    params: FingerprintParams,
}

impl IngestPipeline {
    pub fn new(params: FingerprintParams) -> Self {
        IngestPipeline { params }
    }

    /// Enumerates all audio files under `root`, skipping any subdirectory
    /// whose name is in `exclude` (e.g. `Legit_Call` — the corpus is
    /// fraud-only per §4.6).
    pub fn enumerate_files(root: &Path, exclude: &HashSet<String>) -> Vec<PathBuf> {
        WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| {
                if entry.file_type().is_dir() {
                    entry
                        .file_name()
                        .to_str()
                        .map(|name| !exclude.contains(name))
                        .unwrap_or(true)
                } else {
                    true
                }
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| AudioLoader::has_supported_extension(path))
            .collect()
    }

    /// Runs the pipeline against `root`, writing into `store`.
    ///
    /// Audio decoding and fingerprinting (C1-C4) run in parallel across
    /// files via `rayon` — each file's processing is pure and
    /// shares no mutable state (§5). Index writes are then applied in
    /// enumeration order, one file at a time: `delete_by_recording`
    /// strictly precedes `insert_many` for that file (§5 ordering
    /// guarantee), and a store error for one file is logged and skipped
    /// rather than aborting the whole build (§4.6, §7 kind 3).
    ///
    /// `cancel`, if set, is polled between files; in-flight fingerprinting
    /// of the current batch completes before the job stops (§5).
    pub fn run(
        &self,
        root: &Path,
        exclude: &HashSet<String>,
        store: &FingerprintStore,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<IngestReport> {
        let files = Self::enumerate_files(root, exclude);
        log::info!("found {} audio files under {}", files.len(), root.display());

        let fingerprinter = AudioFingerprinter::new(self.params);
        let fingerprinted: Vec<(PathBuf, Vec<(String, usize)>)> = files
            .par_iter()
            .map(|path| (path.clone(), fingerprinter.fingerprint_file(path)))
            .collect();

        let mut report = IngestReport::default();
        for (path, hashes) in fingerprinted {
            if cancel.as_ref().is_some_and(|c| c.load(Ordering::Relaxed)) {
                log::warn!("ingest cancelled after {} files", report.processed);
                break;
            }

            let recording_id = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => {
                    log::error!("skipping file with non-UTF8 name: {}", path.display());
                    report.errored += 1;
                    continue;
                }
            };

            match Self::replace_recording(store, &recording_id, &hashes) {
                Ok(()) => {
                    report.processed += 1;
                    if report.processed % 10 == 0 {
                        log::info!("processed {}/{} files", report.processed, files.len());
                    }
                }
                Err(e) => {
                    log::error!("failed to index {}: {}", path.display(), e);
                    report.errored += 1;
                }
            }
        }

        log::info!(
            "ingest complete: {} processed, {} errored",
            report.processed,
            report.errored
        );
        Ok(report)
    }

    fn replace_recording(
        store: &FingerprintStore,
        recording_id: &str,
        hashes: &[(String, usize)],
    ) -> Result<()> {
        store.delete_by_recording(recording_id)?;
        store.insert_many(recording_id, hashes)?;
        Ok(())
    }
}
