use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audio::AudioLoader;
use crate::error::Result;
use crate::hybrid::HybridClassifier;
use crate::ingest::{IngestPipeline, IngestReport};
use crate::mapping::ScamCategoryMap;
use crate::models::{QueryMode, RecordingId, Verdict};
use crate::params::FingerprintParams;
use crate::scorer::MatchScorer;
use crate::store::FingerprintStore;

/// Duration the hybrid classifier's input signal is padded/truncated to,
/// per §6's collaborator contract. Not used by the fingerprint path.
pub const HYBRID_INPUT_SECONDS: f32 = 15.0;

/// Summary statistics for `--check` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_fingerprints: i64,
    pub distinct_recordings: i64,
    pub sample_recordings: Vec<RecordingId>,
}

/// The final, caller-facing label, combining the core's fingerprint
/// `Verdict` with the out-of-scope hybrid classifier's vocabulary (§6).
/// The core itself never produces this type's `SuspectedFraud`/`Legit`
/// variants internally — they only appear once the fingerprint `Verdict`
/// (or a supplied hybrid score) has been mapped to the CLI/embedding
/// layer's label space, per §9's "dynamic typing" redesign note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "label")]
pub enum FinalLabel {
    #[serde(rename = "KNOWN_FRAUD")]
    KnownFraud {
        scam_type: String,
        confidence: f32,
        match_ratio: f32,
        best_match: RecordingId,
        details: String,
    },
    #[serde(rename = "SUSPECTED_FRAUD")]
    SuspectedFraud { confidence: f32, details: String },
    #[serde(rename = "LEGIT")]
    Legit {
        confidence: f32,
        match_ratio: f32,
        details: String,
    },
    #[serde(rename = "ERROR")]
    Error { details: String },
}

/// An explicitly constructed engine object: index handle, category
/// mapping, and fingerprinting parameters, built once and passed to
/// request handlers — replacing the "ambient globals" the teacher and
/// original relied on (§9 redesign note).
pub struct Engine {
    store: FingerprintStore,
    categories: ScamCategoryMap,
    params: FingerprintParams,
}

impl Engine {
    pub fn open(db_path: &Path, categories: ScamCategoryMap, params: FingerprintParams) -> Result<Self> {
        let params = params.validate()?;
        let store = FingerprintStore::open(db_path)?;
        Ok(Engine {
            store,
            categories,
            params,
        })
    }

    /// Runs C6 against `corpus_root`, replacing per-recording rows.
    pub fn build(&self, corpus_root: &Path, exclude: &HashSet<String>) -> Result<IngestReport> {
        self.build_cancellable(corpus_root, exclude, None)
    }

    /// Runs C6 against `corpus_root`, polling `cancel` between files (§5):
    /// in-flight fingerprinting of the current file completes, but no
    /// further files are processed once `cancel` is set.
    pub fn build_cancellable(
        &self,
        corpus_root: &Path,
        exclude: &HashSet<String>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<IngestReport> {
        let pipeline = IngestPipeline::new(self.params);
        pipeline.run(corpus_root, exclude, &self.store, cancel)
    }

    /// `count()`, `count_distinct_recordings()`, and a sample of recording
    /// ids, for `--check` (§6).
    pub fn check(&self, sample_size: usize) -> Result<CorpusStats> {
        Ok(CorpusStats {
            total_fingerprints: self.store.count()?,
            distinct_recordings: self.store.count_distinct_recordings()?,
            sample_recordings: self.store.sample_recordings(sample_size)?,
        })
    }

    /// The core's own fingerprint-stage verdict (C7) — mode `fingerprint`
    /// from §6, independent of any hybrid classifier.
    pub fn fingerprint_verdict(&self, path: &Path) -> Result<Verdict> {
        self.fingerprint_verdict_cancellable(path, None)
    }

    /// As [`fingerprint_verdict`](Self::fingerprint_verdict), polling
    /// `cancel` between chunked index probes (§5).
    pub fn fingerprint_verdict_cancellable(
        &self,
        path: &Path,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<Verdict> {
        let scorer = MatchScorer::new(&self.store, &self.categories, self.params);
        scorer.query_file_cancellable(path, cancel)
    }

    /// Full query dispatch per the mode selector in §6.
    ///
    /// `hybrid` is the out-of-scope neural classifier collaborator; when
    /// `None`, `hybrid`/`auto`-mode fallthrough degrades to `Legit` rather
    /// than failing, since this crate ships no implementation of it.
    pub fn query(
        &self,
        path: &Path,
        mode: QueryMode,
        hybrid: Option<&dyn HybridClassifier>,
        transcript: Option<&str>,
    ) -> Result<FinalLabel> {
        match mode {
            QueryMode::Fingerprint => {
                let verdict = self.fingerprint_verdict(path)?;
                Ok(map_fingerprint_verdict(verdict))
            }
            QueryMode::Auto => {
                let verdict = self.fingerprint_verdict(path)?;
                if verdict.is_known_fraud() {
                    // Per §9's Open Question: short-circuit here, the
                    // hybrid stage never runs and any partial fingerprint
                    // data already computed is simply discarded had this
                    // been NoMatch instead.
                    return Ok(map_fingerprint_verdict(verdict));
                }
                Ok(self.run_hybrid_or_legit(path, hybrid, transcript, verdict.match_ratio()))
            }
            QueryMode::Hybrid => match hybrid {
                Some(_) => Ok(self.run_hybrid_or_legit(path, hybrid, transcript, 0.0)),
                None => Ok(FinalLabel::Error {
                    details: "hybrid mode requires a HybridClassifier implementation".to_string(),
                }),
            },
        }
    }

    fn run_hybrid_or_legit(
        &self,
        path: &Path,
        hybrid: Option<&dyn HybridClassifier>,
        transcript: Option<&str>,
        match_ratio: f32,
    ) -> FinalLabel {
        let Some(classifier) = hybrid else {
            return FinalLabel::Legit {
                confidence: 0.0,
                match_ratio,
                details: "no hybrid classifier configured; fingerprint stage found no match"
                    .to_string(),
            };
        };

        let signal = prepare_hybrid_input(path, self.params.sample_rate);
        let transcript = transcript.unwrap_or("");
        let score = classifier.classify(&signal, transcript);

        if crate::hybrid::is_suspected_fraud(score) {
            FinalLabel::SuspectedFraud {
                confidence: score,
                details: format!("hybrid model score {:.4}", score),
            }
        } else {
            FinalLabel::Legit {
                confidence: score,
                match_ratio,
                details: format!("hybrid model score {:.4}", score),
            }
        }
    }
}

fn map_fingerprint_verdict(verdict: Verdict) -> FinalLabel {
    match verdict {
        Verdict::KnownFraud {
            scam_type,
            confidence,
            match_ratio,
            best_match,
            details,
        } => FinalLabel::KnownFraud {
            scam_type,
            confidence,
            match_ratio,
            best_match,
            details,
        },
        Verdict::NoMatch {
            match_ratio,
            details,
        } => FinalLabel::Legit {
            confidence: 0.0,
            match_ratio,
            details,
        },
        Verdict::Error { details } => FinalLabel::Error { details },
    }
}

/// Loads, then pads/truncates to `HYBRID_INPUT_SECONDS`, the signal the
/// hybrid classifier expects (§6 collaborator contract). The fingerprint
/// path itself has no duration cap (§3); this is solely for the hybrid
/// boundary.
fn prepare_hybrid_input(path: &Path, sample_rate: u32) -> Vec<f32> {
    let mut signal = AudioLoader::load(path, sample_rate);
    let fixed_length = (HYBRID_INPUT_SECONDS * sample_rate as f32) as usize;
    signal.truncate(fixed_length);
    signal.resize(fixed_length, 0.0);
    signal
}
