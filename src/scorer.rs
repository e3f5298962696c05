use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::fingerprint::AudioFingerprinter;
use crate::mapping::ScamCategoryMap;
use crate::models::{RecordingId, Verdict};
use crate::params::FingerprintParams;
use crate::store::FingerprintStore;

/// Chunked index probe, vote aggregation, ratio-based verdict (C7, §4.7).
pub struct MatchScorer<'a> {
    store: &'a FingerprintStore,
    categories: &'a ScamCategoryMap,
    params: FingerprintParams,
}

impl<'a> MatchScorer<'a> {
    pub fn new(
        store: &'a FingerprintStore,
        categories: &'a ScamCategoryMap,
        params: FingerprintParams,
    ) -> Self {
        MatchScorer {
            store,
            categories,
            params,
        }
    }

    /// Fingerprints `path` and matches it against the corpus, per §4.7.
    pub fn query_file(&self, path: &Path) -> Result<Verdict> {
        self.query_file_cancellable(path, None)
    }

    /// Fingerprints `path` and matches it against the corpus, polling
    /// `cancel` between chunked index probes (§5). A cancellation mid-query
    /// yields the verdict computed from whatever chunks already completed —
    /// no partial verdict is left uncommitted, since the final aggregation
    /// over completed chunks is itself a valid (if partial) vote tally.
    pub fn query_file_cancellable(
        &self,
        path: &Path,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<Verdict> {
        let fingerprinter = AudioFingerprinter::new(self.params);
        let hashes = fingerprinter.fingerprint_file(path);
        self.score_hashes_cancellable(&hashes, cancel)
    }

    /// Scores a pre-computed set of `(hash, _)` pairs against the corpus.
    ///
    /// `N = 0` (no hashes, e.g. silence or decode failure) short-circuits
    /// to `NoMatch` with `match_ratio = 0.0`, per §4.7 failure semantics —
    /// no index probe is issued.
    pub fn score_hashes(&self, hashes: &[(String, usize)]) -> Result<Verdict> {
        self.score_hashes_cancellable(hashes, None)
    }

    /// As [`score_hashes`](Self::score_hashes), polling `cancel` between
    /// chunked index probes (§5 "cancellable... between chunks (query)").
    pub fn score_hashes_cancellable(
        &self,
        hashes: &[(String, usize)],
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<Verdict> {
        let n = hashes.len();
        if n == 0 {
            return Ok(Verdict::NoMatch {
                match_ratio: 0.0,
                details: "no fingerprint hashes extracted from query".to_string(),
            });
        }

        let query_hashes: Vec<String> = hashes.iter().map(|(h, _)| h.clone()).collect();
        let votes = self.tally_votes(&query_hashes, cancel)?;

        let Some(best) = argmax_lexicographic(&votes) else {
            return Ok(Verdict::NoMatch {
                match_ratio: 0.0,
                details: "no corpus hash matched the query".to_string(),
            });
        };

        let match_count = votes[&best];
        let match_ratio = match_count as f32 / (n.max(1) as f32);
        let confidence = (match_ratio / self.params.match_threshold).min(1.0);

        if match_ratio >= self.params.match_threshold {
            let scam_type = self.categories.category_of(&best);
            Ok(Verdict::KnownFraud {
                scam_type: scam_type.clone(),
                confidence,
                match_ratio,
                best_match: best.clone(),
                details: format!(
                    "fingerprint match ({:.1}%) with {} ({})",
                    match_ratio * 100.0,
                    best,
                    scam_type
                ),
            })
        } else {
            Ok(Verdict::NoMatch {
                match_ratio,
                details: format!(
                    "best fingerprint match ({:.1}%) with {} below threshold",
                    match_ratio * 100.0,
                    best
                ),
            })
        }
    }

    /// Probes the store in chunks of at most `query_chunk_size`, summing a
    /// per-recording vote for every matching index row (every row counts,
    /// per §9's documented "scored match via votes" choice). `cancel` is
    /// polled between chunks; an in-flight chunk's lookup always completes.
    fn tally_votes(
        &self,
        query_hashes: &[String],
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<HashMap<RecordingId, u32>> {
        let mut votes: HashMap<RecordingId, u32> = HashMap::new();
        for chunk in query_hashes.chunks(self.params.query_chunk_size) {
            let rows = self.store.lookup(chunk)?;
            for (_hash, recording_id) in rows {
                *votes.entry(recording_id).or_insert(0) += 1;
            }
            if cancel.as_ref().is_some_and(|c| c.load(Ordering::Relaxed)) {
                break;
            }
        }
        Ok(votes)
    }
}

/// `argmax` over vote counts, ties broken lexicographically by
/// `recording_id` (§4.7 step 3).
fn argmax_lexicographic(votes: &HashMap<RecordingId, u32>) -> Option<RecordingId> {
    votes
        .iter()
        .max_by(|(id_a, count_a), (id_b, count_b)| {
            count_a.cmp(count_b).then_with(|| id_b.cmp(id_a))
        })
        .map(|(id, _)| id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(rows: &[(&str, &str)]) -> FingerprintStore {
        let store = FingerprintStore::open_in_memory().unwrap();
        for (hash, recording_id) in rows {
            store
                .insert_many(recording_id, &[(hash.to_string(), 0)])
                .unwrap();
        }
        store
    }

    #[test]
    fn empty_query_yields_no_match() {
        let store = FingerprintStore::open_in_memory().unwrap();
        let categories = ScamCategoryMap::default();
        let scorer = MatchScorer::new(&store, &categories, FingerprintParams::default());
        let verdict = scorer.score_hashes(&[]).unwrap();
        assert_eq!(
            verdict,
            Verdict::NoMatch {
                match_ratio: 0.0,
                details: "no fingerprint hashes extracted from query".to_string(),
            }
        );
    }

    #[test]
    fn full_overlap_is_known_fraud_with_full_confidence() {
        let store = store_with(&[("h1", "a.mp3"), ("h2", "a.mp3")]);
        let categories = ScamCategoryMap::default();
        let scorer = MatchScorer::new(&store, &categories, FingerprintParams::default());

        let query = vec![("h1".to_string(), 0), ("h2".to_string(), 5)];
        let verdict = scorer.score_hashes(&query).unwrap();

        match verdict {
            Verdict::KnownFraud {
                best_match,
                match_ratio,
                confidence,
                ..
            } => {
                assert_eq!(best_match, "a.mp3");
                assert!((match_ratio - 1.0).abs() < 1e-6);
                assert!((confidence - 1.0).abs() < 1e-6);
            }
            other => panic!("expected KnownFraud, got {:?}", other),
        }
    }

    #[test]
    fn threshold_boundary_at_twenty_percent() {
        let store = FingerprintStore::open_in_memory().unwrap();
        store.insert_many("a.mp3", &[("match".to_string(), 0)]).unwrap();
        let categories = ScamCategoryMap::default();
        let scorer = MatchScorer::new(&store, &categories, FingerprintParams::default());

        // Exactly 20% overlap (1 of 5 query hashes matches) -> KNOWN_FRAUD.
        let query: Vec<(String, usize)> = (0..5)
            .map(|i| {
                if i == 0 {
                    ("match".to_string(), 0)
                } else {
                    (format!("query_only_{i}"), i)
                }
            })
            .collect();
        let verdict = scorer.score_hashes(&query).unwrap();
        assert!(verdict.is_known_fraud());
        assert!((verdict.match_ratio() - 0.20).abs() < 1e-6);
    }

    #[test]
    fn below_threshold_is_no_match() {
        let store = store_with(&[("h1", "a.mp3")]);
        let categories = ScamCategoryMap::default();
        let scorer = MatchScorer::new(&store, &categories, FingerprintParams::default());

        let query: Vec<(String, usize)> = (0..10)
            .map(|i| {
                if i == 0 {
                    ("h1".to_string(), 0)
                } else {
                    (format!("q{i}"), i)
                }
            })
            .collect();
        let verdict = scorer.score_hashes(&query).unwrap();
        assert!(!verdict.is_known_fraud());
        assert!(verdict.match_ratio() < 0.20);
    }

    #[test]
    fn no_index_rows_match_yields_no_match() {
        let store = FingerprintStore::open_in_memory().unwrap();
        let categories = ScamCategoryMap::default();
        let scorer = MatchScorer::new(&store, &categories, FingerprintParams::default());
        let verdict = scorer
            .score_hashes(&[("nowhere".to_string(), 0)])
            .unwrap();
        assert!(!verdict.is_known_fraud());
    }

    #[test]
    fn ties_break_lexicographically_by_recording_id() {
        let store = store_with(&[("h1", "b.mp3"), ("h1", "a.mp3")]);
        let categories = ScamCategoryMap::default();
        let scorer = MatchScorer::new(&store, &categories, FingerprintParams::default());
        let votes: HashMap<RecordingId, u32> =
            [("a.mp3".to_string(), 3), ("b.mp3".to_string(), 3)]
                .into_iter()
                .collect();
        assert_eq!(argmax_lexicographic(&votes), Some("a.mp3".to_string()));
    }

    #[test]
    fn cancelling_before_any_chunk_yields_no_votes() {
        let mut params = FingerprintParams::default();
        params.query_chunk_size = 1;
        let store = store_with(&[("h1", "a.mp3"), ("h2", "a.mp3")]);
        let categories = ScamCategoryMap::default();
        let scorer = MatchScorer::new(&store, &categories, params);

        let cancel = Arc::new(AtomicBool::new(true));
        let query = vec![("h1".to_string(), 0), ("h2".to_string(), 1)];
        let verdict = scorer
            .score_hashes_cancellable(&query, Some(cancel))
            .unwrap();

        // The first chunk still completes (cancellation is polled only
        // *between* chunks), so its vote is retained; only the second
        // chunk is skipped.
        match verdict {
            Verdict::KnownFraud { match_ratio, .. } => assert!(match_ratio <= 0.5),
            Verdict::NoMatch { .. } => {}
            other => panic!("unexpected verdict {:?}", other),
        }
    }
}
