use serde::{Deserialize, Serialize};

/// A spectrogram local maximum: `(freq_bin, time_frame)`.
pub type Peak = (usize, usize);

/// One `(hash, anchor_offset)` pair produced by the hash generator.
pub type HashEntry = (String, usize);

/// A recording's stable corpus-unique name, typically its basename.
pub type RecordingId = String;

/// The result of matching a query clip against the corpus.
///
/// A closed tagged variant, per the "dynamic typing" redesign flag: the
/// original returns ad hoc dicts whose key set varies by branch, we return
/// one of three fixed-shape payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "label")]
pub enum Verdict {
    #[serde(rename = "KNOWN_FRAUD")]
    KnownFraud {
        scam_type: String,
        confidence: f32,
        match_ratio: f32,
        best_match: RecordingId,
        details: String,
    },
    #[serde(rename = "NO_MATCH")]
    NoMatch { match_ratio: f32, details: String },
    #[serde(rename = "ERROR")]
    Error { details: String },
}

/// Query mode selector, per §6's "Query API" contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Fingerprint stage only (C7); never falls through to the hybrid
    /// classifier collaborator.
    Fingerprint,
    /// Hybrid classifier only; the fingerprint stage does not run.
    Hybrid,
    /// Fingerprint stage first; falls through to the hybrid classifier
    /// only when it does not produce `KnownFraud` (§9 Open Question).
    Auto,
}

impl Verdict {
    pub fn match_ratio(&self) -> f32 {
        match self {
            Verdict::KnownFraud { match_ratio, .. } => *match_ratio,
            Verdict::NoMatch { match_ratio, .. } => *match_ratio,
            Verdict::Error { .. } => 0.0,
        }
    }

    pub fn is_known_fraud(&self) -> bool {
        matches!(self, Verdict::KnownFraud { .. })
    }
}
