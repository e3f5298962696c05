pub mod audio;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod hashgen;
pub mod hybrid;
pub mod ingest;
pub mod mapping;
pub mod models;
pub mod params;
pub mod peaks;
pub mod scorer;
pub mod spectrogram;
pub mod store;

#[cfg(test)]
pub(crate) mod test_util;

pub use audio::AudioLoader;
pub use engine::{Engine, FinalLabel};
pub use error::{FingerprintError, Result};
pub use fingerprint::AudioFingerprinter;
pub use ingest::IngestPipeline;
pub use mapping::ScamCategoryMap;
pub use models::{HashEntry, Peak, QueryMode, RecordingId, Verdict};
pub use params::FingerprintParams;
pub use scorer::MatchScorer;
pub use store::FingerprintStore;
