use std::path::Path;

use crate::audio::AudioLoader;
use crate::hashgen;
use crate::models::HashEntry;
use crate::params::FingerprintParams;
use crate::peaks;
use crate::spectrogram;

/// Ties C1-C4 together: decode → spectrogram → peak-pick → hash.
///
/// Used identically by ingest (C6, against corpus files) and query (C7,
/// against the probe clip) — the only difference between the two call
/// sites is what they do with the resulting hashes.
pub struct AudioFingerprinter {
    params: FingerprintParams,
}

impl AudioFingerprinter {
    pub fn new(params: FingerprintParams) -> Self {
        AudioFingerprinter { params }
    }

    /// Loads and fingerprints an audio file. Decode failure or a
    /// degenerate (silent, single-peak) signal both yield an empty hash
    /// list — per §7, these are absorbed, not surfaced as errors.
    pub fn fingerprint_file(&self, path: &Path) -> Vec<HashEntry> {
        let samples = AudioLoader::load(path, self.params.sample_rate);
        self.fingerprint_samples(&samples)
    }

    /// Fingerprints an already-loaded mono signal at `self.params.sample_rate`.
    pub fn fingerprint_samples(&self, samples: &[f32]) -> Vec<HashEntry> {
        if samples.is_empty() {
            return Vec::new();
        }
        let spec = spectrogram::compute(samples, self.params.n_fft, self.params.hop_length);
        let peaks = peaks::find_peaks(&spec, self.params.amp_min, self.params.neighborhood_size);
        hashgen::generate_hashes(&peaks, self.params.fan_value, self.params.max_delta_t)
    }
}
