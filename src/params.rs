use crate::error::{FingerprintError, Result};

/// Tunable parameters of the fingerprinting pipeline (C1-C4, C7).
///
/// Mirrors the constants the teacher hard-codes inline in
/// `AudioFingerprinter`, generalized into an explicit, validated
/// configuration object per the "ambient globals" redesign flag: one
/// `FingerprintParams` is constructed once and threaded through the
/// engine rather than read from scattered literals.
#[derive(Debug, Clone, Copy)]
pub struct FingerprintParams {
    /// Target sample rate audio is resampled to, in Hz.
    pub sample_rate: u32,
    /// STFT window size, in samples.
    pub n_fft: usize,
    /// STFT hop size, in samples.
    pub hop_length: usize,
    /// Amplitude floor below which a peak is discarded, in dB.
    pub amp_min: f32,
    /// Radius (in cells) of the diamond structuring element used for
    /// local-maximum detection.
    pub neighborhood_size: usize,
    /// Maximum number of partner peaks considered per anchor peak.
    pub fan_value: usize,
    /// Maximum `Δt` (in frames) between an anchor and its partner peak.
    pub max_delta_t: i64,
    /// Maximum number of hashes probed per `lookup` call.
    pub query_chunk_size: usize,
    /// Minimum match ratio for a `KNOWN_FRAUD` verdict.
    pub match_threshold: f32,
}

impl Default for FingerprintParams {
    fn default() -> Self {
        FingerprintParams {
            sample_rate: 22_050,
            n_fft: 2048,
            hop_length: 512,
            amp_min: -60.0,
            neighborhood_size: 20,
            fan_value: 15,
            max_delta_t: 200,
            query_chunk_size: 500,
            match_threshold: 0.20,
        }
    }
}

impl FingerprintParams {
    /// Validates the parameter set, surfacing programmer errors at
    /// construction time rather than deep inside the pipeline (§7 kind 4).
    pub fn validate(self) -> Result<Self> {
        if self.n_fft == 0 || self.n_fft % 2 != 0 {
            return Err(FingerprintError::InvalidParameter(
                "n_fft must be a positive even number".into(),
            ));
        }
        if self.hop_length == 0 {
            return Err(FingerprintError::InvalidParameter(
                "hop_length must be positive".into(),
            ));
        }
        if self.fan_value == 0 {
            return Err(FingerprintError::InvalidParameter(
                "fan_value must be positive".into(),
            ));
        }
        if self.max_delta_t < 0 {
            return Err(FingerprintError::InvalidParameter(
                "max_delta_t must not be negative".into(),
            ));
        }
        if self.query_chunk_size == 0 {
            return Err(FingerprintError::InvalidParameter(
                "query_chunk_size must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(FingerprintError::InvalidParameter(
                "match_threshold must be within [0, 1]".into(),
            ));
        }
        Ok(self)
    }
}
