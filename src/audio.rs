use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::source::UniformSourceIterator;
use rodio::Decoder;

/// File extensions the loader will attempt to decode.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg"];

/// Decodes an audio file to a mono float signal at a fixed sample rate.
///
/// Multi-channel inputs are downmixed; amplitudes are normalized so the
/// peak magnitude is 1.0. An all-zero signal is passed through unchanged
/// (no division by zero). On any decode failure the loader logs a warning
/// and yields an empty sequence — callers treat this as "no hashes", per
/// the component's error-absorption contract.
pub struct AudioLoader;

impl AudioLoader {
    /// Loads and normalizes audio from `path`, resampled to `sample_rate` Hz mono.
    pub fn load(path: &Path, sample_rate: u32) -> Vec<f32> {
        match Self::try_load(path, sample_rate) {
            Ok(samples) => normalize_peak(samples),
            Err(e) => {
                log::warn!("failed to decode {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    fn try_load(path: &Path, sample_rate: u32) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        let file = File::open(path)?;
        let decoder = Decoder::new(BufReader::new(file))?;
        let mono: UniformSourceIterator<_, i16> =
            UniformSourceIterator::new(decoder, 1, sample_rate);
        Ok(mono.map(|s| s as f32 / i16::MAX as f32).collect())
    }

    /// True if `path`'s extension is one this loader can attempt to decode.
    pub fn has_supported_extension(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

fn normalize_peak(samples: Vec<f32>) -> Vec<f32> {
    let peak = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    if peak == 0.0 {
        return samples;
    }
    samples.into_iter().map(|s| s / peak).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_peak_scales_to_unit_magnitude() {
        let samples = vec![0.0, 0.25, -0.5, 0.5];
        let normalized = normalize_peak(samples);
        let peak = normalized.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
        assert!((peak - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_peak_passes_through_silence() {
        let samples = vec![0.0; 1024];
        let normalized = normalize_peak(samples.clone());
        assert_eq!(normalized, samples);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        assert!(!AudioLoader::has_supported_extension(Path::new(
            "clip.m4a"
        )));
        assert!(AudioLoader::has_supported_extension(Path::new("clip.WAV")));
    }

    #[test]
    fn decode_failure_yields_empty_signal() {
        let samples = AudioLoader::load(Path::new("/nonexistent/path.wav"), 22_050);
        assert!(samples.is_empty());
    }
}
