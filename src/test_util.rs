//! Synthetic WAV fixtures shared by unit and integration tests.

use std::path::Path;

/// Writes `seconds` of silence as a 16-bit mono WAV at 22,050 Hz.
pub fn write_silent_wav(path: &Path, seconds: f32) {
    let sample_rate = 22_050u32;
    let n = (seconds * sample_rate as f32) as usize;
    write_wav(path, &vec![0.0f32; n], sample_rate);
}

/// Writes `seconds` of a pure sine tone at `freq_hz` as a 16-bit mono WAV.
pub fn write_sine_wav(path: &Path, freq_hz: f32, seconds: f32, sample_rate: u32) {
    let n = (seconds * sample_rate as f32) as usize;
    let samples: Vec<f32> = (0..n)
        .map(|i| (2.0 * std::f32::consts::PI * freq_hz * i as f32 / sample_rate as f32).sin())
        .collect();
    write_wav(path, &samples, sample_rate);
}

fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav fixture");
    for &s in samples {
        let clamped = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(clamped).expect("write wav sample");
    }
    writer.finalize().expect("finalize wav fixture");
}
