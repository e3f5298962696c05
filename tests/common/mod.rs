use std::path::Path;

/// Writes `seconds` of silence as a 16-bit mono WAV at `sample_rate` Hz.
pub fn write_silent_wav(path: &Path, seconds: f32, sample_rate: u32) {
    let n = (seconds * sample_rate as f32) as usize;
    write_wav(path, &vec![0.0f32; n], sample_rate);
}

/// Writes `seconds` of a pure sine tone at `freq_hz`.
pub fn write_sine_wav(path: &Path, freq_hz: f32, seconds: f32, sample_rate: u32) {
    let n = (seconds * sample_rate as f32) as usize;
    let samples: Vec<f32> = (0..n)
        .map(|i| (2.0 * std::f32::consts::PI * freq_hz * i as f32 / sample_rate as f32).sin())
        .collect();
    write_wav(path, &samples, sample_rate);
}

/// Writes a synthetic "call recording": several stacked tones with a touch
/// of noise, giving the peak picker a richer, less-degenerate spectrogram
/// than a pure sine wave.
pub fn write_synthetic_call_wav(path: &Path, seconds: f32, sample_rate: u32, seed: u64) {
    let n = (seconds * sample_rate as f32) as usize;
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    let mut next_noise = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        ((state % 2000) as f32 / 2000.0) - 0.5
    };

    let tones = [220.0f32, 440.0, 880.0, 1320.0];
    let samples: Vec<f32> = (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let tonal: f32 = tones
                .iter()
                .map(|f| (2.0 * std::f32::consts::PI * f * t).sin())
                .sum::<f32>()
                / tones.len() as f32;
            tonal * 0.85 + next_noise() * 0.05
        })
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
