use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// A magnitude spectrogram on a log-amplitude (dB) scale.
///
/// Indexed `(freq_bin, time_frame)`, row-major in `freq_bin` within each
/// frame. Values are `<= 0.0`, expressed relative to the spectrogram's own
/// maximum.
pub struct Spectrogram {
    pub data: Vec<Vec<f32>>,
    pub freq_bins: usize,
    pub time_frames: usize,
}

impl Spectrogram {
    pub fn get(&self, freq_bin: usize, time_frame: usize) -> f32 {
        self.data[time_frame][freq_bin]
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / size as f32).cos())
        .collect()
}

/// Computes `|STFT(y)|` on a log scale, per §4.2.
///
/// The dB reference is the magnitude spectrogram's own maximum, computed
/// *after* magnitude extraction — `S_dB = 20 log10(S / max(S, eps))`. Output
/// has `1 + n_fft/2` frequency bins and `ceil(len(y)/hop)` time frames.
pub fn compute(y: &[f32], n_fft: usize, hop_length: usize) -> Spectrogram {
    let freq_bins = 1 + n_fft / 2;
    if y.is_empty() {
        return Spectrogram {
            data: Vec::new(),
            freq_bins,
            time_frames: 0,
        };
    }

    let window = hann_window(n_fft);
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);

    let time_frames = y.len().div_ceil(hop_length).max(1);
    let mut magnitudes: Vec<Vec<f32>> = Vec::with_capacity(time_frames);
    let mut global_max = f32::MIN_POSITIVE;

    for frame in 0..time_frames {
        let start = frame * hop_length;
        let mut buffer: Vec<Complex<f32>> = (0..n_fft)
            .map(|i| {
                let sample = y.get(start + i).copied().unwrap_or(0.0);
                Complex::new(sample * window[i], 0.0)
            })
            .collect();
        fft.process(&mut buffer);

        let frame_mag: Vec<f32> = buffer.iter().take(freq_bins).map(|c| c.norm()).collect();
        global_max = frame_mag
            .iter()
            .fold(global_max, |acc, &m| if m > acc { m } else { acc });
        magnitudes.push(frame_mag);
    }

    let reference = global_max.max(1e-10);
    let data: Vec<Vec<f32>> = magnitudes
        .into_iter()
        .map(|frame| {
            frame
                .into_iter()
                .map(|m| 20.0 * (m.max(1e-10) / reference).log10())
                .collect()
        })
        .collect();

    Spectrogram {
        data,
        freq_bins,
        time_frames,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_yields_floor_everywhere() {
        let y = vec![0.0f32; 4096];
        let s = compute(&y, 2048, 512);
        assert!(s.time_frames > 0);
        for frame in &s.data {
            for &v in frame {
                assert!(v <= 0.0);
            }
        }
    }

    #[test]
    fn empty_signal_yields_no_frames() {
        let s = compute(&[], 2048, 512);
        assert_eq!(s.time_frames, 0);
    }

    #[test]
    fn values_are_never_positive() {
        let mut y = Vec::with_capacity(22_050);
        for i in 0..22_050 {
            y.push((2.0 * std::f32::consts::PI * 440.0 * i as f32 / 22_050.0).sin());
        }
        let s = compute(&y, 2048, 512);
        for frame in &s.data {
            for &v in frame {
                assert!(v <= 1e-4);
            }
        }
    }

    #[test]
    fn shape_matches_expected_frame_count() {
        let y = vec![0.1f32; 22_050];
        let s = compute(&y, 2048, 512);
        let expected_frames = (22_050usize).div_ceil(512);
        assert_eq!(s.time_frames, expected_frames);
        assert_eq!(s.freq_bins, 1 + 2048 / 2);
    }
}
