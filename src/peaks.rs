use crate::models::Peak;
use crate::spectrogram::Spectrogram;

/// Finds 2-D local maxima in `S_dB`, per §4.3.
///
/// Builds a diamond-shaped structuring element of the given radius (an
/// iterated dilation of the 4-connected cross, i.e. all cells within
/// Manhattan distance `radius`), then keeps cells that are simultaneously
/// a local maximum under that neighborhood AND not part of a "zero
/// background" plateau — the `local_max XOR eroded_background` test from
/// §4.3 step 3, which suppresses false everywhere-max detections on long
/// silent stretches. Finally discards anything at or below `amp_min`.
///
/// Returned in row-major order over `(time_frame, freq_bin)`; callers must
/// not rely on any other ordering (the hash generator imposes its own).
pub fn find_peaks(s: &Spectrogram, amp_min: f32, radius: usize) -> Vec<Peak> {
    if s.time_frames == 0 || s.freq_bins == 0 {
        return Vec::new();
    }

    let offsets = diamond_offsets(radius);
    let mut peaks = Vec::new();

    for t in 0..s.time_frames {
        for f in 0..s.freq_bins {
            let value = s.get(f, t);

            let mut local_max = true;
            let mut eroded_background = true;
            let is_background = value == 0.0;

            for &(df, dt) in &offsets {
                let nf = f as isize + df;
                let nt = t as isize + dt;
                let in_bounds =
                    nf >= 0 && (nf as usize) < s.freq_bins && nt >= 0 && (nt as usize) < s.time_frames;

                if in_bounds {
                    let neighbor = s.get(nf as usize, nt as usize);
                    if neighbor > value {
                        local_max = false;
                    }
                    if neighbor != 0.0 {
                        eroded_background = false;
                    }
                } else {
                    // border_value = 1 for the erosion: out-of-bounds cells
                    // count as background, so they never disqualify erosion.
                    // They are excluded from the local-max comparison.
                }
            }
            let _ = is_background;

            let detected_peak = local_max ^ eroded_background;
            if detected_peak && value > amp_min {
                peaks.push((f, t));
            }
        }
    }

    peaks
}

/// Offsets `(d_freq, d_time)` within Manhattan distance `radius` of the
/// origin, i.e. the diamond produced by `radius` iterations of dilating a
/// 3x3 cross. Includes the origin itself, matching `scipy`'s footprint
/// semantics where the center cell is always compared against itself.
fn diamond_offsets(radius: usize) -> Vec<(isize, isize)> {
    let r = radius as isize;
    let mut offsets = Vec::new();
    for df in -r..=r {
        let remaining = r - df.abs();
        for dt in -remaining..=remaining {
            offsets.push((df, dt));
        }
    }
    offsets
}
