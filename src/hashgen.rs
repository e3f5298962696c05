use sha1::{Digest, Sha1};

use crate::models::{HashEntry, Peak};

/// Pairs peaks into combinatorial hashes with a bounded time-delta window,
/// per §4.4.
///
/// Peaks are sorted ascending by `time_frame` (ties broken by `freq_bin` to
/// fix a total order; the tie-break itself is not semantically observable,
/// only determinism is). For each anchor peak, up to `fan_value - 1`
/// subsequent peaks are considered as partners; a hash is emitted only when
/// `0 <= delta_t <= max_delta_t`.
///
/// Pure and deterministic: identical peak sets always yield byte-identical
/// output, in the same order.
pub fn generate_hashes(peaks: &[Peak], fan_value: usize, max_delta_t: i64) -> Vec<HashEntry> {
    if peaks.len() < 2 {
        return Vec::new();
    }

    let mut sorted = peaks.to_vec();
    sorted.sort_by_key(|&(freq, time)| (time, freq));

    let mut hashes = Vec::new();
    for i in 0..sorted.len() {
        for j in 1..fan_value {
            if i + j >= sorted.len() {
                break;
            }
            let (f1, t1) = sorted[i];
            let (f2, t2) = sorted[i + j];
            let delta_t = t2 as i64 - t1 as i64;

            if (0..=max_delta_t).contains(&delta_t) {
                hashes.push((hash_triple(f1, f2, delta_t), t1));
            }
        }
    }
    hashes
}

/// SHA-1 of `"{freq_a}|{freq_b}|{delta_t}"`, truncated to 20 lowercase hex
/// characters.
fn hash_triple(freq_a: usize, freq_b: usize, delta_t: i64) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("{}|{}|{}", freq_a, freq_b, delta_t).as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)[..20].to_string()
}
