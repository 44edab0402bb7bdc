//! Frequency-domain transforms for the visualiser.
//!
//! The transform is an iterative radix-2 decimation-in-time Cooley–Tukey
//! FFT. It is deterministic, side-effect free and O(n log n); inputs must be
//! a power of two points long, which the playback engine guarantees by
//! always handing over fixed-size windows.

use std::f64::consts::PI;

use num_complex::Complex64;

/// Runs the forward FFT over a power-of-two number of points.
///
/// Zero and one point are valid degenerate inputs: an empty sequence comes
/// back empty and a single point comes back unchanged.
pub fn forward_transform(points: &[Complex64]) -> Vec<Complex64> {
    let mut spectrum = points.to_vec();
    let n = spectrum.len();
    if n <= 1 {
        return spectrum;
    }
    assert!(n.is_power_of_two(), "point count must be a power of two");

    // The butterfly stages below expect their inputs in bit-reversed index
    // order, e.g. for 8 points [x0,x4,x2,x6,x1,x5,x3,x7]. Swapping each
    // index with its bit reversal produces exactly that ordering.
    let bits = n.trailing_zeros();
    for index in 1..n / 2 {
        spectrum.swap(index, bit_reverse(index, bits));
    }

    // Combine pairs, then quads, then octets and so on: at stage size N
    // there are n/N disjoint blocks, each merging N/2 butterfly pairs with
    // twiddle factor exp(-2*pi*i*k/N).
    let mut stage = 2;
    while stage <= n {
        let half = stage / 2;
        for block in (0..n).step_by(stage) {
            for k in 0..half {
                let even = spectrum[block + k];
                let odd = spectrum[block + k + half];

                let angle = -2.0 * PI * k as f64 / stage as f64;
                let twiddled = Complex64::new(angle.cos(), angle.sin()) * odd;

                spectrum[block + k] = even + twiddled;
                spectrum[block + k + half] = even - twiddled;
            }
        }
        stage <<= 1;
    }

    spectrum
}

/// One-sided amplitude spectrum: the first `n/2 + 1` bins, each scaled by
/// the point count.
pub fn magnitude(spectrum: &[Complex64]) -> Vec<f64> {
    let n = spectrum.len();
    spectrum
        .iter()
        .take(n / 2 + 1)
        .map(|bin| bin.norm() / n as f64)
        .collect()
}

/// Full-spectrum linear amplitudes scaled by `sqrt(n)`, used for quick
/// previews where the one-sided [`magnitude`] scaling reads too flat.
pub fn normalize(spectrum: &[Complex64]) -> Vec<f64> {
    let scale = (spectrum.len() as f64).sqrt();
    spectrum.iter().map(|bin| bin.norm() / scale).collect()
}

/// Reverses the lowest `bits` bits of `index`, e.g. 011 over 3 bits
/// becomes 110.
fn bit_reverse(index: usize, bits: u32) -> usize {
    let mut reversed = index;
    let mut remaining = index >> 1;
    let mut shift = bits - 1;

    while remaining > 0 {
        reversed = (reversed << 1) | (remaining & 1);
        shift -= 1;
        remaining >>= 1;
    }

    (reversed << shift) & ((1 << bits) - 1)
}
