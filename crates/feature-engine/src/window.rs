//! Periodic tapering windows
//!
//! Periodic (DFT-even) windows of length `n` are the first `n` points of the
//! symmetric window of length `n + 1`.

use crate::config::WindowKind;
use std::f64::consts::PI;

/// Generate the coefficients of a periodic window
pub fn generate_window(kind: WindowKind, n: usize) -> Vec<f64> {
    match kind {
        WindowKind::Rectangular => vec![1.0; n],
        WindowKind::Hann => cosine_window(n, 0.5, 0.5),
        WindowKind::Hamming => cosine_window(n, 0.54, 0.46),
    }
}

/// Multiply a signal by a window in place
pub fn apply_window(signal: &mut [f64], kind: WindowKind) {
    if kind == WindowKind::Rectangular {
        return;
    }
    let window = generate_window(kind, signal.len());
    for (s, w) in signal.iter_mut().zip(window.iter()) {
        *s *= w;
    }
}

fn cosine_window(n: usize, a0: f64, a1: f64) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => (0..n)
            .map(|i| a0 - a1 * (2.0 * PI * i as f64 / n as f64).cos())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_is_periodic() {
        let w = generate_window(WindowKind::Hann, 4);
        // Periodic Hann of length 4: [0, 0.5, 1, 0.5]
        let expected = [0.0, 0.5, 1.0, 0.5];
        for (a, b) in w.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_hamming_endpoints() {
        let w = generate_window(WindowKind::Hamming, 8);
        assert!((w[0] - 0.08).abs() < 1e-12);
        assert!((w[4] - 1.0).abs() < 1e-12);
        // Not symmetric: last point is not 0.08
        assert!(w[7] > 0.08);
    }

    #[test]
    fn test_rectangular_leaves_signal() {
        let mut signal = vec![1.0, -2.0, 3.0];
        apply_window(&mut signal, WindowKind::Rectangular);
        assert_eq!(signal, vec![1.0, -2.0, 3.0]);
    }

    #[test]
    fn test_degenerate_lengths() {
        assert!(generate_window(WindowKind::Hann, 0).is_empty());
        assert_eq!(generate_window(WindowKind::Hamming, 1), vec![1.0]);
    }
}
