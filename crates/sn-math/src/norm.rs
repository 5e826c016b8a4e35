// ─────────────────────────────────────────────────────────────────────
// SCPN SN Transport — Norms
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Relative RMS ("engineering") norm used for flux and fission-source
//! convergence.

use ndarray::{Array, Dimension};

/// RMS relative difference of `new` against `old`.
///
/// Each element with `new != old` contributes
/// `((new - old) / max(|new|, floor))²`. The sum is divided by `cells`
/// (spatial cells, not cells × groups) before the square root.
///
/// The norm is asymmetric (normalised by the new value) and exactly 0 for
/// element-wise equal arrays. `floor` turns the test into an absolute
/// one where `|new|` is tiny, so a new value of exactly zero never
/// divides by zero. With `floor = 0` a zero new value yields `inf`.
///
/// Panics if the shapes differ.
pub fn relative_rms_diff<D: Dimension>(
    new: &Array<f64, D>,
    old: &Array<f64, D>,
    cells: usize,
    floor: f64,
) -> f64 {
    assert_eq!(new.shape(), old.shape(), "norm operands must share a shape");
    if cells == 0 {
        return 0.0;
    }
    let sum: f64 = new
        .iter()
        .zip(old.iter())
        .filter(|(a, b)| a != b)
        .map(|(&a, &b)| {
            let rel = (a - b) / a.abs().max(floor);
            rel * rel
        })
        .sum();
    (sum / cells as f64).sqrt()
}
