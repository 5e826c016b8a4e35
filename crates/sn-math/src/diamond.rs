// ─────────────────────────────────────────────────────────────────────
// SCPN SN Transport — Diamond Difference
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Diamond-difference cell balance for the discrete-ordinates equation.
//!
//! Along one direction the cell-average angular flux is the mean of the
//! entering and exiting face values, ψ̄ = (ψ_in + ψ_out) / 2. Combined with
//! the cell balance
//!
//! ```text
//! |μ| (ψ_out − ψ_in) / Δx + Σ_tr ψ̄ = q
//! ```
//!
//! this closes the recurrence that carries flux from cell to cell.

/// Exiting angular flux of a 1-D cell.
///
/// - `mu`: |direction cosine|
/// - `dx`: cell width
/// - `q`: angular source in the cell
#[inline]
pub fn diamond_1d(psi_in: f64, mu: f64, dx: f64, sigma_tr: f64, q: f64) -> f64 {
    let psi_out = psi_in * (2.0 * mu - dx * sigma_tr) + 2.0 * dx * q;
    psi_out / (2.0 * mu + dx * sigma_tr)
}

/// Cell result of a 2-D diamond-difference balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBalance2D {
    /// Cell-average angular flux.
    pub psi_bar: f64,
    /// Flux leaving through the downstream x-face.
    pub psi_out_x: f64,
    /// Flux leaving through the downstream y-face.
    pub psi_out_y: f64,
}

/// 2-D cell balance from both upstream faces.
///
/// `mux`/`muy` are the absolute cosines.
#[inline]
#[allow(clippy::too_many_arguments)]
pub fn diamond_2d(
    psi_in_x: f64,
    psi_in_y: f64,
    mux: f64,
    muy: f64,
    dx: f64,
    dy: f64,
    sigma_tr: f64,
    q: f64,
) -> CellBalance2D {
    let xcoeff = 2.0 * mux / dx;
    let ycoeff = 2.0 * muy / dy;
    let psi_bar = (q + xcoeff * psi_in_x + ycoeff * psi_in_y) / (sigma_tr + xcoeff + ycoeff);
    CellBalance2D {
        psi_bar,
        psi_out_x: 2.0 * psi_bar - psi_in_x,
        psi_out_y: 2.0 * psi_bar - psi_in_y,
    }
}
