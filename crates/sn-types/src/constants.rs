// ─────────────────────────────────────────────────────────────────────
// SCPN SN Transport — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Sum of all quadrature weights. Paired with the 0.5 factor on the
/// isotropic scatter and fission sources.
pub const ANGULAR_WEIGHT_TOTAL: f64 = 2.0;

/// Level-symmetric S2 first-octant ordinate.
pub const LS_S2_MU: [f64; 1] = [0.577_350_269_189_625_8];

/// Level-symmetric S4 first-octant ordinates.
pub const LS_S4_MU: [f64; 2] = [0.350_021_2, 0.868_890_3];

/// Level-symmetric S6 first-octant ordinates.
pub const LS_S6_MU: [f64; 3] = [0.266_635_5, 0.681_507_6, 0.926_180_8];

/// Level-symmetric S6 point weights (per octant, sum of all points = 1).
/// w1 for the (1,1,3) permutations, w2 for the (1,2,2) permutations.
pub const LS_S6_WEIGHTS: [f64; 2] = [0.176_126_3, 0.157_207_1];

/// Newton tolerance for Gauss-Legendre root finding.
pub const GAUSS_LEGENDRE_TOL: f64 = 1e-15;

/// Newton iteration cap for Gauss-Legendre root finding.
pub const GAUSS_LEGENDRE_MAX_NEWTON: usize = 100;
