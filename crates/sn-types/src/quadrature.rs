// ─────────────────────────────────────────────────────────────────────
// SCPN SN Transport — Quadrature
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Discrete-ordinates angular quadratures.
//!
//! Both sets are normalised so that all weights sum to
//! [`ANGULAR_WEIGHT_TOTAL`]. Direction ordering is partitioned for the
//! sweep: positive cosines first in 1-D, and quadrants `++, -+, +-, --`
//! in 2-D.

use std::f64::consts::PI;

use crate::constants::{
    ANGULAR_WEIGHT_TOTAL, GAUSS_LEGENDRE_MAX_NEWTON, GAUSS_LEGENDRE_TOL, LS_S2_MU, LS_S4_MU,
    LS_S6_MU, LS_S6_WEIGHTS,
};
use crate::error::{SnError, SnResult};

/// Mesh edge, used to pick the reflection map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    West,
    East,
    North,
    South,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::West, Edge::East, Edge::North, Edge::South];

    /// The edge across the mesh.
    pub fn opposite(self) -> Edge {
        match self {
            Edge::West => Edge::East,
            Edge::East => Edge::West,
            Edge::North => Edge::South,
            Edge::South => Edge::North,
        }
    }
}

fn rescale(weights: &mut [f64], total: f64) {
    let sum: f64 = weights.iter().sum();
    for w in weights.iter_mut() {
        *w *= total / sum;
    }
}

fn check_points(mus: &[&[f64]], weights: &[f64]) -> SnResult<()> {
    let n = weights.len();
    if n == 0 {
        return Err(SnError::ConfigError(
            "quadrature needs at least one direction".to_string(),
        ));
    }
    for cosines in mus {
        if cosines.len() != n {
            return Err(SnError::ConfigError(format!(
                "quadrature dimension mismatch: {} cosines vs {} weights",
                cosines.len(),
                n
            )));
        }
        if let Some(mu) = cosines.iter().find(|&&mu| !(mu > 0.0 && mu <= 1.0)) {
            return Err(SnError::ConfigError(format!(
                "direction cosine must lie in (0, 1], got {mu}"
            )));
        }
    }
    if let Some(w) = weights.iter().find(|&&w| !(w.is_finite() && w > 0.0)) {
        return Err(SnError::ConfigError(format!(
            "quadrature weight must be finite and > 0, got {w}"
        )));
    }
    Ok(())
}

/// 1-D quadrature. Directions `0..half()` travel toward +x, directions
/// `half()..count()` are their mirror images in the same order.
#[derive(Debug, Clone)]
pub struct Quadrature1D {
    mus: Vec<f64>,
    weights: Vec<f64>,
}

impl Quadrature1D {
    /// Build from the positive cosines and their (unnormalised) weights.
    pub fn new(positive_mus: &[f64], weights: &[f64]) -> SnResult<Self> {
        check_points(&[positive_mus], weights)?;
        let mut mus: Vec<f64> = positive_mus.to_vec();
        mus.extend(positive_mus.iter().map(|mu| -mu));
        let mut weights: Vec<f64> = weights.iter().chain(weights.iter()).copied().collect();
        rescale(&mut weights, ANGULAR_WEIGHT_TOTAL);
        Ok(Quadrature1D { mus, weights })
    }

    /// Gauss-Legendre set of even `order` (S2, S4, ...).
    pub fn gauss_legendre(order: usize) -> SnResult<Self> {
        if order < 2 || order % 2 != 0 {
            return Err(SnError::ConfigError(format!(
                "Gauss-Legendre order must be even and >= 2, got {order}"
            )));
        }
        let (mus, weights) = gauss_legendre_positive(order);
        Self::new(&mus, &weights)
    }

    /// Total direction count N.
    pub fn count(&self) -> usize {
        self.mus.len()
    }

    /// Number of directions per hemisphere, N/2.
    pub fn half(&self) -> usize {
        self.mus.len() / 2
    }

    /// Signed direction cosine.
    pub fn mu(&self, n: usize) -> f64 {
        self.mus[n]
    }

    pub fn weight(&self, n: usize) -> f64 {
        self.weights[n]
    }

    pub fn mus(&self) -> &[f64] {
        &self.mus
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn weight_sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Mirror direction across either edge of the slab.
    pub fn reflect(&self, n: usize) -> usize {
        (n + self.half()) % self.count()
    }
}

/// Positive Gauss-Legendre roots and weights on [-1, 1], largest root first.
fn gauss_legendre_positive(order: usize) -> (Vec<f64>, Vec<f64>) {
    let m = order / 2;
    let nf = order as f64;
    let mut roots = Vec::with_capacity(m);
    let mut weights = Vec::with_capacity(m);

    for i in 0..m {
        let mut x = (PI * (i as f64 + 0.75) / (nf + 0.5)).cos();
        let mut dp = 1.0;
        for _ in 0..GAUSS_LEGENDRE_MAX_NEWTON {
            let (p, p_prev) = legendre_pair(order, x);
            dp = nf * (x * p - p_prev) / (x * x - 1.0);
            let dx = p / dp;
            x -= dx;
            if dx.abs() < GAUSS_LEGENDRE_TOL {
                break;
            }
        }
        // Refresh the derivative at the converged root.
        let (p, p_prev) = legendre_pair(order, x);
        if p.is_finite() {
            dp = nf * (x * p - p_prev) / (x * x - 1.0);
        }
        roots.push(x);
        weights.push(2.0 / ((1.0 - x * x) * dp * dp));
    }

    (roots, weights)
}

/// (P_n(x), P_{n-1}(x)) by the three-term recurrence.
fn legendre_pair(n: usize, x: f64) -> (f64, f64) {
    let mut p_prev = 1.0;
    let mut p = x;
    for j in 2..=n {
        let jf = j as f64;
        let next = ((2.0 * jf - 1.0) * x * p - (jf - 1.0) * p_prev) / jf;
        p_prev = p;
        p = next;
    }
    (p, p_prev)
}

/// 2-D quadrature: `npq` points per quadrant, 4 quadrants.
///
/// Direction `n` lies in quadrant `n / npq` and uses point `n % npq`.
/// Quadrant bit 0 marks a negative x cosine, bit 1 a negative y cosine.
#[derive(Debug, Clone)]
pub struct Quadrature2D {
    mux: Vec<f64>,
    muy: Vec<f64>,
    weights: Vec<f64>,
}

impl Quadrature2D {
    /// Build from the first-quadrant points (|mux|, |muy|, weight).
    pub fn new(mux: &[f64], muy: &[f64], weights: &[f64]) -> SnResult<Self> {
        check_points(&[mux, muy], weights)?;
        if let Some(p) = (0..mux.len()).find(|&p| mux[p] * mux[p] + muy[p] * muy[p] > 1.0 + 1e-9) {
            return Err(SnError::ConfigError(format!(
                "point {p} has mux^2 + muy^2 > 1"
            )));
        }
        let mut weights = weights.to_vec();
        rescale(&mut weights, ANGULAR_WEIGHT_TOTAL / 4.0);
        Ok(Quadrature2D {
            mux: mux.to_vec(),
            muy: muy.to_vec(),
            weights,
        })
    }

    /// Level-symmetric set of order 2, 4 or 6, projected onto the x-y plane.
    pub fn level_symmetric(order: usize) -> SnResult<Self> {
        match order {
            2 => Self::new(&LS_S2_MU, &LS_S2_MU, &[1.0]),
            4 => {
                let [m1, m2] = LS_S4_MU;
                Self::new(&[m1, m1, m2], &[m1, m2, m1], &[1.0, 1.0, 1.0])
            }
            6 => {
                let [m1, m2, m3] = LS_S6_MU;
                let [w1, w2] = LS_S6_WEIGHTS;
                Self::new(
                    &[m1, m1, m3, m1, m2, m2],
                    &[m1, m3, m1, m2, m1, m2],
                    &[w1, w1, w1, w2, w2, w2],
                )
            }
            _ => Err(SnError::ConfigError(format!(
                "level-symmetric order must be 2, 4 or 6, got {order}"
            ))),
        }
    }

    /// Points per quadrant.
    pub fn npq(&self) -> usize {
        self.weights.len()
    }

    /// Total direction count (Nflux = 4 * npq).
    pub fn count(&self) -> usize {
        4 * self.npq()
    }

    pub fn quadrant(&self, n: usize) -> usize {
        n / self.npq()
    }

    pub fn point(&self, n: usize) -> usize {
        n % self.npq()
    }

    /// Signed x cosine of direction `n`.
    pub fn mux(&self, n: usize) -> f64 {
        let mu = self.mux[self.point(n)];
        if self.quadrant(n) & 1 == 0 {
            mu
        } else {
            -mu
        }
    }

    /// Signed y cosine of direction `n`.
    pub fn muy(&self, n: usize) -> f64 {
        let mu = self.muy[self.point(n)];
        if self.quadrant(n) & 2 == 0 {
            mu
        } else {
            -mu
        }
    }

    /// Weight of direction `n` (shared by all four quadrants).
    pub fn weight(&self, n: usize) -> f64 {
        self.weights[self.point(n)]
    }

    pub fn weight_sum(&self) -> f64 {
        4.0 * self.weights.iter().sum::<f64>()
    }

    /// Mirror direction across `edge`.
    pub fn reflect(&self, n: usize, edge: Edge) -> usize {
        let flip = match edge {
            Edge::West | Edge::East => 1,
            Edge::North | Edge::South => 2,
        };
        (self.quadrant(n) ^ flip) * self.npq() + self.point(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s2_gauss_legendre() {
        let q = Quadrature1D::gauss_legendre(2).unwrap();
        assert_eq!(q.count(), 2);
        assert_eq!(q.half(), 1);
        assert!((q.mu(0) - 1.0 / 3f64.sqrt()).abs() < 1e-14);
        assert!((q.mu(1) + 1.0 / 3f64.sqrt()).abs() < 1e-14);
        assert!((q.weight(0) - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_s8_integrates_polynomials() {
        // An 8-point rule is exact through degree 15.
        let q = Quadrature1D::gauss_legendre(8).unwrap();
        assert!((q.weight_sum() - 2.0).abs() < 1e-13);
        let second: f64 = (0..q.count()).map(|n| q.weight(n) * q.mu(n).powi(2)).sum();
        assert!((second - 2.0 / 3.0).abs() < 1e-13, "int mu^2 = {second}");
        let sixth: f64 = (0..q.count()).map(|n| q.weight(n) * q.mu(n).powi(6)).sum();
        assert!((sixth - 2.0 / 7.0).abs() < 1e-13, "int mu^6 = {sixth}");
    }

    #[test]
    fn test_gauss_legendre_rejects_odd_order() {
        assert!(Quadrature1D::gauss_legendre(3).is_err());
        assert!(Quadrature1D::gauss_legendre(0).is_err());
    }

    #[test]
    fn test_custom_1d_rescaled() {
        let q = Quadrature1D::new(&[0.3, 0.8], &[3.0, 1.0]).unwrap();
        assert_eq!(q.count(), 4);
        assert!((q.weight_sum() - ANGULAR_WEIGHT_TOTAL).abs() < 1e-14);
        assert!((q.weight(0) - 0.75).abs() < 1e-14);
        assert!((q.mu(3) + 0.8).abs() < 1e-15);
    }

    #[test]
    fn test_custom_1d_rejects_bad_points() {
        assert!(Quadrature1D::new(&[], &[]).is_err());
        assert!(Quadrature1D::new(&[0.5], &[1.0, 1.0]).is_err());
        assert!(Quadrature1D::new(&[-0.5], &[1.0]).is_err());
        assert!(Quadrature1D::new(&[0.5], &[0.0]).is_err());
    }

    #[test]
    fn test_1d_reflection_flips_sign() {
        let q = Quadrature1D::gauss_legendre(6).unwrap();
        for n in 0..q.count() {
            let m = q.reflect(n);
            assert!((q.mu(m) + q.mu(n)).abs() < 1e-15);
            assert_eq!(q.reflect(m), n);
        }
    }

    #[test]
    fn test_level_symmetric_normalised() {
        for order in [2, 4, 6] {
            let q = Quadrature2D::level_symmetric(order).unwrap();
            assert_eq!(q.count(), 4 * q.npq());
            assert!(
                (q.weight_sum() - ANGULAR_WEIGHT_TOTAL).abs() < 1e-6,
                "S{order} weight sum {}",
                q.weight_sum()
            );
        }
        assert!(Quadrature2D::level_symmetric(8).is_err());
    }

    #[test]
    fn test_2d_quadrant_signs() {
        let q = Quadrature2D::level_symmetric(4).unwrap();
        let npq = q.npq();
        let expected = [(1.0, 1.0), (-1.0, 1.0), (1.0, -1.0), (-1.0, -1.0)];
        for (quadrant, (sx, sy)) in expected.iter().enumerate() {
            for p in 0..npq {
                let n = quadrant * npq + p;
                assert_eq!(q.mux(n).signum(), *sx);
                assert_eq!(q.muy(n).signum(), *sy);
            }
        }
    }

    #[test]
    fn test_2d_reflection_per_edge() {
        let q = Quadrature2D::level_symmetric(6).unwrap();
        for n in 0..q.count() {
            let w = q.reflect(n, Edge::West);
            assert!((q.mux(w) + q.mux(n)).abs() < 1e-15);
            assert!((q.muy(w) - q.muy(n)).abs() < 1e-15);
            let s = q.reflect(n, Edge::South);
            assert!((q.muy(s) + q.muy(n)).abs() < 1e-15);
            assert!((q.mux(s) - q.mux(n)).abs() < 1e-15);
        }
    }

    #[test]
    fn test_edge_opposite() {
        for edge in Edge::ALL {
            assert_ne!(edge, edge.opposite());
            assert_eq!(edge, edge.opposite().opposite());
        }
    }
}
