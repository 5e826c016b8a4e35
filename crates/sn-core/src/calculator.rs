// ─────────────────────────────────────────────────────────────────────
// SCPN SN Transport — Eigenvalue Calculator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Inner/outer iteration controller.
//!
//! The inner loop repeats transport sweeps with the fission source frozen
//! until the scalar flux settles. The outer loop is power iteration on the
//! multiplication factor:
//!
//! ```text
//! k_new = k · Σ fs_new / Σ fs_old,    kdiff = |k_new − k| / k_new
//! ```
//!
//! A solve converges when both the fission-source RMS change and `kdiff`
//! are within `eps`. Problems without fissile material finish after one
//! outer iteration, once the inner loop has converged.

use sn_math::norm::relative_rms_diff;
use sn_types::config::{AccelerationCadence, ScatterRefresh, SolverConfig};
use sn_types::error::{SnError, SnResult};
use sn_types::quadrature::{Quadrature1D, Quadrature2D};
use sn_types::state::{Mesh1D, Mesh2D, TransportMesh};

use crate::accel::Accelerator;
use crate::boundary::BoundaryConditions;
use crate::observer::{InnerRecord, IterationObserver, LogObserver, OuterRecord};
use crate::sweep::{MeshArray, SweepInput, SweepOutcome, TransportSweep};
use crate::sweep_1d::Sweep1D;
use crate::sweep_2d::Sweep2D;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The inner loop hit the iteration cap.
    InnerNonConvergence,
    /// The outer loop hit the iteration cap.
    OuterNonConvergence,
}

/// Where the controller is in its iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    /// Constructed, no solve run yet.
    Ready,
    InnerConverging,
    OuterConverging,
    Converged,
    Failed(FailureReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Converged,
    Failed(FailureReason),
}

/// Result of [`Calculator::solve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    pub status: SolveStatus,
    pub k: f64,
    pub outer_iterations: usize,
    /// Total sweeps across all outer iterations.
    pub inner_iterations: usize,
}

impl SolveReport {
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

type Outcome<M> = SweepOutcome<<M as TransportMesh>::Dim>;

/// Eigenvalue calculator over a mesh borrowed for `'a`.
pub struct Calculator<'a, S: TransportSweep> {
    engine: S,
    mesh: &'a mut S::Mesh,
    k: f64,
    fission_source: Option<MeshArray<S::Mesh>>,
    scatter_source: MeshArray<S::Mesh>,
    accelerator: Option<Box<dyn Accelerator<S::Mesh> + 'a>>,
    config: SolverConfig,
    log: LogObserver,
    observer: Option<Box<dyn IterationObserver + 'a>>,
    state: SolverState,
    history: Vec<OuterRecord>,
    sweeps: usize,
}

impl<'a> Calculator<'a, Sweep1D<'a>> {
    /// 1-D calculator from `(west, east)` boundary labels.
    pub fn one_d(
        quad: &'a Quadrature1D,
        mesh: &'a mut Mesh1D,
        labels: &[&str],
        initial_k: f64,
    ) -> SnResult<Self> {
        let bcs = BoundaryConditions::from_labels(labels)?;
        let engine = Sweep1D::new(quad, mesh, &bcs)?;
        Self::new(engine, mesh, initial_k)
    }

    /// 1-D calculator with boundaries and settings taken from `config`.
    pub fn from_config(
        quad: &'a Quadrature1D,
        mesh: &'a mut Mesh1D,
        config: &SolverConfig,
    ) -> SnResult<Self> {
        config.validate()?;
        let bcs = BoundaryConditions::from_labels(&config.boundary_labels())?;
        let engine = Sweep1D::new(quad, mesh, &bcs)?.with_parallel_groups(config.parallel_groups);
        Self::new(engine, mesh, config.initial_k)?.with_config(config)
    }
}

impl<'a> Calculator<'a, Sweep2D<'a>> {
    /// 2-D calculator from `(west, east, north, south)` boundary labels.
    pub fn two_d(
        quad: &'a Quadrature2D,
        mesh: &'a mut Mesh2D,
        labels: &[&str],
        initial_k: f64,
    ) -> SnResult<Self> {
        let bcs = BoundaryConditions::from_labels(labels)?;
        let engine = Sweep2D::new(quad, mesh, &bcs)?;
        Self::new(engine, mesh, initial_k)
    }

    pub fn from_config_2d(
        quad: &'a Quadrature2D,
        mesh: &'a mut Mesh2D,
        config: &SolverConfig,
    ) -> SnResult<Self> {
        config.validate()?;
        let bcs = BoundaryConditions::from_labels(&config.boundary_labels())?;
        let engine = Sweep2D::new(quad, mesh, &bcs)?.with_parallel_groups(config.parallel_groups);
        Self::new(engine, mesh, config.initial_k)?.with_config(config)
    }
}

impl<'a, S: TransportSweep> Calculator<'a, S> {
    /// Wrap an engine and its mesh. Sources are computed from the current
    /// mesh flux.
    pub fn new(engine: S, mesh: &'a mut S::Mesh, initial_k: f64) -> SnResult<Self> {
        if !initial_k.is_finite() || initial_k <= 0.0 {
            return Err(SnError::ConfigError(format!(
                "initial k must be finite and > 0, got {initial_k}"
            )));
        }
        let fission_source = mesh.fission_source();
        let scatter_source = mesh.scatter_source();
        Ok(Calculator {
            engine,
            mesh,
            k: initial_k,
            fission_source,
            scatter_source,
            accelerator: None,
            config: SolverConfig {
                initial_k,
                ..SolverConfig::default()
            },
            log: LogObserver,
            observer: None,
            state: SolverState::Ready,
            history: Vec::new(),
            sweeps: 0,
        })
    }

    /// Adopt tolerance, iteration cap, norm floor, scatter refresh and
    /// acceleration cadence from `config`. The eigenvalue guess and the
    /// boundary conditions stay as constructed.
    pub fn with_config(mut self, config: &SolverConfig) -> SnResult<Self> {
        config.validate()?;
        self.config = SolverConfig {
            initial_k: self.config.initial_k,
            ..config.clone()
        };
        Ok(self)
    }

    pub fn with_accelerator(
        mut self,
        accelerator: impl Accelerator<S::Mesh> + 'a,
        cadence: AccelerationCadence,
    ) -> Self {
        self.accelerator = Some(Box::new(accelerator));
        self.config.acceleration = cadence;
        self
    }

    /// Receive iteration records in addition to the `log` output.
    pub fn with_observer(mut self, observer: impl IterationObserver + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    pub fn mesh(&self) -> &S::Mesh {
        &*self.mesh
    }

    pub fn engine(&self) -> &S {
        &self.engine
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn fission_source(&self) -> Option<&MeshArray<S::Mesh>> {
        self.fission_source.as_ref()
    }

    pub fn scatter_source(&self) -> &MeshArray<S::Mesh> {
        &self.scatter_source
    }

    /// Outer-iteration records of the last solve.
    pub fn history(&self) -> &[OuterRecord] {
        &self.history
    }

    /// Accelerator factors of the last solve, one per outer iteration that
    /// ran the cycle.
    pub fn acceleration_factors(&self) -> Vec<f64> {
        self.history
            .iter()
            .filter_map(|r| r.acceleration_factor)
            .collect()
    }

    /// One transport sweep at eigenvalue `k` with the current sources.
    ///
    /// Returns `SolverDiverged` if the swept flux is not finite; the mesh
    /// keeps that state for inspection.
    pub fn sweep(&mut self, k: f64) -> SnResult<Outcome<S::Mesh>> {
        let input = SweepInput {
            scatter: &self.scatter_source,
            fission: self.fission_source.as_ref(),
            k: Some(k),
            norm_floor: self.config.norm_floor,
        };
        let outcome = self.engine.sweep(self.mesh, &input)?;
        self.sweeps += 1;

        if self.mesh.flux().iter().any(|v| !v.is_finite()) {
            return Err(SnError::SolverDiverged {
                iteration: self.sweeps,
                message: format!("non-finite scalar flux after sweep at k = {k}"),
            });
        }
        if self.config.scatter_refresh == ScatterRefresh::EverySweep {
            self.scatter_source = self.mesh.scatter_source();
        }
        Ok(outcome)
    }

    /// Solve with the tolerance and iteration cap from the configuration.
    pub fn solve_with_config(&mut self) -> SnResult<SolveReport> {
        self.solve(self.config.eps, self.config.max_iterations)
    }

    /// Run inner/outer iteration until convergence or the cap.
    ///
    /// `max_iter` caps the inner loop of each outer iteration and the outer
    /// loop separately. Hitting a cap is reported in the returned status,
    /// not as an error.
    pub fn solve(&mut self, eps: f64, max_iter: usize) -> SnResult<SolveReport> {
        if !eps.is_finite() || eps <= 0.0 {
            return Err(SnError::ConfigError(format!(
                "eps must be finite and > 0, got {eps}"
            )));
        }
        if max_iter == 0 {
            return Err(SnError::ConfigError("max_iter must be >= 1".to_string()));
        }
        self.history.clear();
        let cadence = self.accelerator.as_ref().map(|_| self.config.acceleration);
        let cells = self.mesh.cell_count();
        let mut total_inner = 0;
        let mut outer = 0;

        loop {
            outer += 1;
            self.state = SolverState::InnerConverging;
            let outer_start_flux = self.mesh.flux().clone();
            let mut factor = None;
            let mut inner = 0;

            let outcome = loop {
                let sweep_start_flux = match cadence {
                    Some(AccelerationCadence::PerInner) => Some(self.mesh.flux().clone()),
                    _ => None,
                };
                let mut outcome = self.sweep(self.k)?;
                inner += 1;
                total_inner += 1;

                if let Some(old_flux) = sweep_start_flux {
                    let fission = outcome.fission_source.take();
                    let (fission, f) = self.accelerate(&old_flux, fission, eps)?;
                    outcome.fission_source = fission;
                    factor = Some(f);
                }

                let record = InnerRecord {
                    outer,
                    inner,
                    flux_rms: outcome.flux_rms,
                    fission_rms: outcome.fission_rms,
                };
                self.notify(|obs| obs.on_inner(&record));

                if outcome.flux_rms <= eps {
                    break outcome;
                }
                if inner >= max_iter {
                    return Ok(self.finish(
                        SolveStatus::Failed(FailureReason::InnerNonConvergence),
                        outer,
                        total_inner,
                    ));
                }
            };

            self.state = SolverState::OuterConverging;
            let flux_rms = outcome.flux_rms;
            let mut fission_new = outcome.fission_source;
            if cadence == Some(AccelerationCadence::PerOuter) {
                let (fission, f) = self.accelerate(&outer_start_flux, fission_new, eps)?;
                fission_new = fission;
                factor = Some(f);
            }
            self.scatter_source = self.mesh.scatter_source();

            let (fission_rms, kdiff) = match (self.fission_source.take(), fission_new) {
                (Some(old), Some(new)) => {
                    let old_total = old.sum();
                    let new_total = new.sum();
                    let k_new = self.k * new_total / old_total;
                    if !old_total.is_finite() || old_total <= 0.0 || !k_new.is_finite() || k_new <= 0.0 {
                        self.fission_source = Some(old);
                        return Err(SnError::PhysicsViolation(format!(
                            "fission source total went from {old_total} to {new_total}, k update undefined"
                        )));
                    }
                    let rms = relative_rms_diff(&new, &old, cells, self.config.norm_floor);
                    let kdiff = ((k_new - self.k) / k_new).abs();
                    self.k = k_new;
                    self.fission_source = Some(new);
                    (rms, kdiff)
                }
                (old, _) => {
                    self.fission_source = old;
                    (0.0, 0.0)
                }
            };

            let record = OuterRecord {
                iteration: outer,
                k: self.k,
                kdiff,
                fission_rms,
                flux_rms,
                inner_iterations: inner,
                acceleration_factor: factor,
            };
            self.notify(|obs| obs.on_outer(&record));
            self.history.push(record);

            if fission_rms <= eps && kdiff <= eps {
                return Ok(self.finish(SolveStatus::Converged, outer, total_inner));
            }
            if outer >= max_iter {
                return Ok(self.finish(
                    SolveStatus::Failed(FailureReason::OuterNonConvergence),
                    outer,
                    total_inner,
                ));
            }
        }
    }

    /// Restrict, solve and prolong, then recompute the fission source from
    /// the corrected flux.
    fn accelerate(
        &mut self,
        old_flux: &MeshArray<S::Mesh>,
        fission_source: Option<MeshArray<S::Mesh>>,
        eps: f64,
    ) -> SnResult<(Option<MeshArray<S::Mesh>>, f64)> {
        let Some(accelerator) = self.accelerator.as_mut() else {
            return Ok((fission_source, 1.0));
        };
        accelerator.restrict(self.mesh);
        accelerator.solve(old_flux, fission_source.as_ref(), self.k, eps)?;
        accelerator.prolong(self.mesh);
        let factor = accelerator.factor();

        if self.config.scatter_refresh == ScatterRefresh::EverySweep {
            self.scatter_source = self.mesh.scatter_source();
        }
        Ok((self.mesh.fission_source(), factor))
    }

    fn notify(&mut self, event: impl Fn(&mut (dyn IterationObserver + 'a))) {
        event(&mut self.log);
        if let Some(observer) = self.observer.as_deref_mut() {
            event(observer);
        }
    }

    fn finish(&mut self, status: SolveStatus, outer: usize, inner: usize) -> SolveReport {
        self.state = match status {
            SolveStatus::Converged => SolverState::Converged,
            SolveStatus::Failed(reason) => SolverState::Failed(reason),
        };
        let report = SolveReport {
            status,
            k: self.k,
            outer_iterations: outer,
            inner_iterations: inner,
        };
        self.notify(|obs| obs.on_finish(&report));
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::f64::consts::PI;
    use std::rc::Rc;

    use ndarray::Array2;
    use sn_types::state::Material;

    /// k of the fundamental mode of a bare slab in the two-stream (S2)
    /// approximation: tan(B L / 2) = sigma_t / (mu B).
    fn two_stream_k(sigma_t: f64, sigma_s: f64, nu_sigma_f: f64, width: f64) -> f64 {
        let mu = 1.0 / 3f64.sqrt();
        let f = |b: f64| (0.5 * b * width).tan() - sigma_t / (mu * b);
        let (mut lo, mut hi) = (1e-9, PI / width - 1e-12);
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            if f(mid) > 0.0 {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        let b = 0.5 * (lo + hi);
        nu_sigma_f / (sigma_t - sigma_s + mu * mu * b * b / sigma_t)
    }

    #[test]
    fn test_periodic_single_cell_wraps() {
        let quad = Quadrature1D::gauss_legendre(2).unwrap();
        let absorber = Material::one_group("absorber", 1.0, 0.0, 0.0).unwrap();
        let mut mesh = Mesh1D::uniform(absorber, 1.0, 1, 0.5, &quad).unwrap();
        let report = {
            let mut calc = Calculator::one_d(&quad, &mut mesh, &["periodic", "periodic"], 1.0).unwrap();
            calc.solve(1e-12, 200).unwrap()
        };
        assert!(report.converged());
        assert_eq!(report.outer_iterations, 1);
        // Outgoing flux equals incoming flux (the wrap), at q / sigma.
        assert!((mesh.psi[[1, 0, 0]] - mesh.psi[[0, 0, 0]]).abs() < 1e-10);
        assert!((mesh.psi[[0, 1, 0]] - mesh.psi[[1, 1, 0]]).abs() < 1e-10);
        assert!((mesh.psi[[1, 0, 0]] - 0.5).abs() < 1e-10);
        assert!((mesh.flux[[0, 0]] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_configuration_rejection() {
        let quad = Quadrature1D::gauss_legendre(2).unwrap();
        let m = Material::one_group("m", 1.0, 0.0, 0.0).unwrap();
        let mut mesh = Mesh1D::uniform(m, 1.0, 2, 0.0, &quad).unwrap();
        assert!(matches!(
            Calculator::one_d(&quad, &mut mesh, &["periodic", "vacuum"], 1.0),
            Err(SnError::ConfigError(_))
        ));
        assert!(matches!(
            Calculator::one_d(&quad, &mut mesh, &["invalid", "vacuum"], 1.0),
            Err(SnError::ConfigError(_))
        ));
        assert!(matches!(
            Calculator::one_d(&quad, &mut mesh, &["vacuum"; 6], 1.0),
            Err(SnError::UnsupportedDimension(3))
        ));
        assert!(matches!(
            Calculator::one_d(&quad, &mut mesh, &["vacuum", "vacuum"], 0.0),
            Err(SnError::ConfigError(_))
        ));
    }

    #[test]
    fn test_invalid_solve_arguments() {
        let quad = Quadrature1D::gauss_legendre(2).unwrap();
        let m = Material::one_group("m", 1.0, 0.0, 0.0).unwrap();
        let mut mesh = Mesh1D::uniform(m, 1.0, 2, 0.0, &quad).unwrap();
        let mut calc = Calculator::one_d(&quad, &mut mesh, &["vacuum", "vacuum"], 1.0).unwrap();
        assert!(matches!(calc.solve(0.0, 10), Err(SnError::ConfigError(_))));
        assert!(matches!(calc.solve(1e-6, 0), Err(SnError::ConfigError(_))));
        assert_eq!(calc.state(), SolverState::Ready);
    }

    #[test]
    fn test_fixed_source_multigroup_infinite_medium() {
        // phi_g * sigma_g = 2 s + sum_g' sigma_s[g'][g] phi_g'
        // -> phi = [2.5, 2.75] for s = 1.
        let quad = Quadrature1D::gauss_legendre(4).unwrap();
        let material = Material::new(
            "moderator",
            vec![1.0, 2.0],
            vec![vec![0.2, 0.3], vec![0.0, 1.0]],
            vec![],
            vec![],
        )
        .unwrap();
        let mut mesh = Mesh1D::uniform(material, 2.0, 8, 1.0, &quad).unwrap();
        let mut calc =
            Calculator::one_d(&quad, &mut mesh, &["reflective", "reflective"], 1.0).unwrap();
        let report = calc.solve(1e-10, 1000).unwrap();
        assert!(report.converged());
        assert_eq!(report.outer_iterations, 1);
        assert_eq!(calc.state(), SolverState::Converged);
        assert!(calc.fission_source().is_none());
        for i in 0..8 {
            let phi = &calc.mesh().flux;
            assert!((phi[[i, 0]] - 2.5).abs() < 1e-8, "phi1 = {}", phi[[i, 0]]);
            assert!((phi[[i, 1]] - 2.75).abs() < 1e-8, "phi2 = {}", phi[[i, 1]]);
        }
    }

    #[test]
    fn test_infinite_medium_eigenvalue_1d() {
        let quad = Quadrature1D::gauss_legendre(4).unwrap();
        let fuel = Material::one_group("fuel", 1.0, 0.5, 0.45).unwrap();
        let mut mesh = Mesh1D::uniform(fuel, 4.0, 10, 0.0, &quad).unwrap();
        let mut calc =
            Calculator::one_d(&quad, &mut mesh, &["reflective", "reflective"], 1.0).unwrap();
        let report = calc.solve(1e-8, 1000).unwrap();
        assert!(report.converged());
        let k_inf = 0.45 / (1.0 - 0.5);
        assert!((report.k - k_inf).abs() < 1e-4, "k = {}", report.k);
        assert!((calc.k() - report.k).abs() < 1e-15);
        assert_eq!(calc.history().len(), report.outer_iterations);
    }

    #[test]
    fn test_bare_slab_matches_two_stream_theory() {
        let quad = Quadrature1D::gauss_legendre(2).unwrap();
        let fuel = Material::one_group("fuel", 1.0, 0.5, 0.45).unwrap();
        let mut mesh = Mesh1D::uniform(fuel, 10.0, 100, 0.0, &quad).unwrap();
        let mut calc = Calculator::one_d(&quad, &mut mesh, &["vacuum", "vacuum"], 1.0).unwrap();
        let report = calc.solve(1e-6, 1000).unwrap();
        assert!(report.converged(), "status {:?}", report.status);
        let k_ref = two_stream_k(1.0, 0.5, 0.45, 10.0);
        assert!((report.k - k_ref).abs() < 1e-4, "k = {}, reference {k_ref}", report.k);
        assert!(report.k < 0.45 / 0.5);

        // Fundamental mode is symmetric and peaks in the middle.
        let phi = &calc.mesh().flux;
        assert!(phi[[50, 0]] > phi[[0, 0]]);
        for i in 0..50 {
            let (a, b) = (phi[[i, 0]], phi[[99 - i, 0]]);
            assert!((a - b).abs() < 1e-6 * a.abs().max(1.0));
        }
    }

    #[test]
    fn test_half_slab_reflective_matches_full_slab() {
        let quad = Quadrature1D::gauss_legendre(4).unwrap();
        let fuel = Material::one_group("fuel", 1.0, 0.6, 0.5).unwrap();

        let mut full = Mesh1D::uniform(fuel.clone(), 8.0, 40, 0.0, &quad).unwrap();
        let k_full = Calculator::one_d(&quad, &mut full, &["vacuum", "vacuum"], 1.0)
            .unwrap()
            .solve(1e-9, 2000)
            .unwrap()
            .k;

        let mut half = Mesh1D::uniform(fuel, 4.0, 20, 0.0, &quad).unwrap();
        let k_half = Calculator::one_d(&quad, &mut half, &["reflective", "vacuum"], 1.0)
            .unwrap()
            .solve(1e-9, 2000)
            .unwrap()
            .k;

        assert!((k_full - k_half).abs() < 1e-6, "{k_full} vs {k_half}");
        // Flux shape: half mesh cell i corresponds to full mesh cell 20 + i.
        let scale = full.flux[[20, 0]] / half.flux[[0, 0]];
        for i in 0..20 {
            let rel = (full.flux[[20 + i, 0]] - scale * half.flux[[i, 0]]) / full.flux[[20 + i, 0]];
            assert!(rel.abs() < 1e-5, "cell {i}: rel = {rel}");
        }
    }

    #[test]
    fn test_every_outer_refresh_still_converges() {
        let quad = Quadrature1D::gauss_legendre(4).unwrap();
        let fuel = Material::one_group("fuel", 1.0, 0.5, 0.45).unwrap();
        let mut mesh = Mesh1D::uniform(fuel, 4.0, 10, 0.0, &quad).unwrap();
        let config = SolverConfig {
            scatter_refresh: ScatterRefresh::EveryOuter,
            ..SolverConfig::default()
        };
        let mut calc = Calculator::one_d(&quad, &mut mesh, &["reflective", "reflective"], 1.0)
            .unwrap()
            .with_config(&config)
            .unwrap();
        let report = calc.solve(1e-8, 5000).unwrap();
        assert!(report.converged());
        assert!((report.k - 0.9).abs() < 1e-4, "k = {}", report.k);
    }

    #[test]
    fn test_from_config() {
        let quad = Quadrature1D::gauss_legendre(4).unwrap();
        let fuel = Material::one_group("fuel", 1.0, 0.5, 0.45).unwrap();
        let mut mesh = Mesh1D::uniform(fuel, 4.0, 10, 0.0, &quad).unwrap();
        let config = SolverConfig::from_json_str(
            r#"{"eps": 1e-8, "initial_k": 0.8, "parallel_groups": true,
                "boundary_conditions": ["reflective", "reflective"]}"#,
        )
        .unwrap();
        let mut calc = Calculator::from_config(&quad, &mut mesh, &config).unwrap();
        assert!((calc.k() - 0.8).abs() < 1e-15);
        let report = calc.solve_with_config().unwrap();
        assert!(report.converged());
        assert!((report.k - 0.9).abs() < 1e-4);

        let missing = SolverConfig::default();
        let quad2 = Quadrature1D::gauss_legendre(2).unwrap();
        let m = Material::one_group("m", 1.0, 0.0, 0.0).unwrap();
        let mut mesh2 = Mesh1D::uniform(m, 1.0, 2, 0.0, &quad2).unwrap();
        assert!(matches!(
            Calculator::from_config(&quad2, &mut mesh2, &missing),
            Err(SnError::ConfigError(_))
        ));
    }

    #[test]
    fn test_inner_non_convergence_is_reported() {
        let quad = Quadrature1D::gauss_legendre(4).unwrap();
        let scatterer = Material::one_group("scatterer", 1.0, 0.99, 0.0).unwrap();
        let mut mesh = Mesh1D::uniform(scatterer, 10.0, 20, 1.0, &quad).unwrap();
        let mut calc =
            Calculator::one_d(&quad, &mut mesh, &["reflective", "reflective"], 1.0).unwrap();
        let report = calc.solve(1e-12, 3).unwrap();
        assert_eq!(
            report.status,
            SolveStatus::Failed(FailureReason::InnerNonConvergence)
        );
        assert!(!report.converged());
        assert_eq!(report.inner_iterations, 3);
        assert_eq!(
            calc.state(),
            SolverState::Failed(FailureReason::InnerNonConvergence)
        );
    }

    #[test]
    fn test_outer_non_convergence_is_reported() {
        // No scattering and vacuum edges: the second sweep of every outer
        // reproduces the first exactly, so only the outer cap can trip.
        let quad = Quadrature1D::gauss_legendre(2).unwrap();
        let fuel = Material::one_group("fuel", 1.0, 0.0, 0.45).unwrap();
        let mut mesh = Mesh1D::uniform(fuel, 10.0, 50, 0.0, &quad).unwrap();
        let mut calc = Calculator::one_d(&quad, &mut mesh, &["vacuum", "vacuum"], 1.0).unwrap();
        let report = calc.solve(1e-9, 3).unwrap();
        assert_eq!(
            report.status,
            SolveStatus::Failed(FailureReason::OuterNonConvergence)
        );
        assert_eq!(report.outer_iterations, 3);
        assert_eq!(report.inner_iterations, 6);
        assert_eq!(calc.history().len(), 3);
        assert!(calc.history().iter().all(|r| r.inner_iterations == 2));
    }

    #[test]
    fn test_zero_fission_total_is_physics_violation() {
        let quad = Quadrature1D::gauss_legendre(2).unwrap();
        let fuel = Material::one_group("fuel", 1.0, 0.5, 0.45).unwrap();
        let mut mesh = Mesh1D::uniform(fuel, 1.0, 4, 0.0, &quad).unwrap();
        mesh.flux.fill(0.0);
        let mut calc = Calculator::one_d(&quad, &mut mesh, &["vacuum", "vacuum"], 1.0).unwrap();
        assert!(matches!(
            calc.solve(1e-6, 10),
            Err(SnError::PhysicsViolation(_))
        ));
        assert!(calc.fission_source().is_some());
    }

    #[test]
    fn test_nan_flux_is_divergence() {
        let quad = Quadrature1D::gauss_legendre(2).unwrap();
        let absorber = Material::one_group("absorber", 1.0, 0.0, 0.0).unwrap();
        let mut mesh = Mesh1D::uniform(absorber, 1.0, 2, f64::NAN, &quad).unwrap();
        let mut calc = Calculator::one_d(&quad, &mut mesh, &["vacuum", "vacuum"], 1.0).unwrap();
        match calc.sweep(1.0) {
            Err(SnError::SolverDiverged { iteration, .. }) => assert_eq!(iteration, 1),
            other => panic!("expected SolverDiverged, got {other:?}"),
        }
    }

    // ── Acceleration & observers ─────────────────────────────────────

    #[derive(Default)]
    struct CallLog {
        calls: Vec<&'static str>,
        old_flux_totals: Vec<f64>,
    }

    struct Recording {
        log: Rc<RefCell<CallLog>>,
        factor: f64,
    }

    impl Accelerator<Mesh1D> for Recording {
        fn restrict(&mut self, _mesh: &Mesh1D) {
            self.log.borrow_mut().calls.push("restrict");
        }

        fn solve(
            &mut self,
            old_flux: &Array2<f64>,
            fission_source: Option<&Array2<f64>>,
            _k: f64,
            _eps: f64,
        ) -> SnResult<()> {
            let mut log = self.log.borrow_mut();
            log.calls.push("solve");
            log.old_flux_totals.push(old_flux.sum());
            assert!(fission_source.is_some());
            Ok(())
        }

        fn prolong(&mut self, _mesh: &mut Mesh1D) {
            self.log.borrow_mut().calls.push("prolong");
        }

        fn factor(&self) -> f64 {
            self.factor
        }
    }

    struct Failing;

    impl Accelerator<Mesh1D> for Failing {
        fn restrict(&mut self, _mesh: &Mesh1D) {}

        fn solve(
            &mut self,
            _old_flux: &Array2<f64>,
            _fission_source: Option<&Array2<f64>>,
            _k: f64,
            _eps: f64,
        ) -> SnResult<()> {
            Err(SnError::Acceleration("coarse system is singular".to_string()))
        }

        fn prolong(&mut self, _mesh: &mut Mesh1D) {}

        fn factor(&self) -> f64 {
            1.0
        }
    }

    #[derive(Default)]
    struct Counts {
        inner: usize,
        outer: usize,
        finished: Option<SolveReport>,
    }

    struct Counting(Rc<RefCell<Counts>>);

    impl IterationObserver for Counting {
        fn on_inner(&mut self, _record: &InnerRecord) {
            self.0.borrow_mut().inner += 1;
        }

        fn on_outer(&mut self, _record: &OuterRecord) {
            self.0.borrow_mut().outer += 1;
        }

        fn on_finish(&mut self, report: &SolveReport) {
            self.0.borrow_mut().finished = Some(*report);
        }
    }

    fn reflective_fuel(quad: &Quadrature1D) -> Mesh1D {
        let fuel = Material::one_group("fuel", 1.0, 0.5, 0.45).unwrap();
        Mesh1D::uniform(fuel, 4.0, 10, 0.0, quad).unwrap()
    }

    #[test]
    fn test_per_outer_acceleration_runs_once_per_outer() {
        let quad = Quadrature1D::gauss_legendre(2).unwrap();
        let mut mesh = reflective_fuel(&quad);
        let log = Rc::new(RefCell::new(CallLog::default()));
        let initial_total = mesh.flux.sum();
        let mut calc =
            Calculator::one_d(&quad, &mut mesh, &["reflective", "reflective"], 1.0)
                .unwrap()
                .with_accelerator(
                    Recording {
                        log: Rc::clone(&log),
                        factor: 1.0,
                    },
                    AccelerationCadence::PerOuter,
                );
        let report = calc.solve(1e-8, 1000).unwrap();
        assert!(report.converged());

        let log = log.borrow();
        assert_eq!(log.calls.len(), 3 * report.outer_iterations);
        for cycle in log.calls.chunks(3) {
            assert_eq!(cycle, ["restrict", "solve", "prolong"]);
        }
        // First cycle sees the flux at the start of the first outer.
        assert!((log.old_flux_totals[0] - initial_total).abs() < 1e-12);
        assert_eq!(calc.acceleration_factors(), vec![1.0; report.outer_iterations]);
    }

    #[test]
    fn test_per_inner_acceleration_runs_every_sweep() {
        let quad = Quadrature1D::gauss_legendre(2).unwrap();
        let mut mesh = reflective_fuel(&quad);
        let log = Rc::new(RefCell::new(CallLog::default()));
        let mut calc =
            Calculator::one_d(&quad, &mut mesh, &["reflective", "reflective"], 1.0)
                .unwrap()
                .with_accelerator(
                    Recording {
                        log: Rc::clone(&log),
                        factor: 0.75,
                    },
                    AccelerationCadence::PerInner,
                );
        let report = calc.solve(1e-8, 1000).unwrap();
        assert!(report.converged());
        assert_eq!(log.borrow().calls.len(), 3 * report.inner_iterations);
        let factors = calc.acceleration_factors();
        assert_eq!(factors.len(), report.outer_iterations);
        assert!(factors.iter().all(|&f| f == 0.75));
    }

    #[test]
    fn test_accelerator_error_propagates() {
        let quad = Quadrature1D::gauss_legendre(2).unwrap();
        let mut mesh = reflective_fuel(&quad);
        let mut calc =
            Calculator::one_d(&quad, &mut mesh, &["reflective", "reflective"], 1.0)
                .unwrap()
                .with_accelerator(Failing, AccelerationCadence::PerOuter);
        assert!(matches!(
            calc.solve(1e-8, 100),
            Err(SnError::Acceleration(_))
        ));
    }

    #[test]
    fn test_observer_sees_every_iteration() {
        let quad = Quadrature1D::gauss_legendre(2).unwrap();
        let mut mesh = reflective_fuel(&quad);
        let counts = Rc::new(RefCell::new(Counts::default()));
        let mut calc =
            Calculator::one_d(&quad, &mut mesh, &["reflective", "reflective"], 1.0)
                .unwrap()
                .with_observer(Counting(Rc::clone(&counts)));
        let report = calc.solve(1e-8, 1000).unwrap();
        let counts = counts.borrow();
        assert_eq!(counts.inner, report.inner_iterations);
        assert_eq!(counts.outer, report.outer_iterations);
        assert_eq!(counts.finished, Some(report));
        assert_eq!(calc.history().len(), report.outer_iterations);
        let last = calc.history().last().unwrap();
        assert!(last.kdiff <= 1e-8 && last.fission_rms <= 1e-8);
        assert_eq!(last.acceleration_factor, None);
    }

    // ── 2-D ──────────────────────────────────────────────────────────

    #[test]
    fn test_infinite_medium_fixed_source_2d() {
        // psi = q / sigma with q = s + 0.5 sigma_s phi, phi = 2 psi -> phi = 4 s.
        let quad = Quadrature2D::level_symmetric(4).unwrap();
        let m = Material::one_group("moderator", 1.0, 0.5, 0.0).unwrap();
        let mut mesh = Mesh2D::uniform(m, 2.0, 2.0, 4, 4, 0.25, &quad).unwrap();
        let mut calc = Calculator::two_d(&quad, &mut mesh, &["reflective"; 4], 1.0).unwrap();
        let report = calc.solve(1e-10, 1000).unwrap();
        assert!(report.converged());
        for &phi in calc.mesh().flux.iter() {
            assert!((phi - 1.0).abs() < 1e-7, "phi = {phi}");
        }
    }

    #[test]
    fn test_infinite_medium_eigenvalue_2d() {
        let quad = Quadrature2D::level_symmetric(4).unwrap();
        let fuel = Material::one_group("fuel", 1.0, 0.3, 0.56).unwrap();
        let mut mesh = Mesh2D::uniform(fuel, 2.0, 2.0, 4, 4, 0.0, &quad).unwrap();
        let mut calc = Calculator::two_d(&quad, &mut mesh, &["reflective"; 4], 1.0).unwrap();
        let report = calc.solve(1e-8, 1000).unwrap();
        assert!(report.converged());
        assert!((report.k - 0.8).abs() < 1e-4, "k = {}", report.k);
    }

    #[test]
    fn test_quarter_mesh_reflective_matches_full_mesh() {
        let quad = Quadrature2D::level_symmetric(4).unwrap();
        let m = Material::one_group("moderator", 1.0, 0.5, 0.0).unwrap();

        let mut full = Mesh2D::uniform(m.clone(), 4.0, 4.0, 8, 8, 1.0, &quad).unwrap();
        Calculator::two_d(&quad, &mut full, &["vacuum"; 4], 1.0)
            .unwrap()
            .solve(1e-11, 2000)
            .unwrap();

        // North-east quarter: reflective west and south.
        let mut quarter = Mesh2D::uniform(m, 2.0, 2.0, 4, 4, 1.0, &quad).unwrap();
        Calculator::two_d(
            &quad,
            &mut quarter,
            &["reflective", "vacuum", "vacuum", "reflective"],
            1.0,
        )
        .unwrap()
        .solve(1e-11, 2000)
        .unwrap();

        for i in 0..4 {
            for j in 0..4 {
                let a = full.flux[[4 + i, 4 + j, 0]];
                let b = quarter.flux[[i, j, 0]];
                assert!((a - b).abs() < 1e-7 * a, "({i}, {j}): {a} vs {b}");
            }
        }
    }

    #[test]
    fn test_two_d_from_config() {
        let quad = Quadrature2D::level_symmetric(2).unwrap();
        let m = Material::one_group("absorber", 1.0, 0.0, 0.0).unwrap();
        let mut mesh = Mesh2D::uniform(m, 1.0, 1.0, 3, 3, 1.0, &quad).unwrap();
        let config = SolverConfig {
            boundary_conditions: vec!["periodic".into(); 4],
            eps: 1e-11,
            ..SolverConfig::default()
        };
        let mut calc = Calculator::from_config_2d(&quad, &mut mesh, &config).unwrap();
        let report = calc.solve_with_config().unwrap();
        assert!(report.converged());
        for &phi in calc.mesh().flux.iter() {
            assert!((phi - 2.0).abs() < 1e-8);
        }
    }
}
