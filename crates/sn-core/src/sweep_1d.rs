// ─────────────────────────────────────────────────────────────────────
// SCPN SN Transport — 1-D Sweep
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Diamond-difference sweep of a 1-D slab.
//!
//! Forward directions (μ > 0) march west to east, then backward directions
//! march east to west. Boundary values are read from the face array when a
//! direction starts, so a reflective west edge sees the backward flux of
//! the previous sweep while a reflective east edge sees the forward flux
//! of the current one.

use ndarray::{Array2, ArrayViewMut1, ArrayViewMut2, Axis, Ix2};
use rayon::prelude::*;
use sn_math::diamond::diamond_1d;
use sn_types::error::{SnError, SnResult};
use sn_types::quadrature::Quadrature1D;
use sn_types::state::{Mesh1D, Node1D};

use crate::boundary::{BoundaryConditions, IncomingFlux};
use crate::sweep::{finish_sweep, SweepInput, SweepOutcome, TransportSweep};

/// Sweep engine for [`Mesh1D`].
#[derive(Debug, Clone)]
pub struct Sweep1D<'q> {
    quad: &'q Quadrature1D,
    west: IncomingFlux,
    east: IncomingFlux,
    nx: usize,
    parallel_groups: bool,
}

impl<'q> Sweep1D<'q> {
    pub fn new(
        quad: &'q Quadrature1D,
        mesh: &Mesh1D,
        bcs: &BoundaryConditions,
    ) -> SnResult<Self> {
        let nx = mesh.nx();
        if mesh.psi.dim() != (nx + 1, quad.count(), mesh.groups) {
            return Err(SnError::ConfigError(format!(
                "angular flux shape {:?} does not match {} directions",
                mesh.psi.shape(),
                quad.count()
            )));
        }
        let [west, east] = bcs.resolve_1d(nx, quad)?;
        Ok(Sweep1D {
            quad,
            west,
            east,
            nx,
            parallel_groups: false,
        })
    }

    /// Sweep groups concurrently on the rayon pool.
    pub fn with_parallel_groups(mut self, parallel: bool) -> Self {
        self.parallel_groups = parallel;
        self
    }

    pub fn quadrature(&self) -> &Quadrature1D {
        self.quad
    }

    fn sweep_group(
        &self,
        nodes: &[Node1D],
        g: usize,
        mut psi: ArrayViewMut2<'_, f64>,
        mut flux: ArrayViewMut1<'_, f64>,
        input: &SweepInput<'_, Ix2>,
    ) {
        let nx = nodes.len();
        let fission = input.fission_term();
        let q: Vec<f64> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                node.source
                    + 0.5 * input.scatter[[i, g]]
                    + fission.map_or(0.0, |(fs, k)| 0.5 * fs[[i, g]] / k)
            })
            .collect();

        let half = self.quad.half();
        for n in 0..half {
            let mu = self.quad.mu(n);
            let mut psi_in = self.west.value(n, |face, m| psi[[face, m]]);
            psi[[0, n]] = psi_in;
            for i in 0..nx {
                let psi_out = diamond_1d(psi_in, mu, nodes[i].dx, nodes[i].sigma_tr(g), q[i]);
                psi[[i + 1, n]] = psi_out;
                psi_in = psi_out;
            }
        }
        for n in half..self.quad.count() {
            let mu = self.quad.mu(n).abs();
            let mut psi_in = self.east.value(n, |face, m| psi[[face, m]]);
            psi[[nx, n]] = psi_in;
            for i in (0..nx).rev() {
                let psi_out = diamond_1d(psi_in, mu, nodes[i].dx, nodes[i].sigma_tr(g), q[i]);
                psi[[i, n]] = psi_out;
                psi_in = psi_out;
            }
        }

        for i in 0..nx {
            flux[i] = (0..self.quad.count())
                .map(|n| self.quad.weight(n) * 0.5 * (psi[[i, n]] + psi[[i + 1, n]]))
                .sum();
        }
    }
}

impl TransportSweep for Sweep1D<'_> {
    type Mesh = Mesh1D;

    fn sweep(
        &self,
        mesh: &mut Mesh1D,
        input: &SweepInput<'_, Ix2>,
    ) -> SnResult<SweepOutcome<Ix2>> {
        if mesh.nx() != self.nx || mesh.psi.dim().1 != self.quad.count() {
            return Err(SnError::ConfigError(format!(
                "sweep built for {} cells x {} directions, mesh has {:?}",
                self.nx,
                self.quad.count(),
                mesh.psi.shape()
            )));
        }
        let old_flux: Array2<f64> = mesh.flux.clone();

        let Mesh1D {
            nodes, flux, psi, ..
        } = &mut *mesh;
        let nodes: &[Node1D] = nodes;
        let lanes: Vec<_> = psi
            .axis_iter_mut(Axis(2))
            .zip(flux.axis_iter_mut(Axis(1)))
            .enumerate()
            .collect();
        let run = |(g, (psi_g, flux_g)): (usize, (ArrayViewMut2<'_, f64>, ArrayViewMut1<'_, f64>))| {
            self.sweep_group(nodes, g, psi_g, flux_g, input)
        };
        if self.parallel_groups {
            lanes.into_par_iter().for_each(run);
        } else {
            lanes.into_iter().for_each(run);
        }

        Ok(finish_sweep(&*mesh, &old_flux, input))
    }
}
