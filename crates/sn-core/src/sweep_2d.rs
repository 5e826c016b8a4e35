// ─────────────────────────────────────────────────────────────────────
// SCPN SN Transport — 2-D Sweep
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Diamond-difference sweep of a 2-D rectangular mesh.
//!
//! Quadrants run in the order (+,+), (−,+), (+,−), (−,−), each starting at
//! the corner its directions leave from. Exiting x- and y-face values are
//! stored on the mesh so reflective and periodic edges of later quadrants
//! (or the next sweep) can read them.

use ndarray::{Array2, Array3, ArrayViewMut2, ArrayViewMut3, Axis, Ix3};
use rayon::prelude::*;
use sn_math::diamond::diamond_2d;
use sn_types::error::{SnError, SnResult};
use sn_types::quadrature::Quadrature2D;
use sn_types::state::{Mesh2D, Node2D};

use crate::boundary::{BoundaryConditions, EdgeFluxes2D};
use crate::sweep::{finish_sweep, SweepInput, SweepOutcome, TransportSweep};

/// Sweep engine for [`Mesh2D`].
#[derive(Debug, Clone)]
pub struct Sweep2D<'q> {
    quad: &'q Quadrature2D,
    edges: EdgeFluxes2D,
    nx: usize,
    ny: usize,
    parallel_groups: bool,
}

impl<'q> Sweep2D<'q> {
    pub fn new(
        quad: &'q Quadrature2D,
        mesh: &Mesh2D,
        bcs: &BoundaryConditions,
    ) -> SnResult<Self> {
        let (nx, ny) = (mesh.nx(), mesh.ny());
        let n = quad.count();
        if mesh.psi_x.dim() != (nx + 1, ny, n, mesh.groups)
            || mesh.psi_y.dim() != (nx, ny + 1, n, mesh.groups)
        {
            return Err(SnError::ConfigError(format!(
                "face flux shapes {:?} / {:?} do not match {n} directions",
                mesh.psi_x.shape(),
                mesh.psi_y.shape()
            )));
        }
        let edges = bcs.resolve_2d(nx, ny, quad)?;
        Ok(Sweep2D {
            quad,
            edges,
            nx,
            ny,
            parallel_groups: false,
        })
    }

    pub fn with_parallel_groups(mut self, parallel: bool) -> Self {
        self.parallel_groups = parallel;
        self
    }

    pub fn quadrature(&self) -> &Quadrature2D {
        self.quad
    }

    fn sweep_group(
        &self,
        nodes: &Array2<Node2D>,
        g: usize,
        mut psi_x: ArrayViewMut3<'_, f64>,
        mut psi_y: ArrayViewMut3<'_, f64>,
        mut flux: ArrayViewMut2<'_, f64>,
        input: &SweepInput<'_, Ix3>,
    ) {
        let (nx, ny) = (self.nx, self.ny);
        let fission = input.fission_term();
        let q = Array2::from_shape_fn((nx, ny), |(i, j)| {
            nodes[[i, j]].source
                + 0.5 * input.scatter[[i, j, g]]
                + fission.map_or(0.0, |(fs, k)| 0.5 * fs[[i, j, g]] / k)
        });

        let npq = self.quad.npq();
        for quadrant in 0..4 {
            let east_bound = quadrant & 1 == 0;
            let north_bound = quadrant & 2 == 0;
            let (x_edge, x_seed) = if east_bound {
                (&self.edges.west, 0)
            } else {
                (&self.edges.east, nx)
            };
            let (y_edge, y_seed) = if north_bound {
                (&self.edges.south, 0)
            } else {
                (&self.edges.north, ny)
            };

            for n in quadrant * npq..(quadrant + 1) * npq {
                let mux = self.quad.mux(n).abs();
                let muy = self.quad.muy(n).abs();

                for j in 0..ny {
                    let incoming = x_edge.value(n, |face, m| psi_x[[face, j, m]]);
                    psi_x[[x_seed, j, n]] = incoming;
                }
                for i in 0..nx {
                    let incoming = y_edge.value(n, |face, m| psi_y[[i, face, m]]);
                    psi_y[[i, y_seed, n]] = incoming;
                }

                for a in 0..nx {
                    let (i, in_x, out_x) = if east_bound {
                        (a, a, a + 1)
                    } else {
                        let i = nx - 1 - a;
                        (i, i + 1, i)
                    };
                    for b in 0..ny {
                        let (j, in_y, out_y) = if north_bound {
                            (b, b, b + 1)
                        } else {
                            let j = ny - 1 - b;
                            (j, j + 1, j)
                        };
                        let node = &nodes[[i, j]];
                        let cell = diamond_2d(
                            psi_x[[in_x, j, n]],
                            psi_y[[i, in_y, n]],
                            mux,
                            muy,
                            node.dx,
                            node.dy,
                            node.sigma_tr(g),
                            q[[i, j]],
                        );
                        psi_x[[out_x, j, n]] = cell.psi_out_x;
                        psi_y[[i, out_y, n]] = cell.psi_out_y;
                    }
                }
            }
        }

        for ((i, j), phi) in flux.indexed_iter_mut() {
            *phi = (0..self.quad.count())
                .map(|n| self.quad.weight(n) * 0.5 * (psi_x[[i, j, n]] + psi_x[[i + 1, j, n]]))
                .sum();
        }
    }
}

impl TransportSweep for Sweep2D<'_> {
    type Mesh = Mesh2D;

    fn sweep(
        &self,
        mesh: &mut Mesh2D,
        input: &SweepInput<'_, Ix3>,
    ) -> SnResult<SweepOutcome<Ix3>> {
        if (mesh.nx(), mesh.ny()) != (self.nx, self.ny)
            || mesh.psi_x.dim().2 != self.quad.count()
        {
            return Err(SnError::ConfigError(format!(
                "sweep built for {}x{} cells x {} directions, mesh has {:?}",
                self.nx,
                self.ny,
                self.quad.count(),
                mesh.psi_x.shape()
            )));
        }
        let old_flux: Array3<f64> = mesh.flux.clone();

        let Mesh2D {
            nodes,
            flux,
            psi_x,
            psi_y,
            ..
        } = &mut *mesh;
        let nodes: &Array2<Node2D> = nodes;
        let lanes: Vec<_> = psi_x
            .axis_iter_mut(Axis(3))
            .zip(psi_y.axis_iter_mut(Axis(3)))
            .zip(flux.axis_iter_mut(Axis(2)))
            .enumerate()
            .collect();
        type Lane<'l> = (
            usize,
            (
                (ArrayViewMut3<'l, f64>, ArrayViewMut3<'l, f64>),
                ArrayViewMut2<'l, f64>,
            ),
        );
        let run = |(g, ((px, py), phi)): Lane<'_>| {
            self.sweep_group(nodes, g, px, py, phi, input)
        };
        if self.parallel_groups {
            lanes.into_par_iter().for_each(run);
        } else {
            lanes.into_iter().for_each(run);
        }

        Ok(finish_sweep(&*mesh, &old_flux, input))
    }
}
