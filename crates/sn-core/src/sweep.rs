// ─────────────────────────────────────────────────────────────────────
// SCPN SN Transport — Sweep Interface
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! The seam between the eigenvalue controller and the dimension-specific
//! sweep engines.

use ndarray::{Array, Dimension};
use sn_math::norm::relative_rms_diff;
use sn_types::error::SnResult;
use sn_types::state::TransportMesh;

/// Per-cell-per-group array matching a mesh's scalar flux.
pub type MeshArray<M> = Array<f64, <M as TransportMesh>::Dim>;

/// Sources and settings for one transport sweep.
#[derive(Debug, Clone, Copy)]
pub struct SweepInput<'s, D: Dimension> {
    pub scatter: &'s Array<f64, D>,
    /// Lagged fission source, `None` for a non-multiplying problem.
    pub fission: Option<&'s Array<f64, D>>,
    /// Eigenvalue dividing the fission term.
    pub k: Option<f64>,
    /// Floor for the relative RMS norms.
    pub norm_floor: f64,
}

impl<D: Dimension> SweepInput<'_, D> {
    /// Fission source and eigenvalue, when both are present.
    pub fn fission_term(&self) -> Option<(&Array<f64, D>, f64)> {
        self.fission.zip(self.k)
    }
}

/// Result of one sweep: the recomputed fission source and the two
/// convergence measures against the pre-sweep state.
#[derive(Debug, Clone)]
pub struct SweepOutcome<D: Dimension> {
    pub fission_source: Option<Array<f64, D>>,
    pub fission_rms: f64,
    pub flux_rms: f64,
}

/// One full transport sweep over every group and direction of a mesh.
pub trait TransportSweep {
    type Mesh: TransportMesh;

    /// Sweep with fixed sources, overwriting the angular and scalar flux
    /// of `mesh`.
    fn sweep(
        &self,
        mesh: &mut Self::Mesh,
        input: &SweepInput<'_, <Self::Mesh as TransportMesh>::Dim>,
    ) -> SnResult<SweepOutcome<<Self::Mesh as TransportMesh>::Dim>>;
}

/// Recompute the fission source and measure both changes.
pub(crate) fn finish_sweep<M: TransportMesh>(
    mesh: &M,
    old_flux: &MeshArray<M>,
    input: &SweepInput<'_, M::Dim>,
) -> SweepOutcome<M::Dim> {
    let cells = mesh.cell_count();
    let (fission_source, fission_rms) = match (input.fission, mesh.fission_source()) {
        (Some(old), Some(new)) => {
            let rms = relative_rms_diff(&new, old, cells, input.norm_floor);
            (Some(new), rms)
        }
        _ => (None, 0.0),
    };
    let flux_rms = relative_rms_diff(mesh.flux(), old_flux, cells, input.norm_floor);
    SweepOutcome {
        fission_source,
        fission_rms,
        flux_rms,
    }
}
