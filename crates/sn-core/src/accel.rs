// ─────────────────────────────────────────────────────────────────────
// SCPN SN Transport — Acceleration Hook
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Coarse-mesh acceleration seam.
//!
//! An accelerator runs a restrict → solve → prolong cycle on the transport
//! mesh: restriction collapses the fine flux onto its own coarse
//! representation, the coarse problem is solved, and prolongation writes
//! the correction back into the mesh's scalar flux. The eigenvalue
//! controller drives the cycle at the cadence chosen in
//! [`AccelerationCadence`] and recomputes the fission source afterwards.
//!
//! No coarse-mesh scheme ships with this crate; implementors supply one.

pub use sn_types::config::AccelerationCadence;
use sn_types::error::SnResult;
use sn_types::state::TransportMesh;

use crate::sweep::MeshArray;

/// Restrict / solve / prolong cycle over a mesh of type `M`.
pub trait Accelerator<M: TransportMesh> {
    /// Collapse the current mesh flux onto the coarse representation.
    fn restrict(&mut self, mesh: &M);

    /// Solve the coarse problem.
    ///
    /// `old_flux` is the scalar flux at the start of the cycle's window:
    /// the start of the outer iteration for [`AccelerationCadence::PerOuter`],
    /// the start of the sweep for [`AccelerationCadence::PerInner`].
    /// `fission_source` is the freshly swept source, `None` for fixed-source
    /// problems.
    fn solve(
        &mut self,
        old_flux: &MeshArray<M>,
        fission_source: Option<&MeshArray<M>>,
        k: f64,
        eps: f64,
    ) -> SnResult<()>;

    /// Write the coarse correction back into the mesh flux.
    fn prolong(&mut self, mesh: &mut M);

    /// Scalar measure of the last correction (1.0 means no change).
    fn factor(&self) -> f64;
}
