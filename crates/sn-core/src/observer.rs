// ─────────────────────────────────────────────────────────────────────
// SCPN SN Transport — Iteration Observer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use log::{debug, info, warn};

use crate::calculator::{SolveReport, SolveStatus};

/// Convergence measures of one inner sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InnerRecord {
    /// 1-based outer iteration the sweep belongs to.
    pub outer: usize,
    /// 1-based sweep count within the outer iteration.
    pub inner: usize,
    pub flux_rms: f64,
    pub fission_rms: f64,
}

/// Summary of one completed outer iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OuterRecord {
    pub iteration: usize,
    /// Eigenvalue after the update.
    pub k: f64,
    /// |k_new − k_old| / k_new.
    pub kdiff: f64,
    pub fission_rms: f64,
    pub flux_rms: f64,
    pub inner_iterations: usize,
    /// Last accelerator factor of this outer iteration, if one ran.
    pub acceleration_factor: Option<f64>,
}

/// Receives progress from the eigenvalue controller.
pub trait IterationObserver {
    fn on_inner(&mut self, _record: &InnerRecord) {}

    fn on_outer(&mut self, _record: &OuterRecord) {}

    fn on_finish(&mut self, _report: &SolveReport) {}
}

/// Default observer: forwards progress to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl IterationObserver for LogObserver {
    fn on_inner(&mut self, record: &InnerRecord) {
        debug!(
            "[SN] outer {} inner {}: flux rms = {:.3e}, fission rms = {:.3e}",
            record.outer, record.inner, record.flux_rms, record.fission_rms
        );
    }

    fn on_outer(&mut self, record: &OuterRecord) {
        info!(
            "[SN] outer {}: k = {:.6}, kdiff = {:.3e}, fission rms = {:.3e} ({} inner)",
            record.iteration, record.k, record.kdiff, record.fission_rms, record.inner_iterations
        );
        if let Some(factor) = record.acceleration_factor {
            debug!("[SN] outer {}: acceleration factor = {factor:.6}", record.iteration);
        }
    }

    fn on_finish(&mut self, report: &SolveReport) {
        match report.status {
            SolveStatus::Converged => info!(
                "[SN] solution converged after {} outer / {} inner iterations, k = {:.6}",
                report.outer_iterations, report.inner_iterations, report.k
            ),
            SolveStatus::Failed(reason) => warn!(
                "[SN] solution did NOT converge ({reason:?}) after {} outer / {} inner iterations, k = {:.6}",
                report.outer_iterations, report.inner_iterations, report.k
            ),
        }
    }
}
