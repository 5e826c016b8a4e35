// ─────────────────────────────────────────────────────────────────────
// SCPN SN Transport — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::sync::Arc;

use ndarray::{Array, Array2, Array3, Array4, Dimension, Ix2, Ix3};
use serde::{Deserialize, Serialize};

use crate::error::{SnError, SnResult};
use crate::quadrature::{Quadrature1D, Quadrature2D};

/// Multigroup macroscopic cross-sections of one material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// Removal (transport) cross-section per group [1/cm].
    pub sigma_tr: Vec<f64>,
    /// Scattering matrix, `sigma_s[from][to]` [1/cm].
    pub sigma_s: Vec<Vec<f64>>,
    /// nu * fission cross-section per group [1/cm].
    #[serde(default)]
    pub nu_sigma_f: Vec<f64>,
    /// Fission spectrum per group.
    #[serde(default)]
    pub chi: Vec<f64>,
}

impl Material {
    /// Validated constructor. Empty `nu_sigma_f`/`chi` mean non-fissile.
    pub fn new(
        name: &str,
        sigma_tr: Vec<f64>,
        sigma_s: Vec<Vec<f64>>,
        nu_sigma_f: Vec<f64>,
        chi: Vec<f64>,
    ) -> SnResult<Self> {
        let material = Material {
            name: name.to_string(),
            sigma_tr,
            sigma_s,
            nu_sigma_f,
            chi,
        };
        material.validate()?;
        Ok(material)
    }

    /// One-group material; `nu_sigma_f = 0` gives a pure scatterer.
    pub fn one_group(name: &str, sigma_tr: f64, sigma_s: f64, nu_sigma_f: f64) -> SnResult<Self> {
        let (nsf, chi) = if nu_sigma_f > 0.0 {
            (vec![nu_sigma_f], vec![1.0])
        } else {
            (Vec::new(), Vec::new())
        };
        Self::new(name, vec![sigma_tr], vec![vec![sigma_s]], nsf, chi)
    }

    pub fn groups(&self) -> usize {
        self.sigma_tr.len()
    }

    pub fn is_fissile(&self) -> bool {
        self.nu_sigma_f.iter().any(|&v| v > 0.0)
    }

    pub fn validate(&self) -> SnResult<()> {
        let g = self.groups();
        if g == 0 {
            return Err(SnError::ConfigError(format!(
                "material '{}' has no energy groups",
                self.name
            )));
        }
        if self.sigma_s.len() != g || self.sigma_s.iter().any(|row| row.len() != g) {
            return Err(SnError::ConfigError(format!(
                "material '{}': scattering matrix must be {g}x{g}",
                self.name
            )));
        }
        let fissile_len_ok = (self.nu_sigma_f.is_empty() && self.chi.is_empty())
            || (self.nu_sigma_f.len() == g && self.chi.len() == g);
        if !fissile_len_ok {
            return Err(SnError::ConfigError(format!(
                "material '{}': nu_sigma_f and chi must both be empty or have {g} entries",
                self.name
            )));
        }
        let all = self
            .sigma_tr
            .iter()
            .chain(self.sigma_s.iter().flatten())
            .chain(self.nu_sigma_f.iter())
            .chain(self.chi.iter());
        for &v in all {
            if !v.is_finite() || v < 0.0 {
                return Err(SnError::ConfigError(format!(
                    "material '{}': cross-sections must be finite and >= 0, got {v}",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// One cell of a 1-D mesh.
#[derive(Debug, Clone)]
pub struct Node1D {
    pub dx: f64,
    pub material: Arc<Material>,
    /// Fixed (angular) source.
    pub source: f64,
}

impl Node1D {
    pub fn sigma_tr(&self, g: usize) -> f64 {
        self.material.sigma_tr[g]
    }
}

/// One cell of a 2-D mesh.
#[derive(Debug, Clone)]
pub struct Node2D {
    pub dx: f64,
    pub dy: f64,
    pub material: Arc<Material>,
    pub source: f64,
}

impl Node2D {
    pub fn sigma_tr(&self, g: usize) -> f64 {
        self.material.sigma_tr[g]
    }
}

/// The mesh seam consumed by sweeps, the eigenvalue controller and
/// accelerators. `Dim` is the shape of per-cell-per-group arrays.
pub trait TransportMesh {
    type Dim: Dimension;

    fn groups(&self) -> usize;

    /// Number of spatial cells (nx, or nx * ny).
    fn cell_count(&self) -> usize;

    fn flux(&self) -> &Array<f64, Self::Dim>;

    fn flux_mut(&mut self) -> &mut Array<f64, Self::Dim>;

    /// `chi[g] * sum_g' nu_sigma_f[g'] * flux[g']` per cell, or `None`
    /// when no material in the mesh can fission.
    fn fission_source(&self) -> Option<Array<f64, Self::Dim>>;

    /// `sum_g' sigma_s[g'][g] * flux[g']` per cell.
    fn scatter_source(&self) -> Array<f64, Self::Dim>;
}

fn check_cell(material: &Material, groups: usize, widths: &[f64]) -> SnResult<()> {
    if material.groups() != groups {
        return Err(SnError::ConfigError(format!(
            "material '{}' has {} groups, mesh has {groups}",
            material.name,
            material.groups()
        )));
    }
    if let Some(w) = widths.iter().find(|&&w| !(w.is_finite() && w > 0.0)) {
        return Err(SnError::ConfigError(format!(
            "cell width must be finite and > 0, got {w}"
        )));
    }
    Ok(())
}

fn fission_density(material: &Material, flux: impl Fn(usize) -> f64) -> f64 {
    material
        .nu_sigma_f
        .iter()
        .enumerate()
        .map(|(gp, nsf)| nsf * flux(gp))
        .sum()
}

fn scatter_density(material: &Material, g: usize, flux: impl Fn(usize) -> f64) -> f64 {
    material
        .sigma_s
        .iter()
        .enumerate()
        .map(|(gp, row)| row[g] * flux(gp))
        .sum()
}

/// 1-D slab mesh with scalar flux `[nx, G]` and face angular flux
/// `[nx + 1, N, G]`.
#[derive(Debug, Clone)]
pub struct Mesh1D {
    pub nodes: Vec<Node1D>,
    pub groups: usize,
    pub flux: Array2<f64>,
    pub psi: Array3<f64>,
}

impl Mesh1D {
    /// Build from cells; the flux guess is 1 everywhere, psi starts at 0.
    pub fn new(nodes: Vec<Node1D>, quad: &Quadrature1D) -> SnResult<Self> {
        let first = nodes
            .first()
            .ok_or_else(|| SnError::ConfigError("1-D mesh needs at least one cell".to_string()))?;
        let groups = first.material.groups();
        for node in &nodes {
            check_cell(&node.material, groups, &[node.dx])?;
        }
        let nx = nodes.len();
        Ok(Mesh1D {
            flux: Array2::ones((nx, groups)),
            psi: Array3::zeros((nx + 1, quad.count(), groups)),
            nodes,
            groups,
        })
    }

    /// Homogeneous slab of `width` split into `cells` equal cells.
    pub fn uniform(
        material: Material,
        width: f64,
        cells: usize,
        source: f64,
        quad: &Quadrature1D,
    ) -> SnResult<Self> {
        material.validate()?;
        let material = Arc::new(material);
        let dx = width / cells.max(1) as f64;
        let nodes = (0..cells)
            .map(|_| Node1D {
                dx,
                material: Arc::clone(&material),
                source,
            })
            .collect();
        Self::new(nodes, quad)
    }

    pub fn nx(&self) -> usize {
        self.nodes.len()
    }
}

impl TransportMesh for Mesh1D {
    type Dim = Ix2;

    fn groups(&self) -> usize {
        self.groups
    }

    fn cell_count(&self) -> usize {
        self.nx()
    }

    fn flux(&self) -> &Array2<f64> {
        &self.flux
    }

    fn flux_mut(&mut self) -> &mut Array2<f64> {
        &mut self.flux
    }

    fn fission_source(&self) -> Option<Array2<f64>> {
        if !self.nodes.iter().any(|n| n.material.is_fissile()) {
            return None;
        }
        let mut fs = Array2::zeros((self.nx(), self.groups));
        for (i, node) in self.nodes.iter().enumerate() {
            let m = &node.material;
            if !m.is_fissile() {
                continue;
            }
            let production = fission_density(m, |gp| self.flux[[i, gp]]);
            for g in 0..self.groups {
                fs[[i, g]] = m.chi[g] * production;
            }
        }
        Some(fs)
    }

    fn scatter_source(&self) -> Array2<f64> {
        let mut ss = Array2::zeros((self.nx(), self.groups));
        for (i, node) in self.nodes.iter().enumerate() {
            for g in 0..self.groups {
                ss[[i, g]] = scatter_density(&node.material, g, |gp| self.flux[[i, gp]]);
            }
        }
        ss
    }
}

/// 2-D rectangular mesh. Index `j = 0` is the south row.
///
/// Scalar flux `[nx, ny, G]`; angular flux on x-faces `[nx + 1, ny, N, G]`
/// and on y-faces `[nx, ny + 1, N, G]`.
#[derive(Debug, Clone)]
pub struct Mesh2D {
    pub nodes: Array2<Node2D>,
    pub groups: usize,
    pub flux: Array3<f64>,
    pub psi_x: Array4<f64>,
    pub psi_y: Array4<f64>,
}

impl Mesh2D {
    pub fn new(nodes: Array2<Node2D>, quad: &Quadrature2D) -> SnResult<Self> {
        let (nx, ny) = nodes.dim();
        let first = nodes
            .iter()
            .next()
            .ok_or_else(|| SnError::ConfigError("2-D mesh needs at least one cell".to_string()))?;
        let groups = first.material.groups();
        for node in nodes.iter() {
            check_cell(&node.material, groups, &[node.dx, node.dy])?;
        }
        let n = quad.count();
        Ok(Mesh2D {
            flux: Array3::ones((nx, ny, groups)),
            psi_x: Array4::zeros((nx + 1, ny, n, groups)),
            psi_y: Array4::zeros((nx, ny + 1, n, groups)),
            nodes,
            groups,
        })
    }

    /// Homogeneous rectangle `width x height` split into `nx x ny` cells.
    #[allow(clippy::too_many_arguments)]
    pub fn uniform(
        material: Material,
        width: f64,
        height: f64,
        nx: usize,
        ny: usize,
        source: f64,
        quad: &Quadrature2D,
    ) -> SnResult<Self> {
        material.validate()?;
        let material = Arc::new(material);
        let dx = width / nx.max(1) as f64;
        let dy = height / ny.max(1) as f64;
        let nodes = Array2::from_shape_fn((nx, ny), |_| Node2D {
            dx,
            dy,
            material: Arc::clone(&material),
            source,
        });
        Self::new(nodes, quad)
    }

    pub fn nx(&self) -> usize {
        self.nodes.nrows()
    }

    pub fn ny(&self) -> usize {
        self.nodes.ncols()
    }
}

impl TransportMesh for Mesh2D {
    type Dim = Ix3;

    fn groups(&self) -> usize {
        self.groups
    }

    fn cell_count(&self) -> usize {
        self.nx() * self.ny()
    }

    fn flux(&self) -> &Array3<f64> {
        &self.flux
    }

    fn flux_mut(&mut self) -> &mut Array3<f64> {
        &mut self.flux
    }

    fn fission_source(&self) -> Option<Array3<f64>> {
        if !self.nodes.iter().any(|n| n.material.is_fissile()) {
            return None;
        }
        let mut fs = Array3::zeros((self.nx(), self.ny(), self.groups));
        for ((i, j), node) in self.nodes.indexed_iter() {
            let m = &node.material;
            if !m.is_fissile() {
                continue;
            }
            let production = fission_density(m, |gp| self.flux[[i, j, gp]]);
            for g in 0..self.groups {
                fs[[i, j, g]] = m.chi[g] * production;
            }
        }
        Some(fs)
    }

    fn scatter_source(&self) -> Array3<f64> {
        let mut ss = Array3::zeros((self.nx(), self.ny(), self.groups));
        for ((i, j), node) in self.nodes.indexed_iter() {
            for g in 0..self.groups {
                ss[[i, j, g]] = scatter_density(&node.material, g, |gp| self.flux[[i, j, gp]]);
            }
        }
        ss
    }
}
