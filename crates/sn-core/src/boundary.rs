// ─────────────────────────────────────────────────────────────────────
// SCPN SN Transport — Boundary Conditions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Boundary-condition resolution for the transport sweeps.
//!
//! Edge labels are parsed once into [`BoundaryCondition`] values and then
//! resolved, per edge, into an [`IncomingFlux`] accessor that the sweep
//! queries for the angular flux entering the mesh:
//!
//! - **vacuum**: nothing enters.
//! - **reflective**: the flux leaving through the same face along the
//!   mirror direction re-enters.
//! - **periodic**: the flux stored on the opposite face, same direction,
//!   enters (wrap-around).

use std::fmt;
use std::str::FromStr;

use sn_types::error::{SnError, SnResult};
use sn_types::quadrature::{Edge, Quadrature1D, Quadrature2D};

/// Condition applied on one mesh edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCondition {
    Vacuum,
    Reflective,
    Periodic,
}

impl FromStr for BoundaryCondition {
    type Err = SnError;

    fn from_str(label: &str) -> SnResult<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "vacuum" => Ok(BoundaryCondition::Vacuum),
            "reflective" => Ok(BoundaryCondition::Reflective),
            "periodic" => Ok(BoundaryCondition::Periodic),
            _ => Err(SnError::ConfigError(format!(
                "'{label}' is an unknown boundary condition"
            ))),
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BoundaryCondition::Vacuum => "vacuum",
            BoundaryCondition::Reflective => "reflective",
            BoundaryCondition::Periodic => "periodic",
        };
        f.write_str(label)
    }
}

fn check_periodic_pair(
    a: BoundaryCondition,
    b: BoundaryCondition,
    pair: &str,
) -> SnResult<()> {
    let periodic = BoundaryCondition::Periodic;
    if (a == periodic) != (b == periodic) {
        return Err(SnError::ConfigError(format!(
            "if one {pair} edge is periodic, both must be (got {a}, {b})"
        )));
    }
    Ok(())
}

/// Validated boundary conditions for a 1-D or 2-D mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryConditions {
    OneD {
        west: BoundaryCondition,
        east: BoundaryCondition,
    },
    TwoD {
        west: BoundaryCondition,
        east: BoundaryCondition,
        north: BoundaryCondition,
        south: BoundaryCondition,
    },
}

impl BoundaryConditions {
    pub fn one_d(west: BoundaryCondition, east: BoundaryCondition) -> SnResult<Self> {
        check_periodic_pair(west, east, "west/east")?;
        Ok(BoundaryConditions::OneD { west, east })
    }

    pub fn two_d(
        west: BoundaryCondition,
        east: BoundaryCondition,
        north: BoundaryCondition,
        south: BoundaryCondition,
    ) -> SnResult<Self> {
        check_periodic_pair(west, east, "west/east")?;
        check_periodic_pair(north, south, "north/south")?;
        Ok(BoundaryConditions::TwoD {
            west,
            east,
            north,
            south,
        })
    }

    /// Parse `(west, east)` or `(west, east, north, south)`.
    ///
    /// Every label is checked before the count, so an unknown label is
    /// always reported as such.
    pub fn from_labels(labels: &[&str]) -> SnResult<Self> {
        let bcs = labels
            .iter()
            .map(|label| label.parse::<BoundaryCondition>())
            .collect::<SnResult<Vec<_>>>()?;
        match bcs.as_slice() {
            [west, east] => Self::one_d(*west, *east),
            [west, east, north, south] => Self::two_d(*west, *east, *north, *south),
            _ if !bcs.is_empty() && bcs.len() % 2 == 0 => {
                Err(SnError::UnsupportedDimension(bcs.len() / 2))
            }
            _ => Err(SnError::ConfigError(format!(
                "expected 2 (1-D) or 4 (2-D) boundary conditions, got {}",
                bcs.len()
            ))),
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            BoundaryConditions::OneD { .. } => 1,
            BoundaryConditions::TwoD { .. } => 2,
        }
    }

    /// Condition on `edge`, if the mesh has that edge.
    pub fn edge(&self, edge: Edge) -> Option<BoundaryCondition> {
        match (*self, edge) {
            (BoundaryConditions::OneD { west, .. }, Edge::West)
            | (BoundaryConditions::TwoD { west, .. }, Edge::West) => Some(west),
            (BoundaryConditions::OneD { east, .. }, Edge::East)
            | (BoundaryConditions::TwoD { east, .. }, Edge::East) => Some(east),
            (BoundaryConditions::TwoD { north, .. }, Edge::North) => Some(north),
            (BoundaryConditions::TwoD { south, .. }, Edge::South) => Some(south),
            _ => None,
        }
    }

    /// Accessors `[west, east]` for a slab of `nx` cells.
    pub fn resolve_1d(&self, nx: usize, quad: &Quadrature1D) -> SnResult<[IncomingFlux; 2]> {
        let BoundaryConditions::OneD { west, east } = *self else {
            return Err(SnError::ConfigError(
                "a 1-D sweep requires 2 boundary conditions".to_string(),
            ));
        };
        let mirror: Vec<usize> = (0..quad.count()).map(|n| quad.reflect(n)).collect();
        Ok([
            IncomingFlux::resolve(west, 0, nx, mirror.clone()),
            IncomingFlux::resolve(east, nx, 0, mirror),
        ])
    }

    /// Accessors for an `nx x ny` mesh. West/east index x-faces, north/south
    /// index y-faces; `j = 0` is the south edge.
    pub fn resolve_2d(
        &self,
        nx: usize,
        ny: usize,
        quad: &Quadrature2D,
    ) -> SnResult<EdgeFluxes2D> {
        let BoundaryConditions::TwoD {
            west,
            east,
            north,
            south,
        } = *self
        else {
            return Err(SnError::ConfigError(
                "a 2-D sweep requires 4 boundary conditions".to_string(),
            ));
        };
        let mirror = |edge: Edge| -> Vec<usize> {
            (0..quad.count()).map(|n| quad.reflect(n, edge)).collect()
        };
        Ok(EdgeFluxes2D {
            west: IncomingFlux::resolve(west, 0, nx, mirror(Edge::West)),
            east: IncomingFlux::resolve(east, nx, 0, mirror(Edge::East)),
            south: IncomingFlux::resolve(south, 0, ny, mirror(Edge::South)),
            north: IncomingFlux::resolve(north, ny, 0, mirror(Edge::North)),
        })
    }
}

/// Incoming angular flux on one edge, resolved once at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum IncomingFlux {
    Vacuum,
    /// Read `face` along `mirror[n]`.
    Reflective { face: usize, mirror: Vec<usize> },
    /// Read the opposite `face` along `n`.
    Periodic { face: usize },
}

impl IncomingFlux {
    fn resolve(
        bc: BoundaryCondition,
        own_face: usize,
        opposite_face: usize,
        mirror: Vec<usize>,
    ) -> Self {
        match bc {
            BoundaryCondition::Vacuum => IncomingFlux::Vacuum,
            BoundaryCondition::Reflective => IncomingFlux::Reflective {
                face: own_face,
                mirror,
            },
            BoundaryCondition::Periodic => IncomingFlux::Periodic {
                face: opposite_face,
            },
        }
    }

    /// Incoming flux for direction `n`. `read(face, direction)` returns the
    /// stored angular flux on the edge's face line at the caller's
    /// transverse index and group.
    #[inline]
    pub fn value(&self, n: usize, read: impl Fn(usize, usize) -> f64) -> f64 {
        match self {
            IncomingFlux::Vacuum => 0.0,
            IncomingFlux::Reflective { face, mirror } => read(*face, mirror[n]),
            IncomingFlux::Periodic { face } => read(*face, n),
        }
    }
}

/// Resolved accessors for the four edges of a 2-D mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeFluxes2D {
    pub west: IncomingFlux,
    pub east: IncomingFlux,
    pub north: IncomingFlux,
    pub south: IncomingFlux,
}
