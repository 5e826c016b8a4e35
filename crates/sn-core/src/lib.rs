//! Discrete-ordinates transport sweeps and the k-eigenvalue controller.
//!
//! Boundary resolution, 1-D and 2-D diamond-difference sweeps, the
//! acceleration seam and inner/outer iteration.

pub mod accel;
pub mod boundary;
pub mod calculator;
pub mod observer;
pub mod sweep;
pub mod sweep_1d;
pub mod sweep_2d;

pub use calculator::{Calculator, FailureReason, SolveReport, SolveStatus, SolverState};
