//! Numerical primitives for SCPN SN Transport.

pub mod diamond;
pub mod norm;
