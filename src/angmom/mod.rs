//! Wigner coupling algebra on doubled angular momenta.

pub mod wigner;
