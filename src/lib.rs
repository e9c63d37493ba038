//! # racah: angular-momentum recoupling for jj-coupled CSFs
//!
//! This crate computes the angular recoupling factors needed to reduce matrix
//! elements of one-body and two-body tensor operators between jj-coupled
//! many-electron configuration state functions (CSFs):
//!
//! - [`angmom::wigner`] provides the foundational Wigner coupling algebra:
//!   triangle tests, 3j/6j/9j symbols, Clebsch–Gordan coefficients, the
//!   Wigner–Eckart geometric factor, reduced matrix elements of the normalised
//!   spherical harmonics, and the Wigner rotation function,
//! - [`shells`] provides the minimal relativistic subshell and configuration
//!   records on which the analysis operates,
//! - [`recouple`] analyses which subshells interact between a bra and a ket
//!   configuration and carries out the recursive shell-by-shell reduction of a
//!   coupled-tree matrix element to a product of 6j/9j symbols and phases.
//!
//! Throughout the crate every angular momentum, projection and tensor rank is
//! an integer equal to **twice** its physical value, so that half-integer
//! momenta are represented exactly and all parity arguments stay in integer
//! arithmetic.
//!
//! The numerical evaluation of the 3j/6j/9j symbols themselves is delegated to
//! the [`wigner_symbols`] crate, which computes them in exact arithmetic and
//! returns zero outside the triangle domain.

pub mod angmom;
pub mod recouple;
pub mod shells;
