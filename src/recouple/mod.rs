//! Shell-interaction analysis and recoupling coefficients.
//!
//! The analysis in [`interact`] determines which subshells change occupation
//! between a bra and a ket configuration, canonicalises their order and caches
//! the outcome per configuration pair. The engine in [`formula`] reduces a
//! matrix element between two coupling trees to a product of 6j/9j symbols and
//! phases, and the drivers in [`operators`] assemble from it the rank-indexed
//! coefficients of the one-body tensor $`Z^{(k)}`$ and of the scalar product
//! $`(Z^{(k)} \cdot Z^{(k)})`$.

pub mod formula;
pub mod interact;
pub mod operators;
