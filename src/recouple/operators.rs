//! Rank-resolved recoupling coefficients of the standard tensor operators.
//!
//! These drivers sweep the retained tensor ranks of a [`RecoupleContext`] and
//! collect, for each doubled rank `k`, the recoupling coefficient of the
//! one-body tensor $`Z^{(k)}`$ or of the scalar product
//! $`(Z^{(k)} \cdot Z^{(k)})`$ between two coupling trees. Ranks forbidden by
//! a triangle condition are simply absent from the returned list.

use crate::angmom::wigner::{is_odd, triangle, w6j, w6j_triangle};
use crate::recouple::formula::{decouple_shell, is_shell_interacting};
use crate::recouple::interact::{InteractShell, RecoupleContext};
use crate::shells::CoupledState;

#[cfg(test)]
#[path = "operators_tests.rs"]
mod operators_tests;

impl RecoupleContext {
    /// Computes the rank-resolved recoupling coefficients of the one-body
    /// tensor $`Z^{(k)} = (a^{\dagger}_{s_1} \tilde{a}_{s_2})^{(k)}`$ between
    /// the first `n_shells` levels of the coupling trees `bra` and `ket`.
    ///
    /// `s1` is the bra-side (creation) record and `s2` the ket-side
    /// (annihilation) record. Doubled ranks run over
    /// `0..=2 * self.max_rank()` subject to the triangle conditions; only
    /// nonvanishing `(k, coeff)` pairs are returned.
    ///
    /// # Errors
    ///
    /// Fails only on recoupling-workspace overflow; every selection rule
    /// shows up as an absent rank.
    pub fn angular_z(
        &self,
        n_shells: usize,
        bra: &[CoupledState],
        ket: &[CoupledState],
        s1: &InteractShell,
        s2: &InteractShell,
    ) -> Result<Vec<(i32, f64)>, anyhow::Error> {
        let kmax = 2 * self.max_rank();
        let mut coeffs = Vec::new();
        if s1.index == s2.index {
            // Both operators act on the same subshell: a single interacting
            // tree position carrying the operator rank directly.
            let positions = [s1.index];
            for k in (0..=kmax).step_by(2) {
                if !triangle(s1.j, k, s2.j) {
                    continue;
                }
                if !is_shell_interacting(n_shells, bra, ket, &positions, &[k])? {
                    continue;
                }
                let c = decouple_shell(n_shells, bra, ket, &positions, &[k])?;
                if c.abs() > 0.0 {
                    coeffs.push((k, c));
                }
            }
        } else {
            // Two distinct positions carry the single-electron momenta as
            // their ranks, coupled to the operator rank k. When the
            // annihilation operator sits below the creation operator in the
            // tree, restoring the (creation, annihilation) coupling order
            // costs the exchange phase.
            let (lo, hi, swapped) = if s1.index < s2.index {
                (s1, s2, false)
            } else {
                (s2, s1, true)
            };
            let positions = [lo.index, hi.index];
            for k in (0..=kmax).step_by(2) {
                if !triangle(s1.j, s2.j, k) {
                    continue;
                }
                let ranks = [lo.j, hi.j, k];
                if !is_shell_interacting(n_shells, bra, ket, &positions, &ranks)? {
                    continue;
                }
                let mut c = decouple_shell(n_shells, bra, ket, &positions, &ranks)?;
                if swapped && is_odd((s1.j + s2.j - k) / 2) {
                    c = -c;
                }
                if c.abs() > 0.0 {
                    coeffs.push((k, c));
                }
            }
        }
        Ok(coeffs)
    }

    /// Computes the rank-resolved recoupling coefficients of the scalar
    /// product $`(Z^{(k)}(A) \cdot Z^{(k)}(B))`$ of two equal-rank tensors
    /// acting on two distinct subshell positions.
    ///
    /// `s` holds the four interacting-shell records in interleaved pair
    /// layout: `s[0]`/`s[1]` the bra/ket records on position A and
    /// `s[2]`/`s[3]` those on position B. The per-position ranks couple to a
    /// total rank 0; the scalar-product conversion
    /// $`(-1)^{k} \sqrt{2k + 1}`$ is folded into the coefficients.
    ///
    /// # Panics
    ///
    /// Panics unless the records pair up on two distinct positions.
    pub fn angular_zxz0(
        &self,
        n_shells: usize,
        bra: &[CoupledState],
        ket: &[CoupledState],
        s: &[InteractShell; 4],
    ) -> Result<Vec<(i32, f64)>, anyhow::Error> {
        assert!(
            s[0].index == s[1].index && s[2].index == s[3].index && s[0].index != s[2].index,
            "The scalar product requires the four records to pair up on two distinct subshell positions."
        );
        let a = s[0].index.min(s[2].index);
        let b = s[0].index.max(s[2].index);
        let positions = [a, b];
        let kmax = 2 * self.max_rank();
        let mut coeffs = Vec::new();
        for k in (0..=kmax).step_by(2) {
            if !triangle(s[0].j, k, s[1].j) || !triangle(s[2].j, k, s[3].j) {
                continue;
            }
            let ranks = [k, k, 0];
            if !is_shell_interacting(n_shells, bra, ket, &positions, &ranks)? {
                continue;
            }
            let mut c = decouple_shell(n_shells, bra, ket, &positions, &ranks)?;
            c *= f64::from(k + 1).sqrt();
            if is_odd(k / 2) {
                c = -c;
            }
            if c.abs() > 0.0 {
                coeffs.push((k, c));
            }
        }
        Ok(coeffs)
    }
}

/// Merges the rank-resolved coefficient lists of two separately decoupled
/// operator pieces into a single list over the ranks of the first.
///
/// `coeff` is the direct channel, its ranks coupling $`(j_1, j_2)`$ and
/// $`(j_3, j_4)`$; `coeff1` is the exchange channel, its ranks coupling
/// $`(j_1, j_4)`$ and $`(j_3, j_2)`$. For every triangle-compatible rank pair
/// $`(k, k')`$ the contribution
/// ```math
/// \mathrm{phase} \cdot c_k \, c'_{k'} \,
/// (-1)^{k + k'} \sqrt{(2k + 1)(2k' + 1)}
/// \begin{Bmatrix} j_1 & j_2 & k \\ j_3 & j_4 & k' \end{Bmatrix}
/// ```
/// accumulates into the output slot for `k`; ranks with no compatible
/// pairing are absent from the result.
#[must_use]
pub fn sum_coeff(
    coeff: &[(i32, f64)],
    coeff1: &[(i32, f64)],
    phase: i32,
    j1: i32,
    j2: i32,
    j3: i32,
    j4: i32,
) -> Vec<(i32, f64)> {
    let mut merged = Vec::new();
    for &(k, c) in coeff {
        let mut acc = 0.0;
        let mut compatible = false;
        for &(k1, c1) in coeff1 {
            if !w6j_triangle(j1, j2, k, j3, j4, k1) {
                continue;
            }
            compatible = true;
            let mut term = c
                * c1
                * (f64::from(k + 1) * f64::from(k1 + 1)).sqrt()
                * w6j(j1, j2, k, j3, j4, k1);
            if is_odd((k + k1) / 2) {
                term = -term;
            }
            acc += term;
        }
        if compatible {
            merged.push((k, f64::from(phase) * acc));
        }
    }
    merged
}
