//! Wigner coupling coefficients and related geometric factors.
//!
//! Every angular momentum, projection and tensor rank taken or returned by the
//! functions in this module is an `i32` equal to twice its physical value, so
//! that half-integer momenta are represented exactly. All parity phases of the
//! form $`(-1)^{j_1 + j_2 + \ldots}`$ are therefore evaluated on halved sums of
//! doubled arguments, which are integers whenever the corresponding triangle
//! relations hold.
//!
//! The 3j, 6j and 9j symbols are evaluated by the [`wigner_symbols`] crate in
//! exact arithmetic; the wrappers here guard the calls with the cheap triangle
//! pre-filters so that forbidden symbols short-circuit to exactly zero.

use lazy_static::lazy_static;
use wigner_symbols::{Wigner3jm, Wigner6j, Wigner9j};

#[cfg(test)]
#[path = "wigner_tests.rs"]
mod wigner_tests;

/// Length of the precomputed $`\ln n!`$ table. Large enough for every factorial
/// appearing in a rotation-matrix term at the deepest supported coupling.
const LN_FACTORIAL_TABLE_LEN: usize = 512;

lazy_static! {
    static ref LN_FACTORIALS: Vec<f64> = {
        let mut table = Vec::with_capacity(LN_FACTORIAL_TABLE_LEN);
        table.push(0.0);
        for n in 1..LN_FACTORIAL_TABLE_LEN {
            let previous = table[n - 1];
            table.push(previous + (n as f64).ln());
        }
        table
    };
}

/// Returns `true` if `n` is odd. Intended for the halved sums of doubled
/// angular momenta that control phase factors.
#[must_use]
pub fn is_odd(n: i32) -> bool {
    n.rem_euclid(2) == 1
}

/// Checks the triangle relation for three doubled angular momenta.
///
/// The triad is valid when $`|j_1 - j_2| \le j_3 \le j_1 + j_2`$ and
/// $`j_1 + j_2 + j_3`$ is even, *i.e.* the three momenta couple as a proper
/// integer/half-integer triad. Negative doubled momenta never form a valid
/// triad.
#[must_use]
pub fn triangle(j1: i32, j2: i32, j3: i32) -> bool {
    j1 >= 0
        && j2 >= 0
        && j3 >= 0
        && !is_odd(j1 + j2 + j3)
        && (j1 - j2).abs() <= j3
        && j3 <= j1 + j2
}

/// Evaluates the Wigner 3j symbol for doubled momenta and projections.
///
/// Returns exactly zero outside the triangle and projection domain.
#[must_use]
pub fn w3j(j1: i32, j2: i32, j3: i32, m1: i32, m2: i32, m3: i32) -> f64 {
    if m1 + m2 + m3 != 0 || !triangle(j1, j2, j3) {
        return 0.0;
    }
    if m1.abs() > j1 || m2.abs() > j2 || m3.abs() > j3 {
        return 0.0;
    }
    if is_odd(j1 - m1) || is_odd(j2 - m2) || is_odd(j3 - m3) {
        return 0.0;
    }
    f64::from(
        Wigner3jm {
            tj1: j1,
            tm1: m1,
            tj2: j2,
            tm2: m2,
            tj3: j3,
            tm3: m3,
        }
        .value(),
    )
}

/// Evaluates the Wigner 6j symbol for doubled momenta.
#[must_use]
pub fn w6j(j1: i32, j2: i32, j3: i32, i1: i32, i2: i32, i3: i32) -> f64 {
    if !w6j_triangle(j1, j2, j3, i1, i2, i3) {
        return 0.0;
    }
    f64::from(
        Wigner6j {
            tj1: j1,
            tj2: j2,
            tj3: j3,
            tj4: i1,
            tj5: i2,
            tj6: i3,
        }
        .value(),
    )
}

/// Determines whether the 6j symbol is permitted by its four triangle
/// constraints.
///
/// Callers evaluate this pre-filter before [`w6j`] so that forbidden symbols
/// short-circuit to zero without touching the exact-arithmetic evaluator.
#[must_use]
pub fn w6j_triangle(j1: i32, j2: i32, j3: i32, i1: i32, i2: i32, i3: i32) -> bool {
    triangle(j1, j2, j3) && triangle(j1, i2, i3) && triangle(i1, j2, i3) && triangle(i1, i2, j3)
}

/// Evaluates the Wigner 9j symbol for doubled momenta, rows first.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn w9j(
    j1: i32,
    j2: i32,
    j3: i32,
    i1: i32,
    i2: i32,
    i3: i32,
    k1: i32,
    k2: i32,
    k3: i32,
) -> f64 {
    if !w9j_triangle(j1, j2, j3, i1, i2, i3, k1, k2, k3) {
        return 0.0;
    }
    f64::from(
        Wigner9j {
            tj1: j1,
            tj2: j2,
            tj3: j3,
            tj4: i1,
            tj5: i2,
            tj6: i3,
            tj7: k1,
            tj8: k2,
            tj9: k3,
        }
        .value(),
    )
}

/// Determines whether the 9j symbol is permitted by its six triangle
/// constraints (three rows and three columns).
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn w9j_triangle(
    j1: i32,
    j2: i32,
    j3: i32,
    i1: i32,
    i2: i32,
    i3: i32,
    k1: i32,
    k2: i32,
    k3: i32,
) -> bool {
    triangle(j1, j2, j3)
        && triangle(i1, i2, i3)
        && triangle(k1, k2, k3)
        && triangle(j1, i1, k1)
        && triangle(j2, i2, k2)
        && triangle(j3, i3, k3)
}

/// Computes the Clebsch–Gordan coefficient
/// $`\langle j_1 m_1, j_2 m_2 | j_f m_f \rangle`$ from the 3j symbol:
///
/// ```math
/// \langle j_1 m_1, j_2 m_2 | j_f m_f \rangle
/// = (-1)^{j_1 - j_2 + m_f} \sqrt{2 j_f + 1}
///   \begin{pmatrix} j_1 & j_2 & j_f \\ m_1 & m_2 & -m_f \end{pmatrix}.
/// ```
#[must_use]
pub fn clebsch_gordan(j1: i32, m1: i32, j2: i32, m2: i32, jf: i32, mf: i32) -> f64 {
    let mut r = f64::from(jf + 1).sqrt();
    r *= w3j(j1, j2, jf, m1, m2, -mf);
    if is_odd((j1 - j2 + mf) / 2) {
        r = -r;
    }
    r
}

/// Computes the geometric prefactor of the Wigner–Eckart theorem,
/// $`(-1)^{j_f - m_f} \sqrt{2 j_f + 1}
/// \begin{pmatrix} j_f & k & j_i \\ -m_f & q & m_i \end{pmatrix}`$.
///
/// Returns zero unless the triad $`(j_f, k, j_i)`$ is valid and the
/// projections satisfy $`m_i + q = m_f`$.
#[must_use]
pub fn wigner_eckart_factor(jf: i32, k: i32, ji: i32, mf: i32, q: i32, mi: i32) -> f64 {
    if !triangle(jf, k, ji) {
        return 0.0;
    }
    if mi + q - mf != 0 {
        return 0.0;
    }
    let mut r = f64::from(jf + 1).sqrt();
    if is_odd((jf - mf) / 2) {
        r = -r;
    }
    r * w3j(jf, k, ji, -mf, q, mi)
}

/// Computes the reduced matrix element of the normalised spherical harmonics,
/// $`\langle j_a \| C^{(k)} \| j_b \rangle`$, between relativistic one-electron
/// states.
///
/// The orbital-parity selection rule involving the orbital momenta is *not*
/// checked here; callers verify it independently.
#[must_use]
pub fn reduced_cl(ja: i32, k: i32, jb: i32) -> f64 {
    let mut r = (f64::from(ja + 1) * f64::from(jb + 1)).sqrt() * w3j(ja, k, jb, 1, 0, -1);
    if is_odd((ja + 1) / 2) {
        r = -r;
    }
    r
}

/// Evaluates the Wigner rotation function
/// $`d^{j}_{mn}(\beta) = \langle jm | \mathrm{e}^{-\mathrm{i} \beta J_y} | jn \rangle`$
/// for doubled `j2`, `m2`, `n2`.
///
/// The closed-form sum runs over
/// $`k \in [\max(0, (m+n)), \min(j+m, j+n)]`$ (physical values); each term is
/// a product of powers of $`\cos(\beta/2)`$ and $`\sin(\beta/2)`$ divided by
/// four factorials. The factorial ratios are accumulated in log space and
/// exponentiated once per term so that large momenta do not overflow.
#[must_use]
pub fn wigner_d_matrix(angle: f64, j2: i32, m2: i32, n2: i32) -> f64 {
    assert!(j2 >= 0, "The doubled momentum `j2` = {j2} must be non-negative.");
    assert!(
        m2.abs() <= j2 && n2.abs() <= j2,
        "The doubled projections ({m2}, {n2}) lie outside [-{j2}, {j2}]."
    );
    assert!(
        !is_odd(j2 - m2) && !is_odd(j2 - n2),
        "The doubled projections ({m2}, {n2}) do not match the parity of `j2` = {j2}."
    );

    let a = 0.5 * angle;
    let kmin = 0.max((m2 + n2) / 2);
    let kmax = ((j2 + m2) / 2).min((j2 + n2) / 2);
    let ca = a.cos();
    let sa = a.sin();
    let mut x = 0.0;
    for k in kmin..=kmax {
        let mut b = ca.powi(2 * k - (m2 + n2) / 2);
        b *= sa.powi(j2 + (m2 + n2) / 2 - 2 * k);
        let c = ln_factorial(k as u32)
            + ln_factorial(((j2 + m2) / 2 - k) as u32)
            + ln_factorial(((j2 + n2) / 2 - k) as u32)
            + ln_factorial((k - (m2 + n2) / 2) as u32);
        b /= c.exp();
        if is_odd(k) {
            b = -b;
        }
        x += b;
    }
    let c = ln_factorial(((j2 + m2) / 2) as u32)
        + ln_factorial(((j2 - m2) / 2) as u32)
        + ln_factorial(((j2 + n2) / 2) as u32)
        + ln_factorial(((j2 - n2) / 2) as u32);
    let mut norm = (0.5 * c).exp();
    if is_odd((j2 + m2) / 2) {
        norm = -norm;
    }
    x * norm
}

/// Returns $`\ln n!`$, with $`\ln 0! = 0`$.
///
/// Values are read from a lazily initialised table; arguments beyond the table
/// are accumulated directly.
#[must_use]
pub fn ln_factorial(n: u32) -> f64 {
    let n = n as usize;
    if n < LN_FACTORIALS.len() {
        LN_FACTORIALS[n]
    } else {
        let last = LN_FACTORIALS.len() - 1;
        (last + 1..=n).fold(LN_FACTORIALS[last], |acc, k| acc + (k as f64).ln())
    }
}

/// Returns $`\ln n`$ for positive `n`, and the large negative sentinel `-100.0`
/// for `n` = 0.
///
/// The sentinel is a multiplicative suppressor: a term carrying it is meant to
/// vanish relative to the other terms of a sum once exponentiated. It is not a
/// logarithm and must never feed a precision comparison.
#[must_use]
pub fn ln_integer(n: u32) -> f64 {
    if n == 0 {
        -100.0
    } else {
        f64::from(n).ln()
    }
}
