use approx::assert_relative_eq;
use proptest::prelude::*;

use crate::angmom::wigner::{
    clebsch_gordan, is_odd, ln_factorial, ln_integer, reduced_cl, triangle, w3j, w6j,
    w6j_triangle, w9j, w9j_triangle, wigner_d_matrix, wigner_eckart_factor,
};

#[test]
fn test_wigner_triangle() {
    // Doubled momenta: (1/2, 1/2, 1) and (1, 1, 2) couple, (1/2, 1, 1) does
    // not.
    assert!(triangle(1, 1, 2));
    assert!(triangle(2, 2, 4));
    assert!(triangle(2, 2, 0));
    assert!(triangle(3, 2, 1));
    assert!(!triangle(1, 2, 2));
    assert!(!triangle(2, 2, 6));
    assert!(!triangle(0, 0, 2));
    assert!(!triangle(-2, 2, 2));
}

#[test]
fn test_wigner_w3j_values() {
    // (1/2 1/2 1; 1/2 -1/2 0) = 1/sqrt(6).
    assert_relative_eq!(
        w3j(1, 1, 2, 1, -1, 0),
        1.0 / 6.0f64.sqrt(),
        epsilon = 1e-12
    );
    // (1 1 0; 1 -1 0) = 1/sqrt(3).
    assert_relative_eq!(w3j(2, 2, 0, 2, -2, 0), 1.0 / 3.0f64.sqrt(), epsilon = 1e-12);
    // (1 1 1; 1 -1 0) = 1/sqrt(6).
    assert_relative_eq!(w3j(2, 2, 2, 2, -2, 0), 1.0 / 6.0f64.sqrt(), epsilon = 1e-12);
    // (1 1 1; 0 0 0) vanishes by the odd-sum symmetry.
    assert_eq!(w3j(2, 2, 2, 0, 0, 0), 0.0);

    // Projection-sum and parity violations are exact zeros.
    assert_eq!(w3j(2, 2, 2, 2, 2, -2), 0.0);
    assert_eq!(w3j(2, 2, 2, 1, -1, 0), 0.0);
    assert_eq!(w3j(2, 2, 2, 4, -4, 0), 0.0);
    assert_eq!(w3j(1, 2, 2, 1, 0, -1), 0.0);
}

#[test]
fn test_wigner_w6j_values() {
    // {1 1 1; 1 1 1} = 1/6.
    assert_relative_eq!(w6j(2, 2, 2, 2, 2, 2), 1.0 / 6.0, epsilon = 1e-12);
    // {1 1 0; 1 1 1} = (-1)^{1+1+1} / 3.
    assert_relative_eq!(w6j(2, 2, 0, 2, 2, 2), -1.0 / 3.0, epsilon = 1e-12);
    // {1/2 1/2 1; 1/2 1/2 1} carries the zero-argument reduction
    // {j j 0; j' j' ...} only through valid triads; a parity-violating triad
    // short-circuits.
    assert!(!w6j_triangle(2, 2, 2, 2, 2, 5));
    assert_eq!(w6j(2, 2, 2, 2, 2, 5), 0.0);
    assert_eq!(w6j(2, 2, 6, 2, 2, 2), 0.0);
}

#[test]
fn test_wigner_w9j_values() {
    // A vanishing bottom row collapses the 9j symbol to
    // 1/sqrt((2a+1)(2b+1)(2e+1)).
    assert_relative_eq!(
        w9j(2, 2, 4, 2, 2, 4, 0, 0, 0),
        1.0 / 45.0f64.sqrt(),
        epsilon = 1e-12
    );
    assert_relative_eq!(
        w9j(1, 1, 2, 1, 1, 2, 0, 0, 0),
        1.0 / 12.0f64.sqrt(),
        epsilon = 1e-12
    );
    assert!(!w9j_triangle(2, 2, 4, 2, 2, 4, 0, 0, 2));
    assert_eq!(w9j(2, 2, 4, 2, 2, 4, 0, 0, 2), 0.0);
}

#[test]
fn test_wigner_clebsch_gordan() {
    assert_relative_eq!(clebsch_gordan(0, 0, 0, 0, 0, 0), 1.0, epsilon = 1e-12);
    // <1/2 1/2, 1/2 -1/2 | 0 0> = 1/sqrt(2).
    assert_relative_eq!(
        clebsch_gordan(1, 1, 1, -1, 0, 0),
        1.0 / 2.0f64.sqrt(),
        epsilon = 1e-12
    );
    // Stretched states couple with unit coefficient.
    for j in [1, 2, 3, 4, 5] {
        assert_relative_eq!(
            clebsch_gordan(j, j, j, j, 2 * j, 2 * j),
            1.0,
            epsilon = 1e-12
        );
    }
    // <1 0, 1 0 | 0 0> = -1/sqrt(3).
    assert_relative_eq!(
        clebsch_gordan(2, 0, 2, 0, 0, 0),
        -1.0 / 3.0f64.sqrt(),
        epsilon = 1e-12
    );
    // Projection conservation.
    assert_eq!(clebsch_gordan(1, 1, 1, 1, 0, 0), 0.0);
}

#[test]
fn test_wigner_eckart_factor_selection_rules() {
    // mi + q != mf is an exact zero for any valid momenta.
    assert_eq!(wigner_eckart_factor(2, 2, 2, 2, 2, 2), 0.0);
    assert_eq!(wigner_eckart_factor(4, 2, 2, 0, 2, 2), 0.0);
    // A forbidden triad likewise.
    assert_eq!(wigner_eckart_factor(2, 2, 6, 2, 2, 0), 0.0);
    // Otherwise the factor is (-1)^{(jf-mf)/2} sqrt(jf+1) W3j(...).
    assert_relative_eq!(
        wigner_eckart_factor(2, 2, 2, 2, 2, 0),
        3.0f64.sqrt() * w3j(2, 2, 2, -2, 2, 0),
        epsilon = 1e-12
    );
    assert!(wigner_eckart_factor(2, 2, 2, 2, 2, 0).abs() > 0.0);
}

#[test]
fn test_wigner_reduced_cl() {
    // <1/2 || C0 || 1/2> = -sqrt(2) in this phase convention.
    assert_relative_eq!(reduced_cl(1, 0, 1), -2.0f64.sqrt(), epsilon = 1e-12);
    // A rank beyond the triangle bound vanishes.
    assert_eq!(reduced_cl(1, 6, 1), 0.0);
    // <3/2 || C2 || 1/2> and <1/2 || C2 || 3/2> agree up to the conjugation
    // phase (-1)^{(ja - jb)/2 ...}; for half-integer shells the magnitudes
    // match.
    assert_relative_eq!(
        reduced_cl(3, 4, 1).abs(),
        reduced_cl(1, 4, 3).abs(),
        epsilon = 1e-12
    );
}

#[test]
fn test_wigner_d_matrix_identity() {
    for j2 in [0, 2, 4] {
        for m2 in (-j2..=j2).step_by(2) {
            for n2 in (-j2..=j2).step_by(2) {
                let expected = if m2 == n2 { 1.0 } else { 0.0 };
                assert_relative_eq!(
                    wigner_d_matrix(0.0, j2, m2, n2),
                    expected,
                    epsilon = 1e-12
                );
            }
        }
    }
}

#[test]
fn test_wigner_d_matrix_values() {
    // d^1_{00}(beta) = cos(beta).
    for beta in [0.1, 0.7, 1.3, 2.9] {
        assert_relative_eq!(wigner_d_matrix(beta, 2, 0, 0), beta.cos(), epsilon = 1e-12);
    }
    // d^{1/2}_{1/2 1/2}(beta) = cos(beta/2).
    for beta in [0.2, 1.1, 2.3] {
        assert_relative_eq!(
            wigner_d_matrix(beta, 1, 1, 1),
            (0.5 * beta).cos(),
            epsilon = 1e-12
        );
    }
}

#[test]
fn test_wigner_log_helpers() {
    assert_eq!(ln_factorial(0), 0.0);
    assert_eq!(ln_factorial(1), 0.0);
    assert_relative_eq!(ln_factorial(5), 120.0f64.ln(), epsilon = 1e-12);
    assert_relative_eq!(ln_factorial(600), ln_factorial(599) + 600.0f64.ln(), epsilon = 1e-12);
    assert_eq!(ln_integer(0), -100.0);
    assert_relative_eq!(ln_integer(2), 2.0f64.ln(), epsilon = 1e-12);
}

#[test]
fn test_wigner_is_odd() {
    assert!(is_odd(1));
    assert!(is_odd(-1));
    assert!(is_odd(3));
    assert!(!is_odd(0));
    assert!(!is_odd(-2));
    assert!(!is_odd(4));
}

proptest! {
    #[test]
    fn test_wigner_triangle_permutation_symmetry(j1 in 0i32..40, j2 in 0i32..40, j3 in 0i32..40) {
        let t = triangle(j1, j2, j3);
        prop_assert_eq!(t, triangle(j2, j1, j3));
        prop_assert_eq!(t, triangle(j3, j2, j1));
        prop_assert_eq!(t, triangle(j1, j3, j2));
        prop_assert_eq!(t, triangle(j2, j3, j1));
        prop_assert_eq!(t, triangle(j3, j1, j2));
    }

    #[test]
    fn test_wigner_w6j_column_symmetry(
        j1 in 0i32..10, j2 in 0i32..10, j3 in 0i32..10,
        i1 in 0i32..10, i2 in 0i32..10, i3 in 0i32..10,
    ) {
        // The 6j symbol is invariant under the exchange of any two columns.
        let reference = w6j(j1, j2, j3, i1, i2, i3);
        prop_assert_eq!(reference, w6j(j2, j1, j3, i2, i1, i3));
        prop_assert_eq!(reference, w6j(j3, j2, j1, i3, i2, i1));
    }

    #[test]
    fn test_wigner_w6j_pretest_is_necessary(
        j1 in 0i32..10, j2 in 0i32..10, j3 in 0i32..10,
        i1 in 0i32..10, i2 in 0i32..10, i3 in 0i32..10,
    ) {
        if !w6j_triangle(j1, j2, j3, i1, i2, i3) {
            prop_assert_eq!(w6j(j1, j2, j3, i1, i2, i3), 0.0);
        }
    }
}
