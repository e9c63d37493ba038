//! Relativistic subshells, configurations and coupling trees.
//!
//! These are the minimal records the recoupling analysis operates on; the
//! generation of configurations and configuration state functions themselves
//! belongs to the surrounding atomic-structure code. As everywhere in this
//! crate, angular momenta are stored doubled: a subshell's `j` is $`2j`$ and
//! its orbital momentum `l` is $`2l`$.

use std::fmt;


/// Spectroscopic labels of the orbital angular momenta, in the conventional
/// sequence that skips `j`.
pub static ORBITAL_LABELS: [&str; 21] = [
    "s", "p", "d", "f", "g", "h", "i", "k", "l", "m", "n", "o", "q", "r", "t", "u", "v", "w", "x",
    "y", "z",
];

/// Returns the doubled total angular momentum $`2j = 2|\kappa| - 1`$ of the
/// subshell with relativistic quantum number `kappa`.
///
/// # Panics
///
/// Panics when `kappa` is zero, which does not label any subshell.
#[must_use]
pub fn j_from_kappa(kappa: i32) -> i32 {
    assert_ne!(kappa, 0, "`kappa` = 0 does not label a subshell.");
    2 * kappa.abs() - 1
}

/// Returns the doubled orbital angular momentum $`2l`$ of the subshell with
/// relativistic quantum number `kappa`.
#[must_use]
pub fn l_from_kappa(kappa: i32) -> i32 {
    assert_ne!(kappa, 0, "`kappa` = 0 does not label a subshell.");
    if kappa > 0 {
        2 * kappa
    } else {
        -2 * (kappa + 1)
    }
}

/// Returns the relativistic quantum number κ of the subshell with doubled
/// total momentum `j` and doubled orbital momentum `l`.
///
/// # Panics
///
/// Panics unless `j` is an odd doubled half-integer with $`j = l \pm 1/2`$.
#[must_use]
pub fn kappa_from_jl(j: i32, l: i32) -> i32 {
    assert!(
        is_half_integer(j) && l >= 0 && !crate::angmom::wigner::is_odd(l),
        "(`j` = {j}, `l` = {l}) is not a valid doubled (j, l) pair."
    );
    assert!(
        (j - l).abs() == 1,
        "`j` = {j} and `l` = {l} do not satisfy j = l ± 1/2."
    );
    if j == l + 1 {
        -(j + 1) / 2
    } else {
        (j + 1) / 2
    }
}

/// Returns `true` if the doubled momentum `j` represents a half-odd-integer.
#[must_use]
pub fn is_half_integer(j: i32) -> bool {
    j > 0 && crate::angmom::wigner::is_odd(j)
}

/// A relativistic subshell with its occupation number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Shell {
    /// The principal quantum number.
    pub n: i32,

    /// The relativistic angular quantum number κ.
    pub kappa: i32,

    /// The occupation number, between 0 and $`2j + 1`$.
    pub nq: i32,
}

impl Shell {
    /// Constructs a subshell, checking that κ is a valid label and that the
    /// occupation fits the shell.
    #[must_use]
    pub fn new(n: i32, kappa: i32, nq: i32) -> Self {
        assert!(n > 0, "The principal quantum number `n` = {n} must be positive.");
        let shell = Self { n, kappa, nq };
        assert!(
            (0..=shell.max_occupation()).contains(&nq),
            "The occupation `nq` = {} of shell {} lies outside [0, {}].",
            nq,
            shell,
            shell.max_occupation()
        );
        shell
    }

    /// The doubled total angular momentum $`2j`$ of this subshell.
    #[must_use]
    pub fn j(&self) -> i32 {
        j_from_kappa(self.kappa)
    }

    /// The doubled orbital angular momentum $`2l`$ of this subshell.
    #[must_use]
    pub fn l(&self) -> i32 {
        l_from_kappa(self.kappa)
    }

    /// The maximal occupation $`2j + 1`$ of this subshell.
    #[must_use]
    pub fn max_occupation(&self) -> i32 {
        self.j() + 1
    }

    /// `true` when the two shells have the same quantum labels, regardless of
    /// occupation.
    #[must_use]
    pub fn same_orbital(&self, other: &Shell) -> bool {
        self.n == other.n && self.kappa == other.kappa
    }
}

impl fmt::Display for Shell {
    /// Formats the shell in compact relativistic notation, *e.g.* `2p-` for
    /// $`2\mathrm{p}_{1/2}`$ and `2p+` for $`2\mathrm{p}_{3/2}`$.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let l_index = (self.l() / 2) as usize;
        let letter = ORBITAL_LABELS
            .get(l_index)
            .copied()
            .unwrap_or("?");
        let fine = if self.kappa < 0 { "+" } else { "-" };
        write!(f, "{}{}{}", self.n, letter, fine)
    }
}

/// One level of a coupling tree: the collective momentum of the shell coupled
/// at this level and the running total after coupling it.
///
/// Trees are stored innermost-first: index 0 holds the first-coupled shell
/// (whose `total_j` equals its `shell_j`) and the last entry's `total_j` is
/// the total angular momentum of the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CoupledState {
    /// The doubled collective angular momentum of the shell at this level.
    pub shell_j: i32,

    /// The doubled running total after coupling this level's shell.
    pub total_j: i32,
}

impl CoupledState {
    #[must_use]
    pub fn new(shell_j: i32, total_j: i32) -> Self {
        assert!(
            shell_j >= 0 && total_j >= 0,
            "Doubled momenta ({shell_j}, {total_j}) must be non-negative."
        );
        Self { shell_j, total_j }
    }
}

/// An ordered list of subshells with occupations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Configuration {
    shells: Vec<Shell>,
}

impl Configuration {
    /// Constructs a configuration from an ordered shell list.
    ///
    /// # Panics
    ///
    /// Panics when two shells carry the same (n, κ) labels; a subshell appears
    /// at most once in a configuration.
    #[must_use]
    pub fn new(shells: Vec<Shell>) -> Self {
        for (i, si) in shells.iter().enumerate() {
            for sj in shells.iter().skip(i + 1) {
                assert!(
                    !si.same_orbital(sj),
                    "The subshell {si} appears more than once in the configuration."
                );
            }
        }
        Self { shells }
    }

    /// The ordered shell list.
    #[must_use]
    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    /// The number of subshells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shells.is_empty()
    }

    /// The total electron count.
    #[must_use]
    pub fn n_electrons(&self) -> i32 {
        self.shells.iter().map(|s| s.nq).sum()
    }

    /// `true` when both configurations run over the same ordered (n, κ)
    /// subshell sequence, occupations aside.
    #[must_use]
    pub fn same_shell_sequence(&self, other: &Configuration) -> bool {
        self.shells.len() == other.shells.len()
            && self
                .shells
                .iter()
                .zip(other.shells.iter())
                .all(|(a, b)| a.same_orbital(b))
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = self
            .shells
            .iter()
            .map(|s| format!("{}{}", s, s.nq))
            .collect::<Vec<_>>();
        write!(f, "{}", labels.join(" "))
    }
}
