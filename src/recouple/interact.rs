//! Shell-interaction analysis between bra and ket configurations.
//!
//! Two jj-coupled configurations are connected by a one-body or two-body
//! tensor operator only through the subshells whose occupations differ. The
//! analysis here identifies those subshells, records them as creation and
//! annihilation slots, attaches the fermionic sign picked up by moving the
//! second-quantised operators to the outermost position of their state, and
//! caches the outcome per configuration pair. The interacting shells depend
//! only on the occupations, never on the coupling trees, so one cached datum
//! serves every coupled-state pair over the same configuration pair.

use anyhow::format_err;
use derive_builder::Builder;
use indexmap::IndexMap;
use itertools::Itertools;

use crate::angmom::wigner::is_odd;
use crate::shells::{j_from_kappa, l_from_kappa, Configuration, Shell, ORBITAL_LABELS};

#[cfg(test)]
#[path = "interact_tests.rs"]
mod interact_tests;

/// One interacting-subshell record: the bra-side or ket-side end of a
/// second-quantised operator acting on that subshell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InteractShell {
    /// Index of the subshell in the configuration's shell list.
    pub index: usize,

    /// The principal quantum number.
    pub n: i32,

    /// The doubled total angular momentum $`2j`$.
    pub j: i32,

    /// The doubled orbital angular momentum $`2l`$.
    pub kl: i32,

    /// The relativistic quantum number κ.
    pub kappa: i32,

    /// Occupation of this subshell in the bra configuration.
    pub nq_bra: i32,

    /// Occupation of this subshell in the ket configuration.
    pub nq_ket: i32,
}

impl InteractShell {
    fn from_shells(index: usize, bra: &Shell, ket: &Shell) -> Self {
        Self {
            index,
            n: bra.n,
            j: j_from_kappa(bra.kappa),
            kl: l_from_kappa(bra.kappa),
            kappa: bra.kappa,
            nq_bra: bra.nq,
            nq_ket: ket.nq,
        }
    }

    /// The compact text label of this subshell, *e.g.* `2p+` for
    /// $`2\mathrm{p}_{3/2}`$. Used in diagnostics and log lines.
    #[must_use]
    pub fn compact_label(&self) -> String {
        let letter = ORBITAL_LABELS
            .get((self.kl / 2) as usize)
            .copied()
            .unwrap_or("?");
        let fine = if self.kappa < 0 { "+" } else { "-" };
        format!("{}{}{}", self.n, letter, fine)
    }
}

/// The outcome of the shell-interaction analysis for one configuration pair.
///
/// `slots` holds 0, 2 or 4 [`InteractShell`] records in interleaved pair
/// layout: even slots are bra-side (occupation raised in the bra), odd slots
/// ket-side. An empty slot list means the configurations are identical and
/// the interacting subshell is the operator's to choose.
#[derive(Builder, Clone, Debug, PartialEq)]
pub struct InteractDatum {
    /// The bra configuration's ordered shell list, kept for coupling-tree
    /// construction by the caller.
    bra: Vec<Shell>,

    /// The interacting-shell records in interleaved pair layout.
    slots: Vec<InteractShell>,

    /// The number of subshells in either configuration.
    n_shells: usize,

    /// The fermionic reordering sign, ±1.
    phase: i32,
}

impl InteractDatum {
    pub(crate) fn builder() -> InteractDatumBuilder {
        InteractDatumBuilder::default()
    }

    #[must_use]
    pub fn bra(&self) -> &[Shell] {
        &self.bra
    }

    #[must_use]
    pub fn slots(&self) -> &[InteractShell] {
        &self.slots
    }

    #[must_use]
    pub fn n_shells(&self) -> usize {
        self.n_shells
    }

    /// The fermionic sign picked up by moving every second-quantised operator
    /// to the outermost position of its own state.
    #[must_use]
    pub fn phase(&self) -> i32 {
        self.phase
    }
}

/// Analyses which subshells differ in occupation between `bra` and `ket`.
///
/// Returns `Ok(None)` when the configurations cannot be connected by a
/// one-body or two-body number-conserving operator: unequal electron counts,
/// or more than two electrons moved. Identical occupations yield a datum
/// with an empty slot list.
///
/// # Panics
///
/// Panics unless both configurations run over the same ordered (n, κ)
/// subshell sequence; callers pad with empty shells upstream.
pub fn interacting_shells(
    bra: &Configuration,
    ket: &Configuration,
) -> Result<Option<InteractDatum>, anyhow::Error> {
    assert!(
        bra.same_shell_sequence(ket),
        "The configurations ⟨{bra}| and |{ket}⟩ do not share the same subshell sequence."
    );
    if bra.n_electrons() != ket.n_electrons() {
        return Ok(None);
    }

    // Bra-side records where the bra occupation is higher, ket-side records
    // where the ket occupation is higher, each repeated per electron moved.
    let mut raised = Vec::new();
    let mut lowered = Vec::new();
    for (i, (b, k)) in bra.shells().iter().zip(ket.shells().iter()).enumerate() {
        let d = b.nq - k.nq;
        for _ in 0..d.abs() {
            if d > 0 {
                raised.push(InteractShell::from_shells(i, b, k));
            } else if d < 0 {
                lowered.push(InteractShell::from_shells(i, b, k));
            }
        }
    }
    if raised.len() != lowered.len() || raised.len() > 2 {
        return Ok(None);
    }

    // Interleave into (bra, ket) pairs; the configuration scan already
    // yields the records in ascending subshell order on either side.
    let slots = raised
        .iter()
        .zip(lowered.iter())
        .flat_map(|(r, l)| [*r, *l])
        .collect::<Vec<_>>();

    let mut crossings = 0;
    for (pos, s) in slots.iter().enumerate() {
        let occupations = if pos % 2 == 0 { bra } else { ket };
        crossings += occupations.shells()[s.index + 1..]
            .iter()
            .map(|sh| sh.nq)
            .sum::<i32>();
    }
    let phase = if is_odd(crossings) { -1 } else { 1 };

    let datum = InteractDatum::builder()
        .bra(bra.shells().to_vec())
        .slots(slots)
        .n_shells(bra.len())
        .phase(phase)
        .build()
        .map_err(|err| format_err!(err))?;
    Ok(Some(datum))
}

/// Canonically orders interacting-shell records by subshell index, bra-side
/// before ket-side on ties.
///
/// Returns the permutation (positions into the input slice) and the sign of
/// its inversion parity. Sorted input yields the identity permutation and a
/// `+1` sign.
#[must_use]
pub fn sort_shell(slots: &[InteractShell]) -> (Vec<usize>, i32) {
    let order = (0..slots.len())
        .sorted_by_key(|&pos| (slots[pos].index, pos % 2))
        .collect::<Vec<_>>();
    let mut inversions = 0;
    for (a, &pa) in order.iter().enumerate() {
        for &pb in order.iter().skip(a + 1) {
            if pa > pb {
                inversions += 1;
            }
        }
    }
    let phase = if inversions % 2 == 1 { -1 } else { 1 };
    (order, phase)
}

/// Counts how many of the given records act on the subshell at `index`.
#[must_use]
pub fn is_present(index: usize, slots: &[InteractShell]) -> usize {
    slots.iter().filter(|s| s.index == index).count()
}

/// The per-session state of the recoupling analysis: the maximal tensor rank
/// retained by the operator drivers and the cache of shell-interaction
/// analyses keyed by configuration pair.
///
/// The cache lives behind `&mut self`; concurrent use requires an external
/// lock around the context or one context per worker.
#[derive(Clone, Debug)]
pub struct RecoupleContext {
    max_rank: i32,
    cache: IndexMap<(Configuration, Configuration), Option<InteractDatum>>,
}

impl RecoupleContext {
    /// Constructs a context retaining tensor ranks up to the physical
    /// (undoubled) `max_rank`.
    #[must_use]
    pub fn new(max_rank: i32) -> Self {
        assert!(
            max_rank >= 0,
            "The maximal tensor rank `max_rank` = {max_rank} must be non-negative."
        );
        Self {
            max_rank,
            cache: IndexMap::new(),
        }
    }

    /// The retained maximal physical tensor rank.
    #[must_use]
    pub fn max_rank(&self) -> i32 {
        self.max_rank
    }

    /// Changes the retained maximal physical tensor rank. The interaction
    /// cache is unaffected, as the analysis does not depend on ranks.
    pub fn set_max_rank(&mut self, max_rank: i32) {
        assert!(
            max_rank >= 0,
            "The maximal tensor rank `max_rank` = {max_rank} must be non-negative."
        );
        self.max_rank = max_rank;
    }

    /// Clears the interaction cache, *e.g.* between unrelated analysis
    /// sessions.
    pub fn reinit(&mut self) {
        self.cache.clear();
    }

    /// The number of configuration pairs currently cached.
    #[must_use]
    pub fn n_cached(&self) -> usize {
        self.cache.len()
    }

    /// Returns the shell-interaction analysis for the configuration pair,
    /// computing and caching it on first request. `None` outcomes are cached
    /// too.
    pub fn get_interact(
        &mut self,
        bra: &Configuration,
        ket: &Configuration,
    ) -> Result<Option<InteractDatum>, anyhow::Error> {
        let key = (bra.clone(), ket.clone());
        if let Some(datum) = self.cache.get(&key) {
            return Ok(datum.clone());
        }
        log::debug!("Shell-interaction analysis cache miss for ⟨{bra}| and |{ket}⟩.");
        let datum = interacting_shells(bra, ket)?;
        self.cache.insert(key, datum.clone());
        Ok(datum)
    }
}

impl Default for RecoupleContext {
    /// A context retaining tensor ranks up to 6, ample for the multipole
    /// operators of atomic-structure calculations.
    fn default() -> Self {
        Self::new(6)
    }
}
