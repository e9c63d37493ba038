//! Reduction of coupled-tree matrix elements to 6j/9j products.
//!
//! A matrix element of a tensor operator between two jj-coupled trees factors
//! into one 6j or 9j symbol per tree level, together with dimension factors
//! and parity phases. [`Formula`] is a reusable workspace for this reduction:
//! a *plan* pass walks the trees once, assigns each level its role and records
//! every triangle constraint the factors will depend on, so that forbidden
//! couplings are rejected by [`Formula::triangles_hold`] before any symbol is
//! evaluated. The *evaluate* pass then multiplies out the per-level factors.
//!
//! [`decouple_shell`] drives the workspace for a single matrix element;
//! [`decouple_shell_recursive`] computes the same coefficient by peeling the
//! outermost tree level one at a time and serves as an independent check of
//! the planned reduction.

use anyhow::bail;

use crate::angmom::wigner::{is_odd, triangle, w6j, w6j_triangle, w9j, w9j_triangle};
use crate::shells::CoupledState;

#[cfg(test)]
#[path = "formula_tests.rs"]
mod formula_tests;

/// Maximal number of coupling-tree levels a formula may span.
pub const MAXJ: usize = 80;

/// Maximal number of 6j/9j symbol arguments a single formula may accumulate.
pub const MAXNJGD: usize = 2000;

/// Bound on either triad table of a [`Formula`].
const MAX_TRIADS: usize = 4 * MAXJ;

/// Factors below this magnitude terminate the evaluation as an exact zero.
const ZERO_TOLERANCE: f64 = 1e-30;

/// A reusable workspace describing the reduction of one coupled-tree matrix
/// element.
///
/// The workspace is filled by [`Formula::plan`] and consumed by
/// [`Formula::triangles_hold`] and [`Formula::evaluate`]. Planning a new
/// matrix element resets it completely, so a single instance can serve a whole
/// sweep over configuration pairs.
#[derive(Clone, Debug, Default)]
pub struct Formula {
    bra: Vec<CoupledState>,
    ket: Vec<CoupledState>,
    interact: Vec<usize>,
    ranks: Vec<i32>,

    /// Levels below every operator attachment; they only constrain the two
    /// trees to agree.
    ifree: Vec<bool>,

    /// Operator slot attached at each level: -1 for none, 0 for the first
    /// operator, 1 for the second.
    inter: Vec<i8>,

    /// Marks the level at which the second operator's rank couples into the
    /// open one through a 9j symbol.
    interp: Vec<bool>,

    /// The open tensor rank flowing through each level, -1 where none does.
    irank: Vec<i32>,

    /// Triangle triads internal to the bra tree.
    tr1: Vec<[i32; 3]>,

    /// Triangle triads internal to the ket tree, plus the cross-tree and rank
    /// triads. Equality constraints are encoded as rank-0 triads `[a, 0, b]`.
    tr2: Vec<[i32; 3]>,

    njgd: usize,
    coeff: f64,
}

impl Formula {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The value computed by the last [`Formula::evaluate`] call.
    #[must_use]
    pub fn coeff(&self) -> f64 {
        self.coeff
    }

    /// The number of 6j/9j symbol arguments the planned reduction will
    /// consume.
    #[must_use]
    pub fn n_symbol_args(&self) -> usize {
        self.njgd
    }

    /// Plans the reduction of the matrix element between the coupling trees
    /// `bra` and `ket` with tensor operators attached at the levels in
    /// `interact`.
    ///
    /// `interact` holds zero, one or two strictly increasing level indices;
    /// `ranks` holds the matching doubled ranks: nothing for a pure overlap,
    /// a single rank for one operator, and `[k1, k2, k]` for two operators
    /// whose ranks couple to a total `k`.
    ///
    /// # Errors
    ///
    /// Fails when the trees exceed [`MAXJ`] levels or the recorded reduction
    /// outgrows the workspace bounds. Structurally invalid arguments
    /// (mismatched tree lengths, negative momenta, unsorted attachment
    /// levels) panic instead, as they indicate caller bugs rather than
    /// oversized inputs.
    pub fn plan(
        &mut self,
        bra: &[CoupledState],
        ket: &[CoupledState],
        interact: &[usize],
        ranks: &[i32],
    ) -> Result<(), anyhow::Error> {
        validate_trees(bra, ket, interact, ranks);
        let ns = bra.len();
        if ns > MAXJ {
            bail!("The coupling trees span {ns} levels, beyond the supported maximum of {MAXJ}.");
        }

        self.bra = bra.to_vec();
        self.ket = ket.to_vec();
        self.interact = interact.to_vec();
        self.ranks = ranks.to_vec();
        self.ifree = vec![false; ns];
        self.inter = vec![-1; ns];
        self.interp = vec![false; ns];
        self.irank = vec![-1; ns];
        self.tr1.clear();
        self.tr2.clear();
        self.njgd = 0;
        self.coeff = 0.0;

        // Internal coupling triads of either tree.
        for i in 1..ns {
            self.push_tr1([bra[i - 1].total_j, bra[i].shell_j, bra[i].total_j])?;
            self.push_tr2([ket[i - 1].total_j, ket[i].shell_j, ket[i].total_j])?;
        }

        match *interact {
            [] => {
                for i in 0..ns {
                    self.ifree[i] = true;
                    self.push_tr2([bra[i].shell_j, 0, ket[i].shell_j])?;
                    self.push_tr2([bra[i].total_j, 0, ket[i].total_j])?;
                }
            }
            [t] => {
                let k = ranks[0];
                self.inter[t] = 0;
                for i in t..ns {
                    self.irank[i] = k;
                }
                for i in 0..t {
                    self.ifree[i] = true;
                    self.push_tr2([bra[i].shell_j, 0, ket[i].shell_j])?;
                    self.push_tr2([bra[i].total_j, 0, ket[i].total_j])?;
                }
                self.push_tr2([bra[t].shell_j, k, ket[t].shell_j])?;
                self.push_tr2([bra[t].total_j, k, ket[t].total_j])?;
                if t > 0 {
                    self.njgd += 6;
                }
                for i in t + 1..ns {
                    self.push_tr2([bra[i].shell_j, 0, ket[i].shell_j])?;
                    self.push_tr2([bra[i].total_j, k, ket[i].total_j])?;
                    self.njgd += 6;
                }
            }
            [t1, t2] => {
                let (k1, k2, k) = (ranks[0], ranks[1], ranks[2]);
                self.inter[t1] = 0;
                self.inter[t2] = 1;
                self.interp[t2] = true;
                for i in t1..t2 {
                    self.irank[i] = k1;
                }
                for i in t2..ns {
                    self.irank[i] = k;
                }
                for i in 0..t1 {
                    self.ifree[i] = true;
                    self.push_tr2([bra[i].shell_j, 0, ket[i].shell_j])?;
                    self.push_tr2([bra[i].total_j, 0, ket[i].total_j])?;
                }
                self.push_tr2([bra[t1].shell_j, k1, ket[t1].shell_j])?;
                self.push_tr2([bra[t1].total_j, k1, ket[t1].total_j])?;
                if t1 > 0 {
                    self.njgd += 6;
                }
                for i in t1 + 1..t2 {
                    self.push_tr2([bra[i].shell_j, 0, ket[i].shell_j])?;
                    self.push_tr2([bra[i].total_j, k1, ket[i].total_j])?;
                    self.njgd += 6;
                }
                self.push_tr2([k1, k2, k])?;
                self.push_tr2([bra[t2].shell_j, k2, ket[t2].shell_j])?;
                self.push_tr2([bra[t2].total_j, k, ket[t2].total_j])?;
                self.njgd += 9;
                for i in t2 + 1..ns {
                    self.push_tr2([bra[i].shell_j, 0, ket[i].shell_j])?;
                    self.push_tr2([bra[i].total_j, k, ket[i].total_j])?;
                    self.njgd += 6;
                }
            }
            _ => unreachable!("`validate_trees` admits at most two attachment levels."),
        }

        if self.njgd > MAXNJGD {
            bail!(
                "The recoupling formula accumulates {} symbol arguments, beyond the supported maximum of {MAXNJGD}.",
                self.njgd
            );
        }
        Ok(())
    }

    /// Tests every triangle triad recorded by the last plan.
    ///
    /// A failing triad means the matrix element vanishes identically, so
    /// callers can skip [`Formula::evaluate`] altogether.
    #[must_use]
    pub fn triangles_hold(&self) -> bool {
        self.tr1
            .iter()
            .chain(self.tr2.iter())
            .all(|t| triangle(t[0], t[1], t[2]))
    }

    /// Multiplies out the per-level factors of the planned reduction.
    ///
    /// Returns exactly zero as soon as a triad or symbol vanishes.
    pub fn evaluate(&mut self) -> f64 {
        self.coeff = 0.0;
        if !self.triangles_hold() {
            return 0.0;
        }
        let mut value = 1.0;
        for i in 0..self.bra.len() {
            let factor = if self.inter[i] == 0 {
                if i == 0 {
                    f64::from(self.bra[0].shell_j + 1).sqrt()
                } else {
                    attach_step(
                        self.bra[i - 1].total_j,
                        &self.bra[i],
                        &self.ket[i],
                        self.ranks[0],
                    )
                }
            } else if self.interp[i] {
                insert_step(
                    self.bra[i - 1].total_j,
                    &self.bra[i],
                    self.ket[i - 1].total_j,
                    &self.ket[i],
                    self.ranks[0],
                    self.ranks[1],
                    self.ranks[2],
                )
            } else if self.ifree[i] {
                1.0
            } else {
                spectator_step(
                    self.bra[i - 1].total_j,
                    &self.bra[i],
                    self.ket[i - 1].total_j,
                    &self.ket[i],
                    self.irank[i],
                )
            };
            if factor.abs() < ZERO_TOLERANCE {
                return 0.0;
            }
            value *= factor;
        }
        self.coeff = value;
        value
    }

    fn push_tr1(&mut self, triad: [i32; 3]) -> Result<(), anyhow::Error> {
        if self.tr1.len() == MAX_TRIADS {
            bail!("The bra triad table overflows its {MAX_TRIADS}-entry bound.");
        }
        self.tr1.push(triad);
        Ok(())
    }

    fn push_tr2(&mut self, triad: [i32; 3]) -> Result<(), anyhow::Error> {
        if self.tr2.len() == MAX_TRIADS {
            bail!("The ket triad table overflows its {MAX_TRIADS}-entry bound.");
        }
        self.tr2.push(triad);
        Ok(())
    }
}

/// Reduces the matrix element of a tensor operator between the first
/// `n_shells` levels of two coupling trees to its numerical recoupling
/// coefficient.
///
/// `interact` and `ranks` are as in [`Formula::plan`]. A vanishing selection
/// rule yields `Ok(0.0)`; only workspace overflows are errors.
pub fn decouple_shell(
    n_shells: usize,
    bra: &[CoupledState],
    ket: &[CoupledState],
    interact: &[usize],
    ranks: &[i32],
) -> Result<f64, anyhow::Error> {
    assert!(
        n_shells <= bra.len() && n_shells <= ket.len(),
        "The coupling trees hold fewer than `n_shells` = {n_shells} levels."
    );
    let bra = &bra[..n_shells];
    let ket = &ket[..n_shells];
    let mut formula = Formula::new();
    formula.plan(bra, ket, interact, ranks)?;
    if !formula.triangles_hold() {
        log::debug!(
            "A triangle relation fails between the coupling trees; the recoupling coefficient vanishes identically."
        );
        return Ok(0.0);
    }
    Ok(formula.evaluate())
}

/// Computes the same coefficient as [`decouple_shell`] by peeling the
/// outermost tree level one at a time.
///
/// Each step strips the last level: a spectator above the open rank
/// contributes a 6j factor, the attachment level of a single operator closes
/// the recursion with a 6j factor against the remaining overlap, and the
/// level where a second operator's rank couples into the open one contributes
/// a 9j factor.
pub fn decouple_shell_recursive(
    n_shells: usize,
    bra: &[CoupledState],
    ket: &[CoupledState],
    interact: &[usize],
    ranks: &[i32],
) -> Result<f64, anyhow::Error> {
    assert!(
        n_shells <= bra.len() && n_shells <= ket.len(),
        "The coupling trees hold fewer than `n_shells` = {n_shells} levels."
    );
    let bra = &bra[..n_shells];
    let ket = &ket[..n_shells];
    validate_trees(bra, ket, interact, ranks);
    if n_shells > MAXJ {
        bail!(
            "The coupling trees span {n_shells} levels, beyond the supported maximum of {MAXJ}."
        );
    }
    Ok(recouple_level(bra, ket, interact, ranks))
}

/// Determines whether an operator attachment is compatible with the two
/// coupling trees, from the triangle constraints alone.
pub fn is_shell_interacting(
    n_shells: usize,
    bra: &[CoupledState],
    ket: &[CoupledState],
    interact: &[usize],
    ranks: &[i32],
) -> Result<bool, anyhow::Error> {
    assert!(
        n_shells <= bra.len() && n_shells <= ket.len(),
        "The coupling trees hold fewer than `n_shells` = {n_shells} levels."
    );
    let mut formula = Formula::new();
    formula.plan(&bra[..n_shells], &ket[..n_shells], interact, ranks)?;
    Ok(formula.triangles_hold())
}

fn recouple_level(
    bra: &[CoupledState],
    ket: &[CoupledState],
    interact: &[usize],
    ranks: &[i32],
) -> f64 {
    if interact.is_empty() {
        let overlap = bra
            .iter()
            .zip(ket.iter())
            .all(|(b, k)| b.shell_j == k.shell_j && b.total_j == k.total_j);
        return if overlap { 1.0 } else { 0.0 };
    }
    let last = bra.len() - 1;
    let t_hi = interact[interact.len() - 1];
    if t_hi < last {
        let rank = ranks[ranks.len() - 1];
        let step = spectator_step(
            bra[last - 1].total_j,
            &bra[last],
            ket[last - 1].total_j,
            &ket[last],
            rank,
        );
        if step.abs() < ZERO_TOLERANCE {
            return 0.0;
        }
        return step * recouple_level(&bra[..last], &ket[..last], interact, ranks);
    }
    if interact.len() == 2 {
        let step = insert_step(
            bra[last - 1].total_j,
            &bra[last],
            ket[last - 1].total_j,
            &ket[last],
            ranks[0],
            ranks[1],
            ranks[2],
        );
        if step.abs() < ZERO_TOLERANCE {
            return 0.0;
        }
        return step * recouple_level(&bra[..last], &ket[..last], &interact[..1], &ranks[..1]);
    }
    if last == 0 {
        return if triangle(bra[0].shell_j, ranks[0], ket[0].shell_j) {
            f64::from(bra[0].shell_j + 1).sqrt()
        } else {
            0.0
        };
    }
    if bra[last - 1].total_j != ket[last - 1].total_j {
        return 0.0;
    }
    let step = attach_step(bra[last - 1].total_j, &bra[last], &ket[last], ranks[0]);
    if step.abs() < ZERO_TOLERANCE {
        return 0.0;
    }
    step * recouple_level(&bra[..last], &ket[..last], &[], &[])
}

/// 6j factor for a spectator shell coupled above the open rank.
///
/// The rank flows through the running totals below this level while the
/// shell itself is untouched, so bra and ket must carry the same shell
/// momentum here.
fn spectator_step(
    bra_low: i32,
    bra: &CoupledState,
    ket_low: i32,
    ket: &CoupledState,
    rank: i32,
) -> f64 {
    if bra.shell_j != ket.shell_j {
        return 0.0;
    }
    let s = bra.shell_j;
    if !w6j_triangle(bra_low, bra.total_j, s, ket.total_j, ket_low, rank) {
        return 0.0;
    }
    let mut r = w6j(bra_low, bra.total_j, s, ket.total_j, ket_low, rank)
        * (f64::from(bra.total_j + 1) * f64::from(ket.total_j + 1)).sqrt();
    if is_odd((bra_low + s + ket.total_j + rank) / 2) {
        r = -r;
    }
    r
}

/// 6j factor for an operator acting on the shell coupled at this level, the
/// running total below it being common to bra and ket.
///
/// Carries the interacting shell's normalisation
/// $`\sqrt{2 j_{\mathrm{bra}} + 1}`$.
fn attach_step(low: i32, bra: &CoupledState, ket: &CoupledState, rank: i32) -> f64 {
    if !w6j_triangle(bra.shell_j, bra.total_j, low, ket.total_j, ket.shell_j, rank) {
        return 0.0;
    }
    let mut r = w6j(bra.shell_j, bra.total_j, low, ket.total_j, ket.shell_j, rank)
        * (f64::from(bra.total_j + 1) * f64::from(ket.total_j + 1)).sqrt()
        * f64::from(bra.shell_j + 1).sqrt();
    if is_odd((low + ket.shell_j + bra.total_j + rank) / 2) {
        r = -r;
    }
    r
}

/// 9j factor for the level at which a second operator of rank `k2` acts on
/// the coupled shell while the rank `k1` is already open below, the two
/// coupling to the total rank `k`.
#[allow(clippy::too_many_arguments)]
fn insert_step(
    bra_low: i32,
    bra: &CoupledState,
    ket_low: i32,
    ket: &CoupledState,
    k1: i32,
    k2: i32,
    k: i32,
) -> f64 {
    if !w9j_triangle(
        bra_low,
        bra.shell_j,
        bra.total_j,
        ket_low,
        ket.shell_j,
        ket.total_j,
        k1,
        k2,
        k,
    ) {
        return 0.0;
    }
    w9j(
        bra_low,
        bra.shell_j,
        bra.total_j,
        ket_low,
        ket.shell_j,
        ket.total_j,
        k1,
        k2,
        k,
    ) * (f64::from(bra.total_j + 1) * f64::from(ket.total_j + 1) * f64::from(k + 1)).sqrt()
        * f64::from(bra.shell_j + 1).sqrt()
}

fn validate_trees(bra: &[CoupledState], ket: &[CoupledState], interact: &[usize], ranks: &[i32]) {
    assert_eq!(
        bra.len(),
        ket.len(),
        "The bra and ket coupling trees must span the same number of levels."
    );
    assert!(!bra.is_empty(), "The coupling trees must hold at least one level.");
    for tree in [bra, ket] {
        assert!(
            tree.iter().all(|s| s.shell_j >= 0 && s.total_j >= 0),
            "Doubled angular momenta in a coupling tree must be non-negative."
        );
        assert_eq!(
            tree[0].total_j, tree[0].shell_j,
            "The innermost level of a coupling tree carries its own shell momentum as the running total."
        );
    }
    match (interact.len(), ranks.len()) {
        (0, 0) | (1, 1) => {}
        (2, 3) => assert!(
            interact[0] < interact[1],
            "The two attachment levels {} and {} must be strictly increasing.",
            interact[0],
            interact[1]
        ),
        (ni, nk) => panic!(
            "{ni} attachment levels and {nk} ranks do not describe an overlap, a single operator or an operator pair."
        ),
    }
    assert!(
        interact.iter().all(|&t| t < bra.len()),
        "An attachment level lies beyond the coupling trees."
    );
    assert!(
        ranks.iter().all(|&k| k >= 0),
        "Doubled tensor ranks must be non-negative."
    );
}
