use crate::recouple::interact::{
    interacting_shells, is_present, sort_shell, RecoupleContext,
};
use crate::shells::{Configuration, Shell};

fn neon_like(nq: [i32; 4]) -> Configuration {
    Configuration::new(vec![
        Shell::new(1, -1, nq[0]),
        Shell::new(2, -1, nq[1]),
        Shell::new(2, 1, nq[2]),
        Shell::new(2, -2, nq[3]),
    ])
}

#[test]
fn test_interact_identical_configurations() {
    let cfg = neon_like([2, 2, 2, 4]);
    let datum = interacting_shells(&cfg, &cfg).unwrap().unwrap();
    assert!(datum.slots().is_empty());
    assert_eq!(datum.n_shells(), 4);
    assert_eq!(datum.phase(), 1);
    assert_eq!(datum.bra(), cfg.shells());
}

#[test]
fn test_interact_one_electron_moved() {
    let bra = neon_like([2, 2, 1, 4]);
    let ket = neon_like([2, 2, 2, 3]);
    let datum = interacting_shells(&bra, &ket).unwrap().unwrap();
    let slots = datum.slots();
    assert_eq!(slots.len(), 2);

    // Bra-side record on the raised subshell (2p+), ket-side on the lowered
    // one (2p-).
    assert_eq!(slots[0].index, 3);
    assert_eq!(slots[0].kappa, -2);
    assert_eq!(slots[0].j, 3);
    assert_eq!(slots[0].nq_bra, 4);
    assert_eq!(slots[0].nq_ket, 3);
    assert_eq!(slots[1].index, 2);
    assert_eq!(slots[1].kappa, 1);
    assert_eq!(slots[1].nq_bra, 1);
    assert_eq!(slots[1].nq_ket, 2);

    // Crossings: nothing beyond 2p+ in the bra, three electrons beyond 2p-
    // in the ket.
    assert_eq!(datum.phase(), -1);

    let labels = slots.iter().map(|s| s.compact_label()).collect::<Vec<_>>();
    assert_eq!(labels, ["2p+", "2p-"]);
}

#[test]
fn test_interact_particle_hole_pair() {
    let bra = neon_like([2, 2, 0, 4]);
    let ket = neon_like([2, 2, 2, 2]);
    let datum = interacting_shells(&bra, &ket).unwrap().unwrap();
    let slots = datum.slots();
    assert_eq!(slots.len(), 4);
    assert_eq!(
        slots.iter().map(|s| s.index).collect::<Vec<_>>(),
        [3, 2, 3, 2]
    );
    // Two ket-side crossings of two electrons each.
    assert_eq!(datum.phase(), 1);
}

#[test]
fn test_interact_crossing_phase_parity() {
    let bra = neon_like([2, 2, 1, 4]);
    let ket = neon_like([2, 2, 2, 3]);
    let datum = interacting_shells(&bra, &ket).unwrap().unwrap();
    assert_eq!(datum.phase(), -1);

    // Lowering the outer occupation changes the crossing count parity.
    let bra_even = neon_like([2, 2, 1, 3]);
    let ket_even = neon_like([2, 2, 2, 2]);
    let datum_even = interacting_shells(&bra_even, &ket_even).unwrap().unwrap();
    assert_eq!(datum_even.phase(), 1);
}

#[test]
fn test_interact_too_many_differences() {
    // Four electrons moved.
    let bra = neon_like([2, 0, 0, 4]);
    let ket = neon_like([0, 2, 2, 2]);
    assert!(interacting_shells(&bra, &ket).unwrap().is_none());

    // Unequal electron counts.
    let bra = neon_like([2, 2, 2, 4]);
    let ket = neon_like([2, 2, 2, 3]);
    assert!(interacting_shells(&bra, &ket).unwrap().is_none());
}

#[test]
#[should_panic(expected = "subshell sequence")]
fn test_interact_mismatched_sequences_are_rejected() {
    let bra = neon_like([2, 2, 2, 4]);
    let ket = Configuration::new(vec![Shell::new(1, -1, 2)]);
    let _ = interacting_shells(&bra, &ket);
}

#[test]
fn test_interact_sort_shell() {
    let bra = neon_like([2, 2, 1, 4]);
    let ket = neon_like([2, 2, 2, 3]);
    let datum = interacting_shells(&bra, &ket).unwrap().unwrap();
    let (order, phase) = sort_shell(datum.slots());
    assert_eq!(order, [1, 0]);
    assert_eq!(phase, -1);

    let hole = neon_like([2, 2, 0, 4]);
    let filled = neon_like([2, 2, 2, 2]);
    let pair_datum = interacting_shells(&hole, &filled).unwrap().unwrap();
    let (pair_order, pair_phase) = sort_shell(pair_datum.slots());
    assert_eq!(pair_order, [1, 3, 0, 2]);
    assert_eq!(pair_phase, -1);

    // Sorting sorted records is the identity with a positive sign.
    let sorted = pair_order
        .iter()
        .map(|&pos| pair_datum.slots()[pos])
        .collect::<Vec<_>>();
    let (identity, identity_phase) = sort_shell(&sorted);
    assert_eq!(identity, [0, 1, 2, 3]);
    assert_eq!(identity_phase, 1);
}

#[test]
fn test_interact_is_present() {
    let hole = neon_like([2, 2, 0, 4]);
    let filled = neon_like([2, 2, 2, 2]);
    let datum = interacting_shells(&hole, &filled).unwrap().unwrap();
    assert_eq!(is_present(3, datum.slots()), 2);
    assert_eq!(is_present(2, datum.slots()), 2);
    assert_eq!(is_present(0, datum.slots()), 0);
}

#[test]
fn test_interact_context_cache() {
    let mut ctx = RecoupleContext::new(4);
    assert_eq!(ctx.max_rank(), 4);
    ctx.set_max_rank(8);
    assert_eq!(ctx.max_rank(), 8);
    assert_eq!(RecoupleContext::default().max_rank(), 6);

    let bra = neon_like([2, 2, 1, 4]);
    let ket = neon_like([2, 2, 2, 3]);
    assert_eq!(ctx.n_cached(), 0);
    let first = ctx.get_interact(&bra, &ket).unwrap().unwrap();
    assert_eq!(ctx.n_cached(), 1);
    let second = ctx.get_interact(&bra, &ket).unwrap().unwrap();
    assert_eq!(ctx.n_cached(), 1);
    assert_eq!(first, second);

    // None outcomes are cached too.
    let unbalanced = neon_like([2, 2, 2, 4]);
    assert!(ctx.get_interact(&unbalanced, &ket).unwrap().is_none());
    assert_eq!(ctx.n_cached(), 2);
    assert!(ctx.get_interact(&unbalanced, &ket).unwrap().is_none());
    assert_eq!(ctx.n_cached(), 2);

    ctx.reinit();
    assert_eq!(ctx.n_cached(), 0);
}
