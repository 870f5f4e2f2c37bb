//! Property tests: random CFG edit sequences keep the cached edge counts,
//! the def-use mirror and terminator placement consistent.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use lir_core::{verify_module, BlockId, FuncId, InstId, Module, Ty, Violation};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Edit {
    Br { from: usize, to: usize },
    CondBr { from: usize, then: usize, otherwise: usize },
    Switch { from: usize, default: usize, cases: Vec<(i8, usize)> },
    Retarget { from: usize, old: usize, new: usize },
    Push { block: usize },
    Pop { block: usize },
    Split { block: usize },
    AddBlock,
    Collect,
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    let idx = || 0usize..16;
    prop_oneof![
        3 => (idx(), idx()).prop_map(|(from, to)| Edit::Br { from, to }),
        2 => (idx(), idx(), idx()).prop_map(|(from, then, otherwise)| Edit::CondBr {
            from,
            then,
            otherwise
        }),
        2 => (idx(), idx(), prop::collection::vec((any::<i8>(), idx()), 0..4)).prop_map(
            |(from, default, cases)| Edit::Switch {
                from,
                default,
                cases
            }
        ),
        3 => (idx(), idx(), idx()).prop_map(|(from, old, new)| Edit::Retarget { from, old, new }),
        2 => idx().prop_map(|block| Edit::Push { block }),
        2 => idx().prop_map(|block| Edit::Pop { block }),
        1 => idx().prop_map(|block| Edit::Split { block }),
        1 => Just(Edit::AddBlock),
        1 => Just(Edit::Collect),
    ]
}

/// `void f()` with `blocks` blocks, each ending in `unreachable`.
fn setup(blocks: usize) -> (Module, FuncId) {
    let mut m = Module::new("props");
    let fn_ty = m.types_mut().function(Ty::VOID, &[], false);
    let f = m.add_function("f", fn_ty).unwrap();
    for _ in 0..blocks {
        add_dead_end(&mut m, f);
    }
    (m, f)
}

fn add_dead_end(m: &mut Module, f: FuncId) {
    let block = m.add_block(f).unwrap();
    let end = m.build_unreachable();
    m.push_back(block, end).unwrap();
}

fn install(m: &mut Module, block: BlockId, term: InstId) {
    if let Some(old) = m.set_terminator(block, term).unwrap() {
        m.erase_instruction(old).unwrap();
    }
}

fn apply(m: &mut Module, f: FuncId, edit: &Edit) {
    let blocks = m.blocks(f).to_vec();
    let pick = |i: usize| blocks[i % blocks.len()];
    match *edit {
        Edit::Br { from, to } => {
            let br = m.build_br(pick(to)).unwrap();
            install(m, pick(from), br);
        }
        Edit::CondBr {
            from,
            then,
            otherwise,
        } => {
            let cond = m.const_bool(true);
            let br = m.build_cond_br(cond, pick(then), pick(otherwise)).unwrap();
            m.release(cond).unwrap();
            install(m, pick(from), br);
        }
        Edit::Switch {
            from,
            default,
            ref cases,
        } => {
            let cond = m.const_int(Ty::I8, 0).unwrap();
            let sw = m.build_switch(cond, pick(default)).unwrap();
            m.release(cond).unwrap();
            for &(value, target) in cases {
                // Duplicate values are rejected; skipping them is fine here.
                let _ = m.add_case(sw, i64::from(value), pick(target));
            }
            install(m, pick(from), sw);
        }
        Edit::Retarget { from, old, new } => {
            if let Some(term) = m.terminator(pick(from)) {
                m.replace_target(term, pick(old), pick(new)).unwrap();
            }
        }
        Edit::Push { block } => {
            let one = m.const_int(Ty::I32, 1).unwrap();
            let add = m.build_add(one, one).unwrap();
            m.release(one).unwrap();
            m.push_back(pick(block), add).unwrap();
        }
        Edit::Pop { block } => {
            if let Some(first) = m.first_inst(pick(block)) {
                if !m.is_terminator(first) {
                    m.remove(first).unwrap();
                    m.erase_instruction(first).unwrap();
                }
            }
        }
        Edit::Split { block } => {
            if let Some(first) = m.first_inst(pick(block)) {
                m.split_block(first).unwrap();
            }
        }
        Edit::AddBlock => add_dead_end(m, f),
        Edit::Collect => {
            m.collect_garbage(f);
        }
    }
}

/// Cached edge counts agree with the terminators in both directions.
fn check_cfg(m: &Module, f: FuncId) -> Result<(), TestCaseError> {
    for &block in m.blocks(f) {
        let term = m.terminator(block);
        prop_assert!(term.is_some(), "every block keeps a terminator");
        let targets = term.map(|t| m.terminator_targets(t)).unwrap_or_default();
        let cached: u32 = m.jumps_to(block).values().sum();
        prop_assert_eq!(cached as usize, targets.len());
        for &succ in &m.successors(block) {
            prop_assert!(m.predecessors(succ).contains(&block));
            prop_assert_eq!(
                m.comes_from(succ).get(&block),
                m.jumps_to(block).get(&succ)
            );
        }
        for pred in m.predecessors(block) {
            prop_assert!(m.successors(pred).contains(&block));
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    /// Every edit sequence leaves a graph the verifier accepts.
    #[test]
    fn prop_edits_preserve_invariants(
        blocks in 1usize..6,
        edits in prop::collection::vec(edit_strategy(), 0..40),
    ) {
        let (mut m, f) = setup(blocks);
        for edit in &edits {
            apply(&mut m, f, edit);
            prop_assert_eq!(verify_module(&m), Vec::<Violation>::new());
            check_cfg(&m, f)?;
        }
    }

    /// Removing and re-adding switch cases never leaves stale edges.
    #[test]
    fn prop_switch_cases_round_trip(
        targets in prop::collection::vec(0usize..4, 1..12),
    ) {
        let (mut m, f) = setup(5);
        let blocks = m.blocks(f).to_vec();
        let cond = m.const_int(Ty::I32, 0).unwrap();
        let sw = m.build_switch(cond, blocks[4]).unwrap();
        install(&mut m, blocks[0], sw);
        for (value, &t) in (0i64..).zip(&targets) {
            m.add_case(sw, value, blocks[t]).unwrap();
        }
        prop_assert_eq!(m.jumps_to(blocks[0]).values().sum::<u32>() as usize, targets.len() + 1);

        for &gone in &blocks[..4] {
            let expected = targets.iter().filter(|&&t| blocks[t] == gone).count();
            prop_assert_eq!(m.remove_target(sw, gone).unwrap(), expected);
            prop_assert!(!m.jumps_to(blocks[0]).contains_key(&gone));
        }
        prop_assert!(m.switch_cases(sw).is_empty());
        prop_assert_eq!(m.predecessors(blocks[4]), vec![blocks[0]]);
        prop_assert_eq!(verify_module(&m), Vec::<Violation>::new());
    }
}
