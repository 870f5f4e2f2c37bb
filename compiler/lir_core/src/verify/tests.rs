use pretty_assertions::assert_eq;

use super::*;
use crate::instr::InstKind;
use crate::test_helpers::{dead_end, i32c, jump, module, void_fn};

/// `f` with `entry: add; br exit` and `exit: unreachable`.
fn sample(m: &mut Module) -> (FuncId, BlockId, BlockId, InstId) {
    let (f, entry) = void_fn(m);
    let exit = dead_end(m, f);
    jump(m, entry, exit);
    let one = i32c(m, 1);
    let add = m.build_add(one, one).unwrap();
    m.push_back(entry, add).unwrap();
    (f, entry, exit, add)
}

#[test]
fn built_graphs_verify_clean() {
    let mut m = module();
    let (f, ..) = sample(&mut m);
    assert_eq!(verify_function(&m, f), Vec::<Violation>::new());
    assert_eq!(verify_module(&m), Vec::<Violation>::new());
}

#[test]
fn detects_stale_cfg_counts() {
    let mut m = module();
    let (f, entry, exit, _) = sample(&mut m);
    m.block_data_mut(entry).jumps_to.insert(exit, 3);
    assert_eq!(
        verify_function(&m, f),
        vec![Violation::CfgCacheMismatch {
            from: entry,
            to: exit,
            cached: 3,
            actual: 1,
        }]
    );
}

#[test]
fn detects_unmirrored_edges() {
    let mut m = module();
    let (f, _, _, add) = sample(&mut m);
    let lhs = m.operands(add)[0];
    let one = m.use_value(lhs);
    m.data_mut(one).used_by.clear();

    let found = verify_function(&m, f);
    assert_eq!(found.len(), 2);
    assert!(found
        .iter()
        .all(|v| matches!(v, Violation::UseNotMirrored { user, .. } if *user == add.value())));
}

#[test]
fn detects_terminator_placement() {
    let mut m = module();
    let (f, entry, exit, add) = sample(&mut m);
    m.inst_data_mut(add).kind = InstKind::Unreachable;
    let last = m.last_inst(exit).unwrap();
    m.inst_data_mut(last).kind = InstKind::Phi;

    let found = verify_function(&m, f);
    assert!(found.contains(&Violation::MisplacedTerminator { block: entry, inst: add }));
    assert!(found.contains(&Violation::MissingTerminator { block: exit }));
}

#[test]
fn detects_status_and_parent_drift() {
    let mut m = module();
    let (f, entry, exit, add) = sample(&mut m);
    m.inst_data_mut(add).status = ConnectStatus::Disconnected;
    m.block_data_mut(exit).parent = None;

    let found = verify_function(&m, f);
    assert!(found.contains(&Violation::StatusMismatch {
        inst: add,
        expected: ConnectStatus::Connected,
        found: ConnectStatus::Disconnected,
    }));
    assert!(found.contains(&Violation::ParentMismatch {
        value: exit.value()
    }));
    assert_eq!(m.block_parent(entry), Some(f));
}

#[test]
fn violations_render_readably() {
    let mut m = module();
    let (_, entry, _, _) = sample(&mut m);
    let text = Violation::MissingTerminator { block: entry }.to_string();
    assert!(text.ends_with("does not end in a terminator"));
}
