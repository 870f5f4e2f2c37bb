use pretty_assertions::assert_eq;

use super::*;
use crate::instr::Opcode;
use crate::test_helpers::{dead_end, i32c, module, void_fn};

#[test]
fn branches_link_the_cfg_on_insertion() {
    let mut m = module();
    let (f, entry) = void_fn(&mut m);
    let exit = dead_end(&mut m, f);
    let br = m.build_br(exit).unwrap();
    assert!(m.is_terminator(br));
    assert_eq!(m.jumps_to(entry).get(&exit), None);

    m.push_back(entry, br).unwrap();
    assert_eq!(m.jumps_to(entry).get(&exit), Some(&1));
    assert_eq!(m.comes_from(exit).get(&entry), Some(&1));
}

#[test]
fn cond_br_to_one_block_counts_twice() {
    let mut m = module();
    let (f, entry) = void_fn(&mut m);
    let exit = dead_end(&mut m, f);
    let cond = m.const_bool(false);
    let br = m.build_cond_br(cond, exit, exit).unwrap();
    m.push_back(entry, br).unwrap();

    assert_eq!(m.opcode(br), Opcode::CondBr);
    assert_eq!(m.jumps_to(entry).get(&exit), Some(&2));
    assert_eq!(m.successors(entry).as_slice(), &[exit]);
}

#[test]
fn cond_br_needs_a_bool() {
    let mut m = module();
    let (f, _) = void_fn(&mut m);
    let exit = dead_end(&mut m, f);
    let cond = i32c(&mut m, 1);
    assert_eq!(
        m.build_cond_br(cond, exit, exit).unwrap_err(),
        IrError::TypeMismatch {
            ty: Ty::I32,
            reason: "branch condition must be bool",
        }
    );
}

#[test]
fn switch_takes_any_integer_width() {
    let mut m = module();
    let (f, _) = void_fn(&mut m);
    let exit = dead_end(&mut m, f);
    let wide = m.const_int(Ty::I64, 1).unwrap();
    let sw = m.build_switch(wide, exit).unwrap();
    assert_eq!(m.switch_default(sw), Some(exit));
    assert!(m.switch_cases(sw).is_empty());

    let f32c = m.const_float(Ty::F32, 0.0).unwrap();
    assert!(matches!(
        m.build_switch(f32c, exit),
        Err(IrError::TypeMismatch { ty: Ty::F32, .. })
    ));
}

#[test]
fn stale_targets_are_rejected() {
    let mut m = module();
    let (f, _) = void_fn(&mut m);
    let gone = m.add_block(f).unwrap();
    m.erase_block(gone).unwrap();
    assert_eq!(
        m.build_br(gone).unwrap_err(),
        IrError::NullOperand {
            what: "branch target"
        }
    );
}

#[test]
fn ret_value_must_be_storable() {
    let mut m = module();
    let (f, _) = void_fn(&mut m);
    let exit = dead_end(&mut m, f);
    assert!(matches!(
        m.build_ret(Some(exit.value())),
        Err(IrError::TypeMismatch { ty: Ty::LABEL, .. })
    ));
    let r = m.build_ret(None).unwrap();
    assert!(m.operands(r).is_empty());
    let u = m.build_unreachable();
    assert_eq!(m.opcode(u), Opcode::Unreachable);
}
