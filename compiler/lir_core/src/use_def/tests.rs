use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::{assert_well_formed, dead_end, i32c, jump, module, void_fn};
use crate::Ty;

#[test]
fn operands_are_mirrored() {
    let mut m = module();
    let a = i32c(&mut m, 2);
    let b = i32c(&mut m, 3);
    let add = m.build_add(a, b).unwrap();

    let uses = m.operands(add).to_vec();
    assert_eq!(uses.len(), 2);
    assert_eq!(m.use_value(uses[0]), a);
    assert_eq!(m.use_user(uses[0]), add.value());
    assert_eq!(m.use_slot(uses[1]), OperandSlot::Fixed(1));
    assert_eq!(m.used_by(a), &[uses[0]]);
    assert_eq!(m.users(b), vec![add.value()]);
    assert_eq!(m.operand(add, 1), Some(b));
    assert_eq!(m.operand(add, 2), None);
}

#[test]
fn constant_operands_are_owned_by_the_edge() {
    let mut m = module();
    let a = i32c(&mut m, 2);
    let add = m.build_add(a, a).unwrap();
    assert_eq!(m.strong_count(a), Some(3));

    m.release(a).unwrap();
    assert!(m.is_live(a));
    m.erase_instruction(add).unwrap();
    assert!(!m.is_live(a));
}

#[test]
fn set_use_moves_the_edge() {
    let mut m = module();
    let a = i32c(&mut m, 1);
    let b = i32c(&mut m, 2);
    let c = i32c(&mut m, 3);
    let add = m.build_add(a, b).unwrap();
    let first = m.operands(add)[0];

    m.set_use(first, Some(c)).unwrap();
    assert_eq!(m.use_value(first), c);
    assert!(m.used_by(a).is_empty());
    assert_eq!(m.used_by(c), &[first]);
    assert_eq!(m.strong_count(a), Some(1));
    assert_eq!(m.strong_count(c), Some(2));
}

#[test]
fn set_use_rejects_other_types() {
    let mut m = module();
    let a = i32c(&mut m, 1);
    let wide = m.const_int(Ty::I64, 1).unwrap();
    let add = m.build_add(a, a).unwrap();
    let first = m.operands(add)[0];

    assert_eq!(
        m.set_use(first, Some(wide)).unwrap_err(),
        IrError::TypeMismatch {
            ty: Ty::I64,
            reason: "replacement type differs from the operand type"
        }
    );
    assert_eq!(m.use_value(first), a);
    assert!(m.used_by(wide).is_empty());
}

#[test]
fn null_only_kills_keyed_slots() {
    let mut m = module();
    let (_, entry) = void_fn(&mut m);
    let a = i32c(&mut m, 1);
    let add = m.build_add(a, a).unwrap();
    let first = m.operands(add)[0];
    assert_eq!(
        m.set_use(first, None).unwrap_err(),
        IrError::NullOperand { what: "operand" }
    );

    let phi = m.build_phi(Ty::I32).unwrap();
    m.add_incoming(phi, entry, a).unwrap();
    let edge = m.operands(phi)[0];
    m.set_use(edge, None).unwrap();
    assert!(m.operands(phi).is_empty());
    assert!(!m.is_use_live(edge));
    assert_eq!(m.used_by(a).len(), 2);
}

#[test]
fn blocks_only_replace_blocks() {
    let mut m = module();
    let (f, entry) = void_fn(&mut m);
    let exit = dead_end(&mut m, f);
    jump(&mut m, entry, exit);
    let br = m.terminator(entry).unwrap();
    let target = m.operands(br)[0];
    let undef = m.undef(Ty::I32).unwrap();

    assert!(matches!(
        m.set_use(target, Some(undef)),
        Err(IrError::TypeMismatch { .. })
    ));
}

#[test]
fn retargeting_a_connected_branch_updates_the_cfg() {
    let mut m = module();
    let (f, entry) = void_fn(&mut m);
    let a = dead_end(&mut m, f);
    let b = dead_end(&mut m, f);
    jump(&mut m, entry, a);
    let br = m.terminator(entry).unwrap();

    m.set_use(m.operands(br)[0], Some(b.value())).unwrap();
    assert_eq!(m.edge_count(entry, a), 0);
    assert_eq!(m.edge_count(entry, b), 1);
    assert!(m.comes_from(a).is_empty());
    assert_eq!(m.comes_from(b).get(&entry), Some(&1));
    assert_well_formed(&m);
}

#[test]
fn replace_all_usee_touches_only_matching_edges() {
    let mut m = module();
    let a = i32c(&mut m, 1);
    let b = i32c(&mut m, 2);
    let c = i32c(&mut m, 3);
    let add = m.build_add(a, a).unwrap();
    let other = m.build_add(a, b).unwrap();

    assert_eq!(m.replace_all_usee(add, a, c).unwrap(), 2);
    assert_eq!(m.inst_operands(add), vec![c, c]);
    assert_eq!(m.inst_operands(other), vec![a, b]);
    assert_eq!(m.replace_all_usee(add, a, c).unwrap(), 0);
}

#[test]
fn replace_all_uses_with_rewires_every_user() {
    let mut m = module();
    let a = i32c(&mut m, 1);
    let b = i32c(&mut m, 2);
    let x = m.build_add(a, b).unwrap();
    let y = m.build_mul(x.value(), x.value()).unwrap();
    let z = m.build_sub(x.value(), a).unwrap();

    assert_eq!(m.replace_all_uses_with(x, b).unwrap(), 3);
    assert!(!m.has_users(x));
    assert_eq!(m.inst_operands(y), vec![b, b]);
    assert_eq!(m.inst_operands(z), vec![b, a]);
}

#[test]
fn removing_indexed_operands_renumbers() {
    let mut m = module();
    let (f, entry) = void_fn(&mut m);
    let cond = i32c(&mut m, 0);
    let a = dead_end(&mut m, f);
    let b = dead_end(&mut m, f);
    let c = dead_end(&mut m, f);
    let sw = m.build_switch(cond, a).unwrap();
    m.add_case(sw, 1, b).unwrap();
    m.add_case(sw, 2, c).unwrap();
    m.add_case(sw, 3, b).unwrap();
    m.push_back(entry, sw).unwrap();

    m.remove_target(sw, b).unwrap();
    let slots: Vec<OperandSlot> = m.operands(sw).iter().map(|&u| m.use_slot(u)).collect();
    assert_eq!(
        slots,
        vec![
            OperandSlot::Fixed(0),
            OperandSlot::Fixed(1),
            OperandSlot::Indexed(0)
        ]
    );
    assert_eq!(m.switch_cases(sw), vec![(2, c)]);
}
