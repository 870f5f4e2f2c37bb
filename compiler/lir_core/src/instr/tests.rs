use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::{i32c, module};

#[test]
fn opcode_display_is_lowercase() {
    assert_eq!(Opcode::Add.to_string(), "add");
    assert_eq!(Opcode::Cmp(CmpPred::Le).to_string(), "cmp le");
    assert_eq!(Opcode::Cast(CastOp::IntToPtr).to_string(), "inttoptr");
    assert_eq!(Opcode::CondBr.to_string(), "condbr");
}

#[test]
fn kind_maps_to_opcode() {
    assert_eq!(InstKind::Binary(BinaryOp::Shl).opcode(), Opcode::Shl);
    assert_eq!(InstKind::Unary(UnaryOp::Not).opcode(), Opcode::Not);
    assert_eq!(
        InstKind::Switch { cases: vec![1, 2] }.opcode(),
        Opcode::Switch
    );
}

#[test]
fn terminator_kinds() {
    assert!(InstKind::Ret.is_terminator());
    assert!(InstKind::Unreachable.is_terminator());
    assert!(InstKind::Switch { cases: Vec::new() }.is_terminator());
    assert!(!InstKind::Phi.is_terminator());
    assert!(!InstKind::Call.is_terminator());
}

#[test]
fn operator_classes() {
    assert!(BinaryOp::Xor.is_integer_only());
    assert!(BinaryOp::Shr.is_shift());
    assert!(!BinaryOp::Div.is_integer_only());
    assert!(!BinaryOp::And.is_shift());
}

#[test]
fn built_instruction_starts_disconnected() {
    let mut m = module();
    let a = i32c(&mut m, 1);
    let b = i32c(&mut m, 2);
    let add = m.build_add(a, b).unwrap();

    assert_eq!(m.status(add), ConnectStatus::Disconnected);
    assert_eq!(m.parent_block(add), None);
    assert_eq!(m.opcode(add), Opcode::Add);
    assert!(m.has_result(add));
    assert_eq!(m.inst_operands(add), vec![a, b]);
}
