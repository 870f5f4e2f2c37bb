use pretty_assertions::assert_eq;

use super::*;
use crate::instr::Opcode;
use crate::test_helpers::{declare, i32c, module};
use crate::Ty;

#[test]
fn call_wires_callee_then_arguments() {
    let mut m = module();
    let callee = declare(&mut m, "max", Ty::I32, &[Ty::I32, Ty::I32]);
    let a = i32c(&mut m, 1);
    let b = i32c(&mut m, 2);
    let call = m.build_call(callee.value(), &[a, b]).unwrap();

    assert_eq!(m.opcode(call), Opcode::Call);
    assert_eq!(m.type_of(call), Ty::I32);
    assert_eq!(m.callee(call), Some(callee.value()));
    assert_eq!(m.call_args(call), vec![a, b]);
    assert_eq!(m.users(callee), vec![call.value()]);
}

#[test]
fn arity_and_argument_types_are_checked() {
    let mut m = module();
    let callee = declare(&mut m, "g", Ty::VOID, &[Ty::I32]);
    let a = i32c(&mut m, 1);
    let wide = m.const_int(Ty::I64, 1).unwrap();

    assert!(matches!(
        m.build_call(callee.value(), &[]),
        Err(IrError::TypeMismatch { reason, .. })
            if reason == "argument count does not match the signature"
    ));
    assert_eq!(
        m.build_call(callee.value(), &[wide]).unwrap_err(),
        IrError::TypeMismatch {
            ty: Ty::I64,
            reason: "argument type does not match the parameter",
        }
    );
    let call = m.build_call(callee.value(), &[a]).unwrap();
    assert!(!m.has_result(call));
    assert!(!m.has_users(wide));
}

#[test]
fn variadic_calls_accept_extra_storable_arguments() {
    let mut m = module();
    let fn_ty = m.types_mut().function(Ty::I32, &[Ty::I32], true);
    let printf = m.add_function("printf", fn_ty).unwrap();
    let a = i32c(&mut m, 1);
    let f = m.const_float(Ty::F64, 2.0).unwrap();

    let call = m.build_call(printf.value(), &[a, f, a]).unwrap();
    assert_eq!(m.call_args(call), vec![a, f, a]);
    assert!(m.build_call(printf.value(), &[]).is_err());
}

#[test]
fn callee_must_be_a_function_pointer() {
    let mut m = module();
    let a = i32c(&mut m, 1);
    assert_eq!(
        m.build_call(a, &[]).unwrap_err(),
        IrError::TypeMismatch {
            ty: Ty::I32,
            reason: "callee is not a function pointer",
        }
    );
}

#[test]
fn call_accessors_ignore_other_instructions() {
    let mut m = module();
    let a = i32c(&mut m, 1);
    let add = m.build_add(a, a).unwrap();
    assert_eq!(m.callee(add), None);
    assert!(m.call_args(add).is_empty());
}
