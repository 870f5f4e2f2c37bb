use pretty_assertions::assert_eq;

use super::*;
use crate::instr::Opcode;
use crate::test_helpers::{i32c, module};

#[test]
fn integer_width_changes() {
    let mut m = module();
    let a = i32c(&mut m, -1);
    let wide = m.build_cast(CastOp::SExt, a, Ty::I64).unwrap();
    assert_eq!(m.type_of(wide), Ty::I64);
    assert_eq!(m.opcode(wide), Opcode::Cast(CastOp::SExt));
    m.build_cast(CastOp::Trunc, a, Ty::I8).unwrap();

    assert_eq!(
        m.build_cast(CastOp::Trunc, a, Ty::I64).unwrap_err(),
        IrError::TypeMismatch {
            ty: Ty::I32,
            reason: "trunc needs an integer narrowed to a smaller integer",
        }
    );
    assert!(m.build_cast(CastOp::ZExt, a, Ty::U32).is_err());
}

#[test]
fn float_and_pointer_conversions() {
    let mut m = module();
    let a = i32c(&mut m, 1);
    let f = m.const_float(Ty::F32, 1.5).unwrap();
    let ptr_ty = m.types_mut().pointer(Ty::I32);
    let p = m.const_null(ptr_ty).unwrap();

    m.build_cast(CastOp::FpExt, f, Ty::F64).unwrap();
    m.build_cast(CastOp::FpToInt, f, Ty::I32).unwrap();
    m.build_cast(CastOp::IntToFp, a, Ty::F64).unwrap();
    m.build_cast(CastOp::PtrToInt, p, Ty::U64).unwrap();
    m.build_cast(CastOp::IntToPtr, a, ptr_ty).unwrap();

    assert!(m.build_cast(CastOp::FpTrunc, f, Ty::F64).is_err());
    assert!(m.build_cast(CastOp::PtrToInt, a, Ty::U64).is_err());
}

#[test]
fn bitcast_needs_equal_widths() {
    let mut m = module();
    let a = i32c(&mut m, 1);
    m.build_cast(CastOp::Bitcast, a, Ty::F32).unwrap();
    m.build_cast(CastOp::Bitcast, a, Ty::U32).unwrap();
    assert_eq!(
        m.build_cast(CastOp::Bitcast, a, Ty::F64).unwrap_err(),
        IrError::TypeMismatch {
            ty: Ty::I32,
            reason: "bitcast needs types of equal bit width",
        }
    );
}

#[test]
fn cast_target_must_be_storable() {
    let mut m = module();
    let a = i32c(&mut m, 1);
    assert!(matches!(
        m.build_cast(CastOp::ZExt, a, Ty::VOID),
        Err(IrError::TypeMismatch { ty: Ty::VOID, .. })
    ));
    assert!(!m.has_users(a));
}

#[test]
fn automatic_cast_selection() {
    let mut m = module();
    let signed = m.const_int(Ty::I8, -3).unwrap();
    let unsigned = m.const_int(Ty::U8, 3).unwrap();
    let f = m.const_float(Ty::F64, 1.0).unwrap();

    let cases = [
        (signed, Ty::I32, CastOp::SExt),
        (unsigned, Ty::U32, CastOp::ZExt),
        (signed, Ty::U8, CastOp::Bitcast),
        (f, Ty::F32, CastOp::FpTrunc),
        (f, Ty::I64, CastOp::Bitcast),
    ];
    for (value, to, op) in cases {
        let cast = m.build_cast_auto(value, to).unwrap();
        assert_eq!(m.opcode(cast), Opcode::Cast(op));
    }
    let wide = m.const_int(Ty::I64, 0).unwrap();
    let narrow = m.build_cast_auto(wide, Ty::I16).unwrap();
    assert_eq!(m.opcode(narrow), Opcode::Cast(CastOp::Trunc));

    assert_eq!(
        m.build_cast_auto(f, Ty::I8).unwrap_err(),
        IrError::TypeMismatch {
            ty: Ty::I8,
            reason: "no cast converts between these types",
        }
    );
}
