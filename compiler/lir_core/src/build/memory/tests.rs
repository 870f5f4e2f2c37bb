use pretty_assertions::assert_eq;

use super::*;
use crate::instr::{InstKind, Opcode};
use crate::test_helpers::{i32c, module};

#[test]
fn alloca_yields_a_pointer() {
    let mut m = module();
    let slot = m.build_alloca(Ty::I64, None).unwrap();
    let ptr = m.types_mut().pointer(Ty::I64);
    assert_eq!(m.type_of(slot), ptr);
    assert_eq!(
        m.inst_kind(slot),
        &InstKind::Alloca {
            allocated: Ty::I64,
            align: 8,
        }
    );

    let padded = m.build_alloca(Ty::I8, Some(3)).unwrap();
    assert_eq!(
        m.inst_kind(padded),
        &InstKind::Alloca {
            allocated: Ty::I8,
            align: 4,
        }
    );
    assert!(m.build_alloca(Ty::VOID, None).is_err());
}

#[test]
fn load_reads_the_pointee() {
    let mut m = module();
    let const_i32 = m.types_mut().with_const(Ty::I32, true);
    let ptr = m.types_mut().pointer(const_i32);
    let p = m.const_null(ptr).unwrap();
    let load = m.build_load(p, None).unwrap();
    assert_eq!(m.type_of(load), Ty::I32);
    assert_eq!(m.opcode(load), Opcode::Load);

    let a = i32c(&mut m, 0);
    assert_eq!(
        m.build_load(a, None).unwrap_err(),
        IrError::TypeMismatch {
            ty: Ty::I32,
            reason: "address operand must be a pointer",
        }
    );
}

#[test]
fn mismatched_store_wires_nothing() {
    let mut m = module();
    let slot = m.build_alloca(Ty::I32, None).unwrap();
    let wide = m.const_int(Ty::I64, 9).unwrap();
    let slot_users = m.used_by(slot).len();
    let before = m.value_count();

    assert_eq!(
        m.build_store(wide, slot.value(), None).unwrap_err(),
        IrError::TypeMismatch {
            ty: Ty::I64,
            reason: "stored value does not match the pointee type",
        }
    );
    assert!(m.used_by(wide).is_empty());
    assert_eq!(m.used_by(slot).len(), slot_users);
    assert_eq!(m.value_count(), before);

    let ok = i32c(&mut m, 9);
    let store = m.build_store(ok, slot.value(), Some(2)).unwrap();
    assert_eq!(m.type_of(store), Ty::VOID);
    assert!(!m.has_result(store));
    assert_eq!(m.operand(store, 0), Some(ok));
    assert_eq!(m.operand(store, 1), Some(slot.value()));
}

#[test]
fn stores_through_const_pointers_fail() {
    let mut m = module();
    let const_i32 = m.types_mut().with_const(Ty::I32, true);
    let ptr = m.types_mut().pointer(const_i32);
    let p = m.const_null(ptr).unwrap();
    let v = i32c(&mut m, 1);
    assert_eq!(
        m.build_store(v, p, None).unwrap_err(),
        IrError::TypeMismatch {
            ty: const_i32,
            reason: "cannot store through a pointer to const",
        }
    );
}

#[test]
fn gep_steps_through_layers() {
    let mut m = module();
    let arr = m.types_mut().array(Ty::F32, 8);
    let base = m.build_alloca(arr, None).unwrap();
    let zero = m.const_int(Ty::I64, 0).unwrap();
    let three = i32c(&mut m, 3);

    let whole = m.build_gep(base.value(), &[zero]).unwrap();
    let arr_ptr = m.types_mut().pointer(arr);
    assert_eq!(m.type_of(whole), arr_ptr);

    let elem = m.build_gep(base.value(), &[zero, three]).unwrap();
    let f32_ptr = m.types_mut().pointer(Ty::F32);
    assert_eq!(m.type_of(elem), f32_ptr);
    assert_eq!(m.operands(elem).len(), 3);

    assert_eq!(
        m.build_gep(base.value(), &[]).unwrap_err(),
        IrError::EmptySet {
            what: "getelementptr indices"
        }
    );
    assert!(m.build_gep(base.value(), &[zero, three, three]).is_err());
    let f = m.const_float(Ty::F32, 0.0).unwrap();
    assert!(m.build_gep(base.value(), &[f]).is_err());
}
