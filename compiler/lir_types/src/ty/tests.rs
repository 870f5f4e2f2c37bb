use super::*;

#[test]
fn primitive_indices_are_contiguous() {
    assert_eq!(Ty::VOID.raw(), 0);
    assert_eq!(Ty::F64.raw(), Ty::PRIMITIVE_COUNT - 1);
}

#[test]
fn primitive_check() {
    assert!(Ty::I32.is_primitive());
    assert!(!Ty::from_raw(Ty::PRIMITIVE_COUNT).is_primitive());
}

#[test]
fn names_and_debug() {
    assert_eq!(Ty::BOOL.name(), Some("u1"));
    assert_eq!(Ty::from_raw(99).name(), None);
    assert_eq!(format!("{:?}", Ty::I64), "Ty(i64)");
    assert_eq!(format!("{:?}", Ty::from_raw(40)), "Ty(40)");
}

#[test]
fn ty_is_copy_and_small() {
    let a = Ty::U8;
    let b = a;
    assert_eq!(a, b);
    assert_eq!(std::mem::size_of::<Ty>(), 4);
}
