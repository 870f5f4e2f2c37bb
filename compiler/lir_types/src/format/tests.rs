use pretty_assertions::assert_eq;

use crate::{Ty, TypeContext};

#[test]
fn primitives() {
    let ctx = TypeContext::new();
    assert_eq!(ctx.display(Ty::VOID).to_string(), "void");
    assert_eq!(ctx.display(Ty::BOOL).to_string(), "u1");
    assert_eq!(ctx.display(Ty::I32).to_string(), "i32");
    assert_eq!(ctx.display(Ty::F64).to_string(), "f64");
    assert_eq!(ctx.display(Ty::LABEL).to_string(), "label");
}

#[test]
fn compound_types() {
    let mut ctx = TypeContext::new();
    let ci8 = ctx.with_const(Ty::I8, true);
    let str_ty = ctx.pointer(ci8);
    let arr = ctx.array(Ty::U8, 4);
    let printf = ctx.function(Ty::I32, &[str_ty], true);
    let half = ctx.float(5, 10, 2);

    assert_eq!(ctx.display(str_ty).to_string(), "const i8*");
    assert_eq!(ctx.display(arr).to_string(), "[4 x u8]");
    assert_eq!(ctx.display(printf).to_string(), "i32 (const i8*, ...)");
    assert_eq!(ctx.display(half).to_string(), "float<5, 10, 2>");
}

#[test]
fn nullary_variadic_function() {
    let mut ctx = TypeContext::new();
    let f = ctx.function(Ty::VOID, &[], true);
    assert_eq!(ctx.display(f).to_string(), "void (...)");
}
