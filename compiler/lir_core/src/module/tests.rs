use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::{declare, i32c, module};

#[test]
fn functions_and_globals_share_one_namespace() {
    let mut m = module();
    let f = declare(&mut m, "main", Ty::I32, &[]);
    assert_eq!(
        m.add_global("main", Ty::I32, None).unwrap_err(),
        DefineError::Duplicate {
            name: "main".to_owned()
        }
    );
    let fn_ty = m.fn_type(f);
    assert!(matches!(
        m.add_function("main", fn_ty),
        Err(DefineError::Duplicate { .. })
    ));

    let g = m.add_global("counter", Ty::I64, None).unwrap();
    assert_eq!(m.function("main"), Some(f));
    assert_eq!(m.global("counter"), Some(g));
    assert_eq!(m.symbol("counter"), Some(g.value()));
    assert_eq!(m.function("counter"), None);
    assert_eq!(m.functions(), &[f]);
    assert_eq!(m.globals(), &[g]);
}

#[test]
fn new_function_is_a_declaration() {
    let mut m = module();
    let f = declare(&mut m, "ext", Ty::VOID, &[Ty::I8, Ty::F64]);
    assert!(m.is_declaration(f));
    assert_eq!(m.params(f).len(), 2);
    assert_eq!(m.type_of(m.params(f)[1]), Ty::F64);
    assert_eq!(m.return_type(f), Ty::VOID);
    assert!(m.is_ssa(f));
}

#[test]
fn function_needs_function_type() {
    let mut m = module();
    assert_eq!(
        m.add_function("bad", Ty::I32).unwrap_err(),
        DefineError::InvalidType { ty: Ty::I32 }
    );
}

#[test]
fn global_type_and_initializer() {
    let mut m = module();
    let init = i32c(&mut m, 7);
    let g = m.add_global("x", Ty::I32, Some(init)).unwrap();

    let ptr = m.type_of(g);
    assert_eq!(m.types().pointee(ptr), Some(Ty::I32));
    assert_eq!(m.global_content_type(g), Ty::I32);
    assert_eq!(m.initializer(g), Some(init));
    // The caller's handle plus the initializer edge.
    assert_eq!(m.strong_count(init), Some(2));

    m.set_initializer(g, None).unwrap();
    assert_eq!(m.initializer(g), None);
    assert_eq!(m.strong_count(init), Some(1));
}

#[test]
fn initializer_must_be_a_matching_constant() {
    let mut m = module();
    let wide = m.const_int(Ty::I64, 1).unwrap();
    assert_eq!(
        m.add_global("x", Ty::I32, Some(wide)).unwrap_err(),
        DefineError::InvalidInitializer
    );
    let f = declare(&mut m, "f", Ty::VOID, &[]);
    assert_eq!(
        m.add_global("y", Ty::I32, Some(f.value())).unwrap_err(),
        DefineError::InvalidInitializer
    );
    assert_eq!(
        m.add_global("z", Ty::VOID, None).unwrap_err(),
        DefineError::InvalidType { ty: Ty::VOID }
    );
}

#[test]
fn rename_moves_the_symbol() {
    let mut m = module();
    let f = declare(&mut m, "old", Ty::VOID, &[]);
    declare(&mut m, "taken", Ty::VOID, &[]);

    assert!(matches!(
        m.rename(f, "taken"),
        Err(DefineError::Duplicate { .. })
    ));
    m.rename(f, "new").unwrap();
    assert_eq!(m.function("old"), None);
    assert_eq!(m.function("new"), Some(f));
    assert_eq!(m.name(f), Some("new"));

    // Renaming to the current name is a no-op.
    m.rename(f, "new").unwrap();
    // set_name on a symbol goes through the symbol table.
    m.set_name(f, "newer").unwrap();
    assert_eq!(m.function("newer"), Some(f));
}

#[test]
fn locals_stay_out_of_the_symbol_table() {
    let mut m = module();
    let g = m.add_global("x", Ty::I32, None).unwrap();
    let slot = m.build_alloca(Ty::I32, None).unwrap();
    m.set_name(slot, "x").unwrap();
    assert_eq!(m.name(slot), Some("x"));

    assert_eq!(m.rename(slot, "y"), Err(DefineError::NotASymbol));
    assert_eq!(m.global("x"), Some(g));
    assert_eq!(m.symbol("y"), None);

    m.set_name(slot, "y").unwrap();
    assert_eq!(m.global("x"), Some(g));
    assert_eq!(m.symbol("y"), None);
}

#[test]
fn reinstalling_the_initializer_keeps_it() {
    let mut m = module();
    let c = i32c(&mut m, 7);
    let g = m.add_global("g", Ty::I32, Some(c)).unwrap();
    // The global's edge is now the only thing holding the constant.
    m.release(c).unwrap();
    assert_eq!(m.strong_count(c), Some(1));

    m.set_initializer(g, Some(c)).unwrap();
    assert_eq!(m.initializer(g), Some(c));
    assert_eq!(m.strong_count(c), Some(1));
    assert_eq!(m.used_by(c).len(), 1);
}

#[test]
fn constant_globals() {
    let mut m = module();
    let g = m.add_global("k", Ty::U8, None).unwrap();
    assert!(!m.is_constant_global(g));
    m.set_constant_global(g, true);
    assert!(m.is_constant_global(g));
}

#[test]
fn pointer_width_comes_from_config() {
    let m = Module::with_config("narrow", IrConfig::default().with_pointer_width(32));
    assert_eq!(m.types().pointer_width(), 32);
    assert_eq!(m.module_name(), "narrow");
    assert_eq!(m.config().pointer_width, 32);
}
