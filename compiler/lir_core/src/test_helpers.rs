//! Shared fixtures for unit tests. Only compiled in test builds.

use pretty_assertions::assert_eq;

use crate::module::Module;
use crate::value::{BlockId, FuncId, ValueId};
use crate::verify::{verify_module, Violation};
use crate::Ty;

/// Fresh module with edit verification on.
pub(crate) fn module() -> Module {
    Module::with_config("test", crate::IrConfig::default().with_verify_edits(true))
}

/// Declare `name` with the given signature.
pub(crate) fn declare(m: &mut Module, name: &str, ret: Ty, params: &[Ty]) -> FuncId {
    let fn_ty = m.types_mut().function(ret, params, false);
    m.add_function(name, fn_ty).unwrap()
}

/// `void f()` with an empty entry block.
pub(crate) fn void_fn(m: &mut Module) -> (FuncId, BlockId) {
    let f = declare(m, "f", Ty::VOID, &[]);
    let entry = m.add_block(f).unwrap();
    (f, entry)
}

/// Append a block to `func` ending in `unreachable`.
pub(crate) fn dead_end(m: &mut Module, func: FuncId) -> BlockId {
    let block = m.add_block(func).unwrap();
    let term = m.build_unreachable();
    m.push_back(block, term).unwrap();
    block
}

/// Terminate `from` with `br to`.
pub(crate) fn jump(m: &mut Module, from: BlockId, to: BlockId) {
    let br = m.build_br(to).unwrap();
    m.push_back(from, br).unwrap();
}

pub(crate) fn i32c(m: &mut Module, v: i64) -> ValueId {
    m.const_int(Ty::I32, v).unwrap()
}

pub(crate) fn assert_well_formed(m: &Module) {
    assert_eq!(verify_module(m), Vec::<Violation>::new());
}
