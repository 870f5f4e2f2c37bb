//! Visitor hooks for emitters and analyses.
//!
//! [`Module::accept`] walks the module in layout order: globals, then each
//! function with its registers, arguments, blocks and instructions. Every
//! concrete node kind has its own hook; all hooks default to doing nothing
//! except the container hooks, which call the matching `walk_*` function
//! to descend. Override a container hook and call `walk_*` yourself to
//! keep descending.
//!
//! Registers are reported through [`Visitor::visit_register`] before the
//! blocks of their function, so printers can declare them up front.

use crate::instr::InstKind;
use crate::module::Module;
use crate::value::{BlockId, FuncId, GlobalId, InstId, RegId, ValueId, ValueKind};

/// How an operand is printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandForm {
    /// By its identifier (`%x`, `@f`, a block label).
    Reference,
    /// By its literal value.
    Literal,
}

/// Double-dispatch hooks over every node kind.
pub trait Visitor {
    fn visit_global(&mut self, module: &Module, global: GlobalId) {
        let _ = (module, global);
    }

    fn visit_function(&mut self, module: &Module, func: FuncId) {
        walk_function(self, module, func);
    }

    fn visit_register(&mut self, module: &Module, reg: RegId) {
        let _ = (module, reg);
    }

    fn visit_argument(&mut self, module: &Module, arg: ValueId) {
        let _ = (module, arg);
    }

    fn visit_block(&mut self, module: &Module, block: BlockId) {
        walk_block(self, module, block);
    }

    // One hook per instruction kind.

    fn visit_binary(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_compare(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_unary(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_cast(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_alloca(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_load(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_store(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_gep(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_phi(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_call(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_select(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_reg_write(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_ret(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_br(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_cond_br(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_switch(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }

    fn visit_unreachable(&mut self, module: &Module, inst: InstId) {
        let _ = (module, inst);
    }
}

/// Visit registers, arguments and blocks of `func`.
pub fn walk_function<V: Visitor + ?Sized>(visitor: &mut V, module: &Module, func: FuncId) {
    for &reg in module.registers(func) {
        visitor.visit_register(module, reg);
    }
    for &arg in module.params(func) {
        visitor.visit_argument(module, arg);
    }
    for &block in module.blocks(func) {
        visitor.visit_block(module, block);
    }
}

/// Visit the instructions of `block` in order.
pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, module: &Module, block: BlockId) {
    for inst in module.instructions(block) {
        dispatch_inst(visitor, module, inst);
    }
}

/// Call the hook matching the kind of `inst`.
pub fn dispatch_inst<V: Visitor + ?Sized>(visitor: &mut V, module: &Module, inst: InstId) {
    match module.inst_kind(inst) {
        InstKind::Binary(_) => visitor.visit_binary(module, inst),
        InstKind::Compare(_) => visitor.visit_compare(module, inst),
        InstKind::Unary(_) => visitor.visit_unary(module, inst),
        InstKind::Cast(_) => visitor.visit_cast(module, inst),
        InstKind::Alloca { .. } => visitor.visit_alloca(module, inst),
        InstKind::Load { .. } => visitor.visit_load(module, inst),
        InstKind::Store { .. } => visitor.visit_store(module, inst),
        InstKind::GetElementPtr => visitor.visit_gep(module, inst),
        InstKind::Phi => visitor.visit_phi(module, inst),
        InstKind::Call => visitor.visit_call(module, inst),
        InstKind::Select => visitor.visit_select(module, inst),
        InstKind::RegWrite => visitor.visit_reg_write(module, inst),
        InstKind::Ret => visitor.visit_ret(module, inst),
        InstKind::Br => visitor.visit_br(module, inst),
        InstKind::CondBr => visitor.visit_cond_br(module, inst),
        InstKind::Switch { .. } => visitor.visit_switch(module, inst),
        InstKind::Unreachable => visitor.visit_unreachable(module, inst),
    }
}

impl Module {
    /// Walk the whole module with `visitor`.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        for &global in &self.globals {
            visitor.visit_global(self, global);
        }
        for &func in &self.functions {
            visitor.visit_function(self, func);
        }
    }

    /// Whether an emitter prints `value` literally or by reference.
    pub fn operand_form(&self, value: ValueId) -> OperandForm {
        match self.kind(value) {
            ValueKind::Constant(_) => OperandForm::Literal,
            _ => OperandForm::Reference,
        }
    }
}
