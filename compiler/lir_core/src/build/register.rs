//! Register writes for non-SSA code.
//!
//! A register is a mutable slot read by using it as an operand and
//! written by `regwrite`. When the written value is an instruction that
//! has not been placed anywhere, the write adopts it: the instruction is
//! nested under the write (status `Reparent`) and lives and dies with it.

use lir_types::Ty;

use crate::error::IrError;
use crate::instr::{ConnectStatus, InstKind, InstParent};
use crate::module::Module;
use crate::value::{InstId, OperandSlot, RegId, ValueId};

impl Module {
    /// `reg = value`.
    pub fn build_reg_write(&mut self, reg: RegId, value: ValueId) -> Result<InstId, IrError> {
        if self.as_register(reg.value()).is_none() {
            return Err(IrError::NullOperand { what: "register" });
        }
        let ty = self.operand_type(value, "written value")?;
        if !self.types.equal(ty, self.type_of(reg)) {
            return Err(IrError::TypeMismatch {
                ty,
                reason: "written value does not match the register type",
            });
        }
        let write = self.new_inst(
            Ty::VOID,
            InstKind::RegWrite,
            &[(OperandSlot::Fixed(0), reg.value()), (OperandSlot::Fixed(1), value)],
        );
        if let Some(inner) = self.as_inst(value) {
            if self.status(inner) == ConnectStatus::Disconnected {
                let data = self.inst_data_mut(inner);
                data.status = ConnectStatus::Reparent;
                data.parent = Some(InstParent::Inst(write));
            }
        }
        Ok(write)
    }

    /// Instruction nested under a register write, if any.
    pub fn nested_value(&self, write: InstId) -> Option<InstId> {
        let value = self.operand(write, 1)?;
        let inner = self.as_inst(value)?;
        (self.nesting_parent(inner) == Some(write)).then_some(inner)
    }
}
