//! Checked instruction factories.
//!
//! Every factory follows the same steps: resolve each operand (a stale
//! handle or finalized instruction fails with `NullOperand`), check the
//! structural type rules of the instruction (`TypeMismatch` names the
//! offending type), and only then allocate the instruction, disconnected,
//! and wire its operands. A failed build leaves the graph untouched.
//!
//! The caller receives the new instruction's owning handle; inserting it
//! into a block hands that handle to the block.

mod arith;
mod call;
mod cast;
mod control;
mod memory;
mod phi;
mod register;

use lir_types::Ty;

use crate::error::IrError;
use crate::instr::{InstData, InstKind};
use crate::module::Module;
use crate::value::{InstId, OperandSlot, ValueId, ValueKind};

impl Module {
    /// Allocate a disconnected instruction and wire its operands.
    pub(crate) fn new_inst(
        &mut self,
        ty: Ty,
        kind: InstKind,
        operands: &[(OperandSlot, ValueId)],
    ) -> InstId {
        let inst = InstId::from_value(self.alloc_value(ty, ValueKind::Instruction(InstData::new(kind))));
        for &(slot, value) in operands {
            self.add_operand(inst.value(), slot, value);
        }
        tracing::trace!(inst = %self.describe(inst.value()), "instruction built");
        inst
    }

    /// Resolve an operand and return its type.
    pub(crate) fn operand_type(&self, value: ValueId, what: &'static str) -> Result<Ty, IrError> {
        self.resolve(value, what)?;
        Ok(self.type_of(value))
    }

    pub(crate) fn expect_instantiable(&self, ty: Ty, reason: &'static str) -> Result<(), IrError> {
        if self.types.is_instantiable(ty) {
            Ok(())
        } else {
            Err(IrError::TypeMismatch { ty, reason })
        }
    }
}

/// Index slot for the `i`-th element of a variable operand list.
pub(crate) fn indexed(i: usize) -> OperandSlot {
    OperandSlot::Indexed(u32::try_from(i).unwrap_or(u32::MAX))
}
