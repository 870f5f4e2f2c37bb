//! Terminators.

use lir_types::Ty;

use crate::error::IrError;
use crate::instr::InstKind;
use crate::module::Module;
use crate::value::{BlockId, InstId, OperandSlot, ValueId};

impl Module {
    fn branch_target(&self, target: BlockId) -> Result<(), IrError> {
        if self.is_live(target) {
            Ok(())
        } else {
            Err(IrError::NullOperand {
                what: "branch target",
            })
        }
    }

    /// `ret` with an optional value. The value is checked against the
    /// function's return type when the instruction is attached.
    pub fn build_ret(&mut self, value: Option<ValueId>) -> Result<InstId, IrError> {
        let operands = match value {
            Some(v) => {
                let ty = self.operand_type(v, "return value")?;
                self.expect_instantiable(ty, "return value must be storable")?;
                vec![(OperandSlot::Fixed(0), v)]
            }
            None => Vec::new(),
        };
        Ok(self.new_inst(Ty::VOID, InstKind::Ret, &operands))
    }

    /// Unconditional jump.
    pub fn build_br(&mut self, target: BlockId) -> Result<InstId, IrError> {
        self.branch_target(target)?;
        Ok(self.new_inst(
            Ty::VOID,
            InstKind::Br,
            &[(OperandSlot::Fixed(0), target.value())],
        ))
    }

    /// Two-way branch on a `bool`.
    pub fn build_cond_br(
        &mut self,
        cond: ValueId,
        then: BlockId,
        otherwise: BlockId,
    ) -> Result<InstId, IrError> {
        let cond_ty = self.operand_type(cond, "branch condition")?;
        if !self.types.equal(cond_ty, Ty::BOOL) {
            return Err(IrError::TypeMismatch {
                ty: cond_ty,
                reason: "branch condition must be bool",
            });
        }
        self.branch_target(then)?;
        self.branch_target(otherwise)?;
        Ok(self.new_inst(
            Ty::VOID,
            InstKind::CondBr,
            &[
                (OperandSlot::Fixed(0), cond),
                (OperandSlot::Fixed(1), then.value()),
                (OperandSlot::Fixed(2), otherwise.value()),
            ],
        ))
    }

    /// Multiway branch on an integer of any width. Cases are added with
    /// [`add_case`](Module::add_case).
    pub fn build_switch(&mut self, cond: ValueId, default: BlockId) -> Result<InstId, IrError> {
        let cond_ty = self.operand_type(cond, "switch condition")?;
        if !self.types.is_int(cond_ty) {
            return Err(IrError::TypeMismatch {
                ty: cond_ty,
                reason: "switch condition must be an integer",
            });
        }
        self.branch_target(default)?;
        Ok(self.new_inst(
            Ty::VOID,
            InstKind::Switch { cases: Vec::new() },
            &[
                (OperandSlot::Fixed(0), cond),
                (OperandSlot::Fixed(1), default.value()),
            ],
        ))
    }

    pub fn build_unreachable(&mut self) -> InstId {
        self.new_inst(Ty::VOID, InstKind::Unreachable, &[])
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for concise assertions")]
mod tests;
