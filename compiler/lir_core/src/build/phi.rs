//! PHI nodes.
//!
//! Incoming values are keyed edges: one operand per predecessor block,
//! addressed by [`OperandSlot::Keyed`]. Completeness (one entry per
//! predecessor) can be queried but is never enforced, since front-ends
//! fill PHIs in while the CFG is still growing.

use lir_types::Ty;
use rustc_hash::FxHashSet;

use crate::error::IrError;
use crate::instr::InstKind;
use crate::module::Module;
use crate::value::{BlockId, InstId, OperandSlot, UseId, ValueId};

impl Module {
    /// Empty PHI of type `ty`.
    pub fn build_phi(&mut self, ty: Ty) -> Result<InstId, IrError> {
        self.expect_instantiable(ty, "phi type must be storable")?;
        Ok(self.new_inst(ty, InstKind::Phi, &[]))
    }

    fn expect_phi(&self, phi: InstId) -> Result<(), IrError> {
        if !self.is_live(phi) {
            return Err(IrError::NullOperand { what: "phi" });
        }
        match self.inst_data(phi).kind {
            InstKind::Phi => Ok(()),
            _ => Err(IrError::WrongOpcode {
                expected: "phi",
                found: self.opcode(phi),
            }),
        }
    }

    fn incoming_use(&self, phi: InstId, pred: BlockId) -> Option<UseId> {
        self.operands(phi)
            .iter()
            .copied()
            .find(|&u| self.use_slot(u) == OperandSlot::Keyed(pred))
    }

    /// Set the value flowing in from `pred`, replacing any previous entry.
    pub fn add_incoming(
        &mut self,
        phi: InstId,
        pred: BlockId,
        value: ValueId,
    ) -> Result<(), IrError> {
        self.expect_phi(phi)?;
        if !self.is_live(pred) {
            return Err(IrError::NullOperand {
                what: "incoming block",
            });
        }
        let ty = self.operand_type(value, "incoming value")?;
        if !self.types.equal(ty, self.type_of(phi)) {
            return Err(IrError::TypeMismatch {
                ty,
                reason: "incoming value does not match the phi type",
            });
        }
        match self.incoming_use(phi, pred) {
            Some(u) => self.set_use(u, Some(value)),
            None => {
                self.add_operand(phi.value(), OperandSlot::Keyed(pred), value);
                Ok(())
            }
        }
    }

    /// Drop the entry for `pred`. Returns whether one existed.
    pub fn remove_incoming(&mut self, phi: InstId, pred: BlockId) -> Result<bool, IrError> {
        self.expect_phi(phi)?;
        Ok(self.drop_incoming(phi, pred))
    }

    pub(crate) fn drop_incoming(&mut self, phi: InstId, pred: BlockId) -> bool {
        match self.incoming_use(phi, pred) {
            Some(u) => {
                let index = self.operand_index(phi.value(), u);
                self.remove_operand_at(phi.value(), index);
                true
            }
            None => false,
        }
    }

    /// `(predecessor, value)` entries in insertion order.
    pub fn incoming(&self, phi: InstId) -> Vec<(BlockId, ValueId)> {
        self.operands(phi)
            .iter()
            .filter_map(|&u| match self.use_slot(u) {
                OperandSlot::Keyed(pred) => Some((pred, self.use_value(u))),
                _ => None,
            })
            .collect()
    }

    pub fn incoming_value(&self, phi: InstId, pred: BlockId) -> Option<ValueId> {
        self.incoming_use(phi, pred).map(|u| self.use_value(u))
    }

    /// Whether the PHI has exactly one entry per predecessor of its block.
    pub fn is_complete(&self, phi: InstId) -> bool {
        let Some(block) = self.parent_block(phi) else {
            return false;
        };
        let keys: FxHashSet<BlockId> = self.incoming(phi).into_iter().map(|(b, _)| b).collect();
        let preds: FxHashSet<BlockId> = self.comes_from(block).keys().copied().collect();
        keys == preds
    }
}
