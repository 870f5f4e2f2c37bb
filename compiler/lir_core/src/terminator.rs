//! Terminator capability: enumerating and rewriting branch targets.
//!
//! Target operands are the block-typed operands of `br` (operand 0),
//! `condbr` (operands 1 and 2) and `switch` (the default, operand 1, and
//! every case target). Rewrites go through the def-use layer, which keeps
//! the CFG caches in step for connected terminators.

use smallvec::SmallVec;

use crate::build::indexed;
use crate::error::IrError;
use crate::instr::InstKind;
use crate::module::Module;
use crate::value::{BlockId, InstId, OperandSlot, UseId};

/// Index of the first case target among a switch's operands.
const FIRST_CASE: usize = 2;

impl Module {
    /// Whether `slot` holds a branch target of `inst`.
    pub(crate) fn is_cfg_target(&self, inst: InstId, slot: OperandSlot) -> bool {
        match self.inst_data(inst).kind {
            InstKind::Br => slot == OperandSlot::Fixed(0),
            InstKind::CondBr => matches!(slot, OperandSlot::Fixed(1 | 2)),
            InstKind::Switch { .. } => {
                matches!(slot, OperandSlot::Fixed(1) | OperandSlot::Indexed(_))
            }
            _ => false,
        }
    }

    fn target_uses(&self, inst: InstId) -> SmallVec<[UseId; 2]> {
        self.operands(inst)
            .iter()
            .copied()
            .filter(|&u| self.is_cfg_target(inst, self.use_slot(u)))
            .collect()
    }

    /// Every branch target of `inst`, in operand order, repeats included.
    /// Empty for non-terminators, `ret` and `unreachable`.
    pub fn terminator_targets(&self, inst: InstId) -> SmallVec<[BlockId; 2]> {
        self.target_uses(inst)
            .into_iter()
            .filter_map(|u| self.as_block(self.use_value(u)))
            .collect()
    }

    fn expect_terminator(&self, inst: InstId) -> Result<(), IrError> {
        if !self.is_live(inst) {
            return Err(IrError::NullOperand {
                what: "terminator",
            });
        }
        if self.is_terminator(inst) {
            Ok(())
        } else {
            Err(IrError::WrongOpcode {
                expected: "terminator",
                found: self.opcode(inst),
            })
        }
    }

    fn expect_switch(&self, inst: InstId) -> Result<(), IrError> {
        if !self.is_live(inst) {
            return Err(IrError::NullOperand { what: "switch" });
        }
        match self.inst_data(inst).kind {
            InstKind::Switch { .. } => Ok(()),
            _ => Err(IrError::WrongOpcode {
                expected: "switch",
                found: self.opcode(inst),
            }),
        }
    }

    fn check_new_target(&self, target: BlockId) -> Result<(), IrError> {
        if self.is_live(target) {
            Ok(())
        } else {
            Err(IrError::NullOperand {
                what: "branch target",
            })
        }
    }

    /// Drop the edges of `inst` that lead to `target`.
    ///
    /// Only a switch can lose targets; every case jumping to `target` is
    /// removed. Branches reject the edit, as does a switch whose default
    /// is `target`. Returns the number of cases removed.
    pub fn remove_target(&mut self, inst: InstId, target: BlockId) -> Result<usize, IrError> {
        self.expect_terminator(inst)?;
        match self.inst_data(inst).kind {
            InstKind::Br | InstKind::CondBr => {
                if self.terminator_targets(inst).contains(&target) {
                    Err(IrError::IllegalTerminator {
                        reason: "branch targets cannot be removed",
                    })
                } else {
                    Ok(0)
                }
            }
            InstKind::Switch { .. } => {
                if self.switch_default(inst) == Some(target) {
                    return Err(IrError::IllegalTerminator {
                        reason: "the default target of a switch cannot be removed",
                    });
                }
                let mut removed = 0;
                let mut case = 0;
                while let Some(dest) = self.case_target(inst, case) {
                    if dest == target {
                        self.remove_case_at(inst, case);
                        removed += 1;
                    } else {
                        case += 1;
                    }
                }
                Ok(removed)
            }
            _ => Ok(0),
        }
    }

    /// Point every edge of `inst` that leads to `old` at `new`.
    pub fn replace_target(
        &mut self,
        inst: InstId,
        old: BlockId,
        new: BlockId,
    ) -> Result<usize, IrError> {
        self.expect_terminator(inst)?;
        self.check_new_target(new)?;
        let hits: SmallVec<[UseId; 2]> = self
            .target_uses(inst)
            .into_iter()
            .filter(|&u| self.use_value(u) == old.value())
            .collect();
        for &u in &hits {
            self.set_use(u, Some(new.value()))?;
        }
        Ok(hits.len())
    }

    /// Point the first edge of `inst` that leads to `old` at `new`.
    pub fn replace_target_once(
        &mut self,
        inst: InstId,
        old: BlockId,
        new: BlockId,
    ) -> Result<bool, IrError> {
        self.expect_terminator(inst)?;
        self.check_new_target(new)?;
        let hit = self
            .target_uses(inst)
            .into_iter()
            .find(|&u| self.use_value(u) == old.value());
        match hit {
            Some(u) => {
                self.set_use(u, Some(new.value()))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drop every removable target: all cases of a switch. Branches
    /// reject the edit; `ret` and `unreachable` have nothing to drop.
    pub fn clear_targets(&mut self, inst: InstId) -> Result<usize, IrError> {
        self.expect_terminator(inst)?;
        match self.inst_data(inst).kind {
            InstKind::Br | InstKind::CondBr => Err(IrError::IllegalTerminator {
                reason: "branch targets cannot be removed",
            }),
            InstKind::Switch { .. } => {
                let count = self.switch_cases(inst).len();
                for case in (0..count).rev() {
                    self.remove_case_at(inst, case);
                }
                Ok(count)
            }
            _ => Ok(0),
        }
    }

    // ── Switch cases ────────────────────────────────────────────────

    /// Add `value => target` to a switch. Case values must be distinct and
    /// representable in the condition type.
    pub fn add_case(&mut self, switch: InstId, value: i64, target: BlockId) -> Result<(), IrError> {
        self.expect_switch(switch)?;
        self.check_new_target(target)?;
        if let InstKind::Switch { cases } = &self.inst_data(switch).kind {
            if cases.contains(&value) {
                return Err(IrError::IllegalTerminator {
                    reason: "duplicate switch case value",
                });
            }
        }
        if let Some(cond) = self.operand(switch, 0) {
            let ty = self.type_of(cond);
            let bits = self.types.int_bits(ty).unwrap_or(64);
            if !fits(value, bits, self.types.is_signed(ty)) {
                return Err(IrError::TypeMismatch {
                    ty,
                    reason: "case value does not fit the condition type",
                });
            }
        }
        let index = match &mut self.inst_data_mut(switch).kind {
            InstKind::Switch { cases } => {
                cases.push(value);
                cases.len() - 1
            }
            _ => unreachable!("checked above"),
        };
        self.add_operand(switch.value(), indexed(index), target.value());
        if let Some(block) = self.parent_block(switch) {
            self.cfg_link(block, target);
        }
        Ok(())
    }

    fn remove_case_at(&mut self, switch: InstId, case: usize) {
        if let Some(block) = self.parent_block(switch) {
            if let Some(target) = self.case_target(switch, case) {
                self.cfg_unlink(block, target);
            }
        }
        if let InstKind::Switch { cases } = &mut self.inst_data_mut(switch).kind {
            cases.remove(case);
        }
        self.remove_operand_at(switch.value(), FIRST_CASE + case);
    }

    fn case_target(&self, switch: InstId, case: usize) -> Option<BlockId> {
        self.as_block(self.operand(switch, FIRST_CASE + case)?)
    }

    /// `(value, target)` pairs of a switch, in case order.
    pub fn switch_cases(&self, switch: InstId) -> Vec<(i64, BlockId)> {
        match &self.inst_data(switch).kind {
            InstKind::Switch { cases } => cases
                .iter()
                .enumerate()
                .filter_map(|(i, &v)| Some((v, self.case_target(switch, i)?)))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn switch_default(&self, switch: InstId) -> Option<BlockId> {
        match self.inst_data(switch).kind {
            InstKind::Switch { .. } => self.as_block(self.operand(switch, 1)?),
            _ => None,
        }
    }
}

/// Whether `value` is representable in an integer of `bits` width.
fn fits(value: i64, bits: u32, signed: bool) -> bool {
    if bits == 0 {
        return value == 0;
    }
    if bits >= 64 {
        return signed || value >= 0;
    }
    if signed {
        let half = 1i64 << (bits - 1);
        (-half..half).contains(&value)
    } else {
        value >= 0 && value < (1i64 << bits)
    }
}
