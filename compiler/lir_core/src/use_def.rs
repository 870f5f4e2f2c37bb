//! Def-use edges.
//!
//! Every operand is a [`UseId`] edge stored twice: in the user's ordered
//! `operands` list and in the target's `used_by` list. All edge edits go
//! through this module, which keeps both sides in step and moves the
//! owning handle of constant targets along with the edge.

use crate::error::IrError;
use crate::instr::ConnectStatus;
use crate::module::Module;
use crate::value::{OperandSlot, UseData, UseId, ValueId, ValueKind};

impl Module {
    /// Check that `value` can be wired as an operand.
    ///
    /// Stale handles and finalized instructions both count as absent.
    pub(crate) fn resolve(&self, value: ValueId, what: &'static str) -> Result<ValueId, IrError> {
        let Some(data) = self.values.get(value.0) else {
            return Err(IrError::NullOperand { what });
        };
        if let ValueKind::Instruction(inst) = &data.kind {
            if inst.status == ConnectStatus::Finalized {
                return Err(IrError::NullOperand { what });
            }
        }
        Ok(value)
    }

    /// Append an operand edge. Callers validate first.
    pub(crate) fn add_operand(&mut self, user: ValueId, slot: OperandSlot, value: ValueId) -> UseId {
        let id = UseId(self.uses.alloc(UseData { user, value, slot }));
        self.data_mut(user).operands.push(id);
        self.data_mut(value).used_by.push(id);
        if self.constant(value).is_some() {
            self.retain_owned(value);
        }
        id
    }

    /// Detach an edge from its target and free it. The user's operand
    /// list is the caller's business.
    fn unlink_use(&mut self, id: UseId) {
        let Some(use_data) = self.uses.take(id.0) else {
            return;
        };
        let target = use_data.value;
        let used_by = &mut self.data_mut(target).used_by;
        if let Some(pos) = used_by.iter().position(|&u| u == id) {
            used_by.swap_remove(pos);
        }
        if self.constant(target).is_some() {
            self.release_owned(target);
        }
    }

    /// Remove the operand at `index`, renumbering later indexed slots.
    pub(crate) fn remove_operand_at(&mut self, user: ValueId, index: usize) {
        let id = self.data_mut(user).operands.remove(index);
        let removed = self.uses[id.0].slot;
        self.unlink_use(id);
        if let OperandSlot::Indexed(gap) = removed {
            for &later in &self.values[user.0].operands[index..] {
                if let OperandSlot::Indexed(i) = &mut self.uses[later.0].slot {
                    if *i > gap {
                        *i -= 1;
                    }
                }
            }
        }
    }

    /// Drop every operand edge of `user`.
    pub(crate) fn clear_operands(&mut self, user: ValueId) {
        let operands = std::mem::take(&mut self.data_mut(user).operands);
        for id in operands {
            self.unlink_use(id);
        }
    }

    /// Rebind one edge.
    ///
    /// The new value must have a type `equal` to the old one, and block
    /// operands only accept blocks. Writing `None` removes the edge, which
    /// only keyed slots allow. Target changes on a connected terminator
    /// update the CFG caches.
    pub fn set_use(&mut self, id: UseId, value: Option<ValueId>) -> Result<(), IrError> {
        let Some(&UseData { user, value: old, slot }) = self.uses.get(id.0) else {
            return Err(IrError::NullOperand { what: "use" });
        };
        let Some(new) = value else {
            if !matches!(slot, OperandSlot::Keyed(_)) {
                return Err(IrError::NullOperand { what: "operand" });
            }
            let index = self.operand_index(user, id);
            self.remove_operand_at(user, index);
            return Ok(());
        };
        self.check_replacement(old, new)?;
        if new == old {
            return Ok(());
        }
        self.rebind_use(id, new);
        Ok(())
    }

    fn check_replacement(&self, old: ValueId, new: ValueId) -> Result<(), IrError> {
        self.resolve(new, "replacement value")?;
        let new_ty = self.type_of(new);
        if self.as_block(old).is_some() && self.as_block(new).is_none() {
            return Err(IrError::TypeMismatch {
                ty: new_ty,
                reason: "block operands only accept blocks",
            });
        }
        if !self.types.equal(self.type_of(old), new_ty) {
            return Err(IrError::TypeMismatch {
                ty: new_ty,
                reason: "replacement type differs from the operand type",
            });
        }
        Ok(())
    }

    /// Move a validated edge to `new`.
    pub(crate) fn rebind_use(&mut self, id: UseId, new: ValueId) {
        let UseData { user, value: old, slot } = self.uses[id.0];
        let used_by = &mut self.data_mut(old).used_by;
        if let Some(pos) = used_by.iter().position(|&u| u == id) {
            used_by.swap_remove(pos);
        }
        self.data_mut(new).used_by.push(id);
        self.uses[id.0].value = new;
        if self.constant(new).is_some() {
            self.retain_owned(new);
        }
        if let Some(inst) = self.as_inst(user) {
            if self.is_cfg_target(inst, slot) {
                if let (Some(from), Some(to)) = (self.parent_block(inst), self.as_block(new)) {
                    if let Some(prev) = self.as_block(old) {
                        self.cfg_unlink(from, prev);
                    }
                    self.cfg_link(from, to);
                }
            }
        }
        if self.constant(old).is_some() {
            self.release_owned(old);
        }
        tracing::trace!(user = %self.describe(user), "operand rebound");
    }

    /// Rebind every operand of `user` that currently reads `pattern`.
    /// Returns the number of edges touched.
    pub fn replace_all_usee(
        &mut self,
        user: impl Into<ValueId>,
        pattern: ValueId,
        replacement: ValueId,
    ) -> Result<usize, IrError> {
        let user = self.resolve(user.into(), "user")?;
        let hits: Vec<UseId> = self
            .data(user)
            .operands
            .iter()
            .copied()
            .filter(|u| self.uses[u.0].value == pattern)
            .collect();
        if hits.is_empty() || pattern == replacement {
            return Ok(0);
        }
        self.check_replacement(pattern, replacement)?;
        for &id in &hits {
            self.rebind_use(id, replacement);
        }
        Ok(hits.len())
    }

    /// Rebind every use of `value` to `replacement`.
    pub fn replace_all_uses_with(
        &mut self,
        value: impl Into<ValueId>,
        replacement: impl Into<ValueId>,
    ) -> Result<usize, IrError> {
        let value = self.resolve(value.into(), "replaced value")?;
        let replacement = replacement.into();
        if value == replacement {
            return Ok(0);
        }
        self.check_replacement(value, replacement)?;
        let hits = self.data(value).used_by.clone();
        for &id in &hits {
            self.rebind_use(id, replacement);
        }
        Ok(hits.len())
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Operand edges of `user`, in operand order.
    pub fn operands(&self, user: impl Into<ValueId>) -> &[UseId] {
        &self.data(user.into()).operands
    }

    /// Value read by the `index`-th operand.
    pub fn operand(&self, user: impl Into<ValueId>, index: usize) -> Option<ValueId> {
        let id = *self.data(user.into()).operands.get(index)?;
        Some(self.uses[id.0].value)
    }

    pub(crate) fn operand_values(&self, user: ValueId) -> Vec<ValueId> {
        self.data(user)
            .operands
            .iter()
            .map(|u| self.uses[u.0].value)
            .collect()
    }

    pub(crate) fn operand_index(&self, user: ValueId, id: UseId) -> usize {
        self.data(user)
            .operands
            .iter()
            .position(|&u| u == id)
            .unwrap_or_else(|| unreachable!("use is not listed by its user"))
    }

    /// Edges that read `value`.
    pub fn used_by(&self, value: impl Into<ValueId>) -> &[UseId] {
        &self.data(value.into()).used_by
    }

    pub fn has_users(&self, value: impl Into<ValueId>) -> bool {
        !self.data(value.into()).used_by.is_empty()
    }

    /// Distinct users of `value`, in first-use order.
    pub fn users(&self, value: impl Into<ValueId>) -> Vec<ValueId> {
        let mut out: Vec<ValueId> = Vec::new();
        for u in &self.data(value.into()).used_by {
            let user = self.uses[u.0].user;
            if !out.contains(&user) {
                out.push(user);
            }
        }
        out
    }

    pub fn is_use_live(&self, id: UseId) -> bool {
        self.uses.contains(id.0)
    }

    pub fn use_value(&self, id: UseId) -> ValueId {
        self.uses[id.0].value
    }

    pub fn use_user(&self, id: UseId) -> ValueId {
        self.uses[id.0].user
    }

    pub fn use_slot(&self, id: UseId) -> OperandSlot {
        self.uses[id.0].slot
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for concise assertions")]
mod tests;
