//! Owning handles, finalization and erasure.
//!
//! A node dies when its last owning handle is released. Before the slot
//! is vacated every edge the node owns is torn down (operands, nested
//! instructions, a block's instructions, a function's body), and the
//! node must have no users left: destroying a used node is graph
//! corruption.
//!
//! Structurally attached nodes are owned by their parent, so releasing
//! their last handle from outside is corruption as well. They leave the
//! graph through the `erase_*` family, which detaches and finalizes first.

use crate::error::{graph_corruption, IrError};
use crate::instr::{ConnectStatus, InstKind, InstParent};
use crate::module::Module;
use crate::ownership::Released;
use crate::value::{BlockId, FuncId, GlobalId, InstId, ValueId, ValueKind};

impl Module {
    // ── Handles ─────────────────────────────────────────────────────

    /// Copy an owning handle. Returns the new count.
    pub fn retain(&mut self, value: impl Into<ValueId>) -> Result<u32, IrError> {
        self.values
            .retain(value.into().0)
            .map_err(|_| IrError::NullOperand { what: "handle" })
    }

    /// Give up an owning handle. Returns the remaining count; at zero the
    /// node has been destroyed.
    pub fn release(&mut self, value: impl Into<ValueId>) -> Result<u32, IrError> {
        let value = value.into();
        let Some(count) = self.values.strong_count(value.0) else {
            return Err(IrError::NullOperand { what: "handle" });
        };
        if count == 1 && self.is_structurally_owned(value) {
            graph_corruption(
                &format!(
                    "released the owning handle of attached {}",
                    self.describe(value)
                ),
                &[],
            );
        }
        self.release_owned(value);
        Ok(count - 1)
    }

    pub(crate) fn retain_owned(&mut self, value: ValueId) {
        if self.values.retain(value.0).is_err() {
            graph_corruption("retained a stale owning handle", &[]);
        }
    }

    /// Release a handle held by the graph itself.
    pub(crate) fn release_owned(&mut self, value: ValueId) {
        if self.values.strong_count(value.0) == Some(1) {
            self.prepare_free(value);
        }
        match self.values.release(value.0) {
            Ok(Released::Alive(_)) => {}
            Ok(Released::Freed(data)) => {
                tracing::trace!(category = ?data.kind.category(), "value freed");
            }
            Err(_) => graph_corruption("released a stale owning handle", &[]),
        }
    }

    fn is_structurally_owned(&self, value: ValueId) -> bool {
        match &self.data(value).kind {
            ValueKind::Constant(_) => false,
            ValueKind::Instruction(inst) => matches!(
                inst.status,
                ConnectStatus::Connected | ConnectStatus::Reparent
            ),
            ValueKind::Block(block) => block.parent.is_some(),
            ValueKind::Function(_) | ValueKind::Global(_) => {
                self.symbols.values().any(|&v| v == value)
            }
            ValueKind::Argument(arg) => self.is_live(arg.parent),
            ValueKind::Register(reg) => self.is_live(reg.parent),
        }
    }

    /// Tear down everything `value` owns ahead of freeing it. Edges from
    /// the node's own contents back to it are gone once the teardown is
    /// done, so only outside users are left to trip the check.
    fn prepare_free(&mut self, value: ValueId) {
        if let Some(inst) = self.as_inst(value) {
            self.finalize_inst(inst);
        } else if let Some(block) = self.as_block(value) {
            let insts: Vec<InstId> = self.instructions(block).collect();
            self.drop_instructions(&insts);
        } else if let Some(func) = self.as_func(value) {
            self.drop_body(func);
        } else if self.as_global(value).is_some() {
            self.clear_operands(value);
        }
        self.check_unused(value);
    }

    fn check_unused(&self, value: ValueId) {
        self.check_users_within(value, |_| false);
    }

    /// Corruption unless every user of `value` is an instruction accepted
    /// by `inside`. Users that are not instructions always count as
    /// outside.
    fn check_users_within(&self, value: ValueId, inside: impl Fn(InstId) -> bool) {
        let outside: Vec<String> = self
            .data(value)
            .used_by
            .iter()
            .map(|&u| self.use_user(u))
            .filter(|&user| !self.as_inst(user).is_some_and(&inside))
            .map(|user| self.describe(user))
            .collect();
        if !outside.is_empty() {
            graph_corruption(&format!("destroyed {}", self.describe(value)), &outside);
        }
    }

    /// Whether `inst` is `outer` or sits nested under it.
    fn nested_in(&self, mut inst: InstId, outer: InstId) -> bool {
        loop {
            if inst == outer {
                return true;
            }
            match self.nesting_parent(inst) {
                Some(parent) => inst = parent,
                None => return false,
            }
        }
    }

    // ── Instructions ────────────────────────────────────────────────

    /// Tear down a disconnected instruction: its operand edges go, and any
    /// instruction nested under it is destroyed with it. The node stays
    /// allocated until its last handle is released.
    pub fn finalize(&mut self, inst: InstId) -> Result<(), IrError> {
        if !self.is_live(inst) {
            return Err(IrError::NullOperand {
                what: "instruction",
            });
        }
        self.expect_status(inst, ConnectStatus::Disconnected)?;
        self.finalize_inst(inst);
        Ok(())
    }

    /// Forced finalize, valid in any status.
    pub(crate) fn finalize_inst(&mut self, inst: InstId) {
        let status = self.inst_data(inst).status;
        if status == ConnectStatus::Finalized {
            return;
        }
        if status == ConnectStatus::Connected {
            if let Some(block) = self.parent_block(inst) {
                self.on_detach(block, inst);
            }
            self.unlink(inst);
        }
        let nested: Vec<InstId> = self
            .operand_values(inst.value())
            .into_iter()
            .filter_map(|v| self.as_inst(v))
            .filter(|&v| self.inst_data(v).parent == Some(InstParent::Inst(inst)))
            .collect();
        self.clear_operands(inst.value());
        for inner in nested {
            self.finalize_inst(inner);
            self.release_owned(inner.value());
        }
        let data = self.inst_data_mut(inst);
        data.status = ConnectStatus::Finalized;
        data.parent = None;
        data.prev = None;
        data.next = None;
    }

    /// Finalize a batch, then release the owning handles. Edges between
    /// members of the batch are gone before any member is destroyed.
    fn drop_instructions(&mut self, insts: &[InstId]) {
        for &inst in insts {
            self.finalize_inst(inst);
        }
        for &inst in insts {
            self.release_owned(inst.value());
        }
    }

    /// Detach, finalize and release a non-terminator, or a disconnected
    /// instruction the caller owns.
    pub fn erase_instruction(&mut self, inst: InstId) -> Result<(), IrError> {
        if !self.is_live(inst) {
            return Err(IrError::NullOperand {
                what: "instruction",
            });
        }
        match self.status(inst) {
            ConnectStatus::Connected if self.is_terminator(inst) => {
                return Err(IrError::IllegalTerminator {
                    reason: "the terminator cannot be erased on its own",
                });
            }
            found @ ConnectStatus::Reparent => {
                return Err(IrError::InvalidStatus {
                    expected: ConnectStatus::Disconnected,
                    found,
                });
            }
            _ => {}
        }
        self.check_users_within(inst.value(), |user| self.nested_in(user, inst));
        tracing::trace!(inst = %self.describe(inst.value()), "instruction erased");
        self.finalize_inst(inst);
        self.release_owned(inst.value());
        Ok(())
    }

    // ── Blocks ──────────────────────────────────────────────────────

    /// Destroy a block with all its instructions.
    ///
    /// PHI entries keyed by the block are dropped from its successors and
    /// from every block of its function first. After that nothing outside
    /// the block may still use the block or its instructions; a branch
    /// back to itself is fine.
    pub fn erase_block(&mut self, block: BlockId) -> Result<(), IrError> {
        if !self.is_live(block) {
            return Err(IrError::NullOperand { what: "block" });
        }
        self.check_users_inside(block.value(), &[block]);
        let parent = self.block_parent(block);
        let mut keyed = self.successors(block);
        if let Some(func) = parent {
            keyed.extend(self.blocks(func).iter().copied().filter(|&b| b != block));
        }
        keyed.sort_unstable();
        keyed.dedup();
        for holder in keyed {
            self.drop_incoming_from(holder, block);
        }
        let insts: Vec<InstId> = self.instructions(block).collect();
        for &inst in &insts {
            self.check_users_inside(inst.value(), &[block]);
        }
        self.drop_instructions(&insts);
        if let Some(func) = parent {
            self.detach_block(func, block);
        }
        tracing::debug!(block = %self.describe(block.value()), "block erased");
        self.release_owned(block.value());
        self.after_edit("erase_block", parent);
        Ok(())
    }

    /// Corruption unless every user of `value` sits in one of `blocks`.
    fn check_users_inside(&self, value: ValueId, blocks: &[BlockId]) {
        self.check_users_within(value, |user| {
            self.enclosing_block(user)
                .is_some_and(|b| blocks.contains(&b))
        });
    }

    /// Remove every PHI entry of `block` keyed by `pred`.
    pub(crate) fn drop_incoming_from(&mut self, block: BlockId, pred: BlockId) {
        let phis: Vec<InstId> = self
            .instructions(block)
            .filter(|&i| matches!(self.inst_data(i).kind, InstKind::Phi))
            .collect();
        for phi in phis {
            self.drop_incoming(phi, pred);
        }
    }

    // ── Functions and globals ───────────────────────────────────────

    /// Tear down a function body: instructions, blocks, arguments and
    /// registers.
    fn drop_body(&mut self, func: FuncId) {
        let blocks = self.func_data_mut(func).body.take().unwrap_or_default();
        let insts: Vec<InstId> = blocks
            .iter()
            .flat_map(|&b| self.instructions(b).collect::<Vec<_>>())
            .collect();
        self.drop_instructions(&insts);
        for block in blocks {
            self.block_data_mut(block).parent = None;
            self.release_owned(block.value());
        }
        let params = std::mem::take(&mut self.func_data_mut(func).params);
        if let Some(table) = self.func_data_mut(func).registers.take() {
            for reg in table.live {
                self.release_owned(reg.value());
            }
        }
        for param in params {
            self.release_owned(param);
        }
    }

    /// Remove a function from the module and destroy it. Calls to it from
    /// other functions must be gone first; recursive calls go down with
    /// the body.
    pub fn erase_function(&mut self, func: FuncId) -> Result<(), IrError> {
        if !self.is_live(func) {
            return Err(IrError::NullOperand { what: "function" });
        }
        self.check_users_within(func.value(), |user| {
            self.enclosing_block(user)
                .and_then(|b| self.block_parent(b))
                == Some(func)
        });
        self.unregister_symbol(func.value());
        self.functions.retain(|&f| f != func);
        tracing::debug!(func = %self.describe(func.value()), "function erased");
        self.release_owned(func.value());
        Ok(())
    }

    /// Remove a global from the module and destroy it.
    pub fn erase_global(&mut self, global: GlobalId) -> Result<(), IrError> {
        if !self.is_live(global) {
            return Err(IrError::NullOperand { what: "global" });
        }
        self.check_unused(global.value());
        self.unregister_symbol(global.value());
        self.globals.retain(|&g| g != global);
        tracing::debug!(global = %self.describe(global.value()), "global erased");
        self.release_owned(global.value());
        Ok(())
    }

    pub(crate) fn unregister_symbol(&mut self, symbol: ValueId) {
        if let Some(name) = self.data(symbol).name {
            if self.symbols.get(&name) == Some(&symbol) {
                self.symbols.remove(&name);
            }
        }
    }
}
