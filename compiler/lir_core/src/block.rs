//! Basic blocks: instruction sequencing and CFG bookkeeping.
//!
//! A block's instructions form a doubly linked list threaded through the
//! instruction payloads (`prev`/`next` ids), with `first`/`last` stored on
//! the block. Every non-empty block ends in exactly one terminator:
//!
//! - an empty block only accepts a terminator;
//! - a non-empty block only accepts non-terminators, placed before its
//!   terminator; the terminator itself is swapped with
//!   [`set_terminator`](Module::set_terminator);
//! - the terminator cannot be removed on its own.
//!
//! `jumps_to` / `comes_from` count terminator edges per neighbouring block.
//! They change whenever a connected terminator gains, loses or retargets a
//! block operand, so `jumps_to[b]` always equals the number of target
//! operands pointing at `b`, repeated switch cases included.

use lir_types::Ty;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::IrError;
use crate::instr::{ConnectStatus, InstKind, InstParent};
use crate::module::Module;
use crate::value::{BlockId, FuncId, InstId, ValueKind};

/// Basic block payload.
#[derive(Default)]
pub struct BlockData {
    pub(crate) parent: Option<FuncId>,
    pub(crate) first: Option<InstId>,
    pub(crate) last: Option<InstId>,
    pub(crate) len: u32,
    pub(crate) jumps_to: FxHashMap<BlockId, u32>,
    pub(crate) comes_from: FxHashMap<BlockId, u32>,
}

/// Iterator over a block's instructions, front to back.
pub struct Instructions<'m> {
    module: &'m Module,
    next: Option<InstId>,
}

impl Iterator for Instructions<'_> {
    type Item = InstId;

    fn next(&mut self) -> Option<InstId> {
        let current = self.next?;
        self.next = self.module.inst_data(current).next;
        Some(current)
    }
}

/// Where a checked insertion lands.
#[derive(Clone, Copy)]
enum Position {
    Back,
    Front,
    Before(InstId),
    After(InstId),
}

impl Module {
    /// Create a detached, empty block. The caller holds its owning handle
    /// until the block is attached to a function.
    pub fn create_block(&mut self) -> BlockId {
        let value = self.alloc_value(Ty::LABEL, ValueKind::Block(BlockData::default()));
        BlockId::from_value(value)
    }

    // ── Insertion ───────────────────────────────────────────────────

    /// Append `inst`. On a non-empty block the instruction lands just
    /// before the terminator.
    pub fn push_back(&mut self, block: BlockId, inst: InstId) -> Result<(), IrError> {
        self.insert_checked(block, inst, Position::Back)
    }

    pub fn push_front(&mut self, block: BlockId, inst: InstId) -> Result<(), IrError> {
        self.insert_checked(block, inst, Position::Front)
    }

    pub fn insert_before(&mut self, anchor: InstId, inst: InstId) -> Result<(), IrError> {
        let block = self.anchor_block(anchor)?;
        self.insert_checked(block, inst, Position::Before(anchor))
    }

    /// Insert after `anchor`, which must not be the terminator.
    pub fn insert_after(&mut self, anchor: InstId, inst: InstId) -> Result<(), IrError> {
        let block = self.anchor_block(anchor)?;
        self.insert_checked(block, inst, Position::After(anchor))
    }

    fn anchor_block(&self, anchor: InstId) -> Result<BlockId, IrError> {
        if !self.is_live(anchor) {
            return Err(IrError::NullOperand {
                what: "anchor instruction",
            });
        }
        self.expect_status(anchor, ConnectStatus::Connected)?;
        self.parent_block(anchor).ok_or(IrError::NullOperand {
            what: "anchor block",
        })
    }

    fn check_candidate(&self, block: BlockId, inst: InstId) -> Result<(), IrError> {
        if !self.is_live(block) {
            return Err(IrError::NullOperand { what: "block" });
        }
        if !self.is_live(inst) {
            return Err(IrError::NullOperand {
                what: "instruction",
            });
        }
        self.expect_status(inst, ConnectStatus::Disconnected)
    }

    fn insert_checked(
        &mut self,
        block: BlockId,
        inst: InstId,
        position: Position,
    ) -> Result<(), IrError> {
        self.check_candidate(block, inst)?;
        let is_term = self.is_terminator(inst);
        let (prev, next) = match self.block_data(block).last {
            None => {
                if !is_term {
                    return Err(IrError::IllegalTerminator {
                        reason: "an empty block must receive its terminator first",
                    });
                }
                self.check_ret(block, inst)?;
                (None, None)
            }
            Some(last) => {
                if is_term {
                    return Err(IrError::IllegalTerminator {
                        reason: "block already has a terminator; use set_terminator",
                    });
                }
                match position {
                    Position::Back => (self.inst_data(last).prev, Some(last)),
                    Position::Front => (None, self.block_data(block).first),
                    Position::Before(anchor) => (self.inst_data(anchor).prev, Some(anchor)),
                    Position::After(anchor) => {
                        if anchor == last {
                            return Err(IrError::IllegalTerminator {
                                reason: "cannot place an instruction after the terminator",
                            });
                        }
                        (Some(anchor), self.inst_data(anchor).next)
                    }
                }
            }
        };
        self.link(block, inst, prev, next);
        self.on_attach(block, inst);
        Ok(())
    }

    /// Splice `inst` between `prev` and `next` and mark it connected.
    pub(crate) fn link(
        &mut self,
        block: BlockId,
        inst: InstId,
        prev: Option<InstId>,
        next: Option<InstId>,
    ) {
        {
            let data = self.inst_data_mut(inst);
            data.prev = prev;
            data.next = next;
            data.parent = Some(InstParent::Block(block));
            data.status = ConnectStatus::Connected;
        }
        match prev {
            Some(p) => self.inst_data_mut(p).next = Some(inst),
            None => self.block_data_mut(block).first = Some(inst),
        }
        match next {
            Some(n) => self.inst_data_mut(n).prev = Some(inst),
            None => self.block_data_mut(block).last = Some(inst),
        }
        self.block_data_mut(block).len += 1;
        tracing::trace!(inst = %self.describe(inst.value()), "instruction attached");
    }

    /// Take `inst` out of its block's list and mark it disconnected.
    pub(crate) fn unlink(&mut self, inst: InstId) {
        let Some(block) = self.parent_block(inst) else {
            return;
        };
        let (prev, next) = {
            let data = self.inst_data_mut(inst);
            let links = (data.prev.take(), data.next.take());
            data.parent = None;
            data.status = ConnectStatus::Disconnected;
            links
        };
        match prev {
            Some(p) => self.inst_data_mut(p).next = next,
            None => self.block_data_mut(block).first = next,
        }
        match next {
            Some(n) => self.inst_data_mut(n).prev = prev,
            None => self.block_data_mut(block).last = prev,
        }
        self.block_data_mut(block).len -= 1;
    }

    /// Hook run once `inst` is connected to `block`.
    fn on_attach(&mut self, block: BlockId, inst: InstId) {
        for target in self.terminator_targets(inst) {
            self.cfg_link(block, target);
        }
    }

    /// Hook run just before `inst` leaves `block`.
    pub(crate) fn on_detach(&mut self, block: BlockId, inst: InstId) {
        for target in self.terminator_targets(inst) {
            self.cfg_unlink(block, target);
        }
    }

    /// A `ret` must agree with the return type of the function that will
    /// own it.
    fn check_ret(&self, block: BlockId, inst: InstId) -> Result<(), IrError> {
        match self.block_data(block).parent {
            Some(func) => self.check_ret_in(func, inst),
            None => Ok(()),
        }
    }

    pub(crate) fn check_ret_in(&self, func: FuncId, inst: InstId) -> Result<(), IrError> {
        if !matches!(self.inst_data(inst).kind, InstKind::Ret) {
            return Ok(());
        }
        let expected = self.return_type(func);
        match self.operand(inst, 0) {
            Some(value) => {
                let ty = self.type_of(value);
                if self.types.equal(ty, expected) {
                    Ok(())
                } else {
                    Err(IrError::TypeMismatch {
                        ty,
                        reason: "return value does not match the function's return type",
                    })
                }
            }
            None if self.types.is_void(expected) => Ok(()),
            None => Err(IrError::TypeMismatch {
                ty: expected,
                reason: "missing return value",
            }),
        }
    }

    // ── Removal and terminator swap ─────────────────────────────────

    /// Disconnect a non-terminator. Its owning handle passes back to the
    /// caller.
    pub fn remove(&mut self, inst: InstId) -> Result<(), IrError> {
        if !self.is_live(inst) {
            return Err(IrError::NullOperand {
                what: "instruction",
            });
        }
        self.expect_status(inst, ConnectStatus::Connected)?;
        if self.is_terminator(inst) {
            return Err(IrError::IllegalTerminator {
                reason: "the terminator cannot be removed; use set_terminator",
            });
        }
        self.unlink(inst);
        tracing::trace!(inst = %self.describe(inst.value()), "instruction removed");
        Ok(())
    }

    /// Install `term` as the block's terminator, returning the one it
    /// replaces, now disconnected and owned by the caller.
    pub fn set_terminator(
        &mut self,
        block: BlockId,
        term: InstId,
    ) -> Result<Option<InstId>, IrError> {
        self.check_candidate(block, term)?;
        if !self.is_terminator(term) {
            let found = self.opcode(term);
            return Err(IrError::WrongOpcode {
                expected: "terminator",
                found,
            });
        }
        self.check_ret(block, term)?;
        let old = self.terminator(block);
        if let Some(old) = old {
            self.on_detach(block, old);
            self.unlink(old);
        }
        let prev = self.block_data(block).last;
        self.link(block, term, prev, None);
        self.on_attach(block, term);
        Ok(old)
    }

    // ── CFG caches ──────────────────────────────────────────────────

    pub(crate) fn cfg_link(&mut self, from: BlockId, to: BlockId) {
        *self.block_data_mut(from).jumps_to.entry(to).or_insert(0) += 1;
        *self.block_data_mut(to).comes_from.entry(from).or_insert(0) += 1;
    }

    pub(crate) fn cfg_unlink(&mut self, from: BlockId, to: BlockId) {
        decrement(&mut self.block_data_mut(from).jumps_to, to);
        decrement(&mut self.block_data_mut(to).comes_from, from);
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn instructions(&self, block: BlockId) -> Instructions<'_> {
        Instructions {
            module: self,
            next: self.block_data(block).first,
        }
    }

    pub fn first_inst(&self, block: BlockId) -> Option<InstId> {
        self.block_data(block).first
    }

    pub fn last_inst(&self, block: BlockId) -> Option<InstId> {
        self.block_data(block).last
    }

    /// The block's terminator; `None` only for an empty block.
    pub fn terminator(&self, block: BlockId) -> Option<InstId> {
        self.block_data(block)
            .last
            .filter(|&last| self.is_terminator(last))
    }

    pub fn block_len(&self, block: BlockId) -> usize {
        self.block_data(block).len as usize
    }

    pub fn is_block_empty(&self, block: BlockId) -> bool {
        self.block_data(block).first.is_none()
    }

    pub fn block_parent(&self, block: BlockId) -> Option<FuncId> {
        self.block_data(block).parent
    }

    /// Outgoing edge counts.
    pub fn jumps_to(&self, block: BlockId) -> &FxHashMap<BlockId, u32> {
        &self.block_data(block).jumps_to
    }

    /// Incoming edge counts.
    pub fn comes_from(&self, block: BlockId) -> &FxHashMap<BlockId, u32> {
        &self.block_data(block).comes_from
    }

    /// Number of terminator edges from `from` to `to`.
    pub fn edge_count(&self, from: BlockId, to: BlockId) -> u32 {
        self.block_data(from)
            .jumps_to
            .get(&to)
            .copied()
            .unwrap_or(0)
    }

    /// Distinct successors, in terminator operand order.
    pub fn successors(&self, block: BlockId) -> SmallVec<[BlockId; 2]> {
        let mut out: SmallVec<[BlockId; 2]> = SmallVec::new();
        if let Some(term) = self.terminator(block) {
            for target in self.terminator_targets(term) {
                if !out.contains(&target) {
                    out.push(target);
                }
            }
        }
        out
    }

    /// Distinct predecessors, in handle order.
    pub fn predecessors(&self, block: BlockId) -> Vec<BlockId> {
        let mut out: Vec<BlockId> = self.block_data(block).comes_from.keys().copied().collect();
        out.sort_unstable();
        out
    }

    /// Block that ultimately contains `inst`, following register-write
    /// nesting outward.
    pub fn enclosing_block(&self, inst: InstId) -> Option<BlockId> {
        let mut current = inst;
        loop {
            match self.inst_data(current).parent? {
                InstParent::Block(block) => return Some(block),
                InstParent::Inst(outer) => current = outer,
            }
        }
    }

    // ── Splitting ───────────────────────────────────────────────────

    /// Split the block containing `at` in two.
    ///
    /// `at` and everything after it move into a new block placed right
    /// after the original, which now ends in `br` to the new block. Edges
    /// leaving the old terminator move with it; predecessors of the
    /// original block are untouched. PHI keys in successors still name the
    /// original block.
    ///
    /// A block outside any function splits into a detached block whose
    /// owning handle goes to the caller.
    pub fn split_block(&mut self, at: InstId) -> Result<BlockId, IrError> {
        if !self.is_live(at) {
            return Err(IrError::NullOperand {
                what: "split point",
            });
        }
        self.expect_status(at, ConnectStatus::Connected)?;
        let block = self.parent_block(at).ok_or(IrError::NullOperand {
            what: "split block",
        })?;

        let tail = self.create_block();
        let jump = self.build_br(tail)?;

        let old_last = self.block_data(block).last;
        if let Some(term) = self.terminator(block) {
            self.on_detach(block, term);
        }

        // Cut the list in front of `at`.
        let head_last = self.inst_data(at).prev;
        self.inst_data_mut(at).prev = None;
        match head_last {
            Some(p) => self.inst_data_mut(p).next = None,
            None => self.block_data_mut(block).first = None,
        }
        self.block_data_mut(block).last = head_last;

        let mut moved = 0u32;
        let mut cursor = Some(at);
        while let Some(inst) = cursor {
            self.inst_data_mut(inst).parent = Some(InstParent::Block(tail));
            cursor = self.inst_data(inst).next;
            moved += 1;
        }
        {
            let data = self.block_data_mut(tail);
            data.first = Some(at);
            data.last = old_last;
            data.len = moved;
        }
        self.block_data_mut(block).len -= moved;

        if let Some(term) = self.terminator(tail) {
            self.on_attach(tail, term);
        }
        let head_tail = self.block_data(block).last;
        self.link(block, jump, head_tail, None);
        self.on_attach(block, jump);

        if let Some(func) = self.block_data(block).parent {
            self.place_block_after(func, block, tail);
        }
        tracing::debug!(
            block = %self.describe(block.value()),
            moved,
            "block split"
        );
        self.after_edit("split_block", self.block_data(block).parent);
        Ok(tail)
    }
}

fn decrement(map: &mut FxHashMap<BlockId, u32>, key: BlockId) {
    if let Some(count) = map.get_mut(&key) {
        *count -= 1;
        if *count == 0 {
            map.remove(&key);
        }
    }
}
