//! Functions: arguments, block layout, registers and garbage collection.
//!
//! A function without a body is a declaration; appending the first block
//! defines it, and that block is the entry. The function owns its blocks,
//! its arguments and, when register support is enabled, its registers.

use lir_types::Ty;
use rustc_hash::FxHashSet;

use crate::error::{IrError, RegisterError};
use crate::instr::{ConnectStatus, InstKind};
use crate::module::Module;
use crate::value::{ArgumentData, BlockId, FuncId, InstId, RegId, ValueId, ValueKind};

/// Function payload.
pub struct FunctionData {
    pub(crate) fn_ty: Ty,
    pub(crate) params: Vec<ValueId>,
    /// `None` for a declaration.
    pub(crate) body: Option<Vec<BlockId>>,
    pub(crate) registers: Option<RegisterTable>,
}

/// Non-SSA register allocator: a free list over small integer slots.
#[derive(Default)]
pub(crate) struct RegisterTable {
    next: u32,
    free: Vec<u32>,
    pub(crate) live: Vec<RegId>,
}

/// Register payload.
pub struct RegisterData {
    pub(crate) parent: FuncId,
    pub(crate) slot: u32,
}

impl Module {
    pub(crate) fn new_function(&mut self, fn_ty: Ty) -> FuncId {
        let ty = self.types.pointer(fn_ty);
        let data = FunctionData {
            fn_ty,
            params: Vec::new(),
            body: None,
            registers: None,
        };
        let func = FuncId::from_value(self.alloc_value(ty, ValueKind::Function(data)));
        let param_tys: Vec<Ty> = self
            .types
            .fn_signature(fn_ty)
            .map(|sig| sig.params.to_vec())
            .unwrap_or_default();
        let params = param_tys
            .into_iter()
            .zip(0u32..)
            .map(|(ty, index)| {
                let arg = ArgumentData {
                    parent: func,
                    index,
                };
                self.alloc_value(ty, ValueKind::Argument(arg))
            })
            .collect();
        self.func_data_mut(func).params = params;
        func
    }

    // ── Signature ───────────────────────────────────────────────────

    pub fn fn_type(&self, func: FuncId) -> Ty {
        self.func_data(func).fn_ty
    }

    pub fn return_type(&self, func: FuncId) -> Ty {
        self.types
            .fn_signature(self.func_data(func).fn_ty)
            .map_or(Ty::VOID, |sig| sig.ret)
    }

    pub fn is_variadic(&self, func: FuncId) -> bool {
        self.types
            .fn_signature(self.func_data(func).fn_ty)
            .is_some_and(|sig| sig.variadic)
    }

    /// Argument values, in parameter order.
    pub fn params(&self, func: FuncId) -> &[ValueId] {
        &self.func_data(func).params
    }

    pub fn param(&self, func: FuncId, index: usize) -> Option<ValueId> {
        self.func_data(func).params.get(index).copied()
    }

    // ── Layout ──────────────────────────────────────────────────────

    pub fn is_declaration(&self, func: FuncId) -> bool {
        self.func_data(func).body.is_none()
    }

    /// Blocks in layout order; empty for a declaration.
    pub fn blocks(&self, func: FuncId) -> &[BlockId] {
        self.func_data(func).body.as_deref().unwrap_or(&[])
    }

    pub fn entry_block(&self, func: FuncId) -> Option<BlockId> {
        self.blocks(func).first().copied()
    }

    /// Create a block at the end of `func`.
    pub fn add_block(&mut self, func: FuncId) -> Result<BlockId, IrError> {
        let block = self.create_block();
        self.append_block(func, block)?;
        Ok(block)
    }

    /// Attach a detached block at the end of `func`, taking over the
    /// caller's owning handle.
    pub fn append_block(&mut self, func: FuncId, block: BlockId) -> Result<(), IrError> {
        self.check_attachable(func, block)?;
        self.block_data_mut(block).parent = Some(func);
        self.func_data_mut(func)
            .body
            .get_or_insert_with(Vec::new)
            .push(block);
        Ok(())
    }

    /// Attach a detached block right after `anchor`.
    pub fn insert_block_after(
        &mut self,
        anchor: BlockId,
        block: BlockId,
    ) -> Result<(), IrError> {
        let func = self.block_parent(anchor).ok_or(IrError::NullOperand {
            what: "anchor function",
        })?;
        self.check_attachable(func, block)?;
        self.place_block_after(func, anchor, block);
        Ok(())
    }

    fn check_attachable(&self, func: FuncId, block: BlockId) -> Result<(), IrError> {
        if !self.is_live(func) {
            return Err(IrError::NullOperand { what: "function" });
        }
        if !self.is_live(block) {
            return Err(IrError::NullOperand { what: "block" });
        }
        if self.block_parent(block).is_some() {
            return Err(IrError::InvalidStatus {
                expected: ConnectStatus::Disconnected,
                found: ConnectStatus::Connected,
            });
        }
        if let Some(term) = self.terminator(block) {
            self.check_ret_in(func, term)?;
        }
        Ok(())
    }

    pub(crate) fn place_block_after(&mut self, func: FuncId, anchor: BlockId, block: BlockId) {
        self.block_data_mut(block).parent = Some(func);
        let body = self.func_data_mut(func).body.get_or_insert_with(Vec::new);
        let at = body.iter().position(|&b| b == anchor).map_or(body.len(), |p| p + 1);
        body.insert(at, block);
    }

    pub(crate) fn detach_block(&mut self, func: FuncId, block: BlockId) {
        if let Some(body) = self.func_data_mut(func).body.as_mut() {
            body.retain(|&b| b != block);
        }
        self.block_data_mut(block).parent = None;
    }

    // ── Traversal ───────────────────────────────────────────────────

    /// Blocks reachable from the entry, in postorder.
    pub fn postorder(&self, func: FuncId) -> Vec<BlockId> {
        let Some(entry) = self.entry_block(func) else {
            return Vec::new();
        };
        let mut order = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(entry);
        let mut stack = vec![(entry, self.successors(entry).into_iter())];
        while let Some((block, succs)) = stack.last_mut() {
            let block = *block;
            match succs.next() {
                Some(next) => {
                    if seen.insert(next) {
                        let succs = self.successors(next).into_iter();
                        stack.push((next, succs));
                    }
                }
                None => {
                    order.push(block);
                    stack.pop();
                }
            }
        }
        order
    }

    /// Blocks reachable from the entry through `jumps_to` edges and PHI
    /// incoming keys, in layout order.
    pub fn reachable_blocks(&self, func: FuncId) -> Vec<BlockId> {
        let live = self.reachable_set(func);
        self.blocks(func)
            .iter()
            .copied()
            .filter(|b| live.contains(b))
            .collect()
    }

    fn reachable_set(&self, func: FuncId) -> FxHashSet<BlockId> {
        let mut live = FxHashSet::default();
        let Some(entry) = self.entry_block(func) else {
            return live;
        };
        let mut work = vec![entry];
        live.insert(entry);
        while let Some(block) = work.pop() {
            let mut next: Vec<BlockId> = self.block_data(block).jumps_to.keys().copied().collect();
            for inst in self.instructions(block) {
                if matches!(self.inst_data(inst).kind, InstKind::Phi) {
                    next.extend(self.incoming(inst).into_iter().map(|(pred, _)| pred));
                }
            }
            // A PHI key may outlive its block when the block was erased
            // outside any function.
            for b in next.into_iter().filter(|&b| self.is_live(b)) {
                if live.insert(b) {
                    work.push(b);
                }
            }
        }
        live
    }

    // ── Garbage collection ──────────────────────────────────────────

    /// Destroy the blocks of `func` that cannot be reached from its entry.
    ///
    /// Uses of dead values from surviving code are rebound to `undef`, and
    /// PHI entries keyed by dead blocks are dropped. Returns the number of
    /// blocks removed.
    pub fn collect_garbage(&mut self, func: FuncId) -> usize {
        let live = self.reachable_set(func);
        let dead: Vec<BlockId> = self
            .blocks(func)
            .iter()
            .copied()
            .filter(|b| !live.contains(b))
            .collect();
        if dead.is_empty() {
            return 0;
        }
        let dead_insts: Vec<InstId> = dead
            .iter()
            .flat_map(|&b| self.instructions(b).collect::<Vec<_>>())
            .collect();

        for &inst in &dead_insts {
            self.rebind_to_undef(inst, &dead);
        }
        let survivors: Vec<BlockId> = self
            .blocks(func)
            .iter()
            .copied()
            .filter(|b| live.contains(b))
            .collect();
        for &block in &survivors {
            for &gone in &dead {
                self.drop_incoming_from(block, gone);
            }
        }

        for &inst in &dead_insts {
            self.finalize_inst(inst);
        }
        for &inst in &dead_insts {
            self.release_owned(inst.value());
        }
        for &block in &dead {
            self.detach_block(func, block);
            self.release_owned(block.value());
        }
        tracing::debug!(
            func = %self.describe(func.value()),
            removed = dead.len(),
            "garbage collected"
        );
        self.after_edit("collect_garbage", Some(func));
        dead.len()
    }

    /// Point every use of `inst` from outside `dead` at a fresh `undef`.
    fn rebind_to_undef(&mut self, inst: InstId, dead: &[BlockId]) {
        let outside: Vec<_> = self
            .used_by(inst)
            .iter()
            .copied()
            .filter(|&u| {
                let home = self
                    .as_inst(self.use_user(u))
                    .and_then(|i| self.enclosing_block(i));
                !home.is_some_and(|b| dead.contains(&b))
            })
            .collect();
        if outside.is_empty() {
            return;
        }
        let undef = self.undef_unchecked(self.type_of(inst));
        for u in outside {
            self.rebind_use(u, undef);
        }
        self.release_owned(undef);
    }

    // ── Registers ───────────────────────────────────────────────────

    /// Whether `func` is in pure SSA form, i.e. has no register context.
    pub fn is_ssa(&self, func: FuncId) -> bool {
        self.func_data(func).registers.is_none()
    }

    pub fn enable_registers(&mut self, func: FuncId) {
        let data = self.func_data_mut(func);
        if data.registers.is_none() {
            data.registers = Some(RegisterTable::default());
        }
    }

    /// Drop the register context. Fails while registers are allocated.
    pub fn disable_registers(&mut self, func: FuncId) -> Result<(), RegisterError> {
        let data = self.func_data_mut(func);
        let table = data.registers.as_ref().ok_or(RegisterError::Disabled)?;
        if !table.live.is_empty() {
            return Err(RegisterError::ContextInUse {
                live: table.live.len(),
            });
        }
        data.registers = None;
        Ok(())
    }

    /// Grant a register holding values of type `ty`.
    pub fn allocate_register(&mut self, func: FuncId, ty: Ty) -> Result<RegId, RegisterError> {
        if self.func_data(func).registers.is_none() {
            return Err(RegisterError::Disabled);
        }
        if !self.types.is_instantiable(ty) {
            return Err(RegisterError::InvalidType { ty });
        }
        let table = self
            .func_data_mut(func)
            .registers
            .as_mut()
            .ok_or(RegisterError::Disabled)?;
        let slot = table.free.pop().unwrap_or_else(|| {
            table.next += 1;
            table.next - 1
        });
        let reg = RegId::from_value(self.alloc_value(
            ty,
            ValueKind::Register(RegisterData { parent: func, slot }),
        ));
        if let Some(table) = self.func_data_mut(func).registers.as_mut() {
            table.live.push(reg);
        }
        tracing::trace!(slot, "register allocated");
        Ok(reg)
    }

    /// Return a register to the free list. Fails while anything still
    /// reads or writes it.
    pub fn free_register(&mut self, reg: RegId) -> Result<(), RegisterError> {
        let Some((func, slot)) = self.register_info(reg.value()) else {
            return Err(RegisterError::NotARegister);
        };
        let users = self.used_by(reg).len();
        if users > 0 {
            return Err(RegisterError::StillUsed { users });
        }
        let table = self
            .func_data_mut(func)
            .registers
            .as_mut()
            .ok_or(RegisterError::Disabled)?;
        table.live.retain(|&r| r != reg);
        table.free.push(slot);
        self.release_owned(reg.value());
        Ok(())
    }

    fn register_info(&self, value: ValueId) -> Option<(FuncId, u32)> {
        match &self.values.get(value.0)?.kind {
            ValueKind::Register(reg) => Some((reg.parent, reg.slot)),
            _ => None,
        }
    }

    /// Allocator slot of a register.
    pub fn register_slot(&self, reg: RegId) -> Option<u32> {
        self.register_info(reg.value()).map(|(_, slot)| slot)
    }

    /// Live registers of `func`, in allocation order.
    pub fn registers(&self, func: FuncId) -> &[RegId] {
        self.func_data(func)
            .registers
            .as_ref()
            .map_or(&[], |table| table.live.as_slice())
    }
}
