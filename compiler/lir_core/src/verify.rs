//! Structural verifier.
//!
//! Re-derives the invariants the editing API maintains and reports every
//! place where the stored graph disagrees: mirrored def-use edges, CFG
//! edge counts, terminator placement, parent links and connect status.
//! An empty report means the function or module is well formed.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::instr::{ConnectStatus, InstParent};
use crate::module::Module;
use crate::value::{BlockId, FuncId, InstId, UseId, ValueId};

/// One broken invariant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    /// An operand edge is missing from its target's `used_by` list, or
    /// names a different user or a dead target.
    UseNotMirrored { user: ValueId, operand: UseId },
    /// A `used_by` entry is dead or points at another value.
    DanglingUsedBy { value: ValueId, operand: UseId },
    /// Cached edge count disagrees with the terminator operands.
    CfgCacheMismatch {
        from: BlockId,
        to: BlockId,
        cached: u32,
        actual: u32,
    },
    /// A non-empty block does not end in a terminator.
    MissingTerminator { block: BlockId },
    /// A terminator sits before the end of its block.
    MisplacedTerminator { block: BlockId, inst: InstId },
    /// A parent or list link disagrees with the container holding the node.
    ParentMismatch { value: ValueId },
    /// An instruction's status disagrees with where it is held.
    StatusMismatch {
        inst: InstId,
        expected: ConnectStatus,
        found: ConnectStatus,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UseNotMirrored { user, operand } => {
                write!(f, "operand {operand:?} of {user:?} is not mirrored")
            }
            Violation::DanglingUsedBy { value, operand } => {
                write!(f, "{value:?} lists dangling use {operand:?}")
            }
            Violation::CfgCacheMismatch {
                from,
                to,
                cached,
                actual,
            } => write!(
                f,
                "edge {from:?} -> {to:?} cached as {cached}, terminator has {actual}"
            ),
            Violation::MissingTerminator { block } => {
                write!(f, "{block:?} does not end in a terminator")
            }
            Violation::MisplacedTerminator { block, inst } => {
                write!(f, "terminator {inst:?} is not last in {block:?}")
            }
            Violation::ParentMismatch { value } => write!(f, "{value:?} has a broken parent link"),
            Violation::StatusMismatch {
                inst,
                expected,
                found,
            } => write!(f, "{inst:?} is {found:?}, expected {expected:?}"),
        }
    }
}

/// Check every global and function of `module`.
pub fn verify_module(module: &Module) -> Vec<Violation> {
    let mut out = Vec::new();
    for &global in module.globals() {
        check_operands(module, global.value(), &mut out);
        check_used_by(module, global.value(), &mut out);
    }
    for &func in module.functions() {
        out.extend(verify_function(module, func));
    }
    out
}

/// Check one function: its blocks, instructions, arguments and registers.
pub fn verify_function(module: &Module, func: FuncId) -> Vec<Violation> {
    let mut out = Vec::new();
    check_used_by(module, func.value(), &mut out);
    for &arg in module.params(func) {
        check_used_by(module, arg, &mut out);
    }
    for &reg in module.registers(func) {
        check_used_by(module, reg.value(), &mut out);
    }
    for &block in module.blocks(func) {
        if module.block_parent(block) != Some(func) {
            out.push(Violation::ParentMismatch {
                value: block.value(),
            });
        }
        check_used_by(module, block.value(), &mut out);
        check_block(module, block, &mut out);
        check_cfg(module, block, &mut out);
    }
    out
}

fn check_block(module: &Module, block: BlockId, out: &mut Vec<Violation>) {
    let mut prev = None;
    let mut len = 0;
    for inst in module.instructions(block) {
        len += 1;
        if module.parent_block(inst) != Some(block) || module.prev_inst(inst) != prev {
            out.push(Violation::ParentMismatch {
                value: inst.value(),
            });
        }
        let status = module.status(inst);
        if status != ConnectStatus::Connected {
            out.push(Violation::StatusMismatch {
                inst,
                expected: ConnectStatus::Connected,
                found: status,
            });
        }
        if module.is_terminator(inst) && module.next_inst(inst).is_some() {
            out.push(Violation::MisplacedTerminator { block, inst });
        }
        check_inst(module, inst, out);
        prev = Some(inst);
    }
    if module.last_inst(block) != prev || module.block_len(block) != len {
        out.push(Violation::ParentMismatch {
            value: block.value(),
        });
    }
    if let Some(last) = prev {
        if !module.is_terminator(last) {
            out.push(Violation::MissingTerminator { block });
        }
    }
}

/// Edges of `inst` and of any instruction nested under it.
fn check_inst(module: &Module, inst: InstId, out: &mut Vec<Violation>) {
    check_operands(module, inst.value(), out);
    check_used_by(module, inst.value(), out);
    if let Some(inner) = module
        .operand_values(inst.value())
        .into_iter()
        .filter_map(|v| module.as_inst(v))
        .find(|&v| module.inst_data(v).parent == Some(InstParent::Inst(inst)))
    {
        let status = module.status(inner);
        if status != ConnectStatus::Reparent {
            out.push(Violation::StatusMismatch {
                inst: inner,
                expected: ConnectStatus::Reparent,
                found: status,
            });
        }
        check_inst(module, inner, out);
    }
}

fn check_operands(module: &Module, user: ValueId, out: &mut Vec<Violation>) {
    for &operand in module.operands(user) {
        let mirrored = module.uses.get(operand.0).is_some_and(|data| {
            data.user == user
                && module
                    .values
                    .get(data.value.0)
                    .is_some_and(|target| target.used_by.contains(&operand))
        });
        if !mirrored {
            out.push(Violation::UseNotMirrored { user, operand });
        }
    }
}

fn check_used_by(module: &Module, value: ValueId, out: &mut Vec<Violation>) {
    for &operand in module.used_by(value) {
        let ok = module.uses.get(operand.0).is_some_and(|data| {
            data.value == value
                && module
                    .values
                    .get(data.user.0)
                    .is_some_and(|user| user.operands.contains(&operand))
        });
        if !ok {
            out.push(Violation::DanglingUsedBy { value, operand });
        }
    }
}

fn check_cfg(module: &Module, block: BlockId, out: &mut Vec<Violation>) {
    let mut actual: FxHashMap<BlockId, u32> = FxHashMap::default();
    if let Some(term) = module.terminator(block) {
        for target in module.terminator_targets(term) {
            *actual.entry(target).or_insert(0) += 1;
        }
    }
    let cached = module.jumps_to(block);
    let mut targets: Vec<BlockId> = actual.keys().chain(cached.keys()).copied().collect();
    targets.sort_unstable();
    targets.dedup();
    for to in targets {
        let want = actual.get(&to).copied().unwrap_or(0);
        let have = cached.get(&to).copied().unwrap_or(0);
        let mirrored = module.is_live(to)
            && module.comes_from(to).get(&block).copied().unwrap_or(0) == have;
        if want != have || !mirrored {
            out.push(Violation::CfgCacheMismatch {
                from: block,
                to,
                cached: have,
                actual: want,
            });
        }
    }
}

impl Module {
    /// Verify after a structural edit when `verify_edits` is on.
    pub(crate) fn after_edit(&self, edit: &str, func: Option<FuncId>) {
        if !self.config.verify_edits {
            return;
        }
        let violations = match func {
            Some(func) if self.is_live(func) => verify_function(self, func),
            _ => verify_module(self),
        };
        for violation in &violations {
            tracing::error!(edit, %violation, "verifier violation");
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for concise assertions")]
mod tests;
