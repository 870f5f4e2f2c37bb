//! Instruction representation.
//!
//! One [`InstData`] shape serves every instruction: a kind tag with its
//! kind-specific payload ([`InstKind`]), the connect status and the
//! intrusive list links. Operands are not stored in the payload; they are
//! the instruction's ordered [`UseId`](crate::UseId) list, with a fixed
//! layout per kind:
//!
//! | Kind | Operands |
//! |------|----------|
//! | `Binary`, `Compare` | `lhs, rhs` |
//! | `Unary`, `Cast` | `value` |
//! | `Alloca` | — |
//! | `Load` | `ptr` |
//! | `Store` | `value, ptr` |
//! | `GetElementPtr` | `base, index...` |
//! | `Phi` | one keyed edge per incoming block |
//! | `Call` | `callee, arg...` |
//! | `Select` | `cond, then, else` |
//! | `RegWrite` | `register, value` |
//! | `Ret` | `value?` |
//! | `Br` | `target` |
//! | `CondBr` | `cond, then, else` |
//! | `Switch` | `cond, default, case target...` |
//! | `Unreachable` | — |

use std::fmt;

use lir_types::Ty;

use crate::module::Module;
use crate::value::{BlockId, InstId, ValueId};

/// Structural attachment state of an instruction.
///
/// ```text
/// Disconnected ──insert──▶ Connected ──remove──▶ Disconnected
///      │                       │
///      │ nest                  │ finalize
///      ▼                       ▼
///   Reparent ──finalize──▶ Finalized ◀──finalize── Disconnected
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectStatus {
    /// Built, not in any block. The creator holds the owning handle.
    Disconnected,
    /// Linked into a block, which holds the owning handle.
    Connected,
    /// Nested as the operand tree of a register write (register lowering
    /// only); the outer instruction holds the owning handle.
    Reparent,
    /// All edges torn down; waiting for the last handle to go.
    Finalized,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    /// Arithmetic for signed operands, logical for unsigned.
    Shr,
}

impl BinaryOp {
    /// Bitwise and shift operators accept integers only.
    pub fn is_integer_only(self) -> bool {
        matches!(
            self,
            BinaryOp::And | BinaryOp::Or | BinaryOp::Xor | BinaryOp::Shl | BinaryOp::Shr
        )
    }

    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr)
    }
}

/// Comparison predicate. Signedness and float ordering come from the
/// operand type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpPred {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastOp {
    Trunc,
    ZExt,
    SExt,
    FpTrunc,
    FpExt,
    FpToInt,
    IntToFp,
    PtrToInt,
    IntToPtr,
    Bitcast,
}

/// Kind tag plus kind-specific payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstKind {
    Binary(BinaryOp),
    Compare(CmpPred),
    Unary(UnaryOp),
    Cast(CastOp),
    Alloca { allocated: Ty, align: u32 },
    Load { align: u32 },
    Store { align: u32 },
    GetElementPtr,
    Phi,
    Call,
    Select,
    RegWrite,
    Ret,
    Br,
    CondBr,
    /// Case values, parallel to the case-target operands.
    Switch { cases: Vec<i64> },
    Unreachable,
}

/// Flat opcode, one per concrete instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Cmp(CmpPred),
    Neg,
    Not,
    Cast(CastOp),
    Alloca,
    Load,
    Store,
    GetElementPtr,
    Phi,
    Call,
    Select,
    RegWrite,
    Ret,
    Br,
    CondBr,
    Switch,
    Unreachable,
}

impl InstKind {
    pub fn opcode(&self) -> Opcode {
        match self {
            InstKind::Binary(op) => match op {
                BinaryOp::Add => Opcode::Add,
                BinaryOp::Sub => Opcode::Sub,
                BinaryOp::Mul => Opcode::Mul,
                BinaryOp::Div => Opcode::Div,
                BinaryOp::Rem => Opcode::Rem,
                BinaryOp::And => Opcode::And,
                BinaryOp::Or => Opcode::Or,
                BinaryOp::Xor => Opcode::Xor,
                BinaryOp::Shl => Opcode::Shl,
                BinaryOp::Shr => Opcode::Shr,
            },
            InstKind::Compare(pred) => Opcode::Cmp(*pred),
            InstKind::Unary(UnaryOp::Neg) => Opcode::Neg,
            InstKind::Unary(UnaryOp::Not) => Opcode::Not,
            InstKind::Cast(op) => Opcode::Cast(*op),
            InstKind::Alloca { .. } => Opcode::Alloca,
            InstKind::Load { .. } => Opcode::Load,
            InstKind::Store { .. } => Opcode::Store,
            InstKind::GetElementPtr => Opcode::GetElementPtr,
            InstKind::Phi => Opcode::Phi,
            InstKind::Call => Opcode::Call,
            InstKind::Select => Opcode::Select,
            InstKind::RegWrite => Opcode::RegWrite,
            InstKind::Ret => Opcode::Ret,
            InstKind::Br => Opcode::Br,
            InstKind::CondBr => Opcode::CondBr,
            InstKind::Switch { .. } => Opcode::Switch,
            InstKind::Unreachable => Opcode::Unreachable,
        }
    }

    /// Whether this kind ends a block.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            InstKind::Ret
                | InstKind::Br
                | InstKind::CondBr
                | InstKind::Switch { .. }
                | InstKind::Unreachable
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Rem => "rem",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Xor => "xor",
            Opcode::Shl => "shl",
            Opcode::Shr => "shr",
            Opcode::Cmp(pred) => match pred {
                CmpPred::Eq => "cmp eq",
                CmpPred::Ne => "cmp ne",
                CmpPred::Lt => "cmp lt",
                CmpPred::Le => "cmp le",
                CmpPred::Gt => "cmp gt",
                CmpPred::Ge => "cmp ge",
            },
            Opcode::Neg => "neg",
            Opcode::Not => "not",
            Opcode::Cast(op) => match op {
                CastOp::Trunc => "trunc",
                CastOp::ZExt => "zext",
                CastOp::SExt => "sext",
                CastOp::FpTrunc => "fptrunc",
                CastOp::FpExt => "fpext",
                CastOp::FpToInt => "fptoint",
                CastOp::IntToFp => "inttofp",
                CastOp::PtrToInt => "ptrtoint",
                CastOp::IntToPtr => "inttoptr",
                CastOp::Bitcast => "bitcast",
            },
            Opcode::Alloca => "alloca",
            Opcode::Load => "load",
            Opcode::Store => "store",
            Opcode::GetElementPtr => "getelementptr",
            Opcode::Phi => "phi",
            Opcode::Call => "call",
            Opcode::Select => "select",
            Opcode::RegWrite => "regwrite",
            Opcode::Ret => "ret",
            Opcode::Br => "br",
            Opcode::CondBr => "condbr",
            Opcode::Switch => "switch",
            Opcode::Unreachable => "unreachable",
        };
        f.write_str(text)
    }
}

/// Structural owner of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstParent {
    Block(BlockId),
    /// Nested under a register write.
    Inst(InstId),
}

/// Instruction payload of a [`ValueData`](crate::value::ValueData).
pub struct InstData {
    pub(crate) kind: InstKind,
    pub(crate) status: ConnectStatus,
    pub(crate) parent: Option<InstParent>,
    pub(crate) prev: Option<InstId>,
    pub(crate) next: Option<InstId>,
}

impl InstData {
    pub(crate) fn new(kind: InstKind) -> Self {
        Self {
            kind,
            status: ConnectStatus::Disconnected,
            parent: None,
            prev: None,
            next: None,
        }
    }
}

impl Module {
    pub fn inst_kind(&self, inst: InstId) -> &InstKind {
        &self.inst_data(inst).kind
    }

    pub fn opcode(&self, inst: InstId) -> Opcode {
        self.inst_data(inst).kind.opcode()
    }

    pub fn status(&self, inst: InstId) -> ConnectStatus {
        self.inst_data(inst).status
    }

    pub fn is_terminator(&self, inst: InstId) -> bool {
        self.inst_data(inst).kind.is_terminator()
    }

    /// Block the instruction is linked into, if connected.
    pub fn parent_block(&self, inst: InstId) -> Option<BlockId> {
        match self.inst_data(inst).parent {
            Some(InstParent::Block(block)) => Some(block),
            _ => None,
        }
    }

    /// Register write that owns a nested instruction.
    pub fn nesting_parent(&self, inst: InstId) -> Option<InstId> {
        match self.inst_data(inst).parent {
            Some(InstParent::Inst(outer)) => Some(outer),
            _ => None,
        }
    }

    pub fn next_inst(&self, inst: InstId) -> Option<InstId> {
        self.inst_data(inst).next
    }

    pub fn prev_inst(&self, inst: InstId) -> Option<InstId> {
        self.inst_data(inst).prev
    }

    /// Whether the instruction produces a value other instructions can use.
    pub fn has_result(&self, inst: InstId) -> bool {
        !self.type_of(inst).is_void()
    }

    /// Resolve `value` as an instruction in the given status.
    pub(crate) fn expect_status(
        &self,
        inst: InstId,
        expected: ConnectStatus,
    ) -> Result<(), crate::IrError> {
        let found = self.inst_data(inst).status;
        if found == expected {
            Ok(())
        } else {
            Err(crate::IrError::InvalidStatus { expected, found })
        }
    }

    /// Operand values of an instruction, in operand order.
    pub fn inst_operands(&self, inst: InstId) -> Vec<ValueId> {
        self.operand_values(inst.value())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for concise assertions")]
mod tests;
