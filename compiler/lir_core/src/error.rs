//! Error taxonomy for IR construction and editing.
//!
//! Structural failures are reported through [`IrError`]; every checked
//! operation validates before it mutates, so an `Err` leaves the graph
//! exactly as it was. Outcomes that callers routinely branch on get their
//! own small enums ([`RegisterError`], [`DefineError`]). Destroying a node
//! that still has users is not an error but graph corruption, handled by
//! [`graph_corruption`].

use std::fmt;

use lir_types::Ty;

use crate::instr::{ConnectStatus, Opcode};

/// Failure of a checked IR operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IrError {
    /// A required reference is absent, stale or already finalized.
    NullOperand { what: &'static str },
    /// Structural type validation failed. The IR never coerces.
    TypeMismatch { ty: Ty, reason: &'static str },
    /// The edit would break the one-terminator-per-block shape.
    IllegalTerminator { reason: &'static str },
    /// The operation does not apply to this instruction kind.
    WrongOpcode {
        expected: &'static str,
        found: Opcode,
    },
    /// A collection that must be non-empty is empty.
    EmptySet { what: &'static str },
    /// The node is in the wrong connect state for this edit.
    InvalidStatus {
        expected: ConnectStatus,
        found: ConnectStatus,
    },
}

impl fmt::Display for IrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrError::NullOperand { what } => write!(f, "missing operand: {what}"),
            IrError::TypeMismatch { ty, reason } => {
                write!(f, "type mismatch at {ty:?}: {reason}")
            }
            IrError::IllegalTerminator { reason } => write!(f, "illegal terminator edit: {reason}"),
            IrError::WrongOpcode { expected, found } => {
                write!(f, "expected {expected}, found `{found}`")
            }
            IrError::EmptySet { what } => write!(f, "{what} must not be empty"),
            IrError::InvalidStatus { expected, found } => {
                write!(f, "instruction is {found:?}, expected {expected:?}")
            }
        }
    }
}

impl std::error::Error for IrError {}

/// Outcome of the non-SSA register API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterError {
    /// The function has no register context.
    Disabled,
    /// Registers must hold storable values.
    InvalidType { ty: Ty },
    /// The handle is not a live register.
    NotARegister,
    /// The register is still read or written by `users` operands.
    StillUsed { users: usize },
    /// The context cannot be disabled while registers are allocated.
    ContextInUse { live: usize },
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterError::Disabled => f.write_str("function has no register context"),
            RegisterError::InvalidType { ty } => write!(f, "cannot hold {ty:?} in a register"),
            RegisterError::NotARegister => f.write_str("value is not a live register"),
            RegisterError::StillUsed { users } => {
                write!(f, "register still has {users} use(s)")
            }
            RegisterError::ContextInUse { live } => {
                write!(f, "register context still has {live} allocated register(s)")
            }
        }
    }
}

impl std::error::Error for RegisterError {}

/// Outcome of module symbol-table edits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefineError {
    /// A function or global already uses the name.
    Duplicate { name: String },
    /// The declared type cannot be used for this symbol.
    InvalidType { ty: Ty },
    /// The initializer is not a live constant of the content type.
    InvalidInitializer,
    /// Only live functions and globals live in the symbol table.
    NotASymbol,
}

impl fmt::Display for DefineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefineError::Duplicate { name } => write!(f, "`{name}` is already defined"),
            DefineError::InvalidType { ty } => write!(f, "invalid symbol type {ty:?}"),
            DefineError::InvalidInitializer => f.write_str("invalid global initializer"),
            DefineError::NotASymbol => f.write_str("not a function or global"),
        }
    }
}

impl std::error::Error for DefineError {}

/// Abort on a broken ownership contract.
///
/// Called when a node is destroyed while other nodes still use it, or when
/// a structural owner's handle is released from outside. Continuing would
/// leave dangling edges, so the remaining users are logged and the process
/// panics (an abort under `panic = "abort"`).
#[cold]
#[track_caller]
pub(crate) fn graph_corruption(what: &str, users: &[String]) -> ! {
    tracing::error!(what, users = ?users, "graph corruption");
    if users.is_empty() {
        panic!("graph corruption: {what}");
    }
    panic!(
        "graph corruption: {what}; remaining users: {}",
        users.join(", ")
    );
}
