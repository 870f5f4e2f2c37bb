//! SSA value graph for the LIR middle-end.
//!
//! A [`Module`] owns every node: functions and globals, their blocks and
//! arguments, instructions, constants and registers. Nodes are named by
//! small `Copy` handles ([`ValueId`] and its typed views [`BlockId`],
//! [`InstId`], [`FuncId`], [`GlobalId`], [`RegId`]) and all edits go
//! through `&mut Module`.
//!
//! # Invariants
//!
//! - **Def-use mirror**: a [`UseId`] is in `used_by(v)` iff it reads `v`.
//! - **Terminators**: a non-empty block ends in exactly one terminator.
//! - **CFG caches**: `jumps_to` / `comes_from` count the target operands
//!   of each block's terminator.
//! - **Ownership**: parents own children, users own only their constant
//!   operands; destroying a node that still has users aborts with a
//!   `graph corruption` diagnostic.
//!
//! Every checked operation validates before it mutates, so an `Err`
//! leaves the module unchanged.
//!
//! # Stale handles
//!
//! Handles are plain ids and can outlive the node they name. Checked
//! edits report [`IrError::NullOperand`] for a stale handle. Read
//! accessors such as [`Module::type_of`] or [`Module::status`] expect a
//! live handle and panic with `stale arena handle` otherwise; test a
//! handle that may have been erased with [`Module::is_live`] first.
//!
//! # Tracing
//!
//! Edits are instrumented with `tracing`. Call [`init_tracing`] to print
//! them according to `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=lir_core=debug cargo test -p lir_core
//! ```

mod block;
mod build;
mod config;
mod constant;
mod error;
mod function;
mod instr;
mod lifecycle;
mod module;
mod name;
mod ownership;
mod terminator;
#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for concise assertions")]
mod test_helpers;
mod use_def;
mod value;
pub mod verify;
pub mod visit;

use std::sync::Once;

pub use block::{BlockData, Instructions};
pub use config::IrConfig;
pub use error::{DefineError, IrError, RegisterError};
pub use function::{FunctionData, RegisterData};
pub use instr::{BinaryOp, CastOp, CmpPred, ConnectStatus, InstData, InstKind, Opcode, UnaryOp};
pub use lir_types::{CastCaps, Ty, TypeContext};
pub use module::{GlobalData, Module};
pub use name::{Interner, Name};
pub use ownership::{Arena, RawId, Released, StaleHandle};
pub use value::{
    ArgumentData, BlockId, Constant, FuncId, GlobalId, InstId, OperandSlot, RegId, UseData,
    UseId, ValueCategory, ValueData, ValueId, ValueKind,
};
pub use verify::{verify_function, verify_module, Violation};
pub use visit::{OperandForm, Visitor};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset; safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
