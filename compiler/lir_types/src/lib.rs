//! Type system for the LIR middle-end.
//!
//! Types are immutable descriptors stored once per [`TypeContext`] and
//! referenced by a 32-bit [`Ty`] handle. Structurally identical types
//! collapse to one handle, so full type equality is an O(1) handle
//! comparison.
//!
//! # Equality levels
//!
//! - **weak** ([`TypeContext::weak_equal`]) — same shape, ignoring sign and
//!   const qualifiers at every layer.
//! - **equal** ([`TypeContext::equal`]) — same shape and sign, ignoring const.
//! - **full** (`Ty == Ty`) — equal plus const flags.
//!
//! # Casting
//!
//! [`TypeContext::can_cast_to`] reports which kinds of conversion are
//! possible between two types as a [`CastCaps`] bitmask. Instruction
//! factories consult it; the IR itself never converts implicitly.

mod cast;
mod context;
mod data;
mod format;
mod ty;

pub use cast::CastCaps;
pub use context::{FnSignature, TypeContext};
pub use data::{TypeData, TypeEntry};
pub use format::TypeDisplay;
pub use ty::Ty;

/// Default pointer width in bits, used when no target configuration is given.
pub const DEFAULT_POINTER_WIDTH: u32 = 64;
