//! Values, uses and typed handles.
//!
//! Every node of the graph is a value: constants, function arguments,
//! basic blocks, instructions, functions, global variables and non-SSA
//! registers. A value records its type, an optional name, the list of
//! [`UseId`] edges that point at it (`used_by`) and, when it is a user,
//! the ordered list of edges it owns (`operands`).

use lir_types::Ty;

use crate::block::BlockData;
use crate::function::{FunctionData, RegisterData};
use crate::instr::InstData;
use crate::module::{GlobalData, Module};
use crate::name::Name;
use crate::ownership::RawId;

// ── Handles ─────────────────────────────────────────────────────────

/// Handle to any value of a module.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ValueId(pub(crate) RawId);

/// Handle to one operand edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct UseId(pub(crate) RawId);

macro_rules! value_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(ValueId);

        impl $name {
            /// The untyped value handle.
            #[inline]
            pub fn value(self) -> ValueId {
                self.0
            }

            #[inline]
            pub(crate) fn from_value(value: ValueId) -> Self {
                Self(value)
            }
        }

        impl From<$name> for ValueId {
            #[inline]
            fn from(id: $name) -> ValueId {
                id.0
            }
        }
    };
}

value_handle!(
    /// Handle to a basic block.
    BlockId
);
value_handle!(
    /// Handle to an instruction.
    InstId
);
value_handle!(
    /// Handle to a function.
    FuncId
);
value_handle!(
    /// Handle to a global variable.
    GlobalId
);
value_handle!(
    /// Handle to a non-SSA mutable register.
    RegId
);

// ── Payloads ────────────────────────────────────────────────────────

/// A constant payload. Integer and float bits are stored raw; the value's
/// type says how to read them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Constant {
    /// Integer bits, truncated to the type's width.
    Int(u64),
    /// `f64` bits.
    Float(u64),
    /// The all-zero value of any storable type (null for pointers).
    Zero,
    /// An unspecified value.
    Undef,
}

/// A formal parameter of a function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgumentData {
    pub(crate) parent: FuncId,
    pub(crate) index: u32,
}

/// What kind of node a value is, with its kind-specific payload.
pub enum ValueKind {
    Constant(Constant),
    Argument(ArgumentData),
    Block(BlockData),
    Instruction(InstData),
    Function(FunctionData),
    Global(GlobalData),
    Register(RegisterData),
}

/// Payload-free view of [`ValueKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueCategory {
    Constant,
    Argument,
    Block,
    Instruction,
    Function,
    Global,
    Register,
}

impl ValueKind {
    pub fn category(&self) -> ValueCategory {
        match self {
            ValueKind::Constant(_) => ValueCategory::Constant,
            ValueKind::Argument(_) => ValueCategory::Argument,
            ValueKind::Block(_) => ValueCategory::Block,
            ValueKind::Instruction(_) => ValueCategory::Instruction,
            ValueKind::Function(_) => ValueCategory::Function,
            ValueKind::Global(_) => ValueCategory::Global,
            ValueKind::Register(_) => ValueCategory::Register,
        }
    }
}

/// A node of the value graph.
pub struct ValueData {
    pub(crate) ty: Ty,
    pub(crate) name: Option<Name>,
    /// Edges pointing at this value.
    pub(crate) used_by: Vec<UseId>,
    /// Edges owned by this value, in operand order.
    pub(crate) operands: Vec<UseId>,
    pub(crate) kind: ValueKind,
}

impl ValueData {
    pub(crate) fn new(ty: Ty, kind: ValueKind) -> Self {
        Self {
            ty,
            name: None,
            used_by: Vec::new(),
            operands: Vec::new(),
            kind,
        }
    }
}

// ── Uses ────────────────────────────────────────────────────────────

/// Where an operand edge lives inside its user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperandSlot {
    /// A named field (`lhs`, `ptr`, `cond`, ...), by position.
    Fixed(u8),
    /// An element of a variable-length operand array (call arguments,
    /// GEP indices, switch case targets).
    Indexed(u32),
    /// An entry of a key-addressed map (PHI incoming values by block).
    /// Writing "nothing" into a keyed slot removes the edge.
    Keyed(BlockId),
}

/// One operand edge: `user` reads `value` through `slot`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UseData {
    pub(crate) user: ValueId,
    pub(crate) value: ValueId,
    pub(crate) slot: OperandSlot,
}

// ── Module accessors ────────────────────────────────────────────────

impl Module {
    pub(crate) fn alloc_value(&mut self, ty: Ty, kind: ValueKind) -> ValueId {
        ValueId(self.values.alloc(ValueData::new(ty, kind)))
    }

    /// Panics on a stale handle. Public readers inherit this contract.
    pub(crate) fn data(&self, value: ValueId) -> &ValueData {
        &self.values[value.0]
    }

    pub(crate) fn data_mut(&mut self, value: ValueId) -> &mut ValueData {
        &mut self.values[value.0]
    }

    /// Whether `value` still names a live node.
    pub fn is_live(&self, value: impl Into<ValueId>) -> bool {
        self.values.contains(value.into().0)
    }

    /// Number of owning handles on `value`, `None` once it is freed.
    pub fn strong_count(&self, value: impl Into<ValueId>) -> Option<u32> {
        self.values.strong_count(value.into().0)
    }

    /// Number of live values in the module.
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Number of live operand edges in the module.
    pub fn use_count(&self) -> usize {
        self.uses.len()
    }

    pub fn type_of(&self, value: impl Into<ValueId>) -> Ty {
        self.data(value.into()).ty
    }

    pub fn category(&self, value: impl Into<ValueId>) -> ValueCategory {
        self.data(value.into()).kind.category()
    }

    pub fn kind(&self, value: impl Into<ValueId>) -> &ValueKind {
        &self.data(value.into()).kind
    }

    pub fn name(&self, value: impl Into<ValueId>) -> Option<&str> {
        self.data(value.into())
            .name
            .map(|name| self.names.lookup(name))
    }

    pub fn constant(&self, value: impl Into<ValueId>) -> Option<&Constant> {
        match &self.data(value.into()).kind {
            ValueKind::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_block(&self, value: ValueId) -> Option<BlockId> {
        let data = self.values.get(value.0)?;
        matches!(data.kind, ValueKind::Block(_)).then(|| BlockId::from_value(value))
    }

    pub fn as_inst(&self, value: ValueId) -> Option<InstId> {
        let data = self.values.get(value.0)?;
        matches!(data.kind, ValueKind::Instruction(_)).then(|| InstId::from_value(value))
    }

    pub fn as_func(&self, value: ValueId) -> Option<FuncId> {
        let data = self.values.get(value.0)?;
        matches!(data.kind, ValueKind::Function(_)).then(|| FuncId::from_value(value))
    }

    pub fn as_global(&self, value: ValueId) -> Option<GlobalId> {
        let data = self.values.get(value.0)?;
        matches!(data.kind, ValueKind::Global(_)).then(|| GlobalId::from_value(value))
    }

    pub fn as_register(&self, value: ValueId) -> Option<RegId> {
        let data = self.values.get(value.0)?;
        matches!(data.kind, ValueKind::Register(_)).then(|| RegId::from_value(value))
    }

    /// Function and position of an argument.
    pub fn argument(&self, value: ValueId) -> Option<(FuncId, u32)> {
        match &self.values.get(value.0)?.kind {
            ValueKind::Argument(arg) => Some((arg.parent, arg.index)),
            _ => None,
        }
    }

    // Typed payload access. A typed handle can only be stale, never of the
    // wrong kind, so the fallback arms are unreachable for live handles.

    pub(crate) fn block_data(&self, block: BlockId) -> &BlockData {
        match &self.data(block.value()).kind {
            ValueKind::Block(data) => data,
            _ => unreachable!("{block:?} is not a block"),
        }
    }

    pub(crate) fn block_data_mut(&mut self, block: BlockId) -> &mut BlockData {
        match &mut self.data_mut(block.value()).kind {
            ValueKind::Block(data) => data,
            _ => unreachable!("{block:?} is not a block"),
        }
    }

    pub(crate) fn inst_data(&self, inst: InstId) -> &InstData {
        match &self.data(inst.value()).kind {
            ValueKind::Instruction(data) => data,
            _ => unreachable!("{inst:?} is not an instruction"),
        }
    }

    pub(crate) fn inst_data_mut(&mut self, inst: InstId) -> &mut InstData {
        match &mut self.data_mut(inst.value()).kind {
            ValueKind::Instruction(data) => data,
            _ => unreachable!("{inst:?} is not an instruction"),
        }
    }

    pub(crate) fn func_data(&self, func: FuncId) -> &FunctionData {
        match &self.data(func.value()).kind {
            ValueKind::Function(data) => data,
            _ => unreachable!("{func:?} is not a function"),
        }
    }

    pub(crate) fn func_data_mut(&mut self, func: FuncId) -> &mut FunctionData {
        match &mut self.data_mut(func.value()).kind {
            ValueKind::Function(data) => data,
            _ => unreachable!("{func:?} is not a function"),
        }
    }

    /// Short human-readable label for diagnostics: the name if any,
    /// otherwise the category and slot.
    pub(crate) fn describe(&self, value: ValueId) -> String {
        let Some(data) = self.values.get(value.0) else {
            return format!("<stale {}>", value.0.index());
        };
        let kind = match &data.kind {
            ValueKind::Instruction(inst) => inst.kind.opcode().to_string(),
            other => format!("{:?}", other.category()).to_lowercase(),
        };
        match data.name {
            Some(name) => format!("{kind} %{}", self.names.lookup(name)),
            None => format!("{kind} #{}", value.0.index()),
        }
    }
}
