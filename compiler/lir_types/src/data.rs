//! Structural type descriptors.

use crate::Ty;

/// The shape of a type.
///
/// Child types are canonical [`Ty`] handles from the same context, so
/// hashing and comparing a `TypeData` is shallow.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// No value.
    Void,
    /// Basic-block label.
    Label,
    /// Integer of `bits` width.
    Int { bits: u32, signed: bool },
    /// Floating point with `exp` exponent bits and `mantissa` fraction bits
    /// in the given radix `base`.
    Float { exp: u32, mantissa: u32, base: u32 },
    /// Fixed-length array.
    Array { elem: Ty, len: u64 },
    /// Pointer to `pointee`.
    Pointer { pointee: Ty },
    /// Function signature.
    Function {
        ret: Ty,
        params: Vec<Ty>,
        variadic: bool,
    },
}

/// A registered type: shape plus const qualifier.
///
/// This is the unit of canonicalization. Two entries are the same
/// canonical type iff they are fully equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeEntry {
    pub data: TypeData,
    pub is_const: bool,
}

impl TypeEntry {
    /// A non-const entry.
    #[inline]
    pub fn new(data: TypeData) -> Self {
        Self {
            data,
            is_const: false,
        }
    }

    /// Same entry with the const flag set to `is_const`.
    #[inline]
    #[must_use]
    pub fn with_const(mut self, is_const: bool) -> Self {
        self.is_const = is_const;
        self
    }
}

impl From<TypeData> for TypeEntry {
    fn from(data: TypeData) -> Self {
        Self::new(data)
    }
}
