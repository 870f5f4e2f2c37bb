//! Canonical type handle.
//!
//! A `Ty` is an index into a [`TypeContext`](crate::TypeContext). Every
//! structurally distinct type (const flag included) gets exactly one
//! handle, so handle equality is full type equality.

use std::fmt;

/// A 32-bit handle to a canonical type.
///
/// Handles are only meaningful for the context that produced them.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Ty(u32);

impl Ty {
    // === Pre-registered types (indices 0-12) ===
    // Registered by `TypeContext::new` in this exact order.

    /// `void`.
    pub const VOID: Self = Self(0);
    /// Basic-block label.
    pub const LABEL: Self = Self(1);
    /// Unsigned 1-bit integer, the result type of comparisons.
    pub const BOOL: Self = Self(2);
    /// Signed 8-bit integer.
    pub const I8: Self = Self(3);
    /// Signed 16-bit integer.
    pub const I16: Self = Self(4);
    /// Signed 32-bit integer.
    pub const I32: Self = Self(5);
    /// Signed 64-bit integer.
    pub const I64: Self = Self(6);
    /// Unsigned 8-bit integer.
    pub const U8: Self = Self(7);
    /// Unsigned 16-bit integer.
    pub const U16: Self = Self(8);
    /// Unsigned 32-bit integer.
    pub const U32: Self = Self(9);
    /// Unsigned 64-bit integer.
    pub const U64: Self = Self(10);
    /// IEEE-754 binary32.
    pub const F32: Self = Self(11);
    /// IEEE-754 binary64.
    pub const F64: Self = Self(12);

    /// Number of pre-registered types.
    pub const PRIMITIVE_COUNT: u32 = 13;

    /// Create a handle from a raw index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` for table lookups.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Check if this handle is one of the pre-registered types.
    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::PRIMITIVE_COUNT
    }

    #[inline]
    pub const fn is_void(self) -> bool {
        self.0 == Self::VOID.0
    }

    /// Name of a pre-registered type, or `None` for dynamic types.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("void"),
            1 => Some("label"),
            2 => Some("u1"),
            3 => Some("i8"),
            4 => Some("i16"),
            5 => Some("i32"),
            6 => Some("i64"),
            7 => Some("u8"),
            8 => Some("u16"),
            9 => Some("u32"),
            10 => Some("u64"),
            11 => Some("f32"),
            12 => Some("f64"),
            _ => None,
        }
    }
}

impl fmt::Debug for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Ty({name})"),
            None => write!(f, "Ty({})", self.0),
        }
    }
}

#[cfg(test)]
mod tests;
