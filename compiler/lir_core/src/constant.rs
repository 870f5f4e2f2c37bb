//! Constant values.
//!
//! Constants are plain values with no structural parent. The factory
//! hands its caller one owning handle, and every operand edge that reads
//! the constant holds another, so a constant lives exactly as long as its
//! last reader or holder.
//!
//! Integer payloads are stored truncated to the type's width; [`int_value`]
//! sign-extends them back for signed types. `zero` is typed like any other
//! constant: it is the all-zero value of its own type (null for pointers).
//!
//! [`int_value`]: Module::int_value

use lir_types::Ty;

use crate::error::IrError;
use crate::module::Module;
use crate::value::{Constant, ValueId, ValueKind};

impl Module {
    fn alloc_constant(&mut self, ty: Ty, constant: Constant) -> ValueId {
        self.alloc_value(ty, ValueKind::Constant(constant))
    }

    fn int_width(&self, ty: Ty) -> Result<u32, IrError> {
        self.types.int_bits(ty).ok_or(IrError::TypeMismatch {
            ty,
            reason: "integer constant needs an integer type",
        })
    }

    /// Integer constant from a signed value, truncated to `ty`'s width.
    #[allow(clippy::cast_sign_loss)]
    pub fn const_int(&mut self, ty: Ty, value: i64) -> Result<ValueId, IrError> {
        self.const_uint(ty, value as u64)
    }

    /// Integer constant from raw bits, truncated to `ty`'s width.
    pub fn const_uint(&mut self, ty: Ty, bits: u64) -> Result<ValueId, IrError> {
        let width = self.int_width(ty)?;
        Ok(self.alloc_constant(ty, Constant::Int(truncate(bits, width))))
    }

    pub fn const_bool(&mut self, value: bool) -> ValueId {
        self.alloc_constant(Ty::BOOL, Constant::Int(u64::from(value)))
    }

    /// Float constant, rounded to `ty`'s precision when it is `f32`.
    pub fn const_float(&mut self, ty: Ty, value: f64) -> Result<ValueId, IrError> {
        let Some(bits) = self.types.float_bits(ty) else {
            return Err(IrError::TypeMismatch {
                ty,
                reason: "float constant needs a float type",
            });
        };
        #[allow(clippy::cast_possible_truncation)]
        let value = if bits <= 32 {
            f64::from(value as f32)
        } else {
            value
        };
        Ok(self.alloc_constant(ty, Constant::Float(value.to_bits())))
    }

    /// The all-zero value of `ty`.
    pub fn const_zero(&mut self, ty: Ty) -> Result<ValueId, IrError> {
        if !self.types.is_instantiable(ty) {
            return Err(IrError::TypeMismatch {
                ty,
                reason: "zero constant needs a storable type",
            });
        }
        Ok(self.alloc_constant(ty, Constant::Zero))
    }

    /// Null pointer of pointer type `ty`.
    pub fn const_null(&mut self, ty: Ty) -> Result<ValueId, IrError> {
        if !self.types.is_pointer(ty) {
            return Err(IrError::TypeMismatch {
                ty,
                reason: "null constant needs a pointer type",
            });
        }
        Ok(self.alloc_constant(ty, Constant::Zero))
    }

    pub fn undef(&mut self, ty: Ty) -> Result<ValueId, IrError> {
        if !self.types.is_instantiable(ty) {
            return Err(IrError::TypeMismatch {
                ty,
                reason: "undef needs a storable type",
            });
        }
        Ok(self.undef_unchecked(ty))
    }

    pub(crate) fn undef_unchecked(&mut self, ty: Ty) -> ValueId {
        self.alloc_constant(ty, Constant::Undef)
    }

    // ── Reading ─────────────────────────────────────────────────────

    /// Integer value, sign-extended for signed types.
    pub fn int_value(&self, value: ValueId) -> Option<i64> {
        let ty = self.type_of(value);
        let width = self.types.int_bits(ty)?;
        let bits = match self.constant(value)? {
            Constant::Int(bits) => *bits,
            Constant::Zero => 0,
            _ => return None,
        };
        #[allow(clippy::cast_possible_wrap)]
        let raw = bits as i64;
        if width == 0 {
            return Some(0);
        }
        if self.types.is_signed(ty) && width < 64 {
            let shift = 64 - width;
            Some((raw << shift) >> shift)
        } else {
            Some(raw)
        }
    }

    /// Integer bits, zero-extended.
    pub fn uint_value(&self, value: ValueId) -> Option<u64> {
        self.types.int_bits(self.type_of(value))?;
        match self.constant(value)? {
            Constant::Int(bits) => Some(*bits),
            Constant::Zero => Some(0),
            _ => None,
        }
    }

    pub fn float_value(&self, value: ValueId) -> Option<f64> {
        match self.constant(value)? {
            Constant::Float(bits) => Some(f64::from_bits(*bits)),
            Constant::Zero if self.types.is_float(self.type_of(value)) => Some(0.0),
            _ => None,
        }
    }

    pub fn is_zero(&self, value: ValueId) -> bool {
        match self.constant(value) {
            Some(Constant::Zero) => true,
            Some(Constant::Int(bits)) => *bits == 0,
            Some(Constant::Float(bits)) => f64::from_bits(*bits) == 0.0,
            _ => false,
        }
    }

    pub fn is_undef(&self, value: ValueId) -> bool {
        matches!(self.constant(value), Some(Constant::Undef))
    }
}

fn truncate(bits: u64, width: u32) -> u64 {
    if width >= 64 {
        bits
    } else {
        bits & ((1u64 << width) - 1)
    }
}
