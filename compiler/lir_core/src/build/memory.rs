//! Stack allocation, loads, stores and address arithmetic.

use lir_types::Ty;

use super::indexed;
use crate::error::IrError;
use crate::instr::InstKind;
use crate::module::Module;
use crate::value::{InstId, OperandSlot, ValueId};

impl Module {
    /// Alignment for an access to `ty`: the natural alignment by default,
    /// otherwise the request rounded up to a power of two.
    fn access_align(&self, ty: Ty, align: Option<u32>) -> u32 {
        match align {
            Some(a) => a.max(1).next_power_of_two(),
            None => self.types.natural_alignment(ty).unwrap_or(1),
        }
    }

    /// Pointee of a pointer operand that can be loaded or stored.
    fn access_pointee(&self, ptr: ValueId) -> Result<Ty, IrError> {
        let ptr_ty = self.operand_type(ptr, "pointer operand")?;
        let pointee = self.types.pointee(ptr_ty).ok_or(IrError::TypeMismatch {
            ty: ptr_ty,
            reason: "address operand must be a pointer",
        })?;
        self.expect_instantiable(pointee, "pointee must be a storable type")?;
        Ok(pointee)
    }

    /// Reserve a stack slot for one `ty`, yielding `ty*`.
    pub fn build_alloca(&mut self, ty: Ty, align: Option<u32>) -> Result<InstId, IrError> {
        self.expect_instantiable(ty, "allocated type must be storable")?;
        let align = self.access_align(ty, align);
        let ptr = self.types.pointer(ty);
        Ok(self.new_inst(
            ptr,
            InstKind::Alloca {
                allocated: ty,
                align,
            },
            &[],
        ))
    }

    /// Read the value behind `ptr`.
    pub fn build_load(&mut self, ptr: ValueId, align: Option<u32>) -> Result<InstId, IrError> {
        let pointee = self.access_pointee(ptr)?;
        let align = self.access_align(pointee, align);
        let ty = self.types.without_const(pointee);
        Ok(self.new_inst(
            ty,
            InstKind::Load { align },
            &[(OperandSlot::Fixed(0), ptr)],
        ))
    }

    /// Write `value` through `ptr`. The pointee must match the value's
    /// type and must not be const.
    pub fn build_store(
        &mut self,
        value: ValueId,
        ptr: ValueId,
        align: Option<u32>,
    ) -> Result<InstId, IrError> {
        let value_ty = self.operand_type(value, "stored value")?;
        let pointee = self.access_pointee(ptr)?;
        if self.types.is_const(pointee) {
            return Err(IrError::TypeMismatch {
                ty: pointee,
                reason: "cannot store through a pointer to const",
            });
        }
        if !self.types.equal(value_ty, pointee) {
            return Err(IrError::TypeMismatch {
                ty: value_ty,
                reason: "stored value does not match the pointee type",
            });
        }
        let align = self.access_align(pointee, align);
        Ok(self.new_inst(
            Ty::VOID,
            InstKind::Store { align },
            &[(OperandSlot::Fixed(0), value), (OperandSlot::Fixed(1), ptr)],
        ))
    }

    /// Address computation. Each integer index steps through one pointer
    /// or array layer, starting at the base pointer; the result points at
    /// the final layer.
    pub fn build_gep(&mut self, base: ValueId, indices: &[ValueId]) -> Result<InstId, IrError> {
        let base_ty = self.operand_type(base, "getelementptr base")?;
        if !self.types.is_pointer(base_ty) {
            return Err(IrError::TypeMismatch {
                ty: base_ty,
                reason: "getelementptr base must be a pointer",
            });
        }
        if indices.is_empty() {
            return Err(IrError::EmptySet {
                what: "getelementptr indices",
            });
        }
        let mut layer = base_ty;
        for &index in indices {
            let index_ty = self.operand_type(index, "getelementptr index")?;
            if !self.types.is_int(index_ty) {
                return Err(IrError::TypeMismatch {
                    ty: index_ty,
                    reason: "getelementptr index must be an integer",
                });
            }
            layer = self.types.element(layer).ok_or(IrError::TypeMismatch {
                ty: layer,
                reason: "index steps into a type that is neither pointer nor array",
            })?;
        }
        let ty = self.types.pointer(layer);
        let mut operands = vec![(OperandSlot::Fixed(0), base)];
        operands.extend(indices.iter().enumerate().map(|(i, &v)| (indexed(i), v)));
        Ok(self.new_inst(ty, InstKind::GetElementPtr, &operands))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for concise assertions")]
mod tests;
