//! Arithmetic, comparison, unary and select instructions.

use lir_types::Ty;

use crate::error::IrError;
use crate::instr::{BinaryOp, CmpPred, InstKind, UnaryOp};
use crate::module::Module;
use crate::value::{InstId, OperandSlot, ValueId};

impl Module {
    /// `lhs <op> rhs`.
    ///
    /// Operands must have `equal` types, integer or float; bitwise and
    /// shift operators take integers only. A shift amount only has to be
    /// an integer. The result has the left operand's type without const.
    pub fn build_binary(
        &mut self,
        op: BinaryOp,
        lhs: ValueId,
        rhs: ValueId,
    ) -> Result<InstId, IrError> {
        let lhs_ty = self.operand_type(lhs, "left operand")?;
        let rhs_ty = self.operand_type(rhs, "right operand")?;
        if op.is_shift() {
            if !self.types.is_int(lhs_ty) {
                return Err(IrError::TypeMismatch {
                    ty: lhs_ty,
                    reason: "shifted value must be an integer",
                });
            }
            if !self.types.is_int(rhs_ty) {
                return Err(IrError::TypeMismatch {
                    ty: rhs_ty,
                    reason: "shift amount must be an integer",
                });
            }
        } else {
            if !self.types.equal(lhs_ty, rhs_ty) {
                return Err(IrError::TypeMismatch {
                    ty: rhs_ty,
                    reason: "binary operands differ in type",
                });
            }
            if op.is_integer_only() && !self.types.is_int(lhs_ty) {
                return Err(IrError::TypeMismatch {
                    ty: lhs_ty,
                    reason: "bitwise operands must be integers",
                });
            }
            if !self.types.is_arithmetic(lhs_ty) {
                return Err(IrError::TypeMismatch {
                    ty: lhs_ty,
                    reason: "arithmetic operands must be integers or floats",
                });
            }
        }
        let ty = self.types.without_const(lhs_ty);
        Ok(self.new_inst(
            ty,
            InstKind::Binary(op),
            &[(OperandSlot::Fixed(0), lhs), (OperandSlot::Fixed(1), rhs)],
        ))
    }

    pub fn build_add(&mut self, lhs: ValueId, rhs: ValueId) -> Result<InstId, IrError> {
        self.build_binary(BinaryOp::Add, lhs, rhs)
    }

    pub fn build_sub(&mut self, lhs: ValueId, rhs: ValueId) -> Result<InstId, IrError> {
        self.build_binary(BinaryOp::Sub, lhs, rhs)
    }

    pub fn build_mul(&mut self, lhs: ValueId, rhs: ValueId) -> Result<InstId, IrError> {
        self.build_binary(BinaryOp::Mul, lhs, rhs)
    }

    /// `lhs <pred> rhs`, yielding `bool`. Integer, float and pointer
    /// operands compare; their types must be `equal`.
    pub fn build_cmp(
        &mut self,
        pred: CmpPred,
        lhs: ValueId,
        rhs: ValueId,
    ) -> Result<InstId, IrError> {
        let lhs_ty = self.operand_type(lhs, "left operand")?;
        let rhs_ty = self.operand_type(rhs, "right operand")?;
        if !self.types.equal(lhs_ty, rhs_ty) {
            return Err(IrError::TypeMismatch {
                ty: rhs_ty,
                reason: "compared operands differ in type",
            });
        }
        if !(self.types.is_arithmetic(lhs_ty) || self.types.is_pointer(lhs_ty)) {
            return Err(IrError::TypeMismatch {
                ty: lhs_ty,
                reason: "only integers, floats and pointers compare",
            });
        }
        Ok(self.new_inst(
            Ty::BOOL,
            InstKind::Compare(pred),
            &[(OperandSlot::Fixed(0), lhs), (OperandSlot::Fixed(1), rhs)],
        ))
    }

    /// `neg` on integers or floats, `not` on integers.
    pub fn build_unary(&mut self, op: UnaryOp, value: ValueId) -> Result<InstId, IrError> {
        let ty = self.operand_type(value, "unary operand")?;
        let ok = match op {
            UnaryOp::Neg => self.types.is_arithmetic(ty),
            UnaryOp::Not => self.types.is_int(ty),
        };
        if !ok {
            return Err(IrError::TypeMismatch {
                ty,
                reason: match op {
                    UnaryOp::Neg => "negation needs an integer or float",
                    UnaryOp::Not => "bitwise not needs an integer",
                },
            });
        }
        let result = self.types.without_const(ty);
        Ok(self.new_inst(
            result,
            InstKind::Unary(op),
            &[(OperandSlot::Fixed(0), value)],
        ))
    }

    /// `cond ? then : otherwise`.
    pub fn build_select(
        &mut self,
        cond: ValueId,
        then: ValueId,
        otherwise: ValueId,
    ) -> Result<InstId, IrError> {
        let cond_ty = self.operand_type(cond, "select condition")?;
        let then_ty = self.operand_type(then, "select value")?;
        let else_ty = self.operand_type(otherwise, "select value")?;
        if !self.types.equal(cond_ty, Ty::BOOL) {
            return Err(IrError::TypeMismatch {
                ty: cond_ty,
                reason: "select condition must be bool",
            });
        }
        if !self.types.equal(then_ty, else_ty) {
            return Err(IrError::TypeMismatch {
                ty: else_ty,
                reason: "select arms differ in type",
            });
        }
        self.expect_instantiable(then_ty, "select arms must be storable values")?;
        let ty = self.types.without_const(then_ty);
        Ok(self.new_inst(
            ty,
            InstKind::Select,
            &[
                (OperandSlot::Fixed(0), cond),
                (OperandSlot::Fixed(1), then),
                (OperandSlot::Fixed(2), otherwise),
            ],
        ))
    }
}
