//! Conversion instructions.

use lir_types::{CastCaps, Ty};

use crate::error::IrError;
use crate::instr::{CastOp, InstKind};
use crate::module::Module;
use crate::value::{InstId, OperandSlot, ValueId};

impl Module {
    /// Convert `value` to `to` with an explicit cast kind.
    ///
    /// | Cast | Rule |
    /// |------|------|
    /// | `trunc` | int to narrower int |
    /// | `zext`, `sext` | int to wider int |
    /// | `fptrunc` | float to narrower float |
    /// | `fpext` | float to wider float |
    /// | `fptoint`, `inttofp` | float to int, int to float |
    /// | `ptrtoint`, `inttoptr` | pointer to int, int to pointer |
    /// | `bitcast` | same bit width, any scalar kinds |
    pub fn build_cast(&mut self, op: CastOp, value: ValueId, to: Ty) -> Result<InstId, IrError> {
        let from = self.operand_type(value, "cast operand")?;
        self.expect_instantiable(to, "cast target must be a storable type")?;
        self.check_cast(op, from, to)?;
        Ok(self.new_inst(
            to,
            InstKind::Cast(op),
            &[(OperandSlot::Fixed(0), value)],
        ))
    }

    fn check_cast(&self, op: CastOp, from: Ty, to: Ty) -> Result<(), IrError> {
        let types = &self.types;
        let int_bits = |ty| types.int_bits(ty);
        let float_bits = |ty| types.float_bits(ty);
        let ok = match op {
            CastOp::Trunc => matches!((int_bits(from), int_bits(to)), (Some(a), Some(b)) if b < a),
            CastOp::ZExt | CastOp::SExt => {
                matches!((int_bits(from), int_bits(to)), (Some(a), Some(b)) if b > a)
            }
            CastOp::FpTrunc => {
                matches!((float_bits(from), float_bits(to)), (Some(a), Some(b)) if b < a)
            }
            CastOp::FpExt => {
                matches!((float_bits(from), float_bits(to)), (Some(a), Some(b)) if b > a)
            }
            CastOp::FpToInt => types.is_float(from) && types.is_int(to),
            CastOp::IntToFp => types.is_int(from) && types.is_float(to),
            CastOp::PtrToInt => types.is_pointer(from) && types.is_int(to),
            CastOp::IntToPtr => types.is_int(from) && types.is_pointer(to),
            CastOp::Bitcast => types.can_cast_to(from, to).contains(CastCaps::REINTERPRET),
        };
        if ok {
            Ok(())
        } else {
            Err(IrError::TypeMismatch {
                ty: from,
                reason: cast_rule(op),
            })
        }
    }

    /// Pick the cast from the operand and target shapes: `sext`/`zext`
    /// (by operand sign) or `trunc` between integers, `fpext`/`fptrunc`
    /// between floats, otherwise `bitcast` between equal widths.
    pub fn build_cast_auto(&mut self, value: ValueId, to: Ty) -> Result<InstId, IrError> {
        let from = self.operand_type(value, "cast operand")?;
        let op = self.pick_cast(from, to).ok_or(IrError::TypeMismatch {
            ty: to,
            reason: "no cast converts between these types",
        })?;
        self.build_cast(op, value, to)
    }

    fn pick_cast(&self, from: Ty, to: Ty) -> Option<CastOp> {
        let types = &self.types;
        if let (Some(a), Some(b)) = (types.int_bits(from), types.int_bits(to)) {
            return Some(match b.cmp(&a) {
                std::cmp::Ordering::Greater if types.is_signed(from) => CastOp::SExt,
                std::cmp::Ordering::Greater => CastOp::ZExt,
                std::cmp::Ordering::Less => CastOp::Trunc,
                std::cmp::Ordering::Equal => CastOp::Bitcast,
            });
        }
        if let (Some(a), Some(b)) = (types.float_bits(from), types.float_bits(to)) {
            return Some(match b.cmp(&a) {
                std::cmp::Ordering::Greater => CastOp::FpExt,
                std::cmp::Ordering::Less => CastOp::FpTrunc,
                std::cmp::Ordering::Equal => CastOp::Bitcast,
            });
        }
        types
            .can_cast_to(from, to)
            .contains(CastCaps::REINTERPRET)
            .then_some(CastOp::Bitcast)
    }
}

fn cast_rule(op: CastOp) -> &'static str {
    match op {
        CastOp::Trunc => "trunc needs an integer narrowed to a smaller integer",
        CastOp::ZExt | CastOp::SExt => "extension needs an integer widened to a larger integer",
        CastOp::FpTrunc => "fptrunc needs a float narrowed to a smaller float",
        CastOp::FpExt => "fpext needs a float widened to a larger float",
        CastOp::FpToInt => "fptoint converts a float to an integer",
        CastOp::IntToFp => "inttofp converts an integer to a float",
        CastOp::PtrToInt => "ptrtoint converts a pointer to an integer",
        CastOp::IntToPtr => "inttoptr converts an integer to a pointer",
        CastOp::Bitcast => "bitcast needs types of equal bit width",
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for concise assertions")]
mod tests;
