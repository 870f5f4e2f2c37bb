//! Calls.

use super::indexed;
use crate::error::IrError;
use crate::instr::InstKind;
use crate::module::Module;
use crate::value::{InstId, OperandSlot, ValueId};

impl Module {
    /// Call `callee`, a pointer to a function, with `args`.
    ///
    /// Arguments must match the parameters one for one (at least as many
    /// for a variadic callee, extras only need to be storable). The result
    /// has the callee's return type.
    pub fn build_call(&mut self, callee: ValueId, args: &[ValueId]) -> Result<InstId, IrError> {
        let callee_ty = self.operand_type(callee, "callee")?;
        let fn_ty = self
            .types
            .pointee(callee_ty)
            .filter(|&ty| self.types.is_function(ty))
            .ok_or(IrError::TypeMismatch {
                ty: callee_ty,
                reason: "callee is not a function pointer",
            })?;
        let (ret, params, variadic) = match self.types.fn_signature(fn_ty) {
            Some(sig) => (sig.ret, sig.params.to_vec(), sig.variadic),
            None => {
                return Err(IrError::TypeMismatch {
                    ty: fn_ty,
                    reason: "callee is not a function pointer",
                })
            }
        };
        let arity_ok = if variadic {
            args.len() >= params.len()
        } else {
            args.len() == params.len()
        };
        if !arity_ok {
            return Err(IrError::TypeMismatch {
                ty: fn_ty,
                reason: "argument count does not match the signature",
            });
        }
        for (i, &arg) in args.iter().enumerate() {
            let ty = self.operand_type(arg, "call argument")?;
            match params.get(i) {
                Some(&param) if !self.types.equal(ty, param) => {
                    return Err(IrError::TypeMismatch {
                        ty,
                        reason: "argument type does not match the parameter",
                    });
                }
                Some(_) => {}
                None => self.expect_instantiable(ty, "variadic argument must be storable")?,
            }
        }
        let mut operands = vec![(OperandSlot::Fixed(0), callee)];
        operands.extend(args.iter().enumerate().map(|(i, &v)| (indexed(i), v)));
        Ok(self.new_inst(ret, InstKind::Call, &operands))
    }

    /// Callee operand of a call.
    pub fn callee(&self, call: InstId) -> Option<ValueId> {
        match self.inst_data(call).kind {
            InstKind::Call => self.operand(call, 0),
            _ => None,
        }
    }

    /// Argument operands of a call.
    pub fn call_args(&self, call: InstId) -> Vec<ValueId> {
        match self.inst_data(call).kind {
            InstKind::Call => self.operand_values(call.value()).split_off(1),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for concise assertions")]
mod tests;
