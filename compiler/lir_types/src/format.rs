//! Human-readable rendering of types.

use std::fmt;

use crate::{Ty, TypeContext, TypeData};

/// `Display` adapter returned by [`TypeContext::display`].
pub struct TypeDisplay<'a> {
    ctx: &'a TypeContext,
    ty: Ty,
}

impl TypeContext {
    /// Render `ty`, e.g. `i32`, `[4 x u8]`, `const i8*`, `i32 (i8*, ...)`.
    pub fn display(&self, ty: Ty) -> TypeDisplay<'_> {
        TypeDisplay { ctx: self, ty }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = self.ctx;
        let entry = ctx.entry(self.ty);
        if entry.is_const {
            f.write_str("const ")?;
        }
        match &entry.data {
            TypeData::Void => f.write_str("void"),
            TypeData::Label => f.write_str("label"),
            TypeData::Int { bits, signed } => {
                write!(f, "{}{bits}", if *signed { 'i' } else { 'u' })
            }
            TypeData::Float {
                exp: 8,
                mantissa: 23,
                base: 2,
            } => f.write_str("f32"),
            TypeData::Float {
                exp: 11,
                mantissa: 52,
                base: 2,
            } => f.write_str("f64"),
            TypeData::Float {
                exp,
                mantissa,
                base,
            } => write!(f, "float<{exp}, {mantissa}, {base}>"),
            TypeData::Array { elem, len } => write!(f, "[{len} x {}]", ctx.display(*elem)),
            TypeData::Pointer { pointee } => write!(f, "{}*", ctx.display(*pointee)),
            TypeData::Function {
                ret,
                params,
                variadic,
            } => {
                write!(f, "{} (", ctx.display(*ret))?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", ctx.display(*p))?;
                }
                if *variadic {
                    if !params.is_empty() {
                        f.write_str(", ")?;
                    }
                    f.write_str("...")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests;
