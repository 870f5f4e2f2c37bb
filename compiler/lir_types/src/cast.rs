//! Cast capability queries.

use bitflags::bitflags;

use crate::{Ty, TypeContext, TypeData};

bitflags! {
    /// Which conversions are possible from one type to another.
    ///
    /// An empty set means no conversion exists.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct CastCaps: u8 {
        /// The value can be used as-is (types are equal and no const
        /// qualifier behind a pointer is dropped).
        const IMPLICIT = 1 << 0;
        /// A value-preserving conversion instruction exists (extend,
        /// truncate, int/float conversion, pointer/int conversion).
        const STATIC = 1 << 1;
        /// The bits can be reinterpreted as the target (`bitcast`).
        const REINTERPRET = 1 << 2;
    }
}

impl CastCaps {
    /// No conversion exists.
    pub const NONE: Self = Self::empty();
}

impl TypeContext {
    /// Capabilities for converting a value of type `from` to `to`.
    pub fn can_cast_to(&self, from: Ty, to: Ty) -> CastCaps {
        let same_bits = match (self.scalar_bits(from), self.scalar_bits(to)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        let reinterpret = if same_bits {
            CastCaps::REINTERPRET
        } else {
            CastCaps::NONE
        };

        if self.equal(from, to) {
            let mut caps = CastCaps::STATIC | reinterpret;
            if !self.drops_pointee_const(from, to) {
                caps |= CastCaps::IMPLICIT;
            }
            return caps;
        }

        match (self.data(from), self.data(to)) {
            (TypeData::Int { .. }, TypeData::Int { .. })
            | (TypeData::Float { .. }, TypeData::Float { .. })
            | (TypeData::Int { .. }, TypeData::Float { .. })
            | (TypeData::Float { .. }, TypeData::Int { .. })
            | (TypeData::Pointer { .. }, TypeData::Int { .. })
            | (TypeData::Int { .. }, TypeData::Pointer { .. }) => CastCaps::STATIC | reinterpret,
            (TypeData::Pointer { .. }, TypeData::Pointer { .. }) => CastCaps::REINTERPRET,
            _ => CastCaps::NONE,
        }
    }

    /// Whether some pointer layer of `from` points at const data while
    /// the matching layer of `to` does not.
    fn drops_pointee_const(&self, from: Ty, to: Ty) -> bool {
        match (self.data(from), self.data(to)) {
            (TypeData::Pointer { pointee: pf }, TypeData::Pointer { pointee: pt }) => {
                (self.is_const(*pf) && !self.is_const(*pt)) || self.drops_pointee_const(*pf, *pt)
            }
            (TypeData::Array { elem: ef, .. }, TypeData::Array { elem: et, .. }) => {
                self.drops_pointee_const(*ef, *et)
            }
            _ => false,
        }
    }
}
