//! The uniquing type context.
//!
//! # Design
//!
//! All types live in one `Vec<TypeEntry>` indexed by [`Ty`]. A hash map
//! from entry to handle guarantees that registering a structurally
//! identical entry twice yields the same handle. Integers are looked up
//! so often (every constant, every cast) that they get a side index keyed
//! by `(bits, signed, const)`.

use rustc_hash::FxHashMap;

use crate::{Ty, TypeData, TypeEntry, DEFAULT_POINTER_WIDTH};

/// Borrowed view of a function type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FnSignature<'a> {
    pub ret: Ty,
    pub params: &'a [Ty],
    pub variadic: bool,
}

/// Owner of all canonical types of one module.
pub struct TypeContext {
    entries: Vec<TypeEntry>,
    map: FxHashMap<TypeEntry, Ty>,
    /// `(bits, signed, const)` → handle.
    int_index: FxHashMap<(u32, bool, bool), Ty>,
    pointer_width: u32,
}

impl TypeContext {
    /// Create a context with the default pointer width.
    pub fn new() -> Self {
        Self::with_pointer_width(DEFAULT_POINTER_WIDTH)
    }

    /// Create a context for a target with `pointer_width`-bit pointers.
    pub fn with_pointer_width(pointer_width: u32) -> Self {
        let mut ctx = Self {
            entries: Vec::with_capacity(64),
            map: FxHashMap::default(),
            int_index: FxHashMap::default(),
            pointer_width: pointer_width.max(8),
        };

        // Order must match the `Ty` constants.
        let primitives = [
            TypeData::Void,
            TypeData::Label,
            TypeData::Int {
                bits: 1,
                signed: false,
            },
            TypeData::Int {
                bits: 8,
                signed: true,
            },
            TypeData::Int {
                bits: 16,
                signed: true,
            },
            TypeData::Int {
                bits: 32,
                signed: true,
            },
            TypeData::Int {
                bits: 64,
                signed: true,
            },
            TypeData::Int {
                bits: 8,
                signed: false,
            },
            TypeData::Int {
                bits: 16,
                signed: false,
            },
            TypeData::Int {
                bits: 32,
                signed: false,
            },
            TypeData::Int {
                bits: 64,
                signed: false,
            },
            TypeData::Float {
                exp: 8,
                mantissa: 23,
                base: 2,
            },
            TypeData::Float {
                exp: 11,
                mantissa: 52,
                base: 2,
            },
        ];
        for data in primitives {
            ctx.get_or_register(TypeEntry::new(data));
        }
        debug_assert_eq!(ctx.entries.len(), Ty::PRIMITIVE_COUNT as usize);
        ctx
    }

    /// Pointer width in bits.
    #[inline]
    pub fn pointer_width(&self) -> u32 {
        self.pointer_width
    }

    /// Number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the canonical handle for `candidate`, registering it if no
    /// fully equal entry exists yet.
    pub fn get_or_register(&mut self, candidate: TypeEntry) -> Ty {
        if let TypeData::Int { bits, signed } = candidate.data {
            if let Some(&ty) = self.int_index.get(&(bits, signed, candidate.is_const)) {
                return ty;
            }
        }
        if let Some(&ty) = self.map.get(&candidate) {
            return ty;
        }

        debug_assert!(
            self.children_registered(&candidate.data),
            "type entry refers to a handle outside this context"
        );

        let raw = u32::try_from(self.entries.len())
            .unwrap_or_else(|_| panic!("type count exceeds u32::MAX"));
        let ty = Ty::from_raw(raw);
        if let TypeData::Int { bits, signed } = candidate.data {
            self.int_index.insert((bits, signed, candidate.is_const), ty);
        }
        tracing::trace!(ty = raw, data = ?candidate.data, "registered type");
        self.entries.push(candidate.clone());
        self.map.insert(candidate, ty);
        ty
    }

    /// Look up an entry without registering it.
    pub fn lookup(&self, candidate: &TypeEntry) -> Option<Ty> {
        self.map.get(candidate).copied()
    }

    fn children_registered(&self, data: &TypeData) -> bool {
        let len = self.entries.len();
        match data {
            TypeData::Array { elem, .. } => elem.index() < len,
            TypeData::Pointer { pointee } => pointee.index() < len,
            TypeData::Function { ret, params, .. } => {
                ret.index() < len && params.iter().all(|p| p.index() < len)
            }
            _ => true,
        }
    }

    // === Accessors ===

    /// The registered entry behind `ty`.
    ///
    /// # Panics
    ///
    /// Panics if `ty` was not produced by this context.
    #[inline]
    pub fn entry(&self, ty: Ty) -> &TypeEntry {
        &self.entries[ty.index()]
    }

    #[inline]
    pub fn data(&self, ty: Ty) -> &TypeData {
        &self.entry(ty).data
    }

    #[inline]
    pub fn is_const(&self, ty: Ty) -> bool {
        self.entry(ty).is_const
    }

    // === Constructors ===

    pub fn int(&mut self, bits: u32, signed: bool) -> Ty {
        if let Some(&ty) = self.int_index.get(&(bits, signed, false)) {
            return ty;
        }
        self.get_or_register(TypeEntry::new(TypeData::Int { bits, signed }))
    }

    pub fn float(&mut self, exp: u32, mantissa: u32, base: u32) -> Ty {
        self.get_or_register(TypeEntry::new(TypeData::Float {
            exp,
            mantissa,
            base,
        }))
    }

    pub fn array(&mut self, elem: Ty, len: u64) -> Ty {
        self.get_or_register(TypeEntry::new(TypeData::Array { elem, len }))
    }

    pub fn pointer(&mut self, pointee: Ty) -> Ty {
        self.get_or_register(TypeEntry::new(TypeData::Pointer { pointee }))
    }

    pub fn function(&mut self, ret: Ty, params: &[Ty], variadic: bool) -> Ty {
        self.get_or_register(TypeEntry::new(TypeData::Function {
            ret,
            params: params.to_vec(),
            variadic,
        }))
    }

    /// `ty` with its top-level const flag set to `is_const`.
    pub fn with_const(&mut self, ty: Ty, is_const: bool) -> Ty {
        if self.is_const(ty) == is_const {
            return ty;
        }
        let entry = self.entry(ty).clone().with_const(is_const);
        self.get_or_register(entry)
    }

    /// `ty` without its top-level const flag.
    pub fn without_const(&mut self, ty: Ty) -> Ty {
        self.with_const(ty, false)
    }

    // === Kind predicates ===

    #[inline]
    pub fn is_void(&self, ty: Ty) -> bool {
        matches!(self.data(ty), TypeData::Void)
    }

    #[inline]
    pub fn is_label(&self, ty: Ty) -> bool {
        matches!(self.data(ty), TypeData::Label)
    }

    #[inline]
    pub fn is_int(&self, ty: Ty) -> bool {
        matches!(self.data(ty), TypeData::Int { .. })
    }

    #[inline]
    pub fn is_float(&self, ty: Ty) -> bool {
        matches!(self.data(ty), TypeData::Float { .. })
    }

    #[inline]
    pub fn is_pointer(&self, ty: Ty) -> bool {
        matches!(self.data(ty), TypeData::Pointer { .. })
    }

    #[inline]
    pub fn is_array(&self, ty: Ty) -> bool {
        matches!(self.data(ty), TypeData::Array { .. })
    }

    #[inline]
    pub fn is_function(&self, ty: Ty) -> bool {
        matches!(self.data(ty), TypeData::Function { .. })
    }

    /// Integer or float.
    #[inline]
    pub fn is_arithmetic(&self, ty: Ty) -> bool {
        self.is_int(ty) || self.is_float(ty)
    }

    #[inline]
    pub fn is_signed(&self, ty: Ty) -> bool {
        matches!(self.data(ty), TypeData::Int { signed: true, .. })
    }

    /// Whether values of this type can be stored in memory.
    ///
    /// `void`, labels and bare function types are never instantiable;
    /// arrays are instantiable iff their element is.
    pub fn is_instantiable(&self, ty: Ty) -> bool {
        match self.data(ty) {
            TypeData::Void | TypeData::Label | TypeData::Function { .. } => false,
            TypeData::Array { elem, .. } => self.is_instantiable(*elem),
            TypeData::Int { .. } | TypeData::Float { .. } | TypeData::Pointer { .. } => true,
        }
    }

    // === Component queries ===

    pub fn int_bits(&self, ty: Ty) -> Option<u32> {
        match self.data(ty) {
            TypeData::Int { bits, .. } => Some(*bits),
            _ => None,
        }
    }

    /// Total storage bits of a float: sign + exponent + mantissa.
    pub fn float_bits(&self, ty: Ty) -> Option<u32> {
        match self.data(ty) {
            TypeData::Float { exp, mantissa, .. } => Some(1 + exp + mantissa),
            _ => None,
        }
    }

    /// Bit width of a scalar (integer, float or pointer).
    pub fn scalar_bits(&self, ty: Ty) -> Option<u32> {
        match self.data(ty) {
            TypeData::Int { bits, .. } => Some(*bits),
            TypeData::Float { .. } => self.float_bits(ty),
            TypeData::Pointer { .. } => Some(self.pointer_width),
            _ => None,
        }
    }

    pub fn pointee(&self, ty: Ty) -> Option<Ty> {
        match self.data(ty) {
            TypeData::Pointer { pointee } => Some(*pointee),
            _ => None,
        }
    }

    /// Element type of an array or pointer layer.
    pub fn element(&self, ty: Ty) -> Option<Ty> {
        match self.data(ty) {
            TypeData::Pointer { pointee } => Some(*pointee),
            TypeData::Array { elem, .. } => Some(*elem),
            _ => None,
        }
    }

    pub fn array_len(&self, ty: Ty) -> Option<u64> {
        match self.data(ty) {
            TypeData::Array { len, .. } => Some(*len),
            _ => None,
        }
    }

    pub fn fn_signature(&self, ty: Ty) -> Option<FnSignature<'_>> {
        match self.data(ty) {
            TypeData::Function {
                ret,
                params,
                variadic,
            } => Some(FnSignature {
                ret: *ret,
                params,
                variadic: *variadic,
            }),
            _ => None,
        }
    }

    // === Equality levels ===

    /// Same shape and sign, const ignored at every layer.
    pub fn equal(&self, a: Ty, b: Ty) -> bool {
        self.structurally_equal(a, b, false)
    }

    /// Same shape, sign and const ignored at every layer.
    pub fn weak_equal(&self, a: Ty, b: Ty) -> bool {
        self.structurally_equal(a, b, true)
    }

    fn structurally_equal(&self, a: Ty, b: Ty, ignore_sign: bool) -> bool {
        if a == b {
            return true;
        }
        match (self.data(a), self.data(b)) {
            (TypeData::Void, TypeData::Void) | (TypeData::Label, TypeData::Label) => true,
            (
                TypeData::Int {
                    bits: x,
                    signed: sx,
                },
                TypeData::Int {
                    bits: y,
                    signed: sy,
                },
            ) => x == y && (ignore_sign || sx == sy),
            (TypeData::Float { .. }, TypeData::Float { .. }) => self.data(a) == self.data(b),
            (
                TypeData::Array { elem: e1, len: l1 },
                TypeData::Array { elem: e2, len: l2 },
            ) => l1 == l2 && self.structurally_equal(*e1, *e2, ignore_sign),
            (TypeData::Pointer { pointee: p1 }, TypeData::Pointer { pointee: p2 }) => {
                self.structurally_equal(*p1, *p2, ignore_sign)
            }
            (
                TypeData::Function {
                    ret: r1,
                    params: p1,
                    variadic: v1,
                },
                TypeData::Function {
                    ret: r2,
                    params: p2,
                    variadic: v2,
                },
            ) => {
                v1 == v2
                    && p1.len() == p2.len()
                    && self.structurally_equal(*r1, *r2, ignore_sign)
                    && p1
                        .iter()
                        .zip(p2)
                        .all(|(x, y)| self.structurally_equal(*x, *y, ignore_sign))
            }
            _ => false,
        }
    }

    // === Layout ===

    /// Storage size in bytes, `None` for types that are not instantiable.
    pub fn size_in_bytes(&self, ty: Ty) -> Option<u64> {
        match self.data(ty) {
            TypeData::Array { elem, len } => {
                let elem_size = self.size_in_bytes(*elem)?;
                elem_size.checked_mul(*len)
            }
            TypeData::Void | TypeData::Label | TypeData::Function { .. } => None,
            TypeData::Int { .. } | TypeData::Float { .. } | TypeData::Pointer { .. } => {
                let bits = self.scalar_bits(ty)?;
                Some(u64::from(bits.div_ceil(8).max(1)).next_power_of_two())
            }
        }
    }

    /// Natural alignment in bytes, `None` for types that are not instantiable.
    pub fn natural_alignment(&self, ty: Ty) -> Option<u32> {
        match self.data(ty) {
            TypeData::Array { elem, .. } => self.natural_alignment(*elem),
            TypeData::Void | TypeData::Label | TypeData::Function { .. } => None,
            TypeData::Int { .. } | TypeData::Float { .. } | TypeData::Pointer { .. } => {
                let bits = self.scalar_bits(ty)?;
                Some(bits.div_ceil(8).max(1).next_power_of_two())
            }
        }
    }
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}
