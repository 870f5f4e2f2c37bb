//! The module: owner of functions, globals and the type context.
//!
//! Functions and global variables share one symbol name space. The module
//! holds the owning handle of every symbol it lists; erasing a symbol
//! gives that handle up.

use lir_types::{Ty, TypeContext};
use rustc_hash::FxHashMap;

use crate::config::IrConfig;
use crate::error::DefineError;
use crate::name::{Interner, Name};
use crate::ownership::Arena;
use crate::value::{FuncId, GlobalId, OperandSlot, UseData, ValueData, ValueId, ValueKind};

/// Global variable payload. The initializer, if any, is operand 0.
pub struct GlobalData {
    pub(crate) content: Ty,
    pub(crate) is_constant: bool,
}

/// A translation unit: symbols, the value graph and its types.
pub struct Module {
    name: String,
    pub(crate) config: IrConfig,
    pub(crate) types: TypeContext,
    pub(crate) names: Interner,
    pub(crate) values: Arena<ValueData>,
    pub(crate) uses: Arena<UseData>,
    pub(crate) symbols: FxHashMap<Name, ValueId>,
    pub(crate) functions: Vec<FuncId>,
    pub(crate) globals: Vec<GlobalId>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, IrConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: IrConfig) -> Self {
        Self {
            name: name.into(),
            types: TypeContext::with_pointer_width(config.pointer_width),
            config,
            names: Interner::new(),
            values: Arena::new(),
            uses: Arena::new(),
            symbols: FxHashMap::default(),
            functions: Vec::new(),
            globals: Vec::new(),
        }
    }

    pub fn module_name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &IrConfig {
        &self.config
    }

    pub fn types(&self) -> &TypeContext {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeContext {
        &mut self.types
    }

    // ── Symbols ─────────────────────────────────────────────────────

    /// Declare a function. It stays a declaration until its first block
    /// is appended.
    pub fn add_function(&mut self, name: &str, fn_ty: Ty) -> Result<FuncId, DefineError> {
        self.check_symbol_free(name)?;
        if !self.types.is_function(fn_ty) {
            return Err(DefineError::InvalidType { ty: fn_ty });
        }
        let func = self.new_function(fn_ty);
        let sym = self.names.intern(name);
        self.data_mut(func.value()).name = Some(sym);
        self.symbols.insert(sym, func.value());
        self.functions.push(func);
        tracing::trace!(name, "function added");
        Ok(func)
    }

    /// Define a global variable holding a `content` value. Its own type is
    /// `pointer(content)`.
    pub fn add_global(
        &mut self,
        name: &str,
        content: Ty,
        initializer: Option<ValueId>,
    ) -> Result<GlobalId, DefineError> {
        self.check_symbol_free(name)?;
        if !self.types.is_instantiable(content) {
            return Err(DefineError::InvalidType { ty: content });
        }
        if let Some(init) = initializer {
            self.check_initializer(content, init)?;
        }
        let ty = self.types.pointer(content);
        let data = GlobalData {
            content,
            is_constant: false,
        };
        let global = GlobalId::from_value(self.alloc_value(ty, ValueKind::Global(data)));
        if let Some(init) = initializer {
            self.add_operand(global.value(), OperandSlot::Fixed(0), init);
        }
        let sym = self.names.intern(name);
        self.data_mut(global.value()).name = Some(sym);
        self.symbols.insert(sym, global.value());
        self.globals.push(global);
        tracing::trace!(name, "global added");
        Ok(global)
    }

    fn check_symbol_free(&self, name: &str) -> Result<(), DefineError> {
        if self.symbol(name).is_some() {
            return Err(DefineError::Duplicate {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    fn check_initializer(&self, content: Ty, init: ValueId) -> Result<(), DefineError> {
        if !self.is_live(init) || self.constant(init).is_none() {
            return Err(DefineError::InvalidInitializer);
        }
        if !self.types.equal(self.type_of(init), content) {
            return Err(DefineError::InvalidInitializer);
        }
        Ok(())
    }

    /// Function or global named `name`.
    pub fn symbol(&self, name: &str) -> Option<ValueId> {
        let sym = self.names.get(name)?;
        self.symbols.get(&sym).copied()
    }

    pub fn function(&self, name: &str) -> Option<FuncId> {
        self.as_func(self.symbol(name)?)
    }

    pub fn global(&self, name: &str) -> Option<GlobalId> {
        self.as_global(self.symbol(name)?)
    }

    /// Functions in definition order.
    pub fn functions(&self) -> &[FuncId] {
        &self.functions
    }

    /// Globals in definition order.
    pub fn globals(&self) -> &[GlobalId] {
        &self.globals
    }

    /// Move a function or global to a new symbol name. Locals are named
    /// with [`set_name`](Self::set_name) and never enter the table.
    pub fn rename(&mut self, symbol: impl Into<ValueId>, new_name: &str) -> Result<(), DefineError> {
        let symbol = symbol.into();
        if !self.is_live(symbol) || !self.is_symbol(symbol) {
            return Err(DefineError::NotASymbol);
        }
        if let Some(taken) = self.symbol(new_name) {
            if taken == symbol {
                return Ok(());
            }
            return Err(DefineError::Duplicate {
                name: new_name.to_owned(),
            });
        }
        self.unregister_symbol(symbol);
        let sym = self.names.intern(new_name);
        self.symbols.insert(sym, symbol);
        self.data_mut(symbol).name = Some(sym);
        Ok(())
    }

    /// Name a local value. Symbols go through [`rename`](Self::rename) so
    /// the shared name space stays consistent.
    pub fn set_name(&mut self, value: impl Into<ValueId>, name: &str) -> Result<(), DefineError> {
        let value = value.into();
        if self.is_symbol(value) {
            return self.rename(value, name);
        }
        let sym = self.names.intern(name);
        self.data_mut(value).name = Some(sym);
        Ok(())
    }

    pub(crate) fn is_symbol(&self, value: ValueId) -> bool {
        matches!(
            self.data(value).kind,
            ValueKind::Function(_) | ValueKind::Global(_)
        )
    }

    // ── Globals ─────────────────────────────────────────────────────

    fn global_data(&self, global: GlobalId) -> &GlobalData {
        match &self.data(global.value()).kind {
            ValueKind::Global(data) => data,
            _ => unreachable!("{global:?} is not a global"),
        }
    }

    pub fn global_content_type(&self, global: GlobalId) -> Ty {
        self.global_data(global).content
    }

    pub fn is_constant_global(&self, global: GlobalId) -> bool {
        self.global_data(global).is_constant
    }

    pub fn set_constant_global(&mut self, global: GlobalId, is_constant: bool) {
        if let ValueKind::Global(data) = &mut self.data_mut(global.value()).kind {
            data.is_constant = is_constant;
        }
    }

    pub fn initializer(&self, global: GlobalId) -> Option<ValueId> {
        self.operand(global.value(), 0)
    }

    /// Replace or clear the initializer.
    pub fn set_initializer(
        &mut self,
        global: GlobalId,
        initializer: Option<ValueId>,
    ) -> Result<(), DefineError> {
        let content = self.global_content_type(global);
        if let Some(init) = initializer {
            self.check_initializer(content, init)?;
        }
        if initializer == self.initializer(global) {
            return Ok(());
        }
        self.clear_operands(global.value());
        if let Some(init) = initializer {
            self.add_operand(global.value(), OperandSlot::Fixed(0), init);
        }
        Ok(())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for concise assertions")]
mod tests;
