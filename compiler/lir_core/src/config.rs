//! Module configuration.

use lir_types::DEFAULT_POINTER_WIDTH;

/// Settings fixed at [`Module`](crate::Module) creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IrConfig {
    /// Pointer width in bits, forwarded to the type context.
    pub pointer_width: u32,
    /// Run the structural verifier after block splits, garbage collection
    /// and erasures, logging every violation at `error` level.
    pub verify_edits: bool,
}

impl IrConfig {
    /// Environment variable overriding [`pointer_width`](Self::pointer_width).
    pub const POINTER_WIDTH_VAR: &'static str = "LIR_POINTER_WIDTH";
    /// Environment variable overriding [`verify_edits`](Self::verify_edits).
    /// Accepts `1`/`true`/`on` and `0`/`false`/`off`.
    pub const VERIFY_EDITS_VAR: &'static str = "LIR_VERIFY_EDITS";

    #[must_use]
    pub fn with_pointer_width(mut self, bits: u32) -> Self {
        self.pointer_width = bits;
        self
    }

    #[must_use]
    pub fn with_verify_edits(mut self, on: bool) -> Self {
        self.verify_edits = on;
        self
    }

    /// Defaults overridden by `LIR_POINTER_WIDTH` / `LIR_VERIFY_EDITS`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(Self::POINTER_WIDTH_VAR) {
            match raw.trim().parse::<u32>() {
                Ok(bits) if bits >= 8 => config.pointer_width = bits,
                _ => tracing::warn!(value = %raw, "ignoring invalid {}", Self::POINTER_WIDTH_VAR),
            }
        }
        if let Some(raw) = lookup(Self::VERIFY_EDITS_VAR) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" => config.verify_edits = true,
                "0" | "false" | "off" => config.verify_edits = false,
                _ => tracing::warn!(value = %raw, "ignoring invalid {}", Self::VERIFY_EDITS_VAR),
            }
        }
        config
    }
}

impl Default for IrConfig {
    fn default() -> Self {
        Self {
            pointer_width: DEFAULT_POINTER_WIDTH,
            verify_edits: cfg!(debug_assertions),
        }
    }
}
