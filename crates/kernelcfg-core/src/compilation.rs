use std::sync::OnceLock;

use kernelcfg_common::{ConfigError, Fallback, KernelConfig, KernelSymbols, Resolution, Symbol};

/// The host-side view of one compilation unit including the kernel prelude.
///
/// Symbols are defined first, then the prelude is [included](Self::include). The first inclusion
/// binds every missing symbol to its default and warns once per defaulted symbol; any later
/// inclusion returns the same bindings without a new diagnostic. Symbols can't be redefined once
/// the prelude was included.
#[derive(Debug, Default)]
pub struct CompilationUnit {
    symbols: KernelSymbols,
    resolved: OnceLock<Resolution>,
}

impl CompilationUnit {
    pub fn new(symbols: KernelSymbols) -> Self {
        Self {
            symbols,
            resolved: OnceLock::new(),
        }
    }

    /// Binds `symbol` from its textual value, like `#define` ahead of the prelude.
    pub fn define(&mut self, symbol: Symbol, value: &str) -> Result<(), ConfigError> {
        if let Some(resolution) = self.resolved.get() {
            return Err(ConfigError::AlreadyBound {
                symbol,
                value: resolution.config.value(symbol),
            });
        }

        self.symbols.bind(symbol, value)
    }

    /// Includes the prelude, resolving the symbols on first inclusion only.
    pub fn include(&self) -> &KernelConfig {
        &self
            .resolved
            .get_or_init(|| {
                let resolution = self.symbols.resolve();
                resolution.log_fallbacks();
                resolution
            })
            .config
    }

    /// Whether the prelude was included at least once.
    pub fn is_included(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// The diagnostics emitted by the first inclusion.
    pub fn fallbacks(&self) -> &[Fallback] {
        self.resolved
            .get()
            .map(|resolution| resolution.fallbacks.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernelcfg_common::{Elem, Operator};
    use pretty_assertions::assert_eq;

    #[test]
    fn predefined_symbols_survive_inclusion() {
        let mut unit = CompilationUnit::default();
        unit.define(Symbol::TypeT, "double").unwrap();
        unit.define(Symbol::Operator, "*").unwrap();
        unit.define(Symbol::KernelName, "mul").unwrap();

        let config = unit.include().clone();

        assert_eq!(config.elem, Elem::F64);
        assert_eq!(config.operator, Operator::Mul);
        assert_eq!(config.kernel_name.as_str(), "mul");
        assert!(unit.fallbacks().is_empty());
    }

    #[test]
    fn missing_symbols_warn_once_each() {
        let unit = CompilationUnit::default();

        assert_eq!(unit.include(), &KernelConfig::default());
        assert_eq!(
            unit.fallbacks()
                .iter()
                .map(|fallback| fallback.symbol.missing_reason())
                .collect::<Vec<_>>(),
            vec!["missing float type", "missing operator", "missing kernel name"]
        );
    }

    #[test]
    fn second_inclusion_is_a_no_op() {
        let unit = CompilationUnit::new(KernelSymbols::default().with_elem(Elem::F16));

        let first = unit.include().clone();
        let second = unit.include().clone();

        assert_eq!(first, second);
        assert_eq!(unit.fallbacks().len(), 2);
    }

    #[test]
    fn redefinition_after_inclusion_is_rejected() {
        let mut unit = CompilationUnit::default();
        assert!(!unit.is_included());
        unit.include();

        let err = unit.define(Symbol::KernelName, "sub").unwrap_err();

        assert!(matches!(
            err,
            ConfigError::AlreadyBound { symbol: Symbol::KernelName, ref value } if value == "add"
        ));
        assert_eq!(unit.include().kernel_name.as_str(), "add");
    }

    #[test]
    fn no_diagnostics_before_inclusion() {
        let unit = CompilationUnit::default();

        assert!(unit.fallbacks().is_empty());
    }
}
