use derive_more::Display;

use crate::{ConfigError, Elem, Ident, Operator};

/// A compile-time symbol shared between the host and the kernel templates.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// The element type, `TYPE_T`.
    #[display("TYPE_T")]
    TypeT,
    /// The size type, `SIZE_T`. Always 64-bit unsigned.
    #[display("SIZE_T")]
    SizeT,
    /// The binary operator, `OPERATOR`.
    #[display("OPERATOR")]
    Operator,
    /// The kernel entry point name, `KERNEL_NAME`.
    #[display("KERNEL_NAME")]
    KernelName,
}

impl Symbol {
    /// The symbols that fall back to a default when they aren't bound.
    pub const CONFIGURABLE: [Symbol; 3] = [Symbol::TypeT, Symbol::Operator, Symbol::KernelName];

    /// The preprocessor macro holding the symbol.
    pub fn macro_name(&self) -> &'static str {
        match self {
            Symbol::TypeT => "TYPE_T",
            Symbol::SizeT => "SIZE_T",
            Symbol::Operator => "OPERATOR",
            Symbol::KernelName => "KERNEL_NAME",
        }
    }

    /// The warning emitted when the symbol had to be defaulted.
    pub fn missing_reason(&self) -> &'static str {
        match self {
            Symbol::TypeT => "missing float type",
            Symbol::SizeT => "missing size type",
            Symbol::Operator => "missing operator",
            Symbol::KernelName => "missing kernel name",
        }
    }

    /// The environment variable a build script reads the symbol from, `None` for the fixed
    /// `SIZE_T`.
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            Symbol::TypeT => Some("KERNELCFG_TYPE_T"),
            Symbol::SizeT => None,
            Symbol::Operator => Some("KERNELCFG_OPERATOR"),
            Symbol::KernelName => Some("KERNELCFG_KERNEL_NAME"),
        }
    }
}

/// A symbol that wasn't bound and received its documented default.
#[derive(new, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fallback {
    /// The defaulted symbol.
    pub symbol: Symbol,
    /// The value it was bound to.
    pub default: String,
}

impl core::fmt::Display for Fallback {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}: {} defaults to {}",
            self.symbol.missing_reason(),
            self.symbol,
            self.default
        )
    }
}

/// The symbols provided by the caller. Anything left unbound falls back on resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelSymbols {
    pub type_t: Option<Elem>,
    pub operator: Option<Operator>,
    pub kernel_name: Option<Ident>,
}

/// A raw symbol value that couldn't be parsed.
#[derive(new, Debug)]
pub struct RejectedValue {
    pub symbol: Symbol,
    pub value: String,
    pub error: ConfigError,
}

impl core::fmt::Display for RejectedValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ignoring {} = `{}`: {}", self.symbol, self.value, self.error)
    }
}

impl KernelSymbols {
    pub fn with_elem(mut self, elem: Elem) -> Self {
        self.type_t = Some(elem);
        self
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_kernel_name(mut self, name: Ident) -> Self {
        self.kernel_name = Some(name);
        self
    }

    /// Parses raw `(symbol, value)` pairs, such as environment variables or config entries.
    ///
    /// Values that don't parse are returned next to the symbols instead of failing: they are
    /// left unbound, so resolution gives them their default and warns about it.
    pub fn from_raw<'a>(
        raw: impl IntoIterator<Item = (Symbol, &'a str)>,
    ) -> (Self, Vec<RejectedValue>) {
        let mut symbols = Self::default();
        let mut rejected = Vec::new();

        for (symbol, value) in raw {
            if let Err(error) = symbols.bind(symbol, value) {
                rejected.push(RejectedValue::new(symbol, value.to_string(), error));
            }
        }

        (symbols, rejected)
    }

    /// Binds a symbol from its textual value.
    ///
    /// A symbol is bound at most once; binding it again is an error even with the same value.
    pub fn bind(&mut self, symbol: Symbol, value: &str) -> Result<(), ConfigError> {
        if symbol == Symbol::SizeT {
            return Err(ConfigError::Fixed(symbol));
        }

        if let Some(current) = self.value(symbol) {
            return Err(ConfigError::AlreadyBound {
                symbol,
                value: current,
            });
        }

        match symbol {
            Symbol::TypeT => self.type_t = Some(value.parse()?),
            Symbol::Operator => self.operator = Some(value.parse()?),
            Symbol::KernelName => self.kernel_name = Some(value.parse()?),
            Symbol::SizeT => unreachable!("checked above"),
        }

        Ok(())
    }

    /// The bound value of `symbol`, as it is spelled in kernel source.
    pub fn value(&self, symbol: Symbol) -> Option<String> {
        match symbol {
            Symbol::TypeT => self.type_t.map(|elem| elem.c_name().to_string()),
            Symbol::Operator => self.operator.map(|op| op.token().to_string()),
            Symbol::KernelName => self.kernel_name.as_ref().map(Ident::to_string),
            Symbol::SizeT => Some(SIZE_T_NAME.to_string()),
        }
    }

    pub fn is_bound(&self, symbol: Symbol) -> bool {
        self.value(symbol).is_some()
    }

    /// Binds every missing symbol to its documented default.
    ///
    /// Never fails. Each defaulted symbol is reported exactly once in the returned
    /// [fallbacks](Resolution::fallbacks), and bound symbols pass through unchanged.
    pub fn resolve(&self) -> Resolution {
        let defaults = KernelConfig::default();
        let mut fallbacks = Vec::new();

        let elem = self.type_t.unwrap_or_else(|| {
            fallbacks.push(Fallback::new(Symbol::TypeT, defaults.elem.c_name().into()));
            defaults.elem
        });
        let operator = self.operator.unwrap_or_else(|| {
            fallbacks.push(Fallback::new(
                Symbol::Operator,
                defaults.operator.token().into(),
            ));
            defaults.operator
        });
        let kernel_name = match &self.kernel_name {
            Some(name) => name.clone(),
            None => {
                fallbacks.push(Fallback::new(
                    Symbol::KernelName,
                    defaults.kernel_name.to_string(),
                ));
                defaults.kernel_name
            }
        };

        Resolution {
            config: KernelConfig::new(elem, operator, kernel_name),
            fallbacks,
        }
    }
}

/// The spelling of the size type in kernel source.
pub const SIZE_T_NAME: &str = "ulong";

/// Fully bound kernel symbols.
#[derive(new, Debug, Clone, PartialEq, Eq, Hash)]
pub struct KernelConfig {
    pub elem: Elem,
    pub operator: Operator,
    pub kernel_name: Ident,
}

impl Default for KernelConfig {
    /// `float`, `+` and `add`.
    fn default() -> Self {
        Self {
            elem: Elem::default(),
            operator: Operator::default(),
            kernel_name: Ident::default(),
        }
    }
}

impl KernelConfig {
    /// The same bindings, as caller-provided symbols.
    ///
    /// Resolving them again yields this configuration without any fallback.
    pub fn symbols(&self) -> KernelSymbols {
        KernelSymbols {
            type_t: Some(self.elem),
            operator: Some(self.operator),
            kernel_name: Some(self.kernel_name.clone()),
        }
    }

    /// The value bound to `symbol`, as spelled in kernel source.
    pub fn value(&self, symbol: Symbol) -> String {
        match symbol {
            Symbol::TypeT => self.elem.c_name().to_string(),
            Symbol::SizeT => SIZE_T_NAME.to_string(),
            Symbol::Operator => self.operator.token().to_string(),
            Symbol::KernelName => self.kernel_name.to_string(),
        }
    }

    /// `<kernel><operator>`, composed from the resolved values.
    pub fn derived_name(&self) -> Ident {
        Ident::concat(&self.kernel_name, &self.operator.ident())
    }
}

/// The outcome of resolving [kernel symbols](KernelSymbols).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The bindings, defaults included.
    pub config: KernelConfig,
    /// One entry per defaulted symbol, in declaration order.
    pub fallbacks: Vec<Fallback>,
}

impl Resolution {
    /// Whether every symbol was provided by the caller.
    pub fn is_complete(&self) -> bool {
        self.fallbacks.is_empty()
    }

    /// Whether `symbol` received its default.
    pub fn defaulted(&self, symbol: Symbol) -> bool {
        self.fallbacks.iter().any(|fallback| fallback.symbol == symbol)
    }

    /// Logs one warning per fallback.
    pub fn log_fallbacks(&self) {
        for fallback in self.fallbacks.iter() {
            log::warn!("{fallback}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn only_configurable_symbols_have_a_variable() {
        for symbol in Symbol::CONFIGURABLE {
            assert_eq!(
                symbol.env_var(),
                Some(format!("KERNELCFG_{}", symbol.macro_name()).as_str())
            );
        }
        assert_eq!(Symbol::SizeT.env_var(), None);
    }

    #[test]
    fn bound_symbols_pass_through() {
        let symbols = KernelSymbols::default()
            .with_elem(Elem::F64)
            .with_operator(Operator::Mul)
            .with_kernel_name(Ident::from_static("mul"));

        let resolution = symbols.resolve();

        assert!(resolution.is_complete());
        assert_eq!(
            resolution.config,
            KernelConfig::new(Elem::F64, Operator::Mul, Ident::from_static("mul"))
        );
    }

    #[test]
    fn missing_symbols_default_with_one_warning_each() {
        let resolution = KernelSymbols::default().resolve();

        assert_eq!(resolution.config, KernelConfig::default());
        assert_eq!(
            resolution.fallbacks,
            vec![
                Fallback::new(Symbol::TypeT, "float".into()),
                Fallback::new(Symbol::Operator, "+".into()),
                Fallback::new(Symbol::KernelName, "add".into()),
            ]
        );
    }

    #[test]
    fn only_missing_symbols_are_reported() {
        let resolution = KernelSymbols::default().with_elem(Elem::F16).resolve();

        assert_eq!(resolution.config.elem, Elem::F16);
        assert!(!resolution.defaulted(Symbol::TypeT));
        assert!(resolution.defaulted(Symbol::Operator));
        assert!(resolution.defaulted(Symbol::KernelName));
        assert_eq!(resolution.fallbacks.len(), 2);
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        let first = KernelSymbols::default().resolve();
        let second = first.config.symbols().resolve();

        assert_eq!(second.config, first.config);
        assert!(second.is_complete());
    }

    #[test]
    fn fallback_message_names_symbol_and_reason() {
        let fallback = Fallback::new(Symbol::Operator, "+".into());

        assert_eq!(
            fallback.to_string(),
            "missing operator: OPERATOR defaults to +"
        );
    }

    #[test]
    fn rebinding_is_rejected() {
        let mut symbols = KernelSymbols::default();
        symbols.bind(Symbol::TypeT, "double").unwrap();

        let err = symbols.bind(Symbol::TypeT, "double").unwrap_err();

        assert!(matches!(
            err,
            ConfigError::AlreadyBound { symbol: Symbol::TypeT, ref value } if value == "double"
        ));
        assert!(matches!(
            symbols.bind(Symbol::SizeT, "uint"),
            Err(ConfigError::Fixed(Symbol::SizeT))
        ));
    }

    #[test]
    fn raw_values_that_do_not_parse_stay_unbound() {
        let (symbols, rejected) = KernelSymbols::from_raw([
            (Symbol::TypeT, "int"),
            (Symbol::Operator, "*"),
            (Symbol::KernelName, "mul"),
        ]);

        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].symbol, Symbol::TypeT);
        assert!(!symbols.is_bound(Symbol::TypeT));

        let resolution = symbols.resolve();
        assert_eq!(resolution.config.operator, Operator::Mul);
        assert!(resolution.defaulted(Symbol::TypeT));
    }

    #[test]
    fn derived_name_uses_values() {
        let config = KernelConfig::new(Elem::F32, Operator::Sub, Ident::from_static("vec_"));

        assert_eq!(config.derived_name().as_str(), "vec_sub");
    }
}
