use crate::{KernelSymbols, RejectedValue, Symbol};

/// Kernel symbols as written in `kernelcfg.toml`.
///
/// Values are kept raw so that a bad entry only costs its own symbol, which then falls back to
/// its default like any missing one.
#[derive(Default, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KernelSymbolsConfig {
    /// Element type, e.g. `float` or `f64`.
    #[serde(default)]
    pub type_t: Option<String>,

    /// Operator token or name, e.g. `*` or `mul`.
    #[serde(default)]
    pub operator: Option<String>,

    /// Kernel entry point name.
    #[serde(default)]
    pub kernel_name: Option<String>,
}

impl KernelSymbolsConfig {
    /// Parses the configured symbols, setting aside the values that don't parse.
    pub fn symbols(&self) -> (KernelSymbols, Vec<RejectedValue>) {
        let raw = [
            (Symbol::TypeT, &self.type_t),
            (Symbol::Operator, &self.operator),
            (Symbol::KernelName, &self.kernel_name),
        ];

        KernelSymbols::from_raw(
            raw.into_iter()
                .filter_map(|(symbol, value)| value.as_deref().map(|value| (symbol, value))),
        )
    }

    pub(crate) fn set(&mut self, symbol: Symbol, value: String) {
        match symbol {
            Symbol::TypeT => self.type_t = Some(value),
            Symbol::Operator => self.operator = Some(value),
            Symbol::KernelName => self.kernel_name = Some(value),
            Symbol::SizeT => {}
        }
    }
}
