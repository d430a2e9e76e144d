use kernelcfg_common::KernelConfig;

include!(concat!(env!("OUT_DIR"), "/kernel_config.rs"));

/// Type used for buffer lengths and indices. Fixed, never configured.
pub type SizeT = u64;

/// The symbols resolved by the build script.
pub fn config() -> KernelConfig {
    KernelConfig::new(ELEM, OPERATOR, kernelcfg_common::Ident::from_static(KERNEL_NAME))
}

/// Whether the build script had to default `symbol`.
pub fn is_defaulted(symbol: kernelcfg_common::Symbol) -> bool {
    FALLBACKS.contains(&symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernelcfg_common::{Element, Symbol};

    #[test]
    fn constants_agree_with_each_other() {
        assert_eq!(<TypeT as Element>::ELEM, ELEM);
        assert_eq!(config().elem, ELEM);
        assert_eq!(config().operator, OPERATOR);
        assert_eq!(config().kernel_name.as_str(), KERNEL_NAME);
    }

    #[test]
    fn fallbacks_match_a_fresh_resolution() {
        // Rebinding whatever wasn't defaulted must reproduce the same fallbacks.
        let mut symbols = kernelcfg_common::KernelSymbols::default();
        for symbol in Symbol::CONFIGURABLE {
            if !is_defaulted(symbol) {
                symbols.bind(symbol, &config().value(symbol)).unwrap();
            }
        }

        let resolution = symbols.resolve();

        assert_eq!(resolution.config, config());
        assert_eq!(
            resolution
                .fallbacks
                .iter()
                .map(|fallback| fallback.symbol)
                .collect::<Vec<_>>(),
            FALLBACKS.to_vec()
        );
    }

    #[test]
    fn size_type_is_64_bit_unsigned() {
        assert_eq!(SizeT::MAX, u64::MAX);
    }

    #[test]
    fn derived_name_is_built_from_the_resolved_values() {
        let name = config().derived_name();

        assert_eq!(name.as_str(), format!("{KERNEL_NAME}{}", OPERATOR.ident()));
        assert!(!name.as_str().contains("KERNEL_NAME"));
        assert!(!name.as_str().contains("OPERATOR"));
    }
}
