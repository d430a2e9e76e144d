use thiserror::Error;

use crate::Symbol;

/// An error while binding or loading kernel configuration.
#[derive(Error)]
pub enum ConfigError {
    /// The element type isn't one the kernels can be specialized on.
    #[error("Unknown element type `{0}`, expected one of half, float, double")]
    UnknownElem(String),

    /// The operator isn't one of the supported binary operators.
    #[error("Unknown operator `{0}`, expected one of + - * /")]
    UnknownOperator(String),

    /// The kernel name isn't a valid identifier.
    #[error("`{0}` is not a valid identifier")]
    InvalidIdent(String),

    /// The symbol was already bound in this compilation unit.
    #[error("{symbol} is already bound to `{value}` and can't be redefined")]
    AlreadyBound {
        /// The symbol being rebound.
        symbol: Symbol,
        /// The value it is bound to.
        value: String,
    },

    /// The size type is fixed and can't be bound.
    #[error("{0} is fixed and can't be bound")]
    Fixed(Symbol),

    /// The configuration file couldn't be read.
    #[error("Unable to read the configuration file\nCaused by:\n  {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file doesn't have the right format.
    #[error("The configuration file doesn't have the right format\nCaused by:\n  {0}")]
    Format(#[from] toml::de::Error),
}

impl core::fmt::Debug for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{self}"))
    }
}
