//! Shared building blocks for kernelcfg.
//!
//! This crate holds everything that has to be available both to build scripts and to the
//! kernels' host side: the element and operator vocabularies, validated identifiers, the
//! symbol resolution that binds documented defaults, and the global configuration.

#[macro_use]
extern crate derive_new;

/// Build script helpers.
pub mod build;
/// Global configuration, loaded from `kernelcfg.toml` and the environment.
pub mod config;

mod elem;
mod error;
mod ident;
mod operator;
mod symbol;

pub use elem::*;
pub use error::*;
pub use ident::*;
pub use operator::*;
pub use symbol::*;
