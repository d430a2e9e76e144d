//! Compile-time configuration for parametric kernels.
//!
//! Kernel templates are specialized on an element type, a binary operator and a kernel name.
//! Those are normally injected by the code assembling the kernel, and fall back to documented
//! defaults, with a warning, when that didn't happen. This crate provides both renditions of
//! that mechanism:
//!
//! - on the host, the [defaults] module exposes the resolved symbols as constants produced by the
//!   build script, and [debug::print_array] is compiled in only with `cfg(kernel_debug)`;
//! - for the device, [codegen] generates the kernel prelude header and assembles template
//!   sources with the symbols bound.

#[macro_use]
extern crate derive_new;

/// Kernel source generation.
pub mod codegen;
/// Lane-gated debug printing.
pub mod debug;
/// Symbols resolved at build time.
pub mod defaults;
pub mod prelude;

mod compilation;
mod unit;

pub use compilation::*;
pub use unit::*;

pub use kernelcfg_common::{
    ConfigError, Elem, Element, Fallback, Ident, KernelConfig, KernelSymbols, Operator,
    Resolution, Symbol, config::GlobalConfig,
};
