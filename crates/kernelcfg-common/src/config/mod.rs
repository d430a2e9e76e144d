/// Compilation config module.
pub mod compilation;
/// Kernel symbols config module.
pub mod kernel;

mod base;

pub use base::*;
