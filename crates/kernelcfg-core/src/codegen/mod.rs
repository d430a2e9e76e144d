mod assembler;
mod dialect;
mod prelude;
mod preprocess;

pub use assembler::*;
pub use dialect::*;
pub use prelude::*;
pub use preprocess::*;

use kernelcfg_common::{KernelConfig, config::compilation::DialectKind};

/// The prelude for a dialect chosen at runtime, e.g. from
/// [GlobalConfig](kernelcfg_common::config::GlobalConfig).
pub fn prelude_source(kind: DialectKind, defaults: &KernelConfig) -> String {
    match kind {
        DialectKind::OpenCl => KernelPrelude::<OpenCl>::new(defaults.clone()).to_string(),
        DialectKind::Cuda => KernelPrelude::<Cuda>::new(defaults.clone()).to_string(),
    }
}
