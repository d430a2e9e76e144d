pub use crate::codegen::{
    Cuda, Dialect, KernelPrelude, KernelSource, KernelVariant, OpenCl, SourceAssembler,
};
pub use crate::debug::{DebugMode, print_array};
pub use crate::defaults::{KERNEL_NAME, OPERATOR, SizeT, TypeT};
pub use crate::{CompilationUnit, CubeDim, UnitPos, launch_group};

/// Elements
pub use kernelcfg_common::{Elem, Element, Operator};
pub use kernelcfg_common::{Ident, KernelConfig, KernelSymbols, Symbol};
