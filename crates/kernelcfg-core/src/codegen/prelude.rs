use std::fmt::Display;
use std::marker::PhantomData;

use kernelcfg_common::{KernelConfig, Symbol};

use super::Dialect;

/// File name templates include the prelude as.
pub const PRELUDE_FILE: &str = "kernel_defaults.h";

/// Guard against a second inclusion of the prelude in the same unit.
pub const INCLUDE_GUARD: &str = "KERNEL_DEFAULTS_H";

/// The kernel prelude header.
///
/// Binds `TYPE_T`, `OPERATOR` and `KERNEL_NAME` to the defaults of [KernelConfig] when they
/// weren't defined before inclusion, with a `#warning` for each, defines the fixed `SIZE_T`, the
/// two-stage `CONCAT` macro and the `print_array` helper, compiled in only with `DEBUG`.
#[derive(Debug, Clone)]
pub struct KernelPrelude<D: Dialect> {
    defaults: KernelConfig,
    _dialect: PhantomData<D>,
}

impl<D: Dialect> Default for KernelPrelude<D> {
    fn default() -> Self {
        Self::new(KernelConfig::default())
    }
}

impl<D: Dialect> KernelPrelude<D> {
    /// A prelude falling back on `defaults` instead of the documented ones.
    pub fn new(defaults: KernelConfig) -> Self {
        Self {
            defaults,
            _dialect: PhantomData,
        }
    }

    pub fn defaults(&self) -> &KernelConfig {
        &self.defaults
    }

    fn default_value(&self, symbol: Symbol) -> String {
        match symbol {
            Symbol::TypeT => D::elem_name(self.defaults.elem).to_string(),
            Symbol::SizeT => D::size_type().to_string(),
            _ => self.defaults.value(symbol),
        }
    }

    fn compile_fallback(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        symbol: Symbol,
    ) -> std::fmt::Result {
        writeln!(f, "#ifndef {symbol}")?;
        writeln!(f, "#warning \"{}\"", symbol.missing_reason())?;
        writeln!(f, "#define {symbol} {}", self.default_value(symbol))?;
        writeln!(f, "#endif")
    }

    fn compile_print_array(f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let qualifier = D::helper_qualifier();
        let global = D::global_qualifier();

        writeln!(f, "{qualifier} void print_array({global}TYPE_T *array, SIZE_T len)")?;
        writeln!(f, "{{")?;
        writeln!(f, "#ifdef DEBUG")?;
        writeln!(f, "    if ({} == 0) {{", D::local_id_x())?;
        writeln!(f, "        printf(\"[\");")?;
        writeln!(f, "        for (SIZE_T i = 0; i < len; i++) {{")?;
        writeln!(f, "            printf(\"%.1f, \", {});", D::print_value("array[i]"))?;
        writeln!(f, "        }}")?;
        writeln!(f, "        printf(\"]\\n\");")?;
        writeln!(f, "    }}")?;
        writeln!(f, "#endif")?;
        writeln!(f, "}}")
    }
}

impl<D: Dialect> Display for KernelPrelude<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "#ifndef {INCLUDE_GUARD}")?;
        writeln!(f, "#define {INCLUDE_GUARD}")?;
        writeln!(f)?;

        D::compile_includes(f)?;
        writeln!(f)?;

        // Each symbol is checked on its own, whatever the guard says.
        self.compile_fallback(f, Symbol::TypeT)?;
        writeln!(f)?;
        writeln!(f, "#define SIZE_T {}", self.default_value(Symbol::SizeT))?;
        writeln!(f)?;
        self.compile_fallback(f, Symbol::Operator)?;
        writeln!(f)?;
        self.compile_fallback(f, Symbol::KernelName)?;
        writeln!(f)?;

        // Arguments go through a second expansion before being pasted.
        writeln!(f, "#define CONCAT_INNER(a, b) a##b")?;
        writeln!(f, "#define CONCAT(a, b) CONCAT_INNER(a, b)")?;
        writeln!(f)?;

        Self::compile_print_array(f)?;
        writeln!(f)?;
        writeln!(f, "#endif")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{Cuda, OpenCl};
    use kernelcfg_common::{Elem, Ident, Operator};
    use pretty_assertions::assert_eq;

    #[test]
    fn opencl_prelude() {
        let prelude = KernelPrelude::<OpenCl>::default().to_string();

        assert_eq!(
            prelude,
            r#"#ifndef KERNEL_DEFAULTS_H
#define KERNEL_DEFAULTS_H

#ifdef cl_khr_fp16
#pragma OPENCL EXTENSION cl_khr_fp16 : enable
#endif
#ifdef cl_khr_fp64
#pragma OPENCL EXTENSION cl_khr_fp64 : enable
#endif

#ifndef TYPE_T
#warning "missing float type"
#define TYPE_T float
#endif

#define SIZE_T ulong

#ifndef OPERATOR
#warning "missing operator"
#define OPERATOR +
#endif

#ifndef KERNEL_NAME
#warning "missing kernel name"
#define KERNEL_NAME add
#endif

#define CONCAT_INNER(a, b) a##b
#define CONCAT(a, b) CONCAT_INNER(a, b)

inline void print_array(__global TYPE_T *array, SIZE_T len)
{
#ifdef DEBUG
    if (get_local_id(0) == 0) {
        printf("[");
        for (SIZE_T i = 0; i < len; i++) {
            printf("%.1f, ", array[i]);
        }
        printf("]\n");
    }
#endif
}

#endif
"#
        );
    }

    #[test]
    fn cuda_prelude_uses_cuda_builtins() {
        let prelude = KernelPrelude::<Cuda>::default().to_string();

        assert!(prelude.contains("#include <cuda_fp16.h>"));
        assert!(prelude.contains("#define SIZE_T unsigned long long"));
        assert!(prelude.contains("__device__ inline void print_array(TYPE_T *array, SIZE_T len)"));
        assert!(prelude.contains("if (threadIdx.x == 0) {"));
        assert!(prelude.contains("printf(\"%.1f, \", (double)array[i]);"));
    }

    #[test]
    fn custom_defaults() {
        let defaults = KernelConfig::new(Elem::F16, Operator::Mul, Ident::from_static("mul"));
        let prelude = KernelPrelude::<Cuda>::new(defaults).to_string();

        assert!(prelude.contains("#define TYPE_T __half\n"));
        assert!(prelude.contains("#define OPERATOR *\n"));
        assert!(prelude.contains("#define KERNEL_NAME mul\n"));
    }
}
