use std::fmt::{Debug, Formatter};
use std::hash::Hash;

use kernelcfg_common::{Elem, config::compilation::DialectKind};

/// A kernel language the prelude and the assembled sources are written in.
pub trait Dialect: Default + Clone + Copy + Debug + Send + Sync + Eq + Hash + 'static {
    /// The matching configuration value.
    const KIND: DialectKind;

    /// Extension of template files, without the dot.
    fn source_extension() -> &'static str;

    // types
    fn elem_name(elem: Elem) -> &'static str;
    fn size_type() -> &'static str;

    // qualifiers
    fn helper_qualifier() -> &'static str;
    fn global_qualifier() -> &'static str;

    // builtins
    fn local_id_x() -> &'static str;
    /// The `printf` argument for one element of type `TYPE_T`.
    fn print_value(value: &str) -> String;

    fn compile_includes(f: &mut Formatter<'_>) -> std::fmt::Result;

    /// Compiler flags trading IEEE conformance for speed.
    fn fast_math_flags() -> &'static [&'static str];
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpenCl;

impl Dialect for OpenCl {
    const KIND: DialectKind = DialectKind::OpenCl;

    fn source_extension() -> &'static str {
        "cl"
    }

    fn elem_name(elem: Elem) -> &'static str {
        elem.c_name()
    }

    fn size_type() -> &'static str {
        "ulong"
    }

    fn helper_qualifier() -> &'static str {
        "inline"
    }

    fn global_qualifier() -> &'static str {
        "__global "
    }

    fn local_id_x() -> &'static str {
        "get_local_id(0)"
    }

    fn print_value(value: &str) -> String {
        value.to_string()
    }

    fn compile_includes(f: &mut Formatter<'_>) -> std::fmt::Result {
        for extension in ["cl_khr_fp16", "cl_khr_fp64"] {
            writeln!(f, "#ifdef {extension}")?;
            writeln!(f, "#pragma OPENCL EXTENSION {extension} : enable")?;
            writeln!(f, "#endif")?;
        }

        Ok(())
    }

    fn fast_math_flags() -> &'static [&'static str] {
        &["-cl-finite-math-only", "-cl-unsafe-math-optimizations"]
    }
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cuda;

impl Dialect for Cuda {
    const KIND: DialectKind = DialectKind::Cuda;

    fn source_extension() -> &'static str {
        "cu"
    }

    fn elem_name(elem: Elem) -> &'static str {
        match elem {
            Elem::F16 => "__half",
            Elem::F32 => "float",
            Elem::F64 => "double",
        }
    }

    fn size_type() -> &'static str {
        "unsigned long long"
    }

    fn helper_qualifier() -> &'static str {
        "__device__ inline"
    }

    fn global_qualifier() -> &'static str {
        ""
    }

    fn local_id_x() -> &'static str {
        "threadIdx.x"
    }

    // `__half` can't go through varargs as is.
    fn print_value(value: &str) -> String {
        format!("(double){value}")
    }

    fn compile_includes(f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "#include <cuda_fp16.h>")
    }

    fn fast_math_flags() -> &'static [&'static str] {
        &["--use_fast_math"]
    }
}
