use std::path::PathBuf;

use kernelcfg_core::codegen::{OpenCl, SourceAssembler};
use kernelcfg_core::{Elem, Operator};
use pretty_assertions::assert_eq;

fn kernel_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("kernels")
}

fn shipped() -> SourceAssembler<OpenCl> {
    let mut assembler = SourceAssembler::<OpenCl>::new();
    assembler.load_dir(kernel_dir()).unwrap();
    assembler
}

#[test]
fn shipped_templates_expand_into_every_operator() {
    let sources = shipped().assemble().unwrap();

    assert_eq!(
        sources
            .iter()
            .filter_map(|source| source.variant.as_ref())
            .map(|variant| variant.operator)
            .collect::<Vec<_>>(),
        Operator::ALL.to_vec()
    );
}

#[test]
fn shipped_templates_preprocess_without_fallbacks() {
    let checked = shipped().with_elem(Elem::F64).preflight().unwrap();

    let (_, mul) = checked
        .iter()
        .find(|(source, _)| source.variant.as_ref().is_some_and(|v| v.operator == Operator::Mul))
        .unwrap();

    assert!(mul.warnings.is_empty());
    assert!(mul.output.contains("__kernel void mul(__global double *lhs, ulong lhs_len,"));
    assert!(mul.output.contains("out[i] = lhs[i] * rhs[i];"));
    assert!(mul.output.contains("__kernel void mul_scalar(__global double *lhs, ulong len,"));
    assert!(mul.output.contains("out[i] = lhs[i] * rhs;"));
    assert!(!mul.output.contains("printf"));
}

#[test]
fn debug_assembly_keeps_print_array() {
    let checked = shipped().with_debug(true).preflight().unwrap();

    for (_, output) in checked.iter() {
        assert!(output.is_defined("DEBUG"));
        assert!(output.output.contains("if (get_local_id(0) == 0) {"));
        assert!(output.output.contains("print_array(out, len);"));
    }
}

#[test]
fn include_dir_points_at_the_templates() {
    let options = shipped().with_fast_math(true).build_options();

    assert_eq!(options[0], format!("-I {}", kernel_dir().display()));
    assert_eq!(&options[1..], ["-cl-finite-math-only", "-cl-unsafe-math-optimizations"]);
}
