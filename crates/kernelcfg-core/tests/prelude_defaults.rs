use kernelcfg_core::codegen::{
    Cuda, KernelPrelude, OpenCl, PRELUDE_FILE, PreprocessError, Preprocessed, Preprocessor,
    prelude_source,
};
use kernelcfg_common::config::compilation::DialectKind;
use kernelcfg_core::{Elem, Ident, KernelConfig, Operator};
use pretty_assertions::assert_eq;

const INCLUDE: &str = "#include \"kernel_defaults.h\"\n";

fn preprocess(defines: &[(&str, &str)], source: &str) -> Result<Preprocessed, PreprocessError> {
    let prelude = KernelPrelude::<OpenCl>::default().to_string();
    let mut preprocessor = Preprocessor::new().with_header(PRELUDE_FILE, prelude);
    for (name, value) in defines {
        preprocessor = preprocessor.with_define(*name, *value);
    }

    preprocessor.run(source)
}

#[test]
fn predefined_symbols_are_kept_silently() {
    let out = preprocess(
        &[("TYPE_T", "double"), ("OPERATOR", "*"), ("KERNEL_NAME", "mul")],
        INCLUDE,
    )
    .unwrap();

    assert!(out.warnings.is_empty());
    assert_eq!(out.expand("TYPE_T").unwrap(), "double");
    assert_eq!(out.expand("OPERATOR").unwrap(), "*");
    assert_eq!(out.expand("KERNEL_NAME").unwrap(), "mul");
    assert_eq!(out.expand("SIZE_T").unwrap(), "ulong");
}

#[test]
fn missing_symbols_fall_back_with_one_warning_each() {
    let out = preprocess(&[], INCLUDE).unwrap();

    assert_eq!(
        out.warnings,
        vec!["missing float type", "missing operator", "missing kernel name"]
    );
    assert_eq!(out.expand("TYPE_T").unwrap(), "float");
    assert_eq!(out.expand("OPERATOR").unwrap(), "+");
    assert_eq!(out.expand("KERNEL_NAME").unwrap(), "add");
}

#[test]
fn symbols_fall_back_independently() {
    let out = preprocess(&[("OPERATOR", "*")], INCLUDE).unwrap();

    assert_eq!(out.warnings, vec!["missing float type", "missing kernel name"]);
    assert_eq!(out.expand("OPERATOR").unwrap(), "*");
}

#[test]
fn second_inclusion_adds_nothing() {
    let out = preprocess(&[], &format!("{INCLUDE}{INCLUDE}")).unwrap();

    assert_eq!(out.warnings.len(), 3);
    assert_eq!(out.expand("TYPE_T").unwrap(), "float");
}

#[test]
fn size_type_is_fixed() {
    let err = preprocess(&[("SIZE_T", "uint")], INCLUDE).unwrap_err();

    assert!(matches!(err, PreprocessError::Redefinition { ref name, .. } if name == "SIZE_T"));
    assert!(preprocess(&[("SIZE_T", "ulong")], INCLUDE).is_ok());
}

#[test]
fn concat_expands_its_arguments_first() {
    let out = preprocess(&[("A", "foo"), ("B", "bar")], INCLUDE).unwrap();

    assert_eq!(out.expand("CONCAT(A, B)").unwrap(), "foobar");
    assert_eq!(out.expand("CONCAT_INNER(A, B)").unwrap(), "AB");
    assert_eq!(out.expand("CONCAT(KERNEL_NAME, _f32)").unwrap(), "add_f32");
}

#[test]
fn print_array_is_empty_without_debug() {
    let out = preprocess(&[], INCLUDE).unwrap();

    assert_eq!(
        out.output,
        "inline void print_array(__global float *array, ulong len)\n{\n}\n"
    );
}

#[test]
fn print_array_prints_from_lane_zero_with_debug() {
    let out = preprocess(&[("DEBUG", "")], INCLUDE).unwrap();

    assert_eq!(
        out.output,
        r#"inline void print_array(__global float *array, ulong len)
{
    if (get_local_id(0) == 0) {
        printf("[");
        for (ulong i = 0; i < len; i++) {
            printf("%.1f, ", array[i]);
        }
        printf("]\n");
    }
}
"#
    );
}

#[test]
fn cuda_prelude_preprocesses_the_same_way() {
    let defaults = KernelConfig::new(Elem::F64, Operator::Div, Ident::from_static("div"));
    let out = Preprocessor::new()
        .with_header(PRELUDE_FILE, KernelPrelude::<Cuda>::new(defaults).to_string())
        .run(INCLUDE)
        .unwrap();

    assert!(out.output.starts_with("#include <cuda_fp16.h>\n"));
    assert_eq!(out.warnings.len(), 3);
    assert_eq!(out.expand("TYPE_T").unwrap(), "double");
    assert_eq!(out.expand("OPERATOR").unwrap(), "/");
    assert_eq!(out.expand("SIZE_T").unwrap(), "unsigned long long");
}

#[test]
fn prelude_for_a_configured_dialect() {
    let defaults = KernelConfig::default();

    assert_eq!(
        prelude_source(DialectKind::OpenCl, &defaults),
        KernelPrelude::<OpenCl>::default().to_string()
    );
    assert_eq!(
        prelude_source(DialectKind::Cuda, &defaults),
        KernelPrelude::<Cuda>::default().to_string()
    );
}
