use derive_more::Display;

/// Which kernel language the prelude is generated for.
#[derive(
    Default, Clone, Copy, Debug, Display, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum DialectKind {
    /// OpenCL C.
    #[default]
    #[serde(rename = "opencl")]
    #[display("opencl")]
    OpenCl,
    /// CUDA C++.
    #[serde(rename = "cuda")]
    #[display("cuda")]
    Cuda,
}

/// Settings applied when assembling kernel sources.
#[derive(Default, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CompilationConfig {
    /// Defines `DEBUG` in every assembled source, which enables `print_array`.
    #[serde(default)]
    pub debug: bool,

    /// Adds the unsafe math optimization flags to the build options.
    #[serde(default)]
    pub fast_math: bool,

    /// The kernel language.
    #[serde(default)]
    pub dialect: DialectKind,
}
