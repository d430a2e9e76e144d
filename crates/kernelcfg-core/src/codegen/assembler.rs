use std::collections::{BTreeMap, HashMap};
use std::ffi::OsStr;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use derive_more::Display;
use kernelcfg_common::{Elem, Ident, KernelSymbols, Operator, config::GlobalConfig};
use thiserror::Error;

use super::{Dialect, KernelPrelude, PRELUDE_FILE, PreprocessError, Preprocessed, Preprocessor};

/// One specialization of an operator-generic template.
#[derive(new, Debug, Display, Clone, PartialEq, Eq, Hash)]
#[display("{name} ({operator})")]
pub struct KernelVariant {
    /// Bound to `KERNEL_NAME`.
    pub name: Ident,
    /// Bound to `OPERATOR`.
    pub operator: Operator,
}

impl KernelVariant {
    /// The variant named after its operator, e.g. `mul` for `*`.
    pub fn of(operator: Operator) -> Self {
        Self::new(operator.ident(), operator)
    }
}

/// A source ready to be handed to the device compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelSource {
    /// Template file the source was assembled from.
    pub file: String,
    /// The variant bound in the source, for operator-generic templates.
    pub variant: Option<KernelVariant>,
    pub source: String,
}

/// An error while collecting or checking kernel sources.
#[derive(Error)]
pub enum AssemblyError {
    #[error("Unable to read the kernel directory {path}\nCaused by:\n  {source}")]
    SrcDirRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unable to read the kernel source {path}\nCaused by:\n  {source}")]
    SrcRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No kernel source to assemble")]
    SrcDirEmpty,

    #[error("{file} failed to preprocess\nCaused by:\n  {source}")]
    Preprocess {
        file: String,
        source: PreprocessError,
    },

    /// An operator-generic variant still relies on a default: the variant table and the
    /// template disagree.
    #[error("{file} ({variant}) fell back on a default: {warning}")]
    UnboundVariant {
        file: String,
        variant: KernelVariant,
        warning: String,
    },
}

impl core::fmt::Debug for AssemblyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{self}"))
    }
}

/// The variants of the templates shipped with the crate.
pub fn default_variants() -> HashMap<String, Vec<KernelVariant>> {
    let mut variants = HashMap::new();
    variants.insert(
        "vec_arithmetic.cl".to_string(),
        Operator::ALL.into_iter().map(KernelVariant::of).collect(),
    );

    variants
}

/// Assembles template sources into the sources a device compiler gets.
///
/// Every source is prefixed with the element type binding (and `DEBUG` when enabled). Templates
/// referencing both `OPERATOR` and `KERNEL_NAME` that have an entry in the variant table are
/// expanded into one source per variant, with the operator and the name bound ahead of the
/// prelude. The others are assembled once and rely on the prelude for what they leave unbound.
#[derive(Debug, Clone)]
pub struct SourceAssembler<D: Dialect> {
    sources: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    variants: HashMap<String, Vec<KernelVariant>>,
    elem: Elem,
    debug: bool,
    fast_math: bool,
    include_dir: Option<PathBuf>,
    _dialect: PhantomData<D>,
}

impl<D: Dialect> Default for SourceAssembler<D> {
    fn default() -> Self {
        Self {
            sources: BTreeMap::new(),
            headers: BTreeMap::new(),
            variants: default_variants(),
            elem: Elem::default(),
            debug: false,
            fast_math: false,
            include_dir: None,
            _dialect: PhantomData,
        }
    }
}

impl<D: Dialect> SourceAssembler<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// An assembler following the compilation settings and element type of `config`.
    ///
    /// An element type that doesn't parse is reported and left to its default.
    pub fn from_config(config: &GlobalConfig) -> Self {
        if config.compilation.dialect != D::KIND {
            log::warn!(
                "Configured for {}, assembling {} sources",
                config.compilation.dialect,
                D::KIND
            );
        }

        let (symbols, rejected): (KernelSymbols, _) = config.kernel.symbols();
        for rejected in rejected {
            log::warn!("{rejected}");
        }

        Self::new()
            .with_elem(symbols.type_t.unwrap_or_default())
            .with_debug(config.compilation.debug)
            .with_fast_math(config.compilation.fast_math)
    }

    pub fn with_elem(mut self, elem: Elem) -> Self {
        self.elem = elem;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_fast_math(mut self, fast_math: bool) -> Self {
        self.fast_math = fast_math;
        self
    }

    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dir = Some(dir.into());
        self
    }

    /// Replaces the variants of `file`. An empty list makes the template non-generic.
    pub fn with_variants(mut self, file: impl Into<String>, variants: Vec<KernelVariant>) -> Self {
        self.variants.insert(file.into(), variants);
        self
    }

    pub fn elem(&self) -> Elem {
        self.elem
    }

    pub fn add_source(&mut self, file: impl Into<String>, source: impl Into<String>) -> &mut Self {
        self.sources.insert(file.into(), source.into());
        self
    }

    /// Registers a header templates can include, for [preflight](Self::preflight).
    pub fn add_header(&mut self, name: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.headers.insert(name.into(), content.into());
        self
    }

    /// Reads the templates (`*.cl` or `*.cu`) and headers (`*.h`) of `dir`.
    ///
    /// `dir` becomes the include directory unless one was set. Returns the number of templates
    /// read.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, AssemblyError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| AssemblyError::SrcDirRead {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut count = 0;
        for entry in entries {
            let entry = entry.map_err(|source| AssemblyError::SrcDirRead {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Some(name) = path.file_name().and_then(OsStr::to_str).map(str::to_string) else {
                log::debug!("Skipping {}, not valid UTF-8", path.display());
                continue;
            };
            let extension = path.extension().and_then(OsStr::to_str);
            let is_source = extension == Some(D::source_extension());
            if !is_source && extension != Some("h") {
                continue;
            }

            let content = std::fs::read_to_string(&path)
                .map_err(|source| AssemblyError::SrcRead { path: path.clone(), source })?;

            if is_source {
                self.sources.insert(name, content);
                count += 1;
            } else {
                self.headers.insert(name, content);
            }
        }

        log::debug!("Found {count} source files in {}", dir.display());

        if self.include_dir.is_none() {
            self.include_dir = Some(dir.to_path_buf());
        }

        Ok(count)
    }

    /// The prelude templates include as [PRELUDE_FILE].
    pub fn prelude(&self) -> KernelPrelude<D> {
        KernelPrelude::default()
    }

    /// Writes the prelude into `dir` under [PRELUDE_FILE], for the device compiler to find it.
    pub fn write_prelude(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let path = dir.as_ref().join(PRELUDE_FILE);
        std::fs::write(&path, self.prelude().to_string())?;

        Ok(path)
    }

    /// The lines put ahead of every source.
    pub fn prefix(&self) -> String {
        let mut prefix = format!("#undef TYPE_T\n#define TYPE_T {}\n", D::elem_name(self.elem));

        if self.debug {
            prefix.push_str("#define DEBUG\n");
        }

        prefix
    }

    fn variant_prefix(variant: &KernelVariant) -> String {
        format!(
            "#undef OPERATOR\n#define OPERATOR {}\n#undef KERNEL_NAME\n#define KERNEL_NAME {}\n",
            variant.operator.token(),
            variant.name
        )
    }

    fn generic_variants(&self, file: &str, source: &str) -> Option<&[KernelVariant]> {
        if !(source.contains("OPERATOR") && source.contains("KERNEL_NAME")) {
            return None;
        }

        self.variants
            .get(file)
            .map(Vec::as_slice)
            .filter(|variants| !variants.is_empty())
    }

    pub fn assemble(&self) -> Result<Vec<KernelSource>, AssemblyError> {
        if self.sources.is_empty() {
            return Err(AssemblyError::SrcDirEmpty);
        }

        let prefix = self.prefix();
        let mut assembled = Vec::new();

        for (file, source) in self.sources.iter() {
            let Some(variants) = self.generic_variants(file, source) else {
                log::debug!("Found generic kernel in {file}");
                assembled.push(KernelSource {
                    file: file.clone(),
                    variant: None,
                    source: format!("{prefix}{source}"),
                });
                continue;
            };

            log::debug!("Found operator-generic kernel in {file}");
            for variant in variants {
                assembled.push(KernelSource {
                    file: file.clone(),
                    variant: Some(variant.clone()),
                    source: format!("{prefix}{}{source}", Self::variant_prefix(variant)),
                });
            }
        }

        Ok(assembled)
    }

    /// Options for the device compiler: the include directory and the fast math flags.
    pub fn build_options(&self) -> Vec<String> {
        let mut options = Vec::new();

        if let Some(dir) = &self.include_dir {
            options.push(format!("-I {}", dir.display()));
        }
        if self.fast_math {
            options.extend(D::fast_math_flags().iter().map(|flag| flag.to_string()));
        }

        options
    }

    /// Preprocesses every assembled source on the host against the prelude.
    ///
    /// Fallback warnings of non-generic sources are logged. A generic variant relying on a
    /// default is an error.
    pub fn preflight(&self) -> Result<Vec<(KernelSource, Preprocessed)>, AssemblyError> {
        let mut preprocessor =
            Preprocessor::new().with_header(PRELUDE_FILE, self.prelude().to_string());
        for (name, content) in self.headers.iter() {
            preprocessor = preprocessor.with_header(name.clone(), content.clone());
        }

        let mut checked = Vec::new();
        for source in self.assemble()? {
            let output = preprocessor
                .run(&source.source)
                .map_err(|err| AssemblyError::Preprocess {
                    file: source.file.clone(),
                    source: err,
                })?;

            match (&source.variant, output.warnings.first()) {
                (Some(variant), Some(warning)) => {
                    return Err(AssemblyError::UnboundVariant {
                        file: source.file.clone(),
                        variant: variant.clone(),
                        warning: warning.clone(),
                    });
                }
                (None, _) => {
                    for warning in output.warnings.iter() {
                        log::warn!("{}: {warning}", source.file);
                    }
                }
                _ => {}
            }

            checked.push((source, output));
        }

        Ok(checked)
    }
}
