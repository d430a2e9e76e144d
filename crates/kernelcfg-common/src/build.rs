//! Resolution of the kernel symbols from inside a build script.
//!
//! A crate that wants the symbols as Rust constants calls [`BuildScript::from_env`] from its
//! `build.rs` and includes the generated module:
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     kernelcfg_common::build::BuildScript::from_env().run().unwrap();
//! }
//!
//! // lib.rs
//! include!(concat!(env!("OUT_DIR"), "/kernel_config.rs"));
//! ```
//!
//! Missing or unparsable symbols never fail the build. They are bound to their documented
//! default and reported once with `cargo:warning`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::{
    Fallback, KernelConfig, RejectedValue, Resolution,
    config::{CONFIG_PATH_VAR, GlobalConfig},
};

/// Name of the generated file in `OUT_DIR`.
pub const GENERATED_FILE: &str = "kernel_config.rs";

/// The cfg set when the debug print helper should be compiled in.
pub const DEBUG_CFG: &str = "kernel_debug";

/// Environment variables whose change must re-run the build script.
const WATCHED_ENV: [&str; 7] = [
    CONFIG_PATH_VAR,
    "KERNELCFG_TYPE_T",
    "KERNELCFG_OPERATOR",
    "KERNELCFG_KERNEL_NAME",
    "KERNELCFG_DEBUG",
    "KERNELCFG_FAST_MATH",
    "KERNELCFG_DIALECT",
];

/// Resolved symbols and the directives to hand over to cargo.
#[derive(Debug)]
pub struct BuildScript {
    resolution: Resolution,
    rejected: Vec<RejectedValue>,
    debug: bool,
    watched: Vec<PathBuf>,
}

impl BuildScript {
    /// Resolves the symbols from `kernelcfg.toml` and the `KERNELCFG_*` variables.
    ///
    /// Every configuration file path looked at is watched, so creating or editing one re-runs
    /// the build script. The `debug` cargo feature of the crate running the build script also
    /// enables the debug print helper.
    pub fn from_env() -> Self {
        let feature_debug = std::env::var_os("CARGO_FEATURE_DEBUG").is_some();
        let (config, lookup) = GlobalConfig::load_traced();

        Self::from_config(&config)
            .watching(lookup.candidates)
            .with_debug(feature_debug)
    }

    pub fn from_config(config: &GlobalConfig) -> Self {
        let (symbols, rejected) = config.kernel.symbols();

        Self {
            resolution: symbols.resolve(),
            rejected,
            debug: config.compilation.debug,
            watched: Vec::new(),
        }
    }

    /// Re-runs the build script when any of `paths` is created or changes.
    pub fn watching(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.watched.extend(paths);
        self
    }

    /// Turns the debug print helper on. Never turns it off.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug |= debug;
        self
    }

    pub fn config(&self) -> &KernelConfig {
        &self.resolution.config
    }

    pub fn fallbacks(&self) -> &[Fallback] {
        &self.resolution.fallbacks
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// The `cargo:` directives, one per line, in emission order.
    pub fn directives(&self) -> Vec<String> {
        let mut directives = Vec::new();

        for name in WATCHED_ENV {
            directives.push(format!("cargo:rerun-if-env-changed={name}"));
        }
        for path in self.watched.iter() {
            directives.push(format!("cargo:rerun-if-changed={}", path.display()));
        }
        directives.push(format!("cargo:rustc-check-cfg=cfg({DEBUG_CFG})"));

        for rejected in self.rejected.iter() {
            directives.push(format!("cargo:warning={rejected}"));
        }
        for fallback in self.resolution.fallbacks.iter() {
            directives.push(format!("cargo:warning={fallback}"));
        }

        if self.debug {
            directives.push(format!("cargo:rustc-cfg={DEBUG_CFG}"));
        }

        directives
    }

    /// The Rust module holding the resolved symbols as constants.
    pub fn constants(&self) -> String {
        let config = &self.resolution.config;
        let mut out = String::new();

        // Writing into a String never fails.
        let _ = writeln!(out, "// Generated by kernelcfg's build script helper.");
        let _ = writeln!(out);
        let _ = writeln!(out, "/// Element type the kernels are specialized on.");
        let _ = writeln!(out, "pub type TypeT = {};", config.elem.rust_type());
        let _ = writeln!(out, "/// Element type of [`TypeT`] as seen by the kernels.");
        let _ = writeln!(
            out,
            "pub const ELEM: ::kernelcfg_common::Elem = ::kernelcfg_common::Elem::{:?};",
            config.elem
        );
        let _ = writeln!(out, "/// Binary operator the kernels are specialized on.");
        let _ = writeln!(
            out,
            "pub const OPERATOR: ::kernelcfg_common::Operator = ::kernelcfg_common::Operator::{:?};",
            config.operator
        );
        let _ = writeln!(out, "/// Name of the generated kernel entry point.");
        let _ = writeln!(
            out,
            "pub const KERNEL_NAME: &str = {:?};",
            config.kernel_name.as_str()
        );
        let _ = writeln!(out, "/// Symbols that received their default.");
        let fallbacks = self
            .resolution
            .fallbacks
            .iter()
            .map(|fallback| format!("::kernelcfg_common::Symbol::{:?}", fallback.symbol))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "pub const FALLBACKS: &[::kernelcfg_common::Symbol] = &[{fallbacks}];"
        );

        out
    }

    /// Prints the directives and writes the constants to `OUT_DIR`.
    pub fn run(self) -> std::io::Result<PathBuf> {
        let out_dir = std::env::var_os("OUT_DIR")
            .map(PathBuf::from)
            .ok_or_else(|| std::io::Error::other("OUT_DIR is only set for build scripts"))?;

        for directive in self.directives() {
            println!("{directive}");
        }

        self.write_to(&out_dir)
    }

    /// Writes the constants into `dir`, returning the path of the generated file.
    ///
    /// An up to date file is left untouched.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(GENERATED_FILE);
        let constants = self.constants();

        if std::fs::read_to_string(&path).ok().as_deref() != Some(constants.as_str()) {
            std::fs::write(&path, constants)?;
        }

        Ok(path)
    }
}
