use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{
    compilation::{CompilationConfig, DialectKind},
    kernel::KernelSymbolsConfig,
};
use crate::{ConfigError, Symbol};

/// Static mutex holding the global configuration, initialized as `None`.
static KERNELCFG_GLOBAL_CONFIG: Mutex<Option<Arc<GlobalConfig>>> = Mutex::new(None);

/// File names searched for, in order, in the current directory and its parents.
const CONFIG_FILE_NAMES: [&str; 2] = ["kernelcfg.toml", "KernelCfg.toml"];

/// Variable naming the configuration file, bypassing the search.
pub const CONFIG_PATH_VAR: &str = "KERNELCFG_CONFIG";

/// Represents the global configuration for kernelcfg, combining kernel symbols and compilation
/// settings.
#[derive(Default, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Symbols bound ahead of the kernel prelude.
    #[serde(default)]
    pub kernel: KernelSymbolsConfig,

    /// Configuration for kernel source assembly.
    #[serde(default)]
    pub compilation: CompilationConfig,
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it if not set.
    ///
    /// If no configuration is set, it attempts to load one from `kernelcfg.toml` or
    /// `KernelCfg.toml` in the current directory or its parents, then applies the environment
    /// overrides. A file that can't be read or parsed is reported and ignored.
    pub fn get() -> Arc<Self> {
        let mut state = KERNELCFG_GLOBAL_CONFIG
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        state.get_or_insert_with(|| Arc::new(Self::load())).clone()
    }

    /// Sets the global configuration to the provided value.
    ///
    /// # Panics
    /// Panics if the configuration has already been set or read, as it cannot be overridden.
    pub fn set(config: Self) {
        let mut state = KERNELCFG_GLOBAL_CONFIG
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if state.is_some() {
            panic!("Cannot set the global configuration multiple times.");
        }
        *state = Some(Arc::new(config));
    }

    /// Loads the configuration file found from the current directory, then applies the
    /// environment overrides, without touching the global state.
    pub fn load() -> Self {
        Self::load_traced().0
    }

    /// Same as [load](Self::load), also returning the files that were looked at.
    ///
    /// The file named by `KERNELCFG_CONFIG` is used when set. Otherwise the search starts from
    /// the current directory, which for a build script is the directory of the package being
    /// built: the configuration of a project depending on a published crate can't be found that
    /// way and has to be passed through `KERNELCFG_CONFIG` or the `KERNELCFG_*` variables.
    pub fn load_traced() -> (Self, ConfigLookup) {
        let lookup = match std::env::var_os(CONFIG_PATH_VAR) {
            Some(path) => ConfigLookup::explicit(PathBuf::from(path)),
            None => match std::env::current_dir() {
                Ok(dir) => ConfigLookup::search(&dir),
                Err(_) => ConfigLookup::default(),
            },
        };

        (lookup.read().override_from_env(), lookup)
    }

    /// Overrides configuration fields based on environment variables.
    pub fn override_from_env(self) -> Self {
        self.override_from(|name| std::env::var(name).ok())
    }

    /// Overrides configuration fields from any variable lookup.
    pub fn override_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for symbol in Symbol::CONFIGURABLE {
            if let Some(value) = symbol.env_var().and_then(&lookup) {
                self.kernel.set(symbol, value);
            }
        }

        if let Some(val) = lookup("KERNELCFG_DEBUG") {
            self.compilation.debug = parse_flag(&val);
        }

        if let Some(val) = lookup("KERNELCFG_FAST_MATH") {
            self.compilation.fast_math = parse_flag(&val);
        }

        if let Some(val) = lookup("KERNELCFG_DIALECT") {
            match val.as_str() {
                "opencl" | "cl" => self.compilation.dialect = DialectKind::OpenCl,
                "cuda" => self.compilation.dialect = DialectKind::Cuda,
                other => {
                    log::warn!("Unknown KERNELCFG_DIALECT `{other}`, keeping the configured one")
                }
            }
        }

        self
    }

    /// Loads configuration from a specified file path.
    pub fn from_file_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses a configuration from its TOML representation.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// The configuration files looked at by [GlobalConfig::load_traced].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLookup {
    /// Every path checked, in order, the one found included.
    pub candidates: Vec<PathBuf>,
    /// The file the configuration is read from.
    pub found: Option<PathBuf>,
}

impl ConfigLookup {
    /// Looks for `kernelcfg.toml` or `KernelCfg.toml` in `start` and its parents, stopping at
    /// the first one found.
    pub fn search(start: &Path) -> Self {
        let mut lookup = Self::default();
        let mut dir = start.to_path_buf();

        loop {
            for name in CONFIG_FILE_NAMES {
                let path = dir.join(name);
                lookup.candidates.push(path.clone());

                if path.is_file() {
                    lookup.found = Some(path);
                    return lookup;
                }
            }

            if !dir.pop() {
                return lookup;
            }
        }
    }

    /// Uses `path` and nothing else.
    pub fn explicit(path: PathBuf) -> Self {
        let found = path.is_file().then(|| path.clone());
        if found.is_none() {
            log::warn!("{CONFIG_PATH_VAR} points to {}, which doesn't exist", path.display());
        }

        Self {
            candidates: vec![path],
            found,
        }
    }

    /// Reads the file found, if any. A file that can't be read or parsed is reported and
    /// ignored.
    pub fn read(&self) -> GlobalConfig {
        let Some(path) = &self.found else {
            return GlobalConfig::default();
        };

        match GlobalConfig::from_file_path(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Ignoring {}: {err}", path.display());
                GlobalConfig::default()
            }
        }
    }
}

/// Environment flags are on for anything but an empty value, `0` or `false`.
fn parse_flag(value: &str) -> bool {
    !matches!(value.trim(), "" | "0" | "false")
}
