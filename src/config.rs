use anyhow::bail;
use anyhow::Context;
use anyhow::Error;
use log::debug;
use log::LevelFilter;
use serde::Deserialize;
use serde::Serialize;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::catalog::factors::CrossSystemFactors;

/// The header written at the top of generated config files.
const HEADER: &str = "\
# ckconv configuration
# Changing the conversion factors is not recommended.
";

/// How numbers are written.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    /// Fixed or scientific, whichever is shorter for the precision.
    #[default]
    Auto,
    Fixed,
    Scientific,
}

/// The verbosity of the log.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Output settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Output {
    /// Digits of precision; significant digits in `auto` notation, digits
    /// after the decimal point otherwise.
    pub precision: usize,
    pub notation: Notation,

    /// Omit the input value and unit.
    pub quiet: bool,

    #[serde(alias = "no-color", alias = "disable-colors")]
    pub no_color: bool,

    /// Repeat the input on every line of a conversion to all systems.
    #[serde(alias = "always-show-input")]
    pub always_show_input: bool,
}

impl Default for Output {
    fn default() -> Output {
        Output {
            precision: 6,
            notation: Notation::Auto,
            quiet: false,
            no_color: false,
            always_show_input: false,
        }
    }
}

/// The program configuration.
///
/// Config files are INI-style; they are read and written as TOML, whose
/// `key = value` lines under `[section]` headers are what the file uses.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Config {
    /// The version of the program that wrote the file.
    pub version: String,
    pub log_level: LogLevel,
    pub conversions: CrossSystemFactors,

    /// Older files name this section `config`.
    #[serde(alias = "config")]
    pub output: Output,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: LogLevel::default(),
            conversions: CrossSystemFactors::default(),
            output: Output::default(),
        }
    }
}

impl Config {
    /// Loads a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, Error> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
        .with_context(|| format!(
            "Malformed config: {} (recreate it with --reset-ini)",
            path.display()
        ))?;

        config.check_version()
        .with_context(|| format!("Incompatible config: {}", path.display()))?;

        config.conversions.validate()
        .with_context(|| format!("Invalid conversion factors in config: {}", path.display()))?;

        debug!("Loaded config {}: {:?}", path.display(), config);

        Ok(config)
    }

    /// Loads a config file if it exists, or returns the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Config, Error> {
        let path = path.as_ref();

        if !path.exists() {
            debug!("No config at {}; using defaults", path.display());
            return Ok(Config::default());
        }

        Config::load(path)
    }

    /// Writes this configuration to a file, stamped with the current version.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();

        let config = Config {version: env!("CARGO_PKG_VERSION").to_string(), ..self.clone()};

        let content = format!("{}\n{}", HEADER, toml::to_string(&config)?);

        fs::write(path, content)
        .with_context(|| format!("Cannot write config: {}", path.display()))
    }

    /// Ensures the file was written by a build with the same major version.
    fn check_version(&self) -> Result<(), Error> {
        const VERSION_MAJOR: &str = env!("CARGO_PKG_VERSION_MAJOR");

        let major = self.version.split('.').next().unwrap_or_default();

        if major != VERSION_MAJOR {
            bail!(
                "Config created with an incompatible build of ckconv: {:?} (current version: {})",
                self.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        Ok(())
    }
}

/// Returns the default config path: beside the executable, named after it.
pub fn default_path() -> Result<PathBuf, Error> {
    let executable = env::current_exe().context("Cannot locate the executable")?;

    let mut path = executable.clone();
    path.set_extension("ini");

    Ok(path)
}
