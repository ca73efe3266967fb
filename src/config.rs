//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/binsize-treemap/binsize-treemap.toml`
//! 3. Explicit config file: `--config <file>` (must exist)
//! 4. Environment variables: `BINSIZE_TREEMAP_<SECTION>__<KEY>`
//!
//! Command line flags are applied on top by the CLI layer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::render::RenderConfig;
use crate::application::services::OutputFormat;
use crate::application::ApplicationError;
use crate::domain::{LayoutConfig, NormalizeOptions, SymbolNaming};
use crate::util::path::expand_path;

pub const APP_NAME: &str = "binsize-treemap";

/// Prefix of environment variable overrides, e.g. `BINSIZE_TREEMAP_LAYOUT__WIDTH=800`.
pub const ENV_PREFIX: &str = "BINSIZE_TREEMAP";

/// Unified configuration for binsize-treemap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    /// Symbol naming convention
    pub naming: SymbolNaming,
    /// Output document format
    pub format: OutputFormat,
    /// Canvas geometry and spacing
    pub layout: LayoutConfig,
    /// Symbol filtering, depth limit and imputation
    pub normalize: NormalizeOptions,
    /// SVG styling
    pub render: RenderConfig,
}

/// Get the XDG config directory for binsize-treemap.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(format!("{APP_NAME}.toml")))
}

impl Settings {
    /// Load settings with layered precedence from the process environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), config_file, None)
    }

    /// Load settings from explicit sources.
    ///
    /// # Arguments
    /// * `global` - Global config file, skipped when missing
    /// * `config_file` - Explicit config file, an error when missing
    /// * `env` - Variables to use instead of the process environment
    pub fn load_from(
        global: Option<&Path>,
        config_file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let defaults = Config::try_from(&Settings::default()).map_err(config_err)?;
        let mut builder = Config::builder().add_source(defaults);

        // 2. Global config (optional)
        if let Some(global) = global {
            debug!("global config: {}", global.display());
            builder = builder.add_source(File::from(global).format(FileFormat::Toml).required(false));
        }

        // 3. Explicit config (required)
        if let Some(path) = config_file {
            let path = expand_path(path);
            if !path.is_file() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            debug!("config file: {}", path.display());
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        // 4. Environment variables (explicit override)
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r##"# binsize-treemap configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/binsize-treemap/binsize-treemap.toml
#   File:   --config <file>
#   Env:    BINSIZE_TREEMAP_<SECTION>__<KEY>, e.g. BINSIZE_TREEMAP_LAYOUT__WIDTH=800
#   Flags:  command line options

# Symbol naming convention: "go" or "cpp"
# naming = "go"

# Output format: "svg", "csv" or "tree"
# format = "svg"

[layout]
# width = 1028
# height = 640
# margin_box = 4
# padding_box = 4
# padding_root = 16
# title_height = 14

[normalize]
# include_symbols = false
# include_pure_symbols = false
# include_unknown = false
# max_depth = 0          # 0 = unlimited
# empty_leaf_size = 0

[render]
# border_color = "#808080"
# text_color = "#000000"
# font_size = 12
# font_family = "monospace"
"##
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
