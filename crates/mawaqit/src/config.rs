//! CLI-side config loading: the file and environment from `mawaqit-config`,
//! then global flag overrides on top.

use std::path::PathBuf;

use clap::ValueEnum;

use mawaqit_config::Config;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// The config file this invocation reads and writes.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(mawaqit_config::config_path)
}

/// Load the config file (missing is fine) and apply flag overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = mawaqit_config::load_config_from(&config_file(global))?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

/// Flags win over the file and the environment.
pub fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(latitude) = global.latitude {
        cfg.latitude = Some(latitude);
    }
    if let Some(longitude) = global.longitude {
        cfg.longitude = Some(longitude);
    }
    if let Some(ref mosque) = global.mosque {
        cfg.mosque = Some(mosque.clone());
    }
    if let Some(ref url) = global.api_url {
        cfg.api_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = humantime::format_duration(timeout).to_string();
    }
}

/// `--output`, else `defaults.output`, else table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&cfg.defaults.output, true).unwrap_or_else(|_| {
            tracing::warn!(value = %cfg.defaults.output, "unknown defaults.output, using table");
            OutputFormat::Table
        })
    })
}

/// `--color`, else `defaults.color`, else auto.
pub fn color_mode(global: &GlobalOpts, cfg: &Config) -> ColorMode {
    global.color.unwrap_or_else(|| {
        ColorMode::from_str(&cfg.defaults.color, true).unwrap_or(ColorMode::Auto)
    })
}
