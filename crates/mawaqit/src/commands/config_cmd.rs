//! Config subcommand handlers.

use mawaqit_config::{Config, SecretKind};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, InitArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_file(global).display().to_string(), false);
            Ok(())
        }
        ConfigCommand::Show => show(global),
        ConfigCommand::Init(init_args) => init(init_args, global),
    }
}

// ── Show ────────────────────────────────────────────────────────────

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?.redacted();
    let format = config::output_format(global, &cfg);
    let as_toml = toml::to_string_pretty(&cfg)?;
    let rendered = output::render_single(format, &cfg, |_| as_toml.clone(), |_| as_toml.clone())?;
    output::print_output(rendered.trim_end(), global.quiet);
    Ok(())
}

// ── Init ────────────────────────────────────────────────────────────

/// Starter config from defaults plus whatever the flags already say.
fn starter_config(args: &InitArgs, global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = Config::default();
    config::apply_overrides(&mut cfg, global);
    if let Some(ref username) = args.username {
        cfg.username = Some(username.clone());
    }
    if let Some(ref timezone) = args.timezone {
        cfg.timezone.clone_from(timezone);
    }
    if let Some(format) = global.output {
        if let Some(value) = clap::ValueEnum::to_possible_value(&format) {
            cfg.defaults.output = value.get_name().to_owned();
        }
    }

    // Catch typos now rather than on the first sync.
    cfg.timezone()?;
    cfg.call_timeout()?;
    if cfg.latitude.is_some() || cfg.longitude.is_some() {
        cfg.location()?;
    }
    Ok(cfg)
}

fn init(args: InitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global);
    if path.exists() && !args.force {
        return Err(CliError::Validation {
            field: "config".into(),
            reason: format!("{} already exists (pass --force to overwrite)", path.display()),
        });
    }

    let cfg = starter_config(&args, global)?;

    if args.store_password {
        let username = cfg.username().unwrap_or("your account");
        let password = rpassword::prompt_password(format!("Mawaqit password for {username}: "))?;
        mawaqit_config::store_secret(SecretKind::Password, &password)?;
        if !global.quiet {
            eprintln!("Password stored in the system keyring");
        }
    }

    mawaqit_config::save_config_to(&path, &cfg)?;
    tracing::info!(path = %path.display(), "config written");
    if !global.quiet {
        eprintln!("Config written to {}", path.display());
    }
    Ok(())
}
