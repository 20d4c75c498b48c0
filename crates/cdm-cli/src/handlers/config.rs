//! Configuration command handler

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use tracing::info;

/// Handle the config command
pub fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Show(show) => {
            let redacted = config.redacted();
            let rendered = match show.format {
                ConfigFormat::Yaml => serde_yaml::to_string(&redacted)?,
                ConfigFormat::Json => serde_json::to_string_pretty(&redacted)?,
            };
            output.writeln(rendered.trim_end())
        }
        ConfigAction::Init(init) => init_config(init, output),
        ConfigAction::Paths => {
            for path in Config::default_config_paths() {
                let marker = if path.exists() { "*" } else { " " };
                output.writeln(&format!("{} {}", marker, path.display()))?;
            }
            Ok(())
        }
    }
}

fn init_config(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let path = args
        .path
        .or_else(Config::user_config_path)
        .ok_or_else(|| Error::config("Cannot determine the user configuration directory"))?;

    if path.exists() && !args.force {
        return Err(Error::config(format!(
            "{} already exists; use --force to overwrite it",
            path.display()
        )));
    }

    Config::default().save(&path)?;
    info!("Wrote default configuration to {}", path.display());
    output.success(&format!("Created {}", path.display()))
}
