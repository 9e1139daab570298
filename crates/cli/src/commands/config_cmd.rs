//! `ragchat config`: Print configuration.

use std::path::Path;

use ragchat_config::AppConfig;

pub fn show(config_path: &Path, default: bool) -> Result<(), Box<dyn std::error::Error>> {
    if default {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config = super::load_config(config_path)?;
    println!("# Effective configuration ({})", config_path.display());
    println!("{}", render_redacted(&config)?);
    Ok(())
}

/// The configuration as TOML, with the credential masked.
fn render_redacted(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.ai.api_key.is_some() {
        shown.ai.api_key = Some("[REDACTED]".into());
    }
    toml::to_string_pretty(&shown)
}
