//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{ShellCacheError, ShellCacheResult};
use crate::ui::{self, UiContext};

/// Keys accepted by `config set`
const SETTABLE_KEYS: &[&str] = &[
    "general.log_format",
    "cache.namespace",
    "cache.version",
    "cache.shell_document",
    "cache.static_extensions",
    "cache.static_prefixes",
    "cache.cdn_hosts",
    "manifest.local",
    "manifest.external",
    "network.origin",
    "network.timeout_secs",
    "network.user_agent",
    "worker.skip_waiting",
    "notifications.title",
    "notifications.body",
    "notifications.icon",
    "notifications.url",
];

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> ShellCacheResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let mut updated = config.clone();
            set_value(&mut updated, &key, &value)?;
            manager.save(&updated).await?;
            ui::step_ok(&UiContext::detect(), &format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> ShellCacheResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Write the default configuration; runs before the existing file is parsed
pub async fn init_config(manager: &ConfigManager, force: bool) -> ShellCacheResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());
    Ok(())
}

fn set_value(config: &mut Config, key: &str, value: &str) -> ShellCacheResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => {
            if value != "text" && value != "json" {
                return Err(invalid(key, "expected text or json"));
            }
            config.general.log_format = value.to_string();
        }

        ["cache", "namespace"] => config.cache.namespace = value.to_string(),
        ["cache", "version"] => {
            if value.is_empty() || value.contains(['/', '\\']) {
                return Err(invalid(key, "must be non-empty without path separators"));
            }
            config.cache.version = value.to_string();
        }
        ["cache", "shell_document"] => config.cache.shell_document = value.to_string(),
        ["cache", "static_extensions"] => config.cache.static_extensions = parse_list(value),
        ["cache", "static_prefixes"] => config.cache.static_prefixes = parse_list(value),
        ["cache", "cdn_hosts"] => config.cache.cdn_hosts = parse_list(value),

        ["manifest", "local"] => config.manifest.local = parse_list(value),
        ["manifest", "external"] => config.manifest.external = parse_list(value),

        ["network", "origin"] => {
            crate::http::request::parse_url(value).map_err(|e| invalid(key, &e.to_string()))?;
            config.network.origin = value.trim_end_matches('/').to_string();
        }
        ["network", "timeout_secs"] => {
            config.network.timeout_secs = value
                .parse()
                .map_err(|_| invalid(key, "expected a number of seconds"))?
        }
        ["network", "user_agent"] => config.network.user_agent = value.to_string(),

        ["worker", "skip_waiting"] => config.worker.skip_waiting = parse_bool(key, value)?,

        ["notifications", "title"] => config.notifications.title = value.to_string(),
        ["notifications", "body"] => config.notifications.body = value.to_string(),
        ["notifications", "icon"] => config.notifications.icon = value.to_string(),
        ["notifications", "url"] => config.notifications.url = value.to_string(),

        _ => {
            return Err(ShellCacheError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                SETTABLE_KEYS.join(", ")
            )))
        }
    }

    Ok(())
}

fn invalid(key: &str, reason: &str) -> ShellCacheError {
    ShellCacheError::SettingInvalid {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(key: &str, value: &str) -> ShellCacheResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(invalid(key, "expected true or false")),
    }
}
