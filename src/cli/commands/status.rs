//! Status command - registration, caches and paths

use crate::cache::{CacheNames, CacheStorage};
use crate::cli::Host;
use crate::config::{Config, ConfigManager};
use crate::error::ShellCacheResult;
use crate::ui::{self, UiContext};
use crate::worker::WorkerRecord;

/// Execute the status command
pub async fn execute(config: &Config, config_path: &std::path::Path) -> ShellCacheResult<()> {
    let ctx = UiContext::detect();
    let host = Host::new(config);
    let record = host.load_record().await?;
    let names = CacheNames::from_config(&config.cache);

    ui::intro(&ctx, "shellcache status");

    ui::section(&ctx, "Registration");
    print_worker(&ctx, "active", record.active.as_ref());
    print_worker(&ctx, "waiting", record.waiting.as_ref());
    if let Some(updated) = record.updated_at {
        ui::key_value(&ctx, "updated", &updated.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    }

    ui::section(&ctx, &format!("Caches for {}", names.version_tag()));
    let storage = host.storage();
    for name in [names.static_name(), names.dynamic_name()] {
        let present = storage.has(&name).await?;
        let detail = if present {
            format!("{} ({} entries)", name, storage.keys(&name).await?.len())
        } else {
            format!("{} (missing)", name)
        };
        ui::key_value_status(&ctx, "cache", &detail, present);
    }
    let stale_count = names.stale(&storage.names().await?).len();
    if stale_count > 0 {
        ui::step_warn_hint(
            &ctx,
            &format!("{} cache(s) from older versions", stale_count),
            "removed on next activation",
        );
    }

    ui::section(&ctx, "Paths");
    ui::key_value(&ctx, "config", &config_path.display().to_string());
    ui::key_value(&ctx, "state", &ConfigManager::state_dir(config).display().to_string());
    ui::key_value(&ctx, "storage", &storage.root().display().to_string());
    ui::key_value(&ctx, "origin", &config.network.origin);

    Ok(())
}

fn print_worker(ctx: &UiContext, slot: &str, record: Option<&WorkerRecord>) {
    match record {
        Some(worker) => ui::key_value_status(
            ctx,
            slot,
            &format!(
                "{} [{}] since {}",
                worker.version,
                worker.state,
                worker.since.format("%Y-%m-%d %H:%M")
            ),
            worker.state.is_controlling() || worker.state.is_waiting(),
        ),
        None => ui::key_value(ctx, slot, "none"),
    }
}
