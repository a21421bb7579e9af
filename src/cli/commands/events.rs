//! Push and sync commands - deliver background events to the active worker

use crate::cli::args::{PushArgs, SyncArgs};
use crate::cli::Host;
use crate::config::Config;
use crate::error::ShellCacheResult;
use crate::ui::{self, UiContext};
use crate::worker::ClickOutcome;

/// Execute the push command
pub async fn push(args: PushArgs, config: &Config) -> ShellCacheResult<()> {
    let ctx = UiContext::detect();
    let host = Host::new(config);
    let registration = host.registration().await?;
    let worker = registration.controller()?;

    let payload = args.payload.as_deref().map(str::as_bytes);
    let Some(notification) = worker.handle_push(payload).await? else {
        ui::remark(&ctx, "Push had no payload; no notification shown");
        return Ok(());
    };

    ui::note(&ctx, &notification.title, &notification.body);
    ui::key_value(&ctx, "icon", &notification.icon);
    ui::key_value(&ctx, "url", &notification.url);

    if args.click {
        match worker.handle_notification_click(&notification).await? {
            ClickOutcome::Focused(id) => ui::step_ok_detail(&ctx, "Focused window", &id),
            ClickOutcome::Opened(url) => ui::step_ok_detail(&ctx, "Opened window", &url),
        }
    }

    Ok(())
}

/// Execute the sync command
pub async fn sync(args: SyncArgs, config: &Config) -> ShellCacheResult<()> {
    let ctx = UiContext::detect();
    let host = Host::new(config);
    let registration = host.registration().await?;

    registration.controller()?.handle_sync(&args.tag).await?;
    ui::step_ok_detail(&ctx, "Sync acknowledged", &args.tag);
    Ok(())
}
