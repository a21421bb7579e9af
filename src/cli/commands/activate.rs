//! Activate command - promote the waiting worker

use crate::cli::Host;
use crate::config::Config;
use crate::error::ShellCacheResult;
use crate::ui::{self, UiContext};

/// Execute the activate command
pub async fn execute(config: &Config) -> ShellCacheResult<()> {
    let ctx = UiContext::detect();
    let host = Host::new(config);
    let mut registration = host.registration().await?;

    let report = registration.skip_waiting().await?;
    host.persist(&registration).await?;

    let version = registration
        .active()
        .map(|worker| worker.version())
        .unwrap_or_default();
    if report.deleted.is_empty() {
        ui::step_ok_detail(&ctx, "Activated", &version);
    } else {
        ui::step_ok_detail(
            &ctx,
            "Activated",
            &format!("{}, deleted {}", version, report.deleted.join(", ")),
        );
    }

    Ok(())
}
