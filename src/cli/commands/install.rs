//! Install command - precache the shell for the configured version

use crate::cli::args::InstallArgs;
use crate::cli::Host;
use crate::config::Config;
use crate::error::ShellCacheResult;
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config) -> ShellCacheResult<()> {
    let ctx = UiContext::detect();
    let host = Host::new(config);
    let mut registration = host.registration().await?;

    let mut settings = host.settings()?;
    if args.wait {
        settings.skip_waiting = false;
    }
    let version = settings.names.version_tag();
    let worker = host.new_worker(settings);

    ui::intro(&ctx, &format!("Installing {}", version));
    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Precaching assets...");

    let outcome = match registration.install(worker).await {
        Ok(outcome) => outcome,
        Err(e) => {
            spinner.stop_error("Install failed");
            host.persist(&registration).await?;
            return Err(e);
        }
    };
    spinner.stop(&format!("Cached {} assets", outcome.report.cached.len()));

    for url in &outcome.report.skipped {
        ui::step_warn_hint(&ctx, url, "unreachable, skipped");
    }

    match outcome.activated {
        Some(report) => {
            for name in &report.deleted {
                ui::step_info(&ctx, &format!("Deleted old cache {}", name));
            }
            host.persist(&registration).await?;
            ui::outro_success(&ctx, &format!("{} is active", version));
        }
        None => {
            host.persist(&registration).await?;
            ui::outro_warn(&ctx, &format!("{} installed and waiting", version));
            ui::remark(&ctx, "Run: shellcache activate");
        }
    }

    Ok(())
}
