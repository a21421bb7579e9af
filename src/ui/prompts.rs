//! Confirmation prompt with a non-interactive fallback

use super::context::UiContext;
use crate::error::{ShellCacheError, ShellCacheResult};

/// Ask a yes/no question
///
/// Auto-yes answers true; a non-interactive context answers `default`.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> ShellCacheResult<bool> {
    if ctx.auto_yes() {
        return Ok(true);
    }
    if !ctx.is_interactive() {
        return Ok(default);
    }

    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| ShellCacheError::Internal(format!("prompt task failed: {}", e)))?
    .map_err(|e| ShellCacheError::User(format!("Prompt failed: {}", e)))
}
