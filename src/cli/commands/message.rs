//! Message command - post a control message and print the JSON reply

use crate::cli::args::{MessageArgs, MessageKind};
use crate::cli::Host;
use crate::config::Config;
use crate::error::ShellCacheResult;
use crate::ui::{self, UiContext};
use crate::worker::ControlMessage;

/// Execute the message command
pub async fn execute(args: MessageArgs, config: &Config) -> ShellCacheResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);

    // Scripts and pipes cannot answer a prompt; only a terminal is asked
    if args.kind == MessageKind::ClearCache
        && ctx.is_interactive()
        && !ui::confirm(&ctx, "Delete every cache of this application?", false).await?
    {
        ui::remark(&ctx, "Cancelled. Pass --yes to clear without prompting.");
        return Ok(());
    }

    let host = Host::new(config);
    let mut registration = host.registration().await?;

    let reply = registration
        .post_message(ControlMessage::from(args.kind))
        .await?;
    host.persist(&registration).await?;

    println!("{}", serde_json::to_string(&reply)?);
    Ok(())
}
