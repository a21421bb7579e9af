//! Terminal output for the command line
//!
//! Uses `cliclack` for framed output and spinners when attached to a
//! terminal, and plain prefixed lines otherwise (pipes, CI).

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, note, outro_success, outro_warn, remark, section,
    step_info, step_ok, step_ok_detail, step_warn_hint,
};
pub use progress::TaskSpinner;
pub use prompts::confirm;
pub use theme::{init_theme, ShellCacheTheme};
