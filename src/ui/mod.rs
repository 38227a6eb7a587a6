//! Terminal output helpers
//!
//! Styled output through `console` when stdout is a terminal, plain
//! `[OK]`/`[WARN]` prefixes otherwise so CI logs stay readable.

mod context;
mod output;

pub use context::UiContext;
pub use output::{
    key_value, key_value_status, section, step_error_detail, step_ok, step_warn_hint,
};
