pub mod confirm;
mod format;
pub mod spinner;
pub mod theme;

pub use format::{print_error, print_json, print_note, print_success, print_warning, OutputMode};
