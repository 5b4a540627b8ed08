use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner on stderr while a request is in flight. Hidden when stderr is
/// not a terminal so piped output stays clean.
pub fn create_spinner(message: String) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        let spinner = ProgressBar::hidden();
        spinner.set_message(message);
        return spinner;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
